//! # Request Context
//!
//! Who is calling and for which branch. Authentication happens elsewhere;
//! this crate only consumes the result and threads it into every mutator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May act on any branch.
    Admin,
    Manager,
    #[default]
    Staff,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            _ => Err(ValidationError::InvalidFormat {
                field: "role".to_string(),
                reason: "must be admin, manager or staff".to_string(),
            }),
        }
    }
}

/// The caller of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub actor_id: String,
    /// Branch new entities are created in.
    pub branch_id: String,
    pub role: Role,
}

impl RequestContext {
    pub fn new(actor_id: impl Into<String>, branch_id: impl Into<String>, role: Role) -> Self {
        RequestContext {
            actor_id: actor_id.into(),
            branch_id: branch_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may read or mutate entities of `branch_id`.
    pub fn can_access(&self, branch_id: &str) -> bool {
        self.is_admin() || self.branch_id == branch_id
    }
}
