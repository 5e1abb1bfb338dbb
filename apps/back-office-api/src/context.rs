//! Caller context extractor.
//!
//! The gateway in front of this service authenticates the user and forwards
//! who they are in headers. Nothing here verifies identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fuelbook_core::validation::validate_uuid_field;
use fuelbook_core::{RequestContext, Role};

use crate::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const BRANCH_HEADER: &str = "x-branch-id";
pub const ROLE_HEADER: &str = "x-role";

/// The [`RequestContext`] of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = header(parts, ACTOR_HEADER)
            .ok_or_else(|| ApiError::validation(format!("Missing {ACTOR_HEADER} header")))?;

        let branch_id = header(parts, BRANCH_HEADER)
            .ok_or_else(|| ApiError::validation(format!("Missing {BRANCH_HEADER} header")))?;
        validate_uuid_field(BRANCH_HEADER, branch_id)?;

        let role = match header(parts, ROLE_HEADER) {
            Some(role) => role.parse::<Role>()?,
            None => Role::default(),
        };

        Ok(Caller(RequestContext::new(actor_id, branch_id, role)))
    }
}
