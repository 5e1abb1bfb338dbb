//! # Error Types
//!
//! Domain-specific error types for fuelbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fuelbook-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  fuelbook-db errors (separate crate)                                   │
//! │  └── DbError          - Database failures, NotFound, Conflict          │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (fuel type, nozzle, day)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::day::DayKey;
use crate::volume::Volume;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// None of these are retryable: resubmitting the same input fails the same way.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A meter-reading batch would drive a tank or stock row below zero.
    ///
    /// ## When This Occurs
    /// - The summed differences of every line drawing on one tank exceed its level
    /// - Same for the stock row of the fuel item
    ///
    /// ## User Workflow
    /// ```text
    /// Batch: petrol nozzle 1 (800 L) + petrol nozzle 2 (400 L)
    ///      │
    ///      ▼
    /// Tank PETROL current level: 1000 L
    ///      │
    ///      ▼
    /// InsufficientStock { fuel_type: "petrol", available: 1000 L, requested: 1200 L }
    ///      │
    ///      ▼
    /// Whole batch rejected, nothing written
    /// ```
    #[error("Insufficient stock for {fuel_type}: available {available}, requested {requested}")]
    InsufficientStock {
        fuel_type: String,
        available: Volume,
        requested: Volume,
    },

    /// A reading already exists (or appears twice in the batch) for a nozzle and day.
    #[error("Meter reading already recorded for nozzle {nozzle_id} on {day}")]
    DuplicateReading { nozzle_id: String, day: DayKey },

    /// The submitted fuel type does not match the nozzle's fuel type.
    #[error("Nozzle {nozzle_id} dispenses {expected}, not {actual}")]
    FuelTypeMismatch {
        nozzle_id: String,
        expected: String,
        actual: String,
    },

    /// No tank in the branch holds the nozzle's fuel type.
    #[error("No tank for fuel type {fuel_type} in branch {branch_id}")]
    TankNotFound {
        branch_id: String,
        fuel_type: String,
    },

    /// A meter-reading batch contained no items.
    #[error("Meter reading batch is empty")]
    EmptyBatch,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any mutation is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value above the accepted ceiling.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields disagree with each other.
    #[error("{field} is inconsistent: {reason}")]
    Inconsistent { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
