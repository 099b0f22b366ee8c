//! # Error Types
//!
//! Domain-specific error types for comissio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  comissio-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  comissio-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError                          │
//! │        DbError ─────────────────────► ApiError                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed commission policy values are NOT errors: they degrade to zero
//! in [`crate::money`]. The only hard failure of the engine is an unknown
//! seller.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Seller cannot be found.
    ///
    /// ## When This Occurs
    /// - A sale or sale item references a seller id that does not exist
    /// - The seller was deleted between listing and selling
    #[error("Seller not found: {0}")]
    SellerNotFound(String),

    /// Position cannot be found.
    #[error("Position not found: {0}")]
    PositionNotFound(String),

    /// Employee cannot be found.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Setting this parent would make the position its own ancestor.
    ///
    /// ## User Workflow
    /// ```text
    /// Diretor ◄── Gerente ◄── Vendedor
    ///    │
    ///    └── set parent = Vendedor
    ///             │
    ///             ▼
    /// PositionCycle { position_id: Diretor, parent_id: Vendedor }
    /// ```
    #[error("Position {position_id} cannot report to {parent_id}: hierarchy would contain a cycle")]
    PositionCycle {
        position_id: String,
        parent_id: String,
    },

    /// Records from different companies cannot reference each other.
    #[error("{entity} {id} belongs to another company")]
    CompanyMismatch { entity: String, id: String },

    /// Employee already has a seller policy attached.
    #[error("Employee {0} already has a seller policy")]
    SellerAlreadyExists(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before anything is written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid CPF, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
