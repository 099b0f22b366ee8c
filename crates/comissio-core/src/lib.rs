//! # comissio-core: Pure Business Logic for ComissioFlow
//!
//! This crate is the **heart** of ComissioFlow. It contains the commission
//! rules, the org-chart walk and the report math as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ComissioFlow Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                apps/backoffice (services, CLI)                  │   │
//! │  │   create_sale, add_item, commission_report, toggle_active ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ comissio-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌────────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │  │  types   │ │ commission │ │ hierarchy │ │ report         │  │   │
//! │  │  │ Position │ │  Engine    │ │ tree      │ │ per-seller sum │  │   │
//! │  │  │ Seller   │ │  rule text │ │ cycles    │ │ sale summary   │  │   │
//! │  │  └──────────┘ └─────┬──────┘ └───────────┘ └────────────────┘  │   │
//! │  │                     │ CommissionDirectory (trait)               │   │
//! │  └─────────────────────┼───────────────────────────────────────────┘   │
//! │                        │                                                │
//! │  ┌─────────────────────▼───────────────────────────────────────────┐   │
//! │  │                comissio-db (Database Layer)                     │   │
//! │  │           SQLite queries, migrations, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Position, Employee, Seller, Sale, SaleItem)
//! - [`money`] - Parse-or-default amount coercion and BRL formatting
//! - [`commission`] - Commission arithmetic and the hierarchy-aware engine
//! - [`hierarchy`] - Position tree building and cycle detection
//! - [`report`] - Commission report and per-sale summary aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use comissio_core::commission::calculate_commission;
//!
//! let calc = calculate_commission(100.0, 5.0, 1000.0);
//! assert_eq!(calc.total_value, 150.0);
//! assert!(calc.rule.contains("R$ 100.00 por veículo vendido."));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commission;
pub mod error;
pub mod hierarchy;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use commission::{calculate_commission, CommissionDirectory, CommissionEngine};
pub use error::{CoreError, ValidationError};
pub use money::{AmountInput, AmountSource};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Company used by the seed data and as the CLI default.
///
/// Every table is scoped by `company_id`; this constant only names the
/// demo tenant, it is never used as an implicit filter.
pub const DEFAULT_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum percentage a seller policy may carry.
pub const MAX_COMMISSION_PERCENTAGE: f64 = 100.0;

/// Generates a new entity identifier (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
