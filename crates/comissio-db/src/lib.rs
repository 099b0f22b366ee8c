//! # comissio-db: Database Layer for ComissioFlow
//!
//! This crate provides database access for ComissioFlow.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       ComissioFlow Data Flow                            │
//! │                                                                         │
//! │  Backoffice service (create_sale, commission_report)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   comissio-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ position.rs   │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ employee.rs   │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │    │ seller.rs     │    │              │  │   │
//! │  │   │               │    │ sale.rs       │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           └──► directory.rs: impl CommissionDirectory           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/comissioflow/comissio.db (or COMISSIO_DB_PATH) │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`directory`] - SQLite-backed `CommissionDirectory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use comissio_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("comissio.db")).await?;
//!
//! let engine = db.commission_engine();
//! let result = engine.calculate(&seller_id, 5000.0).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod directory;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::company::CompanyRepository;
pub use repository::employee::{EmployeeFilter, EmployeeRepository};
pub use repository::position::PositionRepository;
pub use repository::sale::{SaleRepository, SaleWithItems};
pub use repository::seller::{SellerRepository, SellerWithName};
