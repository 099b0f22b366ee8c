//! # ComissioFlow Backoffice
//!
//! Services that manage the org chart, record sales and report commissions.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Backoffice Services                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  OrgService    │  │  SaleService   │  │  ReportService             ││
//! │  │                │  │                │  │                            ││
//! │  │ • Positions    │  │ • CreateSale   │  │ • CommissionReport         ││
//! │  │ • Hierarchy    │  │ • AddItem      │  │                            ││
//! │  │ • Employees    │  │ • UpdateItem   │  │                            ││
//! │  │ • Sellers      │  │ • Summary      │  │                            ││
//! │  └───────┬────────┘  └───────┬────────┘  └─────────────┬──────────────┘│
//! │          │                   │                         │               │
//! │          │                   ▼                         │               │
//! │          │          ┌─────────────────┐                │               │
//! │          │          │CommissionEngine │                │               │
//! │          │          └────────┬────────┘                │               │
//! │          ▼                   ▼                         ▼               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    comissio-db (SQLite)                          │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service method takes the tenant's `company_id` explicitly; records
//! of other companies are reported as not found.
//!
//! ## Configuration
//! Environment variables:
//! - `COMISSIO_DB_PATH` - SQLite database file
//! - `COMISSIO_DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `COMISSIO_COMPANY_ID` - tenant used by the CLI
//! - `COMISSIO_RUN_MIGRATIONS` - apply migrations on startup (default: true)
//! - `RUST_LOG` - log filter (default: `info,comissio=debug,sqlx=warn`)

pub mod config;
pub mod error;
pub mod services;

use tracing_subscriber::EnvFilter;

use comissio_db::Database;

// Re-exports
pub use config::{BackofficeConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use services::{OrgService, ReportService, SaleService};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub config: BackofficeConfig,
}

impl AppState {
    pub fn new(db: Database, config: BackofficeConfig) -> Self {
        AppState { db, config }
    }
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Critical failures (database unreachable, internal errors)
/// - WARN: Rejected operations (cycles, duplicate sellers, engine failures)
/// - INFO: Important events (startup, sale recorded)
/// - DEBUG: Detailed flow (repository writes, commission walk)
/// - TRACE: Very detailed
///
/// ## Configuration
/// Set `RUST_LOG` environment variable:
/// ```bash
/// RUST_LOG=debug backoffice report
/// RUST_LOG=comissio_db=trace backoffice report
/// ```
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,comissio=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
