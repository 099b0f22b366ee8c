//! # Repository Module
//!
//! Database repository implementations for ComissioFlow.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Backoffice service                                                    │
//! │       │                                                                 │
//! │       │  db.sellers().list(&company_id)                                │
//! │       ▼                                                                 │
//! │  SellerRepository                                                      │
//! │  ├── insert(&self, seller)                                             │
//! │  ├── get(&self, company_id, id)                                        │
//! │  ├── update_policy(&self, company_id, id, fixed, pct)                  │
//! │  └── delete(&self, company_id, id)                                     │
//! │       │                                                                 │
//! │       │  SQL Query (query_as + FromRow)                                │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Company-facing lookups take `company_id` and never return rows of
//! another tenant. The id-only lookups (`get_by_id`, `parent_of`, ...) back
//! the commission engine, which follows references that are already scoped.
//!
//! ## Available Repositories
//!
//! - [`company::CompanyRepository`] - Tenants
//! - [`position::PositionRepository`] - Org chart nodes
//! - [`employee::EmployeeRepository`] - People in positions
//! - [`seller::SellerRepository`] - Commission policies
//! - [`sale::SaleRepository`] - Sales and sale items

pub mod company;
pub mod employee;
pub mod position;
pub mod sale;
pub mod seller;
