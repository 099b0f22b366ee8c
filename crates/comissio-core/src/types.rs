//! # Domain Types
//!
//! Core domain types used throughout ComissioFlow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Position     │◄──│    Employee     │◄──│     Seller      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  parent (opt) ──┼─┐ │  position_id    │   │  employee_id    │       │
//! │  │  company_id     │ │ │  is_active      │   │  fixed_value    │       │
//! │  └─────────────────┘ │ └─────────────────┘   │  percentage     │       │
//! │          ▲           │                       └────────┬────────┘       │
//! │          └───────────┘ (forest per company)           │                │
//! │                                                       ▼                │
//! │  ┌─────────────────┐   ┌──────────────────────────────────────────┐   │
//! │  │      Sale       │◄──│               SaleItem                   │   │
//! │  │  seller_id      │   │  value, seller commission, manager_id,   │   │
//! │  │  sale_date      │   │  manager commission (frozen at creation) │   │
//! │  └─────────────────┘   └──────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every persisted entity carries `company_id`; queries are always scoped by
//! it in the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::to_amount;

// =============================================================================
// Company
// =============================================================================

/// A tenant. All other records belong to exactly one company.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Company {
            id: crate::generate_id(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Position
// =============================================================================

/// A node of the organizational chart.
///
/// `parent_position_id` points one level up (e.g. Vendedor → Gerente).
/// The parent graph is kept acyclic when parents are assigned; see
/// [`crate::hierarchy::would_create_cycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Position {
    pub id: String,
    pub name: String,
    pub parent_position_id: Option<String>,
    pub company_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn new(
        name: impl Into<String>,
        parent_position_id: Option<String>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Position {
            id: crate::generate_id(),
            name: name.into(),
            parent_position_id,
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the position has no parent (top of its tree).
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_position_id.is_none()
    }
}

// =============================================================================
// Employee
// =============================================================================

/// A person placed in the org chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Employee {
    pub id: String,
    pub name: String,
    /// CPF, digits only.
    pub document: Option<String>,
    pub position_id: String,
    /// Linked login account, managed outside this system.
    pub user_id: Option<String>,
    pub email: Option<String>,
    /// Inactive employees are never picked as managers.
    pub is_active: bool,
    pub company_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// New active employee without document, user link or email.
    pub fn new(
        name: impl Into<String>,
        position_id: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Employee {
            id: crate::generate_id(),
            name: name.into(),
            document: None,
            position_id: position_id.into(),
            user_id: None,
            email: None,
            is_active: true,
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Seller
// =============================================================================

/// Commission policy attached to an employee.
///
/// Both policy columns are nullable; a missing value contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Seller {
    pub id: String,
    pub employee_id: String,
    /// Currency units earned per sale item.
    pub fixed_value: Option<f64>,
    /// Percent (0-100) of the sale item's value.
    pub percentage_value: Option<f64>,
    pub company_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Seller {
    pub fn new(
        employee_id: impl Into<String>,
        fixed_value: Option<f64>,
        percentage_value: Option<f64>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Seller {
            id: crate::generate_id(),
            employee_id: employee_id.into(),
            fixed_value,
            percentage_value,
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fixed component, with missing/malformed values read as zero.
    #[inline]
    pub fn fixed(&self) -> f64 {
        to_amount(self.fixed_value)
    }

    /// Percentage component, with missing/malformed values read as zero.
    #[inline]
    pub fn percentage(&self) -> f64 {
        to_amount(self.percentage_value)
    }
}

/// A seller together with its employee and the employee's position.
///
/// This is the snapshot the commission engine starts its walk from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerPlacement {
    pub seller: Seller,
    pub employee: Employee,
    pub position: Position,
}

// =============================================================================
// Sale
// =============================================================================

/// A sale made by one seller; the items carry the money.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub seller_id: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub company_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    pub fn new(
        seller_id: impl Into<String>,
        sale_date: DateTime<Utc>,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Sale {
            id: crate::generate_id(),
            seller_id: seller_id.into(),
            sale_date,
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a sale with its commissions frozen at creation time.
///
/// Uses the snapshot pattern: when a seller or manager policy changes later,
/// already persisted commission values stay as they were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub description: String,
    pub value: f64,
    pub seller_commission_value: f64,
    pub seller_commission_rule: Option<String>,
    /// Seller id of the manager who earned the override, if any.
    pub manager_id: Option<String>,
    pub manager_commission_value: f64,
    pub manager_commission_rule: Option<String>,
    pub company_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleItem {
    /// Builds a new item from its value and the commission computed for it.
    pub fn new(
        sale_id: impl Into<String>,
        description: impl Into<String>,
        value: f64,
        commission: ItemCommission,
        company_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let mut item = SaleItem {
            id: crate::generate_id(),
            sale_id: sale_id.into(),
            description: description.into(),
            value,
            seller_commission_value: 0.0,
            seller_commission_rule: None,
            manager_id: None,
            manager_commission_value: 0.0,
            manager_commission_rule: None,
            company_id: company_id.into(),
            created_at: now,
            updated_at: now,
        };
        item.apply_commission(commission);
        item
    }

    /// Overwrites the commission columns with a fresh calculation.
    pub fn apply_commission(&mut self, commission: ItemCommission) {
        self.seller_commission_value = commission.seller_commission_value;
        self.seller_commission_rule = Some(commission.seller_commission_rule);
        self.manager_id = commission.manager_id;
        self.manager_commission_value = commission.manager_commission_value;
        self.manager_commission_rule = commission.manager_commission_rule;
    }

    /// Seller plus manager commission for this item.
    #[inline]
    pub fn total_commission(&self) -> f64 {
        self.seller_commission_value + self.manager_commission_value
    }
}

// =============================================================================
// Commission Value Objects
// =============================================================================

/// One commission breakdown.
///
/// `percentage_value` holds the computed currency amount, NOT the policy
/// percent. Downstream consumers read this exact shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommissionCalculation {
    pub fixed_value: f64,
    pub percentage_value: f64,
    pub total_value: f64,
    pub rule: String,
}

/// Output of [`crate::CommissionEngine::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommissionResult {
    pub seller_commission: CommissionCalculation,
    pub manager_commission: Option<CommissionCalculation>,
    /// Seller id of the manager; set exactly when `manager_commission` is.
    pub manager_id: Option<String>,
}

/// The commission columns persisted on a sale item.
///
/// ## Mapping
/// ```text
/// seller_commission_value  = seller_commission.total_value
/// seller_commission_rule   = seller_commission.rule
/// manager_id               = manager_id
/// manager_commission_value = manager_commission.total_value  (or 0)
/// manager_commission_rule  = manager_commission.rule         (or None)
/// ```
/// Reports sum these columns directly, so the mapping must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCommission {
    pub seller_commission_value: f64,
    pub seller_commission_rule: String,
    pub manager_id: Option<String>,
    pub manager_commission_value: f64,
    pub manager_commission_rule: Option<String>,
}

impl From<CommissionResult> for ItemCommission {
    fn from(result: CommissionResult) -> Self {
        let (manager_commission_value, manager_commission_rule) = match result.manager_commission
        {
            Some(calc) => (calc.total_value, Some(calc.rule)),
            None => (0.0, None),
        };

        ItemCommission {
            seller_commission_value: result.seller_commission.total_value,
            seller_commission_rule: result.seller_commission.rule,
            manager_id: result.manager_id,
            manager_commission_value,
            manager_commission_rule,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
