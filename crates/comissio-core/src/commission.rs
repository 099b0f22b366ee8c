//! # Commission Module
//!
//! Commission arithmetic and the hierarchy-aware commission engine.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              CommissionEngine::calculate(seller_id, value)              │
//! │                                                                         │
//! │  1. seller_with_employee_and_position(seller_id) ── NotFound? ──► Err  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. seller_commission = calculate_commission(fixed, pct, value)        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. parent_position(seller's position)        ── None ──┐              │
//! │     active_employee_by_position(parent)       ── None ──┤              │
//! │     seller_by_employee(manager employee)      ── None ──┤ no manager   │
//! │        │                                                │              │
//! │        ▼                                                ▼              │
//! │  4. manager_commission = calculate_commission(...)   (None, None)      │
//! │     manager_id = manager seller id                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The walk goes exactly one level up. There is no skip-level override and
//! therefore no cycle detection here; acyclicity is enforced when parents
//! are assigned (see [`crate::hierarchy`]).

use async_trait::async_trait;

use crate::money::{format_brl, format_decimal, to_amount, AmountSource};
use crate::types::{CommissionCalculation, CommissionResult, Employee, Position, Seller, SellerPlacement};

// =============================================================================
// Arithmetic
// =============================================================================

/// Computes a single commission breakdown.
///
/// ## Formula
/// ```text
/// percentage_amount = item_value × (percentage / 100)
/// total             = fixed + percentage_amount
/// ```
/// Each input goes through [`to_amount`] first: missing or malformed values
/// contribute zero instead of failing the sale.
///
/// ## Rule String
/// ```text
/// Total de comissão: R$ 150.00. (R$ 100.00 por veículo vendido. 5.00% do valor da venda (R$ 50.00))
/// └───────── always ─────────┘ └──── fixed > 0 ─────────────┘└──── percentage amount > 0 ────────┘
/// ```
///
/// ## Example
/// ```rust
/// use comissio_core::calculate_commission;
///
/// let calc = calculate_commission(0.0, 0.0, 999.0);
/// assert_eq!(calc.rule, "Total de comissão: R$ 0.00. ()");
/// ```
pub fn calculate_commission<F, P, V>(fixed_value: F, percentage_value: P, item_value: V) -> CommissionCalculation
where
    F: AmountSource,
    P: AmountSource,
    V: AmountSource,
{
    let fixed = to_amount(fixed_value);
    let percentage = to_amount(percentage_value);
    let item_value = to_amount(item_value);

    let percentage_amount = item_value * (percentage / 100.0);
    let total = fixed + percentage_amount;

    let mut rule = format!("Total de comissão: {}. (", format_brl(total));

    if fixed > 0.0 {
        rule.push_str(&format!("{} por veículo vendido.", format_brl(fixed)));
    }

    if percentage_amount > 0.0 {
        rule.push_str(&format!(
            " {}% do valor da venda ({})",
            format_decimal(percentage),
            format_brl(percentage_amount)
        ));
    }

    rule.push(')');

    CommissionCalculation {
        fixed_value: fixed,
        percentage_value: percentage_amount,
        total_value: total,
        rule,
    }
}

// =============================================================================
// Directory Trait
// =============================================================================

/// Read access to the org chart and seller policies.
///
/// Implemented by `comissio_db::Database` for SQLite and by in-memory
/// fakes in tests. Implementations must not cache between calls: every
/// calculation sees the data as it is at call time.
///
/// ## Tie-Break
/// When several rows match `active_employee_by_position` or
/// `seller_by_employee`, implementations return the one with the earliest
/// `created_at`, then the lowest `id`.
#[async_trait]
pub trait CommissionDirectory: Send + Sync {
    /// Error type of the underlying store. Passed through to callers as is.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads a seller with its employee and position; not-found is an error.
    async fn seller_with_employee_and_position(
        &self,
        seller_id: &str,
    ) -> Result<SellerPlacement, Self::Error>;

    /// Returns the immediate parent of a position, if any.
    async fn parent_position(&self, position_id: &str) -> Result<Option<Position>, Self::Error>;

    /// Returns the active employee occupying a position, if any.
    async fn active_employee_by_position(
        &self,
        position_id: &str,
    ) -> Result<Option<Employee>, Self::Error>;

    /// Returns the seller policy attached to an employee, if any.
    async fn seller_by_employee(&self, employee_id: &str) -> Result<Option<Seller>, Self::Error>;
}

// =============================================================================
// Engine
// =============================================================================

/// Stateless commission engine over a [`CommissionDirectory`].
///
/// ## Usage
/// ```rust,ignore
/// let engine = CommissionEngine::new(db.clone());
/// let result = engine.calculate(&seller_id, 5000.0).await?;
/// ```
///
/// The engine holds no state besides the directory handle, so one instance
/// can serve concurrent calculations.
#[derive(Debug, Clone)]
pub struct CommissionEngine<D> {
    directory: D,
}

impl<D: CommissionDirectory> CommissionEngine<D> {
    /// Creates an engine reading from the given directory.
    pub fn new(directory: D) -> Self {
        CommissionEngine { directory }
    }

    /// Returns the underlying directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Computes the seller commission and, when a manager exists one level
    /// up, the manager's override on the same item value.
    ///
    /// ## Errors
    /// Whatever the directory returns, unchanged. In particular an unknown
    /// seller surfaces as the directory's not-found error, and no partial
    /// result is produced.
    pub async fn calculate<A>(&self, seller_id: &str, item_value: A) -> Result<CommissionResult, D::Error>
    where
        A: AmountSource + Send,
    {
        let item_value = to_amount(item_value);

        let placement = self
            .directory
            .seller_with_employee_and_position(seller_id)
            .await?;

        let seller_commission = calculate_commission(
            placement.seller.fixed(),
            placement.seller.percentage(),
            item_value,
        );

        let (manager_commission, manager_id) =
            match self.find_manager_seller(&placement.position).await? {
                Some(manager) => (
                    Some(calculate_commission(
                        manager.fixed(),
                        manager.percentage(),
                        item_value,
                    )),
                    Some(manager.id),
                ),
                None => (None, None),
            };

        Ok(CommissionResult {
            seller_commission,
            manager_commission,
            manager_id,
        })
    }

    /// Finds the seller policy of the active employee one level above
    /// `position`.
    async fn find_manager_seller(&self, position: &Position) -> Result<Option<Seller>, D::Error> {
        let Some(manager_position) = self.directory.parent_position(&position.id).await? else {
            return Ok(None);
        };

        let Some(manager_employee) = self
            .directory
            .active_employee_by_position(&manager_position.id)
            .await?
        else {
            return Ok(None);
        };

        self.directory.seller_by_employee(&manager_employee.id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
