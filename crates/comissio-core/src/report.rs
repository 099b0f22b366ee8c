//! # Report Module
//!
//! Commission aggregation over persisted sale items.
//!
//! Reports read the values stored on each item at sale time. Nothing here
//! calls the engine, so a policy change never rewrites history.
//!
//! ## Attribution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sale (seller_id = S)                                                   │
//! │   └── item                                                              │
//! │        ├── seller_commission_value  ──► line[S].seller_commission      │
//! │        └── manager_commission_value ──► line[item.manager_id]          │
//! │                                             .manager_commission         │
//! │                                                                         │
//! │  line.total = seller_commission + manager_commission                    │
//! │  lines sorted by total desc; grand total sums every line                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! `manager_id` holds the manager's seller id, so both columns key into the
//! same seller lines.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::round_cents;
use crate::types::{Sale, SaleItem};

// =============================================================================
// Filter
// =============================================================================

/// Period and seller filter for reports and sale listings.
///
/// Both period bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportFilter {
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
    pub seller_id: Option<String>,
}

impl ReportFilter {
    /// Filter that keeps everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_period(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_seller(mut self, seller_id: impl Into<String>) -> Self {
        self.seller_id = Some(seller_id.into());
        self
    }

    /// Whether a sale date falls inside the period.
    pub fn includes_date(&self, date: &DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| *date >= start)
            && self.end_date.map_or(true, |end| *date <= end)
    }
}

// =============================================================================
// Commission Report
// =============================================================================

/// Commission totals of one seller over the report period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerCommissionLine {
    pub seller_id: String,
    pub seller_name: String,
    /// Sales made by this seller (sales where they only earned a manager
    /// override are not counted).
    pub sale_count: u32,
    pub seller_commission_total: f64,
    pub manager_commission_total: f64,
    pub total: f64,
}

/// Sum of every line in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GrandTotal {
    pub sale_count: u32,
    pub seller_commission_total: f64,
    pub manager_commission_total: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionReport {
    pub filter: ReportFilter,
    pub lines: Vec<SellerCommissionLine>,
    pub grand_total: GrandTotal,
}

#[derive(Default)]
struct Accumulator {
    sale_count: u32,
    seller: f64,
    manager: f64,
}

/// Aggregates commission lines from sales and their items.
///
/// `seller_names` maps seller id to a display name (usually the employee
/// name); unknown sellers are labelled with their id. Sales outside the
/// filter period are skipped. A seller filter narrows the lines, while
/// manager overrides still come from every sale in the period.
pub fn build_commission_report(
    filter: &ReportFilter,
    sales: &[Sale],
    items: &[SaleItem],
    seller_names: &HashMap<String, String>,
) -> CommissionReport {
    let sales_in_period: HashMap<&str, &Sale> = sales
        .iter()
        .filter(|sale| filter.includes_date(&sale.sale_date))
        .map(|sale| (sale.id.as_str(), sale))
        .collect();

    let mut totals: HashMap<String, Accumulator> = HashMap::new();

    for sale in sales_in_period.values() {
        totals.entry(sale.seller_id.clone()).or_default().sale_count += 1;
    }

    for item in items {
        let Some(sale) = sales_in_period.get(item.sale_id.as_str()) else {
            continue;
        };

        totals.entry(sale.seller_id.clone()).or_default().seller += item.seller_commission_value;

        if let Some(manager_id) = &item.manager_id {
            totals.entry(manager_id.clone()).or_default().manager += item.manager_commission_value;
        }
    }

    let mut lines: Vec<SellerCommissionLine> = totals
        .into_iter()
        .filter(|(seller_id, _)| filter.seller_id.as_ref().map_or(true, |id| id == seller_id))
        .map(|(seller_id, acc)| SellerCommissionLine {
            seller_name: seller_names
                .get(&seller_id)
                .cloned()
                .unwrap_or_else(|| seller_id.clone()),
            seller_id,
            sale_count: acc.sale_count,
            seller_commission_total: round_cents(acc.seller),
            manager_commission_total: round_cents(acc.manager),
            total: round_cents(acc.seller + acc.manager),
        })
        .collect();

    lines.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.seller_name.cmp(&b.seller_name))
            .then_with(|| a.seller_id.cmp(&b.seller_id))
    });

    let grand_total = lines.iter().fold(GrandTotal::default(), |mut acc, line| {
        acc.sale_count += line.sale_count;
        acc.seller_commission_total += line.seller_commission_total;
        acc.manager_commission_total += line.manager_commission_total;
        acc.total += line.total;
        acc
    });

    CommissionReport {
        filter: filter.clone(),
        lines,
        grand_total: GrandTotal {
            sale_count: grand_total.sale_count,
            seller_commission_total: round_cents(grand_total.seller_commission_total),
            manager_commission_total: round_cents(grand_total.manager_commission_total),
            total: round_cents(grand_total.total),
        },
    }
}

// =============================================================================
// Sale Summary
// =============================================================================

/// Commission breakdown of a single sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleCommissionSummary {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub items_value_total: f64,
    pub seller_commission_total: f64,
    pub manager_commission_total: f64,
    pub total_commission: f64,
}

impl SaleCommissionSummary {
    /// Sums the stored commissions of `items`; items of other sales are
    /// ignored.
    pub fn from_items(sale: Sale, items: Vec<SaleItem>) -> Self {
        let items: Vec<SaleItem> = items.into_iter().filter(|i| i.sale_id == sale.id).collect();

        let value: f64 = items.iter().map(|i| i.value).sum();
        let seller: f64 = items.iter().map(|i| i.seller_commission_value).sum();
        let manager: f64 = items.iter().map(|i| i.manager_commission_value).sum();

        SaleCommissionSummary {
            sale,
            items,
            items_value_total: round_cents(value),
            seller_commission_total: round_cents(seller),
            manager_commission_total: round_cents(manager),
            total_commission: round_cents(seller + manager),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
