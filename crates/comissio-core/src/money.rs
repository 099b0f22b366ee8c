//! # Money Module
//!
//! Amount coercion and display helpers for commission math.
//!
//! ## Parse-or-Default
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE AMOUNTS COME FROM                                                │
//! │                                                                         │
//! │  Seller policy (DB)  ── Option<f64> ───┐                                │
//! │  Request body (JSON) ── 5000 | "5000" ─┼──► to_amount() ──► f64         │
//! │  Legacy imports      ── "", "abc" ─────┘                                │
//! │                                                                         │
//! │  Missing, unparseable or non-finite  ──►  0.0                          │
//! │  (a malformed policy must never block a sale)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use comissio_core::money::{format_brl, to_amount};
//!
//! assert_eq!(to_amount(Some(12.5)), 12.5);
//! assert_eq!(to_amount(None::<f64>), 0.0);
//! assert_eq!(to_amount(" 1500.75 "), 1500.75);
//! assert_eq!(to_amount("abc"), 0.0);
//! assert_eq!(format_brl(150.0), "R$ 150.00");
//! ```
//!
//! Commission amounts are kept unrounded (`f64`); rounding to two decimals
//! happens only for display and for report totals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Amount Source
// =============================================================================

/// A value that can be read as a monetary amount or percentage.
///
/// `parse_amount` returns `None` when the value is missing or not a number;
/// [`to_amount`] turns that into `0.0`.
pub trait AmountSource {
    /// Reads the raw value as a number, if it is one.
    fn parse_amount(&self) -> Option<f64>;
}

impl AmountSource for f64 {
    fn parse_amount(&self) -> Option<f64> {
        Some(*self)
    }
}

impl AmountSource for i64 {
    fn parse_amount(&self) -> Option<f64> {
        Some(*self as f64)
    }
}

impl AmountSource for str {
    /// Mirrors how form and decimal-column values arrive as text: surrounding
    /// whitespace is ignored and an empty string means zero.
    fn parse_amount(&self) -> Option<f64> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return Some(0.0);
        }
        trimmed.parse::<f64>().ok()
    }
}

impl AmountSource for String {
    fn parse_amount(&self) -> Option<f64> {
        self.as_str().parse_amount()
    }
}

impl<T: AmountSource + ?Sized> AmountSource for &T {
    fn parse_amount(&self) -> Option<f64> {
        (**self).parse_amount()
    }
}

impl<T: AmountSource> AmountSource for Option<T> {
    fn parse_amount(&self) -> Option<f64> {
        self.as_ref().and_then(AmountSource::parse_amount)
    }
}

/// Converts any [`AmountSource`] to a finite number, defaulting to `0.0`.
///
/// This is the single narrow conversion at the boundary of the commission
/// arithmetic. It never fails.
pub fn to_amount<A: AmountSource>(value: A) -> f64 {
    match value.parse_amount() {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// =============================================================================
// Amount Input
// =============================================================================

/// An amount as received from a caller: either a JSON number or a string.
///
/// ## Example
/// ```rust
/// use comissio_core::money::{to_amount, AmountInput};
///
/// let from_number: AmountInput = serde_json::from_str("5000").unwrap();
/// let from_text: AmountInput = serde_json::from_str("\"5000.00\"").unwrap();
/// assert_eq!(to_amount(&from_number), to_amount(&from_text));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountSource for AmountInput {
    fn parse_amount(&self) -> Option<f64> {
        match self {
            AmountInput::Number(n) => n.parse_amount(),
            AmountInput::Text(s) => s.parse_amount(),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

// =============================================================================
// Display & Rounding
// =============================================================================

/// Formats a number with exactly two decimals (`150` → `"150.00"`).
///
/// Negative zero prints as `"0.00"`.
pub fn format_decimal(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{:.2}", value)
}

/// Formats an amount in Brazilian reais for rule strings and reports.
///
/// The decimal separator stays `.` so persisted rules remain stable across
/// locales.
pub fn format_brl(value: f64) -> String {
    format!("R$ {}", format_decimal(value))
}

/// Rounds an amount to cents, for report totals only.
pub fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
