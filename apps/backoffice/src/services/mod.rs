//! Backoffice service implementations.
//!
//! Each service holds the shared [`AppState`](crate::AppState) and exposes
//! async methods returning [`ApiResult`](crate::ApiResult).

pub mod org_service;
pub mod report_service;
pub mod sale_service;

#[cfg(test)]
pub(crate) mod testing;

pub use org_service::OrgService;
pub use report_service::ReportService;
pub use sale_service::SaleService;

use comissio_core::{AmountInput, AmountSource, ValidationError};

/// Parses an amount received from a caller.
///
/// Unlike the engine's lenient coercion, malformed or non-finite input is
/// rejected here before anything is stored.
pub(crate) fn parse_amount(field: &str, input: &AmountInput) -> Result<f64, ValidationError> {
    match input.parse_amount() {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a number".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("value", &AmountInput::from(12.5)).unwrap(), 12.5);
        assert_eq!(parse_amount("value", &AmountInput::from(" 5000.00 ")).unwrap(), 5000.0);
        assert!(parse_amount("value", &AmountInput::from("abc")).is_err());
        assert!(parse_amount("value", &AmountInput::from(f64::NAN)).is_err());
    }
}
