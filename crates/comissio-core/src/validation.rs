//! # Validation Module
//!
//! Input validation for org-chart records, seller policies and sale items.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Backoffice service                                           │
//! │  ├── Deserialization (AmountInput accepts numbers and strings)         │
//! │  └── THIS MODULE: names, CPF, policy ranges                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE (sellers.employee_id)                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation guards what gets written. The commission engine itself never
//! rejects a stored policy: whatever is persisted is coerced by
//! [`crate::money::to_amount`].
//!
//! ## Usage
//! ```rust
//! use comissio_core::validation::{validate_cpf, validate_seller_policy};
//!
//! assert_eq!(validate_cpf("529.982.247-25").unwrap(), "52998224725");
//! assert!(validate_seller_policy(Some(50.0), Some(3.0)).is_ok());
//! assert!(validate_seller_policy(Some(-1.0), None).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_COMMISSION_PERCENTAGE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of entity names (positions, employees, companies).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a sale item description.
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use comissio_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Gerente ").unwrap(), "Gerente");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    required_text(field, name, MAX_NAME_LENGTH)
}

/// Validates a sale item description and returns it trimmed.
pub fn validate_description(description: &str) -> ValidationResult<String> {
    required_text("description", description, MAX_DESCRIPTION_LENGTH)
}

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// CPF
// =============================================================================

/// Validates a Brazilian CPF and returns its 11 digits.
///
/// ## Check Digits
/// ```text
///   5 2 9 9 8 2 2 4 7 │ 2 5
///   └── base (9) ─────┘ │ └ 2nd digit: weights 11..2 over first 10
///                       └── 1st digit: weights 10..2 over first 9
///
///   digit = 11 - (sum % 11);  digit >= 10 → 0
/// ```
/// The `.` and `-` separators and whitespace are ignored; any other
/// character is rejected. Sequences of one repeated digit
/// (`111.111.111-11`) pass the arithmetic but are rejected.
pub fn validate_cpf(cpf: &str) -> ValidationResult<String> {
    if cpf
        .chars()
        .any(|c| !(c.is_ascii_digit() || c == '.' || c == '-' || c.is_whitespace()))
    {
        return Err(invalid_cpf("unexpected character"));
    }

    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "document".to_string(),
        });
    }

    if digits.len() != 11 {
        return Err(invalid_cpf("must contain 11 digits"));
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return Err(invalid_cpf("repeated digits"));
    }

    if cpf_check_digit(&digits[..9]) != digits[9] || cpf_check_digit(&digits[..10]) != digits[10] {
        return Err(invalid_cpf("check digits do not match"));
    }

    Ok(digits.iter().filter_map(|&d| char::from_digit(d, 10)).collect())
}

fn cpf_check_digit(base: &[u32]) -> u32 {
    let weight_start = base.len() as u32 + 1;
    let sum: u32 = base
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();

    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}

fn invalid_cpf(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "document".to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Policy Validators
// =============================================================================

/// Validates a commission percentage (0 to 100 inclusive).
pub fn validate_percentage(value: f64) -> ValidationResult<()> {
    if !value.is_finite() || !(0.0..=MAX_COMMISSION_PERCENTAGE).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: "percentage_value".to_string(),
            min: 0.0,
            max: MAX_COMMISSION_PERCENTAGE,
        });
    }

    Ok(())
}

/// Validates a fixed per-sale commission amount.
pub fn validate_fixed_value(value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "fixed_value".to_string(),
            reason: "must be a number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "fixed_value".to_string(),
        });
    }

    Ok(())
}

/// Validates a seller policy. Absent components are allowed and count as zero.
pub fn validate_seller_policy(fixed: Option<f64>, percentage: Option<f64>) -> ValidationResult<()> {
    if let Some(fixed) = fixed {
        validate_fixed_value(fixed)?;
    }
    if let Some(percentage) = percentage {
        validate_percentage(percentage)?;
    }
    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates that a reference id is present and is a UUID.
///
/// ## Example
/// ```rust
/// use comissio_core::validation::validate_id;
///
/// assert!(validate_id("seller_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("seller_id", "").is_err());
/// ```
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "Vendedor").unwrap(), "Vendedor");
        assert_eq!(validate_name("name", "  Diretor  ").unwrap(), "Diretor");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
        // Length counts characters, not bytes.
        assert!(validate_name("name", &"ç".repeat(MAX_NAME_LENGTH)).is_ok());
    }

    #[test]
    fn test_validate_description() {
        assert!(validate_description("Onix 1.0 2024").is_ok());
        assert!(matches!(
            validate_description("  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_cpf() {
        assert_eq!(validate_cpf("529.982.247-25").unwrap(), "52998224725");
        assert_eq!(validate_cpf("52998224725").unwrap(), "52998224725");
        assert_eq!(validate_cpf("111.444.777-35").unwrap(), "11144477735");

        assert!(validate_cpf("529.982.247-26").is_err());
        assert!(validate_cpf("111.111.111-11").is_err());
        assert!(validate_cpf("1234567890").is_err());
        assert!(matches!(validate_cpf(""), Err(ValidationError::Required { .. })));
        assert!(matches!(validate_cpf(" . - "), Err(ValidationError::Required { .. })));
        assert_eq!(validate_cpf(" 529 982 247 25 ").unwrap(), "52998224725");
    }

    #[test]
    fn test_validate_cpf_rejects_stray_characters() {
        for cpf in ["529abc982247xyz25", "529/982/247-25", "529.982.247-25x", "５２９.982.247-25"] {
            assert!(
                matches!(
                    validate_cpf(cpf),
                    Err(ValidationError::InvalidFormat { ref reason, .. }) if reason == "unexpected character"
                ),
                "{cpf}"
            );
        }
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(3.5).is_ok());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(100.01).is_err());
        assert!(validate_percentage(-0.5).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_fixed_value() {
        assert!(validate_fixed_value(0.0).is_ok());
        assert!(validate_fixed_value(150.0).is_ok());
        assert!(matches!(
            validate_fixed_value(-1.0),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
        assert!(validate_fixed_value(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_seller_policy() {
        assert!(validate_seller_policy(None, None).is_ok());
        assert!(validate_seller_policy(Some(100.0), None).is_ok());
        assert!(validate_seller_policy(None, Some(101.0)).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("id", "not-a-uuid").is_err());
    }
}
