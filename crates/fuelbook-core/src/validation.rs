//! # Validation Module
//!
//! Input validation for every mutator. Runs before a transaction is opened,
//! so a rejected input never touches the database.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor                                               │
//! │  └── Type validation (JSON deserialization, UUID path ids)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field rules (amounts, lengths, reading consistency)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (branch_id, day), UNIQUE (nozzle_id, day)                  │
//! │  └── CHECK current_level >= 0, quantity >= 0                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fuelbook_core::validation::{validate_amount, validate_uuid};
//! use fuelbook_core::Money;
//!
//! assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
//! assert!(validate_amount("amount", Money::from_paise(-1)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    BankDepositInput, CreditInput, ExpenseInput, MeterReadingInput, PaymentInput, SaleInput,
};
use crate::volume::Volume;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text field accepted (descriptions, notes, references).
pub const MAX_TEXT_LEN: usize = 500;

/// Longest fuel type name accepted.
pub const MAX_FUEL_TYPE_LEN: usize = 50;

/// Largest single money amount accepted, in paise (₹1,000 crore).
///
/// Sums of a day's or a branch's rows stay far inside `i64` at this ceiling.
pub const MAX_AMOUNT_PAISE: i64 = 1_000_000_000_000;

/// Largest meter reading or volume accepted, in millilitres (one billion
/// litres, well past any totalizer).
pub const MAX_READING_ML: i64 = 1_000_000_000_000;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use fuelbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    validate_uuid_field("id", id)
}

/// Same as [`validate_uuid`] but names the offending field.
pub fn validate_uuid_field(field: &str, id: &str) -> ValidationResult<()> {
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

/// A money field that may be zero but not negative, up to
/// [`MAX_AMOUNT_PAISE`].
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_amount_ceiling(field, amount)
}

/// A money field that must be strictly positive.
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    validate_amount_ceiling(field, amount)
}

fn validate_amount_ceiling(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.paise() > MAX_AMOUNT_PAISE {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT_PAISE,
        });
    }
    Ok(())
}

fn validate_volume(field: &str, volume: Volume) -> ValidationResult<()> {
    if volume.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if volume.ml() > MAX_READING_ML {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_READING_ML,
        });
    }
    Ok(())
}

/// Optional free text, bounded in length.
pub fn validate_text(field: &str, text: Option<&str>) -> ValidationResult<()> {
    if let Some(text) = text {
        if text.chars().count() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: field.to_string(),
                max: MAX_TEXT_LEN,
            });
        }
    }
    Ok(())
}

/// Validates a fuel type name such as `petrol` or `diesel`.
pub fn validate_fuel_type(fuel_type: &str) -> ValidationResult<()> {
    let fuel_type = fuel_type.trim();

    if fuel_type.is_empty() {
        return Err(ValidationError::Required {
            field: "fuelType".to_string(),
        });
    }

    if fuel_type.len() > MAX_FUEL_TYPE_LEN {
        return Err(ValidationError::TooLong {
            field: "fuelType".to_string(),
            max: MAX_FUEL_TYPE_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

impl SaleInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_amount("cashPayment", self.cash_payment)?;
        validate_amount("atmPayment", self.atm_payment)?;
        validate_amount("paytmPayment", self.paytm_payment)?;
        validate_amount("fleetPayment", self.fleet_payment)?;
        validate_amount("rate", self.rate)?;

        for total in &self.fuel_totals {
            validate_fuel_type(&total.fuel_type)?;
            validate_volume("fuelTotals.volume", total.volume)?;
        }

        Ok(())
    }
}

impl ExpenseInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_positive_amount("amount", self.amount)?;
        if let Some(bank_id) = &self.bank_id {
            validate_uuid_field("bankId", bank_id)?;
        }
        validate_text("description", self.description.as_deref())
    }
}

impl PaymentInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid_field("counterpartyId", &self.counterparty_id)?;
        validate_positive_amount("amount", self.amount)?;
        validate_text("note", self.note.as_deref())
    }
}

impl BankDepositInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid_field("bankId", &self.bank_id)?;
        validate_positive_amount("amount", self.amount)?;
        validate_text("reference", self.reference.as_deref())
    }
}

impl CreditInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid_field("customerId", &self.customer_id)?;
        validate_positive_amount("amount", self.amount)?;
        validate_text("description", self.description.as_deref())
    }
}

impl MeterReadingInput {
    /// Checks one line on its own. Cross-line and stock rules run in the
    /// reservation engine.
    ///
    /// ## Rules
    /// ```text
    /// MAX_READING_ML >= closing_reading >= opening_reading >= 0
    /// sale            == closing_reading - opening_reading
    /// total_amount    >= 0
    /// fuel_rate       >= 0   (when present)
    /// ```
    pub fn validate(&self) -> ValidationResult<()> {
        validate_uuid_field("nozzleId", &self.nozzle_id)?;
        validate_fuel_type(&self.fuel_type)?;
        validate_volume("openingReading", self.opening_reading)?;
        validate_volume("closingReading", self.closing_reading)?;

        if self.closing_reading < self.opening_reading {
            return Err(ValidationError::Inconsistent {
                field: "closingReading".to_string(),
                reason: format!(
                    "closing reading {} is below opening reading {}",
                    self.closing_reading, self.opening_reading
                ),
            });
        }

        if self.sale != self.difference() {
            return Err(ValidationError::Inconsistent {
                field: "sale".to_string(),
                reason: format!(
                    "sale {} does not match reading difference {}",
                    self.sale,
                    self.difference()
                ),
            });
        }

        validate_amount("totalAmount", self.total_amount)?;
        if let Some(rate) = self.fuel_rate {
            validate_amount("fuelRate", rate)?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CounterpartyKind, FuelTotal};
    use chrono::{TimeZone, Utc};

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn reading(opening: i64, closing: i64, sale: i64) -> MeterReadingInput {
        MeterReadingInput {
            nozzle_id: ID.to_string(),
            fuel_type: "petrol".to_string(),
            sale: Volume::from_ml(sale),
            fuel_rate: Some(Money::from_paise(10_250)),
            total_amount: Money::from_paise(0),
            opening_reading: Volume::from_ml(opening),
            closing_reading: Volume::from_ml(closing),
            date: Utc.with_ymd_and_hms(2024, 1, 5, 6, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid(ID).is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_amounts() {
        assert!(validate_amount("x", Money::zero()).is_ok());
        assert!(validate_amount("x", Money::from_paise(-1)).is_err());
        assert!(validate_positive_amount("x", Money::zero()).is_err());
        assert!(validate_positive_amount("x", Money::from_paise(1)).is_ok());
    }

    #[test]
    fn test_sale_input() {
        let mut input = SaleInput {
            date: Utc.with_ymd_and_hms(2024, 1, 5, 6, 0, 0).unwrap(),
            cash_payment: Money::from_paise(100),
            atm_payment: Money::zero(),
            paytm_payment: Money::zero(),
            fleet_payment: Money::zero(),
            fuel_totals: vec![FuelTotal {
                fuel_type: "diesel".into(),
                volume: Volume::from_litres(2),
            }],
            rate: Money::from_paise(100),
        };
        assert!(input.validate().is_ok());

        input.fuel_totals[0].fuel_type = "  ".into();
        assert!(input.validate().is_err());

        input.fuel_totals.clear();
        input.atm_payment = Money::from_paise(-5);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_expense_input() {
        let mut input = ExpenseInput {
            date: Utc.with_ymd_and_hms(2024, 1, 5, 6, 0, 0).unwrap(),
            amount: Money::from_paise(200),
            bank_id: Some(ID.into()),
            description: Some("generator diesel".into()),
        };
        assert!(input.validate().is_ok());

        input.bank_id = Some("bank".into());
        assert!(input.validate().is_err());

        input.bank_id = None;
        input.description = Some("x".repeat(MAX_TEXT_LEN + 1));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_payment_input() {
        let input = PaymentInput {
            counterparty_id: ID.into(),
            counterparty_kind: CounterpartyKind::Customer,
            amount: Money::zero(),
            paid_on: Utc.with_ymd_and_hms(2024, 1, 5, 6, 0, 0).unwrap(),
            note: None,
        };
        assert!(matches!(
            input.validate(),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_meter_reading_rules() {
        assert!(reading(1_000, 1_500, 500).validate().is_ok());
        assert!(reading(1_000, 1_000, 0).validate().is_ok());

        // Closing below opening
        assert!(reading(1_500, 1_000, -500).validate().is_err());
        // Sale disagrees with the readings
        assert!(reading(1_000, 1_500, 400).validate().is_err());

        let mut negative_rate = reading(1_000, 1_500, 500);
        negative_rate.fuel_rate = Some(Money::from_paise(-1));
        assert!(negative_rate.validate().is_err());

        let mut wrong_nozzle = reading(1_000, 1_500, 500);
        wrong_nozzle.nozzle_id = "nozzle-1".into();
        assert!(wrong_nozzle.validate().is_err());
    }

    #[test]
    fn test_upper_bounds() {
        let max = Money::from_paise(MAX_AMOUNT_PAISE);
        assert!(validate_amount("x", max).is_ok());
        assert!(validate_positive_amount("x", max).is_ok());
        assert!(matches!(
            validate_amount("rate", Money::from_paise(i64::MAX)),
            Err(ValidationError::TooLarge { ref field, max })
                if field == "rate" && max == MAX_AMOUNT_PAISE
        ));
        assert!(validate_positive_amount("x", Money::from_paise(MAX_AMOUNT_PAISE + 1)).is_err());

        assert!(reading(0, MAX_READING_ML, MAX_READING_ML).validate().is_ok());
        assert!(matches!(
            reading(0, i64::MAX, i64::MAX).validate(),
            Err(ValidationError::TooLarge { ref field, .. }) if field == "closingReading"
        ));

        let mut huge_total = reading(1_000, 1_500, 500);
        huge_total.total_amount = Money::from_paise(i64::MAX);
        assert!(huge_total.validate().is_err());
    }
}
