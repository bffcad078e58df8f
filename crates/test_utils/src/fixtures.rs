//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the practice
//! management system, designed to be consistent and predictable.

use chrono::NaiveDate;
use core_kernel::{CaseId, Currency, DateRange, InvoiceId, Money, OwnerId, Rate};
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard dinar amount
    pub fn dzd_1000() -> Money {
        Money::new(dec!(1000.00), Currency::DZD)
    }

    /// A typical hourly rate
    pub fn dzd_hourly_rate() -> Money {
        Money::new(dec!(2000.00), Currency::DZD)
    }

    /// A zero amount
    pub fn dzd_zero() -> Money {
        Money::zero(Currency::DZD)
    }

    /// A EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// The standard 19% tax rate
    pub fn standard_tax() -> Rate {
        Rate::from_percentage(dec!(19))
    }

    /// A zero tax rate for round-figure tests
    pub fn no_tax() -> Rate {
        Rate::new(rust_decimal::Decimal::ZERO)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard invoice date (Mar 1, 2024)
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// Standard due date (Mar 31, 2024)
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    /// A date safely past the standard due date
    pub fn after_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    /// First quarter of 2024
    pub fn q1_2024() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    /// The full year 2024
    pub fn year_2024() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A deterministic owner ID
    pub fn owner_id() -> OwnerId {
        OwnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// A second deterministic owner for scoping tests
    pub fn other_owner_id() -> OwnerId {
        OwnerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// A deterministic case ID
    pub fn case_id() -> CaseId {
        CaseId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// A deterministic invoice ID
    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard invoice number
    pub fn invoice_number() -> &'static str {
        "INV-2024-000001"
    }

    /// Standard case reference
    pub fn case_reference() -> &'static str {
        "CAS-2024-000001"
    }

    /// Standard client name
    pub fn client_name() -> &'static str {
        "Sarl Atlas Construction"
    }

    /// Standard client address
    pub fn client_address() -> &'static str {
        "12 Rue Didouche Mourad, Alger"
    }

    /// Test email address
    pub fn email() -> &'static str {
        "contact@atlas.example.dz"
    }

    /// Test phone number
    pub fn phone() -> &'static str {
        "+213-555-12-34-56"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_fixtures_currencies() {
        assert_eq!(MoneyFixtures::dzd_1000().currency(), Currency::DZD);
        assert_eq!(MoneyFixtures::eur_100().currency(), Currency::EUR);
    }

    #[test]
    fn test_temporal_fixtures_ordering() {
        assert!(TemporalFixtures::invoice_date() < TemporalFixtures::due_date());
        assert!(TemporalFixtures::due_date() < TemporalFixtures::after_due());
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::owner_id(), IdFixtures::owner_id());
        assert_ne!(IdFixtures::owner_id(), IdFixtures::other_owner_id());
    }
}
