//! Unit tests for the Money module
//!
//! Covers creation, arithmetic, rounding rules, rate application,
//! and currency handling edge cases.

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::DZD);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::DZD);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::DZD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_centimes_correctly() {
        let m = Money::from_minor(10050, Currency::DZD);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_default_currency_is_dzd() {
        assert_eq!(Currency::default(), Currency::DZD);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_addition_and_subtraction() {
        let a = Money::new(dec!(12000.00), Currency::DZD);
        let b = Money::new(dec!(2280.00), Currency::DZD);

        assert_eq!((a + b).amount(), dec!(14280.00));
        assert_eq!((a - b).amount(), dec!(9720.00));
    }

    #[test]
    fn test_checked_add_rejects_currency_mismatch() {
        let dzd = Money::new(dec!(1.00), Currency::DZD);
        let usd = Money::new(dec!(1.00), Currency::USD);

        assert!(matches!(
            dzd.checked_add(&usd),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_multiply_by_quantity() {
        let unit_price = Money::new(dec!(1000.00), Currency::DZD);
        assert_eq!(unit_price.multiply(dec!(2)).amount(), dec!(2000.00));
    }

    #[test]
    fn test_multiply_by_fractional_hours() {
        let hourly = Money::new(dec!(2000.00), Currency::DZD);
        assert_eq!(hourly.multiply(dec!(2.5)).amount(), dec!(5000.00));
    }

    #[test]
    fn test_divide_rejects_zero() {
        let m = Money::new(dec!(100.00), Currency::DZD);
        assert!(matches!(
            m.divide(dec!(0)),
            Err(MoneyError::DivisionByZero)
        ));
    }

    #[test]
    fn test_negation() {
        let m = Money::new(dec!(50.00), Currency::DZD);
        assert_eq!((-m).amount(), dec!(-50.00));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_half_up_rounds_midpoint_away_from_zero() {
        assert_eq!(
            Money::new(dec!(2.345), Currency::DZD).round_half_up().amount(),
            dec!(2.35)
        );
        assert_eq!(
            Money::new(dec!(2.355), Currency::DZD).round_half_up().amount(),
            dec!(2.36)
        );
    }

    #[test]
    fn test_bankers_rounds_midpoint_to_even() {
        assert_eq!(
            Money::new(dec!(2.345), Currency::DZD).round_bankers(2).amount(),
            dec!(2.34)
        );
        assert_eq!(
            Money::new(dec!(2.355), Currency::DZD).round_bankers(2).amount(),
            dec!(2.36)
        );
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_from_percentage() {
        let rate = Rate::from_percentage(dec!(19.00));
        assert_eq!(rate.as_decimal(), dec!(0.19));
        assert_eq!(rate.as_percentage(), dec!(19.00));
    }

    #[test]
    fn test_tax_on_standard_rate() {
        // Spec scenario: subtotal 12000 at 19% gives 2280 exactly.
        let rate = Rate::from_percentage(dec!(19.00));
        let subtotal = Money::new(dec!(12000.00), Currency::DZD);
        assert_eq!(rate.tax_on(&subtotal).amount(), dec!(2280.00));
    }

    #[test]
    fn test_tax_on_rounds_half_up() {
        // 33.33 * 9.5% = 3.16635, rounds up to 3.17
        let rate = Rate::from_percentage(dec!(9.5));
        let subtotal = Money::new(dec!(33.33), Currency::DZD);
        assert_eq!(rate.tax_on(&subtotal).amount(), dec!(3.17));
    }

    #[test]
    fn test_zero_rate_gives_zero_tax() {
        let rate = Rate::from_percentage(dec!(0));
        let subtotal = Money::new(dec!(5000.00), Currency::DZD);
        assert!(rate.tax_on(&subtotal).is_zero());
    }

    #[test]
    fn test_rate_display() {
        let rate = Rate::from_percentage(dec!(19.00));
        assert_eq!(rate.to_string(), "19.00%");
    }
}

mod display {
    use super::*;

    #[test]
    fn test_money_display_uses_symbol_and_minor_units() {
        let m = Money::new(dec!(14280), Currency::DZD);
        assert_eq!(m.to_string(), "DA 14280.00");
    }
}
