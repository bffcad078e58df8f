//! Property-Based Test Generators
//!
//! Proptest strategies for generating random domain data that
//! maintains the billing invariants.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{CaseId, Currency, DateRange, Money, OwnerId, Rate};
use domain_billing::ItemPricing;

/// Strategy for generating supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::DZD),
        Just(Currency::EUR),
        Just(Currency::USD),
        Just(Currency::GBP),
        Just(Currency::CHF),
        Just(Currency::MAD),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for positive DZD amounts
pub fn dzd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::DZD))
}

/// Strategy for tax rates as percentages (0% to 30%)
pub fn tax_percentage_strategy() -> impl Strategy<Value = Rate> {
    (0u32..3000u32).prop_map(|n| Rate::from_percentage(Decimal::new(n as i64, 2)))
}

/// Strategy for small positive quantities (0.01 to 1000.00)
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for item pricing in a fixed currency
pub fn item_pricing_strategy(currency: Currency) -> impl Strategy<Value = ItemPricing> {
    let unit = (quantity_strategy(), positive_amount_minor_strategy()).prop_map(move |(q, p)| {
        ItemPricing::Unit {
            quantity: q,
            unit_price: Money::from_minor(p, currency),
        }
    });
    let hourly = (quantity_strategy(), positive_amount_minor_strategy()).prop_map(move |(h, r)| {
        ItemPricing::Hourly {
            hours_worked: h,
            hourly_rate: Money::from_minor(r, currency),
        }
    });
    prop_oneof![unit, hourly]
}

/// Strategy for non-empty item sets in a fixed currency
pub fn item_set_strategy(currency: Currency) -> impl Strategy<Value = Vec<ItemPricing>> {
    proptest::collection::vec(item_pricing_strategy(currency), 1..8)
}

/// Strategy for dates within 2024
pub fn date_2024_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(days)
    })
}

/// Strategy for valid date ranges within 2024-2025
pub fn date_range_strategy() -> impl Strategy<Value = DateRange> {
    (0i64..365i64, 0i64..365i64).prop_map(|(start_days, length)| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(start_days);
        DateRange::new(start, start + Duration::days(length)).unwrap()
    })
}

/// Strategy for generating owner identities
pub fn owner_id_strategy() -> impl Strategy<Value = OwnerId> {
    any::<[u8; 16]>().prop_map(|bytes| OwnerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating case identities
pub fn case_id_strategy() -> impl Strategy<Value = CaseId> {
    any::<[u8; 16]>().prop_map(|bytes| CaseId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn positive_money_is_always_positive(money in positive_money_strategy()) {
            prop_assert!(money.amount() > Decimal::ZERO);
        }

        #[test]
        fn tax_rate_stays_in_bounds(rate in tax_percentage_strategy()) {
            prop_assert!(rate.as_decimal() >= Decimal::ZERO);
            prop_assert!(rate.as_percentage() < Decimal::from(30));
        }

        #[test]
        fn date_range_end_not_before_start(range in date_range_strategy()) {
            prop_assert!(range.start <= range.end);
        }

        // A tiny quantity times a tiny price can round down to zero
        #[test]
        fn item_pricing_total_is_never_negative(pricing in item_pricing_strategy(Currency::DZD)) {
            prop_assert!(!pricing.total().is_negative());
        }
    }
}
