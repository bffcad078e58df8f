//! Property-based checks for invoice total derivation

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::Currency;
use domain_billing::InvoiceItem;
use test_utils::assertions::assert_invoice_consistent;
use test_utils::builders::TestInvoiceBuilder;
use test_utils::generators::{item_set_strategy, tax_percentage_strategy};

fn items_from(pricings: Vec<domain_billing::ItemPricing>) -> Vec<InvoiceItem> {
    pricings
        .into_iter()
        .enumerate()
        .map(|(i, pricing)| {
            InvoiceItem::new(format!("Service line {}", i + 1), pricing, None).unwrap()
        })
        .collect()
}

proptest! {
    // Totals stay consistent for any item set and tax rate
    #[test]
    fn totals_hold_for_any_item_set(
        pricings in item_set_strategy(Currency::DZD),
        tax in tax_percentage_strategy(),
    ) {
        let invoice = TestInvoiceBuilder::new()
            .with_tax_rate(tax)
            .with_items(items_from(pricings))
            .build();
        assert_invoice_consistent(&invoice);
        prop_assert_eq!(invoice.currency, Currency::DZD);
        prop_assert!(invoice.tax_amount.amount() >= Decimal::ZERO);
    }

    // Replacing the items re-derives the totals
    #[test]
    fn totals_hold_after_item_replacement(
        first in item_set_strategy(Currency::DZD),
        second in item_set_strategy(Currency::DZD),
    ) {
        let mut invoice = TestInvoiceBuilder::new()
            .with_items(items_from(first))
            .build();
        invoice.replace_items(items_from(second)).unwrap();
        assert_invoice_consistent(&invoice);
    }
}
