//! Test Data Builders
//!
//! Builder patterns for constructing domain aggregates with sensible
//! defaults, so tests specify only the fields they care about.

use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CaseId, Currency, Money, OwnerId, Rate};
use domain_billing::{ClientSnapshot, Invoice, InvoiceItem, ItemPricing};
use domain_expense::{Expense, ExpenseCategory, NewExpense};

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// A random but plausible client snapshot
pub fn random_client() -> ClientSnapshot {
    ClientSnapshot {
        name: CompanyName().fake(),
        address: StringFixtures::client_address().to_string(),
        email: Some(StringFixtures::email().to_string()),
        phone: None,
    }
}

/// Builder for draft invoices
pub struct TestInvoiceBuilder {
    owner: OwnerId,
    invoice_number: String,
    invoice_date: NaiveDate,
    due_date: NaiveDate,
    case_id: Option<CaseId>,
    client: ClientSnapshot,
    currency: Currency,
    tax_rate: Rate,
    items: Vec<InvoiceItem>,
}

impl Default for TestInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInvoiceBuilder {
    /// Creates a builder with one unit item and the standard 19% tax
    pub fn new() -> Self {
        Self {
            owner: IdFixtures::owner_id(),
            invoice_number: StringFixtures::invoice_number().to_string(),
            invoice_date: TemporalFixtures::invoice_date(),
            due_date: TemporalFixtures::due_date(),
            case_id: None,
            client: ClientSnapshot {
                name: StringFixtures::client_name().to_string(),
                address: StringFixtures::client_address().to_string(),
                email: None,
                phone: None,
            },
            currency: Currency::DZD,
            tax_rate: MoneyFixtures::standard_tax(),
            items: vec![InvoiceItem::new(
                "Legal services".to_string(),
                ItemPricing::Unit {
                    quantity: Decimal::ONE,
                    unit_price: MoneyFixtures::dzd_1000(),
                },
                None,
            )
            .unwrap()],
        }
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_invoice_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    pub fn with_dates(mut self, invoice_date: NaiveDate, due_date: NaiveDate) -> Self {
        self.invoice_date = invoice_date;
        self.due_date = due_date;
        self
    }

    pub fn with_case(mut self, case_id: CaseId) -> Self {
        self.case_id = Some(case_id);
        self
    }

    pub fn with_client(mut self, client: ClientSnapshot) -> Self {
        self.client = client;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: Rate) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Replaces the default items
    pub fn with_items(mut self, items: Vec<InvoiceItem>) -> Self {
        self.items = items;
        self
    }

    /// Adds a unit-priced item
    pub fn with_unit_item(mut self, quantity: Decimal, unit_price: Decimal) -> Self {
        let item = InvoiceItem::new(
            "Legal services".to_string(),
            ItemPricing::Unit {
                quantity,
                unit_price: Money::new(unit_price, self.currency),
            },
            None,
        )
        .unwrap();
        self.items.push(item);
        self
    }

    /// Adds an hourly item
    pub fn with_hourly_item(mut self, hours: Decimal, rate: Decimal) -> Self {
        let item = InvoiceItem::new(
            "Consultation".to_string(),
            ItemPricing::Hourly {
                hours_worked: hours,
                hourly_rate: Money::new(rate, self.currency),
            },
            None,
        )
        .unwrap();
        self.items.push(item);
        self
    }

    /// Builds a draft invoice with derived totals
    pub fn build(self) -> Invoice {
        Invoice::create(
            self.owner,
            self.invoice_number,
            self.invoice_date,
            self.due_date,
            self.case_id,
            self.client,
            self.currency,
            self.tax_rate,
            self.items,
        )
        .unwrap()
    }
}

/// Builder for expenses
pub struct TestExpenseBuilder {
    owner: OwnerId,
    case_id: CaseId,
    category: ExpenseCategory,
    description: String,
    amount: Money,
    expense_date: NaiveDate,
    is_reimbursable: Option<bool>,
}

impl Default for TestExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestExpenseBuilder {
    pub fn new() -> Self {
        Self {
            owner: IdFixtures::owner_id(),
            case_id: IdFixtures::case_id(),
            category: ExpenseCategory::CourtFees,
            description: "Tribunal filing fees".to_string(),
            amount: Money::new(dec!(1500.00), Currency::DZD),
            expense_date: TemporalFixtures::invoice_date(),
            is_reimbursable: None,
        }
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_case(mut self, case_id: CaseId) -> Self {
        self.case_id = case_id;
        self
    }

    pub fn with_category(mut self, category: ExpenseCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_expense_date(mut self, date: NaiveDate) -> Self {
        self.expense_date = date;
        self
    }

    pub fn non_reimbursable(mut self) -> Self {
        self.is_reimbursable = Some(false);
        self
    }

    pub fn build(self) -> Expense {
        Expense::create(
            self.owner,
            NewExpense {
                case_id: self.case_id,
                category: self.category,
                description: self.description,
                amount: self.amount,
                expense_date: self.expense_date,
                receipt_number: None,
                is_reimbursable: self.is_reimbursable,
                notes: None,
            },
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_invoice_has_derived_totals() {
        let invoice = TestInvoiceBuilder::new().build();
        assert_eq!(invoice.subtotal.amount(), dec!(1000.00));
        assert_eq!(invoice.tax_amount.amount(), dec!(190.00));
        assert_eq!(invoice.total_amount.amount(), dec!(1190.00));
    }

    #[test]
    fn test_builder_items_accumulate() {
        let invoice = TestInvoiceBuilder::new()
            .with_items(vec![])
            .with_unit_item(dec!(2), dec!(1000))
            .with_hourly_item(dec!(5), dec!(2000))
            .build();
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.subtotal.amount(), dec!(12000));
    }

    #[test]
    fn test_expense_builder_defaults() {
        let expense = TestExpenseBuilder::new().build();
        assert!(expense.is_reimbursable);
        assert!(!expense.is_reimbursed);
    }
}
