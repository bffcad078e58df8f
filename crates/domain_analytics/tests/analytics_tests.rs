//! Comprehensive tests for domain_analytics

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CaseId, Currency, DateRange, Money, OwnerId, Rate};
use domain_analytics::RevenueAggregator;
use domain_billing::invoice::{ClientSnapshot, Invoice, InvoiceItem, ItemPricing};
use domain_billing::payment::{PaymentDetails, PaymentMethod};
use domain_billing::ports::mock::{MockCaseDirectory, MockInvoiceStore};
use domain_billing::ports::{CaseSummary, InvoiceStore};
use domain_expense::expense::{Expense, ExpenseCategory, NewExpense};
use domain_expense::ports::mock::MockExpenseStore;
use domain_expense::ports::ExpenseStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client() -> ClientSnapshot {
    ClientSnapshot {
        name: "SARL Numidia Transport".to_string(),
        address: "Zone Industrielle, Rouiba".to_string(),
        email: None,
        phone: None,
    }
}

fn unit_item(amount: Decimal) -> InvoiceItem {
    InvoiceItem::new(
        "Legal services",
        ItemPricing::Unit {
            quantity: dec!(1),
            unit_price: Money::new(amount, Currency::DZD),
        },
        None,
    )
    .unwrap()
}

fn hourly_item(hours: Decimal, rate: Decimal) -> InvoiceItem {
    InvoiceItem::new(
        "Representation",
        ItemPricing::Hourly {
            hours_worked: hours,
            hourly_rate: Money::new(rate, Currency::DZD),
        },
        None,
    )
    .unwrap()
}

/// Builds an invoice with a zero tax rate so scenario figures stay round
fn invoice(
    owner: OwnerId,
    number: &str,
    on: NaiveDate,
    case_id: Option<CaseId>,
    items: Vec<InvoiceItem>,
) -> Invoice {
    Invoice::create(
        owner,
        number.to_string(),
        on,
        on + chrono::Days::new(30),
        case_id,
        client(),
        Currency::DZD,
        Rate::from_percentage(dec!(0)),
        items,
    )
    .unwrap()
}

fn pay(invoice: &mut Invoice, amount: Decimal, on: NaiveDate) {
    invoice
        .apply_payment(
            PaymentDetails {
                amount: Money::new(amount, Currency::DZD),
                payment_date: on,
                method: PaymentMethod::BankTransfer,
                reference: None,
                notes: None,
            },
            invoice.owner,
        )
        .unwrap();
}

struct Fixture {
    invoices: Arc<MockInvoiceStore>,
    expenses: Arc<MockExpenseStore>,
    snapshots: Arc<domain_analytics::ports::mock::MockSnapshotStore>,
    aggregator: RevenueAggregator,
}

fn fixture_with_cases(cases: MockCaseDirectory) -> Fixture {
    let invoices = Arc::new(MockInvoiceStore::new());
    let expenses = Arc::new(MockExpenseStore::new());
    let snapshots = Arc::new(domain_analytics::ports::mock::MockSnapshotStore::new());
    let aggregator = RevenueAggregator::new(
        invoices.clone(),
        expenses.clone(),
        Arc::new(cases),
        snapshots.clone(),
    );
    Fixture {
        invoices,
        expenses,
        snapshots,
        aggregator,
    }
}

fn fixture() -> Fixture {
    fixture_with_cases(MockCaseDirectory::new())
}

async fn seed_expense(fixture: &Fixture, owner: OwnerId, amount: Decimal, on: NaiveDate) {
    let expense = Expense::create(
        owner,
        NewExpense {
            case_id: CaseId::new(),
            category: ExpenseCategory::CourtFees,
            description: "Tribunal fees".to_string(),
            amount: Money::new(amount, Currency::DZD),
            expense_date: on,
            receipt_number: None,
            is_reimbursable: None,
            notes: None,
        },
    )
    .unwrap();
    fixture.expenses.insert(&expense).await.unwrap();
}

// ============================================================================
// Period metrics
// ============================================================================

mod metrics_tests {
    use super::*;

    /// One paid 10000 invoice, one 5000 invoice with 2000 paid, and 3000
    /// of expenses: invoiced 15000, paid 10000, outstanding 3000, net 7000.
    #[tokio::test]
    async fn test_period_rollup() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let mut paid = invoice(owner, "INV-1", date(2024, 2, 5), None, vec![unit_item(dec!(10000))]);
        paid.send().unwrap();
        pay(&mut paid, dec!(10000), date(2024, 2, 20));
        fixture.invoices.insert(&paid).await.unwrap();

        let mut partial =
            invoice(owner, "INV-2", date(2024, 2, 12), None, vec![unit_item(dec!(5000))]);
        partial.send().unwrap();
        pay(&mut partial, dec!(2000), date(2024, 2, 25));
        fixture.invoices.insert(&partial).await.unwrap();

        seed_expense(&fixture, owner, dec!(3000), date(2024, 2, 15)).await;

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.total_invoiced, dec!(15000));
        assert_eq!(metrics.total_paid, dec!(10000));
        assert_eq!(metrics.total_expenses, dec!(3000));
        assert_eq!(metrics.outstanding, dec!(3000));
        assert_eq!(metrics.net_profit, dec!(7000));
        assert_eq!(metrics.invoices.total, 2);
        assert_eq!(metrics.invoices.paid, 1);
    }

    #[tokio::test]
    async fn test_invoices_outside_period_excluded() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let inside = invoice(owner, "INV-1", date(2024, 2, 5), None, vec![unit_item(dec!(100))]);
        let outside = invoice(owner, "INV-2", date(2024, 3, 5), None, vec![unit_item(dec!(900))]);
        fixture.invoices.insert(&inside).await.unwrap();
        fixture.invoices.insert(&outside).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.total_invoiced, dec!(100));
        assert_eq!(metrics.invoices.total, 1);
    }

    #[tokio::test]
    async fn test_other_owner_invisible() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let foreign = invoice(
            OwnerId::new(),
            "INV-1",
            date(2024, 2, 5),
            None,
            vec![unit_item(dec!(5000))],
        );
        fixture.invoices.insert(&foreign).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.total_invoiced, Decimal::ZERO);
        assert_eq!(metrics.invoices.total, 0);
    }

    #[tokio::test]
    async fn test_average_case_value_guards_division() {
        let fixture = fixture();
        let owner = OwnerId::new();

        // No case-attributed invoices at all
        let uncased = invoice(owner, "INV-1", date(2024, 2, 5), None, vec![unit_item(dec!(8000))]);
        fixture.invoices.insert(&uncased).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.case_count, 0);
        assert_eq!(metrics.average_case_value, dec!(8000));
    }

    #[tokio::test]
    async fn test_distinct_case_count() {
        let fixture = fixture();
        let owner = OwnerId::new();
        let case_a = CaseId::new();
        let case_b = CaseId::new();

        for (number, case_id, amount) in [
            ("INV-1", Some(case_a), dec!(1000)),
            ("INV-2", Some(case_a), dec!(2000)),
            ("INV-3", Some(case_b), dec!(3000)),
        ] {
            let inv = invoice(owner, number, date(2024, 2, 10), case_id, vec![unit_item(amount)]);
            fixture.invoices.insert(&inv).await.unwrap();
        }

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.case_count, 2);
        assert_eq!(metrics.average_case_value, dec!(3000));
    }

    #[tokio::test]
    async fn test_overdue_count_derived_from_as_of() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let mut sent = invoice(owner, "INV-1", date(2024, 2, 1), None, vec![unit_item(dec!(100))]);
        sent.send().unwrap();
        fixture.invoices.insert(&sent).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();

        // Due 2024-03-02; not yet overdue on the due date itself
        let before = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 2))
            .await
            .unwrap();
        assert_eq!(before.invoices.overdue, 0);

        let after = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 3))
            .await
            .unwrap();
        assert_eq!(after.invoices.overdue, 1);
    }
}

// ============================================================================
// Monthly trend
// ============================================================================

mod trend_tests {
    use super::*;

    #[tokio::test]
    async fn test_trend_spans_calendar_months_in_order() {
        let fixture = fixture();
        let owner = OwnerId::new();

        for (number, on, amount) in [
            ("INV-1", date(2024, 1, 20), dec!(1000)),
            ("INV-2", date(2024, 2, 3), dec!(2000)),
            ("INV-3", date(2024, 2, 28), dec!(500)),
        ] {
            let inv = invoice(owner, number, on, None, vec![unit_item(amount)]);
            fixture.invoices.insert(&inv).await.unwrap();
        }

        let period = DateRange::new(date(2024, 1, 15), date(2024, 3, 10)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 15))
            .await
            .unwrap();

        let months: Vec<_> = metrics
            .monthly_trend
            .iter()
            .map(|point| point.month.as_str())
            .collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);

        assert_eq!(metrics.monthly_trend[0].invoiced, dec!(1000));
        assert_eq!(metrics.monthly_trend[1].invoiced, dec!(2500));
        assert_eq!(metrics.monthly_trend[2].invoiced, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_trend_counts_cases_opened_per_month() {
        let owner = OwnerId::new();
        let directory = MockCaseDirectory::with_cases(vec![
            CaseSummary {
                id: CaseId::new(),
                reference: "CASE-1".to_string(),
                title: "Numidia v. Douanes".to_string(),
                owner,
                open_date: date(2024, 1, 20),
                close_date: None,
            },
            CaseSummary {
                id: CaseId::new(),
                reference: "CASE-2".to_string(),
                title: "Succession Boudjema".to_string(),
                owner,
                open_date: date(2024, 2, 10),
                close_date: None,
            },
        ])
        .await;
        let fixture = fixture_with_cases(directory);

        let period = DateRange::new(date(2024, 1, 1), date(2024, 2, 29)).unwrap();
        let metrics = fixture
            .aggregator
            .compute_analytics(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(metrics.monthly_trend.len(), 2);
        assert_eq!(metrics.monthly_trend[0].cases_opened, 1);
        assert_eq!(metrics.monthly_trend[1].cases_opened, 1);
    }
}

// ============================================================================
// Revenue reports
// ============================================================================

mod report_tests {
    use super::*;

    #[tokio::test]
    async fn test_report_is_idempotent() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let inv = invoice(owner, "INV-1", date(2024, 2, 5), None, vec![unit_item(dec!(4000))]);
        fixture.invoices.insert(&inv).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let first = fixture
            .aggregator
            .generate_revenue_report(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        // Data changes between the two generations
        let late = invoice(owner, "INV-2", date(2024, 2, 20), None, vec![unit_item(dec!(1000))]);
        fixture.invoices.insert(&late).await.unwrap();

        let second = fixture
            .aggregator
            .generate_revenue_report(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(fixture.snapshots.len().await, 1);
        assert_eq!(second.id, first.id);
        assert_eq!(first.total_invoiced, dec!(4000));
        assert_eq!(second.total_invoiced, dec!(5000));
    }

    #[tokio::test]
    async fn test_report_includes_case_and_hour_metrics() {
        let owner = OwnerId::new();
        let directory = MockCaseDirectory::with_cases(vec![
            CaseSummary {
                id: CaseId::new(),
                reference: "CASE-1".to_string(),
                title: "Opened and closed in period".to_string(),
                owner,
                open_date: date(2024, 2, 3),
                close_date: Some(date(2024, 2, 20)),
            },
            CaseSummary {
                id: CaseId::new(),
                reference: "CASE-2".to_string(),
                title: "Still active".to_string(),
                owner,
                open_date: date(2024, 1, 10),
                close_date: None,
            },
        ])
        .await;
        let fixture = fixture_with_cases(directory);

        let mut paid = invoice(
            owner,
            "INV-1",
            date(2024, 2, 5),
            None,
            vec![hourly_item(dec!(10), dec!(2000))],
        );
        paid.send().unwrap();
        pay(&mut paid, dec!(20000), date(2024, 2, 25));
        fixture.invoices.insert(&paid).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let report = fixture
            .aggregator
            .generate_revenue_report(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(report.cases_opened, 1);
        assert_eq!(report.cases_closed, 1);
        assert_eq!(report.active_cases, 1);
        assert_eq!(report.total_billable_hours, dec!(10));
        assert_eq!(report.average_hourly_rate, dec!(2000));
    }

    #[tokio::test]
    async fn test_hourly_rate_zero_without_hours() {
        let fixture = fixture();
        let owner = OwnerId::new();

        let mut paid = invoice(owner, "INV-1", date(2024, 2, 5), None, vec![unit_item(dec!(5000))]);
        paid.send().unwrap();
        pay(&mut paid, dec!(5000), date(2024, 2, 25));
        fixture.invoices.insert(&paid).await.unwrap();

        let period = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        let report = fixture
            .aggregator
            .generate_revenue_report(owner, period, date(2024, 3, 1))
            .await
            .unwrap();

        assert_eq!(report.total_billable_hours, Decimal::ZERO);
        assert_eq!(report.average_hourly_rate, Decimal::ZERO);
    }
}
