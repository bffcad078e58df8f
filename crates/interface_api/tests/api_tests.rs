//! Router-level tests against in-memory adapters

use std::sync::Arc;

use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;

use core_kernel::OwnerId;
use domain_analytics::ports::mock::MockSnapshotStore;
use domain_analytics::RevenueAggregator;
use domain_billing::ports::mock::{MockCaseDirectory, MockInvoiceStore};
use domain_billing::ports::CaseSummary;
use domain_billing::InvoiceLedger;
use domain_expense::ports::mock::MockExpenseStore;
use domain_expense::ExpenseTracker;
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState};

const JWT_SECRET: &str = "router-test-secret";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct TestApp {
    server: TestServer,
    owner: OwnerId,
    token: String,
}

async fn spawn_app(cases: Vec<CaseSummary>) -> TestApp {
    let owner = OwnerId::new();
    let invoices: Arc<MockInvoiceStore> = Arc::new(MockInvoiceStore::new());
    let expenses: Arc<MockExpenseStore> = Arc::new(MockExpenseStore::new());
    let directory: Arc<MockCaseDirectory> = Arc::new(MockCaseDirectory::with_cases(cases).await);
    let snapshots = Arc::new(MockSnapshotStore::new());

    let config = ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        ..ApiConfig::default()
    };

    // Lazy pool: never connected, only the readiness probe would touch it
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .unwrap();

    let state = AppState {
        ledger: Arc::new(InvoiceLedger::new(invoices.clone(), directory.clone())),
        expenses: Arc::new(ExpenseTracker::new(expenses.clone())),
        aggregator: Arc::new(RevenueAggregator::new(
            invoices, expenses, directory, snapshots,
        )),
        pool,
        config,
    };

    let token = create_token(owner, JWT_SECRET, 3600).unwrap();
    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        owner,
        token,
    }
}

fn case_for(owner: OwnerId) -> CaseSummary {
    CaseSummary {
        id: core_kernel::CaseId::new(),
        reference: "CAS-2024-001".to_string(),
        title: "Benali v. Sarl Atlas".to_string(),
        owner,
        open_date: date(2024, 1, 10),
        close_date: None,
    }
}

fn invoice_body() -> Value {
    json!({
        "invoice_date": "2024-03-01",
        "due_date": "2024-03-31",
        "client": { "name": "Sarl Atlas", "address": "12 Rue Didouche, Alger" },
        "items": [
            { "description": "Filing fees", "quantity": "2", "rate": "1000" },
            { "description": "Consultation", "hours_worked": "5", "hourly_rate": "2000" }
        ]
    })
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = spawn_app(vec![]).await;
        let response = app.server.get("/api/v1/invoices").await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let app = spawn_app(vec![]).await;
        let response = app
            .server
            .get("/api/v1/invoices")
            .authorization_bearer("not-a-jwt")
            .await;
        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = spawn_app(vec![]).await;
        let response = app.server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }
}

mod invoice_tests {
    use super::*;

    #[tokio::test]
    async fn create_invoice_computes_totals_with_default_tax() {
        let app = spawn_app(vec![]).await;
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body = response.json::<Value>();
        assert_eq!(body["status"], "draft");
        assert_eq!(body["currency"], "DZD");
        assert_eq!(body["subtotal"], "12000");
        assert_eq!(body["tax_rate"], "19.00");
        assert_eq!(body["tax_amount"], "2280.00");
        assert_eq!(body["total_amount"], "14280.00");
        assert_eq!(body["outstanding"], "14280.00");
    }

    #[tokio::test]
    async fn line_items_use_external_aliases() {
        let app = spawn_app(vec![]).await;
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await;

        let body = response.json::<Value>();
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);

        // Unit item: rate is the unit price, amount the line total
        assert_eq!(items[0]["item_type"], "unit");
        assert_eq!(items[0]["rate"], "1000");
        assert_eq!(items[0]["amount"], "2000");
        assert!(items[0].get("hours_worked").is_none());

        // Hourly item: rate is the hourly rate
        assert_eq!(items[1]["item_type"], "hourly");
        assert_eq!(items[1]["rate"], "2000");
        assert_eq!(items[1]["hours_worked"], "5");
        assert_eq!(items[1]["amount"], "10000");
    }

    #[tokio::test]
    async fn alias_round_trip_preserves_pricing() {
        let app = spawn_app(vec![]).await;
        let created = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await
            .json::<Value>();

        // Feed the response items back through the request shape
        let body = json!({
            "invoice_number": "INV-ROUND-TRIP",
            "invoice_date": "2024-04-01",
            "due_date": "2024-04-30",
            "client": { "name": "Sarl Atlas" },
            "items": created["items"],
        });
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let round_tripped = response.json::<Value>();
        assert_eq!(round_tripped["subtotal"], created["subtotal"]);
        assert_eq!(round_tripped["total_amount"], created["total_amount"]);
    }

    #[tokio::test]
    async fn duplicate_invoice_number_conflicts() {
        let app = spawn_app(vec![]).await;
        let mut body = invoice_body();
        body["invoice_number"] = json!("INV-1");

        app.server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "conflict");
    }

    #[tokio::test]
    async fn foreign_case_is_forbidden() {
        let foreign_case = case_for(OwnerId::new());
        let app = spawn_app(vec![foreign_case.clone()]).await;

        let mut body = invoice_body();
        body["case_id"] = json!(foreign_case.id.as_uuid());
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn negative_item_amount_is_unprocessable() {
        let app = spawn_app(vec![]).await;
        let body = json!({
            "invoice_date": "2024-03-01",
            "due_date": "2024-03-31",
            "client": { "name": "Sarl Atlas" },
            "items": [ { "description": "Oops", "quantity": "-1", "rate": "1000" } ]
        });
        let response = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn lifecycle_send_then_pay_in_full() {
        let app = spawn_app(vec![]).await;
        let created = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();
        assert_eq!(created["is_overdue"], false);

        let sent = app
            .server
            .post(&format!("/api/v1/invoices/{id}/send"))
            .authorization_bearer(&app.token)
            .await
            .json::<Value>();
        assert_eq!(sent["status"], "sent");
        // Due 2024-03-31, long past: sent invoices turn overdue
        assert_eq!(sent["is_overdue"], true);

        let response = app
            .server
            .post(&format!("/api/v1/invoices/{id}/payments"))
            .authorization_bearer(&app.token)
            .json(&json!({
                "amount": "14280.00",
                "payment_date": "2024-03-15",
                "method": "bank_transfer",
                "reference": "TRF-889"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let paid = response.json::<Value>();
        assert_eq!(paid["status"], "paid");
        assert_eq!(paid["outstanding"], "0.00");
        assert_eq!(paid["is_overdue"], false);
        assert_eq!(paid["payment_date"], "2024-03-15");
        assert_eq!(paid["payments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn payment_on_draft_conflicts() {
        let app = spawn_app(vec![]).await;
        let created = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        let response = app
            .server
            .post(&format!("/api/v1/invoices/{id}/payments"))
            .authorization_bearer(&app.token)
            .json(&json!({
                "amount": "100",
                "payment_date": "2024-03-15",
                "method": "cash"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let app = spawn_app(vec![]).await;
        let response = app
            .server
            .get(&format!("/api/v1/invoices/{}", uuid::Uuid::new_v4()))
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let app = spawn_app(vec![]).await;
        let created = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();
        app.server
            .post(&format!("/api/v1/invoices/{id}/send"))
            .authorization_bearer(&app.token)
            .await
            .assert_status_ok();

        let drafts = app
            .server
            .get("/api/v1/invoices")
            .add_query_param("status", "draft")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<Value>>();
        assert!(drafts.is_empty());

        let sent = app
            .server
            .get("/api/v1/invoices")
            .add_query_param("status", "sent")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(sent.len(), 1);
    }
}

mod expense_tests {
    use super::*;

    fn expense_body(case_id: &core_kernel::CaseId) -> Value {
        json!({
            "case_id": case_id.as_uuid(),
            "category": "court_fees",
            "description": "Tribunal filing",
            "amount": "1500.00",
            "expense_date": "2024-03-05"
        })
    }

    #[tokio::test]
    async fn create_and_reimburse_expense() {
        let app = spawn_app(vec![]).await;
        let case = case_for(app.owner);

        let response = app
            .server
            .post("/api/v1/expenses")
            .authorization_bearer(&app.token)
            .json(&expense_body(&case.id))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let created = response.json::<Value>();
        assert_eq!(created["category"], "court_fees");
        assert_eq!(created["is_reimbursable"], true);
        assert_eq!(created["is_reimbursed"], false);

        let id = created["id"].as_str().unwrap();
        let reimbursed = app
            .server
            .post(&format!("/api/v1/expenses/{id}/reimburse"))
            .authorization_bearer(&app.token)
            .json(&json!({ "reimbursement_date": "2024-04-01" }))
            .await
            .json::<Value>();
        assert_eq!(reimbursed["is_reimbursed"], true);
        assert_eq!(reimbursed["reimbursement_date"], "2024-04-01");
    }

    #[tokio::test]
    async fn double_reimbursement_conflicts() {
        let app = spawn_app(vec![]).await;
        let case = case_for(app.owner);
        let created = app
            .server
            .post("/api/v1/expenses")
            .authorization_bearer(&app.token)
            .json(&expense_body(&case.id))
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        app.server
            .post(&format!("/api/v1/expenses/{id}/reimburse"))
            .authorization_bearer(&app.token)
            .json(&json!({}))
            .await
            .assert_status_ok();
        let response = app
            .server
            .post(&format!("/api/v1/expenses/{id}/reimburse"))
            .authorization_bearer(&app.token)
            .json(&json!({}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_category_is_unprocessable() {
        let app = spawn_app(vec![]).await;
        let case = case_for(app.owner);
        let mut body = expense_body(&case.id);
        body["category"] = json!("bribes");

        let response = app
            .server
            .post("/api/v1/expenses")
            .authorization_bearer(&app.token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let app = spawn_app(vec![]).await;
        let case = case_for(app.owner);
        let created = app
            .server
            .post("/api/v1/expenses")
            .authorization_bearer(&app.token)
            .json(&expense_body(&case.id))
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();

        app.server
            .delete(&format!("/api/v1/expenses/{id}"))
            .authorization_bearer(&app.token)
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);
        app.server
            .get(&format!("/api/v1/expenses/{id}"))
            .authorization_bearer(&app.token)
            .await
            .assert_status_not_found();
    }
}

mod analytics_tests {
    use super::*;

    async fn seed_paid_invoice(app: &TestApp) {
        let created = app
            .server
            .post("/api/v1/invoices")
            .authorization_bearer(&app.token)
            .json(&invoice_body())
            .await
            .json::<Value>();
        let id = created["id"].as_str().unwrap();
        app.server
            .post(&format!("/api/v1/invoices/{id}/send"))
            .authorization_bearer(&app.token)
            .await
            .assert_status_ok();
        app.server
            .post(&format!("/api/v1/invoices/{id}/payments"))
            .authorization_bearer(&app.token)
            .json(&json!({
                "amount": "14280.00",
                "payment_date": "2024-03-10",
                "method": "cash"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    #[tokio::test]
    async fn revenue_metrics_cover_the_period() {
        let app = spawn_app(vec![]).await;
        seed_paid_invoice(&app).await;

        let response = app
            .server
            .get("/api/v1/analytics/revenue")
            .add_query_param("start_date", "2024-03-01")
            .add_query_param("end_date", "2024-03-31")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status_ok();

        let metrics = response.json::<Value>();
        assert_eq!(metrics["period"]["start_date"], "2024-03-01");
        assert_eq!(metrics["period"]["end_date"], "2024-03-31");
        assert_eq!(metrics["revenue"]["total_invoiced"], "14280.00");
        assert_eq!(metrics["revenue"]["total_paid"], "14280.00");
        assert_eq!(metrics["revenue"]["outstanding"], "0");
        assert_eq!(metrics["expenses"]["total_expenses"], "0");
        assert_eq!(metrics["invoices"]["total_count"], 1);
        assert_eq!(metrics["invoices"]["paid_count"], 1);
        assert_eq!(metrics["invoices"]["overdue_count"], 0);
        assert_eq!(metrics["cases"]["case_count"], 0);
        assert_eq!(metrics["monthly_trend"].as_array().unwrap().len(), 1);
        assert_eq!(metrics["monthly_trend"][0]["month"], "2024-03");
    }

    #[tokio::test]
    async fn inverted_period_is_unprocessable() {
        let app = spawn_app(vec![]).await;
        let response = app
            .server
            .get("/api/v1/analytics/revenue")
            .add_query_param("start_date", "2024-03-31")
            .add_query_param("end_date", "2024-03-01")
            .authorization_bearer(&app.token)
            .await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn report_generation_is_idempotent() {
        let app = spawn_app(vec![]).await;
        seed_paid_invoice(&app).await;

        let body = json!({ "start_date": "2024-03-01", "end_date": "2024-03-31" });
        let first = app
            .server
            .post("/api/v1/analytics/revenue/report")
            .authorization_bearer(&app.token)
            .json(&body)
            .await
            .json::<Value>();
        let second = app
            .server
            .post("/api/v1/analytics/revenue/report")
            .authorization_bearer(&app.token)
            .json(&body)
            .await
            .json::<Value>();
        assert_eq!(first["id"], second["id"]);

        let reports = app
            .server
            .get("/api/v1/analytics/revenue/report")
            .authorization_bearer(&app.token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0]["total_paid"], "14280.00");
    }
}
