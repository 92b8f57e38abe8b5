//! Integration tests for the Payroll Calculation Engine.
//!
//! These tests load the shipped configuration from `./config` and exercise
//! the HTTP API end to end:
//! - Monthly, semimonthly, biweekly and weekly withholding
//! - Contribution cap
//! - Additional taxable income
//! - Batch runs
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let registry = ConfigLoader::load("./config")
        .expect("Failed to load config")
        .into_registry();
    AppState::new(registry).with_batch_workers(4)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, json)
}

async fn post(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

fn create_request(salary: &str, frequency: &str, start: &str, end: &str) -> Value {
    json!({
        "compensation": {
            "employee_id": "emp_001",
            "base_salary": salary,
            "frequency": frequency
        },
        "pay_period": {
            "start_date": start,
            "end_date": end
        }
    })
}

fn monthly_request(salary: &str) -> Value {
    create_request(salary, "monthly", "2024-03-01", "2024-03-31")
}

fn amount(value: &Value) -> Decimal {
    decimal(value.as_str().expect("amounts serialize as strings"))
}

struct Expected<'a> {
    income_tax: &'a str,
    social_security: &'a str,
    employer_social_security: &'a str,
    housing_fund: &'a str,
    net_pay: &'a str,
}

fn assert_result(result: &Value, expected: Expected<'_>) {
    assert_eq!(
        amount(&result["income_tax_withheld"]),
        decimal(expected.income_tax),
        "income tax"
    );
    assert_eq!(
        amount(&result["social_security_employee"]),
        decimal(expected.social_security),
        "employee social security"
    );
    assert_eq!(
        amount(&result["employer_contributions"]["social_security"]),
        decimal(expected.employer_social_security),
        "employer social security"
    );
    assert_eq!(
        amount(&result["employer_contributions"]["housing_fund"]),
        decimal(expected.housing_fund),
        "housing fund"
    );
    assert_eq!(amount(&result["net_pay"]), decimal(expected.net_pay), "net pay");
    assert_balanced(result);
}

fn assert_balanced(result: &Value) {
    assert_eq!(
        amount(&result["net_pay"]) + amount(&result["total_deductions"]),
        amount(&result["gross_pay"]),
        "net pay and deductions must add up to gross pay"
    );
}

// =============================================================================
// Withholding scenarios
// =============================================================================

#[tokio::test]
async fn test_monthly_25000() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("25000.00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["calculation_id"].is_string());
    assert!(body["calculated_at"].is_string());

    let result = &body["result"];
    assert_eq!(result["jurisdiction"], "MX-2024");
    assert_eq!(result["frequency"], "monthly");
    assert_eq!(result["employee_id"], "emp_001");
    assert_eq!(amount(&result["total_deductions"]), decimal("4265.75"));
    assert_eq!(amount(&result["housing_fund_employee"]), Decimal::ZERO);
    assert_result(
        result,
        Expected {
            income_tax: "3672.00",
            social_security: "593.75",
            employer_social_security: "2548.39",
            housing_fund: "1250.00",
            net_pay: "20734.25",
        },
    );
}

#[tokio::test]
async fn test_weekly_3000() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("3000.00", "weekly", "2024-03-04", "2024-03-10"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_result(
        &body["result"],
        Expected {
            income_tax: "275.63",
            social_security: "71.25",
            employer_social_security: "305.81",
            housing_fund: "150.00",
            net_pay: "2653.12",
        },
    );
}

#[tokio::test]
async fn test_biweekly_6000() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("6000.00", "biweekly", "2024-03-01", "2024-03-14"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_result(
        &body["result"],
        Expected {
            income_tax: "551.25",
            social_security: "142.50",
            employer_social_security: "611.61",
            housing_fund: "300.00",
            net_pay: "5306.25",
        },
    );
}

#[tokio::test]
async fn test_semimonthly_12500() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("12500.00", "semimonthly", "2024-03-01", "2024-03-15"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_result(
        &body["result"],
        Expected {
            income_tax: "1836.00",
            social_security: "296.88",
            employer_social_security: "1274.19",
            housing_fund: "625.00",
            net_pay: "10367.12",
        },
    );
}

#[tokio::test]
async fn test_monthly_8000_in_30_day_month() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("8000.00", "monthly", "2024-04-01", "2024-04-30"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_result(
        &body["result"],
        Expected {
            income_tax: "553.30",
            social_security: "190.00",
            employer_social_security: "815.48",
            housing_fund: "400.00",
            net_pay: "7256.70",
        },
    );
}

#[tokio::test]
async fn test_high_salary_is_capped_for_social_security_only() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("100000.00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_result(
        result,
        Expected {
            income_tax: "24587.12",
            social_security: "1998.37",
            employer_social_security: "8577.03",
            housing_fund: "5000.00",
            net_pay: "73414.51",
        },
    );
    let warnings = result["audit"]["warnings"].as_array().unwrap();
    assert!(warnings
        .iter()
        .any(|w| w["code"] == "CONTRIBUTION_CAP_APPLIED"));
}

#[tokio::test]
async fn test_top_bracket() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("500000.00"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_result(
        &body["result"],
        Expected {
            income_tax: "161320.85",
            social_security: "1998.37",
            employer_social_security: "8577.03",
            housing_fund: "25000.00",
            net_pay: "336680.78",
        },
    );
}

#[tokio::test]
async fn test_additional_taxable_income_raises_tax_not_contributions() {
    let mut request = monthly_request("25000.00");
    request["compensation"]["additional_taxable_income"] = json!("5000.00");

    let (status, body) = post(create_router_for_test(), "/calculate", request).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(amount(&result["gross_pay"]), decimal("30000.00"));
    assert_eq!(amount(&result["taxable_base"]), decimal("30000.00"));
    assert_eq!(amount(&result["income_tax_withheld"]), decimal("4740.00"));
    assert_eq!(amount(&result["social_security_employee"]), decimal("593.75"));
    assert_balanced(result);
}

#[tokio::test]
async fn test_audit_trail_cites_statutes() {
    let (_, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("25000.00"),
    )
    .await;

    let steps = body["result"]["audit"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    let isr = steps
        .iter()
        .find(|s| s["rule_id"] == "isr_withholding")
        .unwrap();
    assert_eq!(isr["legal_ref"], "LISR art. 96");
    assert_eq!(isr["output"]["bracket"], 6);
}

#[tokio::test]
async fn test_identical_requests_give_identical_results() {
    let (_, first) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("18765.43"),
    )
    .await;
    let (_, second) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("18765.43"),
    )
    .await;

    assert_eq!(first["result"], second["result"]);
    assert_ne!(first["calculation_id"], second["calculation_id"]);
}

// =============================================================================
// Batch
// =============================================================================

#[tokio::test]
async fn test_batch_mixed_frequencies() {
    let body = json!({
        "items": [
            monthly_request("25000.00"),
            create_request("3000.00", "weekly", "2024-03-04", "2024-03-10"),
            create_request("6000.00", "biweekly", "2024-03-01", "2024-03-14"),
        ]
    });

    let (status, body) = post(create_router_for_test(), "/calculate/batch", body).await;

    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    for (i, item) in items.iter().enumerate() {
        assert_eq!(item["index"], i);
        assert_eq!(item["status"], "succeeded");
    }
    assert_eq!(body["summary"]["succeeded"], 3);
    // 20734.25 + 2653.12 + 5306.25
    assert_eq!(amount(&body["summary"]["total_net_pay"]), decimal("28693.62"));
}

#[tokio::test]
async fn test_batch_fail_fast() {
    let body = json!({
        "items": [
            monthly_request("-1.00"),
            monthly_request("25000.00"),
        ],
        "fail_fast": true
    });

    let (status, body) = post(create_router_for_test(), "/calculate/batch", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["status"], "failed");
    assert_eq!(body["items"][0]["error"]["code"], "INVALID_INPUT");
    assert_eq!(body["summary"]["failed"], 1);
    // With several workers the second item may already have started.
    let second = body["items"][1]["status"].as_str().unwrap();
    assert!(second == "skipped" || second == "succeeded");
}

// =============================================================================
// Jurisdictions
// =============================================================================

#[tokio::test]
async fn test_list_jurisdictions() {
    let (status, body) = send(
        create_router_for_test(),
        Request::builder()
            .uri("/jurisdictions")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let jurisdictions = body["jurisdictions"].as_array().unwrap();
    assert_eq!(jurisdictions.len(), 1);
    assert_eq!(jurisdictions[0]["key"], "MX-2024");
    assert_eq!(jurisdictions[0]["currency"], "MXN");
    assert_eq!(jurisdictions[0]["bracket_count"], 11);
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_negative_salary_returns_400() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("-100.00"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_sub_centavo_salary_returns_400() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        monthly_request("25000.005"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_unloaded_year_returns_404() {
    let mut request = monthly_request("25000.00");
    request["compensation"]["jurisdiction"] = json!("MX-2023");

    let (status, body) = post(create_router_for_test(), "/calculate", request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MISSING_CONFIGURATION");
    assert!(body["message"].as_str().unwrap().contains("MX-2023"));
}

#[tokio::test]
async fn test_malformed_jurisdiction_returns_400() {
    let mut request = monthly_request("25000.00");
    request["compensation"]["jurisdiction"] = json!("Mexico");

    let (status, body) = post(create_router_for_test(), "/calculate", request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_period_inconsistent_with_frequency_returns_400() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("3000.00", "weekly", "2024-03-01", "2024-03-31"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_unknown_frequency_returns_400() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("3000.00", "daily", "2024-03-04", "2024-03-04"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_end_before_start_returns_400() {
    let (status, body) = post(
        create_router_for_test(),
        "/calculate",
        create_request("25000.00", "monthly", "2024-03-31", "2024-03-01"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}
