use super::*;
use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use chrono::{TimeZone, Utc};
use shared::domain::AggregatedFields;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

struct CapturedRequest {
    content_type: Option<String>,
    body: serde_json::Value,
}

#[derive(Clone)]
struct IntakeState {
    status: StatusCode,
    tx: Arc<Mutex<Option<oneshot::Sender<CapturedRequest>>>>,
}

async fn handle_intake(
    State(state): State<IntakeState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(CapturedRequest { content_type, body });
    }
    state.status
}

async fn spawn_intake_server(
    status: StatusCode,
) -> anyhow::Result<(Url, oneshot::Receiver<CapturedRequest>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = IntakeState {
        status,
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/api/v1", post(handle_intake))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let url = Url::parse(&format!("http://{addr}/api/v1"))?;
    Ok((url, rx))
}

fn sample_payload() -> DonationPayload {
    let mut donations = AggregatedFields::default();
    donations.fields.insert("tithe".into(), "100".into());
    donations.fields.insert("offering".into(), "50.5".into());
    donations.total = Some(150.5);
    DonationPayload {
        entity: "Nairobi Central Church".to_string(),
        donations,
        receipt_details: ReceiptDetails {
            full_name: "Jane Doe".to_string(),
            church_member: "yes".to_string(),
            mpesa_number: "0712345678".to_string(),
        },
        submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
    }
}

fn receipt_form(full_name: &str, church_member: &str, mpesa_number: &str) -> Vec<FormField> {
    vec![
        FormField::new("full_name", full_name),
        FormField::new("church_member", church_member),
        FormField::new("mpesa_number", mpesa_number),
    ]
}

#[tokio::test]
async fn http_submitter_posts_json_payload() {
    let (url, request_rx) = spawn_intake_server(StatusCode::OK)
        .await
        .expect("spawn server");
    let submitter = HttpSubmitter::new(url);

    submitter.submit(&sample_payload()).await.expect("submit");

    let request = request_rx.await.expect("captured request");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.body["church"], "Nairobi Central Church");
    assert_eq!(request.body["donations"]["tithe"], "100");
    assert_eq!(request.body["donations"]["total"], 150.5);
    assert_eq!(request.body["receipt_details"]["full_name"], "Jane Doe");
    assert_eq!(request.body["receipt_details"]["mpesa_number"], "0712345678");
    assert!(request.body["timestamp"]
        .as_str()
        .is_some_and(|ts| ts.starts_with("2026-03-01T09:30:00")));
}

#[tokio::test]
async fn http_submitter_maps_non_success_status() {
    let (url, _request_rx) = spawn_intake_server(StatusCode::INTERNAL_SERVER_ERROR)
        .await
        .expect("spawn server");
    let submitter = HttpSubmitter::with_timeout(url, Some(Duration::from_secs(5)))
        .expect("client");

    let err = submitter
        .submit(&sample_payload())
        .await
        .expect_err("must fail");

    assert_eq!(err, TransportError::Status { status: 500 });
}

#[tokio::test]
async fn http_submitter_reports_network_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let url = Url::parse(&format!("http://{addr}/api/v1")).expect("url");

    let err = HttpSubmitter::new(url)
        .submit(&sample_payload())
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Network(_)), "unexpected: {err}");
}

#[tokio::test]
async fn noop_submitter_always_succeeds() {
    NoopSubmitter
        .submit(&sample_payload())
        .await
        .expect("noop submit");
    assert_eq!(NoopSubmitter.describe(), "local (no network)");
}

#[test]
fn receipt_form_requires_every_field() {
    let details = validate_receipt_form(&receipt_form("Jane Doe", "yes", "0712345678"))
        .expect("valid form");
    assert_eq!(details.church_member, "yes");

    let err = validate_receipt_form(&receipt_form("  ", "yes", "0712345678"))
        .expect_err("blank name");
    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            field: "full_name".to_string()
        }
    );

    let err = validate_receipt_form(&receipt_form("Jane Doe", "yes", "")).expect_err("blank");
    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            field: "mpesa_number".to_string()
        }
    );
}

#[test]
fn receipt_form_missing_key_is_rejected() {
    let form = vec![
        FormField::new("full_name", "Jane Doe"),
        FormField::new("church_member", "yes"),
    ];

    let err = validate_receipt_form(&form).expect_err("missing key");

    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            field: "mpesa_number".to_string()
        }
    );
}
