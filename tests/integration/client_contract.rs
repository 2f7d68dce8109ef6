//! HTTP contract of `DashboardClient` against a mock backend

use admission_dashboard::api::{AdmissionsBackend, ApiError, UploadKind};
use admission_dashboard::models::{Config, ListPayload};
use admission_dashboard::api::DashboardClient;
use assert_matches::assert_matches;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, fixtures, logging};

#[tokio::test]
async fn test_login_cookie_is_sent_on_later_requests() {
    logging::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "registrar@college.edu", "password": "s3cret"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=abc123; Path=/; HttpOnly")
                .set_body_json(json!({"message": "Login successful"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("cookie", "token=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Registrar", "role": "admin"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.login("registrar@college.edu", "s3cret").await.unwrap();
    let user = client.current_user().await.unwrap();

    assert_eq!(user.name, "Registrar");
    assert_eq!(user.role, "admin");
}

#[tokio::test]
async fn test_stats_decoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::stats_json()))
        .mount(&server)
        .await;

    let stats = client_for(&server).stats().await.unwrap();

    assert_eq!(stats.total_applications, 1200);
    assert_eq!(stats.accepted_students, 310);
    assert_eq!(stats.latest_iteration_number, Some(3));
    assert_eq!(
        stats.latest_iteration_date.map(|d| d.date()),
        NaiveDate::from_ymd_opt(2024, 7, 15)
    );

    let shares = stats.gender_shares();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].label, "Female");
    assert_eq!(shares[0].percent_label(), "41.7%");
    assert_eq!(shares[1].percent_label(), "58.3%");
}

#[tokio::test]
async fn test_fee_search_query_is_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/fees"))
        .and(query_param("query", "2024 A&1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::fees_json()))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server).search_fees("2024 A&1").await.unwrap();
    let (fees, message) = payload.into_parts();

    assert!(message.is_none());
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0].admission_fees_amount.as_deref(), Some("25000"));
    assert!(fees[0].admission_fees_status);
    assert!(!fees[0].tution_fees_status);
    assert!(fees[0].tution_fees_paid_date.is_none());
}

#[tokio::test]
async fn test_student_search_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("query", "Rao"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::students_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("query", "nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "No student found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let (students, _) = client.search_students("Rao").await.unwrap().into_parts();
    assert_eq!(students.len(), 3);
    assert_eq!(students[1].itr_no, Some(2));
    assert_eq!(students[1].scholarship.as_deref(), Some("50"));
    assert_eq!(students[2].app_no.as_deref(), Some("2024003"));
    assert!(students[2].is_withdrawn());

    let empty = client.search_students("nobody").await.unwrap();
    assert_matches!(empty, ListPayload::Message(ref m) if m.message == "No student found");
}

#[tokio::test]
async fn test_iteration_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/iteration-count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/iterations"))
        .and(query_param("iteration", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"app_no": "2024A002", "itr_no": 2, "offer": "ECE", "status": "accept"},
            {"app_no": "2024A003", "itr_no": 2, "offer": "ME", "status": "withdrawls"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.iteration_count().await.unwrap(), 3);

    let (rows, _) = client.iteration_details(2).await.unwrap().into_parts();
    assert_eq!(rows.len(), 2);
    // The client hands back raw statuses; relabelling happens in the controller ops
    assert_eq!(rows[1].status.as_deref(), Some("withdrawls"));
}

#[tokio::test]
async fn test_withdraw_error_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/withdraw/student"))
        .and(body_json(json!({"app_no": "2024A001"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Withdrawn"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/withdraw/student"))
        .and(body_json(json!({"app_no": "2024A009"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Student already withdrawn"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.withdraw_student("2024A001").await.unwrap();

    let err = client.withdraw_student("2024A009").await.unwrap_err();
    assert_eq!(err.detail(), Some("Student already withdrawn"));
    assert_matches!(
        err,
        ApiError::Status { ref path, status, .. }
            if path == "/api/withdraw/student" && status == reqwest::StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_upload_posts_multipart_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fees_paid.csv");
    std::fs::write(&file, "app_no,amount\n2024A001,25000\n").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update/FEES_PAID"))
        .and(body_string_contains("name=\"file\"; filename=\"fees_paid.csv\""))
        .and(body_string_contains("2024A001,25000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).upload(UploadKind::Fees, &file).await.unwrap();
}

#[tokio::test]
async fn test_upload_failures() {
    let dir = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/update/MASTER_TABLE"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let missing = client.upload(UploadKind::Fees, &dir.path().join("absent.csv")).await.unwrap_err();
    assert_matches!(missing, ApiError::Io { .. });

    let file = dir.path().join("master.csv");
    std::fs::write(&file, "app_no\n").unwrap();
    let err = client.upload(UploadKind::Master, &file).await.unwrap_err();
    assert_eq!(err.detail(), Some("Internal Server Error"));
    assert_matches!(
        err,
        ApiError::Status { status, .. } if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/forgot-password"))
        .and(body_json(json!({"email": "clerk@college.edu"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Reset link sent"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reset-password"))
        .and(body_string_contains("name=\"token\""))
        .and(body_string_contains("tok-42"))
        .and(body_string_contains("name=\"new_password\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Password updated"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.forgot_password("clerk@college.edu").await.unwrap(), "Reset link sent");
    assert_eq!(client.reset_password("tok-42", "n3w-pass").await.unwrap(), "Password updated");
}

#[tokio::test]
async fn test_logout_and_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/iteration-count"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.logout().await.unwrap();

    let err = client.iteration_count().await.unwrap_err();
    assert_matches!(err, ApiError::Decode { .. });
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let config = Config {
        api_base: "http://127.0.0.1:1".to_string(),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let client = DashboardClient::new(&config).unwrap();

    let err = client.stats().await.unwrap_err();
    assert_matches!(err, ApiError::Transport { .. });
    assert_eq!(err.detail(), None);
}
