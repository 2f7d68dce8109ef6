//! Controller state machines driven by the real client against a mock backend

use admission_dashboard::controller::{
    latest_iteration, ops, withdraw_state, Applied, Level, NotificationQueue, Role, SearchController,
    SearchPhase, UploadController, UploadFinish, UploadPhase, WithdrawFlow, WithdrawState,
};
use admission_dashboard::api::UploadKind;
use admission_dashboard::models::{IterationRecord, StudentRecord};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, fixtures, logging};

#[tokio::test]
async fn test_role_gate_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Clerk", "role": "view_and_withdraw"})))
        .mount(&server)
        .await;

    let gate = ops::load_role_gate(&client_for(&server)).await;
    assert_eq!(gate.role(), &Role::ViewAndWithdraw);
    assert_eq!(gate.user_name(), Some("Clerk"));
    assert_eq!(gate.allowed_uploads(), &[UploadKind::Withdraw]);
    assert!(gate.can_withdraw());
}

#[tokio::test]
async fn test_role_gate_when_session_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;

    let gate = ops::load_role_gate(&client_for(&server)).await;
    assert_eq!(gate.role(), &Role::Restricted);
    assert!(!gate.has_mutating_actions());
}

#[tokio::test]
async fn test_search_then_withdraw_then_refresh() {
    logging::init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("query", "Rao"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::students_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/withdraw/student"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut notes = NotificationQueue::new();
    let mut search: SearchController<StudentRecord> = SearchController::new("student details");

    search.set_query("Rao");
    let ticket = search.begin_search();
    assert_eq!(search.phase(), SearchPhase::Searching);
    let outcome = ops::fetch_students(&client, ticket.query()).await;
    assert_eq!(search.apply(&ticket, outcome, &mut notes), Applied::Loaded(3));
    assert!(search.can_export());

    let latest = latest_iteration(search.results());
    assert_eq!(latest, Some(2));
    let states: Vec<WithdrawState> = search.results().iter().map(|s| withdraw_state(s, latest)).collect();
    assert_eq!(
        states,
        vec![WithdrawState::Hidden, WithdrawState::Available, WithdrawState::Disabled]
    );

    let mut flow = WithdrawFlow::new();
    let target = &search.results()[1];
    assert!(flow.request(target.app_no.clone().unwrap_or_default(), target.name.clone().unwrap_or_default()));
    assert_eq!(
        flow.pending().map(|p| p.prompt()),
        Some("Are you sure you want to withdraw Rao, Vikram (Application No: 2024A002)?".to_string())
    );

    let app_no = flow.confirm().unwrap();
    let outcome = ops::withdraw_student(&client, &app_no).await;
    assert!(flow.complete(&app_no, outcome, &mut notes));
    assert_eq!(notes.latest().map(|n| n.level), Some(Level::Success));

    let refresh = search.refresh().unwrap();
    assert_eq!(refresh.query(), "Rao");
}

#[tokio::test]
async fn test_stale_search_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("query", "Rao"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::students_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/students"))
        .and(query_param("query", "Iyer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "No student found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut notes = NotificationQueue::new();
    let mut search: SearchController<StudentRecord> = SearchController::new("student details");

    let first = search.begin_search_for("Rao");
    let second = search.begin_search_for("Iyer");

    let late = ops::fetch_students(&client, first.query()).await;
    let newest = ops::fetch_students(&client, second.query()).await;

    assert_eq!(search.apply(&second, newest, &mut notes), Applied::Empty);
    assert_eq!(search.apply(&first, late, &mut notes), Applied::Stale);
    assert_eq!(search.phase(), SearchPhase::Empty);
    assert_eq!(search.server_message(), Some("No student found"));
    assert!(search.results().is_empty());
}

#[tokio::test]
async fn test_failed_search_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/iterations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut notes = NotificationQueue::new();
    let mut search: SearchController<IterationRecord> = SearchController::new("iteration details");
    let ticket = search.begin_search_for("1");
    let outcome = ops::fetch_iterations(&client_for(&server), 1).await;

    assert_eq!(search.apply(&ticket, outcome, &mut notes), Applied::Failed);
    assert_eq!(search.phase(), SearchPhase::Empty);
    assert!(!search.can_export());
    let latest = notes.latest().unwrap();
    assert_eq!(latest.level, Level::Error);
    assert_eq!(latest.message, "Unable to load iteration details.");
}

#[tokio::test]
async fn test_upload_flow_against_backend() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("withdrawals.csv");
    std::fs::write(&file, "app_no\n2024A002\n").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/withdraw/upload"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "Missing column reason"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/withdraw/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let gate = admission_dashboard::controller::RoleGate::for_user("Clerk", "view_and_withdraw");
    let mut notes = NotificationQueue::new();
    let mut upload = UploadController::new();

    assert!(!upload.select_type(UploadKind::Master, &gate, &mut notes));
    assert!(upload.select_type(UploadKind::Withdraw, &gate, &mut notes));
    assert!(upload.drop_text(&format!("'{}'", file.display()), &mut notes));

    let request = upload.begin_submit(&mut notes).unwrap();
    let outcome = ops::submit_upload(&client, &request).await;
    assert_eq!(upload.finish(outcome, &mut notes), UploadFinish::Retry);
    assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("File upload failed: Missing column reason"));
    assert_eq!(upload.selected_file(), Some(file.as_path()));

    let request = upload.begin_submit(&mut notes).unwrap();
    let outcome = ops::submit_upload(&client, &request).await;
    assert_eq!(upload.finish(outcome, &mut notes), UploadFinish::Reload);
    assert_eq!(upload.phase(), &UploadPhase::NoTypeSelected);
}
