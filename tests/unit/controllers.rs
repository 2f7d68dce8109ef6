//! Controller behaviour through the public API

use admission_dashboard::api::{ApiError, UploadKind};
use admission_dashboard::controller::{
    Level, NotificationQueue, RoleGate, SearchController, SearchPhase, UploadController, UploadPhase,
    WithdrawFlow,
};
use admission_dashboard::models::{FeeRecord, ListPayload, ServerMessage};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use test_log::test;

#[test]
fn test_role_matrix() {
    let admin = RoleGate::for_user("Registrar", "admin");
    assert_eq!(admin.allowed_uploads(), &UploadKind::ALL);
    assert!(admin.can_withdraw());

    let clerk = RoleGate::for_user("Clerk", "view_and_withdraw");
    assert!(clerk.can_upload(UploadKind::Withdraw));
    assert!(!clerk.can_upload(UploadKind::Fees));
    assert!(clerk.can_withdraw());

    for role in ["viewer", "", "ADMIN"] {
        let gate = RoleGate::for_user("Someone", role);
        assert!(gate.allowed_uploads().is_empty(), "{:?}", role);
        assert!(!gate.can_withdraw(), "{:?}", role);
    }
    assert!(!RoleGate::restricted().has_mutating_actions());
}

#[test]
fn test_notification_queue_is_bounded() {
    let mut notes = NotificationQueue::new();
    for i in 0..150 {
        notes.info(format!("note {}", i));
    }
    notes.error("last");

    assert_eq!(notes.len(), 100);
    let latest = notes.latest().unwrap();
    assert_eq!(latest.level, Level::Error);
    assert_eq!(latest.message, "last");
}

#[test]
fn test_upload_requires_type_then_file() {
    let gate = RoleGate::for_user("Registrar", "admin");
    let mut notes = NotificationQueue::new();
    let mut upload = UploadController::new();

    assert!(!upload.choose_file(PathBuf::from("master.csv"), &mut notes));
    assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("Please select an upload type first."));

    assert!(upload.select_type(UploadKind::Iteration, &gate, &mut notes));
    assert!(upload.begin_submit(&mut notes).is_none());
    assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("Please select a file first."));

    assert!(upload.drop_text("file:///home/registrar/Offer\\ List.csv", &mut notes));
    assert_eq!(upload.selected_file(), Some(PathBuf::from("/home/registrar/Offer List.csv").as_path()));

    // Switching type discards the chosen file
    assert!(upload.select_type(UploadKind::Fees, &gate, &mut notes));
    assert_eq!(upload.phase(), &UploadPhase::TypeSelected(UploadKind::Fees));
    assert!(upload.selected_file().is_none());
}

#[test]
fn test_withdraw_failure_messages() {
    let mut notes = NotificationQueue::new();
    let mut flow = WithdrawFlow::new();

    flow.request("2024A001", "Asha Rao");
    let app_no = flow.confirm().unwrap();
    assert!(flow.is_in_flight());
    assert!(!flow.request("2024A002", "Vikram"));

    let refused = ApiError::Status {
        path: "/api/withdraw/student".to_string(),
        status: reqwest::StatusCode::BAD_REQUEST,
        detail: Some("Student already withdrawn".to_string()),
    };
    assert!(!flow.complete(&app_no, Err(refused), &mut notes));
    assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("Failed to withdraw: Student already withdrawn"));

    flow.request("2024A001", "Asha Rao");
    let app_no = flow.confirm().unwrap();
    let broken = ApiError::Decode {
        path: "/api/withdraw/student".to_string(),
        message: "eof".to_string(),
    };
    assert!(!flow.complete(&app_no, Err(broken), &mut notes));
    assert_eq!(notes.latest().map(|n| n.message.as_str()), Some("Error processing withdrawal."));
    assert!(!flow.is_in_flight());
}

#[test]
fn test_search_message_payload_and_reset() {
    let mut notes = NotificationQueue::new();
    let mut search: SearchController<FeeRecord> = SearchController::new("fee details");
    assert_eq!(search.phase(), SearchPhase::Idle);
    assert!(!search.has_searched());

    let ticket = search.begin_search_for("2024A404");
    let payload = ListPayload::Message(ServerMessage {
        message: "No fee record".to_string(),
    });
    search.apply(&ticket, Ok(payload), &mut notes);

    assert_eq!(search.phase(), SearchPhase::Empty);
    assert_eq!(search.server_message(), Some("No fee record"));
    assert!(!search.can_export());
    assert!(notes.is_empty());

    let stale = search.begin_search_for("2024A001");
    search.reset();
    assert_eq!(search.phase(), SearchPhase::Idle);
    assert_eq!(search.last_query(), None);
    assert_eq!(
        search.apply(&stale, Ok(ListPayload::Records(vec![FeeRecord::default()])), &mut notes),
        admission_dashboard::controller::Applied::Stale
    );
}
