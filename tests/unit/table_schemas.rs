//! Built-in table schemas

use admission_dashboard::models::{IterationRecord, StudentRecord};
use admission_dashboard::table::schemas::{fee_schema, iteration_export_base, iteration_schema, student_schema};
use admission_dashboard::table::{paid_label, CellFormat};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

#[test]
fn test_header_lists() {
    assert_eq!(
        student_schema().headers(),
        vec!["Student ID", "Name", "Iteration No", "Offer", "Scholarship", "Status"]
    );
    assert_eq!(
        iteration_schema().headers(),
        vec!["Application Number", "Iteration Number", "Offer", "Status"]
    );
    let fee_headers = fee_schema().headers();
    assert_eq!(fee_headers.first(), Some(&"Application Number"));
    assert_eq!(fee_headers.last(), Some(&"Tuition Fees Upload Date"));
}

#[test]
fn test_export_bases() {
    assert_eq!(fee_schema().export_base, "fee_details");
    assert_eq!(student_schema().export_base, "students");
    assert_eq!(iteration_export_base(3), "iteration_3");
}

#[test]
fn test_emphasis_marks_withdrawn_rows() {
    let withdrawn = IterationRecord {
        status: Some("withdrawls".to_string()),
        ..Default::default()
    }
    .normalize_status();
    assert!(iteration_schema().is_emphasized(&withdrawn));
    assert!(!iteration_schema().is_emphasized(&IterationRecord::default()));

    let student = StudentRecord {
        status: Some("withdraw".to_string()),
        ..Default::default()
    };
    assert!(student_schema().is_emphasized(&student));
}

#[test]
fn test_cell_formatting() {
    let ts = NaiveDate::from_ymd_opt(2024, 7, 5).and_then(|d| d.and_hms_opt(14, 0, 0));
    assert_eq!(CellFormat::default().date(ts), "7/5/2024");
    assert_eq!(CellFormat::new("%d.%m.%Y").date(ts), "05.07.2024");
    assert_eq!(CellFormat::default().date(None), "");
    assert_eq!(paid_label(true), "Paid");
    assert_eq!(paid_label(false), "Unpaid");

    let row = iteration_schema().row(
        &IterationRecord {
            app_no: Some("2024A007".to_string()),
            itr_no: None,
            offer: None,
            status: Some("accept".to_string()),
        },
        &CellFormat::default(),
    );
    assert_eq!(row, vec!["2024A007", "", "", "accept"]);
}
