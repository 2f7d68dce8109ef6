//! Search results through the schema, CSV encoder and file exporter

use admission_dashboard::controller::ops;
use admission_dashboard::export::{CsvExporter, CsvQuoting, ExportError};
use admission_dashboard::models::{FeeRecord, ListPayload, StudentRecord};
use admission_dashboard::table::schemas::{fee_schema, iteration_export_base, iteration_schema, student_schema};
use admission_dashboard::table::CellFormat;
use assert_matches::assert_matches;
use pretty_assertions::assert_eq;

use crate::common::{fixtures, logging};

fn decoded_students() -> Vec<StudentRecord> {
    let payload: ListPayload<StudentRecord> = serde_json::from_value(fixtures::students_json()).unwrap();
    payload.into_parts().0
}

#[test]
fn test_student_export_file() {
    logging::init_test_logging();
    logging::log_test_step("Exporting decoded students");

    let dir = tempfile::tempdir().unwrap();
    let exporter = CsvExporter::new(dir.path());
    let students = decoded_students();

    let path = ops::export_table(
        &exporter,
        student_schema(),
        student_schema().export_base,
        &students,
        &CellFormat::default(),
        CsvQuoting::Rfc4180,
    )
    .unwrap();
    logging::log_test_data("Exported to", &path);

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("students_"), "{}", name);
    assert!(name.ends_with("Z.csv"), "{}", name);
    assert!(!name.contains(':'));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "Student ID,Name,Iteration No,Offer,Scholarship,Status\n\
         2024A001,Asha Rao,1,CSE,,accept\n\
         2024A002,\"Rao, Vikram\",2,ECE,50,accept\n\
         2024003,Meera Iyer,2,ME,10%,withdraw"
    );

    // Only the exported file remains in the directory
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_verbatim_quoting_keeps_plain_join() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = CsvExporter::new(dir.path());
    let students = decoded_students();

    let path = ops::export_table(
        &exporter,
        student_schema(),
        "students",
        &students[1..2],
        &CellFormat::default(),
        CsvQuoting::Verbatim,
    )
    .unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(
        contents,
        "Student ID,Name,Iteration No,Offer,Scholarship,Status\n2024A002,Rao, Vikram,2,ECE,50,accept"
    );
}

#[test]
fn test_fee_export_formats_flags_and_dates() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = CsvExporter::new(dir.path());
    let payload: ListPayload<FeeRecord> = serde_json::from_value(fixtures::fees_json()).unwrap();
    let (fees, _) = payload.into_parts();

    let path = ops::export_table(
        &exporter,
        fee_schema(),
        fee_schema().export_base,
        &fees,
        &CellFormat::new("%Y-%m-%d"),
        CsvQuoting::default(),
    )
    .unwrap();

    let contents = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Application Number,Admission Fees Amount,Admission Fees Status"));
    assert_eq!(
        lines[1],
        "2024A001,25000,Paid,2024-07-15,registrar@college.edu,2024-07-16,150000,Unpaid,,,"
    );
}

#[test]
fn test_empty_results_are_not_exported() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = CsvExporter::new(dir.path());

    let err = ops::export_table(
        &exporter,
        iteration_schema(),
        &iteration_export_base(4),
        &[],
        &CellFormat::default(),
        CsvQuoting::default(),
    )
    .unwrap_err();

    assert_matches!(err, ExportError::NothingToExport);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
