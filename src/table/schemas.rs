use super::{paid_label, text, Column, TableSchema};
use crate::models::{FeeRecord, IterationRecord, StudentRecord};

fn number(value: Option<i64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

static FEE_COLUMNS: &[Column<FeeRecord>] = &[
    Column {
        header: "Application Number",
        extract: |f, _| text(&f.app_no),
        width: 14,
    },
    Column {
        header: "Admission Fees Amount",
        extract: |f, _| text(&f.admission_fees_amount),
        width: 10,
    },
    Column {
        header: "Admission Fees Status",
        extract: |f, _| paid_label(f.admission_fees_status).to_string(),
        width: 8,
    },
    Column {
        header: "Admission Fees Paid Date",
        extract: |f, fmt| fmt.date(f.admission_fees_paid_date),
        width: 10,
    },
    Column {
        header: "Admission Fees Uploaded By",
        extract: |f, _| text(&f.admission_fees_uploaded_by),
        width: 12,
    },
    Column {
        header: "Admission Fees Upload Date",
        extract: |f, fmt| fmt.date(f.admission_fees_upload_date_time),
        width: 10,
    },
    Column {
        header: "Tuition Fees Amount",
        extract: |f, _| text(&f.tution_fees_amount),
        width: 10,
    },
    Column {
        header: "Tuition Fees Status",
        extract: |f, _| paid_label(f.tution_fees_status).to_string(),
        width: 8,
    },
    Column {
        header: "Tuition Fees Paid Date",
        extract: |f, fmt| fmt.date(f.tution_fees_paid_date),
        width: 10,
    },
    Column {
        header: "Tuition Fees Uploaded By",
        extract: |f, _| text(&f.tution_fees_uploaded_by),
        width: 12,
    },
    Column {
        header: "Tuition Fees Upload Date",
        extract: |f, fmt| fmt.date(f.tution_fees_upload_date_time),
        width: 10,
    },
];

static FEE_SCHEMA: TableSchema<FeeRecord> = TableSchema {
    title: "Fee Details",
    export_base: "fee_details",
    columns: FEE_COLUMNS,
    emphasis: None,
    loading_message: "Loading fee details...",
    empty_message: "No fee details found. There is no data to download.",
};

static STUDENT_COLUMNS: &[Column<StudentRecord>] = &[
    Column {
        header: "Student ID",
        extract: |s, _| text(&s.app_no),
        width: 14,
    },
    Column {
        header: "Name",
        extract: |s, _| text(&s.name),
        width: 24,
    },
    Column {
        header: "Iteration No",
        extract: |s, _| number(s.itr_no),
        width: 10,
    },
    Column {
        header: "Offer",
        extract: |s, _| text(&s.offer),
        width: 12,
    },
    Column {
        header: "Scholarship",
        extract: |s, _| text(&s.scholarship),
        width: 12,
    },
    Column {
        header: "Status",
        extract: |s, _| text(&s.status),
        width: 14,
    },
];

static STUDENT_SCHEMA: TableSchema<StudentRecord> = TableSchema {
    title: "Student Details",
    export_base: "students",
    columns: STUDENT_COLUMNS,
    emphasis: Some(StudentRecord::is_withdrawn),
    loading_message: "Loading student details...",
    empty_message: "No student found. There is no data to download.",
};

static ITERATION_COLUMNS: &[Column<IterationRecord>] = &[
    Column {
        header: "Application Number",
        extract: |i, _| text(&i.app_no),
        width: 16,
    },
    Column {
        header: "Iteration Number",
        extract: |i, _| number(i.itr_no),
        width: 10,
    },
    Column {
        header: "Offer",
        extract: |i, _| text(&i.offer),
        width: 14,
    },
    Column {
        header: "Status",
        extract: |i, _| text(&i.status),
        width: 16,
    },
];

static ITERATION_SCHEMA: TableSchema<IterationRecord> = TableSchema {
    title: "Iteration Details",
    export_base: "iteration",
    columns: ITERATION_COLUMNS,
    emphasis: Some(IterationRecord::is_withdrawn),
    loading_message: "Loading iteration details...",
    empty_message: "No data found for the selected iteration. There is no data to download.",
};

pub fn fee_schema() -> &'static TableSchema<FeeRecord> {
    &FEE_SCHEMA
}

pub fn student_schema() -> &'static TableSchema<StudentRecord> {
    &STUDENT_SCHEMA
}

pub fn iteration_schema() -> &'static TableSchema<IterationRecord> {
    &ITERATION_SCHEMA
}

/// Export base name for one iteration, e.g. `iteration_3`
pub fn iteration_export_base(iteration: u32) -> String {
    format!("{}_{}", ITERATION_SCHEMA.export_base, iteration)
}
