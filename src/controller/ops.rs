//! Backend calls behind each controller action.

use std::path::PathBuf;
use tracing::{info, warn};

use super::role::RoleGate;
use super::upload::UploadRequest;
use crate::api::{AdmissionsBackend, ApiError};
use crate::export::{encode_csv, CsvExporter, CsvQuoting, ExportError};
use crate::models::{FeeRecord, IterationRecord, ListPayload, StudentRecord};
use crate::table::{CellFormat, TableSchema};

/// Fetch the current user and map the role. A failed lookup grants nothing.
pub async fn load_role_gate(backend: &dyn AdmissionsBackend) -> RoleGate {
    match backend.current_user().await {
        Ok(user) => {
            info!("Signed in as {} ({})", user.name, user.role);
            RoleGate::for_user(user.name, &user.role)
        }
        Err(e) => {
            warn!("Could not load current user: {}", e);
            RoleGate::restricted()
        }
    }
}

pub async fn fetch_fees(
    backend: &dyn AdmissionsBackend,
    query: &str,
) -> Result<ListPayload<FeeRecord>, ApiError> {
    backend.search_fees(query).await
}

pub async fn fetch_students(
    backend: &dyn AdmissionsBackend,
    query: &str,
) -> Result<ListPayload<StudentRecord>, ApiError> {
    backend.search_students(query).await
}

/// Fetch one iteration with withdrawn statuses relabelled for display.
pub async fn fetch_iterations(
    backend: &dyn AdmissionsBackend,
    iteration: u32,
) -> Result<ListPayload<IterationRecord>, ApiError> {
    let payload = backend.iteration_details(iteration).await?;
    Ok(payload.map(IterationRecord::normalize_status))
}

/// Iteration numbers to offer in the picker, `1..=count`
pub async fn iteration_numbers(backend: &dyn AdmissionsBackend) -> Result<Vec<u32>, ApiError> {
    let count = backend.iteration_count().await?;
    Ok((1..=count).collect())
}

pub async fn submit_upload(
    backend: &dyn AdmissionsBackend,
    request: &UploadRequest,
) -> Result<(), ApiError> {
    backend.upload(request.kind, &request.file).await
}

pub async fn withdraw_student(backend: &dyn AdmissionsBackend, app_no: &str) -> Result<(), ApiError> {
    backend.withdraw_student(app_no).await
}

/// Encode the shown rows and save them as `{base}_{timestamp}.csv`.
pub fn export_table<T>(
    exporter: &CsvExporter,
    schema: &TableSchema<T>,
    base: &str,
    records: &[T],
    format: &CellFormat,
    quoting: CsvQuoting,
) -> Result<PathBuf, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }
    let contents = encode_csv(schema, records, format, quoting)?;
    exporter.export(base, &contents)
}
