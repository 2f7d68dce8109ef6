use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::models::{
    FeeRecord, IterationRecord, ListPayload, StatsSummary, StudentRecord, UserInfo,
};

pub mod dashboard_client;
pub use dashboard_client::DashboardClient;

/// Errors raised while talking to the admissions backend
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned {status}{}", detail_suffix(.detail))]
    Status {
        path: String,
        status: reqwest::StatusCode,
        detail: Option<String>,
    },

    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("could not read upload file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid backend URL {0}")]
    InvalidBaseUrl(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default()
}

impl ApiError {
    /// Server-supplied detail message, when the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Bulk CSV upload targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Master,
    Iteration,
    Fees,
    Withdraw,
}

impl UploadKind {
    pub const ALL: [UploadKind; 4] = [
        UploadKind::Master,
        UploadKind::Iteration,
        UploadKind::Fees,
        UploadKind::Withdraw,
    ];

    /// Backend endpoint accepting this upload
    pub fn endpoint(self) -> &'static str {
        match self {
            UploadKind::Master => "/update/MASTER_TABLE",
            UploadKind::Iteration => "/update/ITERATION_OFFER",
            UploadKind::Fees => "/update/FEES_PAID",
            UploadKind::Withdraw => "/api/withdraw/upload",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UploadKind::Master => "master",
            UploadKind::Iteration => "iteration",
            UploadKind::Fees => "fees",
            UploadKind::Withdraw => "withdraw",
        }
    }

    /// Button caption, e.g. "Upload Master File"
    pub fn caption(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("Upload {} File", capitalized)
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "master" => Ok(UploadKind::Master),
            "iteration" => Ok(UploadKind::Iteration),
            "fees" => Ok(UploadKind::Fees),
            "withdraw" => Ok(UploadKind::Withdraw),
            other => Err(format!(
                "unknown upload type {:?} (expected master, iteration, fees or withdraw)",
                other
            )),
        }
    }
}

/// Operations the dashboard needs from the admissions backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdmissionsBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn current_user(&self) -> Result<UserInfo, ApiError>;
    async fn stats(&self) -> Result<StatsSummary, ApiError>;
    async fn search_fees(&self, query: &str) -> Result<ListPayload<FeeRecord>, ApiError>;
    async fn search_students(&self, query: &str) -> Result<ListPayload<StudentRecord>, ApiError>;
    async fn iteration_count(&self) -> Result<u32, ApiError>;
    async fn iteration_details(&self, iteration: u32) -> Result<ListPayload<IterationRecord>, ApiError>;
    async fn withdraw_student(&self, app_no: &str) -> Result<(), ApiError>;
    async fn upload(&self, kind: UploadKind, file: &Path) -> Result<(), ApiError>;
    async fn forgot_password(&self, email: &str) -> Result<String, ApiError>;
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<String, ApiError>;
}
