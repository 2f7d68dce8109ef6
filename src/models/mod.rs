use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod lenient;

/// Fee payment record for one application
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeeRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub app_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub admission_fees_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub admission_fees_status: bool,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub admission_fees_paid_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub admission_fees_uploaded_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub admission_fees_upload_date_time: Option<NaiveDateTime>,
    // The backend column names carry the "tution" spelling.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tution_fees_amount: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub tution_fees_status: bool,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub tution_fees_paid_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tution_fees_uploaded_by: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub tution_fees_upload_date_time: Option<NaiveDateTime>,
}

/// Raw iteration status the backend uses for withdrawn applications
pub const RAW_WITHDRAWN_STATUS: &str = "withdrawls";

/// Display label for withdrawn applications in iteration listings
pub const WITHDRAWN_LABEL: &str = "Withdrawn";

/// Offer made to an application in one iteration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IterationRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub app_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub itr_no: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub offer: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
}

impl IterationRecord {
    /// Replace the raw withdrawn status with its display label.
    pub fn normalize_status(mut self) -> Self {
        if self.status.as_deref() == Some(RAW_WITHDRAWN_STATUS) {
            self.status = Some(WITHDRAWN_LABEL.to_string());
        }
        self
    }

    pub fn is_withdrawn(&self) -> bool {
        self.status.as_deref() == Some(WITHDRAWN_LABEL)
    }
}

/// Student status value that marks an already withdrawn student
pub const STUDENT_WITHDRAWN_STATUS: &str = "withdraw";

/// Student search row (one per application and iteration)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StudentRecord {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub app_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub itr_no: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub offer: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub scholarship: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
}

impl StudentRecord {
    pub fn is_withdrawn(&self) -> bool {
        self.status.as_deref() == Some(STUDENT_WITHDRAWN_STATUS)
    }
}

/// Dashboard summary from `/api/stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub accepted_students: u64,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub latest_iteration_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_timestamp")]
    pub latest_iteration_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub gender_stats: BTreeMap<String, u64>,
}

/// One slice of the gender distribution
#[derive(Debug, Clone, PartialEq)]
pub struct GenderShare {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

impl GenderShare {
    /// Percentage label with one decimal, e.g. `62.5%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

impl StatsSummary {
    /// Share of each gender category in the total.
    pub fn gender_shares(&self) -> Vec<GenderShare> {
        let total: u64 = self.gender_stats.values().sum();
        self.gender_stats
            .iter()
            .map(|(label, &count)| GenderShare {
                label: label.clone(),
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                },
            })
            .collect()
    }
}

/// Current session identity from `/api/user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// `/api/iteration-count` response
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IterationCount {
    #[serde(default)]
    pub count: u32,
}

/// Message-only server response (`{"message": ...}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub message: String,
}

/// Body of a list endpoint: an array, a "no results" message, or a bare record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Records(Vec<T>),
    Message(ServerMessage),
    Single(T),
}

impl<T> ListPayload<T> {
    /// Flatten into rows plus the server message, if any.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            ListPayload::Records(records) => (records, None),
            ListPayload::Message(msg) => (Vec::new(), Some(msg.message)),
            ListPayload::Single(record) => (vec![record], None),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ListPayload<U> {
        match self {
            ListPayload::Records(records) => ListPayload::Records(records.into_iter().map(f).collect()),
            ListPayload::Message(msg) => ListPayload::Message(msg),
            ListPayload::Single(record) => ListPayload::Single(f(record)),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub export_dir: PathBuf,
    pub date_format: String,
    pub request_timeout_secs: u64,
    pub login_email: Option<String>,
    pub login_password: Option<String>,
    pub log_file: Option<PathBuf>,
}

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            export_dir: PathBuf::from("."),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            request_timeout_secs: 30,
            login_email: None,
            login_password: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = non_empty("ADMISSIONS_API_BASE").unwrap_or(defaults.api_base);
        url::Url::parse(&api_base)
            .map_err(|e| anyhow::anyhow!("ADMISSIONS_API_BASE is not a valid URL ({}): {}", api_base, e))?;

        let request_timeout_secs = match non_empty("ADMISSIONS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("ADMISSIONS_TIMEOUT_SECS must be a whole number of seconds, got {:?}", raw))?,
            None => defaults.request_timeout_secs,
        };

        let date_format = non_empty("ADMISSIONS_DATE_FORMAT").unwrap_or(defaults.date_format);
        let invalid_format = chrono::format::StrftimeItems::new(&date_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if invalid_format {
            return Err(anyhow::anyhow!(
                "ADMISSIONS_DATE_FORMAT is not a valid strftime format: {:?}",
                date_format
            ));
        }

        Ok(Config {
            api_base: api_base.trim_end_matches('/').to_string(),
            export_dir: non_empty("ADMISSIONS_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            date_format,
            request_timeout_secs,
            login_email: non_empty("ADMISSIONS_EMAIL"),
            login_password: non_empty("ADMISSIONS_PASSWORD"),
            log_file: non_empty("ADMISSIONS_LOG_FILE").map(PathBuf::from),
        })
    }
}
