use anyhow::Result;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{AdmissionsBackend, ApiError, UploadKind};
use crate::models::{
    Config, FeeRecord, IterationCount, IterationRecord, ListPayload, ServerMessage, StatsSummary,
    StudentRecord, UserInfo,
};

/// HTTP client for the admissions backend.
///
/// The backend authenticates with a `token` cookie set by `/api/login`, so the
/// underlying reqwest client keeps a cookie store for the lifetime of this value.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    client: Client,
    base_url: String,
}

impl DashboardClient {
    /// Create a new client rooted at the configured backend origin
    pub fn new(config: &Config) -> Result<Self> {
        let base = url::Url::parse(&config.api_base)
            .map_err(|_| ApiError::InvalidBaseUrl(config.api_base.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("admission-dashboard/1.0")
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into `ApiError::Status`, keeping the server detail.
    async fn check(path: &str, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!("{} failed with {}: {:?}", path, status, detail);

        Err(ApiError::Status {
            path: path.to_string(),
            status,
            detail,
        })
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
        let body = response.text().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        debug!("{} returned {} bytes", path, body.len());

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        let response = Self::check(path, response).await?;
        Self::decode(path, response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Response, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        Self::check(path, response).await
    }

    async fn post_form(&self, path: &str, form: multipart::Form) -> Result<Response, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        Self::check(path, response).await
    }
}

/// Pull a human readable reason out of an error body.
///
/// FastAPI errors carry `{"detail": ...}`; a few handlers answer `{"message": ...}`.
fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => ["detail", "message"]
            .iter()
            .find_map(|key| value.get(*key))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl AdmissionsBackend for DashboardClient {
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        info!("Logging in as {}", email);
        self.post_json("/api/login", &json!({ "email": email, "password": password }))
            .await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let path = "/api/logout";
        let response = self
            .client
            .post(self.url(path))
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;
        Self::check(path, response).await?;
        info!("Session closed");
        Ok(())
    }

    async fn current_user(&self) -> Result<UserInfo, ApiError> {
        self.get_json("/api/user", &[]).await
    }

    async fn stats(&self) -> Result<StatsSummary, ApiError> {
        self.get_json("/api/stats", &[]).await
    }

    async fn search_fees(&self, query: &str) -> Result<ListPayload<FeeRecord>, ApiError> {
        self.get_json("/api/fees", &[("query", query.to_string())]).await
    }

    async fn search_students(&self, query: &str) -> Result<ListPayload<StudentRecord>, ApiError> {
        self.get_json("/api/students", &[("query", query.to_string())])
            .await
    }

    async fn iteration_count(&self) -> Result<u32, ApiError> {
        let count: IterationCount = self.get_json("/api/iteration-count", &[]).await?;
        Ok(count.count)
    }

    async fn iteration_details(&self, iteration: u32) -> Result<ListPayload<IterationRecord>, ApiError> {
        self.get_json("/api/iterations", &[("iteration", iteration.to_string())])
            .await
    }

    async fn withdraw_student(&self, app_no: &str) -> Result<(), ApiError> {
        info!("Withdrawing application {}", app_no);
        self.post_json("/api/withdraw/student", &json!({ "app_no": app_no }))
            .await?;
        Ok(())
    }

    async fn upload(&self, kind: UploadKind, file: &Path) -> Result<(), ApiError> {
        let path = kind.endpoint();
        let bytes = tokio::fs::read(file).await.map_err(|source| ApiError::Io {
            path: file.display().to_string(),
            source,
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        info!("Uploading {} ({} bytes) as {} data", file_name, bytes.len(), kind);

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })?;

        self.post_form(path, multipart::Form::new().part("file", part))
            .await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let path = "/api/forgot-password";
        let response = self.post_json(path, &json!({ "email": email })).await?;
        let message: ServerMessage = Self::decode(path, response).await?;
        Ok(message.message)
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<String, ApiError> {
        let path = "/api/reset-password";
        let form = multipart::Form::new()
            .text("token", token.to_string())
            .text("new_password", new_password.to_string());
        let response = self.post_form(path, form).await?;
        let message: ServerMessage = Self::decode(path, response).await?;
        Ok(message.message)
    }
}
