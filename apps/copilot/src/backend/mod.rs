//! Resume/Auth backend: the only module that calls the resume store.
//!
//! Every resume call carries the session's bearer token. Failures carry the
//! backend's `detail` string when it sent one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::resume::MasterResume;
use crate::models::tailor::TailoredResumeResult;
use crate::models::user::Session;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const GENERIC_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request to backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Credential handed over by the third-party identity flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalCredential {
    /// From a web sign-in button.
    IdToken(String),
    /// From the browser's identity API.
    AccessToken(String),
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn exchange(&self, credential: &ExternalCredential) -> Result<Session, BackendError>;
}

/// Master-resume CRUD plus server-side tailoring, all bearer-token gated.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// `Ok(None)` when the user has not uploaded a resume yet.
    async fn get_master(&self, token: &str) -> Result<Option<MasterResume>, BackendError>;

    async fn put_master(&self, token: &str, raw_text: &str) -> Result<MasterResume, BackendError>;

    async fn delete_master(&self, token: &str) -> Result<(), BackendError>;

    async fn tailor(
        &self,
        token: &str,
        job_description: &str,
        master_resume: &str,
    ) -> Result<TailoredResumeResult, BackendError>;
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: Option<serde_json::Value>,
}

/// FastAPI-style `{"detail": ...}`; validation errors send a list, which is
/// flattened to its first message.
fn error_detail(body: &str) -> Option<String> {
    match serde_json::from_str::<ErrorDetail>(body).ok()?.detail? {
        serde_json::Value::String(detail) => Some(detail),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ResumeBody<'a> {
    raw_text: &'a str,
}

#[derive(Debug, Serialize)]
struct TailorBody<'a> {
    job_description: &'a str,
    master_resume: &'a str,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| GENERIC_ERROR.to_string());
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AuthBackend for BackendClient {
    async fn exchange(&self, credential: &ExternalCredential) -> Result<Session, BackendError> {
        let request = match credential {
            ExternalCredential::IdToken(token) => self
                .client
                .post(self.url("/auth/google"))
                .json(&serde_json::json!({ "id_token": token })),
            ExternalCredential::AccessToken(token) => self
                .client
                .post(self.url("/auth/google/access-token"))
                .json(&serde_json::json!({ "access_token": token })),
        };

        let session: Session = self.send_json(request).await?;
        info!("Backend session issued for user {}", session.user.id);
        Ok(session)
    }
}

#[async_trait]
impl ResumeStore for BackendClient {
    async fn get_master(&self, token: &str) -> Result<Option<MasterResume>, BackendError> {
        let request = self
            .client
            .get(self.url("/resume/master"))
            .bearer_auth(token);

        match self.send_json(request).await {
            Ok(resume) => Ok(Some(resume)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                debug!("No master resume stored yet");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn put_master(&self, token: &str, raw_text: &str) -> Result<MasterResume, BackendError> {
        let request = self
            .client
            .put(self.url("/resume/master"))
            .bearer_auth(token)
            .json(&ResumeBody { raw_text });
        self.send_json(request).await
    }

    async fn delete_master(&self, token: &str) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.url("/resume/master"))
            .bearer_auth(token);
        self.send(request).await?;
        Ok(())
    }

    async fn tailor(
        &self,
        token: &str,
        job_description: &str,
        master_resume: &str,
    ) -> Result<TailoredResumeResult, BackendError> {
        let request = self
            .client
            .post(self.url("/resume/tailor"))
            .bearer_auth(token)
            .json(&TailorBody {
                job_description,
                master_resume,
            });
        self.send_json(request).await
    }
}
