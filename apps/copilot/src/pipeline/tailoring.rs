//! Tailoring: the second, independent state machine, and the two engines
//! that can produce a [`TailoredResumeResult`].

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::backend::ResumeStore;
use crate::models::tailor::TailoredResumeResult;
use crate::router::{Context, MessageRouter, MessageType, Request, Response, RouterError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TailorStatus {
    #[default]
    Idle,
    Tailoring,
    Done,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TailoringView {
    pub status: TailorStatus,
    pub result: Option<TailoredResumeResult>,
    pub error: Option<String>,
    /// URL of the job the result was tailored against.
    pub job_url: Option<String>,
}

/// Where tailoring runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailorMode {
    #[default]
    Backend,
    Direct,
}

impl FromStr for TailorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "backend" => Ok(TailorMode::Backend),
            "direct" => Ok(TailorMode::Direct),
            other => Err(format!("unknown tailor mode '{other}', expected backend or direct")),
        }
    }
}

#[async_trait]
pub trait TailorEngine: Send + Sync {
    /// Failures come back as the message the UI shows.
    async fn tailor(
        &self,
        token: &str,
        job_text: &str,
        resume_text: &str,
    ) -> Result<TailoredResumeResult, String>;
}

/// `POST /resume/tailor` on the backend.
pub struct BackendTailor {
    resumes: Arc<dyn ResumeStore>,
}

impl BackendTailor {
    pub fn new(resumes: Arc<dyn ResumeStore>) -> Self {
        Self { resumes }
    }
}

#[async_trait]
impl TailorEngine for BackendTailor {
    async fn tailor(
        &self,
        token: &str,
        job_text: &str,
        resume_text: &str,
    ) -> Result<TailoredResumeResult, String> {
        self.resumes
            .tailor(token, job_text, resume_text)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Prompt built locally and sent through the background context.
pub struct DirectTailor {
    router: Arc<MessageRouter>,
}

impl DirectTailor {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl TailorEngine for DirectTailor {
    async fn tailor(
        &self,
        _token: &str,
        job_text: &str,
        resume_text: &str,
    ) -> Result<TailoredResumeResult, String> {
        let request = Request::Tailor {
            job_text: job_text.to_string(),
            resume_text: resume_text.to_string(),
        };
        match self.router.send(Context::Background, request).await {
            Ok(Response::Tailored(outcome)) => outcome.into_result(),
            Ok(other) => Err(RouterError::unexpected(MessageType::Tailor, &other).to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

pub fn engine_for(
    mode: TailorMode,
    router: Arc<MessageRouter>,
    resumes: Arc<dyn ResumeStore>,
) -> Arc<dyn TailorEngine> {
    match mode {
        TailorMode::Backend => Arc::new(BackendTailor::new(resumes)),
        TailorMode::Direct => Arc::new(DirectTailor::new(router)),
    }
}
