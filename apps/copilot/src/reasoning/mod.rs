//! Reasoning Client: the single point of entry for generative-language calls.
//!
//! Every operation builds a fixed prompt, calls `generateContent` with a low
//! temperature and bounded output, fence-strips the reply and parses it.
//! Failures of any kind come back as [`ReasoningOutcome::Failure`] so callers
//! never have to tell the error sources apart.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::models::cover_letter::{CoverLetter, CoverLetterOptions};
use crate::models::summary::JobSummary;
use crate::models::tailor::TailoredResumeResult;
use crate::storage::StorageError;

pub mod fence;
pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub const SUMMARIZE_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.3,
    max_output_tokens: 1024,
};

pub const TAILOR_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    max_output_tokens: 4096,
};

pub const COVER_LETTER_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    max_output_tokens: 4096,
};

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("Reasoning API key not set. Please add your API key in settings.")]
    MissingCredential,

    #[error("Could not read the stored API key: {0}")]
    Storage(#[from] StorageError),

    #[error("Request to reasoning service failed: {0}")]
    Http(reqwest::Error),

    /// `message` is the service's own error text when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("No response from reasoning service")]
    EmptyResponse,

    #[error("Failed to parse reasoning response: {0}")]
    Parse(#[from] serde_json::Error),
}

// Transport errors print their URL; drop it so nothing request-specific
// reaches logs or the UI.
impl From<reqwest::Error> for ReasoningError {
    fn from(e: reqwest::Error) -> Self {
        ReasoningError::Http(e.without_url())
    }
}

/// Tagged result handed across the orchestrator boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningOutcome<T> {
    Success(T),
    Failure { error: String },
}

impl<T> ReasoningOutcome<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        ReasoningOutcome::Failure {
            error: error.into(),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ReasoningOutcome::Success(value) => Ok(value),
            ReasoningOutcome::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, ReasoningError>> for ReasoningOutcome<T> {
    fn from(result: Result<T, ReasoningError>) -> Self {
        match result {
            Ok(value) => ReasoningOutcome::Success(value),
            Err(e) => {
                warn!("Reasoning call failed: {e}");
                ReasoningOutcome::failure(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if non-empty.
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

fn service_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ServiceError>(body)
        .ok()?
        .error?
        .message
        .filter(|message| !message.is_empty())
}

#[derive(Clone)]
pub struct ReasoningClient {
    client: Client,
    api_base: String,
    model: String,
    credentials: Arc<CredentialStore>,
}

impl ReasoningClient {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ReasoningError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            credentials,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Raw call: returns the model's text. Fails fast, without touching the
    /// network, when no API key is stored. No retries.
    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<String, ReasoningError> {
        let api_key = self
            .credentials
            .get()
            .await?
            .ok_or(ReasoningError::MissingCredential)?;

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: config,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key.as_str())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = service_error_message(&body)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            warn!("Reasoning service returned {}: {}", status, message);
            return Err(ReasoningError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Err(ReasoningError::EmptyResponse);
        }
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Reasoning call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed
            .text()
            .map(str::to_string)
            .ok_or(ReasoningError::EmptyResponse)
    }

    /// Calls the service and parses its text as (optionally fenced) JSON.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<T, ReasoningError> {
        let text = self.generate(prompt, config).await?;
        fence::parse_fenced_json(&text)
    }

    pub async fn summarize(&self, job_text: &str) -> ReasoningOutcome<JobSummary> {
        let prompt = prompts::summarize_prompt(job_text);
        self.generate_json(&prompt, SUMMARIZE_CONFIG).await.into()
    }

    pub async fn tailor(
        &self,
        job_text: &str,
        resume_text: &str,
    ) -> ReasoningOutcome<TailoredResumeResult> {
        let prompt = prompts::tailor_prompt(job_text, resume_text);
        self.generate_json(&prompt, TAILOR_CONFIG).await.into()
    }

    pub async fn cover_letter(
        &self,
        job_text: &str,
        resume_text: &str,
        options: &CoverLetterOptions,
    ) -> ReasoningOutcome<CoverLetter> {
        let prompt = prompts::cover_letter_prompt(job_text, resume_text, options);
        self.generate_json(&prompt, COVER_LETTER_CONFIG)
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::storage::{LocalStore, MemoryStore};
    use crate::test_support::spawn_server;

    struct FakeService {
        url: String,
        hits: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<Value>>>,
    }

    async fn fake_service(status: StatusCode, body: String) -> FakeService {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));

        let (counter, recorder) = (hits.clone(), last_request.clone());
        let app = Router::new().route(
            "/models/:call",
            post(
                move |headers: HeaderMap, Json(request): Json<Value>| {
                    let (counter, recorder, body) = (counter.clone(), recorder.clone(), body.clone());
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        *recorder.lock().unwrap() = Some(request);
                        let key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
                        if key != Some("test-key") {
                            return (StatusCode::FORBIDDEN, "{}".to_string());
                        }
                        (status, body)
                    }
                },
            ),
        );

        FakeService {
            url: spawn_server(app).await,
            hits,
            last_request,
        }
    }

    fn candidate_body(text: &str) -> String {
        json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        })
        .to_string()
    }

    async fn client_for(url: &str, api_key: Option<&str>) -> ReasoningClient {
        let store: Arc<dyn LocalStore> = Arc::new(MemoryStore::new());
        let credentials = Arc::new(CredentialStore::new(store));
        if let Some(key) = api_key {
            credentials.set(key).await.unwrap();
        }
        ReasoningClient::new(url, "test-model", Duration::from_secs(5), credentials).unwrap()
    }

    #[tokio::test]
    async fn test_summarize_parses_fenced_json() {
        let text = "```json\n{\"roleOverview\":\"A\",\"responsibilities\":[],\"requirements\":[],\"techAndTools\":[]}\n```";
        let service = fake_service(StatusCode::OK, candidate_body(text)).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let outcome = client.summarize("Senior Rust Engineer").await;

        assert_eq!(
            outcome,
            ReasoningOutcome::Success(JobSummary {
                role_overview: "A".to_string(),
                responsibilities: vec![],
                requirements: vec![],
                tech_and_tools: vec![],
            })
        );
        let request = service.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 1024);
        assert!(request["generationConfig"]["temperature"].as_f64().unwrap() < 0.5);
        let prompt = request["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("Senior Rust Engineer"));
    }

    #[tokio::test]
    async fn test_transport_failure_never_exposes_api_key() {
        // nothing listens on the discard port
        let client = client_for("http://127.0.0.1:9", Some("AIzaSECRETKEY123")).await;

        let outcome = client.summarize("job").await;

        let ReasoningOutcome::Failure { error } = outcome else {
            panic!("expected a transport failure");
        };
        assert!(error.starts_with("Request to reasoning service failed"));
        assert!(!error.contains("AIzaSECRETKEY123"));
        assert!(!error.contains("key="));
    }

    #[tokio::test]
    async fn test_service_error_message_is_surfaced_verbatim() {
        let body = json!({"error": {"message": "quota exceeded"}}).to_string();
        let service = fake_service(StatusCode::TOO_MANY_REQUESTS, body).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let outcome = client.summarize("job").await;

        assert_eq!(outcome, ReasoningOutcome::failure("quota exceeded"));
        // no retry on 429
        assert_eq!(service.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_without_message_uses_status() {
        let service =
            fake_service(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>".to_string()).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let outcome = client.summarize("job").await;

        assert_eq!(outcome, ReasoningOutcome::failure("API error: 500"));
    }

    #[tokio::test]
    async fn test_missing_candidates_is_no_response() {
        let service = fake_service(StatusCode::OK, json!({"candidates": []}).to_string()).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let outcome = client.summarize("job").await;

        assert_eq!(
            outcome,
            ReasoningOutcome::failure("No response from reasoning service")
        );
    }

    #[tokio::test]
    async fn test_invalid_json_reply_is_parse_failure() {
        let service = fake_service(StatusCode::OK, candidate_body("Sure! Here is a summary.")).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let error = client.summarize("job").await.into_result().unwrap_err();

        assert!(error.starts_with("Failed to parse reasoning response"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network_call() {
        let service = fake_service(StatusCode::OK, candidate_body("{}")).await;
        let client = client_for(&service.url, None).await;

        let outcome = client.summarize("job").await;

        assert_eq!(
            outcome,
            ReasoningOutcome::failure(
                "Reasoning API key not set. Please add your API key in settings."
            )
        );
        assert_eq!(service.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tailor_uses_larger_budget() {
        let reply = json!({
            "tailored_resume": "Jane",
            "tailored_resume_latex": "\\documentclass{article}",
            "changes_made": [],
            "keywords_matched": ["Rust"],
            "keywords_missing": [],
            "keyword_variants_used": [],
            "clarifying_questions": []
        })
        .to_string();
        let service = fake_service(StatusCode::OK, candidate_body(&reply)).await;
        let client = client_for(&service.url, Some("test-key")).await;

        let result = client.tailor("job", "resume").await.into_result().unwrap();

        assert_eq!(result.tailored_resume_plain, "Jane");
        let request = service.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request["generationConfig"]["maxOutputTokens"], 4096);
    }
}
