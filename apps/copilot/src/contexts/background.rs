use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::reasoning::ReasoningClient;
use crate::router::{MessageHandler, Request, Response};

/// Long-lived reasoning proxy. The only context that reads the API key.
pub struct BackgroundContext {
    reasoning: Arc<ReasoningClient>,
}

impl BackgroundContext {
    pub fn new(reasoning: Arc<ReasoningClient>) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl MessageHandler for BackgroundContext {
    async fn handle(&self, request: Request) -> Option<Response> {
        info!("Background handling {}", request.message_type());
        let response = match request {
            Request::Summarize { job_text } => {
                Response::Summary(self.reasoning.summarize(&job_text).await)
            }
            Request::Tailor {
                job_text,
                resume_text,
            } => Response::Tailored(self.reasoning.tailor(&job_text, &resume_text).await),
            Request::CoverLetter {
                job_text,
                resume_text,
                options,
            } => Response::CoverLetter(
                self.reasoning
                    .cover_letter(&job_text, &resume_text, &options)
                    .await,
            ),
            Request::ExtractJob => return None,
        };
        Some(response)
    }
}
