use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::extractor::{self, PageSnapshot};
use crate::router::{MessageHandler, Request, Response};

/// Content-script side of one tab. Owns the live DOM and answers
/// `EXTRACT_JOB` against whatever snapshot is current at call time.
pub struct PageContext {
    snapshot: RwLock<PageSnapshot>,
}

impl PageContext {
    pub fn new(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    pub fn replace(&self, snapshot: PageSnapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl MessageHandler for PageContext {
    async fn handle(&self, request: Request) -> Option<Response> {
        match request {
            Request::ExtractJob => {
                let snapshot = self.snapshot();
                let job = extractor::extract(&snapshot);
                info!(
                    "Extracted {} chars from {}",
                    job.text().chars().count(),
                    job.url()
                );
                Some(Response::Job(job))
            }
            _ => None,
        }
    }
}
