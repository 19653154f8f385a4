//! Message Router: typed RPC between isolated contexts.
//!
//! Each registered context is reachable only through an mpsc endpoint. Its
//! listener hands every request to a task of its own, so a slow request never
//! holds up the next one. Every request carries a oneshot reply slot
//! that the receiving task either fills exactly once or drops. Callers see
//! three distinct outcomes: a response, an unreachable context (nothing
//! registered), or a receiver that went away without answering.

pub mod messages;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

pub use messages::{MessageType, Request, Response};

pub type TabId = u64;

const ENDPOINT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Page(TabId),
    Background,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Page(tab) => write!(f, "page context of tab {tab}"),
            Context::Background => f.write_str("background context"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RouterError {
    #[error("Could not establish connection: no receiver in the {context}. Reload the page and try again.")]
    Unreachable { context: Context },

    #[error("The {context} closed the channel before answering {message_type}")]
    NoResponse {
        context: Context,
        message_type: MessageType,
    },

    #[error("Expected a {expected} response, got {actual}")]
    UnexpectedResponse {
        expected: MessageType,
        actual: MessageType,
    },
}

impl RouterError {
    pub fn unexpected(expected: MessageType, actual: &Response) -> Self {
        RouterError::UnexpectedResponse {
            expected,
            actual: actual.message_type(),
        }
    }
}

/// A context's listener. Returning `None` means "not mine": the reply slot is
/// dropped and the caller gets [`RouterError::NoResponse`].
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Option<Response>;
}

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Response>,
}

#[derive(Default)]
pub struct MessageRouter {
    endpoints: RwLock<HashMap<Context, mpsc::Sender<Envelope>>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a listener task for `context`, replacing any previous one.
    /// Requests are dispatched in arrival order and handled concurrently.
    pub fn register(&self, context: Context, handler: Arc<dyn MessageHandler>) {
        let (tx, mut rx) = mpsc::channel::<Envelope>(ENDPOINT_CAPACITY);

        tokio::spawn(async move {
            while let Some(Envelope { request, reply }) = rx.recv().await {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let message_type = request.message_type();
                    match handler.handle(request).await {
                        Some(response) => {
                            if reply.send(response).is_err() {
                                debug!("Caller of {message_type} on {context} went away");
                            }
                        }
                        None => debug!("{context} ignored {message_type}"),
                    }
                });
            }
            debug!("Listener for {context} stopped");
        });

        self.endpoints_mut().insert(context, tx);
        debug!("Registered listener for {context}");
    }

    /// Removes the listener. In-flight requests still get their answer.
    pub fn unregister(&self, context: Context) {
        if self.endpoints_mut().remove(&context).is_some() {
            debug!("Unregistered listener for {context}");
        }
    }

    pub fn is_registered(&self, context: Context) -> bool {
        self.endpoints().contains_key(&context)
    }

    pub async fn send(&self, context: Context, request: Request) -> Result<Response, RouterError> {
        let message_type = request.message_type();
        let endpoint = self
            .endpoints()
            .get(&context)
            .cloned()
            .ok_or(RouterError::Unreachable { context })?;

        let (reply, response) = oneshot::channel();
        endpoint
            .send(Envelope { request, reply })
            .await
            .map_err(|_| RouterError::Unreachable { context })?;

        response.await.map_err(|_| {
            warn!("{context} dropped {message_type} without answering");
            RouterError::NoResponse {
                context,
                message_type,
            }
        })
    }

    fn endpoints(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Context, mpsc::Sender<Envelope>>> {
        self.endpoints
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn endpoints_mut(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<Context, mpsc::Sender<Envelope>>> {
        self.endpoints
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
