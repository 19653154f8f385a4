//! Platform identity subsystem: remembers the external access token handed to
//! `establish` so that sign-out can revoke it.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::backend::ExternalCredential;

pub const DEFAULT_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Revocation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Identity provider refused revocation (status {0})")]
    Rejected(u16),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Called after a successful exchange.
    fn remember(&self, credential: &ExternalCredential);

    /// Revokes and forgets whatever token is cached. No-op when nothing is.
    async fn revoke_cached_token(&self) -> Result<(), IdentityError>;
}

pub struct GoogleIdentity {
    client: Client,
    revoke_url: String,
    cached_token: Mutex<Option<String>>,
}

impl GoogleIdentity {
    pub fn new(revoke_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            revoke_url: revoke_url.into(),
            cached_token: Mutex::new(None),
        })
    }

    fn take_cached(&self) -> Option<String> {
        self.cached_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    fn remember(&self, credential: &ExternalCredential) {
        // ID tokens are self-contained and cannot be revoked
        if let ExternalCredential::AccessToken(token) = credential {
            *self
                .cached_token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());
        }
    }

    async fn revoke_cached_token(&self) -> Result<(), IdentityError> {
        let Some(token) = self.take_cached() else {
            debug!("No cached identity token to revoke");
            return Ok(());
        };

        let response = self
            .client
            .post(&self.revoke_url)
            .form(&[("token", token.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected(response.status().as_u16()));
        }

        info!("Cached identity token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Router};

    use super::*;
    use crate::test_support::spawn_server;

    async fn revoke_endpoint(status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/revoke",
            post(move |body: String| {
                let counter = counter.clone();
                async move {
                    if body.contains("token=") {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    status
                }
            }),
        );
        (format!("{}/revoke", spawn_server(app).await), hits)
    }

    #[tokio::test]
    async fn test_revokes_remembered_access_token_once() {
        let (url, hits) = revoke_endpoint(StatusCode::OK).await;
        let identity = GoogleIdentity::new(url, Duration::from_secs(5)).unwrap();
        identity.remember(&ExternalCredential::AccessToken("ya29".to_string()));

        identity.revoke_cached_token().await.unwrap();
        identity.revoke_cached_token().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_id_token_is_not_cached() {
        let (url, hits) = revoke_endpoint(StatusCode::OK).await;
        let identity = GoogleIdentity::new(url, Duration::from_secs(5)).unwrap();
        identity.remember(&ExternalCredential::IdToken("eyJ".to_string()));

        identity.revoke_cached_token().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let (url, _) = revoke_endpoint(StatusCode::BAD_REQUEST).await;
        let identity = GoogleIdentity::new(url, Duration::from_secs(5)).unwrap();
        identity.remember(&ExternalCredential::AccessToken("ya29".to_string()));

        let err = identity.revoke_cached_token().await.unwrap_err();

        assert!(matches!(err, IdentityError::Rejected(400)));
    }
}
