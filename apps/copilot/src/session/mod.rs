//! Session Store: the single owner of "is authenticated".
//!
//! Read once at startup via [`SessionStore::load`], then mutated only through
//! [`SessionStore::establish`] and [`SessionStore::teardown`].

pub mod handlers;
pub mod identity;

use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{AuthBackend, BackendError, ExternalCredential};
use crate::models::user::{Session, User};
use crate::storage::{keys, LocalStore, StorageError};

use self::identity::IdentityProvider;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SessionStore {
    store: Arc<dyn LocalStore>,
    auth: Arc<dyn AuthBackend>,
    identity: Arc<dyn IdentityProvider>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(
        store: Arc<dyn LocalStore>,
        auth: Arc<dyn AuthBackend>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            store,
            auth,
            identity,
            current: RwLock::new(None),
        }
    }

    /// Restores the persisted session. A half-written or unreadable entry is
    /// treated as no session at all.
    pub async fn load(&self) -> Result<Option<Session>, StorageError> {
        let mut found = self
            .store
            .get_many(&[keys::AUTH_TOKEN, keys::AUTH_USER])
            .await?;

        let session = match (found.remove(keys::AUTH_TOKEN), found.remove(keys::AUTH_USER)) {
            (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
                Ok(user) => Some(Session { token, user }),
                Err(e) => {
                    warn!("Discarding unreadable stored user: {e}");
                    None
                }
            },
            _ => None,
        };

        info!(
            "Session {}",
            if session.is_some() { "restored" } else { "not present" }
        );
        self.replace(session.clone());
        Ok(session)
    }

    /// Exchanges an external credential for a backend session and persists
    /// token and user together.
    pub async fn establish(&self, credential: &ExternalCredential) -> Result<Session, SessionError> {
        let session = self.auth.exchange(credential).await?;
        let user_json = serde_json::to_string(&session.user).map_err(StorageError::from)?;

        self.store
            .set_many(&[
                (keys::AUTH_TOKEN, session.token.clone()),
                (keys::AUTH_USER, user_json),
            ])
            .await?;

        self.identity.remember(credential);
        self.replace(Some(session.clone()));
        info!("Signed in as {}", session.user.email);
        Ok(session)
    }

    /// Signs out: revoke (best effort), clear durable entries, clear memory.
    /// Memory is cleared even when an earlier step fails.
    pub async fn teardown(&self) -> Result<(), StorageError> {
        if let Err(e) = self.identity.revoke_cached_token().await {
            warn!("Identity token revocation failed, continuing sign-out: {e}");
        }

        let cleared = self
            .store
            .remove_many(&[keys::AUTH_TOKEN, keys::AUTH_USER])
            .await;

        self.replace(None);
        info!("Signed out");
        cleared
    }

    pub fn is_authenticated(&self) -> bool {
        self.read()
            .as_ref()
            .is_some_and(|session| !session.token.is_empty())
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|session| session.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|session| session.user.clone())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace(&self, session: Option<Session>) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
    }
}
