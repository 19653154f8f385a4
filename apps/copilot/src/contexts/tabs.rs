//! Browser tabs as the service sees them: attached snapshots, the active tab,
//! and which tabs have a content script listening.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::extractor::PageSnapshot;
use crate::router::{Context, MessageRouter, TabId};

use super::page::PageContext;

#[derive(Debug, Error, PartialEq)]
pub enum TabError {
    #[error("Tab {0} not found")]
    NotFound(TabId),
}

#[derive(Debug, Clone, Serialize)]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    pub scriptable: bool,
    pub active: bool,
}

pub struct TabRegistry {
    router: Arc<MessageRouter>,
    tabs: RwLock<HashMap<TabId, Arc<PageContext>>>,
    active: RwLock<Option<TabId>>,
    next_id: AtomicU64,
}

impl TabRegistry {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self {
            router,
            tabs: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Opens a tab and makes it active. Non-scriptable tabs (browser-internal
    /// pages) never get a listener, so messages to them are unreachable.
    pub fn attach(&self, snapshot: PageSnapshot, scriptable: bool) -> TabId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = snapshot.url.clone();
        let page = Arc::new(PageContext::new(snapshot));

        if scriptable {
            self.router.register(Context::Page(id), page.clone());
        }
        self.write_tabs().insert(id, page);
        self.set_active(Some(id));

        info!("Attached tab {id} ({url}), scriptable={scriptable}");
        id
    }

    pub fn update(&self, id: TabId, snapshot: PageSnapshot) -> Result<(), TabError> {
        let tabs = self.read_tabs();
        let page = tabs.get(&id).ok_or(TabError::NotFound(id))?;
        page.replace(snapshot);
        Ok(())
    }

    pub fn activate(&self, id: TabId) -> Result<(), TabError> {
        if !self.read_tabs().contains_key(&id) {
            return Err(TabError::NotFound(id));
        }
        self.set_active(Some(id));
        Ok(())
    }

    pub fn close(&self, id: TabId) -> Result<(), TabError> {
        self.write_tabs().remove(&id).ok_or(TabError::NotFound(id))?;
        self.router.unregister(Context::Page(id));

        let mut active = self.active.write().unwrap_or_else(|p| p.into_inner());
        if *active == Some(id) {
            *active = None;
        }
        info!("Closed tab {id}");
        Ok(())
    }

    pub fn active(&self) -> Option<TabId> {
        *self.active.read().unwrap_or_else(|p| p.into_inner())
    }

    pub fn list(&self) -> Vec<TabInfo> {
        let active = self.active();
        let mut tabs: Vec<TabInfo> = self
            .read_tabs()
            .iter()
            .map(|(id, page)| TabInfo {
                id: *id,
                url: page.snapshot().url,
                scriptable: self.router.is_registered(Context::Page(*id)),
                active: active == Some(*id),
            })
            .collect();
        tabs.sort_by_key(|tab| tab.id);
        tabs
    }

    fn set_active(&self, id: Option<TabId>) {
        *self.active.write().unwrap_or_else(|p| p.into_inner()) = id;
    }

    fn read_tabs(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TabId, Arc<PageContext>>> {
        self.tabs.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_tabs(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<TabId, Arc<PageContext>>> {
        self.tabs.write().unwrap_or_else(|p| p.into_inner())
    }
}
