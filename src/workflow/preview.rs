//! Local preview references for a selected image.
//!
//! A preview is acquired when a file is selected and must be released
//! exactly once: when the file is replaced, when the workflow is reset, or
//! when the workflow is dropped. `PreviewHandle` owns that obligation.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ImageBlob;

/// Creates and revokes displayable references to local blobs.
pub trait PreviewStore: Send + Sync {
    fn create(&self, blob: &ImageBlob) -> String;
    fn revoke(&self, url: &str);
}

/// Scoped ownership of one preview URL; revokes it on drop.
pub struct PreviewHandle {
    url: String,
    store: Arc<dyn PreviewStore>,
}

impl PreviewHandle {
    pub fn acquire(store: Arc<dyn PreviewStore>, blob: &ImageBlob) -> Self {
        let url = store.create(blob);
        Self { url, store }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewHandle").field("url", &self.url).finish()
    }
}

/// Process-local store handing out `blob:preview/<uuid>` references.
#[derive(Default)]
pub struct InMemoryPreviewStore {
    live: Mutex<HashSet<String>>,
    created: AtomicU64,
    revoked: AtomicU64,
}

impl InMemoryPreviewStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live
            .lock()
            .map(|live| live.contains(url))
            .unwrap_or(false)
    }

    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    pub fn revoked(&self) -> u64 {
        self.revoked.load(Ordering::Relaxed)
    }
}

impl PreviewStore for InMemoryPreviewStore {
    fn create(&self, blob: &ImageBlob) -> String {
        let url = format!("blob:preview/{}", Uuid::new_v4());
        if let Ok(mut live) = self.live.lock() {
            live.insert(url.clone());
        }
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(file = %blob.file_name, %url, "preview created");
        url
    }

    fn revoke(&self, url: &str) {
        let removed = self
            .live
            .lock()
            .map(|mut live| live.remove(url))
            .unwrap_or(false);

        if removed {
            self.revoked.fetch_add(1, Ordering::Relaxed);
            debug!(%url, "preview revoked");
        } else {
            warn!(%url, "revoking a preview that is not live");
        }
    }
}
