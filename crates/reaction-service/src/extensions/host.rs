//! Extension host
//!
//! Holds registered extensions in registration order and reports whether the
//! extension subsystem is ready to receive hooks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use reaction_core::{Extension, ExtensionRegistry};
use tracing::info;

/// In-memory extension registry
#[derive(Default)]
pub struct ExtensionHost {
    extensions: RwLock<Vec<Arc<dyn Extension>>>,
    ready: AtomicBool,
}

impl ExtensionHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension
    ///
    /// Re-registering an id replaces the old instance in its original position.
    pub fn register(&self, extension: Arc<dyn Extension>) {
        let mut extensions = self.extensions.write();
        let id = extension.id().to_string();

        if let Some(slot) = extensions.iter_mut().find(|e| e.id() == id) {
            *slot = extension;
            info!(extension = %id, "Extension replaced");
        } else {
            extensions.push(extension);
            info!(extension = %id, "Extension registered");
        }
    }

    /// Remove an extension by id; returns whether it was registered
    pub fn unregister(&self, id: &str) -> bool {
        let mut extensions = self.extensions.write();
        let before = extensions.len();
        extensions.retain(|e| e.id() != id);

        let removed = extensions.len() != before;
        if removed {
            info!(extension = %id, "Extension unregistered");
        }
        removed
    }

    /// Mark the subsystem as started or stopped
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Ids in registration order
    pub fn ids(&self) -> Vec<String> {
        self.extensions
            .read()
            .iter()
            .map(|e| e.id().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.read().is_empty()
    }
}

impl ExtensionRegistry for ExtensionHost {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn extensions(&self) -> Vec<Arc<dyn Extension>> {
        self.extensions.read().clone()
    }
}

impl std::fmt::Debug for ExtensionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionHost")
            .field("extensions", &self.ids())
            .field("ready", &self.is_ready())
            .finish()
    }
}
