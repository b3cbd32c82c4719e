//! Sequential delivery of a hook to registered extensions
//!
//! Extensions are invoked one at a time in registration order. A failing,
//! panicking or timed-out extension is logged and skipped; an extension
//! returning `HookFlow::Stop` ends delivery for everyone registered after it.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reaction_core::{Extension, ExtensionRegistry, Hook, HookFlow, HookResult, Post, Reaction};
use tracing::{debug, error, warn};

use super::pool::panic_message;

/// What happened during one multicast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MulticastReport {
    /// Extensions whose hook returned normally, in invocation order
    pub delivered: Vec<String>,
    /// Extensions whose hook returned an error, panicked or timed out
    pub failed: Vec<String>,
    /// Extension that halted delivery, if any
    pub stopped_by: Option<String>,
}

impl MulticastReport {
    /// Number of extensions the hook was invoked on
    pub fn invoked(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }
}

/// Ordered snapshot of extensions to deliver a hook to
#[derive(Clone, Default)]
pub struct Multicaster {
    extensions: Vec<Arc<dyn Extension>>,
    hook_timeout: Option<Duration>,
}

impl Multicaster {
    #[must_use]
    pub fn new(extensions: Vec<Arc<dyn Extension>>) -> Self {
        Self {
            extensions,
            hook_timeout: None,
        }
    }

    /// Abandon any single hook call that runs longer than `limit`
    #[must_use]
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.hook_timeout = Some(limit);
        self
    }

    /// Snapshot the registry as it is now
    #[must_use]
    pub fn from_registry(registry: &dyn ExtensionRegistry) -> Self {
        Self::new(registry.extensions())
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Invoke `call` on every extension implementing `hook`
    pub async fn run<F, Fut>(&self, hook: Hook, mut call: F) -> MulticastReport
    where
        F: FnMut(Arc<dyn Extension>) -> Fut,
        Fut: Future<Output = HookResult>,
    {
        let mut report = MulticastReport::default();

        for extension in self.extensions.iter().filter(|e| e.implements(hook)) {
            let id = extension.id().to_string();
            debug!(hook = hook.as_str(), extension = %id, "Delivering hook to extension");

            let delivery = AssertUnwindSafe(call(Arc::clone(extension))).catch_unwind();
            let outcome = match self.hook_timeout {
                Some(limit) => tokio::time::timeout(limit, delivery).await.ok(),
                None => Some(delivery.await),
            };

            let Some(outcome) = outcome else {
                warn!(
                    hook = hook.as_str(),
                    extension = %id,
                    timeout_ms = self.hook_timeout.map_or(0, |t| t.as_millis() as u64),
                    "Extension hook timed out"
                );
                report.failed.push(id);
                continue;
            };

            match outcome {
                Ok(Ok(HookFlow::Continue)) => report.delivered.push(id),
                Ok(Ok(HookFlow::Stop)) => {
                    debug!(hook = hook.as_str(), extension = %id, "Extension stopped hook delivery");
                    report.delivered.push(id.clone());
                    report.stopped_by = Some(id);
                    break;
                }
                Ok(Err(e)) => {
                    warn!(hook = hook.as_str(), extension = %id, error = %e, "Extension hook failed");
                    report.failed.push(id);
                }
                Err(panic) => {
                    error!(
                        hook = hook.as_str(),
                        extension = %id,
                        panic = %panic_message(panic.as_ref()),
                        "Extension hook panicked"
                    );
                    report.failed.push(id);
                }
            }
        }

        report
    }

    /// Deliver `reaction_has_been_added`
    pub async fn reaction_has_been_added(&self, post: &Post, reaction: &Reaction) -> MulticastReport {
        self.run(Hook::ReactionHasBeenAdded, move |ext| async move {
            ext.reaction_has_been_added(post, reaction).await
        })
        .await
    }

    /// Deliver `reaction_has_been_removed`
    pub async fn reaction_has_been_removed(&self, post: &Post, reaction: &Reaction) -> MulticastReport {
        self.run(Hook::ReactionHasBeenRemoved, move |ext| async move {
            ext.reaction_has_been_removed(post, reaction).await
        })
        .await
    }
}

impl std::fmt::Debug for Multicaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multicaster")
            .field("extensions", &self.extensions.iter().map(|e| e.id()).collect::<Vec<_>>())
            .field("hook_timeout", &self.hook_timeout)
            .finish()
    }
}
