//! Service context - dependency container for services
//!
//! Holds the collaborator ports, the policy inputs and the fan-out machinery
//! needed by the reaction service.

use std::sync::Arc;
use std::time::Duration;

use reaction_common::AppConfig;
use reaction_core::{
    ChannelRepository, EventPublisher, ExtensionRegistry, PolicySource, PostCache,
    PostRepository, ReactionRepository, RoleAuthority, UserRepository,
};

use crate::extensions::ExtensionHost;
use crate::fanout::{FanoutPool, ImageProxy, ReactionNotifier};

use super::error::{ServiceError, ServiceResult};
use super::policy::{AccessPolicy, SettingsPolicy, StaticRoleAuthority};

const DEFAULT_FANOUT_WORKERS: usize = 4;
const DEFAULT_HOOK_WORKERS: usize = 2;
const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency is shared.
#[derive(Clone)]
pub struct ServiceContext {
    // Lookups and store
    post_repo: Arc<dyn PostRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    user_repo: Arc<dyn UserRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,

    // Policy inputs
    settings: Arc<dyn PolicySource>,
    roles: Arc<dyn RoleAuthority>,

    // Fan-out; hooks never share workers with notifications
    notifier: ReactionNotifier,
    extensions: Arc<dyn ExtensionRegistry>,
    fanout: FanoutPool,
    hooks: FanoutPool,
    hook_timeout: Duration,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the post lookup
    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    /// Get the channel lookup
    pub fn channel_repo(&self) -> &dyn ChannelRepository {
        self.channel_repo.as_ref()
    }

    /// Get the user lookup
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the reaction store
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    // === Policy ===

    /// Access policy evaluator over this context's inputs
    pub fn access_policy(&self) -> AccessPolicy<'_> {
        AccessPolicy::new(
            self.settings.as_ref(),
            self.roles.as_ref(),
            self.user_repo.as_ref(),
        )
    }

    // === Fan-out ===

    /// Get the event-bus notifier
    pub fn notifier(&self) -> &ReactionNotifier {
        &self.notifier
    }

    /// Get the extension registry
    pub fn extensions(&self) -> &Arc<dyn ExtensionRegistry> {
        &self.extensions
    }

    /// Get the notification worker pool
    pub fn fanout(&self) -> &FanoutPool {
        &self.fanout
    }

    /// Get the extension hook worker pool
    pub fn hook_pool(&self) -> &FanoutPool {
        &self.hooks
    }

    /// Longest a single extension hook may run
    pub fn hook_timeout(&self) -> Duration {
        self.hook_timeout
    }

    /// Wait until both pools have run everything submitted so far
    pub async fn wait_idle(&self) {
        self.fanout.wait_idle().await;
        self.hooks.wait_idle().await;
    }

    /// Stop both pools after draining their queues
    pub async fn shutdown(&self) {
        self.fanout.shutdown().await;
        self.hooks.shutdown().await;
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("fanout", &self.fanout)
            .field("hooks", &self.hooks)
            .field("hook_timeout", &self.hook_timeout)
            .field("extensions_ready", &self.extensions.is_ready())
            .finish()
    }
}

/// Builder for creating `ServiceContext`
///
/// Policy inputs, roles, extensions and display settings have defaults; the
/// lookups, the store, the publisher and the post cache are required.
pub struct ServiceContextBuilder {
    post_repo: Option<Arc<dyn PostRepository>>,
    channel_repo: Option<Arc<dyn ChannelRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    post_cache: Option<Arc<dyn PostCache>>,
    settings: Option<Arc<dyn PolicySource>>,
    roles: Option<Arc<dyn RoleAuthority>>,
    extensions: Option<Arc<dyn ExtensionRegistry>>,
    fanout: Option<FanoutPool>,
    fanout_workers: usize,
    hooks: Option<FanoutPool>,
    hook_workers: usize,
    hook_timeout: Duration,
    image_proxy: ImageProxy,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            post_repo: None,
            channel_repo: None,
            user_repo: None,
            reaction_repo: None,
            publisher: None,
            post_cache: None,
            settings: None,
            roles: None,
            extensions: None,
            fanout: None,
            fanout_workers: DEFAULT_FANOUT_WORKERS,
            hooks: None,
            hook_workers: DEFAULT_HOOK_WORKERS,
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            image_proxy: ImageProxy::disabled(),
        }
    }

    /// Apply policy flags, worker counts, hook timeout and image proxy from configuration
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.settings = Some(Arc::new(SettingsPolicy::from(config.policy)));
        self.fanout_workers = config.fanout.workers;
        self.hook_workers = config.fanout.hook_workers;
        self.hook_timeout = Duration::from_millis(config.fanout.hook_timeout_ms);
        self.image_proxy = ImageProxy::new(config.display.image_proxy_url.clone());
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn channel_repo(mut self, repo: Arc<dyn ChannelRepository>) -> Self {
        self.channel_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn post_cache(mut self, cache: Arc<dyn PostCache>) -> Self {
        self.post_cache = Some(cache);
        self
    }

    pub fn settings(mut self, settings: Arc<dyn PolicySource>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn roles(mut self, roles: Arc<dyn RoleAuthority>) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn extensions(mut self, registry: Arc<dyn ExtensionRegistry>) -> Self {
        self.extensions = Some(registry);
        self
    }

    /// Use an already running pool instead of starting one
    pub fn fanout(mut self, pool: FanoutPool) -> Self {
        self.fanout = Some(pool);
        self
    }

    pub fn fanout_workers(mut self, workers: usize) -> Self {
        self.fanout_workers = workers;
        self
    }

    /// Use an already running pool for extension hooks
    pub fn hook_pool(mut self, pool: FanoutPool) -> Self {
        self.hooks = Some(pool);
        self
    }

    pub fn hook_workers(mut self, workers: usize) -> Self {
        self.hook_workers = workers;
        self
    }

    pub fn hook_timeout(mut self, limit: Duration) -> Self {
        self.hook_timeout = limit;
        self
    }

    pub fn image_proxy(mut self, proxy: ImageProxy) -> Self {
        self.image_proxy = proxy;
        self
    }

    /// Build the `ServiceContext`
    ///
    /// Starts the notification and hook pools unless they were supplied, which
    /// requires a Tokio runtime.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing,
    /// `ServiceError::Internal` if a pool must be started outside a runtime.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let required = |name: &str| ServiceError::validation(format!("{name} is required"));

        let post_repo = self.post_repo.ok_or_else(|| required("post_repo"))?;
        let channel_repo = self.channel_repo.ok_or_else(|| required("channel_repo"))?;
        let user_repo = self.user_repo.ok_or_else(|| required("user_repo"))?;
        let reaction_repo = self.reaction_repo.ok_or_else(|| required("reaction_repo"))?;
        let publisher = self.publisher.ok_or_else(|| required("publisher"))?;
        let post_cache = self.post_cache.ok_or_else(|| required("post_cache"))?;

        let start = |supplied: Option<FanoutPool>, workers: usize| match supplied {
            Some(pool) => Ok(pool),
            None => tokio::runtime::Handle::try_current()
                .map(|_| FanoutPool::start(workers))
                .map_err(|e| {
                    ServiceError::internal(format!("fan-out pool needs a Tokio runtime: {e}"))
                }),
        };
        let fanout = start(self.fanout, self.fanout_workers)?;
        let hooks = start(self.hooks, self.hook_workers)?;

        Ok(ServiceContext {
            post_repo,
            channel_repo,
            user_repo,
            reaction_repo,
            settings: self.settings.unwrap_or_else(|| Arc::new(SettingsPolicy::default())),
            roles: self.roles.unwrap_or_else(|| Arc::new(StaticRoleAuthority::default())),
            notifier: ReactionNotifier::new(publisher, post_cache, self.image_proxy),
            extensions: self.extensions.unwrap_or_else(|| Arc::new(ExtensionHost::new())),
            fanout,
            hooks,
            hook_timeout: self.hook_timeout,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
