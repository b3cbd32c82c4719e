//! Shared fixtures for reaction service tests
//!
//! In-memory collaborators that record every call, so tests can assert both
//! on results and on what was (not) touched.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use reaction_core::{
    BroadcastEvent, Channel, ChannelRepository, DomainError, EventKind, EventPublisher,
    Extension, ExtensionError, HookFlow, HookResult, Post, PostCache, PostRepository, Reaction,
    ReactionRepository, RepoResult, Snowflake, User, UserRepository, DEFAULT_CHANNEL_NAME,
};
use reaction_service::{ExtensionHost, ServiceContext, ServiceContextBuilder, SettingsPolicy};

pub const MEMBER: Snowflake = Snowflake::new(1);
pub const ADMIN: Snowflake = Snowflake::new(2);
pub const OTHER_MEMBER: Snowflake = Snowflake::new(3);

pub const OFF_TOPIC: Snowflake = Snowflake::new(10);
pub const TOWN_SQUARE: Snowflake = Snowflake::new(11);
pub const ARCHIVED: Snowflake = Snowflake::new(12);

pub const POST: Snowflake = Snowflake::new(100);
pub const TOWN_SQUARE_POST: Snowflake = Snowflake::new(101);
pub const ARCHIVED_POST: Snowflake = Snowflake::new(102);

// ============================================================================
// Lookups
// ============================================================================

/// Posts, channels and users
#[derive(Default)]
pub struct Directory {
    pub posts: Mutex<HashMap<Snowflake, Post>>,
    pub channels: Mutex<HashMap<Snowflake, Channel>>,
    pub users: Mutex<HashMap<Snowflake, User>>,
    pub user_lookups: AtomicUsize,
    pub fail_post_lookup: AtomicBool,
    pub fail_user_lookup: AtomicBool,
}

impl Directory {
    /// Standard world: one post in each of a normal, the default and an archived channel
    pub fn seeded() -> Self {
        let directory = Self::default();

        directory.add_channel(Channel::new(OFF_TOPIC, "off-topic"));
        directory.add_channel(Channel::new(TOWN_SQUARE, DEFAULT_CHANNEL_NAME));
        let mut archived = Channel::new(ARCHIVED, "old-news");
        archived.archive();
        directory.add_channel(archived);

        directory.add_post(Post::new(POST, OFF_TOPIC, MEMBER, "hello".to_string()));
        directory.add_post(Post::new(TOWN_SQUARE_POST, TOWN_SQUARE, ADMIN, "welcome".to_string()));
        directory.add_post(Post::new(ARCHIVED_POST, ARCHIVED, MEMBER, "old".to_string()));

        directory.add_user(User::new(MEMBER, "alice", &["system_user", "channel_user"]));
        directory.add_user(User::new(ADMIN, "root", &["system_user", "system_admin"]));
        directory.add_user(User::new(OTHER_MEMBER, "bob", &["system_user", "channel_user"]));

        directory
    }

    pub fn add_post(&self, post: Post) {
        self.posts.lock().insert(post.id, post);
    }

    pub fn add_channel(&self, channel: Channel) {
        self.channels.lock().insert(channel.id, channel);
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().insert(user.id, user);
    }

    pub fn user_lookups(&self) -> usize {
        self.user_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostRepository for Directory {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        if self.fail_post_lookup.load(Ordering::SeqCst) {
            return Err(DomainError::LookupError("post service unavailable".to_string()));
        }
        Ok(self.posts.lock().get(&id).cloned())
    }
}

#[async_trait]
impl ChannelRepository for Directory {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        Ok(self.channels.lock().get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for Directory {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_user_lookup.load(Ordering::SeqCst) {
            return Err(DomainError::LookupError("identity service unavailable".to_string()));
        }
        Ok(self.users.lock().get(&id).cloned())
    }
}

// ============================================================================
// Store
// ============================================================================

/// Reaction store counting every call
#[derive(Default)]
pub struct ReactionStore {
    pub reactions: Mutex<Vec<Reaction>>,
    pub save_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_save: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_list: AtomicBool,
}

impl ReactionStore {
    /// Put a reaction in place without going through the service
    pub fn seed(&self, user_id: Snowflake, post_id: Snowflake, emoji: &str) {
        let mut reaction = Reaction::new(user_id, post_id, emoji);
        reaction.create_at = Some(Utc::now());
        self.reactions.lock().push(reaction);
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn count_for(&self, post_id: Snowflake) -> usize {
        self.reactions.lock().iter().filter(|r| r.post_id == post_id).count()
    }
}

#[async_trait]
impl ReactionRepository for ReactionStore {
    async fn save(&self, reaction: &Reaction) -> RepoResult<Reaction> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(DomainError::StoreError("write rejected".to_string()));
        }

        let mut reactions = self.reactions.lock();
        if reactions.iter().any(|r| r.same_triple(reaction)) {
            return Err(DomainError::ReactionAlreadyExists);
        }

        let mut stored = reaction.clone();
        stored.create_at = Some(Utc::now());
        reactions.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, reaction: &Reaction) -> RepoResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DomainError::StoreError("delete rejected".to_string()));
        }
        self.reactions.lock().retain(|r| !r.same_triple(reaction));
        Ok(())
    }

    async fn find_by_post(&self, post_id: Snowflake, _include_deleted: bool) -> RepoResult<Vec<Reaction>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(DomainError::StoreError("read timed out".to_string()));
        }
        Ok(self
            .reactions
            .lock()
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Event bus and cache
// ============================================================================

#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<BroadcastEvent>>,
    pub fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<BroadcastEvent> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|e| e.event).collect()
    }

    /// Decoded `post` payload of the n-th `post_edited` event
    pub fn edited_post(&self, n: usize) -> serde_json::Value {
        let events = self.events.lock();
        let payload = events
            .iter()
            .filter(|e| e.event == EventKind::PostEdited)
            .nth(n)
            .and_then(|e| e.get("post"))
            .and_then(|v| v.as_str())
            .expect("post_edited event with a post payload")
            .to_string();
        serde_json::from_str(&payload).expect("post payload is JSON")
    }

    /// Decoded `reaction` payload of the n-th event carrying one
    pub fn reaction_payload(&self, n: usize) -> serde_json::Value {
        let events = self.events.lock();
        let payload = events
            .iter()
            .filter_map(|e| e.get("reaction"))
            .nth(n)
            .and_then(|v| v.as_str())
            .expect("event with a reaction payload")
            .to_string();
        serde_json::from_str(&payload).expect("reaction payload is JSON")
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: BroadcastEvent) -> RepoResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::PublishError("bus unavailable".to_string()));
        }
        self.events.lock().push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCache {
    pub invalidated: Mutex<Vec<Snowflake>>,
}

#[async_trait]
impl PostCache for RecordingCache {
    async fn invalidate_channel_posts(&self, channel_id: Snowflake) -> RepoResult<()> {
        self.invalidated.lock().push(channel_id);
        Ok(())
    }
}

// ============================================================================
// Extensions
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    Continue,
    Stop,
    Fail,
    Panic,
    /// Never returns
    Hang,
}

/// Extension that logs `"{id}:added"` / `"{id}:removed"` and then behaves as told
pub struct ScriptedExtension {
    id: String,
    behaviour: Behaviour,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExtension {
    pub fn new(id: &str, behaviour: Behaviour, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            behaviour,
            log: Arc::clone(log),
        })
    }

    async fn respond(&self, hook: &str) -> HookResult {
        self.log.lock().push(format!("{}:{hook}", self.id));
        match self.behaviour {
            Behaviour::Continue => Ok(HookFlow::Continue),
            Behaviour::Stop => Ok(HookFlow::Stop),
            Behaviour::Fail => Err(ExtensionError::failed(&self.id, "not today")),
            Behaviour::Panic => panic!("extension {} crashed", self.id),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl Extension for ScriptedExtension {
    fn id(&self) -> &str {
        &self.id
    }

    async fn reaction_has_been_added(&self, _post: &Post, _reaction: &Reaction) -> HookResult {
        self.respond("added").await
    }

    async fn reaction_has_been_removed(&self, _post: &Post, _reaction: &Reaction) -> HookResult {
        self.respond("removed").await
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub directory: Arc<Directory>,
    pub store: Arc<ReactionStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub cache: Arc<RecordingCache>,
    pub settings: Arc<SettingsPolicy>,
    pub extensions: Arc<ExtensionHost>,
    pub hook_log: Arc<Mutex<Vec<String>>>,
    pub ctx: ServiceContext,
}

impl Harness {
    /// Seeded world, unlicensed, no extensions ready
    pub fn new() -> Self {
        Self::with_hook_lane(2, Duration::from_secs(5))
    }

    /// Like `new`, with a given number of hook workers and hook timeout
    pub fn with_hook_lane(hook_workers: usize, hook_timeout: Duration) -> Self {
        let directory = Arc::new(Directory::seeded());
        let store = Arc::new(ReactionStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let cache = Arc::new(RecordingCache::default());
        let settings = Arc::new(SettingsPolicy::default());
        let extensions = Arc::new(ExtensionHost::new());

        let ctx = ServiceContextBuilder::new()
            .post_repo(directory.clone())
            .channel_repo(directory.clone())
            .user_repo(directory.clone())
            .reaction_repo(store.clone())
            .publisher(publisher.clone())
            .post_cache(cache.clone())
            .settings(settings.clone())
            .extensions(extensions.clone())
            .fanout_workers(2)
            .hook_workers(hook_workers)
            .hook_timeout(hook_timeout)
            .build()
            .expect("complete context");

        Self {
            directory,
            store,
            publisher,
            cache,
            settings,
            extensions,
            hook_log: Arc::new(Mutex::new(Vec::new())),
            ctx,
        }
    }

    /// License and read-only default channel both active
    pub fn read_only_town_square(self) -> Self {
        self.settings.set_licensed(true);
        self.settings.set_town_square_read_only(true);
        self
    }

    /// Register extensions in order and mark the subsystem ready
    pub fn with_extensions(self, extensions: &[(&str, Behaviour)]) -> Self {
        for (id, behaviour) in extensions {
            self.extensions
                .register(ScriptedExtension::new(id, *behaviour, &self.hook_log));
        }
        self.extensions.set_ready(true);
        self
    }

    /// Wait for every scheduled notification and hook task
    pub async fn settle(&self) {
        self.ctx.wait_idle().await;
    }

    /// Wait for notification tasks only
    pub async fn settle_notifications(&self) {
        self.ctx.fanout().wait_idle().await;
    }

    pub fn hooks(&self) -> Vec<String> {
        self.hook_log.lock().clone()
    }
}
