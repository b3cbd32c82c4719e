//! Event-bus side of the fan-out
//!
//! One accepted mutation produces, in order: the reaction event, a cache
//! invalidation for the channel's post lists, and a `post_edited` event with
//! the post as clients should now render it.

use std::sync::Arc;

use reaction_core::{
    BroadcastEvent, DomainError, EventKind, EventPublisher, Post, PostCache, Reaction,
};
use tracing::{debug, warn};

use crate::dto::{PostResponse, ReactionResponse};

use super::display::ImageProxy;

/// Publishes reaction changes to the event bus and cache
#[derive(Clone)]
pub struct ReactionNotifier {
    publisher: Arc<dyn EventPublisher>,
    post_cache: Arc<dyn PostCache>,
    image_proxy: ImageProxy,
}

impl ReactionNotifier {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        post_cache: Arc<dyn PostCache>,
        image_proxy: ImageProxy,
    ) -> Self {
        Self {
            publisher,
            post_cache,
            image_proxy,
        }
    }

    /// Send every notification for one reaction change
    ///
    /// Later steps still run when an earlier one fails; the first failure is
    /// returned. `post` itself is never modified.
    ///
    /// # Errors
    /// The first publish, invalidation or serialization failure.
    pub async fn notify(
        &self,
        kind: EventKind,
        post: &Post,
        reaction: &Reaction,
        has_reactions: bool,
    ) -> Result<(), DomainError> {
        let mut first_error = None;
        let mut record = |step: &'static str, result: Result<(), DomainError>| {
            if let Err(e) = result {
                warn!(step = step, post_id = %post.id, error = %e, "Reaction notification step failed");
                first_error.get_or_insert(e);
            }
        };

        let reaction_event = to_json(&ReactionResponse::from(reaction)).map(|payload| {
            BroadcastEvent::new(kind, post.channel_id).with("reaction", payload)
        });
        let published = match reaction_event {
            Ok(event) => self.publisher.publish(event).await,
            Err(e) => Err(e),
        };
        record("publish_reaction", published);

        record(
            "invalidate_channel_posts",
            self.post_cache.invalidate_channel_posts(post.channel_id).await,
        );

        let mut display = post.for_notification(has_reactions);
        self.image_proxy.apply(&mut display);
        let post_event = to_json(&PostResponse::from(&display)).map(|payload| {
            BroadcastEvent::new(EventKind::PostEdited, post.channel_id).with("post", payload)
        });
        let published = match post_event {
            Ok(event) => self.publisher.publish(event).await,
            Err(e) => Err(e),
        };
        record("publish_post", published);

        debug!(
            event = %kind,
            post_id = %post.id,
            channel_id = %post.channel_id,
            has_reactions = has_reactions,
            "Reaction notifications sent"
        );

        first_error.map_or(Ok(()), Err)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| DomainError::InternalError(e.to_string()))
}
