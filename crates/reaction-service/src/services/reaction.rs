//! Reaction service
//!
//! Saves, deletes and lists reactions on posts. A mutation is checked against
//! the access policy first; once the store accepts it, notifications and
//! extension hooks are queued on the fan-out pool and the caller returns
//! without waiting for them.

use std::sync::Arc;

use reaction_core::{EventKind, Post, Reaction, Snowflake};
use tracing::{debug, info, instrument, warn};

use crate::fanout::Multicaster;

use super::context::ServiceContext;
use super::error::{Operation, ServiceError, ServiceResult};

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new `ReactionService`
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a reaction and notify about it
    ///
    /// Returns the stored reaction, including fields the store assigned.
    #[instrument(skip(self, reaction), fields(post_id = %reaction.post_id, user_id = %reaction.user_id, emoji = %reaction.emoji_name))]
    pub async fn save_reaction(&self, reaction: Reaction) -> ServiceResult<Reaction> {
        let post = self.authorize(&reaction, Operation::Save).await?;

        let saved = self
            .ctx
            .reaction_repo()
            .save(&reaction)
            .await
            .map_err(ServiceError::Store)?;

        info!("Reaction added");

        self.schedule_fanout(Operation::Save, post, saved.clone(), true);

        Ok(saved)
    }

    /// Delete a reaction and notify about it
    #[instrument(skip(self, reaction), fields(post_id = %reaction.post_id, user_id = %reaction.user_id, emoji = %reaction.emoji_name))]
    pub async fn delete_reaction(&self, reaction: &Reaction) -> ServiceResult<()> {
        let post = self.authorize(reaction, Operation::Delete).await?;

        // Counted before the delete; the store does not report what is left
        let has_reactions_after = match self.ctx.reaction_repo().find_by_post(post.id, true).await {
            Ok(existing) => existing.len() > 1,
            Err(e) => {
                warn!(error = %e, "Could not count reactions before delete");
                false
            }
        };

        self.ctx
            .reaction_repo()
            .delete(reaction)
            .await
            .map_err(ServiceError::Store)?;

        info!(has_reactions = has_reactions_after, "Reaction removed");

        self.schedule_fanout(
            Operation::Delete,
            post,
            reaction.clone(),
            has_reactions_after,
        );

        Ok(())
    }

    /// List every reaction on a post, deleted ones included
    #[instrument(skip(self))]
    pub async fn list_reactions(&self, post_id: Snowflake) -> ServiceResult<Vec<Reaction>> {
        self.ctx
            .reaction_repo()
            .find_by_post(post_id, true)
            .await
            .map_err(ServiceError::Store)
    }

    /// Resolve the post and channel and run the access policy
    async fn authorize(
        &self,
        reaction: &Reaction,
        operation: Operation,
    ) -> ServiceResult<Post> {
        let post = self
            .ctx
            .post_repo()
            .find_by_id(reaction.post_id)
            .await
            .map_err(ServiceError::Lookup)?
            .ok_or_else(|| ServiceError::not_found("Post", reaction.post_id.to_string()))?;

        let channel = self
            .ctx
            .channel_repo()
            .find_by_id(post.channel_id)
            .await
            .map_err(ServiceError::Lookup)?
            .ok_or_else(|| ServiceError::not_found("Channel", post.channel_id.to_string()))?;

        let decision = self
            .ctx
            .access_policy()
            .evaluate(&channel, reaction.user_id)
            .await?;

        if let Err(e) = decision.into_result(operation) {
            debug!(
                channel_id = %channel.id,
                reason = e.error_code(),
                "Reaction {operation} denied"
            );
            return Err(e);
        }

        Ok(post)
    }

    /// Queue the notification task and, if extensions are ready, the hook task
    ///
    /// The two go to separate pools and never wait on each other.
    fn schedule_fanout(
        &self,
        operation: Operation,
        post: Post,
        reaction: Reaction,
        has_reactions: bool,
    ) {
        let kind = match operation {
            Operation::Save => EventKind::ReactionAdded,
            Operation::Delete => EventKind::ReactionRemoved,
        };

        let notifier = self.ctx.notifier().clone();
        let event_post = post.clone();
        let event_reaction = reaction.clone();
        let queued = self.ctx.fanout().submit(format!("{kind}:{}", post.id), async move {
            notifier
                .notify(kind, &event_post, &event_reaction, has_reactions)
                .await
                .map_err(anyhow::Error::from)
        });
        if !queued {
            warn!(
                post_id = %post.id,
                channel_id = %post.channel_id,
                operation = %operation,
                "Reaction {operation} accepted but its notifications were dropped"
            );
        }

        if !self.ctx.extensions().is_ready() {
            return;
        }

        let registry = Arc::clone(self.ctx.extensions());
        let hook_timeout = self.ctx.hook_timeout();
        let post_id = post.id;
        let queued = self.ctx.hook_pool().submit(format!("extensions:{kind}:{post_id}"), async move {
            let multicaster = Multicaster::from_registry(registry.as_ref()).with_timeout(hook_timeout);
            if multicaster.is_empty() {
                return Ok(());
            }

            let report = match operation {
                Operation::Save => {
                    debug!(post_id = %post.id, "Reaction has been added");
                    multicaster.reaction_has_been_added(&post, &reaction).await
                }
                Operation::Delete => {
                    debug!(post_id = %post.id, "Reaction has been removed");
                    multicaster.reaction_has_been_removed(&post, &reaction).await
                }
            };
            debug!(
                delivered = report.delivered.len(),
                failed = report.failed.len(),
                stopped_by = ?report.stopped_by,
                "Reaction hooks delivered"
            );
            Ok(())
        });
        if !queued {
            warn!(
                post_id = %post_id,
                operation = %operation,
                "Reaction {operation} accepted but its extension hooks were dropped"
            );
        }
    }
}
