//! Extension ports - externally registered observers of reaction changes
//!
//! Extensions observe committed state; they cannot veto or alter it. An
//! extension may stop delivery of the current hook to extensions registered
//! after it.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::entities::{Post, Reaction};

/// Hooks an extension may implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    ReactionHasBeenAdded,
    ReactionHasBeenRemoved,
}

impl Hook {
    /// Hook name as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReactionHasBeenAdded => "reaction_has_been_added",
            Self::ReactionHasBeenRemoved => "reaction_has_been_removed",
        }
    }
}

/// What the multicast should do after a hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookFlow {
    /// Deliver to the next extension
    #[default]
    Continue,
    /// Do not deliver this hook to later extensions
    Stop,
}

/// Failure raised by an extension hook
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension {extension} failed: {message}")]
    Failed { extension: String, message: String },
}

impl ExtensionError {
    /// Create a hook failure
    pub fn failed(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            extension: extension.into(),
            message: message.into(),
        }
    }
}

/// Result of a single hook invocation
pub type HookResult = Result<HookFlow, ExtensionError>;

/// An extension observing reaction changes
#[async_trait]
pub trait Extension: Send + Sync {
    /// Stable identifier used in logs and for deregistration
    fn id(&self) -> &str;

    /// Whether the extension implements a hook
    fn implements(&self, _hook: Hook) -> bool {
        true
    }

    /// Called after a reaction has been stored
    async fn reaction_has_been_added(&self, _post: &Post, _reaction: &Reaction) -> HookResult {
        Ok(HookFlow::Continue)
    }

    /// Called after a reaction has been deleted
    async fn reaction_has_been_removed(&self, _post: &Post, _reaction: &Reaction) -> HookResult {
        Ok(HookFlow::Continue)
    }
}

/// Registry of extensions, owned by the extension subsystem
pub trait ExtensionRegistry: Send + Sync {
    /// Whether the extension subsystem has finished starting
    fn is_ready(&self) -> bool;

    /// Snapshot of the registered extensions in registration order
    fn extensions(&self) -> Vec<Arc<dyn Extension>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    #[async_trait]
    impl Extension for Silent {
        fn id(&self) -> &str {
            "silent"
        }
    }

    #[tokio::test]
    async fn test_default_hooks_continue() {
        use crate::value_objects::Snowflake;

        let post = Post::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            String::new(),
        );
        let reaction = Reaction::new(Snowflake::new(3), Snowflake::new(1), "smile");

        let ext = Silent;
        assert!(ext.implements(Hook::ReactionHasBeenAdded));
        assert_eq!(
            ext.reaction_has_been_added(&post, &reaction).await.unwrap(),
            HookFlow::Continue
        );
        assert_eq!(
            ext.reaction_has_been_removed(&post, &reaction).await.unwrap(),
            HookFlow::Continue
        );
    }

    #[test]
    fn test_extension_error_display() {
        let err = ExtensionError::failed("audit", "boom");
        assert_eq!(err.to_string(), "Extension audit failed: boom");
    }
}
