//! Request DTOs
//!
//! Request DTOs implement `Deserialize` and `Validate` for input validation.

use std::borrow::Cow;

use reaction_core::{Reaction, Snowflake};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Save or delete a reaction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    pub user_id: Snowflake,

    pub post_id: Snowflake,

    #[validate(
        length(min = 1, max = 64, message = "Emoji name must be 1-64 characters"),
        custom(function = "validate_emoji_name")
    )]
    pub emoji_name: String,
}

impl ReactionRequest {
    /// Build the (not yet stored) reaction this request names
    pub fn into_reaction(self) -> Reaction {
        Reaction::new(self.user_id, self.post_id, self.emoji_name)
    }
}

/// Emoji names are short codes such as `thumbsup`, `+1` or `white_check_mark`
fn validate_emoji_name(name: &str) -> Result<(), ValidationError> {
    if name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
    {
        Ok(())
    } else {
        Err(ValidationError::new("emoji_name")
            .with_message(Cow::Borrowed("Emoji name may only contain letters, digits, '_', '+' and '-'")))
    }
}
