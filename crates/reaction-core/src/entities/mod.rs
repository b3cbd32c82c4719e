//! Domain entities - core business objects

mod channel;
mod post;
mod reaction;
mod user;

pub use channel::{Channel, DEFAULT_CHANNEL_NAME};
pub use post::Post;
pub use reaction::Reaction;
pub use user::User;
