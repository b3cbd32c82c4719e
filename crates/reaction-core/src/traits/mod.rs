//! Ports - the interfaces the domain needs from its collaborators

mod extensions;
mod notifications;
mod repositories;

pub use extensions::{Extension, ExtensionError, ExtensionRegistry, Hook, HookFlow, HookResult};
pub use notifications::{EventPublisher, PolicySource, PostCache, RoleAuthority};
pub use repositories::{
    ChannelRepository, PostRepository, ReactionRepository, RepoResult, UserRepository,
};
