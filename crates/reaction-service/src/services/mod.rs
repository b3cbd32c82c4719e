//! Business logic services
//!
//! The reaction lifecycle: access policy evaluation, store delegation and
//! scheduling of the notification fan-out.

pub mod context;
pub mod error;
pub mod policy;
pub mod reaction;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{DenyReason, Operation, ServiceError, ServiceResult};
pub use policy::{AccessDecision, AccessPolicy, SettingsPolicy, StaticRoleAuthority};
pub use reaction::ReactionService;
