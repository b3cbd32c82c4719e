//! Notification fan-out
//!
//! Everything that happens after a reaction mutation has been committed:
//! event-bus notifications, cache invalidation and extension hooks, all run
//! on a worker pool so the caller never waits on them.

pub mod display;
pub mod multicast;
pub mod notifier;
pub mod pool;

pub use display::ImageProxy;
pub use multicast::{MulticastReport, Multicaster};
pub use notifier::ReactionNotifier;
pub use pool::{FanoutPool, FanoutStats};
