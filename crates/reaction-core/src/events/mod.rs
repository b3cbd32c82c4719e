//! Broadcast events published to the real-time event bus

mod broadcast;

pub use broadcast::{BroadcastEvent, EventKind};
