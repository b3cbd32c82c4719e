//! Data transfer objects for reaction requests and event payloads
//!
//! This module provides:
//! - Request DTOs with validation for caller input
//! - Response DTOs serialized into event payloads
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::ReactionRequest;
pub use responses::{PostResponse, ReactionResponse};
