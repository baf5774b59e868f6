//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers cross the wire as plain UUIDs and are converted to the typed
//! ids at this boundary.

pub mod admin_dto;
pub mod common_dto;
pub mod event_dto;

pub use admin_dto::*;
pub use common_dto::*;
pub use event_dto::*;
