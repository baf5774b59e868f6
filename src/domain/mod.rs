//! Domain layer: entities, typed inputs and the pure helpers that guard them.
//!
//! Nothing in this module touches the store. Validation and pagination
//! arithmetic run here so that bad input is rejected before a connection is
//! ever acquired.

pub mod admin;
pub mod event;
pub mod ids;
pub mod image;
pub mod pagination;
pub mod validation;

pub use admin::{Admin, AdminInput, AdminLookup, AdminStatus, FounderSeed, ValidAdmin};
pub use event::{Event, EventPatch, EventUpdate, EventVisibility, NewEvent};
pub use ids::{AdminId, EventId, ImageId};
pub use image::{EventImage, NewEventImage};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, compute_offset};
pub use validation::sanitize_admin;
