//! Event images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, ImageId};

/// An image owned by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventImage {
    /// Primary key.
    pub id: ImageId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Object-storage URL.
    pub image_url: String,
    /// Accessibility text.
    pub alt_text: String,
    /// At most one image per event carries this flag.
    pub is_display: bool,
    /// Owning event.
    pub event_id: EventId,
}

/// An image to attach to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewEventImage {
    /// Object-storage URL.
    pub image_url: String,
    /// Accessibility text.
    #[serde(default)]
    pub alt_text: String,
    /// Promote to display image once inserted.
    #[serde(default)]
    pub is_display: bool,
}

impl NewEventImage {
    /// A non-display image with the given URL.
    #[must_use]
    pub fn new(image_url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            alt_text: alt_text.into(),
            is_display: false,
        }
    }

    /// Flags the image as display image.
    #[must_use]
    pub const fn as_display(mut self) -> Self {
        self.is_display = true;
        self
    }
}
