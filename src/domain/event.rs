//! Event aggregate: the event row, its images and its authors.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Admin, AdminId, EventId, EventImage, ImageId, NewEventImage};

/// A fully loaded event aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Primary key.
    pub id: EventId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Headline.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// Calendar date the event took place.
    pub date: NaiveDate,
    /// Short summary.
    pub description: String,
    /// Free-form body (text, embed links).
    pub content: String,
    /// Drafts are hidden from the public listing.
    pub is_draft: bool,
    /// Set exactly when `is_draft` is false.
    pub published_at: Option<DateTime<Utc>>,
    /// Images, oldest first.
    pub images: Vec<EventImage>,
    /// Authoring admins, oldest account first.
    pub authors: Vec<Admin>,
}

impl Event {
    /// The image flagged for preview display, if any.
    #[must_use]
    pub fn display_image(&self) -> Option<&EventImage> {
        self.images.iter().find(|img| img.is_display)
    }
}

/// Fields for a new event.
///
/// `published_at` is deliberately absent: it is derived from `is_draft`
/// when the row is written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    /// Headline.
    pub title: String,
    /// Explicit slug; derived from the title when `None`.
    #[serde(default)]
    pub slug: Option<String>,
    /// Calendar date.
    pub date: NaiveDate,
    /// Short summary.
    #[serde(default)]
    pub description: String,
    /// Free-form body.
    #[serde(default)]
    pub content: String,
    /// Whether the event starts as a draft.
    #[serde(default)]
    pub is_draft: bool,
    /// Images to attach. The flagged one, otherwise the first, becomes the
    /// display image.
    #[serde(default)]
    pub images: Vec<NewEventImage>,
    /// Authors besides the creating admin.
    #[serde(default)]
    pub co_authors: Vec<AdminId>,
}

/// Partial update of the event row.
///
/// Each field is either absent (`None`, column untouched) or present with
/// its new value. An empty string is a value, not an absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventPatch {
    /// New headline.
    #[serde(default)]
    pub title: Option<String>,
    /// New slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// New calendar date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// New summary.
    #[serde(default)]
    pub description: Option<String>,
    /// New body.
    #[serde(default)]
    pub content: Option<String>,
    /// Publish (`false`) or unpublish (`true`).
    #[serde(default)]
    pub is_draft: Option<bool>,
}

impl EventPatch {
    /// Returns `true` when no column would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.content.is_none()
            && self.is_draft.is_none()
    }
}

/// Everything one aggregate update applies, in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventUpdate {
    /// Column changes.
    pub patch: EventPatch,
    /// Images to attach.
    pub new_images: Vec<NewEventImage>,
    /// Images to delete. Applied before `new_display_image`.
    pub removed_image_ids: Vec<ImageId>,
    /// Image to promote to display image.
    pub new_display_image: Option<ImageId>,
    /// Acting admin; added as author if not one already.
    pub editor: AdminId,
}

impl EventUpdate {
    /// An update that changes nothing but records `editor` as author.
    #[must_use]
    pub fn by(editor: AdminId) -> Self {
        Self {
            patch: EventPatch::default(),
            new_images: Vec::new(),
            removed_image_ids: Vec::new(),
            new_display_image: None,
            editor,
        }
    }
}

/// Which events a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventVisibility {
    /// Only published events, newest publication first.
    #[default]
    Published,
    /// Drafts too, newest creation first.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patch_is_empty() {
        assert!(EventPatch::default().is_empty());
        let patch = EventPatch {
            is_draft: Some(false),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_string_is_a_value() {
        let patch = EventPatch {
            description: Some(String::new()),
            ..EventPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_deserializes_absent_fields_as_none() {
        let json = r#"{"title": "Spring gala"}"#;
        let patch: Result<EventPatch, _> = serde_json::from_str(json);
        assert_eq!(
            patch.ok(),
            Some(EventPatch {
                title: Some("Spring gala".into()),
                ..EventPatch::default()
            })
        );
    }

    #[test]
    fn update_by_editor_is_noop_otherwise() {
        let editor = AdminId::new();
        let update = EventUpdate::by(editor);
        assert!(update.patch.is_empty());
        assert!(update.new_images.is_empty());
        assert!(update.removed_image_ids.is_empty());
        assert_eq!(update.new_display_image, None);
        assert_eq!(update.editor, editor);
    }
}
