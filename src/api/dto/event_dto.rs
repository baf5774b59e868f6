//! Event request and response DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::admin_dto::AdminDto;
use super::common_dto::{PaginationMeta, default_page, default_page_size};
use crate::domain::{
    AdminId, Event, EventImage, EventPatch, EventUpdate, EventVisibility, ImageId, NewEvent,
    NewEventImage, PageRequest,
};

/// An image to attach.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImageRequest {
    /// Object-storage URL.
    pub image_url: String,
    /// Accessibility text.
    #[serde(default)]
    pub alt_text: String,
    /// Make this the display image.
    #[serde(default)]
    pub is_display: bool,
}

impl From<ImageRequest> for NewEventImage {
    fn from(req: ImageRequest) -> Self {
        Self {
            image_url: req.image_url,
            alt_text: req.alt_text,
            is_display: req.is_display,
        }
    }
}

/// Request body for `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Creating admin; always recorded as author.
    pub author_id: uuid::Uuid,
    /// Headline.
    pub title: String,
    /// URL slug; derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Short summary.
    #[serde(default)]
    pub description: String,
    /// Free-form body.
    #[serde(default)]
    pub content: String,
    /// Start as a draft.
    #[serde(default)]
    pub is_draft: bool,
    /// Images to attach.
    #[serde(default)]
    pub images: Vec<ImageRequest>,
    /// Additional authors.
    #[serde(default)]
    pub co_author_ids: Vec<uuid::Uuid>,
}

impl CreateEventRequest {
    /// Splits the body into the new event and its creating author.
    #[must_use]
    pub fn into_parts(self) -> (NewEvent, AdminId) {
        let event = NewEvent {
            title: self.title,
            slug: self.slug,
            date: self.date,
            description: self.description,
            content: self.content,
            is_draft: self.is_draft,
            images: self.images.into_iter().map(NewEventImage::from).collect(),
            co_authors: self.co_author_ids.into_iter().map(AdminId::from).collect(),
        };
        (event, AdminId::from(self.author_id))
    }
}

/// Request body for `PATCH /events/{id}`.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// Acting admin; recorded as author if not one already.
    pub editor_id: uuid::Uuid,
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
    /// `false` publishes, `true` unpublishes.
    #[serde(default)]
    pub is_draft: Option<bool>,
    /// Images to attach.
    #[serde(default)]
    pub new_images: Vec<ImageRequest>,
    /// Images to delete.
    #[serde(default)]
    pub removed_image_ids: Vec<uuid::Uuid>,
    /// Image to promote to display image.
    #[serde(default)]
    pub display_image_id: Option<uuid::Uuid>,
}

impl From<UpdateEventRequest> for EventUpdate {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            patch: EventPatch {
                title: req.title,
                slug: req.slug,
                date: req.date,
                description: req.description,
                content: req.content,
                is_draft: req.is_draft,
            },
            new_images: req.new_images.into_iter().map(NewEventImage::from).collect(),
            removed_image_ids: req
                .removed_image_ids
                .into_iter()
                .map(ImageId::from)
                .collect(),
            new_display_image: req.display_image_id.map(ImageId::from),
            editor: AdminId::from(req.editor_id),
        }
    }
}

/// One image as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageDto {
    /// Image UUID.
    pub id: uuid::Uuid,
    /// Upload time.
    pub created_at: DateTime<Utc>,
    /// Object-storage URL.
    pub image_url: String,
    /// Accessibility text.
    pub alt_text: String,
    /// Whether this is the event's display image.
    pub is_display: bool,
}

impl From<EventImage> for ImageDto {
    fn from(image: EventImage) -> Self {
        Self {
            id: image.id.into(),
            created_at: image.created_at,
            image_url: image.image_url,
            alt_text: image.alt_text,
            is_display: image.is_display,
        }
    }
}

/// One event aggregate as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    /// Event UUID.
    pub id: uuid::Uuid,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Headline.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Short summary.
    pub description: String,
    /// Free-form body.
    pub content: String,
    /// Hidden from public listings.
    pub is_draft: bool,
    /// First publication time; `null` for drafts.
    pub published_at: Option<DateTime<Utc>>,
    /// URL of the display image, if any.
    pub display_image_url: Option<String>,
    /// Images, oldest first.
    pub images: Vec<ImageDto>,
    /// Authors, oldest account first.
    pub authors: Vec<AdminDto>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        let display_image_url = event.display_image().map(|img| img.image_url.clone());
        Self {
            id: event.id.into(),
            created_at: event.created_at,
            updated_at: event.updated_at,
            title: event.title,
            slug: event.slug,
            date: event.date,
            description: event.description,
            content: event.content,
            is_draft: event.is_draft,
            published_at: event.published_at,
            display_image_url,
            images: event.images.into_iter().map(ImageDto::from).collect(),
            authors: event.authors.into_iter().map(AdminDto::from).collect(),
        }
    }
}

/// Query parameters for `GET /events`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page. Defaults to 10, capped at 100.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Include drafts. Defaults to `false`.
    #[serde(default)]
    pub include_drafts: bool,
}

impl EventListParams {
    /// Normalised page request.
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    /// Which events to list.
    #[must_use]
    pub const fn visibility(&self) -> EventVisibility {
        if self.include_drafts {
            EventVisibility::All
        } else {
            EventVisibility::Published
        }
    }
}

/// Paginated event listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response of `PATCH /events/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventResponse {
    /// The event after the update.
    pub event: EventDto,
    /// URLs of removed images, for object-storage cleanup.
    pub removed_image_urls: Vec<String>,
}

/// Response of `DELETE /events/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteEventResponse {
    /// URLs of the deleted images, for object-storage cleanup.
    pub removed_image_urls: Vec<String>,
}
