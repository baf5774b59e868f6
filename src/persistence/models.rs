//! Row mapping between PostgreSQL and the domain types.
//!
//! Mappings are written by hand so the domain module stays free of sqlx
//! derives, and so that an unknown `status` string surfaces as a decode
//! error rather than a panic.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::domain::{Admin, AdminStatus, Event, EventId, EventImage};

/// Column list shared by every admin read.
pub(crate) const ADMIN_COLUMNS: &str =
    "id, created_at, updated_at, deleted_at, name, email, position, status";

/// Column list shared by every event read.
pub(crate) const EVENT_COLUMNS: &str =
    "id, created_at, updated_at, title, slug, date, description, content, is_draft, published_at";

/// Column list shared by every image read.
pub(crate) const IMAGE_COLUMNS: &str = "id, created_at, image_url, alt_text, is_display, event_id";

impl<'r> FromRow<'r, PgRow> for Admin {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status: AdminStatus = status.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            position: row.try_get("position")?,
            status,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for EventImage {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            image_url: row.try_get("image_url")?,
            alt_text: row.try_get("alt_text")?,
            is_display: row.try_get("is_display")?,
            event_id: row.try_get("event_id")?,
        })
    }
}

/// The `events` row on its own, before images and authors are attached.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct EventRow {
    pub id: EventId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub description: String,
    pub content: String,
    pub is_draft: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl EventRow {
    /// Completes the aggregate.
    pub(crate) fn into_event(self, images: Vec<EventImage>, authors: Vec<Admin>) -> Event {
        Event {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            title: self.title,
            slug: self.slug,
            date: self.date,
            description: self.description,
            content: self.content,
            is_draft: self.is_draft,
            published_at: self.published_at,
            images,
            authors,
        }
    }
}
