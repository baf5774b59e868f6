//! Event aggregate manager.
//!
//! An event, its images and its author rows change together or not at all:
//! every write opens one transaction, threads it through the image and
//! authorship functions, and ends in [`finish`].

use sqlx::{Postgres, QueryBuilder};

use super::models::{EVENT_COLUMNS, EventRow};
use super::{Database, Tx, authors, fetch_tolerant, finish, images};
use crate::domain::validation::{validate_images, validate_new_event, validate_patch};
use crate::domain::{
    AdminId, Event, EventId, EventPatch, EventUpdate, EventVisibility, NewEvent, PageRequest,
};
use crate::error::GazetteError;

/// Event CRUD over `events`, `event_images` and `event_authors`.
#[derive(Debug, Clone)]
pub struct EventRepository {
    db: Database,
}

impl EventRepository {
    /// Creates a repository over `db`.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates an event with its images and authors.
    ///
    /// `author` is always recorded, so a stored event has at least one
    /// author. If no image is flagged, the first one becomes the display
    /// image.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Validation`] for malformed fields, more than one
    ///   flagged image, or an unknown author or co-author.
    /// - [`GazetteError::Conflict`] if the slug is taken.
    ///
    /// On any error nothing is written.
    pub async fn create_event(
        &self,
        event: &NewEvent,
        author: AdminId,
    ) -> Result<EventId, GazetteError> {
        let slug = validate_new_event(event)?;
        let event_id = self
            .db
            .bounded("create_event", async {
                let mut tx = self.db.begin().await?;
                let outcome = insert_aggregate(&mut tx, event, &slug, author).await;
                finish(tx, outcome, "create_event").await
            })
            .await?;

        tracing::info!(%event_id, %author, %slug, images = event.images.len(), "event created");
        Ok(event_id)
    }

    /// Applies an [`EventUpdate`] in one transaction.
    ///
    /// Steps run in a fixed order: column patch, new images, removals,
    /// display promotion, editor authorship. Returns the URLs of removed
    /// images for object-storage cleanup.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Validation`] for malformed fields or images.
    /// - [`GazetteError::NotFound`] for an unknown event, or an image that
    ///   does not belong to it (including one removed in the same update).
    /// - [`GazetteError::Conflict`] if the new slug is taken.
    ///
    /// On any error the whole update is rolled back.
    pub async fn update_event_by_id(
        &self,
        event_id: EventId,
        update: &EventUpdate,
    ) -> Result<Vec<String>, GazetteError> {
        validate_patch(&update.patch)?;
        validate_images(&update.new_images)?;
        let removed = self
            .db
            .bounded("update_event_by_id", async {
                let mut tx = self.db.begin().await?;
                let outcome = apply_update(&mut tx, event_id, update).await;
                finish(tx, outcome, "update_event_by_id").await
            })
            .await?;

        tracing::info!(
            %event_id,
            editor = %update.editor,
            added = update.new_images.len(),
            removed = removed.len(),
            "event updated"
        );
        Ok(removed)
    }

    /// The full aggregate, drafts included.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::NotFound`] for an unknown id.
    pub async fn get_event_by_id(&self, event_id: EventId) -> Result<Event, GazetteError> {
        self.db
            .bounded("get_event_by_id", async {
                let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
                let row = sqlx::query_as::<_, EventRow>(&sql)
                    .bind(event_id)
                    .fetch_optional(self.db.pool())
                    .await?
                    .ok_or(GazetteError::NotFound("event"))?;
                self.assemble(row).await
            })
            .await
    }

    /// The full aggregate with the given slug, drafts included.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::NotFound`] for an unknown slug.
    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Event, GazetteError> {
        self.db
            .bounded("get_event_by_slug", async {
                let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1");
                let row = sqlx::query_as::<_, EventRow>(&sql)
                    .bind(slug.trim())
                    .fetch_optional(self.db.pool())
                    .await?
                    .ok_or(GazetteError::NotFound("event"))?;
                self.assemble(row).await
            })
            .await
    }

    /// A page of events.
    ///
    /// Published events are ordered by `published_at`, all events by
    /// `created_at`, newest first. Undecodable rows are skipped.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn list_events(
        &self,
        page: PageRequest,
        visibility: EventVisibility,
    ) -> Result<Vec<Event>, GazetteError> {
        self.db
            .bounded("list_events", async {
                let sql = format!(
                    "SELECT {EVENT_COLUMNS} FROM events {filter} LIMIT $1 OFFSET $2",
                    filter = listing_clause(visibility)
                );
                let query = sqlx::query(&sql)
                    .bind(page.page_size())
                    .bind(page.offset());
                let rows: Vec<EventRow> = fetch_tolerant(query, self.db.pool(), "event").await?;
                self.assemble_all(rows).await
            })
            .await
    }

    /// Number of events visible under `visibility`.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn event_count(&self, visibility: EventVisibility) -> Result<i64, GazetteError> {
        let sql = match visibility {
            EventVisibility::Published => "SELECT COUNT(*) FROM events WHERE NOT is_draft",
            EventVisibility::All => "SELECT COUNT(*) FROM events",
        };
        self.db
            .bounded("event_count", async {
                Ok(sqlx::query_scalar(sql).fetch_one(self.db.pool()).await?)
            })
            .await
    }

    /// The `limit` most recently published events.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn recent_published_events(&self, limit: i64) -> Result<Vec<Event>, GazetteError> {
        self.db
            .bounded("recent_published_events", async {
                let sql = format!(
                    "SELECT {EVENT_COLUMNS} FROM events {filter} LIMIT $1",
                    filter = listing_clause(EventVisibility::Published)
                );
                let query = sqlx::query(&sql).bind(limit.max(0));
                let rows: Vec<EventRow> = fetch_tolerant(query, self.db.pool(), "event").await?;
                self.assemble_all(rows).await
            })
            .await
    }

    /// Deletes an event with its images and author rows.
    ///
    /// Returns the URLs of the deleted images.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::NotFound`] for an unknown id.
    pub async fn delete_event_by_id(&self, event_id: EventId) -> Result<Vec<String>, GazetteError> {
        let urls = self
            .db
            .bounded("delete_event_by_id", async {
                let mut tx = self.db.begin().await?;
                let outcome = delete_aggregate(&mut tx, event_id).await;
                finish(tx, outcome, "delete_event_by_id").await
            })
            .await?;

        tracing::info!(%event_id, images = urls.len(), "event deleted");
        Ok(urls)
    }

    async fn assemble(&self, row: EventRow) -> Result<Event, GazetteError> {
        let images = images::images_for_event(&self.db, row.id).await?;
        let authors = authors::authors_of(&self.db, row.id).await?;
        Ok(row.into_event(images, authors))
    }

    async fn assemble_all(&self, rows: Vec<EventRow>) -> Result<Vec<Event>, GazetteError> {
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(self.assemble(row).await?);
        }
        Ok(events)
    }
}

fn listing_clause(visibility: EventVisibility) -> &'static str {
    match visibility {
        EventVisibility::Published => {
            "WHERE NOT is_draft ORDER BY published_at DESC, id ASC"
        }
        EventVisibility::All => "ORDER BY created_at DESC, id ASC",
    }
}

async fn insert_aggregate(
    tx: &mut Tx,
    event: &NewEvent,
    slug: &str,
    author: AdminId,
) -> Result<EventId, GazetteError> {
    let event_id = EventId::new();
    sqlx::query(
        "INSERT INTO events \
         (id, created_at, updated_at, title, slug, date, description, content, is_draft, published_at) \
         VALUES ($1, now(), now(), $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN NULL ELSE now() END)",
    )
    .bind(event_id)
    .bind(event.title.trim())
    .bind(slug)
    .bind(event.date)
    .bind(&event.description)
    .bind(&event.content)
    .bind(event.is_draft)
    .execute(&mut **tx)
    .await?;

    authors::associate_admin_with_event(tx, author, event_id).await?;
    for co_author in &event.co_authors {
        authors::associate_admin_with_event(tx, *co_author, event_id).await?;
    }

    let mut first_image = None;
    for image in &event.images {
        let image_id = images::add_image_to_event(tx, image, event_id).await?;
        first_image.get_or_insert(image_id);
    }
    if !event.images.iter().any(|img| img.is_display) {
        if let Some(image_id) = first_image {
            images::set_display_image_for_event(tx, image_id, event_id).await?;
        }
    }
    Ok(event_id)
}

async fn apply_update(
    tx: &mut Tx,
    event_id: EventId,
    update: &EventUpdate,
) -> Result<Vec<String>, GazetteError> {
    let touched = patch_query(event_id, &update.patch)
        .build()
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if touched == 0 {
        return Err(GazetteError::NotFound("event"));
    }

    for image in &update.new_images {
        images::add_image_to_event(tx, image, event_id).await?;
    }

    let mut removed = Vec::with_capacity(update.removed_image_ids.len());
    for image_id in &update.removed_image_ids {
        removed.push(images::remove_image_from_event(tx, *image_id, event_id).await?);
    }

    if let Some(image_id) = update.new_display_image {
        images::set_display_image_for_event(tx, image_id, event_id).await?;
    }

    authors::associate_admin_with_event(tx, update.editor, event_id).await?;
    Ok(removed)
}

/// Builds the `UPDATE events` statement for the present fields of `patch`.
///
/// Column names are literals here; only values are bound.
fn patch_query(event_id: EventId, patch: &EventPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE events SET updated_at = now()");
    if let Some(title) = &patch.title {
        qb.push(", title = ").push_bind(title.trim().to_owned());
    }
    if let Some(slug) = &patch.slug {
        qb.push(", slug = ").push_bind(slug.trim().to_owned());
    }
    if let Some(date) = patch.date {
        qb.push(", date = ").push_bind(date);
    }
    if let Some(description) = &patch.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(content) = &patch.content {
        qb.push(", content = ").push_bind(content.clone());
    }
    if let Some(is_draft) = patch.is_draft {
        qb.push(", is_draft = ").push_bind(is_draft);
        // Republishing keeps the first publication time.
        qb.push(", published_at = CASE WHEN ")
            .push_bind(is_draft)
            .push(" THEN NULL ELSE COALESCE(published_at, now()) END");
    }
    qb.push(" WHERE id = ").push_bind(event_id);
    qb
}

async fn delete_aggregate(tx: &mut Tx, event_id: EventId) -> Result<Vec<String>, GazetteError> {
    let locked: Option<EventId> =
        sqlx::query_scalar("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await?;
    if locked.is_none() {
        return Err(GazetteError::NotFound("event"));
    }

    let urls: Vec<String> = sqlx::query_scalar(
        "SELECT image_url FROM event_images WHERE event_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(event_id)
    .fetch_all(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;
    Ok(urls)
}
