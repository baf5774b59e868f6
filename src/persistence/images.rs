//! Image subsystem: child rows of an event.
//!
//! Every write takes the owning aggregate's [`Tx`]; there is no way to add,
//! remove or promote an image outside an event transaction.

use super::models::IMAGE_COLUMNS;
use super::{Database, Tx, fetch_tolerant};
use crate::domain::{EventId, EventImage, ImageId, NewEventImage};
use crate::error::GazetteError;

/// Inserts one image owned by `event_id` and returns its id.
///
/// The row is written with `is_display = false`; a flagged image is then
/// promoted through [`set_display_image_for_event`] so the single-display
/// rule has one code path.
///
/// # Errors
///
/// Returns [`crate::error::ValidationError::UnknownReference`] if the event
/// does not exist, or the classified store error.
pub async fn add_image_to_event(
    tx: &mut Tx,
    image: &NewEventImage,
    event_id: EventId,
) -> Result<ImageId, GazetteError> {
    let image_id = ImageId::new();
    sqlx::query(
        "INSERT INTO event_images (id, created_at, image_url, alt_text, is_display, event_id) \
         VALUES ($1, clock_timestamp(), $2, $3, false, $4)",
    )
    .bind(image_id)
    .bind(image.image_url.trim())
    .bind(image.alt_text.trim())
    .bind(event_id)
    .execute(&mut **tx)
    .await?;

    if image.is_display {
        set_display_image_for_event(tx, image_id, event_id).await?;
    }
    Ok(image_id)
}

/// Makes `image_id` the only display image of `event_id`.
///
/// Clears the flag on every image of the event, then sets it on the named
/// one. Both statements run in the caller's transaction, so other readers
/// see either the old or the new display image, never none or two. The
/// partial unique index `event_images_one_display_per_event` holds the rule
/// even for writers that bypass this function.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] if the image does not exist or belongs
/// to another event.
pub async fn set_display_image_for_event(
    tx: &mut Tx,
    image_id: ImageId,
    event_id: EventId,
) -> Result<(), GazetteError> {
    sqlx::query("UPDATE event_images SET is_display = false WHERE event_id = $1 AND is_display")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    let promoted = sqlx::query(
        "UPDATE event_images SET is_display = true WHERE id = $1 AND event_id = $2",
    )
    .bind(image_id)
    .bind(event_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if promoted == 0 {
        return Err(GazetteError::NotFound("image"));
    }
    Ok(())
}

/// Deletes one image of `event_id` and returns its URL.
///
/// The stored object is not touched; the URL is handed back so the caller
/// can clean up object storage after commit.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] if the image does not exist or belongs
/// to another event.
pub async fn remove_image_from_event(
    tx: &mut Tx,
    image_id: ImageId,
    event_id: EventId,
) -> Result<String, GazetteError> {
    let url: Option<String> = sqlx::query_scalar(
        "DELETE FROM event_images WHERE id = $1 AND event_id = $2 RETURNING image_url",
    )
    .bind(image_id)
    .bind(event_id)
    .fetch_optional(&mut **tx)
    .await?;

    url.ok_or(GazetteError::NotFound("image"))
}

/// Images of an event, oldest first.
///
/// # Errors
///
/// Returns the classified store error.
pub async fn images_for_event(
    db: &Database,
    event_id: EventId,
) -> Result<Vec<EventImage>, GazetteError> {
    let sql = format!(
        "SELECT {IMAGE_COLUMNS} FROM event_images WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
    );
    fetch_tolerant(sqlx::query(&sql).bind(event_id), db.pool(), "event_image").await
}
