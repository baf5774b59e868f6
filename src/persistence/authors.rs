//! Authorship ledger: which admins authored which events.
//!
//! Writes only happen inside an event-owning transaction, so the write side
//! is a free function over [`Tx`]. The read side is a join that needs no
//! transaction.

use super::models::ADMIN_COLUMNS;
use super::{Database, Tx, fetch_tolerant};
use crate::domain::{Admin, AdminId, EventId};
use crate::error::{GazetteError, ValidationError};

/// Records `admin_id` as an author of `event_id` unless already recorded.
///
/// Only a live admin can be recorded; the row is read `FOR SHARE` so a
/// concurrent soft delete waits for this transaction. The `EXISTS`
/// pre-check skips the insert in the common case. The insert itself is
/// `ON CONFLICT DO NOTHING`, so two transactions racing past the pre-check
/// still leave one row.
///
/// Returns `true` if a row was added.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownReference`] when the admin is missing
/// or soft-deleted, or when the event does not exist.
pub async fn associate_admin_with_event(
    tx: &mut Tx,
    admin_id: AdminId,
    event_id: EventId,
) -> Result<bool, GazetteError> {
    let live: Option<bool> =
        sqlx::query_scalar("SELECT deleted_at IS NULL FROM admins WHERE id = $1 FOR SHARE")
            .bind(admin_id)
            .fetch_optional(&mut **tx)
            .await?;
    if live != Some(true) {
        return Err(GazetteError::Validation(ValidationError::UnknownReference(
            "admin",
        )));
    }

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM event_authors WHERE admin_id = $1 AND event_id = $2)",
    )
    .bind(admin_id)
    .bind(event_id)
    .fetch_one(&mut **tx)
    .await?;
    if exists {
        return Ok(false);
    }

    let inserted = sqlx::query(
        "INSERT INTO event_authors (admin_id, event_id) VALUES ($1, $2) \
         ON CONFLICT (admin_id, event_id) DO NOTHING",
    )
    .bind(admin_id)
    .bind(event_id)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if inserted > 0 {
        tracing::debug!(%admin_id, %event_id, "author added");
    }
    Ok(inserted > 0)
}

/// Read side of the ledger.
#[derive(Debug, Clone)]
pub struct AuthorshipLedger {
    db: Database,
}

impl AuthorshipLedger {
    /// Creates a ledger reader over `db`.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Authors of an event, oldest account first.
    ///
    /// Soft-deleted admins are included: authorship is history.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn get_authors_by_event_id(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Admin>, GazetteError> {
        self.db
            .bounded("get_authors_by_event_id", authors_of(&self.db, event_id))
            .await
    }
}

/// Unbounded join read, shared with the event aggregate reads.
pub(crate) async fn authors_of(db: &Database, event_id: EventId) -> Result<Vec<Admin>, GazetteError> {
    let sql = format!(
        "SELECT {cols} FROM admins a \
         INNER JOIN event_authors ea ON a.id = ea.admin_id \
         WHERE ea.event_id = $1 \
         ORDER BY a.created_at ASC",
        cols = qualified_admin_columns()
    );
    fetch_tolerant(sqlx::query(&sql).bind(event_id), db.pool(), "admin").await
}

fn qualified_admin_columns() -> String {
    ADMIN_COLUMNS
        .split(", ")
        .map(|col| format!("a.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}
