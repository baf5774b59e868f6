//! Identity repository: admins with soft delete, unique live email and an
//! immutable founder.

use super::models::ADMIN_COLUMNS;
use super::{Database, Tx, fetch_tolerant, finish};
use crate::domain::validation::{
    MAX_FIELD_LEN, escape_html, is_valid_email, normalize_email, require_max_len,
    require_non_empty,
};
use crate::domain::{
    Admin, AdminId, AdminInput, AdminLookup, AdminStatus, FounderSeed, PageRequest, ValidAdmin,
    sanitize_admin,
};
use crate::error::{GazetteError, ValidationError};

const EMAIL_TAKEN: &str = "email already exists";
const FOUNDER_PROTECTED: &str = "permanent admin cannot be modified";

/// Admin CRUD over the `admins` table.
///
/// Email uniqueness among live rows is guaranteed by the partial unique
/// index `admins_email_live_key`; the `email_exists` pre-check in
/// [`AdminRepository::create_admin`] only saves a round trip in the common
/// case.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    db: Database,
}

impl AdminRepository {
    /// Creates a repository over `db`.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Validates, normalises and inserts a new admin.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Validation`] for malformed input, before any store
    ///   access.
    /// - [`GazetteError::Conflict`] if a live admin already uses the email,
    ///   including when a concurrent create wins the race after the pre-check.
    pub async fn create_admin(&self, input: &AdminInput) -> Result<AdminId, GazetteError> {
        let admin = sanitize_admin(input)?;
        let id = self
            .db
            .bounded("create_admin", async {
                let mut tx = self.db.begin().await?;
                let outcome = insert_admin(&mut tx, &admin).await;
                finish(tx, outcome, "create_admin").await
            })
            .await?;
        tracing::info!(admin_id = %id, status = %admin.status(), "admin created");
        Ok(id)
    }

    /// Fetches one live admin by id or email.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::NotFound`] when no live row matches; a row
    /// that fails to decode is an internal error.
    pub async fn get_admin(&self, lookup: &AdminLookup) -> Result<Admin, GazetteError> {
        self.db
            .bounded("get_admin", async {
                let found = match lookup {
                    AdminLookup::Id(id) => {
                        let sql = format!(
                            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1 AND deleted_at IS NULL"
                        );
                        sqlx::query_as::<_, Admin>(&sql)
                            .bind(*id)
                            .fetch_optional(self.db.pool())
                            .await?
                    }
                    AdminLookup::Email(email) => {
                        let sql = format!(
                            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1 AND deleted_at IS NULL"
                        );
                        sqlx::query_as::<_, Admin>(&sql)
                            .bind(normalize_email(email))
                            .fetch_optional(self.db.pool())
                            .await?
                    }
                };
                found.ok_or(GazetteError::NotFound("admin"))
            })
            .await
    }

    /// Live admins, newest first.
    ///
    /// # Errors
    ///
    /// Returns the classified store error. Undecodable rows are skipped.
    pub async fn get_all_admins(&self, page: PageRequest) -> Result<Vec<Admin>, GazetteError> {
        self.db
            .bounded("get_all_admins", self.list(page, false))
            .await
    }

    /// Live admins except the permanent founder, newest first.
    ///
    /// # Errors
    ///
    /// Returns the classified store error. Undecodable rows are skipped.
    pub async fn get_all_admins_except_founder(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Admin>, GazetteError> {
        self.db
            .bounded("get_all_admins_except_founder", self.list(page, true))
            .await
    }

    async fn list(&self, page: PageRequest, exclude_founder: bool) -> Result<Vec<Admin>, GazetteError> {
        let founder_filter = if exclude_founder {
            " AND status <> 'permanent'"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {ADMIN_COLUMNS} FROM admins \
             WHERE deleted_at IS NULL{founder_filter} \
             ORDER BY created_at DESC, id ASC \
             LIMIT $1 OFFSET $2"
        );
        let query = sqlx::query(&sql)
            .bind(page.page_size())
            .bind(page.offset());
        fetch_tolerant(query, self.db.pool(), "admin").await
    }

    /// Replaces name, email, position and status of a live admin.
    ///
    /// The status is read with `FOR UPDATE` in the same transaction as the
    /// write, so the founder check and the update cannot interleave with
    /// another writer.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Validation`] for malformed input.
    /// - [`GazetteError::NotFound`] if no live admin has `id`.
    /// - [`GazetteError::Conflict`] for the permanent founder (nothing is
    ///   written) or an email used by another live admin.
    pub async fn update_admin(&self, id: AdminId, input: &AdminInput) -> Result<(), GazetteError> {
        let admin = sanitize_admin(input)?;
        self.db
            .bounded("update_admin", async {
                let mut tx = self.db.begin().await?;
                let outcome = apply_admin_update(&mut tx, id, &admin).await;
                finish(tx, outcome, "update_admin").await
            })
            .await?;
        tracing::info!(admin_id = %id, "admin updated");
        Ok(())
    }

    /// Soft-deletes a live admin.
    ///
    /// A single guarded `UPDATE` does the work; the follow-up read only
    /// picks the error to report.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Conflict`] for the permanent founder.
    /// - [`GazetteError::NotFound`] if no live admin has `id`.
    pub async fn delete_admin(&self, id: AdminId) -> Result<(), GazetteError> {
        self.soft_delete("delete_admin", &AdminLookup::Id(id)).await
    }

    /// Soft-deletes the live admin using `email`, matched after
    /// normalisation.
    ///
    /// # Errors
    ///
    /// - [`GazetteError::Conflict`] for the permanent founder.
    /// - [`GazetteError::NotFound`] if no live admin uses the email.
    pub async fn delete_admin_by_email(&self, email: &str) -> Result<(), GazetteError> {
        self.soft_delete("delete_admin_by_email", &AdminLookup::Email(email.to_string()))
            .await
    }

    async fn soft_delete(
        &self,
        operation: &'static str,
        lookup: &AdminLookup,
    ) -> Result<(), GazetteError> {
        let id = self
            .db
            .bounded(operation, async {
                let mut tx = self.db.begin().await?;
                let outcome = apply_soft_delete(&mut tx, lookup).await;
                finish(tx, outcome, operation).await
            })
            .await?;
        tracing::info!(admin_id = %id, "admin soft-deleted");
        Ok(())
    }

    /// Count of every admin row, soft-deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn get_admin_count(&self) -> Result<i64, GazetteError> {
        self.db
            .bounded("get_admin_count", async {
                Ok(sqlx::query_scalar("SELECT COUNT(*) FROM admins")
                    .fetch_one(self.db.pool())
                    .await?)
            })
            .await
    }

    /// Count of live admins, optionally without the founder. Used for
    /// pagination metadata.
    ///
    /// # Errors
    ///
    /// Returns the classified store error.
    pub async fn live_admin_count(&self, exclude_founder: bool) -> Result<i64, GazetteError> {
        self.db
            .bounded("live_admin_count", async {
                Ok(sqlx::query_scalar(
                    "SELECT COUNT(*) FROM admins \
                     WHERE deleted_at IS NULL AND (NOT $1 OR status <> 'permanent')",
                )
                .bind(exclude_founder)
                .fetch_one(self.db.pool())
                .await?)
            })
            .await
    }

    /// Writes the permanent founder on first run.
    ///
    /// Does nothing when any admin row exists. Returns `true` if the founder
    /// was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::Validation`] for a malformed seed, or the
    /// classified store error.
    pub async fn seed_founder(&self, seed: &FounderSeed) -> Result<bool, GazetteError> {
        let founder = founder_record(seed)?;
        let inserted = self
            .db
            .bounded("seed_founder", async {
                let mut tx = self.db.begin().await?;
                let outcome = insert_founder(&mut tx, &founder).await;
                finish(tx, outcome, "seed_founder").await
            })
            .await?;
        if inserted {
            tracing::info!(email = founder.email(), "founder seeded");
        }
        Ok(inserted)
    }
}

async fn email_exists(tx: &mut Tx, email: &str) -> Result<bool, GazetteError> {
    Ok(sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM admins WHERE email = $1 AND deleted_at IS NULL)",
    )
    .bind(email)
    .fetch_one(&mut **tx)
    .await?)
}

async fn insert_admin(tx: &mut Tx, admin: &ValidAdmin) -> Result<AdminId, GazetteError> {
    if email_exists(tx, admin.email()).await? {
        return Err(GazetteError::Conflict(EMAIL_TAKEN.to_string()));
    }
    let id = AdminId::new();
    sqlx::query(
        "INSERT INTO admins (id, created_at, updated_at, name, email, position, status) \
         VALUES ($1, now(), now(), $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(admin.name())
    .bind(admin.email())
    .bind(admin.position())
    .bind(admin.status().as_str())
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

async fn insert_founder(tx: &mut Tx, founder: &ValidAdmin) -> Result<bool, GazetteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(&mut **tx)
        .await?;
    if count > 0 {
        return Ok(false);
    }
    let inserted = sqlx::query(
        "INSERT INTO admins (id, created_at, updated_at, name, email, position, status) \
         VALUES ($1, now(), now(), $2, $3, $4, $5) \
         ON CONFLICT (email) WHERE deleted_at IS NULL DO NOTHING",
    )
    .bind(AdminId::new())
    .bind(founder.name())
    .bind(founder.email())
    .bind(founder.position())
    .bind(founder.status().as_str())
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(inserted > 0)
}

/// Column a lookup matches on.
fn lookup_column(lookup: &AdminLookup) -> &'static str {
    match lookup {
        AdminLookup::Id(_) => "id",
        AdminLookup::Email(_) => "email",
    }
}

async fn apply_soft_delete(tx: &mut Tx, lookup: &AdminLookup) -> Result<AdminId, GazetteError> {
    let column = lookup_column(lookup);
    let sql = format!(
        "UPDATE admins SET deleted_at = now(), updated_at = now() \
         WHERE {column} = $1 AND deleted_at IS NULL AND status <> 'permanent' \
         RETURNING id"
    );
    let query = sqlx::query_scalar::<_, AdminId>(&sql);
    let query = match lookup {
        AdminLookup::Id(id) => query.bind(*id),
        AdminLookup::Email(email) => query.bind(normalize_email(email)),
    };
    if let Some(id) = query.fetch_optional(&mut **tx).await? {
        return Ok(id);
    }

    let sql = format!("SELECT status FROM admins WHERE {column} = $1 AND deleted_at IS NULL");
    let query = sqlx::query_scalar::<_, String>(&sql);
    let query = match lookup {
        AdminLookup::Id(id) => query.bind(*id),
        AdminLookup::Email(email) => query.bind(normalize_email(email)),
    };
    match query.fetch_optional(&mut **tx).await?.as_deref() {
        Some(s) if s == AdminStatus::Permanent.as_str() => {
            Err(GazetteError::Conflict(FOUNDER_PROTECTED.to_string()))
        }
        _ => Err(GazetteError::NotFound("admin")),
    }
}

async fn apply_admin_update(
    tx: &mut Tx,
    id: AdminId,
    admin: &ValidAdmin,
) -> Result<(), GazetteError> {
    let status: Option<String> = sqlx::query_scalar(
        "SELECT status FROM admins WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    let status = status.ok_or(GazetteError::NotFound("admin"))?;
    if status == AdminStatus::Permanent.as_str() {
        return Err(GazetteError::Conflict(FOUNDER_PROTECTED.to_string()));
    }

    sqlx::query(
        "UPDATE admins \
         SET name = $1, email = $2, position = $3, status = $4, updated_at = now() \
         WHERE id = $5 AND status <> 'permanent'",
    )
    .bind(admin.name())
    .bind(admin.email())
    .bind(admin.position())
    .bind(admin.status().as_str())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Builds the founder row; the only place a permanent admin is made.
fn founder_record(seed: &FounderSeed) -> Result<ValidAdmin, ValidationError> {
    let email = normalize_email(&seed.email);
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail(email));
    }
    let name = escape_html(seed.name.trim());
    let position = seed.position.trim().to_string();
    require_non_empty("name", &name)?;
    require_max_len("name", &name, MAX_FIELD_LEN)?;
    require_max_len("email", &email, MAX_FIELD_LEN)?;
    require_max_len("position", &position, MAX_FIELD_LEN)?;
    Ok(ValidAdmin {
        name,
        email,
        position,
        status: AdminStatus::Permanent,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn seed(email: &str) -> FounderSeed {
        FounderSeed {
            name: " Ada ".into(),
            email: email.into(),
            position: "Founder".into(),
        }
    }

    #[test]
    fn founder_record_is_permanent_and_normalised() {
        let Ok(founder) = founder_record(&seed("ADA@Example.org")) else {
            panic!("valid seed");
        };
        assert_eq!(founder.status(), AdminStatus::Permanent);
        assert_eq!(founder.email(), "ada@example.org");
        assert_eq!(founder.name(), "Ada");
    }

    #[test]
    fn founder_record_enforces_field_lengths() {
        let mut long_name = seed("ada@example.org");
        long_name.name = "A".repeat(MAX_FIELD_LEN + 1);
        assert_eq!(
            founder_record(&long_name).err(),
            Some(ValidationError::TooLong {
                field: "name",
                max: MAX_FIELD_LEN
            })
        );

        let mut long_position = seed("ada@example.org");
        long_position.position = "p".repeat(MAX_FIELD_LEN + 1);
        assert!(matches!(
            founder_record(&long_position),
            Err(ValidationError::TooLong {
                field: "position",
                ..
            })
        ));
    }

    #[test]
    fn soft_delete_matches_the_lookup_column() {
        assert_eq!(lookup_column(&AdminLookup::Id(AdminId::new())), "id");
        assert_eq!(
            lookup_column(&AdminLookup::Email("a@b.io".into())),
            "email"
        );
    }

    #[test]
    fn founder_record_rejects_bad_email() {
        assert!(matches!(
            founder_record(&seed("nobody")),
            Err(ValidationError::InvalidEmail(_))
        ));
    }
}
