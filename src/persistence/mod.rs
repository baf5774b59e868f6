//! Persistence layer: the PostgreSQL store handle and the repositories.
//!
//! [`Database`] is the only shared resource. It is built once at startup
//! and handed to every repository; there is no global connection.
//!
//! Every public repository operation runs inside [`Database::bounded`], so
//! a stalled store call ends in [`GazetteError::TransientStore`] instead of
//! hanging the caller. Callers may impose a tighter deadline by wrapping the
//! returned future in their own `tokio::time::timeout`; a dropped future
//! drops its transaction, which sqlx rolls back before the connection is
//! reused.
//!
//! Every write runs in a transaction, and each connection carries the same
//! deadline as its server-side `statement_timeout`, so a statement the
//! client stopped waiting for is cancelled by PostgreSQL as well.

pub mod admins;
pub mod authors;
pub mod events;
pub mod images;
pub mod models;

pub use admins::AdminRepository;
pub use authors::AuthorshipLedger;
pub use events::EventRepository;

use std::future::Future;
use std::time::Duration;

use futures_util::TryStreamExt;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, Postgres, Transaction};

use crate::config::GazetteConfig;
use crate::error::GazetteError;

/// A transaction owned by one aggregate operation.
pub type Tx = Transaction<'static, Postgres>;

/// Connection-pooled PostgreSQL handle with a per-operation deadline.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    deadline: Duration,
}

impl Database {
    /// Connects eagerly using the pool settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::TransientStore`] if no connection can be
    /// established within the connect timeout.
    pub async fn connect(config: &GazetteConfig) -> Result<Self, GazetteError> {
        let pool = pool_options(config)
            .connect_with(connect_options(config)?)
            .await?;
        Ok(Self::from_pool(pool, config.statement_timeout()))
    }

    /// Builds a pool that opens connections on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` cannot be parsed.
    pub fn connect_lazy(config: &GazetteConfig) -> Result<Self, GazetteError> {
        let pool = pool_options(config).connect_lazy_with(connect_options(config)?);
        Ok(Self::from_pool(pool, config.statement_timeout()))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Deadline applied to each repository operation.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteError::Internal`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GazetteError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GazetteError::Internal(format!("migration failed: {e}")))
    }

    /// Round-trips a trivial query.
    ///
    /// # Errors
    ///
    /// Returns the classified store error if the database is unreachable.
    pub async fn ping(&self) -> Result<(), GazetteError> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    /// Runs `fut` under the store deadline.
    pub(crate) async fn bounded<T, F>(
        &self,
        operation: &'static str,
        fut: F,
    ) -> Result<T, GazetteError>
    where
        F: Future<Output = Result<T, GazetteError>>,
    {
        if let Ok(outcome) = tokio::time::timeout(self.deadline, fut).await {
            outcome
        } else {
            tracing::warn!(
                operation,
                deadline_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX),
                "store deadline elapsed"
            );
            Err(GazetteError::TransientStore(format!(
                "{operation} exceeded its deadline"
            )))
        }
    }

    /// Opens a transaction.
    pub(crate) async fn begin(&self) -> Result<Tx, GazetteError> {
        Ok(self.pool.begin().await?)
    }
}

/// Parses `DATABASE_URL` and sets the server-side statement timeout.
fn connect_options(config: &GazetteConfig) -> Result<PgConnectOptions, GazetteError> {
    let options: PgConnectOptions = config.database_url.parse()?;
    Ok(options.options([(
        "statement_timeout",
        format!("{}ms", config.database_statement_timeout_ms),
    )]))
}

fn pool_options(config: &GazetteConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
}

/// Commits on success; rolls back explicitly before returning a failure.
pub(crate) async fn finish<T>(
    tx: Tx,
    outcome: Result<T, GazetteError>,
    operation: &'static str,
) -> Result<T, GazetteError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(operation, error = %rollback_err, "rollback failed");
            }
            tracing::debug!(operation, error = %err, "transaction rolled back");
            Err(err)
        }
    }
}

/// Streams a list query, skipping rows that fail to decode.
///
/// One malformed row is logged and dropped instead of failing the page.
pub(crate) async fn fetch_tolerant<T>(
    query: Query<'_, Postgres, PgArguments>,
    pool: &PgPool,
    entity: &'static str,
) -> Result<Vec<T>, GazetteError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let mut rows = query.fetch(pool);
    let mut out = Vec::new();
    while let Some(row) = rows.try_next().await? {
        match T::from_row(&row) {
            Ok(value) => out.push(value),
            Err(err) => tracing::warn!(entity, error = %err, "skipping undecodable row"),
        }
    }
    Ok(out)
}
