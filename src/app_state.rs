//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::{AdminRepository, AuthorshipLedger, Database, EventRepository};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Store handle, used by the health check.
    pub database: Database,
    /// Admin repository.
    pub admins: Arc<AdminRepository>,
    /// Event aggregate repository.
    pub events: Arc<EventRepository>,
    /// Authorship reads.
    pub authors: AuthorshipLedger,
    /// Size of the "recent events" listing.
    pub recent_events_limit: i64,
}

impl AppState {
    /// Wires every repository to the same store handle.
    #[must_use]
    pub fn new(database: Database, recent_events_limit: i64) -> Self {
        Self {
            admins: Arc::new(AdminRepository::new(database.clone())),
            events: Arc::new(EventRepository::new(database.clone())),
            authors: AuthorshipLedger::new(database.clone()),
            database,
            recent_events_limit,
        }
    }
}
