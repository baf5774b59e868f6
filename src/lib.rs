//! # gazette
//!
//! Transactional content core for a publishing site: **admins** (the people
//! allowed to publish) and **events** (articles with images and authors),
//! stored in PostgreSQL and exposed through a thin REST surface.
//!
//! An event, its images and its author rows are one aggregate. Every write
//! to it runs in a single transaction, so readers never observe a
//! half-applied create or update.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── EventRepository ──┬── images (tx functions)
//!     │                     └── authors (tx functions)
//!     ├── AdminRepository
//!     │
//!     ├── Validation, pagination (domain/)
//!     │
//!     └── PostgreSQL (persistence/, migrations/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
