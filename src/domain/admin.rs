//! Admin entity, status enum and raw input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AdminId;
use crate::error::ValidationError;

/// Lifecycle status of an admin.
///
/// `Permanent` marks the seeded founder. A permanent admin is never updated
/// or deleted, and no caller can assign the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    /// Currently serving.
    Active,
    /// No longer serving.
    Inactive,
    /// Temporarily away.
    Hiatus,
    /// Immutable founder record.
    Permanent,
}

impl AdminStatus {
    /// Column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Hiatus => "hiatus",
            Self::Permanent => "permanent",
        }
    }

    /// Returns `true` for the founder status.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "hiatus" => Ok(Self::Hiatus),
            "permanent" => Ok(Self::Permanent),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// A stored admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admin {
    /// Primary key.
    pub id: AdminId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Display name, HTML-escaped.
    pub name: String,
    /// Lowercase email, unique among live admins.
    pub email: String,
    /// Role within the organisation.
    pub position: String,
    /// Lifecycle status.
    pub status: AdminStatus,
}

impl Admin {
    /// Returns `true` unless the admin has been soft-deleted.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Caller-supplied admin fields, exactly as received.
///
/// Nothing here is trusted. [`super::validation::sanitize_admin`] turns it
/// into a [`ValidAdmin`] or rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminInput {
    /// Display name.
    pub name: String,
    /// Email address, any case.
    pub email: String,
    /// Role within the organisation.
    pub position: String,
    /// One of `active`, `inactive`, `hiatus`.
    pub status: String,
}

/// Admin fields that passed validation and normalisation.
///
/// Only [`super::validation::sanitize_admin`] and the founder seed can
/// construct one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAdmin {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) position: String,
    pub(crate) status: AdminStatus,
}

impl ValidAdmin {
    /// Normalised, HTML-escaped name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Trimmed position.
    #[must_use]
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Validated status (never `Permanent`).
    #[must_use]
    pub const fn status(&self) -> AdminStatus {
        self.status
    }
}

/// Lookup key for a single admin.
///
/// Closed set of columns; callers never name a column directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminLookup {
    /// By primary key.
    Id(AdminId),
    /// By email (normalised before the query).
    Email(String),
}

/// Founder record written on first run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FounderSeed {
    /// Founder name.
    pub name: String,
    /// Founder email.
    pub email: String,
    /// Founder position.
    pub position: String,
}
