//! Admin request and response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, default_page, default_page_size};
use crate::domain::{Admin, AdminInput, PageRequest};

/// Request body for `POST /admins` and `PUT /admins/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdminRequest {
    /// Display name.
    pub name: String,
    /// Email address; stored lowercase.
    pub email: String,
    /// Role within the organisation.
    #[serde(default)]
    pub position: String,
    /// One of `active`, `inactive`, `hiatus`.
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "active".to_string()
}

impl From<AdminRequest> for AdminInput {
    fn from(req: AdminRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            position: req.position,
            status: req.status,
        }
    }
}

/// One admin as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDto {
    /// Admin UUID.
    pub id: uuid::Uuid,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete time; only set on historical authors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role within the organisation.
    pub position: String,
    /// Lifecycle status.
    pub status: String,
}

impl From<Admin> for AdminDto {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id.into(),
            created_at: admin.created_at,
            updated_at: admin.updated_at,
            deleted_at: admin.deleted_at,
            name: admin.name,
            email: admin.email,
            position: admin.position,
            status: admin.status.as_str().to_string(),
        }
    }
}

/// Query parameters for `GET /admins`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page. Defaults to 10, capped at 100.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Include the permanent founder. Defaults to `false`.
    #[serde(default)]
    pub include_founder: bool,
}

impl AdminListParams {
    /// Normalised page request.
    #[must_use]
    pub const fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

/// Paginated admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminListResponse {
    /// Admins on this page, newest first.
    pub data: Vec<AdminDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
