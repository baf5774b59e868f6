//! Admin handlers: create, list, get, update, soft delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AdminDto, AdminListParams, AdminListResponse, AdminRequest, CreatedResponse, PaginationMeta,
};
use crate::app_state::AppState;
use crate::domain::{AdminId, AdminInput, AdminLookup};
use crate::error::{ErrorResponse, GazetteError};

/// `POST /admins`: Create an admin.
///
/// # Errors
///
/// Returns [`GazetteError::Validation`] for malformed input or
/// [`GazetteError::Conflict`] for a duplicate email.
#[utoipa::path(
    post,
    path = "/api/v1/admins",
    tag = "Admins",
    summary = "Create an admin",
    description = "Validates and normalises the fields, then stores the admin. The email must be unique among live admins.",
    request_body = AdminRequest,
    responses(
        (status = 201, description = "Admin created", body = CreatedResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
    )
)]
pub async fn create_admin(
    State(state): State<AppState>,
    Json(req): Json<AdminRequest>,
) -> Result<impl IntoResponse, GazetteError> {
    let id = state.admins.create_admin(&AdminInput::from(req)).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.into() })))
}

/// `GET /admins`: List live admins.
///
/// # Errors
///
/// Returns [`GazetteError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/admins",
    tag = "Admins",
    summary = "List admins",
    description = "Returns live admins, newest first. The permanent founder is hidden unless `include_founder` is set.",
    params(AdminListParams),
    responses(
        (status = 200, description = "Paginated admin list", body = AdminListResponse),
    )
)]
pub async fn list_admins(
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<impl IntoResponse, GazetteError> {
    let page = params.page_request();
    let (admins, total) = if params.include_founder {
        (
            state.admins.get_all_admins(page).await?,
            state.admins.live_admin_count(false).await?,
        )
    } else {
        (
            state.admins.get_all_admins_except_founder(page).await?,
            state.admins.live_admin_count(true).await?,
        )
    };

    Ok(Json(AdminListResponse {
        data: admins.into_iter().map(AdminDto::from).collect(),
        pagination: PaginationMeta::new(page, total),
    }))
}

/// `GET /admins/{id}`: Get one admin.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] if no live admin has the id.
#[utoipa::path(
    get,
    path = "/api/v1/admins/{id}",
    tag = "Admins",
    summary = "Get an admin",
    params(
        ("id" = uuid::Uuid, Path, description = "Admin UUID"),
    ),
    responses(
        (status = 200, description = "Admin details", body = AdminDto),
        (status = 404, description = "Admin not found", body = ErrorResponse),
    )
)]
pub async fn get_admin(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GazetteError> {
    let admin = state
        .admins
        .get_admin(&AdminLookup::Id(AdminId::from(id)))
        .await?;
    Ok(Json(AdminDto::from(admin)))
}

/// `GET /admins/by-email/{email}`: Get one admin by email.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] if no live admin has the email.
#[utoipa::path(
    get,
    path = "/api/v1/admins/by-email/{email}",
    tag = "Admins",
    summary = "Get an admin by email",
    description = "The email is matched case-insensitively.",
    params(
        ("email" = String, Path, description = "Admin email"),
    ),
    responses(
        (status = 200, description = "Admin details", body = AdminDto),
        (status = 404, description = "Admin not found", body = ErrorResponse),
    )
)]
pub async fn get_admin_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, GazetteError> {
    let admin = state.admins.get_admin(&AdminLookup::Email(email)).await?;
    Ok(Json(AdminDto::from(admin)))
}

/// `PUT /admins/{id}`: Replace an admin's fields.
///
/// # Errors
///
/// Returns [`GazetteError::Conflict`] for the permanent founder or a taken
/// email, [`GazetteError::NotFound`] for an unknown id.
#[utoipa::path(
    put,
    path = "/api/v1/admins/{id}",
    tag = "Admins",
    summary = "Update an admin",
    description = "Replaces name, email, position and status. The permanent founder cannot be modified.",
    params(
        ("id" = uuid::Uuid, Path, description = "Admin UUID"),
    ),
    request_body = AdminRequest,
    responses(
        (status = 204, description = "Admin updated"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Admin not found", body = ErrorResponse),
        (status = 409, description = "Founder or duplicate email", body = ErrorResponse),
    )
)]
pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AdminRequest>,
) -> Result<impl IntoResponse, GazetteError> {
    state
        .admins
        .update_admin(AdminId::from(id), &AdminInput::from(req))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /admins/{id}`: Soft-delete an admin.
///
/// # Errors
///
/// Returns [`GazetteError::Conflict`] for the permanent founder or
/// [`GazetteError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/admins/{id}",
    tag = "Admins",
    summary = "Delete an admin",
    description = "Marks the admin deleted. Authorship history is kept and the email becomes available again.",
    params(
        ("id" = uuid::Uuid, Path, description = "Admin UUID"),
    ),
    responses(
        (status = 204, description = "Admin deleted"),
        (status = 404, description = "Admin not found", body = ErrorResponse),
        (status = 409, description = "Founder cannot be deleted", body = ErrorResponse),
    )
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GazetteError> {
    state.admins.delete_admin(AdminId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /admins/by-email/{email}`: Soft-delete an admin by email.
///
/// # Errors
///
/// Returns [`GazetteError::Conflict`] for the permanent founder or
/// [`GazetteError::NotFound`] if no live admin has the email.
#[utoipa::path(
    delete,
    path = "/api/v1/admins/by-email/{email}",
    tag = "Admins",
    summary = "Delete an admin by email",
    description = "The email is matched case-insensitively.",
    params(
        ("email" = String, Path, description = "Admin email"),
    ),
    responses(
        (status = 204, description = "Admin deleted"),
        (status = 404, description = "Admin not found", body = ErrorResponse),
        (status = 409, description = "Founder cannot be deleted", body = ErrorResponse),
    )
)]
pub async fn delete_admin_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, GazetteError> {
    state.admins.delete_admin_by_email(&email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admins", post(create_admin).get(list_admins))
        .route(
            "/admins/{id}",
            get(get_admin).put(update_admin).delete(delete_admin),
        )
        .route(
            "/admins/by-email/{email}",
            get(get_admin_by_email).delete(delete_admin_by_email),
        )
}
