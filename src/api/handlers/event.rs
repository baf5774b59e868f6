//! Event handlers: the aggregate CRUD plus public listings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AdminDto, CreateEventRequest, CreatedResponse, DeleteEventResponse, EventDto,
    EventListParams, EventListResponse, PaginationMeta, UpdateEventRequest, UpdateEventResponse,
};
use crate::app_state::AppState;
use crate::domain::{EventId, EventUpdate};
use crate::error::{ErrorResponse, GazetteError};

/// `POST /events`: Create an event with images and authors.
///
/// # Errors
///
/// Returns [`GazetteError::Validation`] for malformed input or unknown
/// authors, [`GazetteError::Conflict`] for a taken slug.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates the event, its images and its author rows in one transaction. The slug is derived from the title when omitted; the first image becomes the display image unless one is flagged.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = CreatedResponse),
        (status = 400, description = "Invalid input or unknown author", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, GazetteError> {
    let (event, author) = req.into_parts();
    let id = state.events.create_event(&event, author).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.into() })))
}

/// `GET /events`: List events.
///
/// # Errors
///
/// Returns [`GazetteError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Published events, newest publication first. With `include_drafts`, every event, newest creation first.",
    params(EventListParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> Result<impl IntoResponse, GazetteError> {
    let page = params.page_request();
    let visibility = params.visibility();
    let events = state.events.list_events(page, visibility).await?;
    let total = state.events.event_count(visibility).await?;

    Ok(Json(EventListResponse {
        data: events.into_iter().map(EventDto::from).collect(),
        pagination: PaginationMeta::new(page, total),
    }))
}

/// `GET /events/recent`: Most recently published events.
///
/// # Errors
///
/// Returns [`GazetteError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/events/recent",
    tag = "Events",
    summary = "Recent events",
    description = "The most recently published events; the count is set by `RECENT_EVENTS_LIMIT`.",
    responses(
        (status = 200, description = "Recent events", body = Vec<EventDto>),
    )
)]
pub async fn recent_events(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GazetteError> {
    let events = state
        .events
        .recent_published_events(state.recent_events_limit)
        .await?;
    Ok(Json(
        events.into_iter().map(EventDto::from).collect::<Vec<_>>(),
    ))
}

/// `GET /events/{id}`: Get one event aggregate.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event with images and authors", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GazetteError> {
    let event = state.events.get_event_by_id(EventId::from(id)).await?;
    Ok(Json(EventDto::from(event)))
}

/// `GET /events/by-slug/{slug}`: Get one event aggregate by slug.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] for an unknown slug.
#[utoipa::path(
    get,
    path = "/api/v1/events/by-slug/{slug}",
    tag = "Events",
    summary = "Get an event by slug",
    params(
        ("slug" = String, Path, description = "Event slug"),
    ),
    responses(
        (status = 200, description = "Event with images and authors", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, GazetteError> {
    let event = state.events.get_event_by_slug(&slug).await?;
    Ok(Json(EventDto::from(event)))
}

/// `PATCH /events/{id}`: Update an event aggregate.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] for an unknown event or image,
/// [`GazetteError::Validation`] for malformed input,
/// [`GazetteError::Conflict`] for a taken slug.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Applies field changes, new images, removals, the display image and the editor's authorship in one transaction. Nothing is written if any step fails.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = UpdateEventResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Event or image not found", body = ErrorResponse),
        (status = 409, description = "Slug already exists", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, GazetteError> {
    let event_id = EventId::from(id);
    let update = EventUpdate::from(req);
    let removed_image_urls = state.events.update_event_by_id(event_id, &update).await?;
    let event = state.events.get_event_by_id(event_id).await?;
    Ok(Json(UpdateEventResponse {
        event: EventDto::from(event),
        removed_image_urls,
    }))
}

/// `DELETE /events/{id}`: Delete an event with its images and authors.
///
/// # Errors
///
/// Returns [`GazetteError::NotFound`] for an unknown id.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event deleted", body = DeleteEventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GazetteError> {
    let removed_image_urls = state.events.delete_event_by_id(EventId::from(id)).await?;
    Ok(Json(DeleteEventResponse { removed_image_urls }))
}

/// `GET /events/{id}/authors`: Authors of an event.
///
/// # Errors
///
/// Returns [`GazetteError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/authors",
    tag = "Events",
    summary = "List event authors",
    description = "Every admin who created or edited the event, deleted admins included.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Authors, oldest account first", body = Vec<AdminDto>),
    )
)]
pub async fn event_authors(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GazetteError> {
    let authors = state
        .authors
        .get_authors_by_event_id(EventId::from(id))
        .await?;
    Ok(Json(
        authors.into_iter().map(AdminDto::from).collect::<Vec<_>>(),
    ))
}

/// Event routes (mounted under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/recent", get(recent_events))
        .route("/events/by-slug/{slug}", get(get_event_by_slug))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/{id}/authors", get(event_authors))
}
