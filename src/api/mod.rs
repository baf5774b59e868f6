//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at
//! the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorKind, ErrorResponse};

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        handlers::admin::create_admin,
        handlers::admin::list_admins,
        handlers::admin::get_admin,
        handlers::admin::get_admin_by_email,
        handlers::admin::update_admin,
        handlers::admin::delete_admin,
        handlers::admin::delete_admin_by_email,
        handlers::event::create_event,
        handlers::event::list_events,
        handlers::event::recent_events,
        handlers::event::get_event,
        handlers::event::get_event_by_slug,
        handlers::event::update_event,
        handlers::event::delete_event,
        handlers::event::event_authors,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::AdminRequest,
        dto::AdminDto,
        dto::AdminListResponse,
        dto::CreateEventRequest,
        dto::UpdateEventRequest,
        dto::ImageRequest,
        dto::ImageDto,
        dto::EventDto,
        dto::EventListResponse,
        dto::UpdateEventResponse,
        dto::DeleteEventResponse,
        dto::PaginationMeta,
        dto::CreatedResponse,
        handlers::system::HealthResponse,
        ErrorResponse,
        ErrorBody,
        ErrorKind,
    )),
    tags(
        (name = "Admins", description = "People allowed to publish"),
        (name = "Events", description = "Published articles with images and authors"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource_path() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/admins",
            "/api/v1/admins/{id}",
            "/api/v1/admins/by-email/{email}",
            "/api/v1/events",
            "/api/v1/events/recent",
            "/api/v1/events/{id}",
            "/api/v1/events/{id}/authors",
            "/api/v1/events/by-slug/{slug}",
            "/health",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn admins_can_be_deleted_by_email() {
        let doc = ApiDoc::openapi();
        let by_email = doc.paths.paths.get("/api/v1/admins/by-email/{email}");
        assert!(by_email.is_some_and(|item| item.get.is_some() && item.delete.is_some()));
    }
}
