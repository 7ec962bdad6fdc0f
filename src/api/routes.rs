//! Router configuration for the API.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiDoc;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers::{auth, departments, health, jobs, persons};
use crate::api::middleware::{
    auth_middleware, global_error_handler, logging_middleware, request_id_middleware,
};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_PATH: &str = "/swagger-ui";

/// Router settings that come from `[server]`.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub request_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Public and token-protected routes with their merged OpenAPI document.
fn api_routes(state: &AppState) -> (Router<AppState>, OpenApiDoc) {
    let (public, mut openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(auth::auth_routes())
        .merge(health::health_routes())
        .split_for_parts();

    let (protected, protected_doc) = OpenApiRouter::new()
        .merge(persons::person_routes())
        .merge(departments::department_routes())
        .merge(jobs::job_routes())
        .merge(auth::me_routes())
        .split_for_parts();
    openapi.merge(protected_doc);

    // route_layer keeps unmatched paths a 404 instead of a 401
    let protected = protected.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    (public.merge(protected), openapi)
}

/// The OpenAPI document as served at [`OPENAPI_PATH`].
pub fn openapi() -> OpenApiDoc {
    api_routes(&AppState::in_memory(Default::default())).1
}

/// Creates the application router.
///
/// Layers, outermost first: request id, logging, compression, CORS, error
/// normalisation, timeout. The error handler sits outside the timeout so a
/// 408 still gets a JSON body.
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let (routes, openapi) = api_routes(&state);

    routes
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, openapi))
        .layer(timeout_layer(options.request_timeout))
        .layer(middleware::from_fn(global_error_handler))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
