pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod node;
pub mod routes;
pub mod state;
pub mod upload;

use axum::routing::get;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aether Render Node API",
        version = "1.0.0",
        description = "Scene storage and single-render execution for one render farm node"
    ),
    tags(
        (name = "Scenes", description = "Scene archive upload and listing"),
        (name = "Render", description = "Render execution, progress and results"),
        (name = "Node", description = "Node identity"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    router
        .route("/", get(handlers::node::index))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http())
}
