use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(scene_routes(config))
        .merge(render_routes())
        .routes(routes!(handlers::node::node_info))
}

fn scene_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::scene::upload_scene,
            handlers::scene::list_scenes
        ))
        .layer(handlers::scene::upload_body_limit(
            config.server.max_upload_size,
        ))
}

fn render_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::render::start_render))
        .routes(routes!(handlers::render::render_status))
        .routes(routes!(handlers::render::render_result))
}
