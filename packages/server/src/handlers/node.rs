use axum::Json;
use axum::extract::State;

use crate::node::NodeInfo;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/node",
    tag = "Node",
    operation_id = "nodeInfo",
    summary = "Identity of this render node",
    responses(
        (status = 200, description = "Node identity", body = NodeInfo),
    ),
)]
pub async fn node_info(State(state): State<AppState>) -> Json<NodeInfo> {
    Json(NodeInfo::clone(&state.node))
}

/// Plain-text landing page.
pub async fn index(State(state): State<AppState>) -> String {
    let node = &state.node;
    let activity = if state.engine.status().is_rendering {
        "rendering"
    } else {
        "idle"
    };
    format!(
        "Aether render node\n\n\
         name:     {}\n\
         id:       {}\n\
         version:  {}\n\
         port:     {}\n\
         started:  {}\n\
         status:   {activity}\n\n\
         API docs: /swagger-ui\n",
        node.name,
        node.id,
        node.version,
        state.config.server.port,
        node.started_at.to_rfc3339(),
    )
}
