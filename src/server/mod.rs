mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::error::AppError;
pub use self::state::*;
pub use self::types::*;

#[derive(OpenApi)]
#[openapi(
    paths(api::search_handler, api::map_handler, api::metrics_handler),
    components(schemas(types::SearchResponse, types::ErrorBody, crate::coords::MapPoint))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>, cors: bool) -> Router {
    let app = Router::new()
        .route("/search", get(api::search_handler))
        .route("/map", get(api::map_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);
    match cors {
        // 允许独立部署的前端跨域访问
        true => app.layer(CorsLayer::permissive()),
        false => app,
    }
}
