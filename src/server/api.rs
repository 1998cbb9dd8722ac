use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use log::info;

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::coords::MapPoint;
use crate::metrics;
use crate::search::search_with_metrics;

/// 按情绪搜索图片
#[utoipa::path(
    get,
    path = "/search",
    params(SearchParams),
    responses(
        (status = 200, body = SearchResponse),
        (status = 400, body = ErrorBody, description = "缺少 query 参数"),
        (status = 404, body = ErrorBody, description = "没有匹配的图片"),
        (status = 500, body = ErrorBody),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .ok_or(AppError::MissingQuery)?;

    info!("收到搜索请求: {}", query);
    let mut hits = search_with_metrics(state.search.as_ref(), query).await?;

    if hits.is_empty() {
        info!("没有找到匹配的图片: {}", query);
        return Err(AppError::NotFound);
    }

    info!("返回 {} 个结果", hits.len());
    let response = match state.single {
        true => SearchResponse::One(hits.swap_remove(0)),
        false => SearchResponse::Many(hits),
    };
    Ok(Json(response))
}

/// 情绪地图上的所有图片
#[utoipa::path(
    get,
    path = "/map",
    responses(
        (status = 200, body = Vec<MapPoint>),
        (status = 500, body = ErrorBody),
    )
)]
pub async fn map_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<MapPoint>>> {
    let records = state.store.mapped().await?;
    Ok(Json(records.iter().filter_map(MapPoint::from_record).collect()))
}

/// Prometheus 指标
#[utoipa::path(get, path = "/metrics")]
pub async fn metrics_handler() -> Result<impl IntoResponse> {
    let body = metrics::export()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
