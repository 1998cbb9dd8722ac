use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::search::SearchHit;

/// 搜索请求参数
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// 搜索的情绪，例如 happy、calm
    pub query: Option<String>,
}

/// 搜索响应，结果数量配置为 1 时为单个对象，否则为数组
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SearchResponse {
    One(SearchHit),
    Many(Vec<SearchHit>),
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
