use std::sync::Arc;

use crate::search::MoodSearch;
use crate::store::RecordStore;

/// 应用状态
pub struct AppState {
    /// 搜索策略
    pub search: Arc<dyn MoodSearch>,
    /// 图片记录库
    pub store: Arc<dyn RecordStore>,
    /// 是否只返回第一个结果
    pub single: bool,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(search: Arc<dyn MoodSearch>, store: Arc<dyn RecordStore>, count: usize) -> Arc<Self> {
        Arc::new(AppState { search, store, single: count == 1 })
    }
}
