use anyhow::Result;
use async_trait::async_trait;

use crate::db::{CoordinateStatus, ImageRecord};

/// 图片记录存储
///
/// 所有批处理任务和搜索策略都通过这个接口访问记录，生产环境使用 [`crate::db::MoodDB`]。
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 根据图片 URL 查找记录
    async fn find_by_url(&self, image_url: &str) -> Result<Option<ImageRecord>>;

    /// 插入一条派生字段全部为空的记录
    ///
    /// URL 已存在时不做任何修改并返回 None
    async fn insert(&self, image_url: &str) -> Result<Option<i64>>;

    async fn update_mood(&self, id: i64, mood: &str) -> Result<()>;

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()>;

    async fn update_coordinates(&self, id: i64, x: f64, y: f64, status: CoordinateStatus) -> Result<()>;

    /// 有情绪标签但缺少嵌入向量的记录
    async fn missing_embedding(&self) -> Result<Vec<ImageRecord>>;

    /// 有情绪标签但缺少坐标的记录
    async fn missing_coordinates(&self) -> Result<Vec<ImageRecord>>;

    /// 情绪标签的大小写不敏感子串匹配
    async fn search_mood(&self, query: &str, limit: usize) -> Result<Vec<ImageRecord>>;

    /// 按余弦距离从小到大返回最近的 `limit` 条记录
    async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<(f32, ImageRecord)>>;

    /// 已有坐标的记录
    async fn mapped(&self) -> Result<Vec<ImageRecord>>;

    async fn all(&self) -> Result<Vec<ImageRecord>>;
}
