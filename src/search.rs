use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, bail};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::ImageRecord;
use crate::llm::Embedder;
use crate::metrics;
use crate::store::RecordStore;

pub const KITTEN_URL: &str = "https://placekitten.com/400/300";
pub const PLACEHOLDER_URL: &str = "https://via.placeholder.com/400x300";

/// 一条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    /// 图片公开 URL
    pub image_url: String,
    /// 情绪标签
    pub mood: Option<String>,
    /// 与查询的余弦距离，仅向量搜索有此字段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

impl From<ImageRecord> for SearchHit {
    fn from(record: ImageRecord) -> Self {
        Self { image_url: record.image_url, mood: record.mood, distance: None }
    }
}

/// 搜索策略
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// 情绪标签的子串匹配
    Substring,
    /// 嵌入向量的相似度搜索
    Vector,
    /// 占位图片，不访问数据库
    Stub,
}

/// 按情绪搜索图片
///
/// 空结果表示没有匹配的图片，不是错误
#[async_trait]
pub trait MoodSearch: Send + Sync {
    fn strategy(&self) -> SearchStrategy;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Vector => "vector",
            Self::Stub => "stub",
        }
    }
}

/// 大小写不敏感的子串匹配
pub struct SubstringSearch {
    store: Arc<dyn RecordStore>,
    limit: usize,
}

impl SubstringSearch {
    pub fn new(store: Arc<dyn RecordStore>, limit: usize) -> Self {
        Self { store, limit }
    }
}

#[async_trait]
impl MoodSearch for SubstringSearch {
    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Substring
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let records = self.store.search_mood(query, self.limit).await?;
        Ok(records.into_iter().map(SearchHit::from).collect())
    }
}

/// 先生成查询的嵌入向量，再取距离最近的 k 条记录
pub struct VectorSearch {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn Embedder>,
    k: usize,
}

impl VectorSearch {
    pub fn new(store: Arc<dyn RecordStore>, embedder: Arc<dyn Embedder>, k: usize) -> Self {
        Self { store, embedder, k }
    }
}

#[async_trait]
impl MoodSearch for VectorSearch {
    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Vector
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let embedding = self.embedder.embed(query).await?;
        let result = self.store.nearest(&embedding, self.k).await?;
        Ok(result
            .into_iter()
            .map(|(distance, record)| SearchHit { distance: Some(distance), ..SearchHit::from(record) })
            .collect())
    }
}

/// 查询 "cat" 时返回小猫图片，其余查询返回通用占位图片
pub struct StubSearch;

#[async_trait]
impl MoodSearch for StubSearch {
    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Stub
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let image_url = match query.trim().eq_ignore_ascii_case("cat") {
            true => KITTEN_URL,
            false => PLACEHOLDER_URL,
        };
        Ok(vec![SearchHit { image_url: image_url.to_string(), mood: Some(query.to_string()), distance: None }])
    }
}

/// 根据配置创建搜索策略
///
/// 向量搜索需要 embedder
pub fn build_search(
    strategy: SearchStrategy,
    store: Arc<dyn RecordStore>,
    embedder: Option<Arc<dyn Embedder>>,
    count: usize,
) -> Result<Arc<dyn MoodSearch>> {
    if count == 0 {
        bail!("结果数量必须大于 0");
    }
    let search: Arc<dyn MoodSearch> = match strategy {
        SearchStrategy::Substring => Arc::new(SubstringSearch::new(store, count)),
        SearchStrategy::Vector => match embedder {
            Some(embedder) => Arc::new(VectorSearch::new(store, embedder, count)),
            None => bail!("向量搜索需要配置 OPENAI_API_KEY"),
        },
        SearchStrategy::Stub => Arc::new(StubSearch),
    };
    Ok(search)
}

/// 执行搜索并记录指标
pub async fn search_with_metrics(search: &dyn MoodSearch, query: &str) -> Result<Vec<SearchHit>> {
    let strategy = search.strategy().as_str();
    let start = Instant::now();
    let result = search.search(query).await;
    match &result {
        Ok(hits) => {
            metrics::observe_search(strategy, start.elapsed().as_secs_f32(), hits.len());
            metrics::inc_search(strategy, if hits.is_empty() { "not_found" } else { "found" });
        }
        Err(_) => metrics::inc_search(strategy, "error"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_cat() {
        let hits = StubSearch.search("cat").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].image_url.contains("placekitten"));

        let hits = StubSearch.search(" CAT ").await.unwrap();
        assert!(hits[0].image_url.contains("placekitten"));
    }

    #[tokio::test]
    async fn test_stub_other() {
        for query in ["dog", "happy", "cats", ""] {
            let hits = StubSearch.search(query).await.unwrap();
            assert_eq!(hits[0].image_url, PLACEHOLDER_URL);
        }
    }

    #[test]
    fn test_hit_serialization() {
        let hit = SearchHit { image_url: "u".to_string(), mood: Some("calm".to_string()), distance: None };
        assert_eq!(serde_json::to_value(&hit).unwrap(), serde_json::json!({"image_url": "u", "mood": "calm"}));
    }
}
