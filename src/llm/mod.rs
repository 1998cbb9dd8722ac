//! 外部模型接口
//!
//! 批处理任务和向量搜索只依赖这里的 trait，具体实现见 [`openai`]。

use anyhow::Result;
use async_trait::async_trait;

pub mod openai;

pub use openai::OpenAiClient;

/// 文本嵌入
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// 根据图片 URL 给出简短的情绪标签
#[async_trait]
pub trait MoodLabeler: Send + Sync {
    async fn label_image(&self, image_url: &str) -> Result<String>;
}

/// 将情绪标签映射为效价-唤醒度坐标
///
/// 返回模型的原始文本，解析由调用方负责（见 [`crate::coords::resolve_coordinates`]）
#[async_trait]
pub trait CoordinateMapper: Send + Sync {
    async fn map_mood(&self, mood: &str) -> Result<String>;
}
