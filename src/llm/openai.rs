use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{CoordinateMapper, Embedder, MoodLabeler};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

const MOOD_INSTRUCTION: &str = "What is the mood of this image?";

fn coordinate_prompt(mood: &str) -> String {
    format!(
        r#"You are given a mood description of an image: "{mood}"
Map this mood to two coordinates (x, y) in the range [-1..1], where:
- x is valence (negative vs positive)
- y is arousal (low vs high)

Answer only with JSON in this format: {{"x": number, "y": number}}
For example: {{"x": 0.5, "y": -0.2}}"#
    )
}

/// OpenAI 兼容 API 的配置
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub vision_model: String,
    pub chat_model: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// 调用 OpenAI API 的嵌入、视觉标注和坐标映射
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("请求 {url} 失败"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("OpenAI API 错误 ({status}): {body}");
        }

        response.json::<T>().await.with_context(|| format!("无法解析 {url} 的响应"))
    }

    /// 发送一轮对话并返回第一个回复的内容
    async fn chat(&self, body: Value) -> Result<String> {
        let response: ChatResponse = self.post("chat/completions", &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("OpenAI 响应中没有回复内容")?;
        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = json!({
            "model": self.config.embedding_model,
            "input": text,
        });
        let response: EmbeddingResponse = self.post("embeddings", &body).await?;
        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .context("OpenAI 响应中没有嵌入向量")?;
        debug!("生成嵌入向量: {:?} => {} 维", text, embedding.len());
        Ok(embedding)
    }
}

#[async_trait]
impl MoodLabeler for OpenAiClient {
    async fn label_image(&self, image_url: &str) -> Result<String> {
        let body = json!({
            "model": self.config.vision_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": MOOD_INSTRUCTION },
                    { "type": "image_url", "image_url": { "url": image_url } },
                ],
            }],
            "max_tokens": 20,
            "temperature": 0.7,
        });
        self.chat(body).await
    }
}

#[async_trait]
impl CoordinateMapper for OpenAiClient {
    async fn map_mood(&self, mood: &str) -> Result<String> {
        let body = json!({
            "model": self.config.chat_model,
            "messages": [{ "role": "user", "content": coordinate_prompt(mood) }],
            "temperature": 0.0,
        });
        self.chat(body).await
    }
}
