use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use super::{ObjectEntry, ObjectSource, join_url};

const EMPTY_FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

/// Supabase Storage 存储桶
pub struct SupabaseStorage {
    client: reqwest::Client,
    base: Url,
    service_key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct StorageObject {
    name: String,
    /// 目录没有 id
    id: Option<String>,
}

impl SupabaseStorage {
    pub fn new(url: &str, service_key: impl Into<String>, bucket: impl Into<String>) -> Result<Self> {
        let base = Url::parse(url).with_context(|| format!("无效的 Supabase URL: {url}"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
            service_key: service_key.into(),
            bucket: bucket.into(),
        })
    }
}

#[async_trait]
impl ObjectSource for SupabaseStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<ObjectEntry>> {
        let url = join_url(&self.base, ["storage", "v1", "object", "list", self.bucket.as_str()])?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&json!({
                "prefix": "",
                "limit": limit,
                "offset": offset,
                "sortBy": { "column": "name", "order": "asc" },
            }))
            .send()
            .await
            .with_context(|| format!("无法列出存储桶 {}", self.bucket))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Supabase Storage 错误 ({status}): {body}");
        }

        let objects: Vec<StorageObject> = response.json().await.context("无法解析存储桶列表")?;
        Ok(objects
            .into_iter()
            .map(|object| ObjectEntry {
                is_file: object.id.is_some() && object.name != EMPTY_FOLDER_PLACEHOLDER,
                name: object.name,
            })
            .collect())
    }

    fn public_url(&self, name: &str) -> Result<String> {
        let segments = ["storage", "v1", "object", "public", self.bucket.as_str()]
            .into_iter()
            .chain(name.split('/'));
        Ok(join_url(&self.base, segments)?.to_string())
    }
}
