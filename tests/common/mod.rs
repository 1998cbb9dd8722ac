#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use moodsearch::MoodDB;
use moodsearch::db::{CoordinateStatus, ImageRecord};
use moodsearch::llm::{CoordinateMapper, Embedder, MoodLabeler};
use moodsearch::storage::{ObjectEntry, ObjectSource};
use moodsearch::store::RecordStore;
use tempfile::TempDir;

pub const BASE_URL: &str = "https://cdn.example.com/Moods/";

pub async fn open_db(dir: &TempDir) -> MoodDB {
    MoodDB::open(dir.path().join("moodsearch.db")).await.unwrap()
}

/// 存储桶的替身，对象名称直接拼接在 BASE_URL 之后
pub struct FakeSource {
    pub names: Vec<String>,
    pub fail_listing: bool,
}

impl FakeSource {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self { names: names.iter().map(|s| s.as_ref().to_string()).collect(), fail_listing: false }
    }

    pub fn url(name: &str) -> String {
        format!("{BASE_URL}{name}")
    }
}

#[async_trait]
impl ObjectSource for FakeSource {
    fn bucket(&self) -> &str {
        "Moods"
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<ObjectEntry>> {
        if self.fail_listing {
            bail!("bucket not found");
        }
        Ok(self.names.iter().skip(offset).take(limit).map(ObjectEntry::file).collect())
    }

    fn public_url(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            bail!("empty object name");
        }
        Ok(Self::url(name))
    }
}

/// 模型替身
///
/// - 标注：按 URL 查表，查不到时返回 "neutral"
/// - 嵌入：按文本查表，查不到时返回固定向量
/// - 坐标：按情绪查表，查不到时返回 {"x": 0.1, "y": 0.1}
///
/// `fail_on` 中的 URL 或文本会让调用失败
#[derive(Default)]
pub struct FakeLlm {
    pub moods: HashMap<String, String>,
    pub vectors: HashMap<String, Vec<f32>>,
    pub coords: HashMap<String, String>,
    pub fail_on: HashSet<String>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn mood(mut self, url: &str, mood: &str) -> Self {
        self.moods.insert(url.to_string(), mood.to_string());
        self
    }

    pub fn vector(mut self, text: &str, vector: &[f32]) -> Self {
        self.vectors.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn coords(mut self, mood: &str, content: &str) -> Self {
        self.coords.insert(mood.to_string(), content.to_string());
        self
    }

    pub fn fail_on(mut self, input: &str) -> Self {
        self.fail_on.insert(input.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn call(&self, input: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(input.to_string());
        if self.fail_on.contains(input) {
            bail!("OpenAI API 错误 (500 Internal Server Error): upstream failure for {input}");
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for FakeLlm {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.call(text)?;
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| vec![0.5, 0.5, 0.5]))
    }
}

#[async_trait]
impl MoodLabeler for FakeLlm {
    async fn label_image(&self, image_url: &str) -> Result<String> {
        self.call(image_url)?;
        Ok(self.moods.get(image_url).cloned().unwrap_or_else(|| "neutral".to_string()))
    }
}

#[async_trait]
impl CoordinateMapper for FakeLlm {
    async fn map_mood(&self, mood: &str) -> Result<String> {
        self.call(mood)?;
        Ok(self.coords.get(mood).cloned().unwrap_or_else(|| r#"{"x": 0.1, "y": 0.1}"#.to_string()))
    }
}

/// 所有操作都失败的记录库
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(anyhow!("database is unavailable"))
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn find_by_url(&self, _image_url: &str) -> Result<Option<ImageRecord>> {
        unavailable()
    }

    async fn insert(&self, _image_url: &str) -> Result<Option<i64>> {
        unavailable()
    }

    async fn update_mood(&self, _id: i64, _mood: &str) -> Result<()> {
        unavailable()
    }

    async fn update_embedding(&self, _id: i64, _embedding: &[f32]) -> Result<()> {
        unavailable()
    }

    async fn update_coordinates(&self, _id: i64, _x: f64, _y: f64, _status: CoordinateStatus) -> Result<()> {
        unavailable()
    }

    async fn missing_embedding(&self) -> Result<Vec<ImageRecord>> {
        unavailable()
    }

    async fn missing_coordinates(&self) -> Result<Vec<ImageRecord>> {
        unavailable()
    }

    async fn search_mood(&self, _query: &str, _limit: usize) -> Result<Vec<ImageRecord>> {
        unavailable()
    }

    async fn nearest(&self, _embedding: &[f32], _limit: usize) -> Result<Vec<(f32, ImageRecord)>> {
        unavailable()
    }

    async fn mapped(&self) -> Result<Vec<ImageRecord>> {
        unavailable()
    }

    async fn all(&self) -> Result<Vec<ImageRecord>> {
        unavailable()
    }
}

/// 插入一条带情绪标签的记录并返回其 ID
pub async fn seed(db: &MoodDB, name: &str, mood: Option<&str>) -> i64 {
    let id = db.insert(&FakeSource::url(name)).await.unwrap().unwrap();
    if let Some(mood) = mood {
        db.update_mood(id, mood).await.unwrap();
    }
    id
}
