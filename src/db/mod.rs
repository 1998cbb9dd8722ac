use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use sqlx::{SqlitePool, sqlite::*};

pub mod crud;
pub mod model;

pub use model::*;

use crate::distance::nearest;
use crate::store::RecordStore;

pub type Database = SqlitePool;

pub async fn init_db(filename: impl AsRef<Path>) -> Result<Database, sqlx::Error> {
    let filename = filename.as_ref();
    info!("初始化数据库连接: {}", filename.display());

    let options = SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .filename(filename)
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    info!("检查数据库迁移");
    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

/// 基于 SQLite 的图片记录库
#[derive(Clone)]
pub struct MoodDB {
    pool: Database,
}

impl MoodDB {
    /// 打开数据库，如果不存在则创建
    pub async fn open(filename: impl AsRef<Path>) -> Result<Self> {
        let filename = filename.as_ref();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let pool = init_db(filename).await?;
        Ok(Self { pool })
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(crud::count_images(&self.pool).await?)
    }
}

fn into_records(rows: Vec<ImageRow>) -> Result<Vec<ImageRecord>> {
    rows.into_iter().map(ImageRecord::try_from).collect()
}

fn ensure_updated(rows_affected: u64, id: i64) -> Result<()> {
    if rows_affected == 0 {
        anyhow::bail!("图片记录不存在: {}", id);
    }
    Ok(())
}

#[async_trait]
impl RecordStore for MoodDB {
    async fn find_by_url(&self, image_url: &str) -> Result<Option<ImageRecord>> {
        crud::find_image_by_url(&self.pool, image_url)
            .await?
            .map(ImageRecord::try_from)
            .transpose()
    }

    async fn insert(&self, image_url: &str) -> Result<Option<i64>> {
        Ok(crud::add_image(&self.pool, image_url).await?)
    }

    async fn update_mood(&self, id: i64, mood: &str) -> Result<()> {
        ensure_updated(crud::set_mood(&self.pool, id, mood).await?, id)
    }

    async fn update_embedding(&self, id: i64, embedding: &[f32]) -> Result<()> {
        ensure_updated(crud::set_embedding(&self.pool, id, embedding).await?, id)
    }

    async fn update_coordinates(&self, id: i64, x: f64, y: f64, status: CoordinateStatus) -> Result<()> {
        ensure_updated(crud::set_coordinates(&self.pool, id, x, y, status).await?, id)
    }

    async fn missing_embedding(&self) -> Result<Vec<ImageRecord>> {
        into_records(crud::get_images_without_embedding(&self.pool).await?)
    }

    async fn missing_coordinates(&self) -> Result<Vec<ImageRecord>> {
        into_records(crud::get_images_without_coordinates(&self.pool).await?)
    }

    async fn search_mood(&self, query: &str, limit: usize) -> Result<Vec<ImageRecord>> {
        // SQLite 的 lower() 只处理 ASCII，在这里做 Unicode 大小写折叠
        let query = query.to_lowercase();
        let records = into_records(crud::get_images_with_mood(&self.pool).await?)?;
        Ok(records
            .into_iter()
            .filter(|r| r.mood.as_deref().is_some_and(|mood| mood.to_lowercase().contains(&query)))
            .take(limit)
            .collect())
    }

    async fn nearest(&self, embedding: &[f32], limit: usize) -> Result<Vec<(f32, ImageRecord)>> {
        let records = into_records(crud::get_images_with_embedding(&self.pool).await?)?;
        let skipped = records
            .iter()
            .filter(|r| r.mood_embedding.as_ref().is_some_and(|v| v.len() != embedding.len()))
            .count();
        if skipped > 0 {
            warn!("跳过 {} 条维度不一致的嵌入向量（查询维度 {}）", skipped, embedding.len());
        }
        Ok(nearest(embedding, records, limit, |r| r.mood_embedding.as_deref()))
    }

    async fn mapped(&self) -> Result<Vec<ImageRecord>> {
        into_records(crud::get_images_with_coordinates(&self.pool).await?)
    }

    async fn all(&self) -> Result<Vec<ImageRecord>> {
        into_records(crud::get_images(&self.pool).await?)
    }
}
