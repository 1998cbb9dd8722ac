use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use log::{error, info, warn};

use super::SyncReport;
use crate::coords::resolve_coordinates;
use crate::db::{CoordinateStatus, ImageRecord};
use crate::llm::{CoordinateMapper, Embedder};
use crate::metrics;
use crate::store::RecordStore;

/// 为有情绪标签但没有嵌入向量的记录生成嵌入向量
///
/// 重复执行只会处理仍然缺少嵌入向量的记录
pub async fn backfill_embeddings(
    store: &dyn RecordStore,
    embedder: &dyn Embedder,
    pb: &ProgressBar,
) -> Result<SyncReport> {
    const JOB: &str = "embed";

    let records = store.missing_embedding().await.context("无法获取缺少嵌入向量的记录")?;
    if records.is_empty() {
        info!("没有需要生成嵌入向量的图片");
        return Ok(SyncReport::default());
    }
    info!("找到 {} 张需要生成嵌入向量的图片", records.len());

    let mut report = SyncReport::default();
    pb.set_length(records.len() as u64);
    for record in &records {
        pb.inc(1);
        report.total += 1;
        let Some(mood) = mood_of(record) else {
            report.skipped += 1;
            metrics::inc_sync_item(JOB, "skipped");
            continue;
        };
        pb.set_message(format!("#{}", record.id));
        match embed_record(store, embedder, record.id, mood).await {
            Ok(dim) => {
                info!("已更新图片 {} 的嵌入向量（{} 维）", record.id, dim);
                report.updated += 1;
                metrics::inc_sync_item(JOB, "updated");
            }
            Err(e) => {
                error!("为图片 {} 生成嵌入向量失败: {:#}", record.id, e);
                report.failed += 1;
                metrics::inc_sync_item(JOB, "failed");
            }
        }
    }

    pb.finish_and_clear();
    info!("嵌入向量生成完成，{}", report);
    Ok(report)
}

async fn embed_record(store: &dyn RecordStore, embedder: &dyn Embedder, id: i64, mood: &str) -> Result<usize> {
    let embedding = embedder.embed(mood).await?;
    if embedding.is_empty() {
        bail!("嵌入向量为空");
    }
    store.update_embedding(id, &embedding).await?;
    Ok(embedding.len())
}

/// 为有情绪标签但没有坐标的记录生成效价-唤醒度坐标
///
/// 模型返回无法解析时写入 (0, 0) 并标记为 [`CoordinateStatus::Fallback`]
pub async fn backfill_coordinates(
    store: &dyn RecordStore,
    mapper: &dyn CoordinateMapper,
    pb: &ProgressBar,
) -> Result<SyncReport> {
    const JOB: &str = "assign_xy";

    let records = store.missing_coordinates().await.context("无法获取缺少坐标的记录")?;
    if records.is_empty() {
        info!("没有需要分配坐标的图片");
        return Ok(SyncReport::default());
    }
    info!("找到 {} 张需要分配坐标的图片", records.len());

    let mut report = SyncReport::default();
    pb.set_length(records.len() as u64);
    for record in &records {
        pb.inc(1);
        report.total += 1;
        let Some(mood) = mood_of(record) else {
            report.skipped += 1;
            metrics::inc_sync_item(JOB, "skipped");
            continue;
        };
        pb.set_message(format!("#{}", record.id));
        match assign_record(store, mapper, record.id, mood).await {
            Ok(CoordinateStatus::Parsed) => {
                report.updated += 1;
                metrics::inc_sync_item(JOB, "updated");
            }
            Ok(CoordinateStatus::Fallback) => {
                report.updated += 1;
                report.fallback += 1;
                metrics::inc_sync_item(JOB, "fallback");
            }
            Err(e) => {
                error!("为图片 {} 分配坐标失败: {:#}", record.id, e);
                report.failed += 1;
                metrics::inc_sync_item(JOB, "failed");
            }
        }
    }

    pb.finish_and_clear();
    info!("坐标分配完成，{}", report);
    Ok(report)
}

async fn assign_record(
    store: &dyn RecordStore,
    mapper: &dyn CoordinateMapper,
    id: i64,
    mood: &str,
) -> Result<CoordinateStatus> {
    let content = mapper.map_mood(mood).await?;
    let (coords, status) = resolve_coordinates(&content);
    match status {
        CoordinateStatus::Parsed => info!("图片 {} (\"{}\") => x={}, y={}", id, mood, coords.x, coords.y),
        CoordinateStatus::Fallback => warn!("无法解析图片 {} 的坐标，回退到 (0, 0): {:?}", id, content),
    }
    store.update_coordinates(id, coords.x, coords.y, status).await?;
    Ok(status)
}

fn mood_of(record: &ImageRecord) -> Option<&str> {
    record.mood.as_deref().map(str::trim).filter(|mood| !mood.is_empty())
}
