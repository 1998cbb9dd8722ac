use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};

use super::SyncReport;
use crate::llm::MoodLabeler;
use crate::metrics;
use crate::storage::{ObjectSource, list_all};
use crate::store::RecordStore;

const JOB: &str = "reconcile";

enum Outcome {
    Skipped,
    Inserted,
    Labeled,
    InsertedAndLabeled,
    /// 记录已插入，但情绪标注失败
    InsertedUnlabeled(anyhow::Error),
}

/// 将存储桶中的对象同步到图片表
///
/// 对每个对象：
/// - 表中没有对应 URL 的记录时插入一条新记录
/// - 提供了 `labeler` 时，为没有情绪标签的记录调用视觉模型并写入标签
/// - 其余情况跳过
///
/// 列出存储桶失败会直接返回错误，单个对象的失败只会被记录
pub async fn reconcile(
    store: &dyn RecordStore,
    source: &dyn ObjectSource,
    labeler: Option<&dyn MoodLabeler>,
    page_size: usize,
    pb: &ProgressBar,
) -> Result<SyncReport> {
    info!("正在列出存储桶 \"{}\" 中的文件", source.bucket());
    let names = list_all(source, page_size)
        .await
        .with_context(|| format!("无法列出存储桶 \"{}\"", source.bucket()))?;
    info!("在存储桶 \"{}\" 中找到 {} 个文件", source.bucket(), names.len());

    let mut report = SyncReport::default();
    let mut seen = HashSet::new();
    pb.set_length(names.len() as u64);

    for name in &names {
        pb.inc(1);
        report.total += 1;

        let url = match source.public_url(name) {
            Ok(url) => url,
            Err(e) => {
                error!("无法获取 {} 的公开 URL: {:#}", name, e);
                report.failed += 1;
                metrics::inc_sync_item(JOB, "failed");
                continue;
            }
        };
        if !seen.insert(url.clone()) {
            debug!("重复的对象: {}", url);
            report.skipped += 1;
            metrics::inc_sync_item(JOB, "skipped");
            continue;
        }

        pb.set_message(name.clone());
        match reconcile_object(store, labeler, &url).await {
            Ok(Outcome::Skipped) => {
                debug!("{} 已存在，跳过", url);
                report.skipped += 1;
                metrics::inc_sync_item(JOB, "skipped");
            }
            Ok(Outcome::Inserted) => {
                info!("已插入记录: {}", url);
                report.inserted += 1;
                metrics::inc_sync_item(JOB, "inserted");
            }
            Ok(Outcome::Labeled) => {
                report.updated += 1;
                metrics::inc_sync_item(JOB, "updated");
            }
            Ok(Outcome::InsertedAndLabeled) => {
                report.inserted += 1;
                report.updated += 1;
                metrics::inc_sync_item(JOB, "inserted");
                metrics::inc_sync_item(JOB, "updated");
            }
            Ok(Outcome::InsertedUnlabeled(e)) => {
                error!("已插入记录 {}，但情绪标注失败: {:#}", url, e);
                report.inserted += 1;
                report.failed += 1;
                metrics::inc_sync_item(JOB, "failed");
            }
            Err(e) => {
                error!("处理 {} 失败: {:#}", url, e);
                report.failed += 1;
                metrics::inc_sync_item(JOB, "failed");
            }
        }
    }

    pb.finish_and_clear();
    info!("同步完成，{}", report);
    Ok(report)
}

async fn reconcile_object(
    store: &dyn RecordStore,
    labeler: Option<&dyn MoodLabeler>,
    url: &str,
) -> Result<Outcome> {
    let (id, inserted) = match store.find_by_url(url).await.context("查询记录失败")? {
        Some(record) if record.has_mood() || labeler.is_none() => return Ok(Outcome::Skipped),
        Some(record) => (record.id, false),
        None => match store.insert(url).await.context("插入记录失败")? {
            Some(id) => (id, true),
            None => {
                warn!("{} 已被其他进程插入", url);
                return Ok(Outcome::Skipped);
            }
        },
    };

    let Some(labeler) = labeler else {
        return Ok(Outcome::Inserted);
    };

    match label_record(store, labeler, id, url).await {
        Ok(()) if inserted => Ok(Outcome::InsertedAndLabeled),
        Ok(()) => Ok(Outcome::Labeled),
        Err(e) if inserted => Ok(Outcome::InsertedUnlabeled(e)),
        Err(e) => Err(e),
    }
}

async fn label_record(store: &dyn RecordStore, labeler: &dyn MoodLabeler, id: i64, url: &str) -> Result<()> {
    let mood = labeler.label_image(url).await.context("情绪标注失败")?;
    let mood = mood.trim();
    if mood.is_empty() {
        bail!("视觉模型返回了空的情绪标签");
    }
    store.update_mood(id, mood).await.context("写入情绪标签失败")?;
    info!("{} 的情绪标签: \"{}\"", url, mood);
    Ok(())
}
