//! 存储桶与图片表之间的同步任务
//!
//! 所有任务都是逐条顺序处理的：一条记录的外部调用完成后才会处理下一条。
//! 单条记录的失败只会被记录下来，不会中断整个批次。

use std::fmt;

use serde::Serialize;

mod backfill;
mod reconcile;

pub use backfill::*;
pub use reconcile::*;

/// 一次同步任务的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// 处理的对象或记录数量
    pub total: usize,
    /// 新插入的记录
    pub inserted: usize,
    /// 写入了派生字段的记录
    pub updated: usize,
    /// 无需处理的记录
    pub skipped: usize,
    /// 处理失败的记录
    pub failed: usize,
    /// 坐标解析失败，回退到原点的记录
    pub fallback: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "共 {} 项：新增 {}，更新 {}，跳过 {}，失败 {}，坐标回退 {}",
            self.total, self.inserted, self.updated, self.skipped, self.failed, self.fallback
        )
    }
}
