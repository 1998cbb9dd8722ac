use std::sync::LazyLock;

use prometheus::*;

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "mood_search_count",
        "count of the mood search requests",
        &["strategy", "outcome"]
    )
    .unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "mood_search_duration",
        "duration of the mood search in seconds",
        &["strategy"]
    )
    .unwrap()
});

static METRIC_SEARCH_RESULTS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "mood_search_results",
        "number of images returned by the mood search",
        &["strategy"],
        vec![0., 1., 2., 5., 10., 20., 50.]
    )
    .unwrap()
});

static METRIC_SYNC_ITEMS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "mood_sync_items",
        "count of the items handled by the sync jobs",
        &["job", "outcome"]
    )
    .unwrap()
});

/// 记录一次搜索
///
/// outcome 取值为 found / not_found / error
pub fn inc_search(strategy: &str, outcome: &str) {
    METRIC_SEARCH_COUNT.with_label_values(&[strategy, outcome]).inc();
}

pub fn observe_search(strategy: &str, duration: f32, results: usize) {
    METRIC_SEARCH_DURATION.with_label_values(&[strategy]).observe(duration as f64);
    METRIC_SEARCH_RESULTS.with_label_values(&[strategy]).observe(results as f64);
}

/// 记录同步任务处理的一项
pub fn inc_sync_item(job: &str, outcome: &str) {
    METRIC_SYNC_ITEMS.with_label_values(&[job, outcome]).inc();
}

#[cfg(test)]
pub fn sync_item_count(job: &str, outcome: &str) -> u64 {
    METRIC_SYNC_ITEMS.with_label_values(&[job, outcome]).get()
}

/// 以文本格式导出所有指标
pub fn export() -> anyhow::Result<String> {
    let metric_families = prometheus::gather();
    Ok(TextEncoder::new().encode_to_string(&metric_families)?)
}
