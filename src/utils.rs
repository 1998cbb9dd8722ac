use indicatif::{ProgressBar, ProgressStyle};

const PB_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}";

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(PB_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// 批处理任务使用的进度条，长度由任务自己设置
pub fn progress_bar() -> ProgressBar {
    ProgressBar::no_length().with_style(pb_style())
}
