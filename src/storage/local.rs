use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use tokio::sync::OnceCell;
use tokio::task::spawn_blocking;
use walkdir::WalkDir;

use super::{ObjectEntry, ObjectSource, join_url};

/// 本地目录中的图片，通过一个静态文件服务器对外公开
pub struct LocalStorage {
    root: PathBuf,
    base: Url,
    bucket: String,
    re_suf: Regex,
    /// 第一次列出时扫描一次目录，之后的分页都使用这份快照
    names: OnceCell<Vec<String>>,
}

impl LocalStorage {
    /// 参数：
    /// - root: 图片所在目录
    /// - base_url: 目录对外公开的 URL
    /// - suffix: 扫描的文件后缀名，多个后缀用逗号分隔
    pub fn new(root: impl Into<PathBuf>, base_url: &str, suffix: &str) -> Result<Self> {
        let root = root.into();
        let base = Url::parse(base_url).with_context(|| format!("无效的公开 URL: {base_url}"))?;
        let re_suf = Regex::new(&format!("^(?i)({})$", suffix.replace(',', "|")))?;
        let bucket = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        Ok(Self { root, base, bucket, re_suf, names: OnceCell::new() })
    }

    /// 按相对路径排序的全部图片
    fn scan(root: PathBuf, re_suf: Regex) -> Result<Vec<String>> {
        let mut names = vec![];
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let matched = entry
                .path()
                .extension()
                .is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()));
            if !matched {
                continue;
            }
            let relative = entry.path().strip_prefix(&root)?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl ObjectSource for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<ObjectEntry>> {
        let names = self
            .names
            .get_or_try_init(|| {
                let root = self.root.clone();
                let re_suf = self.re_suf.clone();
                async move { spawn_blocking(move || Self::scan(root, re_suf)).await? }
            })
            .await?;
        Ok(names.iter().skip(offset).take(limit).map(ObjectEntry::file).collect())
    }

    fn public_url(&self, name: &str) -> Result<String> {
        Ok(join_url(&self.base, name.split('/'))?.to_string())
    }
}
