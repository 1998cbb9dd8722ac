use anyhow::{Result, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::Url;

mod local;
mod supabase;

pub use local::LocalStorage;
pub use supabase::SupabaseStorage;

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// 列表中的一项，目录和占位文件的 `is_file` 为 false
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub name: String,
    pub is_file: bool,
}

impl ObjectEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_file: true }
    }
}

/// 对象存储中的图片来源
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// 存储桶名称
    fn bucket(&self) -> &str;

    /// 分页列出对象，偏移量按原始条目计算（包括目录）
    async fn list(&self, limit: usize, offset: usize) -> Result<Vec<ObjectEntry>>;

    /// 获取对象的公开 URL
    fn public_url(&self, name: &str) -> Result<String>;
}

/// 逐页列出所有文件名，直到某一页不满为止
pub async fn list_all(source: &dyn ObjectSource, page_size: usize) -> Result<Vec<String>> {
    if page_size == 0 {
        bail!("分页大小必须大于 0");
    }
    let mut names = vec![];
    let mut offset = 0;
    loop {
        let page = source.list(page_size, offset).await?;
        debug!("列出 {} 个对象（偏移 {}）", page.len(), offset);
        offset += page.len();
        let done = page.len() < page_size;
        names.extend(page.into_iter().filter(|entry| entry.is_file).map(|entry| entry.name));
        if done {
            break;
        }
    }
    Ok(names)
}

/// 在 base 之后追加路径段，每一段都会被百分号编码
pub(crate) fn join_url<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let mut url = base.clone();
    {
        let Ok(mut path) = url.path_segments_mut() else {
            bail!("无效的基础 URL: {}", base);
        };
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}
