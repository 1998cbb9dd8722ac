use std::convert::Infallible;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;
use crate::db::MoodDB;
use crate::llm::openai::*;
use crate::search::SearchStrategy;
use crate::storage::{DEFAULT_PAGE_SIZE, LocalStorage, ObjectSource, SupabaseStorage};

static DEFAULT_CONF_DIR: LazyLock<String> = LazyLock::new(|| {
    ProjectDirs::from("", "moodsearch", "moodsearch")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".moodsearch"))
        .to_string_lossy()
        .into_owned()
});

#[derive(Parser, Debug, Clone)]
#[command(name = "moodsearch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// moodsearch 配置文件目录
    #[arg(short, long, default_value = DEFAULT_CONF_DIR.as_str())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 将存储桶中的图片同步到数据库，可选地标注情绪
    Reconcile(ReconcileCommand),
    /// 为有情绪标签的图片生成嵌入向量
    Embed(EmbedCommand),
    /// 为有情绪标签的图片分配效价-唤醒度坐标
    AssignXy(AssignXyCommand),
    /// 依次执行同步、标注、嵌入和坐标分配
    Sync(SyncCommand),
    /// 按情绪搜索图片
    Search(SearchCommand),
    /// 列出数据库中的图片
    Show(ShowCommand),
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("moodsearch.db")
    }

    /// 打开图片数据库
    pub async fn open_db(&self) -> Result<MoodDB> {
        MoodDB::open(self.database()).await
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

#[derive(Parser, Debug, Clone)]
pub struct OpenAiOptions {
    /// OpenAI API 密钥
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
    /// OpenAI 兼容 API 的地址
    #[arg(long, value_name = "URL", env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,
    /// 嵌入模型
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,
    /// 情绪标注使用的视觉模型
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_VISION_MODEL)]
    pub vision_model: String,
    /// 坐标映射使用的对话模型
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,
}

impl OpenAiOptions {
    /// 创建 API 客户端，缺少密钥时返回错误
    pub fn client(&self) -> Result<Arc<OpenAiClient>> {
        let api_key = self.openai_api_key.as_deref().filter(|key| !key.is_empty()).context("缺少 OPENAI_API_KEY")?;
        let config = OpenAiConfig {
            api_key: api_key.to_string(),
            base_url: self.openai_base_url.clone(),
            embedding_model: self.embedding_model.clone(),
            vision_model: self.vision_model.clone(),
            chat_model: self.chat_model.clone(),
        };
        Ok(Arc::new(OpenAiClient::new(config)))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct StorageOptions {
    /// Supabase 项目地址
    #[arg(long, value_name = "URL", env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,
    /// Supabase service key
    #[arg(long, value_name = "KEY", env = "SUPABASE_SERVICE_KEY", hide_env_values = true)]
    pub supabase_service_key: Option<String>,
    /// 存储桶名称
    #[arg(short, long, env = "SUPABASE_BUCKET", default_value = "Moods")]
    pub bucket: String,
    /// 使用本地目录代替 Supabase Storage
    #[arg(long, value_name = "DIR", requires = "public_url")]
    pub local_dir: Option<PathBuf>,
    /// 本地目录对外公开的 URL
    #[arg(long, value_name = "URL")]
    pub public_url: Option<String>,
    /// 本地目录扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp")]
    pub suffix: String,
    /// 列出存储桶时每页的文件数量
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

impl StorageOptions {
    /// 打开图片来源，缺少配置时返回错误
    pub fn open(&self) -> Result<Box<dyn ObjectSource>> {
        if let Some(dir) = &self.local_dir {
            let public_url = self.public_url.as_deref().context("使用本地目录时必须指定 --public-url")?;
            return Ok(Box::new(LocalStorage::new(dir, public_url, &self.suffix)?));
        }
        match (&self.supabase_url, &self.supabase_service_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Ok(Box::new(SupabaseStorage::new(url, key.clone(), self.bucket.clone())?))
            }
            _ => anyhow::bail!("缺少 SUPABASE_URL 或 SUPABASE_SERVICE_KEY"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 搜索策略
    #[arg(long, value_enum, default_value_t = SearchStrategy::Vector)]
    pub strategy: SearchStrategy,
    /// 返回的结果数量，为 1 时 HTTP 接口直接返回单个对象
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    pub count: usize,
}
