use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 图片记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// 图片 ID
    pub id: i64,
    /// 图片公开 URL，同时也是存储桶与数据表之间的关联键
    pub image_url: String,
    /// 情绪标签
    pub mood: Option<String>,
    /// 情绪标签的嵌入向量
    #[serde(skip)]
    pub mood_embedding: Option<Vec<f32>>,
    /// 效价坐标，范围 [-1, 1]
    pub x: Option<f64>,
    /// 唤醒度坐标，范围 [-1, 1]
    pub y: Option<f64>,
    /// 坐标来源
    pub coords_status: Option<CoordinateStatus>,
}

impl ImageRecord {
    pub fn has_mood(&self) -> bool {
        self.mood.as_deref().is_some_and(|mood| !mood.is_empty())
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }
}

/// 坐标的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateStatus {
    /// 从模型返回中成功解析
    Parsed,
    /// 模型返回无法解析，使用 (0, 0) 代替
    Fallback,
}

impl CoordinateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for CoordinateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parsed" => Ok(Self::Parsed),
            "fallback" => Ok(Self::Fallback),
            _ => Err(anyhow::anyhow!("无效的坐标状态: {}", s)),
        }
    }
}

/// 数据库中的原始行
#[derive(sqlx::FromRow)]
pub(crate) struct ImageRow {
    pub id: i64,
    pub image_url: String,
    pub mood: Option<String>,
    pub mood_embedding: Option<Vec<u8>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub coords_status: Option<String>,
}

impl TryFrom<ImageRow> for ImageRecord {
    type Error = anyhow::Error;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let mood_embedding = row.mood_embedding.as_deref().map(decode_embedding).transpose()?;
        let coords_status = row.coords_status.as_deref().map(str::parse).transpose()?;
        Ok(Self {
            id: row.id,
            image_url: row.image_url,
            mood: row.mood,
            mood_embedding,
            x: row.x,
            y: row.y,
            coords_status,
        })
    }
}

/// 将嵌入向量编码为本机字节序的 f32 字节
///
/// 数据库文件不能在字节序不同的机器之间共享
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice::<f32, u8>(embedding).to_vec()
}

/// 从本机字节序的 f32 字节解码嵌入向量
pub fn decode_embedding(bytes: &[u8]) -> anyhow::Result<Vec<f32>> {
    if bytes.len() % size_of::<f32>() != 0 {
        anyhow::bail!("嵌入向量长度无效: {} 字节", bytes.len());
    }
    Ok(bytemuck::pod_collect_to_vec::<u8, f32>(bytes))
}
