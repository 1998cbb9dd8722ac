use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::{CoordinateStatus, ImageRecord};

/// 情绪地图画布的边长，单位为像素
pub const CANVAS_SIZE: f64 = 800.0;

/// 效价-唤醒度坐标，两个分量的范围都是 [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    fn is_valid(&self) -> bool {
        [self.x, self.y].iter().all(|v| v.is_finite() && (-1.0..=1.0).contains(v))
    }
}

/// 解析模型返回的坐标 JSON
///
/// 允许 JSON 前后带有说明文字或 Markdown 代码块，坐标必须在 [-1, 1] 范围内
pub fn parse_coordinates(content: &str) -> Option<Coordinates> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    let coords = serde_json::from_str::<Coordinates>(&content[start..=end]).ok()?;
    coords.is_valid().then_some(coords)
}

/// 解析坐标，失败时回退到原点并标记为 [`CoordinateStatus::Fallback`]
pub fn resolve_coordinates(content: &str) -> (Coordinates, CoordinateStatus) {
    match parse_coordinates(content) {
        Some(coords) => (coords, CoordinateStatus::Parsed),
        None => (Coordinates::ORIGIN, CoordinateStatus::Fallback),
    }
}

/// 将 x 从 [-1, 1] 映射到 [0, 800]
pub fn map_x(x: f64) -> f64 {
    (x + 1.0) * CANVAS_SIZE / 2.0
}

/// 将 y 从 [-1, 1] 映射到 [800, 0]，+1 位于顶部
pub fn map_y(y: f64) -> f64 {
    CANVAS_SIZE - (y + 1.0) * CANVAS_SIZE / 2.0
}

/// 情绪地图上的一张图片
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapPoint {
    pub id: i64,
    pub image_url: String,
    pub x: f64,
    pub y: f64,
    /// 画布上的横坐标（像素）
    pub left: f64,
    /// 画布上的纵坐标（像素）
    pub top: f64,
    pub coords_status: Option<CoordinateStatus>,
}

impl MapPoint {
    pub fn from_record(record: &ImageRecord) -> Option<Self> {
        let (x, y) = record.coordinates()?;
        Some(Self {
            id: record.id,
            image_url: record.image_url.clone(),
            x,
            y,
            left: map_x(x),
            top: map_y(y),
            coords_status: record.coords_status,
        })
    }
}
