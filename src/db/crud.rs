use sqlx::{Result, SqlitePool};

use super::model::{CoordinateStatus, ImageRow, encode_embedding};

const SELECT_IMAGE: &str = "SELECT id, image_url, mood, mood_embedding, x, y, coords_status FROM images";

/// 根据 URL 查找图片记录
pub(crate) async fn find_image_by_url(executor: &SqlitePool, image_url: &str) -> Result<Option<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!("{SELECT_IMAGE} WHERE image_url = ?"))
        .bind(image_url)
        .fetch_optional(executor)
        .await
}

/// 添加图片记录，所有派生字段为空
///
/// 如果 URL 已存在则什么也不做，返回 None
pub(crate) async fn add_image(executor: &SqlitePool, image_url: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO images (image_url)
        VALUES (?)
        ON CONFLICT (image_url) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(image_url)
    .fetch_optional(executor)
    .await?;

    Ok(id)
}

pub(crate) async fn set_mood(executor: &SqlitePool, id: i64, mood: &str) -> Result<u64> {
    let result = sqlx::query("UPDATE images SET mood = ? WHERE id = ?")
        .bind(mood)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn set_embedding(executor: &SqlitePool, id: i64, embedding: &[f32]) -> Result<u64> {
    let result = sqlx::query("UPDATE images SET mood_embedding = ? WHERE id = ?")
        .bind(encode_embedding(embedding))
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn set_coordinates(
    executor: &SqlitePool,
    id: i64,
    x: f64,
    y: f64,
    status: CoordinateStatus,
) -> Result<u64> {
    let result = sqlx::query("UPDATE images SET x = ?, y = ?, coords_status = ? WHERE id = ?")
        .bind(x)
        .bind(y)
        .bind(status.as_str())
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// 获取有情绪标签但没有嵌入向量的图片
pub(crate) async fn get_images_without_embedding(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!(
        "{SELECT_IMAGE} WHERE mood_embedding IS NULL AND mood IS NOT NULL ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}

/// 获取有情绪标签但没有坐标的图片
pub(crate) async fn get_images_without_coordinates(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!(
        "{SELECT_IMAGE} WHERE x IS NULL AND mood IS NOT NULL ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}

/// 获取所有带嵌入向量的图片
pub(crate) async fn get_images_with_embedding(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!("{SELECT_IMAGE} WHERE mood_embedding IS NOT NULL ORDER BY id"))
        .fetch_all(executor)
        .await
}

/// 获取所有带坐标的图片
pub(crate) async fn get_images_with_coordinates(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!(
        "{SELECT_IMAGE} WHERE x IS NOT NULL AND y IS NOT NULL ORDER BY id"
    ))
    .fetch_all(executor)
    .await
}

/// 获取所有带情绪标签的图片
pub(crate) async fn get_images_with_mood(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!("{SELECT_IMAGE} WHERE mood IS NOT NULL ORDER BY id"))
        .fetch_all(executor)
        .await
}

pub(crate) async fn get_images(executor: &SqlitePool) -> Result<Vec<ImageRow>> {
    sqlx::query_as::<_, ImageRow>(&format!("{SELECT_IMAGE} ORDER BY id"))
        .fetch_all(executor)
        .await
}

/// 查询数据库中的图片数量
pub(crate) async fn count_images(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
        .fetch_one(executor)
        .await
}
