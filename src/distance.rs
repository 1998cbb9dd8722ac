#[inline(always)]
pub fn dot(va: &[f32], vb: &[f32]) -> f32 {
    va.iter().zip(vb).map(|(a, b)| a * b).sum()
}

/// 计算向量 va 和 vb 的余弦距离 `1 - cos(va, vb)`，范围 [0, 2]
///
/// 维度不一致时返回 None，零向量视为与任何向量正交
pub fn cosine_distance(va: &[f32], vb: &[f32]) -> Option<f32> {
    if va.len() != vb.len() {
        return None;
    }
    let norm = (dot(va, va) * dot(vb, vb)).sqrt();
    if norm == 0.0 {
        return Some(1.0);
    }
    Some(1.0 - dot(va, vb) / norm)
}

/// 在 items 中寻找与 query 余弦距离最小的 k 个元素，按距离升序返回
///
/// 参数：
/// - query: 查询向量
/// - items: 候选元素
/// - k: 返回的最近邻居数量
/// - vector: 取出元素的向量，返回 None 或维度不一致的元素会被忽略
pub fn nearest<T, F>(query: &[f32], items: Vec<T>, k: usize, vector: F) -> Vec<(f32, T)>
where
    F: Fn(&T) -> Option<&[f32]>,
{
    let mut scored = items
        .into_iter()
        .filter_map(|item| {
            let d = cosine_distance(query, vector(&item)?)?;
            Some((d, item))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let d = cosine_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let d = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine_distance(&[1.0, 0.0], &[1.0]), None);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), Some(1.0));
    }

    #[test]
    fn test_nearest_order() {
        let items = vec![
            ("far", vec![-1.0, 0.0]),
            ("near", vec![1.0, 0.1]),
            ("exact", vec![2.0, 0.0]),
            ("none", vec![]),
        ];
        let result = nearest(&[1.0, 0.0], items, 2, |(_, v)| Some(v.as_slice()));
        let names = result.iter().map(|(_, (name, _))| *name).collect::<Vec<_>>();
        // 空向量维度不一致，被忽略
        assert_eq!(names, vec!["exact", "near"]);
        assert!(result[0].0 <= result[1].0);
    }
}
