//! 基础统计量.

use ordered_float::OrderedFloat;

/// 计算 `values` 的第 `q` 百分位数 (`0 <= q <= 100`).
///
/// 采用顺序统计量之间的线性插值: 秩 `r = q / 100 * (n - 1)`, 结果为
/// `v[floor(r)]` 与 `v[ceil(r)]` 按小数部分加权. 非有限值 (NaN, inf) 被忽略.
/// 若没有可用的值则返回 `None`.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    assert!((0.0..=100.0).contains(&q));
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable_by_key(|v| OrderedFloat(*v));
    Some(percentile_of_sorted(&sorted, q))
}

/// 同 [`percentile`], 但 `sorted` 已按升序排列且非空.
pub fn percentile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 最大值. 非有限值被忽略.
pub fn max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .max_by_key(|v| OrderedFloat(*v))
}

/// 算术平均值. 非有限值被忽略.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0u64), |(s, c), v| (s + v, c + 1));
    (count != 0).then(|| sum / count as f64)
}

/// 四舍五入到两位小数. 报告中的百分比以此为准.
#[inline]
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
