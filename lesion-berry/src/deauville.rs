//! 肝脏 / 主动脉参考摄取, 以及类 Deauville 评分.
//!
//! 每个受试者只有 SUV 95 分位数最高的一个病灶获得评分, 其余为空.
//! 评分只在中期或随访扫描中有临床意义, 本模块不做该项检查.

use crate::catalog::Catalog;
use crate::consts::{organ, DEAUVILLE_LIVER_FACTOR, SUV_PERCENTILE};
use crate::{stats, AnatomyVolume, PetVolume};

/// 受试者级别的参考摄取值. 缺少对应标签或 PET 时为 `0.0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ReferenceUptake {
    /// 肝脏内 PET 的 95 分位数.
    pub liver_p95: f64,

    /// 主动脉内 PET 的 95 分位数.
    pub aorta_p95: f64,
}

impl ReferenceUptake {
    /// 在整个解剖标签图上计算肝脏和主动脉的参考摄取.
    pub fn measure(anatomy: Option<&AnatomyVolume>, pet: Option<&PetVolume>, catalog: &Catalog) -> Self {
        let (anatomy, pet) = match (anatomy, pet) {
            (Some(a), Some(p)) => (a, p),
            _ => return Self::default(),
        };
        let p95_of = |name: &str| {
            catalog
                .code_of(name)
                .and_then(|code| {
                    let values: Vec<f64> = anatomy
                        .data()
                        .iter()
                        .zip(pet.data().iter())
                        .filter_map(|(&c, &v)| (c == code).then_some(f64::from(v)))
                        .collect();
                    stats::percentile(&values, SUV_PERCENTILE)
                })
                .unwrap_or(0.0)
        };
        Self {
            liver_p95: p95_of(organ::LIVER),
            aorta_p95: p95_of(organ::AORTA),
        }
    }

    /// 两个参考值是否都可用 (大于 0).
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.liver_p95 > 0.0 && self.aorta_p95 > 0.0
    }

    /// 按参考值给出评分:
    ///
    /// * `<= 主动脉` -> 2
    /// * `<= 肝脏` -> 3
    /// * `<= 1.5 x 肝脏` -> 4
    /// * 其他 -> 5
    pub fn score(&self, suv_p95: f64) -> u8 {
        if suv_p95 <= self.aorta_p95 {
            2
        } else if suv_p95 <= self.liver_p95 {
            3
        } else if suv_p95 <= DEAUVILLE_LIVER_FACTOR * self.liver_p95 {
            4
        } else {
            5
        }
    }
}

/// 为每个病灶分配评分, 返回值与 `lesion_p95` 一一对应.
///
/// 只有 SUV 95 分位数最大的病灶 (相等时取最靠前者) 获得评分. 没有 PET 或
/// 参考值不可用时全部为 `None`.
pub fn assign_scores(lesion_p95: &[f64], reference: &ReferenceUptake, has_pet: bool) -> Vec<Option<u8>> {
    let mut scores = vec![None; lesion_p95.len()];
    if !has_pet || !reference.is_usable() {
        return scores;
    }
    let best = lesion_p95
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |best, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        });
    if let Some((i, v)) = best {
        scores[i] = Some(reference.score(v));
    }
    scores
}
