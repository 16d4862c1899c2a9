//! 器官归属: 统计病灶体素落在各器官标签内的比例.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::consts::{ANATOMY_BACKGROUND, DOMINANT_ORGAN_PCT, NO_ORGAN};
use crate::stats::round2;
use crate::{AnatomyVolume, Idx3d};

/// 病灶与单个器官的重叠.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganOverlap {
    /// 解剖标签编码.
    pub code: i32,

    /// 器官名. 不在目录中的编码命名为 `unknown_{code}`.
    pub name: String,

    /// 重叠体素个数.
    pub voxels: usize,

    /// 占全部重叠体素的百分比 (未舍入).
    pub percent: f64,
}

/// 报告中的器官槽位 `(器官名, 百分比)`.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganSlot {
    /// 器官名, 缺省为 `"None"`.
    pub name: String,

    /// 百分比, 缺省为 `0.0`.
    pub percent: f64,
}

impl OrganSlot {
    /// 空槽位 `("None", 0.0)`.
    pub fn none() -> Self {
        Self {
            name: NO_ORGAN.to_string(),
            percent: 0.0,
        }
    }

    /// 是否为空槽位.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.name == NO_ORGAN
    }
}

impl From<&OrganOverlap> for OrganSlot {
    fn from(o: &OrganOverlap) -> Self {
        Self {
            name: o.name.clone(),
            percent: o.percent,
        }
    }
}

/// 单个病灶的器官归属结果.
///
/// 重叠按体素个数降序排列, 个数相同时按编码升序, 因此顺序是全序且确定的.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attribution {
    overlaps: Vec<OrganOverlap>,
}

impl Attribution {
    /// 统计 `voxels` 在解剖标签图中的器官分布. 背景 (0) 不计入.
    pub fn compute(voxels: &[Idx3d], anatomy: &AnatomyVolume, catalog: &Catalog) -> Self {
        let mut histogram = BTreeMap::<i32, usize>::new();
        for &pos in voxels {
            let code = anatomy[pos];
            if code != ANATOMY_BACKGROUND {
                *histogram.entry(code).or_default() += 1;
            }
        }
        Self::from_histogram(histogram, catalog)
    }

    /// 由 `编码 -> 体素个数` 直方图构造归属结果.
    pub fn from_histogram(histogram: BTreeMap<i32, usize>, catalog: &Catalog) -> Self {
        let total: usize = histogram.values().sum();
        let mut overlaps: Vec<OrganOverlap> = histogram
            .into_iter()
            .filter(|(_, n)| *n != 0)
            .map(|(code, voxels)| OrganOverlap {
                code,
                name: catalog.name_of(code).into_owned(),
                voxels,
                percent: voxels as f64 / total as f64 * 100.0,
            })
            .collect();
        // `BTreeMap` 已按编码升序, 稳定排序保留该次序.
        overlaps.sort_by(|a, b| b.voxels.cmp(&a.voxels));
        Self { overlaps }
    }

    /// 所有重叠, 已排序.
    #[inline]
    pub fn overlaps(&self) -> &[OrganOverlap] {
        &self.overlaps
    }

    /// 病灶是否与任何器官都不重叠.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overlaps.is_empty()
    }

    /// 报告中的前两个器官槽位.
    ///
    /// 没有重叠时两个槽位均为空; 第一器官占比舍入到两位小数后为 100% 时,
    /// 第二个槽位强制为空.
    pub fn top2(&self) -> [OrganSlot; 2] {
        let first = match self.overlaps.first() {
            Some(o) => o,
            None => return [OrganSlot::none(), OrganSlot::none()],
        };
        let second = match self.overlaps.get(1) {
            Some(o) if round2(first.percent) < 100.0 => OrganSlot::from(o),
            _ => OrganSlot::none(),
        };
        [OrganSlot::from(first), second]
    }

    /// 选定的主器官: 排名最靠前的非躯干器官; 若只有躯干则为躯干; 没有重叠时为 `None`.
    pub fn main_organ(&self) -> Option<&OrganOverlap> {
        self.overlaps
            .iter()
            .find(|o| !is_trunk_name(&o.name))
            .or_else(|| self.overlaps.first())
    }

    /// 排名第一的器官占比. 没有重叠时为 `None`.
    #[inline]
    pub fn dominant_share(&self) -> Option<f64> {
        self.overlaps.first().map(|o| o.percent)
    }

    /// 是否存在占比不低于 50% 的器官.
    #[inline]
    pub fn has_dominant_organ(&self) -> bool {
        self.dominant_share().is_some_and(|p| p >= DOMINANT_ORGAN_PCT)
    }
}

#[inline]
fn is_trunk_name(name: &str) -> bool {
    name == crate::consts::organ::TRUNK
}
