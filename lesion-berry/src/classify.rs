//! 解剖位置分类: 横膈上下, 左右侧, 以及躯干病灶的锁骨上下几何判断.
//!
//! 躯干 (`trunc`) 标签过于粗糙, 本身不携带左右侧和锁骨信息. 对主器官为躯干的病灶,
//! 借助头颈、双肺、锁骨和上臂的质心做判断:
//!
//! 1. 病灶质心在第 0 轴上严格位于头颈质心与双肺质心之间;
//! 2. 取欧氏距离最近的锁骨质心 (相等时取左侧), 病灶在第 0 轴上高于该锁骨则为锁骨上, 否则为锁骨下;
//! 3. 左右侧由最近的上臂质心决定, 覆盖目录中的左右侧.
//!
//! 任一条件不满足时, 退回目录中躯干的条目.

use std::collections::HashMap;

use crate::catalog::{Catalog, Diaphragm, Laterality};
use crate::consts::{organ, region, ANATOMY_BACKGROUND};
use crate::{AnatomyVolume, Idx3d, Point3d};

/// 计算体素集合在索引空间中的质心. 集合为空时返回 `None`.
pub fn centroid(voxels: &[Idx3d]) -> Option<Point3d> {
    if voxels.is_empty() {
        return None;
    }
    let mut acc = Accumulator::default();
    voxels.iter().for_each(|p| acc.push(*p));
    acc.centroid()
}

#[derive(Copy, Clone, Debug, Default)]
struct Accumulator {
    sum: [f64; 3],
    count: usize,
}

impl Accumulator {
    #[inline]
    fn push(&mut self, (z, h, w): Idx3d) {
        self.sum[0] += z as f64;
        self.sum[1] += h as f64;
        self.sum[2] += w as f64;
        self.count += 1;
    }

    #[inline]
    fn centroid(&self) -> Option<Point3d> {
        (self.count != 0).then(|| self.sum.map(|s| s / self.count as f64))
    }
}

#[inline]
fn distance2(a: &Point3d, b: &Point3d) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// 几何判断所需的解剖标志质心. 每个受试者计算一次.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Landmarks {
    /// 头颈区域.
    pub head: Option<Point3d>,

    /// 双肺.
    pub lungs: Option<Point3d>,

    /// 左锁骨.
    pub clavicle_left: Option<Point3d>,

    /// 右锁骨.
    pub clavicle_right: Option<Point3d>,

    /// 左上臂.
    pub arm_left: Option<Point3d>,

    /// 右上臂.
    pub arm_right: Option<Point3d>,
}

const HEAD: usize = 0;
const LUNGS: usize = 1;
const CLAVICLE_LEFT: usize = 2;
const CLAVICLE_RIGHT: usize = 3;
const ARM_LEFT: usize = 4;
const ARM_RIGHT: usize = 5;

impl Landmarks {
    /// 在解剖标签图上一次遍历计算所有标志质心. 目录中不存在的器官名被忽略.
    pub fn locate(anatomy: &AnatomyVolume, catalog: &Catalog) -> Self {
        let groups: [(usize, &[&str]); 6] = [
            (HEAD, &organ::HEAD),
            (LUNGS, &organ::LUNGS),
            (CLAVICLE_LEFT, &[organ::CLAVICLE_LEFT]),
            (CLAVICLE_RIGHT, &[organ::CLAVICLE_RIGHT]),
            (ARM_LEFT, &organ::ARM_LEFT),
            (ARM_RIGHT, &organ::ARM_RIGHT),
        ];
        let group_of: HashMap<i32, usize> = groups
            .iter()
            .flat_map(|(g, names)| names.iter().filter_map(move |n| Some((catalog.code_of(n)?, *g))))
            .collect();

        let mut acc = [Accumulator::default(); 6];
        for (pos, &code) in anatomy.data().indexed_iter() {
            if code == ANATOMY_BACKGROUND {
                continue;
            }
            if let Some(&g) = group_of.get(&code) {
                acc[g].push(pos);
            }
        }

        Self {
            head: acc[HEAD].centroid(),
            lungs: acc[LUNGS].centroid(),
            clavicle_left: acc[CLAVICLE_LEFT].centroid(),
            clavicle_right: acc[CLAVICLE_RIGHT].centroid(),
            arm_left: acc[ARM_LEFT].centroid(),
            arm_right: acc[ARM_RIGHT].centroid(),
        }
    }

    /// 对质心为 `lesion` 的病灶做锁骨上下几何判断. 条件不满足时返回 `None`.
    pub fn classify_clavicle(&self, lesion: &Point3d) -> Option<ClavicleFinding> {
        let (head, lungs) = (self.head?, self.lungs?);
        let (lo, hi) = if head[0] < lungs[0] { (head[0], lungs[0]) } else { (lungs[0], head[0]) };
        if !(lo < lesion[0] && lesion[0] < hi) {
            return None;
        }

        let clavicle = match (self.clavicle_left, self.clavicle_right) {
            (Some(l), Some(r)) => {
                if distance2(lesion, &l) <= distance2(lesion, &r) {
                    l
                } else {
                    r
                }
            }
            (Some(c), None) | (None, Some(c)) => c,
            (None, None) => return None,
        };
        let region = if lesion[0] > clavicle[0] {
            ClavicleRegion::Supraclavicular
        } else {
            ClavicleRegion::Infraclavicular
        };

        let laterality = match (self.arm_left, self.arm_right) {
            (Some(l), Some(r)) => {
                let (dl, dr) = (distance2(lesion, &l), distance2(lesion, &r));
                if dl < dr {
                    Some(Laterality::Left)
                } else if dr < dl {
                    Some(Laterality::Right)
                } else {
                    None
                }
            }
            _ => None,
        };

        Some(ClavicleFinding { region, laterality })
    }
}

/// 锁骨上下区域.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClavicleRegion {
    /// 锁骨上.
    Supraclavicular,

    /// 锁骨下.
    Infraclavicular,
}

impl ClavicleRegion {
    /// 淋巴结区域名.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ClavicleRegion::Supraclavicular => region::SUPRACLAVICULAR,
            ClavicleRegion::Infraclavicular => region::INFRACLAVICULAR,
        }
    }
}

/// 锁骨几何判断的结果.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClavicleFinding {
    /// 锁骨上或锁骨下.
    pub region: ClavicleRegion,

    /// 由最近上臂决定的左右侧. 上臂缺失或等距时为 `None`.
    pub laterality: Option<Laterality>,
}

/// 病灶的解剖位置.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// 相对横膈的位置.
    pub above_diaphragm: Diaphragm,

    /// 左右侧.
    pub laterality: Laterality,
}

impl Position {
    /// 无法确定的位置.
    pub const UNKNOWN: Position = Position {
        above_diaphragm: Diaphragm::Indeterminate,
        laterality: Laterality::NotApplicable,
    };
}

/// 按顺序的判断规则确定病灶位置.
///
/// 1. 没有主器官 -> 未知;
/// 2. 主器官不是躯干 -> 目录条目 (不在目录中的编码视为未知);
/// 3. 主器官为躯干且锁骨判断成立 -> 横膈上, 左右侧取上臂判断结果, 无结果时取目录值;
/// 4. 否则 -> 躯干的目录条目.
///
/// `clavicle` 为该病灶的锁骨判断结果, 由调用者惰性计算, 仅在第 3 步求值.
pub fn classify<F>(main_code: Option<i32>, catalog: &Catalog, clavicle: F) -> Position
where
    F: FnOnce() -> Option<ClavicleFinding>,
{
    let entry = match main_code.and_then(|c| catalog.get(c)) {
        Some(e) => e,
        None => return Position::UNKNOWN,
    };
    let from_catalog = Position {
        above_diaphragm: entry.above_diaphragm,
        laterality: entry.laterality,
    };
    if !entry.is_trunk() {
        return from_catalog;
    }

    match clavicle() {
        Some(finding) => Position {
            above_diaphragm: Diaphragm::Above,
            laterality: finding.laterality.unwrap_or(entry.laterality),
        },
        None => from_catalog,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array3};

    /// 构造一个 `(20, 9, 9)` 的解剖图. 头颈在顶部, 肺在下部, 锁骨在两者之间.
    /// 左侧结构位于 `w` 较小的一侧.
    fn phantom() -> AnatomyVolume {
        let c = Catalog::builtin();
        let code = |n: &str| c.code_of(n).unwrap();
        let mut data = Array3::<i32>::zeros((20, 9, 9));
        data.slice_mut(s![18..20, 3..6, 3..6]).fill(code("head_neck"));
        data.slice_mut(s![2..6, 2..7, 0..2]).fill(code("lung_left"));
        data.slice_mut(s![2..6, 2..7, 7..9]).fill(code("lung_right"));
        data.slice_mut(s![12..13, 4..5, 1..3]).fill(code("clavicula_left"));
        data.slice_mut(s![12..13, 4..5, 6..8]).fill(code("clavicula_right"));
        data.slice_mut(s![10..12, 0..1, 0..1]).fill(code("arm_left"));
        data.slice_mut(s![10..12, 0..1, 8..9]).fill(code("arm_right"));
        AnatomyVolume::fake(data, [1.0; 3])
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        assert_eq!(centroid(&[(0, 0, 0), (2, 4, 6)]), Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_locate_landmarks() {
        let lm = Landmarks::locate(&phantom(), Catalog::builtin());
        assert_eq!(lm.head, Some([18.5, 4.0, 4.0]));
        assert_eq!(lm.lungs.unwrap()[0], 3.5);
        assert_eq!(lm.clavicle_left, Some([12.0, 4.0, 1.5]));
        assert_eq!(lm.arm_right, Some([10.5, 0.0, 8.0]));
    }

    #[test]
    fn test_supraclavicular_near_right_clavicle_left_arm() {
        // 质心靠近右锁骨, 但离左上臂更近: 区域与左右侧独立判断.
        let lm = Landmarks {
            arm_left: Some([14.0, 4.0, 6.0]),
            ..Landmarks::locate(&phantom(), Catalog::builtin())
        };
        let finding = lm.classify_clavicle(&[14.0, 4.0, 7.0]).unwrap();
        assert_eq!(finding.region, ClavicleRegion::Supraclavicular);
        assert_eq!(finding.laterality, Some(Laterality::Left));
    }

    #[test]
    fn test_infraclavicular_and_outside() {
        let lm = Landmarks::locate(&phantom(), Catalog::builtin());
        let finding = lm.classify_clavicle(&[8.0, 4.0, 1.0]).unwrap();
        assert_eq!(finding.region, ClavicleRegion::Infraclavicular);
        assert_eq!(finding.laterality, Some(Laterality::Left));

        // 在头颈之上, 或在肺之下.
        assert_eq!(lm.classify_clavicle(&[19.0, 4.0, 4.0]), None);
        assert_eq!(lm.classify_clavicle(&[1.0, 4.0, 4.0]), None);
        // 与肺质心同高时不算 "严格之间".
        assert_eq!(lm.classify_clavicle(&[3.5, 4.0, 4.0]), None);
    }

    #[test]
    fn test_missing_landmarks() {
        let lm = Landmarks {
            clavicle_left: None,
            clavicle_right: None,
            ..Landmarks::locate(&phantom(), Catalog::builtin())
        };
        assert_eq!(lm.classify_clavicle(&[14.0, 4.0, 4.0]), None);

        let no_arms = Landmarks {
            arm_left: None,
            ..Landmarks::locate(&phantom(), Catalog::builtin())
        };
        let finding = no_arms.classify_clavicle(&[14.0, 4.0, 4.0]).unwrap();
        assert_eq!(finding.laterality, None);
    }

    #[test]
    fn test_classify_guards() {
        let c = Catalog::builtin();
        let supra = || {
            Some(ClavicleFinding {
                region: ClavicleRegion::Supraclavicular,
                laterality: Some(Laterality::Right),
            })
        };

        assert_eq!(classify(None, c, supra), Position::UNKNOWN);
        assert_eq!(classify(Some(999), c, supra), Position::UNKNOWN);

        let liver = classify(c.code_of("liver"), c, || panic!("not evaluated for organs"));
        assert_eq!(liver.above_diaphragm, Diaphragm::Below);
        assert_eq!(liver.laterality, Laterality::NotApplicable);

        let trunk = c.code_of("trunc");
        let p = classify(trunk, c, supra);
        assert_eq!(p.above_diaphragm, Diaphragm::Above);
        assert_eq!(p.laterality, Laterality::Right);

        let p = classify(trunk, c, || None);
        assert_eq!(p.above_diaphragm, Diaphragm::Indeterminate);
        assert_eq!(p.laterality, Laterality::NotApplicable);
    }
}
