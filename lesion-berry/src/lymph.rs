//! 淋巴结区域映射.

use std::collections::BTreeSet;

use crate::attribution::Attribution;
use crate::catalog::{Catalog, Laterality};
use crate::classify::ClavicleFinding;
use crate::consts::UNKNOWN_REGION;

/// 所有重叠器官相关淋巴结区域的并集. 有序.
pub fn candidate_regions<'c>(attribution: &Attribution, catalog: &'c Catalog) -> BTreeSet<&'c str> {
    attribution
        .overlaps()
        .iter()
        .filter_map(|o| catalog.get(o.code))
        .flat_map(|e| e.lymph_nodes.iter().map(String::as_str))
        .collect()
}

/// 组合左右侧与区域名. 左右侧未确定时返回裸区域名.
pub fn compound(laterality: Laterality, region: &str) -> String {
    if laterality.is_resolved() {
        format!("{laterality}-{region}")
    } else {
        region.to_string()
    }
}

/// 确定病灶所属的淋巴结区域.
///
/// 1. 候选并集为空 -> `unknown`;
/// 2. 只有一个候选 -> 该区域;
/// 3. 多个候选时做锁骨几何判断, 结果区域在候选中 -> `{左右侧}-{区域}` 或裸区域名.
///    左右侧优先取几何判断结果, 否则取 `laterality`;
/// 4. 主器官只对应一个区域 -> 该区域;
/// 5. 否则 -> `unknown`.
///
/// `clavicle` 仅在第 3 步求值.
pub fn map_region<F>(
    attribution: &Attribution,
    catalog: &Catalog,
    laterality: Laterality,
    clavicle: F,
) -> String
where
    F: FnOnce() -> Option<ClavicleFinding>,
{
    let candidates = candidate_regions(attribution, catalog);
    let mut it = candidates.iter();
    match (it.next(), it.next()) {
        (None, _) => return UNKNOWN_REGION.to_string(),
        (Some(only), None) => return only.to_string(),
        _ => {}
    }

    if let Some(finding) = clavicle() {
        let region = finding.region.as_str();
        if candidates.contains(region) {
            return compound(finding.laterality.unwrap_or(laterality), region);
        }
    }

    attribution
        .main_organ()
        .and_then(|o| catalog.get(o.code))
        .filter(|e| e.lymph_nodes.len() == 1)
        .and_then(|e| e.lymph_nodes.first())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClavicleRegion;

    fn attribution(pairs: &[(i32, usize)]) -> Attribution {
        Attribution::from_histogram(pairs.iter().copied().collect(), Catalog::builtin())
    }

    fn supra(laterality: Option<Laterality>) -> impl FnOnce() -> Option<ClavicleFinding> {
        move || {
            Some(ClavicleFinding {
                region: ClavicleRegion::Supraclavicular,
                laterality,
            })
        }
    }

    #[test]
    fn test_empty_and_single() {
        let c = Catalog::builtin();
        assert_eq!(map_region(&attribution(&[]), c, Laterality::Left, supra(None)), "unknown");
        // 臀大肌没有相关淋巴结.
        assert_eq!(map_region(&attribution(&[(40, 5)]), c, Laterality::Left, supra(None)), "unknown");
        assert_eq!(map_region(&attribution(&[(1, 5)]), c, Laterality::NotApplicable, || None), "splenic");
        // 肝脏与胆囊都只对应门静脉区域.
        assert_eq!(
            map_region(&attribution(&[(5, 5), (4, 1)]), c, Laterality::NotApplicable, || panic!()),
            "portal"
        );
    }

    #[test]
    fn test_trunk_supraclavicular() {
        let c = Catalog::builtin();
        let trunk = attribution(&[(101, 10)]);
        assert_eq!(
            map_region(&trunk, c, Laterality::NotApplicable, supra(Some(Laterality::Left))),
            "left-supraclavicular"
        );
        assert_eq!(
            map_region(&trunk, c, Laterality::NotApplicable, supra(None)),
            "supraclavicular"
        );
        assert_eq!(map_region(&trunk, c, Laterality::Right, supra(None)), "right-supraclavicular");
    }

    #[test]
    fn test_fallback_to_main_organ() {
        let c = Catalog::builtin();
        // 躯干 + 脾脏, 几何判断不成立: 主器官为脾脏.
        let a = attribution(&[(101, 10), (1, 2)]);
        assert_eq!(map_region(&a, c, Laterality::NotApplicable, || None), "splenic");
        // 主器官对应多个区域时无法确定.
        let a = attribution(&[(7, 10), (1, 2)]);
        assert_eq!(map_region(&a, c, Laterality::NotApplicable, || None), "unknown");
        // 几何结果不在候选中.
        let a = attribution(&[(7, 10)]);
        assert_eq!(map_region(&a, c, Laterality::Left, supra(Some(Laterality::Left))), "unknown");
    }

    #[test]
    fn test_compound() {
        assert_eq!(compound(Laterality::Right, "axillary"), "right-axillary");
        assert_eq!(compound(Laterality::NotApplicable, "axillary"), "axillary");
    }
}
