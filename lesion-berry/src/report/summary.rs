use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

use super::LesionRecord;
use crate::consts::{organ, UNKNOWN_REGION};
use crate::deauville::ReferenceUptake;
use crate::lymph::compound;

/// 受试者的文字摘要.
pub struct Summary<'a> {
    subject: &'a str,
    records: &'a [LesionRecord],
    reference: ReferenceUptake,
    top_n: usize,
}

impl<'a> Summary<'a> {
    /// 创建摘要. `top_n` 为按体积列出的病灶个数.
    pub fn new(subject: &'a str, records: &'a [LesionRecord], reference: ReferenceUptake, top_n: usize) -> Self {
        Self {
            subject,
            records,
            reference,
            top_n,
        }
    }

    /// 按体积降序排列的前 `top_n` 个病灶. 体积相同时按编号升序.
    pub fn largest(&self) -> Vec<&'a LesionRecord> {
        self.records
            .iter()
            .sorted_by(|a, b| b.volume_ml.total_cmp(&a.volume_ml).then(a.lesion_id.cmp(&b.lesion_id)))
            .take(self.top_n)
            .collect()
    }

    /// 第一或第二器官为脾脏的病灶编号.
    pub fn spleen_lesions(&self) -> Vec<u32> {
        self.records
            .iter()
            .filter(|r| r.organ1_name == organ::SPLEEN || r.organ2_name == organ::SPLEEN)
            .map(|r| r.lesion_id)
            .collect()
    }

    /// 按淋巴结部位分组的病灶编号, 以及结外 (区域未知) 病灶编号.
    ///
    /// 部位键为 `{左右侧}-{区域}`; 区域已带左右侧或左右侧不适用时为区域本身.
    pub fn lymph_sites(&self) -> (BTreeMap<String, Vec<u32>>, Vec<u32>) {
        let mut sites = BTreeMap::<String, Vec<u32>>::new();
        let mut extranodal = Vec::new();
        for r in self.records {
            let region = r.lymph_node_region.as_str();
            if region == UNKNOWN_REGION {
                extranodal.push(r.lesion_id);
                continue;
            }
            let key = if has_side(region) {
                region.to_string()
            } else {
                compound(r.laterality, region)
            };
            sites.entry(key).or_default().push(r.lesion_id);
        }
        (sites, extranodal)
    }
}

#[inline]
fn has_side(region: &str) -> bool {
    region.starts_with("left-") || region.starts_with("right-")
}

fn underline(f: &mut fmt::Formatter<'_>, title: &str, c: char) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", c.to_string().repeat(title.chars().count()))
}

impl<'a> fmt::Display for Summary<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        underline(f, &format!("Subject {}", self.subject), '=')?;
        let total: f64 = self.records.iter().map(|r| r.volume_ml).sum();
        writeln!(f, "Lesions:       {}", self.records.len())?;
        writeln!(f, "Total volume:  {total:.3} mL")?;
        writeln!(f, "SUV95 liver:   {:.2}", self.reference.liver_p95)?;
        writeln!(f, "SUV95 aorta:   {:.2}", self.reference.aorta_p95)?;
        if self.records.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        let largest = self.largest();
        underline(f, &format!("Top {} lesions by volume", largest.len()), '-')?;
        for r in largest {
            write!(
                f,
                "#{:<3} {:>9.3} mL  SUVmax {:>6.2}  SUV95 {:>6.2}  {} ({:.2}%)",
                r.lesion_id, r.volume_ml, r.suv_max, r.suv_p95, r.organ1_name, r.organ1_pct
            )?;
            if r.organ2_name != crate::consts::NO_ORGAN {
                write!(f, ", {} ({:.2}%)", r.organ2_name, r.organ2_pct)?;
            }
            write!(f, "  [{}]", r.lymph_node_region)?;
            if let Some(score) = r.deauville_score {
                write!(f, "  Deauville {score}")?;
            }
            writeln!(f)?;
        }

        let spleen = self.spleen_lesions();
        if !spleen.is_empty() {
            writeln!(f)?;
            writeln!(f, "ALERT: spleen involvement in lesion(s) {}", spleen.iter().join(", "))?;
        }

        let (sites, extranodal) = self.lymph_sites();
        writeln!(f)?;
        underline(f, "Lymph-node sites", '-')?;
        if sites.is_empty() {
            writeln!(f, "(none)")?;
        }
        for (site, ids) in &sites {
            writeln!(f, "{site}: {}", ids.iter().join(", "))?;
        }
        if !extranodal.is_empty() {
            writeln!(f, "Extranodal: {}", extranodal.iter().join(", "))?;
        }
        Ok(())
    }
}
