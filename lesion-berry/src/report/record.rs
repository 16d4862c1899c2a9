use serde::{Serialize, Serializer};

use crate::catalog::{Diaphragm, Laterality};
use crate::stats;

/// CSV 列名, 与 [`LesionRecord`] 字段顺序一致.
pub const COLUMNS: [&str; 16] = [
    "lesion_id",
    "volume_ml",
    "SUV_max",
    "SUV_95percentile",
    "SUV95_aorta",
    "SUV95_liver",
    "organ1_name",
    "organ1_pct",
    "organ2_name",
    "organ2_pct",
    "above_diaphragm",
    "laterality",
    "lymph_node_region",
    "deauville_score",
    "voxel_count",
    "SUV_mean",
];

/// 单个病灶的报告行.
///
/// 内存中保留原始百分比, 写出时舍入到两位小数. 没有评分时 `deauville_score` 写为空字段.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LesionRecord {
    /// 病灶编号, 从 1 开始.
    pub lesion_id: u32,

    /// 体积 (毫升).
    pub volume_ml: f64,

    /// SUV 最大值.
    #[serde(rename = "SUV_max")]
    pub suv_max: f64,

    /// SUV 95 分位数.
    #[serde(rename = "SUV_95percentile")]
    pub suv_p95: f64,

    /// 受试者主动脉参考摄取.
    #[serde(rename = "SUV95_aorta")]
    pub aorta_p95: f64,

    /// 受试者肝脏参考摄取.
    #[serde(rename = "SUV95_liver")]
    pub liver_p95: f64,

    /// 第一器官.
    pub organ1_name: String,

    /// 第一器官占比 (%).
    #[serde(serialize_with = "serialize_pct")]
    pub organ1_pct: f64,

    /// 第二器官.
    pub organ2_name: String,

    /// 第二器官占比 (%).
    #[serde(serialize_with = "serialize_pct")]
    pub organ2_pct: f64,

    /// 相对横膈的位置.
    pub above_diaphragm: Diaphragm,

    /// 左右侧.
    pub laterality: Laterality,

    /// 淋巴结区域.
    pub lymph_node_region: String,

    /// Deauville 评分. 仅摄取最高的病灶非空.
    pub deauville_score: Option<u8>,

    /// 体素个数.
    pub voxel_count: usize,

    /// SUV 平均值.
    #[serde(rename = "SUV_mean")]
    pub suv_mean: f64,
}

fn serialize_pct<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(stats::round2(*v))
}
