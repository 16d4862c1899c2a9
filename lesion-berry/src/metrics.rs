//! 单个病灶实例的体积与 SUV 统计.

use crate::consts::SUV_PERCENTILE;
use crate::{stats, Idx3d, PetVolume};

/// 病灶内 PET 摄取值统计.
///
/// 没有 PET 或病灶内没有可用体素时, 所有统计量均为 `0.0` (不是 NaN),
/// 以便下游表格消费者简单处理.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SuvStats {
    /// 最大值.
    pub max: f64,

    /// 平均值.
    pub mean: f64,

    /// 95 分位数 (线性插值).
    pub p95: f64,
}

impl SuvStats {
    /// 由病灶内全部体素值计算统计量.
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            max: stats::max(values).unwrap_or(0.0),
            mean: stats::mean(values).unwrap_or(0.0),
            p95: stats::percentile(values, SUV_PERCENTILE).unwrap_or(0.0),
        }
    }

    /// 计算 `pet` 在 `voxels` 位置上的统计量. `pet` 为 `None` 时全为 `0.0`.
    pub fn measure(voxels: &[Idx3d], pet: Option<&PetVolume>) -> Self {
        match pet {
            Some(pet) => {
                let values: Vec<f64> = pet.gather(voxels).into_iter().map(f64::from).collect();
                Self::from_values(&values)
            }
            None => Self::default(),
        }
    }
}

/// 单个病灶实例的基本度量.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LesionMetrics {
    /// 体素个数.
    pub voxel_count: usize,

    /// 体积, 以毫升为单位.
    pub volume_ml: f64,

    /// SUV 统计.
    pub suv: SuvStats,
}

impl LesionMetrics {
    /// 计算病灶度量. `voxel_ml` 为单个体素的体积 (毫升).
    pub fn measure(voxels: &[Idx3d], voxel_ml: f64, pet: Option<&PetVolume>) -> Self {
        Self {
            voxel_count: voxels.len(),
            volume_ml: voxels.len() as f64 * voxel_ml,
            suv: SuvStats::measure(voxels, pet),
        }
    }
}
