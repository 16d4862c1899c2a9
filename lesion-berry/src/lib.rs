#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 对 PET/MR 扫描的病灶分割结果 (二值 mask) 进行病灶实例级别的定量分析.
//!
//! 该 crate 只负责 "分析" 本身: 分割引擎、训练调度、格式转换等均视为外部协作者,
//! 本库只读取三个已配准的 nifti 体数据 (病灶 mask, 解剖标签图, PET), 并输出
//! 每个病灶一行的表格文件.
//!
//! # 注意
//!
//! 1. 内存中的体数据一律按照 `(z, h, w)` 组织, 即 nifti 原始 `(i, j, k)` 的逆序.
//!   第 0 轴 (`z`, 即 nifti 的第三个轴) 约定为头足方向, 索引越大越靠头侧.
//!   这是显式约定, 不会根据 header 自动探测.
//! 2. 同一受试者的三个体数据必须形状一致, 否则该受试者直接报错, 不会进行任何体素级计算.
//!
//! # 开发计划
//!
//! ### 体数据加载与受试者文件发现 ✅
//!
//! 按文件名子串匹配发现解剖标签图和 PET. 缺失时降级运行而不是中止.
//!
//! 实现位于 `lesion-berry/src/data` 和 `lesion-berry/src/subject.rs`.
//!
//! ### 26-连通病灶实例分割 ✅
//!
//! 按 `(z, h, w)` 行优先序发现连通分量, 保证对相同输入的编号稳定.
//!
//! 实现位于 `lesion-berry/src/instance.rs`.
//!
//! ### 病灶体积与 SUV 统计 ✅
//!
//! 95 分位数采用顺序统计量之间的线性插值.
//!
//! 实现位于 `lesion-berry/src/metrics.rs` 和 `lesion-berry/src/stats.rs`.
//!
//! ### 器官归属 ✅
//!
//! 实现位于 `lesion-berry/src/attribution.rs`.
//!
//! ### 解剖位置 / 左右侧 / 锁骨上下分类 ✅
//!
//! 躯干 (`trunc`) 标签本身不携带左右和锁骨信息, 因此对仅落在躯干内的病灶,
//! 借助头颈、肺、锁骨和上臂质心做几何判断.
//!
//! 实现位于 `lesion-berry/src/classify.rs`.
//!
//! ### 淋巴结区域映射 ✅
//!
//! 实现位于 `lesion-berry/src/lymph.rs`.
//!
//! ### 肝脏 / 主动脉参考摄取与 Deauville 评分 ✅
//!
//! 实现位于 `lesion-berry/src/deauville.rs`.
//!
//! ### CSV 报告与文字摘要 ✅
//!
//! 实现位于 `lesion-berry/src/report`.
//!
//! ### 多受试者批处理 ✅
//!
//! 受试者之间无共享可变状态. 开启 `rayon` feature 时并行处理.
//!
//! 实现位于 `lesion-berry/src/pipeline.rs`.

/// 三维索引 `(z, h, w)`.
pub type Idx3d = (usize, usize, usize);

/// 体素索引空间中的浮点坐标 `[z, h, w]`, 用于表示质心.
pub type Point3d = [f64; 3];

/// nii 体数据基础结构.
mod data;

pub use data::{AnatomyVolume, MaskVolume, NiftiHeaderAttr, PetVolume, Volume};

pub mod attribution;
pub mod catalog;
pub mod classify;
pub mod consts;
pub mod deauville;
pub mod error;
pub mod instance;
pub mod lymph;
pub mod metrics;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod stats;
pub mod subject;

pub use error::{LesionError, Result};
