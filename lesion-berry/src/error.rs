//! 运行时错误.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::Idx3d;

/// 本 crate 的结果类型.
pub type Result<T> = std::result::Result<T, LesionError>;

/// 单个受试者所涉及的体数据角色.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VolumeRole {
    /// 二值病灶 mask.
    LesionMask,

    /// 解剖 (器官) 标签图.
    Anatomy,

    /// PET 摄取值体数据.
    Pet,
}

impl fmt::Display for VolumeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolumeRole::LesionMask => "lesion mask",
            VolumeRole::Anatomy => "anatomy map",
            VolumeRole::Pet => "PET volume",
        };
        f.write_str(s)
    }
}

/// 病灶分析的错误类型.
#[derive(Error, Debug)]
pub enum LesionError {
    /// nifti 读写错误.
    #[error("NIfTI error: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// I/O 错误.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV 写入错误.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 器官目录 JSON 解析错误.
    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 体数据不是三维的 (去掉末尾长度为 1 的维度之后).
    #[error("{path:?}: expected a 3D volume, found shape {shape:?}")]
    Dimensionality {
        /// 文件路径.
        path: PathBuf,
        /// 实际形状.
        shape: Vec<usize>,
    },

    /// 同一受试者的体数据形状不一致.
    #[error("[{subject}] {role} shape {found:?} does not match lesion mask shape {expected:?}")]
    ShapeMismatch {
        /// 受试者标识.
        subject: String,
        /// 与病灶 mask 不一致的体数据.
        role: VolumeRole,
        /// 病灶 mask 形状 `(z, h, w)`.
        expected: Idx3d,
        /// 实际形状 `(z, h, w)`.
        found: Idx3d,
    },

    /// 找不到受试者的某个输入文件.
    #[error("[{subject}] {role} not found")]
    MissingInput {
        /// 受试者标识.
        subject: String,
        /// 缺失的体数据.
        role: VolumeRole,
    },

    /// 器官目录不合法.
    #[error("invalid organ catalog: {0}")]
    Catalog(String),

    /// 命令行或分析选项不合法.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LesionError {
    /// 该错误是否属于配置类错误 (应在任何体数据处理开始前中止程序).
    #[inline]
    pub fn is_configuration(&self) -> bool {
        matches!(self, LesionError::Catalog(_) | LesionError::Config(_))
    }
}
