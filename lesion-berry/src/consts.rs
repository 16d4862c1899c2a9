//! 通用常量.

/// 解剖标签图中, 背景的标签值.
pub const ANATOMY_BACKGROUND: i32 = 0;

/// 病灶 mask 中, 背景的体素值.
pub const MASK_BACKGROUND: u8 = 0;

/// 缺省器官名.
pub const NO_ORGAN: &str = "None";

/// 无法确定的淋巴结区域.
pub const UNKNOWN_REGION: &str = "unknown";

/// 计算病灶与参考区域摄取时使用的分位数.
pub const SUV_PERCENTILE: f64 = 95.0;

/// 低于该占比 (%) 时, 认为病灶没有单一主导器官.
pub const DOMINANT_ORGAN_PCT: f64 = 50.0;

/// Deauville 评分 4/5 分界: 肝脏参考值的倍数.
pub const DEAUVILLE_LIVER_FACTOR: f64 = 1.5;

/// 器官目录中有特殊含义的器官名.
pub mod organ {
    /// 躯干. 过于粗糙, 不能用于推断位置和左右侧.
    pub const TRUNK: &str = "trunc";

    /// 肝脏. 参考摄取区域.
    pub const LIVER: &str = "liver";

    /// 主动脉. 参考摄取区域.
    pub const AORTA: &str = "aorta";

    /// 脾脏. 摘要中需要特别提示.
    pub const SPLEEN: &str = "spleen";

    /// 构成头颈区域的标签.
    pub const HEAD: [&str; 2] = ["head_neck", "brain"];

    /// 构成双肺区域的标签.
    pub const LUNGS: [&str; 2] = ["lung_left", "lung_right"];

    /// 左锁骨.
    pub const CLAVICLE_LEFT: &str = "clavicula_left";

    /// 右锁骨.
    pub const CLAVICLE_RIGHT: &str = "clavicula_right";

    /// 构成左上臂区域的标签.
    pub const ARM_LEFT: [&str; 2] = ["arm_left", "humerus_left"];

    /// 构成右上臂区域的标签.
    pub const ARM_RIGHT: [&str; 2] = ["arm_right", "humerus_right"];
}

/// 淋巴结区域名.
pub mod region {
    /// 锁骨上.
    pub const SUPRACLAVICULAR: &str = "supraclavicular";

    /// 锁骨下.
    pub const INFRACLAVICULAR: &str = "infraclavicular";
}

/// 受试者文件名匹配的默认子串.
pub mod pattern {
    /// 病灶 mask.
    pub const LESION_MASK: &str = "_LYM_label.nii.gz";

    /// 解剖标签图.
    pub const ANATOMY: &str = "_all.nii.gz";

    /// PET.
    pub const PET: &str = "_LYM.nii.gz";

    /// PET 文件名中受试者前缀之后的固定标记.
    pub const PET_MARKER: &str = "_LYM";

    /// 实例标签图文件名后缀.
    pub const INSTANCE_SUFFIX: &str = "_inst";

    /// CSV 报告文件名后缀.
    pub const REPORT_SUFFIX: &str = "_lesion_stats.csv";
}
