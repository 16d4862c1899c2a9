//! 内建器官目录.
//!
//! 1-50 为 TotalSegmentator `total_mr` 标签, 101/102 为 `body_mr` 重映射后的躯干/四肢标签,
//! 103-105 为几何判断所需的头颈及上臂区域标签.

use super::{Diaphragm, Laterality, OrganEntry};

use super::Diaphragm::{Above as Y, Below as N, Indeterminate as B};
use super::Laterality::{Left as L, NotApplicable as NA, Right as R};

/// 躯干覆盖的淋巴结区域.
const TRUNK_NODES: &[&str] = &[
    "axillary",
    "cervical",
    "iliac",
    "infraclavicular",
    "inguinal",
    "mediastinal",
    "mesenteric",
    "paraaortic",
    "supraclavicular",
];

#[rustfmt::skip]
const TABLE: &[(i32, &str, Diaphragm, Laterality, &[&str])] = &[
    (1, "spleen", N, NA, &["splenic"]),
    (2, "kidney_right", N, R, &["paraaortic"]),
    (3, "kidney_left", N, L, &["paraaortic"]),
    (4, "gallbladder", N, R, &["portal"]),
    (5, "liver", N, NA, &["portal"]),
    (6, "stomach", N, NA, &["mesenteric"]),
    (7, "pancreas", N, NA, &["mesenteric", "paraaortic"]),
    (8, "adrenal_gland_right", N, R, &["paraaortic"]),
    (9, "adrenal_gland_left", N, L, &["paraaortic"]),
    (10, "lung_left", Y, L, &["hilar", "mediastinal"]),
    (11, "lung_right", Y, R, &["hilar", "mediastinal"]),
    (12, "esophagus", Y, NA, &["mediastinal"]),
    (13, "small_bowel", N, NA, &["mesenteric"]),
    (14, "duodenum", N, NA, &["mesenteric"]),
    (15, "colon", N, NA, &["mesenteric"]),
    (16, "urinary_bladder", N, NA, &["iliac"]),
    (17, "prostate", N, NA, &["iliac"]),
    (18, "sacrum", N, NA, &["iliac"]),
    (19, "vertebrae", B, NA, &[]),
    (20, "intervertebral_discs", B, NA, &[]),
    (21, "spinal_cord", B, NA, &[]),
    (22, "heart", Y, NA, &["mediastinal"]),
    (23, "aorta", B, NA, &["mediastinal", "paraaortic"]),
    (24, "inferior_vena_cava", B, NA, &["paraaortic"]),
    (25, "portal_vein_and_splenic_vein", N, NA, &["portal"]),
    (26, "iliac_artery_left", N, L, &["iliac"]),
    (27, "iliac_artery_right", N, R, &["iliac"]),
    (28, "iliac_vena_left", N, L, &["iliac"]),
    (29, "iliac_vena_right", N, R, &["iliac"]),
    (30, "humerus_left", Y, L, &["axillary"]),
    (31, "humerus_right", Y, R, &["axillary"]),
    (32, "scapula_left", Y, L, &["axillary"]),
    (33, "scapula_right", Y, R, &["axillary"]),
    (34, "clavicula_left", Y, L, &["infraclavicular", "supraclavicular"]),
    (35, "clavicula_right", Y, R, &["infraclavicular", "supraclavicular"]),
    (36, "femur_left", N, L, &["inguinal"]),
    (37, "femur_right", N, R, &["inguinal"]),
    (38, "hip_left", N, L, &["iliac", "inguinal"]),
    (39, "hip_right", N, R, &["iliac", "inguinal"]),
    (40, "gluteus_maximus_left", N, L, &[]),
    (41, "gluteus_maximus_right", N, R, &[]),
    (42, "gluteus_medius_left", N, L, &[]),
    (43, "gluteus_medius_right", N, R, &[]),
    (44, "gluteus_minimus_left", N, L, &[]),
    (45, "gluteus_minimus_right", N, R, &[]),
    (46, "autochthon_left", B, L, &[]),
    (47, "autochthon_right", B, R, &[]),
    (48, "iliopsoas_left", N, L, &["iliac"]),
    (49, "iliopsoas_right", N, R, &["iliac"]),
    (50, "brain", Y, NA, &[]),
    (101, "trunc", B, NA, TRUNK_NODES),
    (102, "extremities", B, NA, &["axillary", "epitrochlear", "inguinal", "popliteal"]),
    (103, "head_neck", Y, NA, &["cervical"]),
    (104, "arm_left", Y, L, &["axillary", "epitrochlear"]),
    (105, "arm_right", Y, R, &["axillary", "epitrochlear"]),
];

/// 内建目录项.
pub(super) fn entries() -> impl Iterator<Item = OrganEntry> {
    TABLE.iter().map(|&(code, name, above_diaphragm, laterality, nodes)| OrganEntry {
        code,
        name: name.to_string(),
        above_diaphragm,
        laterality,
        lymph_nodes: nodes.iter().map(|s| s.to_string()).collect(),
    })
}
