//! 不涉及文件读写的端到端分析.

use lesion_berry::prelude::*;
use ndarray::{s, Array3};
use rstest::rstest;

fn code(name: &str) -> i32 {
    Catalog::builtin().code_of(name).unwrap()
}

fn volumes(mask: Array3<u8>, anatomy: Option<Array3<i32>>, pet: Option<Array3<f32>>, spacing: f32) -> SubjectVolumes {
    SubjectVolumes::from_volumes(
        "T".to_string(),
        MaskVolume::fake(mask, [spacing; 3]),
        anatomy.map(|a| AnatomyVolume::fake(a, [spacing; 3])),
        pet.map(|p| PetVolume::fake(p, [spacing; 3])),
    )
    .unwrap()
}

fn two_cubes() -> Array3<u8> {
    let mut mask = Array3::<u8>::zeros((8, 8, 8));
    mask.slice_mut(s![0..2, 0..2, 0..2]).fill(1);
    mask.slice_mut(s![5..7, 5..7, 5..7]).fill(1);
    mask
}

#[rstest]
#[case(10.0, 8.0)]
#[case(2.0, 0.064)]
fn test_two_cubes_volume(#[case] spacing: f32, #[case] expected_ml: f64) {
    let a = analyze(&volumes(two_cubes(), None, None, spacing), Catalog::builtin());
    assert_eq!(a.instances.len(), 2);
    assert_eq!(a.records.len(), 2);
    for (i, r) in a.records.iter().enumerate() {
        assert_eq!(r.lesion_id, i as u32 + 1);
        assert_eq!(r.voxel_count, 8);
        assert!((r.volume_ml - expected_ml).abs() < 1e-9);
    }
}

#[test]
fn test_volume_conservation() {
    let mask = two_cubes();
    let a = analyze(&volumes(mask.clone(), None, None, 1.0), Catalog::builtin());
    let total: usize = a.records.iter().map(|r| r.voxel_count).sum();
    assert_eq!(total, mask.iter().filter(|v| **v != 0).count());
}

#[test]
fn test_missing_pet_and_anatomy() {
    let a = analyze(&volumes(two_cubes(), None, None, 1.0), Catalog::builtin());
    for r in &a.records {
        assert_eq!((r.suv_max, r.suv_mean, r.suv_p95), (0.0, 0.0, 0.0));
        assert_eq!(r.organ1_name, "None");
        assert_eq!(r.organ2_name, "None");
        assert_eq!(r.lymph_node_region, "unknown");
        assert_eq!(r.above_diaphragm, Diaphragm::Indeterminate);
        assert_eq!(r.laterality, Laterality::NotApplicable);
        assert_eq!(r.deauville_score, None);
    }
    assert_eq!(a.reference, ReferenceUptake::default());
}

#[test]
fn test_lesion_inside_liver() {
    let mut anatomy = Array3::<i32>::zeros((8, 8, 8));
    anatomy.slice_mut(s![0..4, 0..4, 0..4]).fill(code("liver"));
    let a = analyze(&volumes(two_cubes(), Some(anatomy), None, 1.0), Catalog::builtin());

    let r = &a.records[0];
    assert_eq!(r.organ1_name, "liver");
    assert_eq!(r.organ1_pct, 100.0);
    assert_eq!(r.organ2_name, "None");
    assert_eq!(r.organ2_pct, 0.0);
    assert_eq!(r.above_diaphragm, Diaphragm::Below);
    assert_eq!(r.lymph_node_region, "portal");

    // 第二个立方体不与任何器官重叠.
    assert_eq!(a.records[1].organ1_name, "None");
}

#[test]
fn test_split_overlap_percentages() {
    let mut anatomy = Array3::<i32>::zeros((8, 8, 8));
    // 立方体 8 个体素: 6 个在脾脏, 2 个在左肾.
    anatomy.slice_mut(s![0..2, 0..2, 0..2]).fill(code("spleen"));
    anatomy.slice_mut(s![1..2, 1..2, 0..2]).fill(code("kidney_left"));
    let a = analyze(&volumes(two_cubes(), Some(anatomy), None, 1.0), Catalog::builtin());

    let r = &a.records[0];
    assert_eq!(r.organ1_name, "spleen");
    assert!((r.organ1_pct - 75.0).abs() < 1e-9);
    assert_eq!(r.organ2_name, "kidney_left");
    assert!((r.organ1_pct + r.organ2_pct - 100.0).abs() < 1e-9);
    assert_eq!(r.laterality, Laterality::NotApplicable);
    // 脾门与腹主动脉旁两个候选, 无锁骨判断, 主器官脾脏只对应一个区域.
    assert_eq!(r.lymph_node_region, "splenic");
}

#[test]
fn test_stray_voxel_rounds_to_full_overlap() {
    let mask = Array3::<u8>::ones((41, 50, 50));
    let mut anatomy = Array3::<i32>::from_elem((41, 50, 50), code("liver"));
    anatomy[(0, 0, 0)] = code("spleen");
    let a = analyze(&volumes(mask, Some(anatomy), None, 1.0), Catalog::builtin());

    let r = &a.records[0];
    assert_eq!(r.voxel_count, 102_500);
    assert_eq!(r.organ1_name, "liver");
    assert_eq!(r.organ2_name, "None");
    assert_eq!(r.organ2_pct, 0.0);
    let report = Summary::new("T", &a.records, a.reference, 5);
    assert!(report.spleen_lesions().is_empty());
}

/// 头颈在上, 肺在下, 锁骨在两者之间. 左侧结构位于 `w` 较小一侧.
fn clavicle_phantom() -> Array3<i32> {
    let mut a = Array3::<i32>::zeros((20, 9, 9));
    a.slice_mut(s![18..20, 3..6, 3..6]).fill(code("head_neck"));
    a.slice_mut(s![2..6, 2..7, 0..2]).fill(code("lung_left"));
    a.slice_mut(s![2..6, 2..7, 7..9]).fill(code("lung_right"));
    a.slice_mut(s![12..13, 4..5, 1..3]).fill(code("clavicula_left"));
    a.slice_mut(s![12..13, 4..5, 6..8]).fill(code("clavicula_right"));
    a.slice_mut(s![10..12, 0..1, 8..9]).fill(code("arm_right"));
    a
}

#[test]
fn test_trunk_lesion_left_supraclavicular() {
    let mut anatomy = clavicle_phantom();
    // 左上臂靠近病灶, 而病灶离右锁骨更近.
    anatomy[(14, 4, 5)] = code("arm_left");
    anatomy[(14, 4, 7)] = code("trunc");
    let mut mask = Array3::<u8>::zeros((20, 9, 9));
    mask[(14, 4, 7)] = 1;

    let a = analyze(&volumes(mask, Some(anatomy), None, 1.0), Catalog::builtin());
    let r = &a.records[0];
    assert_eq!(r.organ1_name, "trunc");
    assert_eq!(r.organ1_pct, 100.0);
    assert_eq!(r.above_diaphragm, Diaphragm::Above);
    assert_eq!(r.laterality, Laterality::Left);
    assert_eq!(r.lymph_node_region, "left-supraclavicular");
}

#[test]
fn test_trunk_lesion_below_lungs_uses_catalog() {
    let mut anatomy = clavicle_phantom();
    anatomy[(0, 4, 4)] = code("trunc");
    let mut mask = Array3::<u8>::zeros((20, 9, 9));
    mask[(0, 4, 4)] = 1;

    let a = analyze(&volumes(mask, Some(anatomy), None, 1.0), Catalog::builtin());
    let r = &a.records[0];
    assert_eq!(r.above_diaphragm, Diaphragm::Indeterminate);
    assert_eq!(r.laterality, Laterality::NotApplicable);
    assert_eq!(r.lymph_node_region, "unknown");
}

#[test]
fn test_deauville_single_highest_lesion() {
    let mut anatomy = Array3::<i32>::zeros((8, 8, 8));
    anatomy.slice_mut(s![3..5, 0..8, 0..8]).fill(code("liver"));
    anatomy.slice_mut(s![7..8, 0..2, 0..2]).fill(code("aorta"));
    let mut pet = Array3::<f32>::zeros((8, 8, 8));
    pet.slice_mut(s![3..5, 0..8, 0..8]).fill(2.0);
    pet.slice_mut(s![7..8, 0..2, 0..2]).fill(1.5);
    pet.slice_mut(s![0..2, 0..2, 0..2]).fill(1.0);
    pet.slice_mut(s![5..7, 5..7, 5..7]).fill(2.5);

    let a = analyze(&volumes(two_cubes(), Some(anatomy), Some(pet), 1.0), Catalog::builtin());
    assert!((a.reference.liver_p95 - 2.0).abs() < 1e-9);
    assert!((a.reference.aorta_p95 - 1.5).abs() < 1e-9);

    let scores: Vec<_> = a.records.iter().map(|r| r.deauville_score).collect();
    assert_eq!(scores, vec![None, Some(4)]);
    assert!((a.records[1].suv_max - 2.5).abs() < 1e-6);
    assert!(a.records.iter().all(|r| r.liver_p95 == a.reference.liver_p95));
}

#[test]
fn test_empty_mask() {
    let a = analyze(
        &volumes(Array3::zeros((4, 4, 4)), None, Some(Array3::zeros((4, 4, 4))), 1.0),
        Catalog::builtin(),
    );
    assert!(a.instances.is_empty());
    assert!(a.records.is_empty());
}

#[test]
fn test_shape_mismatch_is_rejected() {
    let err = SubjectVolumes::from_volumes(
        "T".to_string(),
        MaskVolume::fake(Array3::zeros((4, 4, 4)), [1.0; 3]),
        Some(AnatomyVolume::fake(Array3::zeros((4, 4, 5)), [1.0; 3])),
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LesionError::ShapeMismatch {
            role: VolumeRole::Anatomy,
            ..
        }
    ));
}
