//! 受试者文件发现与体数据加载.
//!
//! 一个受试者由一个病灶 mask 文件确定. 解剖标签图和 PET 按文件名子串在 mask
//! 所在目录中查找, 缺失时降级运行.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::consts::pattern;
use crate::error::{LesionError, Result, VolumeRole};
use crate::{AnatomyVolume, MaskVolume, PetVolume};

/// 文件名匹配子串.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilePatterns {
    /// 病灶 mask.
    pub mask: String,

    /// 解剖标签图.
    pub anatomy: String,

    /// PET.
    pub pet: String,
}

impl Default for FilePatterns {
    fn default() -> Self {
        Self {
            mask: pattern::LESION_MASK.to_string(),
            anatomy: pattern::ANATOMY.to_string(),
            pet: pattern::PET.to_string(),
        }
    }
}

#[inline]
fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

/// 按文件名排序后的目录内普通文件.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 在 `root` 下查找文件名包含 `mask_pattern` 的所有病灶 mask. 结果已排序.
///
/// `onedir` 为 `true` 时只查找 `root` 本身, 不进入子目录.
pub fn find_masks<P: AsRef<Path>>(root: P, mask_pattern: &str, onedir: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut stack = vec![root.as_ref().to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if !onedir {
                    stack.push(path);
                }
            } else if file_name(&path).is_some_and(|n| n.contains(mask_pattern)) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// 由 mask 路径得到受试者标识: 文件名中 `mask_pattern` 之前的部分.
///
/// 若该部分为空 (如文件名恰好等于匹配子串), 则使用所在目录名.
pub fn subject_id(mask: &Path, mask_pattern: &str) -> String {
    let name = file_name(mask).unwrap_or_default();
    let prefix = match name.find(mask_pattern) {
        Some(i) => &name[..i],
        None => strip_nifti_ext(name),
    };
    if !prefix.is_empty() {
        return prefix.to_string();
    }
    mask.parent()
        .and_then(file_name)
        .map(str::to_string)
        .unwrap_or_else(|| name.to_string())
}

/// 去掉 `.nii.gz` 或 `.nii` 扩展名.
pub fn strip_nifti_ext(name: &str) -> &str {
    name.strip_suffix(".nii.gz")
        .or_else(|| name.strip_suffix(".nii"))
        .unwrap_or(name)
}

/// 单个受试者的输入文件.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubjectPaths {
    /// 受试者标识.
    pub id: String,

    /// 病灶 mask.
    pub mask: PathBuf,

    /// 解剖标签图. 未找到时为 `None`.
    pub anatomy: Option<PathBuf>,

    /// PET. 未找到时为 `None`.
    pub pet: Option<PathBuf>,
}

impl SubjectPaths {
    /// 根据病灶 mask 路径发现同一受试者的解剖标签图和 PET.
    ///
    /// 1. 优先选择以受试者标识开头且包含对应子串的文件;
    /// 2. 若目录中只有这一个病灶 mask (每个受试者一个目录), 则接受任何包含对应子串的文件;
    /// 3. 对 PET, 先尝试 `{"_LYM" 之前的前缀}_LYM.nii.gz` 的命名规则.
    ///
    /// 候选文件均按文件名排序, 因此结果确定.
    pub fn discover<P: AsRef<Path>>(mask: P, patterns: &FilePatterns) -> Result<Self> {
        let mask = mask.as_ref().to_path_buf();
        let id = subject_id(&mask, &patterns.mask);
        let dir = mask.parent().map(Path::to_path_buf).unwrap_or_default();
        let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };

        let listing = sorted_files(&dir)?;
        let single_subject = listing
            .iter()
            .filter(|p| file_name(p).is_some_and(|n| n.contains(&patterns.mask)))
            .count()
            <= 1;
        let files: Vec<PathBuf> = listing
            .into_iter()
            .filter(|p| *p != mask && !is_derived(p, patterns))
            .collect();

        let pick = |pat: &str| -> Option<PathBuf> {
            let matching = || files.iter().filter(|p| file_name(p).is_some_and(|n| n.contains(pat)));
            matching()
                .find(|p| file_name(p).is_some_and(|n| n.starts_with(&id)))
                .or_else(|| single_subject.then(|| matching().next()).flatten())
                .cloned()
        };

        let anatomy = pick(&patterns.anatomy);
        let pet = pet_by_marker(&mask).filter(|p| p.is_file()).or_else(|| pick(&patterns.pet));

        debug!("[{id}] anatomy: {anatomy:?}, PET: {pet:?}");
        Ok(Self { id, mask, anatomy, pet })
    }
}

/// `{"_LYM" 之前的前缀}_LYM.nii.gz`, 与 mask 同目录. mask 文件名不含该标记时为 `None`.
fn pet_by_marker(mask: &Path) -> Option<PathBuf> {
    let stem = strip_nifti_ext(file_name(mask)?);
    let i = stem.find(pattern::PET_MARKER)?;
    let name = format!("{}{}.nii.gz", &stem[..i], pattern::PET_MARKER);
    Some(mask.with_file_name(name))
}

/// 本工具的输出文件, 或其他病灶 mask.
fn is_derived(path: &Path, patterns: &FilePatterns) -> bool {
    file_name(path).is_some_and(|n| {
        n.contains(&patterns.mask)
            || n.ends_with(pattern::REPORT_SUFFIX)
            || strip_nifti_ext(n).ends_with(pattern::INSTANCE_SUFFIX)
    })
}

/// 单个受试者已加载的体数据. 构造时保证形状一致.
#[derive(Debug)]
pub struct SubjectVolumes {
    /// 受试者标识.
    pub id: String,

    /// 病灶 mask.
    pub mask: MaskVolume,

    /// 解剖标签图.
    pub anatomy: Option<AnatomyVolume>,

    /// PET.
    pub pet: Option<PetVolume>,
}

impl SubjectVolumes {
    /// 加载受试者的所有体数据. 解剖标签图或 PET 缺失时记录警告并继续.
    pub fn load(paths: &SubjectPaths) -> Result<Self> {
        let id = paths.id.clone();
        let mask = MaskVolume::open(&paths.mask)?;

        let anatomy = match &paths.anatomy {
            Some(p) => Some(AnatomyVolume::open(p)?),
            None => {
                let e = LesionError::MissingInput {
                    subject: id.clone(),
                    role: VolumeRole::Anatomy,
                };
                warn!("{e}; organ fields will be reported as \"None\"");
                None
            }
        };
        let pet = match &paths.pet {
            Some(p) => Some(PetVolume::open(p)?),
            None => {
                let e = LesionError::MissingInput {
                    subject: id.clone(),
                    role: VolumeRole::Pet,
                };
                warn!("{e}; SUV metrics will be reported as 0.0");
                None
            }
        };

        Self::from_volumes(id, mask, anatomy, pet)
    }

    /// 由已加载的体数据构造, 并检查形状一致性.
    pub fn from_volumes(
        id: String,
        mask: MaskVolume,
        anatomy: Option<AnatomyVolume>,
        pet: Option<PetVolume>,
    ) -> Result<Self> {
        let expected = mask.shape();
        let shapes = [
            (VolumeRole::Anatomy, anatomy.as_ref().map(|v| v.shape())),
            (VolumeRole::Pet, pet.as_ref().map(|v| v.shape())),
        ];
        for (role, found) in shapes {
            match found {
                Some(found) if found != expected => {
                    return Err(LesionError::ShapeMismatch {
                        subject: id,
                        role,
                        expected,
                        found,
                    });
                }
                _ => {}
            }
        }
        Ok(Self {
            id,
            mask,
            anatomy,
            pet,
        })
    }
}
