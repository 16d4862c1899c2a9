//! 器官目录: 解剖标签编码 -> (器官名, 横膈位置, 左右侧, 相关淋巴结区域).
//!
//! 目录是静态参考数据. 进程内只构建一次, 之后只读共享.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::consts::{organ, ANATOMY_BACKGROUND};
use crate::error::{LesionError, Result};

mod builtin;

/// 相对于横膈的位置. 三态.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Diaphragm {
    /// 横膈以上.
    #[serde(rename = "yes")]
    Above,

    /// 横膈以下.
    #[serde(rename = "no")]
    Below,

    /// 跨越横膈或无法确定.
    #[serde(rename = "unknown", alias = "both")]
    Indeterminate,
}

impl Diaphragm {
    /// 报告中使用的文本.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Diaphragm::Above => "yes",
            Diaphragm::Below => "no",
            Diaphragm::Indeterminate => "unknown",
        }
    }
}

impl fmt::Display for Diaphragm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 相对于身体中线的左右侧.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Laterality {
    /// 左侧.
    #[serde(rename = "left")]
    Left,

    /// 右侧.
    #[serde(rename = "right")]
    Right,

    /// 不适用 (中线结构或无法确定).
    #[serde(rename = "NA", alias = "na")]
    NotApplicable,
}

impl Laterality {
    /// 报告中使用的文本.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Laterality::Left => "left",
            Laterality::Right => "right",
            Laterality::NotApplicable => "NA",
        }
    }

    /// 是否确定了左右侧.
    #[inline]
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Laterality::NotApplicable)
    }
}

impl fmt::Display for Laterality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 器官目录中的一项.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct OrganEntry {
    /// 解剖标签图中的整数编码.
    pub code: i32,

    /// 规范器官名.
    pub name: String,

    /// 相对横膈的位置.
    pub above_diaphragm: Diaphragm,

    /// 左右侧.
    pub laterality: Laterality,

    /// 与该器官相关的淋巴结区域名. 有序, 以保证结果确定.
    #[serde(default)]
    pub lymph_nodes: BTreeSet<String>,
}

impl OrganEntry {
    /// 是否为躯干标签.
    #[inline]
    pub fn is_trunk(&self) -> bool {
        self.name == organ::TRUNK
    }
}

/// 器官目录的 JSON 文件格式.
#[derive(Deserialize)]
struct CatalogFile {
    organs: Vec<OrganEntry>,
}

/// 器官目录. 构造后不可变.
#[derive(Clone, Debug)]
pub struct Catalog {
    entries: BTreeMap<i32, OrganEntry>,
    by_name: HashMap<String, i32>,
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
    // 内建表在单元测试中已验证合法.
    Catalog::from_entries(builtin::entries()).expect("builtin organ catalog is valid")
});

impl Catalog {
    /// 获取内建目录 (TotalSegmentator MR 器官标签, 躯干/四肢标签及几何判断用的区域标签).
    #[inline]
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// 由目录项构造目录, 并检查其合法性:
    ///
    /// 1. 编码唯一, 且不能为背景编码 0;
    /// 2. 器官名唯一且非空;
    /// 3. 必须包含躯干、肝脏、主动脉和脾脏.
    pub fn from_entries<I: IntoIterator<Item = OrganEntry>>(it: I) -> Result<Self> {
        let mut entries = BTreeMap::new();
        let mut by_name = HashMap::new();
        for entry in it {
            if entry.code == ANATOMY_BACKGROUND {
                return Err(LesionError::Catalog(format!(
                    "code {ANATOMY_BACKGROUND} is reserved for background (`{}`)",
                    entry.name
                )));
            }
            if entry.name.trim().is_empty() {
                return Err(LesionError::Catalog(format!("code {} has an empty name", entry.code)));
            }
            if let Some(prev) = by_name.insert(entry.name.clone(), entry.code) {
                return Err(LesionError::Catalog(format!(
                    "name `{}` used by codes {prev} and {}",
                    entry.name, entry.code
                )));
            }
            if let Some(prev) = entries.insert(entry.code, entry) {
                return Err(LesionError::Catalog(format!("duplicate code {}", prev.code)));
            }
        }

        for required in [organ::TRUNK, organ::LIVER, organ::AORTA, organ::SPLEEN] {
            if !by_name.contains_key(required) {
                return Err(LesionError::Catalog(format!("missing required organ `{required}`")));
            }
        }
        Ok(Self { entries, by_name })
    }

    /// 从 JSON 字符串加载目录. 格式为 `{"organs": [OrganEntry, ...]}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(s)?;
        Self::from_entries(file.organs)
    }

    /// 从 JSON 文件加载目录.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&s)
    }

    /// 根据编码查找目录项.
    #[inline]
    pub fn get(&self, code: i32) -> Option<&OrganEntry> {
        self.entries.get(&code)
    }

    /// 根据器官名查找编码.
    #[inline]
    pub fn code_of(&self, name: &str) -> Option<i32> {
        self.by_name.get(name).copied()
    }

    /// 根据器官名查找目录项.
    #[inline]
    pub fn by_name(&self, name: &str) -> Option<&OrganEntry> {
        self.code_of(name).and_then(|c| self.get(c))
    }

    /// 获取编码对应的器官名. 不在目录中的编码命名为 `unknown_{code}`.
    pub fn name_of(&self, code: i32) -> Cow<'_, str> {
        match self.get(code) {
            Some(e) => Cow::Borrowed(e.name.as_str()),
            None => Cow::Owned(format!("unknown_{code}")),
        }
    }

    /// 编码是否为躯干标签.
    #[inline]
    pub fn is_trunk(&self, code: i32) -> bool {
        self.get(code).is_some_and(OrganEntry::is_trunk)
    }

    /// 按编码升序迭代所有目录项.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &OrganEntry> {
        self.entries.values()
    }

    /// 目录项个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 目录是否为空. 合法目录总是非空的.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
