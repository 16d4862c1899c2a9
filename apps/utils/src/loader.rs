//! 数据目录与器官目录的定位和加载.

use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};

use lesion_berry::catalog::Catalog;

/// 指定数据根目录的环境变量.
pub const DATA_DIR_ENV: &str = "LESION_DATA_DIR";

/// 获取 `$HOME/dataset/...` 路径. 无法确定用户主目录时返回 `None`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 获取病灶数据根目录.
///
/// 1. 若环境变量 `$LESION_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/lesions`;
/// 3. 无法确定用户主目录时返回 `None`.
pub fn data_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(DATA_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["lesions"]),
    }
}

/// 加载器官目录. `path` 为 `None` 时使用内建目录.
pub fn catalog<P: AsRef<Path>>(path: Option<P>) -> lesion_berry::Result<Cow<'static, Catalog>> {
    match path {
        Some(p) => Catalog::from_json_file(p).map(Cow::Owned),
        None => Ok(Cow::Borrowed(Catalog::builtin())),
    }
}
