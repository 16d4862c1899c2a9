//! 体数据的持久化存储.

use std::path::Path;

use nifti::writer::WriterOptions;

use super::Volume;
use crate::error::Result;

impl Volume<i32> {
    /// 以 `int32` nii 格式将体数据保存到 `path` 路径. 空间变换等元信息沿用自身 header.
    ///
    /// 若 `path` 以 `.gz` 结尾, 则自动压缩.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // [z, H, W] -> [W, H, z].
        let data = self.data.view().permuted_axes([2, 1, 0]);
        WriterOptions::new(path.as_ref())
            .reference_header(&self.header)
            .write_nifti(&data)?;
        Ok(())
    }
}
