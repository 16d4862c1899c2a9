use std::io;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use super::{LesionRecord, COLUMNS};
use crate::consts::pattern::REPORT_SUFFIX;
use crate::error::Result;
use crate::subject::strip_nifti_ext;

/// 报告文件路径.
///
/// 未给定 `output_dir` 时与 mask 同目录, 名为 `{mask 文件名去扩展名}_lesion_stats.csv`;
/// 否则写到该目录下, 名为 `{受试者标识}_lesion_stats.csv`.
pub fn report_path(mask: &Path, subject: &str, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(format!("{subject}{REPORT_SUFFIX}")),
        None => {
            let name = mask.file_name().and_then(|s| s.to_str()).unwrap_or_default();
            mask.with_file_name(format!("{}{REPORT_SUFFIX}", strip_nifti_ext(name)))
        }
    }
}

/// 将报告写入 `writer`. 表头总是写出, 因此空集合得到只有表头的合法文件.
pub fn write_records<W: io::Write>(writer: W, records: &[LesionRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for r in records {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// 将报告写入 `path`.
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[LesionRecord]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_records(io::BufWriter::new(file), records)
}
