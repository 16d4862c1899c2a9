//! 报告: 每个病灶一行的 CSV 表格, 以及可选的文字摘要.

mod record;
mod summary;
mod writer;

pub use self::record::{LesionRecord, COLUMNS};
pub use self::summary::Summary;
pub use self::writer::{report_path, write_csv, write_records};
