#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

/// 各向同性体素, 边长 `spacing` 毫米.
pub fn header(spacing: f32) -> NiftiHeader {
    let mut h = NiftiHeader::default();
    h.pixdim = [1.0, spacing, spacing, spacing, 1.0, 1.0, 1.0, 1.0];
    h
}

macro_rules! impl_write {
    ($($name: ident: $elem: ty),+) => {
        $(
            /// 将 `(z, h, w)` 组织的数据写成 nii 文件.
            pub fn $name(path: &Path, zhw: &Array3<$elem>, spacing: f32) {
                WriterOptions::new(path)
                    .reference_header(&header(spacing))
                    .write_nifti(&zhw.view().permuted_axes([2, 1, 0]))
                    .unwrap();
            }
        )+
    };
}

impl_write!(write_mask: u8, write_anatomy: i32, write_pet: f32);

/// 在 `root/{id}/` 下写出一个受试者, 返回 mask 路径.
pub fn subject(
    root: &Path,
    id: &str,
    mask: &Array3<u8>,
    anatomy: Option<&Array3<i32>>,
    pet: Option<&Array3<f32>>,
    spacing: f32,
) -> PathBuf {
    let dir = root.join(id);
    fs::create_dir_all(&dir).unwrap();
    let mask_path = dir.join(format!("{id}_LYM_label.nii.gz"));
    write_mask(&mask_path, mask, spacing);
    if let Some(a) = anatomy {
        write_anatomy(&dir.join(format!("{id}_all.nii.gz")), a, spacing);
    }
    if let Some(p) = pet {
        write_pet(&dir.join(format!("{id}_LYM.nii.gz")), p, spacing);
    }
    mask_path
}

/// 读取 CSV 报告, 每行为 `列名 -> 字段`.
pub fn read_rows(path: &Path) -> (Vec<String>, Vec<HashMap<String, String>>) {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            headers.iter().cloned().zip(r.iter().map(str::to_string)).collect()
        })
        .collect();
    (headers, rows)
}

thread_local! {
    static LOGS: RefCell<Vec<(Level, String)>> = RefCell::new(Vec::new());
}

/// 按线程收集日志. 被测代码须在调用线程内执行.
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        LOGS.with(|l| l.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// 执行 `f`, 同时返回其间当前线程输出的日志.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    LOGS.with(|l| l.borrow_mut().clear());
    let out = f();
    (out, LOGS.with(|l| l.take()))
}

/// 级别为 `warn` 且包含 `needle` 的日志条数.
pub fn warnings(logs: &[(Level, String)], needle: &str) -> usize {
    logs.iter().filter(|(l, m)| *l == Level::Warn && m.contains(needle)).count()
}
