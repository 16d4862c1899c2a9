//! 单个受试者的分析流程, 以及多受试者批处理.
//!
//! 单个受试者内部各阶段严格顺序执行; 受试者之间没有共享可变状态,
//! 开启 `rayon` feature 时并行处理. 所有日志均以 `[受试者]` 开头.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use itertools::Itertools;
use log::{debug, error, info, warn};
use once_cell::unsync::OnceCell;

use crate::attribution::Attribution;
use crate::catalog::Catalog;
use crate::classify::{centroid, classify, Landmarks};
use crate::consts::{pattern, DOMINANT_ORGAN_PCT};
use crate::deauville::{assign_scores, ReferenceUptake};
use crate::error::{LesionError, Result};
use crate::instance::InstanceMap;
use crate::lymph::map_region;
use crate::metrics::LesionMetrics;
use crate::report::{report_path, write_csv, LesionRecord, Summary};
use crate::subject::{find_masks, strip_nifti_ext, subject_id, FilePatterns, SubjectPaths, SubjectVolumes};
use crate::NiftiHeaderAttr;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 分析选项. 使用前须调用 [`AnalysisOptions::validate`].
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    /// 输入根目录.
    pub input: PathBuf,

    /// 文件名匹配子串.
    pub patterns: FilePatterns,

    /// 只查找输入根目录本身, 不进入子目录.
    pub onedir: bool,

    /// 是否保存实例标签图.
    pub save_instances: bool,

    /// 输出目录. 为 `None` 时输出到 mask 所在目录.
    pub output_dir: Option<PathBuf>,

    /// 是否生成文字摘要.
    pub summary: bool,

    /// 摘要中按体积列出的病灶个数.
    pub top_n: usize,

    /// 并行线程数. 为 `None` 时使用全部可用核心.
    pub jobs: Option<usize>,

    /// 任一受试者失败时是否中止批处理.
    pub fail_fast: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            patterns: FilePatterns::default(),
            onedir: false,
            save_instances: false,
            output_dir: None,
            summary: false,
            top_n: 5,
            jobs: None,
            fail_fast: false,
        }
    }
}

impl AnalysisOptions {
    /// 检查选项合法性. 错误均为配置类错误.
    pub fn validate(&self) -> Result<()> {
        let config = |msg: String| Err(LesionError::Config(msg));
        let p = &self.patterns;
        if p.mask.is_empty() || p.anatomy.is_empty() || p.pet.is_empty() {
            return config("file patterns must not be empty".to_string());
        }
        if !p.mask.contains(".nii") {
            return config(format!("lesion mask pattern `{}` does not name a NIfTI file", p.mask));
        }
        if !self.input.is_dir() {
            return config(format!("input directory {:?} does not exist", self.input));
        }
        if self.output_dir.as_ref().is_some_and(|d| d.is_file()) {
            return config(format!("output path {:?} is a file", self.output_dir));
        }
        if self.summary && self.top_n == 0 {
            return config("--top must be at least 1 when a summary is requested".to_string());
        }
        if self.jobs == Some(0) {
            return config("--jobs must be at least 1".to_string());
        }
        Ok(())
    }
}

/// 单个受试者的分析结果.
#[derive(Debug)]
pub struct SubjectAnalysis {
    /// 病灶实例.
    pub instances: InstanceMap,

    /// 参考摄取.
    pub reference: ReferenceUptake,

    /// 报告行, 按病灶编号升序.
    pub records: Vec<LesionRecord>,
}

/// 对已加载的受试者体数据进行完整分析. 不写任何文件.
pub fn analyze(volumes: &SubjectVolumes, catalog: &Catalog) -> SubjectAnalysis {
    let id = volumes.id.as_str();
    let anatomy = volumes.anatomy.as_ref();
    let pet = volumes.pet.as_ref();

    let instances = InstanceMap::from_mask(&volumes.mask);
    info!("[{id}] found {} lesion instance(s)", instances.len());

    let reference = ReferenceUptake::measure(anatomy, pet, catalog);
    debug!(
        "[{id}] reference SUV95: liver {:.3}, aorta {:.3}",
        reference.liver_p95, reference.aorta_p95
    );

    let voxel_ml = volumes.mask.voxel_ml();
    let landmarks = OnceCell::new();
    let mut records = Vec::with_capacity(instances.len());

    for (lesion_id, voxels) in instances.iter() {
        let metrics = LesionMetrics::measure(voxels, voxel_ml, pet);
        let attribution = match anatomy {
            Some(a) => Attribution::compute(voxels, a, catalog),
            None => Attribution::default(),
        };
        if anatomy.is_some() {
            match attribution.overlaps().first() {
                None => warn!("[{id}] lesion {lesion_id} has no overlap with any organ label"),
                Some(top) if top.percent < DOMINANT_ORGAN_PCT => warn!(
                    "[{id}] lesion {lesion_id} has no single organ covering >{DOMINANT_ORGAN_PCT}% (top={}, {:.2}%)",
                    top.name, top.percent
                ),
                _ => {}
            }
        }

        // 仅在需要时计算质心和解剖标志.
        let clavicle = OnceCell::new();
        let finding = || {
            *clavicle.get_or_init(|| {
                let anatomy = anatomy?;
                let c = centroid(voxels)?;
                landmarks
                    .get_or_init(|| Landmarks::locate(anatomy, catalog))
                    .classify_clavicle(&c)
            })
        };

        let main = attribution.main_organ();
        let position = classify(main.map(|o| o.code), catalog, finding);
        let region = map_region(&attribution, catalog, position.laterality, finding);
        let [organ1, organ2] = attribution.top2();
        debug!(
            "[{id}] lesion {lesion_id}: {} voxel(s), main organ {:?}, region {region}",
            metrics.voxel_count,
            main.map(|o| o.name.as_str())
        );

        records.push(LesionRecord {
            lesion_id,
            volume_ml: metrics.volume_ml,
            suv_max: metrics.suv.max,
            suv_p95: metrics.suv.p95,
            aorta_p95: reference.aorta_p95,
            liver_p95: reference.liver_p95,
            organ1_name: organ1.name,
            organ1_pct: organ1.percent,
            organ2_name: organ2.name,
            organ2_pct: organ2.percent,
            above_diaphragm: position.above_diaphragm,
            laterality: position.laterality,
            lymph_node_region: region,
            deauville_score: None,
            voxel_count: metrics.voxel_count,
            suv_mean: metrics.suv.mean,
        });
    }

    if pet.is_some() && !records.is_empty() && !reference.is_usable() {
        warn!("[{id}] liver or aorta reference uptake unavailable, Deauville scores left empty");
    }
    let p95: Vec<f64> = records.iter().map(|r| r.suv_p95).collect();
    for (r, score) in records.iter_mut().zip(assign_scores(&p95, &reference, pet.is_some())) {
        r.deauville_score = score;
    }

    SubjectAnalysis {
        instances,
        reference,
        records,
    }
}

/// 实例标签图路径, 命名规则同 [`report_path`], 后缀为 `_inst.nii.gz`.
pub fn instance_path(mask: &Path, subject: &str, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(format!("{subject}{}.nii.gz", pattern::INSTANCE_SUFFIX)),
        None => {
            let name = mask.file_name().and_then(|s| s.to_str()).unwrap_or_default();
            mask.with_file_name(format!("{}{}.nii.gz", strip_nifti_ext(name), pattern::INSTANCE_SUFFIX))
        }
    }
}

/// 检查各受试者的输出路径互不相同. 实例标签图与报告同名, 只需检查报告.
fn check_unique_outputs(masks: &[PathBuf], opts: &AnalysisOptions) -> Result<()> {
    let output_dir = opts.output_dir.as_deref();
    let clash = masks
        .iter()
        .map(|m| report_path(m, &subject_id(m, &opts.patterns.mask), output_dir))
        .duplicates()
        .next();
    match clash {
        Some(p) => Err(LesionError::Config(format!(
            "several subjects would write to {}, subject ids must be unique when --output-dir is given",
            p.display()
        ))),
        None => Ok(()),
    }
}

/// 单个受试者处理完成后的结果.
#[derive(Debug)]
pub struct SubjectReport {
    /// 受试者标识.
    pub id: String,

    /// CSV 报告路径.
    pub csv_path: PathBuf,

    /// 实例标签图路径. 未保存时为 `None`.
    pub instance_path: Option<PathBuf>,

    /// 参考摄取.
    pub reference: ReferenceUptake,

    /// 报告行.
    pub records: Vec<LesionRecord>,
}

impl SubjectReport {
    /// 该受试者的文字摘要.
    pub fn summary(&self, top_n: usize) -> Summary<'_> {
        Summary::new(&self.id, &self.records, self.reference, top_n)
    }
}

/// 加载, 分析并写出单个受试者的结果.
pub fn run_subject(paths: &SubjectPaths, catalog: &Catalog, opts: &AnalysisOptions) -> Result<SubjectReport> {
    let id = paths.id.as_str();
    info!("[{id}] processing {}", paths.mask.display());
    let volumes = SubjectVolumes::load(paths)?;
    let analysis = analyze(&volumes, catalog);
    let output_dir = opts.output_dir.as_deref();

    let instance_path = if opts.save_instances && !analysis.instances.is_empty() {
        let p = instance_path(&paths.mask, id, output_dir);
        analysis.instances.save(&p, &volumes.mask)?;
        info!("[{id}] saved instance labels to {}", p.display());
        Some(p)
    } else {
        None
    };

    let csv_path = report_path(&paths.mask, id, output_dir);
    write_csv(&csv_path, &analysis.records)?;
    info!("[{id}] wrote {} row(s) to {}", analysis.records.len(), csv_path.display());

    Ok(SubjectReport {
        id: paths.id.clone(),
        csv_path,
        instance_path,
        reference: analysis.reference,
        records: analysis.records,
    })
}

/// 单个受试者的失败记录.
#[derive(Debug)]
pub struct SubjectFailure {
    /// 受试者标识.
    pub subject: String,

    /// 病灶 mask 路径.
    pub mask: PathBuf,

    /// 错误.
    pub error: LesionError,
}

/// 批处理结果.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// 成功的受试者, 按 mask 路径排序.
    pub reports: Vec<SubjectReport>,

    /// 失败的受试者, 按 mask 路径排序.
    pub failures: Vec<SubjectFailure>,

    /// 因 `fail_fast` 中止而未处理的受试者个数.
    pub skipped: usize,

    /// 是否因 `fail_fast` 而中止.
    pub aborted: bool,
}

#[cfg(feature = "rayon")]
fn map_subjects<T, F>(masks: &[PathBuf], jobs: Option<usize>, op: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&PathBuf) -> T + Sync + Send,
{
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| LesionError::Config(format!("cannot build worker pool: {e}")))?;
    Ok(pool.install(|| masks.par_iter().map(op).collect()))
}

#[cfg(not(feature = "rayon"))]
fn map_subjects<T, F>(masks: &[PathBuf], _jobs: Option<usize>, op: F) -> Result<Vec<T>>
where
    F: Fn(&PathBuf) -> T,
{
    Ok(masks.iter().map(op).collect())
}

/// 发现 `opts.input` 下的所有受试者并逐一处理.
///
/// 单个受试者失败时记录错误并继续; `fail_fast` 时, 首个失败之后尚未开始的受试者被跳过.
/// 只有配置类错误会以 `Err` 返回.
pub fn run_batch(opts: &AnalysisOptions, catalog: &Catalog) -> Result<BatchOutcome> {
    opts.validate()?;
    if let Some(dir) = &opts.output_dir {
        fs::create_dir_all(dir)?;
    }

    let masks = find_masks(&opts.input, &opts.patterns.mask, opts.onedir)?;
    if masks.is_empty() {
        warn!("no lesion masks matching `{}` under {}", opts.patterns.mask, opts.input.display());
        return Ok(BatchOutcome::default());
    }
    check_unique_outputs(&masks, opts)?;
    info!("found {} subject(s) under {}", masks.len(), opts.input.display());

    let abort = AtomicBool::new(false);
    let results = map_subjects(&masks, opts.jobs, |mask| {
        if abort.load(Ordering::Relaxed) {
            return None;
        }
        let result = SubjectPaths::discover(mask, &opts.patterns).and_then(|p| run_subject(&p, catalog, opts));
        if result.is_err() && opts.fail_fast {
            abort.store(true, Ordering::Relaxed);
        }
        Some(result)
    })?;

    let mut outcome = BatchOutcome::default();
    for (mask, result) in masks.into_iter().zip(results) {
        match result {
            Some(Ok(report)) => outcome.reports.push(report),
            Some(Err(e)) => {
                let subject = subject_id(&mask, &opts.patterns.mask);
                error!("[{subject}] {e}");
                outcome.failures.push(SubjectFailure {
                    subject,
                    mask,
                    error: e,
                });
            }
            None => outcome.skipped += 1,
        }
    }
    outcome.aborted = opts.fail_fast && !outcome.failures.is_empty();
    if outcome.aborted {
        warn!("aborted after first failure, {} subject(s) skipped", outcome.skipped);
    }
    Ok(outcome)
}
