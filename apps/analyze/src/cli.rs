use std::path::PathBuf;

use clap::Parser;
use lesion_berry::consts::pattern;
use lesion_berry::pipeline::AnalysisOptions;
use lesion_berry::subject::FilePatterns;
use lesion_berry::LesionError;
use utils::loader;

/// `analyze-lesions` 命令行参数.
#[derive(Parser, Debug)]
#[command(name = "analyze-lesions")]
#[command(about = "Per-lesion characterization of PET/MR lesion masks")]
#[command(version)]
pub struct Cli {
    /// 输入根目录. 缺省为 `$LESION_DATA_DIR` 或 `$HOME/dataset/lesions`.
    #[arg(short, long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// 病灶 mask 文件名匹配子串.
    #[arg(long, default_value = pattern::LESION_MASK)]
    pub pattern: String,

    /// 解剖标签图文件名匹配子串.
    #[arg(long, default_value = pattern::ANATOMY)]
    pub anat_pattern: String,

    /// PET 文件名匹配子串.
    #[arg(long, default_value = pattern::PET)]
    pub pet_pattern: String,

    /// 只查找输入目录本身, 不进入子目录.
    #[arg(long)]
    pub onedir: bool,

    /// 保存 26 连通的实例标签图, 与报告放在一起.
    #[arg(long, alias = "save")]
    pub save_instances: bool,

    /// 为每个受试者打印文字摘要.
    #[arg(long)]
    pub summary: bool,

    /// 摘要中按体积列出的病灶个数.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// 器官目录 JSON 文件. 缺省使用内置目录.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// 输出目录. 缺省时报告与实例标签图写在各 mask 旁边, 给定时以受试者标识命名.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// 并行线程数. 缺省为可用核心数.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// 首个受试者失败后中止批处理.
    #[arg(long)]
    pub fail_fast: bool,

    /// 输出调试日志.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 构造分析选项. 未给定输入目录时使用环境变量或默认数据目录.
    pub fn to_options(&self) -> Result<AnalysisOptions, LesionError> {
        let input = self
            .input
            .clone()
            .or_else(loader::data_dir_from_env_or_home)
            .ok_or_else(|| LesionError::Config("no input directory given and $HOME is unknown".to_string()))?;
        Ok(AnalysisOptions {
            input,
            patterns: FilePatterns {
                mask: self.pattern.clone(),
                anatomy: self.anat_pattern.clone(),
                pet: self.pet_pattern.clone(),
            },
            onedir: self.onedir,
            save_instances: self.save_instances,
            output_dir: self.output_dir.clone(),
            summary: self.summary,
            top_n: self.top,
            jobs: Some(self.jobs.unwrap_or_else(utils::cpus)),
            fail_fast: self.fail_fast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["analyze-lesions", "-i", "/data"]).unwrap();
        let opts = cli.to_options().unwrap();
        assert_eq!(opts.input, PathBuf::from("/data"));
        assert_eq!(opts.patterns, FilePatterns::default());
        assert_eq!(opts.top_n, 5);
        assert!(opts.jobs.is_some_and(|n| n >= 1));
        assert!(!opts.save_instances && !opts.summary && !opts.fail_fast && !opts.onedir);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "analyze-lesions",
            "-i",
            "/data",
            "--pattern",
            "LYM_label.nii.gz",
            "--onedir",
            "--save",
            "--summary",
            "--top",
            "3",
            "--jobs",
            "2",
            "--fail-fast",
            "--output-dir",
            "/out",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let opts = cli.to_options().unwrap();
        assert_eq!(opts.patterns.mask, "LYM_label.nii.gz");
        assert!(opts.onedir && opts.save_instances && opts.summary && opts.fail_fast);
        assert_eq!(opts.top_n, 3);
        assert_eq!(opts.jobs, Some(2));
        assert_eq!(opts.output_dir, Some(PathBuf::from("/out")));
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["analyze-lesions", "--bogus"]).is_err());
    }
}
