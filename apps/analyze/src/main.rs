//! 批量病灶分析程序.
//!
//! 退出码: 配置或器官目录错误为 2; `--fail-fast` 下有受试者失败为 1; 其他情况为 0.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use cli::Cli;
use lesion_berry::pipeline::run_batch;
use utils::loader;

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> lesion_berry::Result<ExitCode> {
    let catalog = loader::catalog(cli.catalog.as_deref())?;
    info!("organ catalog: {} entries", catalog.len());

    let opts = cli.to_options()?;
    info!("{} worker thread(s)", opts.jobs.unwrap_or(1));
    let outcome = run_batch(&opts, &catalog)?;

    if opts.summary {
        for report in &outcome.reports {
            utils::sep();
            print!("{}", report.summary(opts.top_n));
        }
        if !outcome.reports.is_empty() {
            utils::sep();
        }
    }

    info!(
        "done: {} succeeded, {} failed, {} skipped",
        outcome.reports.len(),
        outcome.failures.len(),
        outcome.skipped
    );
    Ok(if outcome.aborted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}
