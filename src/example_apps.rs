use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::DatasetConfig;
use crate::metrics::task_skew;
use crate::prompts::PromptTable;
use crate::registry::{DatasetFamily, load_dataset};
use crate::splits::SplitLabel;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FamilyArg {
    E5,
    Wiki1m,
}

impl From<FamilyArg> for DatasetFamily {
    fn from(value: FamilyArg) -> Self {
        match value {
            FamilyArg::E5 => DatasetFamily::E5,
            FamilyArg::Wiki1m => DatasetFamily::Wiki1M,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitArg {
    Train,
    Validation,
    Test,
}

impl From<SplitArg> for SplitLabel {
    fn from(value: SplitArg) -> Self {
        match value {
            SplitArg::Train => SplitLabel::Train,
            SplitArg::Validation => SplitLabel::Validation,
            SplitArg::Test => SplitLabel::Test,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "plan_summary",
    disable_help_subcommand = true,
    about = "Plan task-homogeneous batches and summarize them",
    long_about = "Load a multi-task corpus, plan one epoch of task-homogeneous batches, and print per-task batch counts plus the leading batch sequence."
)]
/// CLI for `plan_summary`.
///
/// Common usage:
/// - E5 directory of `<task>.jsonl` files: `--family e5 --path data/echo-data`
/// - Wiki1M sentence file: `--family wiki1m --path data/wiki1m_for_simcse.txt`
/// - Custom instruction table: `--prompts prompts.json`
struct PlanSummaryCli {
    #[arg(long, value_enum, default_value = "e5", help = "Dataset family to load")]
    family: FamilyArg,
    #[arg(long, value_name = "PATH", help = "Corpus directory (E5) or text file (Wiki1M)")]
    path: PathBuf,
    #[arg(long, value_enum, help = "Split to construct the dataset for")]
    split: Option<SplitArg>,
    #[arg(
        long = "batch-size",
        default_value_t = 32,
        value_parser = parse_positive_usize,
        help = "Samples per task-homogeneous batch"
    )]
    batch_size: usize,
    #[arg(long, help = "Optional deterministic seed override")]
    seed: Option<u64>,
    #[arg(
        long = "no-shuffle-within-task",
        help = "Keep each task's input order inside batches"
    )]
    no_shuffle_within_task: bool,
    #[arg(long, help = "Separator token injected before raw text")]
    separator: Option<String>,
    #[arg(
        long,
        value_name = "JSON",
        help = "Prompt table JSON replacing the built-in instruction set"
    )]
    prompts: Option<PathBuf>,
    #[arg(
        long = "show-batches",
        default_value_t = 10,
        help = "Number of leading batches to list"
    )]
    show_batches: usize,
}

/// Parse `plan_summary` arguments, build the dataset, and print its batch plan.
pub fn run_plan_summary<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<PlanSummaryCli, _>(std::iter::once("plan_summary".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = DatasetConfig::default()
        .with_batch_size(cli.batch_size)
        .with_shuffle_within_task(!cli.no_shuffle_within_task);
    if let Some(split) = cli.split {
        config = config.with_split(split.into());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(separator) = cli.separator {
        config = config.with_separator(separator);
    }
    if let Some(prompts) = cli.prompts {
        config = config.with_prompts(PromptTable::from_json_path(prompts)?);
    }

    let family: DatasetFamily = cli.family.into();
    let dataset = load_dataset(family, &cli.path, config)?;
    let order = dataset.epoch_order();

    println!("=== {} ({} split) ===", family, dataset.split());
    println!(
        "samples: {}  batches: {}  batch size: {}  fingerprint: {:016x}",
        dataset.len(),
        dataset.batch_count(),
        dataset.batch_size(),
        order.fingerprint()
    );
    println!();
    println!("{:<28} {:>10} {:>9} {:>8}", "task", "available", "batches", "dropped");
    for stats in order.stats() {
        println!(
            "{:<28} {:>10} {:>9} {:>8}",
            stats.task, stats.available, stats.batches, stats.dropped
        );
    }
    if let Some(skew) = task_skew(order) {
        println!();
        println!(
            "batch skew: min={} max={} mean={:.2} max_share={:.3} ratio={:.2}",
            skew.min, skew.max, skew.mean, skew.max_share, skew.ratio
        );
    }

    let shown = cli.show_batches.min(dataset.batch_count());
    if shown > 0 {
        println!();
        println!("first {shown} batches:");
        for batch_idx in 0..shown {
            let task = dataset.batch_task(batch_idx).unwrap_or("?");
            println!("  #{batch_idx:<5} {task}");
        }
    }
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("a batch needs at least one sample".to_string()),
        Ok(value) => Ok(value),
        Err(_) => Err(format!("'{raw}' is not a whole number of samples per batch")),
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    let err = match T::try_parse_from(args) {
        Ok(cli) => return Ok(Some(cli)),
        Err(err) => err,
    };
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        err.print()?;
        return Ok(None);
    }
    Err(err.into())
}
