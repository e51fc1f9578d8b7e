use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vaguestat::{
    execute_stage1, execute_stage2, normalize, NormalizeConfig, RunDate, Stage1Config,
    Stage2Config,
};

#[derive(Parser)]
#[command(name = "vaguestat")]
#[command(author, version, about = "Noun-phrase vagueness annotation statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory of annotation files
    #[arg(long, global = true, default_value = "data/annotations")]
    annotations: PathBuf,

    /// Directory receiving the merged table and every report
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Date stamped into output file names (YYYYMMDD, defaults to today)
    #[arg(long, global = true)]
    date: Option<String>,

    /// Header lines to drop at the top of every annotation file
    #[arg(long, global = true, default_value = "0")]
    header_lines: usize,

    /// Skip rendering the correlation heatmap
    #[arg(long, global = true)]
    no_heatmap: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, compute statistics, then correlations (the default)
    Run,

    /// Merge the annotation files into the dataset table
    Normalize,

    /// Compute percentage reports from an existing dataset table
    Stats {
        /// Dataset table (defaults to dataset_<date>.tsv in the output directory)
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },

    /// Compute correlation reports from an existing dataset table
    Correlate {
        /// Dataset table (defaults to dataset_<date>.tsv in the output directory)
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let date = match &cli.date {
        Some(stamp) => RunDate::parse(stamp)?,
        None => RunDate::today(),
    };
    let default_dataset = date.dataset_path(&cli.output_dir);

    match &cli.command {
        None | Some(Commands::Run) => {
            run_normalize(&cli, &default_dataset)?;
            run_stats(&cli, &default_dataset, &date)?;
            run_correlate(&cli, &default_dataset, &date)?;
            info!("end");
            Ok(())
        }
        Some(Commands::Normalize) => run_normalize(&cli, &default_dataset),
        Some(Commands::Stats { dataset }) => {
            run_stats(&cli, dataset.as_deref().unwrap_or(default_dataset.as_path()), &date)
        }
        Some(Commands::Correlate { dataset }) => {
            run_correlate(&cli, dataset.as_deref().unwrap_or(default_dataset.as_path()), &date)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run_normalize(cli: &Cli, dataset: &Path) -> Result<()> {
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", cli.output_dir))?;

    let config = NormalizeConfig {
        header_lines: cli.header_lines,
        ..Default::default()
    };
    let result = normalize(&cli.annotations, dataset, &config)
        .context("Failed to prepare the dataset")?;

    info!(
        "Stage 0: {} records from {} files ({} lines skipped, {} inconsistent vagueness)",
        result.records.len(),
        result.files_processed,
        result.lines_skipped,
        result.inconsistent_vagueness
    );
    Ok(())
}

fn run_stats(cli: &Cli, dataset: &Path, date: &RunDate) -> Result<()> {
    let config = Stage1Config {
        output_dir: cli.output_dir.clone(),
        ..Default::default()
    };
    let result = execute_stage1(dataset, date, &config).context("Failed to compute statistics")?;
    info!("Stage 1: {} reports written", result.reports.len());
    Ok(())
}

fn run_correlate(cli: &Cli, dataset: &Path, date: &RunDate) -> Result<()> {
    let config = Stage2Config {
        output_dir: cli.output_dir.clone(),
        render_heatmap: !cli.no_heatmap,
    };
    let result =
        execute_stage2(dataset, date, &config).context("Failed to compute correlations")?;
    info!(
        "Stage 2: {} interesting correlations out of {} pairs",
        result.interesting.len(),
        result.ranking.len()
    );
    Ok(())
}
