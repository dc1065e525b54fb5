use anyhow::Context;
use clap::Parser;
use imaging_reconciler::{
    read_config, DicomHeaderReader, FileEventLog, FsTreeCopier, Reconciler,
};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Imaging Reconciler - organise imaging studies into per-patient records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration: roots, log file and the cancer type -> roster mapping
    #[arg(short, long, env = "IMAGING_RECONCILER_CONFIG")]
    config: PathBuf,

    /// Override the configured source root
    #[arg(long)]
    source_root: Option<PathBuf>,

    /// Override the configured destination root
    #[arg(long)]
    destination_root: Option<PathBuf>,

    /// Override the configured log file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = read_config(&args.config)
        .with_context(|| format!("Failed to read config {}", args.config.display()))?;
    if let Some(source_root) = args.source_root {
        config.source_root = source_root;
    }
    if let Some(destination_root) = args.destination_root {
        config.destination_root = destination_root;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = log_file;
    }

    let log = FileEventLog::create(&config.log_file)
        .with_context(|| format!("Failed to create log {}", config.log_file.display()))?;

    info!(
        "Reconciling {} into {}",
        config.source_root.display(),
        config.destination_root.display()
    );

    let reader = DicomHeaderReader::new();
    let copier = FsTreeCopier::new();
    let summary = Reconciler::new(&reader, &copier, &log).reconcile_all(&config);

    for (cancer_type, counts) in &summary.completed {
        info!("{}: {:?}", cancer_type, counts);
    }
    for (cancer_type, cause) in &summary.aborted {
        warn!("{} aborted: {}", cancer_type, cause);
    }
    info!("Entire execution time: {:.3} seconds", summary.elapsed.as_secs_f64());

    Ok(())
}
