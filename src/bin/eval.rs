//! Evaluation CLI: score a JSON dataset of ranked predictions and report APK@K and MAPK@K.

use clap::Parser;
use rankmetrics::{eval::EvalDataset, Config};
use std::path::PathBuf;

/// Evaluation framework: score predictions and report metrics.
#[derive(Parser, Debug)]
#[command(name = "eval")]
struct Args {
    /// Path to eval dataset JSON (default: eval_dataset.json).
    #[arg(long, default_value = "eval_dataset.json")]
    dataset: PathBuf,

    /// Cutoff K (overrides eval.k from config).
    #[arg(long)]
    k: Option<usize>,

    /// Minimum MAPK to pass (overrides eval.threshold from config).
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    // The logger's default level comes from the config, so anything Config::load logs is dropped.
    let config = Config::load()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.eval.log_level.as_str()),
    )
    .init();

    let config = config.with_overrides(args.k, args.threshold)?;
    let k = config.eval.k;
    let threshold = config.eval.threshold;
    log::debug!("Effective config: k={}, threshold={}", k, threshold);

    let dataset = EvalDataset::load(&args.dataset)
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", args.dataset.display(), e))?;
    if dataset.instances.is_empty() {
        log::warn!("No instances in {}", args.dataset.display());
    }

    let report = dataset.evaluate(k)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Running evaluation on {} instances (K={})\n", report.instances.len(), k);
        for inst in &report.instances {
            match inst.weighted_apk {
                Some(w) => println!("  {} (APK@{}: {:.4}, weighted: {:.4})", inst.id, k, inst.apk, w),
                None => println!("  {} (APK@{}: {:.4})", inst.id, k, inst.apk),
            }
        }
        println!("\n=== Evaluation Results ===");
        println!("MAPK@{}: {:.4}", k, report.mapk);
    }

    if report.passes(threshold) {
        println!("\nMAPK passes (>= {:.2}).", threshold);
        std::process::exit(0);
    } else {
        println!("\nMAPK below threshold (>= {:.2}).", threshold);
        std::process::exit(1);
    }
}
