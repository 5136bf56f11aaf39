//! Command-line driver: load an ensemble and instances, score, report latency.
//!
//! ```text
//! flatforest --ensemble model.txt --instances test.svm --max-leaves 64 [--layout flat] [--print]
//! flatforest -ensemble model.txt -instances test.svm -maxLeaves 64 -print
//! ```

use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flatforest::config::{BatchSize, EvalConfig, Layout};
use flatforest::eval::{self, RunReport};

/// Score instances against a tree ensemble and report per-instance latency.
#[derive(Debug, Parser)]
#[command(name = "flatforest", version, about)]
struct Args {
    /// Ensemble description file
    #[arg(long)]
    ensemble: PathBuf,

    /// SVM-light style instance file
    #[arg(long)]
    instances: PathBuf,

    /// Per-tree node capacity is twice this value
    #[arg(long = "max-leaves", alias = "maxLeaves")]
    max_leaves: usize,

    /// Representation used for scoring
    #[arg(long, value_enum, default_value_t = Layout::default())]
    layout: Layout,

    /// Rows per batch for the flat layout (1, 4, 8, 16 or 32)
    #[arg(long = "batch-size", alias = "batchSize", default_value_t = BatchSize::default())]
    batch_size: BatchSize,

    /// Print every instance's score
    #[arg(long)]
    print: bool,

    /// Emit the run report as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `debug` or `flatforest=trace` (overrides RUST_LOG)
    #[arg(long = "log-level")]
    log_level: Option<String>,
}

/// Rewrite single-dash long flags (`-maxLeaves`) to `--maxLeaves`.
///
/// Short flags (`-h`) and negative numbers are left alone.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            let long_single_dash = idx > 0
                && arg.to_str().is_some_and(|s| {
                    let mut chars = s.chars();
                    chars.next() == Some('-')
                        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                        && chars.next().is_some()
                });
            if long_single_dash {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn print_report(report: &RunReport, print_scores: bool, json: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if print_scores {
        for score in &report.scores {
            writeln!(out, "{score:.6}")?;
        }
    }

    if json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Time per instance (ns): {:.3}", report.ns_per_instance)?;
        writeln!(out, "Checksum: {:.6}", report.checksum)?;
    }

    out.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_tracing(args.log_level.as_deref());

    let config = EvalConfig::builder()
        .ensemble(args.ensemble)
        .instances(args.instances)
        .max_leaves(args.max_leaves)
        .layout(args.layout)
        .batch_size(args.batch_size)
        .print_scores(args.print)
        .build()?;

    let report = eval::run(&config).with_context(|| {
        format!(
            "scoring {} against {}",
            config.instances.display(),
            config.ensemble.display()
        )
    })?;

    print_report(&report, config.print_scores, args.json)
}
