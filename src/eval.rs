//! End-to-end scoring run: load, convert, score, time.

use std::time::Instant;

use tracing::info;

use crate::builder::build_ensemble;
use crate::config::{BatchSize, EvalConfig, Layout};
use crate::data::DenseMatrix;
use crate::error::Result;
use crate::inference::Engine;
use crate::io::{load_ensemble, load_features};
use crate::repr::EnsembleStats;

/// Outcome of a scoring run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    pub layout: Layout,
    pub batch_size: BatchSize,
    pub n_instances: usize,
    pub n_features: usize,
    pub ensemble: EnsembleStats,
    /// Wall-clock time spent scoring, in nanoseconds.
    pub elapsed_ns: u64,
    /// Mean scoring time per real instance, in nanoseconds.
    pub ns_per_instance: f64,
    /// Sum of all instance scores. Keeps the scoring loop observable.
    pub checksum: f64,
    #[serde(skip)]
    pub scores: Vec<f32>,
}

/// Run the scoring pipeline described by `config`.
pub fn run(config: &EvalConfig) -> Result<RunReport> {
    let records = load_ensemble(&config.ensemble)?;
    let ensemble = build_ensemble(&records, config.max_leaves)?;
    let stats = ensemble.stats();
    info!(path = %config.ensemble.display(), %stats, "loaded ensemble");

    let features = load_features(&config.instances)?;
    info!(
        path = %config.instances.display(),
        rows = features.num_rows(),
        features = features.num_features(),
        "loaded instances"
    );

    let engine = Engine::new(ensemble, config.layout, config.batch_size)?;
    score(&engine, &features, config.batch_size)
}

/// Score `features` with `engine` and time the scoring loop alone.
pub fn score(engine: &Engine, features: &DenseMatrix, batch_size: BatchSize) -> Result<RunReport> {
    let scorer = engine.scorer()?;
    scorer.check_features(features)?;

    let n_instances = features.num_rows();
    let mut scores = vec![0.0f32; n_instances];

    let start = Instant::now();
    scorer.predict_into(features, &mut scores);
    let elapsed = start.elapsed();

    let elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    let ns_per_instance = if n_instances == 0 {
        0.0
    } else {
        elapsed_ns as f64 / n_instances as f64
    };
    let checksum = scores.iter().map(|&s| f64::from(s)).sum();

    info!(layout = %engine.layout(), n_instances, ns_per_instance, "scored instances");
    Ok(RunReport {
        layout: engine.layout(),
        batch_size,
        n_instances,
        n_features: features.num_features(),
        ensemble: engine.stats(),
        elapsed_ns,
        ns_per_instance,
        checksum,
        scores,
    })
}
