use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::acquaintances::count_acquaintances_parallel;
use crate::config::RunSettings;
use crate::ingest::{ingest_source, Ingested, SourceError};
use crate::maximum::{max_acquaintances, MaxResult};
use crate::persons::IngestStats;

/// result of running the whole pipeline over one source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReport {
    pub source: PathBuf,
    pub max: MaxResult,
    pub stats: IngestStats,
    /// persons in the friend graph
    pub persons: usize,
    pub elapsed: Duration,
}

pub type SourceOutcome = Result<SourceReport, SourceError>;

/// ingest, freeze, aggregate and reduce one source
pub async fn run_source(path: &Path, settings: &RunSettings) -> SourceOutcome {
    let start = Instant::now();

    let Ingested { graph, stats } = ingest_source(path, settings).await?;
    let persons = graph.len();
    let graph = Arc::new(graph);

    let counts = count_acquaintances_parallel(graph, settings.workers)
        .await
        .map_err(|e| SourceError::worker(path, e))?;
    let max = max_acquaintances(&counts);

    Ok(SourceReport {
        source: path.to_path_buf(),
        max,
        stats,
        persons,
        elapsed: start.elapsed(),
    })
}

/// Run every source in turn. A failed source is logged and reported, and the
/// batch carries on with the next one.
pub async fn run_batch(paths: &[PathBuf], settings: &RunSettings) -> Vec<SourceOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        let outcome = run_source(path, settings).await;
        match &outcome {
            Ok(report) => {
                let stats = &report.stats;
                if stats.skipped() > 0 {
                    tracing::warn!(
                        "{}: skipped {} malformed records and {} self calls",
                        path.display(),
                        stats.malformed,
                        stats.self_calls
                    );
                }
                tracing::info!(
                    "{}: max {} held by {} of {} persons ({} records, {} duplicates) in {:?}",
                    path.display(),
                    report.max.count,
                    report.max.persons.len(),
                    report.persons,
                    stats.records,
                    stats.duplicates,
                    report.elapsed
                );
            }
            Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
        }
        outcomes.push(outcome);
    }
    outcomes
}
