// THEORY:
// The signature core is synchronous and single-threaded on purpose; scaling it
// over a collection is the caller's job. `BatchProcessor` is that caller for the
// two batch jobs a deduplication tool runs:
//
// 1.  **Generation**: decode and fingerprint many files. Decoding and resampling
//     are CPU-bound, so every file runs on tokio's blocking pool, with at most
//     `workers` in flight. Results keep the input order, and a file that fails
//     only fails its own entry.
// 2.  **Duplicate search**: compare every pair of icons. Icons are immutable after
//     generation, so workers share one `Arc<Vec<Icon>>` without locking. Rows
//     are dealt out round-robin so early (longer) rows spread across workers.

use crate::core_modules::icon::Icon;
use crate::error::SignatureError;
use crate::pipeline::{PipelineConfig, SignaturePipeline};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// One generated icon, or the reason there is none.
#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    pub icon: Result<Icon, SignatureError>,
}

pub struct BatchProcessor {
    pipeline: Arc<SignaturePipeline>,
    workers: usize,
}

impl BatchProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: Arc::new(SignaturePipeline::new(config)),
            workers: num_cpus::get().max(1),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Generates icons for all `paths`, in order.
    pub async fn generate(&self, paths: Vec<PathBuf>) -> Vec<BatchEntry> {
        let total = paths.len();
        let entries: Vec<BatchEntry> = stream::iter(paths)
            .map(|path| {
                let pipeline = Arc::clone(&self.pipeline);
                async move {
                    let task_path = path.clone();
                    let icon = tokio::task::spawn_blocking(move || pipeline.icon_for_path(&task_path))
                        .await
                        .unwrap_or_else(|join_error| Err(SignatureError::Worker(join_error)));
                    if let Err(error) = &icon {
                        warn!(path = %path.display(), %error, "icon generation failed");
                    }
                    BatchEntry { path, icon }
                }
            })
            .buffered(self.workers)
            .collect()
            .await;

        let failed = entries.iter().filter(|entry| entry.icon.is_err()).count();
        info!(total, failed, workers = self.workers, "icon batch finished");
        entries
    }

    /// All index pairs `(i, j)`, `i < j`, judged similar under the configured
    /// policy. Empty icons are skipped. Pairs come back sorted.
    pub async fn find_duplicates(&self, icons: Arc<Vec<Icon>>) -> Result<Vec<(usize, usize)>, SignatureError> {
        let count = icons.len();
        let workers = self.workers.min(count.max(1));

        let tasks = (0..workers).map(|worker| {
            let icons = Arc::clone(&icons);
            let pipeline = Arc::clone(&self.pipeline);
            tokio::task::spawn_blocking(move || {
                let mut pairs = Vec::new();
                for i in (worker..icons.len()).step_by(workers) {
                    if icons[i].is_empty() {
                        continue;
                    }
                    for j in i + 1..icons.len() {
                        if !icons[j].is_empty() && pipeline.is_similar(&icons[i], &icons[j]) {
                            pairs.push((i, j));
                        }
                    }
                }
                pairs
            })
        });

        let mut pairs: Vec<(usize, usize)> = futures::future::try_join_all(tasks).await?.into_iter().flatten().collect();
        pairs.sort_unstable();

        info!(icons = count, pairs = pairs.len(), "duplicate search finished");
        Ok(pairs)
    }
}
