//! Parallel rendering of independent documents.

use crate::options::RenderOptions;
use crate::pipeline::{CancellationToken, RenderPipeline, RenderedDocument};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    /// Document identifier (typically the file path).
    pub id: String,
    /// Raw document text.
    pub source: String,
}

/// Result for a single document in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Document identifier matching the input.
    pub id: String,
    /// Rendered document (present on success).
    pub result: Option<RenderedDocument>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of documents processed.
    pub total: u32,
    /// Number of documents rendered.
    pub succeeded: u32,
    /// Number of failed renders.
    pub failed: u32,
    /// Wall-clock time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Maximum number of threads. Defaults to the global rayon pool.
    pub max_threads: Option<usize>,
    /// Keep rendering after a failure. Defaults to true.
    pub continue_on_error: Option<bool>,
}

/// All results of a batch, in input order, plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// One result per processed input.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Renders every input with the same options.
///
/// Documents share the configured pipeline but nothing else, so they are
/// rendered in parallel. Without `continue_on_error`, documents are rendered
/// one at a time and processing stops after the first failure.
pub fn render_batch(
    inputs: Vec<BatchInput>,
    options: &RenderOptions,
    batch_options: &BatchOptions,
) -> BatchOutcome {
    let start = Instant::now();
    let continue_on_error = batch_options.continue_on_error.unwrap_or(true);

    let pool = batch_options.max_threads.and_then(|threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let pipeline = RenderPipeline::new(options);
    let token = CancellationToken::new();
    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match pipeline.render(&input.source, &token) {
            Ok(result) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(result),
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::warn!("Failed to render '{}': {}", input.id, err);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match &pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let had_error = result.error.is_some();
            results.push(result);
            if had_error {
                break;
            }
        }
        results
    };

    BatchOutcome {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, source: &str) -> BatchInput {
        BatchInput {
            id: id.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn renders_in_input_order() {
        let inputs = (0..20)
            .map(|i| input(&format!("doc-{i}.md"), &format!("# Doc {i}")))
            .collect();
        let outcome = render_batch(inputs, &RenderOptions::default(), &BatchOptions::default());

        assert_eq!(outcome.stats.total, 20);
        assert_eq!(outcome.stats.succeeded, 20);
        assert_eq!(outcome.stats.failed, 0);
        for (i, result) in outcome.results.iter().enumerate() {
            assert_eq!(result.id, format!("doc-{i}.md"));
            let html = &result.result.as_ref().unwrap().html;
            assert!(html.starts_with(&format!("<h1 id=\"doc-{i}\">Doc {i}")));
        }
    }

    #[test]
    fn bounded_pool_matches_sequential_output() {
        let inputs = vec![input("a.md", "==hi=="), input("b.md", "H~2~O")];
        let options = BatchOptions {
            max_threads: Some(2),
            continue_on_error: Some(true),
        };
        let outcome = render_batch(inputs, &RenderOptions::default(), &options);
        let html: Vec<_> = outcome
            .results
            .iter()
            .map(|r| r.result.as_ref().unwrap().html.as_str())
            .collect();
        assert_eq!(html, vec!["<p><mark>hi</mark></p>", "<p>H<sub>2</sub>O</p>"]);
    }
}
