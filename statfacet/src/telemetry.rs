//! Facet estimation telemetry

use crate::facets::Strategy;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collected during one facet estimation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationMetrics {
    pub strategy: Strategy,
    pub total_hits: u64,
    pub sample_size: usize,
    /// Hits actually drawn into the sample
    pub sampled: usize,
    pub accessible: u64,
    pub facet_count: usize,
    pub candidates_ms: f64,
    pub sampling_ms: f64,
    pub total_ms: f64,
}

impl EstimationMetrics {
    pub fn new(strategy: Strategy, total_hits: u64, sample_size: usize) -> Self {
        Self {
            strategy,
            total_hits,
            sample_size,
            sampled: 0,
            accessible: 0,
            facet_count: 0,
            candidates_ms: 0.0,
            sampling_ms: 0.0,
            total_ms: 0.0,
        }
    }

    /// Size of the drawn sample, only when a sample was drawn
    pub fn sampled_documents(&self) -> Option<usize> {
        match self.strategy {
            Strategy::Sampled => Some(self.sampled),
            Strategy::Exact => None,
        }
    }

    /// Whether the backend delivered fewer hits than the sample asked for
    pub fn is_short_sample(&self) -> bool {
        let expected = (self.sample_size as u64).min(self.total_hits);
        self.sampled_documents()
            .is_some_and(|sampled| (sampled as u64) < expected)
    }
}

/// Helper for tracking estimation stages
pub struct FacetTelemetry {
    start: Instant,
    last_mark: Instant,
    stages: Vec<(String, f64)>,
}

impl FacetTelemetry {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_mark: now,
            stages: Vec::new(),
        }
    }

    /// Mark the completion of a stage and record its duration
    pub fn mark_stage(&mut self, stage_name: &str) {
        let now = Instant::now();
        let duration_ms = (now - self.last_mark).as_secs_f64() * 1000.0;
        self.stages.push((stage_name.to_string(), duration_ms));
        self.last_mark = now;
    }

    pub fn stage_duration(&self, stage_name: &str) -> f64 {
        self.stages
            .iter()
            .find(|(name, _)| name == stage_name)
            .map(|(_, duration)| *duration)
            .unwrap_or(0.0)
    }

    /// Finish telemetry, filling in stage timings on `metrics`
    pub fn finish(self, mut metrics: EstimationMetrics) -> EstimationMetrics {
        metrics.candidates_ms = self.stage_duration("candidates");
        metrics.sampling_ms = self.stage_duration("sampling");
        metrics.total_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        metrics
    }
}

impl Default for FacetTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_estimation(estimation: &EstimationMetrics) {
    metrics::counter!("statfacet_estimations_total", "strategy" => estimation.strategy.as_str())
        .increment(1);
    if let Some(sampled) = estimation.sampled_documents() {
        metrics::histogram!("statfacet_sampled_documents").record(sampled as f64);
    }

    info!(
        strategy = estimation.strategy.as_str(),
        total_hits = estimation.total_hits,
        sample_size = estimation.sample_size,
        sampled = estimation.sampled,
        accessible = estimation.accessible,
        facet_count = estimation.facet_count,
        total_ms = estimation.total_ms,
        "Facets estimated"
    );

    // The backend reported more hits than it could page through
    if estimation.is_short_sample() {
        debug!(
            sampled = estimation.sampled,
            sample_size = estimation.sample_size,
            total_hits = estimation.total_hits,
            "Sample smaller than requested, counts may be biased low"
        );
    }
}
