//! Facet counts extrapolated from a permission-checked sample
//!
//! Raw engine counts over-report what a restricted caller can see. Instead
//! of checking every matching document, a fixed-size uniform sample of the
//! result set is checked and each raw count is scaled by the fraction of
//! the sample that turned out visible. Result sets smaller than the sample
//! are counted exactly instead.

use super::access::accessible_count;
use super::insecure::InsecureFacets;
use super::pager::ResultPager;
use super::sampling::try_sample;
use super::secure::SecureFacets;
use super::{FacetCounter, FacetTable, FacetValue};
use crate::backends::{AggregationSnapshot, PermissionPredicate, Query, SearchBackend};
use crate::config::SecureFacetConfig;
use crate::telemetry::{log_estimation, EstimationMetrics, FacetTelemetry};
use crate::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How a given result set gets counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fewer hits than the sample size: check every document
    Exact,
    /// Permission-check a sample and rescale the raw counts
    Sampled,
}

impl Strategy {
    pub fn choose(total_hits: u64, sample_size: usize) -> Self {
        if total_hits < sample_size as u64 {
            Strategy::Exact
        } else {
            Strategy::Sampled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Sampled => "sampled",
        }
    }
}

/// Scale `values` by `accessible / sample_size`, truncating.
///
/// When the whole sample was visible the list is returned untouched. If
/// scaling produced any zero, every zero entry is dropped and the rest keep
/// their order; otherwise the scaled list is returned in full.
pub fn rescale(values: Vec<FacetValue>, sample_size: usize, accessible: u64) -> Vec<FacetValue> {
    let sample_size = sample_size as u64;
    if sample_size == 0 || accessible >= sample_size {
        return values;
    }

    let proportioned: Vec<(FacetValue, bool)> = values
        .into_iter()
        .map(|value| {
            let count =
                (u128::from(value.count) * u128::from(accessible) / u128::from(sample_size)) as u64;
            (FacetValue::new(value.label, count), count == 0)
        })
        .collect();

    let has_zeros = proportioned.iter().any(|(_, is_zero)| *is_zero);
    proportioned
        .into_iter()
        .filter(|(_, is_zero)| !(has_zeros && *is_zero))
        .map(|(value, _)| value)
        .collect()
}

/// Statistical, access-control-aware facet counter
pub struct StatisticalFacets<'a, B: ?Sized, P: ?Sized> {
    backend: &'a B,
    query: &'a Query,
    predicate: &'a P,
    config: SecureFacetConfig,
    snapshot: Option<&'a AggregationSnapshot>,
}

impl<'a, B, P> StatisticalFacets<'a, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    pub fn new(backend: &'a B, query: &'a Query, predicate: &'a P, config: SecureFacetConfig) -> Self {
        Self {
            backend,
            query,
            predicate,
            config,
            snapshot: None,
        }
    }

    /// Reuse aggregations from an earlier execution of the same query
    pub fn with_snapshot(mut self, snapshot: Option<&'a AggregationSnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Candidate facets and total hit count, from the snapshot when it holds
    /// enough labels, otherwise from the backend
    fn candidates(&self, num_facets: usize) -> Result<(FacetTable, u64)> {
        if let Some(snapshot) = self.snapshot.filter(|s| s.covers(num_facets)) {
            return Ok((snapshot.facets(num_facets), snapshot.total_documents));
        }

        warn!(
            query = %self.query.query_string,
            "Facets and total hit count are being retrieved from the search backend"
        );
        let candidates = InsecureFacets::new(self.backend, self.query).get_facets(num_facets)?;
        let page = self
            .backend
            .fetch_page(self.query, self.config.batch_size, 0)?;
        Ok((candidates, page.total_hits))
    }

    /// Permission-check a sample of the result set.
    ///
    /// Returns `(sampled, accessible)`.
    fn check_sample(&self, total_hits: u64) -> Result<(usize, u64)> {
        let sample_size = self.config.sample_size;
        let pager = ResultPager::open(self.backend, self.query, self.config.batch_size);

        if (sample_size as u64) < total_hits {
            debug!(sample_size, total_hits, "Sampling matching documents");
            let population = usize::try_from(total_hits).unwrap_or(usize::MAX);
            let mut rng = StdRng::seed_from_u64(self.config.random_seed);
            let sample = try_sample(pager, population, sample_size, &mut rng)?;
            let sampled = sample.len();
            let accessible = accessible_count(sample.into_iter().map(Ok), self.predicate)?;
            Ok((sampled, accessible))
        } else {
            debug!(sample_size, total_hits, "Sample covers every hit, checking all");
            let mut sampled = 0usize;
            let accessible = accessible_count(pager.inspect(|_| sampled += 1), self.predicate)?;
            Ok((sampled, accessible))
        }
    }
}

impl<B, P> FacetCounter for StatisticalFacets<'_, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    fn get_facets(&self, num_facets: usize) -> Result<FacetTable> {
        self.config.validate()?;
        let sample_size = self.config.sample_size;
        let mut telemetry = FacetTelemetry::new();

        let (candidates, total_hits) = self.candidates(num_facets)?;
        telemetry.mark_stage("candidates");

        let strategy = Strategy::choose(total_hits, sample_size);
        let mut metrics = EstimationMetrics::new(strategy, total_hits, sample_size);

        let facets = match strategy {
            Strategy::Exact => {
                debug!(
                    sample_size,
                    total_hits, "Sample size exceeds hit count, counting facets exactly"
                );
                SecureFacets::new(self.backend, self.query, self.predicate)
                    .with_batch_size(self.config.batch_size)
                    .get_facets(num_facets)?
            }
            Strategy::Sampled => {
                let (sampled, accessible) = self.check_sample(total_hits)?;
                telemetry.mark_stage("sampling");
                metrics.sampled = sampled;
                metrics.accessible = accessible;

                candidates
                    .into_iter()
                    .map(|(facet, values)| (facet, rescale(values, sample_size, accessible)))
                    .collect()
            }
        };

        metrics.facet_count = facets.len();
        log_estimation(&telemetry.finish(metrics));
        Ok(facets)
    }
}
