//! Access-control-aware facet counting
//!
//! Three strategies share the [`FacetCounter`] contract:
//!
//! - [`InsecureFacets`]: raw engine counts, no permission checks
//! - [`SecureFacets`]: exact counts over every visible matching document
//! - [`StatisticalFacets`]: permission-checks a random sample of the matching
//!   documents and rescales the raw counts by the visible fraction
//!
//! [`FacetStrategy`] picks one of them from a [`FacetMode`].

pub mod access;
pub mod insecure;
pub mod pager;
pub mod sampling;
pub mod secure;
pub mod statistical;

pub use access::accessible_count;
pub use insecure::InsecureFacets;
pub use pager::ResultPager;
pub use sampling::{sample, try_sample};
pub use secure::SecureFacets;
pub use statistical::{rescale, StatisticalFacets, Strategy};

use crate::backends::{AggregationSnapshot, PermissionPredicate, Query, SearchBackend};
use crate::config::{FacetMode, SecureFacetConfig};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One facet label and the number of documents carrying it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetValue {
    pub label: String,
    pub count: u64,
}

impl FacetValue {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Facet name -> labels, in the order the producing strategy ranked them
pub type FacetTable = BTreeMap<String, Vec<FacetValue>>;

/// Top `num_facets` labels by descending count, ties broken by label
pub(crate) fn top_labels(counts: HashMap<String, u64>, num_facets: usize) -> Vec<FacetValue> {
    let mut values: Vec<FacetValue> = counts
        .into_iter()
        .map(|(label, count)| FacetValue::new(label, count))
        .collect();
    values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    values.truncate(num_facets);
    values
}

/// Anything that can produce the top `num_facets` labels per facet
pub trait FacetCounter {
    fn get_facets(&self, num_facets: usize) -> Result<FacetTable>;
}

/// The facet counting strategy selected for one query
pub enum FacetStrategy<'a, B: ?Sized, P: ?Sized> {
    Secure(SecureFacets<'a, B, P>),
    Statistical(StatisticalFacets<'a, B, P>),
    Insecure(InsecureFacets<'a, B>),
}

impl<'a, B, P> FacetStrategy<'a, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    /// Build the strategy named by `config.mode` for `query`.
    ///
    /// Fails with `Error::Config` when `config` does not validate.
    pub fn for_query(
        backend: &'a B,
        query: &'a Query,
        predicate: &'a P,
        config: &SecureFacetConfig,
        snapshot: Option<&'a AggregationSnapshot>,
    ) -> Result<Self> {
        config.validate()?;
        let strategy = match config.mode {
            FacetMode::Secure => FacetStrategy::Secure(
                SecureFacets::new(backend, query, predicate).with_batch_size(config.batch_size),
            ),
            FacetMode::Statistical => FacetStrategy::Statistical(
                StatisticalFacets::new(backend, query, predicate, config.clone())
                    .with_snapshot(snapshot),
            ),
            FacetMode::Insecure => {
                FacetStrategy::Insecure(InsecureFacets::new(backend, query).with_snapshot(snapshot))
            }
        };
        Ok(strategy)
    }

    pub fn mode(&self) -> FacetMode {
        match self {
            FacetStrategy::Secure(_) => FacetMode::Secure,
            FacetStrategy::Statistical(_) => FacetMode::Statistical,
            FacetStrategy::Insecure(_) => FacetMode::Insecure,
        }
    }
}

impl<B, P> FacetCounter for FacetStrategy<'_, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    fn get_facets(&self, num_facets: usize) -> Result<FacetTable> {
        match self {
            FacetStrategy::Secure(counter) => counter.get_facets(num_facets),
            FacetStrategy::Statistical(counter) => counter.get_facets(num_facets),
            FacetStrategy::Insecure(counter) => counter.get_facets(num_facets),
        }
    }
}
