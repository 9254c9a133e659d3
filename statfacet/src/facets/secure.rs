use super::pager::ResultPager;
use super::{top_labels, FacetCounter, FacetTable};
use crate::backends::{PermissionPredicate, Query, SearchBackend};
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_BATCH_SIZE: usize = 1000;

/// Exact facet counts over every matching document the caller can read.
///
/// Every hit of the query is fetched and permission-checked, so the cost
/// grows with the size of the result set.
pub struct SecureFacets<'a, B: ?Sized, P: ?Sized> {
    backend: &'a B,
    query: &'a Query,
    predicate: &'a P,
    batch_size: usize,
}

impl<'a, B, P> SecureFacets<'a, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    pub fn new(backend: &'a B, query: &'a Query, predicate: &'a P) -> Self {
        Self {
            backend,
            query,
            predicate,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl<B, P> FacetCounter for SecureFacets<'_, B, P>
where
    B: SearchBackend + ?Sized,
    P: PermissionPredicate + ?Sized,
{
    fn get_facets(&self, num_facets: usize) -> Result<FacetTable> {
        if self.batch_size == 0 {
            return Err(Error::Config(
                "facets.batch_size must be greater than zero".to_string(),
            ));
        }

        let mut counts: HashMap<&str, HashMap<String, u64>> = self
            .query
            .facets
            .iter()
            .map(|facet| (facet.as_str(), HashMap::new()))
            .collect();

        let mut checked = 0usize;
        let mut visible = 0usize;
        for hit in ResultPager::open(self.backend, self.query, self.batch_size) {
            let hit = hit?;
            checked += 1;
            if !self.predicate.is_visible(&hit)? {
                continue;
            }
            visible += 1;
            for (facet, labels) in counts.iter_mut() {
                for label in hit.facet_labels(facet) {
                    *labels.entry(label).or_insert(0) += 1;
                }
            }
        }

        debug!(checked, visible, "Secure facet count complete");

        Ok(counts
            .into_iter()
            .map(|(facet, labels)| (facet.to_string(), top_labels(labels, num_facets)))
            .collect())
    }
}
