use super::{FacetCounter, FacetTable};
use crate::backends::{AggregationSnapshot, Query, SearchBackend};
use crate::Result;

/// Raw engine facet counts, with no access control applied.
///
/// Also the source of candidate labels for [`super::StatisticalFacets`].
pub struct InsecureFacets<'a, B: ?Sized> {
    backend: &'a B,
    query: &'a Query,
    snapshot: Option<&'a AggregationSnapshot>,
}

impl<'a, B: SearchBackend + ?Sized> InsecureFacets<'a, B> {
    pub fn new(backend: &'a B, query: &'a Query) -> Self {
        Self {
            backend,
            query,
            snapshot: None,
        }
    }

    /// Reuse aggregations from an earlier execution of the same query
    pub fn with_snapshot(mut self, snapshot: Option<&'a AggregationSnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }
}

impl<B: SearchBackend + ?Sized> FacetCounter for InsecureFacets<'_, B> {
    fn get_facets(&self, num_facets: usize) -> Result<FacetTable> {
        match self.snapshot {
            Some(snapshot) if snapshot.covers(num_facets) => Ok(snapshot.facets(num_facets)),
            _ => self.backend.aggregate(self.query, num_facets),
        }
    }
}
