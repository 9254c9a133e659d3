//! Lazy, batch-paginated iteration over a query's ranked hits

use crate::backends::{Hit, Query, SearchBackend};
use crate::Result;
use std::iter::FusedIterator;
use tracing::debug;

/// Forward-only iterator over every hit of a query.
///
/// Pages of `batch_size` hits are fetched on demand at increasing offsets.
/// A page shorter than `batch_size` (empty included) is the last one: its
/// hits are yielded and no further fetch happens. A failed fetch is yielded
/// once as `Err` and ends the iteration.
///
/// There is no rewind. Opening a new pager re-runs the query from offset
/// zero, and the backend may answer differently the second time.
pub struct ResultPager<'a, B: ?Sized> {
    backend: &'a B,
    query: &'a Query,
    batch_size: usize,
    offset: usize,
    page: std::vec::IntoIter<Hit>,
    last_page: bool,
    done: bool,
    pages_fetched: usize,
    total_hits: Option<u64>,
}

impl<'a, B: SearchBackend + ?Sized> ResultPager<'a, B> {
    pub fn open(backend: &'a B, query: &'a Query, batch_size: usize) -> Self {
        Self {
            backend,
            query,
            batch_size,
            offset: 0,
            page: Vec::new().into_iter(),
            last_page: false,
            done: false,
            pages_fetched: 0,
            total_hits: None,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Total hit count reported by the most recent page fetch
    pub fn total_hits(&self) -> Option<u64> {
        self.total_hits
    }

    fn fetch_next_page(&mut self) -> Result<()> {
        let page = self
            .backend
            .fetch_page(self.query, self.batch_size, self.offset)?;
        self.pages_fetched += 1;
        self.total_hits = Some(page.total_hits);
        metrics::counter!("statfacet_pages_fetched_total").increment(1);

        if page.hits.is_empty() || page.hits.len() < self.batch_size {
            debug!(
                offset = self.offset,
                returned = page.hits.len(),
                batch_size = self.batch_size,
                "Short page, end of results"
            );
            self.last_page = true;
        } else {
            self.offset += self.batch_size;
        }
        self.page = page.hits.into_iter();
        Ok(())
    }
}

impl<B: SearchBackend + ?Sized> Iterator for ResultPager<'_, B> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.page.next() {
                return Some(Ok(hit));
            }
            if self.done || self.last_page {
                self.done = true;
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

impl<B: SearchBackend + ?Sized> FusedIterator for ResultPager<'_, B> {}
