//! In-memory search backend
//!
//! Holds documents in insertion order and answers paged queries and raw
//! facet aggregations over them. Used by the CLI and by tests that need a
//! real backend behind the facet strategies.

use super::r#trait::{value_labels, Hit, Page, Query, SearchBackend};
use crate::facets::{top_labels, FacetTable};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub readers: Vec<String>,
}

impl Document {
    fn to_hit(&self) -> Hit {
        Hit {
            id: self.id.clone(),
            score: 1.0,
            fields: self.fields.clone(),
            readers: self.readers.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: Vec<Document>,
    /// Fail every page fetch after this many have been served
    fail_after_pages: Option<usize>,
    page_fetches: AtomicUsize,
    aggregations: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    /// Load documents from a JSON array
    pub fn from_json_str(json: &str) -> Result<Self> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Ok(Self::new(documents))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Make page fetches fail once `pages` fetches have succeeded
    pub fn fail_after_pages(mut self, pages: usize) -> Self {
        self.fail_after_pages = Some(pages);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of `fetch_page` calls served so far, failed ones included
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::Relaxed)
    }

    /// Number of `aggregate` calls served so far
    pub fn aggregations(&self) -> usize {
        self.aggregations.load(Ordering::Relaxed)
    }

    fn matching<'a>(&'a self, query: &Query) -> Result<Vec<&'a Document>> {
        let terms = parse_terms(&query.query_string)?;
        Ok(self
            .documents
            .iter()
            .filter(|doc| terms.iter().all(|(field, value)| term_matches(doc, field, value)))
            .collect())
    }
}

/// `*` or an empty string match everything, otherwise whitespace separated
/// `field:value` terms are ANDed.
fn parse_terms(query_string: &str) -> Result<Vec<(String, String)>> {
    let trimmed = query_string.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return Ok(Vec::new());
    }

    trimmed
        .split_whitespace()
        .map(|term| match term.split_once(':') {
            Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                Ok((field.to_string(), value.to_string()))
            }
            _ => Err(Error::InvalidQuery(format!(
                "expected field:value, got '{}'",
                term
            ))),
        })
        .collect()
}

fn term_matches(doc: &Document, field: &str, value: &str) -> bool {
    if field == "id" {
        return doc.id == value;
    }
    doc.fields
        .get(field)
        .is_some_and(|v| value_labels(v).iter().any(|label| label == value))
}

impl SearchBackend for MemoryBackend {
    fn fetch_page(&self, query: &Query, batch_size: usize, offset: usize) -> Result<Page> {
        let served = self.page_fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(limit) = self.fail_after_pages {
            if served >= limit {
                return Err(Error::Backend(format!(
                    "simulated failure fetching page at offset {}",
                    offset
                )));
            }
        }

        let matching = self.matching(query)?;
        let hits = matching
            .iter()
            .skip(offset)
            .take(batch_size)
            .map(|doc| doc.to_hit())
            .collect();

        Ok(Page {
            hits,
            total_hits: matching.len() as u64,
        })
    }

    fn aggregate(&self, query: &Query, num_facets: usize) -> Result<FacetTable> {
        self.aggregations.fetch_add(1, Ordering::Relaxed);
        let matching = self.matching(query)?;

        let mut table = FacetTable::new();
        for facet in &query.facets {
            let mut counts: HashMap<String, u64> = HashMap::new();
            for doc in &matching {
                let labels = doc.fields.get(facet).map(value_labels).unwrap_or_default();
                for label in labels {
                    *counts.entry(label).or_insert(0) += 1;
                }
            }
            table.insert(facet.clone(), top_labels(counts, num_facets));
        }
        Ok(table)
    }
}
