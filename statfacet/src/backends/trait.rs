use crate::facets::{FacetTable, FacetValue};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A search predicate plus the facet fields the caller wants counted.
///
/// Backends interpret `query_string`; the facet layer never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub query_string: String,
    #[serde(default)]
    pub facets: Vec<String>,
}

impl Query {
    pub fn new(query_string: impl Into<String>, facets: Vec<String>) -> Self {
        Self {
            query_string: query_string.into(),
            facets,
        }
    }

    pub fn match_all(facets: Vec<String>) -> Self {
        Self::new("*", facets)
    }
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    /// Principals allowed to read the document. Patterns may end in `*`.
    #[serde(default)]
    pub readers: Vec<String>,
}

impl Hit {
    /// Facet labels stored under `field`. Arrays contribute one label per
    /// scalar element; objects and nulls contribute nothing.
    pub fn facet_labels(&self, field: &str) -> Vec<String> {
        self.fields.get(field).map(value_labels).unwrap_or_default()
    }
}

pub(crate) fn value_labels(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_label).collect(),
        other => scalar_label(other).into_iter().collect(),
    }
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One page of hits together with the backend's total hit count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub hits: Vec<Hit>,
    pub total_hits: u64,
}

/// Remote search primitive consumed by the facet layer.
///
/// Every call is one query execution against the engine. Failures are
/// returned as-is; callers do not retry.
pub trait SearchBackend {
    /// Fetch up to `batch_size` hits starting at `offset`
    fn fetch_page(&self, query: &Query, batch_size: usize, offset: usize) -> Result<Page>;

    /// Raw top-`num_facets` label counts per facet field of `query`,
    /// computed without any access control
    fn aggregate(&self, query: &Query, num_facets: usize) -> Result<FacetTable>;
}

/// Per-document visibility check for the requesting identity
pub trait PermissionPredicate {
    fn is_visible(&self, hit: &Hit) -> Result<bool>;
}

impl<F> PermissionPredicate for F
where
    F: Fn(&Hit) -> bool,
{
    fn is_visible(&self, hit: &Hit) -> Result<bool> {
        Ok(self(hit))
    }
}

/// Facet candidates and hit count captured by an earlier execution of the
/// same query. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationSnapshot {
    pub facets: FacetTable,
    pub total_documents: u64,
    /// How many labels per facet were captured
    pub num_facets: usize,
}

impl AggregationSnapshot {
    pub fn new(facets: FacetTable, total_documents: u64, num_facets: usize) -> Self {
        Self {
            facets,
            total_documents,
            num_facets,
        }
    }

    /// Whether this snapshot holds at least `num_facets` labels per facet
    pub fn covers(&self, num_facets: usize) -> bool {
        self.num_facets >= num_facets
    }

    /// The cached candidates limited to the first `num_facets` labels of each facet
    pub fn facets(&self, num_facets: usize) -> FacetTable {
        self.facets
            .iter()
            .map(|(name, values)| {
                let trimmed: Vec<FacetValue> = values.iter().take(num_facets).cloned().collect();
                (name.clone(), trimmed)
            })
            .collect()
    }
}
