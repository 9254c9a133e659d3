//! Tests for the in-memory search backend

use statfacet::backends::{MemoryBackend, Query, SearchBackend};
use statfacet::{Error, FacetValue};
use std::io::Write;
use tempfile::NamedTempFile;

const DOCS: &str = r#"[
    {"id": "1", "fields": {"category": "books", "tags": ["new", "sale"]}, "readers": ["alice"]},
    {"id": "2", "fields": {"category": "books", "tags": ["sale"]}, "readers": ["bob"]},
    {"id": "3", "fields": {"category": "music", "year": 2021}, "readers": ["*"]},
    {"id": "4", "fields": {"category": "films"}},
    {"id": "5", "fields": {"category": "books", "year": 2021}, "readers": ["group:eng-*"]}
]"#;

fn backend() -> MemoryBackend {
    MemoryBackend::from_json_str(DOCS).unwrap()
}

#[test]
fn test_load_from_json() {
    let backend = backend();
    assert_eq!(backend.len(), 5);
    assert!(!backend.is_empty());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DOCS.as_bytes()).unwrap();

    let backend = MemoryBackend::from_json_file(file.path()).unwrap();
    assert_eq!(backend.len(), 5);
}

#[test]
fn test_malformed_json_is_error() {
    assert!(matches!(
        MemoryBackend::from_json_str("{not json"),
        Err(Error::Json(_))
    ));
}

#[test]
fn test_match_all_paging() {
    let backend = backend();
    let query = Query::match_all(vec![]);

    let first = backend.fetch_page(&query, 2, 0).unwrap();
    assert_eq!(first.total_hits, 5);
    let ids: Vec<_> = first.hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);

    let last = backend.fetch_page(&query, 2, 4).unwrap();
    assert_eq!(last.hits.len(), 1);
    assert_eq!(last.hits[0].id, "5");

    let beyond = backend.fetch_page(&query, 2, 10).unwrap();
    assert!(beyond.hits.is_empty());
    assert_eq!(beyond.total_hits, 5);
}

#[test]
fn test_field_terms_are_anded() {
    let backend = backend();

    let books = backend
        .fetch_page(&Query::new("category:books", vec![]), 10, 0)
        .unwrap();
    assert_eq!(books.total_hits, 3);

    let books_2021 = backend
        .fetch_page(&Query::new("category:books year:2021", vec![]), 10, 0)
        .unwrap();
    assert_eq!(books_2021.total_hits, 1);
    assert_eq!(books_2021.hits[0].id, "5");

    let tagged = backend
        .fetch_page(&Query::new("tags:sale", vec![]), 10, 0)
        .unwrap();
    assert_eq!(tagged.total_hits, 2);

    let by_id = backend.fetch_page(&Query::new("id:3", vec![]), 10, 0).unwrap();
    assert_eq!(by_id.hits[0].id, "3");
}

#[test]
fn test_malformed_term_is_invalid_query() {
    let backend = backend();
    for bad in ["books", ":books", "category:"] {
        let result = backend.fetch_page(&Query::new(bad, vec![]), 10, 0);
        assert!(
            matches!(result, Err(Error::InvalidQuery(_))),
            "'{}' should be rejected",
            bad
        );
    }
}

#[test]
fn test_aggregate_top_labels() {
    let backend = backend();
    let query = Query::match_all(vec!["category".to_string(), "tags".to_string()]);

    let facets = backend.aggregate(&query, 2).unwrap();
    assert_eq!(
        facets["category"],
        vec![FacetValue::new("books", 3), FacetValue::new("films", 1)]
    );
    assert_eq!(
        facets["tags"],
        vec![FacetValue::new("sale", 2), FacetValue::new("new", 1)]
    );
    assert_eq!(backend.aggregations(), 1);
}

#[test]
fn test_simulated_failure() {
    let backend = backend().fail_after_pages(1);
    let query = Query::match_all(vec![]);

    assert!(backend.fetch_page(&query, 2, 0).is_ok());
    assert!(matches!(
        backend.fetch_page(&query, 2, 2),
        Err(Error::Backend(_))
    ));
    assert_eq!(backend.page_fetches(), 2);
}
