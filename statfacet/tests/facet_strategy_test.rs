//! Tests for facet mode dispatch

use serde_json::json;
use statfacet::backends::{Document, MemoryBackend, PermissionPredicate, Query, SearchBackend};
use statfacet::facets::FacetCounter;
use statfacet::security::PrincipalFilter;
use statfacet::{Error, FacetMode, FacetStrategy, FacetValue, SecureFacetConfig};
use std::collections::HashMap;

fn backend() -> MemoryBackend {
    let docs = (0..40)
        .map(|i| {
            let mut fields = HashMap::new();
            fields.insert("kind".to_string(), json!(if i < 30 { "report" } else { "memo" }));
            Document {
                id: format!("doc-{}", i),
                fields,
                readers: if i % 2 == 0 { vec!["alice".to_string()] } else { vec![] },
            }
        })
        .collect();
    MemoryBackend::new(docs)
}

fn run(mode: FacetMode, sample_size: usize) -> Vec<FacetValue> {
    let backend = backend();
    let query = Query::match_all(vec!["kind".to_string()]);
    let alice = PrincipalFilter::new(["alice"]);
    let config = SecureFacetConfig::new(sample_size, 5).with_mode(mode);

    let strategy = FacetStrategy::for_query(&backend, &query, &alice, &config, None).unwrap();
    assert_eq!(strategy.mode(), mode);
    strategy.get_facets(10).unwrap().remove("kind").unwrap()
}

#[test]
fn test_insecure_mode_returns_raw_counts() {
    assert_eq!(
        run(FacetMode::Insecure, 10),
        vec![FacetValue::new("report", 30), FacetValue::new("memo", 10)]
    );
}

#[test]
fn test_secure_mode_returns_exact_visible_counts() {
    assert_eq!(
        run(FacetMode::Secure, 10),
        vec![FacetValue::new("report", 15), FacetValue::new("memo", 5)]
    );
}

#[test]
fn test_statistical_mode_falls_back_when_population_small() {
    assert_eq!(run(FacetMode::Statistical, 100), run(FacetMode::Secure, 100));
}

#[test]
fn test_statistical_mode_without_sampling() {
    // sample size equals the hit count: every hit checked, 20 of 40 visible
    assert_eq!(
        run(FacetMode::Statistical, 40),
        vec![FacetValue::new("report", 15), FacetValue::new("memo", 5)]
    );
}

#[test]
fn test_dispatch_through_trait_objects() {
    let backend = backend();
    let query = Query::match_all(vec!["kind".to_string()]);
    let alice = PrincipalFilter::new(["alice"]);
    let config = SecureFacetConfig::new(10, 5).with_mode(FacetMode::Secure);

    let dyn_backend: &dyn SearchBackend = &backend;
    let dyn_predicate: &dyn PermissionPredicate = &alice;
    let strategy =
        FacetStrategy::for_query(dyn_backend, &query, dyn_predicate, &config, None).unwrap();

    let facets = strategy.get_facets(1).unwrap();
    assert_eq!(facets["kind"], vec![FacetValue::new("report", 15)]);
}

#[test]
fn test_zero_batch_size_rejected_for_every_mode() {
    let backend = backend();
    let query = Query::match_all(vec!["kind".to_string()]);
    let alice = PrincipalFilter::new(["alice"]);

    for mode in [FacetMode::Secure, FacetMode::Statistical, FacetMode::Insecure] {
        let config = SecureFacetConfig::new(10, 5).with_mode(mode).with_batch_size(0);
        let result = FacetStrategy::for_query(&backend, &query, &alice, &config, None);
        assert!(matches!(result, Err(Error::Config(_))), "mode {:?}", mode);
    }
    assert_eq!(backend.page_fetches(), 0);
    assert_eq!(backend.aggregations(), 0);
}

#[test]
fn test_zero_sample_size_rejected() {
    let backend = backend();
    let query = Query::match_all(vec!["kind".to_string()]);
    let alice = PrincipalFilter::new(["alice"]);
    let config = SecureFacetConfig::new(0, 5).with_mode(FacetMode::Statistical);

    let result = FacetStrategy::for_query(&backend, &query, &alice, &config, None);
    assert!(matches!(result, Err(Error::Config(_))));
}
