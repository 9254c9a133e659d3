use super::prepare;
use crate::QueryArgs;
use anyhow::Result;
use statfacet::config::{Config, FacetMode};
use statfacet::{FacetCounter, FacetStrategy, FacetTable};
use std::collections::BTreeSet;

const MODES: [FacetMode; 3] = [FacetMode::Insecure, FacetMode::Secure, FacetMode::Statistical];

/// Run every facet mode over the same query and print a comparison table
pub fn run_compare(config: Config, args: &QueryArgs) -> Result<()> {
    let prepared = prepare(config.facets, args)?;

    let mut tables: Vec<FacetTable> = Vec::with_capacity(MODES.len());
    for mode in MODES {
        let facet_config = prepared.facet_config.clone().with_mode(mode);
        let strategy = FacetStrategy::for_query(
            &prepared.backend,
            &prepared.query,
            &prepared.filter,
            &facet_config,
            None,
        )?;
        tables.push(strategy.get_facets(args.num_facets)?);
    }

    println!(
        "Query: {}  (sample size {}, seed {})",
        prepared.query.query_string,
        prepared.facet_config.sample_size,
        prepared.facet_config.random_seed
    );

    for facet in &prepared.query.facets {
        println!();
        println!("{}", facet);
        println!("--------------------------------------------------------------------------------");
        println!(
            "  {:<32} {:>12} {:>12} {:>12}",
            "label", "insecure", "secure", "statistical"
        );

        let labels: BTreeSet<&str> = tables
            .iter()
            .filter_map(|table| table.get(facet))
            .flatten()
            .map(|value| value.label.as_str())
            .collect();

        for label in labels {
            let counts: Vec<String> = tables
                .iter()
                .map(|table| count_of(table, facet, label))
                .collect();
            println!(
                "  {:<32} {:>12} {:>12} {:>12}",
                label, counts[0], counts[1], counts[2]
            );
        }
    }

    Ok(())
}

fn count_of(table: &FacetTable, facet: &str, label: &str) -> String {
    table
        .get(facet)
        .and_then(|values| values.iter().find(|v| v.label == label))
        .map(|v| v.count.to_string())
        .unwrap_or_else(|| "-".to_string())
}
