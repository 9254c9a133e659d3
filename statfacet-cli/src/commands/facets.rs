use super::prepare;
use crate::QueryArgs;
use anyhow::Result;
use statfacet::config::{Config, FacetMode};
use statfacet::{FacetCounter, FacetStrategy};

/// Count facets with one mode and print the table as JSON
pub fn run_facets(config: Config, args: &QueryArgs, mode: Option<FacetMode>) -> Result<()> {
    let mut facet_config = config.facets;
    if let Some(mode) = mode {
        facet_config.mode = mode;
    }
    let prepared = prepare(facet_config, args)?;

    let strategy = FacetStrategy::for_query(
        &prepared.backend,
        &prepared.query,
        &prepared.filter,
        &prepared.facet_config,
        None,
    )?;
    tracing::info!(
        mode = strategy.mode().as_str(),
        query = %prepared.query.query_string,
        "Counting facets"
    );

    let facets = strategy.get_facets(args.num_facets)?;
    println!("{}", serde_json::to_string_pretty(&facets)?);
    Ok(())
}
