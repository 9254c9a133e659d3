pub mod compare;
pub mod facets;

pub use compare::run_compare;
pub use facets::run_facets;

use crate::QueryArgs;
use anyhow::{Context, Result};
use statfacet::backends::{MemoryBackend, Query};
use statfacet::config::SecureFacetConfig;
use statfacet::security::PrincipalFilter;

/// Everything a command needs to count facets for one query
pub struct Prepared {
    pub backend: MemoryBackend,
    pub query: Query,
    pub filter: PrincipalFilter,
    pub facet_config: SecureFacetConfig,
}

pub fn prepare(mut facet_config: SecureFacetConfig, args: &QueryArgs) -> Result<Prepared> {
    if let Some(sample_size) = args.sample_size {
        facet_config.sample_size = sample_size;
    }
    if let Some(seed) = args.seed {
        facet_config.random_seed = seed;
    }
    if let Some(batch_size) = args.batch_size {
        facet_config.batch_size = batch_size;
    }
    facet_config.validate()?;

    let backend = MemoryBackend::from_json_file(&args.data)
        .with_context(|| format!("Failed to load documents from {:?}", args.data))?;
    tracing::info!("Loaded {} documents from {:?}", backend.len(), args.data);

    Ok(Prepared {
        backend,
        query: Query::new(args.query.clone(), args.facets.clone()),
        filter: PrincipalFilter::new(args.principals.iter().cloned()),
        facet_config,
    })
}
