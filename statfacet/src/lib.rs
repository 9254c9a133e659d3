pub mod backends;
pub mod config;
pub mod error;
pub mod facets;
pub mod security;
pub mod telemetry;

pub use config::{Config, FacetMode, SecureFacetConfig};
pub use error::{Error, Result};
pub use facets::{FacetCounter, FacetStrategy, FacetTable, FacetValue};
