pub mod memory;
pub mod r#trait;

pub use memory::{Document, MemoryBackend};
pub use r#trait::{AggregationSnapshot, Hit, Page, PermissionPredicate, Query, SearchBackend};
