//! Read permission checks for search hits

mod permissions;

pub use permissions::{glob_match, PrincipalFilter};
