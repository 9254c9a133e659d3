use crate::backends::{Hit, PermissionPredicate};
use crate::Result;
use std::collections::HashSet;

/// Grants read access when one of the user's principals matches one of the
/// document's reader entries.
///
/// Reader entries may be exact principals, `*`, or a prefix ending in `*`
/// (e.g. `group:eng-*`). A document without readers is visible to nobody.
#[derive(Debug, Clone)]
pub struct PrincipalFilter {
    principals: HashSet<String>,
}

impl PrincipalFilter {
    pub fn new<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principals: principals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn principals(&self) -> impl Iterator<Item = &str> {
        self.principals.iter().map(String::as_str)
    }

    pub fn can_read(&self, readers: &[String]) -> bool {
        readers.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if pattern.ends_with('*') {
                self.principals.iter().any(|p| glob_match(pattern, p))
            } else {
                self.principals.contains(pattern)
            }
        })
    }
}

impl PermissionPredicate for PrincipalFilter {
    fn is_visible(&self, hit: &Hit) -> Result<bool> {
        Ok(self.can_read(&hit.readers))
    }
}

/// Simple glob matching: only supports trailing `*` (e.g., `group:eng-*`, `*`)
pub fn glob_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        value.starts_with(prefix)
    } else {
        pattern == value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readers(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("group:eng-*", "group:eng-search"));
        assert!(!glob_match("group:eng-*", "group:sales"));
        assert!(glob_match("alice", "alice"));
        assert!(!glob_match("alice", "alice2"));
    }

    #[test]
    fn test_exact_principal() {
        let filter = PrincipalFilter::new(["alice", "group:eng"]);
        assert!(filter.can_read(&readers(&["bob", "alice"])));
        assert!(filter.can_read(&readers(&["group:eng"])));
        assert!(!filter.can_read(&readers(&["bob"])));
    }

    #[test]
    fn test_wildcard_readers() {
        let filter = PrincipalFilter::new(["group:eng-search"]);
        assert!(filter.can_read(&readers(&["group:eng-*"])));
        assert!(filter.can_read(&readers(&["*"])));
        assert!(!filter.can_read(&readers(&["group:sales-*"])));
    }

    #[test]
    fn test_no_readers_means_hidden() {
        let filter = PrincipalFilter::new(["alice"]);
        assert!(!filter.can_read(&[]));
    }

    #[test]
    fn test_no_principals_sees_only_public() {
        let filter = PrincipalFilter::new(Vec::<String>::new());
        assert!(filter.can_read(&readers(&["*"])));
        assert!(!filter.can_read(&readers(&["alice"])));
        assert!(!filter.can_read(&readers(&["group:*"])));
    }
}
