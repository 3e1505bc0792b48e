//! Query configuration that downstream crates can serialize/deserialize.
//!
//! Configuration is always passed explicitly; the plain constructors of the
//! operators use `QueryConfig::default()` at the API boundary.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Bucket count of a freshly created lookup. Grows as `2 * count + 1`.
    pub lookup_initial_buckets: usize,

    /// Element capacity reserved by a grouping on its first append.
    pub grouping_initial_capacity: usize,

    /// Longest concat/union chain before a two-child node is introduced.
    pub max_chain_len: usize,

    /// Initial capacity of the ordering buffer when the source length is unknown.
    pub sort_buffer_capacity_hint: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            lookup_initial_buckets: 7,
            grouping_initial_capacity: 1,
            max_chain_len: 4096,
            sort_buffer_capacity_hint: 0,
        }
    }
}

impl QueryConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `LAZYQ_LOOKUP_INITIAL_BUCKETS`: initial bucket count of a lookup
    /// - `LAZYQ_GROUPING_INITIAL_CAPACITY`: first element reservation per grouping
    /// - `LAZYQ_MAX_CHAIN_LEN`: concat/union chain ceiling
    /// - `LAZYQ_SORT_BUFFER_HINT`: ordering buffer capacity hint
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_usize("LAZYQ_LOOKUP_INITIAL_BUCKETS") {
            cfg.lookup_initial_buckets = v;
        }
        if let Some(v) = env_usize("LAZYQ_GROUPING_INITIAL_CAPACITY") {
            cfg.grouping_initial_capacity = v;
        }
        if let Some(v) = env_usize("LAZYQ_MAX_CHAIN_LEN") {
            cfg.max_chain_len = v;
        }
        if let Some(v) = env_usize("LAZYQ_SORT_BUFFER_HINT") {
            cfg.sort_buffer_capacity_hint = v;
        }

        cfg
    }

    /// Reject settings the index and chain builders cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.lookup_initial_buckets == 0 {
            return Err(Error::Config("lookup_initial_buckets must be > 0".into()));
        }
        if self.grouping_initial_capacity == 0 {
            return Err(Error::Config(
                "grouping_initial_capacity must be > 0".into(),
            ));
        }
        if self.max_chain_len < 2 {
            return Err(Error::Config("max_chain_len must be >= 2".into()));
        }
        Ok(())
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.trim().parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = QueryConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.lookup_initial_buckets, 7);
        assert_eq!(cfg.grouping_initial_capacity, 1);
    }

    #[test]
    fn test_validate_rejects_zero_buckets() {
        let cfg = QueryConfig {
            lookup_initial_buckets: 0,
            ..QueryConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: QueryConfig = serde_json::from_str(r#"{"max_chain_len": 16}"#).unwrap();
        assert_eq!(cfg.max_chain_len, 16);
        assert_eq!(cfg.lookup_initial_buckets, 7);
    }
}
