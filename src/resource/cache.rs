//! Region cache
//!
//! One remote list snapshot per collection kind per region, held for the
//! lifetime of the process. There is no eviction and no TTL; the process is
//! short-lived and a warm entry means "do not call the remote again".
//!
//! Cache identity is scoped by the collection kind name, so two kinds that
//! use the same region string never collide.

use super::error::ResourceError;
use serde_json::Value;
use std::collections::HashMap;

/// Per-kind, per-region memoization of deduplicated remote record lists.
#[derive(Debug, Default)]
pub struct RegionCache {
    entries: HashMap<String, HashMap<String, Vec<Value>>>,
}

impl RegionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a snapshot exists for this collection/region pair.
    pub fn has_data_for(&self, collection: &str, region: &str) -> bool {
        self.entries
            .get(collection)
            .is_some_and(|regions| regions.contains_key(region))
    }

    /// The cached snapshot, or a CacheMiss error if absent.
    pub fn data_for(&self, collection: &str, region: &str) -> Result<&[Value], ResourceError> {
        self.entries
            .get(collection)
            .and_then(|regions| regions.get(region))
            .map(Vec::as_slice)
            .ok_or_else(|| ResourceError::CacheMiss {
                collection: collection.to_string(),
                region: region.to_string(),
            })
    }

    /// Store a snapshot, overwriting any previous one (idempotent).
    pub fn replace(&mut self, collection: &str, region: &str, records: Vec<Value>) {
        tracing::debug!(
            "cache replace: {}/{} ({} records)",
            collection,
            region,
            records.len()
        );
        self.entries
            .entry(collection.to_string())
            .or_default()
            .insert(region.to_string(), records);
    }

    /// Drop a snapshot so the next fetch re-reads the remote.
    pub fn clear(&mut self, collection: &str, region: &str) {
        if let Some(regions) = self.entries.get_mut(collection) {
            regions.remove(region);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_cache_has_no_data() {
        let cache = RegionCache::new();
        assert!(!cache.has_data_for("vpcs", "us-east-2"));
        assert!(matches!(
            cache.data_for("vpcs", "us-east-2"),
            Err(ResourceError::CacheMiss { .. })
        ));
    }

    #[test]
    fn replace_then_read_back() {
        let mut cache = RegionCache::new();
        cache.replace("vpcs", "us-east-2", vec![json!({"VpcId": "vpc-1"})]);
        assert!(cache.has_data_for("vpcs", "us-east-2"));
        assert_eq!(cache.data_for("vpcs", "us-east-2").unwrap().len(), 1);
    }

    #[test]
    fn replace_overwrites_previous_snapshot() {
        let mut cache = RegionCache::new();
        cache.replace("vpcs", "us-east-2", vec![json!({"VpcId": "vpc-1"})]);
        cache.replace("vpcs", "us-east-2", vec![]);
        assert!(cache.has_data_for("vpcs", "us-east-2"));
        assert!(cache.data_for("vpcs", "us-east-2").unwrap().is_empty());
    }

    #[test]
    fn identity_is_scoped_by_collection_kind() {
        let mut cache = RegionCache::new();
        cache.replace("vpcs", "us-east-2", vec![json!({"VpcId": "vpc-1"})]);
        assert!(!cache.has_data_for("subnets", "us-east-2"));
    }

    #[test]
    fn clear_drops_only_the_named_snapshot() {
        let mut cache = RegionCache::new();
        cache.replace("vpcs", "us-east-2", vec![json!({"VpcId": "vpc-1"})]);
        cache.replace("vpcs", "eu-west-1", vec![]);
        cache.clear("vpcs", "us-east-2");
        assert!(!cache.has_data_for("vpcs", "us-east-2"));
        assert!(cache.has_data_for("vpcs", "eu-west-1"));
    }

    #[test]
    fn regions_are_independent_within_a_kind() {
        let mut cache = RegionCache::new();
        cache.replace("secrets", "us-east-1", vec![json!({"Name": "a"})]);
        cache.replace("secrets", "eu-west-1", vec![]);
        assert_eq!(cache.data_for("secrets", "us-east-1").unwrap().len(), 1);
        assert!(cache.data_for("secrets", "eu-west-1").unwrap().is_empty());
    }
}
