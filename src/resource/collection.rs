//! Resource collections
//!
//! A collection is every resource of one kind in one region. Fetching is
//! backed by the session's region cache: the first unfiltered fetch lists
//! remotely and fills the cache, later fetches in the same session are
//! served locally. Filtered fetches always go remote and bypass the cache.
//! Every fetch rebuilds the container from scratch, so a refetch never
//! accumulates stale records.

use super::error::ResourceError;
use super::kind::ResourceKind;
use super::model::{FromRemoteRecord, NetworkResource, Resource};
use super::secret::Secret;
use crate::aws::client::Filter;
use crate::session::Session;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct Collection<R: FromRemoteRecord> {
    kind: ResourceKind,
    region: String,
    resources: Vec<R>,
}

/// All secrets in a region.
pub type Secrets = Collection<Secret>;

/// All network resources of one kind in a region.
pub type NetworkResources = Collection<NetworkResource>;

impl<R: FromRemoteRecord> Collection<R> {
    pub fn new(kind: ResourceKind, region: &str) -> Self {
        Self {
            kind,
            region: region.to_string(),
            resources: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.resources.iter()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.resources.get(index)
    }

    /// Populate the collection, from the cache when possible.
    pub fn fetch(
        &mut self,
        session: &Session,
        filters: &[Filter],
    ) -> Result<&mut Self, ResourceError> {
        let def = self.kind.def();
        if let Some(required) = def.required_filter {
            if !filters.iter().any(|f| f.name == required) {
                return Err(ResourceError::Precondition(format!(
                    "listing {} requires a {} filter",
                    self.kind, required
                )));
            }
        }

        if filters.is_empty() {
            let cached: Option<Vec<Value>> = {
                let cache = session.cache();
                if cache.has_data_for(def.collection_name, &self.region) {
                    Some(cache.data_for(def.collection_name, &self.region)?.to_vec())
                } else {
                    None
                }
            };
            if let Some(records) = cached {
                tracing::debug!(
                    "serving {} {} records for {} from cache",
                    records.len(),
                    self.kind,
                    self.region
                );
                self.rebuild(records);
                return Ok(self);
            }
        }

        let response = session.client().list(self.kind, &self.region, filters)?;
        let body = response.into_body(&format!("list {}", def.display_name))?;
        let records = dedupe_by_id(self.kind, def.extract_records(&body));

        // Only full listings are cached; a filtered subset must never stand
        // in for the whole region.
        if filters.is_empty() {
            session
                .cache_mut()
                .replace(def.collection_name, &self.region, records.clone());
        }
        self.rebuild(records);
        Ok(self)
    }

    /// Force a remote re-read, replacing the cached snapshot.
    pub fn refetch(
        &mut self,
        session: &Session,
        filters: &[Filter],
    ) -> Result<&mut Self, ResourceError> {
        session
            .cache_mut()
            .clear(self.kind.def().collection_name, &self.region);
        self.fetch(session, filters)
    }

    fn rebuild(&mut self, records: Vec<Value>) {
        self.resources = records
            .into_iter()
            .map(|record| R::from_remote_record(self.kind, &self.region, record))
            .collect();
        self.resources.sort_by_key(|r| r.sort_key());
    }

    /// Look one resource up by id or name. Absence is an error; an ambiguous
    /// name logs a warning and yields the first match in listing order.
    pub fn find_one(&self, query: &str) -> Result<&R, ResourceError> {
        let index = self.find_index(query)?;
        Ok(&self.resources[index])
    }

    pub fn find_one_mut(&mut self, query: &str) -> Result<&mut R, ResourceError> {
        let index = self.find_index(query)?;
        Ok(&mut self.resources[index])
    }

    fn find_index(&self, query: &str) -> Result<usize, ResourceError> {
        let matches: Vec<usize> = self
            .resources
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.id().as_deref() == Some(query) || r.name().as_deref() == Some(query)
            })
            .map(|(i, _)| i)
            .collect();

        match matches.as_slice() {
            [] => Err(ResourceError::NotFound {
                kind: self.kind,
                query: query.to_string(),
            }),
            [index] => Ok(*index),
            [first, ..] => {
                tracing::warn!(
                    "{} matches for {} '{}'; using the first",
                    matches.len(),
                    self.kind,
                    query
                );
                Ok(*first)
            }
        }
    }

    /// Name -> id for every named resource, in name order.
    pub fn resource_ids_by_name(&self) -> BTreeMap<String, String> {
        self.resources
            .iter()
            .filter_map(|r| Some((r.name()?, r.id()?)))
            .collect()
    }
}

/// Drop repeated records sharing an id, keeping the first. List responses
/// for nested kinds can surface the same record more than once.
fn dedupe_by_id(kind: ResourceKind, records: Vec<Value>) -> Vec<Value> {
    let id_field = kind.def().id_field;
    let mut seen: Vec<String> = Vec::new();
    let mut out: Vec<Value> = Vec::new();
    for record in records {
        match record.get(id_field).and_then(|v| v.as_str()) {
            Some(id) if seen.iter().any(|s| s == id) => continue,
            Some(id) => seen.push(id.to_string()),
            // Id-less records (e.g. routes) are kept as-is.
            None => {}
        }
        out.push(record);
    }
    out
}
