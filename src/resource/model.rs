//! Resource model
//!
//! One remote object behind a uniform contract: identity, tags, dirty state
//! and the create/update/destroy/refresh lifecycle. Concrete kinds share a
//! [`RemoteState`] and implement [`Resource`]; read-only kinds all route
//! through [`NetworkResource`].

use super::error::ResourceError;
use super::kind::ResourceKind;
use super::tags::parse_tag_list;
use crate::session::Session;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Fields every resource carries: its kind, the region it was constructed
/// against, the existence flags and the raw remote snapshot.
///
/// State machine: a resource is either *proposed* (`exists=false`, staged
/// data only), *existing* (`exists=true`, backed by a confirmed remote
/// read) or *defunct* (`exists=false, defunct=true`, after a successful
/// destroy). `defunct` always implies `!exists`.
#[derive(Debug, Clone)]
pub struct RemoteState {
    kind: ResourceKind,
    region: String,
    exists: bool,
    defunct: bool,
    remote: Value,
}

impl RemoteState {
    /// State for a resource backed by a confirmed remote read.
    pub fn from_remote(kind: ResourceKind, region: &str, record: Value) -> Self {
        Self {
            kind,
            region: region.to_string(),
            exists: true,
            defunct: false,
            remote: record,
        }
    }

    /// State for a locally-proposed resource that has no remote counterpart
    /// yet.
    pub fn proposed(kind: ResourceKind, region: &str) -> Self {
        Self {
            kind,
            region: region.to_string(),
            exists: false,
            defunct: false,
            remote: Value::Null,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn defunct(&self) -> bool {
        self.defunct
    }

    pub fn remote_data(&self) -> &Value {
        &self.remote
    }

    /// Kind-specific id from the remote snapshot; None until the resource
    /// is backed by a remote read.
    pub fn id(&self) -> Option<String> {
        if !self.exists {
            return None;
        }
        self.remote
            .get(self.kind.def().id_field)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// First-class name field when the kind declares one, otherwise the
    /// `Name` tag.
    pub fn name(&self) -> Option<String> {
        if let Some(field) = self.kind.def().name_field {
            if let Some(name) = self.remote.get(field).and_then(|v| v.as_str()) {
                return Some(name.to_string());
            }
        }
        self.tags().get("Name").cloned()
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        match self.remote.get("Tags") {
            Some(tags) => parse_tag_list(tags),
            None => BTreeMap::new(),
        }
    }

    /// Swap in a fresh remote snapshot after a confirmed read.
    pub(crate) fn replace_remote(&mut self, record: Value) {
        self.remote = record;
        self.exists = true;
        self.defunct = false;
    }

    /// Terminal transition after a successful destroy.
    pub(crate) fn mark_destroyed(&mut self) {
        self.exists = false;
        self.defunct = true;
    }

    /// Guard for mutation operations on resources that must already exist.
    pub(crate) fn ensure_mutable(&self, operation: &str) -> Result<(), ResourceError> {
        if self.defunct {
            return Err(ResourceError::Precondition(format!(
                "cannot {} a destroyed {}",
                operation, self.kind
            )));
        }
        if !self.exists {
            return Err(ResourceError::Precondition(format!(
                "cannot {} a {} that has not been fetched or created",
                operation, self.kind
            )));
        }
        Ok(())
    }
}

/// Partial changes for an update: only the supplied fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateProps {
    pub description: Option<String>,
    pub value: Option<String>,
}

impl UpdateProps {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.value.is_none()
    }
}

/// The uniform contract every resource kind implements.
pub trait Resource: fmt::Debug {
    /// Shared state accessor backing the derived views below.
    fn state(&self) -> &RemoteState;

    fn kind(&self) -> ResourceKind {
        self.state().kind()
    }

    fn region(&self) -> &str {
        self.state().region()
    }

    /// True once backed by a confirmed remote read.
    fn exists(&self) -> bool {
        self.state().exists()
    }

    /// True once destroy() has succeeded; a defunct resource rejects
    /// further mutation.
    fn defunct(&self) -> bool {
        self.state().defunct()
    }

    /// Raw snapshot from the last successful read.
    fn remote_data(&self) -> &Value {
        self.state().remote_data()
    }

    fn id(&self) -> Option<String> {
        self.state().id()
    }

    fn name(&self) -> Option<String> {
        self.state().name()
    }

    fn tags(&self) -> BTreeMap<String, String> {
        self.state().tags()
    }

    /// True while locally-staged values have not been confirmed remotely.
    fn is_dirty(&self) -> bool {
        false
    }

    /// Listing order: ascending by name then id.
    fn sort_key(&self) -> String {
        format!(
            "{}{}",
            self.name().unwrap_or_default(),
            self.id().unwrap_or_default()
        )
    }

    /// Persist a proposed resource remotely.
    fn create(&mut self, session: &Session) -> Result<(), ResourceError>;

    /// Apply partial changes to an existing resource, then refresh.
    fn update(&mut self, session: &Session, changes: UpdateProps) -> Result<(), ResourceError>;

    /// Delete the remote record. Returns `Ok(false)` - not an error - when
    /// the resource is already gone, so batch callers can continue.
    fn destroy(&mut self, session: &Session) -> Result<bool, ResourceError>;

    /// Re-read remote state, replacing the snapshot and dropping any cached
    /// derived sub-views.
    fn refresh(&mut self, session: &Session) -> Result<(), ResourceError>;
}

/// Constructor used by collections to build one resource per cached record.
pub trait FromRemoteRecord: Resource + Sized {
    fn from_remote_record(kind: ResourceKind, region: &str, record: Value) -> Self;
}

/// Read-only resource covering all the network kinds. Mutation is rejected
/// without touching the remote; only `refresh` issues a call.
#[derive(Debug, Clone)]
pub struct NetworkResource {
    state: RemoteState,
}

impl Resource for NetworkResource {
    fn state(&self) -> &RemoteState {
        &self.state
    }

    fn create(&mut self, _session: &Session) -> Result<(), ResourceError> {
        Err(ResourceError::ReadOnly(self.kind()))
    }

    fn update(&mut self, _session: &Session, _changes: UpdateProps) -> Result<(), ResourceError> {
        Err(ResourceError::ReadOnly(self.kind()))
    }

    fn destroy(&mut self, _session: &Session) -> Result<bool, ResourceError> {
        Err(ResourceError::ReadOnly(self.kind()))
    }

    fn refresh(&mut self, session: &Session) -> Result<(), ResourceError> {
        let kind = self.kind();
        if kind.def().id_filter.is_none() {
            return Err(ResourceError::Precondition(format!(
                "{kind} resources cannot be described individually"
            )));
        }
        let id = self.id().ok_or_else(|| {
            ResourceError::Precondition(format!("cannot refresh a {kind} without an id"))
        })?;

        let response = session.client().describe(kind, self.region(), &id)?;
        let record = response.into_body(&format!("describe {kind}"))?;
        self.state.replace_remote(record);
        Ok(())
    }
}

impl FromRemoteRecord for NetworkResource {
    fn from_remote_record(kind: ResourceKind, region: &str, record: Value) -> Self {
        Self {
            state: RemoteState::from_remote(kind, region, record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vpc_record() -> Value {
        json!({
            "VpcId": "vpc-0a1b2c",
            "CidrBlock": "10.0.0.0/16",
            "State": "available",
            "Tags": [ { "Key": "Name", "Value": "core" } ],
        })
    }

    #[test]
    fn resource_from_remote_record_exists() {
        let vpc = NetworkResource::from_remote_record(ResourceKind::Vpc, "us-east-2", vpc_record());
        assert!(vpc.exists());
        assert!(!vpc.defunct());
        assert_eq!(vpc.id().as_deref(), Some("vpc-0a1b2c"));
        assert_eq!(vpc.name().as_deref(), Some("core"));
    }

    #[test]
    fn name_falls_back_to_name_tag() {
        let vpc = NetworkResource::from_remote_record(ResourceKind::Vpc, "us-east-2", vpc_record());
        // VPCs have no first-class name field; the tag carries it.
        assert_eq!(vpc.name().as_deref(), Some("core"));

        let unnamed = NetworkResource::from_remote_record(
            ResourceKind::Vpc,
            "us-east-2",
            json!({ "VpcId": "vpc-x" }),
        );
        assert!(unnamed.name().is_none());
    }

    #[test]
    fn security_groups_use_their_group_name_field() {
        let sg = NetworkResource::from_remote_record(
            ResourceKind::SecurityGroup,
            "us-east-2",
            json!({ "GroupId": "sg-1", "GroupName": "web", "Tags": [] }),
        );
        assert_eq!(sg.name().as_deref(), Some("web"));
    }

    #[test]
    fn proposed_state_has_no_id() {
        let state = RemoteState::proposed(ResourceKind::Secret, "us-east-2");
        assert!(!state.exists());
        assert!(state.id().is_none());
    }

    #[test]
    fn sort_key_concatenates_name_and_id() {
        let vpc = NetworkResource::from_remote_record(ResourceKind::Vpc, "us-east-2", vpc_record());
        assert_eq!(vpc.sort_key(), "corevpc-0a1b2c");
    }

    #[test]
    fn network_kinds_reject_mutation_without_remote_calls() {
        let client = crate::aws::client::testing::MockRemoteClient::new();
        let settings = crate::config::Settings {
            region: "us-east-2".to_string(),
            output: crate::config::OutputFormat::Table,
            endpoint: None,
        };
        let session = Session::new(settings, Box::new(client.clone()));
        let mut vpc =
            NetworkResource::from_remote_record(ResourceKind::Vpc, "us-east-2", vpc_record());

        assert!(matches!(
            vpc.destroy(&session),
            Err(ResourceError::ReadOnly(ResourceKind::Vpc))
        ));
        assert!(matches!(
            vpc.create(&session),
            Err(ResourceError::ReadOnly(_))
        ));
        assert!(client.calls.borrow().is_empty());
    }
}
