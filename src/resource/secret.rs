//! Secrets
//!
//! The one mutable resource kind. A secret starts either *proposed* (built
//! from local properties, nothing remote yet) or *existing* (built from a
//! list/describe record). Its sensitive value is never fetched alongside
//! metadata; [`Secret::value`] reads it lazily and drops it again on
//! refresh.

use super::error::ResourceError;
use super::kind::ResourceKind;
use super::model::{FromRemoteRecord, RemoteState, Resource, UpdateProps};
use super::validate::validate_payload;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Declared shape of a secret's payload. Non-simple types are validated
/// before any remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    #[default]
    Simple,
    SshKey,
    RdsMysql,
}

impl SecretType {
    pub const ALL: [SecretType; 3] = [SecretType::Simple, SecretType::SshKey, SecretType::RdsMysql];

    pub fn key(self) -> &'static str {
        match self {
            SecretType::Simple => "simple",
            SecretType::SshKey => "ssh_key",
            SecretType::RdsMysql => "rds_mysql",
        }
    }

    /// One-line schema description for user-facing help output.
    pub fn schema(self) -> &'static str {
        match self {
            SecretType::Simple => "any opaque string",
            SecretType::SshKey => "JSON object with at least one of 'private', 'public'",
            SecretType::RdsMysql => {
                "JSON object with non-empty username, password, engine (\"mysql\"), \
                 host, port, dbname, dbInstanceIdentifier"
            }
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SecretType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecretType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| ResourceError::Validation(format!("unknown secret type '{s}'")))
    }
}

/// Local properties staged for a create. Unknown keys are rejected so a
/// typoed field never silently drops.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretProps {
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: Option<String>,
    pub value: String,
    #[serde(rename = "type", default)]
    pub secret_type: SecretType,
}

/// The sensitive payload, read on demand and held only in memory.
#[derive(Debug, Clone)]
pub struct SecretValue {
    pub secret_string: String,
    pub details: Value,
}

#[derive(Debug)]
pub struct Secret {
    state: RemoteState,
    staged: Option<SecretProps>,
    value: Option<SecretValue>,
}

impl Secret {
    /// A locally-proposed secret; nothing remote happens until `create`.
    pub fn proposed(region: &str, props: SecretProps) -> Self {
        Self {
            state: RemoteState::proposed(ResourceKind::Secret, region),
            staged: Some(props),
            value: None,
        }
    }

    /// The sensitive payload, fetched on first access and cached until the
    /// next refresh.
    pub fn value(&mut self, session: &Session) -> Result<&SecretValue, ResourceError> {
        self.state.ensure_mutable("read the value of")?;
        if self.value.is_none() {
            let id = self.require_id("read")?;
            let response = session
                .client()
                .read_value(ResourceKind::Secret, self.region(), &id)?;
            let body = response.into_body("get secret value")?;
            let secret_string = body
                .get("SecretString")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            self.value = Some(SecretValue {
                secret_string,
                details: body,
            });
        }
        Ok(self.value.as_ref().expect("value fetched above"))
    }

    /// Full metadata record, without the sensitive payload.
    pub fn details(&self) -> &Value {
        self.state.remote_data()
    }

    /// Undo a pending deletion by name. Works on secrets this session never
    /// loaded, so it takes the name directly rather than a fetched resource.
    pub fn restore_by_name(session: &Session, name: &str) -> Result<(), ResourceError> {
        let response = session
            .client()
            .restore(ResourceKind::Secret, session.region(), name)?;
        response.into_body("restore secret")?;
        tracing::info!("restored secret '{}'", name);
        Ok(())
    }

    fn require_id(&self, operation: &str) -> Result<String, ResourceError> {
        self.state.id().ok_or_else(|| {
            ResourceError::Precondition(format!("cannot {operation} a secret without an id"))
        })
    }

    fn staged_for_create(&self) -> Result<&SecretProps, ResourceError> {
        let Some(props) = &self.staged else {
            return Err(ResourceError::Precondition(
                "create needs staged secret properties".to_string(),
            ));
        };
        if props.name.is_empty() {
            return Err(ResourceError::Validation(
                "secret name must not be empty".to_string(),
            ));
        }
        if props.value.is_empty() {
            return Err(ResourceError::Validation(
                "secret value must not be empty".to_string(),
            ));
        }
        validate_payload(props.secret_type, &props.value)?;
        Ok(props)
    }

    /// Whether a record for this name already exists remotely. Any completed
    /// non-success response counts as absent; only transport failures abort.
    fn remote_record_for(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<Value>, ResourceError> {
        let response = session
            .client()
            .describe(ResourceKind::Secret, self.region(), name)?;
        if response.is_ok() {
            Ok(Some(response.body))
        } else {
            Ok(None)
        }
    }
}

impl Resource for Secret {
    fn state(&self) -> &RemoteState {
        &self.state
    }

    fn name(&self) -> Option<String> {
        if let Some(name) = self.state.name() {
            return Some(name);
        }
        self.staged.as_ref().map(|p| p.name.clone())
    }

    fn is_dirty(&self) -> bool {
        self.staged.is_some() && !self.exists()
    }

    /// Create the secret remotely. If a record with the staged name already
    /// exists, this becomes an update of that record instead of an error.
    fn create(&mut self, session: &Session) -> Result<(), ResourceError> {
        if self.defunct() {
            return Err(ResourceError::Precondition(
                "cannot create a destroyed secret".to_string(),
            ));
        }
        if self.exists() {
            return Err(ResourceError::Precondition(
                "secret already exists; use update".to_string(),
            ));
        }
        let props = self.staged_for_create()?.clone();

        if let Some(record) = self.remote_record_for(session, &props.name)? {
            tracing::info!("secret '{}' already exists; updating it instead", props.name);
            self.state.replace_remote(record);
            return self.update(
                session,
                UpdateProps {
                    description: props.description.clone(),
                    value: Some(props.value.clone()),
                },
            );
        }

        let mut attributes = json!({
            "Name": props.name,
            "SecretString": props.value,
        });
        if let Some(desc) = &props.description {
            attributes["Description"] = json!(desc);
        }

        let response = session
            .client()
            .create(ResourceKind::Secret, self.region(), &attributes)?;
        let body = response.into_body("create secret")?;
        tracing::info!("created secret '{}'", props.name);
        self.state.replace_remote(body);
        self.staged = None;
        self.refresh(session)
    }

    fn update(&mut self, session: &Session, changes: UpdateProps) -> Result<(), ResourceError> {
        self.state.ensure_mutable("update")?;
        if changes.is_empty() {
            return Err(ResourceError::Validation(
                "update needs at least one of description or value".to_string(),
            ));
        }
        let id = self.require_id("update")?;

        let mut body = json!({});
        if let Some(desc) = &changes.description {
            body["Description"] = json!(desc);
        }
        if let Some(value) = &changes.value {
            body["SecretString"] = json!(value);
        }

        let response = session
            .client()
            .update(ResourceKind::Secret, self.region(), &id, &body)?;
        response.into_body("update secret")?;
        tracing::info!("updated secret '{}'", id);
        self.staged = None;
        self.refresh(session)
    }

    fn destroy(&mut self, session: &Session) -> Result<bool, ResourceError> {
        if !self.exists() || self.defunct() {
            tracing::warn!(
                "secret '{}' does not exist; nothing to destroy",
                self.name().unwrap_or_default()
            );
            return Ok(false);
        }
        let id = self.require_id("destroy")?;

        let response = session
            .client()
            .delete(ResourceKind::Secret, self.region(), &id)?;
        response.into_body("delete secret")?;
        tracing::info!("scheduled secret '{}' for deletion", id);
        self.state.mark_destroyed();
        self.value = None;
        Ok(true)
    }

    fn refresh(&mut self, session: &Session) -> Result<(), ResourceError> {
        let id = self.require_id("refresh")?;
        let response = session
            .client()
            .describe(ResourceKind::Secret, self.region(), &id)?;
        let record = response.into_body("describe secret")?;
        self.state.replace_remote(record);
        // The cached payload may be stale now; next value() re-reads it.
        self.value = None;
        Ok(())
    }
}

impl FromRemoteRecord for Secret {
    fn from_remote_record(kind: ResourceKind, region: &str, record: Value) -> Self {
        Self {
            state: RemoteState::from_remote(kind, region, record),
            staged: None,
            value: None,
        }
    }
}
