//! Remote resource client
//!
//! The resource layer never talks to the network directly; it goes through
//! the [`RemoteClient`] capability injected into the session. Every call is a
//! single blocking round trip yielding a status and a raw body; the core
//! checks the status against [`STATUS_OK`] and does not interpret provider
//! error payloads beyond logging them.
//!
//! [`AwsClient`] is the production implementation: SigV4-signed POSTs in the
//! JSON target protocol (`X-Amz-Target`) against per-service endpoints, with
//! `AWS_ENDPOINT_URL` overriding the endpoint for gateways and local stacks.

use super::auth::AwsCredentials;
use super::http::{sanitize_for_log, HttpClient};
use super::sigv4::{self, SigningContext};
use crate::resource::error::ResourceError;
use crate::resource::kind::ResourceKind;
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use url::Url;

/// The single success status every remote call is checked against.
pub const STATUS_OK: u16 = 200;

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Raw outcome of one remote call.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Value,
}

impl RemoteResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: STATUS_OK, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Unwrap the body of a successful call, or log the raw response and
    /// surface a remote-call failure. Never retries.
    pub fn into_body(self, operation: &str) -> Result<Value, ResourceError> {
        if self.is_ok() {
            return Ok(self.body);
        }
        let raw = self.body.to_string();
        tracing::error!(
            "{} failed: {} - {}",
            operation,
            self.status,
            sanitize_for_log(&raw)
        );
        Err(ResourceError::RemoteCall {
            status: self.status,
            body: raw,
        })
    }
}

/// Kind-specific filter for list calls.
///
/// Names starting with an uppercase letter are request parameters (e.g.
/// `RouteTableIds`); lowercase names go into the provider's `Filters` list
/// (e.g. `vpc-id`).
#[derive(Debug, Clone)]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    fn is_request_param(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
    }
}

/// The remote capability every resource operation rides on.
///
/// All calls are blocking; there is no retry and no cancellation. A transport
/// failure is an `Err`; a completed call with a non-success status comes back
/// as a normal [`RemoteResponse`] for the core to judge.
pub trait RemoteClient {
    /// List all records of a kind in a region.
    fn list(&self, kind: ResourceKind, region: &str, filters: &[Filter]) -> Result<RemoteResponse>;

    /// Read one record by id. The body of a successful response is the
    /// record itself.
    fn describe(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse>;

    /// Create a remote record from the given attributes.
    fn create(&self, kind: ResourceKind, region: &str, attributes: &Value) -> Result<RemoteResponse>;

    /// Apply changed fields to an existing record.
    fn update(
        &self,
        kind: ResourceKind,
        region: &str,
        id: &str,
        changes: &Value,
    ) -> Result<RemoteResponse>;

    /// Delete a record.
    fn delete(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse>;

    /// Fetch the sensitive payload of a record (secret value). Distinct from
    /// `describe` so the value never rides along with plain metadata reads.
    fn read_value(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse>;

    /// Undo a pending deletion.
    fn restore(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse>;
}

/// Production client speaking the signed JSON target protocol.
pub struct AwsClient {
    credentials: AwsCredentials,
    http: HttpClient,
    endpoint_override: Option<String>,
}

impl AwsClient {
    pub fn new(credentials: AwsCredentials, endpoint_override: Option<String>) -> Result<Self> {
        Ok(Self {
            credentials,
            http: HttpClient::new()?,
            endpoint_override,
        })
    }

    /// Build a client from ambient credentials.
    pub fn from_env(endpoint_override: Option<String>) -> Result<Self> {
        Self::new(AwsCredentials::resolve()?, endpoint_override)
    }

    fn endpoint_url(&self, service: &str, region: &str) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{service}.{region}.amazonaws.com"),
        }
    }

    /// One signed POST. The canonical path is always `/`.
    fn call(
        &self,
        service: &str,
        region: &str,
        action: &str,
        body: &Value,
    ) -> Result<RemoteResponse> {
        let target = match service {
            "ec2" => format!("AmazonEC2.{action}"),
            "secretsmanager" => format!("secretsmanager.{action}"),
            other => anyhow::bail!("no endpoint binding for service '{other}'"),
        };

        let payload = serde_json::to_string(body).context("Failed to encode request body")?;
        let endpoint = self.endpoint_url(service, region);
        let url = Url::parse(&endpoint)
            .with_context(|| format!("Invalid endpoint URL: {endpoint}"))?;
        let host_name = url
            .host_str()
            .with_context(|| format!("Endpoint URL has no host: {endpoint}"))?;
        let host = match url.port() {
            Some(port) => format!("{host_name}:{port}"),
            None => host_name.to_string(),
        };

        let amz_date = sigv4::amz_date_now();
        let ctx = SigningContext {
            region,
            service,
            host: &host,
            amz_date: &amz_date,
            target: &target,
            content_type: CONTENT_TYPE,
        };
        let authorization = sigv4::authorization_header(&self.credentials, &ctx, payload.as_bytes());

        let mut headers: Vec<(&str, String)> = vec![
            ("content-type", CONTENT_TYPE.to_string()),
            ("x-amz-date", amz_date.clone()),
            ("x-amz-target", target.clone()),
            ("authorization", authorization),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }

        tracing::debug!("invoke: target={}, region={}", target, region);
        let (status, body) = self.http.post_json(url.as_str(), &headers, &payload)?;
        Ok(RemoteResponse { status, body })
    }

    fn secret_request(id: &str) -> Value {
        json!({ "SecretId": id })
    }
}

/// Assemble the request body for a list call from kind-specific filters.
fn list_request(kind: ResourceKind, filters: &[Filter]) -> Value {
    let mut body = Map::new();
    let mut wire_filters: Vec<Value> = Vec::new();

    for filter in filters {
        if filter.is_request_param() {
            if filter.name.ends_with("Ids") {
                body.insert(filter.name.clone(), json!(filter.values));
            } else {
                // Scalar parameters (e.g. TransitGatewayRouteTableId).
                body.insert(filter.name.clone(), json!(filter.values.first()));
            }
        } else {
            wire_filters.push(json!({ "Name": filter.name, "Values": filter.values }));
        }
    }

    // Transit gateway route search only returns static and propagated routes.
    if kind == ResourceKind::TgwRoute && !filters.iter().any(|f| f.name == "type") {
        wire_filters.push(json!({ "Name": "type", "Values": ["static", "propagated"] }));
    }

    if !wire_filters.is_empty() {
        body.insert("Filters".to_string(), Value::Array(wire_filters));
    }
    Value::Object(body)
}

impl RemoteClient for AwsClient {
    fn list(&self, kind: ResourceKind, region: &str, filters: &[Filter]) -> Result<RemoteResponse> {
        let def = kind.def();
        self.call(def.service, region, def.list_action, &list_request(kind, filters))
    }

    fn describe(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        let def = kind.def();

        if kind == ResourceKind::Secret {
            return self.call(def.service, region, "DescribeSecret", &Self::secret_request(id));
        }

        let Some(id_filter) = def.id_filter else {
            anyhow::bail!("{kind} resources cannot be described individually");
        };
        let response = self.call(
            def.service,
            region,
            def.list_action,
            &json!({ id_filter: [id] }),
        )?;
        if !response.is_ok() {
            return Ok(response);
        }

        // Narrow the list response down to the single record; first wins if
        // the filter ever matches more.
        let records = def.extract_records(&response.body);
        match records.into_iter().next() {
            Some(record) => Ok(RemoteResponse::ok(record)),
            None => Ok(RemoteResponse {
                status: 404,
                body: response.body,
            }),
        }
    }

    fn create(&self, kind: ResourceKind, region: &str, attributes: &Value) -> Result<RemoteResponse> {
        match kind {
            ResourceKind::Secret => {
                self.call(kind.def().service, region, "CreateSecret", attributes)
            }
            other => anyhow::bail!("no create binding for {other}"),
        }
    }

    fn update(
        &self,
        kind: ResourceKind,
        region: &str,
        id: &str,
        changes: &Value,
    ) -> Result<RemoteResponse> {
        match kind {
            ResourceKind::Secret => {
                let mut body = Self::secret_request(id);
                if let (Value::Object(body), Value::Object(changes)) = (&mut body, changes) {
                    for (key, value) in changes {
                        body.insert(key.clone(), value.clone());
                    }
                }
                self.call(kind.def().service, region, "UpdateSecret", &body)
            }
            other => anyhow::bail!("no update binding for {other}"),
        }
    }

    fn delete(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        match kind {
            ResourceKind::Secret => {
                self.call(kind.def().service, region, "DeleteSecret", &Self::secret_request(id))
            }
            other => anyhow::bail!("no delete binding for {other}"),
        }
    }

    fn read_value(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        match kind {
            ResourceKind::Secret => {
                self.call(kind.def().service, region, "GetSecretValue", &Self::secret_request(id))
            }
            other => anyhow::bail!("no value binding for {other}"),
        }
    }

    fn restore(&self, kind: ResourceKind, region: &str, id: &str) -> Result<RemoteResponse> {
        match kind {
            ResourceKind::Secret => {
                self.call(kind.def().service, region, "RestoreSecret", &Self::secret_request(id))
            }
            other => anyhow::bail!("no restore binding for {other}"),
        }
    }
}
