//! Error taxonomy for the resource layer
//!
//! Nothing here retries. A failure is detected locally and propagated to the
//! caller; the CLI maps any error to a non-zero exit.

use super::kind::ResourceKind;
use thiserror::Error;

/// Errors surfaced by resources, collections and the region cache.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// An operation was invoked in a state that forbids it (e.g. updating a
    /// resource that was never fetched, or mutating a defunct one).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The remote call completed but returned a non-success status. The raw
    /// body is kept for diagnosis; it is not interpreted further.
    #[error("remote call failed with status {status}: {body}")]
    RemoteCall { status: u16, body: String },

    /// `find_one` matched nothing. Fatal for the invoking flow.
    #[error("no {kind} resource matches '{query}'")]
    NotFound { kind: ResourceKind, query: String },

    /// A secret payload did not match its declared schema.
    #[error("secret validation failed: {0}")]
    Validation(String),

    /// The factory has no constructor registered for this kind.
    #[error("don't know how to make a {0}")]
    UnsupportedKind(ResourceKind),

    /// The property bag handed to the factory contained an undeclared
    /// property or a type-mismatched value.
    #[error("invalid properties for {kind}: {message}")]
    InvalidProperties { kind: ResourceKind, message: String },

    /// Mutation attempted on a kind that is read-only in this tool.
    #[error("{0} resources are read-only")]
    ReadOnly(ResourceKind),

    /// The region cache has no snapshot for this collection/region pair.
    #[error("no cached snapshot for {collection} in {region}")]
    CacheMiss { collection: String, region: String },

    /// Transport-level failure from the remote client (connection refused,
    /// malformed response body, ...).
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_call_error_keeps_status_and_body() {
        let err = ResourceError::RemoteCall {
            status: 403,
            body: "{\"message\":\"denied\"}".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn not_found_names_kind_and_query() {
        let err = ResourceError::NotFound {
            kind: ResourceKind::Secret,
            query: "services/foo".to_string(),
        };
        assert!(err.to_string().contains("services/foo"));
    }
}
