//! AWS client layer
//!
//! Credential resolution, SigV4 request signing, the blocking HTTP wrapper
//! and the remote client the resource layer talks through.

pub mod auth;
pub mod client;
pub mod http;
pub mod sigv4;

pub use client::{AwsClient, Filter, RemoteClient, RemoteResponse, STATUS_OK};
