//! Region-scoped inspection and management of cloud network resources and
//! the secret store, behind one uniform resource model.
//!
//! The layering is strict: the [`resource`] module never performs I/O on its
//! own; every remote interaction goes through the [`aws::client::RemoteClient`]
//! capability held by the [`session::Session`].

pub mod aws;
pub mod config;
pub mod output;
pub mod resource;
pub mod session;

/// Version injected at compile time via CLAMITY_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("CLAMITY_VERSION") {
    Some(v) => v,
    None => "dev",
};
