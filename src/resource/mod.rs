//! Resource model
//!
//! The core of the crate: a closed set of resource kinds, a uniform
//! lifecycle contract over them, collections with a session-scoped region
//! cache, and the secret store as the one mutable kind.

pub mod cache;
pub mod collection;
pub mod error;
pub mod factory;
pub mod kind;
pub mod model;
pub mod secret;
pub mod tags;
pub mod validate;

pub use collection::{Collection, NetworkResources, Secrets};
pub use error::ResourceError;
pub use factory::new_resource;
pub use kind::ResourceKind;
pub use model::{FromRemoteRecord, NetworkResource, Resource, UpdateProps};
pub use secret::{Secret, SecretProps, SecretType};
