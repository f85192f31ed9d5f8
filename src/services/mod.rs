//! Service layer module
//!
//! Contains the identity-service client and the model registry that
//! aggregates and dispatches across provider adapters

pub mod identity;
pub mod registry;

pub use identity::{AuthenticatedUser, IdentityClient};
pub use registry::ModelRegistry;
