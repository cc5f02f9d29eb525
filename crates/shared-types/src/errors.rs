//! # Error Types
//!
//! Errors shared across subsystems.

use thiserror::Error;

/// Errors raised while resolving a caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The common name does not have the `<namespace>.<id>[.<suffix>]` shape.
    #[error("invalid identity: common name {common_name:?} is not of the form <namespace>.<id>")]
    InvalidIdentity { common_name: String },
}
