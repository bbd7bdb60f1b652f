//! Authentication seam for the HTTP layer.
//!
//! Modules do NOT depend on any specific session provider. The server
//! injects a concrete `Authenticator` at startup and runs it once per
//! request, in front of every protected route.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// The authenticated caller, as established by an `Authenticator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject id issued by the session provider.
    pub subject: String,
    /// Display name, if the provider supplies one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".into(),
            name: String::new(),
        }
    }
}

/// Pluggable authenticator.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate a request from its headers.
    ///
    /// Returns the caller on success, `ServiceError::Unauthorized` otherwise.
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError>;
}

/// An authenticator that lets everything through as `anonymous`.
/// Used for local development and tests.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Ok(Principal::anonymous())
    }
}

/// An authenticator that rejects everything. Used for testing.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Err(ServiceError::Unauthorized("access denied".into()))
    }
}
