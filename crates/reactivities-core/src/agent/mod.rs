//! API collaborator contracts.
//!
//! Components talk to the backend only through these traits. `HttpAgent`
//! implements them over REST; tests substitute in-memory agents.

mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Activity, ActivityId, ActivityPayload, UserIdentity};
use crate::session::SessionToken;

pub use http::HttpAgent;

/// Failures reported by the API collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Token invalid or expired.
    #[error("Not authorized: {0}")]
    Auth(String),
    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Server rejected the payload.
    #[error("Rejected by server: {0}")]
    Validation(String),
    /// Network or availability failure.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Verification link invalid or expired.
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl ApiError {
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Identity and account verification endpoints.
#[async_trait]
pub trait UserAgent: Send + Sync {
    /// Resolve `token` into the user it belongs to.
    async fn current_user(&self, token: &SessionToken) -> ApiResult<UserIdentity>;

    async fn verify_email(&self, token: &str, email: &str) -> ApiResult<()>;

    async fn resend_verification(&self, email: &str) -> ApiResult<()>;
}

/// Activity read/write endpoints.
#[async_trait]
pub trait ActivityAgent: Send + Sync {
    async fn details(&self, id: &ActivityId) -> ApiResult<Activity>;

    async fn create(&self, payload: &ActivityPayload) -> ApiResult<()>;

    async fn update(&self, payload: &ActivityPayload) -> ApiResult<()>;
}
