//! App boot sequence.
//!
//! Resolves the persisted token into an identity, then marks the session
//! ready. Readiness is set once the identity call settles, whatever its
//! outcome, so a failing identity endpoint can never hang the app.

use crate::agent::{ApiError, UserAgent};
use crate::models::UserIdentity;
use crate::session::Session;

/// What the boot sequence did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// No token was stored; the user is anonymous.
    Anonymous,
    /// The token resolved to this identity.
    Authenticated(UserIdentity),
    /// The token was rejected and has been cleared.
    SignedOut(ApiError),
    /// The identity call failed for another reason; the token is kept.
    IdentityUnavailable(ApiError),
    /// Boot already ran or is running for this session; nothing was done.
    AlreadyReady,
}

impl BootOutcome {
    pub const fn identity(&self) -> Option<&UserIdentity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Run the boot sequence once for `session`.
pub async fn boot<A>(session: &Session, users: &A) -> BootOutcome
where
    A: UserAgent + ?Sized,
{
    if !session.begin_boot() {
        return BootOutcome::AlreadyReady;
    }

    let outcome = match session.token() {
        None => {
            tracing::info!("No stored token, booting anonymous");
            BootOutcome::Anonymous
        }
        Some(token) => match users.current_user(&token).await {
            Ok(identity) => {
                tracing::info!(username = %identity.username, "Identity resolved");
                match session.adopt_identity(&token, identity.clone()) {
                    Ok(true) => BootOutcome::Authenticated(identity),
                    Ok(false) => session
                        .identity()
                        .map_or(BootOutcome::Anonymous, BootOutcome::Authenticated),
                    Err(error) => {
                        tracing::warn!("Failed to persist reissued token: {}", error);
                        BootOutcome::Authenticated(identity)
                    }
                }
            }
            Err(error) if error.is_auth() => {
                tracing::warn!("Stored token rejected, signing out: {}", error);
                if let Err(clear_error) = session.logout() {
                    tracing::warn!("Failed to clear rejected token: {}", clear_error);
                }
                BootOutcome::SignedOut(error)
            }
            Err(error) => {
                tracing::warn!("Failed to load identity: {}", error);
                BootOutcome::IdentityUnavailable(error)
            }
        },
    };

    if session.mark_ready() {
        tracing::info!("App ready");
        outcome
    } else {
        BootOutcome::AlreadyReady
    }
}
