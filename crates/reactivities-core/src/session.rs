//! Session token holder.
//!
//! `Session` is a cheap, cloneable handle over the shared session state:
//! the persisted token, the identity resolved for it, and the monotonic
//! readiness flag set by the boot sequence.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::UserIdentity;
use crate::routing::NavigationContext;

/// Opaque authentication credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("SessionToken([REDACTED])")
    }
}

/// Storage that keeps the token across process restarts.
pub trait TokenPersistence: Send + Sync + 'static {
    fn load_token(&self) -> Result<Option<SessionToken>>;
    fn save_token(&self, token: &SessionToken) -> Result<()>;
    fn clear_token(&self) -> Result<()>;
}

/// In-process token store, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<SessionToken>>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(SessionToken::new(token)))),
        }
    }
}

impl TokenPersistence for MemoryTokenStore {
    fn load_token(&self) -> Result<Option<SessionToken>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save_token(&self, token: &SessionToken) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<SessionToken>,
    identity: Option<UserIdentity>,
}

/// Shared handle to the signed-in user's token, identity and readiness.
///
/// Clones observe the same state. Mutations go through login
/// ([`Session::establish`]), the boot sequence and [`Session::logout`].
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenPersistence>,
    state: Arc<RwLock<SessionState>>,
    boot_started: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
}

impl Session {
    /// Open a session, reading the persisted token from `store`.
    pub fn open(store: impl TokenPersistence) -> Result<Self> {
        let token = store.load_token()?;
        tracing::debug!(has_token = token.is_some(), "Session opened");
        Ok(Self {
            store: Arc::new(store),
            state: Arc::new(RwLock::new(SessionState {
                token,
                identity: None,
            })),
            boot_started: Arc::new(AtomicBool::new(false)),
            ready: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn token(&self) -> Option<SessionToken> {
        self.read().token.clone()
    }

    pub fn has_token(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.read().identity.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Claim the single boot run. Returns `true` only for the first caller.
    pub(crate) fn begin_boot(&self) -> bool {
        !self.boot_started.swap(true, Ordering::SeqCst)
    }

    /// Flip readiness on. Returns `true` only for the call that flipped it.
    pub(crate) fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::SeqCst)
    }

    /// Snapshot used by the router to decide render vs. redirect.
    pub fn navigation_context(&self) -> NavigationContext {
        NavigationContext {
            ready: self.is_ready(),
            authenticated: self.has_token(),
        }
    }

    /// Store a new token. A previously resolved identity for another token
    /// is dropped.
    pub fn set_token(&self, token: SessionToken) -> Result<()> {
        self.store.save_token(&token)?;
        let mut state = self.write();
        if state.token.as_ref() != Some(&token) {
            state.identity = None;
        }
        state.token = Some(token);
        Ok(())
    }

    /// Adopt an identity returned by login, persisting its token.
    pub fn establish(&self, identity: UserIdentity) -> Result<()> {
        self.store.save_token(&identity.token)?;
        tracing::info!(username = %identity.username, "Session established");
        let mut state = self.write();
        state.token = Some(identity.token.clone());
        state.identity = Some(identity);
        Ok(())
    }

    /// Record the identity resolved for `sent`, adopting the token it
    /// carries. The server may reissue the token, so the returned one is
    /// persisted in place of `sent`. A storage error is returned after the
    /// identity has been adopted in memory.
    ///
    /// Ignored when the session moved to another token (or logged out)
    /// while the identity was being loaded.
    pub(crate) fn adopt_identity(
        &self,
        sent: &SessionToken,
        identity: UserIdentity,
    ) -> Result<bool> {
        let reissued = {
            let mut state = self.write();
            if state.token.as_ref() != Some(sent) {
                tracing::debug!("Identity resolved for a stale token; ignoring");
                return Ok(false);
            }
            state.token = Some(identity.token.clone());
            let reissued = (&identity.token != sent).then(|| identity.token.clone());
            state.identity = Some(identity);
            reissued
        };
        if let Some(token) = reissued {
            self.store.save_token(&token)?;
            tracing::debug!("Stored reissued token");
        }
        Ok(true)
    }

    /// Clear token and identity, in memory and in storage.
    pub fn logout(&self) -> Result<()> {
        {
            let mut state = self.write();
            state.token = None;
            state.identity = None;
        }
        tracing::info!("Session cleared");
        self.store.clear_token()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        formatter
            .debug_struct("Session")
            .field("has_token", &state.token.is_some())
            .field("identity", &state.identity)
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::identity;

    #[test]
    fn open_reads_persisted_token() {
        let session = Session::open(MemoryTokenStore::with_token("abc")).unwrap();
        assert_eq!(session.token(), Some(SessionToken::new("abc")));
        assert!(!session.is_ready());
        assert!(session.identity().is_none());
    }

    #[test]
    fn token_survives_reopen_through_store() {
        let store = MemoryTokenStore::default();
        let session = Session::open(store.clone()).unwrap();
        session.set_token(SessionToken::new("persisted")).unwrap();

        let reopened = Session::open(store).unwrap();
        assert_eq!(reopened.token(), Some(SessionToken::new("persisted")));
    }

    #[test]
    fn establish_sets_token_and_identity() {
        let store = MemoryTokenStore::default();
        let session = Session::open(store.clone()).unwrap();
        session.establish(identity("alice", "tok")).unwrap();

        assert_eq!(session.identity().unwrap().username, "alice");
        assert_eq!(store.load_token().unwrap(), Some(SessionToken::new("tok")));
    }

    #[test]
    fn logout_clears_memory_and_store() {
        let store = MemoryTokenStore::default();
        let session = Session::open(store.clone()).unwrap();
        session.establish(identity("alice", "tok")).unwrap();

        session.logout().unwrap();
        assert!(!session.has_token());
        assert!(session.identity().is_none());
        assert_eq!(store.load_token().unwrap(), None);
    }

    #[test]
    fn set_token_drops_identity_of_previous_token() {
        let session = Session::open(MemoryTokenStore::default()).unwrap();
        session.establish(identity("alice", "old")).unwrap();
        session.set_token(SessionToken::new("new")).unwrap();
        assert!(session.identity().is_none());
    }

    #[test]
    fn identity_for_stale_token_is_ignored() {
        let store = MemoryTokenStore::with_token("current");
        let session = Session::open(store.clone()).unwrap();
        let previous = SessionToken::new("previous");

        assert!(!session
            .adopt_identity(&previous, identity("alice", "reissued"))
            .unwrap());
        assert!(session.identity().is_none());
        assert_eq!(store.load_token().unwrap(), Some(SessionToken::new("current")));
    }

    #[test]
    fn reissued_token_replaces_sent_token() {
        let store = MemoryTokenStore::with_token("current");
        let session = Session::open(store.clone()).unwrap();
        let sent = SessionToken::new("current");

        assert!(session
            .adopt_identity(&sent, identity("alice", "reissued"))
            .unwrap());

        assert_eq!(session.identity().unwrap().username, "alice");
        assert_eq!(session.token(), Some(SessionToken::new("reissued")));
        assert_eq!(store.load_token().unwrap(), Some(SessionToken::new("reissued")));
    }

    #[test]
    fn boot_can_be_claimed_once() {
        let session = Session::open(MemoryTokenStore::default()).unwrap();
        let clone = session.clone();
        assert!(session.begin_boot());
        assert!(!clone.begin_boot());
    }

    #[test]
    fn readiness_is_monotonic() {
        let session = Session::open(MemoryTokenStore::default()).unwrap();
        assert!(session.mark_ready());
        assert!(!session.mark_ready());
        session.logout().unwrap();
        assert!(session.is_ready());
    }

    #[test]
    fn clones_share_state() {
        let session = Session::open(MemoryTokenStore::default()).unwrap();
        let other = session.clone();
        session.set_token(SessionToken::new("shared")).unwrap();
        assert!(other.has_token());
    }

    #[test]
    fn debug_hides_token() {
        let session = Session::open(MemoryTokenStore::with_token("secret-token")).unwrap();
        assert!(!format!("{session:?}").contains("secret-token"));
        assert!(!format!("{:?}", SessionToken::new("secret-token")).contains("secret-token"));
    }
}
