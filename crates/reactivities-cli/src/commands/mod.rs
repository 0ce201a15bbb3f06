pub mod activity;
pub mod config;
pub mod navigate;
pub mod session;
pub mod verify;

use std::sync::Arc;

use reactivities_core::agent::HttpAgent;
use reactivities_core::boot::{boot, BootOutcome};
use reactivities_core::config::ClientConfig;
use reactivities_core::overlay::{NoticeLevel, Overlay};
use reactivities_core::routing::Router;
use reactivities_core::session::TokenPersistence;
use reactivities_core::Session;

use crate::config::load_client_config;
use crate::error::CliError;
use crate::token_store::KeyringTokenStore;

/// Everything a command needs to talk to the API as the stored user.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: Session,
    pub agent: Arc<HttpAgent>,
    pub overlay: Arc<Overlay>,
    pub router: Router,
}

impl AppContext {
    pub fn connect(api_url: Option<&str>) -> Result<Self, CliError> {
        let config = load_client_config(api_url).map_err(CliError::Config)?;
        let store = KeyringTokenStore::new(&config.api_base_url);
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: impl TokenPersistence) -> Result<Self, CliError> {
        let session = Session::open(store)?;
        let agent = Arc::new(HttpAgent::new(&config, session.clone())?);
        tracing::debug!(api = %config.api_base_url, "Client context ready");
        Ok(Self {
            config,
            session,
            agent,
            overlay: Arc::new(Overlay::new()),
            router: Router::app_routes(),
        })
    }

    /// Run the boot sequence, reporting absorbed identity failures.
    pub async fn boot(&self) -> BootOutcome {
        let outcome = boot(&self.session, self.agent.as_ref()).await;
        match &outcome {
            BootOutcome::SignedOut(error) => {
                eprintln!("Stored session was rejected ({error}); signed out.");
            }
            BootOutcome::IdentityUnavailable(error) => {
                eprintln!("Could not load your profile: {error}");
            }
            _ => {}
        }
        outcome
    }

    /// Print and clear pending notices.
    pub fn flush_notices(&self) {
        for notice in self.overlay.drain_notices() {
            match notice.level {
                NoticeLevel::Success => println!("{}", notice.message),
                NoticeLevel::Error => eprintln!("{}", notice.message),
            }
        }
    }
}
