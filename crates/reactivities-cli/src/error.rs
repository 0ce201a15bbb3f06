use std::io;

use reactivities_core::agent::ApiError;
use reactivities_core::form::FormError;
use reactivities_core::verification::VerificationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reactivities_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not signed in. Run `reactivities login` first.")]
    NotSignedIn,
    #[error("Unexpected route for this command: {0}")]
    UnexpectedRoute(String),
}
