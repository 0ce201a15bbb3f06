//! reactivities-core - Core library for the Reactivities client
//!
//! This crate holds the session bootstrap, route guarding, activity form
//! reconciliation and email verification logic shared by every Reactivities
//! front end, plus an HTTP implementation of the API collaborators.

pub mod agent;
pub mod boot;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod overlay;
pub mod routing;
pub mod session;
pub mod util;
pub mod verification;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
pub use models::{Activity, ActivityId, UserIdentity};
pub use session::{Session, SessionToken};
