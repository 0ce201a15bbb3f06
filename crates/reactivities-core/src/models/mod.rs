//! Data models for Reactivities

mod activity;
mod user;

pub use activity::{Activity, ActivityId, ActivityPayload, CATEGORY_OPTIONS};
pub use user::UserIdentity;
