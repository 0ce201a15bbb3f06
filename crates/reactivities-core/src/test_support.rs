//! In-memory collaborators for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Notify;

use crate::agent::{ActivityAgent, ApiError, ApiResult, UserAgent};
use crate::models::{Activity, ActivityId, ActivityPayload, UserIdentity};
use crate::session::SessionToken;

pub fn identity(username: &str, token: &str) -> UserIdentity {
    UserIdentity {
        username: username.to_string(),
        display_name: username.to_uppercase(),
        image: None,
        token: SessionToken::new(token),
    }
}

pub fn at(date: &str, time: &str) -> NaiveDateTime {
    let date = date.parse::<NaiveDate>().unwrap();
    date.and_time(time.parse().unwrap())
}

pub fn activity(id: &str) -> Activity {
    Activity {
        id: ActivityId::from(id),
        title: "Run".to_string(),
        description: "Morning run".to_string(),
        category: "travel".to_string(),
        date: at("2024-05-01", "09:00:00"),
        city: "London".to_string(),
        venue: "Hyde Park".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser(String),
    Details(ActivityId),
    Create(ActivityPayload),
    Update(ActivityPayload),
    Verify { token: String, email: String },
    Resend(String),
}

/// Scripted agent recording every call it receives.
///
/// When gated, each call waits for one `Notify` permit before answering.
pub struct MockAgent {
    user: ApiResult<UserIdentity>,
    activity: ApiResult<Activity>,
    write: ApiResult<()>,
    verify: ApiResult<()>,
    resend: ApiResult<()>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self {
            user: Err(ApiError::Auth("no user scripted".to_string())),
            activity: Err(ApiError::NotFound("no activity scripted".to_string())),
            write: Ok(()),
            verify: Ok(()),
            resend: Ok(()),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, result: ApiResult<UserIdentity>) -> Self {
        self.user = result;
        self
    }

    pub fn with_activity(mut self, result: ApiResult<Activity>) -> Self {
        self.activity = result;
        self
    }

    pub fn with_write(mut self, result: ApiResult<()>) -> Self {
        self.write = result;
        self
    }

    pub fn with_verify(mut self, result: ApiResult<()>) -> Self {
        self.verify = result;
        self
    }

    pub fn with_resend(mut self, result: ApiResult<()>) -> Self {
        self.resend = result;
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl UserAgent for MockAgent {
    async fn current_user(&self, token: &SessionToken) -> ApiResult<UserIdentity> {
        self.record(Call::CurrentUser(token.as_str().to_string()))
            .await;
        self.user.clone()
    }

    async fn verify_email(&self, token: &str, email: &str) -> ApiResult<()> {
        self.record(Call::Verify {
            token: token.to_string(),
            email: email.to_string(),
        })
        .await;
        self.verify.clone()
    }

    async fn resend_verification(&self, email: &str) -> ApiResult<()> {
        self.record(Call::Resend(email.to_string())).await;
        self.resend.clone()
    }
}

#[async_trait]
impl ActivityAgent for MockAgent {
    async fn details(&self, id: &ActivityId) -> ApiResult<Activity> {
        self.record(Call::Details(id.clone())).await;
        self.activity.clone()
    }

    async fn create(&self, payload: &ActivityPayload) -> ApiResult<()> {
        self.record(Call::Create(payload.clone())).await;
        self.write.clone()
    }

    async fn update(&self, payload: &ActivityPayload) -> ApiResult<()> {
        self.record(Call::Update(payload.clone())).await;
        self.write.clone()
    }
}
