//! Email verification flow.
//!
//! A verification screen resolves the `token` and `email` carried by an
//! emailed link. The status moves out of `Verifying` exactly once and is
//! terminal afterwards; resending the email never changes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::agent::UserAgent;
use crate::overlay::{Modal, Notice, Overlay};
use crate::util::normalize_text_option;

pub const VERIFYING_MESSAGE: &str = "Verifying...";
pub const FAILED_MESSAGE: &str =
    "Verification failed - you can try resending the verification email";
pub const SUCCESS_MESSAGE: &str = "Email has been verified - you can now login";
pub const RESENT_MESSAGE: &str = "Verification email resent - please check your email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Verifying,
    Failed,
    Success,
}

/// Action offered alongside the status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationAction {
    Resend,
    Login,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationView {
    pub status: VerificationStatus,
    pub message: &'static str,
    pub action: Option<VerificationAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Resend is only available after verification failed")]
    ResendUnavailable,
    #[error("The verification link has no email address")]
    MissingEmail,
    #[error("Login is only available after verification succeeded")]
    LoginUnavailable,
}

/// Parameters carried by a verification link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationLink {
    pub token: Option<String>,
    pub email: Option<String>,
}

impl VerificationLink {
    pub fn new(token: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            token: normalize_text_option(Some(token.into())),
            email: normalize_text_option(Some(email.into())),
        }
    }

    /// Read `token` and `email` from a query string, with or without the
    /// leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut link = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "token" => link.token = normalize_text_option(Some(value.into_owned())),
                "email" => link.email = normalize_text_option(Some(value.into_owned())),
                _ => {}
            }
        }
        link
    }
}

pub struct EmailVerification {
    agent: Arc<dyn UserAgent>,
    overlay: Arc<Overlay>,
    link: VerificationLink,
    status: Mutex<VerificationStatus>,
    started: AtomicBool,
    mounted: AtomicBool,
}

impl EmailVerification {
    pub fn new(agent: Arc<dyn UserAgent>, overlay: Arc<Overlay>, link: VerificationLink) -> Self {
        Self {
            agent,
            overlay,
            link,
            status: Mutex::new(VerificationStatus::Verifying),
            started: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn status(&self) -> VerificationStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit the link once. Later calls return the current status.
    pub async fn start(&self) -> VerificationStatus {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.status();
        }

        let (Some(token), Some(email)) = (&self.link.token, &self.link.email) else {
            tracing::warn!("Verification link is missing its token or email");
            return self.settle(VerificationStatus::Failed);
        };

        let next = match self.agent.verify_email(token, email).await {
            Ok(()) => {
                tracing::info!(%email, "Email verified");
                VerificationStatus::Success
            }
            Err(error) => {
                tracing::warn!(%email, "Email verification failed: {}", error);
                VerificationStatus::Failed
            }
        };

        if !self.is_mounted() {
            tracing::debug!("Verification settled after screen closed");
            return self.status();
        }
        self.settle(next)
    }

    /// Ask for a new verification email. Available only after a failure,
    /// and may be repeated.
    pub async fn resend(&self) -> Result<ResendOutcome, VerificationError> {
        if self.status() != VerificationStatus::Failed {
            return Err(VerificationError::ResendUnavailable);
        }
        let email = self
            .link
            .email
            .as_deref()
            .ok_or(VerificationError::MissingEmail)?;

        match self.agent.resend_verification(email).await {
            Ok(()) => {
                tracing::info!(%email, "Verification email resent");
                self.overlay.notify(Notice::success(RESENT_MESSAGE));
                Ok(ResendOutcome::Sent)
            }
            Err(error) => {
                tracing::warn!(%email, "Failed to resend verification email: {}", error);
                Ok(ResendOutcome::Failed)
            }
        }
    }

    /// Open the login modal once the address is verified.
    pub fn open_login(&self) -> Result<(), VerificationError> {
        if self.status() != VerificationStatus::Success {
            return Err(VerificationError::LoginUnavailable);
        }
        self.overlay.open_modal(Modal::LoginForm);
        Ok(())
    }

    pub fn view(&self) -> VerificationView {
        let status = self.status();
        let (message, action) = match status {
            VerificationStatus::Verifying => (VERIFYING_MESSAGE, None),
            VerificationStatus::Failed => (FAILED_MESSAGE, Some(VerificationAction::Resend)),
            VerificationStatus::Success => (SUCCESS_MESSAGE, Some(VerificationAction::Login)),
        };
        VerificationView {
            status,
            message,
            action,
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn settle(&self, next: VerificationStatus) -> VerificationStatus {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status == VerificationStatus::Verifying {
            *status = next;
        }
        *status
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::*;
    use crate::agent::ApiError;
    use crate::overlay::NoticeLevel;
    use crate::test_support::{Call, MockAgent};

    fn flow(agent: &Arc<MockAgent>, link: VerificationLink) -> (EmailVerification, Arc<Overlay>) {
        let overlay = Arc::new(Overlay::new());
        (EmailVerification::new(agent.clone(), overlay.clone(), link), overlay)
    }

    #[test]
    fn link_reads_query_parameters() {
        let link = VerificationLink::from_query("?token=abc%2B1&email=bob%40x.com&utm=mail");
        assert_eq!(link, VerificationLink::new("abc+1", "bob@x.com"));

        let link = VerificationLink::from_query("email=bob@x.com&token=");
        assert_eq!(link.token, None);
        assert_eq!(link.email.as_deref(), Some("bob@x.com"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn starts_verifying() {
        let agent = Arc::new(MockAgent::new());
        let (verification, _) = flow(&agent, VerificationLink::new("abc", "bob@x.com"));

        let view = verification.view();
        assert_eq!(view.status, VerificationStatus::Verifying);
        assert_eq!(view.message, "Verifying...");
        assert_eq!(view.action, None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn invalid_link_fails_and_resend_can_repeat() {
        let agent = Arc::new(
            MockAgent::new().with_verify(Err(ApiError::Verification("bad token".to_string()))),
        );
        let (verification, overlay) = flow(&agent, VerificationLink::new("bad", "bob@x.com"));

        assert_eq!(verification.start().await, VerificationStatus::Failed);
        let view = verification.view();
        assert_eq!(
            view.message,
            "Verification failed - you can try resending the verification email"
        );
        assert_eq!(view.action, Some(VerificationAction::Resend));

        assert_eq!(verification.resend().await, Ok(ResendOutcome::Sent));
        assert_eq!(verification.resend().await, Ok(ResendOutcome::Sent));

        assert_eq!(agent.count(|call| matches!(call, Call::Resend(_))), 2);
        assert_eq!(verification.status(), VerificationStatus::Failed);
        let notices = overlay.drain_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|notice| notice.level == NoticeLevel::Success
            && notice.message == "Verification email resent - please check your email"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn resend_failure_is_silent() {
        let agent = Arc::new(
            MockAgent::new()
                .with_verify(Err(ApiError::Verification("expired".to_string())))
                .with_resend(Err(ApiError::Transport("offline".to_string()))),
        );
        let (verification, overlay) = flow(&agent, VerificationLink::new("old", "bob@x.com"));
        verification.start().await;

        assert_eq!(verification.resend().await, Ok(ResendOutcome::Failed));
        assert!(overlay.drain_notices().is_empty());
        assert_eq!(verification.view().action, Some(VerificationAction::Resend));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn success_offers_login_modal() {
        let agent = Arc::new(MockAgent::new());
        let (verification, overlay) = flow(&agent, VerificationLink::new("good", "bob@x.com"));

        assert_eq!(verification.start().await, VerificationStatus::Success);
        assert_eq!(
            verification.view().message,
            "Email has been verified - you can now login"
        );
        assert_eq!(verification.resend().await, Err(VerificationError::ResendUnavailable));

        verification.open_login().unwrap();
        assert_eq!(overlay.modal(), Some(Modal::LoginForm));
        assert_eq!(
            agent.calls(),
            vec![Call::Verify {
                token: "good".to_string(),
                email: "bob@x.com".to_string(),
            }]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn login_unavailable_before_success() {
        let agent = Arc::new(MockAgent::new());
        let (verification, overlay) = flow(&agent, VerificationLink::new("good", "bob@x.com"));

        assert_eq!(verification.open_login(), Err(VerificationError::LoginUnavailable));
        assert_eq!(overlay.modal(), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_parameters_fail_without_a_call() {
        let agent = Arc::new(MockAgent::new());
        let (verification, _) = flow(&agent, VerificationLink::from_query("token=abc"));

        assert_eq!(verification.start().await, VerificationStatus::Failed);
        assert!(agent.calls().is_empty());
        assert_eq!(verification.resend().await, Err(VerificationError::MissingEmail));
        assert!(agent.calls().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn start_submits_only_once() {
        let agent = Arc::new(MockAgent::new());
        let (verification, _) = flow(&agent, VerificationLink::new("good", "bob@x.com"));

        verification.start().await;
        verification.start().await;

        assert_eq!(agent.count(|call| matches!(call, Call::Verify { .. })), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn result_after_unmount_is_ignored() {
        let gate = Arc::new(Notify::new());
        let agent = Arc::new(MockAgent::new().gated(gate.clone()));
        let (verification, _) = flow(&agent, VerificationLink::new("good", "bob@x.com"));

        let leave = async {
            tokio::task::yield_now().await;
            verification.unmount();
            gate.notify_one();
        };
        let (status, ()) = tokio::join!(verification.start(), leave);

        assert_eq!(status, VerificationStatus::Verifying);
    }
}
