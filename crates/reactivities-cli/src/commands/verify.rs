use reactivities_core::overlay::Modal;
use reactivities_core::verification::{
    EmailVerification, ResendOutcome, VerificationAction, VerificationLink,
};

use super::AppContext;
use crate::error::CliError;

pub async fn run_verify(context: &AppContext, link: &str) -> Result<(), CliError> {
    verify_link(context, VerificationLink::from_query(&link_query(link))).await
}

/// Drive one verification link to its outcome and print the result.
pub async fn verify_link(context: &AppContext, link: VerificationLink) -> Result<(), CliError> {
    let email = link.email.clone();
    let verification = EmailVerification::new(context.agent.clone(), context.overlay.clone(), link);
    println!("{}", verification.view().message);

    verification.start().await;
    let view = verification.view();
    println!("{}", view.message);

    match view.action {
        Some(VerificationAction::Resend) => {
            if let Some(email) = email {
                println!("Run `reactivities resend --email {email}` for a new link.");
            }
        }
        Some(VerificationAction::Login) => {
            verification.open_login()?;
            if context.overlay.modal() == Some(Modal::LoginForm) {
                println!("Run `reactivities login --email <email> --password <password>` to sign in.");
                context.overlay.close_modal();
            }
        }
        None => {}
    }
    context.flush_notices();
    Ok(())
}

/// Ask for a fresh verification email for `email`.
pub async fn run_resend(context: &AppContext, email: &str) -> Result<(), CliError> {
    let link = VerificationLink {
        token: None,
        email: Some(email.trim().to_string()).filter(|email| !email.is_empty()),
    };
    let verification = EmailVerification::new(context.agent.clone(), context.overlay.clone(), link);
    // No token, so this settles as failed without calling the API.
    verification.start().await;

    let outcome = verification.resend().await?;
    context.flush_notices();
    if outcome == ResendOutcome::Failed {
        eprintln!("Could not resend the verification email. Try again later.");
    }
    Ok(())
}

/// Extract the query string from a full link, a path with a query, or a
/// bare query string.
pub fn link_query(link: &str) -> String {
    let link = link.trim();
    if let Ok(url) = url::Url::parse(link) {
        return url.query().unwrap_or_default().to_string();
    }
    match link.split_once('?') {
        Some((_, query)) => query.to_string(),
        None => link.to_string(),
    }
}
