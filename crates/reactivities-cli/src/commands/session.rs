use reactivities_core::boot::BootOutcome;

use super::AppContext;
use crate::error::CliError;

pub async fn run_login(context: &AppContext, email: &str, password: &str) -> Result<(), CliError> {
    let identity = context.agent.login(email, password).await?;
    context.session.establish(identity.clone())?;
    println!(
        "Signed in as {} ({})",
        identity.display_name, identity.username
    );
    Ok(())
}

pub fn run_logout(context: &AppContext) -> Result<(), CliError> {
    context.session.logout()?;
    println!("Signed out");
    Ok(())
}

pub async fn run_whoami(context: &AppContext) -> Result<(), CliError> {
    println!("API: {}", context.config.api_base_url);
    match context.boot().await {
        BootOutcome::Authenticated(identity) => {
            println!("{} ({})", identity.display_name, identity.username);
            println!("Image: {}", identity.image_or_placeholder());
        }
        BootOutcome::IdentityUnavailable(_) => {
            println!("Signed in, but the profile is unavailable right now.");
        }
        BootOutcome::Anonymous | BootOutcome::SignedOut(_) | BootOutcome::AlreadyReady => {
            println!("Not signed in.");
        }
    }
    Ok(())
}
