use reactivities_core::agent::ActivityAgent;
use reactivities_core::routing::{Navigation, RouteMatch, Screen};
use reactivities_core::verification::VerificationLink;
use reactivities_core::ActivityId;

use super::verify::verify_link;
use super::AppContext;
use crate::error::CliError;

pub async fn run_open(context: &AppContext, path: &str) -> Result<(), CliError> {
    context.boot().await;

    match context
        .router
        .resolve(path, &context.session.navigation_context())
    {
        Navigation::Loading => println!("Loading..."),
        Navigation::Redirect { to } => {
            println!("Redirected to {to}. Sign in to open {path}.");
        }
        Navigation::Render(route) => {
            println!("{}", describe_route(&route));
            render(context, &route).await?;
        }
    }
    Ok(())
}

/// One-line summary of what a matched route shows.
pub fn describe_route(route: &RouteMatch) -> String {
    let chrome = if route.has_navbar() { "" } else { " (no navigation bar)" };
    let screen = match route.screen {
        Screen::Home => "Home".to_string(),
        Screen::ActivityDashboard => "Activity dashboard".to_string(),
        Screen::ActivityDetails => {
            format!("Activity {}", route.param("id").unwrap_or_default())
        }
        Screen::ActivityForm => match route.param("id") {
            Some(id) => format!("Edit activity {id}"),
            None => "Create activity".to_string(),
        },
        Screen::Profile => format!("Profile of {}", route.param("username").unwrap_or_default()),
        Screen::VerifyEmail => "Email verification".to_string(),
        Screen::NotFound => format!("Not found: {}", route.pattern),
    };
    format!("{screen}{chrome}")
}

async fn render(context: &AppContext, route: &RouteMatch) -> Result<(), CliError> {
    match route.screen {
        Screen::ActivityDetails => {
            let Some(id) = route.param("id") else {
                return Err(CliError::UnexpectedRoute(route.pattern.clone()));
            };
            let activity = context.agent.details(&ActivityId::from(id)).await?;
            println!("  {} [{}]", activity.title, activity.category);
            println!("  {}", activity.date.format("%Y-%m-%d %H:%M"));
            println!("  {}, {}", activity.venue, activity.city);
            println!("  {}", activity.description);
        }
        Screen::ActivityForm => {
            let hint = match route.param("id") {
                Some(id) => format!("reactivities activity edit {id}"),
                None => "reactivities activity create".to_string(),
            };
            println!("Use `{hint}` to fill in the form.");
        }
        Screen::VerifyEmail => {
            let link = VerificationLink::from_query(route.query.as_deref().unwrap_or_default());
            verify_link(context, link).await?;
        }
        Screen::Home | Screen::ActivityDashboard | Screen::Profile | Screen::NotFound => {}
    }
    Ok(())
}
