use reactivities_core::form::{parse_date, parse_time, ActivityForm, ActivityFormValues, FormError};
use reactivities_core::routing::{Navigation, Screen};

use super::AppContext;
use crate::cli::ActivityFields;
use crate::error::CliError;

pub async fn run_activity_create(
    context: &AppContext,
    fields: &ActivityFields,
) -> Result<(), CliError> {
    let form = open_form(context, "/createActivity").await?;
    submit_fields(context, &form, fields).await
}

pub async fn run_activity_edit(
    context: &AppContext,
    id: &str,
    fields: &ActivityFields,
) -> Result<(), CliError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::UnexpectedRoute("/manage/".to_string()));
    }
    let form = open_form(context, &format!("/manage/{id}")).await?;
    submit_fields(context, &form, fields).await
}

/// Copy the provided fields into the form values.
pub fn apply_fields(
    values: &mut ActivityFormValues,
    fields: &ActivityFields,
) -> Result<(), CliError> {
    if let Some(title) = &fields.title {
        values.title.clone_from(title);
    }
    if let Some(description) = &fields.description {
        values.description.clone_from(description);
    }
    if let Some(category) = &fields.category {
        values.category = category.trim().to_lowercase();
    }
    if let Some(date) = &fields.date {
        values.date = Some(parse_date(date)?);
    }
    if let Some(time) = &fields.time {
        values.time = Some(parse_time(time)?);
    }
    if let Some(city) = &fields.city {
        values.city.clone_from(city);
    }
    if let Some(venue) = &fields.venue {
        values.venue.clone_from(venue);
    }
    Ok(())
}

async fn open_form(context: &AppContext, path: &str) -> Result<ActivityForm, CliError> {
    context.boot().await;

    let route = match context
        .router
        .resolve(path, &context.session.navigation_context())
    {
        Navigation::Render(route) if route.screen == Screen::ActivityForm => route,
        Navigation::Redirect { .. } => return Err(CliError::NotSignedIn),
        Navigation::Render(route) => return Err(CliError::UnexpectedRoute(route.pattern)),
        Navigation::Loading => return Err(CliError::UnexpectedRoute(path.to_string())),
    };

    let form = ActivityForm::for_route(context.agent.clone(), context.overlay.clone(), &route);
    form.load().await?;
    Ok(form)
}

async fn submit_fields(
    context: &AppContext,
    form: &ActivityForm,
    fields: &ActivityFields,
) -> Result<(), CliError> {
    let mut applied = Ok(());
    form.edit(|values| applied = apply_fields(values, fields))?;
    applied?;

    let result = form.submit().await;
    context.flush_notices();
    match result {
        Ok(outcome) => {
            println!("Saved activity {}", outcome.id());
            println!("Open {}", outcome.redirect_to());
            Ok(())
        }
        Err(FormError::Invalid(errors)) => {
            for (field, message) in &errors {
                eprintln!("  {field}: {message}");
            }
            Err(FormError::Invalid(errors).into())
        }
        Err(error) => {
            if let Ok(back) = form.cancel() {
                tracing::debug!(%back, "Leaving activity form");
            }
            Err(error.into())
        }
    }
}
