//! Activity form reconciliation.
//!
//! An `ActivityForm` is mounted per visit to `/createActivity` or
//! `/manage/:id`. Its draft is `Draft::New` or `Draft::Existing`, fixed when
//! the form is built, and that variant alone selects create vs. update.

mod values;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::agent::{ActivityAgent, ApiError};
use crate::models::ActivityId;
use crate::overlay::{Notice, Overlay};
use crate::routing::RouteMatch;

pub use values::{
    combine_date_and_time, parse_date, parse_time, split_date_and_time, ActivityFormValues, Field,
    FieldErrors,
};

const SUBMIT_FAILED_MESSAGE: &str = "Problem submitting data";
const LISTING_PATH: &str = "/activities";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    New(ActivityFormValues),
    Existing(ActivityId, ActivityFormValues),
}

impl Draft {
    pub const fn id(&self) -> Option<&ActivityId> {
        match self {
            Self::New(_) => None,
            Self::Existing(id, _) => Some(id),
        }
    }

    pub const fn values(&self) -> &ActivityFormValues {
        match self {
            Self::New(values) | Self::Existing(_, values) => values,
        }
    }

    /// Validation errors for this draft.
    pub fn errors(&self) -> FieldErrors {
        match self {
            Self::New(values) => values.validate_new(),
            Self::Existing(_, values) => values.validate(),
        }
    }

    fn values_mut(&mut self) -> &mut ActivityFormValues {
        match self {
            Self::New(values) | Self::Existing(_, values) => values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Loading,
    Ready,
    LoadFailed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(ActivityId),
    Updated(ActivityId),
}

impl SubmitOutcome {
    pub const fn id(&self) -> &ActivityId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }

    /// Where to navigate after a successful submit.
    pub fn redirect_to(&self) -> String {
        details_path(self.id())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("The activity is still loading")]
    Loading,
    #[error("The activity could not be loaded: {0}")]
    LoadFailed(ApiError),
    #[error("There are no changes to submit")]
    Pristine,
    #[error("The form has errors: {}", describe(.0))]
    Invalid(FieldErrors),
    #[error("A submission is already in progress")]
    InFlight,
    #[error("The form is no longer open")]
    Unmounted,
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn details_path(id: &ActivityId) -> String {
    format!("{LISTING_PATH}/{id}")
}

#[derive(Debug)]
struct FormState {
    draft: Draft,
    initial: ActivityFormValues,
    phase: FormPhase,
}

/// Releases the in-flight slot when the submit settles or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(slot: &'a AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(slot))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ActivityForm {
    agent: Arc<dyn ActivityAgent>,
    overlay: Arc<Overlay>,
    state: Mutex<FormState>,
    submitting: AtomicBool,
    mounted: AtomicBool,
}

impl ActivityForm {
    /// Build a form for an optional route id. With an id the form starts
    /// in `Loading` until [`ActivityForm::load`] settles.
    pub fn new(
        agent: Arc<dyn ActivityAgent>,
        overlay: Arc<Overlay>,
        route_id: Option<ActivityId>,
    ) -> Self {
        let (draft, phase) = match route_id {
            Some(id) => (
                Draft::Existing(id, ActivityFormValues::default()),
                FormPhase::Loading,
            ),
            None => (Draft::New(ActivityFormValues::default()), FormPhase::Ready),
        };
        Self {
            agent,
            overlay,
            state: Mutex::new(FormState {
                draft,
                initial: ActivityFormValues::default(),
                phase,
            }),
            submitting: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
        }
    }

    /// Build a form from a matched route, taking the `id` param if any.
    pub fn for_route(
        agent: Arc<dyn ActivityAgent>,
        overlay: Arc<Overlay>,
        route: &RouteMatch,
    ) -> Self {
        Self::new(agent, overlay, route.param("id").map(ActivityId::from))
    }

    /// Load the existing activity into the draft. A no-op for new drafts
    /// and for forms that already settled.
    pub async fn load(&self) -> Result<(), FormError> {
        let id = {
            let state = self.lock();
            if state.phase != FormPhase::Loading {
                return Ok(());
            }
            match state.draft.id() {
                Some(id) => id.clone(),
                None => return Ok(()),
            }
        };

        tracing::debug!(%id, "Loading activity");
        let result = self.agent.details(&id).await;

        if !self.is_mounted() {
            tracing::debug!(%id, "Discarding activity load for closed form");
            return Err(FormError::Unmounted);
        }

        let mut state = self.lock();
        match result {
            Ok(activity) => {
                let values = ActivityFormValues::from(&activity);
                state.initial = values.clone();
                state.draft = Draft::Existing(id, values);
                state.phase = FormPhase::Ready;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%id, "Failed to load activity: {}", error);
                state.phase = FormPhase::LoadFailed(error.clone());
                Err(FormError::LoadFailed(error))
            }
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.lock().phase.clone()
    }

    pub fn draft(&self) -> Draft {
        self.lock().draft.clone()
    }

    pub fn values(&self) -> ActivityFormValues {
        self.lock().draft.values().clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().draft.errors()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().phase == FormPhase::Loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn is_pristine(&self) -> bool {
        let state = self.lock();
        state.draft.values() == &state.initial
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Apply user input to the draft. Controls are disabled until the
    /// activity has loaded.
    pub fn edit(&self, apply: impl FnOnce(&mut ActivityFormValues)) -> Result<(), FormError> {
        let mut state = self.lock();
        match &state.phase {
            FormPhase::Loading => return Err(FormError::Loading),
            FormPhase::LoadFailed(error) => return Err(FormError::LoadFailed(error.clone())),
            FormPhase::Ready => {}
        }
        apply(state.draft.values_mut());
        Ok(())
    }

    /// Why submit is currently unavailable, if it is.
    pub fn submit_blocker(&self) -> Option<FormError> {
        if self.is_submitting() {
            return Some(FormError::InFlight);
        }
        self.check_submittable(&self.lock()).err()
    }

    pub fn can_submit(&self) -> bool {
        self.submit_blocker().is_none()
    }

    /// Validate, merge date and time, then create or update.
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        if !self.is_mounted() {
            return Err(FormError::Unmounted);
        }
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            return Err(FormError::InFlight);
        };

        let (values, existing, payload) = {
            let state = self.lock();
            self.check_submittable(&state)?;
            let existing = state.draft.id().cloned();
            let id = existing.clone().unwrap_or_else(ActivityId::generate);
            let values = state.draft.values().clone();
            let payload = values.to_payload(id).map_err(FormError::Invalid)?;
            (values, existing, payload)
        };

        let (result, outcome) = if existing.is_some() {
            tracing::info!(id = %payload.id, "Updating activity");
            (
                self.agent.update(&payload).await,
                SubmitOutcome::Updated(payload.id.clone()),
            )
        } else {
            tracing::info!(id = %payload.id, "Creating activity");
            (
                self.agent.create(&payload).await,
                SubmitOutcome::Created(payload.id.clone()),
            )
        };

        if let Err(error) = result {
            tracing::warn!(id = %payload.id, "Activity submit failed: {}", error);
            self.overlay.notify(Notice::error(SUBMIT_FAILED_MESSAGE));
            return Err(FormError::Api(error));
        }

        if !self.is_mounted() {
            tracing::debug!(id = %payload.id, "Submit settled after form closed");
            return Ok(outcome);
        }

        let mut state = self.lock();
        state.draft = Draft::Existing(payload.id, values.clone());
        state.initial = values;
        Ok(outcome)
    }

    /// Path to leave the form for: the activity itself, or the listing.
    pub fn cancel(&self) -> Result<String, FormError> {
        let state = self.lock();
        match state.draft.id() {
            Some(id) => Ok(details_path(id)),
            None if self.is_submitting() => Err(FormError::InFlight),
            None => Ok(LISTING_PATH.to_string()),
        }
    }

    /// Mark the form closed. Pending calls still complete, but their
    /// results no longer touch the form.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    fn check_submittable(&self, state: &FormState) -> Result<(), FormError> {
        match &state.phase {
            FormPhase::Loading => return Err(FormError::Loading),
            FormPhase::LoadFailed(error) => return Err(FormError::LoadFailed(error.clone())),
            FormPhase::Ready => {}
        }
        if state.draft.values() == &state.initial {
            return Err(FormError::Pristine);
        }
        let errors = state.draft.errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(errors))
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
