use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::wizard::request::{
    can_proceed_from_investment, can_submit, BudgetRange, QuoteRequest, Timeline,
};
use crate::wizard::schema::{accepts_key, Route};
use crate::wizard::states::{Controls, Phase, TransitionOutcome, WizardAction, WizardEvent};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("event `{event}` is not valid in phase {phase:?}")]
    InvalidEvent { phase: Phase, event: &'static str },
    #[error("cannot leave {phase:?} until these fields are filled: {missing:?}")]
    Gated { phase: Phase, missing: Vec<&'static str> },
    #[error("field `{key}` is not part of the {route} brief")]
    UnknownField { route: Route, key: String },
    #[error("`{value}` is not a valid {field} option")]
    UnknownOption { field: &'static str, value: String },
    #[error("fast-track message link could not be built: {0}")]
    InvalidMessageLink(String),
}

/// One visitor's pass through the quote wizard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWizard {
    phase: Phase,
    request: QuoteRequest,
}

impl Default for QuoteWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self { phase: Phase::Gateway, request: QuoteRequest::default() }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    pub fn controls(&self) -> Controls {
        controls_for(self.phase, &self.request)
    }

    pub fn apply(&mut self, event: WizardEvent) -> Result<TransitionOutcome, WizardError> {
        let outcome = transition(self.phase, &mut self.request, event)?;
        self.phase = outcome.to;
        Ok(outcome)
    }

    pub fn apply_with_audit<S>(
        &mut self,
        event: WizardEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, WizardError>
    where
        S: AuditSink + ?Sized,
    {
        let event_name = event.name();
        let from = self.phase;
        let result = self.apply(event);
        match &result {
            Ok(outcome) => sink.emit(
                AuditEvent::new(
                    audit,
                    "wizard.transition_applied",
                    AuditCategory::Wizard,
                    AuditOutcome::Success,
                )
                .with_metadata("from", outcome.from.as_str())
                .with_metadata("to", outcome.to.as_str())
                .with_metadata("event", event_name),
            ),
            Err(error) => sink.emit(
                AuditEvent::new(
                    audit,
                    "wizard.transition_rejected",
                    AuditCategory::Wizard,
                    AuditOutcome::Rejected,
                )
                .with_metadata("phase", from.as_str())
                .with_metadata("event", event_name)
                .with_metadata("error", error.to_string()),
            ),
        }
        result
    }
}

pub fn controls_for(phase: Phase, request: &QuoteRequest) -> Controls {
    let proceed_enabled = match phase {
        Phase::Gateway => request.route.is_some(),
        Phase::DeepDive => true,
        Phase::Investment => can_proceed_from_investment(request),
        Phase::Finalize => can_submit(request),
        Phase::Success => false,
    };
    Controls {
        proceed_enabled,
        submit_enabled: phase == Phase::Finalize && can_submit(request),
        back_enabled: matches!(phase, Phase::DeepDive | Phase::Investment | Phase::Finalize),
        restart_enabled: phase == Phase::Success,
    }
}

/// Applies `event` to the request and returns where the wizard lands.
///
/// The request is only written once the event has been accepted, so a rejected
/// event leaves it exactly as it was.
pub fn transition(
    current: Phase,
    request: &mut QuoteRequest,
    event: WizardEvent,
) -> Result<TransitionOutcome, WizardError> {
    use Phase::{DeepDive, Finalize, Gateway, Investment, Success};
    use WizardAction::{
        ComposeFastTrackMessage, PersistLead, RenderFieldSchema, RequestContactDetails,
        ResetRequest,
    };

    let invalid = |event: &WizardEvent| WizardError::InvalidEvent {
        phase: current,
        event: event.name(),
    };

    let (to, actions) = match (current, &event) {
        (Gateway, WizardEvent::SelectRoute { route }) => {
            request.route = Some(*route);
            (DeepDive, vec![RenderFieldSchema { route: *route }])
        }
        (Gateway, WizardEvent::Proceed) => match request.route {
            Some(route) => (DeepDive, vec![RenderFieldSchema { route }]),
            None => return Err(WizardError::Gated { phase: Gateway, missing: vec!["route"] }),
        },
        (DeepDive, WizardEvent::SetSpecific { key, value }) => {
            let route = request.route.ok_or_else(|| invalid(&event))?;
            if !accepts_key(route, key) {
                return Err(WizardError::UnknownField { route, key: key.clone() });
            }
            request.specifics.insert(key.clone(), value.clone());
            (DeepDive, Vec::new())
        }
        (DeepDive, WizardEvent::Proceed) => (Investment, Vec::new()),
        (DeepDive, WizardEvent::Back) => (Gateway, Vec::new()),
        (Investment, WizardEvent::SetBudget { label }) => {
            let range = BudgetRange::from_label(label).ok_or_else(|| {
                WizardError::UnknownOption { field: "budget", value: label.clone() }
            })?;
            request.budget = range.label().to_owned();
            (Investment, Vec::new())
        }
        (Investment, WizardEvent::SetTimeline { label }) => {
            let timeline = Timeline::from_label(label).ok_or_else(|| {
                WizardError::UnknownOption { field: "timeline", value: label.clone() }
            })?;
            request.timeline = timeline.label().to_owned();
            (Investment, Vec::new())
        }
        (Investment, WizardEvent::Proceed) => {
            if !can_proceed_from_investment(request) {
                return Err(WizardError::Gated {
                    phase: Investment,
                    missing: request.missing_investment_fields(),
                });
            }
            (Finalize, vec![RequestContactDetails])
        }
        (Investment, WizardEvent::Back) => (DeepDive, Vec::new()),
        (Finalize, WizardEvent::SetName { value }) => {
            request.name = value.clone();
            (Finalize, Vec::new())
        }
        (Finalize, WizardEvent::SetEmail { value }) => {
            request.email = value.clone();
            (Finalize, Vec::new())
        }
        (Finalize, WizardEvent::Submit) | (Finalize, WizardEvent::Proceed) => {
            if !can_submit(request) {
                return Err(WizardError::Gated {
                    phase: Finalize,
                    missing: request.missing_submission_fields(),
                });
            }
            (Success, vec![PersistLead, ComposeFastTrackMessage])
        }
        (Finalize, WizardEvent::Back) => (Investment, Vec::new()),
        (Success, WizardEvent::Restart) => {
            *request = QuoteRequest::default();
            (Gateway, vec![ResetRequest])
        }
        _ => return Err(invalid(&event)),
    };

    Ok(TransitionOutcome { from: current, to, event, actions })
}
