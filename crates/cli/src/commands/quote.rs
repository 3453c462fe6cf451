//! Drives the quote wizard from command-line answers, the same event sequence
//! the website sends, and prints the fast-track link on success.

use jesprec_core::{
    config::{AppConfig, LoadOptions},
    domain::lead::Lead,
    wizard::{
        compose, BudgetRange, Phase, QuoteWizard, Route, Timeline, WizardAction, WizardError,
        WizardEvent,
    },
};
use jesprec_gateway::{connect, TableRepository};
use serde::Serialize;
use tracing::info;

use crate::commands::{runtime, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct QuoteArgs {
    pub route: String,
    /// `key=value` answers for the route's deep-dive fields.
    pub specifics: Vec<String>,
    pub budget: String,
    pub timeline: String,
    pub name: String,
    pub email: String,
    pub persist: bool,
}

#[derive(Debug, Serialize)]
struct QuoteSummary {
    route: Route,
    phase: Phase,
    budget: String,
    timeline: String,
    greeting: String,
    fast_track_link: String,
    lead_id: Option<String>,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "quote",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let Some(route) = Route::parse(&args.route) else {
        return CommandResult::failure(
            "quote",
            "invalid_arguments",
            format!("unknown route `{}` (expected media|digital|social|art)", args.route),
            3,
        );
    };
    let events = match events_for(route, args) {
        Ok(events) => events,
        Err(message) => return CommandResult::failure("quote", "invalid_arguments", message, 3),
    };

    let mut wizard = QuoteWizard::new();
    let mut persist_requested = false;
    for event in events {
        match wizard.apply(event) {
            Ok(outcome) => {
                persist_requested |= outcome.actions.contains(&WizardAction::PersistLead);
            }
            Err(error) => return wizard_failure(&error),
        }
    }

    let message = match compose(wizard.request(), &config.messaging.whatsapp_number) {
        Ok(message) => message,
        Err(error) => return wizard_failure(&error),
    };

    let mut lead_id = None;
    if args.persist && persist_requested {
        match persist_lead(&config, &wizard) {
            Ok(id) => lead_id = id,
            Err(failure) => return failure,
        }
    }

    info!(
        event_name = "cli.quote.submitted",
        route = route.as_str(),
        persisted = lead_id.is_some(),
        "quote wizard completed"
    );

    let request = wizard.request();
    let text = format!("{} {}", message.greeting, message.link);
    CommandResult::success_with(
        "quote",
        text,
        QuoteSummary {
            route,
            phase: wizard.phase(),
            budget: request.budget.clone(),
            timeline: request.timeline.clone(),
            greeting: message.greeting.clone(),
            fast_track_link: message.link.clone(),
            lead_id,
        },
    )
}

fn persist_lead(config: &AppConfig, wizard: &QuoteWizard) -> Result<Option<String>, CommandResult> {
    let lead = Lead::from_request(wizard.request())
        .map_err(|error| CommandResult::failure("quote", "lead_validation", error.to_string(), 4))?;
    let runtime = runtime("quote")?;
    runtime.block_on(async {
        let gateway = connect(&config.gateway).await.map_err(|error| {
            CommandResult::failure("quote", "gateway_connectivity", error.to_string(), 5)
        })?;
        let stored = TableRepository::<Lead>::new(gateway).insert(&lead).await.map_err(|error| {
            CommandResult::failure("quote", "lead_persistence", error.to_string(), 5)
        })?;
        Ok::<_, CommandResult>(stored.id.map(|id| id.0))
    })
}

/// The wizard's own event sequence for a one-shot submission.
fn events_for(route: Route, args: &QuoteArgs) -> Result<Vec<WizardEvent>, String> {
    let mut events = vec![WizardEvent::SelectRoute { route }];
    for pair in &args.specifics {
        let (key, value) =
            pair.split_once('=').ok_or_else(|| format!("expected key=value, got `{pair}`"))?;
        events.push(WizardEvent::SetSpecific {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        });
    }
    events.push(WizardEvent::Proceed);
    if !args.budget.is_empty() {
        events.push(WizardEvent::SetBudget { label: budget_label(&args.budget) });
    }
    if !args.timeline.is_empty() {
        events.push(WizardEvent::SetTimeline { label: timeline_label(&args.timeline) });
    }
    events.push(WizardEvent::Proceed);
    events.push(WizardEvent::SetName { value: args.name.clone() });
    events.push(WizardEvent::SetEmail { value: args.email.clone() });
    events.push(WizardEvent::Submit);
    Ok(events)
}

/// Accepts a short tier name in place of the displayed label.
fn budget_label(input: &str) -> String {
    let tier = match input.trim().to_ascii_lowercase().as_str() {
        "entry" => Some(BudgetRange::Entry),
        "standard" => Some(BudgetRange::Standard),
        "premium" => Some(BudgetRange::Premium),
        "flagship" => Some(BudgetRange::Flagship),
        _ => None,
    };
    tier.map(|tier| tier.label().to_string()).unwrap_or_else(|| input.to_string())
}

fn timeline_label(input: &str) -> String {
    let timeline = match input.trim().to_ascii_lowercase().as_str() {
        "asap" => Some(Timeline::Asap),
        "month" | "1-month" => Some(Timeline::WithinOneMonth),
        "later" | "3-months" => Some(Timeline::ThreePlusMonths),
        _ => None,
    };
    timeline.map(|timeline| timeline.label().to_string()).unwrap_or_else(|| input.to_string())
}

fn wizard_failure(error: &WizardError) -> CommandResult {
    match error {
        WizardError::Gated { .. } => CommandResult::failure("quote", "wizard_gate", error.to_string(), 4),
        _ => CommandResult::failure("quote", "invalid_arguments", error.to_string(), 3),
    }
}
