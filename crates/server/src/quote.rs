//! Quote wizard routes.
//!
//! - `GET  /api/v1/quote/routes`: GATEWAY choices, budget and timeline labels
//! - `POST /api/v1/quote/sessions`: start a wizard session
//! - `GET  /api/v1/quote/sessions/{id}`: current view of a session
//! - `POST /api/v1/quote/sessions/{id}/events`: apply one wizard event

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use jesprec_core::{
    audit::AuditContext,
    domain::{lead::Lead, RowId},
    errors::DomainError,
    wizard::{
        compose, schema_for, BudgetRange, Controls, FastTrackMessage, FieldDescriptor, Phase,
        QuoteRequest, QuoteWizard, RouteOption, Timeline, WizardAction, WizardEvent, ROUTE_OPTIONS,
    },
};
use jesprec_gateway::TableRepository;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    api::{correlation_id, failure, not_found, ApiFailure, ApiResult},
    state::AppState,
};

const SESSION_NOT_FOUND: &str = "quote session not found";

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub routes: &'static [RouteOption],
    pub budgets: Vec<&'static str>,
    pub timelines: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: Phase,
    pub step: u8,
    pub request: QuoteRequest,
    pub fields: &'static [FieldDescriptor],
    pub controls: Controls,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fast_track: Option<FastTrackMessage>,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub session: SessionView,
    pub actions: Vec<WizardAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<RowId>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/quote/routes", get(list_routes))
        .route("/api/v1/quote/sessions", post(create_session))
        .route("/api/v1/quote/sessions/{id}", get(get_session))
        .route("/api/v1/quote/sessions/{id}/events", post(apply_event))
}

fn view(
    state: &AppState,
    session_id: &str,
    wizard: &QuoteWizard,
    correlation_id: &str,
) -> Result<SessionView, ApiFailure> {
    let request = wizard.request();
    let fast_track = match wizard.phase() {
        Phase::Success => Some(
            compose(request, &state.whatsapp_number)
                .map_err(|error| failure(DomainError::from(error), correlation_id))?,
        ),
        _ => None,
    };
    Ok(SessionView {
        session_id: session_id.to_owned(),
        phase: wizard.phase(),
        step: wizard.phase().step_number(),
        request: request.clone(),
        fields: request.route.map(schema_for).unwrap_or(&[]),
        controls: wizard.controls(),
        fast_track,
    })
}

pub async fn list_routes() -> Json<RoutesResponse> {
    Json(RoutesResponse {
        routes: &ROUTE_OPTIONS,
        budgets: BudgetRange::ALL.into_iter().map(BudgetRange::label).collect(),
        timelines: Timeline::ALL.into_iter().map(Timeline::label).collect(),
    })
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiFailure> {
    let correlation_id = correlation_id();
    let session_id = Uuid::new_v4().to_string();
    let wizard = QuoteWizard::new();
    let view = view(&state, &session_id, &wizard, &correlation_id)?;
    state.quote_sessions.create(session_id.clone(), wizard).await;

    info!(
        event_name = "quote.session.created",
        correlation_id = %correlation_id,
        session_id = %session_id,
        "quote session created"
    );
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<SessionView> {
    let correlation_id = correlation_id();
    let mut session = state
        .quote_sessions
        .lock(&session_id)
        .await
        .ok_or_else(|| not_found(SESSION_NOT_FOUND, &correlation_id))?;
    session.touch();
    Ok(Json(view(&state, &session_id, &session.wizard, &correlation_id)?))
}

/// Applies the event to a copy of the session while holding that session's
/// lock. The copy replaces the stored wizard only after every side effect
/// succeeded, so a repeated Submit finds the session already in SUCCESS.
pub async fn apply_event(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    Json(event): Json<WizardEvent>,
) -> ApiResult<EventResponse> {
    let correlation_id = correlation_id();
    let mut session = state
        .quote_sessions
        .lock(&session_id)
        .await
        .ok_or_else(|| not_found(SESSION_NOT_FOUND, &correlation_id))?;
    session.touch();
    let mut wizard = session.wizard.clone();

    let audit = AuditContext::new(Some(session_id.clone()), correlation_id.clone(), "visitor");
    let outcome = wizard
        .apply_with_audit(event, state.audit.as_ref(), &audit)
        .map_err(|error| failure(DomainError::from(error), &correlation_id))?;

    let mut lead_id = None;
    if outcome.actions.contains(&WizardAction::PersistLead) {
        let lead = Lead::from_request(wizard.request())
            .map_err(|error| failure(error, &correlation_id))?;
        let stored = TableRepository::<Lead>::new(state.gateway.clone())
            .insert(&lead)
            .await
            .map_err(|error| failure(error, &correlation_id))?;
        info!(
            event_name = "quote.lead.persisted",
            correlation_id = %correlation_id,
            session_id = %session_id,
            route = stored.route.as_str(),
            "quote lead stored"
        );
        lead_id = stored.id;
    }

    let view = view(&state, &session_id, &wizard, &correlation_id)?;
    session.wizard = wizard;
    Ok(Json(EventResponse { session: view, actions: outcome.actions, lead_id }))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        Json,
    };
    use jesprec_core::{
        audit::InMemoryAuditSink,
        session::AdminSession,
        wizard::{Phase, Route, WizardEvent},
    };
    use jesprec_gateway::{filter::Query, Gateway, GatewayError, InMemoryGateway};
    use serde_json::Value;

    use super::{apply_event, create_session, get_session, list_routes};
    use crate::state::AppState;

    /// Holds every insert long enough for a second request to arrive.
    struct SlowInserts(InMemoryGateway);

    #[async_trait]
    impl Gateway for SlowInserts {
        async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.insert(table, rows).await
        }

        async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
            self.0.select(table, query).await
        }

        async fn update(
            &self,
            table: &str,
            patch: Value,
            query: &Query,
        ) -> Result<Vec<Value>, GatewayError> {
            self.0.update(table, patch, query).await
        }

        async fn delete(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
            self.0.delete(table, query).await
        }

        async fn count(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
            self.0.count(table, query).await
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, GatewayError> {
            self.0.sign_in(email, password).await
        }

        async fn sign_out(&self, session: &AdminSession) -> Result<(), GatewayError> {
            self.0.sign_out(session).await
        }

        async fn current_user(
            &self,
            access_token: &str,
        ) -> Result<Option<AdminSession>, GatewayError> {
            self.0.current_user(access_token).await
        }

        fn authorized(&self, session: &AdminSession) -> Arc<dyn Gateway> {
            self.0.authorized(session)
        }
    }

    fn state(gateway: InMemoryGateway) -> AppState {
        AppState::new(Arc::new(gateway), "2348000000000")
            .with_audit(Arc::new(InMemoryAuditSink::default()))
    }

    async fn start(state: &AppState) -> String {
        let (status, Json(view)) = create_session(State(state.clone())).await.expect("session");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.phase, Phase::Gateway);
        view.session_id
    }

    async fn send(state: &AppState, id: &str, event: WizardEvent) -> super::EventResponse {
        let Json(response) = apply_event(Path(id.to_owned()), State(state.clone()), Json(event))
            .await
            .expect("event should be accepted");
        response
    }

    fn digital_events() -> Vec<WizardEvent> {
        vec![
            WizardEvent::SelectRoute { route: Route::Digital },
            WizardEvent::SetSpecific { key: "tech".to_owned(), value: "Custom Web".to_owned() },
            WizardEvent::SetSpecific { key: "hosting".to_owned(), value: "No".to_owned() },
            WizardEvent::Proceed,
            WizardEvent::SetBudget { label: "₦500k – ₦1.5M".to_owned() },
            WizardEvent::SetTimeline { label: "ASAP".to_owned() },
            WizardEvent::Proceed,
            WizardEvent::SetName { value: "Ada Obi".to_owned() },
            WizardEvent::SetEmail { value: "ada@example.com".to_owned() },
        ]
    }

    #[tokio::test]
    async fn routes_list_the_four_categories() {
        let Json(routes) = list_routes().await;
        assert_eq!(routes.routes.len(), 4);
        assert_eq!(routes.budgets.len(), 4);
        assert_eq!(routes.timelines, vec!["ASAP", "Within 1 Month", "3+ Months"]);
    }

    #[tokio::test]
    async fn submit_persists_a_lead_and_composes_the_link() {
        let gateway = InMemoryGateway::new();
        let state = state(gateway.clone());
        let id = start(&state).await;
        for event in digital_events() {
            send(&state, &id, event).await;
        }

        let response = send(&state, &id, WizardEvent::Submit).await;
        assert_eq!(response.session.phase, Phase::Success);
        assert!(response.lead_id.is_some());
        let fast_track = response.session.fast_track.expect("success shows the fast-track link");
        assert!(fast_track.text.contains("DIGITAL"));
        assert!(fast_track.text.contains("Ada Obi"));
        assert!(fast_track.link.starts_with("https://wa.me/2348000000000?text="));
        assert_eq!(fast_track.greeting, "Thank you, Ada!");

        let leads = gateway.select("leads", &Query::new()).await.expect("leads");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0]["route"], "DIGITAL");
        assert_eq!(leads[0]["status"], "new");
    }

    #[tokio::test]
    async fn failed_persistence_keeps_the_session_in_finalize() {
        let gateway = InMemoryGateway::new();
        gateway.fail_writes_to("leads", "permission denied for table leads").await;
        let state = state(gateway);
        let id = start(&state).await;
        for event in digital_events() {
            send(&state, &id, event).await;
        }

        let result =
            apply_event(Path(id.clone()), State(state.clone()), Json(WizardEvent::Submit)).await;
        let (status, Json(body)) = result.err().expect("submission should fail");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error, "permission denied for table leads");

        let Json(view) = get_session(Path(id), State(state)).await.expect("session survives");
        assert_eq!(view.phase, Phase::Finalize);
        assert_eq!(view.request.name, "Ada Obi");
    }

    #[tokio::test]
    async fn double_submit_stores_a_single_lead() {
        let gateway = InMemoryGateway::new();
        let state = AppState::new(Arc::new(SlowInserts(gateway.clone())), "2348000000000")
            .with_audit(Arc::new(InMemoryAuditSink::default()));
        let id = start(&state).await;
        for event in digital_events() {
            send(&state, &id, event).await;
        }

        let (first, second) = tokio::join!(
            apply_event(Path(id.clone()), State(state.clone()), Json(WizardEvent::Submit)),
            apply_event(Path(id.clone()), State(state.clone()), Json(WizardEvent::Submit)),
        );
        assert_eq!(usize::from(first.is_ok()) + usize::from(second.is_ok()), 1);
        let (status, _) = first.err().or(second.err()).expect("the repeat is rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let leads = gateway.select("leads", &Query::new()).await.expect("leads");
        assert_eq!(leads.len(), 1);
        let Json(view) = get_session(Path(id), State(state)).await.expect("session");
        assert_eq!(view.phase, Phase::Success);
    }

    #[tokio::test]
    async fn concurrent_edits_on_one_session_are_all_kept() {
        let state = state(InMemoryGateway::new());
        let id = start(&state).await;
        let mut events = digital_events();
        events.truncate(events.len() - 2);
        for event in events {
            send(&state, &id, event).await;
        }

        let (name, email) = tokio::join!(
            apply_event(
                Path(id.clone()),
                State(state.clone()),
                Json(WizardEvent::SetName { value: "Ada Obi".to_owned() }),
            ),
            apply_event(
                Path(id.clone()),
                State(state.clone()),
                Json(WizardEvent::SetEmail { value: "ada@example.com".to_owned() }),
            ),
        );
        assert!(name.is_ok() && email.is_ok());

        let Json(view) = get_session(Path(id), State(state)).await.expect("session");
        assert_eq!(view.request.name, "Ada Obi");
        assert_eq!(view.request.email, "ada@example.com");
        assert!(view.controls.submit_enabled);
    }

    #[tokio::test]
    async fn gated_events_are_rejected_with_400() {
        let state = state(InMemoryGateway::new());
        let id = start(&state).await;
        send(&state, &id, WizardEvent::SelectRoute { route: Route::Art }).await;
        send(&state, &id, WizardEvent::Proceed).await;

        let result = apply_event(Path(id), State(state), Json(WizardEvent::Proceed)).await;
        let (status, _) = result.err().expect("investment gate should hold");
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn view_exposes_the_selected_routes_schema() {
        let state = state(InMemoryGateway::new());
        let id = start(&state).await;
        let response = send(&state, &id, WizardEvent::SelectRoute { route: Route::Social }).await;

        let keys: Vec<&str> = response.session.fields.iter().map(|field| field.key).collect();
        assert_eq!(keys, vec!["platform", "goal"]);
        assert!(response.session.controls.proceed_enabled);
    }

    #[tokio::test]
    async fn unknown_sessions_are_not_found() {
        let state = state(InMemoryGateway::new());
        let result = get_session(Path("missing".to_owned()), State(state)).await;
        let (status, _) = result.err().expect("missing session");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
