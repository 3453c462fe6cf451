use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use jesprec_gateway::{Gateway, Query};
use serde::Serialize;

/// Table probed to prove the data service answers.
const PROBE_TABLE: &str = "projects";

#[derive(Clone)]
pub struct HealthState {
    gateway: Arc<dyn Gateway>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub gateway: HealthCheck,
    pub checked_at: String,
}

pub fn router(gateway: Arc<dyn Gateway>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { gateway })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let gateway = gateway_check(state.gateway.as_ref()).await;
    let ready = gateway.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "jesprec-server runtime initialized".to_string(),
        },
        gateway,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn gateway_check(gateway: &dyn Gateway) -> HealthCheck {
    match gateway.count(PROBE_TABLE, &Query::new()).await {
        Ok(rows) => HealthCheck {
            status: "ready",
            detail: format!("gateway answered ({rows} {PROBE_TABLE} rows)"),
        },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("gateway probe failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{extract::State, http::StatusCode, Json};
    use jesprec_gateway::{fixtures::StudioSeedDataset, InMemoryGateway, RestGateway};

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_returns_ready_when_gateway_answers() {
        let gateway = InMemoryGateway::new();
        StudioSeedDataset::load(&gateway).await.expect("seed");

        let (status, Json(payload)) = health(State(HealthState { gateway: Arc::new(gateway) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.gateway.status, "ready");
        assert_eq!(payload.gateway.detail, "gateway answered (3 projects rows)");
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_gateway_is_unreachable() {
        let gateway = RestGateway::new("http://127.0.0.1:9", "anon".to_owned().into(), Duration::from_secs(2))
            .expect("client");

        let (status, Json(payload)) = health(State(HealthState { gateway: Arc::new(gateway) })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.gateway.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
