use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use jesprec_core::{config::GatewayConfig, session::AdminSession};
use reqwest::{header::HeaderValue, Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{error::GatewayError, filter::Query, gateway::Gateway};

/// PostgREST + GoTrue client for a hosted gateway.
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: SecretString,
    bearer: SecretString,
}

impl std::fmt::Debug for RestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGateway").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RestGateway {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { client, base_url, bearer: anon_key.clone(), anon_key })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(
            config.url.clone(),
            config.anon_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(self.bearer.expose_secret())
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"))
    }

    async fn rows(response: Response) -> Result<Vec<Value>, GatewayError> {
        let response = ensure_success(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Api { status: status.as_u16(), message: error_message(status, &body) })
}

/// PostgREST reports `message`; the auth service uses `msg` or `error_description`.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            } else {
                body.trim().to_owned()
            }
        })
}

fn parse_content_range(header: Option<&HeaderValue>) -> Result<u64, GatewayError> {
    let raw = header
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| GatewayError::Decode("missing Content-Range header".to_owned()))?;
    let total = raw
        .rsplit('/')
        .next()
        .ok_or_else(|| GatewayError::Decode(format!("malformed Content-Range `{raw}`")))?;
    total
        .parse::<u64>()
        .map_err(|_| GatewayError::Decode(format!("malformed Content-Range `{raw}`")))
}

#[async_trait]
impl Gateway for RestGateway {
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        debug!(event_name = "gateway.insert", table, rows = rows.len(), "inserting rows");
        let response = self
            .table(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        debug!(event_name = "gateway.select", table, "selecting rows");
        let response = self.table(Method::GET, table).query(&query.to_params()).send().await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError> {
        debug!(event_name = "gateway.update", table, "updating rows");
        let response = self
            .table(Method::PATCH, table)
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
        debug!(event_name = "gateway.delete", table, "deleting rows");
        let response = self
            .table(Method::DELETE, table)
            .query(&query.filter_params())
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Ok(Self::rows(response).await?.len() as u64)
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
        let response = self
            .table(Method::HEAD, table)
            .query(&query.to_params())
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = ensure_success(response).await?;
        parse_content_range(response.headers().get("content-range"))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, GatewayError> {
        let response = self
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;
        Ok(AdminSession {
            user_id: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_owned()),
            access_token: token.access_token.into(),
            expires_at: token.expires_in.map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    async fn sign_out(&self, session: &AdminSession) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(session.bearer_token())
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AdminSession>, GatewayError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;
        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }
        let user: UserResponse = ensure_success(response).await?.json().await?;
        Ok(Some(AdminSession {
            user_id: user.id,
            email: user.email.unwrap_or_default(),
            access_token: access_token.to_owned().into(),
            expires_at: None,
        }))
    }

    fn authorized(&self, session: &AdminSession) -> Arc<dyn Gateway> {
        let mut scoped = self.clone();
        scoped.bearer = session.bearer_token().to_owned().into();
        Arc::new(scoped)
    }
}
