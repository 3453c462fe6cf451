use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jesprec_core::session::AdminSession;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::GatewayError,
    filter::{Embed, Query},
    gateway::Gateway,
};

const SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug)]
struct UserRecord {
    id: String,
    password: String,
}

#[derive(Debug)]
struct SessionRecord {
    user_id: String,
    email: String,
    expires_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    tables: HashMap<String, Vec<Value>>,
    users: HashMap<String, UserRecord>,
    sessions: HashMap<String, SessionRecord>,
    /// `(table, embedded table)` -> foreign-key column on `table`.
    relations: HashMap<(String, String), String>,
    failing_tables: HashMap<String, String>,
}

/// Process-local gateway used in offline mode and tests.
///
/// Clones share the same store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGateway {
    store: Arc<RwLock<Store>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        let mut store = Store::default();
        store.relations.insert(
            ("social_orders".to_owned(), "social_packages".to_owned()),
            "package_id".to_owned(),
        );
        store
            .relations
            .insert(("orders".to_owned(), "gallery_items".to_owned()), "item_id".to_owned());
        Self { store: Arc::new(RwLock::new(store)) }
    }

    pub async fn register_user(&self, email: &str, password: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.store.write().await.users.insert(
            email.to_lowercase(),
            UserRecord { id: id.clone(), password: password.to_owned() },
        );
        id
    }

    /// Every later write to `table` fails with `message`.
    pub async fn fail_writes_to(&self, table: &str, message: &str) {
        self.store.write().await.failing_tables.insert(table.to_owned(), message.to_owned());
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.store.read().await.tables.get(table).cloned().unwrap_or_default()
    }
}

impl Store {
    fn check_writable(&self, table: &str) -> Result<(), GatewayError> {
        match self.failing_tables.get(table) {
            Some(message) => Err(GatewayError::Api { status: 400, message: message.clone() }),
            None => Ok(()),
        }
    }

    fn embed(&self, table: &str, row: &mut Map<String, Value>, embed: &Embed) {
        let Some(foreign_key) = self.relations.get(&(table.to_owned(), embed.table.clone())) else {
            return;
        };
        let target = row.get(foreign_key).cloned().unwrap_or(Value::Null);
        let related = self
            .tables
            .get(&embed.table)
            .and_then(|rows| rows.iter().find(|candidate| candidate.get("id") == Some(&target)))
            .map(|candidate| project(candidate, &embed.columns))
            .unwrap_or(Value::Null);
        row.insert(embed.table.clone(), related);
    }
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let mut projected = Map::new();
    for column in columns {
        if let Some(value) = row.get(column) {
            projected.insert(column.clone(), value.clone());
        }
    }
    Value::Object(projected)
}

fn as_object(row: Value) -> Result<Map<String, Value>, GatewayError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::Api {
            status: 400,
            message: format!("expected a JSON object row, got `{other}`"),
        }),
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        let mut store = self.store.write().await;
        store.check_writable(table)?;
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let mut row = as_object(row)?;
            if row.get("id").map_or(true, Value::is_null) {
                row.insert("id".to_owned(), Value::String(Uuid::new_v4().to_string()));
            }
            if row.get("created_at").map_or(true, Value::is_null) {
                row.insert("created_at".to_owned(), Value::String(Utc::now().to_rfc3339()));
            }
            inserted.push(Value::Object(row));
        }
        store.tables.entry(table.to_owned()).or_default().extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let store = self.store.read().await;
        let mut rows: Vec<Value> = store
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        if let Some(order) = &query.order {
            rows.sort_by(|left, right| order.compare(left, right));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        let embeds = query.embeds();
        if !embeds.is_empty() {
            for row in &mut rows {
                if let Value::Object(map) = row {
                    for embed in &embeds {
                        store.embed(table, map, embed);
                    }
                }
            }
        }
        Ok(rows)
    }

    async fn update(
        &self,
        table: &str,
        patch: Value,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut store = self.store.write().await;
        store.check_writable(table)?;
        let patch = as_object(patch)?;
        let mut updated = Vec::new();
        if let Some(rows) = store.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| query.matches(row)) {
                if let Value::Object(map) = row {
                    for (key, value) in &patch {
                        map.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
        let mut store = self.store.write().await;
        store.check_writable(table)?;
        let Some(rows) = store.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !query.matches(row));
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, GatewayError> {
        let store = self.store.read().await;
        Ok(store
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).count() as u64)
            .unwrap_or(0))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, GatewayError> {
        let mut store = self.store.write().await;
        let email = email.trim().to_lowercase();
        let user_id = match store.users.get(&email) {
            Some(user) if user.password == password => user.id.clone(),
            _ => {
                return Err(GatewayError::Api {
                    status: 400,
                    message: "Invalid login credentials".to_owned(),
                })
            }
        };
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECS);
        store.sessions.insert(
            token.clone(),
            SessionRecord { user_id: user_id.clone(), email: email.clone(), expires_at },
        );
        Ok(AdminSession { user_id, email, access_token: token.into(), expires_at: Some(expires_at) })
    }

    async fn sign_out(&self, session: &AdminSession) -> Result<(), GatewayError> {
        self.store.write().await.sessions.remove(session.bearer_token());
        Ok(())
    }

    async fn current_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AdminSession>, GatewayError> {
        let store = self.store.read().await;
        Ok(store
            .sessions
            .get(access_token)
            .filter(|session| session.expires_at > Utc::now())
            .map(|session| AdminSession {
                user_id: session.user_id.clone(),
                email: session.email.clone(),
                access_token: access_token.to_owned().into(),
                expires_at: Some(session.expires_at),
            }))
    }

    fn authorized(&self, _session: &AdminSession) -> Arc<dyn Gateway> {
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::InMemoryGateway;
    use crate::{
        error::GatewayError,
        filter::{Filter, Order, Query},
        gateway::Gateway,
    };

    #[tokio::test]
    async fn insert_assigns_ids_and_timestamps() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        let inserted = gateway.insert("leads", vec![json!({ "name": "Ada" })]).await?;

        assert_eq!(inserted.len(), 1);
        assert!(inserted[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(inserted[0]["created_at"].is_string());
        assert_eq!(gateway.count("leads", &Query::new()).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway
            .insert(
                "delivery_fees",
                vec![
                    json!({ "state": "Lagos", "park_name": "Ojota", "fee": 3000 }),
                    json!({ "state": "Abuja", "park_name": "Utako", "fee": 5000 }),
                    json!({ "state": "Lagos", "park_name": "Jibowu", "fee": 2500 }),
                ],
            )
            .await?;

        let rows = gateway
            .select(
                "delivery_fees",
                &Query::new().filter(Filter::eq("state", "Lagos")).order(Order::asc("fee")).limit(1),
            )
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["park_name"], "Jibowu");
        Ok(())
    }

    #[tokio::test]
    async fn select_embeds_related_package() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        let package = gateway
            .insert("social_packages", vec![json!({ "name": "IG Followers", "platform": "instagram" })])
            .await?;
        let package_id = package[0]["id"].clone();
        gateway.insert("social_orders", vec![json!({ "package_id": package_id })]).await?;

        let rows = gateway
            .select("social_orders", &Query::new().select("*, social_packages(name)"))
            .await?;
        assert_eq!(rows[0]["social_packages"], json!({ "name": "IG Followers" }));
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_touch_only_matching_rows() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway
            .insert("gallery_items", vec![json!({ "id": "a", "is_sold_out": false }), json!({ "id": "b", "is_sold_out": false })])
            .await?;

        let updated = gateway.update("gallery_items", json!({ "is_sold_out": true }), &Query::by_id("a")).await?;
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["is_sold_out"], true);

        assert_eq!(gateway.delete("gallery_items", &Query::by_id("b")).await?, 1);
        assert_eq!(gateway.delete("gallery_items", &Query::by_id("b")).await?, 0);
        assert_eq!(gateway.count("gallery_items", &Query::new()).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn sign_in_checks_credentials_and_tracks_sessions() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway.register_user("studio@jesprec.com", "s3cret").await;

        let rejected = gateway.sign_in("studio@jesprec.com", "wrong").await;
        assert!(matches!(rejected, Err(GatewayError::Api { status: 400, .. })));

        let session = gateway.sign_in("Studio@Jesprec.com", "s3cret").await?;
        assert_eq!(session.email, "studio@jesprec.com");
        assert!(gateway.current_user(session.bearer_token()).await?.is_some());

        gateway.sign_out(&session).await?;
        assert!(gateway.current_user(session.bearer_token()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn failing_tables_reject_writes() -> Result<(), GatewayError> {
        let gateway = InMemoryGateway::new();
        gateway.fail_writes_to("leads", "permission denied for table leads").await;

        let result = gateway.insert("leads", vec![json!({ "name": "Ada" })]).await;
        assert!(matches!(result, Err(GatewayError::Api { ref message, .. }) if message == "permission denied for table leads"));
        assert!(gateway.select("leads", &Query::new()).await?.is_empty());
        Ok(())
    }
}
