use std::sync::Arc;

use async_trait::async_trait;
use jesprec_core::session::AdminSession;
use serde_json::Value;

use crate::{error::GatewayError, filter::Query};

/// Table reads and writes plus password authentication against the data service.
///
/// Every row travels as a JSON object. Typed decoding happens in the repositories.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError>;

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError>;

    async fn update(
        &self,
        table: &str,
        patch: Value,
        query: &Query,
    ) -> Result<Vec<Value>, GatewayError>;

    async fn delete(&self, table: &str, query: &Query) -> Result<u64, GatewayError>;

    async fn count(&self, table: &str, query: &Query) -> Result<u64, GatewayError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminSession, GatewayError>;

    async fn sign_out(&self, session: &AdminSession) -> Result<(), GatewayError>;

    /// `None` when the token is unknown or expired.
    async fn current_user(&self, access_token: &str)
        -> Result<Option<AdminSession>, GatewayError>;

    /// A handle whose requests carry the admin's bearer token.
    fn authorized(&self, session: &AdminSession) -> Arc<dyn Gateway>;
}
