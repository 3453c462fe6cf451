//! Client side of the hosted data service: table reads and writes, password
//! auth, typed repositories and the starter dataset.

pub mod error;
pub mod filter;
pub mod fixtures;
pub mod gateway;
pub mod memory;
pub mod repositories;
pub mod rest;

use std::sync::Arc;

use jesprec_core::config::GatewayConfig;
use secrecy::ExposeSecret;

pub use error::GatewayError;
pub use filter::{Filter, Order, Query};
pub use gateway::Gateway;
pub use memory::InMemoryGateway;
pub use repositories::{CatalogRepository, SocialOrderRepository, TableRepository};
pub use rest::RestGateway;

/// Picks the REST client or, in offline mode, a fresh in-memory store with the
/// configured admin user registered.
pub async fn connect(config: &GatewayConfig) -> Result<Arc<dyn Gateway>, GatewayError> {
    if !config.offline {
        return Ok(Arc::new(RestGateway::from_config(config)?));
    }
    let gateway = InMemoryGateway::new();
    if let (Some(email), Some(password)) =
        (&config.offline_admin_email, &config.offline_admin_password)
    {
        gateway.register_user(email, password.expose_secret()).await;
    }
    Ok(Arc::new(gateway))
}
