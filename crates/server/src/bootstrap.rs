use std::{sync::Arc, time::Duration};

use jesprec_core::config::{AppConfig, ConfigError, LoadOptions};
use jesprec_gateway::{connect, fixtures::StudioSeedDataset, Gateway, GatewayError};
use thiserror::Error;
use tracing::info;

use crate::{sessions::SessionTtl, state::AppState};

pub struct Application {
    pub config: AppConfig,
    pub gateway: Arc<dyn Gateway>,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("gateway client setup failed: {0}")]
    Gateway(#[source] GatewayError),
    #[error("offline dataset seed failed: {0}")]
    Seed(#[source] GatewayError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        offline = config.gateway.offline,
        "starting application bootstrap"
    );

    let gateway = connect(&config.gateway).await.map_err(BootstrapError::Gateway)?;
    info!(
        event_name = "system.bootstrap.gateway_ready",
        correlation_id = "bootstrap",
        gateway_url = if config.gateway.offline { "in-memory" } else { config.gateway.url.as_str() },
        "gateway client initialized"
    );

    if config.gateway.offline {
        let seeded =
            StudioSeedDataset::load(gateway.as_ref()).await.map_err(BootstrapError::Seed)?;
        info!(
            event_name = "system.bootstrap.offline_seeded",
            correlation_id = "bootstrap",
            rows = seeded.total(),
            "offline dataset loaded"
        );
    }

    let idle = Duration::from_secs(config.server.quote_session_idle_secs);
    let state = AppState::new(gateway.clone(), config.messaging.whatsapp_number.clone())
        .with_session_ttl(SessionTtl::idle(idle));
    Ok(Application { config, gateway, state })
}
