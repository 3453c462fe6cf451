use jesprec_core::config::{AppConfig, LoadOptions};
use jesprec_gateway::{
    connect,
    fixtures::{SeedResult, StudioSeedDataset},
};
use tracing::info;

use crate::commands::{runtime, CommandResult};

/// Optional admin credentials; hosted tables only accept writes from a signed-in admin.
#[derive(Debug, Clone, Default)]
pub struct SeedArgs {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn run(args: &SeedArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let mut gateway = connect(&config.gateway)
            .await
            .map_err(|error| ("gateway_connectivity", error.to_string(), 4u8))?;

        if let (Some(email), Some(password)) = (&args.email, &args.password) {
            let session = gateway
                .sign_in(email, password)
                .await
                .map_err(|error| ("admin_sign_in", error.to_string(), 4u8))?;
            gateway = gateway.authorized(&session);
        }

        let seeded = StudioSeedDataset::load(gateway.as_ref())
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = StudioSeedDataset::verify(gateway.as_ref())
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        if !verification.is_complete() {
            return Err((
                "seed_verification",
                verification_message(&verification.missing),
                6u8,
            ));
        }
        Ok(seeded)
    });

    match result {
        Ok(seeded) => {
            info!(event_name = "cli.seed.completed", rows = seeded.total(), "studio dataset seeded");
            let mut message = summary(&seeded);
            if config.gateway.offline {
                message.push_str(" into the offline in-memory gateway; rows are discarded on exit");
            }
            CommandResult::success_with("seed", message, seeded)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    format!(
        "studio dataset loaded: {} projects, {} gallery items, {} delivery fees, {} social packages, {} social features ({} rows)",
        seeded.projects,
        seeded.gallery_items,
        seeded.delivery_fees,
        seeded.social_packages,
        seeded.social_features,
        seeded.total()
    )
}

fn verification_message(missing: &[String]) -> String {
    if missing.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for rows: {}", missing.join(", "))
    }
}
