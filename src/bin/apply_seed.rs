use anyhow::{Context, Result};
use schema_applier::{
    applier::{SEED_ENV_FILE, SEED_FILE},
    apply_bundled, telemetry,
};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init();

    match apply_bundled(SEED_FILE, Some(SEED_ENV_FILE)).await {
        Ok(path) => {
            println!("Seed data applied successfully from {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Seed data was not applied");
            Err(e).context("Failed to apply seed data")
        }
    }
}
