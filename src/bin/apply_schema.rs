use anyhow::{Context, Result};
use schema_applier::{applier::SCHEMA_FILE, apply_bundled, telemetry};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    telemetry::init();

    match apply_bundled(SCHEMA_FILE, None).await {
        Ok(path) => {
            println!("Schema applied successfully from {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Schema was not applied");
            Err(e).context("Failed to apply schema")
        }
    }
}
