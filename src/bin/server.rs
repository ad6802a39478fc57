//! HTTP server for the SQL query builder.

use anyhow::Result;
use querysmith::config::AppConfig;
use querysmith::llm::ProviderKind;
use querysmith::logging::init_tracing;
use querysmith::server::serve;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    info!(provider = %config.provider, "Starting SQL Query Builder API server");

    match config.provider.parse::<ProviderKind>() {
        Ok(kind) if config.provider_settings(kind).credential().is_ok() => {
            info!(provider = %kind, "API key found - provider generation enabled");
        }
        Ok(kind) => warn!(provider = %kind, "API key not found - will use mock responses"),
        Err(e) => warn!(error = %e, "Generation requests will be rejected until AI_PROVIDER is fixed"),
    }

    serve(config).await?;
    Ok(())
}
