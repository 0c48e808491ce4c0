use anyhow::Result;
use d1_migrate::{migration::MigrationExecutor, supabase, worker, MigrationConfig};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_target(false)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = MigrationConfig::from_env();
    info!("Source: {}", config.supabase_url);
    info!("Destination: {}", config.worker_url);

    let source = supabase::connect(&config)?;
    let destination = worker::connect(&config)?;

    let executor = MigrationExecutor::new(source, destination, config);
    executor.execute().await?;

    Ok(())
}
