use anyhow::Result;
use restock_platform::{ConfiguredTarget, RunConfig, SqlUsageSource, Trigger, redact_url};
use tracing::info;

mod summary;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "restock_ops=info,restock_platform=info,restock_inventory=info".to_string()
        }))
        .init();

    let config = RunConfig::from_env()?;
    info!(
        database = %redact_url(&config.database.url),
        destination = ?config.destination,
        "configuration loaded"
    );

    let trigger = Trigger::new(
        SqlUsageSource::new(config.database.clone()),
        ConfiguredTarget::from(&config.destination),
        config.policy.clone(),
        config.output_name.clone(),
    );

    match trigger.run_now().await {
        Ok(report) => {
            summary::print_report(&report);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", summary::failure_line(err.stage(), &err.to_string()));
            std::process::exit(1);
        }
    }
}
