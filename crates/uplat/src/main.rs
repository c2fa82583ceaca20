use anyhow::Context;
use tracing_subscriber::EnvFilter;
use uplat_core::{Config, PgRecorder, probe};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("performance run failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let client = reqwest::Client::new();
    let mut recorder = PgRecorder::connect(&config.db)
        .await
        .context("connecting to postgres")?;

    // The session is closed no matter how the driver loop ends.
    let result = probe::run(&config, &client, &mut recorder).await;
    recorder.close().await;
    result?;

    Ok(())
}
