// ClosetHaus - virtual wardrobe and outfit try-on
// Entry point: hydrates the wardrobe and reports its state

use closethaus::{app, commands};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DATA_DIR_ENV: &str = "CLOSETHAUS_DATA_DIR";

fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .map(|dir| dir.join("closethaus"))
        .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory; set {}", DATA_DIR_ENV))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "closethaus=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ClosetHaus");

    let state = app::setup(data_dir()?).await?;

    let status = commands::app_status(&state).await;
    tracing::info!(
        "Room: {}, onboarded: {}, {} items, {} saved outfits",
        status.room,
        status.onboarded,
        status.item_count,
        status.outfit_count
    );
    println!("{}", serde_json::to_string_pretty(&status)?);

    state.coordinator.flush().await;
    Ok(())
}
