use std::{fs::OpenOptions, sync::Mutex};

use voyager_tui::{
    app::App,
    config::{self, AppConfig},
    error::{AppError, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;
    tracing::info!(base_url = %config.base_url, "voyager starting");

    let mut app = App::new(config)?;
    app.run().await?;
    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "voyager_tui={level},voyager={level}",
            level = config.log_level
        ))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}
