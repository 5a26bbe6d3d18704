use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/voyager.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the places REST backend.
    pub base_url: String,
    /// Key for the address autocomplete service. Never taken from the CLI.
    pub maps_api_key: Option<String>,
    pub places_api_url: String,
    /// Endpoint answering `{latitude, longitude}` for "use current location".
    pub geolocation_url: String,
    pub log_file: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            maps_api_key: None,
            places_api_url: "https://places.googleapis.com/v1".to_string(),
            geolocation_url: "https://ipapi.co/json/".to_string(),
            log_file: "voyager_tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Parser)]
#[command(name = "voyager", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://localhost:8000).
    #[arg(long)]
    pub base_url: Option<String>,
    /// Override log file path.
    #[arg(long)]
    pub log_file: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    resolve(Args::parse())
}

/// Layers the config file, `VOYAGER_*` environment variables and CLI
/// overrides, in that order of precedence (last wins).
pub fn resolve(args: Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("VOYAGER"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    settings.maps_api_key = settings
        .maps_api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty());

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let args = Args {
            config: Some("does/not/exist.toml".to_string()),
            ..Default::default()
        };
        let settings = resolve(args).unwrap();
        assert!(!settings.places_api_url.is_empty());
        assert!(!settings.geolocation_url.is_empty());
    }

    #[test]
    fn cli_overrides_win() {
        let args = Args::parse_from([
            "voyager",
            "--config",
            "does/not/exist.toml",
            "--base-url",
            "http://example.test:9000",
            "--log-level",
            "debug",
        ]);
        let settings = resolve(args).unwrap();
        assert_eq!(settings.base_url, "http://example.test:9000");
        assert_eq!(settings.log_level, "debug");
    }
}
