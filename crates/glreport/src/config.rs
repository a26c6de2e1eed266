use std::path::Path;

use glreport_core::config::ReportConfig;

use crate::prelude::*;

/// Connection settings that override the configuration file
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Connection {
    /// GitLab instance URL
    #[arg(long, env = "GITLAB_URL")]
    pub url: Option<String>,

    /// Personal, project or group access token
    #[arg(long, env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    pub private_token: Option<String>,

    /// OAuth2 access token
    #[arg(long, env = "GITLAB_OAUTH_TOKEN", hide_env_values = true)]
    pub oauth_token: Option<String>,
}

/// Read, parse and validate a report configuration
///
/// Files ending in `.toml` are parsed as TOML, anything else as JSON.
pub fn load(path: &Path, connection: Connection) -> Result<ReportConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => ReportConfig::from_toml(&text),
        _ => ReportConfig::from_json(&text),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    let config = config.with_overrides(
        connection.url,
        connection.private_token,
        connection.oauth_token,
    );
    config.validate()?;

    log::info!(
        "Loaded {} section(s) from {}",
        config.sections.len(),
        path.display()
    );

    Ok(config)
}
