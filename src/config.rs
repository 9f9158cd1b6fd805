use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{fs, path::Path};

/// Top-level application configuration, loaded from `config.toml`.
///
/// Secrets (the bot token) are deliberately not part of this structure;
/// they are read from the environment directly before use.
#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// The home guild the bot serves.
    pub guild_id: u64,
    /// Accent color for embeds (e.g. `0xD31F3C` for THE FINALS red).
    #[serde(default = "default_accent_color")]
    pub accent_color: u32,
    /// Entries shown per page in paginated roster views.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// User ids with elevated access to management commands.
    #[serde(default)]
    pub masters: Vec<u64>,
}

const fn default_accent_color() -> u32 {
    0x00D3_1F3C
}

const fn default_page_size() -> usize {
    10
}

/// Reads and parses the application configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    let app_config: AppConfig = toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: AppConfig = toml::from_str("guild_id = 123456789012345678").unwrap();
        assert_eq!(config.guild_id, 123_456_789_012_345_678);
        assert_eq!(config.accent_color, default_accent_color());
        assert_eq!(config.page_size, 10);
        assert!(config.masters.is_empty());
    }

    #[test]
    fn parses_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            guild_id = 1
            accent_color = 0x112233
            page_size = 5
            masters = [42, 43]
            "#,
        )
        .unwrap();
        assert_eq!(config.accent_color, 0x0011_2233);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.masters, vec![42, 43]);
    }

    #[test]
    fn missing_file_reports_config_error() {
        let err = load_config("definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
