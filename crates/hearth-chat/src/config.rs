//! Application configuration file
//!
//! ```toml
//! [client]
//! variant = "named"
//!
//! [logging]
//! default_level = "debug"
//!
//! [[seed.accounts]]
//! email = "ann@example.com"
//! password = "pw1"
//! display_name = "Ann"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hearth_backend::SeedData;
use hearth_client::ClientConfig;
use hearth_logging::LogConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub logging: LogConfig,
    /// Accounts registered in the emulator at startup
    pub seed: SeedData,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            // stdout belongs to the chat
            logging: LogConfig::interactive(default_log_dir()),
            seed: SeedData::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.client.validate()?;
        Ok(config)
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("hearth").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_client::Variant;

    #[test]
    fn test_defaults_log_to_file_only() {
        let config = AppConfig::load(None).unwrap();
        assert!(!config.logging.console.enabled);
        assert!(config.logging.file.is_some());
        assert!(config.seed.accounts.is_empty());
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(
            &path,
            r#"
            [client]
            variant = "plain"

            [logging]
            default_level = "debug"

            [[seed.accounts]]
            email = "ann@example.com"
            password = "pw1"
            display_name = "Ann"
            "#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.client.variant, Variant::Plain);
        assert_eq!(config.logging.default_level, "debug");
        assert_eq!(config.seed.accounts.len(), 1);
        assert_eq!(config.seed.accounts[0].display_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn test_invalid_client_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.toml");
        std::fs::write(&path, "[client.collections]\nmessages = \"\"\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
