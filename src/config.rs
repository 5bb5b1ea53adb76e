//! Runtime configuration for the joystick reader and the GPIO blinker.
//!
//! Stored as TOML under `~/.config/jsgpio/config.toml`. Every field has a
//! default that matches the stock Raspberry Pi 3 setup, so running without a
//! config file behaves exactly like the hardcoded constants.

use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/jsgpio";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_INPUT_DEVICE: &str = "/dev/input/js0";
pub const DEFAULT_MEM_DEVICE: &str = "/dev/mem";
pub const DEFAULT_GPIO_BASE: u64 = 0x3F20_0000;
pub const DEFAULT_LED_PIN: u8 = 17;
pub const DEFAULT_BLINK_PERIOD_MS: u64 = 1000;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub gpio: GpioConfig,
}

/// Joystick device settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub enabled: bool,
    /// Character device producing 8-byte joystick records
    pub device_path: PathBuf,
    /// Seconds between throughput log lines, 0 disables them
    pub stats_interval_secs: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            device_path: PathBuf::from(DEFAULT_INPUT_DEVICE),
            stats_interval_secs: 10,
        }
    }
}

/// Register window and blink settings
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GpioConfig {
    pub enabled: bool,
    pub mem_path: PathBuf,
    /// Physical address of the GPIO register block
    pub base_address: u64,
    pub pin: u8,
    pub period_ms: u64,
    /// Clear the whole function-select field before selecting output
    pub strict_function_select: bool,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mem_path: PathBuf::from(DEFAULT_MEM_DEVICE),
            base_address: DEFAULT_GPIO_BASE,
            pin: DEFAULT_LED_PIN,
            period_ms: DEFAULT_BLINK_PERIOD_MS,
            strict_function_select: false,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        let mut path = get_home_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Writes the default configuration if no file exists yet
    pub async fn ensure_default_config() -> Result<()> {
        let path = Self::config_path();
        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            debug!("Config file present at {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }

        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| eyre!("Failed to write default config file: {}", e))?;

        info!("Wrote default config to {}", path.display());
        Ok(())
    }

    pub async fn load() -> Result<Self> {
        let path = Self::config_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let config = Self::parse(&content)
                    .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(eyre!("Failed to read config file {}: {}", path.display(), e)),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_hardware_constants() {
        let config = AppConfig::default();
        assert_eq!(config.input.device_path, PathBuf::from("/dev/input/js0"));
        assert_eq!(config.gpio.mem_path, PathBuf::from("/dev/mem"));
        assert_eq!(config.gpio.base_address, 0x3F20_0000);
        assert_eq!(config.gpio.pin, 17);
        assert_eq!(config.gpio.period_ms, 1000);
        assert!(!config.gpio.strict_function_select);
    }

    #[test]
    fn default_config_survives_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("device_path = \"/dev/input/js0\""));
        assert_eq!(AppConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config = AppConfig::parse(
            r#"
            [gpio]
            pin = 27
            base_address = 0xFE200000
            "#,
        )
        .unwrap();
        assert_eq!(config.gpio.pin, 27);
        assert_eq!(config.gpio.base_address, 0xFE20_0000);
        assert_eq!(config.gpio.period_ms, 1000);
        assert_eq!(config.input, InputConfig::default());
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(AppConfig::parse("[gpio]\npin = \"seventeen\"").is_err());
    }
}
