use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;
use crate::error::{DashboardError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub map: MapConfig,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Population table; format is picked from the extension
    pub population: PathBuf,
    /// Optional demographics CSV for the donut/breakdown page
    pub demographics: Option<PathBuf>,
    pub delimiter: char,
    pub state_column: String,
    pub population_column: String,
}

impl SourcesConfig {
    /// The delimiter as the single byte the CSV reader splits on
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(DashboardError::Config(format!(
                "sources.delimiter must be an ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            population: PathBuf::from(constants::DEFAULT_POPULATION_PATH),
            demographics: None,
            delimiter: constants::DEFAULT_CSV_DELIMITER,
            state_column: constants::DEFAULT_STATE_COLUMN.to_string(),
            population_column: constants::DEFAULT_POPULATION_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub geojson_url: String,
    pub feature_id_key: String,
    pub color_scale: String,
    pub value_label: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            geojson_url: constants::BRAZIL_STATES_GEOJSON_URL.to_string(),
            feature_id_key: constants::GEOJSON_FEATURE_ID_KEY.to_string(),
            color_scale: constants::DEFAULT_COLOR_SCALE.to_string(),
            value_label: constants::DEFAULT_VALUE_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Gate dashboard routes behind the identity collaborator's session
    pub require_login: bool,
    pub session_cookie: String,
    pub login_url: String,
    pub logout_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            require_login: false,
            session_cookie: constants::DEFAULT_SESSION_COOKIE.to_string(),
            login_url: constants::DEFAULT_LOGIN_URL.to_string(),
            logout_url: constants::DEFAULT_LOGOUT_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus exporter address; no exporter when unset
    pub listen_addr: Option<SocketAddr>,
}

impl Config {
    /// Load from a TOML file, falling back to defaults when the file is absent.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                DashboardError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            toml::from_str::<Config>(&content)?
        } else {
            info!("No config file at '{}', using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.sources.delimiter_byte()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(population) = std::env::var(constants::ENV_POPULATION_PATH) {
            self.sources.population = PathBuf::from(population);
        }
        if let Ok(port) = std::env::var(constants::ENV_PORT) {
            self.server.port = port.parse().map_err(|_| {
                DashboardError::Config(format!(
                    "{} must be a port number, got '{}'",
                    constants::ENV_PORT,
                    port
                ))
            })?;
        }
        Ok(())
    }
}
