use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_geocoder_url() -> String {
    "https://www.als.gov.hk".to_string()
}

fn default_telemetry_service_name() -> String {
    "unihaven".to_string()
}

fn default_telemetry_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://localhost:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    fn from_source(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_max_connections", 5)?
            .set_default("geocoder_timeout_secs", 10)?
            .add_source(source.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: Map<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_source(env(&[("DATABASE_URL", "postgres://localhost/unihaven")])).unwrap();

        assert_eq!(config.database_url, "postgres://localhost/unihaven");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.geocoder_url, "https://www.als.gov.hk");
        assert_eq!(config.geocoder_timeout(), Duration::from_secs(10));
        assert!(!config.telemetry_enabled);
        assert_eq!(config.telemetry_service_name, "unihaven");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_source(env(&[
            ("DATABASE_URL", "postgres://db/unihaven"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("GEOCODER_TIMEOUT_SECS", "3"),
            ("TELEMETRY_ENABLED", "true"),
        ]))
        .unwrap();

        assert_eq!(config.database_max_connections, 20);
        assert_eq!(config.geocoder_timeout(), Duration::from_secs(3));
        assert!(config.telemetry_enabled);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(AppConfig::from_source(env(&[])).is_err());
    }
}
