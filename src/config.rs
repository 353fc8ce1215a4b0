use crate::access::{Address, AddressParseError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "CERT_REGISTRY_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid address in {var}: {source}")]
    Address {
        var: String,
        source: AddressParseError,
    },
    #[error("invalid value for {var}: {value}")]
    Value { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub channel: String,
    pub contract: String,
    pub submit_latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Holder of the default admin and admin roles at startup.
    pub deployer: Address,
    /// Extra accounts granted the admin role at startup.
    pub admins: Vec<Address>,
    /// Reject issuance requests with blank names, URI, or the zero student.
    pub reject_blank_fields: bool,
    pub event_capacity: usize,
    pub gateway: Option<GatewayConfig>,
    pub export_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            deployer: Address::from_label("deployer"),
            admins: Vec::new(),
            reject_blank_fields: false,
            event_capacity: 1024,
            gateway: None,
            export_path: PathBuf::from("certificates.csv"),
        }
    }
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Defaults, then the optional file, then `CERT_REGISTRY_*` variables.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_overrides(std::env::vars())?;
        Ok(config)
    }

    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (var, value) in vars {
            let Some(key) = var.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "DEPLOYER" => self.deployer = parse_address(&var, &value)?,
                "ADMINS" => {
                    self.admins = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| parse_address(&var, s))
                        .collect::<Result<_, _>>()?;
                }
                "REJECT_BLANK_FIELDS" => {
                    self.reject_blank_fields = value.parse().map_err(|_| ConfigError::Value {
                        var: var.clone(),
                        value: value.clone(),
                    })?;
                }
                "EVENT_CAPACITY" => {
                    self.event_capacity = value.parse().map_err(|_| ConfigError::Value {
                        var: var.clone(),
                        value: value.clone(),
                    })?;
                }
                "EXPORT_PATH" => self.export_path = PathBuf::from(value),
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_address(var: &str, value: &str) -> Result<Address, ConfigError> {
    value.parse().map_err(|source| ConfigError::Address {
        var: var.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let admin = Address::from_label("admin");
        let json = format!(r#"{{"admins": ["{}"], "reject_blank_fields": true}}"#, admin);
        let config = RegistryConfig::from_json(&json).unwrap();
        assert_eq!(config.admins, vec![admin]);
        assert!(config.reject_blank_fields);
        assert_eq!(config.event_capacity, 1024);
        assert!(config.gateway.is_none());
    }

    #[test]
    fn gateway_section() {
        let json = r#"{"gateway": {"channel": "certs", "contract": "registry", "submit_latency_ms": 5}}"#;
        let config = RegistryConfig::from_json(json).unwrap();
        assert_eq!(config.gateway.unwrap().submit_latency_ms, 5);
    }

    #[test]
    fn env_overrides() {
        let a = Address::from_label("a");
        let b = Address::from_label("b");
        let mut config = RegistryConfig::default();
        config
            .apply_overrides(vec![
                ("CERT_REGISTRY_ADMINS".to_string(), format!("{}, {}", a, b)),
                ("CERT_REGISTRY_REJECT_BLANK_FIELDS".to_string(), "true".to_string()),
                ("CERT_REGISTRY_EXPORT_PATH".to_string(), "out.csv".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ])
            .unwrap();
        assert_eq!(config.admins, vec![a, b]);
        assert!(config.reject_blank_fields);
        assert_eq!(config.export_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn env_override_errors() {
        let mut config = RegistryConfig::default();
        let err = config
            .apply_overrides(vec![(
                "CERT_REGISTRY_DEPLOYER".to_string(),
                "nope".to_string(),
            )])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Address { .. }));

        let err = config
            .apply_overrides(vec![(
                "CERT_REGISTRY_EVENT_CAPACITY".to_string(),
                "many".to_string(),
            )])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Value { .. }));
    }
}
