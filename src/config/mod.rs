use anyhow::{anyhow, Result};
use geoloc_core::{
    entities::{DEFAULT_ADDRESS_COLUMN, DEFAULT_DAILY_LIMIT},
    usecases::{QuotaPolicy, DEFAULT_PACING},
};
use geoloc_gateways::{opencage::DEFAULT_TIMEOUT, quota_file::DEFAULT_QUOTA_FILE_NAME};
use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "geolocator.toml";

const ENV_NAME_OPENCAGE_API_KEY: &str = "OPENCAGE_API_KEY";

pub struct Config {
    pub quota: Quota,
    pub geocoding: Geocoding,
    pub input: Input,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let explicit = file_path.is_some();
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::debug!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config: raw::Config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)
                .map_err(|err| anyhow!("Invalid configuration {}: {err}", file_path.display()))?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound if !explicit => {
                    log::debug!(
                        "{DEFAULT_CONFIG_FILE_NAME} not found => load default configuration."
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(anyhow!("Unable to read {}: {err}", file_path.display())),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(api_key) = env::var(ENV_NAME_OPENCAGE_API_KEY) {
            if !api_key.trim().is_empty() {
                cfg.geocoding.api_key = Some(api_key);
            }
        }
        Ok(cfg)
    }
}

pub struct Quota {
    pub daily_limit: u32,
    pub policy: QuotaPolicy,
    /// JSON file with the API key and today's usage.
    pub store: PathBuf,
}

pub struct Geocoding {
    pub gateway: GeocodingGateway,
    /// Delay after every request.
    pub pacing: Duration,
    pub timeout: Duration,
    /// Overrides the stored key for this process.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingGateway {
    OpenCage,
}

pub struct Input {
    pub has_headers: bool,
    pub address_column: usize,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            quota,
            geocoding,
            input,
        } = from;

        let raw::Quota {
            daily_limit,
            policy,
            store,
        } = quota.unwrap_or_default();

        let daily_limit = daily_limit.unwrap_or(DEFAULT_DAILY_LIMIT);
        if daily_limit == 0 {
            return Err(anyhow!("The daily limit must be greater than zero"));
        }
        let policy = match policy {
            Some(raw::QuotaPolicy::Advisory) | None => QuotaPolicy::Advisory,
            Some(raw::QuotaPolicy::Enforce) => QuotaPolicy::Enforce,
        };
        let store = store.unwrap_or_else(|| PathBuf::from(DEFAULT_QUOTA_FILE_NAME));
        let quota = Quota {
            daily_limit,
            policy,
            store,
        };

        let raw::Geocoding {
            gateway,
            pacing,
            timeout,
        } = geocoding.unwrap_or_default();

        let gateway = match gateway {
            Some(raw::GeocodingGateway::Opencage) | None => GeocodingGateway::OpenCage,
        };
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(anyhow!("The request timeout must be greater than zero"));
        }
        let geocoding = Geocoding {
            gateway,
            pacing: pacing.unwrap_or(DEFAULT_PACING),
            timeout,
            api_key: None,
        };

        let raw::Input {
            has_headers,
            address_column,
        } = input.unwrap_or_default();

        let input = Input {
            has_headers: has_headers.unwrap_or(true),
            address_column: address_column.unwrap_or(DEFAULT_ADDRESS_COLUMN),
        };

        Ok(Self {
            quota,
            geocoding,
            input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_default_config() {
        let cfg = Config::try_from(raw::Config::default()).unwrap();
        assert_eq!(DEFAULT_DAILY_LIMIT, cfg.quota.daily_limit);
        assert_eq!(QuotaPolicy::Advisory, cfg.quota.policy);
        assert_eq!(Path::new(DEFAULT_QUOTA_FILE_NAME), cfg.quota.store);
        assert_eq!(GeocodingGateway::OpenCage, cfg.geocoding.gateway);
        assert_eq!(DEFAULT_PACING, cfg.geocoding.pacing);
        assert_eq!(DEFAULT_TIMEOUT, cfg.geocoding.timeout);
        assert!(cfg.input.has_headers);
        assert_eq!(DEFAULT_ADDRESS_COLUMN, cfg.input.address_column);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geolocator.toml");
        fs::write(
            &path,
            r#"
            [quota]
            daily-limit = 100
            policy = "enforce"
            store = "quota.json"

            [input]
            has-headers = false
            "#,
        )
        .unwrap();
        let cfg = Config::try_load_from_file_or_default(Some(&path)).unwrap();
        assert_eq!(100, cfg.quota.daily_limit);
        assert_eq!(QuotaPolicy::Enforce, cfg.quota.policy);
        assert_eq!(Path::new("quota.json"), cfg.quota.store);
        assert_eq!(DEFAULT_PACING, cfg.geocoding.pacing);
        assert!(!cfg.input.has_headers);
        assert_eq!(DEFAULT_ADDRESS_COLUMN, cfg.input.address_column);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(Config::try_load_from_file_or_default(Some(&path)).is_err());
    }

    #[test]
    fn reject_zero_daily_limit() {
        let raw: raw::Config = toml::from_str("[quota]\ndaily-limit = 0").unwrap();
        assert!(Config::try_from(raw).is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let raw: raw::Config = toml::from_str("[geocoding]\ntimeout = \"0s\"").unwrap();
        assert!(Config::try_from(raw).is_err());
    }
}
