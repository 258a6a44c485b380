use geoloc_core::{
    entities::{format_iso_date, parse_iso_date, QuotaState},
    repositories::{Error as RepoError, QuotaRepo},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

pub const DEFAULT_QUOTA_FILE_NAME: &str = "geolocation_config.json";

/// Stores the API key and the daily usage in a small JSON file.
#[derive(Debug)]
pub struct QuotaFile {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct JsonQuota {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    last_reset: String,
    #[serde(default)]
    usage: u32,
}

impl From<JsonQuota> for QuotaState {
    fn from(from: JsonQuota) -> Self {
        let JsonQuota {
            api_key,
            last_reset,
            usage,
        } = from;
        let last_reset = if last_reset.trim().is_empty() {
            None
        } else {
            match parse_iso_date(&last_reset) {
                Ok(date) => Some(date),
                Err(err) => {
                    log::warn!("Ignoring stored reset date: {err}");
                    None
                }
            }
        };
        Self {
            api_key,
            last_reset,
            usage,
        }
    }
}

impl From<&QuotaState> for JsonQuota {
    fn from(from: &QuotaState) -> Self {
        Self {
            api_key: from.api_key.clone(),
            last_reset: from.last_reset.map(format_iso_date).unwrap_or_default(),
            usage: from.usage,
        }
    }
}

impl QuotaFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<QuotaState>, RepoError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("No quota file found at {}", self.path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let quota: JsonQuota = serde_json::from_str(&json).map_err(anyhow::Error::from)?;
        Ok(Some(quota.into()))
    }

    // Write a sibling file first so that a failed write never
    // leaves a truncated quota file behind.
    fn write(&self, state: &QuotaState) -> Result<(), RepoError> {
        let json = serde_json::to_string_pretty(&JsonQuota::from(state))
            .map_err(anyhow::Error::from)?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);
        fs::write(&tmp_path, json)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

impl QuotaRepo for QuotaFile {
    fn load_quota(&self) -> Result<Option<QuotaState>, RepoError> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn save_quota(&self, state: &QuotaState) -> Result<(), RepoError> {
        let _guard = self.lock.lock();
        self.write(state)
    }

    fn modify_quota(
        &self,
        modify: &mut dyn FnMut(&mut QuotaState) -> bool,
    ) -> Result<QuotaState, RepoError> {
        let _guard = self.lock.lock();
        let mut state = self.read()?.unwrap_or_default();
        if modify(&mut state) {
            self.write(&state)?;
        }
        Ok(state)
    }
}
