pub mod prelude {
    pub use super::{
        AlwaysContinue, Fixture, FixedDecision, MemoryQuotaRepo, MockGeocoder, RecordingSink,
    };
    pub use crate::error::AppError;
    pub use std::time::Duration;
}

use super::*;
use geoloc_core::repositories::Error as RepoError;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};
use tempfile::TempDir;
use usecases::{BatchControl, BatchEvent, BatchEventSink, CancelFlag, Decision};

/// An input file `list.csv` in a temporary directory.
pub struct Fixture {
    pub input: PathBuf,
    _dir: TempDir,
}

impl Fixture {
    pub fn new(content: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("list.csv");
        fs::write(&input, content).unwrap();
        Self { input, _dir: dir }
    }

    pub fn output(&self) -> PathBuf {
        self.input.with_file_name("list-geolocation.csv")
    }
}

#[derive(Debug, Default)]
pub struct MemoryQuotaRepo {
    state: Mutex<Option<QuotaState>>,
}

impl MemoryQuotaRepo {
    pub fn with_api_key(api_key: &str) -> Self {
        Self {
            state: Mutex::new(Some(QuotaState {
                api_key: api_key.to_string(),
                last_reset: Some(today_utc()),
                usage: 0,
            })),
        }
    }

    pub fn stored(&self) -> Option<QuotaState> {
        self.state.lock().clone()
    }
}

impl QuotaRepo for MemoryQuotaRepo {
    fn load_quota(&self) -> std::result::Result<Option<QuotaState>, RepoError> {
        Ok(self.state.lock().clone())
    }

    fn save_quota(&self, state: &QuotaState) -> std::result::Result<(), RepoError> {
        *self.state.lock() = Some(state.clone());
        Ok(())
    }

    fn modify_quota(
        &self,
        modify: &mut dyn FnMut(&mut QuotaState) -> bool,
    ) -> std::result::Result<QuotaState, RepoError> {
        let mut stored = self.state.lock();
        let mut state = stored.clone().unwrap_or_default();
        if modify(&mut state) {
            *stored = Some(state.clone());
        }
        Ok(state)
    }
}

/// Knows a fixed set of addresses, everything else is not found.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    locations: HashMap<String, Coordinates>,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancelFlag)>,
}

impl MockGeocoder {
    pub fn with_location(mut self, address: &str, lat: f64, lng: f64) -> Self {
        self.locations
            .insert(address.to_string(), Coordinates::from_lat_lng_deg(lat, lng));
        self
    }

    /// Request cancellation while the n-th request is in flight.
    pub fn cancel_after(mut self, calls: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((calls, flag));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoCodingGateway for MockGeocoder {
    fn resolve_address_lat_lng(
        &self,
        address: &str,
    ) -> std::result::Result<Option<Coordinates>, GatewayError> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((n, flag)) = &self.cancel_after {
            if calls == *n {
                flag.cancel();
            }
        }
        Ok(self.locations.get(address).copied())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BatchEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().clone()
    }
}

impl BatchEventSink for RecordingSink {
    fn emit(&self, event: BatchEvent) {
        self.events.lock().push(event);
    }
}

pub struct AlwaysContinue;

impl BatchControl for AlwaysContinue {
    fn await_decision(&self) -> Decision {
        Decision::Continue
    }
}

pub struct FixedDecision(pub Decision);

impl BatchControl for FixedDecision {
    fn await_decision(&self) -> Decision {
        self.0
    }
}
