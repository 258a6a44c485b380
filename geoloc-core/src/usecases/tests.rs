use super::{prelude::*, BatchControl, BatchEvent, BatchEventSink, CancelFlag, Decision};
use crate::repositories::Error as RepoError;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

#[derive(Default)]
pub struct MockQuotaRepo {
    state: RefCell<Option<QuotaState>>,
    saved: Cell<usize>,
    fail_on_save: Cell<bool>,
}

impl MockQuotaRepo {
    pub fn with_state(state: QuotaState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            ..Default::default()
        }
    }

    pub fn stored(&self) -> Option<QuotaState> {
        self.state.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saved.get()
    }

    pub fn fail_on_save(&self) {
        self.fail_on_save.set(true);
    }
}

impl QuotaRepo for MockQuotaRepo {
    fn load_quota(&self) -> std::result::Result<Option<QuotaState>, RepoError> {
        Ok(self.state.borrow().clone())
    }

    fn save_quota(&self, state: &QuotaState) -> std::result::Result<(), RepoError> {
        if self.fail_on_save.get() {
            return Err(RepoError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )));
        }
        *self.state.borrow_mut() = Some(state.clone());
        self.saved.set(self.saved.get() + 1);
        Ok(())
    }
}

/// Knows a fixed set of addresses, everything else is not found.
#[derive(Default)]
pub struct MockGeocoder {
    locations: HashMap<String, Coordinates>,
    failures: Vec<String>,
    calls: Cell<usize>,
    cancel_after: Option<(usize, CancelFlag)>,
}

impl MockGeocoder {
    pub fn with_location(mut self, address: &str, lat: f64, lng: f64) -> Self {
        self.locations
            .insert(address.to_string(), Coordinates::from_lat_lng_deg(lat, lng));
        self
    }

    pub fn with_failure(mut self, address: &str) -> Self {
        self.failures.push(address.to_string());
        self
    }

    /// Request cancellation while the n-th request is in flight.
    pub fn cancel_after(mut self, calls: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((calls, flag));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl GeoCodingGateway for MockGeocoder {
    fn resolve_address_lat_lng(
        &self,
        address: &str,
    ) -> std::result::Result<Option<Coordinates>, GatewayError> {
        self.calls.set(self.calls.get() + 1);
        if let Some((n, flag)) = &self.cancel_after {
            if self.calls.get() == *n {
                flag.cancel();
            }
        }
        if self.failures.iter().any(|f| f == address) {
            return Err(GatewayError::Provider {
                status: 503,
                message: "Service unavailable".into(),
            });
        }
        Ok(self.locations.get(address).copied())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: RefCell<Vec<BatchEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.borrow().clone()
    }
}

impl BatchEventSink for RecordingSink {
    fn emit(&self, event: BatchEvent) {
        self.events.borrow_mut().push(event);
    }
}

pub struct ScriptedControl<F> {
    decide: F,
    calls: Cell<usize>,
}

impl<F> ScriptedControl<F>
where
    F: Fn() -> Decision,
{
    pub fn new(decide: F) -> Self {
        Self {
            decide,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<F> BatchControl for ScriptedControl<F>
where
    F: Fn() -> Decision,
{
    fn await_decision(&self) -> Decision {
        self.calls.set(self.calls.get() + 1);
        (self.decide)()
    }
}
