use super::{load_quota, lookup_address, prelude::*, LookupOutcome, DEFAULT_PACING};
use std::{
    mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::Duration,
};

/// What to do when the daily limit is reached during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaPolicy {
    /// Only report that the limit has been reached.
    #[default]
    Advisory,
    /// Stop submitting requests.
    Enforce,
}

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub daily_limit: u32,
    pub quota_policy: QuotaPolicy,
    pub pacing: Duration,
    pub address_column: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            quota_policy: QuotaPolicy::default(),
            pacing: DEFAULT_PACING,
            address_column: DEFAULT_ADDRESS_COLUMN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    AwaitingContinue,
    Cancelled,
    Completed,
    Failed,
}

impl BatchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::Failed)
    }
}

/// The answer to a paused run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Cancel,
}

/// Cooperative cancellation, polled before every lookup.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub trait BatchControl {
    /// Invoked before a pause is announced.
    /// Decisions that arrived earlier must not end that pause.
    fn begin_pause(&self) {}

    /// Block until the user decides how to proceed after
    /// the first row could not be resolved.
    fn await_decision(&self) -> Decision;
}

pub trait BatchEventSink {
    fn emit(&self, event: BatchEvent);
}

impl BatchEventSink for Sender<BatchEvent> {
    fn emit(&self, event: BatchEvent) {
        if self.send(event).is_err() {
            log::debug!("Batch event receiver has been dropped");
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
        estimated: Duration,
        used: u32,
        remaining: u32,
        reset_in: TimeUntilReset,
    },
    Geocoded {
        row: usize,
        address: String,
        location: Coordinates,
    },
    NotFound {
        row: usize,
        address: String,
    },
    LookupFailed {
        row: usize,
        address: String,
        reason: String,
    },
    MissingAddress {
        row: usize,
    },
    FirstRowFailed {
        address: Option<String>,
    },
    Resumed,
    Progress {
        processed: usize,
        total: usize,
    },
    QuotaLimitReached {
        used: u32,
        limit: u32,
    },
    QuotaExhausted {
        limit: u32,
    },
    Cancelled,
    Completed {
        rows: usize,
        resolved: usize,
    },
}

/// Percentage in `[0, 100]`.
pub fn progress_percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed.min(total) as f64 / total as f64) * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// One result per input row, in input order.
    Completed(Vec<GeocodeResult>),
    Cancelled,
}

/// A single geocoding run over a set of rows.
#[derive(Debug)]
pub struct BatchJob {
    rows: Vec<AddressRow>,
    results: Vec<GeocodeResult>,
    cancel: CancelFlag,
    state: BatchState,
}

impl BatchJob {
    pub fn new(rows: Vec<AddressRow>) -> Self {
        Self::with_cancel_flag(rows, CancelFlag::default())
    }

    /// Create a job that can be cancelled through an existing flag.
    pub fn with_cancel_flag(rows: Vec<AddressRow>, cancel: CancelFlag) -> Self {
        Self {
            results: Vec::with_capacity(rows.len()),
            rows,
            cancel,
            state: BatchState::Idle,
        }
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn rows(&self) -> &[AddressRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AddressRow> {
        self.rows
    }

    /// Process all rows in ascending order.
    ///
    /// If the first row can not be resolved the run pauses until
    /// `control` decides. Cancellation discards all results.
    pub fn run<G, R, C, S>(
        &mut self,
        geocoder: &G,
        quota_repo: &R,
        settings: &BatchSettings,
        control: &C,
        events: &S,
    ) -> Result<BatchOutcome>
    where
        G: GeoCodingGateway,
        R: QuotaRepo,
        C: BatchControl,
        S: BatchEventSink,
    {
        if self.state != BatchState::Idle {
            return Err(Error::JobAlreadyStarted);
        }
        self.cancel.clear();
        let quota = load_quota(quota_repo, today_utc())?;
        if !quota.has_api_key() {
            return Err(Error::MissingApiKey);
        }
        if self.rows.is_empty() {
            return Err(Error::EmptyInput);
        }

        let total = self.rows.len();
        self.state = BatchState::Running;
        log::info!("Start geocoding {total} rows");
        events.emit(BatchEvent::Started {
            total,
            estimated: settings.pacing * u32::try_from(total).unwrap_or(u32::MAX),
            used: quota.usage,
            remaining: quota.remaining(settings.daily_limit),
            reset_in: TimeUntilReset::from_now(now_utc()),
        });

        match self.process_rows(geocoder, quota_repo, settings, control, events, quota) {
            Ok(true) => {
                let results = mem::take(&mut self.results);
                let resolved = results.iter().filter(|r| !r.is_unresolved()).count();
                self.state = BatchState::Completed;
                log::info!("Geocoded {resolved} of {total} rows");
                events.emit(BatchEvent::Completed {
                    rows: total,
                    resolved,
                });
                Ok(BatchOutcome::Completed(results))
            }
            Ok(false) => {
                self.results.clear();
                self.state = BatchState::Cancelled;
                log::info!("Geocoding cancelled");
                events.emit(BatchEvent::Cancelled);
                Ok(BatchOutcome::Cancelled)
            }
            Err(err) => {
                self.results.clear();
                self.state = BatchState::Failed;
                Err(err)
            }
        }
    }

    // Returns `false` if the run has been cancelled.
    fn process_rows<G, R, C, S>(
        &mut self,
        geocoder: &G,
        quota_repo: &R,
        settings: &BatchSettings,
        control: &C,
        events: &S,
        mut quota: QuotaState,
    ) -> Result<bool>
    where
        G: GeoCodingGateway,
        R: QuotaRepo,
        C: BatchControl,
        S: BatchEventSink,
    {
        let total = self.rows.len();
        let mut limit_reported = quota.is_exhausted(settings.daily_limit);
        if limit_reported {
            events.emit(BatchEvent::QuotaLimitReached {
                used: quota.usage,
                limit: settings.daily_limit,
            });
        }

        for row in 0..total {
            if self.cancel.is_cancelled() {
                return Ok(false);
            }
            if settings.quota_policy == QuotaPolicy::Enforce
                && quota.is_exhausted(settings.daily_limit)
            {
                log::warn!("Daily limit of {} lookups reached", settings.daily_limit);
                events.emit(BatchEvent::QuotaExhausted {
                    limit: settings.daily_limit,
                });
                return Err(Error::QuotaExhausted(settings.daily_limit));
            }

            let address = self.rows[row].address(settings.address_column);
            let (outcome, updated_quota) =
                lookup_address(geocoder, quota_repo, settings.pacing, address)?;
            let address = address.map(ToString::to_string);
            if let Some(updated_quota) = updated_quota {
                quota = updated_quota;
            }
            self.results.push(outcome.result());
            events.emit(row_event(row, address.clone(), &outcome));
            events.emit(BatchEvent::Progress {
                processed: row + 1,
                total,
            });

            if !limit_reported && quota.is_exhausted(settings.daily_limit) {
                limit_reported = true;
                events.emit(BatchEvent::QuotaLimitReached {
                    used: quota.usage,
                    limit: settings.daily_limit,
                });
            }

            if row == 0 && !outcome.is_found() {
                self.state = BatchState::AwaitingContinue;
                log::warn!("The first row could not be geocoded");
                control.begin_pause();
                events.emit(BatchEvent::FirstRowFailed { address });
                match control.await_decision() {
                    Decision::Continue => {
                        self.state = BatchState::Running;
                        events.emit(BatchEvent::Resumed);
                    }
                    Decision::Cancel => return Ok(false),
                }
            }
        }
        Ok(true)
    }
}

fn row_event(row: usize, address: Option<String>, outcome: &LookupOutcome) -> BatchEvent {
    match (address, outcome) {
        (Some(address), LookupOutcome::Found(location)) => BatchEvent::Geocoded {
            row,
            address,
            location: *location,
        },
        (Some(address), LookupOutcome::NotFound) => BatchEvent::NotFound { row, address },
        (Some(address), LookupOutcome::Failed(reason)) => BatchEvent::LookupFailed {
            row,
            address,
            reason: reason.clone(),
        },
        (_, _) => BatchEvent::MissingAddress { row },
    }
}
