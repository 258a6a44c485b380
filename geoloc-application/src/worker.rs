use super::{error::AppError, geocode_csv_file::*, *};
use parking_lot::{Condvar, Mutex};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};
use usecases::{BatchControl, BatchEvent, CancelFlag, Decision};

/// Runs at most one batch job at a time on a background thread.
#[derive(Debug, Clone, Default)]
pub struct BatchWorker {
    busy: Arc<AtomicBool>,
}

impl BatchWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn start<G, R>(
        &self,
        params: GeocodeFileParams,
        geocoder: G,
        quota_repo: R,
    ) -> Result<BatchHandle>
    where
        G: GeoCodingGateway + Send + 'static,
        R: QuotaRepo + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::AlreadyRunning);
        }
        let busy = BusyGuard(Arc::clone(&self.busy));
        let controller = BatchController::default();
        let (tx, rx) = mpsc::channel();
        let thread = {
            let controller = controller.clone();
            thread::Builder::new()
                .name("geocoding".into())
                .spawn(move || {
                    let _busy = busy;
                    geocode_csv_file(
                        &params,
                        &geocoder,
                        &quota_repo,
                        &controller.cancel,
                        &*controller.decisions,
                        &tx,
                    )
                })?
        };
        debug!("Started geocoding worker");
        Ok(BatchHandle {
            controller,
            events: rx,
            thread,
        })
    }
}

struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct PendingDecision {
    paused: bool,
    decision: Option<Decision>,
}

/// Hands over the user's decision to a paused job.
///
/// `Continue` only counts while the job is paused.
/// `Cancel` is kept until the job asks for it.
#[derive(Debug, Default)]
struct DecisionSlot {
    pending: Mutex<PendingDecision>,
    posted: Condvar,
}

impl DecisionSlot {
    fn post(&self, decision: Decision) {
        let mut pending = self.pending.lock();
        if decision == Decision::Continue && !pending.paused {
            debug!("Ignoring request to continue a job that is not paused");
            return;
        }
        pending.decision = Some(decision);
        self.posted.notify_all();
    }
}

impl BatchControl for DecisionSlot {
    fn begin_pause(&self) {
        let mut pending = self.pending.lock();
        pending.paused = true;
        if pending.decision == Some(Decision::Continue) {
            pending.decision = None;
        }
    }

    fn await_decision(&self) -> Decision {
        let mut pending = self.pending.lock();
        loop {
            if let Some(d) = pending.decision.take() {
                pending.paused = false;
                return d;
            }
            self.posted.wait(&mut pending);
        }
    }
}

/// Steers a running job from another thread.
#[derive(Debug, Clone, Default)]
pub struct BatchController {
    cancel: CancelFlag,
    decisions: Arc<DecisionSlot>,
}

impl BatchController {
    /// Stop before the next row; a lookup in flight is finished first.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.decisions.post(Decision::Cancel);
    }

    /// Continue a job that paused after its first row.
    pub fn resume(&self) {
        self.decisions.post(Decision::Continue);
    }
}

#[derive(Debug)]
pub struct BatchHandle {
    controller: BatchController,
    events: Receiver<BatchEvent>,
    thread: JoinHandle<Result<FileOutcome>>,
}

impl BatchHandle {
    pub fn controller(&self) -> BatchController {
        self.controller.clone()
    }

    pub fn cancel(&self) {
        self.controller.cancel();
    }

    pub fn resume(&self) {
        self.controller.resume();
    }

    /// The channel is closed when the job has terminated.
    pub fn events(&self) -> &Receiver<BatchEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Result<FileOutcome> {
        self.thread.join().map_err(|_| AppError::WorkerPanicked)?
    }
}
