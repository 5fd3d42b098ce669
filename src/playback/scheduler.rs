use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifies one requested tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// "Call me on the next frame" seam.
///
/// The driver keeps at most one tick outstanding and cancels it synchronously on
/// every transition away from playing.
pub trait TickScheduler {
    /// Request a tick; the host later dispatches `Tick(handle)`.
    fn request_tick(&mut self) -> TickHandle;
    /// Withdraw a tick. Unknown handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct SchedulerLog {
    next_id: u64,
    pending: VecDeque<TickHandle>,
    requested: Vec<TickHandle>,
    cancelled: Vec<TickHandle>,
}

/// Scheduler driven by the host loop, which pulls due ticks with [`ManualScheduler::take_due`].
///
/// Clones share state, so one copy can live inside the driver while the host keeps another.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<SchedulerLog>>,
}

impl ManualScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, SchedulerLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Oldest outstanding tick, removing it from the queue.
    pub fn take_due(&self) -> Option<TickHandle> {
        self.log().pending.pop_front()
    }

    /// Number of outstanding ticks.
    pub fn pending_count(&self) -> usize {
        self.log().pending.len()
    }

    /// Every handle ever requested, in order.
    pub fn requested(&self) -> Vec<TickHandle> {
        self.log().requested.clone()
    }

    /// Every handle cancelled while still outstanding, in order.
    pub fn cancelled(&self) -> Vec<TickHandle> {
        self.log().cancelled.clone()
    }
}

impl TickScheduler for ManualScheduler {
    fn request_tick(&mut self) -> TickHandle {
        let mut log = self.log();
        log.next_id += 1;
        let handle = TickHandle(log.next_id);
        log.pending.push_back(handle);
        log.requested.push(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        let mut log = self.log();
        if let Some(pos) = log.pending.iter().position(|h| *h == handle) {
            log.pending.remove(pos);
            log.cancelled.push(handle);
        }
    }
}
