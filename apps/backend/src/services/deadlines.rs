//! Scheduled callbacks with cancellable handles.

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

pub type DeadlineCallback = Box<dyn FnOnce() + Send + 'static>;

/// Cancelling a handle guarantees its callback never runs afterwards.
#[derive(Debug, Clone)]
pub struct DeadlineHandle {
    token: CancellationToken,
}

impl DeadlineHandle {
    fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

pub trait DeadlineService: Send + Sync + 'static {
    fn after(&self, delay: Duration, callback: DeadlineCallback) -> DeadlineHandle;
}

/// One tokio task per deadline. Must be called inside a runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDeadlineService;

impl DeadlineService for TokioDeadlineService {
    fn after(&self, delay: Duration, callback: DeadlineCallback) -> DeadlineHandle {
        let handle = DeadlineHandle::new();
        let token = handle.token.clone();
        tokio::spawn(async move {
            let fired = tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if fired && !token.is_cancelled() {
                callback();
            }
        });
        handle
    }
}

struct Scheduled {
    delay: Duration,
    handle: DeadlineHandle,
    callback: Option<DeadlineCallback>,
}

/// Deadlines that fire only when a test says so.
#[derive(Default)]
pub struct ManualDeadlineService {
    scheduled: Mutex<Vec<Scheduled>>,
}

impl ManualDeadlineService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadlines neither cancelled nor fired.
    pub fn pending(&self) -> usize {
        self.scheduled
            .lock()
            .iter()
            .filter(|s| s.callback.is_some() && !s.handle.is_cancelled())
            .count()
    }

    /// Delay requested by the most recently scheduled live deadline.
    pub fn last_delay(&self) -> Option<Duration> {
        self.scheduled
            .lock()
            .iter()
            .rev()
            .find(|s| s.callback.is_some() && !s.handle.is_cancelled())
            .map(|s| s.delay)
    }

    /// Fire every live deadline; returns how many ran.
    pub fn fire_all(&self) -> usize {
        let due: Vec<DeadlineCallback> = {
            let mut scheduled = self.scheduled.lock();
            scheduled
                .iter_mut()
                .filter(|s| !s.handle.is_cancelled())
                .filter_map(|s| s.callback.take())
                .collect()
        };
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }

    /// Run callbacks even for cancelled handles, to exercise stale-fire paths.
    pub fn fire_including_cancelled(&self) -> usize {
        let due: Vec<DeadlineCallback> = {
            let mut scheduled = self.scheduled.lock();
            scheduled.iter_mut().filter_map(|s| s.callback.take()).collect()
        };
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }
}

impl DeadlineService for ManualDeadlineService {
    fn after(&self, delay: Duration, callback: DeadlineCallback) -> DeadlineHandle {
        let handle = DeadlineHandle::new();
        self.scheduled.lock().push(Scheduled {
            delay,
            handle: handle.clone(),
            callback: Some(callback),
        });
        handle
    }
}
