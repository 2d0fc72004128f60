use std::time::Duration;

/// Coalesces redraw requests to at most one refresh per `min_interval`.
///
/// A request is never dropped: if it arrives too soon it stays pending and
/// fires on the first poll after the interval has passed.
#[derive(Debug, Clone)]
pub struct RedrawLimiter {
    min_interval: Duration,
    since_last: Duration,
    pending: bool,
}

impl RedrawLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            since_last: min_interval,
            pending: false,
        }
    }

    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Advance by `dt`; `true` means the caller should refresh now.
    pub fn poll(&mut self, dt: Duration) -> bool {
        self.since_last = self.since_last.saturating_add(dt);
        if self.pending && self.since_last >= self.min_interval {
            self.pending = false;
            self.since_last = Duration::ZERO;
            return true;
        }
        false
    }
}
