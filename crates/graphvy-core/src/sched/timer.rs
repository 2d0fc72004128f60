use std::time::Duration;

/// Fixed-interval timer driven by the host's frame delta.
///
/// Fires at most once per `advance`; a long frame does not queue up a backlog.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
    armed: bool,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            armed: true,
        }
    }

    pub fn disarmed(interval: Duration) -> Self {
        Self {
            armed: false,
            ..Self::new(interval)
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn cancel(&mut self) {
        self.armed = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn arm(&mut self) {
        self.armed = true;
        self.elapsed = Duration::ZERO;
    }

    /// Returns `true` when the interval elapsed during this advance.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }
}
