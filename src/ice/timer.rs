use std::time::{Duration, Instant};

/// Deadline for the transport to become writable.
///
/// At most one instance is outstanding. Arming again replaces the previous
/// deadline, and a fired timer stays quiet until it is armed anew.
#[derive(Debug)]
pub(crate) struct WritableTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl WritableTimer {
    pub fn new(timeout: Duration) -> Self {
        WritableTimer {
            timeout,
            deadline: None,
        }
    }

    /// (Re)arm the timer to fire at `now + timeout`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
        trace!("Arm writable timer for {:?}", self.timeout);
    }

    pub fn clear(&mut self) {
        if self.deadline.take().is_some() {
            trace!("Clear writable timer");
        }
    }

    pub fn poll_timeout(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline is reached.
    pub fn handle_timeout(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                debug!("Writable timer fired");
                true
            }
            _ => false,
        }
    }
}
