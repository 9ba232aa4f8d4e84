//! Poll loop guards
//!
//! Every blocking operation is a busy-poll. A [`Deadline`] bounds it in time
//! and observes the cancellation token; [`pace`] applies the configured gap
//! between polls.

use embassy_time::{Duration, Instant};

use super::cancel::CancelToken;
use super::config::PollPolicy;
use super::error::{Error, Operation, Result};
use super::io::RobotIo;

/// Time and cancellation bound for one busy-poll
pub(crate) struct Deadline {
    operation: Operation,
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start<IO: RobotIo>(io: &mut IO, operation: Operation, limit: Option<Duration>) -> Self {
        Self {
            operation,
            started: io.now(),
            limit,
        }
    }

    /// Fails once the token is raised or the limit has passed
    pub(crate) fn check<IO: RobotIo>(&self, io: &mut IO, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            warn!("{:?} cancelled", self.operation);
            return Err(Error::Cancelled {
                operation: self.operation,
            });
        }

        if let Some(limit) = self.limit {
            let waited = io
                .now()
                .checked_duration_since(self.started)
                .unwrap_or(Duration::from_ticks(0));
            if waited > limit {
                warn!("{:?} timed out after {} ms", self.operation, waited.as_millis());
                return Err(Error::Timeout {
                    operation: self.operation,
                    waited_ms: waited.as_millis(),
                });
            }
        }

        Ok(())
    }
}

/// Waits between two polls according to the policy
pub(crate) fn pace<IO: RobotIo>(io: &mut IO, policy: PollPolicy) {
    match policy {
        PollPolicy::Tight => {}
        PollPolicy::FixedDelay { ms } => io.sleep(Duration::from_millis(ms)),
    }
}
