//! Cancellation Module
//!
//! Cooperative stop request for the blocking operations. It uses an
//! embassy-sync Signal so it can be raised from an interrupt-level task (the
//! firmware's stop button) while the run script busy-polls in thread mode.
//! Every poll loop checks the token once per iteration.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Stop request shared between the run script and whoever may abort it
pub struct CancelToken {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl CancelToken {
    /// Creates a token that is not raised; usable in a `static`
    pub const fn new() -> Self {
        Self { signal: Signal::new() }
    }

    /// Raises the token; running and future operations return `Cancelled`
    pub fn cancel(&self) {
        self.signal.signal(());
    }

    /// Whether the token is raised
    pub fn is_cancelled(&self) -> bool {
        self.signal.signaled()
    }

    /// Lowers the token again
    pub fn reset(&self) {
        self.signal.reset();
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_and_lower() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
        // checking does not consume the request
        assert!(token.is_cancelled());

        token.reset();
        assert!(!token.is_cancelled());
    }
}
