use crossterm::terminal;
use std::io::{IsTerminal, stdin};

/// Terminal raw mode, held for the lifetime of the value and reset on drop.
pub struct RawLock {
    is_active: bool,
}

impl RawLock {
    /// True if the terminal actually switched to raw mode.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Drop for RawLock {
    fn drop(&mut self) {
        if !self.is_active {
            return;
        }
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            eprintln!("Error resetting terminal {e}");
        }
    }
}

/// Set terminal to raw in best-effort mode, only log on failure.
///
/// Keystrokes are then delivered immediately and without echo. Stays inactive when stdin is not
/// a terminal, e.g. for tests or piped input, which is then read as is.
#[must_use]
pub fn set_terminal_raw() -> RawLock {
    if !stdin().is_terminal() {
        tracing::debug!("Stdin is no terminal, not switching to raw mode");
        return RawLock { is_active: false };
    }
    match terminal::enable_raw_mode() {
        Ok(()) => RawLock { is_active: true },
        Err(e) => {
            tracing::warn!("Could not set terminal to raw mode: {e}");
            RawLock { is_active: false }
        }
    }
}
