//! Environment abstraction for deterministic testing.
//!
//! Message construction reads the wall clock (timestamps) and the secure
//! random source (salts). Both come through [`Environment`] so tests can pin
//! them and compare raw encodings byte for byte.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{RngCore, rngs::OsRng};

/// Time and randomness available to message construction.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Wall-clock time in milliseconds since the Unix epoch.
    fn current_time_millis(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Uses the process-wide cryptographically secure source in production
    fn random_bytes(&self, buffer: &mut [u8]);
}

/// Production environment: system clock and OS randomness.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    #[allow(clippy::disallowed_methods)]
    fn current_time_millis(&self) -> u64 {
        // A clock set before 1970 reads as the epoch
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}
