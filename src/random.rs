//! Random sources handed to the engine.
//!
//! [`OsRandom`] is what production code wants. [`SeededRandom`] produces the
//! same bytes for the same seed, which makes captured handshakes repeatable in
//! tests.

use std::fmt;
use std::sync::Mutex;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// Provider of random bytes, shared by all sessions.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` completely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

impl<F> RandomSource for F
where
    F: Fn(&mut [u8]) -> Result<(), rand::Error> + Send + Sync,
{
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self(dest)
    }
}

/// Randomness from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Deterministic randomness from a seed.
///
/// Not suitable for anything but tests.
pub struct SeededRandom {
    inner: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        // A panic while holding the lock cannot leave StdRng inconsistent.
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        rng.try_fill_bytes(dest)
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom").finish_non_exhaustive()
    }
}
