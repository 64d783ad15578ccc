//! Scoped environment overrides for unit tests.
//!
//! The cargo aliases export `WMFDB_SECTION_MAP_TEST_DATA` for the whole
//! test process, and the test harness runs tests on parallel threads. A
//! test that flips the variable takes a [`ScopedEnv`], which holds a
//! process-wide lock until it is dropped and then puts the old value back.

use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// One environment variable, overridden for as long as this value lives.
pub struct ScopedEnv {
    key: &'static str,
    previous: Option<String>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub fn set(key: &'static str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    pub fn unset(key: &'static str) -> Self {
        Self::replace(key, None)
    }

    fn replace(key: &'static str, value: Option<&str>) -> Self {
        // A failed test leaves the lock poisoned; the guarded state is `()`.
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = env::var(key).ok();
        write_var(key, value);
        Self {
            key,
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        write_var(self.key, self.previous.as_deref());
    }
}

#[allow(unsafe_code)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: only called while ENV_LOCK is held.
    unsafe {
        env::remove_var(key);
        if let Some(value) = value {
            env::set_var(key, value);
        }
    }
}
