//! Process environment overrides shared by the integration test binaries.

use std::env;
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Holds the environment lock and the values to put back on drop.
///
/// A `None` value unsets the variable for the lifetime of the guard.
pub struct ScopedEnv {
    restore: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub fn apply<K, V>(overrides: impl IntoIterator<Item = (K, Option<V>)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let restore = overrides
            .into_iter()
            .map(|(key, value)| {
                let name: OsString = key.into();
                let saved = env::var_os(&name);
                let replacement: Option<OsString> = value.map(Into::into);
                write_var(&name, replacement.as_deref());
                (name, saved)
            })
            .collect();
        Self {
            restore,
            _lock: lock,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        // Reverse order so a key listed twice ends at its pre-guard value.
        while let Some((name, saved)) = self.restore.pop() {
            write_var(&name, saved.as_deref());
        }
    }
}

fn write_var(name: &OsStr, value: Option<&OsStr>) {
    // SAFETY: callers hold `ENV_LOCK`, so no other test thread touches the
    // environment concurrently.
    unsafe {
        match value {
            Some(text) => env::set_var(name, text),
            None => env::remove_var(name),
        }
    }
}
