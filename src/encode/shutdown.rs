//! Process-wide record of live encoder children.
//!
//! Every [`ChildGuard`](crate::encode::process::ChildGuard) registers its child here so a
//! termination handler can kill encoders the main thread is blocked on. A child is taken out of
//! its shared slot by whoever terminates it first, so each one is killed and reaped at most once.

use std::process::Child;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub(crate) type ChildSlot = Mutex<Option<Child>>;

static LIVE: Mutex<Vec<Weak<ChildSlot>>> = Mutex::new(Vec::new());

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn register(child: Child) -> Arc<ChildSlot> {
    let slot = Arc::new(Mutex::new(Some(child)));
    let mut live = lock(&LIVE);
    live.retain(|w| w.strong_count() > 0);
    live.push(Arc::downgrade(&slot));
    slot
}

/// Kill the child in `slot` if it has not exited yet, then reap it.
///
/// Returns `true` only when this call actually killed a running process.
pub(crate) fn kill_and_reap(slot: &ChildSlot) -> bool {
    let Some(mut child) = lock(slot).take() else {
        return false;
    };
    let running = matches!(child.try_wait(), Ok(None));
    if running {
        let pid = child.id();
        if let Err(e) = child.kill() {
            tracing::warn!(pid, error = %e, "failed to kill encoder process");
        } else {
            tracing::warn!(pid, "killed encoder process");
        }
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "failed to reap encoder process");
    }
    running
}

/// Kill and reap every encoder child still owned by this process.
///
/// Meant for termination handlers; sinks whose child disappears this way fail on their next
/// write or wait. Returns how many running processes were killed.
pub fn terminate_encoders() -> usize {
    let live: Vec<_> = lock(&LIVE).drain(..).filter_map(|w| w.upgrade()).collect();
    live.iter().filter(|slot| kill_and_reap(slot)).count()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/shutdown.rs"]
mod tests;
