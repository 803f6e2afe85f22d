//! A cancellation arena for subscription tasks.
//!
//! Mirrors a composite disposable: tasks spawned into a set are aborted
//! together. The synchronizer keeps one set per subscription lifetime class
//! (attach-wide, per-tab-set listeners, active-tab multiplex).

use std::future::Future;

use tokio::task::AbortHandle;

#[derive(Default)]
pub(crate) struct SubscriptionSet {
    handles: Vec<AbortHandle>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawns a task owned by this set.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.handles.push(handle.abort_handle());
    }

    /// Aborts every task in the set. Safe to call repeatedly.
    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
