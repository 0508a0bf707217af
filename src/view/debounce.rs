//! Cancellable delayed commit for search input

use log::debug;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::filters::FilterState;

/// Commits the latest input once it has stayed unchanged for `delay`
///
/// Each [`push`](Self::push) cancels the previously scheduled commit, so a
/// burst of keystrokes commits exactly once. Consumers watch
/// [`subscribe`](Self::subscribe) and copy the committed value into their
/// page filters with [`apply_to`](Self::apply_to).
pub struct SearchDebouncer {
    delay: Duration,
    committed: watch::Sender<String>,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    /// Must be created inside a Tokio runtime
    pub fn new(delay: Duration, initial: &str) -> Self {
        let (committed, _) = watch::channel(initial.to_string());
        Self {
            delay,
            committed,
            pending: None,
        }
    }

    /// Schedule `text` for commit, cancelling any earlier schedule
    pub fn push(&mut self, text: &str) {
        self.cancel();

        let committed = self.committed.clone();
        let delay = self.delay;
        let text = text.to_string();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            debug!("search committed: {:?}", text);
            committed.send_if_modified(|current| {
                if *current == text {
                    false
                } else {
                    *current = text;
                    true
                }
            });
        }));
    }

    /// Drop the scheduled commit, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Commit `text` immediately, as on an explicit submit
    pub fn flush(&mut self, text: &str) {
        self.cancel();
        self.committed.send_replace(text.to_string());
    }

    /// Last committed value
    pub fn committed(&self) -> String {
        self.committed.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.committed.subscribe()
    }

    /// Copy the committed value into `filters`
    ///
    /// Returns `true` when the search changed, which also moved the list
    /// back to page 1. An unchanged value leaves the page alone.
    pub fn apply_to(&self, filters: &mut FilterState) -> bool {
        let committed = self.committed.borrow();
        if filters.search_query() == committed.as_str() {
            return false;
        }
        filters.set_search_query(committed.as_str());
        true
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
