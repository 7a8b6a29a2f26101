//! # Search Debouncer
//!
//! Holds back search text until typing pauses.
//!
//! ```text
//! set("a")  set("ab")  set("abc")                      published: "abc"
//!    │──100ms──│──100ms───│──────────300ms quiet─────────►│
//! ```
//!
//! A background task watches the raw input and publishes the latest value
//! once no new input has arrived for `delay`. Intermediate values are never
//! published.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct SearchDebouncer {
    input: watch::Sender<String>,
    output: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Starts the debounce task. Must be called inside a Tokio runtime.
    pub fn new(delay: Duration) -> Self {
        let (input, mut raw) = watch::channel(String::new());
        let (published, output) = watch::channel(String::new());

        let task = tokio::spawn(async move {
            // Wait for the first keystroke of a burst.
            while raw.changed().await.is_ok() {
                loop {
                    tokio::select! {
                        changed = raw.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            // New input restarts the quiet period.
                        }
                        _ = tokio::time::sleep(delay) => {
                            let latest = raw.borrow_and_update().clone();
                            published.send_if_modified(|current| {
                                if *current == latest {
                                    return false;
                                }
                                debug!(search = %latest, "Search text settled");
                                *current = latest;
                                true
                            });
                            break;
                        }
                    }
                }
            }
        });

        SearchDebouncer {
            input,
            output,
            task,
        }
    }

    /// Records a keystroke's worth of input.
    pub fn set(&self, text: impl Into<String>) {
        self.input.send_replace(text.into());
    }

    /// Last published (settled) text.
    pub fn current(&self) -> String {
        self.output.borrow().clone()
    }

    /// Receiver that is notified whenever settled text changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.output.clone()
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
