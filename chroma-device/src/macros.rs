//! Macro key event listener
//!
//! Consumes decoded input events from an external input-event source and
//! forwards key-down presses of designated macro keys as triggers. The
//! listener is an independent task: it shares no lock with the command
//! execution path, and stopping it never waits on in-flight hardware
//! commands. Shutdown is an explicit cancellation signal followed by a
//! join, so ordering is observable.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Key released.
pub const KEY_UP: i32 = 0;
/// Key pressed.
pub const KEY_DOWN: i32 = 1;
/// Key auto-repeating while held.
pub const KEY_HOLD: i32 = 2;

/// One decoded input event from the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub scancode: u16,
    pub value: i32,
    pub timestamp: Duration,
}

/// A macro key press worth acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroTrigger {
    pub scancode: u16,
    pub timestamp: Duration,
}

/// Running listener task handle.
pub struct MacroListener {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MacroListener {
    /// Start listening.
    ///
    /// Key-down events whose scancode appears in `macro_keys` are forwarded
    /// to `triggers`; everything else is discarded. The task exits when the
    /// event source closes, the trigger receiver is dropped, or [`stop`]
    /// is called.
    ///
    /// [`stop`]: MacroListener::stop
    pub fn spawn(
        mut events: mpsc::Receiver<InputEvent>,
        macro_keys: Vec<u16>,
        triggers: mpsc::Sender<MacroTrigger>,
    ) -> Self {
        let (cancel, mut cancelled) = watch::channel(false);
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = cancelled.changed() => {
                        if changed.is_err() || *cancelled.borrow() {
                            break;
                        }
                    }
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        if event.value != KEY_DOWN || !macro_keys.contains(&event.scancode) {
                            continue;
                        }
                        debug!("macro key 0x{:04X} pressed", event.scancode);
                        let trigger = MacroTrigger {
                            scancode: event.scancode,
                            timestamp: event.timestamp,
                        };
                        if triggers.send(trigger).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("macro listener stopped");
        });
        Self { cancel, task }
    }

    /// Whether the task has already exited on its own.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the listener and wait for the task to exit.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.task.await;
    }
}
