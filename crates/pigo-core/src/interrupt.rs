// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
//! SIGINT handling: first Ctrl-C during a turn cancels it, a second within
//! one second terminates the process. Ctrl-C at the prompt terminates
//! immediately.
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

const ARMED_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Idle,
    Running,
    Armed,
}

struct Inner {
    turn_cancel: Option<CancellationToken>,
    armed_since: Option<Instant>,
}

/// Tracks whether a turn is running and whether a Ctrl-C has already armed
/// the double-tap-to-quit window. One controller is shared between the Turn
/// Loop and the signal listener task.
pub struct InterruptController {
    inner: Mutex<Inner>,
}

impl InterruptController {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { turn_cancel: None, armed_since: None }) }
    }

    pub fn start_turn(&self, cancel: CancellationToken) {
        let mut inner = self.inner.lock().expect("interrupt lock poisoned");
        inner.turn_cancel = Some(cancel);
        inner.armed_since = None;
    }

    pub fn end_turn(&self) {
        let mut inner = self.inner.lock().expect("interrupt lock poisoned");
        inner.turn_cancel = None;
        inner.armed_since = None;
    }

    pub fn state(&self) -> InterruptState {
        let inner = self.inner.lock().expect("interrupt lock poisoned");
        if let Some(since) = inner.armed_since {
            if since.elapsed() < ARMED_WINDOW {
                return InterruptState::Armed;
            }
        }
        if inner.turn_cancel.is_some() { InterruptState::Running } else { InterruptState::Idle }
    }

    /// Called on every SIGINT. Returns `true` when the process should exit.
    pub fn handle_sigint(&self) -> bool {
        let mut inner = self.inner.lock().expect("interrupt lock poisoned");
        if let Some(since) = inner.armed_since {
            if since.elapsed() < ARMED_WINDOW {
                return true;
            }
        }
        match inner.turn_cancel.take() {
            Some(cancel) => {
                cancel.cancel();
                inner.armed_since = Some(Instant::now());
                false
            }
            None => true,
        }
    }
}

impl Default for InterruptController {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background task that awaits Ctrl-C and drives the controller.
/// Exits the process with code 130 on a terminating SIGINT.
pub fn spawn_listener(controller: Arc<InterruptController>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if controller.handle_sigint() {
                std::process::exit(130);
            }
        }
    })
}
