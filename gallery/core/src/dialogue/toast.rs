//! Error Toast
//!
//! Non-modal overlay that shows the latest failure and hides itself after a
//! delay, counting down once per second. It lives outside the modal slot so
//! a failed submission can report its error while the form stays open.
//!
//! # Timer
//!
//! Each `show` spawns one timer task and bumps a generation counter. Timer
//! events carry the generation they were spawned for; anything older than
//! the current generation is ignored. Closing aborts the task as well, so an
//! expiry already sitting in the channel cannot hide a newer error.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::messages::{RenderDirective, Surface};
use crate::ops::Completion;

/// Event produced by the toast timer task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second passed
    Tick {
        /// Generation the timer belongs to
        generation: u64,
        /// Whole seconds until expiry
        seconds_left: u64,
    },
    /// The delay elapsed
    Expired {
        /// Generation the timer belongs to
        generation: u64,
    },
}

impl TimerEvent {
    fn generation(self) -> u64 {
        match self {
            Self::Tick { generation, .. } | Self::Expired { generation } => generation,
        }
    }
}

/// The error overlay
#[derive(Debug)]
pub struct ErrorToast {
    delay: Duration,
    generation: u64,
    message: Option<String>,
    timer: Option<AbortHandle>,
    surface: Surface,
    completions: mpsc::UnboundedSender<Completion>,
}

impl ErrorToast {
    /// Create a hidden toast
    #[must_use]
    pub fn new(
        delay: Duration,
        surface: Surface,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            delay,
            generation: 0,
            message: None,
            timer: None,
            surface,
            completions,
        }
    }

    /// Whether the toast is on screen
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    /// Message on screen
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Current timer generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Show a message, replacing any visible one and restarting the delay
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.cancel_timer();
        self.generation += 1;

        self.surface.emit(RenderDirective::ErrorShown {
            message: message.clone(),
            seconds_left: self.delay.as_secs(),
        });
        self.message = Some(message);
        self.timer = Some(self.spawn_timer());
        debug!(generation = self.generation, "Error toast shown");
    }

    /// Hide the toast by hand; no-op when hidden
    pub fn close(&mut self) -> bool {
        if !self.is_visible() {
            return false;
        }
        self.cancel_timer();
        self.generation += 1;
        self.hide();
        true
    }

    /// Apply a timer event; returns `true` when it changed the toast
    pub fn on_timer(&mut self, event: TimerEvent) -> bool {
        if event.generation() != self.generation || !self.is_visible() {
            debug!(
                event_generation = event.generation(),
                current = self.generation,
                "Stale toast timer event ignored"
            );
            return false;
        }
        match event {
            TimerEvent::Tick { seconds_left, .. } => {
                self.surface
                    .emit(RenderDirective::ErrorCountdown { seconds_left });
            }
            TimerEvent::Expired { .. } => {
                self.timer = None;
                self.generation += 1;
                self.hide();
            }
        }
        true
    }

    fn hide(&mut self) {
        self.message = None;
        self.surface.emit(RenderDirective::ErrorHidden);
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn spawn_timer(&self) -> AbortHandle {
        let generation = self.generation;
        let delay = self.delay;
        let tx = self.completions.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let deadline = start + delay;
            let mut elapsed = 1;
            let mut next_tick = start + Duration::from_secs(elapsed);

            while next_tick < deadline {
                tokio::time::sleep_until(next_tick).await;
                let event = TimerEvent::Tick {
                    generation,
                    seconds_left: delay.as_secs().saturating_sub(elapsed),
                };
                if tx.send(Completion::Timer(event)).is_err() {
                    return;
                }
                elapsed += 1;
                next_tick = start + Duration::from_secs(elapsed);
            }

            tokio::time::sleep_until(deadline).await;
            if tx
                .send(Completion::Timer(TimerEvent::Expired { generation }))
                .is_err()
            {
                warn!(generation, "Toast expired after engine shut down");
            }
        })
        .abort_handle()
    }
}

impl Drop for ErrorToast {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
