//! Frame pacing
//!
//! The host calls us once per presentation with a timestamp. A frame is
//! accepted only if at least `threshold` time units passed since the last
//! accepted one; accepted frames run `update(delta_time)` then `render()`.
//! There is no catch-up and no upper bound on `delta_time`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The per-frame work driven by the loop
pub trait FrameHandler {
    fn update(&mut self, delta_time: f64);
    fn render(&mut self);
}

/// Shared stop flag, checked before every wait for the next frame
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Minimum-interval throttle holding the last accepted timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    prev_time: f64,
    threshold: f64,
}

impl FrameClock {
    /// Starts at time zero, the host's timestamp origin
    pub fn new(threshold: f64) -> Self {
        Self {
            prev_time: 0.0,
            threshold,
        }
    }

    /// Elapsed time if this presentation should run a frame.
    ///
    /// Rejected presentations leave the clock untouched. Timestamps that go
    /// backwards or are not numbers are rejected.
    pub fn accept(&mut self, curr_time: f64) -> Option<f64> {
        let delta_time = curr_time - self.prev_time;
        if !(delta_time >= self.threshold) {
            return None;
        }
        self.prev_time = curr_time;
        Some(delta_time)
    }

    pub fn prev_time(&self) -> f64 {
        self.prev_time
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// What one presentation callback did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Update and render ran with this elapsed time
    Accepted(f64),
    /// Too soon after the previous frame; nothing ran
    Throttled,
    /// The loop was cancelled; nothing ran and nothing will
    Cancelled,
}

/// Presentation-driven game loop
pub struct LoopDriver<H> {
    clock: FrameClock,
    handler: H,
    cancel: CancelToken,
    accepted: u64,
}

impl<H: FrameHandler> LoopDriver<H> {
    pub fn new(handler: H, threshold: f64) -> Self {
        Self {
            clock: FrameClock::new(threshold),
            handler,
            cancel: CancelToken::new(),
            accepted: 0,
        }
    }

    /// Token that stops this loop; clone it freely
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Frames that ran update/render so far
    pub fn accepted_frames(&self) -> u64 {
        self.accepted
    }

    /// Handle one presentation callback
    pub fn on_frame(&mut self, curr_time: f64) -> FrameOutcome {
        if self.cancel.is_cancelled() {
            return FrameOutcome::Cancelled;
        }
        match self.clock.accept(curr_time) {
            Some(delta_time) => {
                self.handler.update(delta_time);
                self.handler.render();
                self.accepted += 1;
                FrameOutcome::Accepted(delta_time)
            }
            None => FrameOutcome::Throttled,
        }
    }

    /// Drive the loop from a sequence of presentation timestamps.
    ///
    /// Each item is one wait on the host's presentation primitive; the cancel
    /// flag is checked before every wait. Returns the number of accepted frames.
    pub fn run<I>(&mut self, presentations: I) -> u64
    where
        I: IntoIterator<Item = f64>,
    {
        let start = self.accepted;
        let mut presentations = presentations.into_iter();
        while !self.cancel.is_cancelled() {
            let Some(curr_time) = presentations.next() else {
                break;
            };
            self.on_frame(curr_time);
        }
        self.accepted - start
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Timestamps of an ideal display refreshing every `interval`, starting at `interval`
pub fn steady_presentations(interval: f64) -> impl Iterator<Item = f64> {
    (1u64..).map(move |i| i as f64 * interval)
}
