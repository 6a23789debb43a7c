//! Frame-rate aware render loop.
//!
//! A [`Scheduler`] owns a frame callback and a single pending frame request.
//! The host calls [`Scheduler::run_frame`] once per display refresh; the
//! scheduler decides whether the callback is due, tracks elapsed time and the
//! instantaneous frame rate, and re-arms the request while it is active.

use std::ops::ControlFlow;
use std::time::Instant;

/// Monotonic time source in milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Frame callback: receives `(dt_ms, total_ms)`. Returning `Break` stops the
/// scheduler before the next frame is requested.
pub type FrameCallback<'a> = Box<dyn FnMut(f64, f64) -> ControlFlow<()> + 'a>;

pub struct Scheduler<'a, C: Clock = MonotonicClock> {
    clock: C,
    callback: FrameCallback<'a>,
    /// Minimum milliseconds between callback invocations, `None` when uncapped.
    frame_budget_ms: Option<f64>,
    active: bool,
    pending: bool,
    last_frame_ms: f64,
    total_ms: f64,
    fps: u32,
}

impl<'a> Scheduler<'a> {
    /// Creates a scheduler on the wall clock. `rate` is in frames per second;
    /// zero, negative or non-finite rates run the callback on every refresh.
    pub fn new<F>(callback: F, rate: f64) -> Self
    where
        F: FnMut(f64, f64) -> ControlFlow<()> + 'a,
    {
        Self::with_clock(callback, rate, MonotonicClock::new())
    }
}

impl<'a, C: Clock> Scheduler<'a, C> {
    pub fn with_clock<F>(callback: F, rate: f64, clock: C) -> Self
    where
        F: FnMut(f64, f64) -> ControlFlow<()> + 'a,
    {
        let frame_budget_ms = frame_budget(rate);
        if frame_budget_ms.is_none() && rate != 0.0 {
            log::warn!("frame rate {rate} is not a positive number, running uncapped");
        }

        let last_frame_ms = clock.now_ms();
        Self {
            clock,
            callback: Box::new(callback),
            frame_budget_ms,
            active: false,
            pending: false,
            last_frame_ms,
            total_ms: 0.0,
            fps: 0,
        }
    }

    /// Arms the first frame request. No-op while already running.
    pub fn start(&mut self) -> &mut Self {
        if !self.active {
            self.last_frame_ms = self.clock.now_ms();
            self.active = true;
            self.pending = true;
        }
        self
    }

    /// Cancels the pending frame request. No-op while stopped.
    pub fn stop(&mut self) -> &mut Self {
        if self.active {
            self.pending = false;
            self.active = false;
            self.fps = 0;
        }
        self
    }

    /// Swaps the callback. Takes effect on the next due frame.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(f64, f64) -> ControlFlow<()> + 'a,
    {
        self.callback = Box::new(callback);
    }

    pub fn clear_total_time(&mut self) {
        self.total_ms = 0.0;
    }

    /// Services one display refresh. Returns whether another frame has been
    /// requested.
    pub fn run_frame(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;

        // `dt` runs from the last delivered frame, and every refresh adds it to
        // the total, skipped ones included.
        let now = self.clock.now_ms();
        let dt = now - self.last_frame_ms;
        self.total_ms += dt;
        let due = match self.frame_budget_ms {
            Some(budget) => dt >= budget,
            None => true,
        };

        if due {
            self.last_frame_ms = now;
            self.fps = instantaneous_fps(dt);
            if (self.callback)(dt, self.total_ms).is_break() {
                self.stop();
            }
        }

        if self.active {
            self.pending = true;
        }
        self.pending
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending
    }

    /// Frames per second derived from the last delivered delta, 0 when stopped.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Sum of the `dt` measured on every serviced refresh, in milliseconds.
    /// Under a cap this runs ahead of wall time.
    pub fn total_time(&self) -> f64 {
        self.total_ms
    }
}

fn frame_budget(rate: f64) -> Option<f64> {
    (rate.is_finite() && rate > 0.0).then(|| 1000.0 / rate)
}

fn instantaneous_fps(dt_ms: f64) -> u32 {
    if !dt_ms.is_finite() || dt_ms <= 0.0 {
        return 0;
    }
    (1000.0 / dt_ms).floor() as u32
}
