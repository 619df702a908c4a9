//! Running/stopped state machine that drives time integration and drawing.
//!
//! The loop never owns the display refresh. While running it keeps exactly one
//! [`FrameTicket`] outstanding with a [`FrameScheduler`]; every tick re-arms the
//! next one. `stop` cancels the [`FrameChain`], so a ticket already queued by the
//! environment comes back stale and is dropped without touching time or
//! drawing.

use std::time::Instant;

use scheduler::{FrameChain, FrameScheduler, FrameTicket};
use tracing::{debug, trace};

use crate::runtime::{Clock, SystemClock};
use crate::stats::FrameStats;
use crate::uniforms::{UniformState, MODE_ACTIVE, MODE_IDLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

/// Whatever the loop draws into. Draw failures are the target's concern.
pub trait FrameTarget {
    fn draw_frame(&mut self, uniforms: &UniformState);
}

impl<T: FrameTarget + ?Sized> FrameTarget for &mut T {
    fn draw_frame(&mut self, uniforms: &UniformState) {
        (**self).draw_frame(uniforms);
    }
}

/// Result of delivering a ticket to [`RenderLoop::frame_tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Time advanced by `delta` seconds, a frame was drawn and the next one scheduled.
    Drawn { delta: f64 },
    /// The ticket belonged to a stopped or restarted chain.
    Stale,
}

pub struct RenderLoop<C: Clock = SystemClock> {
    state: RunState,
    uniforms: UniformState,
    clock: C,
    last_sample: Instant,
    chain: FrameChain,
    stats: FrameStats,
}

impl<C: Clock> RenderLoop<C> {
    /// Creates a stopped loop rendering at `resolution`.
    pub fn new(resolution: (u32, u32), clock: C) -> Self {
        let last_sample = clock.now();
        Self {
            state: RunState::Stopped,
            uniforms: UniformState::new(resolution),
            clock,
            last_sample,
            chain: FrameChain::new(),
            stats: FrameStats::new(),
        }
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn uniforms(&self) -> &UniformState {
        &self.uniforms
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Begins animating and schedules the first tick.
    ///
    /// The clock is sampled here so the first tick integrates only the time
    /// since this call. Starting an already running loop does nothing.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.is_running() {
            debug!("start requested while already running; ignoring");
            return;
        }
        self.state = RunState::Running;
        self.uniforms.mode = MODE_ACTIVE;
        self.last_sample = self.clock.now();
        self.stats.reset_window();
        let ticket = self.chain.begin();
        debug!(
            epoch = ticket.epoch(),
            time = self.uniforms.elapsed_time,
            "render loop started"
        );
        scheduler.request_frame(ticket);
    }

    /// Freezes time, invalidates pending ticks and draws the resting frame.
    ///
    /// Always draws exactly once, even when already stopped.
    pub fn stop<T: FrameTarget + ?Sized>(&mut self, target: &mut T) {
        if self.is_running() {
            debug!(time = self.uniforms.elapsed_time, "render loop stopped");
        }
        self.state = RunState::Stopped;
        self.uniforms.mode = MODE_IDLE;
        self.chain.cancel();
        target.draw_frame(&self.uniforms);
    }

    pub fn toggle<S, T>(&mut self, scheduler: &mut S, target: &mut T) -> RunState
    where
        S: FrameScheduler + ?Sized,
        T: FrameTarget + ?Sized,
    {
        match self.state {
            RunState::Running => self.stop(target),
            RunState::Stopped => self.start(scheduler),
        }
        self.state
    }

    /// Handles a delivered ticket: reschedule, integrate wall-clock time, draw.
    pub fn frame_tick<S, T>(&mut self, ticket: FrameTicket, scheduler: &mut S, target: &mut T) -> TickOutcome
    where
        S: FrameScheduler + ?Sized,
        T: FrameTarget + ?Sized,
    {
        if self.state != RunState::Running || !self.chain.accepts(ticket) {
            trace!(epoch = ticket.epoch(), "dropping stale frame ticket");
            return TickOutcome::Stale;
        }
        if let Some(next) = self.chain.next() {
            scheduler.request_frame(next);
        }

        let now = self.clock.now();
        let delta = now.saturating_duration_since(self.last_sample).as_secs_f64();
        self.uniforms.elapsed_time += delta;
        self.last_sample = now;
        self.stats.record(now, self.uniforms.elapsed_time);

        target.draw_frame(&self.uniforms);
        TickOutcome::Drawn { delta }
    }

    /// Records a normalised pointer position.
    ///
    /// A stopped loop redraws immediately so the resting frame follows the
    /// pointer; a running loop picks the value up on its next tick. Returns
    /// whether a draw happened.
    pub fn pointer_moved<T: FrameTarget + ?Sized>(&mut self, pointer: [f32; 2], target: &mut T) -> bool {
        self.uniforms.pointer = [pointer[0].clamp(-1.0, 1.0), pointer[1].clamp(-1.0, 1.0)];
        if self.is_running() {
            return false;
        }
        target.draw_frame(&self.uniforms);
        true
    }

    /// Draws the current state once without touching time or scheduling.
    pub fn redraw<T: FrameTarget + ?Sized>(&mut self, target: &mut T) {
        target.draw_frame(&self.uniforms);
    }
}
