//! Frame scheduling primitives.
//!
//! A render loop asks its environment for "the next display refresh" by handing
//! a [`FrameTicket`] to a [`FrameScheduler`]. When the refresh arrives the
//! ticket comes back and the loop checks it against its [`FrameChain`]: a
//! ticket issued before the chain was cancelled or restarted is stale and must
//! be ignored. That check replaces explicit cancellation, which most frame
//! callbacks (`request_redraw`, vsync callbacks) do not offer.
use std::collections::VecDeque;

use tracing::trace;

/// Token handed to the scheduler; identifies the chain generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTicket {
    epoch: u64,
}

impl FrameTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Environment hook that calls back once per display refresh.
pub trait FrameScheduler {
    /// Requests that `ticket` be delivered back at the next refresh.
    fn request_frame(&mut self, ticket: FrameTicket);
}

/// Guard state for one self-rescheduling callback chain.
#[derive(Debug, Clone, Default)]
pub struct FrameChain {
    epoch: u64,
    live: bool,
}

impl FrameChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation; tickets from earlier generations become stale.
    pub fn begin(&mut self) -> FrameTicket {
        self.epoch = self.epoch.wrapping_add(1);
        self.live = true;
        trace!(epoch = self.epoch, "frame chain started");
        FrameTicket { epoch: self.epoch }
    }

    /// Stops the chain; every outstanding ticket becomes stale.
    pub fn cancel(&mut self) {
        if self.live {
            trace!(epoch = self.epoch, "frame chain cancelled");
        }
        self.live = false;
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether `ticket` should still run.
    pub fn accepts(&self, ticket: FrameTicket) -> bool {
        self.live && ticket.epoch == self.epoch
    }

    /// Ticket for the next link of the current generation.
    pub fn next(&self) -> Option<FrameTicket> {
        self.live.then_some(FrameTicket { epoch: self.epoch })
    }
}

/// FIFO scheduler; whoever owns the display loop drains it once per refresh.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<FrameTicket>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pop(&mut self) -> Option<FrameTicket> {
        self.pending.pop_front()
    }

    /// Removes every queued ticket, oldest first.
    pub fn drain(&mut self) -> Vec<FrameTicket> {
        self.pending.drain(..).collect()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, ticket: FrameTicket) {
        self.pending.push_back(ticket);
    }
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self, ticket: FrameTicket) {
        (**self).request_frame(ticket);
    }
}
