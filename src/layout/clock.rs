//! Frame scheduling for the force simulation.
//!
//! The host (a browser animation frame, a game loop, a test) implements
//! [`Clock`]; [`SimulationDriver`] asks it for one frame at a time and runs
//! exactly one tick per frame it is handed back. Any input change cancels
//! the outstanding frame before a new one is requested, so two tick loops
//! never share the node arena.

use std::collections::VecDeque;

use crate::geometry::Vec2;
use crate::ir::KnowledgeGraphData;

use super::simulation::ForceSimulation;
use super::types::{GraphLayout, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

pub trait Clock {
    /// Schedules a callback for the next frame.
    fn request_frame(&mut self) -> FrameId;

    /// Drops a previously requested frame. Cancelling a frame that already
    /// fired is a no-op.
    fn cancel_frame(&mut self, frame: FrameId);
}

/// A clock driven by hand: frames fire only when [`ManualClock::next_frame`]
/// hands them out.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    pending: VecDeque<FrameId>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_frame(&mut self) -> Option<FrameId> {
        self.pending.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Clock for ManualClock {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let frame = FrameId(self.next_id);
        self.pending.push_back(frame);
        frame
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        self.pending.retain(|pending| *pending != frame);
    }
}

/// Owns a simulation and keeps at most one frame outstanding for it.
#[derive(Debug)]
pub struct SimulationDriver<C: Clock> {
    simulation: ForceSimulation,
    clock: C,
    pending: Option<FrameId>,
    closed: bool,
}

impl<C: Clock> SimulationDriver<C> {
    pub fn new(simulation: ForceSimulation, clock: C) -> Self {
        Self {
            simulation,
            clock,
            pending: None,
            closed: false,
        }
    }

    pub fn simulation(&self) -> &ForceSimulation {
        &self.simulation
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn snapshot(&self) -> GraphLayout {
        self.simulation.snapshot()
    }

    pub fn set_graph(&mut self, data: &KnowledgeGraphData) {
        if self.closed {
            return;
        }
        self.simulation.set_graph(data);
        self.reschedule();
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.closed {
            return;
        }
        self.simulation.set_viewport(viewport);
        self.reschedule();
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        if self.closed || !self.simulation.pin(id) {
            return false;
        }
        self.reschedule();
        true
    }

    pub fn drag_to(&mut self, position: Vec2) {
        if self.closed {
            return;
        }
        self.simulation.drag_to(position);
    }

    pub fn end_drag(&mut self) {
        if self.closed {
            return;
        }
        self.simulation.release();
        self.reschedule();
    }

    /// Runs one tick if `frame` is the outstanding frame. Stale or cancelled
    /// frames are ignored and return false.
    pub fn on_frame(&mut self, frame: FrameId) -> bool {
        if self.closed || self.pending != Some(frame) {
            return false;
        }
        self.pending = None;
        if self.simulation.tick() {
            self.pending = Some(self.clock.request_frame());
        }
        true
    }

    /// Cancels the outstanding frame and stops accepting input.
    pub fn close(&mut self) {
        self.cancel_pending();
        self.closed = true;
    }

    fn cancel_pending(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.clock.cancel_frame(frame);
        }
    }

    fn reschedule(&mut self) {
        self.cancel_pending();
        if self.simulation.is_running() {
            self.pending = Some(self.clock.request_frame());
            return;
        }
        let viewport = self.simulation.viewport();
        if viewport.is_empty() && !self.simulation.is_empty() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "viewport has no area; deferring simulation"
            );
        }
    }
}

impl SimulationDriver<ManualClock> {
    /// Fires frames until none are outstanding; returns the ticks run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ticks = 0;
        while let Some(frame) = self.clock.next_frame() {
            if self.on_frame(frame) {
                ticks += 1;
            }
        }
        ticks
    }

    /// Fires at most `limit` frames.
    pub fn run_frames(&mut self, limit: usize) -> usize {
        let mut ticks = 0;
        for _ in 0..limit {
            let Some(frame) = self.clock.next_frame() else {
                break;
            };
            if self.on_frame(frame) {
                ticks += 1;
            }
        }
        ticks
    }
}
