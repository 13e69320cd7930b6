use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::{bail, Result};
use rand::Rng;

use crate::plan::TransitionPlan;
use crate::render::{render, RenderedFrame};

/// A pending frame callback.
///
/// Requests stay valid only while the scheduler that issued them is running
/// and still waiting for that exact frame. Firing anything else is a no-op.
#[derive(Debug, Clone)]
pub struct FrameRequest {
    liveness: Rc<Cell<bool>>,
    frame: u32,
}

impl FrameRequest {
    pub fn is_live(&self) -> bool {
        self.liveness.get()
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

/// The host's frame-callback primitive: one request per tick.
pub trait FrameHost {
    fn request_frame(&mut self, request: FrameRequest);
}

/// In-process host that collects requests until the caller fires them.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<FrameRequest>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Hand back everything requested so far. Requests made while firing this
    /// batch land in the next one.
    pub fn take_pending(&mut self) -> Vec<FrameRequest> {
        self.pending.drain(..).collect()
    }
}

impl FrameHost for FrameQueue {
    fn request_frame(&mut self, request: FrameRequest) {
        self.pending.push_back(request);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Cooperative tick loop over one [`TransitionPlan`].
///
/// Each accepted tick renders the current frame, advances the counter by one
/// and re-arms itself through the host until the whole plan is settled.
#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    frame: u32,
    plan: Option<TransitionPlan>,
    liveness: Rc<Cell<bool>>,
    glyph_chance: f64,
}

impl FrameScheduler {
    pub fn new(glyph_chance: f64) -> Self {
        Self {
            state: SchedulerState::Idle,
            frame: 0,
            plan: None,
            liveness: Rc::new(Cell::new(false)),
            glyph_chance,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// The frame the next tick will render.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn plan(&self) -> Option<&TransitionPlan> {
        self.plan.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Take ownership of `plan` and request the first tick (frame 0).
    pub fn start<H: FrameHost + ?Sized>(&mut self, plan: TransitionPlan, host: &mut H) -> Result<()> {
        match self.state {
            SchedulerState::Running => bail!("scheduler is already running"),
            SchedulerState::Stopped => bail!("scheduler was cancelled and cannot be restarted"),
            SchedulerState::Idle => {}
        }

        tracing::debug!(
            positions = plan.len(),
            last_end_frame = plan.last_end_frame(),
            "starting scramble"
        );
        self.plan = Some(plan);
        self.frame = 0;
        self.state = SchedulerState::Running;
        // Requests cloned during an earlier run must not match this one.
        self.liveness = Rc::new(Cell::new(true));
        host.request_frame(self.request());
        Ok(())
    }

    /// Run one tick if `request` is the one this scheduler is waiting for.
    pub fn tick<R, H>(
        &mut self,
        request: &FrameRequest,
        rng: &mut R,
        host: &mut H,
    ) -> Option<RenderedFrame>
    where
        R: Rng + ?Sized,
        H: FrameHost + ?Sized,
    {
        if !self.accepts(request) {
            tracing::trace!(frame = request.frame, "ignoring stale frame request");
            return None;
        }
        let plan = self.plan.as_mut()?;

        let rendered = render(self.frame, plan, rng, self.glyph_chance);
        self.frame += 1;

        if rendered.settled {
            tracing::debug!(frames = self.frame, "scramble settled");
            self.state = SchedulerState::Idle;
            self.liveness.set(false);
        } else {
            host.request_frame(self.request());
        }
        Some(rendered)
    }

    /// Stop for good. Safe to call in any state.
    pub fn cancel(&mut self) {
        if self.state == SchedulerState::Running {
            tracing::debug!(frame = self.frame, "scramble cancelled");
        }
        self.liveness.set(false);
        self.state = SchedulerState::Stopped;
    }

    fn accepts(&self, request: &FrameRequest) -> bool {
        self.state == SchedulerState::Running
            && request.is_live()
            && Rc::ptr_eq(&request.liveness, &self.liveness)
            && request.frame == self.frame
    }

    fn request(&self) -> FrameRequest {
        FrameRequest {
            liveness: Rc::clone(&self.liveness),
            frame: self.frame,
        }
    }
}

impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.liveness.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanOptions, SpeedRange};
    use crate::render::DEFAULT_GLYPH_CHANCE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn plan(from: &str, to: &str, rng: &mut StdRng) -> TransitionPlan {
        TransitionPlan::build(from, to, &PlanOptions::new(SpeedRange::new(2, 6)), rng)
    }

    /// Fire queued requests until the queue drains, collecting rendered frames.
    fn drive(scheduler: &mut FrameScheduler, queue: &mut FrameQueue, rng: &mut StdRng) -> Vec<RenderedFrame> {
        let mut frames = Vec::new();
        while !queue.is_empty() {
            for request in queue.take_pending() {
                frames.extend(scheduler.tick(&request, rng, queue));
            }
        }
        frames
    }

    #[test]
    fn new_scheduler_is_idle() {
        let scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.plan().is_none());
    }

    #[test]
    fn frames_count_up_from_zero_until_settled() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        let plan = plan("old text", "new words", &mut rng);
        let last = plan.last_end_frame();

        scheduler.start(plan, &mut queue).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(scheduler.is_running());

        let frames = drive(&mut scheduler, &mut queue, &mut rng);
        let counters: Vec<u32> = frames.iter().map(|f| f.frame).collect();
        assert_eq!(counters, (0..=last).collect::<Vec<_>>());
        assert_eq!(frames.last().unwrap().text(), "new words");
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn empty_plan_settles_on_first_tick() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(TransitionPlan::default(), &mut queue).unwrap();
        let frames = drive(&mut scheduler, &mut queue, &mut rng);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].settled);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }

    #[test]
    fn cancelled_request_does_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(plan("abc", "xyz", &mut rng), &mut queue).unwrap();

        let pending = queue.take_pending();
        scheduler.cancel();
        assert!(!pending[0].is_live());
        assert!(scheduler.tick(&pending[0], &mut rng, &mut queue).is_none());
        assert!(queue.is_empty());
        assert_eq!(scheduler.frame(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.cancel();
        scheduler.cancel();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn stopped_scheduler_cannot_restart() {
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.cancel();
        assert!(scheduler.start(TransitionPlan::default(), &mut queue).is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn running_scheduler_rejects_second_start() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(plan("a", "b", &mut rng), &mut queue).unwrap();
        assert!(scheduler.start(plan("c", "d", &mut rng), &mut queue).is_err());
    }

    #[test]
    fn duplicate_request_ticks_once() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(plan("abcdef", "ghijkl", &mut rng), &mut queue).unwrap();

        let request = queue.take_pending().remove(0);
        assert!(scheduler.tick(&request, &mut rng, &mut queue).is_some());
        assert!(scheduler.tick(&request, &mut rng, &mut queue).is_none());
        assert_eq!(scheduler.frame(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn foreign_request_is_ignored() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut queue = FrameQueue::new();
        let mut first = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        let mut second = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        first.start(plan("one", "two", &mut rng), &mut queue).unwrap();
        second.start(plan("three", "four", &mut rng), &mut queue).unwrap();

        let pending = queue.take_pending();
        assert!(second.tick(&pending[0], &mut rng, &mut queue).is_none());
        assert!(second.tick(&pending[1], &mut rng, &mut queue).is_some());
    }

    #[test]
    fn restart_after_settling_ignores_old_requests() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(plan("ab", "cd", &mut rng), &mut queue).unwrap();
        let first_request = queue.take_pending().remove(0);
        let kept = first_request.clone();
        scheduler.tick(&first_request, &mut rng, &mut queue);
        drive(&mut scheduler, &mut queue, &mut rng);
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.start(plan("cd", "ef", &mut rng), &mut queue).unwrap();
        assert_eq!(kept.frame(), scheduler.frame());
        assert!(scheduler.tick(&kept, &mut rng, &mut queue).is_none());
        assert_eq!(scheduler.frame(), 0);

        let fresh = queue.take_pending();
        assert!(scheduler.tick(&fresh[0], &mut rng, &mut queue).is_some());
    }

    #[test]
    fn dropping_scheduler_kills_its_requests() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut queue = FrameQueue::new();
        let mut scheduler = FrameScheduler::new(DEFAULT_GLYPH_CHANCE);
        scheduler.start(plan("x", "y", &mut rng), &mut queue).unwrap();
        drop(scheduler);
        assert!(queue.take_pending().iter().all(|r| !r.is_live()));
    }
}
