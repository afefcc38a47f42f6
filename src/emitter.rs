//! Timed emission schedule for one effect run.
//!
//! One confetti pop is a fixed choreography of spawn batches:
//!
//! | Phase | When | What |
//! |-------|------|------|
//! | Bursting | trigger + 100 ms | `width/10` directional particles |
//! | Settling | + `width/10` ms | 20 ambient particles |
//! | Drifting | 15 x 80 ms | `width/30` ambient particles each |
//!
//! The schedule is plain deadline data polled from the frame loop. That keeps
//! every particle mutation on the single main context. The "background task"
//! of the effect instead sleeps in the gaps between deadlines, and its cancellation
//! flag is checked before every batch, so a cancelled run never spawns again
//! even if the cancel raced a due deadline.

use glam::Vec2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lead time between the trigger (haptics, audio cue) and the first visual.
const STARTUP_DELAY: f32 = 0.1;
/// Fixed number of ambient particles in the settling batch.
const SETTLE_COUNT: u32 = 20;
/// Number of decaying trickle rounds.
const DRIFT_ROUNDS: usize = 15;
/// Gap between trickle rounds, in seconds.
const DRIFT_INTERVAL: f32 = 0.08;

/// How a batch picks spawn positions and launch parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Popper burst: band around the top center, launched away from it.
    Directional,
    /// Drifting paper: anywhere along the top edge, no launch force.
    Ambient,
}

/// One scheduled spawn batch.
#[derive(Debug, Clone, Copy)]
pub struct Batch {
    pub kind: BatchKind,
    pub count: u32,
}

/// Where the schedule currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionPhase {
    /// Finished or cancelled; the population decays on its own.
    Idle,
    /// Waiting for (or up to) the directional burst.
    Bursting,
    /// Between the burst and the fixed ambient batch.
    Settling,
    /// In the decaying trickle.
    Drifting,
}

struct Step {
    /// Absolute deadline on the effect clock, in seconds.
    at: f32,
    batch: Batch,
}

/// Cancellation side of a running schedule.
///
/// Cloneable and cheap; cancelling flips a shared flag that the scheduler
/// checks before every batch. Cancellation is cooperative and one-way.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Stop all future spawns from this schedule.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// The deadline-ordered spawn plan for one effect run.
pub struct EmissionScheduler {
    steps: Vec<Step>,
    next: usize,
    cancelled: Arc<AtomicBool>,
}

impl EmissionScheduler {
    /// Build the schedule for an effect triggered at `start` (effect-clock
    /// seconds) on a canvas of the given size.
    ///
    /// Width-proportional counts floor to zero on a degenerate canvas; they
    /// are never negative.
    pub fn new(start: f32, canvas: Vec2) -> Self {
        let width = canvas.x.max(0.0);
        let burst_count = (width / 10.0) as u32;
        let drift_count = (width / 30.0) as u32;

        let mut steps = Vec::with_capacity(2 + DRIFT_ROUNDS);
        let mut at = start + STARTUP_DELAY;
        steps.push(Step {
            at,
            batch: Batch {
                kind: BatchKind::Directional,
                count: burst_count,
            },
        });

        // The settling delay scales with the canvas width: width/10 in ms.
        at += width / 10.0 / 1000.0;
        steps.push(Step {
            at,
            batch: Batch {
                kind: BatchKind::Ambient,
                count: SETTLE_COUNT,
            },
        });

        for _ in 0..DRIFT_ROUNDS {
            at += DRIFT_INTERVAL;
            steps.push(Step {
                at,
                batch: Batch {
                    kind: BatchKind::Ambient,
                    count: drift_count,
                },
            });
        }

        Self {
            steps,
            next: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle that can cancel this schedule from outside the frame loop.
    pub fn handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Collect every batch due at `now`, in schedule order.
    ///
    /// The cancellation flag is re-checked before each batch: once it reads
    /// true the rest of the schedule is dropped for good.
    pub fn poll(&mut self, now: f32) -> Vec<Batch> {
        let mut due = Vec::new();
        while self.next < self.steps.len() && self.steps[self.next].at <= now {
            if self.cancelled.load(Ordering::Relaxed) {
                self.next = self.steps.len();
                break;
            }
            due.push(self.steps[self.next].batch);
            self.next += 1;
        }
        due
    }

    /// Whether every batch has fired or the schedule was cancelled.
    pub fn is_finished(&self) -> bool {
        self.next >= self.steps.len() || self.cancelled.load(Ordering::Relaxed)
    }

    /// Current phase of the state machine.
    pub fn phase(&self) -> EmissionPhase {
        if self.is_finished() {
            EmissionPhase::Idle
        } else if self.next == 0 {
            EmissionPhase::Bursting
        } else if self.next == 1 {
            EmissionPhase::Settling
        } else {
            EmissionPhase::Drifting
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(300.0, 600.0);

    #[test]
    fn test_nothing_fires_before_startup_delay() {
        let mut scheduler = EmissionScheduler::new(0.0, CANVAS);
        assert!(scheduler.poll(0.0).is_empty());
        assert!(scheduler.poll(0.099).is_empty());
        assert_eq!(scheduler.phase(), EmissionPhase::Bursting);
    }

    #[test]
    fn test_schedule_counts_for_300_wide_canvas() {
        let mut scheduler = EmissionScheduler::new(0.0, CANVAS);

        let burst = scheduler.poll(0.1);
        assert_eq!(burst.len(), 1);
        assert_eq!(burst[0].kind, BatchKind::Directional);
        assert_eq!(burst[0].count, 30);
        assert_eq!(scheduler.phase(), EmissionPhase::Settling);

        // Settling batch lands width/10 ms later.
        assert!(scheduler.poll(0.129).is_empty());
        let settle = scheduler.poll(0.131);
        assert_eq!(settle.len(), 1);
        assert_eq!(settle[0].kind, BatchKind::Ambient);
        assert_eq!(settle[0].count, 20);
        assert_eq!(scheduler.phase(), EmissionPhase::Drifting);

        let mut drifted = 0;
        let mut now = 0.131;
        while !scheduler.is_finished() {
            now += DRIFT_INTERVAL;
            for batch in scheduler.poll(now) {
                assert_eq!(batch.kind, BatchKind::Ambient);
                assert_eq!(batch.count, 10);
                drifted += batch.count;
            }
        }
        assert_eq!(drifted, 150);
        assert_eq!(scheduler.phase(), EmissionPhase::Idle);
    }

    #[test]
    fn test_late_poll_collects_all_due_batches() {
        let mut scheduler = EmissionScheduler::new(0.0, CANVAS);
        let all = scheduler.poll(10.0);
        assert_eq!(all.len(), 17);
        let total: u32 = all.iter().map(|b| b.count).sum();
        assert_eq!(total, 30 + 20 + 150);
        assert!(scheduler.is_finished());
    }

    #[test]
    fn test_cancellation_stops_further_spawns() {
        let mut scheduler = EmissionScheduler::new(0.0, CANVAS);
        let handle = scheduler.handle();

        assert_eq!(scheduler.poll(0.1).len(), 1);

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(scheduler.poll(10.0).is_empty());
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.phase(), EmissionPhase::Idle);
    }

    #[test]
    fn test_cancellation_checked_before_first_batch() {
        let mut scheduler = EmissionScheduler::new(0.0, CANVAS);
        scheduler.handle().cancel();
        assert!(scheduler.poll(10.0).is_empty());
    }

    #[test]
    fn test_degenerate_canvas_floors_counts_to_zero() {
        let mut scheduler = EmissionScheduler::new(0.0, Vec2::new(0.0, 600.0));
        let all = scheduler.poll(10.0);
        // Width-proportional batches are empty; the fixed settling batch
        // remains and the world drops it against a zero-width canvas.
        for batch in &all {
            if batch.kind == BatchKind::Directional {
                assert_eq!(batch.count, 0);
            }
        }
        let total: u32 = all.iter().map(|b| b.count).sum();
        assert_eq!(total, SETTLE_COUNT);
    }

    #[test]
    fn test_schedule_offsets_follow_trigger_time() {
        let mut scheduler = EmissionScheduler::new(5.0, CANVAS);
        assert!(scheduler.poll(5.099).is_empty());
        assert_eq!(scheduler.poll(5.1).len(), 1);
    }
}
