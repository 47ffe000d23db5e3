//! Tick-driven step scheduler.
//!
//! The registry maps an animator identity to its queue of pending batches. Delays are
//! offsets from the moment of enqueue, counted in ticks; an external pump calls
//! [`Scheduler::advance_tick`] once per logical frame.
//!
//! This is the only shared mutable state of the subsystem. A single mutex guards the
//! registry; it is never held while tasks run, so tasks may freely register and
//! enqueue nested work.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

use crate::error::{AnimatorError, Result};
use crate::ids::AnimatorId;

/// Zero-argument unit of scheduled work.
pub type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// A group of tasks that run together once `delay` ticks have elapsed.
pub struct ScheduledStep {
    delay: u32,
    tasks: Vec<Task>,
}

impl ScheduledStep {
    /// A batch due `delay` ticks after enqueue. A delay of 0 runs on the next tick.
    pub fn new(delay: u32, tasks: Vec<Task>) -> Self {
        Self { delay, tasks }
    }

    pub fn single(delay: u32, task: Task) -> Self {
        Self::new(delay, vec![task])
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl fmt::Debug for ScheduledStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledStep")
            .field("delay", &self.delay)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

struct PendingBatch {
    /// Global enqueue order, used as the tie-break between equally due batches.
    seq: u64,
    remaining: u32,
    tasks: Vec<Task>,
}

#[derive(Default)]
struct Registry {
    queues: HashMap<AnimatorId, VecDeque<PendingBatch>>,
    next_seq: u64,
    tick: u64,
}

/// Outcome of one [`Scheduler::advance_tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub batches_run: usize,
    pub tasks_run: usize,
    /// Errors returned by tasks. Other batches still ran.
    pub failures: Vec<AnimatorError>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Scheduler {
    inner: Mutex<Registry>,
    diagnostics: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_capacity(0, false)
    }

    pub fn with_capacity(capacity: usize, diagnostics: bool) -> Self {
        Self {
            inner: Mutex::new(Registry {
                queues: HashMap::with_capacity(capacity),
                ..Registry::default()
            }),
            diagnostics,
        }
    }

    // Tasks never run under the lock, so a poisoned registry is still consistent.
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate `id` with an empty queue.
    pub fn register(&self, id: AnimatorId) -> Result<()> {
        let mut reg = self.lock();
        if reg.queues.contains_key(&id) {
            return Err(AnimatorError::DuplicateRegistration { id });
        }
        reg.queues.insert(id, VecDeque::new());
        if self.diagnostics {
            log::debug!("scheduler: registered animator {id}");
        }
        Ok(())
    }

    /// Append a batch to the queue of a registered animator.
    pub fn enqueue(&self, id: AnimatorId, step: ScheduledStep) -> Result<()> {
        let mut reg = self.lock();
        let seq = reg.next_seq;
        let queue = reg
            .queues
            .get_mut(&id)
            .ok_or(AnimatorError::MissingRegistration { id })?;
        queue.push_back(PendingBatch {
            seq,
            remaining: step.delay,
            tasks: step.tasks,
        });
        reg.next_seq += 1;
        if self.diagnostics {
            log::debug!(
                "scheduler: animator {id} queued batch #{seq} due in {} ticks",
                step.delay
            );
        }
        Ok(())
    }

    /// Drop a registration together with any pending batches.
    /// Returns how many batches were discarded, or `None` if `id` was not registered.
    pub fn unregister(&self, id: AnimatorId) -> Option<usize> {
        let removed = self.lock().queues.remove(&id).map(|q| q.len());
        if let Some(n) = removed {
            if self.diagnostics && n > 0 {
                log::debug!("scheduler: animator {id} unregistered with {n} pending batches");
            }
        }
        removed
    }

    /// Drop the registration of `id` only if it has nothing pending.
    pub fn release_if_idle(&self, id: AnimatorId) -> bool {
        let mut reg = self.lock();
        match reg.queues.get(&id) {
            Some(queue) if queue.is_empty() => {
                reg.queues.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn is_registered(&self, id: AnimatorId) -> bool {
        self.lock().queues.contains_key(&id)
    }

    pub fn pending_batches(&self, id: AnimatorId) -> Option<usize> {
        self.lock().queues.get(&id).map(VecDeque::len)
    }

    pub fn registered_count(&self) -> usize {
        self.lock().queues.len()
    }

    /// True when no batch is pending for any animator.
    pub fn is_idle(&self) -> bool {
        self.lock().queues.values().all(VecDeque::is_empty)
    }

    pub fn current_tick(&self) -> u64 {
        self.lock().tick
    }

    /// Advance logical time by one tick and run every batch that became due.
    ///
    /// Due batches leave the registry before any of them runs; an owner whose queue
    /// drained is unregistered at that point, so its identity can be registered
    /// again by the very tasks being executed.
    pub fn advance_tick(&self) -> TickReport {
        let (tick, mut due) = {
            let mut guard = self.lock();
            let reg = &mut *guard;
            reg.tick += 1;

            let mut due: Vec<(u64, AnimatorId, Vec<Task>)> = Vec::new();
            let mut drained: Vec<AnimatorId> = Vec::new();
            for (id, queue) in reg.queues.iter_mut() {
                if queue.is_empty() {
                    continue;
                }
                let mut kept = VecDeque::with_capacity(queue.len());
                for mut batch in queue.drain(..) {
                    if batch.remaining <= 1 {
                        due.push((batch.seq, *id, batch.tasks));
                    } else {
                        batch.remaining -= 1;
                        kept.push_back(batch);
                    }
                }
                *queue = kept;
                if queue.is_empty() {
                    drained.push(*id);
                }
            }
            for id in &drained {
                reg.queues.remove(id);
            }
            (reg.tick, due)
        };

        due.sort_by_key(|(seq, _, _)| *seq);

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        for (seq, owner, tasks) in due {
            report.batches_run += 1;
            for task in tasks {
                report.tasks_run += 1;
                if let Err(err) = task() {
                    log::warn!(
                        "scheduler: task of batch #{seq} (animator {owner}) failed at tick {tick}: {err}"
                    );
                    report.failures.push(err);
                }
            }
        }
        if self.diagnostics && report.batches_run > 0 {
            log::debug!(
                "scheduler: tick {tick} ran {} batches / {} tasks ({} failed)",
                report.batches_run,
                report.tasks_run,
                report.failures.len()
            );
        }
        report
    }

    /// Pump ticks until nothing is pending or `max_ticks` have elapsed.
    pub fn run_until_idle(&self, max_ticks: u64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while !self.is_idle() && (reports.len() as u64) < max_ticks {
            reports.push(self.advance_tick());
        }
        reports
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.lock();
        f.debug_struct("Scheduler")
            .field("tick", &reg.tick)
            .field("registered", &reg.queues.len())
            .finish()
    }
}
