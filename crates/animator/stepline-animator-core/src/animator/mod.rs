//! Animators: units of scheduled work that unfold over ticks.
//!
//! The set of animator kinds is closed. Leaves ([`PointAnimator`], [`LinearAnimator`])
//! drive a drawable over a number of rendering steps; composites
//! ([`SequentialAnimator`], [`ParallelAnimator`]) delegate to child animators.
//! Trees are shared as [`SharedAnimator`] so scheduled tasks can hold on to the nodes
//! they trigger.

pub(crate) mod builder;
mod leaf;
pub mod linear;
pub mod parallel;
pub mod point;
pub mod sequential;

use std::mem;
use std::sync::Arc;

use crate::context::AnimationContext;
use crate::drawable::Drawable;
use crate::error::{AnimatorError, Result};
use crate::ids::AnimatorId;
use crate::scheduler::{ScheduledStep, Task};

pub use leaf::{Granularity, OnRenderStep};
pub use linear::{LinearAnimator, LinearBuilder};
pub use parallel::{ParallelAnimator, ParallelBuilder};
pub use point::{PointAnimator, PointBuilder};
pub use sequential::{SequentialAnimator, SequentialBuilder};

pub type SharedAnimator = Arc<Animator>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnimatorKind {
    Point,
    Linear,
    Sequential,
    Parallel,
}

impl AnimatorKind {
    pub fn label(self) -> &'static str {
        match self {
            AnimatorKind::Point => "Point",
            AnimatorKind::Linear => "Linear",
            AnimatorKind::Sequential => "Sequential",
            AnimatorKind::Parallel => "Parallel",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, AnimatorKind::Sequential | AnimatorKind::Parallel)
    }
}

/// Fields every animator carries, validated at build time.
#[derive(Debug, Clone)]
pub(crate) struct AnimatorCommon {
    pub id: AnimatorId,
    /// Ticks before the animator's own work starts.
    pub delay: u32,
    /// Number of triggers folded into one scheduled batch (1 = no batching).
    pub processing_speed: u32,
}

/// Values exposed before a composite triggers one of its children.
#[derive(Debug, Clone)]
pub struct OnRenderAnimator {
    /// Child about to run; replace it to run a different animator instead.
    pub animator: SharedAnimator,
    /// Delay about to be used for this child.
    pub delay: u32,
    /// Clear to skip the child.
    pub should_render: bool,
}

#[derive(Debug)]
pub enum Animator {
    Point(PointAnimator),
    Linear(LinearAnimator),
    Sequential(SequentialAnimator),
    Parallel(ParallelAnimator),
}

impl Animator {
    fn common(&self) -> &AnimatorCommon {
        match self {
            Animator::Point(a) => &a.common,
            Animator::Linear(a) => &a.common,
            Animator::Sequential(a) => &a.common,
            Animator::Parallel(a) => &a.common,
        }
    }

    pub fn id(&self) -> AnimatorId {
        self.common().id
    }

    pub fn delay(&self) -> u32 {
        self.common().delay
    }

    pub fn processing_speed(&self) -> u32 {
        self.common().processing_speed
    }

    pub fn kind(&self) -> AnimatorKind {
        match self {
            Animator::Point(_) => AnimatorKind::Point,
            Animator::Linear(_) => AnimatorKind::Linear,
            Animator::Sequential(_) => AnimatorKind::Sequential,
            Animator::Parallel(_) => AnimatorKind::Parallel,
        }
    }

    /// Total ticks this animator and its subtree occupy once started, excluding its
    /// own start delay.
    pub fn calculate_duration(&self) -> u32 {
        match self {
            Animator::Point(a) => a.calculate_duration(),
            Animator::Linear(a) => a.calculate_duration(),
            Animator::Sequential(a) => a.calculate_duration(),
            Animator::Parallel(a) => a.calculate_duration(),
        }
    }

    /// Step count derived from the rendering interval and the path length.
    /// Composites have no path and report 0.
    pub fn convert_interval_to_steps(&self) -> u32 {
        match self {
            Animator::Point(a) => a.convert_interval_to_steps(),
            Animator::Linear(a) => a.convert_to_steps(),
            Animator::Sequential(_) | Animator::Parallel(_) => 0,
        }
    }

    /// Start the animator: register with the scheduler and trigger or enqueue its work.
    ///
    /// Beginning an instance that is still registered fails with
    /// [`AnimatorError::DuplicateRegistration`].
    pub fn begin(self: &Arc<Self>, ctx: &AnimationContext) -> Result<()> {
        match &**self {
            Animator::Point(a) => leaf::schedule_steps(self, &a.common, a.leaf.step_ticks(), a.steps(), ctx),
            Animator::Linear(a) => {
                leaf::schedule_steps(self, &a.common, a.leaf.step_ticks(), a.convert_to_steps(), ctx)
            }
            Animator::Sequential(a) => a.begin(ctx),
            Animator::Parallel(a) => a.begin(ctx),
        }
    }

    /// Render one step of a leaf. Scheduled step tasks land here.
    pub(crate) fn render_step(&self, step: u32, ctx: &AnimationContext) -> Result<()> {
        match self {
            Animator::Point(a) => {
                a.render_step(step, ctx);
                Ok(())
            }
            Animator::Linear(a) => {
                a.render_step(step, ctx);
                Ok(())
            }
            Animator::Sequential(_) | Animator::Parallel(_) => Err(self.unsupported("render steps")),
        }
    }

    /// Use a fixed number of rendering steps. Returns the previous granularity.
    ///
    /// Leaf settings take effect at the next `begin`, including through a shared handle
    /// that is already part of a tree.
    pub fn set_rendering_steps(&self, steps: u32) -> Result<Granularity> {
        match self {
            Animator::Point(a) => a.leaf.set_rendering_steps(steps),
            Animator::Linear(a) => a.leaf.set_rendering_steps(steps),
            Animator::Sequential(_) | Animator::Parallel(_) => {
                Err(self.unsupported("set rendering steps"))
            }
        }
    }

    /// Derive the step count from a spacing along the path. Returns the previous granularity.
    pub fn set_rendering_interval(&self, interval: f32) -> Result<Granularity> {
        match self {
            Animator::Point(a) => a.leaf.set_rendering_interval(interval),
            Animator::Linear(a) => a.leaf.set_rendering_interval(interval),
            Animator::Sequential(_) | Animator::Parallel(_) => {
                Err(self.unsupported("set rendering interval"))
            }
        }
    }

    /// Returns the previously attached drawable.
    pub fn set_drawable_object(&self, object: Arc<dyn Drawable>) -> Result<Arc<dyn Drawable>> {
        match self {
            Animator::Point(a) => Ok(a.leaf.replace_drawable(object)),
            Animator::Linear(a) => Ok(a.leaf.replace_drawable(object)),
            Animator::Sequential(_) | Animator::Parallel(_) => {
                Err(self.unsupported("set an individual drawable object"))
            }
        }
    }

    fn unsupported(&self, operation: &'static str) -> AnimatorError {
        AnimatorError::UnsupportedOperation {
            operation,
            kind: self.kind().label(),
        }
    }

    pub fn as_point(&self) -> Option<&PointAnimator> {
        match self {
            Animator::Point(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearAnimator> {
        match self {
            Animator::Linear(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_sequential(&self) -> Option<&SequentialAnimator> {
        match self {
            Animator::Sequential(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_parallel(&self) -> Option<&ParallelAnimator> {
        match self {
            Animator::Parallel(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_shared(self) -> SharedAnimator {
        Arc::new(self)
    }
}

macro_rules! impl_into_animator {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Animator {
                fn from(a: $ty) -> Self {
                    Animator::$variant(a)
                }
            }

            impl From<$ty> for SharedAnimator {
                fn from(a: $ty) -> Self {
                    Arc::new(Animator::$variant(a))
                }
            }
        )*
    };
}

impl_into_animator! {
    PointAnimator => Point,
    LinearAnimator => Linear,
    SequentialAnimator => Sequential,
    ParallelAnimator => Parallel,
}

/// A task that begins `child` against `ctx`.
pub(crate) fn trigger(child: SharedAnimator, ctx: &AnimationContext) -> Task {
    let ctx = ctx.clone();
    Box::new(move || child.begin(&ctx))
}

/// Routes triggers either straight to the executor (zero offset) or to the scheduler,
/// folding `speed` consecutive triggers into one batch when `speed > 1`.
pub(crate) struct TriggerBatcher {
    owner: AnimatorId,
    speed: u32,
    buffer: Vec<Task>,
    buffered_offset: u32,
}

impl TriggerBatcher {
    pub fn new(owner: AnimatorId, speed: u32) -> Self {
        Self {
            owner,
            speed,
            buffer: Vec::new(),
            buffered_offset: 0,
        }
    }

    /// `ordinal` is the 1-based position of the trigger within its parent.
    pub fn push(&mut self, ctx: &AnimationContext, ordinal: u32, offset: u32, task: Task) -> Result<()> {
        if offset == 0 {
            return ctx.dispatch(task);
        }
        if self.speed <= 1 {
            return ctx
                .scheduler()
                .enqueue(self.owner, ScheduledStep::single(offset, task));
        }
        self.buffer.push(task);
        self.buffered_offset = offset;
        if ordinal % self.speed != 0 {
            return Ok(());
        }
        self.flush(ctx)
    }

    /// Enqueue whatever is buffered as one batch at the offset of its last trigger.
    pub fn flush(&mut self, ctx: &AnimationContext) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let tasks = mem::take(&mut self.buffer);
        ctx.scheduler()
            .enqueue(self.owner, ScheduledStep::new(self.buffered_offset, tasks))
    }
}

/// Register `id`, run `body`, then drop the registration if nothing was queued.
/// On failure the registration and any batches it queued are discarded.
pub(crate) fn with_registration(
    ctx: &AnimationContext,
    id: AnimatorId,
    body: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let scheduler = ctx.scheduler();
    scheduler.register(id)?;
    match body() {
        Ok(()) => {
            scheduler.release_if_idle(id);
            Ok(())
        }
        Err(err) => {
            if let Some(dropped) = scheduler.unregister(id) {
                log::warn!(
                    "animator {id}: begin aborted ({}), discarded {dropped} pending batches",
                    err.category()
                );
            }
            Err(err)
        }
    }
}
