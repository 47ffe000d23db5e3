//! State and scheduling shared by leaf animators.

use std::mem;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use nalgebra::Point3;

use super::builder::{validate_delay, validate_speed};
use super::{with_registration, AnimatorCommon, SharedAnimator, TriggerBatcher};
use crate::context::AnimationContext;
use crate::drawable::Drawable;
use crate::error::{AnimatorError, Result};
use crate::ids::AnimatorId;
use crate::interceptor::Interceptor;
use crate::scheduler::Task;

/// How a leaf decides its number of rendering steps. Exactly one is authoritative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Granularity {
    /// A fixed step count.
    Steps(u32),
    /// Spacing between consecutive steps along the path, in world units.
    Interval(f32),
}

impl Granularity {
    /// Step count for a path of `path_length` units. Never 0.
    pub fn steps_for(self, path_length: f32) -> u32 {
        match self {
            Granularity::Steps(n) => n,
            Granularity::Interval(_) if path_length <= 0.0 => 1,
            Granularity::Interval(interval) => ((path_length / interval).ceil() as u32).max(1),
        }
    }
}

/// Values exposed before a leaf renders one step.
#[derive(Debug, Clone, PartialEq)]
pub struct OnRenderStep {
    /// Where the drawable will be drawn.
    pub position: Point3<f32>,
    /// Clear to skip this step.
    pub should_draw: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct LeafState {
    pub granularity: Granularity,
    /// Ticks between consecutive steps.
    pub step_ticks: u32,
    pub drawable: Arc<dyn Drawable>,
}

/// Leaf settings behind a lock, so they stay adjustable through a shared
/// [`SharedAnimator`] after the leaf has been placed in a tree.
///
/// The lock is never held while hooks or drawables run.
#[derive(Debug)]
pub(crate) struct LeafCell(RwLock<LeafState>);

impl LeafCell {
    fn new(state: LeafState) -> Self {
        Self(RwLock::new(state))
    }

    fn read(&self) -> RwLockReadGuard<'_, LeafState> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LeafState> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn granularity(&self) -> Granularity {
        self.read().granularity
    }

    pub fn step_ticks(&self) -> u32 {
        self.read().step_ticks
    }

    pub fn drawable(&self) -> Arc<dyn Drawable> {
        Arc::clone(&self.read().drawable)
    }

    pub fn set_rendering_steps(&self, steps: u32) -> Result<Granularity> {
        if steps == 0 {
            return Err(AnimatorError::invalid("rendering steps must be at least 1"));
        }
        Ok(mem::replace(&mut self.write().granularity, Granularity::Steps(steps)))
    }

    pub fn set_rendering_interval(&self, interval: f32) -> Result<Granularity> {
        check_interval(interval)?;
        Ok(mem::replace(
            &mut self.write().granularity,
            Granularity::Interval(interval),
        ))
    }

    pub fn replace_drawable(&self, drawable: Arc<dyn Drawable>) -> Arc<dyn Drawable> {
        mem::replace(&mut self.write().drawable, drawable)
    }

    /// Run the step hook, then draw framed by the renderer callbacks.
    pub fn render<T>(
        &self,
        owner: &T,
        hook: &Interceptor<T, OnRenderStep>,
        step: u32,
        position: Point3<f32>,
        ctx: &AnimationContext,
    ) {
        let renderer = ctx.renderer();
        let gate = hook
            .intercept(
                owner,
                renderer,
                Some(position),
                Some(step),
                OnRenderStep {
                    position,
                    should_draw: true,
                },
            )
            .into_data();
        if !gate.should_draw {
            return;
        }
        let drawable = self.drawable();
        renderer.before_frame(step, gate.position);
        drawable.draw(renderer, step, gate.position);
        renderer.after_frame(step, gate.position);
    }
}

fn check_interval(interval: f32) -> Result<()> {
    if interval.is_finite() && interval > 0.0 {
        Ok(())
    } else {
        Err(AnimatorError::invalid(format!(
            "rendering interval must be positive, got {interval}"
        )))
    }
}

/// Builder fields common to the leaf kinds.
#[derive(Debug, Clone)]
pub(crate) struct LeafParams {
    pub delay: i64,
    pub processing_speed: i64,
    pub step_ticks: i64,
    pub granularity: Granularity,
    pub drawable: Option<Arc<dyn Drawable>>,
}

impl Default for LeafParams {
    fn default() -> Self {
        Self {
            delay: 0,
            processing_speed: 1,
            step_ticks: 1,
            granularity: Granularity::Steps(1),
            drawable: None,
        }
    }
}

impl LeafParams {
    pub fn build(self) -> Result<(AnimatorCommon, LeafCell)> {
        let delay = validate_delay(self.delay, "Initial delay")?;
        let processing_speed = validate_speed(self.processing_speed)?;
        if self.step_ticks < 1 {
            return Err(AnimatorError::invalid("step ticks must be at least 1"));
        }
        let step_ticks = u32::try_from(self.step_ticks)
            .map_err(|_| AnimatorError::invalid("step ticks out of range"))?;
        match self.granularity {
            Granularity::Steps(0) => {
                return Err(AnimatorError::invalid("rendering steps must be at least 1"))
            }
            Granularity::Steps(_) => {}
            Granularity::Interval(interval) => check_interval(interval)?,
        }
        let drawable = self
            .drawable
            .ok_or_else(|| AnimatorError::invalid("a leaf animator needs a drawable object"))?;
        Ok((
            AnimatorCommon {
                id: AnimatorId::next(),
                delay,
                processing_speed,
            },
            LeafCell::new(LeafState {
                granularity: self.granularity,
                step_ticks,
                drawable,
            }),
        ))
    }
}

/// Begin a leaf: step `i` renders `delay + i * step_ticks` ticks from now.
pub(crate) fn schedule_steps(
    handle: &SharedAnimator,
    common: &AnimatorCommon,
    step_ticks: u32,
    steps: u32,
    ctx: &AnimationContext,
) -> Result<()> {
    with_registration(ctx, common.id, || {
        let mut batcher = TriggerBatcher::new(common.id, common.processing_speed);
        for step in 0..steps {
            let offset = common
                .delay
                .saturating_add(step.saturating_mul(step_ticks));
            let handle = Arc::clone(handle);
            let step_ctx = ctx.clone();
            let task: Task = Box::new(move || handle.render_step(step, &step_ctx));
            batcher.push(ctx, step + 1, offset, task)?;
        }
        batcher.flush(ctx)
    })
}
