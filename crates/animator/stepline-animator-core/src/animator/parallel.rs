//! Parallel composition: every child starts relative to the group's own start.

use std::sync::Arc;

use super::builder::CompositeBuilder;
use super::{trigger, with_registration, AnimatorCommon, OnRenderAnimator, SharedAnimator};
use crate::context::AnimationContext;
use crate::error::Result;
use crate::ids::AnimatorId;
use crate::interceptor::{InterceptData, Interceptor};
use crate::scheduler::ScheduledStep;

/// Starts all children together, each after `delay + child_delay[i]` ticks.
///
/// Siblings are independent; nothing orders or synchronizes one branch against
/// another. Every delayed branch becomes its own single-task batch, so the
/// builder offers no processing speed and the group always reports 1.
#[derive(Debug)]
pub struct ParallelAnimator {
    pub(crate) common: AnimatorCommon,
    animators: Vec<SharedAnimator>,
    delays: Vec<u32>,
    on_animator_rendering: Interceptor<ParallelAnimator, OnRenderAnimator>,
}

impl ParallelAnimator {
    pub fn builder() -> ParallelBuilder {
        ParallelBuilder::default()
    }

    pub fn animators(&self) -> &[SharedAnimator] {
        &self.animators
    }

    pub fn child_delays(&self) -> &[u32] {
        &self.delays
    }

    pub fn set_on_animator_rendering(
        &mut self,
        hook: Interceptor<ParallelAnimator, OnRenderAnimator>,
    ) {
        self.on_animator_rendering = hook;
    }

    /// Max over children of `delay[i] + child[i].calculate_duration()`.
    pub fn calculate_duration(&self) -> u32 {
        self.animators
            .iter()
            .zip(&self.delays)
            .map(|(child, delay)| delay.saturating_add(child.calculate_duration()))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn begin(&self, ctx: &AnimationContext) -> Result<()> {
        let mut branches: Vec<AnimatorId> = Vec::new();
        let started = with_registration(ctx, self.common.id, || {
            self.start_branches(ctx, &mut branches)
        });
        if started.is_err() {
            for id in branches {
                ctx.scheduler().unregister(id);
            }
        }
        started
    }

    fn start_branches(&self, ctx: &AnimationContext, branches: &mut Vec<AnimatorId>) -> Result<()> {
        for (child, child_delay) in self.animators.iter().zip(&self.delays) {
            let gate = self
                .on_animator_rendering
                .intercept(
                    self,
                    ctx.renderer(),
                    None,
                    None,
                    OnRenderAnimator {
                        animator: Arc::clone(child),
                        delay: self.common.delay.saturating_add(*child_delay),
                        should_render: true,
                    },
                )
                .into_data();
            if !gate.should_render {
                continue;
            }

            let branch = gate.animator;
            if gate.delay == 0 {
                ctx.dispatch(trigger(branch, ctx))?;
                continue;
            }
            let id = branch.id();
            ctx.scheduler().register(id)?;
            branches.push(id);
            ctx.scheduler()
                .enqueue(id, ScheduledStep::single(gate.delay, trigger(branch, ctx)))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ParallelBuilder {
    composite: CompositeBuilder,
    on_animator_rendering: Interceptor<ParallelAnimator, OnRenderAnimator>,
}

impl ParallelBuilder {
    /// Ticks added to every child's own delay.
    pub fn delay(mut self, delay: i64) -> Self {
        self.composite.delay(delay);
        self
    }

    pub fn animator(mut self, child: impl Into<SharedAnimator>) -> Self {
        self.composite.push(child.into());
        self
    }

    pub fn animator_with_delay(mut self, child: impl Into<SharedAnimator>, delay: i64) -> Self {
        self.composite.push_with_delay(child.into(), delay);
        self
    }

    pub fn animators(mut self, children: impl IntoIterator<Item = SharedAnimator>) -> Self {
        self.composite.extend(children);
        self
    }

    pub fn animators_with_delays(
        mut self,
        children: impl IntoIterator<Item = SharedAnimator>,
        delays: impl IntoIterator<Item = i64>,
    ) -> Self {
        self.composite.extend_with_delays(children, delays);
        self
    }

    pub fn on_animator_rendering<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&mut InterceptData<'a, OnRenderAnimator>, &ParallelAnimator)
            + Send
            + Sync
            + 'static,
    {
        self.on_animator_rendering = Interceptor::new(f);
        self
    }

    pub fn build(self) -> Result<ParallelAnimator> {
        let (common, animators, delays) = self.composite.build()?;
        Ok(ParallelAnimator {
            common,
            animators,
            delays,
            on_animator_rendering: self.on_animator_rendering,
        })
    }
}
