//! Sequential composition: children run one after another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::builder::CompositeBuilder;
use super::{trigger, with_registration, AnimatorCommon, OnRenderAnimator, SharedAnimator, TriggerBatcher};
use crate::context::AnimationContext;
use crate::error::Result;
use crate::interceptor::{InterceptData, Interceptor};

/// Per-child delays plus a cached uniform value.
///
/// `uniform` is `Some(d)` only while every entry of `per_child` equals `d`. The first
/// override drops it for good and reads go to `per_child` from then on.
#[derive(Debug, Clone)]
struct ChildDelays {
    uniform: Option<u32>,
    per_child: Vec<u32>,
}

impl ChildDelays {
    fn new(per_child: Vec<u32>) -> Self {
        let uniform = match per_child.split_first() {
            Some((first, rest)) if rest.iter().all(|d| d == first) => Some(*first),
            _ => None,
        };
        Self { uniform, per_child }
    }

    fn get(&self, index: usize) -> u32 {
        self.uniform.unwrap_or(self.per_child[index])
    }

    fn set(&mut self, index: usize, delay: u32) {
        if self.get(index) == delay {
            return;
        }
        self.per_child[index] = delay;
        self.uniform = None;
    }
}

/// Runs its children strictly in order. Child `i` starts once child `i - 1` has
/// occupied its full duration, plus child `i`'s own delay.
#[derive(Debug)]
pub struct SequentialAnimator {
    pub(crate) common: AnimatorCommon,
    animators: Vec<SharedAnimator>,
    delays: Mutex<ChildDelays>,
    on_animator_rendering: Interceptor<SequentialAnimator, OnRenderAnimator>,
}

impl SequentialAnimator {
    pub fn builder() -> SequentialBuilder {
        SequentialBuilder::default()
    }

    pub fn animators(&self) -> &[SharedAnimator] {
        &self.animators
    }

    pub fn animator(&self, index: usize) -> Option<&SharedAnimator> {
        self.animators.get(index)
    }

    fn lock_delays(&self) -> MutexGuard<'_, ChildDelays> {
        self.delays.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn child_delay(&self, index: usize) -> Option<u32> {
        (index < self.animators.len()).then(|| self.lock_delays().get(index))
    }

    pub fn child_delays(&self) -> Vec<u32> {
        let delays = self.lock_delays();
        (0..self.animators.len()).map(|i| delays.get(i)).collect()
    }

    /// Whether all children still share one delay value.
    pub fn has_uniform_delay(&self) -> bool {
        self.lock_delays().uniform.is_some()
    }

    pub fn set_on_animator_rendering(
        &mut self,
        hook: Interceptor<SequentialAnimator, OnRenderAnimator>,
    ) {
        self.on_animator_rendering = hook;
    }

    /// Sum over children of `delay[i] + child[i].calculate_duration()`.
    pub fn calculate_duration(&self) -> u32 {
        let delays = self.lock_delays();
        self.animators
            .iter()
            .enumerate()
            .fold(0u32, |total, (i, child)| {
                total
                    .saturating_add(delays.get(i))
                    .saturating_add(child.calculate_duration())
            })
    }

    pub(crate) fn begin(&self, ctx: &AnimationContext) -> Result<()> {
        with_registration(ctx, self.common.id, || self.schedule_children(ctx))
    }

    fn schedule_children(&self, ctx: &AnimationContext) -> Result<()> {
        let mut batcher = TriggerBatcher::new(self.common.id, self.common.processing_speed);
        let mut cursor = self.common.delay;

        for (index, child) in self.animators.iter().enumerate() {
            let ordinal = index as u32 + 1;
            let configured = self.lock_delays().get(index);
            let gate = self
                .on_animator_rendering
                .intercept(
                    self,
                    ctx.renderer(),
                    None,
                    Some(ordinal),
                    OnRenderAnimator {
                        animator: Arc::clone(child),
                        delay: configured,
                        should_render: true,
                    },
                )
                .into_data();

            if gate.delay != configured {
                self.lock_delays().set(index, gate.delay);
            }
            cursor = cursor.saturating_add(gate.delay);

            if !gate.should_render {
                // The slot stays reserved so later children keep their timing.
                cursor = cursor.saturating_add(child.calculate_duration());
                continue;
            }

            let chosen = gate.animator;
            let duration = chosen.calculate_duration();
            batcher.push(ctx, ordinal, cursor, trigger(chosen, ctx))?;
            cursor = cursor.saturating_add(duration);
        }
        batcher.flush(ctx)
    }
}

#[derive(Debug, Default)]
pub struct SequentialBuilder {
    composite: CompositeBuilder,
    on_animator_rendering: Interceptor<SequentialAnimator, OnRenderAnimator>,
}

impl SequentialBuilder {
    /// Ticks before the first child's slot begins.
    pub fn delay(mut self, delay: i64) -> Self {
        self.composite.delay(delay);
        self
    }

    /// Fold this many consecutive child triggers into one scheduled batch.
    pub fn processing_speed(mut self, speed: i64) -> Self {
        self.composite.processing_speed(speed);
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
        F: for<'a> Fn(&mut InterceptData<'a, OnRenderAnimator>, &SequentialAnimator)
            + Send
            + Sync
            + 'static,
    {
        self.on_animator_rendering = Interceptor::new(f);
        self
    }

    pub fn build(self) -> Result<SequentialAnimator> {
        let (common, animators, delays) = self.composite.build()?;
        Ok(SequentialAnimator {
            common,
            animators,
            delays: Mutex::new(ChildDelays::new(delays)),
            on_animator_rendering: self.on_animator_rendering,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_delay_detected_and_demoted() {
        let mut d = ChildDelays::new(vec![3, 3, 3]);
        assert_eq!(d.uniform, Some(3));
        d.set(1, 3);
        assert_eq!(d.uniform, Some(3));
        d.set(1, 5);
        assert_eq!(d.uniform, None);
        assert_eq!((d.get(0), d.get(1), d.get(2)), (3, 5, 3));
        // Restoring uniformity does not bring the shortcut back.
        d.set(1, 3);
        assert_eq!(d.uniform, None);
        assert_eq!(d.get(1), 3);
    }

    #[test]
    fn mixed_delays_have_no_shortcut() {
        let d = ChildDelays::new(vec![0, 5, 2]);
        assert_eq!(d.uniform, None);
        assert_eq!(d.get(1), 5);
    }
}
