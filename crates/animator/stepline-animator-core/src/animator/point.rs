use std::sync::Arc;

use nalgebra::Point3;

use super::leaf::{Granularity, LeafCell, LeafParams, OnRenderStep};
use super::AnimatorCommon;
use crate::context::AnimationContext;
use crate::drawable::Drawable;
use crate::error::Result;
use crate::interceptor::{InterceptData, Interceptor};

/// Renders its drawable at one fixed point for a number of steps.
#[derive(Debug)]
pub struct PointAnimator {
    pub(crate) common: AnimatorCommon,
    pub(crate) leaf: LeafCell,
    point: Point3<f32>,
    on_step: Interceptor<PointAnimator, OnRenderStep>,
}

impl PointAnimator {
    pub fn builder() -> PointBuilder {
        PointBuilder::default()
    }

    pub fn point(&self) -> Point3<f32> {
        self.point
    }

    pub fn granularity(&self) -> Granularity {
        self.leaf.granularity()
    }

    pub fn step_ticks(&self) -> u32 {
        self.leaf.step_ticks()
    }

    /// A point has no path, so an interval always resolves to a single step.
    pub fn steps(&self) -> u32 {
        self.leaf.granularity().steps_for(0.0)
    }

    pub fn convert_interval_to_steps(&self) -> u32 {
        self.steps()
    }

    pub fn calculate_duration(&self) -> u32 {
        self.steps().saturating_mul(self.leaf.step_ticks())
    }

    pub fn set_on_step(&mut self, hook: Interceptor<PointAnimator, OnRenderStep>) {
        self.on_step = hook;
    }

    pub(crate) fn render_step(&self, step: u32, ctx: &AnimationContext) {
        self.leaf
            .render(self, &self.on_step, step, self.point, ctx);
    }
}

#[derive(Debug)]
pub struct PointBuilder {
    params: LeafParams,
    point: Point3<f32>,
    on_step: Interceptor<PointAnimator, OnRenderStep>,
}

impl Default for PointBuilder {
    fn default() -> Self {
        Self {
            params: LeafParams::default(),
            point: Point3::origin(),
            on_step: Interceptor::identity(),
        }
    }
}

impl PointBuilder {
    pub fn delay(mut self, delay: i64) -> Self {
        self.params.delay = delay;
        self
    }

    pub fn processing_speed(mut self, speed: i64) -> Self {
        self.params.processing_speed = speed;
        self
    }

    pub fn step_ticks(mut self, ticks: i64) -> Self {
        self.params.step_ticks = ticks;
        self
    }

    pub fn rendering_steps(mut self, steps: u32) -> Self {
        self.params.granularity = Granularity::Steps(steps);
        self
    }

    pub fn point(mut self, point: Point3<f32>) -> Self {
        self.point = point;
        self
    }

    pub fn drawable(mut self, drawable: Arc<dyn Drawable>) -> Self {
        self.params.drawable = Some(drawable);
        self
    }

    pub fn on_step<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&mut InterceptData<'a, OnRenderStep>, &PointAnimator) + Send + Sync + 'static,
    {
        self.on_step = Interceptor::new(f);
        self
    }

    pub fn build(self) -> Result<PointAnimator> {
        let (common, leaf) = self.params.build()?;
        Ok(PointAnimator {
            common,
            leaf,
            point: self.point,
            on_step: self.on_step,
        })
    }
}
