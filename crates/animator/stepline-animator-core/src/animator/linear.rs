use std::sync::Arc;

use nalgebra::Point3;

use super::leaf::{Granularity, LeafCell, LeafParams, OnRenderStep};
use super::AnimatorCommon;
use crate::context::AnimationContext;
use crate::drawable::Drawable;
use crate::error::{AnimatorError, Result};
use crate::interceptor::{InterceptData, Interceptor};

/// Renders its drawable along a polyline, one evenly spaced position per step.
#[derive(Debug)]
pub struct LinearAnimator {
    pub(crate) common: AnimatorCommon,
    pub(crate) leaf: LeafCell,
    vertices: Vec<Point3<f32>>,
    distance: f32,
    on_step: Interceptor<LinearAnimator, OnRenderStep>,
}

fn polyline_length(vertices: &[Point3<f32>]) -> f32 {
    vertices.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

impl LinearAnimator {
    pub fn builder() -> LinearBuilder {
        LinearBuilder::default()
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Total length of the path.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn granularity(&self) -> Granularity {
        self.leaf.granularity()
    }

    pub fn step_ticks(&self) -> u32 {
        self.leaf.step_ticks()
    }

    pub fn convert_to_steps(&self) -> u32 {
        self.leaf.granularity().steps_for(self.distance)
    }

    pub fn calculate_duration(&self) -> u32 {
        self.convert_to_steps().saturating_mul(self.leaf.step_ticks())
    }

    pub fn set_on_step(&mut self, hook: Interceptor<LinearAnimator, OnRenderStep>) {
        self.on_step = hook;
    }

    /// Position of `step` out of `steps`; the first step sits on the first vertex and
    /// the last on the final vertex.
    pub fn position_at(&self, step: u32, steps: u32) -> Point3<f32> {
        let travelled = if steps <= 1 {
            0.0
        } else {
            self.distance * (step.min(steps - 1) as f32 / (steps - 1) as f32)
        };
        let mut remaining = travelled;
        for pair in self.vertices.windows(2) {
            let segment = pair[1] - pair[0];
            let length = segment.norm();
            if remaining <= length {
                if length == 0.0 {
                    return pair[0];
                }
                return pair[0] + segment * (remaining / length);
            }
            remaining -= length;
        }
        self.vertices[self.vertices.len() - 1]
    }

    pub(crate) fn render_step(&self, step: u32, ctx: &AnimationContext) {
        let position = self.position_at(step, self.convert_to_steps());
        self.leaf.render(self, &self.on_step, step, position, ctx);
    }
}

#[derive(Debug, Default)]
pub struct LinearBuilder {
    params: LeafParams,
    vertices: Vec<Point3<f32>>,
    on_step: Interceptor<LinearAnimator, OnRenderStep>,
}

impl LinearBuilder {
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

    pub fn rendering_interval(mut self, interval: f32) -> Self {
        self.params.granularity = Granularity::Interval(interval);
        self
    }

    pub fn vertex(mut self, vertex: Point3<f32>) -> Self {
        self.vertices.push(vertex);
        self
    }

    pub fn vertices(mut self, vertices: impl IntoIterator<Item = Point3<f32>>) -> Self {
        self.vertices.extend(vertices);
        self
    }

    pub fn drawable(mut self, drawable: Arc<dyn Drawable>) -> Self {
        self.params.drawable = Some(drawable);
        self
    }

    pub fn on_step<F>(mut self, f: F) -> Self
    where
        F: for<'a> Fn(&mut InterceptData<'a, OnRenderStep>, &LinearAnimator) + Send + Sync + 'static,
    {
        self.on_step = Interceptor::new(f);
        self
    }

    pub fn build(self) -> Result<LinearAnimator> {
        if self.vertices.len() < 2 {
            return Err(AnimatorError::invalid(format!(
                "a linear path needs at least 2 vertices, got {}",
                self.vertices.len()
            )));
        }
        let distance = polyline_length(&self.vertices);
        if distance <= 0.0 {
            return Err(AnimatorError::invalid("linear path has zero length"));
        }
        let (common, leaf) = self.params.build()?;
        Ok(LinearAnimator {
            common,
            leaf,
            vertices: self.vertices,
            distance,
            on_step: self.on_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{ParticleEffect, ParticlePoint};

    fn dot() -> Arc<dyn Drawable> {
        Arc::new(ParticlePoint::new(ParticleEffect::new("dot")))
    }

    fn zigzag() -> LinearBuilder {
        LinearAnimator::builder().drawable(dot()).vertices([
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-10.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
            Point3::new(-9.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn distance_sums_segments() {
        // 20 + 19 + 18
        let a = zigzag().rendering_interval(0.04).build().unwrap();
        assert_eq!(a.distance(), 57.0);
    }

    #[test]
    fn interval_converts_to_steps() {
        let a = zigzag().rendering_interval(0.04).build().unwrap();
        assert_eq!(a.convert_to_steps(), 1425);
        assert_eq!(a.calculate_duration(), 1425);
    }

    #[test]
    fn positions_walk_the_path() {
        let a = LinearAnimator::builder()
            .drawable(dot())
            .vertex(Point3::origin())
            .vertex(Point3::new(4.0, 0.0, 0.0))
            .vertex(Point3::new(4.0, 4.0, 0.0))
            .rendering_steps(5)
            .build()
            .unwrap();
        assert_eq!(a.position_at(0, 5), Point3::origin());
        assert_eq!(a.position_at(2, 5), Point3::new(4.0, 0.0, 0.0));
        assert_eq!(a.position_at(3, 5), Point3::new(4.0, 2.0, 0.0));
        assert_eq!(a.position_at(4, 5), Point3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn degenerate_paths_are_rejected() {
        let single = LinearAnimator::builder()
            .drawable(dot())
            .vertex(Point3::origin())
            .build();
        assert!(single.is_err());
        let collapsed = LinearAnimator::builder()
            .drawable(dot())
            .vertices([Point3::origin(), Point3::origin()])
            .build();
        assert!(collapsed.is_err());
    }
}
