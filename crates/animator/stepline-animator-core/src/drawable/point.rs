use nalgebra::{Point3, Vector3};

use super::{Drawable, ParticleEffect, Renderer};
use crate::interceptor::Interceptor;

/// Values exposed before a point is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeDraw {
    /// Where the particle will be emitted (offset already applied).
    pub position: Point3<f32>,
}

/// Nothing is exposed after drawing; the hook only observes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AfterDraw;

/// A single particle.
#[derive(Debug)]
pub struct ParticlePoint {
    effect: ParticleEffect,
    offset: Vector3<f32>,
    before_draw: Interceptor<ParticlePoint, BeforeDraw>,
    after_draw: Interceptor<ParticlePoint, AfterDraw>,
}

impl ParticlePoint {
    pub fn new(effect: ParticleEffect) -> Self {
        Self {
            effect,
            offset: Vector3::zeros(),
            before_draw: Interceptor::identity(),
            after_draw: Interceptor::identity(),
        }
    }

    pub fn effect(&self) -> &ParticleEffect {
        &self.effect
    }

    pub fn set_before_draw(&mut self, hook: Interceptor<ParticlePoint, BeforeDraw>) {
        self.before_draw = hook;
    }

    pub fn set_after_draw(&mut self, hook: Interceptor<ParticlePoint, AfterDraw>) {
        self.after_draw = hook;
    }
}

impl Drawable for ParticlePoint {
    fn draw(&self, renderer: &dyn Renderer, step: u32, position: Point3<f32>) {
        let target = position + self.offset;
        let before = self.before_draw.intercept(
            self,
            renderer,
            Some(target),
            Some(step),
            BeforeDraw { position: target },
        );
        renderer.draw_particle(&self.effect, step, before.data.position);
        self.after_draw
            .intercept(self, renderer, Some(before.data.position), Some(step), AfterDraw);
    }

    fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    fn set_offset(&mut self, offset: Vector3<f32>) -> Vector3<f32> {
        std::mem::replace(&mut self.offset, offset)
    }
}
