//! Render-side contracts consumed by animators.
//!
//! Animators never produce output themselves; at every step they hand a position to a
//! [`Drawable`], which in turn emits primitives into a [`Renderer`]. Both are external
//! collaborators: the core only relies on the narrow method sets defined here.

pub mod combiner;
pub mod point;

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub use combiner::{BeforeChildDraw, ParticleCombiner};
pub use point::{AfterDraw, BeforeDraw, ParticlePoint};

/// Opaque identifier of the visual effect a renderer should emit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticleEffect(pub String);

impl ParticleEffect {
    pub fn new(name: impl Into<String>) -> Self {
        ParticleEffect(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticleEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side-effecting output sink. Implementations are shared across worker threads,
/// so they take `&self` and manage their own interior state.
pub trait Renderer: Send + Sync {
    fn draw_particle(&self, effect: &ParticleEffect, step: u32, position: Point3<f32>);

    /// Emit `count` particles evenly spaced from `start` to `end` (both inclusive).
    fn draw_line(
        &self,
        effect: &ParticleEffect,
        step: u32,
        start: Point3<f32>,
        end: Point3<f32>,
        count: u32,
    ) {
        match count {
            0 => {}
            1 => self.draw_particle(effect, step, start),
            _ => {
                let span = end - start;
                let last = (count - 1) as f32;
                for i in 0..count {
                    self.draw_particle(effect, step, start + span * (i as f32 / last));
                }
            }
        }
    }

    fn before_frame(&self, _step: u32, _origin: Point3<f32>) {}

    fn after_frame(&self, _step: u32, _origin: Point3<f32>) {}
}

/// Renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_particle(&self, _effect: &ParticleEffect, _step: u32, _position: Point3<f32>) {}
}

/// Anything an animator can render at a step.
///
/// `draw` must not panic for valid inputs and is called at most once per step per
/// instance.
pub trait Drawable: Send + Sync + fmt::Debug {
    fn draw(&self, renderer: &dyn Renderer, step: u32, position: Point3<f32>);

    fn offset(&self) -> Vector3<f32> {
        Vector3::zeros()
    }

    /// Returns the previous offset.
    fn set_offset(&mut self, offset: Vector3<f32>) -> Vector3<f32>;

    /// Apply `offset` to this object and, for groups, to every descendant.
    fn propagate_offset(&mut self, offset: Vector3<f32>) {
        self.set_offset(offset);
    }
}
