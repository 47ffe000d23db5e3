use std::sync::Arc;

use nalgebra::{Point3, Vector3};

use super::{Drawable, Renderer};
use crate::error::{AnimatorError, Result};
use crate::interceptor::Interceptor;

/// Values exposed before each child of a [`ParticleCombiner`] is drawn.
#[derive(Debug, Clone)]
pub struct BeforeChildDraw {
    /// Index of the child about to be drawn.
    pub index: usize,
    /// Draw this object instead of the child at `index`.
    pub replacement: Option<Arc<dyn Drawable>>,
    pub can_draw: bool,
}

/// Groups several drawables so one animator can drive them all. Groups nest.
#[derive(Debug)]
pub struct ParticleCombiner {
    objects: Vec<Box<dyn Drawable>>,
    offset: Vector3<f32>,
    before_child_draw: Interceptor<ParticleCombiner, BeforeChildDraw>,
}

impl ParticleCombiner {
    pub fn new(objects: Vec<Box<dyn Drawable>>) -> Result<Self> {
        if objects.is_empty() {
            return Err(AnimatorError::invalid("a combiner needs at least one object"));
        }
        Ok(Self {
            objects,
            offset: Vector3::zeros(),
            before_child_draw: Interceptor::identity(),
        })
    }

    pub fn objects(&self) -> &[Box<dyn Drawable>] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn append(&mut self, object: Box<dyn Drawable>) {
        self.objects.push(object);
    }

    pub fn append_objects(&mut self, objects: impl IntoIterator<Item = Box<dyn Drawable>>) {
        self.objects.extend(objects);
    }

    /// Replace every child. Returns the previous children; an empty list is rejected.
    pub fn set_objects(
        &mut self,
        objects: Vec<Box<dyn Drawable>>,
    ) -> Result<Vec<Box<dyn Drawable>>> {
        if objects.is_empty() {
            return Err(AnimatorError::invalid("a combiner needs at least one object"));
        }
        Ok(std::mem::replace(&mut self.objects, objects))
    }

    pub fn set_before_child_draw(&mut self, hook: Interceptor<ParticleCombiner, BeforeChildDraw>) {
        self.before_child_draw = hook;
    }
}

impl Drawable for ParticleCombiner {
    fn draw(&self, renderer: &dyn Renderer, step: u32, position: Point3<f32>) {
        for (index, object) in self.objects.iter().enumerate() {
            let gate = self
                .before_child_draw
                .intercept(
                    self,
                    renderer,
                    Some(position),
                    Some(step),
                    BeforeChildDraw {
                        index,
                        replacement: None,
                        can_draw: true,
                    },
                )
                .into_data();
            if !gate.can_draw {
                continue;
            }
            match gate.replacement {
                Some(other) => other.draw(renderer, step, position),
                None => object.draw(renderer, step, position),
            }
        }
    }

    fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    /// Sets the offset of this group and of its direct children.
    fn set_offset(&mut self, offset: Vector3<f32>) -> Vector3<f32> {
        for object in &mut self.objects {
            object.set_offset(offset);
        }
        std::mem::replace(&mut self.offset, offset)
    }

    fn propagate_offset(&mut self, offset: Vector3<f32>) {
        self.offset = offset;
        for object in &mut self.objects {
            object.propagate_offset(offset);
        }
    }
}
