//! Interceptor bus: typed before/after hooks attached to any steppable operation.
//!
//! A hook site owns an [`Interceptor<T, D>`] where `T` is the owning component and
//! `D` is a plain struct listing exactly the values that site exposes. The site
//! builds `D` with its defaults, hands it to the handler inside an
//! [`InterceptData`] and reads the (possibly rewritten) fields back afterwards.

use std::fmt;
use std::sync::Arc;

use nalgebra::Point3;

use crate::drawable::Renderer;

/// Context handed to an interceptor handler.
pub struct InterceptData<'a, D> {
    /// Render target the owning operation is drawing into.
    pub renderer: &'a dyn Renderer,
    pub position: Option<Point3<f32>>,
    /// `None` when the hook site is not step-scoped.
    pub step: Option<u32>,
    pub data: D,
}

impl<'a, D> InterceptData<'a, D> {
    pub fn new(
        renderer: &'a dyn Renderer,
        position: Option<Point3<f32>>,
        step: Option<u32>,
        data: D,
    ) -> Self {
        Self {
            renderer,
            position,
            step,
            data,
        }
    }

    pub fn into_data(self) -> D {
        self.data
    }
}

type Handler<T, D> = dyn for<'a> Fn(&mut InterceptData<'a, D>, &T) + Send + Sync;

/// A registered handler for one hook site, or the identity when none is set.
pub struct Interceptor<T, D> {
    handler: Option<Arc<Handler<T, D>>>,
}

impl<T, D> Interceptor<T, D> {
    /// The no-op interceptor: reads nothing, changes nothing.
    pub fn identity() -> Self {
        Self { handler: None }
    }

    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&mut InterceptData<'a, D>, &T) + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(f)),
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.handler.is_none()
    }

    /// Run the handler (if any) against an already built context.
    #[inline]
    pub fn apply(&self, data: &mut InterceptData<'_, D>, owner: &T) {
        if let Some(handler) = &self.handler {
            handler(data, owner);
        }
    }

    /// Build the context from `defaults`, run the handler and return the result.
    pub fn intercept<'a>(
        &self,
        owner: &T,
        renderer: &'a dyn Renderer,
        position: Option<Point3<f32>>,
        step: Option<u32>,
        defaults: D,
    ) -> InterceptData<'a, D> {
        let mut data = InterceptData::new(renderer, position, step, defaults);
        self.apply(&mut data, owner);
        data
    }
}

impl<T, D> Default for Interceptor<T, D> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T, D> Clone for Interceptor<T, D> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<T, D> fmt::Debug for Interceptor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("identity", &self.is_identity())
            .finish()
    }
}
