//! The handle animators begin against.

use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::drawable::{NullRenderer, Renderer};
use crate::error::Result;
use crate::executor::DrawExecutor;
use crate::scheduler::{Scheduler, Task};

/// Scheduler, render target and executor shared by one animator tree.
///
/// Cheap to clone; scheduled tasks capture a clone. Tests build one per case so
/// schedulers stay isolated.
#[derive(Clone)]
pub struct AnimationContext {
    scheduler: Arc<Scheduler>,
    renderer: Arc<dyn Renderer>,
    executor: Arc<DrawExecutor>,
}

impl fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationContext")
            .field("scheduler", &self.scheduler)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl AnimationContext {
    pub fn new(cfg: &Config, renderer: Arc<dyn Renderer>) -> Result<Self> {
        Ok(Self {
            scheduler: Arc::new(Scheduler::with_capacity(
                cfg.registry_capacity,
                cfg.diagnostics.enabled,
            )),
            renderer,
            executor: Arc::new(DrawExecutor::from_mode(cfg.executor)?),
        })
    }

    /// Inline executor, fresh scheduler.
    pub fn inline(renderer: Arc<dyn Renderer>) -> Self {
        Self::from_parts(Arc::new(Scheduler::new()), renderer, DrawExecutor::Inline)
    }

    /// Discards all output. Useful for timing-only runs.
    pub fn headless() -> Self {
        Self::inline(Arc::new(NullRenderer))
    }

    pub fn from_parts(
        scheduler: Arc<Scheduler>,
        renderer: Arc<dyn Renderer>,
        executor: DrawExecutor,
    ) -> Self {
        Self {
            scheduler,
            renderer,
            executor: Arc::new(executor),
        }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn executor(&self) -> &DrawExecutor {
        &self.executor
    }

    /// Run a zero-delay trigger through the executor.
    pub(crate) fn dispatch(&self, task: Task) -> Result<()> {
        self.executor.dispatch(task)
    }
}
