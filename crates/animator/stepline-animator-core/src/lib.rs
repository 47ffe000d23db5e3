//! Stepline Animator Core (engine-agnostic)
//!
//! Animator trees made of leaf animators and Sequential/Parallel composites are
//! begun against an [`AnimationContext`] and unfold over discrete ticks driven by an
//! external pump calling [`Scheduler::advance_tick`]. Every per-child and per-step
//! decision passes through a typed [`Interceptor`] hook.

pub mod animator;
pub mod config;
pub mod context;
pub mod drawable;
pub mod error;
pub mod executor;
pub mod ids;
pub mod interceptor;
pub mod scheduler;

// Re-exports for consumers
pub use animator::{
    Animator, AnimatorKind, Granularity, LinearAnimator, OnRenderAnimator, OnRenderStep,
    ParallelAnimator, PointAnimator, SequentialAnimator, SharedAnimator,
};
pub use config::{Config, DiagnosticsCfg, ExecutorMode};
pub use context::AnimationContext;
pub use drawable::{Drawable, NullRenderer, ParticleEffect, Renderer};
pub use error::{AnimatorError, Result};
pub use executor::DrawExecutor;
pub use ids::AnimatorId;
pub use interceptor::{InterceptData, Interceptor};
pub use scheduler::{ScheduledStep, Scheduler, Task, TickReport};
