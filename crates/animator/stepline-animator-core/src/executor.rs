//! Execution of zero-delay triggers.

use std::fmt;

use crate::config::ExecutorMode;
use crate::error::{AnimatorError, Result};
use crate::scheduler::Task;

/// Where immediate (zero-delay) triggers run.
#[derive(Default)]
pub enum DrawExecutor {
    #[default]
    Inline,
    Pool(rayon::ThreadPool),
}

impl DrawExecutor {
    pub fn from_mode(mode: ExecutorMode) -> Result<Self> {
        match mode {
            ExecutorMode::Inline => Ok(DrawExecutor::Inline),
            ExecutorMode::Pool { threads } => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("stepline-draw-{i}"))
                .build()
                .map(DrawExecutor::Pool)
                .map_err(|e| AnimatorError::Config {
                    reason: format!("draw executor: {e}"),
                }),
        }
    }

    /// Run `task` now (inline) or hand it to the pool.
    ///
    /// Inline failures are returned to the caller; pool failures can only be logged.
    pub fn dispatch(&self, task: Task) -> Result<()> {
        match self {
            DrawExecutor::Inline => task(),
            DrawExecutor::Pool(pool) => {
                pool.spawn(move || {
                    if let Err(err) = task() {
                        log::error!("immediate trigger failed ({}): {err}", err.category());
                    }
                });
                Ok(())
            }
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, DrawExecutor::Inline)
    }
}

impl fmt::Debug for DrawExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawExecutor::Inline => f.write_str("DrawExecutor::Inline"),
            DrawExecutor::Pool(pool) => f
                .debug_struct("DrawExecutor::Pool")
                .field("threads", &pool.current_num_threads())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::AnimatorId;
    use std::sync::mpsc;

    #[test]
    fn inline_propagates_errors() {
        let exec = DrawExecutor::Inline;
        let id = AnimatorId(11);
        let err = exec
            .dispatch(Box::new(move || Err(AnimatorError::MissingRegistration { id })))
            .unwrap_err();
        assert_eq!(err, AnimatorError::MissingRegistration { id });
    }

    #[test]
    fn pool_runs_off_thread() {
        let exec = DrawExecutor::from_mode(ExecutorMode::Pool { threads: 2 }).unwrap();
        let (tx, rx) = mpsc::channel();
        exec.dispatch(Box::new(move || {
            tx.send(std::thread::current().name().map(str::to_owned)).ok();
            Ok(())
        }))
        .unwrap();
        let name = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("pool task ran");
        assert!(name.unwrap_or_default().starts_with("stepline-draw-"));
    }
}
