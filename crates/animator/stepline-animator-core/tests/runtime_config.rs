use std::time::{Duration, Instant};

use stepline_animator::{
    animator::{ParallelAnimator, SequentialAnimator},
    ExecutorMode, SharedAnimator,
};
use stepline_test_fixtures::{configs, Harness, Timeline};

fn wait_for(timeline: &Timeline, hits: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if timeline.len() >= hits {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn config_fixtures_load() -> anyhow::Result<()> {
    let mut keys = configs::keys();
    keys.sort();
    assert_eq!(keys, vec!["diagnostics", "inline", "pool"]);

    let inline = configs::load("inline")?;
    assert_eq!(inline.executor, ExecutorMode::Inline);
    assert_eq!(inline.registry_capacity, 16);

    let pool = configs::load("pool")?;
    assert_eq!(pool.executor, ExecutorMode::Pool { threads: 2 });

    let diagnostics = configs::load("diagnostics")?;
    assert!(diagnostics.diagnostics.enabled);
    assert_eq!(diagnostics.executor, ExecutorMode::Inline);

    assert!(configs::load("missing").is_err());
    Ok(())
}

#[test]
fn inline_config_builds_inline_context() -> anyhow::Result<()> {
    let h = Harness::with_config(&configs::load("diagnostics")?)?;
    assert!(h.ctx.executor().is_inline());
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(h.leaf("a", 2))
        .animator_with_delay(h.leaf("b", 1), 1)
        .build()?
        .into();
    seq.begin(&h.ctx)?;
    h.run(10);
    assert_eq!(h.timeline.ticks_of("b"), vec![3]);
    Ok(())
}

#[test]
fn pool_runs_immediate_branches() -> anyhow::Result<()> {
    let h = Harness::with_config(&configs::load("pool")?)?;
    assert!(!h.ctx.executor().is_inline());

    let par: SharedAnimator = ParallelAnimator::builder()
        .animators([h.leaf("a", 1), h.leaf("b", 1), h.leaf("c", 1)])
        .build()?
        .into();
    par.begin(&h.ctx)?;
    assert!(wait_for(&h.timeline, 3), "pool never drew all branches");

    let mut labels = h.timeline.labels();
    labels.sort();
    assert_eq!(labels, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn pool_context_still_honours_delays() -> anyhow::Result<()> {
    let h = Harness::with_config(&configs::load("pool")?)?;
    let par: SharedAnimator = ParallelAnimator::builder()
        .animator_with_delay(h.leaf("late", 1), 3)
        .build()?
        .into();
    par.begin(&h.ctx)?;
    for _ in 0..2 {
        h.tick();
    }
    assert!(h.timeline.is_empty());
    // The due batch begins the leaf on the pump thread; its first step goes to the pool.
    h.tick();
    assert!(wait_for(&h.timeline, 1));
    assert_eq!(h.timeline.ticks_of("late"), vec![3]);
    Ok(())
}
