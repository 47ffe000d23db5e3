use std::sync::{Arc, Mutex};

use stepline_animator::{animator::SequentialAnimator, AnimatorError, SharedAnimator};
use stepline_test_fixtures::Harness;

#[test]
fn children_run_back_to_back_with_their_delays() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(h.leaf("a", 4))
        .animator_with_delay(h.leaf("b", 1), 5)
        .animator_with_delay(h.leaf("c", 3), 2)
        .build()
        .unwrap()
        .into();

    seq.begin(&h.ctx).unwrap();
    // The first child has no offset and starts during begin.
    assert_eq!(h.timeline.ticks_of("a"), vec![0]);

    let reports = h.run(50);
    assert_eq!(h.timeline.ticks_of("a"), vec![0, 1, 2, 3]);
    assert_eq!(h.timeline.ticks_of("b"), vec![9]);
    assert_eq!(h.timeline.ticks_of("c"), vec![12, 13, 14]);
    assert_eq!(reports.last().map(|r| r.tick), Some(14));
    assert_eq!(h.ctx.scheduler().registered_count(), 0);
}

#[test]
fn own_delay_offsets_the_whole_chain() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .delay(3)
        .animator(h.leaf("a", 2))
        .animator_with_delay(h.leaf("b", 1), 1)
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    h.run(20);
    assert_eq!(h.timeline.ticks_of("a"), vec![3, 4]);
    assert_eq!(h.timeline.ticks_of("b"), vec![6]);
}

#[test]
fn processing_speed_batches_triggers() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .processing_speed(2)
        .animators_with_delays([h.leaf("a", 1), h.leaf("b", 1), h.leaf("c", 1)], [1, 1, 1])
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    // Two children folded into the first batch, the trailing one flushed on its own.
    assert_eq!(h.ctx.scheduler().pending_batches(seq.id()), Some(2));

    h.run(20);
    assert_eq!(h.timeline.ticks_of("a"), vec![3]);
    assert_eq!(h.timeline.ticks_of("b"), vec![3]);
    assert_eq!(h.timeline.ticks_of("c"), vec![5]);
    assert_eq!(h.timeline.labels(), vec!["a", "b", "c"]);
}

#[test]
fn unbatched_triggers_get_one_batch_each() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animators_with_delays([h.leaf("a", 1), h.leaf("b", 1), h.leaf("c", 1)], [1, 1, 1])
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    assert_eq!(h.ctx.scheduler().pending_batches(seq.id()), Some(3));
    h.run(20);
    assert_eq!(h.timeline.ticks_of("a"), vec![1]);
    assert_eq!(h.timeline.ticks_of("b"), vec![3]);
    assert_eq!(h.timeline.ticks_of("c"), vec![5]);
}

#[test]
fn nested_sequences_unfold_in_order() {
    let h = Harness::inline();
    let inner = SequentialAnimator::builder()
        .animator(h.leaf("x", 2))
        .animator_with_delay(h.leaf("y", 1), 1)
        .build()
        .unwrap();
    let outer: SharedAnimator = SequentialAnimator::builder()
        .animator_with_delay(inner, 2)
        .animator(h.leaf("z", 1))
        .build()
        .unwrap()
        .into();
    seq_run(&h, &outer);
    assert_eq!(h.timeline.ticks_of("x"), vec![2, 3]);
    assert_eq!(h.timeline.ticks_of("y"), vec![5]);
    assert_eq!(h.timeline.ticks_of("z"), vec![6]);
}

fn seq_run(h: &Harness, root: &SharedAnimator) {
    root.begin(&h.ctx).unwrap();
    h.run(100);
}

#[test]
fn begin_without_pending_work_releases_registration() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(h.leaf("a", 1))
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    assert_eq!(h.timeline.ticks_of("a"), vec![0]);
    assert!(!h.ctx.scheduler().is_registered(seq.id()));
    // Nothing pending, so the same instance may begin again.
    seq.begin(&h.ctx).unwrap();
    assert_eq!(h.timeline.len(), 2);
}

#[test]
fn double_begin_is_rejected() {
    let h = Harness::inline();
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(h.leaf("a", 1))
        .animator_with_delay(h.leaf("b", 1), 4)
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    let err = seq.begin(&h.ctx).unwrap_err();
    assert_eq!(err, AnimatorError::DuplicateRegistration { id: seq.id() });

    // The first run is untouched.
    h.run(20);
    assert_eq!(h.timeline.ticks_of("b"), vec![5]);
}

#[test]
fn failed_begin_rolls_back_its_registration() {
    let h = Harness::inline();
    let busy = h.leaf("busy", 3);
    busy.begin(&h.ctx).unwrap();

    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(Arc::clone(&busy))
        .build()
        .unwrap()
        .into();
    let err = seq.begin(&h.ctx).unwrap_err();
    assert_eq!(err, AnimatorError::DuplicateRegistration { id: busy.id() });
    assert!(!h.ctx.scheduler().is_registered(seq.id()));

    // The unrelated leaf keeps running.
    assert_eq!(h.ctx.scheduler().pending_batches(busy.id()), Some(2));
    h.run(10);
    assert_eq!(h.timeline.ticks_of("busy"), vec![0, 1, 2]);
}

#[test]
fn hook_sees_one_based_ordinals() {
    let h = Harness::inline();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animators([h.leaf("a", 1), h.leaf("b", 1)])
        .on_animator_rendering(move |ctx, _| {
            sink.lock().unwrap().push((ctx.step, ctx.data.delay));
        })
        .build()
        .unwrap()
        .into();
    seq.begin(&h.ctx).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(Some(1), 0), (Some(2), 0)]);
}
