use std::sync::Arc;

use stepline_animator::{
    animator::{ParallelAnimator, PointAnimator, SequentialAnimator},
    Animator, AnimatorError, AnimatorKind, Granularity, SharedAnimator,
};
use stepline_test_fixtures::Harness;

fn composites(h: &Harness) -> Vec<Animator> {
    vec![
        SequentialAnimator::builder()
            .animator(h.leaf("a", 1))
            .build()
            .unwrap()
            .into(),
        ParallelAnimator::builder()
            .animator(h.leaf("b", 1))
            .build()
            .unwrap()
            .into(),
    ]
}

#[test]
fn leaf_only_setters_fail_on_composites() {
    let h = Harness::inline();
    for composite in composites(&h) {
        let kind = composite.kind().label();
        assert!(composite.kind().is_composite());

        assert_eq!(
            composite.set_rendering_steps(10),
            Err(AnimatorError::UnsupportedOperation {
                operation: "set rendering steps",
                kind,
            })
        );
        assert_eq!(
            composite.set_rendering_interval(0.5),
            Err(AnimatorError::UnsupportedOperation {
                operation: "set rendering interval",
                kind,
            })
        );
        let err = composite.set_drawable_object(h.probe("x")).unwrap_err();
        assert_eq!(err.category(), "usage");
        assert_eq!(
            err.to_string(),
            format!("{kind} animators cannot set an individual drawable object")
        );
    }
}

#[test]
fn leaf_setters_return_previous_values() {
    let h = Harness::inline();
    let leaf: Animator = PointAnimator::builder()
        .drawable(h.probe("first"))
        .rendering_steps(2)
        .build()
        .unwrap()
        .into();
    assert_eq!(leaf.kind(), AnimatorKind::Point);

    assert_eq!(leaf.set_rendering_steps(5), Ok(Granularity::Steps(2)));
    assert_eq!(leaf.set_rendering_interval(0.25), Ok(Granularity::Steps(5)));
    assert_eq!(leaf.as_point().map(|p| p.steps()), Some(1));
    assert!(leaf.set_rendering_interval(0.0).is_err());
    assert!(leaf.set_rendering_steps(0).is_err());

    let first = leaf.set_drawable_object(h.probe("second")).unwrap();
    assert!(format!("{first:?}").contains("first"));

    let leaf = leaf.into_shared();
    leaf.begin(&h.ctx).unwrap();
    assert_eq!(h.timeline.labels(), vec!["second"]);
}

#[test]
fn nested_leaves_stay_adjustable_after_sharing() {
    let h = Harness::inline();
    let a = h.leaf("a", 1);
    let b = h.leaf("b", 1);
    let seq: SharedAnimator = SequentialAnimator::builder()
        .animator(Arc::clone(&a))
        .animator(Arc::clone(&b))
        .build()
        .unwrap()
        .into();
    assert_eq!(seq.calculate_duration(), 2);

    let nested = &seq.as_sequential().unwrap().animators()[0];
    assert_eq!(nested.set_rendering_steps(2), Ok(Granularity::Steps(1)));
    assert_eq!(b.set_rendering_steps(3), Ok(Granularity::Steps(1)));
    assert_eq!(seq.calculate_duration(), 5);

    seq.begin(&h.ctx).unwrap();
    h.run(20);
    assert_eq!(h.timeline.ticks_of("a"), vec![0, 1]);
    assert_eq!(h.timeline.ticks_of("b"), vec![2, 3, 4]);
}

#[test]
fn shared_leaf_swaps_its_drawable_between_runs() {
    let h = Harness::inline();
    let leaf = h.leaf("old", 1);
    let par: SharedAnimator = ParallelAnimator::builder()
        .animator(Arc::clone(&leaf))
        .build()
        .unwrap()
        .into();
    par.begin(&h.ctx).unwrap();
    h.run(5);

    leaf.set_drawable_object(h.probe("new")).unwrap();
    par.begin(&h.ctx).unwrap();
    h.run(5);
    assert_eq!(h.timeline.labels(), vec!["old", "new"]);
}
