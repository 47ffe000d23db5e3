use std::sync::Arc;

use nalgebra::Point3;
use serde_json::to_string_pretty;
use stepline_animator::animator::{LinearAnimator, ParallelAnimator, PointAnimator, SequentialAnimator};
use stepline_animator::drawable::ParticlePoint;
use stepline_animator::{AnimationContext, Config, ParticleEffect, Renderer, SharedAnimator};

/// Prints every particle it receives.
struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn draw_particle(&self, effect: &ParticleEffect, step: u32, position: Point3<f32>) {
        println!(
            "  {:<6} step {step:>3} at ({:.2}, {:.2}, {:.2})",
            effect.name(),
            position.x,
            position.y,
            position.z
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cfg = Config::from_json_str(r#"{ "registry_capacity": 8 }"#)?;
    println!("Config:\n{}", to_string_pretty(&cfg)?);
    let ctx = AnimationContext::new(&cfg, Arc::new(ConsoleRenderer))?;

    let flash = Arc::new(ParticlePoint::new(ParticleEffect::new("flash")));
    let dust = Arc::new(ParticlePoint::new(ParticleEffect::new("dust")));
    let spark = Arc::new(ParticlePoint::new(ParticleEffect::new("spark")));

    let intro = PointAnimator::builder()
        .drawable(flash)
        .rendering_steps(2)
        .point(Point3::new(0.0, 2.0, 0.0))
        .build()?;

    // 20 + 19 + 18 units at one step per unit.
    let sweep = LinearAnimator::builder()
        .drawable(dust)
        .vertices([
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-10.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
            Point3::new(-9.0, 0.0, 0.0),
        ])
        .rendering_interval(1.0)
        .build()?;

    let finale = ParallelAnimator::builder()
        .animator(
            PointAnimator::builder()
                .drawable(spark.clone())
                .rendering_steps(3)
                .step_ticks(2)
                .build()?,
        )
        .animator_with_delay(
            PointAnimator::builder()
                .drawable(spark)
                .point(Point3::new(0.0, 0.0, 5.0))
                .build()?,
            4,
        )
        .build()?;

    let show: SharedAnimator = SequentialAnimator::builder()
        .animator(intro)
        .animator_with_delay(sweep, 3)
        .animator_with_delay(finale, 2)
        .processing_speed(1)
        .on_animator_rendering(|ctx, owner| {
            println!(
                "child {} of {} starts after {} ticks",
                ctx.step.unwrap_or_default(),
                owner.animators().len(),
                ctx.data.delay
            );
        })
        .build()?
        .into();

    println!("Total duration: {} ticks", show.calculate_duration());
    show.begin(&ctx)?;

    let scheduler = ctx.scheduler();
    while !scheduler.is_idle() {
        let report = scheduler.advance_tick();
        if report.batches_run > 0 {
            println!("tick {}: {} batches", report.tick, report.batches_run);
        }
        for failure in &report.failures {
            eprintln!("tick {} failed: {failure}", report.tick);
        }
    }
    Ok(())
}
