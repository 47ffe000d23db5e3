//! Shared test support: configuration fixtures, a recording renderer and probe
//! drawables that log the tick at which each step was drawn.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use nalgebra::Point3;
use once_cell::sync::Lazy;
use serde::Deserialize;
use stepline_animator::animator::PointAnimator;
use stepline_animator::{
    AnimationContext, Config, Drawable, ParticleEffect, Renderer, Scheduler, SharedAnimator,
    TickReport,
};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    configs: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = fixtures_root().join(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = MANIFEST
            .configs
            .get(name)
            .ok_or_else(|| anyhow!("unknown config fixture '{name}'"))?;
        read_to_string(rel)
    }

    pub fn load(name: &str) -> Result<Config> {
        let text = json(name)?;
        Config::from_json_str(&text).with_context(|| format!("failed to parse config fixture {name}"))
    }
}

/// One primitive received by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub effect: String,
    pub step: u32,
    pub position: Point3<f32>,
}

/// Renderer that keeps every particle and frame callback it receives.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<DrawCall>>,
    frames: Mutex<Vec<(u32, Point3<f32>)>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn effects(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.effect.clone()).collect()
    }

    /// `before_frame` calls as `(step, origin)`.
    pub fn frames(&self) -> Vec<(u32, Point3<f32>)> {
        self.frames.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_particle(&self, effect: &ParticleEffect, step: u32, position: Point3<f32>) {
        self.calls.lock().unwrap().push(DrawCall {
            effect: effect.name().to_owned(),
            step,
            position,
        });
    }

    fn before_frame(&self, step: u32, origin: Point3<f32>) {
        self.frames.lock().unwrap().push((step, origin));
    }
}

/// A draw observed by a [`Probe`], stamped with the scheduler tick it happened on.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub label: String,
    pub tick: u64,
    pub step: u32,
    pub position: Point3<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<Hit>>>);

impl Timeline {
    pub fn hits(&self) -> Vec<Hit> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ticks_of(&self, label: &str) -> Vec<u64> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.label == label)
            .map(|h| h.tick)
            .collect()
    }

    /// Labels in draw order, one entry per hit.
    pub fn labels(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|h| h.label.clone()).collect()
    }

    fn record(&self, hit: Hit) {
        self.0.lock().unwrap().push(hit);
    }
}

/// Drawable that logs each draw into a [`Timeline`] and emits one particle named
/// after its label.
#[derive(Debug)]
pub struct Probe {
    label: String,
    effect: ParticleEffect,
    scheduler: Arc<Scheduler>,
    timeline: Timeline,
}

impl Drawable for Probe {
    fn draw(&self, renderer: &dyn Renderer, step: u32, position: Point3<f32>) {
        self.timeline.record(Hit {
            label: self.label.clone(),
            tick: self.scheduler.current_tick(),
            step,
            position,
        });
        renderer.draw_particle(&self.effect, step, position);
    }

    fn set_offset(&mut self, _offset: nalgebra::Vector3<f32>) -> nalgebra::Vector3<f32> {
        nalgebra::Vector3::zeros()
    }
}

/// A context with probe helpers bound to its scheduler.
pub struct Harness {
    pub ctx: AnimationContext,
    pub renderer: Arc<RecordingRenderer>,
    pub timeline: Timeline,
}

impl Harness {
    pub fn inline() -> Self {
        let renderer = Arc::new(RecordingRenderer::default());
        Self {
            ctx: AnimationContext::inline(renderer.clone()),
            renderer,
            timeline: Timeline::default(),
        }
    }

    pub fn with_config(cfg: &Config) -> Result<Self> {
        let renderer = Arc::new(RecordingRenderer::default());
        let ctx = AnimationContext::new(cfg, renderer.clone())
            .map_err(|e| anyhow!("failed to build context: {e}"))?;
        Ok(Self {
            ctx,
            renderer,
            timeline: Timeline::default(),
        })
    }

    pub fn probe(&self, label: &str) -> Arc<dyn Drawable> {
        Arc::new(Probe {
            label: label.to_owned(),
            effect: ParticleEffect::new(label),
            scheduler: Arc::clone(self.ctx.scheduler()),
            timeline: self.timeline.clone(),
        })
    }

    /// Point animator at the origin drawing `label` for `steps` steps, one tick apart.
    pub fn leaf(&self, label: &str, steps: u32) -> SharedAnimator {
        self.leaf_at(label, steps, Point3::origin())
    }

    pub fn leaf_at(&self, label: &str, steps: u32, point: Point3<f32>) -> SharedAnimator {
        PointAnimator::builder()
            .drawable(self.probe(label))
            .rendering_steps(steps)
            .point(point)
            .build()
            .expect("probe leaf should build")
            .into()
    }

    pub fn tick(&self) -> TickReport {
        self.ctx.scheduler().advance_tick()
    }

    /// Pump until idle; panics if any task failed or the run did not settle.
    pub fn run(&self, max_ticks: u64) -> Vec<TickReport> {
        let reports = self.ctx.scheduler().run_until_idle(max_ticks);
        assert!(self.ctx.scheduler().is_idle(), "scheduler still busy after {max_ticks} ticks");
        for report in &reports {
            assert!(report.is_clean(), "tick {} failed: {:?}", report.tick, report.failures);
        }
        reports
    }
}
