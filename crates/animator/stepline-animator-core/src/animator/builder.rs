//! Builder plumbing shared by the composite animators.

use super::{AnimatorCommon, SharedAnimator};
use crate::error::{AnimatorError, Result};
use crate::ids::AnimatorId;

pub(crate) fn validate_delay(value: i64, what: &str) -> Result<u32> {
    if value < 0 {
        return Err(AnimatorError::invalid(format!(
            "{what} must be non-negative, got {value}"
        )));
    }
    u32::try_from(value).map_err(|_| AnimatorError::invalid(format!("{what} {value} is out of range")))
}

pub(crate) fn validate_speed(value: i64) -> Result<u32> {
    if value < 1 {
        return Err(AnimatorError::invalid(format!(
            "processing speed must be at least 1, got {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| AnimatorError::invalid(format!("processing speed {value} is out of range")))
}

/// Children, per-child delays and common settings collected by a composite builder.
///
/// Delays are padded with zeros up to the number of children at build time.
#[derive(Debug, Clone)]
pub(crate) struct CompositeBuilder {
    delay: i64,
    processing_speed: i64,
    children: Vec<SharedAnimator>,
    delays: Vec<i64>,
}

impl Default for CompositeBuilder {
    fn default() -> Self {
        Self {
            delay: 0,
            processing_speed: 1,
            children: Vec::new(),
            delays: Vec::new(),
        }
    }
}

impl CompositeBuilder {
    pub fn delay(&mut self, delay: i64) {
        self.delay = delay;
    }

    pub fn processing_speed(&mut self, speed: i64) {
        self.processing_speed = speed;
    }

    pub fn push(&mut self, child: SharedAnimator) {
        self.children.push(child);
    }

    pub fn push_with_delay(&mut self, child: SharedAnimator, delay: i64) {
        self.pad_delays();
        self.children.push(child);
        self.delays.push(delay);
    }

    pub fn extend(&mut self, children: impl IntoIterator<Item = SharedAnimator>) {
        self.children.extend(children);
    }

    pub fn extend_with_delays(
        &mut self,
        children: impl IntoIterator<Item = SharedAnimator>,
        delays: impl IntoIterator<Item = i64>,
    ) {
        self.pad_delays();
        self.children.extend(children);
        self.delays.extend(delays);
    }

    // Children added without a delay own a zero slot before any explicit delay.
    fn pad_delays(&mut self) {
        if self.delays.len() < self.children.len() {
            self.delays.resize(self.children.len(), 0);
        }
    }

    pub(crate) fn build(self) -> Result<(AnimatorCommon, Vec<SharedAnimator>, Vec<u32>)> {
        let delay = validate_delay(self.delay, "Initial delay")?;
        let processing_speed = validate_speed(self.processing_speed)?;
        if self.children.is_empty() {
            return Err(AnimatorError::invalid(
                "a composite animator needs at least one child animator",
            ));
        }
        if self.delays.len() > self.children.len() {
            return Err(AnimatorError::invalid(format!(
                "{} child delays given for {} child animators",
                self.delays.len(),
                self.children.len()
            )));
        }
        let mut delays = Vec::with_capacity(self.children.len());
        for raw in &self.delays {
            delays.push(validate_delay(*raw, "Child animator delay")?);
        }
        delays.resize(self.children.len(), 0);
        Ok((
            AnimatorCommon {
                id: AnimatorId::next(),
                delay,
                processing_speed,
            },
            self.children,
            delays,
        ))
    }
}
