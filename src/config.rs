//! Solver configuration record and the per-chart presets built on top of it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{MAX_FILL_RATIO, RadiusFn, emphasis_radius, even_radius, saturating_radius};
use crate::render::LabelRules;

/// Named options for one chart instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Pull toward the viewport center, scaled per bubble by relative size.
    pub center_force: f32,
    /// Fraction of an overlap resolved per tick.
    pub collision_strength: f32,
    /// Velocity retained after each tick. Must stay below 1.
    pub velocity_decay: f32,
    /// Minimum gap between bubble edges and between a bubble and the container, in px.
    pub padding: f32,
    pub min_radius: Option<f32>,
    pub max_radius: Option<f32>,
    /// Mutual repulsion between every pair of bubbles.
    pub charge_strength: f32,
    /// Share of the padded viewport the bubble set may cover, counting half the padding around
    /// each bubble. Capped at [`MAX_FILL_RATIO`].
    pub fill_ratio: f32,
    /// Mean kinetic energy per bubble below which motion counts as stopped.
    pub energy_threshold: f32,
    pub max_ticks: usize,
    pub publish_interval_ms: u64,
    pub long_press_ms: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            center_force: 0.05,
            collision_strength: 0.7,
            velocity_decay: 0.6,
            padding: 3.0,
            min_radius: None,
            max_radius: None,
            charge_strength: 0.02,
            fill_ratio: 0.5,
            energy_threshold: 0.002,
            max_ticks: 600,
            publish_interval_ms: 16,
            long_press_ms: 500,
        }
    }
}

fn unit_or(value: f32, fallback: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        fallback
    }
}

fn positive_or_none(value: Option<f32>) -> Option<f32> {
    value.filter(|radius| radius.is_finite() && *radius > 0.0)
}

impl ChartConfig {
    /// Coerces every option into its usable range. Never fails.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();

        let mut min_radius = positive_or_none(self.min_radius);
        let max_radius = positive_or_none(self.max_radius);
        if let (Some(min), Some(max)) = (min_radius, max_radius)
            && min > max
        {
            tracing::warn!(min, max, "min_radius above max_radius, ignoring min_radius");
            min_radius = None;
        }

        let energy_threshold = if self.energy_threshold.is_finite() && self.energy_threshold > 0.0
        {
            self.energy_threshold
        } else {
            defaults.energy_threshold
        };

        let fill_ratio = if self.fill_ratio.is_finite() && self.fill_ratio > 0.0 {
            self.fill_ratio.clamp(0.05, MAX_FILL_RATIO)
        } else {
            defaults.fill_ratio
        };

        Self {
            center_force: unit_or(self.center_force, defaults.center_force, 1.0),
            collision_strength: unit_or(self.collision_strength, defaults.collision_strength, 1.0),
            velocity_decay: unit_or(self.velocity_decay, defaults.velocity_decay, 0.99),
            padding: unit_or(self.padding, defaults.padding, 64.0),
            min_radius,
            max_radius,
            charge_strength: unit_or(self.charge_strength, defaults.charge_strength, 1.0),
            fill_ratio,
            energy_threshold,
            max_ticks: self.max_ticks.clamp(1, 10_000),
            publish_interval_ms: self.publish_interval_ms.min(1_000),
            long_press_ms: self.long_press_ms.clamp(100, 5_000),
        }
    }
}

pub fn load_config(path: &Path) -> Result<ChartConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read chart config {}", path.display()))?;
    let config: ChartConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid chart config JSON in {}", path.display()))?;
    Ok(config.sanitized())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartVariant {
    Honeycomb,
    Expanded,
    Detail,
}

impl ChartVariant {
    pub const ALL: [Self; 3] = [Self::Honeycomb, Self::Expanded, Self::Detail];

    pub fn label(self) -> &'static str {
        match self {
            Self::Honeycomb => "Honeycomb",
            Self::Expanded => "Expanded",
            Self::Detail => "Detail",
        }
    }

    pub fn style(self) -> ChartStyle {
        match self {
            Self::Honeycomb => ChartStyle {
                variant: self,
                config: ChartConfig::default(),
                radius_fn: saturating_radius,
                label_rules: LabelRules::default(),
            },
            Self::Expanded => ChartStyle {
                variant: self,
                config: ChartConfig {
                    center_force: 0.04,
                    charge_strength: 0.03,
                    fill_ratio: 0.55,
                    padding: 4.0,
                    ..ChartConfig::default()
                },
                radius_fn: even_radius,
                label_rules: LabelRules {
                    font_scale: 0.34,
                    max_lines_for: two_lines_above_18,
                    ..LabelRules::default()
                },
            },
            Self::Detail => ChartStyle {
                variant: self,
                config: ChartConfig {
                    center_force: 0.07,
                    fill_ratio: 0.45,
                    padding: 5.0,
                    ..ChartConfig::default()
                },
                radius_fn: emphasis_radius,
                label_rules: LabelRules {
                    max_font: 32.0,
                    max_lines_for: two_lines_above_14,
                    ..LabelRules::default()
                },
            },
        }
    }
}

fn two_lines_above_18(radius: f32) -> usize {
    if radius >= 18.0 { 2 } else { 1 }
}

fn two_lines_above_14(radius: f32) -> usize {
    if radius >= 14.0 { 2 } else { 1 }
}

/// Everything that differs between chart variants.
#[derive(Clone, Debug)]
pub struct ChartStyle {
    pub variant: ChartVariant,
    pub config: ChartConfig,
    pub radius_fn: RadiusFn,
    pub label_rules: LabelRules,
}

impl ChartStyle {
    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config.sanitized();
        self
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartVariant::Honeycomb.style()
    }
}
