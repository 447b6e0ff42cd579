//! Items handed in by the host and the bubbles the solver derives from them.

use std::f32::consts::PI;
use std::fmt;

use eframe::egui::{Pos2, Vec2, vec2};
use serde::{Deserialize, Serialize};

const MIN_RADIUS_FRACTION: f32 = 0.45;
/// Densest share of the padded container a relaxed set of circles reliably reaches.
pub const MAX_FILL_RATIO: f32 = 0.6;

/// One detected emotion, part or need as supplied by the surrounding screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub label: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub color_token: String,
    #[serde(default)]
    pub category: String,
}

fn default_weight() -> f32 {
    1.0
}

impl Item {
    pub fn new(id: impl Into<String>, label: impl Into<String>, weight: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight,
            color_token: String::new(),
            category: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_color(mut self, color_token: impl Into<String>) -> Self {
        self.color_token = color_token.into();
        self
    }

    pub fn category(&self) -> Category {
        Category::parse(&self.category)
    }

    pub fn sanitized_weight(&self) -> f32 {
        sanitize_weight(self.weight)
    }
}

/// Negative or non-finite weights are treated as weight 1.
pub fn sanitize_weight(weight: f32) -> f32 {
    if weight.is_finite() && weight >= 0.0 {
        weight
    } else {
        1.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Emotion,
    Part,
    Need,
    Other(String),
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "emotion" | "emotions" | "feeling" | "feelings" => Self::Emotion,
            "part" | "parts" => Self::Part,
            "need" | "needs" => Self::Need,
            _ => Self::Other(normalized),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Emotion => "emotion",
            Self::Part => "part",
            Self::Need => "need",
            Self::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False until the host has laid the container out with a positive size.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn area(self) -> f32 {
        self.width * self.height
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    pub fn min_dimension(self) -> f32 {
        self.width.min(self.height)
    }

    pub fn size(self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

/// Solver-side physical state for one item.
#[derive(Clone, Debug)]
pub struct Bubble {
    pub id: String,
    pub label: String,
    pub color_token: String,
    pub radius: f32,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub pinned: bool,
}

impl Bubble {
    pub fn from_item(item: &Item, radius: f32, pos: Vec2) -> Self {
        Self {
            id: item.id.clone(),
            label: item.label.clone(),
            color_token: item.color_token.clone(),
            radius,
            pos,
            velocity: Vec2::ZERO,
            pinned: false,
        }
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }

    pub fn center(&self) -> Pos2 {
        self.pos.to_pos2()
    }

    /// Relative size in `(0, 1]` used to scale the centering pull.
    pub fn relative_mass(&self, max_radius: f32) -> f32 {
        if max_radius <= f32::EPSILON {
            return 1.0;
        }
        let ratio = (self.radius / max_radius).clamp(0.0, 1.0);
        ratio * ratio
    }
}

/// Inputs a radius formula may depend on.
#[derive(Clone, Copy, Debug)]
pub struct RadiusContext {
    pub viewport: Viewport,
    pub item_count: usize,
    pub fill_ratio: f32,
    pub padding: f32,
    pub min_radius: Option<f32>,
    pub max_radius: Option<f32>,
}

impl RadiusContext {
    /// Radius of one of `item_count` equal circles that, grown by half the padding, cover
    /// `fill_ratio` of the viewport shrunk by the padding.
    pub fn base_radius(&self) -> f32 {
        let count = self.item_count.max(1) as f32;
        let width = (self.viewport.width - self.padding).max(0.0);
        let height = (self.viewport.height - self.padding).max(0.0);
        let fill = self.fill_ratio.clamp(0.0, MAX_FILL_RATIO);
        let padded = (fill * width * height / (count * PI)).max(0.0).sqrt();
        (padded - self.padding * 0.5).max(0.0)
    }

    pub fn bounds(&self) -> (f32, f32) {
        let fits = (self.viewport.min_dimension() * 0.5 - self.padding).max(1.0);
        let base = self.base_radius();
        let max = self.max_radius.unwrap_or(base).min(fits).max(1.0);
        let min = self
            .min_radius
            .unwrap_or(base * MIN_RADIUS_FRACTION)
            .clamp(1.0, max);
        (min, max)
    }
}

/// Maps a sanitized weight to an unclamped radius. Must be non-decreasing in weight.
pub type RadiusFn = fn(f32, &RadiusContext) -> f32;

/// Area saturates towards the base share: `w / (w + 2)`.
pub fn saturating_radius(weight: f32, ctx: &RadiusContext) -> f32 {
    ctx.base_radius() * (weight / (weight + 2.0)).sqrt()
}

/// Flatter curve for overview charts where every item should stay readable.
pub fn even_radius(weight: f32, ctx: &RadiusContext) -> f32 {
    ctx.base_radius() * (0.55 + 0.45 * (weight / (weight + 1.0))).sqrt()
}

/// Steeper curve for detail charts that emphasise the dominant item.
pub fn emphasis_radius(weight: f32, ctx: &RadiusContext) -> f32 {
    ctx.base_radius() * (weight / (weight + 6.0)).sqrt()
}

pub fn bubble_radius(weight: f32, ctx: &RadiusContext, formula: RadiusFn) -> f32 {
    let (min, max) = ctx.bounds();
    let raw = formula(sanitize_weight(weight), ctx);
    if raw.is_finite() {
        raw.clamp(min, max)
    } else {
        min
    }
}
