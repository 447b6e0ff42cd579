use eframe::egui::{Vec2, vec2};

use crate::model::{Bubble, Viewport};

/// Per-tick geometry shared by every force.
#[derive(Clone, Copy, Debug)]
pub struct ForceContext {
    pub viewport: Viewport,
    pub padding: f32,
    /// Largest radius in the current bubble set.
    pub max_radius: f32,
    /// Cooling factor in `(0, 1]` applied to the long-range forces.
    pub alpha: f32,
}

impl ForceContext {
    pub fn new(viewport: Viewport, padding: f32, bubbles: &[Bubble]) -> Self {
        let max_radius = bubbles
            .iter()
            .map(|bubble| bubble.radius)
            .fold(0.0_f32, f32::max);
        Self {
            viewport,
            padding,
            max_radius,
            alpha: 1.0,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForcePhase {
    /// Runs before integration and adjusts velocities.
    Velocity,
    /// Runs after integration and adjusts positions directly.
    Position,
}

/// One composable rule applied to the whole bubble set once per tick.
pub trait Force {
    fn name(&self) -> &'static str;

    fn phase(&self) -> ForcePhase {
        ForcePhase::Velocity
    }

    fn apply(&self, bubbles: &mut [Bubble], ctx: &ForceContext);
}

/// Separation direction for coincident centers, stable per pair.
fn fallback_direction(i: usize, j: usize) -> Vec2 {
    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn separation(bubbles: &[Bubble], i: usize, j: usize) -> (Vec2, f32) {
    let delta = bubbles[i].pos - bubbles[j].pos;
    let distance = delta.length();
    if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        (fallback_direction(i, j), 0.0)
    }
}

/// Share of a correction taken by `i` when pushing `i` and `j` apart. Pinned bubbles never move.
fn push_shares(bubbles: &[Bubble], i: usize, j: usize) -> (f32, f32) {
    match (bubbles[i].pinned, bubbles[j].pinned) {
        (true, true) => (0.0, 0.0),
        (true, false) => (0.0, 1.0),
        (false, true) => (1.0, 0.0),
        (false, false) => {
            let mass_i = bubbles[i].radius * bubbles[i].radius;
            let mass_j = bubbles[j].radius * bubbles[j].radius;
            let total = mass_i + mass_j;
            if total <= f32::EPSILON {
                (0.5, 0.5)
            } else {
                (mass_j / total, mass_i / total)
            }
        }
    }
}

/// Inverse-distance repulsion between every pair.
pub struct ChargeForce {
    pub strength: f32,
}

impl Force for ChargeForce {
    fn name(&self) -> &'static str {
        "charge"
    }

    fn apply(&self, bubbles: &mut [Bubble], ctx: &ForceContext) {
        let strength = self.strength * ctx.alpha;
        if strength <= 0.0 {
            return;
        }

        let count = bubbles.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (direction, distance) = separation(bubbles, i, j);
                let contact = bubbles[i].radius + bubbles[j].radius + ctx.padding;
                let magnitude = strength * contact * (contact / distance.max(contact * 0.25));
                let (share_i, share_j) = push_shares(bubbles, i, j);

                bubbles[i].velocity += direction * magnitude * share_i;
                bubbles[j].velocity -= direction * magnitude * share_j;
            }
        }
    }
}

/// Pull toward the viewport center, stronger for larger bubbles.
pub struct CenterForce {
    pub strength: f32,
}

impl Force for CenterForce {
    fn name(&self) -> &'static str {
        "center"
    }

    fn apply(&self, bubbles: &mut [Bubble], ctx: &ForceContext) {
        let center = ctx.viewport.center();
        for bubble in bubbles.iter_mut().filter(|bubble| !bubble.pinned) {
            let pull = self.strength * ctx.alpha * bubble.relative_mass(ctx.max_radius);
            bubble.velocity += (center - bubble.pos) * pull;
        }
    }
}

/// Resolves a fraction of every overlap closer than `r_a + r_b + padding`.
pub struct CollisionForce {
    pub strength: f32,
}

impl Force for CollisionForce {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn apply(&self, bubbles: &mut [Bubble], ctx: &ForceContext) {
        let count = bubbles.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let next_i = bubbles[i].pos + bubbles[i].velocity;
                let next_j = bubbles[j].pos + bubbles[j].velocity;
                let delta = next_i - next_j;
                let distance = delta.length();
                let direction = if distance > 0.0001 {
                    delta / distance
                } else {
                    fallback_direction(i, j)
                };

                let min_distance = bubbles[i].radius + bubbles[j].radius + ctx.padding;
                if distance >= min_distance {
                    continue;
                }

                let overlap = (min_distance - distance) * self.strength;
                let (share_i, share_j) = push_shares(bubbles, i, j);
                bubbles[i].velocity += direction * overlap * share_i;
                bubbles[j].velocity -= direction * overlap * share_j;
            }
        }
    }
}

/// Keeps every center inside `[radius + padding, dimension - radius - padding]`.
pub struct BoundaryForce;

impl BoundaryForce {
    fn clamp_axis(position: f32, velocity: &mut f32, low: f32, high: f32) -> f32 {
        if low > high {
            *velocity = 0.0;
            return (low + high) * 0.5;
        }

        if position < low {
            *velocity = 0.0;
            low
        } else if position > high {
            *velocity = 0.0;
            high
        } else {
            position
        }
    }

    pub fn clamp(bubble: &mut Bubble, viewport: Viewport, padding: f32) {
        let inset = bubble.radius + padding;
        let mut velocity = bubble.velocity;
        bubble.pos.x = Self::clamp_axis(
            bubble.pos.x,
            &mut velocity.x,
            inset,
            viewport.width - inset,
        );
        bubble.pos.y = Self::clamp_axis(
            bubble.pos.y,
            &mut velocity.y,
            inset,
            viewport.height - inset,
        );
        bubble.velocity = velocity;
    }
}

impl Force for BoundaryForce {
    fn name(&self) -> &'static str {
        "boundary"
    }

    fn phase(&self) -> ForcePhase {
        ForcePhase::Position
    }

    fn apply(&self, bubbles: &mut [Bubble], ctx: &ForceContext) {
        for bubble in bubbles.iter_mut() {
            Self::clamp(bubble, ctx.viewport, ctx.padding);
        }
    }
}
