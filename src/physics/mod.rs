//! Iterative force relaxation for a small set of circles inside a fixed viewport.

mod forces;

use eframe::egui::{Vec2, vec2};

use crate::config::ChartConfig;
use crate::model::{Bubble, Viewport};
use crate::util::stable_pair;

pub use forces::{
    BoundaryForce, CenterForce, ChargeForce, CollisionForce, Force, ForceContext, ForcePhase,
};

const ALPHA_COOLING: f32 = 0.985;
const ALPHA_FLOOR: f32 = 0.05;
const QUIET_TICKS_TO_SETTLE: usize = 3;
const MAX_SPEED_FRACTION: f32 = 0.04;
const RESOLVE_SLACK: f32 = 0.01;
pub const RESOLVE_PASSES: usize = 800;
const SHRINK_STEP: f32 = 0.95;
const MAX_SHRINKS: usize = 40;
const GOLDEN_ANGLE: f32 = 2.399_963_2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    Moving { energy: f32 },
    /// Mean kinetic energy stayed below the threshold for several consecutive ticks.
    Converged { energy: f32 },
    /// Tick budget ran out first; positions are used as they are.
    BudgetExhausted { energy: f32 },
}

impl TickOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Moving { .. })
    }

    pub fn energy(self) -> f32 {
        match self {
            Self::Moving { energy }
            | Self::Converged { energy }
            | Self::BudgetExhausted { energy } => energy,
        }
    }
}

pub struct Solver {
    forces: Vec<Box<dyn Force>>,
    velocity_decay: f32,
    energy_threshold: f32,
    max_ticks: usize,
    alpha: f32,
    ticks: usize,
    quiet_ticks: usize,
}

impl Solver {
    pub fn new(config: &ChartConfig) -> Self {
        let forces: Vec<Box<dyn Force>> = vec![
            Box::new(ChargeForce {
                strength: config.charge_strength,
            }),
            Box::new(CenterForce {
                strength: config.center_force,
            }),
            Box::new(CollisionForce {
                strength: config.collision_strength,
            }),
            Box::new(BoundaryForce),
        ];
        Self::with_forces(config, forces)
    }

    pub fn with_forces(config: &ChartConfig, forces: Vec<Box<dyn Force>>) -> Self {
        let config = config.sanitized();
        Self {
            forces,
            velocity_decay: config.velocity_decay,
            energy_threshold: config.energy_threshold,
            max_ticks: config.max_ticks,
            alpha: 1.0,
            ticks: 0,
            quiet_ticks: 0,
        }
    }

    /// Starts a new run. Lower `alpha` reheats gently around an existing layout.
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(ALPHA_FLOOR, 1.0);
        self.ticks = 0;
        self.quiet_ticks = 0;
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn force_names(&self) -> Vec<&'static str> {
        self.forces.iter().map(|force| force.name()).collect()
    }

    pub fn tick(
        &mut self,
        bubbles: &mut [Bubble],
        viewport: Viewport,
        padding: f32,
    ) -> TickOutcome {
        self.ticks += 1;
        let ctx = ForceContext::new(viewport, padding, bubbles).with_alpha(self.alpha);

        for force in &self.forces {
            if force.phase() == ForcePhase::Velocity {
                force.apply(bubbles, &ctx);
            }
        }

        let max_speed = (viewport.min_dimension() * MAX_SPEED_FRACTION).max(1.0);
        let max_speed_sq = max_speed * max_speed;
        for bubble in bubbles.iter_mut() {
            if bubble.pinned {
                bubble.velocity = Vec2::ZERO;
                continue;
            }

            let speed_sq = bubble.velocity.length_sq();
            if speed_sq > max_speed_sq {
                bubble.velocity *= max_speed / speed_sq.sqrt();
            }
            bubble.pos += bubble.velocity;
            bubble.velocity *= self.velocity_decay;
        }

        for force in &self.forces {
            if force.phase() == ForcePhase::Position {
                force.apply(bubbles, &ctx);
            }
        }

        self.alpha = (self.alpha * ALPHA_COOLING).max(ALPHA_FLOOR);

        let energy = mean_kinetic_energy(bubbles);
        if energy < self.energy_threshold {
            self.quiet_ticks += 1;
        } else {
            self.quiet_ticks = 0;
        }

        if self.quiet_ticks >= QUIET_TICKS_TO_SETTLE {
            TickOutcome::Converged { energy }
        } else if self.ticks >= self.max_ticks {
            TickOutcome::BudgetExhausted { energy }
        } else {
            TickOutcome::Moving { energy }
        }
    }
}

/// Mean `½|v|²` over the bubbles that are free to move.
pub fn mean_kinetic_energy(bubbles: &[Bubble]) -> f32 {
    let mut total = 0.0;
    let mut count = 0usize;
    for bubble in bubbles.iter().filter(|bubble| !bubble.pinned) {
        total += 0.5 * bubble.velocity.length_sq();
        count += 1;
    }

    if count == 0 { 0.0 } else { total / count as f32 }
}

pub fn clamp_to_viewport(bubbles: &mut [Bubble], viewport: Viewport, padding: f32) {
    for bubble in bubbles.iter_mut() {
        BoundaryForce::clamp(bubble, viewport, padding);
    }
}

/// Number of pairs closer than `r_a + r_b + padding - epsilon`.
pub fn overlapping_pairs(bubbles: &[Bubble], padding: f32, epsilon: f32) -> usize {
    let mut overlaps = 0;
    for i in 0..bubbles.len() {
        for j in (i + 1)..bubbles.len() {
            let distance = (bubbles[i].pos - bubbles[j].pos).length();
            if distance < bubbles[i].radius + bubbles[j].radius + padding - epsilon {
                overlaps += 1;
            }
        }
    }
    overlaps
}

/// Projects positions apart until no pair overlaps, clamping to the viewport after each pass.
/// Returns false when residual overlap remains after `max_passes`.
pub fn resolve_overlaps(
    bubbles: &mut [Bubble],
    viewport: Viewport,
    padding: f32,
    max_passes: usize,
) -> bool {
    let count = bubbles.len();
    clamp_to_viewport(bubbles, viewport, padding);

    for _ in 0..max_passes {
        let mut moved = false;
        for i in 0..count {
            for j in (i + 1)..count {
                if bubbles[i].pinned && bubbles[j].pinned {
                    continue;
                }

                let delta = bubbles[i].pos - bubbles[j].pos;
                let distance = delta.length();
                let min_distance = bubbles[i].radius + bubbles[j].radius + padding;
                if distance >= min_distance {
                    continue;
                }

                let direction = if distance > 0.0001 {
                    delta / distance
                } else {
                    let angle = ((i as f32) * 0.618_034 + (j as f32) * 0.414_214)
                        * std::f32::consts::TAU;
                    vec2(angle.cos(), angle.sin())
                };
                let correction = min_distance - distance + RESOLVE_SLACK;
                let (share_i, share_j) = match (bubbles[i].pinned, bubbles[j].pinned) {
                    (true, _) => (0.0, 1.0),
                    (_, true) => (1.0, 0.0),
                    _ => {
                        let mass_i = bubbles[i].radius * bubbles[i].radius;
                        let mass_j = bubbles[j].radius * bubbles[j].radius;
                        (mass_j / (mass_i + mass_j), mass_i / (mass_i + mass_j))
                    }
                };

                bubbles[i].pos += direction * correction * share_i;
                bubbles[j].pos -= direction * correction * share_j;
                moved = true;
            }
        }

        clamp_to_viewport(bubbles, viewport, padding);
        if !moved {
            return true;
        }
    }

    overlapping_pairs(bubbles, padding, 0.001) == 0
}

/// Result of [`fit_without_overlap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fit {
    /// Factor every radius was multiplied by. 1 when the set fit as sized.
    pub radius_scale: f32,
    pub resolved: bool,
}

/// Resolves overlaps, shrinking all radii uniformly whenever the set does not fit the viewport.
/// Relative sizes are preserved.
pub fn fit_without_overlap(bubbles: &mut [Bubble], viewport: Viewport, padding: f32) -> Fit {
    let radii = bubbles.iter().map(|bubble| bubble.radius).collect::<Vec<_>>();
    let mut radius_scale = 1.0;
    for _ in 0..MAX_SHRINKS {
        if resolve_overlaps(bubbles, viewport, padding, RESOLVE_PASSES) {
            return Fit {
                radius_scale,
                resolved: true,
            };
        }
        radius_scale *= SHRINK_STEP;
        for (bubble, radius) in bubbles.iter_mut().zip(&radii) {
            bubble.radius = radius * radius_scale;
        }
    }

    Fit {
        radius_scale,
        resolved: resolve_overlaps(bubbles, viewport, padding, RESOLVE_PASSES),
    }
}

/// Initial position for an item with no cached position: a sunflower spiral around the
/// viewport center with a small per-id jitter.
pub fn seed_position(index: usize, item_count: usize, id: &str, viewport: Viewport) -> Vec2 {
    let spacing = viewport.min_dimension() * 0.45 / ((item_count.max(1) as f32) + 0.5).sqrt();
    let (jx, jy) = stable_pair(id);
    let distance = spacing * ((index as f32) + 0.5).sqrt();
    let angle = (index as f32) * GOLDEN_ANGLE;
    viewport.center() + vec2(angle.cos(), angle.sin()) * distance + vec2(jx, jy) * spacing * 0.15
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn bubbles_at(entries: &[(&str, f32, f32, f32)]) -> Vec<Bubble> {
        entries
            .iter()
            .map(|(id, radius, x, y)| {
                Bubble::from_item(&Item::new(*id, *id, 1.0), *radius, vec2(*x, *y))
            })
            .collect()
    }

    #[test]
    fn single_bubble_settles_at_center() {
        let viewport = Viewport::new(160.0, 120.0);
        let mut bubbles = bubbles_at(&[("solo", 20.0, 30.0, 30.0)]);
        let mut solver = Solver::new(&ChartConfig::default());

        let mut outcome = TickOutcome::Moving { energy: 0.0 };
        while !outcome.is_finished() {
            outcome = solver.tick(&mut bubbles, viewport, 3.0);
        }

        assert!(matches!(outcome, TickOutcome::Converged { .. }));
        assert!((bubbles[0].pos - viewport.center()).length() < 3.0);
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let config = ChartConfig {
            max_ticks: 2,
            ..ChartConfig::default()
        };
        let viewport = Viewport::new(200.0, 200.0);
        let mut bubbles = bubbles_at(&[("a", 20.0, 20.0, 20.0), ("b", 20.0, 180.0, 180.0)]);
        let mut solver = Solver::new(&config);
        assert!(matches!(solver.tick(&mut bubbles, viewport, 3.0), TickOutcome::Moving { .. }));
        assert!(matches!(
            solver.tick(&mut bubbles, viewport, 3.0),
            TickOutcome::BudgetExhausted { .. }
        ));
        assert_eq!(solver.ticks(), 2);
    }

    #[test]
    fn pinned_bubbles_stay_put() {
        let viewport = Viewport::new(200.0, 200.0);
        let mut bubbles = bubbles_at(&[("a", 20.0, 40.0, 40.0), ("b", 20.0, 60.0, 40.0)]);
        bubbles[0].pinned = true;
        let mut solver = Solver::new(&ChartConfig::default());
        for _ in 0..50 {
            solver.tick(&mut bubbles, viewport, 3.0);
        }
        assert_eq!(bubbles[0].pos, vec2(40.0, 40.0));
        assert!((bubbles[1].pos - bubbles[0].pos).length() >= 43.0 - 0.5);
    }

    #[test]
    fn resolve_overlaps_separates_stack() {
        let viewport = Viewport::new(200.0, 200.0);
        let mut bubbles = bubbles_at(&[
            ("a", 20.0, 100.0, 100.0),
            ("b", 15.0, 100.0, 100.0),
            ("c", 10.0, 101.0, 99.0),
        ]);
        assert!(resolve_overlaps(&mut bubbles, viewport, 3.0, RESOLVE_PASSES));
        assert_eq!(overlapping_pairs(&bubbles, 3.0, 0.001), 0);
    }

    #[test]
    fn overcrowded_set_shrinks_uniformly_until_it_fits() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut bubbles = (0..12)
            .map(|index| {
                let id = format!("b{index}");
                let radius = if index == 0 { 24.0 } else { 16.0 };
                let x = 30.0 + (index % 4) as f32 * 12.0;
                let y = 30.0 + (index / 4) as f32 * 12.0;
                Bubble::from_item(&Item::new(id.clone(), id, 1.0), radius, vec2(x, y))
            })
            .collect::<Vec<_>>();

        let fit = fit_without_overlap(&mut bubbles, viewport, 4.0);
        assert!(fit.resolved);
        assert!(fit.radius_scale < 1.0);
        assert_eq!(overlapping_pairs(&bubbles, 4.0, 0.001), 0);
        assert!((bubbles[0].radius / bubbles[1].radius - 1.5).abs() < 1e-4);
        assert!((bubbles[1].radius - 16.0 * fit.radius_scale).abs() < 1e-3);
    }

    #[test]
    fn roomy_set_keeps_its_radii() {
        let viewport = Viewport::new(200.0, 200.0);
        let mut bubbles = bubbles_at(&[("a", 20.0, 100.0, 100.0), ("b", 15.0, 104.0, 100.0)]);
        let fit = fit_without_overlap(&mut bubbles, viewport, 3.0);
        assert_eq!(fit.radius_scale, 1.0);
        assert!(fit.resolved);
        assert_eq!(bubbles[0].radius, 20.0);
    }

    #[test]
    fn alpha_cools_to_floor() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut bubbles = bubbles_at(&[("a", 10.0, 50.0, 50.0)]);
        let mut solver = Solver::new(&ChartConfig {
            max_ticks: 1_000,
            ..ChartConfig::default()
        });
        for _ in 0..400 {
            solver.tick(&mut bubbles, viewport, 3.0);
        }
        assert!((solver.alpha() - ALPHA_FLOOR).abs() < 1e-6);
        solver.restart(0.3);
        assert!((solver.alpha() - 0.3).abs() < 1e-6);
        assert_eq!(solver.ticks(), 0);
    }

    #[test]
    fn seed_positions_stay_near_center_and_differ() {
        let viewport = Viewport::new(110.0, 110.0);
        let first = seed_position(0, 3, "a", viewport);
        let second = seed_position(1, 3, "b", viewport);
        assert!((first - viewport.center()).length() < 30.0);
        assert!((first - second).length() > 1.0);
    }

    #[test]
    fn default_stack_order() {
        let solver = Solver::new(&ChartConfig::default());
        assert_eq!(solver.force_names(), vec!["charge", "center", "collision", "boundary"]);
    }
}
