//! One chart instance: item set, viewport, solver run lifecycle, settle cache and pointer state.
//!
//! The host drives it from its UI loop. Each animation frame it either calls [`BubbleChart::frame`]
//! or, when ticks are scheduled separately, obtains a [`TickToken`] with
//! [`BubbleChart::schedule_tick`] and hands it back to [`BubbleChart::run_tick`]. Any change to the
//! item set, viewport or pins bumps the generation, so tokens issued earlier are ignored.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use eframe::egui::{Pos2, Vec2, vec2};

use crate::cache::{CacheLookup, LayoutSignature, SettleCache};
use crate::config::{ChartConfig, ChartStyle};
use crate::interaction::{ItemCallback, ItemCallbacks, PressEvent, PressTracker, hit_test_scaled};
use crate::model::{Bubble, Item, RadiusContext, Viewport, bubble_radius};
use crate::physics::{Solver, TickOutcome, clamp_to_viewport, fit_without_overlap, seed_position};
use crate::render::{
    BubbleFrame, LabelFitter, PaintedBubble, PublishThrottle, Snapshot, paint_frames,
};

const RESEED_ALPHA: f32 = 0.5;
const PIN_ALPHA: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
    /// No items, or the chart was torn down.
    Idle,
    /// Items are waiting for a usable viewport.
    Deferred,
    Settling,
    Settled,
}

/// Permission to run one tick of a particular layout generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

impl TickToken {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChartStats {
    /// Solver ticks executed over the chart's lifetime.
    pub ticks: usize,
    pub simulated_runs: usize,
    pub cache_reuses: usize,
    /// Runs that hit the tick budget before motion died down.
    pub forced_settles: usize,
    /// Settles whose radii had to shrink so the set fit without overlap.
    pub shrunk_settles: usize,
    pub stale_tokens: usize,
}

pub struct BubbleChart {
    style: ChartStyle,
    items: Vec<Item>,
    signature: LayoutSignature,
    viewport: Option<Viewport>,
    bubbles: Vec<Bubble>,
    solver: Solver,
    cache: SettleCache,
    phase: LayoutPhase,
    generation: u64,
    throttle: PublishThrottle,
    snapshot: Snapshot,
    pending_publish: bool,
    press: PressTracker,
    callbacks: ItemCallbacks,
    pins: HashMap<String, Vec2>,
    seeded_ids: Vec<String>,
    radius_scale: f32,
    stats: ChartStats,
}

impl Default for BubbleChart {
    fn default() -> Self {
        Self::new(ChartStyle::default())
    }
}

impl BubbleChart {
    pub fn new(style: ChartStyle) -> Self {
        let style = ChartStyle {
            config: style.config.sanitized(),
            ..style
        };
        Self {
            solver: Solver::new(&style.config),
            throttle: PublishThrottle::from_millis(style.config.publish_interval_ms),
            press: PressTracker::new(Duration::from_millis(style.config.long_press_ms)),
            style,
            items: Vec::new(),
            signature: LayoutSignature::default(),
            viewport: None,
            bubbles: Vec::new(),
            cache: SettleCache::new(),
            phase: LayoutPhase::Idle,
            generation: 0,
            snapshot: Snapshot::default(),
            pending_publish: false,
            callbacks: ItemCallbacks::default(),
            pins: HashMap::new(),
            seeded_ids: Vec::new(),
            radius_scale: 1.0,
            stats: ChartStats::default(),
        }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }

    pub fn config(&self) -> &ChartConfig {
        &self.style.config
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> ChartStats {
        self.stats
    }

    pub fn cache(&self) -> &SettleCache {
        &self.cache
    }

    /// Factor applied to every formula radius so the current set fits its viewport.
    pub fn radius_scale(&self) -> f32 {
        self.radius_scale
    }

    /// Ids whose starting position in the current run came from the settle cache.
    pub fn seeded_ids(&self) -> &[String] {
        &self.seeded_ids
    }

    pub fn on_item_pressed(&mut self, callback: impl FnMut(&Item) + 'static) {
        self.callbacks.on_pressed = Some(Box::new(callback) as ItemCallback);
    }

    pub fn on_item_long_pressed(&mut self, callback: impl FnMut(&Item) + 'static) {
        self.callbacks.on_long_pressed = Some(Box::new(callback) as ItemCallback);
    }

    /// Swaps configuration and formulas. Radii change, so cached positions are dropped.
    pub fn set_style(&mut self, style: ChartStyle) {
        let config = style.config.sanitized();
        self.solver = Solver::new(&config);
        self.throttle = PublishThrottle::from_millis(config.publish_interval_ms);
        self.press = PressTracker::new(Duration::from_millis(config.long_press_ms));
        self.style = ChartStyle { config, ..style };
        self.cache.clear();
        self.start_run(1.0);
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        let signature = LayoutSignature::from_items(&items);
        if signature == self.signature && self.phase != LayoutPhase::Idle {
            self.refresh_item_text(items);
            return;
        }

        self.items = items;
        self.signature = signature;
        self.start_run(1.0);
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let viewport = Viewport::new(width, height);
        if self.viewport == Some(viewport) {
            return;
        }
        self.viewport = Some(viewport);
        self.start_run(1.0);
    }

    /// Re-runs layout for the current items. Served from the cache when nothing changed.
    pub fn relayout(&mut self) {
        self.start_run(1.0);
    }

    /// Drops all state, including the cache. Outstanding tick tokens become stale.
    pub fn teardown(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cache.clear();
        self.items.clear();
        self.signature = LayoutSignature::default();
        self.viewport = None;
        self.bubbles.clear();
        self.pins.clear();
        self.seeded_ids.clear();
        self.radius_scale = 1.0;
        self.press.cancel();
        self.throttle.reset();
        self.snapshot = Snapshot::default();
        self.pending_publish = false;
        self.phase = LayoutPhase::Idle;
        tracing::debug!(generation = self.generation, "bubble chart torn down");
    }

    fn refresh_item_text(&mut self, items: Vec<Item>) {
        let by_id = items
            .iter()
            .map(|item| (item.id.as_str(), item))
            .collect::<HashMap<_, _>>();
        for bubble in &mut self.bubbles {
            if let Some(item) = by_id.get(bubble.id.as_str()) {
                bubble.label.clone_from(&item.label);
                bubble.color_token.clone_from(&item.color_token);
            }
        }
        self.items = items;
    }

    fn radius_context(&self, viewport: Viewport) -> RadiusContext {
        let config = &self.style.config;
        RadiusContext {
            viewport,
            item_count: self.items.len(),
            fill_ratio: config.fill_ratio,
            padding: config.padding,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
        }
    }

    fn start_run(&mut self, alpha: f32) {
        self.generation = self.generation.wrapping_add(1);
        self.throttle.reset();
        self.seeded_ids.clear();

        if self.items.is_empty() {
            self.bubbles.clear();
            self.phase = LayoutPhase::Idle;
            self.pending_publish = true;
            tracing::debug!(generation = self.generation, "empty item set");
            return;
        }

        let Some(viewport) = self.viewport.filter(|viewport| viewport.is_valid()) else {
            self.phase = LayoutPhase::Deferred;
            self.pending_publish = false;
            tracing::debug!(
                items = self.items.len(),
                "viewport not laid out yet, deferring layout"
            );
            return;
        };

        let padding = self.style.config.padding;
        let radius_ctx = self.radius_context(viewport);
        let radii = self
            .items
            .iter()
            .map(|item| bubble_radius(item.weight, &radius_ctx, self.style.radius_fn))
            .collect::<Vec<_>>();

        let lookup = self.cache.lookup(&self.signature);
        let scale = self
            .cache
            .settled_viewport()
            .map(|settled| vec2(viewport.width / settled.width, viewport.height / settled.height))
            .unwrap_or(vec2(1.0, 1.0));

        if let CacheLookup::Reuse { settled_viewport } = lookup {
            let rescaled = settled_viewport != viewport;
            let radius_scale = if rescaled {
                1.0
            } else {
                self.cache.radius_scale()
            };
            self.bubbles = self
                .items
                .iter()
                .zip(&radii)
                .map(|(item, radius)| {
                    let cached = self.cache.get(&item.id).unwrap_or(viewport.center());
                    let mut bubble = Bubble::from_item(item, radius * radius_scale, cached * scale);
                    self.apply_pin(&mut bubble);
                    bubble
                })
                .collect();
            self.radius_scale = radius_scale;

            if rescaled {
                self.fit_bubbles(viewport);
            } else {
                clamp_to_viewport(&mut self.bubbles, viewport, padding);
            }
            self.cache.commit(
                self.signature.clone(),
                viewport,
                &self.bubbles,
                self.radius_scale,
            );
            self.seeded_ids = self.items.iter().map(|item| item.id.clone()).collect();
            self.phase = LayoutPhase::Settled;
            self.pending_publish = true;
            self.stats.cache_reuses += 1;
            tracing::debug!(items = self.items.len(), rescaled, "reusing settled layout");
            return;
        }

        let previous = std::mem::take(&mut self.bubbles)
            .into_iter()
            .map(|bubble| (bubble.id, bubble.pos))
            .collect::<HashMap<_, _>>();

        let item_count = self.items.len();
        let mut bubbles = Vec::with_capacity(item_count);
        let mut seeded_ids = Vec::new();
        for (index, (item, radius)) in self.items.iter().zip(&radii).enumerate() {
            let cached = self.cache.get(&item.id).map(|position| position * scale);
            if cached.is_some() {
                seeded_ids.push(item.id.clone());
            }
            let position = cached
                .or_else(|| previous.get(&item.id).copied())
                .unwrap_or_else(|| seed_position(index, item_count, &item.id, viewport));
            let mut bubble = Bubble::from_item(item, *radius, position);
            self.apply_pin(&mut bubble);
            bubbles.push(bubble);
        }

        if lookup == CacheLookup::Changed {
            self.cache.clear();
        }

        clamp_to_viewport(&mut bubbles, viewport, padding);
        let alpha = if seeded_ids.len() == item_count {
            alpha.min(RESEED_ALPHA)
        } else {
            alpha
        };

        tracing::debug!(
            items = item_count,
            seeded = seeded_ids.len(),
            generation = self.generation,
            "starting bubble layout"
        );

        self.bubbles = bubbles;
        self.seeded_ids = seeded_ids;
        self.radius_scale = 1.0;
        self.solver.restart(alpha);
        self.phase = LayoutPhase::Settling;
        self.pending_publish = true;
        self.stats.simulated_runs += 1;
    }

    fn apply_pin(&self, bubble: &mut Bubble) {
        if let Some(position) = self.pins.get(&bubble.id) {
            bubble.pos = *position;
            bubble.pinned = true;
        }
    }

    pub fn schedule_tick(&self) -> Option<TickToken> {
        (self.phase == LayoutPhase::Settling).then_some(TickToken {
            generation: self.generation,
        })
    }

    /// Runs one tick if `token` is still current. Returns a snapshot when one is published.
    pub fn run_tick(&mut self, token: TickToken, now: Instant) -> Option<Snapshot> {
        if token.generation != self.generation || self.phase != LayoutPhase::Settling {
            self.stats.stale_tokens += 1;
            tracing::trace!(
                token = token.generation,
                current = self.generation,
                "ignoring stale tick"
            );
            return None;
        }
        let viewport = self.viewport?;

        let outcome = self.solver.tick(&mut self.bubbles, viewport, self.style.config.padding);
        self.stats.ticks += 1;

        if outcome.is_finished() {
            self.finish_run(viewport, outcome);
            return self.publish(now, true);
        }

        let force = self.pending_publish;
        self.publish(now, force)
    }

    fn finish_run(&mut self, viewport: Viewport, outcome: TickOutcome) {
        self.fit_bubbles(viewport);
        for bubble in &mut self.bubbles {
            bubble.velocity = Vec2::ZERO;
        }

        let forced = matches!(outcome, TickOutcome::BudgetExhausted { .. });
        if forced {
            self.stats.forced_settles += 1;
        }

        self.cache.commit(
            self.signature.clone(),
            viewport,
            &self.bubbles,
            self.radius_scale,
        );
        self.phase = LayoutPhase::Settled;
        tracing::debug!(
            ticks = self.solver.ticks(),
            energy = outcome.energy(),
            radius_scale = self.radius_scale,
            forced,
            "bubble layout settled"
        );
    }

    /// Separates the bubbles, shrinking them when the set cannot fit at its current size.
    fn fit_bubbles(&mut self, viewport: Viewport) {
        let fit = fit_without_overlap(&mut self.bubbles, viewport, self.style.config.padding);
        if fit.radius_scale < 1.0 {
            self.radius_scale *= fit.radius_scale;
            self.stats.shrunk_settles += 1;
            tracing::debug!(
                items = self.bubbles.len(),
                shrink = fit.radius_scale,
                "radii shrunk to fit viewport"
            );
        }
        if !fit.resolved {
            tracing::warn!(items = self.bubbles.len(), "pinned bubbles still overlap");
        }
    }

    fn publish(&mut self, now: Instant, force: bool) -> Option<Snapshot> {
        if !self.throttle.should_publish(now, force) {
            return None;
        }

        let settled = matches!(self.phase, LayoutPhase::Settled | LayoutPhase::Idle);
        self.snapshot = Snapshot::from_bubbles(self.generation, settled, &self.bubbles);
        self.pending_publish = false;
        Some(self.snapshot.clone())
    }

    /// One animation frame: fires a pending long press, advances the solver, publishes.
    pub fn frame(&mut self, now: Instant) -> Option<Snapshot> {
        if let Some(event) = self.press.poll(now) {
            self.callbacks.dispatch(&event, &self.items);
        }

        match self.schedule_tick() {
            Some(token) => self.run_tick(token, now),
            None if self.pending_publish => self.publish(now, true),
            None => None,
        }
    }

    /// Ticks synchronously until the run settles. Returns the last published snapshot.
    pub fn run_to_settle(&mut self, now: Instant) -> Option<Snapshot> {
        let mut last = None;
        while let Some(token) = self.schedule_tick() {
            if let Some(snapshot) = self.run_tick(token, now) {
                last = Some(snapshot);
            }
        }
        if self.pending_publish {
            last = self.publish(now, true);
        }
        last
    }

    /// Fixes a bubble in place and reheats the layout around it.
    pub fn pin(&mut self, id: &str, x: f32, y: f32) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }

        self.pins.insert(id.to_owned(), vec2(x, y));
        if let Some(bubble) = self.bubbles.iter_mut().find(|bubble| bubble.id == id) {
            bubble.pos = vec2(x, y);
            bubble.velocity = Vec2::ZERO;
            bubble.pinned = true;
        }
        self.reheat();
        true
    }

    pub fn unpin(&mut self, id: &str) -> bool {
        if self.pins.remove(id).is_none() {
            return false;
        }
        if let Some(bubble) = self.bubbles.iter_mut().find(|bubble| bubble.id == id) {
            bubble.pinned = false;
        }
        self.reheat();
        true
    }

    fn reheat(&mut self) {
        if !matches!(self.phase, LayoutPhase::Settling | LayoutPhase::Settled) {
            return;
        }
        let Some(viewport) = self.viewport else {
            return;
        };

        clamp_to_viewport(&mut self.bubbles, viewport, self.style.config.padding);
        for bubble in self.bubbles.iter().filter(|bubble| bubble.pinned) {
            self.pins.insert(bubble.id.clone(), bubble.pos);
        }
        self.generation = self.generation.wrapping_add(1);
        self.solver.restart(PIN_ALPHA);
        self.phase = LayoutPhase::Settling;
        self.pending_publish = true;
        self.stats.simulated_runs += 1;
    }

    /// Published frame under `point`, tested against the radius as currently drawn.
    pub fn frame_at(&self, point: Pos2, now: Instant) -> Option<&BubbleFrame> {
        let scale_for = |id: &str| self.press.scale_for(id, now);
        hit_test_scaled(&self.snapshot.frames, point, scale_for)
            .map(|index| &self.snapshot.frames[index])
    }

    /// Starts a press on whatever bubble is drawn under `point`.
    pub fn pointer_down(&mut self, point: Pos2, now: Instant) {
        let id = self.frame_at(point, now).map(|frame| frame.id.clone());
        self.press.pointer_down(id, now);
    }

    /// Finishes a press and invokes the matching callback with the caller's item.
    pub fn pointer_up(&mut self, point: Pos2, now: Instant) -> Option<PressEvent> {
        let id = self.frame_at(point, now).map(|frame| frame.id.clone());
        let event = self.press.pointer_up(id.as_deref(), now)?;
        self.callbacks.dispatch(&event, &self.items);
        Some(event)
    }

    pub fn cancel_press(&mut self) {
        self.press.cancel();
    }

    pub fn press_scale(&self, id: &str, now: Instant) -> f32 {
        self.press.scale_for(id, now)
    }

    pub fn paint(&self, fitter: &LabelFitter, now: Instant) -> Vec<PaintedBubble> {
        paint_frames(
            &self.snapshot,
            &self.items,
            fitter,
            &self.style.label_rules,
            |id| self.press.scale_for(id, now),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eframe::egui::pos2;

    use super::*;

    fn trio() -> Vec<Item> {
        vec![
            Item::new("a", "Anxious", 9.0).with_category("emotion"),
            Item::new("b", "Hopeful", 3.0).with_category("emotion"),
            Item::new("c", "Tired", 1.0).with_category("emotion"),
        ]
    }

    #[test]
    fn new_chart_is_idle() {
        let chart = BubbleChart::default();
        assert_eq!(chart.phase(), LayoutPhase::Idle);
        assert!(chart.schedule_tick().is_none());
        assert!(chart.snapshot().is_empty());
    }

    #[test]
    fn items_without_viewport_are_deferred() {
        let mut chart = BubbleChart::default();
        chart.set_items(trio());
        assert_eq!(chart.phase(), LayoutPhase::Deferred);
        assert!(chart.frame(Instant::now()).is_none());

        chart.set_viewport(0.0, 0.0);
        assert_eq!(chart.phase(), LayoutPhase::Deferred);

        chart.set_viewport(110.0, 110.0);
        assert_eq!(chart.phase(), LayoutPhase::Settling);
    }

    #[test]
    fn stale_token_is_ignored() {
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        let token = chart.schedule_tick().unwrap();

        chart.set_viewport(240.0, 200.0);
        assert!(chart.run_tick(token, Instant::now()).is_none());
        assert_eq!(chart.stats().stale_tokens, 1);
        assert_eq!(chart.stats().ticks, 0);
    }

    #[test]
    fn teardown_invalidates_pending_ticks() {
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        let token = chart.schedule_tick().unwrap();
        chart.teardown();

        assert!(chart.run_tick(token, Instant::now()).is_none());
        assert_eq!(chart.phase(), LayoutPhase::Idle);
        assert!(chart.cache().is_empty());
        assert!(chart.items().is_empty());
    }

    #[test]
    fn first_tick_publishes_immediately_then_throttles() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(300.0, 300.0);
        chart.set_items(trio());

        assert!(chart.frame(start).is_some());
        assert!(chart.frame(start + Duration::from_millis(4)).is_none());
        assert!(chart.frame(start + Duration::from_millis(20)).is_some());
    }

    #[test]
    fn label_change_does_not_restart() {
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        chart.run_to_settle(Instant::now());
        let generation = chart.generation();

        let mut renamed = trio();
        renamed[0].label = "Very anxious".to_owned();
        chart.set_items(renamed);
        assert_eq!(chart.generation(), generation);
        assert_eq!(chart.phase(), LayoutPhase::Settled);
        assert_eq!(chart.items()[0].label, "Very anxious");
    }

    #[test]
    fn tap_invokes_callback_without_touching_layout() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        chart.run_to_settle(start);

        let pressed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pressed);
        chart.on_item_pressed(move |item| sink.borrow_mut().push(item.clone()));

        let frame = chart.snapshot().frame("b").unwrap().clone();
        let generation = chart.generation();
        let ticks = chart.stats().ticks;

        chart.pointer_down(frame.center(), start);
        let event = chart.pointer_up(frame.center(), start + Duration::from_millis(80));

        assert_eq!(event, Some(PressEvent::Pressed("b".to_owned())));
        assert_eq!(pressed.borrow().as_slice(), &trio()[1..2]);
        assert_eq!(chart.generation(), generation);
        assert_eq!(chart.phase(), LayoutPhase::Settled);
        assert!(chart.frame(start + Duration::from_millis(100)).is_none());
        assert_eq!(chart.stats().ticks, ticks);
    }

    #[test]
    fn long_press_fires_from_frame_poll() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        chart.run_to_settle(start);

        let long_pressed = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = Rc::clone(&long_pressed);
        chart.on_item_long_pressed(move |item| sink.borrow_mut().push(item.id.clone()));

        let center = chart.snapshot().frame("a").unwrap().center();
        chart.pointer_down(center, start);
        chart.frame(start + Duration::from_millis(700));
        assert_eq!(long_pressed.borrow().as_slice(), ["a".to_owned()]);
        assert!(chart.press_scale("a", start + Duration::from_millis(700)) > 1.0);
        assert_eq!(chart.pointer_up(center, start + Duration::from_millis(800)), None);
    }

    #[test]
    fn pin_holds_position_and_reheats() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(240.0, 240.0);
        chart.set_items(trio());
        chart.run_to_settle(start);
        let generation = chart.generation();

        assert!(chart.pin("c", 40.0, 40.0));
        assert_eq!(chart.phase(), LayoutPhase::Settling);
        assert!(chart.generation() > generation);
        chart.run_to_settle(start);

        let frame = chart.snapshot().frame("c").unwrap();
        assert_eq!((frame.x, frame.y), (40.0, 40.0));
        assert!(!chart.pin("missing", 1.0, 1.0));
        assert!(chart.unpin("c"));
        assert!(!chart.unpin("c"));
    }

    #[test]
    fn paint_uses_published_frames() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(220.0, 220.0);
        chart.set_items(trio());
        chart.run_to_settle(start);

        let painted = chart.paint(&LabelFitter::without_dictionary(), start);
        assert_eq!(painted.len(), 3);
        assert!(painted.iter().all(|bubble| !bubble.label.lines.is_empty()));
        assert!(chart.snapshot().settled);
    }

    #[test]
    fn release_on_rim_of_shrunken_bubble_misses() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        chart.run_to_settle(start);

        let frame = chart.snapshot().frame("a").unwrap().clone();
        let rim = frame.center() + vec2(frame.radius * 0.97, 0.0);
        let inner = frame.center() + vec2(frame.radius * 0.5, 0.0);
        let held = start + Duration::from_millis(200);
        assert_eq!(chart.frame_at(rim, start).map(|hit| hit.id.as_str()), Some("a"));

        chart.pointer_down(frame.center(), start);
        assert!(chart.frame_at(rim, held).is_none());
        assert_eq!(chart.pointer_up(rim, held), None);

        chart.pointer_down(frame.center(), start);
        assert_eq!(chart.pointer_up(inner, held), Some(PressEvent::Pressed("a".to_owned())));
    }

    #[test]
    fn pointer_outside_bubbles_fires_nothing() {
        let start = Instant::now();
        let mut chart = BubbleChart::default();
        chart.set_viewport(200.0, 200.0);
        chart.set_items(trio());
        chart.run_to_settle(start);

        chart.pointer_down(pos2(1.0, 1.0), start);
        assert_eq!(chart.pointer_up(pos2(1.0, 1.0), start), None);
    }
}
