//! Turns solver state into paintable circles and throttles how often it is published.

mod labels;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use eframe::egui::{Pos2, pos2};

use crate::model::{Bubble, Category, Item};

pub use labels::{LabelFitter, LabelLayout, LabelRules, ellipsize};

/// Published position of one bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleFrame {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl BubbleFrame {
    pub fn center(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn contains(&self, point: Pos2) -> bool {
        self.center().distance(point) <= self.radius
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Layout generation that produced this snapshot.
    pub generation: u64,
    pub settled: bool,
    pub frames: Vec<BubbleFrame>,
}

impl Snapshot {
    pub fn from_bubbles(generation: u64, settled: bool, bubbles: &[Bubble]) -> Self {
        Self {
            generation,
            settled,
            frames: bubbles
                .iter()
                .map(|bubble| BubbleFrame {
                    id: bubble.id.clone(),
                    x: bubble.pos.x,
                    y: bubble.pos.y,
                    radius: bubble.radius,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, id: &str) -> Option<&BubbleFrame> {
        self.frames.iter().find(|frame| frame.id == id)
    }
}

/// Caps publishing to one snapshot per interval, independent of the tick rate.
#[derive(Clone, Debug)]
pub struct PublishThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl PublishThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Returns true and records `now` when a publish is due or `force` is set.
    pub fn should_publish(&mut self, now: Instant, force: bool) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due || force {
            self.last = Some(now);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// A circle ready to draw, with its fitted label.
#[derive(Clone, Debug)]
pub struct PaintedBubble {
    pub id: String,
    pub center: Pos2,
    /// Rendered radius, including any press feedback scale.
    pub radius: f32,
    pub color_token: String,
    pub category: Category,
    pub label: LabelLayout,
}

/// Labels and sizes every frame. `scale_for` supplies transient visual scaling per id.
pub fn paint_frames(
    snapshot: &Snapshot,
    items: &[Item],
    fitter: &LabelFitter,
    rules: &LabelRules,
    scale_for: impl Fn(&str) -> f32,
) -> Vec<PaintedBubble> {
    let by_id = items
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect::<HashMap<_, _>>();

    snapshot
        .frames
        .iter()
        .filter_map(|frame| {
            let item = by_id.get(frame.id.as_str())?;
            Some(PaintedBubble {
                id: frame.id.clone(),
                center: frame.center(),
                radius: frame.radius * scale_for(&frame.id),
                color_token: item.color_token.clone(),
                category: item.category(),
                label: fitter.fit(&item.label, frame.radius, rules),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn throttle_publishes_at_most_once_per_interval() {
        let start = Instant::now();
        let mut throttle = PublishThrottle::from_millis(16);
        assert!(throttle.should_publish(start, false));
        assert!(!throttle.should_publish(start + Duration::from_millis(5), false));
        assert!(!throttle.should_publish(start + Duration::from_millis(15), false));
        assert!(throttle.should_publish(start + Duration::from_millis(16), false));
        assert!(throttle.should_publish(start + Duration::from_millis(17), true));
    }

    #[test]
    fn snapshot_mirrors_bubbles() {
        let item = Item::new("calm", "Calm", 2.0);
        let bubble = Bubble::from_item(&item, 12.0, vec2(30.0, 40.0));
        let snapshot = Snapshot::from_bubbles(3, true, &[bubble]);
        assert_eq!(snapshot.generation, 3);
        let frame = snapshot.frame("calm").unwrap();
        assert_eq!((frame.x, frame.y, frame.radius), (30.0, 40.0, 12.0));
        assert!(frame.contains(pos2(38.0, 40.0)));
        assert!(!frame.contains(pos2(43.0, 40.0)));
    }

    #[test]
    fn paint_skips_frames_without_items_and_applies_scale() {
        let items = vec![
            Item::new("a", "Anger", 3.0)
                .with_color("#ff0000")
                .with_category("emotion"),
        ];
        let bubbles = vec![
            Bubble::from_item(&items[0], 20.0, vec2(50.0, 50.0)),
            Bubble::from_item(&Item::new("ghost", "Ghost", 1.0), 10.0, vec2(10.0, 10.0)),
        ];
        let snapshot = Snapshot::from_bubbles(1, false, &bubbles);
        let painted = paint_frames(
            &snapshot,
            &items,
            &LabelFitter::without_dictionary(),
            &LabelRules::default(),
            |id| if id == "a" { 0.5 } else { 1.0 },
        );
        assert_eq!(painted.len(), 1);
        assert_eq!(painted[0].radius, 10.0);
        assert_eq!(painted[0].color_token, "#ff0000");
        assert_eq!(painted[0].category, Category::Emotion);
        assert_eq!(painted[0].label.lines, vec!["Anger".to_owned()]);
    }
}
