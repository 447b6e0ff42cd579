//! Pointer handling on top of published frames. Nothing here touches solver state.

use std::time::{Duration, Instant};

use eframe::egui::Pos2;

use crate::model::Item;
use crate::render::BubbleFrame;

const PRESS_IN: Duration = Duration::from_millis(120);
const PRESSED_SCALE: f32 = 0.92;
const LONG_PRESSED_SCALE: f32 = 1.06;

/// Index of the frame under `point`. Overlapping hits go to the nearest center, then to the
/// frame drawn last.
pub fn hit_test(frames: &[BubbleFrame], point: Pos2) -> Option<usize> {
    hit_test_scaled(frames, point, |_| 1.0)
}

/// Like [`hit_test`], against each radius multiplied by `scale_for(id)` as it is drawn.
pub fn hit_test_scaled(
    frames: &[BubbleFrame],
    point: Pos2,
    scale_for: impl Fn(&str) -> f32,
) -> Option<usize> {
    frames
        .iter()
        .enumerate()
        .filter_map(|(index, frame)| {
            let distance = frame.center().distance(point);
            if distance <= frame.radius * scale_for(frame.id.as_str()) {
                Some((index, distance))
            } else {
                None
            }
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(index, _)| index)
}

#[derive(Clone, Debug, PartialEq)]
pub enum PressState {
    Released,
    Pressed { id: String, since: Instant },
    LongPressed { id: String, since: Instant },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PressEvent {
    Pressed(String),
    LongPressed(String),
}

impl PressEvent {
    pub fn id(&self) -> &str {
        match self {
            Self::Pressed(id) | Self::LongPressed(id) => id,
        }
    }
}

pub struct PressTracker {
    state: PressState,
    long_press: Duration,
}

impl PressTracker {
    pub fn new(long_press: Duration) -> Self {
        Self {
            state: PressState::Released,
            long_press,
        }
    }

    pub fn state(&self) -> &PressState {
        &self.state
    }

    pub fn pointer_down(&mut self, id: Option<String>, now: Instant) {
        self.state = match id {
            Some(id) => PressState::Pressed { id, since: now },
            None => PressState::Released,
        };
    }

    /// Ends the gesture. A release away from the pressed bubble fires nothing.
    pub fn pointer_up(&mut self, released_on: Option<&str>, now: Instant) -> Option<PressEvent> {
        let state = std::mem::replace(&mut self.state, PressState::Released);
        match state {
            PressState::Pressed { id, since } if released_on == Some(id.as_str()) => {
                if now.saturating_duration_since(since) >= self.long_press {
                    Some(PressEvent::LongPressed(id))
                } else {
                    Some(PressEvent::Pressed(id))
                }
            }
            _ => None,
        }
    }

    /// Fires the long press while the pointer is still held.
    pub fn poll(&mut self, now: Instant) -> Option<PressEvent> {
        let PressState::Pressed { id, since } = &self.state else {
            return None;
        };
        if now.saturating_duration_since(*since) < self.long_press {
            return None;
        }

        let (id, since) = (id.clone(), *since);
        self.state = PressState::LongPressed {
            id: id.clone(),
            since,
        };
        Some(PressEvent::LongPressed(id))
    }

    pub fn cancel(&mut self) {
        self.state = PressState::Released;
    }

    /// Visual scale for a bubble: eases in while pressed, swells once long-pressed.
    pub fn scale_for(&self, id: &str, now: Instant) -> f32 {
        match &self.state {
            PressState::Pressed {
                id: pressed,
                since,
            } if pressed == id => {
                let progress = (now.saturating_duration_since(*since).as_secs_f32()
                    / PRESS_IN.as_secs_f32())
                .clamp(0.0, 1.0);
                1.0 - (1.0 - PRESSED_SCALE) * progress
            }
            PressState::LongPressed { id: pressed, .. } if pressed == id => LONG_PRESSED_SCALE,
            _ => 1.0,
        }
    }
}

pub type ItemCallback = Box<dyn FnMut(&Item)>;

/// Host callbacks. They receive the caller's `Item`, never solver state.
#[derive(Default)]
pub struct ItemCallbacks {
    pub on_pressed: Option<ItemCallback>,
    pub on_long_pressed: Option<ItemCallback>,
}

impl ItemCallbacks {
    pub fn dispatch(&mut self, event: &PressEvent, items: &[Item]) -> bool {
        let Some(item) = items.iter().find(|item| item.id == event.id()) else {
            return false;
        };

        let callback = match event {
            PressEvent::Pressed(_) => self.on_pressed.as_mut(),
            PressEvent::LongPressed(_) => self.on_long_pressed.as_mut(),
        };
        match callback {
            Some(callback) => {
                callback(item);
                true
            }
            None => false,
        }
    }
}
