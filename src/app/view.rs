use std::collections::HashSet;
use std::time::Instant;

use bubble_reflect::{LabelFitter, LayoutPhase};
use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::render_utils::{blend_color, color_from_token, dim_color, draw_background, text_color};
use super::{ChartPanel, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Ids whose label matches the search box, or `None` when the search is empty.
    fn search_matches(&self) -> Option<HashSet<String>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        let panel = self.panels.first()?;
        Some(
            panel
                .chart
                .items()
                .iter()
                .filter(|item| fuzzy_match_score(&matcher, &item.label, query).is_some())
                .map(|item| item.id.clone())
                .collect(),
        )
    }

    pub(in crate::app) fn draw_charts(&mut self, ui: &mut Ui) {
        if self.panels.is_empty() {
            ui.label("No chart variants selected.");
            return;
        }

        let matches = self.search_matches();
        let show_frames = self.show_frames;
        let fitter = &self.fitter;
        let count = self.panels.len();
        ui.columns(count, |columns| {
            for (panel, ui) in self.panels.iter_mut().zip(columns.iter_mut()) {
                ui.vertical(|ui| {
                    let stats = panel.chart.stats();
                    ui.horizontal(|ui| {
                        ui.strong(panel.variant.label());
                        ui.label(format!("{:?}", panel.chart.phase()));
                        ui.small(format!(
                            "ticks {}  runs {}  reused {}",
                            stats.ticks, stats.simulated_runs, stats.cache_reuses
                        ));
                    });
                    draw_chart(ui, panel, fitter, matches.as_ref(), show_frames);
                });
            }
        });
    }
}

fn to_screen(rect: Rect, x: f32, y: f32) -> Pos2 {
    rect.min + vec2(x, y)
}

fn handle_pointer(ui: &Ui, rect: Rect, panel: &mut ChartPanel, now: Instant) -> bool {
    let (pressed, released, position) = ui.input(|input| {
        (
            input.pointer.primary_pressed(),
            input.pointer.primary_released(),
            input.pointer.interact_pos(),
        )
    });

    let local = position.map(|position| (position - rect.min).to_pos2());
    if pressed
        && let Some(position) = position
        && rect.contains(position)
        && let Some(local) = local
    {
        panel.chart.pointer_down(local, now);
    }

    if released {
        // Releases outside this chart land far from every bubble.
        let point = local
            .filter(|_| position.is_some_and(|position| rect.contains(position)))
            .unwrap_or(Pos2::new(f32::MIN, f32::MIN));
        panel.chart.pointer_up(point, now);
    }

    ui.input(|input| input.pointer.primary_down())
}

fn draw_chart(
    ui: &mut Ui,
    panel: &mut ChartPanel,
    fitter: &LabelFitter,
    matches: Option<&HashSet<String>>,
    show_frames: bool,
) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    draw_background(&painter, rect);

    let now = Instant::now();
    panel.chart.set_viewport(rect.width(), rect.height());
    let holding = handle_pointer(ui, rect, panel, now);
    panel.chart.frame(now);

    if panel.chart.phase() == LayoutPhase::Settling || holding {
        ui.ctx().request_repaint();
    }

    if panel.chart.phase() == LayoutPhase::Deferred {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "waiting for layout",
            FontId::proportional(13.0),
            Color32::from_gray(140),
        );
        return;
    }

    let hovered = response
        .hover_pos()
        .and_then(|position| panel.chart.frame_at((position - rect.min).to_pos2(), now))
        .map(|frame| frame.id.clone());

    for bubble in panel.chart.paint(fitter, now) {
        let center = to_screen(rect, bubble.center.x, bubble.center.y);
        let mut fill = color_from_token(&bubble.color_token, &bubble.category);
        let is_match = matches.is_none_or(|matches| matches.contains(&bubble.id));
        if !is_match {
            fill = dim_color(fill, 0.35);
        }
        let is_hovered = hovered.as_deref() == Some(bubble.id.as_str());
        if is_hovered {
            fill = blend_color(fill, Color32::WHITE, 0.12);
        }

        painter.circle_filled(center, bubble.radius, fill);
        let outline = if is_hovered {
            Stroke::new(2.0, Color32::from_rgb(245, 245, 245))
        } else {
            Stroke::new(1.0, blend_color(fill, Color32::BLACK, 0.35))
        };
        painter.circle_stroke(center, bubble.radius, outline);

        let line_height = bubble.label.font_size * panel.chart.style().label_rules.line_height;
        let lines = bubble.label.lines.len() as f32;
        let mut y = center.y - (lines - 1.0) * line_height * 0.5;
        let color = if is_match {
            text_color(fill)
        } else {
            dim_color(text_color(fill), 0.6)
        };
        for line in &bubble.label.lines {
            painter.text(
                Pos2::new(center.x, y),
                Align2::CENTER_CENTER,
                line,
                FontId::proportional(bubble.label.font_size),
                color,
            );
            y += line_height;
        }
    }

    if show_frames {
        let padding = panel.chart.config().padding;
        for frame in &panel.chart.snapshot().frames {
            painter.circle_stroke(
                to_screen(rect, frame.x, frame.y),
                frame.radius + padding * 0.5,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 40)),
            );
        }
    }

    if let Some(id) = hovered
        && let Some(item) = panel.chart.items().iter().find(|item| item.id == id)
    {
        response.on_hover_text(format!(
            "{} ({}, weight {})",
            item.label,
            item.category(),
            item.weight
        ));
    }
}
