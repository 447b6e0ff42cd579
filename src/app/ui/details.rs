use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Pressed Item");
        ui.add_space(6.0);

        let Some(selection) = &self.selection else {
            ui.label("Tap a bubble, or hold it for a long press.");
            return;
        };

        let item = &selection.item;
        ui.label(RichText::new(item.label.as_str()).strong());
        ui.small(item.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Category: {}", item.category()));
        ui.label(format!("Weight: {}", item.weight));
        if !item.color_token.is_empty() {
            ui.label(format!("Color token: {}", item.color_token));
        }
        ui.label(format!("Chart: {}", selection.variant.label()));
        ui.label(if selection.long_press {
            "Gesture: long press"
        } else {
            "Gesture: tap"
        });

        ui.separator();
        ui.label(RichText::new("Recent presses").strong());
        egui::ScrollArea::vertical()
            .id_salt("press_history_scroll")
            .max_height(260.0)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in &self.history {
                    let marker = if entry.long_press { "hold" } else { "tap" };
                    ui.label(format!(
                        "{}  [{}, {}]",
                        entry.item.label,
                        entry.variant.label(),
                        marker
                    ));
                }
            });

        ui.separator();
        ui.label(RichText::new("Layout").strong());
        for panel in &self.panels {
            let stats = panel.chart.stats();
            ui.small(format!(
                "{}: {:?}, cache {} entries, forced settles {}, shrunk {} (x{:.2}), stale ticks {}",
                panel.variant.label(),
                panel.chart.phase(),
                panel.chart.cache().len(),
                stats.forced_settles,
                stats.shrunk_settles,
                panel.chart.radius_scale(),
                stats.stale_tokens
            ));
        }
    }
}
