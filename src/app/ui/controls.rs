use bubble_reflect::ChartConfig;
use bubble_reflect::model::MAX_FILL_RATIO;
use eframe::egui::{self, Ui};

use super::super::ViewModel;

fn slider_f32(ui: &mut Ui, value: &mut f32, min: f32, max: f32, label: &str) -> bool {
    ui.add(egui::Slider::new(value, min..=max).text(label)).changed()
}

impl ViewModel {
    fn load_draft(&mut self) {
        if let Some(panel) = self.panels.get(self.edit_panel) {
            self.draft = panel.chart.config().clone();
        }
    }

    fn apply_draft(&mut self) {
        let Some(panel) = self.panels.get_mut(self.edit_panel) else {
            return;
        };
        let style = panel.chart.style().clone().with_config(self.draft.clone());
        panel.chart.set_style(style);
        self.draft = panel.chart.config().clone();
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Controls");
        ui.add_space(6.0);

        ui.label("Search labels");
        ui.text_edit_singleline(&mut self.search);
        ui.checkbox(&mut self.show_frames, "Show padding outlines");

        ui.separator();
        ui.label("Chart");
        let selected_label = self
            .panels
            .get(self.edit_panel)
            .map(|panel| panel.variant.label())
            .unwrap_or("none");
        let mut edit_panel = self.edit_panel;
        egui::ComboBox::from_id_salt("edit_panel")
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                for (index, panel) in self.panels.iter().enumerate() {
                    ui.selectable_value(&mut edit_panel, index, panel.variant.label());
                }
            });
        if edit_panel != self.edit_panel {
            self.edit_panel = edit_panel;
            self.load_draft();
        }

        ui.separator();
        ui.label("Forces");
        let draft = &mut self.draft;
        slider_f32(ui, &mut draft.center_force, 0.0, 0.3, "center force");
        slider_f32(ui, &mut draft.charge_strength, 0.0, 0.1, "charge");
        slider_f32(ui, &mut draft.collision_strength, 0.05, 1.0, "collision");
        slider_f32(
            ui,
            &mut draft.velocity_decay,
            0.0,
            0.95,
            "velocity retention",
        );

        ui.separator();
        ui.label("Sizing");
        slider_f32(ui, &mut draft.padding, 0.0, 16.0, "padding");
        slider_f32(
            ui,
            &mut draft.fill_ratio,
            0.05,
            MAX_FILL_RATIO,
            "fill ratio",
        );
        let mut limit_max = draft.max_radius.is_some();
        if ui.checkbox(&mut limit_max, "Cap radius").changed() {
            draft.max_radius = limit_max.then_some(48.0);
        }
        if let Some(max_radius) = draft.max_radius.as_mut() {
            slider_f32(ui, max_radius, 4.0, 160.0, "max radius");
        }

        ui.separator();
        ui.label("Termination");
        ui.add(
            egui::Slider::new(&mut draft.energy_threshold, 0.0001..=0.05)
                .logarithmic(true)
                .text("energy threshold"),
        );
        ui.add(
            egui::Slider::new(&mut draft.max_ticks, 10..=2_000)
                .text("max ticks"),
        );

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                self.apply_draft();
            }
            if ui.button("Preset").clicked() {
                if let Some(panel) = self.panels.get(self.edit_panel) {
                    self.draft = panel.variant.style().config;
                }
            }
            if ui.button("Defaults").clicked() {
                self.draft = ChartConfig::default();
            }
        });

        ui.separator();
        ui.label("Pins");
        let Some(panel) = self.panels.get_mut(self.edit_panel) else {
            return;
        };
        let Some(viewport) = panel.chart.viewport() else {
            ui.small("Waiting for the chart to be laid out.");
            return;
        };
        let ids = panel
            .chart
            .items()
            .iter()
            .map(|item| (item.id.clone(), item.label.clone()))
            .collect::<Vec<_>>();
        egui::ScrollArea::vertical()
            .id_salt("pin_scroll")
            .max_height(180.0)
            .show(ui, |ui| {
                for (id, label) in ids {
                    ui.horizontal(|ui| {
                        ui.label(label);
                        if ui.small_button("pin center").clicked() {
                            let center = viewport.center();
                            panel.chart.pin(&id, center.x, center.y);
                        }
                        if ui.small_button("unpin").clicked() {
                            panel.chart.unpin(&id);
                        }
                    });
                }
            });
    }
}
