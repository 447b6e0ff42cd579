use std::collections::VecDeque;
use std::sync::mpsc;

use bubble_reflect::{BubbleChart, ChartVariant, LabelFitter};
use eframe::egui::{self, Align, Context, Layout};

use super::super::{ChartPanel, LoadedSet, Selection, ViewModel};

impl ViewModel {
    pub(in crate::app) const HISTORY_ROWS: usize = 12;

    pub(in crate::app) fn new(loaded: LoadedSet, variants: &[ChartVariant]) -> Self {
        let (selection_tx, selection_rx) = mpsc::channel();
        let panels = variants
            .iter()
            .map(|variant| {
                let mut style = variant.style();
                if let Some(config) = &loaded.config {
                    style = style.with_config(config.clone());
                }
                let mut chart = BubbleChart::new(style);
                chart.set_items(loaded.items.clone());
                Self::wire_callbacks(&mut chart, *variant, &selection_tx);
                ChartPanel {
                    variant: *variant,
                    chart,
                }
            })
            .collect::<Vec<_>>();

        let draft = panels
            .first()
            .map(|panel| panel.chart.config().clone())
            .unwrap_or_default();

        Self {
            panels,
            fitter: LabelFitter::new(),
            item_count: loaded.items.len(),
            search: String::new(),
            edit_panel: 0,
            draft,
            show_frames: false,
            selection_tx,
            selection_rx,
            selection: None,
            history: VecDeque::new(),
        }
    }

    fn wire_callbacks(
        chart: &mut BubbleChart,
        variant: ChartVariant,
        selection_tx: &mpsc::Sender<Selection>,
    ) {
        let tx = selection_tx.clone();
        chart.on_item_pressed(move |item| {
            let _ = tx.send(Selection {
                variant,
                item: item.clone(),
                long_press: false,
            });
        });

        let tx = selection_tx.clone();
        chart.on_item_long_pressed(move |item| {
            let _ = tx.send(Selection {
                variant,
                item: item.clone(),
                long_press: true,
            });
        });
    }

    /// New items from a reload. Charts keep their caches, so shared ids start where they were.
    pub(in crate::app) fn replace_items(&mut self, loaded: LoadedSet) {
        self.item_count = loaded.items.len();
        for panel in &mut self.panels {
            if let Some(config) = &loaded.config {
                let style = panel.chart.style().clone().with_config(config.clone());
                panel.chart.set_style(style);
            }
            panel.chart.set_items(loaded.items.clone());
        }
    }

    fn drain_selections(&mut self) {
        while let Ok(selection) = self.selection_rx.try_recv() {
            tracing::info!(
                id = %selection.item.id,
                variant = selection.variant.label(),
                long_press = selection.long_press,
                "bubble pressed"
            );
            self.history.push_front(selection.clone());
            self.history.truncate(Self::HISTORY_ROWS);
            self.selection = Some(selection);
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.drain_selections();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("bubble-reflect");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("items: {}", self.item_count));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload items"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Relayout").clicked() {
                        for panel in &mut self.panels {
                            panel.chart.relayout();
                        }
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_loading {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_charts(ui));
    }
}
