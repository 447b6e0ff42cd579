use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use anyhow::Result;
use bubble_reflect::items::{demo_items, load_items};
use bubble_reflect::{BubbleChart, ChartConfig, ChartVariant, Item, LabelFitter};
use eframe::egui::{self, Context};

mod render_utils;
mod ui;
mod view;

#[derive(Clone, Debug)]
pub struct LoadSource {
    pub items: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub variants: Vec<ChartVariant>,
}

impl LoadSource {
    fn describe(&self) -> String {
        match &self.items {
            Some(path) => path.display().to_string(),
            None => "built-in demo items".to_owned(),
        }
    }
}

struct LoadedSet {
    items: Vec<Item>,
    config: Option<ChartConfig>,
}

pub struct BubbleViewerApp {
    source: LoadSource,
    state: AppState,
    reload_rx: Option<Receiver<Result<LoadedSet, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<LoadedSet, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    panels: Vec<ChartPanel>,
    fitter: LabelFitter,
    item_count: usize,
    search: String,
    edit_panel: usize,
    draft: ChartConfig,
    show_frames: bool,
    selection_tx: Sender<Selection>,
    selection_rx: Receiver<Selection>,
    selection: Option<Selection>,
    history: VecDeque<Selection>,
}

struct ChartPanel {
    variant: ChartVariant,
    chart: BubbleChart,
}

#[derive(Clone, Debug)]
struct Selection {
    variant: ChartVariant,
    item: Item,
    long_press: bool,
}

fn load_set(source: &LoadSource) -> Result<LoadedSet> {
    let items = match &source.items {
        Some(path) => load_items(path)?,
        None => demo_items(),
    };
    let config = source
        .config
        .as_deref()
        .map(bubble_reflect::config::load_config)
        .transpose()?;
    Ok(LoadedSet { items, config })
}

impl BubbleViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: LoadSource) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: LoadSource) -> Receiver<Result<LoadedSet, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_set(&source).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::warn!(%error, "failed to load bubble items");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: LoadSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, loaded: LoadedSet) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            loaded,
            &self.source.variants,
        )))
    }
}

impl eframe::App for BubbleViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(loaded)) => transition = Some(Ok(loaded)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading items...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load bubble items");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.source.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.source.describe(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(loaded)) => model.replace_items(loaded),
                        Ok(Err(error)) => transition = Some(Err(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(loaded) => self.ready(loaded),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
