mod app;

use std::path::PathBuf;

use bubble_reflect::ChartVariant;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON items file: an array of items or an object with emotions, parts and needs.
    #[arg(long)]
    items: Option<PathBuf>,
    /// JSON chart configuration applied to every variant.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Show a single chart variant instead of all of them.
    #[arg(long, value_enum)]
    variant: Option<ChartVariant>,
    #[arg(long, default_value_t = 1380.0)]
    width: f32,
    #[arg(long, default_value_t = 860.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let source = app::LoadSource {
        items: args.items,
        config: args.config,
        variants: match args.variant {
            Some(variant) => vec![variant],
            None => ChartVariant::ALL.to_vec(),
        },
    };
    tracing::info!(?source, "starting bubble viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width.max(480.0), args.height.max(360.0)]),
        ..Default::default()
    };

    eframe::run_native(
        "bubble-reflect",
        options,
        Box::new(move |cc| Ok(Box::new(app::BubbleViewerApp::new(cc, source)))),
    )
}
