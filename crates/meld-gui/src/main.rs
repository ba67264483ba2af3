//! meld GUI - patch routing editor.

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use meld_gui::MeldApp;

/// meld routing editor.
#[derive(Parser, Debug)]
#[command(name = "meld-gui")]
#[command(about = "Graphical routing editor for meld sessions")]
#[command(version)]
struct Args {
    /// Session file to open on startup (path or saved session name)
    #[arg(long)]
    session: Option<String>,
}

fn main() -> eframe::Result<()> {
    use tracing_subscriber::EnvFilter;

    // Initialize tracing subscriber; bridge legacy log:: calls from eframe/egui
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    tracing_log::LogTracer::init().ok();

    let args = Args::parse();
    tracing::info!("Starting meld GUI");

    let session = args.session.as_deref().and_then(|name| {
        let path = PathBuf::from(name);
        if path.exists() {
            Some(path)
        } else {
            let found = meld_config::find_session(name);
            if found.is_none() {
                tracing::warn!(session = %name, "session not found, starting empty");
            }
            found
        }
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([640.0, 420.0])
            .with_title("meld"),
        ..Default::default()
    };

    eframe::run_native(
        "meld",
        options,
        Box::new(move |cc| Ok(Box::new(MeldApp::new(cc, session)))),
    )
}
