//! Main application state and UI layout.

use std::path::{Path, PathBuf};

use egui::{CentralPanel, Color32, Context, RichText, ScrollArea, SidePanel, TopBottomPanel};
use meld_config::{EditorSettings, ensure_user_sessions_dir, settings_path};
use meld_core::Position;
use meld_editor::{DragOutcome, EditorSession};
use meld_registry::{UnitCatalog, UnitCategory};

use crate::canvas::{CanvasAction, FontMeasure, GraphCanvas};
use crate::theme::Theme;

/// Main application state.
pub struct MeldApp {
    catalog: UnitCatalog,
    session: EditorSession,
    canvas: GraphCanvas,
    theme: Theme,

    /// File the session was last loaded from or saved to.
    session_path: Option<PathBuf>,
    /// Last status message, shown in the status bar.
    status: Option<String>,
    /// Pin description under the pointer.
    tooltip: Option<String>,
}

impl MeldApp {
    /// Create a new application instance, optionally opening a session file.
    pub fn new(cc: &eframe::CreationContext<'_>, session: Option<PathBuf>) -> Self {
        let theme = Theme::default();
        theme.apply(&cc.egui_ctx);

        let settings = EditorSettings::load_or_default(settings_path()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable settings");
            EditorSettings::default()
        });

        let catalog = UnitCatalog::new();
        let mut editor = EditorSession::new("Untitled", catalog.default_graph(), settings);
        editor.set_text_measure(Box::new(FontMeasure::new(cc.egui_ctx.clone())));

        let mut app = Self {
            catalog,
            session: editor,
            canvas: GraphCanvas::new(),
            theme,
            session_path: None,
            status: None,
            tooltip: None,
        };
        if let Some(path) = session {
            app.open(&path);
        }
        app
    }

    fn new_document(&mut self) {
        self.session
            .replace_graph("Untitled", self.catalog.default_graph());
        self.session_path = None;
        self.status = Some("New session".to_string());
    }

    fn open(&mut self, path: &Path) {
        match self.session.load(path, &self.catalog) {
            Ok(()) => {
                self.session_path = Some(path.to_path_buf());
                self.status = Some(format!("Opened {}", path.display()));
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open session");
                self.status = Some(format!("Open failed: {e}"));
            }
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        match self.session.save(&path) {
            Ok(()) => {
                self.status = Some(format!("Saved {}", path.display()));
                self.session_path = Some(path);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to save session");
                self.status = Some(format!("Save failed: {e}"));
            }
        }
    }

    fn file_dialog(&self) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new().add_filter("meld session", &["toml"]);
        match ensure_user_sessions_dir() {
            Ok(dir) => dialog.set_directory(dir),
            Err(_) => dialog,
        }
    }

    fn open_dialog(&mut self) {
        if let Some(path) = self.file_dialog().pick_file() {
            self.open(&path);
        }
    }

    fn save_as_dialog(&mut self) {
        let file_name = format!("{}.toml", self.session.name().to_lowercase().replace(' ', "_"));
        if let Some(path) = self.file_dialog().set_file_name(file_name).save_file() {
            self.save_to(path);
        }
    }

    fn save(&mut self) {
        match self.session_path.clone() {
            Some(path) => self.save_to(path),
            None => self.save_as_dialog(),
        }
    }

    fn apply(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::AddUnit {
                identifier,
                position,
            } => self.add_unit(&identifier, position),
            CanvasAction::DeleteNode(id) => {
                self.session.delete_node(id);
            }
            CanvasAction::DisconnectNode(id) => {
                let removed = self.session.disconnect_node(id);
                self.status = Some(format!("Removed {removed} connection(s)"));
            }
        }
    }

    fn add_unit(&mut self, identifier: &str, position: Position) {
        match self.catalog.create(identifier) {
            Some(unit) => {
                self.session.create_node(unit, position);
            }
            None => tracing::warn!(identifier, "unknown unit"),
        }
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("MELD").strong().color(self.theme.accent));
            ui.separator();
            if ui.button("New").clicked() {
                self.new_document();
            }
            if ui.button("Open...").clicked() {
                self.open_dialog();
            }
            if ui.button("Save").clicked() {
                self.save();
            }
            if ui.button("Save As...").clicked() {
                self.save_as_dialog();
            }
            ui.separator();
            let marker = if self.session.is_dirty() { " *" } else { "" };
            ui.label(format!("{}{marker}", self.session.name()));
        });
    }

    fn render_palette(&mut self, ui: &mut egui::Ui) {
        let mut picked = None;
        ScrollArea::vertical().show(ui, |ui| {
            for category in UnitCategory::ALL {
                ui.label(
                    RichText::new(category.name().to_uppercase())
                        .small()
                        .color(self.theme.text_secondary),
                )
                .on_hover_text(category.description());
                for entry in self.catalog.units_in_category(category) {
                    let button = ui
                        .button(&entry.descriptor.name)
                        .on_hover_text(entry.description);
                    if button.clicked() {
                        picked = Some(entry.descriptor.identifier.clone());
                    }
                }
                ui.add_space(8.0);
            }
        });
        if let Some(identifier) = picked {
            self.add_unit(&identifier, Position::new(0.5, 0.5));
        }
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let graph = self.session.graph();
        let plan = self.session.plans().load();
        ui.horizontal(|ui| {
            ui.label(format!("{} units", graph.node_count()));
            ui.separator();
            ui.label(format!("{} connections", graph.connection_count()));
            ui.separator();
            ui.label(format!("plan r{}", plan.revision()));
            if !plan.feedback().is_empty() {
                ui.label(
                    RichText::new(format!("{} feedback", plan.feedback().len()))
                        .color(Color32::from_rgb(220, 200, 60)),
                );
            }
            ui.separator();
            if let Some(text) = self.tooltip.as_ref().or(self.status.as_ref()) {
                ui.label(RichText::new(text).color(self.theme.text_secondary));
            }
        });
    }
}

impl eframe::App for MeldApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_header(ui);
            ui.add_space(4.0);
        });

        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.add_space(2.0);
            self.render_status_bar(ui);
            ui.add_space(2.0);
        });

        SidePanel::left("palette")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| self.render_palette(ui));

        let output = CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                self.canvas
                    .show(ui, &mut self.session, &self.catalog, &self.theme)
            })
            .inner;

        self.tooltip = output.tooltip;
        match output.outcome {
            Some(DragOutcome::Connected(c)) => self.status = Some(format!("Connected {c}")),
            Some(DragOutcome::Deleted(c)) => self.status = Some(format!("Removed {c}")),
            _ => {}
        }
        for action in output.actions {
            self.apply(action);
        }
    }
}
