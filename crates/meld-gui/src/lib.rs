//! meld GUI - desktop routing editor.
//!
//! Paints an [`EditorSession`](meld_editor::EditorSession) with egui and feeds
//! pointer input back into it. All editing logic lives in `meld-editor`.

pub mod app;
pub mod canvas;
pub mod theme;

pub use app::MeldApp;
pub use canvas::{CanvasAction, CanvasOutput, FontMeasure, GraphCanvas};
pub use theme::Theme;
