//! Visual styling for the meld GUI.

use egui::ecolor::Hsva;
use egui::{Color32, CornerRadius, Stroke, Style, Visuals};
use meld_core::ChannelKind;

/// Theme colors for the GUI.
pub struct Theme {
    /// Main window background color.
    pub background: Color32,
    /// Panel background color.
    pub panel_bg: Color32,
    /// Canvas background color.
    pub canvas_bg: Color32,
    /// Node body fill.
    pub node_fill: Color32,
    /// Node outline.
    pub node_border: Color32,
    /// Primary accent color for active elements.
    pub accent: Color32,
    /// Primary text color.
    pub text_primary: Color32,
    /// Secondary/muted text color.
    pub text_secondary: Color32,
    /// Hue of audio pins and wires, in turns.
    pub audio_hue: f32,
    /// Hue of control pins and wires, in turns.
    pub control_hue: f32,
    /// Hue step between successive buses, in turns.
    pub bus_hue_step: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(25, 25, 30),
            panel_bg: Color32::from_rgb(35, 35, 42),
            canvas_bg: Color32::from_rgb(28, 28, 34),
            node_fill: Color32::from_rgb(52, 52, 62),
            node_border: Color32::from_rgb(90, 90, 104),
            accent: Color32::from_rgb(100, 180, 255),
            text_primary: Color32::from_rgb(230, 230, 235),
            text_secondary: Color32::from_rgb(150, 150, 160),
            audio_hue: 0.33,
            control_hue: 0.0,
            bus_hue_step: 0.09,
        }
    }
}

impl Theme {
    /// Apply the theme to an egui context.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();
        let mut visuals = Visuals::dark();

        visuals.window_fill = self.panel_bg;
        visuals.panel_fill = self.panel_bg;
        visuals.extreme_bg_color = self.background;
        visuals.faint_bg_color = Color32::from_rgb(40, 40, 48);

        visuals.widgets.noninteractive.bg_fill = self.panel_bg;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_secondary);
        visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);

        visuals.widgets.inactive.bg_fill = Color32::from_rgb(45, 45, 55);
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);
        visuals.widgets.inactive.corner_radius = CornerRadius::same(4);

        visuals.widgets.hovered.bg_fill = Color32::from_rgb(55, 55, 68);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.5, self.accent);
        visuals.widgets.hovered.corner_radius = CornerRadius::same(4);

        visuals.widgets.active.bg_fill = Color32::from_rgb(65, 65, 80);
        visuals.widgets.active.fg_stroke = Stroke::new(2.0, self.accent);
        visuals.widgets.active.corner_radius = CornerRadius::same(4);

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        visuals.override_text_color = Some(self.text_primary);

        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.window_margin = egui::Margin::same(12);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);

        ctx.set_style(style);
    }

    /// Pin color: audio and control use different base hues, and each bus
    /// group shifts the hue a little further.
    pub fn pin_color(&self, kind: ChannelKind, bus: usize) -> Color32 {
        let base = match kind {
            ChannelKind::Audio => self.audio_hue,
            ChannelKind::Control => self.control_hue,
        };
        let hue = (base + bus as f32 * self.bus_hue_step).rem_euclid(1.0);
        Hsva::new(hue, 0.6, 0.85, 1.0).into()
    }

    /// Wire color for a signal kind.
    pub fn wire_color(&self, kind: ChannelKind) -> Color32 {
        self.pin_color(kind, 0)
    }
}
