//! Routing canvas: paints the session's views and forwards pointer input.

use egui::epaint::CubicBezierShape;
use egui::{
    Color32, Context, CursorIcon, FontId, Key, Painter, Pos2, Response, Sense, Shape, Stroke,
    StrokeKind, Ui, Vec2,
};
use meld_core::{ChannelKind, NodeId, Position};
use meld_editor::{DragOutcome, EditorSession, Hit, TextMeasure, WireCurve};
use meld_registry::{UnitCatalog, UnitCategory};

use crate::theme::Theme;

/// Node title font size in points.
const TITLE_SIZE: f32 = 13.0;

/// Measures node titles with egui's font system.
pub struct FontMeasure {
    ctx: Context,
    font: FontId,
}

impl FontMeasure {
    /// Measures with the title font of `ctx`.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            font: FontId::proportional(TITLE_SIZE),
        }
    }
}

impl TextMeasure for FontMeasure {
    fn text_width(&self, text: &str) -> f32 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), self.font.clone(), Color32::WHITE)
                .size()
                .x
        })
    }
}

/// Edits requested from the canvas context menu.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasAction {
    /// Add a catalog unit at a relative position.
    AddUnit {
        /// Catalog identifier.
        identifier: String,
        /// Where the menu was opened.
        position: Position,
    },
    /// Delete a node.
    DeleteNode(NodeId),
    /// Remove every connection of a node.
    DisconnectNode(NodeId),
}

/// What happened on the canvas this frame.
#[derive(Debug, Default)]
pub struct CanvasOutput {
    /// Context menu picks.
    pub actions: Vec<CanvasAction>,
    /// Result of a pointer release, if one happened.
    pub outcome: Option<DragOutcome>,
    /// Pin description under the pointer.
    pub tooltip: Option<String>,
}

#[derive(Clone, Copy, Debug)]
enum MenuTarget {
    Node(NodeId),
    Canvas(Position),
}

/// Primary-button input sampled once per frame, in canvas coordinates.
#[derive(Clone, Copy, Debug, Default)]
struct PointerFrame {
    pressed: bool,
    released: bool,
    pointer: Option<Pos2>,
    escape: bool,
    hovered: bool,
}

/// Canvas widget state kept between frames.
#[derive(Debug, Default)]
pub struct GraphCanvas {
    pressed: bool,
    last_pointer: Option<Pos2>,
    menu_target: Option<MenuTarget>,
}

impl GraphCanvas {
    /// Create a new canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the canvas filling the available space.
    pub fn show(
        &mut self,
        ui: &mut Ui,
        session: &mut EditorSession,
        catalog: &UnitCatalog,
        theme: &Theme,
    ) -> CanvasOutput {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let origin = response.rect.min.to_vec2();
        session.resize(response.rect.size());

        let mut output = CanvasOutput {
            outcome: self.handle_pointer(ui, &response, session, origin),
            ..Default::default()
        };

        let hover = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|p| response.rect.contains(*p))
            .map(|p| p - origin);
        let hit = hover.map(|p| session.hit_test(p));
        let hovered_wire = match &hit {
            Some(Hit::Connection(c)) if session.drag_preview().is_none() => Some(*c),
            _ => None,
        };
        if matches!(hit, Some(Hit::Pin(_))) {
            ui.ctx().set_cursor_icon(CursorIcon::Crosshair);
        }

        painter.rect_filled(response.rect, 0.0, theme.canvas_bg);
        paint_wires(&painter, session, theme, origin, hovered_wire);
        paint_nodes(&painter, session, theme, origin);
        if let Some((curve, kind)) = session.drag_preview() {
            let color = theme.wire_color(kind).gamma_multiply(0.8);
            paint_curve(&painter, &curve, origin, Stroke::new(session.settings().wire_stroke, color));
        }

        output.tooltip = hover.and_then(|p| session.tooltip_at(p));
        let response = match &output.tooltip {
            Some(text) => response.on_hover_text_at_pointer(text.as_str()),
            None => response,
        };

        self.context_menu(&response, session, catalog, origin, &mut output.actions);
        output
    }

    fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &Response,
        session: &mut EditorSession,
        origin: Vec2,
    ) -> Option<DragOutcome> {
        let hovered = response.hovered();
        let frame = ui.input(|i| PointerFrame {
            pressed: i.pointer.primary_pressed(),
            released: i.pointer.primary_released(),
            pointer: i.pointer.interact_pos().map(|p| p - origin),
            escape: i.key_pressed(Key::Escape),
            hovered,
        });
        self.apply_pointer(frame, session)
    }

    fn apply_pointer(
        &mut self,
        frame: PointerFrame,
        session: &mut EditorSession,
    ) -> Option<DragOutcome> {
        if frame.escape && self.pressed {
            self.pressed = false;
            self.last_pointer = None;
            return Some(session.cancel_gesture());
        }

        if let Some(local) = frame.pointer {
            if frame.pressed && frame.hovered {
                session.pointer_down(local);
                self.pressed = true;
                self.last_pointer = Some(local);
            } else if self.pressed && self.last_pointer != Some(local) {
                session.pointer_move(local);
                self.last_pointer = Some(local);
            }
        }

        if frame.released && self.pressed {
            self.pressed = false;
            // egui may drop the position on the release frame.
            let at = frame.pointer.or(self.last_pointer.take());
            self.last_pointer = None;
            return Some(match at {
                Some(at) => session.pointer_up(at),
                None => session.cancel_gesture(),
            });
        }
        None
    }

    fn context_menu(
        &mut self,
        response: &Response,
        session: &EditorSession,
        catalog: &UnitCatalog,
        origin: Vec2,
        actions: &mut Vec<CanvasAction>,
    ) {
        if response.secondary_clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let local = pos - origin;
            self.menu_target = Some(match session.hit_test(local) {
                Hit::Node(id) => MenuTarget::Node(id),
                Hit::Pin(hit) => MenuTarget::Node(hit.pin.node),
                Hit::Connection(_) | Hit::Empty => {
                    MenuTarget::Canvas(session.relative_position(local))
                }
            });
        }

        let target = self
            .menu_target
            .unwrap_or(MenuTarget::Canvas(Position::new(0.5, 0.5)));
        response.context_menu(|ui| match target {
            MenuTarget::Node(id) => {
                if ui.button("Disconnect all").clicked() {
                    actions.push(CanvasAction::DisconnectNode(id));
                    ui.close_menu();
                }
                if ui.button("Delete").clicked() {
                    actions.push(CanvasAction::DeleteNode(id));
                    ui.close_menu();
                }
            }
            MenuTarget::Canvas(position) => {
                for category in UnitCategory::ALL {
                    ui.menu_button(category.name(), |ui| {
                        for entry in catalog.units_in_category(category) {
                            let button = ui
                                .button(&entry.descriptor.name)
                                .on_hover_text(entry.description);
                            if button.clicked() {
                                actions.push(CanvasAction::AddUnit {
                                    identifier: entry.descriptor.identifier.clone(),
                                    position,
                                });
                                ui.close_menu();
                            }
                        }
                    });
                }
            }
        });
    }
}

fn paint_curve(painter: &Painter, curve: &WireCurve, origin: Vec2, stroke: Stroke) {
    let points = curve.control_points().map(|p| p + origin);
    painter.add(CubicBezierShape::from_points_stroke(
        points,
        false,
        Color32::TRANSPARENT,
        stroke,
    ));
}

fn paint_wires(
    painter: &Painter,
    session: &EditorSession,
    theme: &Theme,
    origin: Vec2,
    hovered: Option<meld_core::Connection>,
) {
    let width = session.settings().wire_stroke;
    for view in session.views().connections() {
        let highlighted = hovered == Some(view.connection());
        let stroke = Stroke::new(
            if highlighted { width * 1.6 } else { width },
            theme.wire_color(view.kind()),
        );
        paint_curve(painter, view.curve(), origin, stroke);
        paint_arrow(painter, view.curve(), origin, stroke.color);
    }
}

/// Direction marker at the middle of a wire, pointing at the input end.
fn paint_arrow(painter: &Painter, curve: &WireCurve, origin: Vec2, color: Color32) {
    let dir = curve.mid_direction();
    let tip = curve.midpoint() + origin + dir * 4.0;
    let back = tip - dir * 10.0;
    let side = dir.rot90() * 4.5;
    painter.add(Shape::convex_polygon(
        vec![tip, back + side, back - side],
        color,
        Stroke::NONE,
    ));
}

fn paint_nodes(painter: &Painter, session: &EditorSession, theme: &Theme, origin: Vec2) {
    let pin_size = session.settings().pin_size;
    for node in session.views().nodes_bottom_up() {
        let rect = node.rect().translate(origin);
        painter.rect_filled(rect, 6.0, theme.node_fill);
        painter.rect_stroke(
            rect,
            6.0,
            Stroke::new(1.0, theme.node_border),
            StrokeKind::Inside,
        );

        let wrap = rect.width() - pin_size;
        let galley = painter.layout(
            node.title().to_owned(),
            FontId::proportional(TITLE_SIZE),
            theme.text_primary,
            wrap,
        );
        let pos = rect.center() - galley.size() / 2.0;
        painter.galley(pos, galley, theme.text_primary);

        for pin in node.pins() {
            let pin_rect = pin.rect.translate(origin).shrink(2.0);
            let color = theme.pin_color(pin.kind(), pin.bus);
            match pin.kind() {
                ChannelKind::Audio => {
                    painter.rect_filled(pin_rect, 2.0, color);
                }
                ChannelKind::Control => {
                    painter.circle_filled(pin_rect.center(), pin_rect.width() / 2.0, color);
                }
            }
        }
    }
}
