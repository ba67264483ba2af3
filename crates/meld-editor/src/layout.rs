//! Node sizing and pin placement.
//!
//! Pins are spread along the top edge (inputs) or bottom edge (outputs) of a
//! node. Each bus boundary adds half a slot of extra space, so channels of the
//! same bus sit visibly closer together than channels of neighbouring buses.
//! The control pin, when present, takes the last slot and belongs to the last
//! bus group.
//!
//! Everything here is a pure function of the unit's channel layout, the node
//! size and the settings; nothing is cached between calls.

use egui::{Pos2, Rect, Vec2, pos2, vec2};
use meld_config::EditorSettings;
use meld_core::{Node, PinRef};

/// Measures rendered title text.
///
/// The GUI backs this with real font metrics; headless callers use
/// [`EstimatedText`].
pub trait TextMeasure {
    /// Width of `text` when drawn as a node title.
    fn text_width(&self, text: &str) -> f32;
}

/// Fixed-advance text estimate: every character is `char_width` wide.
#[derive(Clone, Copy, Debug)]
pub struct EstimatedText {
    /// Advance per character.
    pub char_width: f32,
}

impl TextMeasure for EstimatedText {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

/// One pin's slot on its side of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinSlot {
    /// The pin.
    pub pin: PinRef,
    /// Position among the side's pins, control pin last.
    pub index: u32,
    /// Bus group the pin belongs to.
    pub bus: usize,
}

/// A pin slot with its rectangle in node-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinPlacement {
    /// Slot the rectangle was computed for.
    pub slot: PinSlot,
    /// Pin square relative to the node's top-left corner.
    pub rect: Rect,
}

/// Computes node sizes and pin rectangles from [`EditorSettings`].
#[derive(Clone, Copy, Debug)]
pub struct PinLayoutEngine {
    settings: EditorSettings,
}

impl PinLayoutEngine {
    /// Creates an engine for the given settings.
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            settings: *settings,
        }
    }

    /// Size of the node's body given the width of its rendered title.
    pub fn node_size(&self, node: &Node, title_width: f32) -> Vec2 {
        let s = &self.settings;
        let pins = node.num_inputs().max(node.num_outputs());
        let mut width = s.node_width.max((pins + 1) as f32 * s.pin_spacing);
        width = width.max(s.pin_size + title_width.min(s.title_clamp));
        let height = if title_width > s.title_clamp {
            s.tall_node_height
        } else {
            s.node_height
        };
        vec2(width, height)
    }

    /// Slots for one side, in channel order with the control pin last.
    ///
    /// Also returns the number of bus groups on that side.
    pub fn side_slots(&self, node: &Node, is_input: bool) -> (Vec<PinSlot>, usize) {
        let unit = node.unit();
        let bus_count = unit.buses(is_input).len();
        let last_bus = bus_count.saturating_sub(1);
        let slots = node
            .pins(is_input)
            .into_iter()
            .enumerate()
            .map(|(index, pin)| {
                let bus = if pin.is_control() {
                    last_bus
                } else {
                    unit.bus_of_channel(is_input, pin.channel)
                        .map_or(last_bus, |(bus, _)| bus)
                };
                PinSlot {
                    pin,
                    index: index as u32,
                    bus,
                }
            })
            .collect();
        (slots, bus_count)
    }

    /// Horizontal centre of a slot on a side of `width`.
    pub fn slot_center_x(&self, slot: &PinSlot, pin_count: usize, bus_count: usize, width: f32) -> f32 {
        let total = pin_count as f32 + bus_count.saturating_sub(1) as f32 * 0.5;
        let position = slot.index as f32 + slot.bus as f32 * 0.5;
        width * (1.0 + position) / (total + 1.0)
    }

    /// Every pin rectangle of `node`, inputs first, in node-local coordinates.
    pub fn place_pins(&self, node: &Node, size: Vec2) -> Vec<PinPlacement> {
        let pin_size = self.settings.pin_size;
        let mut placements = Vec::with_capacity((node.num_inputs() + node.num_outputs()) as usize);
        for is_input in [true, false] {
            let (slots, bus_count) = self.side_slots(node, is_input);
            let top = if is_input { 0.0 } else { size.y - pin_size };
            let count = slots.len();
            placements.extend(slots.into_iter().map(|slot| {
                let x = self.slot_center_x(&slot, count, bus_count, size.x) - pin_size / 2.0;
                PinPlacement {
                    slot,
                    rect: Rect::from_min_size(pos2(x, top), Vec2::splat(pin_size)),
                }
            }));
        }
        placements
    }

    /// Whether a node-local point lies on the body of a node of `size`,
    /// excluding the pin strips along the top and bottom edges.
    pub fn body_contains(&self, size: Vec2, local: Pos2) -> bool {
        let pin = self.settings.pin_size;
        local.x >= 3.0 && local.x < size.x - 6.0 && local.y >= pin && local.y < size.y - pin
    }
}
