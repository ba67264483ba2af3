//! Headless canvas model for the meld routing editor.
//!
//! Everything here is GUI-toolkit agnostic apart from borrowing egui's
//! geometry types. The GUI crate paints what this crate computes and feeds
//! pointer events back in.
//!
//! # Pieces
//!
//! - [`PinLayoutEngine`] - Node sizes and pin rectangles
//! - [`ViewReconciler`] - Keeps node and wire views in step with the graph
//! - [`EndpointLocator`] - Hit testing for pins, wires and node bodies
//! - [`ConnectionDragController`] - Creating, moving and deleting wires by drag
//! - [`EditorSession`] - One open document wired to all of the above
//!
//! # Example
//!
//! ```rust
//! use meld_config::EditorSettings;
//! use meld_core::{Position, RoutingGraph, UnitDescriptor};
//! use meld_editor::EditorSession;
//!
//! let mut session = EditorSession::new("Demo", RoutingGraph::new(), EditorSettings::default());
//! let unit = UnitDescriptor::new("demo.gain", "Gain")
//!     .with_input_bus("Main", 1)
//!     .with_output_bus("Main", 1)
//!     .into_unit();
//! let id = session.create_node(unit, Position::new(0.5, 0.5));
//! assert_eq!(session.views().node(id).map(|v| v.title()), Some("Gain"));
//! ```

pub mod drag;
pub mod geometry;
pub mod layout;
pub mod locate;
pub mod reconcile;
pub mod session;
pub mod view;

pub use drag::{ConnectionDragController, DragOutcome, DragState, DragWire};
pub use geometry::WireCurve;
pub use layout::{EstimatedText, PinLayoutEngine, PinPlacement, PinSlot, TextMeasure};
pub use locate::{EndpointLocator, Hit, PinHit};
pub use reconcile::{ReconcileReport, ViewReconciler};
pub use session::EditorSession;
pub use view::{CanvasContext, ConnectionView, NodeView, PinView};
