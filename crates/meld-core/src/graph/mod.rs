//! Routing graph for the MELD patch editor.
//!
//! The graph module holds the authoritative model of one editing session:
//! which processing units are placed on the canvas, and how their pins are
//! wired. Everything the user sees (node views, wires) and everything the
//! audio engine executes (plans) is derived from it.
//!
//! # Architecture
//!
//! The system uses a **two-object split**:
//!
//! - [`RoutingGraph`]: owned by the editing session on the interaction thread.
//!   Holds nodes and connections, validates and applies mutations, and raises
//!   one [`GraphChange`] per applied mutation.
//! - [`ExecutionPlan`]: immutable snapshot in processing order. Shared with the
//!   audio thread through [`PlanPublisher`] (`ArcSwap`), so the audio thread
//!   never sees partial state.
//!
//! # Connection rules
//!
//! A [`Connection`] runs from an output [`PinRef`] to an input [`PinRef`] on a
//! different node. Both channels must exist and carry the same
//! [`ChannelKind`]; the exact same connection may exist only once. Several
//! sources may feed the same input pin.
//!
//! # Example
//!
//! ```rust
//! use meld_core::graph::{Connection, Position, RoutingGraph, UnitDescriptor};
//!
//! let mut graph = RoutingGraph::new();
//! let changes = graph.subscribe();
//!
//! let source = UnitDescriptor::new("demo.osc", "Oscillator").with_output_bus("Main", 2);
//! let sink = UnitDescriptor::new("demo.out", "Output").with_input_bus("Main", 2);
//! let a = graph.add_node(source.into_unit(), Position::new(0.5, 0.2));
//! let b = graph.add_node(sink.into_unit(), Position::new(0.5, 0.8));
//!
//! let left = Connection::audio(a, 0, b, 0);
//! assert!(graph.can_connect(&left));
//! graph.add_connection(left).unwrap();
//! assert!(!graph.can_connect(&left));
//!
//! assert_eq!(changes.try_iter().count(), 3);
//! ```

pub mod change;
pub mod connection;
pub mod node;
pub mod pin;
pub mod plan;
pub mod routing;
pub mod unit;

pub use change::{ChangeKind, GraphChange};
pub use connection::Connection;
pub use node::{Node, NodeId, Position};
pub use pin::{CONTROL_CHANNEL, ChannelKind, PinRef};
pub use plan::{ExecutionPlan, PlanEntry, PlanPublisher};
pub use routing::{ConnectionRejection, GraphError, RoutingGraph};
pub use unit::{Bus, ProcessingUnit, UnitDescriptor, UnitFactory};
