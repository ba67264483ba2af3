//! MELD Core - routing graph model for the MELD patch editor
//!
//! This crate provides the data model behind the patch editor: processing
//! units placed as nodes, pins addressing their channels, and connections
//! wiring outputs to inputs. It owns no GUI or audio code; the editor crate
//! mirrors the graph on screen and the engine executes plans derived from it.
//!
//! # Core Abstractions
//!
//! - [`RoutingGraph`] - Authoritative node/connection set with validation
//! - [`PinRef`] / [`Connection`] - Plain value types addressing pins and wires
//! - [`ProcessingUnit`] - Host interface for whatever sits inside a node
//! - [`UnitDescriptor`] - Plain-data unit description, persisted in sessions
//! - [`GraphChange`] - One notification per applied mutation
//! - [`ExecutionPlan`] / [`PlanPublisher`] - Immutable processing order for
//!   the real-time path
//!
//! # Design Principles
//!
//! - **Values, not handles**: pins and connections compare structurally
//! - **Idempotent deletion**: removing something absent is a no-op
//! - **No partial states**: validation happens before any mutation
//! - **Snapshot hand-off**: the audio thread only ever sees whole plans

pub mod graph;

pub use graph::{
    Bus, CONTROL_CHANNEL, ChangeKind, ChannelKind, Connection, ConnectionRejection,
    ExecutionPlan, GraphChange, GraphError, Node, NodeId, PinRef, PlanEntry, PlanPublisher,
    Position, ProcessingUnit, RoutingGraph, UnitDescriptor, UnitFactory,
};
