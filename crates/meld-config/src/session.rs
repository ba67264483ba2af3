//! Session file format and operations.

use std::path::Path;

use meld_core::{
    Bus, Connection, NodeId, Position, RoutingGraph, UnitDescriptor, UnitFactory,
};
use serde::{Deserialize, Serialize};

use crate::address::PinAddress;
use crate::error::ConfigError;

/// Persisted routing document.
///
/// A session is a flat list of node records (id, unit, position) and
/// connection records (source pin, destination pin). Saving a graph and
/// restoring it yields the same node ids, unit bindings, positions and
/// connection set.
///
/// # TOML Format
///
/// ```toml
/// name = "Live Rig"
/// description = "Keys into synth, synth into delay"
///
/// [[nodes]]
/// id = 1
/// x = 0.5
/// y = 0.1
///
/// [nodes.unit]
/// identifier = "builtin.audio-input"
/// name = "Audio Input"
///
/// [[nodes.unit.outputs]]
/// name = "Input"
/// channels = 2
///
/// [[connections]]
/// source = "1:0"
/// destination = "4:0"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFile {
    /// Name of the session.
    pub name: String,

    /// Optional description of the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Node records, in id order when written by [`SessionFile::from_graph`].
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,

    /// Connection records.
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// One node in a session file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    /// Node id, preserved across save and load.
    pub id: u32,
    /// Horizontal centre as a fraction of the canvas width.
    pub x: f64,
    /// Vertical centre as a fraction of the canvas height.
    pub y: f64,
    /// Unit hosted by the node.
    pub unit: UnitRecord,
}

/// Persisted unit binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitRecord {
    /// Identifier the unit factory resolves.
    pub identifier: String,
    /// Display name at save time.
    pub name: String,
    /// Whether the unit accepted control at save time.
    #[serde(default, skip_serializing_if = "is_false")]
    pub accepts_control: bool,
    /// Whether the unit produced control at save time.
    #[serde(default, skip_serializing_if = "is_false")]
    pub produces_control: bool,
    /// Input buses at save time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<BusRecord>,
    /// Output buses at save time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<BusRecord>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// Persisted bus layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusRecord {
    /// Bus name.
    pub name: String,
    /// Channel count.
    pub channels: u32,
}

/// One connection in a session file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Output pin the connection leaves from.
    pub source: PinAddress,
    /// Input pin the connection arrives at.
    pub destination: PinAddress,
}

impl ConnectionRecord {
    /// Resolves the record into a graph connection.
    pub fn to_connection(self) -> Connection {
        Connection::new(self.source.as_output(), self.destination.as_input())
    }
}

impl From<Connection> for ConnectionRecord {
    fn from(connection: Connection) -> Self {
        Self {
            source: connection.source.into(),
            destination: connection.destination.into(),
        }
    }
}

impl From<&UnitDescriptor> for UnitRecord {
    fn from(d: &UnitDescriptor) -> Self {
        let buses = |buses: &[Bus]| {
            buses
                .iter()
                .map(|b| BusRecord {
                    name: b.name.clone(),
                    channels: b.channels,
                })
                .collect()
        };
        Self {
            identifier: d.identifier.clone(),
            name: d.name.clone(),
            accepts_control: d.accepts_control,
            produces_control: d.produces_control,
            inputs: buses(&d.input_buses),
            outputs: buses(&d.output_buses),
        }
    }
}

impl UnitRecord {
    /// Rebuilds the descriptor stored in the record.
    pub fn to_descriptor(&self) -> UnitDescriptor {
        let mut descriptor = UnitDescriptor::new(&self.identifier, &self.name);
        for bus in &self.inputs {
            descriptor = descriptor.with_input_bus(&bus.name, bus.channels);
        }
        for bus in &self.outputs {
            descriptor = descriptor.with_output_bus(&bus.name, bus.channels);
        }
        descriptor.accepts_control = self.accepts_control;
        descriptor.produces_control = self.produces_control;
        descriptor
    }
}

impl NodeRecord {
    /// Position stored in the record, unclamped.
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl SessionFile {
    /// Create a new empty session.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Create a session with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Snapshot a graph into a session document.
    pub fn from_graph(name: impl Into<String>, graph: &RoutingGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|n| NodeRecord {
                id: n.id().index(),
                x: n.position().x,
                y: n.position().y,
                unit: UnitRecord::from(&n.unit().descriptor()),
            })
            .collect();
        let connections = graph.connections().copied().map(Into::into).collect();
        Self {
            name: name.into(),
            description: None,
            nodes,
            connections,
        }
    }

    /// Rebuild the routing graph described by this session.
    ///
    /// Nodes are restored under their saved ids; units are created by
    /// `factory`. Stops at the first problem; use
    /// [`validate_session`](crate::validate_session) to list all of them.
    pub fn restore(&self, factory: &dyn UnitFactory) -> Result<RoutingGraph, ConfigError> {
        let mut graph = RoutingGraph::new();
        for record in &self.nodes {
            let descriptor = record.unit.to_descriptor();
            let unit = factory
                .instantiate(&descriptor)
                .ok_or_else(|| ConfigError::UnknownUnit {
                    node: record.id,
                    identifier: descriptor.identifier.clone(),
                })?;
            graph.add_node_with_id(NodeId::from_raw(record.id), unit, record.position())?;
        }
        for record in &self.connections {
            graph.add_connection(record.to_connection())?;
        }
        Ok(graph)
    }

    /// Load a session from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let session: SessionFile = toml::from_str(&content)?;
        Ok(session)
    }

    /// Load a session from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the session to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the session to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find a node record by id.
    pub fn node(&self, id: u32) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

impl Default for SessionFile {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
