//! Unit catalog and factory for the meld routing editor.
//!
//! This crate lists the processing units the host can place on the routing
//! canvas without scanning for plugins: the host I/O endpoints plus a handful
//! of built-in instruments, effects and utilities. It also acts as the
//! [`UnitFactory`] that turns persisted descriptors back into live units.
//!
//! # Example
//!
//! ```rust
//! use meld_registry::{UnitCatalog, UnitCategory};
//!
//! let catalog = UnitCatalog::new();
//!
//! for entry in catalog.units_in_category(UnitCategory::Effect) {
//!     println!("{}: {}", entry.descriptor.name, entry.description);
//! }
//!
//! let graph = catalog.default_graph();
//! assert_eq!(graph.node_count(), 3);
//! ```

use std::sync::Arc;

use meld_core::{NodeId, Position, ProcessingUnit, RoutingGraph, UnitDescriptor, UnitFactory};

/// Identifier of the host's audio input unit.
pub const AUDIO_INPUT: &str = "builtin.audio-input";
/// Identifier of the host's audio output unit.
pub const AUDIO_OUTPUT: &str = "builtin.audio-output";
/// Identifier of the host's control input unit.
pub const CONTROL_INPUT: &str = "builtin.control-input";
/// Identifier of the host's control output unit.
pub const CONTROL_OUTPUT: &str = "builtin.control-output";

/// Category of a catalog unit, used to group the unit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitCategory {
    /// Host input/output endpoints
    Io,
    /// Sound sources driven by control data
    Instrument,
    /// Audio processors
    Effect,
    /// Mixing, splitting and control helpers
    Utility,
}

impl UnitCategory {
    /// Every category, in display order.
    pub const ALL: [UnitCategory; 4] = [
        UnitCategory::Io,
        UnitCategory::Instrument,
        UnitCategory::Effect,
        UnitCategory::Utility,
    ];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitCategory::Io => "I/O",
            UnitCategory::Instrument => "Instrument",
            UnitCategory::Effect => "Effect",
            UnitCategory::Utility => "Utility",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            UnitCategory::Io => "Audio and control endpoints provided by the host",
            UnitCategory::Instrument => "Synths and samplers played from a control input",
            UnitCategory::Effect => "Delays, reverbs, dynamics and other audio processors",
            UnitCategory::Utility => "Mixers, splitters and control filters",
        }
    }
}

/// Describes a unit in the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Pin layout and identity of the unit.
    pub descriptor: UnitDescriptor,
    /// Category for organization.
    pub category: UnitCategory,
    /// Brief description of the unit.
    pub description: &'static str,
}

/// Catalog of built-in processing units.
pub struct UnitCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitCatalog {
    /// Create a catalog with every built-in unit registered.
    pub fn new() -> Self {
        let mut catalog = Self {
            entries: Vec::with_capacity(13),
        };
        catalog.register_builtin_units();
        catalog
    }

    fn register_builtin_units(&mut self) {
        // Host endpoints
        self.register(
            UnitCategory::Io,
            "Stereo audio arriving from the audio interface",
            UnitDescriptor::new(AUDIO_INPUT, "Audio Input").with_output_bus("Input", 2),
        );
        self.register(
            UnitCategory::Io,
            "Stereo audio sent to the audio interface",
            UnitDescriptor::new(AUDIO_OUTPUT, "Audio Output").with_input_bus("Output", 2),
        );
        self.register(
            UnitCategory::Io,
            "Control events arriving from connected controllers",
            UnitDescriptor::new(CONTROL_INPUT, "Control Input").producing_control(),
        );
        self.register(
            UnitCategory::Io,
            "Control events sent to connected controllers",
            UnitDescriptor::new(CONTROL_OUTPUT, "Control Output").accepting_control(),
        );

        // Instruments
        self.register(
            UnitCategory::Instrument,
            "Polyphonic subtractive synthesizer",
            UnitDescriptor::new("builtin.synth", "Synth")
                .with_output_bus("Main", 2)
                .accepting_control(),
        );
        self.register(
            UnitCategory::Instrument,
            "Multi-output sample player",
            UnitDescriptor::new("builtin.sampler", "Sampler")
                .with_output_bus("Main", 2)
                .with_output_bus("Aux", 2)
                .accepting_control(),
        );

        // Effects
        self.register(
            UnitCategory::Effect,
            "Stereo feedback delay",
            UnitDescriptor::new("builtin.delay", "Delay")
                .with_input_bus("Main", 2)
                .with_output_bus("Main", 2),
        );
        self.register(
            UnitCategory::Effect,
            "Algorithmic stereo reverb",
            UnitDescriptor::new("builtin.reverb", "Reverb")
                .with_input_bus("Main", 2)
                .with_output_bus("Main", 2),
        );
        self.register(
            UnitCategory::Effect,
            "Compressor with mono sidechain input",
            UnitDescriptor::new("builtin.compressor", "Compressor")
                .with_input_bus("Main", 2)
                .with_input_bus("Sidechain", 1)
                .with_output_bus("Main", 2),
        );

        // Utilities
        self.register(
            UnitCategory::Utility,
            "Mono gain stage",
            UnitDescriptor::new("builtin.gain", "Gain")
                .with_input_bus("Main", 1)
                .with_output_bus("Main", 1),
        );
        self.register(
            UnitCategory::Utility,
            "Four stereo inputs summed to one stereo output",
            UnitDescriptor::new("builtin.mixer", "Mixer")
                .with_input_bus("Bus 1", 2)
                .with_input_bus("Bus 2", 2)
                .with_input_bus("Bus 3", 2)
                .with_input_bus("Bus 4", 2)
                .with_output_bus("Main", 2),
        );
        self.register(
            UnitCategory::Utility,
            "One stereo input copied to two stereo outputs",
            UnitDescriptor::new("builtin.splitter", "Splitter")
                .with_input_bus("Main", 2)
                .with_output_bus("A", 2)
                .with_output_bus("B", 2),
        );
        self.register(
            UnitCategory::Utility,
            "Passes or blocks control events by channel",
            UnitDescriptor::new("builtin.control-filter", "Control Filter")
                .accepting_control()
                .producing_control(),
        );
    }

    fn register(
        &mut self,
        category: UnitCategory,
        description: &'static str,
        descriptor: UnitDescriptor,
    ) {
        self.entries.push(CatalogEntry {
            descriptor,
            category,
            description,
        });
    }

    /// Get all registered units.
    pub fn all_units(&self) -> Vec<&CatalogEntry> {
        self.entries.iter().collect()
    }

    /// Get units in a specific category.
    pub fn units_in_category(&self, category: UnitCategory) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Look up a unit by identifier.
    pub fn get(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.identifier == identifier)
    }

    /// Create a processing unit by identifier.
    ///
    /// Returns `None` if the identifier is not in the catalog.
    pub fn create(&self, identifier: &str) -> Option<Arc<dyn ProcessingUnit>> {
        self.get(identifier)
            .map(|e| e.descriptor.clone().into_unit())
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no units.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The document a new session starts from: audio input, control input and
    /// audio output, unconnected.
    pub fn default_graph(&self) -> RoutingGraph {
        let mut graph = RoutingGraph::new();
        for (identifier, position) in [
            (AUDIO_INPUT, Position::new(0.5, 0.1)),
            (CONTROL_INPUT, Position::new(0.25, 0.1)),
            (AUDIO_OUTPUT, Position::new(0.5, 0.9)),
        ] {
            if let Some(unit) = self.create(identifier) {
                graph.add_node(unit, position);
            }
        }
        graph
    }

    /// Node ids of the host endpoints in `graph`, in catalog order.
    pub fn io_nodes(&self, graph: &RoutingGraph) -> Vec<NodeId> {
        graph
            .nodes()
            .filter(|n| {
                self.get(&n.unit().descriptor().identifier)
                    .is_some_and(|e| e.category == UnitCategory::Io)
            })
            .map(|n| n.id())
            .collect()
    }
}

impl UnitFactory for UnitCatalog {
    /// Recreates a unit from a persisted descriptor.
    ///
    /// The catalog's current pin layout wins over whatever layout was saved,
    /// so sessions follow unit upgrades.
    fn instantiate(&self, descriptor: &UnitDescriptor) -> Option<Arc<dyn ProcessingUnit>> {
        self.create(&descriptor.identifier)
    }
}
