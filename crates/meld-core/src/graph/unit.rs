//! Processing-unit host interface.
//!
//! The routing graph never processes audio itself. It only needs to know how
//! many channels a unit exposes, whether it carries a control channel, and how
//! its channels are grouped into buses. [`ProcessingUnit`] is that seam;
//! [`UnitDescriptor`] is the plain-data implementation used for built-in units
//! and for anything restored from a session file.

use std::sync::Arc;

use super::pin::CONTROL_CHANNEL;

/// A named group of channels on one side of a unit (e.g. "Main" stereo,
/// "Sidechain" mono).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bus {
    /// Display name of the bus.
    pub name: String,
    /// Number of channels in the bus.
    pub channels: u32,
}

impl Bus {
    /// Creates a bus.
    pub fn new(name: impl Into<String>, channels: u32) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// Short channel-type label for a channel offset within this bus.
    ///
    /// Mono buses use `M`, stereo buses `L`/`R`; wider buses are numbered from 1.
    pub fn channel_abbreviation(&self, offset: u32) -> String {
        match (self.channels, offset) {
            (1, 0) => "M".to_string(),
            (2, 0) => "L".to_string(),
            (2, 1) => "R".to_string(),
            (_, n) => (n + 1).to_string(),
        }
    }
}

/// Host-side view of a processing unit.
///
/// Implemented by whatever wraps real plugins; the editor and graph only call
/// these methods on the interaction thread.
pub trait ProcessingUnit: Send + Sync {
    /// Human-readable name shown on the node.
    fn display_name(&self) -> &str;

    /// Total number of audio input channels across all input buses.
    fn total_input_channels(&self) -> u32;

    /// Total number of audio output channels across all output buses.
    fn total_output_channels(&self) -> u32;

    /// Whether the unit accepts a control/event input channel.
    fn accepts_control(&self) -> bool;

    /// Whether the unit produces a control/event output channel.
    fn produces_control(&self) -> bool;

    /// Persistable description of this unit, used to recreate it on load.
    fn descriptor(&self) -> UnitDescriptor;

    /// Bus layout for one side.
    ///
    /// Defaults to a single "Main Input"/"Main Output" bus holding every
    /// channel, or no bus at all when the side has no audio channels.
    fn buses(&self, is_input: bool) -> Vec<Bus> {
        let (name, total) = if is_input {
            ("Main Input", self.total_input_channels())
        } else {
            ("Main Output", self.total_output_channels())
        };
        if total == 0 {
            Vec::new()
        } else {
            vec![Bus::new(name, total)]
        }
    }

    /// Maps an absolute channel index to `(bus_index, offset_in_bus)`.
    ///
    /// Returns `None` for the control channel and for channels beyond the
    /// declared buses.
    fn bus_of_channel(&self, is_input: bool, channel: u32) -> Option<(usize, u32)> {
        if channel == CONTROL_CHANNEL {
            return None;
        }
        let mut first = 0;
        for (index, bus) in self.buses(is_input).iter().enumerate() {
            if channel < first + bus.channels {
                return Some((index, channel - first));
            }
            first += bus.channels;
        }
        None
    }

    /// Tooltip text describing one pin.
    fn pin_description(&self, is_input: bool, channel: u32) -> String {
        if channel == CONTROL_CHANNEL {
            return if is_input {
                "Control Input".to_string()
            } else {
                "Control Output".to_string()
            };
        }
        let buses = self.buses(is_input);
        match self.bus_of_channel(is_input, channel) {
            Some((bus, offset)) => {
                format!(
                    "{}: {}",
                    buses[bus].name,
                    buses[bus].channel_abbreviation(offset)
                )
            }
            None if is_input => format!("Main Input: {}", channel + 1),
            None => format!("Main Output: {}", channel + 1),
        }
    }
}

/// Plain-data unit description.
///
/// Doubles as a [`ProcessingUnit`] so descriptor-only units (host I/O,
/// placeholders for units restored from disk) can sit in the graph directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// Stable identifier used to look the unit up again (e.g. `"builtin.delay"`).
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Input bus layout.
    pub input_buses: Vec<Bus>,
    /// Output bus layout.
    pub output_buses: Vec<Bus>,
    /// Whether a control input is exposed.
    pub accepts_control: bool,
    /// Whether a control output is exposed.
    pub produces_control: bool,
}

impl UnitDescriptor {
    /// Creates a descriptor with no buses and no control channels.
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            input_buses: Vec::new(),
            output_buses: Vec::new(),
            accepts_control: false,
            produces_control: false,
        }
    }

    /// Appends an input bus.
    pub fn with_input_bus(mut self, name: impl Into<String>, channels: u32) -> Self {
        self.input_buses.push(Bus::new(name, channels));
        self
    }

    /// Appends an output bus.
    pub fn with_output_bus(mut self, name: impl Into<String>, channels: u32) -> Self {
        self.output_buses.push(Bus::new(name, channels));
        self
    }

    /// Exposes a control input.
    pub fn accepting_control(mut self) -> Self {
        self.accepts_control = true;
        self
    }

    /// Exposes a control output.
    pub fn producing_control(mut self) -> Self {
        self.produces_control = true;
        self
    }

    /// Wraps the descriptor as a shareable processing unit.
    pub fn into_unit(self) -> Arc<dyn ProcessingUnit> {
        Arc::new(self)
    }
}

impl ProcessingUnit for UnitDescriptor {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn total_input_channels(&self) -> u32 {
        self.input_buses
            .iter()
            .fold(0, |total, b| total.saturating_add(b.channels))
    }

    fn total_output_channels(&self) -> u32 {
        self.output_buses
            .iter()
            .fold(0, |total, b| total.saturating_add(b.channels))
    }

    fn accepts_control(&self) -> bool {
        self.accepts_control
    }

    fn produces_control(&self) -> bool {
        self.produces_control
    }

    fn descriptor(&self) -> UnitDescriptor {
        self.clone()
    }

    fn buses(&self, is_input: bool) -> Vec<Bus> {
        if is_input {
            self.input_buses.clone()
        } else {
            self.output_buses.clone()
        }
    }
}

/// Creates processing units from descriptors.
///
/// Implemented by unit catalogs and plugin hosts; used when a session is
/// restored from disk.
pub trait UnitFactory {
    /// Instantiates the unit described by `descriptor`, or `None` if the
    /// factory does not know its identifier.
    fn instantiate(&self, descriptor: &UnitDescriptor) -> Option<Arc<dyn ProcessingUnit>>;
}
