//! Compact `node:channel` pin addresses used in session files and on the
//! command line.

use std::fmt;
use std::str::FromStr;

use meld_core::{CONTROL_CHANNEL, NodeId, PinRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyword standing in for the control channel.
const CONTROL_KEYWORD: &str = "ctl";

/// Error returned when a pin address string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pin address '{0}': expected NODE:CHANNEL or NODE:ctl")]
pub struct AddressParseError(String);

/// A pin address without its role: `"3:1"` is node 3 channel 1, `"3:ctl"` is
/// node 3's control channel.
///
/// The role (input or output) comes from where the address is used, so the
/// same value serves as a connection source or destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PinAddress {
    /// Node id.
    pub node: u32,
    /// Channel index, or [`CONTROL_CHANNEL`].
    pub channel: u32,
}

impl PinAddress {
    /// Creates an address.
    pub const fn new(node: u32, channel: u32) -> Self {
        Self { node, channel }
    }

    /// Resolves the address as an output pin.
    pub fn as_output(self) -> PinRef {
        PinRef::output(NodeId::from_raw(self.node), self.channel)
    }

    /// Resolves the address as an input pin.
    pub fn as_input(self) -> PinRef {
        PinRef::input(NodeId::from_raw(self.node), self.channel)
    }
}

impl From<PinRef> for PinAddress {
    fn from(pin: PinRef) -> Self {
        Self::new(pin.node.index(), pin.channel)
    }
}

impl FromStr for PinAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AddressParseError(s.to_string());
        let (node, channel) = s.trim().split_once(':').ok_or_else(err)?;
        let node = node.trim().parse::<u32>().map_err(|_| err())?;
        let channel = channel.trim();
        let channel = if channel.eq_ignore_ascii_case(CONTROL_KEYWORD) {
            CONTROL_CHANNEL
        } else {
            match channel.parse::<u32>() {
                Ok(index) if index != CONTROL_CHANNEL => index,
                _ => return Err(err()),
            }
        };
        Ok(Self { node, channel })
    }
}

impl TryFrom<String> for PinAddress {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PinAddress> for String {
    fn from(address: PinAddress) -> Self {
        address.to_string()
    }
}

impl fmt::Display for PinAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.channel == CONTROL_CHANNEL {
            write!(f, "{}:{CONTROL_KEYWORD}", self.node)
        } else {
            write!(f, "{}:{}", self.node, self.channel)
        }
    }
}
