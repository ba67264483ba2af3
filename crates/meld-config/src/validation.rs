//! Session file validation.
//!
//! [`SessionFile::restore`](crate::SessionFile::restore) stops at the first
//! problem. The functions here walk the whole file and report every problem,
//! which is what `meld check` prints.
//!
//! # Example
//!
//! ```rust
//! use meld_config::{SessionFile, validate_session};
//! use meld_registry::UnitCatalog;
//!
//! let catalog = UnitCatalog::new();
//! let session = SessionFile::from_graph("Default", &catalog.default_graph());
//! validate_session(&session, &catalog).expect("default document is valid");
//! ```

use std::collections::BTreeSet;

use meld_core::{ConnectionRejection, NodeId, RoutingGraph, UnitFactory};
use thiserror::Error;

use crate::address::PinAddress;
use crate::session::SessionFile;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Two node records share an id.
    #[error("duplicate node id {0}")]
    DuplicateNodeId(u32),

    /// A node id the graph cannot hold.
    #[error("node id {0} is out of range")]
    NodeIdOutOfRange(u32),

    /// A node record names a unit the factory cannot create.
    #[error("node {node}: unknown unit '{identifier}'")]
    UnknownUnit {
        /// Node id.
        node: u32,
        /// Unit identifier.
        identifier: String,
    },

    /// A node position lies outside the unit square.
    #[error("node {node}: position ({x}, {y}) out of range [0, 1]")]
    PositionOutOfRange {
        /// Node id.
        node: u32,
        /// Stored x.
        x: f64,
        /// Stored y.
        y: f64,
    },

    /// A connection references a node that is not in the file.
    #[error("connection {from} -> {to}: node {missing} does not exist")]
    DanglingEndpoint {
        /// Source address.
        from: PinAddress,
        /// Destination address.
        to: PinAddress,
        /// The missing node id.
        missing: u32,
    },

    /// A connection between existing nodes fails graph validation.
    #[error("connection {from} -> {to}: {reason}")]
    InvalidConnection {
        /// Source address.
        from: PinAddress,
        /// Destination address.
        to: PinAddress,
        /// Why the graph refuses it.
        reason: ConnectionRejection,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lists every problem in `session`, in file order.
///
/// Connections touching a node whose unit is unknown are not checked further,
/// since their pins cannot be resolved.
pub fn session_issues(session: &SessionFile, factory: &dyn UnitFactory) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    let mut declared = BTreeSet::new();
    let mut graph = RoutingGraph::new();

    for record in &session.nodes {
        if !declared.insert(record.id) {
            issues.push(ValidationError::DuplicateNodeId(record.id));
            continue;
        }
        if record.id > NodeId::MAX.index() {
            issues.push(ValidationError::NodeIdOutOfRange(record.id));
            continue;
        }
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(record.x) || !in_range(record.y) {
            issues.push(ValidationError::PositionOutOfRange {
                node: record.id,
                x: record.x,
                y: record.y,
            });
        }
        match factory.instantiate(&record.unit.to_descriptor()) {
            Some(unit) => {
                // Ids are unique and in range at this point.
                let _ = graph.add_node_with_id(
                    NodeId::from_raw(record.id),
                    unit,
                    record.position(),
                );
            }
            None => issues.push(ValidationError::UnknownUnit {
                node: record.id,
                identifier: record.unit.identifier.clone(),
            }),
        }
    }

    for record in &session.connections {
        let (from, to) = (record.source, record.destination);
        if let Some(missing) = [from.node, to.node]
            .into_iter()
            .find(|n| !declared.contains(n))
        {
            issues.push(ValidationError::DanglingEndpoint { from, to, missing });
            continue;
        }
        let resolvable = [from.node, to.node]
            .iter()
            .all(|n| graph.contains_node(NodeId::from_raw(*n)));
        if !resolvable {
            continue;
        }
        let connection = record.to_connection();
        match graph.check_connection(&connection) {
            Ok(()) => {
                let _ = graph.add_connection(connection);
            }
            Err(reason) => issues.push(ValidationError::InvalidConnection { from, to, reason }),
        }
    }

    issues
}

/// Validates a whole session file.
///
/// Returns the single problem found, or [`ValidationError::Multiple`] when
/// there are several.
pub fn validate_session(session: &SessionFile, factory: &dyn UnitFactory) -> ValidationResult<()> {
    let mut issues = session_issues(session, factory);
    match issues.len() {
        0 => Ok(()),
        1 => Err(issues.remove(0)),
        _ => Err(ValidationError::Multiple(issues)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ConnectionRecord, NodeRecord, UnitRecord};
    use meld_core::CONTROL_CHANNEL;
    use meld_registry::UnitCatalog;

    fn node(id: u32, identifier: &str) -> NodeRecord {
        NodeRecord {
            id,
            x: 0.5,
            y: 0.5,
            unit: UnitRecord {
                identifier: identifier.to_string(),
                name: identifier.to_string(),
                accepts_control: false,
                produces_control: false,
                inputs: Vec::new(),
                outputs: Vec::new(),
            },
        }
    }

    fn link(src: (u32, u32), dst: (u32, u32)) -> ConnectionRecord {
        ConnectionRecord {
            source: PinAddress::new(src.0, src.1),
            destination: PinAddress::new(dst.0, dst.1),
        }
    }

    fn session(nodes: Vec<NodeRecord>, connections: Vec<ConnectionRecord>) -> SessionFile {
        SessionFile {
            nodes,
            connections,
            ..SessionFile::new("test")
        }
    }

    #[test]
    fn valid_session_passes() {
        let s = session(
            vec![node(1, "builtin.delay"), node(2, "builtin.reverb")],
            vec![link((1, 0), (2, 0)), link((1, 1), (2, 1))],
        );
        assert!(validate_session(&s, &UnitCatalog::new()).is_ok());
    }

    #[test]
    fn reports_duplicate_ids() {
        let s = session(vec![node(1, "builtin.delay"), node(1, "builtin.gain")], vec![]);
        assert_eq!(
            validate_session(&s, &UnitCatalog::new()),
            Err(ValidationError::DuplicateNodeId(1))
        );
    }

    #[test]
    fn reports_reserved_node_id_and_skips_its_connections() {
        let s = session(
            vec![node(1, "builtin.delay"), node(u32::MAX, "builtin.delay")],
            vec![link((1, 0), (u32::MAX, 0))],
        );
        assert_eq!(
            validate_session(&s, &UnitCatalog::new()),
            Err(ValidationError::NodeIdOutOfRange(u32::MAX))
        );
    }

    #[test]
    fn reports_unknown_units_and_skips_their_connections() {
        let s = session(
            vec![node(1, "vendor.fuzz"), node(2, "builtin.delay")],
            vec![link((1, 0), (2, 0))],
        );
        let issues = session_issues(&s, &UnitCatalog::new());
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], ValidationError::UnknownUnit { node: 1, .. }));
    }

    #[test]
    fn reports_out_of_range_positions() {
        let mut far = node(1, "builtin.delay");
        far.x = 1.5;
        let issues = session_issues(&session(vec![far], vec![]), &UnitCatalog::new());
        assert!(matches!(
            issues[..],
            [ValidationError::PositionOutOfRange { node: 1, .. }]
        ));
    }

    #[test]
    fn reports_dangling_endpoints() {
        let s = session(vec![node(1, "builtin.delay")], vec![link((1, 0), (9, 0))]);
        assert!(matches!(
            session_issues(&s, &UnitCatalog::new())[..],
            [ValidationError::DanglingEndpoint { missing: 9, .. }]
        ));
    }

    #[test]
    fn reports_invalid_connections_with_reason() {
        let s = session(
            vec![node(1, "builtin.control-input"), node(2, "builtin.delay")],
            vec![
                link((1, CONTROL_CHANNEL), (2, 0)),
                link((2, 0), (2, 1)),
                link((2, 7), (1, 0)),
            ],
        );
        let reasons: Vec<ConnectionRejection> = session_issues(&s, &UnitCatalog::new())
            .into_iter()
            .filter_map(|e| match e {
                ValidationError::InvalidConnection { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], ConnectionRejection::KindMismatch);
        assert!(matches!(reasons[1], ConnectionRejection::SelfLoop(_)));
        assert!(matches!(reasons[2], ConnectionRejection::MissingEndpoint(_)));
    }

    #[test]
    fn reports_duplicate_connections() {
        let s = session(
            vec![node(1, "builtin.delay"), node(2, "builtin.delay")],
            vec![link((1, 0), (2, 0)), link((1, 0), (2, 0))],
        );
        assert_eq!(
            validate_session(&s, &UnitCatalog::new()),
            Err(ValidationError::InvalidConnection {
                from: PinAddress::new(1, 0),
                to: PinAddress::new(2, 0),
                reason: ConnectionRejection::Duplicate,
            })
        );
    }

    #[test]
    fn several_issues_are_bundled() {
        let s = session(
            vec![node(1, "builtin.delay"), node(1, "builtin.delay"), node(2, "x")],
            vec![],
        );
        let err = validate_session(&s, &UnitCatalog::new()).unwrap_err();
        let ValidationError::Multiple(all) = err else {
            panic!("expected Multiple");
        };
        assert_eq!(all.len(), 2);
    }
}
