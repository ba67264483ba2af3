//! Session files and editor configuration for the meld routing editor.
//!
//! # Features
//!
//! - **Session files**: Persist a routing graph as a flat TOML document of node
//!   and connection records, and restore it through a [`UnitFactory`]
//! - **Editor settings**: Canvas geometry and interaction thresholds
//! - **Validation**: Report every problem in a session file at once
//! - **Paths**: Platform-specific config and session directories
//!
//! # Example
//!
//! ```rust,no_run
//! use meld_config::{SessionFile, user_sessions_dir};
//! use meld_registry::UnitCatalog;
//!
//! let catalog = UnitCatalog::new();
//! let graph = catalog.default_graph();
//!
//! let session = SessionFile::from_graph("Live Rig", &graph);
//! let path = user_sessions_dir().join("live_rig.toml");
//! session.save(&path).unwrap();
//!
//! let restored = SessionFile::load(&path).unwrap().restore(&catalog).unwrap();
//! assert_eq!(restored.node_count(), graph.node_count());
//! ```
//!
//! [`UnitFactory`]: meld_core::UnitFactory

mod address;
mod error;
mod session;
mod settings;

/// Platform-specific paths for sessions and configuration.
pub mod paths;

/// Session file validation.
pub mod validation;

pub use address::{AddressParseError, PinAddress};
pub use error::ConfigError;
pub use paths::{
    ensure_user_config_dir, ensure_user_sessions_dir, find_session, list_sessions, list_sessions_in,
    session_name_from_path, settings_path, user_config_dir, user_sessions_dir,
};
pub use session::{BusRecord, ConnectionRecord, NodeRecord, SessionFile, UnitRecord};
pub use settings::EditorSettings;
pub use validation::{ValidationError, ValidationResult, session_issues, validate_session};
