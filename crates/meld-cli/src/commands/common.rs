//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use meld_config::{SessionFile, find_session};
use meld_core::RoutingGraph;
use meld_registry::UnitCatalog;

/// Resolve a session argument to a file.
///
/// Accepts a path to an existing file, or the name of a session saved in the
/// user sessions directory.
pub fn resolve_session(name: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(name);
    if path.exists() {
        return Ok(path);
    }
    if let Some(path) = find_session(name) {
        return Ok(path);
    }
    anyhow::bail!("Session '{}' not found", name)
}

/// Load a session and rebuild its graph from the built-in catalog.
pub fn open_session(
    name: &str,
    catalog: &UnitCatalog,
) -> anyhow::Result<(PathBuf, SessionFile, RoutingGraph)> {
    let path = resolve_session(name)?;
    let file = SessionFile::load(&path)?;
    let graph = file.restore(catalog)?;
    tracing::debug!(path = %path.display(), nodes = graph.node_count(), "session opened");
    Ok((path, file, graph))
}

/// Write `graph` back to `path`, keeping the session's name and description.
pub fn write_session(path: &Path, previous: &SessionFile, graph: &RoutingGraph) -> anyhow::Result<()> {
    let mut file = SessionFile::from_graph(&previous.name, graph);
    file.description.clone_from(&previous.description);
    file.save(path)?;
    Ok(())
}
