//! Session validation command.

use clap::Args;
use meld_config::{SessionFile, session_issues};
use meld_registry::UnitCatalog;

use super::common::resolve_session;

#[derive(Args)]
pub struct CheckArgs {
    /// Session file or saved session name
    session: String,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let path = resolve_session(&args.session)?;
    let file = SessionFile::load(&path)?;
    let issues = session_issues(&file, &UnitCatalog::new());

    if issues.is_empty() {
        println!(
            "{}: OK ({} units, {} connections)",
            file.name,
            file.nodes.len(),
            file.connections.len()
        );
        return Ok(());
    }

    println!("{}: {} issue(s)", file.name, issues.len());
    for issue in &issues {
        println!("  - {issue}");
    }
    anyhow::bail!("{} failed validation", path.display())
}
