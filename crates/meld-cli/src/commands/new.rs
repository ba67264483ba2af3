//! Create a session holding the default I/O units.

use std::path::PathBuf;

use clap::Args;
use meld_config::{SessionFile, session_name_from_path};
use meld_registry::UnitCatalog;

#[derive(Args)]
pub struct NewArgs {
    /// Session file to create
    path: PathBuf,

    /// Session name (defaults to the file name)
    #[arg(long)]
    name: Option<String>,

    /// Optional description
    #[arg(long)]
    description: Option<String>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: NewArgs) -> anyhow::Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }

    let name = args
        .name
        .or_else(|| session_name_from_path(&args.path))
        .unwrap_or_else(|| "Untitled".to_string());
    let graph = UnitCatalog::new().default_graph();
    let mut file = SessionFile::from_graph(name, &graph);
    file.description = args.description;
    file.save(&args.path)?;

    println!(
        "Created {} ({} units)",
        args.path.display(),
        graph.node_count()
    );
    Ok(())
}
