//! Add a catalog unit to a session.

use clap::Args;
use meld_core::Position;
use meld_registry::UnitCatalog;

use super::common::{open_session, write_session};

#[derive(Args)]
pub struct AddArgs {
    /// Session file or saved session name
    session: String,

    /// Unit identifier (see 'meld units')
    unit: String,

    /// Horizontal position, 0..1
    #[arg(long, default_value = "0.5")]
    x: f64,

    /// Vertical position, 0..1
    #[arg(long, default_value = "0.5")]
    y: f64,
}

pub fn run(args: AddArgs) -> anyhow::Result<()> {
    let catalog = UnitCatalog::new();
    let (path, file, mut graph) = open_session(&args.session, &catalog)?;

    let unit = catalog
        .create(&args.unit)
        .ok_or_else(|| anyhow::anyhow!("Unknown unit: {}", args.unit))?;
    let id = graph.add_node(unit, Position::new(args.x, args.y));
    write_session(&path, &file, &graph)?;

    println!("Added {} as node {}", args.unit, id.index());
    Ok(())
}
