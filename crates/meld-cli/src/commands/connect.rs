//! Connect or disconnect two pins in a session.

use clap::Args;
use meld_config::PinAddress;
use meld_core::Connection;
use meld_registry::UnitCatalog;

use super::common::{open_session, write_session};

#[derive(Args)]
pub struct ConnectArgs {
    /// Session file or saved session name
    session: String,

    /// Output pin, as `node:channel` or `node:ctl`
    source: PinAddress,

    /// Input pin, as `node:channel` or `node:ctl`
    destination: PinAddress,

    /// Remove the connection instead of adding it
    #[arg(long)]
    remove: bool,
}

pub fn run(args: ConnectArgs) -> anyhow::Result<()> {
    let catalog = UnitCatalog::new();
    let (path, file, mut graph) = open_session(&args.session, &catalog)?;
    let connection = Connection::new(args.source.as_output(), args.destination.as_input());

    if args.remove {
        if !graph.remove_connection(&connection) {
            anyhow::bail!("{} is not connected", connection);
        }
        write_session(&path, &file, &graph)?;
        println!("Disconnected {connection}");
    } else {
        graph.add_connection(connection)?;
        write_session(&path, &file, &graph)?;
        println!("Connected {connection}");
    }
    Ok(())
}
