//! Saved session listing command.

use std::path::PathBuf;

use clap::Args;
use meld_config::{
    SessionFile, list_sessions, list_sessions_in, session_name_from_path, user_sessions_dir,
};

#[derive(Args)]
pub struct SessionsArgs {
    /// Directory to list instead of the user sessions directory
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

pub fn run(args: SessionsArgs) -> anyhow::Result<()> {
    let (dir, sessions) = match args.dir {
        Some(dir) => {
            let sessions = list_sessions_in(&dir);
            (dir, sessions)
        }
        None => (user_sessions_dir(), list_sessions()),
    };

    println!("Sessions in {}", dir.display());
    if sessions.is_empty() {
        println!("  (none)");
        println!();
        println!("Create one with: meld new {}", dir.join("<name>.toml").display());
        return Ok(());
    }

    for path in sessions {
        let name = session_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
        match SessionFile::load(&path) {
            Ok(session) => {
                let desc = session.description.as_deref().unwrap_or("");
                println!(
                    "  {:20} {:>3} units {:>3} links  {}",
                    name,
                    session.nodes.len(),
                    session.connections.len(),
                    desc
                );
            }
            Err(_) => println!("  {name:20} (error loading)"),
        }
    }
    Ok(())
}
