use std::io::{self, Write};

use anyhow::Result;
use taskgraph_core::render::write_tree_from;
use taskgraph_core::taskfile_manager::TaskfileManager;

use super::heading;

pub fn execute(manager: &TaskfileManager, task: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(
        out,
        "{}",
        heading(&format!("Complete Dependency Tree from '{}' task", task))
    )?;
    write_tree_from(&mut out, manager.document(), task)?;

    Ok(())
}
