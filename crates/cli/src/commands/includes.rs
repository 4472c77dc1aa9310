use std::io::{self, Write};

use anyhow::Result;
use taskgraph_core::render::write_inclusion_graph;
use taskgraph_core::taskfile_manager::TaskfileManager;

use super::heading;

pub fn execute(manager: &TaskfileManager) -> Result<()> {
    let entries = manager.inclusion_order()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", heading("Taskfile Inclusion Graph"))?;
    write_inclusion_graph(&mut out, &entries)?;

    Ok(())
}
