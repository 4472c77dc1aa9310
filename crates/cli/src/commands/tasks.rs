use std::io::{self, Write};

use anyhow::Result;
use taskgraph_core::render::write_task_listing;
use taskgraph_core::taskfile_manager::TaskfileManager;

use super::heading;

pub fn execute(manager: &TaskfileManager) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", heading("Task Dependencies"))?;
    if manager.document().tasks.is_empty() {
        writeln!(out, "No tasks defined.")?;
        return Ok(());
    }
    write_task_listing(&mut out, manager.document())?;

    Ok(())
}
