use std::io::{self, Write};

use anyhow::Result;
use taskgraph_core::render::{
    write_inclusion_graph, write_summary, write_task_listing, write_tree_from,
};
use taskgraph_core::taskfile_manager::TaskfileManager;

use super::heading;

pub fn execute(manager: &TaskfileManager, start: &str) -> Result<()> {
    let inclusion_order = manager.inclusion_order()?;
    let document = manager.document();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{}", heading("Taskfile Graph Analysis"))?;
    write_summary(&mut out, document)?;
    writeln!(out)?;

    writeln!(out, "{}", heading("Taskfile Inclusion Graph"))?;
    write_inclusion_graph(&mut out, &inclusion_order)?;
    writeln!(out)?;

    // Each task entry ends with its own blank line
    writeln!(out, "{}", heading("Task Dependencies"))?;
    write_task_listing(&mut out, document)?;

    writeln!(
        out,
        "{}",
        heading(&format!("Complete Dependency Tree from '{}' task", start))
    )?;
    write_tree_from(&mut out, document, start)?;

    Ok(())
}
