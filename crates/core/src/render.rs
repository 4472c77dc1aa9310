//! Plain-text renderers for the inclusion graph and the task document
//!
//! Every renderer writes line-oriented text to any [`Write`] sink so the CLI
//! can point them at stdout and tests can capture them in a buffer.

use std::io::{self, Write};

use crate::configs::CommandEntry;
use crate::document::TaskDocument;
use crate::results::InclusionEntry;
use crate::types::TaskfileError;

const INDENT: &str = "  ";

/// Root location and version of the merged document
pub fn write_summary<W: Write>(out: &mut W, document: &TaskDocument) -> io::Result<()> {
    writeln!(out, "Location: {}", document.location)?;
    let version = document
        .version
        .as_deref()
        .map(semver_form)
        .unwrap_or_default();
    writeln!(out, "Version: {}", version)
}

/// `3` and `3.1` widen to `3.0.0` and `3.1.0`; anything not numeric is kept as written
fn semver_form(version: &str) -> String {
    let parts: Vec<&str> = version.split('.').collect();
    let numeric = parts
        .iter()
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));

    if !numeric || parts.len() > 3 {
        return version.to_string();
    }

    let mut parts = parts;
    parts.resize(3, "0");
    parts.join(".")
}

/// Taskfiles in topological order, each with the includes it declares
pub fn write_inclusion_graph<W: Write>(out: &mut W, entries: &[InclusionEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}. Taskfile: {}", entry.position, entry.location)?;

        if !entry.includes.is_empty() {
            writeln!(out, "   Includes:")?;
            for include in &entry.includes {
                writeln!(out, "     - {}: {}", include.namespace, include.taskfile)?;
            }
        }
    }
    Ok(())
}

/// Every task with its direct dependencies and commands
pub fn write_task_listing<W: Write>(out: &mut W, document: &TaskDocument) -> io::Result<()> {
    for task in document.tasks.iter() {
        write!(out, "Task: {}", task.name)?;
        if let Some(desc) = task.description() {
            write!(out, " - {}", desc)?;
        }
        writeln!(out)?;

        if !task.deps.is_empty() {
            writeln!(out, "  Dependencies:")?;
            for dep in &task.deps {
                writeln!(out, "    - {}", dep)?;
            }
        }

        if !task.cmds.is_empty() {
            writeln!(out, "  Commands:")?;
            for cmd in &task.cmds {
                match cmd {
                    CommandEntry::Literal(cmd) => writeln!(out, "    - cmd: {}", cmd)?,
                    CommandEntry::TaskCall(name) => writeln!(out, "    - task: {}", name)?,
                }
            }
        }

        writeln!(out)?;
    }
    Ok(())
}

/// Recursively print what `task_name` depends on and calls
///
/// Missing tasks print as `<name> (not found)`. A task already on the
/// current path prints as `<name> (cycle)` and is not expanded again.
/// Tasks reached along different paths are printed every time.
pub fn write_dependency_tree<W: Write>(
    out: &mut W,
    document: &TaskDocument,
    task_name: &str,
) -> io::Result<()> {
    let mut path = Vec::new();
    write_subtree(out, document, task_name, 0, &mut path)
}

fn write_subtree<W: Write>(
    out: &mut W,
    document: &TaskDocument,
    task_name: &str,
    depth: usize,
    path: &mut Vec<String>,
) -> io::Result<()> {
    let indent = INDENT.repeat(depth);

    let Some(task) = document.tasks.get(task_name) else {
        return writeln!(out, "{}{} (not found)", indent, task_name);
    };

    if path.iter().any(|seen| seen == &task.name) {
        return writeln!(out, "{}{} (cycle)", indent, task_name);
    }

    write!(out, "{}{}", indent, task_name)?;
    if let Some(desc) = task.description() {
        write!(out, " - {}", desc)?;
    }
    writeln!(out)?;

    path.push(task.name.clone());
    for child in task.direct_dependencies() {
        write_subtree(out, document, child, depth + 1, path)?;
    }
    path.pop();

    Ok(())
}

/// Print the tree from `start`, or the available task names if it is missing
pub fn write_tree_from<W: Write>(
    out: &mut W,
    document: &TaskDocument,
    start: &str,
) -> io::Result<()> {
    match document.task(start) {
        Ok(_) => write_dependency_tree(out, document, start),
        Err(TaskfileError::TaskNotFound(name)) => write_available_tasks(out, document, &name),
        Err(other) => Err(io::Error::other(other.to_string())),
    }
}

fn write_available_tasks<W: Write>(
    out: &mut W,
    document: &TaskDocument,
    missing: &str,
) -> io::Result<()> {
    writeln!(out, "Task '{}' not found", missing)?;
    writeln!(out, "Available tasks:")?;
    for name in document.tasks.names() {
        writeln!(out, "{}- {}", INDENT, name)?;
    }
    Ok(())
}
