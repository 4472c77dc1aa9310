//! Result types for Taskfile manager operations
//!
//! Presentation-ready records returned by [`crate::TaskfileManager`] and
//! consumed by the renderers.

use crate::graph::TaskfileGraph;
use crate::types::TaskfileResult;

/// One include declared by a Taskfile, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSummary {
    pub namespace: String,
    pub taskfile: String,
}

/// A Taskfile's place in the topological order of the inclusion graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionEntry {
    /// 1-based
    pub position: usize,
    pub location: String,
    pub includes: Vec<IncludeSummary>,
}

/// Build the inclusion listing, failing if the graph has a cycle
pub fn inclusion_entries(graph: &TaskfileGraph) -> TaskfileResult<Vec<InclusionEntry>> {
    let order = graph.topological_sort()?;

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(i, index)| {
            let vertex = &graph[index];
            InclusionEntry {
                position: i + 1,
                location: vertex.location.clone(),
                includes: vertex
                    .taskfile
                    .includes
                    .iter()
                    .map(|include| IncludeSummary {
                        namespace: include.namespace.clone(),
                        taskfile: include.taskfile.clone(),
                    })
                    .collect(),
            }
        })
        .collect())
}
