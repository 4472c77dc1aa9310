use std::collections::HashMap;
use std::ops::Index;

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::prelude::*;
use petgraph::Direction;

use crate::configs::Taskfile;
use crate::node::Node;
use crate::types::{TaskfileError, TaskfileResult};

/// A parsed Taskfile at a resolved location
#[derive(Debug, Clone)]
pub struct TaskfileVertex {
    pub location: String,
    pub node: Node,
    pub taskfile: Taskfile,
}

/// "includer includes included", labelled with the include namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeEdge {
    pub namespace: String,
}

/// The inclusion graph of a root Taskfile
///
/// Vertices are unique by location. The first vertex added is the root.
#[derive(Debug, Default)]
pub struct TaskfileGraph {
    graph: DiGraph<TaskfileVertex, IncludeEdge>,
    by_location: HashMap<String, NodeIndex>,
}

impl TaskfileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.graph.node_indices().next()
    }

    /// Add a vertex unless its location is already present
    ///
    /// Returns the index and whether a new vertex was created.
    pub fn add_vertex(&mut self, vertex: TaskfileVertex) -> (NodeIndex, bool) {
        if let Some(&index) = self.by_location.get(&vertex.location) {
            return (index, false);
        }

        let location = vertex.location.clone();
        let index = self.graph.add_node(vertex);
        self.by_location.insert(location, index);
        (index, true)
    }

    pub fn add_include(&mut self, from: NodeIndex, to: NodeIndex, namespace: &str) {
        self.graph.add_edge(
            from,
            to,
            IncludeEdge {
                namespace: namespace.to_string(),
            },
        );
    }

    pub fn index_of(&self, location: &str) -> Option<NodeIndex> {
        self.by_location.get(location).copied()
    }

    /// The vertex included by `from` under `namespace`, if it was read
    pub fn include_target(&self, from: NodeIndex, namespace: &str) -> Option<NodeIndex> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|edge| edge.weight().namespace == namespace)
            .map(|edge| edge.target())
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn include_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vertices ordered so that every includer precedes what it includes
    pub fn topological_sort(&self) -> TaskfileResult<Vec<NodeIndex>> {
        toposort(&self.graph, None).map_err(|cycle| {
            let cycles = self.cycles();
            let description = if cycles.is_empty() {
                self.graph[cycle.node_id()].location.clone()
            } else {
                cycles
                    .iter()
                    .map(|cycle| {
                        let mut path = cycle.clone();
                        if let Some(first) = path.first().cloned() {
                            path.push(first);
                        }
                        path.join(" -> ")
                    })
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            TaskfileError::CycleDetected(description)
        })
    }

    /// Include cycles, each as a sorted list of locations
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let graph = &self.graph;
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
            .into_iter()
            .filter_map(|component| {
                if component.len() > 1 {
                    let mut cycle = component
                        .iter()
                        .map(|node| graph[*node].location.clone())
                        .collect::<Vec<_>>();
                    cycle.sort();
                    Some(cycle)
                } else {
                    let node = component[0];
                    if graph.contains_edge(node, node) {
                        Some(vec![graph[node].location.clone()])
                    } else {
                        None
                    }
                }
            })
            .collect();

        cycles.sort();
        cycles
    }
}

impl Index<NodeIndex> for TaskfileGraph {
    type Output = TaskfileVertex;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.graph[index]
    }
}
