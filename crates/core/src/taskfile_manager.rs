//! High-level Taskfile session
//!
//! [`TaskfileManager`] loads a Taskfile once through a [`DocumentProvider`]
//! and answers every question the CLI asks about it: the merged document
//! and the inclusion order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskgraph_core::provider::ReaderConfig;
//! use taskgraph_core::reader::TaskfileReader;
//! use taskgraph_core::taskfile_manager::{TaskfileManager, TaskfileManagerConfig};
//!
//! # async fn example() -> taskgraph_core::types::TaskfileResult<()> {
//! let reader = TaskfileReader::new(ReaderConfig::default())?;
//! let manager = TaskfileManager::new(
//!     &reader,
//!     TaskfileManagerConfig {
//!         locator: "Taskfile.yml".to_string(),
//!     },
//! )
//! .await?;
//!
//! for entry in manager.inclusion_order()? {
//!     println!("{}. {}", entry.position, entry.location);
//! }
//! # Ok(())
//! # }
//! ```

use crate::document::TaskDocument;
use crate::graph::TaskfileGraph;
use crate::provider::DocumentProvider;
use crate::results::{inclusion_entries, InclusionEntry};
use crate::types::TaskfileResult;

/// Configuration for loading a Taskfile session
pub struct TaskfileManagerConfig {
    /// Path, URL or Git reference of the root Taskfile
    pub locator: String,
}

/// A loaded Taskfile: its inclusion graph and the merged document
pub struct TaskfileManager {
    pub graph: TaskfileGraph,
    pub document: TaskDocument,
}

impl TaskfileManager {
    /// Resolve and merge the Taskfile named by the config
    pub async fn new<P: DocumentProvider>(
        provider: &P,
        config: TaskfileManagerConfig,
    ) -> TaskfileResult<Self> {
        let graph = provider.resolve(&config.locator).await?;
        let document = provider.merge(&graph)?;

        tracing::debug!(
            "Loaded {} with {} Taskfiles and {} tasks",
            document.location,
            graph.vertex_count(),
            document.tasks.len()
        );

        Ok(Self { graph, document })
    }

    pub fn document(&self) -> &TaskDocument {
        &self.document
    }

    /// Taskfiles in topological order
    pub fn inclusion_order(&self) -> TaskfileResult<Vec<InclusionEntry>> {
        inclusion_entries(&self.graph)
    }
}
