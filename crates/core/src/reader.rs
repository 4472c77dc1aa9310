//! Taskfile reader
//!
//! [`TaskfileReader`] is the [`DocumentProvider`] used by the CLI. It walks
//! the includes of a root Taskfile depth-first, reading local files from
//! disk and remote ones through the [`RemoteCache`], and builds the
//! [`TaskfileGraph`].

use std::path::{Path, PathBuf};

use crate::cache::{checksum, RemoteCache};
use crate::configs::parse_taskfile;
use crate::document::TaskDocument;
use crate::graph::{TaskfileGraph, TaskfileVertex};
use crate::merge::merge_graph;
use crate::node::Node;
use crate::provider::{DocumentProvider, ReaderConfig};
use crate::types::{TaskfileError, TaskfileResult};

pub struct TaskfileReader {
    config: ReaderConfig,
    cache: RemoteCache,
    base_dir: PathBuf,
}

impl TaskfileReader {
    /// Create a reader resolving relative locators against the current directory
    pub fn new(config: ReaderConfig) -> TaskfileResult<Self> {
        let base_dir = std::env::current_dir().map_err(|e| {
            TaskfileError::ResolutionFailed(format!("Failed to determine current directory: {}", e))
        })?;
        Self::with_base_dir(config, base_dir)
    }

    pub fn with_base_dir(config: ReaderConfig, base_dir: PathBuf) -> TaskfileResult<Self> {
        let cache = RemoteCache::new(&config.temp_dir, config.timeout).map_err(|e| {
            TaskfileError::ResolutionFailed(format!("Failed to initialize remote cache: {:#}", e))
        })?;

        Ok(Self {
            config,
            cache,
            base_dir,
        })
    }

    pub fn cache(&self) -> &RemoteCache {
        &self.cache
    }

    fn debug(&self, message: &str) {
        match &self.config.debug {
            Some(debug) => debug(message),
            None => tracing::debug!("{}", message),
        }
    }

    fn prompt(&self, node: &Node, message: &str) -> TaskfileResult<()> {
        let Some(prompt) = &self.config.prompt else {
            return Ok(());
        };

        prompt(message).map_err(|e| {
            TaskfileError::ResolutionFailed(format!(
                "Remote Taskfile {} was not accepted: {}",
                node, e
            ))
        })
    }

    async fn read_graph(&self, locator: &str) -> TaskfileResult<TaskfileGraph> {
        let mut graph = TaskfileGraph::new();

        let root_node = Node::from_locator(locator, &self.base_dir)?;
        let (root, _) = graph.add_vertex(self.read_vertex(root_node).await?);

        let mut pending = vec![root];
        while let Some(index) = pending.pop() {
            let node = graph[index].node.clone();
            let includes = graph[index].taskfile.includes.clone();
            let mut children = Vec::new();

            for include in &includes {
                let child_node = node.resolve_include(&include.taskfile)?;

                if let Some(existing) = graph.index_of(&child_node.location()) {
                    tracing::trace!(
                        "{} includes already read {} as '{}'",
                        node,
                        child_node,
                        include.namespace
                    );
                    graph.add_include(index, existing, &include.namespace);
                    continue;
                }

                if include.optional && !self.can_read(&child_node) {
                    self.debug(&format!(
                        "Skipping optional include '{}': {} not found",
                        include.namespace, child_node
                    ));
                    continue;
                }

                let vertex = match self.read_vertex(child_node).await {
                    Ok(vertex) => vertex,
                    Err(e) if include.optional => {
                        self.debug(&format!(
                            "Skipping optional include '{}': {}",
                            include.namespace, e
                        ));
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let (child, _) = graph.add_vertex(vertex);
                graph.add_include(index, child, &include.namespace);
                children.push(child);
            }

            // Reversed so the first include is read next
            pending.extend(children.into_iter().rev());
        }

        tracing::trace!(
            "Read {} Taskfiles with {} includes",
            graph.vertex_count(),
            graph.include_count()
        );
        Ok(graph)
    }

    fn can_read(&self, node: &Node) -> bool {
        match node {
            Node::File { path } => path.is_file(),
            _ => true,
        }
    }

    async fn read_vertex(&self, node: Node) -> TaskfileResult<TaskfileVertex> {
        let content = match &node {
            Node::File { path } => self.read_file(path).await?,
            _ => self.read_remote(&node).await?,
        };

        let taskfile = parse_taskfile(&content).map_err(|e| {
            TaskfileError::ResolutionFailed(format!("Failed to parse {}: {}", node, e))
        })?;

        Ok(TaskfileVertex {
            location: node.location(),
            node,
            taskfile,
        })
    }

    async fn read_file(&self, path: &Path) -> TaskfileResult<String> {
        if !path.exists() {
            return Err(TaskfileError::ResolutionFailed(format!(
                "No Taskfile found at {}",
                path.display()
            )));
        }

        tokio::fs::read_to_string(path).await.map_err(|e| {
            TaskfileError::ResolutionFailed(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    fn check_transport(&self, node: &Node) -> TaskfileResult<()> {
        let plain_http = match node {
            Node::Remote { url } => url.scheme() == "http",
            Node::Git { repository, .. } => repository.starts_with("http://"),
            Node::File { .. } => false,
        };

        if plain_http && !self.config.insecure {
            return Err(TaskfileError::ResolutionFailed(format!(
                "{} uses plain HTTP; enable insecure mode to allow it",
                node
            )));
        }
        Ok(())
    }

    async fn read_remote(&self, node: &Node) -> TaskfileResult<String> {
        self.check_transport(node)?;

        let cached = self.cache.read(node).await.unwrap_or_else(|e| {
            self.debug(&format!("Ignoring unreadable cache entry for {}: {:#}", node, e));
            None
        });

        if self.config.offline {
            return match cached {
                Some(content) => {
                    self.debug(&format!("Using cached copy of {} (offline)", node));
                    Ok(content)
                }
                None => Err(TaskfileError::ResolutionFailed(format!(
                    "{} is not cached and offline mode is enabled",
                    node
                ))),
            };
        }

        if !self.config.download && self.cache.is_fresh(node, self.config.cache_expiry) {
            if let Some(content) = cached {
                self.debug(&format!("Using cached copy of {}", node));
                return Ok(content);
            }
        }

        let content = match self.cache.fetch(node).await {
            Ok(content) => content,
            Err(e) => {
                if !self.config.download {
                    if let Some(content) = cached {
                        self.debug(&format!(
                            "Failed to fetch {}: {:#}. Using cached copy",
                            node, e
                        ));
                        return Ok(content);
                    }
                }
                return Err(TaskfileError::ResolutionFailed(format!("{:#}", e)));
            }
        };

        let fetched_checksum = checksum(&content);
        match self.cache.stored_checksum(node).await {
            None => self.prompt(
                node,
                &format!(
                    "The Taskfile depends on the remote Taskfile at {}.\n\
                     --- Make sure you trust the source of this Taskfile before continuing ---\n\
                     Continue?",
                    node
                ),
            )?,
            Some(stored) if stored != fetched_checksum => self.prompt(
                node,
                &format!(
                    "The remote Taskfile at {} has changed since you last used it!\n\
                     --- Make sure you trust the source of this Taskfile before continuing ---\n\
                     Continue?",
                    node
                ),
            )?,
            Some(_) => {}
        }

        match self.cache.write(node, &content).await {
            Ok(()) => self.debug(&format!(
                "Fetched {} and cached it at {}",
                node,
                self.cache.content_path(node).display()
            )),
            Err(e) => {
                tracing::warn!("Failed to cache {}: {:#}", node, e);
            }
        }

        Ok(content)
    }
}

impl DocumentProvider for TaskfileReader {
    async fn resolve(&self, locator: &str) -> TaskfileResult<TaskfileGraph> {
        self.read_graph(locator).await
    }

    fn merge(&self, graph: &TaskfileGraph) -> TaskfileResult<TaskDocument> {
        merge_graph(graph)
    }
}
