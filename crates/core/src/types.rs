use thiserror::Error;

/// The main error type for taskgraph operations
#[derive(Debug, Error)]
pub enum TaskfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Fetching, reading or parsing a Taskfile failed
    #[error("Failed to read Taskfile: {0}")]
    ResolutionFailed(String),

    /// Included Taskfiles could not be combined into one document
    #[error("Failed to merge Taskfile: {0}")]
    MergeFailed(String),

    /// The inclusion graph is not a DAG
    #[error("Failed to sort graph: include cycle detected: {0}")]
    CycleDetected(String),

    /// Recoverable: callers render a task listing instead
    #[error("Task '{0}' not found")]
    TaskNotFound(String),
}

impl TaskfileError {
    /// Whether the error must abort the run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, TaskfileError::TaskNotFound(_))
    }
}

/// Result type alias for taskgraph operations
pub type TaskfileResult<T> = Result<T, TaskfileError>;
