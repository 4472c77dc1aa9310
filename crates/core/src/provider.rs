//! The document provider interface
//!
//! Everything that turns a locator into a merged [`TaskDocument`] sits
//! behind [`DocumentProvider`]. The renderers only ever see its output.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::document::TaskDocument;
use crate::graph::TaskfileGraph;
use crate::types::TaskfileResult;

/// Sink for diagnostic messages emitted while reading
pub type DebugFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Asks for confirmation; an error aborts the read
pub type PromptFn = Arc<dyn Fn(&str) -> anyhow::Result<()> + Send + Sync>;

pub const DEFAULT_CACHE_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options passed through to the provider
#[derive(Clone)]
pub struct ReaderConfig {
    /// Allow plain `http://` locators
    pub insecure: bool,
    /// Always fetch remote Taskfiles, ignoring cached copies
    pub download: bool,
    /// Never touch the network; remote Taskfiles must be cached
    pub offline: bool,
    /// Directory the remote cache lives under
    pub temp_dir: PathBuf,
    pub cache_expiry: Duration,
    /// Per-fetch network timeout
    pub timeout: Duration,
    pub debug: Option<DebugFn>,
    /// Without a prompt callback every remote Taskfile is accepted
    pub prompt: Option<PromptFn>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            download: false,
            offline: false,
            temp_dir: std::env::temp_dir(),
            cache_expiry: DEFAULT_CACHE_EXPIRY,
            timeout: DEFAULT_TIMEOUT,
            debug: None,
            prompt: None,
        }
    }
}

impl fmt::Debug for ReaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderConfig")
            .field("insecure", &self.insecure)
            .field("download", &self.download)
            .field("offline", &self.offline)
            .field("temp_dir", &self.temp_dir)
            .field("cache_expiry", &self.cache_expiry)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug.is_some())
            .field("prompt", &self.prompt.is_some())
            .finish()
    }
}

/// Resolves a locator to its inclusion graph and merges that graph
pub trait DocumentProvider {
    /// Read the root Taskfile and everything it includes
    fn resolve(&self, locator: &str) -> impl Future<Output = TaskfileResult<TaskfileGraph>> + Send;

    /// Fold the inclusion graph into one document
    fn merge(&self, graph: &TaskfileGraph) -> TaskfileResult<TaskDocument>;
}
