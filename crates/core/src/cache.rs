use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::node::Node;

/// Downloads remote Taskfiles and keeps a copy of each on disk
pub struct RemoteCache {
    cache_dir: PathBuf,
    client: reqwest::Client,
    timeout: Duration,
}

/// A remote Taskfile found in the cache directory
#[derive(Debug, Clone)]
pub struct CachedTaskfile {
    pub file_name: String,
    pub path: PathBuf,
}

impl RemoteCache {
    /// Create a cache rooted under `temp_dir`
    pub fn new(temp_dir: &Path, timeout: Duration) -> Result<Self> {
        let cache_dir = temp_dir.join("taskgraph").join("remote");
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            cache_dir,
            client,
            timeout,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure the cache directory exists
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create remote Taskfile cache directory: {}",
                    self.cache_dir.display()
                )
            })?;
        Ok(())
    }

    /// Path of the cached copy of a node's content
    pub fn content_path(&self, node: &Node) -> PathBuf {
        self.cache_dir.join(format!("{}.yaml", self.cache_key(node)))
    }

    /// Path of the checksum recorded when the content was last accepted
    pub fn checksum_path(&self, node: &Node) -> PathBuf {
        self.cache_dir.join(format!("{}.checksum", self.cache_key(node)))
    }

    fn cache_key(&self, node: &Node) -> String {
        let location_hash = format!("{:x}", Sha256::digest(node.location().as_bytes()));
        format!("{}.{}", node.file_stem(), &location_hash[..16])
    }

    /// Read the cached copy, if there is one
    pub async fn read(&self, node: &Node) -> Result<Option<String>> {
        let path = self.content_path(node);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read cached Taskfile: {}", path.display()))?;
        Ok(Some(content))
    }

    /// Whether the cached copy was written less than `expiry` ago
    pub fn is_fresh(&self, node: &Node, expiry: Duration) -> bool {
        let modified = match fs::metadata(self.content_path(node)).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => return false,
        };

        match modified.elapsed() {
            Ok(age) => age < expiry,
            // Clock skew: the file claims to be from the future
            Err(_) => true,
        }
    }

    pub async fn stored_checksum(&self, node: &Node) -> Option<String> {
        tokio::fs::read_to_string(self.checksum_path(node))
            .await
            .ok()
            .map(|checksum| checksum.trim().to_string())
    }

    /// Store content together with its checksum
    pub async fn write(&self, node: &Node, content: &str) -> Result<()> {
        self.initialize().await?;

        let content_path = self.content_path(node);
        let mut file = File::create(&content_path)
            .await
            .with_context(|| format!("Failed to create cache file: {}", content_path.display()))?;

        file.write_all(content.as_bytes()).await.with_context(|| {
            format!(
                "Failed to write Taskfile to cache: {}",
                content_path.display()
            )
        })?;

        file.flush().await.with_context(|| {
            format!("Failed to flush Taskfile cache file: {}", content_path.display())
        })?;

        let checksum_path = self.checksum_path(node);
        tokio::fs::write(&checksum_path, checksum(content))
            .await
            .with_context(|| {
                format!("Failed to write checksum file: {}", checksum_path.display())
            })?;

        Ok(())
    }

    /// Fetch a Remote or Git node from its origin, bypassing the cache
    pub async fn fetch(&self, node: &Node) -> Result<String> {
        match node {
            Node::Remote { url } => self.download(url.as_str()).await,
            Node::Git {
                repository,
                path,
                reference,
            } => {
                self.clone_from_git(repository, path, reference.as_deref())
                    .await
            }
            Node::File { path } => Err(anyhow::anyhow!(
                "{} is a local file and cannot be downloaded",
                path.display()
            )),
        }
    }

    async fn download(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download Taskfile from {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_msg = if status == reqwest::StatusCode::NOT_FOUND {
                format!(
                    "Failed to download Taskfile from {}: HTTP 404 Not Found\n\n\
                    Suggestions:\n\
                    • Check that the URL points at the raw file, not an HTML page\n\
                    • Verify the branch or tag in the URL exists",
                    url
                )
            } else {
                format!("Failed to download Taskfile from {}: HTTP {}", url, status)
            };
            return Err(anyhow::anyhow!(error_msg));
        }

        let content = response
            .text()
            .await
            .with_context(|| format!("Failed to read Taskfile data from {}", url))?;

        if content.trim().is_empty() {
            return Err(anyhow::anyhow!("Downloaded file from {} is empty", url));
        }

        Ok(content)
    }

    async fn clone_from_git(
        &self,
        repository: &str,
        path: &str,
        reference: Option<&str>,
    ) -> Result<String> {
        let checkout = tempfile::tempdir().context("Failed to create checkout directory")?;

        let mut command = Command::new("git");
        command.args(["clone", "--quiet", "--depth", "1"]);
        if let Some(reference) = reference {
            command.args(["--branch", reference]);
        }
        command.arg(repository).arg(checkout.path());
        command.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "Timed out after {}s cloning {}",
                    self.timeout.as_secs(),
                    repository
                )
            })?
            .with_context(|| format!("Failed to run git to clone {}", repository))?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "git clone of {} failed: {}",
                repository,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let file_path = checkout.path().join(path);
        tokio::fs::read_to_string(&file_path)
            .await
            .with_context(|| format!("Failed to read {} from {}", path, repository))
    }

    /// Get a list of all cached Taskfiles on disk
    pub fn list_cached(&self) -> Result<Vec<CachedTaskfile>> {
        let mut cached = Vec::new();

        if !self.cache_dir.exists() {
            return Ok(cached);
        }

        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "yaml").unwrap_or(false) {
                if let Some(file_name) = path.file_name().and_then(|s| s.to_str()) {
                    cached.push(CachedTaskfile {
                        file_name: file_name.to_string(),
                        path: path.clone(),
                    });
                }
            }
        }

        cached.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(cached)
    }

    /// Clear the remote Taskfile cache
    pub async fn clear_cache(&self) -> Result<()> {
        if self.cache_dir.exists() {
            tokio::fs::remove_dir_all(&self.cache_dir)
                .await
                .with_context(|| {
                    format!(
                        "Failed to clear remote Taskfile cache: {}",
                        self.cache_dir.display()
                    )
                })?;
        }
        Ok(())
    }
}

/// SHA-256 of the content, hex encoded
pub fn checksum(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}
