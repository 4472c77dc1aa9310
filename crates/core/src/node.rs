//! Taskfile locators
//!
//! A locator is what a user or an `includes:` entry writes to point at a
//! Taskfile. [`Node`] is the resolved form: a local file, a remote HTTP(S)
//! document, or a file inside a Git repository.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use reqwest::Url;

use crate::types::{TaskfileError, TaskfileResult};

/// File names tried, in order, when a locator points at a directory
pub const DEFAULT_TASKFILES: &[&str] = &[
    "Taskfile.yml",
    "taskfile.yml",
    "Taskfile.yaml",
    "taskfile.yaml",
    "Taskfile.dist.yml",
    "taskfile.dist.yml",
    "Taskfile.dist.yaml",
    "taskfile.dist.yaml",
];

const GIT_PATH_SEPARATOR: &str = ".git//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File {
        path: PathBuf,
    },
    Remote {
        url: Url,
    },
    Git {
        repository: String,
        path: String,
        reference: Option<String>,
    },
}

impl Node {
    /// Resolve the root locator; relative paths are taken from `base_dir`
    pub fn from_locator(locator: &str, base_dir: &Path) -> TaskfileResult<Node> {
        let locator = locator.trim();

        if is_git_locator(locator) {
            return parse_git_locator(locator);
        }

        if is_remote_locator(locator) {
            let url = Url::parse(locator).map_err(|e| {
                TaskfileError::ResolutionFailed(format!("Invalid URL '{}': {}", locator, e))
            })?;
            return Ok(Node::Remote { url });
        }

        let path = if locator.is_empty() {
            base_dir.to_path_buf()
        } else {
            base_dir.join(locator)
        };

        Ok(Node::File {
            path: find_taskfile(&normalize_path(&path)),
        })
    }

    /// Resolve an include locator relative to this node
    pub fn resolve_include(&self, locator: &str) -> TaskfileResult<Node> {
        let locator = locator.trim();

        if is_git_locator(locator) || is_remote_locator(locator) {
            return Node::from_locator(locator, Path::new("."));
        }

        match self {
            Node::File { path } => {
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                Node::from_locator(locator, base_dir)
            }
            Node::Remote { url } => {
                let url = url.join(locator).map_err(|e| {
                    TaskfileError::ResolutionFailed(format!(
                        "Cannot resolve include '{}' against {}: {}",
                        locator, url, e
                    ))
                })?;
                Ok(Node::Remote { url })
            }
            Node::Git {
                repository,
                path,
                reference,
            } => {
                let joined = match path.rsplit_once('/') {
                    Some((dir, _)) => format!("{}/{}", dir, locator),
                    None => locator.to_string(),
                };
                Ok(Node::Git {
                    repository: repository.clone(),
                    path: repo_taskfile_path(&joined),
                    reference: reference.clone(),
                })
            }
        }
    }

    /// Identifier used for graph vertices and cache keys
    pub fn location(&self) -> String {
        self.to_string()
    }

    /// Short human-readable name, used for cache file names
    pub fn file_stem(&self) -> String {
        let last_segment = match self {
            Node::File { path } => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("Taskfile")
                .to_string(),
            Node::Remote { url } => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|segment| !segment.is_empty())
                .unwrap_or("Taskfile")
                .to_string(),
            Node::Git { path, .. } => path.rsplit('/').next().unwrap_or("Taskfile").to_string(),
        };

        last_segment
            .trim_end_matches(".yml")
            .trim_end_matches(".yaml")
            .to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::File { path } => write!(f, "{}", path.display()),
            Node::Remote { url } => write!(f, "{}", url),
            Node::Git {
                repository,
                path,
                reference,
            } => {
                write!(f, "{}//{}", repository, path)?;
                if let Some(reference) = reference {
                    write!(f, "?ref={}", reference)?;
                }
                Ok(())
            }
        }
    }
}

pub fn is_remote_locator(locator: &str) -> bool {
    locator.starts_with("https://") || locator.starts_with("http://")
}

pub fn is_git_locator(locator: &str) -> bool {
    let without_query = locator.split('?').next().unwrap_or(locator);
    locator.starts_with("git@")
        || without_query.contains(GIT_PATH_SEPARATOR)
        || without_query.ends_with(".git")
}

/// Parse `<repository>.git[//<path>][?ref=<ref>]`
fn parse_git_locator(locator: &str) -> TaskfileResult<Node> {
    let (address, query) = match locator.split_once('?') {
        Some((address, query)) => (address, Some(query)),
        None => (locator, None),
    };

    let reference = query.and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "ref")
            .map(|(_, value)| value.to_string())
    });

    let (repository, path) = match address.split_once(GIT_PATH_SEPARATOR) {
        Some((repository, path)) => (format!("{}.git", repository), path.to_string()),
        None => (address.to_string(), String::new()),
    };

    if !repository.ends_with(".git") || repository.len() <= ".git".len() {
        return Err(TaskfileError::ResolutionFailed(format!(
            "Invalid Git locator '{}': expected '<repository>.git//<path>?ref=<ref>'",
            locator
        )));
    }

    Ok(Node::Git {
        repository,
        path: repo_taskfile_path(&path),
        reference,
    })
}

/// Pick the first default Taskfile name inside a directory
pub fn find_taskfile(path: &Path) -> PathBuf {
    if !path.is_dir() {
        return path.to_path_buf();
    }

    DEFAULT_TASKFILES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| path.join(DEFAULT_TASKFILES[0]))
}

/// Lexically remove `.` and `..` components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                let after_name = matches!(last, Some(Component::Normal(_)));
                // `..` above the root stays at the root
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));

                if after_name {
                    normalized.pop();
                } else if !at_root {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// A path inside a repository, naming the default Taskfile when it is a directory
fn repo_taskfile_path(path: &str) -> String {
    let path = normalize_repo_path(path);
    if path.ends_with(".yml") || path.ends_with(".yaml") {
        path
    } else if path.is_empty() {
        DEFAULT_TASKFILES[0].to_string()
    } else {
        format!("{}/{}", path, DEFAULT_TASKFILES[0])
    }
}

fn normalize_repo_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
