//! taskgraph Core Library
//!
//! This is the core library for the taskgraph Taskfile inspector. It loads a
//! Taskfile (local, HTTP(S) or Git), follows and merges its includes, and
//! renders the resulting inclusion graph and task dependency trees.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`taskfile_manager`] - High-level session over a loaded Taskfile
//! - [`provider`] - The document provider interface and its configuration
//! - [`reader`] - The provider implementation: include traversal and reading
//! - [`cache`] - Download and on-disk cache for remote Taskfiles
//! - [`node`] - Locator parsing and include resolution
//! - [`configs`] - Taskfile deserialization
//! - [`graph`] - The inclusion graph
//! - [`merge`] - Folding includes into one namespaced document
//! - [`document`] - The merged task document
//! - [`render`] - Text renderers for graphs, listings and dependency trees
//! - [`results`] - Result types for manager operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskgraph_core::provider::ReaderConfig;
//! use taskgraph_core::reader::TaskfileReader;
//! use taskgraph_core::render::write_tree_from;
//! use taskgraph_core::{TaskfileManager, TaskfileManagerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = TaskfileReader::new(ReaderConfig::default())?;
//! let manager = TaskfileManager::new(
//!     &reader,
//!     TaskfileManagerConfig {
//!         locator: ".".to_string(),
//!     },
//! )
//! .await?;
//!
//! write_tree_from(&mut std::io::stdout(), manager.document(), "default")?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod configs;
pub mod document;
pub mod graph;
pub mod merge;
pub mod node;
pub mod provider;
pub mod reader;
pub mod render;
pub mod results;
pub mod taskfile_manager;
pub mod types;

// Re-export the main types for easier usage
pub use provider::{DocumentProvider, ReaderConfig};
pub use taskfile_manager::{TaskfileManager, TaskfileManagerConfig};
pub use types::{TaskfileError, TaskfileResult};
