//! Taskfile configuration models
//!
//! Deserialization of the on-disk Taskfile format, including the shorthand
//! forms for tasks, commands, dependencies and includes.

pub mod ordered;
pub mod taskfile;

pub use taskfile::{parse_taskfile, CommandEntry, Include, Task, Taskfile};
