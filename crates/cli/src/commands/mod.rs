use colored::*;

pub mod cache;
pub mod includes;
pub mod report;
pub mod tasks;
pub mod tree;

/// A `=== title ===` section heading
pub(crate) fn heading(title: &str) -> ColoredString {
    format!("=== {} ===", title).bold()
}
