//! Include merging
//!
//! Folds the inclusion graph into a single [`TaskDocument`]. Tasks from an
//! include are renamed `<namespace>:<task>` (unless the include is
//! flattened) and so are the task names they reference. A reference that
//! starts with `:` addresses the root Taskfile and is left alone until the
//! whole document is assembled.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::configs::{CommandEntry, Include, Task};
use crate::document::{TaskDocument, Tasks};
use crate::graph::{TaskfileGraph, TaskfileVertex};
use crate::types::{TaskfileError, TaskfileResult};

pub const NAMESPACE_SEPARATOR: &str = ":";

const DEFAULT_TASK: &str = "default";

/// Merge every Taskfile reachable from the root into one document
pub fn merge_graph(graph: &TaskfileGraph) -> TaskfileResult<TaskDocument> {
    graph.topological_sort()?;

    let root = graph
        .root()
        .ok_or_else(|| TaskfileError::MergeFailed("the Taskfile graph is empty".to_string()))?;
    let root_vertex = &graph[root];

    let mut tasks = Tasks::new();
    for task in merge_vertex(graph, root)? {
        tasks.insert(resolve_root_references(task))?;
    }

    Ok(TaskDocument {
        location: root_vertex.location.clone(),
        version: root_vertex.taskfile.version.clone(),
        tasks,
    })
}

fn merge_vertex(graph: &TaskfileGraph, index: NodeIndex) -> TaskfileResult<Vec<Task>> {
    let vertex = &graph[index];
    let mut merged = vertex.taskfile.tasks.clone();
    let mut names: HashSet<String> = merged.iter().map(|task| task.name.clone()).collect();

    for include in &vertex.taskfile.includes {
        // Optional includes that could not be read have no edge
        let Some(child) = graph.include_target(index, &include.namespace) else {
            continue;
        };
        check_versions(vertex, &graph[child])?;

        let child_tasks = merge_vertex(graph, child)?;
        let has_default = child_tasks.iter().any(|task| task.name == DEFAULT_TASK);

        for task in child_tasks {
            if include.excludes.contains(&task.name) {
                continue;
            }

            let task = namespace_task(task, include);
            if !names.insert(task.name.clone()) {
                return Err(TaskfileError::MergeFailed(format!(
                    "Found multiple tasks ({}) included by \"{}\"",
                    task.name, include.namespace
                )));
            }
            merged.push(task);
        }

        if has_default && !include.flatten && !names.contains(&include.namespace) {
            let default_name = qualify(DEFAULT_TASK, &include.namespace);
            if let Some(task) = merged.iter_mut().find(|task| task.name == default_name) {
                task.aliases.push(include.namespace.clone());
            }
        }
    }

    Ok(merged)
}

fn namespace_task(mut task: Task, include: &Include) -> Task {
    task.internal |= include.internal;

    if include.flatten {
        return task;
    }

    let namespace = include.namespace.as_str();

    let mut aliases: Vec<String> = task
        .aliases
        .iter()
        .map(|alias| qualify(alias, namespace))
        .collect();
    for include_alias in &include.aliases {
        aliases.push(qualify(&task.name, include_alias));
        aliases.extend(task.aliases.iter().map(|alias| qualify(alias, include_alias)));
    }

    task.name = qualify(&task.name, namespace);
    task.aliases = aliases;
    task.deps = task
        .deps
        .iter()
        .map(|dep| qualify_reference(dep, namespace))
        .collect();
    task.cmds = task
        .cmds
        .into_iter()
        .map(|cmd| match cmd {
            CommandEntry::TaskCall(name) => {
                CommandEntry::TaskCall(qualify_reference(&name, namespace))
            }
            literal => literal,
        })
        .collect();

    task
}

fn qualify(name: &str, namespace: &str) -> String {
    format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name)
}

fn qualify_reference(reference: &str, namespace: &str) -> String {
    if reference.starts_with(NAMESPACE_SEPARATOR) {
        reference.to_string()
    } else {
        qualify(reference, namespace)
    }
}

fn strip_root_marker(reference: &str) -> String {
    reference
        .strip_prefix(NAMESPACE_SEPARATOR)
        .unwrap_or(reference)
        .to_string()
}

fn resolve_root_references(mut task: Task) -> Task {
    task.deps = task.deps.iter().map(|dep| strip_root_marker(dep)).collect();
    task.cmds = task
        .cmds
        .into_iter()
        .map(|cmd| match cmd {
            CommandEntry::TaskCall(name) => CommandEntry::TaskCall(strip_root_marker(&name)),
            literal => literal,
        })
        .collect();
    task
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version).trim()
}

fn check_versions(parent: &TaskfileVertex, child: &TaskfileVertex) -> TaskfileResult<()> {
    let (Some(parent_version), Some(child_version)) =
        (&parent.taskfile.version, &child.taskfile.version)
    else {
        return Ok(());
    };

    if major_version(parent_version) != major_version(child_version) {
        return Err(TaskfileError::MergeFailed(format!(
            "Taskfile versions should match. {} uses version {} but {} uses version {}",
            parent.location, parent_version, child.location, child_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::vertex;

    fn names(document: &TaskDocument) -> Vec<&str> {
        document.tasks.names().collect()
    }

    #[test]
    fn test_single_taskfile_merges_to_itself() {
        let mut graph = TaskfileGraph::new();
        graph.add_vertex(vertex(
            "Taskfile.yml",
            "version: '3'\ntasks:\n  build: echo hi\n  test:\n    deps: [build]\n",
        ));

        let document = merge_graph(&graph).unwrap();
        assert_eq!(document.location, "Taskfile.yml");
        assert_eq!(document.version.as_deref(), Some("3"));
        assert_eq!(names(&document), vec!["build", "test"]);
        assert_eq!(document.task("test").unwrap().deps, vec!["build".to_string()]);
    }

    #[test]
    fn test_included_tasks_are_namespaced() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex(
            "Taskfile.yml",
            r#"
includes:
  docs: ./docs
tasks:
  default:
    cmds:
      - task: docs:build
  setup: echo setup
"#,
        ));
        let (docs, _) = graph.add_vertex(vertex(
            "docs/Taskfile.yml",
            r#"
tasks:
  build:
    deps: [clean, ":setup"]
    cmds:
      - task: render
      - echo done
  clean: rm -rf out
  render: echo render
"#,
        ));
        graph.add_include(root, docs, "docs");

        let document = merge_graph(&graph).unwrap();
        assert_eq!(
            names(&document),
            vec!["default", "setup", "docs:build", "docs:clean", "docs:render"]
        );

        let build = document.task("docs:build").unwrap();
        assert_eq!(
            build.deps,
            vec!["docs:clean".to_string(), "setup".to_string()]
        );
        assert_eq!(
            build.cmds,
            vec![
                CommandEntry::TaskCall("docs:render".to_string()),
                CommandEntry::Literal("echo done".to_string()),
            ]
        );
    }

    #[test]
    fn test_nested_root_reference_reaches_the_root() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex(
            "Taskfile.yml",
            "includes:\n  a: ./a\ntasks:\n  setup: echo setup\n",
        ));
        let (a, _) = graph.add_vertex(vertex("a/Taskfile.yml", "includes:\n  b: ./b\n"));
        let (b, _) = graph.add_vertex(vertex(
            "a/b/Taskfile.yml",
            "tasks:\n  run:\n    deps: [':setup', local]\n  local: echo\n",
        ));
        graph.add_include(root, a, "a");
        graph.add_include(a, b, "b");

        let document = merge_graph(&graph).unwrap();
        let run = document.task("a:b:run").unwrap();
        assert_eq!(run.deps, vec!["setup".to_string(), "a:b:local".to_string()]);
    }

    #[test]
    fn test_flatten_conflict_fails() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex(
            "Taskfile.yml",
            "includes:\n  lib:\n    taskfile: ./lib\n    flatten: true\ntasks:\n  build: echo root\n",
        ));
        let (lib, _) = graph.add_vertex(vertex("lib/Taskfile.yml", "tasks:\n  build: echo lib\n"));
        graph.add_include(root, lib, "lib");

        let err = merge_graph(&graph).unwrap_err();
        match err {
            TaskfileError::MergeFailed(message) => {
                assert!(message.contains("Found multiple tasks (build)"));
                assert!(message.contains("\"lib\""));
            }
            other => panic!("expected MergeFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_flatten_keeps_names_and_excludes_skip() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex(
            "Taskfile.yml",
            "includes:\n  lib:\n    taskfile: ./lib\n    flatten: true\n    excludes: [clean]\n    internal: true\n",
        ));
        let (lib, _) = graph.add_vertex(vertex(
            "lib/Taskfile.yml",
            "tasks:\n  build: echo lib\n  clean: rm -rf\n",
        ));
        graph.add_include(root, lib, "lib");

        let document = merge_graph(&graph).unwrap();
        assert_eq!(names(&document), vec!["build"]);
        assert!(document.task("build").unwrap().internal);
    }

    #[test]
    fn test_default_task_is_reachable_by_namespace() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex(
            "Taskfile.yml",
            "includes:\n  docs:\n    taskfile: ./docs\n    aliases: [d]\n",
        ));
        let (docs, _) = graph.add_vertex(vertex(
            "docs/Taskfile.yml",
            "tasks:\n  default:\n    desc: Build docs\n    aliases: [all]\n",
        ));
        graph.add_include(root, docs, "docs");

        let document = merge_graph(&graph).unwrap();
        assert_eq!(names(&document), vec!["docs:default"]);
        for alias in ["docs", "docs:all", "d:default", "d:all"] {
            assert_eq!(
                document.task(alias).unwrap().name,
                "docs:default",
                "alias {alias}"
            );
        }
    }

    #[test]
    fn test_unread_optional_include_is_skipped() {
        let mut graph = TaskfileGraph::new();
        graph.add_vertex(vertex(
            "Taskfile.yml",
            "includes:\n  extra:\n    taskfile: ./missing.yml\n    optional: true\ntasks:\n  a: echo\n",
        ));

        let document = merge_graph(&graph).unwrap();
        assert_eq!(names(&document), vec!["a"]);
    }

    #[test]
    fn test_version_mismatch_fails() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex("Taskfile.yml", "version: '3'\nincludes:\n  old: ./old\n"));
        let (old, _) = graph.add_vertex(vertex("old/Taskfile.yml", "version: '2'\n"));
        graph.add_include(root, old, "old");

        assert!(matches!(
            merge_graph(&graph),
            Err(TaskfileError::MergeFailed(_))
        ));
    }

    #[test]
    fn test_minor_versions_are_compatible() {
        let mut graph = TaskfileGraph::new();
        let (root, _) = graph.add_vertex(vertex("Taskfile.yml", "version: '3'\nincludes:\n  new: ./new\n"));
        let (new, _) = graph.add_vertex(vertex("new/Taskfile.yml", "version: 3.1\n"));
        graph.add_include(root, new, "new");

        assert!(merge_graph(&graph).is_ok());
    }

    #[test]
    fn test_include_cycle_fails_before_merging() {
        let mut graph = TaskfileGraph::new();
        let (a, _) = graph.add_vertex(vertex("a.yml", "includes:\n  b: ./b.yml\n"));
        let (b, _) = graph.add_vertex(vertex("b.yml", "includes:\n  a: ./a.yml\n"));
        graph.add_include(a, b, "b");
        graph.add_include(b, a, "a");

        assert!(matches!(
            merge_graph(&graph),
            Err(TaskfileError::CycleDetected(_))
        ));
    }

    #[test]
    fn test_empty_graph_fails() {
        assert!(matches!(
            merge_graph(&TaskfileGraph::new()),
            Err(TaskfileError::MergeFailed(_))
        ));
    }
}
