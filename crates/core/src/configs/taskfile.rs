use serde::Deserialize;

use crate::configs::ordered::OrderedEntries;
use crate::types::TaskfileResult;

/// A single Taskfile as written on disk, before includes are merged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taskfile {
    pub version: Option<String>,
    pub includes: Vec<Include>,
    pub tasks: Vec<Task>,
}

/// An `includes:` entry, keyed by the namespace it was declared under
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Include {
    pub namespace: String,
    /// Locator exactly as written in the including Taskfile
    pub taskfile: String,
    pub optional: bool,
    pub internal: bool,
    pub flatten: bool,
    pub aliases: Vec<String>,
    pub excludes: Vec<String>,
}

/// One entry of a task's `cmds:` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEntry {
    /// A shell command
    Literal(String),
    /// A call to another task by name
    TaskCall(String),
}

impl CommandEntry {
    pub fn task_call(&self) -> Option<&str> {
        match self {
            CommandEntry::TaskCall(name) => Some(name),
            CommandEntry::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub name: String,
    pub desc: Option<String>,
    pub deps: Vec<String>,
    pub cmds: Vec<CommandEntry>,
    pub aliases: Vec<String>,
    pub internal: bool,
}

impl Task {
    /// The description, if one was given and it is not blank
    pub fn description(&self) -> Option<&str> {
        self.desc.as_deref().filter(|desc| !desc.is_empty())
    }

    /// Tasks called from `cmds`, in declaration order
    pub fn task_calls(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(CommandEntry::task_call)
    }

    /// Explicit dependencies followed by task calls
    pub fn direct_dependencies(&self) -> Vec<&str> {
        self.deps
            .iter()
            .map(String::as_str)
            .chain(self.task_calls())
            .collect()
    }
}

#[derive(Deserialize)]
struct RawTaskfile {
    #[serde(default)]
    version: Option<RawVersion>,
    #[serde(default)]
    includes: Option<OrderedEntries<RawInclude>>,
    #[serde(default)]
    tasks: Option<OrderedEntries<RawTask>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(serde_yaml::Number),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInclude {
    Short(String),
    Full(RawIncludeBody),
}

#[derive(Deserialize)]
struct RawIncludeBody {
    taskfile: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    internal: bool,
    #[serde(default)]
    flatten: bool,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTask {
    Command(String),
    Commands(Vec<RawCmd>),
    Full(RawTaskBody),
    Empty,
}

#[derive(Deserialize)]
struct RawTaskBody {
    desc: Option<String>,
    #[serde(default)]
    cmds: Vec<RawCmd>,
    cmd: Option<RawCmd>,
    #[serde(default)]
    deps: Vec<RawDep>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    internal: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCmd {
    Text(String),
    Object {
        cmd: Option<String>,
        task: Option<String>,
        defer: Option<RawDefer>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDefer {
    Text(String),
    Call { task: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDep {
    Text(String),
    Object { task: Option<String> },
}

impl From<RawVersion> for String {
    fn from(version: RawVersion) -> Self {
        match version {
            RawVersion::Text(text) => text,
            RawVersion::Number(number) => number.to_string(),
        }
    }
}

impl RawCmd {
    fn into_entry(self) -> Option<CommandEntry> {
        match self {
            RawCmd::Text(cmd) => Some(CommandEntry::Literal(cmd)),
            RawCmd::Object { task: Some(task), .. } => Some(CommandEntry::TaskCall(task)),
            RawCmd::Object { cmd: Some(cmd), .. } => Some(CommandEntry::Literal(cmd)),
            RawCmd::Object {
                defer: Some(defer), ..
            } => Some(match defer {
                RawDefer::Text(cmd) => CommandEntry::Literal(cmd),
                RawDefer::Call { task } => CommandEntry::TaskCall(task),
            }),
            RawCmd::Object { .. } => None,
        }
    }
}

impl RawDep {
    fn into_name(self) -> Option<String> {
        match self {
            RawDep::Text(name) => Some(name),
            RawDep::Object { task } => task,
        }
    }
}

fn convert_include(namespace: String, raw: RawInclude) -> Include {
    match raw {
        RawInclude::Short(taskfile) => Include {
            namespace,
            taskfile,
            ..Include::default()
        },
        RawInclude::Full(body) => Include {
            namespace,
            taskfile: body.taskfile,
            optional: body.optional,
            internal: body.internal,
            flatten: body.flatten,
            aliases: body.aliases,
            excludes: body.excludes,
        },
    }
}

fn convert_task(name: String, raw: RawTask) -> Task {
    match raw {
        RawTask::Command(cmd) => Task {
            name,
            cmds: vec![CommandEntry::Literal(cmd)],
            ..Task::default()
        },
        RawTask::Commands(cmds) => Task {
            name,
            cmds: cmds.into_iter().filter_map(RawCmd::into_entry).collect(),
            ..Task::default()
        },
        RawTask::Full(body) => {
            let cmds = body
                .cmd
                .into_iter()
                .chain(body.cmds)
                .filter_map(RawCmd::into_entry)
                .collect();
            Task {
                name,
                desc: body.desc,
                deps: body.deps.into_iter().filter_map(RawDep::into_name).collect(),
                cmds,
                aliases: body.aliases,
                internal: body.internal,
            }
        }
        RawTask::Empty => Task {
            name,
            ..Task::default()
        },
    }
}

/// Parse a Taskfile, accepting the shorthand task and command forms
pub fn parse_taskfile(yaml_str: &str) -> TaskfileResult<Taskfile> {
    if yaml_str.trim().is_empty() {
        return Ok(Taskfile::default());
    }

    // A comment-only document deserializes as null
    let raw: Option<RawTaskfile> = serde_yaml::from_str(yaml_str)?;
    let Some(raw) = raw else {
        return Ok(Taskfile::default());
    };

    let includes = raw
        .includes
        .map(OrderedEntries::into_inner)
        .unwrap_or_default()
        .into_iter()
        .map(|(namespace, include)| convert_include(namespace, include))
        .collect();

    let tasks = raw
        .tasks
        .map(OrderedEntries::into_inner)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, task)| convert_task(name, task))
        .collect();

    Ok(Taskfile {
        version: raw.version.map(String::from),
        includes,
        tasks,
    })
}
