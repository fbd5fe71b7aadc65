use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use yaml_rust2::parser::{Event, EventReceiver, Parser};

/// Script key holding the `include` directive.
pub const INCLUDE: &str = "include";
pub const KEY: &str = "key";
pub const TARGET: &str = "target";

/// Fetch-to-disk descriptor: write the remote value at `key` into `target`.
///
/// Field order is the canonical order used for hashing, whatever order
/// the server sent the mapping in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FetchTask {
    pub key: String,
    pub target: String,
}

/// One concrete unit of work.
///
/// Serializes the way it is written in a script: a shell task is a bare
/// string, a fetch task is a `{key, target}` mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Task {
    Shell(String),
    Fetch(FetchTask),
}

impl Task {
    pub fn shell(command: impl Into<String>) -> Self {
        Task::Shell(command.into())
    }

    pub fn fetch(key: impl Into<String>, target: impl Into<String>) -> Self {
        Task::Fetch(FetchTask {
            key: key.into(),
            target: target.into(),
        })
    }

    /// Canonical serialization: compact JSON of the task as written.
    pub fn canonical(&self) -> String {
        match self {
            Task::Shell(command) => json_string(command),
            Task::Fetch(fetch) => format!(
                "{{\"{}\":{},\"{}\":{}}}",
                KEY,
                json_string(&fetch.key),
                TARGET,
                json_string(&fetch.target)
            ),
        }
    }

    /// Content hash of the task, used as the name of its report.
    pub fn hash(&self) -> TaskHash {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical().as_bytes());
        TaskHash(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Hex digest identifying a task in the report store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHash(pub String);

impl TaskHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Success,
    Failure,
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// A script element, classified once when the script is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    Task(Task),
    Include(String),
    /// Compact rendering of the offending element, for diagnostics.
    Malformed(String),
}

/// Parses a script body into its entries.
///
/// Returns `None` when the text is not a YAML (or JSON) sequence. Scalars
/// keep their source text: `1.10`, `0x1F`, `True` or `null` are never
/// resolved to numbers, booleans or nulls.
pub fn parse_script(text: &str) -> Option<Vec<ScriptEntry>> {
    let mut builder = TreeBuilder::default();
    Parser::new_from_str(text).load(&mut builder, false).ok()?;
    match builder.root? {
        Node::Sequence(elements) => Some(elements.iter().map(classify).collect()),
        _ => None,
    }
}

fn classify(element: &Node) -> ScriptEntry {
    match element {
        Node::Scalar(command) => ScriptEntry::Task(Task::Shell(command.clone())),
        Node::Mapping(mapping) => {
            let mut fields = Vec::with_capacity(mapping.len());
            for (name, value) in mapping {
                match (name, value) {
                    (Node::Scalar(name), Node::Scalar(value)) => fields.push((name.as_str(), value.as_str())),
                    _ => return ScriptEntry::Malformed(element.render()),
                }
            }
            fields.sort();

            match fields.as_slice() {
                [(INCLUDE, key)] => ScriptEntry::Include(key.to_string()),
                [(KEY, key), (TARGET, target)] => ScriptEntry::Task(Task::fetch(*key, *target)),
                _ => ScriptEntry::Malformed(element.render()),
            }
        }
        Node::Sequence(_) => ScriptEntry::Malformed(element.render()),
    }
}

/// Untyped YAML tree: every scalar is its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Scalar(String),
    Sequence(Vec<Node>),
    Mapping(Vec<(Node, Node)>),
}

impl Node {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Scalar(s) => serde_json::Value::String(s.clone()),
            Node::Sequence(items) => serde_json::Value::Array(items.iter().map(Node::to_json).collect()),
            Node::Mapping(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.key_text(), value.to_json()))
                    .collect(),
            ),
        }
    }

    fn key_text(&self) -> String {
        match self {
            Node::Scalar(s) => s.clone(),
            other => other.render(),
        }
    }

    /// Compact JSON, for diagnostics.
    fn render(&self) -> String {
        self.to_json().to_string()
    }
}

enum Open {
    Sequence(Vec<Node>),
    /// Fields so far, and a key waiting for its value.
    Mapping(Vec<(Node, Node)>, Option<Node>),
}

/// Assembles parser events into a `Node` tree, resolving aliases.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<(Open, usize)>,
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
}

impl TreeBuilder {
    fn add(&mut self, node: Node, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.open.last_mut() {
            Some((Open::Sequence(items), _)) => items.push(node),
            Some((Open::Mapping(fields, pending), _)) => match pending.take() {
                None => *pending = Some(node),
                Some(name) => {
                    // a repeated key keeps the last value
                    fields.retain(|(existing, _)| *existing != name);
                    fields.push((name, node));
                }
            },
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl EventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event) {
        match event {
            Event::Scalar(value, _, anchor, ..) => self.add(Node::Scalar(value), anchor),
            Event::SequenceStart(anchor, ..) => self.open.push((Open::Sequence(Vec::new()), anchor)),
            Event::MappingStart(anchor, ..) => self.open.push((Open::Mapping(Vec::new(), None), anchor)),
            Event::SequenceEnd | Event::MappingEnd => {
                if let Some((open, anchor)) = self.open.pop() {
                    let node = match open {
                        Open::Sequence(items) => Node::Sequence(items),
                        Open::Mapping(fields, _) => Node::Mapping(fields),
                    };
                    self.add(node, anchor);
                }
            }
            Event::Alias(anchor) => {
                if let Some(node) = self.anchors.get(&anchor).cloned() {
                    self.add(node, 0);
                }
            }
            _ => {}
        }
    }
}
