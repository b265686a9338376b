//! Graphviz dot export and import.
//!
//! ```text
//! digraph G {
//!     // inputs: v0
//!     // outputs: v3
//!     v0 [color=blue];
//!     v0 [label="a"];
//!     v0 -> v1;
//!     ...
//! }
//! ```
//!
//! One color line per boundary node (blue input, red output), one label line
//! per node, one edge line per unit of multiplicity. The boundary comments
//! keep the input and output order across a round trip.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeId, OpenDigraph};
use crate::{Error, Result};

/// Export settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotOptions {
    /// Append `id=N` to every label.
    pub verbose: bool,
}

impl<L: Display> OpenDigraph<L> {
    /// Lazy dot rendering, for `write!` and `format!`.
    pub fn dot(&self, options: DotOptions) -> Dot<'_, L> {
        Dot { graph: self, options }
    }

    /// The graph in dot format.
    pub fn to_dot(&self, options: DotOptions) -> String {
        self.dot(options).to_string()
    }

    pub fn write_dot(&self, writer: &mut dyn Write, options: DotOptions) -> Result<()> {
        write!(writer, "{}", self.dot(options))?;
        Ok(())
    }

    /// Write the dot text to `path`.
    pub fn save_dot(&self, path: impl AsRef<Path>, options: DotOptions) -> Result<()> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_dot(&mut file, options)?;
        file.flush()?;
        Ok(())
    }
}

/// Dot text of a graph, see [`OpenDigraph::dot`].
pub struct Dot<'a, L> {
    graph: &'a OpenDigraph<L>,
    options: DotOptions,
}

impl<L: Display> fmt::Display for Dot<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = self.graph;
        writeln!(f, "digraph G {{")?;
        writeln!(f, "    // inputs: {}", id_list(g.inputs()))?;
        writeln!(f, "    // outputs: {}", id_list(g.outputs()))?;

        for node in g.nodes() {
            let id = node.id();
            if g.is_input(id) {
                writeln!(f, "    v{id} [color=blue];")?;
            }
            if g.is_output(id) {
                writeln!(f, "    v{id} [color=red];")?;
            }
            let label = escape(&node.label().to_string());
            if self.options.verbose {
                writeln!(f, "    v{id} [label=\"{label} id={id}\"];")?;
            } else {
                writeln!(f, "    v{id} [label=\"{label}\"];")?;
            }
            for (&child, &multiplicity) in node.children() {
                for _ in 0..multiplicity {
                    writeln!(f, "    v{id} -> v{child};")?;
                }
            }
        }
        writeln!(f, "}}")
    }
}

/// Parse the dot text written by [`OpenDigraph::to_dot`].
///
/// `ParseError` positions are 1-based line numbers. Edge endpoints that were
/// never declared become unlabeled nodes. The result is not validated.
pub fn from_dot(text: &str) -> Result<OpenDigraph<String>> {
    let mut labels: BTreeMap<NodeId, String> = BTreeMap::new();
    let mut edges = Vec::new();
    let (mut listed_inputs, mut listed_outputs) = (None, None);
    let (mut blue, mut red) = (Vec::new(), Vec::new());
    let mut opened = false;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        let err = |message: &str| Error::ParseError { position: line_no, message: message.to_string() };

        if line.is_empty() || line == "}" {
            continue;
        }
        if !opened {
            if line.starts_with("digraph") && line.ends_with('{') {
                opened = true;
                continue;
            }
            return Err(err("expected 'digraph NAME {'"));
        }
        if let Some(comment) = line.strip_prefix("//") {
            let comment = comment.trim();
            if let Some(ids) = comment.strip_prefix("inputs:") {
                listed_inputs = Some(parse_id_list(ids).ok_or_else(|| err("bad input list"))?);
            } else if let Some(ids) = comment.strip_prefix("outputs:") {
                listed_outputs = Some(parse_id_list(ids).ok_or_else(|| err("bad output list"))?);
            }
            continue;
        }

        let stmt = line.strip_suffix(';').unwrap_or(line).trim();
        if let Some((src, dst)) = stmt.split_once("->").filter(|_| !stmt.contains('[')) {
            let src = parse_id(src.trim()).ok_or_else(|| err("bad edge source"))?;
            let dst = parse_id(dst.trim()).ok_or_else(|| err("bad edge target"))?;
            labels.entry(src).or_default();
            labels.entry(dst).or_default();
            edges.push((src, dst));
            continue;
        }

        let (name, attr) = stmt
            .split_once('[')
            .and_then(|(name, rest)| Some((name.trim(), rest.strip_suffix(']')?.trim())))
            .ok_or_else(|| err("unrecognized statement"))?;
        let id = parse_id(name).ok_or_else(|| err("bad node name"))?;
        match attr {
            "color=blue" => blue.push(id),
            "color=red" => red.push(id),
            _ => {
                let quoted = attr
                    .strip_prefix("label=\"")
                    .and_then(|rest| rest.strip_suffix('"'))
                    .ok_or_else(|| err("unrecognized attribute"))?;
                let mut label = unescape(quoted);
                let suffix = format!(" id={id}");
                if label.ends_with(&suffix) {
                    label.truncate(label.len() - suffix.len());
                }
                labels.insert(id, label);
            }
        }
    }

    let inputs: Vec<usize> = listed_inputs.unwrap_or(blue).into_iter().map(|id| id.0).collect();
    let outputs: Vec<usize> = listed_outputs.unwrap_or(red).into_iter().map(|id| id.0).collect();
    let mut g = OpenDigraph::new(
        &inputs,
        &outputs,
        labels.into_iter().map(|(id, label)| Node::new(id.0, label, &[], &[])),
    );
    g.add_edges(edges)?;
    Ok(g)
}

fn id_list(ids: &[NodeId]) -> String {
    ids.iter().map(|id| format!("v{id}")).collect::<Vec<_>>().join(" ")
}

fn parse_id(name: &str) -> Option<NodeId> {
    name.strip_prefix('v')?.parse().ok().map(NodeId)
}

fn parse_id_list(ids: &str) -> Option<Vec<NodeId>> {
    ids.split_whitespace().map(parse_id).collect()
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn unescape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut chars = label.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(next) => out.push(next),
                None => {}
            }
        } else {
            out.push(ch);
        }
    }
    out
}
