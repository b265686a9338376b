//! Parenthesis mini-language.
//!
//! `((x0)&(x1))|(x2)` reads inside out: every `(` opens a new operand of the
//! current node, text names the current node, and `)` returns to the node
//! being fed. Each expression drives one output. Names that are not gate
//! symbols are variables; occurrences of the same name, across all
//! expressions, are fused into one fan-out node fed by an input.

use std::collections::BTreeMap;

use super::{BoolCirc, Gate};
use crate::model::{NodeId, OpenDigraph};
use crate::{Error, Result};

/// Build a labeled graph from parenthesized expressions, one output each.
/// Inputs are named after the variables, in natural order (`x2` < `x10`).
pub fn parse_parentheses(exprs: &[&str]) -> Result<OpenDigraph<String>> {
    let mut g = OpenDigraph::empty();
    let parsed: Vec<OpenDigraph<String>> = exprs.iter().map(|e| parse_one(e)).collect::<Result<_>>()?;
    g.iparallel(parsed);

    let mut variables: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
    for node in g.nodes().filter(|n| !g.is_boundary(n.id())) {
        if Gate::parse(node.label()).is_none() {
            variables.entry(node.label().trim().to_string()).or_default().push(node.id());
        }
    }
    let mut names: Vec<(String, Vec<NodeId>)> = variables.into_iter().collect();
    names.sort_by_cached_key(|(name, _)| natural_key(name));

    for (name, ids) in names {
        let keep = ids[0];
        for &other in &ids[1..] {
            g.fuse(keep, other, None)?;
        }
        g.set_label(keep, String::new())?;
        g.add_input_node(keep, name)?;
    }
    Ok(g)
}

fn parse_one(expr: &str) -> Result<OpenDigraph<String>> {
    let mut g = OpenDigraph::empty();
    let root = g.add_node(String::new(), &[], &[])?;
    g.add_output_node(root, String::new())?;

    let mut current = root;
    let mut text = String::new();
    for (position, ch) in expr.char_indices() {
        match ch {
            '(' => {
                name_node(&mut g, current, &mut text)?;
                current = g.add_node(String::new(), &[], &[(current, 1)])?;
            }
            ')' => {
                name_node(&mut g, current, &mut text)?;
                if current == root {
                    return Err(Error::ParseError { position, message: "unmatched ')'".into() });
                }
                current = g.get(current)?.sole_child().ok_or(Error::NodeNotFound(current))?;
            }
            _ => text.push(ch),
        }
    }
    name_node(&mut g, current, &mut text)?;
    if current != root {
        return Err(Error::ParseError { position: expr.len(), message: "unclosed '('".into() });
    }
    Ok(g)
}

fn name_node(g: &mut OpenDigraph<String>, id: NodeId, text: &mut String) -> Result<()> {
    let name = text.trim();
    if !name.is_empty() {
        g.set_label(id, name.to_string())?;
    }
    text.clear();
    Ok(())
}

/// Sort key splitting a trailing number off the name.
fn natural_key(name: &str) -> (String, Option<u64>, String) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[stem.len()..].parse().ok();
    (stem.to_string(), number, name.to_string())
}

impl BoolCirc {
    /// Circuit of the expressions, with the input names in input order.
    pub fn from_parentheses(exprs: &[&str]) -> Result<(BoolCirc, Vec<String>)> {
        let g = parse_parentheses(exprs)?;
        let names = g.inputs().iter().map(|&id| g.get(id).map(|n| n.label().clone())).collect::<Result<_>>()?;
        Ok((BoolCirc::from_digraph(&g)?, names))
    }
}
