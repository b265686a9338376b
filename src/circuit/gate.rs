//! Gate labels of a boolean circuit.

use serde::{Deserialize, Serialize};

/// The closed set of circuit node kinds.
///
/// Boundary nodes carry [`Gate::Copy`]; their label is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gate {
    /// Constant source `"0"` / `"1"`.
    Const(bool),
    /// Fan-out `""`.
    #[default]
    Copy,
    /// `"&"`
    And,
    /// `"|"`
    Or,
    /// `"^"`
    Xor,
    /// `"~"`
    Not,
}

impl Gate {
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::Const(false) => "0",
            Gate::Const(true) => "1",
            Gate::Copy => "",
            Gate::And => "&",
            Gate::Or => "|",
            Gate::Xor => "^",
            Gate::Not => "~",
        }
    }

    /// Inverse of [`symbol`](Self::symbol). Only the exact symbols parse.
    pub fn parse(label: &str) -> Option<Gate> {
        Some(match label {
            "0" => Gate::Const(false),
            "1" => Gate::Const(true),
            "" => Gate::Copy,
            "&" => Gate::And,
            "|" => Gate::Or,
            "^" => Gate::Xor,
            "~" => Gate::Not,
            _ => return None,
        })
    }

    /// The bit of a constant.
    pub fn bit(&self) -> Option<bool> {
        match self {
            Gate::Const(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Gate::Const(_))
    }

    /// Value of a variadic gate with no operands.
    pub fn identity(&self) -> Option<bool> {
        match self {
            Gate::And => Some(true),
            Gate::Or | Gate::Xor => Some(false),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
