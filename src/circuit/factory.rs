//! Ready-made circuits: constants, truth tables, adders and a Hamming(7,4)
//! code.

use super::{BoolCirc, Gate};
use crate::model::{Node, NodeId, OpenDigraph};
use crate::{Error, Result};

impl BoolCirc {
    /// One constant per bit, each wired to its own output.
    pub fn from_bits(bits: &[bool]) -> BoolCirc {
        let outputs: Vec<usize> = (0..bits.len()).map(|i| 2 * i + 1).collect();
        let nodes = bits.iter().enumerate().flat_map(|(i, &bit)| {
            [
                Node::new(2 * i, Gate::Const(bit), &[], &[(2 * i + 1, 1)]),
                Node::new(2 * i + 1, Gate::Copy, &[(2 * i, 1)], &[]),
            ]
        });
        BoolCirc::from_valid(OpenDigraph::new(&[], &outputs, nodes))
    }

    /// The low `width` bits of `value`, most significant first.
    pub fn from_int(value: u64, width: usize) -> BoolCirc {
        let bits: Vec<bool> = (0..width).rev().map(|i| i < 64 && (value >> i) & 1 == 1).collect();
        Self::from_bits(&bits)
    }

    /// Sum-of-minterms circuit for a truth table of `2^n` bits.
    ///
    /// Character `i` is the output for the input assignment whose bits,
    /// most significant first, spell `i` in binary.
    pub fn from_truth_table(table: &str) -> Result<BoolCirc> {
        let len = table.len();
        if !len.is_power_of_two() {
            return Err(Error::ParseError {
                position: len,
                message: format!("truth table length {len} is not a power of two"),
            });
        }
        let rows: Vec<bool> = table
            .char_indices()
            .map(|(position, ch)| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(Error::ParseError { position, message: format!("unexpected {ch:?} in truth table") }),
            })
            .collect::<Result<_>>()?;
        let arity = len.trailing_zeros() as usize;

        let mut g = OpenDigraph::empty();
        let or = g.add_node(Gate::Or, &[], &[])?;
        g.add_output_node(or, Gate::Copy)?;
        let vars = add_inputs(&mut g, arity)?;

        for (row, _) in rows.iter().enumerate().filter(|(_, on)| **on) {
            let and = g.add_node(Gate::And, &[], &[(or, 1)])?;
            for (pos, &var) in vars.iter().enumerate() {
                if (row >> (arity - 1 - pos)) & 1 == 1 {
                    g.add_edge(var, and)?;
                } else {
                    g.add_node(Gate::Not, &[(var, 1)], &[(and, 1)])?;
                }
            }
        }
        BoolCirc::new(g)
    }

    /// Two-bit adder: inputs `a, b`, outputs `sum, carry`.
    pub fn half_adder() -> Result<BoolCirc> {
        Ok(BoolCirc::from_parentheses(&["(a)^(b)", "(a)&(b)"])?.0)
    }

    /// Ripple-carry adder on `width`-bit words.
    ///
    /// Inputs are `a` (most significant first), then `b`, then the carry
    /// in; outputs are the sum (most significant first), then the carry out.
    pub fn adder(width: usize) -> Result<BoolCirc> {
        let mut g = OpenDigraph::empty();
        let a = add_inputs(&mut g, width)?;
        let b = add_inputs(&mut g, width)?;
        let mut carry = add_inputs(&mut g, 1)?[0];

        let mut sums = vec![NodeId::default(); width];
        for i in (0..width).rev() {
            let half = g.add_node(Gate::Xor, &[(a[i], 1), (b[i], 1)], &[])?;
            let propagate = g.add_node(Gate::Copy, &[(half, 1)], &[])?;
            sums[i] = g.add_node(Gate::Xor, &[(propagate, 1), (carry, 1)], &[])?;
            let generate = g.add_node(Gate::And, &[(a[i], 1), (b[i], 1)], &[])?;
            let chained = g.add_node(Gate::And, &[(propagate, 1), (carry, 1)], &[])?;
            let carry_out = g.add_node(Gate::Or, &[(generate, 1), (chained, 1)], &[])?;
            carry = g.add_node(Gate::Copy, &[(carry_out, 1)], &[])?;
        }
        for &sum in &sums {
            g.add_output_node(sum, Gate::Copy)?;
        }
        g.add_output_node(carry, Gate::Copy)?;
        BoolCirc::new(g)
    }

    /// Hamming(7,4) encoder: data `d1..d4` to codeword `c1..c7`, parity bits
    /// at positions 1, 2 and 4.
    pub fn hamming_encoder() -> Result<BoolCirc> {
        let exprs = [
            xor_of(&["d1", "d2", "d4"]),
            xor_of(&["d1", "d3", "d4"]),
            "(d1)".to_string(),
            xor_of(&["d2", "d3", "d4"]),
            "(d2)".to_string(),
            "(d3)".to_string(),
            "(d4)".to_string(),
        ];
        let exprs: Vec<&str> = exprs.iter().map(String::as_str).collect();
        Ok(BoolCirc::from_parentheses(&exprs)?.0)
    }

    /// Hamming(7,4) decoder: codeword `c1..c7` to data `d1..d4`, correcting
    /// at most one flipped bit.
    pub fn hamming_decoder() -> Result<BoolCirc> {
        let s1 = xor_of(&["c1", "c3", "c5", "c7"]);
        let s2 = xor_of(&["c2", "c3", "c6", "c7"]);
        let s3 = xor_of(&["c4", "c5", "c6", "c7"]);
        let syndrome = |pattern: [bool; 3]| -> String {
            let terms: Vec<String> = [&s1, &s2, &s3]
                .iter()
                .zip(pattern)
                .map(|(s, set)| if set { format!("({s})") } else { format!("(~({s}))") })
                .collect();
            terms.join("&")
        };
        // data bit at codeword position p flips when the syndrome spells p
        let exprs = [
            format!("(c3)^({})", syndrome([true, true, false])),
            format!("(c5)^({})", syndrome([true, false, true])),
            format!("(c6)^({})", syndrome([false, true, true])),
            format!("(c7)^({})", syndrome([true, true, true])),
        ];
        let exprs: Vec<&str> = exprs.iter().map(String::as_str).collect();
        Ok(BoolCirc::from_parentheses(&exprs)?.0)
    }
}

/// `count` fan-out nodes, each fed by a new input, in order.
fn add_inputs(g: &mut OpenDigraph<Gate>, count: usize) -> Result<Vec<NodeId>> {
    (0..count)
        .map(|_| {
            let id = g.add_node(Gate::Copy, &[], &[])?;
            g.add_input_node(id, Gate::Copy)?;
            Ok(id)
        })
        .collect()
}

fn xor_of(names: &[&str]) -> String {
    names.iter().map(|n| format!("({n})")).collect::<Vec<_>>().join("^")
}
