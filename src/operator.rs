//! Operator pairing map
//!
//! Each mutable operator has exactly one opposite. Pairs keep the arity and
//! operand types of the expression, so a mutant usually still compiles and only
//! a behavioral test can tell it apart.

use std::fmt;

use syn::BinOp;

/// A binary operator that can be flipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

impl Operator {
    /// Map a parsed binary operator, ignoring everything that isn't flippable.
    ///
    /// Compound assignments (`+=`, `*=`, ...) and comparisons return `None`.
    pub fn from_bin_op(op: &BinOp) -> Option<Self> {
        match op {
            BinOp::Add(_) => Some(Operator::Add),
            BinOp::Sub(_) => Some(Operator::Sub),
            BinOp::Mul(_) => Some(Operator::Mul),
            BinOp::Div(_) => Some(Operator::Div),
            BinOp::And(_) => Some(Operator::And),
            BinOp::Or(_) => Some(Operator::Or),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// The paired replacement. Applying it twice yields the original operator.
    pub fn opposite(self) -> Self {
        match self {
            Operator::Add => Operator::Sub,
            Operator::Sub => Operator::Add,
            Operator::Mul => Operator::Div,
            Operator::Div => Operator::Mul,
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
