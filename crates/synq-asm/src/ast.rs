//! Abstract Syntax Tree for SYNQASM.

use serde::{Deserialize, Serialize};

/// A complete SYNQASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// SYNQASM version (e.g., "1.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

/// A statement in a SYNQASM program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Statement {
    /// Qubit register declaration: `qreg name[n];`
    QregDecl { name: String, size: u32 },

    /// Classical register declaration: `creg name[n];`
    CregDecl { name: String, size: u32 },

    /// Gate application.
    Gate(GateCall),

    /// Measurement: `measure q -> c;`
    Measure {
        qubits: Vec<QubitRef>,
        clbits: Vec<BitRef>,
    },

    /// Barrier: `barrier q0, q1, ...;`
    Barrier { qubits: Vec<QubitRef> },
}

/// A gate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

/// Reference to a single qubit register element: `q[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    pub index: u32,
}

/// Reference to a single classical bit register element: `c[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    pub index: u32,
}

/// A parameter expression: a numeric literal, `pi`, a unary negation, or a
/// `+ - * /` combination of the above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expression {
    Int(i64),
    Float(f64),
    Pi,
    Neg(Box<Expression>),
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
}

impl Expression {
    /// Evaluate to a constant f64. Always succeeds: SYNQASM parameters carry
    /// no symbolic identifiers.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Expression::Int(v) => *v as f64,
            Expression::Float(v) => *v,
            Expression::Pi => std::f64::consts::PI,
            Expression::Neg(e) => -e.as_f64(),
            Expression::BinOp { left, op, right } => {
                let l = left.as_f64();
                let r = right.as_f64();
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                }
            }
        }
    }
}

/// Binary operators allowed in a parameter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_expression_eval() {
        let expr = Expression::BinOp {
            left: Box::new(Expression::Pi),
            op: BinOp::Div,
            right: Box::new(Expression::Int(2)),
        };

        assert!((expr.as_f64() - PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_negation() {
        let expr = Expression::Neg(Box::new(Expression::Pi));
        assert!((expr.as_f64() + PI).abs() < 1e-10);
    }
}
