//! Lowers an AST [`Program`] into a [`Circuit`], in two passes: collect
//! register declarations, then lower each statement against those tables.

use rustc_hash::FxHashMap;

use synq_ir::{Circuit, ClbitId, ParameterExpression, QubitId};

use crate::ast::{BinOp, BitRef, Expression, GateCall, Program, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};

/// Lower a [`Program`] into a [`Circuit`].
pub(crate) fn lower_to_circuit(program: &Program) -> ParseResult<Circuit> {
    Lowerer::new(program).lower()
}

struct Lowerer<'a> {
    program: &'a Program,
    qregs: FxHashMap<String, (u32, u32)>,
    cregs: FxHashMap<String, (u32, u32)>,
}

impl<'a> Lowerer<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
        }
    }

    fn lower(mut self) -> ParseResult<Circuit> {
        let mut next_qubit = 0u32;
        let mut next_clbit = 0u32;

        for statement in &self.program.statements {
            match statement {
                Statement::QregDecl { name, size } => {
                    self.qregs.insert(name.clone(), (next_qubit, *size));
                    next_qubit += size;
                }
                Statement::CregDecl { name, size } => {
                    self.cregs.insert(name.clone(), (next_clbit, *size));
                    next_clbit += size;
                }
                _ => {}
            }
        }

        let mut circuit = Circuit::with_size("synqasm", next_qubit, next_clbit);

        for statement in &self.program.statements {
            match statement {
                Statement::QregDecl { .. } | Statement::CregDecl { .. } => {}
                Statement::Gate(call) => self.lower_gate_call(&mut circuit, call)?,
                Statement::Measure { qubits, clbits } => {
                    if qubits.len() != clbits.len() {
                        return Err(ParseError::Generic(format!(
                            "measure has {} qubits but {} classical bits",
                            qubits.len(),
                            clbits.len()
                        )));
                    }
                    for (q, c) in qubits.iter().zip(clbits.iter()) {
                        let qubit = self.resolve_qubit(q)?;
                        let clbit = self.resolve_clbit(c)?;
                        circuit.measure(qubit, clbit)?;
                    }
                }
                Statement::Barrier { qubits } => {
                    if qubits.is_empty() {
                        circuit.barrier_all()?;
                    } else {
                        let resolved = self.resolve_qubits(qubits)?;
                        circuit.barrier(resolved)?;
                    }
                }
            }
        }

        Ok(circuit)
    }

    fn resolve_qubit(&self, qref: &QubitRef) -> ParseResult<QubitId> {
        let (start, size) = self
            .qregs
            .get(&qref.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(qref.register.clone()))?;
        if qref.index >= *size {
            return Err(ParseError::IndexOutOfBounds {
                register: qref.register.clone(),
                index: qref.index as usize,
                size: *size as usize,
            });
        }
        Ok(QubitId(start + qref.index))
    }

    fn resolve_qubits(&self, qrefs: &[QubitRef]) -> ParseResult<Vec<QubitId>> {
        qrefs.iter().map(|q| self.resolve_qubit(q)).collect()
    }

    fn resolve_clbit(&self, bref: &BitRef) -> ParseResult<ClbitId> {
        let (start, size) = self
            .cregs
            .get(&bref.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(bref.register.clone()))?;
        if bref.index >= *size {
            return Err(ParseError::IndexOutOfBounds {
                register: bref.register.clone(),
                index: bref.index as usize,
                size: *size as usize,
            });
        }
        Ok(ClbitId(start + bref.index))
    }

    #[allow(clippy::too_many_lines)]
    fn lower_gate_call(&self, circuit: &mut Circuit, call: &GateCall) -> ParseResult<()> {
        let qubits = self.resolve_qubits(&call.qubits)?;
        let params: Vec<ParameterExpression> = call.params.iter().map(expr_to_param).collect();

        let name = call.name.as_str();
        let nq = qubits.len();
        let np = params.len();

        macro_rules! require {
            ($qcount:expr, $pcount:expr) => {
                if nq != $qcount {
                    return Err(ParseError::WrongQubitCount {
                        gate: name.to_string(),
                        expected: $qcount,
                        got: nq,
                    });
                }
                if np != $pcount {
                    return Err(ParseError::WrongParameterCount {
                        gate: name.to_string(),
                        expected: $pcount,
                        got: np,
                    });
                }
            };
        }

        match name {
            "h" => {
                require!(1, 0);
                circuit.h(qubits[0])?;
            }
            "x" => {
                require!(1, 0);
                circuit.x(qubits[0])?;
            }
            "y" => {
                require!(1, 0);
                circuit.y(qubits[0])?;
            }
            "z" => {
                require!(1, 0);
                circuit.z(qubits[0])?;
            }
            "s" => {
                require!(1, 0);
                circuit.s(qubits[0])?;
            }
            "sdg" => {
                require!(1, 0);
                circuit.sdg(qubits[0])?;
            }
            "t" => {
                require!(1, 0);
                circuit.t(qubits[0])?;
            }
            "tdg" => {
                require!(1, 0);
                circuit.tdg(qubits[0])?;
            }
            "sx" => {
                require!(1, 0);
                circuit.sx(qubits[0])?;
            }
            "sxdg" => {
                require!(1, 0);
                circuit.sxdg(qubits[0])?;
            }
            "rx" => {
                require!(1, 1);
                circuit.rx(params[0].clone(), qubits[0])?;
            }
            "ry" => {
                require!(1, 1);
                circuit.ry(params[0].clone(), qubits[0])?;
            }
            "rz" => {
                require!(1, 1);
                circuit.rz(params[0].clone(), qubits[0])?;
            }
            "p" => {
                require!(1, 1);
                circuit.p(params[0].clone(), qubits[0])?;
            }
            "u" => {
                require!(1, 3);
                circuit.u(
                    params[0].clone(),
                    params[1].clone(),
                    params[2].clone(),
                    qubits[0],
                )?;
            }
            "prx" => {
                require!(1, 2);
                circuit.prx(params[0].clone(), params[1].clone(), qubits[0])?;
            }
            "reset" => {
                require!(1, 0);
                circuit.reset(qubits[0])?;
            }
            "cx" => {
                require!(2, 0);
                circuit.cx(qubits[0], qubits[1])?;
            }
            "cy" => {
                require!(2, 0);
                circuit.cy(qubits[0], qubits[1])?;
            }
            "cz" => {
                require!(2, 0);
                circuit.cz(qubits[0], qubits[1])?;
            }
            "ch" => {
                require!(2, 0);
                circuit.ch(qubits[0], qubits[1])?;
            }
            "swap" => {
                require!(2, 0);
                circuit.swap(qubits[0], qubits[1])?;
            }
            "iswap" => {
                require!(2, 0);
                circuit.iswap(qubits[0], qubits[1])?;
            }
            "crx" => {
                require!(2, 1);
                circuit.crx(params[0].clone(), qubits[0], qubits[1])?;
            }
            "cry" => {
                require!(2, 1);
                circuit.cry(params[0].clone(), qubits[0], qubits[1])?;
            }
            "crz" => {
                require!(2, 1);
                circuit.crz(params[0].clone(), qubits[0], qubits[1])?;
            }
            "cp" => {
                require!(2, 1);
                circuit.cp(params[0].clone(), qubits[0], qubits[1])?;
            }
            "rxx" => {
                require!(2, 1);
                circuit.rxx(params[0].clone(), qubits[0], qubits[1])?;
            }
            "ryy" => {
                require!(2, 1);
                circuit.ryy(params[0].clone(), qubits[0], qubits[1])?;
            }
            "rzz" => {
                require!(2, 1);
                circuit.rzz(params[0].clone(), qubits[0], qubits[1])?;
            }
            "ccx" => {
                require!(3, 0);
                circuit.ccx(qubits[0], qubits[1], qubits[2])?;
            }
            "cswap" => {
                require!(3, 0);
                circuit.cswap(qubits[0], qubits[1], qubits[2])?;
            }
            other => return Err(ParseError::UnknownGate(other.to_string())),
        }

        Ok(())
    }
}

fn expr_to_param(expr: &Expression) -> ParameterExpression {
    match expr {
        Expression::Int(v) => ParameterExpression::Constant(*v as f64),
        Expression::Float(v) => ParameterExpression::Constant(*v),
        Expression::Pi => ParameterExpression::Pi,
        Expression::Neg(e) => ParameterExpression::Neg(Box::new(expr_to_param(e))),
        Expression::BinOp { left, op, right } => {
            let l = Box::new(expr_to_param(left));
            let r = Box::new(expr_to_param(right));
            match op {
                BinOp::Add => ParameterExpression::Add(l, r),
                BinOp::Sub => ParameterExpression::Sub(l, r),
                BinOp::Mul => ParameterExpression::Mul(l, r),
                BinOp::Div => ParameterExpression::Div(l, r),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_ast;
    use super::*;

    #[test]
    fn test_lower_bell_state() {
        let source = r"
            SYNQASM 1.0;
            qreg q[2];
            creg c[2];
            h q[0];
            cx q[0], q[1];
            measure q[0] -> c[0];
            measure q[1] -> c[1];
        ";
        let program = parse_ast(source).unwrap();
        let circuit = lower_to_circuit(&program).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
    }

    #[test]
    fn test_lower_index_out_of_bounds() {
        let source = r"
            SYNQASM 1.0;
            qreg q[1];
            h q[5];
        ";
        let program = parse_ast(source).unwrap();
        assert!(matches!(
            lower_to_circuit(&program),
            Err(ParseError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_lower_wrong_qubit_count() {
        let source = r"
            SYNQASM 1.0;
            qreg q[2];
            cx q[0];
        ";
        let program = parse_ast(source).unwrap();
        assert!(matches!(
            lower_to_circuit(&program),
            Err(ParseError::WrongQubitCount { .. })
        ));
    }
}
