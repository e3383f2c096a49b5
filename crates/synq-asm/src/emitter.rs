//! SYNQASM text emitter and a JSON codec, for serializing/deserializing
//! circuits as an alternative to the textual grammar.

use serde::{Deserialize, Serialize};

use synq_ir::{
    Circuit, ClbitId, GateKind, Instruction, InstructionKind, ParameterExpression, QubitId,
    StandardGate,
};

use crate::error::{ParseError, ParseResult};

/// Emit a circuit as SYNQASM source text.
pub fn emit(circuit: &Circuit) -> ParseResult<String> {
    let mut emitter = Emitter::new();
    emitter.emit_circuit(circuit)
}

/// SYNQASM textual emitter. All qubits and classical bits are declared in a
/// single flat register named `q`/`c`, matching how [`crate::parser`] lowers
/// registers into a contiguous id space.
struct Emitter {
    output: String,
}

#[allow(clippy::unused_self, clippy::unnecessary_wraps)]
impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> ParseResult<String> {
        self.writeln("SYNQASM 1.0;");

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qreg q[{num_qubits}];"));
        }

        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("creg c[{num_clbits}];"));
        }

        for (_, instruction) in circuit.dag().topological_ops() {
            self.emit_instruction(instruction)?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> ParseResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let name = self.emit_gate_name(&gate.kind)?;
                let params = self.emit_gate_params(&gate.kind);
                let qubits = self.emit_qubits(&instruction.qubits);
                if params.is_empty() {
                    self.writeln(&format!("{name} {qubits};"));
                } else {
                    self.writeln(&format!("{name}({params}) {qubits};"));
                }
            }
            InstructionKind::Measure => {
                let qubits = self.emit_qubits(&instruction.qubits);
                let clbits = self.emit_clbits(&instruction.clbits);
                self.writeln(&format!("measure {qubits} -> {clbits};"));
            }
            InstructionKind::Reset => {
                let qubits = self.emit_qubits(&instruction.qubits);
                self.writeln(&format!("reset {qubits};"));
            }
            InstructionKind::Barrier => {
                let qubits = self.emit_qubits(&instruction.qubits);
                self.writeln(&format!("barrier {qubits};"));
            }
        }
        Ok(())
    }

    fn emit_gate_name(&self, kind: &GateKind) -> ParseResult<String> {
        match kind {
            GateKind::Standard(std) => Ok(std.name().to_string()),
            GateKind::Custom(custom) => Err(ParseError::Generic(format!(
                "custom gate '{}' has no SYNQASM representation",
                custom.name
            ))),
        }
    }

    fn emit_gate_params(&self, kind: &GateKind) -> String {
        match kind {
            GateKind::Standard(std) => std
                .parameters()
                .iter()
                .map(|p| self.emit_param(p))
                .collect::<Vec<_>>()
                .join(", "),
            GateKind::Custom(custom) => custom
                .params
                .iter()
                .map(|p| self.emit_param(p))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    #[allow(clippy::only_used_in_recursion)]
    fn emit_param(&self, param: &ParameterExpression) -> String {
        match param {
            ParameterExpression::Constant(v) => {
                let pi = std::f64::consts::PI;
                if (*v - pi).abs() < 1e-10 {
                    "pi".into()
                } else if (*v - pi / 2.0).abs() < 1e-10 {
                    "pi/2".into()
                } else if (*v - pi / 4.0).abs() < 1e-10 {
                    "pi/4".into()
                } else if (*v + pi / 2.0).abs() < 1e-10 {
                    "-pi/2".into()
                } else if (*v + pi / 4.0).abs() < 1e-10 {
                    "-pi/4".into()
                } else {
                    format!("{v:.6}")
                }
            }
            ParameterExpression::Symbol(name) => name.clone(),
            ParameterExpression::Pi => "pi".into(),
            ParameterExpression::Neg(e) => format!("-({})", self.emit_param(e)),
            ParameterExpression::Add(a, b) => {
                format!("({} + {})", self.emit_param(a), self.emit_param(b))
            }
            ParameterExpression::Sub(a, b) => {
                format!("({} - {})", self.emit_param(a), self.emit_param(b))
            }
            ParameterExpression::Mul(a, b) => {
                format!("({} * {})", self.emit_param(a), self.emit_param(b))
            }
            ParameterExpression::Div(a, b) => {
                format!("({} / {})", self.emit_param(a), self.emit_param(b))
            }
        }
    }

    fn emit_qubits(&self, qubits: &[QubitId]) -> String {
        qubits
            .iter()
            .map(|q| format!("q[{}]", q.0))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn emit_clbits(&self, clbits: &[ClbitId]) -> String {
        clbits
            .iter()
            .map(|c| format!("c[{}]", c.0))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

// ============================================================================
// JSON codec
// ============================================================================

/// A single operation in the JSON program representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonOperation {
    kind: String,
    qubits: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    clbits: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<f64>,
}

/// Top-level JSON program representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonProgram {
    num_qubits: u32,
    num_clbits: u32,
    operations: Vec<JsonOperation>,
}

/// Serialize a circuit to the JSON program representation.
pub fn to_json(circuit: &Circuit) -> ParseResult<String> {
    let mut operations = Vec::new();

    for (_, instruction) in circuit.dag().topological_ops() {
        let op = match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let kind = match &gate.kind {
                    GateKind::Standard(std) => std.name().to_string(),
                    GateKind::Custom(custom) => custom.name.clone(),
                };
                let raw_params: Vec<&ParameterExpression> = match &gate.kind {
                    GateKind::Standard(std) => std.parameters(),
                    GateKind::Custom(custom) => custom.params.iter().collect(),
                };
                let params = raw_params
                    .iter()
                    .map(|p| {
                        p.as_f64().ok_or_else(|| {
                            ParseError::Generic(format!(
                                "cannot serialize symbolic parameter '{p:?}' to JSON"
                            ))
                        })
                    })
                    .collect::<ParseResult<Vec<f64>>>()?;
                JsonOperation {
                    kind,
                    qubits: instruction.qubits.iter().map(|q| q.0).collect(),
                    clbits: vec![],
                    params,
                }
            }
            InstructionKind::Measure => JsonOperation {
                kind: "measure".into(),
                qubits: instruction.qubits.iter().map(|q| q.0).collect(),
                clbits: instruction.clbits.iter().map(|c| c.0).collect(),
                params: vec![],
            },
            InstructionKind::Reset => JsonOperation {
                kind: "reset".into(),
                qubits: instruction.qubits.iter().map(|q| q.0).collect(),
                clbits: vec![],
                params: vec![],
            },
            InstructionKind::Barrier => JsonOperation {
                kind: "barrier".into(),
                qubits: instruction.qubits.iter().map(|q| q.0).collect(),
                clbits: vec![],
                params: vec![],
            },
        };
        operations.push(op);
    }

    let program = JsonProgram {
        num_qubits: circuit.num_qubits() as u32,
        num_clbits: circuit.num_clbits() as u32,
        operations,
    };

    Ok(serde_json::to_string_pretty(&program)?)
}

/// Deserialize a circuit from the JSON program representation.
pub fn from_json(source: &str) -> ParseResult<Circuit> {
    let program: JsonProgram = serde_json::from_str(source)?;
    let mut circuit = Circuit::with_size("synqasm", program.num_qubits, program.num_clbits);

    for op in &program.operations {
        let qubits: Vec<QubitId> = op.qubits.iter().map(|&q| QubitId(q)).collect();
        let clbits: Vec<ClbitId> = op.clbits.iter().map(|&c| ClbitId(c)).collect();
        let params: Vec<ParameterExpression> = op
            .params
            .iter()
            .map(|&v| ParameterExpression::Constant(v))
            .collect();

        lower_json_operation(&mut circuit, &op.kind, &qubits, &clbits, &params)?;
    }

    Ok(circuit)
}

#[allow(clippy::too_many_lines)]
fn lower_json_operation(
    circuit: &mut Circuit,
    kind: &str,
    qubits: &[QubitId],
    clbits: &[ClbitId],
    params: &[ParameterExpression],
) -> ParseResult<()> {
    let nq = qubits.len();
    let np = params.len();

    macro_rules! require {
        ($qcount:expr, $pcount:expr) => {
            if nq != $qcount {
                return Err(ParseError::WrongQubitCount {
                    gate: kind.to_string(),
                    expected: $qcount,
                    got: nq,
                });
            }
            if np != $pcount {
                return Err(ParseError::WrongParameterCount {
                    gate: kind.to_string(),
                    expected: $pcount,
                    got: np,
                });
            }
        };
    }

    match kind {
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
        "measure" => {
            if qubits.len() != clbits.len() {
                return Err(ParseError::Generic(format!(
                    "measure has {} qubits but {} classical bits",
                    qubits.len(),
                    clbits.len()
                )));
            }
            for (&q, &c) in qubits.iter().zip(clbits.iter()) {
                circuit.measure(q, c)?;
            }
        }
        "barrier" => {
            if qubits.is_empty() {
                circuit.barrier_all()?;
            } else {
                circuit.barrier(qubits.iter().copied())?;
            }
        }
        other => return Err(ParseError::UnknownGate(other.to_string())),
    }

    Ok(())
}
