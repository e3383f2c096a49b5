//! Statement parsing for SYNQASM.

use super::Parser;
use crate::ast::{BitRef, GateCall, QubitRef, Statement};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Qreg => self.parse_qreg_decl(),
            Token::Creg => self.parse_creg_decl(),
            Token::Measure => self.parse_measure(),
            Token::Barrier => self.parse_barrier(),
            Token::Identifier(name) => {
                self.advance();
                self.parse_gate_call(name)
            }
            _ => Err(ParseError::UnexpectedToken {
                line: self.line,
                expected: "statement".into(),
                found: token.to_string(),
            }),
        }
    }

    /// Parse `qreg name[size];`.
    fn parse_qreg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Qreg)?;
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = u32::try_from(self.parse_int_literal()?).expect("qreg size exceeds u32::MAX");
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::QregDecl { name, size })
    }

    /// Parse `creg name[size];`.
    fn parse_creg_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Creg)?;
        let name = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let size = u32::try_from(self.parse_int_literal()?).expect("creg size exceeds u32::MAX");
        self.expect(Token::RBracket)?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::CregDecl { name, size })
    }

    /// Parse `measure q0, q1, ... -> c0, c1, ...;`.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Arrow)?;
        let clbits = self.parse_bit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Measure { qubits, clbits })
    }

    /// Parse `barrier q0, q1, ...;`.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse `name(p0, p1, ...) q0, q1, ...;` with the parameter list omitted
    /// entirely when the gate takes no parameters.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<Statement> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    /// Parse a comma-separated list of qubit references.
    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single `name[index]` qubit reference.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let register = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let index = self.parse_int_literal()? as u32;
        self.expect(Token::RBracket)?;
        Ok(QubitRef { register, index })
    }

    /// Parse a comma-separated list of classical bit references.
    fn parse_bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = vec![self.parse_bit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_bit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single `name[index]` classical bit reference.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let register = self.parse_identifier()?;
        self.expect(Token::LBracket)?;
        let index = self.parse_int_literal()? as u32;
        self.expect(Token::RBracket)?;
        Ok(BitRef { register, index })
    }
}
