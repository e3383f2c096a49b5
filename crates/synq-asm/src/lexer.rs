//! Lexer for SYNQASM, a deliberately small assembly dialect: one statement
//! per line, no control flow, no custom gate definitions, no modifiers.

use logos::Logos;

/// Tokens for SYNQASM source.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    #[token("SYNQASM")]
    Synqasm,

    #[token("qreg")]
    Qreg,

    #[token("creg")]
    Creg,

    #[token("measure")]
    Measure,

    #[token("barrier")]
    Barrier,

    #[token("pi")]
    Pi,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("->")]
    Arrow,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Synqasm => write!(f, "SYNQASM"),
            Token::Qreg => write!(f, "qreg"),
            Token::Creg => write!(f, "creg"),
            Token::Measure => write!(f, "measure"),
            Token::Barrier => write!(f, "barrier"),
            Token::Pi => write!(f, "pi"),
            Token::FloatLiteral(v) => write!(f, "{v}"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Arrow => write!(f, "->"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// A token with its span information.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    #[allow(dead_code)]
    pub span: std::ops::Range<usize>,
}

/// Tokenize a SYNQASM source string.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = &source[span.clone()];
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_tokens() {
        let source = "SYNQASM 1.0;";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].token, Token::Synqasm);
        assert!(matches!(tokens[1].token, Token::FloatLiteral(v) if (v - 1.0).abs() < 0.001));
        assert_eq!(tokens[2].token, Token::Semicolon);
    }

    #[test]
    fn test_qreg_declaration() {
        let source = "qreg q[2];";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].token, Token::Qreg);
        assert!(matches!(tokens[1].token, Token::Identifier(ref s) if s == "q"));
        assert_eq!(tokens[2].token, Token::LBracket);
        assert!(matches!(tokens[3].token, Token::IntLiteral(2)));
        assert_eq!(tokens[4].token, Token::RBracket);
        assert_eq!(tokens[5].token, Token::Semicolon);
    }

    #[test]
    fn test_gate_call() {
        let source = "h q[0];";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        assert!(matches!(tokens[0].token, Token::Identifier(ref s) if s == "h"));
        assert!(matches!(tokens[1].token, Token::Identifier(ref s) if s == "q"));
        assert_eq!(tokens[2].token, Token::LBracket);
        assert!(matches!(tokens[3].token, Token::IntLiteral(0)));
        assert_eq!(tokens[4].token, Token::RBracket);
        assert_eq!(tokens[5].token, Token::Semicolon);
    }

    #[test]
    fn test_parameterized_gate() {
        let source = "rx(pi/2) q[0];";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        assert!(matches!(tokens[0].token, Token::Identifier(ref s) if s == "rx"));
        assert_eq!(tokens[1].token, Token::LParen);
        assert_eq!(tokens[2].token, Token::Pi);
        assert_eq!(tokens[3].token, Token::Slash);
        assert!(matches!(tokens[4].token, Token::IntLiteral(2)));
        assert_eq!(tokens[5].token, Token::RParen);
    }

    #[test]
    fn test_line_comment_is_skipped() {
        let source = "// a comment\nqreg q[1];\n// another\ncreg c[1];\n";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[0].token, Token::Qreg);
    }
}
