//! Recursive-descent grammar over the lexer's token stream.
//!
//! Precedence, loosest first:
//!
//! ```text
//! or_expr    := and_expr ( OR and_expr )*
//! and_expr   := not_expr ( AND not_expr )*
//! not_expr   := NOT not_expr | comparison
//! comparison := add_sub ( cmp_op add_sub )*
//! add_sub    := mul_div ( ('+' | '-') mul_div )*
//! mul_div    := power ( ('*' | '/') power )*
//! power      := sign ( '**' sign )*
//! sign       := ('+' | '-') sign | atom
//! atom       := call | keyword | number | string | variable | '(' or_expr ')'
//! ```
//!
//! Sign binds tighter than `**`, so `-2 ** 2` is `(-2) ** 2`.
//!
//! Parentheses, signs, prefix `not` and call arguments may nest at most
//! `MAX_NESTING` deep; deeper input is a parse error.

use crate::ast::{ArithOp, CmpOp, Expr};
use crate::error::ExprError;
use crate::functions::Function;
use crate::lexer::{fragment_at, tokenize, Lexeme, TokenKind};
use crate::value::Value;
use std::collections::HashMap;

/// Deepest accepted nesting of parentheses, signs, `not` and calls.
const MAX_NESTING: usize = 64;

/// Reserved words, matched case-insensitively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Word {
    And,
    Or,
    Not,
    True,
    False,
    None,
    Cmp(CmpOp),
}

/// The expression grammar. Immutable once built; share it freely.
#[derive(Clone, Debug)]
pub struct Grammar {
    words: HashMap<&'static str, Word>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let words = HashMap::from([
            ("and", Word::And),
            ("or", Word::Or),
            ("not", Word::Not),
            ("true", Word::True),
            ("false", Word::False),
            ("none", Word::None),
            ("lt", Word::Cmp(CmpOp::Lt)),
            ("le", Word::Cmp(CmpOp::Le)),
            ("gt", Word::Cmp(CmpOp::Gt)),
            ("ge", Word::Cmp(CmpOp::Ge)),
            ("eq", Word::Cmp(CmpOp::Eq)),
            ("ne", Word::Cmp(CmpOp::Ne)),
            ("in", Word::Cmp(CmpOp::In)),
        ]);
        Self { words }
    }

    /// Parse exactly one expression; trailing tokens are an error.
    pub fn parse(&self, source: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            grammar: self,
            source,
            tokens: &tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.or_expr()?;
        if parser.pos < tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    fn word(&self, text: &str) -> Option<Word> {
        self.words.get(text.to_ascii_lowercase().as_str()).copied()
    }
}

struct Parser<'g, 't, 'src> {
    grammar: &'g Grammar,
    source: &'src str,
    tokens: &'t [Lexeme<'src>],
    pos: usize,
    depth: usize,
}

impl<'t, 'src> Parser<'_, 't, 'src> {
    fn peek(&self) -> Option<&'t Lexeme<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_word(&self) -> Option<Word> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Word => self.grammar.word(t.text),
            _ => None,
        }
    }

    fn next_is(&self, offset: usize, kind: TokenKind) -> bool {
        self.tokens
            .get(self.pos + offset)
            .is_some_and(|t| t.kind == kind)
    }

    fn bump(&mut self) -> &'t Lexeme<'src> {
        let tok = &self.tokens[self.pos];
        self.pos += 1;
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ExprError> {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.span.start).unwrap_or(self.source.len())
    }

    fn error(&self, message: &str) -> ExprError {
        let offset = self.offset();
        ExprError::Parse {
            offset,
            fragment: fragment_at(self.source, offset),
            message: message.to_string(),
        }
    }

    /// Run `inner` one nesting level deeper.
    fn nested<T>(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        let out = inner(self);
        self.depth -= 1;
        out
    }

    fn or_expr(&mut self) -> Result<Expr, ExprError> {
        let mut children = vec![self.and_expr()?];
        while self.peek_word() == Some(Word::Or) {
            self.pos += 1;
            children.push(self.and_expr()?);
        }
        Ok(collapse(children, Expr::Or))
    }

    fn and_expr(&mut self) -> Result<Expr, ExprError> {
        let mut children = vec![self.not_expr()?];
        while self.peek_word() == Some(Word::And) {
            self.pos += 1;
            children.push(self.not_expr()?);
        }
        Ok(collapse(children, Expr::And))
    }

    fn not_expr(&mut self) -> Result<Expr, ExprError> {
        if self.peek_word() == Some(Word::Not) {
            self.pos += 1;
            let operand = self.nested(|p| p.not_expr())?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ExprError> {
        let first = self.add_sub()?;
        let mut rest = Vec::new();
        while let Some(op) = self.cmp_op() {
            self.pos += 1;
            rest.push((op, self.add_sub()?));
        }
        if rest.is_empty() {
            return Ok(first);
        }
        Ok(Expr::Compare {
            first: Box::new(first),
            rest,
        })
    }

    fn cmp_op(&self) -> Option<CmpOp> {
        let op = match self.peek_kind()? {
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::Le => CmpOp::Le,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::Ge => CmpOp::Ge,
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq | TokenKind::LtGt => CmpOp::Ne,
            TokenKind::Word => match self.peek_word()? {
                Word::Cmp(op) => op,
                _ => return None,
            },
            _ => return None,
        };
        Some(op)
    }

    fn add_sub(&mut self) -> Result<Expr, ExprError> {
        self.fold(
            |p| p.mul_div(),
            |kind| match kind {
                TokenKind::Plus => Some(ArithOp::Add),
                TokenKind::Minus => Some(ArithOp::Sub),
                _ => None,
            },
            |operands, operators| Expr::AddSub {
                operands,
                operators,
            },
        )
    }

    fn mul_div(&mut self) -> Result<Expr, ExprError> {
        self.fold(
            |p| p.power(),
            |kind| match kind {
                TokenKind::Star => Some(ArithOp::Mul),
                TokenKind::Slash => Some(ArithOp::Div),
                _ => None,
            },
            |operands, operators| Expr::MulDiv {
                operands,
                operators,
            },
        )
    }

    fn fold(
        &mut self,
        operand: impl Fn(&mut Self) -> Result<Expr, ExprError>,
        operator: impl Fn(TokenKind) -> Option<ArithOp>,
        build: impl FnOnce(Vec<Expr>, Vec<ArithOp>) -> Expr,
    ) -> Result<Expr, ExprError> {
        let mut operands = vec![operand(self)?];
        let mut operators = Vec::new();
        while let Some(op) = self.peek_kind().and_then(&operator) {
            self.pos += 1;
            operators.push(op);
            operands.push(operand(self)?);
        }
        if operators.is_empty() {
            return Ok(operands.remove(0));
        }
        Ok(build(operands, operators))
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let mut operands = vec![self.sign()?];
        while self.peek_kind() == Some(TokenKind::StarStar) {
            self.pos += 1;
            operands.push(self.sign()?);
        }
        Ok(collapse(operands, Expr::Power))
    }

    fn sign(&mut self) -> Result<Expr, ExprError> {
        let negative = match self.peek_kind() {
            Some(TokenKind::Plus) => false,
            Some(TokenKind::Minus) => true,
            _ => return self.atom(),
        };
        self.pos += 1;
        let operand = self.nested(|p| p.sign())?;
        Ok(Expr::Sign {
            negative,
            operand: Box::new(operand),
        })
    }

    fn atom(&mut self) -> Result<Expr, ExprError> {
        let Some(tok) = self.peek() else {
            return Err(self.error("expected an expression"));
        };
        match tok.kind {
            TokenKind::Word if self.next_is(1, TokenKind::LParen) => self.call(),
            TokenKind::Word => {
                let text = tok.text;
                let expr = match self.grammar.word(text) {
                    Some(Word::True) | Some(Word::False) => Expr::Literal(parse_bool(text)?),
                    Some(Word::None) => Expr::Literal(Value::None),
                    _ => return Err(self.error(&format!("unexpected word '{text}'"))),
                };
                self.pos += 1;
                Ok(expr)
            }
            TokenKind::Int => {
                let value = parse_int(tok.text)?;
                self.pos += 1;
                Ok(Expr::Literal(value))
            }
            TokenKind::Float => {
                let value = parse_float(tok.text)?;
                self.pos += 1;
                Ok(Expr::Literal(value))
            }
            TokenKind::Str => {
                let text = tok.text;
                self.pos += 1;
                Ok(Expr::literal(&text[1..text.len() - 1]))
            }
            TokenKind::Variable => {
                let path = tok.text[1..].to_string();
                self.pos += 1;
                Ok(Expr::Variable(path))
            }
            TokenKind::LParen => {
                self.pos += 1;
                self.nested(|p| {
                    let inner = p.or_expr()?;
                    p.expect(TokenKind::RParen, "')'")?;
                    Ok(inner)
                })
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn call(&mut self) -> Result<Expr, ExprError> {
        let name = self.bump().text;
        let Some(function) = Function::from_name(name) else {
            self.pos -= 1;
            return Err(self.error(&format!("unknown function '{name}'")));
        };
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.nested(|p| {
            let mut args = Vec::new();
            if p.peek_kind() != Some(TokenKind::RParen) {
                args.push(p.or_expr()?);
                while p.peek_kind() == Some(TokenKind::Comma) {
                    p.pos += 1;
                    args.push(p.or_expr()?);
                }
            }
            p.expect(TokenKind::RParen, "')' or ','")?;
            Ok(args)
        })?;
        Ok(Expr::Call { function, args })
    }
}

/// A single child stands for itself; more become an n-ary node.
fn collapse(mut children: Vec<Expr>, build: impl FnOnce(Vec<Expr>) -> Expr) -> Expr {
    if children.len() == 1 {
        children.remove(0)
    } else {
        build(children)
    }
}

pub(crate) fn parse_bool(text: &str) -> Result<Value, ExprError> {
    if text.eq_ignore_ascii_case("true") {
        Ok(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Ok(Value::Bool(false))
    } else {
        Err(ExprError::LiteralFormat {
            kind: "boolean",
            text: text.to_string(),
        })
    }
}

fn parse_int(text: &str) -> Result<Value, ExprError> {
    text.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ExprError::LiteralFormat {
            kind: "integer",
            text: text.to_string(),
        })
}

fn parse_float(text: &str) -> Result<Value, ExprError> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ExprError::LiteralFormat {
            kind: "float",
            text: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Expr {
        Grammar::new().parse(src).expect("parse")
    }

    fn int(i: i64) -> Expr {
        Expr::Literal(Value::Int(i))
    }

    #[test]
    fn sign_binds_tighter_than_power() {
        assert_eq!(
            parse("-2 ** 2"),
            Expr::Power(vec![
                Expr::Sign {
                    negative: true,
                    operand: Box::new(int(2)),
                },
                int(2),
            ])
        );
    }

    #[test]
    fn arithmetic_levels_nest() {
        assert_eq!(
            parse("1 + 2 * 3"),
            Expr::AddSub {
                operands: vec![
                    int(1),
                    Expr::MulDiv {
                        operands: vec![int(2), int(3)],
                        operators: vec![ArithOp::Mul],
                    },
                ],
                operators: vec![ArithOp::Add],
            }
        );
    }

    #[test]
    fn word_aliases_are_case_insensitive() {
        let expected = Expr::Compare {
            first: Box::new(int(1)),
            rest: vec![(CmpOp::Lt, int(2)), (CmpOp::Ne, int(3))],
        };
        assert_eq!(parse("1 LT 2 ne 3"), expected);
        assert_eq!(parse("1 < 2 <> 3"), expected);
    }

    #[test]
    fn logical_precedence() {
        assert_eq!(
            parse("true or false and not none"),
            Expr::Or(vec![
                Expr::Literal(Value::Bool(true)),
                Expr::And(vec![
                    Expr::Literal(Value::Bool(false)),
                    Expr::Not(Box::new(Expr::Literal(Value::None))),
                ]),
            ])
        );
    }

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(parse("TRUE"), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("False"), Expr::Literal(Value::Bool(false)));
        assert_eq!(parse("NONE"), Expr::Literal(Value::None));
    }

    #[test]
    fn function_names_ignore_case() {
        assert_eq!(
            parse("LEN('ab')"),
            Expr::Call {
                function: Function::Len,
                args: vec![Expr::literal("ab")],
            }
        );
    }

    #[test]
    fn prefix_not_wins_over_not_function_at_logical_level() {
        assert_eq!(parse("not (1)"), Expr::Not(Box::new(int(1))));
        assert_eq!(
            parse("1 + not(0)"),
            Expr::AddSub {
                operands: vec![
                    int(1),
                    Expr::Call {
                        function: Function::Not,
                        args: vec![int(0)],
                    },
                ],
                operators: vec![ArithOp::Add],
            }
        );
    }

    #[test]
    fn variable_strips_marker() {
        assert_eq!(parse("@sos.hostname"), Expr::Variable("sos.hostname".to_string()));
    }

    #[test]
    fn strings_are_not_unescaped() {
        assert_eq!(parse(r"'a\n'"), Expr::literal(r"a\n"));
    }

    #[test]
    fn errors_point_at_offending_text() {
        let err = Grammar::new().parse("1 + ").unwrap_err();
        match err {
            ExprError::Parse {
                offset, fragment, ..
            } => {
                assert_eq!(offset, 4);
                assert_eq!(fragment, "<end of input>");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Grammar::new().parse("1 2").unwrap_err();
        assert!(matches!(err, ExprError::Parse { offset: 2, .. }));
    }

    #[test]
    fn unknown_function_is_a_parse_error() {
        let err = Grammar::new().parse("frobnicate(1)").unwrap_err();
        assert!(err.to_string().contains("unknown function 'frobnicate'"));
    }

    #[test]
    fn bare_words_are_rejected() {
        let err = Grammar::new().parse("enabled == 1").unwrap_err();
        assert!(matches!(err, ExprError::Parse { offset: 0, .. }));
    }

    #[test]
    fn oversized_integer_is_a_literal_error() {
        let err = Grammar::new().parse("99999999999999999999").unwrap_err();
        assert!(matches!(err, ExprError::LiteralFormat { kind: "integer", .. }));
    }

    #[test]
    fn nesting_is_bounded() {
        let grammar = Grammar::new();
        let at_limit = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(grammar.parse(&at_limit).unwrap(), int(1));

        for deep in [
            "(".repeat(10_000),
            format!("{}1", "-".repeat(200_000)),
            format!("{}true", "not ".repeat(MAX_NESTING + 1)),
            format!("{}1{}", "len(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1)),
        ] {
            match grammar.parse(&deep) {
                Err(ExprError::Parse { message, .. }) => {
                    assert_eq!(message, "expression nested too deeply")
                }
                other => panic!("expected a nesting error, got {other:?}"),
            }
        }
    }

    #[test]
    fn misspelled_boolean_is_a_literal_error() {
        assert!(matches!(
            parse_bool("ture"),
            Err(ExprError::LiteralFormat { kind: "boolean", .. })
        ));
    }
}
