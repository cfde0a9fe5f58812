use crate::expr::lex::{Lexer, Token};
use crate::types::ast;
use crate::types::span::Span;
use crate::{Error, Result, Value};

/// A parser that constructs an expression AST from a token stream.
///
/// Binary operators are parsed using precedence climbing, everything else is
/// simple recursive descent. It sometimes needs to peek at the next token to
/// know how to proceed and uses the `peeked` buffer to do this.
pub struct Parser<'source> {
    /// A lexer that tokenizes the expression source.
    tokens: Lexer<'source>,

    /// Remember a peeked value, even if it was `None`
    peeked: Option<Option<(Token, Span)>>,
}

/// Limits the height of the expression tree. Both recursion and chains of
/// binary operators or member accesses count towards it since evaluation
/// recurses through every level.
const MAX_DEPTH: usize = 128;

impl<'source> Parser<'source> {
    /// Construct a new parser.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: Lexer::new(source),
            peeked: None,
        }
    }

    /// Parses a complete expression, the entire source must be consumed.
    pub fn parse(mut self) -> Result<ast::Expr> {
        if self.peek()?.is_none() {
            return Err(self.err("empty expression"));
        }
        let expr = self.parse_expr(0, 0)?;
        match self.next()? {
            None => Ok(expr),
            Some((tk, span)) => Err(self.err_unexpected_token("end of expression", tk, span)),
        }
    }

    fn parse_expr(&mut self, min: u8, mut depth: usize) -> Result<ast::Expr> {
        if depth > MAX_DEPTH {
            return Err(self.err_depth());
        }

        let mut lhs = self.parse_unary(depth)?;
        while let Some((tk, _)) = self.peek()? {
            let Some(op) = binary_op(tk) else { break };
            let prec = op.precedence();
            if prec < min {
                break;
            }
            self.next()?;
            depth += 1;
            let rhs = self.parse_expr(prec + 1, depth)?;
            let span = lhs.span().combine(rhs.span());
            lhs = ast::Expr::Binary(ast::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, depth: usize) -> Result<ast::Expr> {
        if depth > MAX_DEPTH {
            return Err(self.err_depth());
        }

        let op = match self.peek()? {
            Some((Token::Bang, span)) => Some((ast::UnaryOp::Not, span)),
            Some((Token::Minus, span)) => Some((ast::UnaryOp::Neg, span)),
            Some((Token::Plus, _)) => {
                self.next()?;
                return self.parse_unary(depth + 1);
            }
            _ => None,
        };

        match op {
            Some((op, span)) => {
                self.next()?;
                let expr = self.parse_unary(depth + 1)?;
                let span = span.combine(expr.span());
                Ok(ast::Expr::Unary(ast::Unary {
                    op,
                    expr: Box::new(expr),
                    span,
                }))
            }
            None => self.parse_postfix(depth),
        }
    }

    fn parse_postfix(&mut self, mut depth: usize) -> Result<ast::Expr> {
        let mut expr = self.parse_primary(depth)?;
        loop {
            let (access, end) = match self.peek()? {
                Some((Token::Dot, _)) => {
                    self.next()?;
                    self.parse_member()?
                }
                Some((Token::OpenBracket, _)) => {
                    self.next()?;
                    let index = self.parse_expr(0, depth + 1)?;
                    let end = self.expect(Token::CloseBracket)?;
                    (to_access(index), end)
                }
                _ => break,
            };
            let span = expr.span().combine(end);
            expr = match expr {
                ast::Expr::Var(mut var) => {
                    var.path.push(access);
                    var.span = span;
                    ast::Expr::Var(var)
                }
                receiver => {
                    depth += 1;
                    if depth > MAX_DEPTH {
                        return Err(self.err_depth());
                    }
                    ast::Expr::Member(ast::Member {
                        receiver: Box::new(receiver),
                        access,
                        span,
                    })
                }
            };
        }
        Ok(expr)
    }

    fn parse_member(&mut self) -> Result<(ast::Access, Span)> {
        match self.next()? {
            Some((Token::Ident, span)) => {
                let name = self.source()[span].to_owned();
                Ok((ast::Access::Key(ast::Ident { name, span }), span))
            }
            Some((Token::Number, span)) => {
                let index = self.source()[span]
                    .parse()
                    .map_err(|_| self.err(format!("invalid index `{}`", &self.source()[span])))?;
                Ok((ast::Access::Index(index), span))
            }
            Some((tk, span)) => Err(self.err_unexpected_token("identifier", tk, span)),
            None => Err(self.err_unexpected_eof("identifier")),
        }
    }

    fn parse_primary(&mut self, depth: usize) -> Result<ast::Expr> {
        let expr = match self.next()? {
            Some((Token::Ident, span)) => {
                let value = match &self.source()[span] {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    "null" | "undefined" => Some(Value::None),
                    _ => None,
                };
                match value {
                    Some(value) => ast::Expr::Literal(ast::Literal { value, span }),
                    None => {
                        let name = ast::Ident {
                            name: self.source()[span].to_owned(),
                            span,
                        };
                        if self.is_next(Token::OpenParen)? {
                            self.next()?;
                            self.parse_call(name, depth)?
                        } else {
                            ast::Expr::Var(ast::Var {
                                name,
                                path: Vec::new(),
                                span,
                            })
                        }
                    }
                }
            }

            Some((Token::Number, span)) => {
                let value = self.parse_number(span)?;
                ast::Expr::Literal(ast::Literal { value, span })
            }

            Some((Token::String, span)) => {
                let value = Value::String(self.parse_string(span));
                ast::Expr::Literal(ast::Literal { value, span })
            }

            Some((Token::OpenParen, _)) => {
                let expr = self.parse_expr(0, depth + 1)?;
                self.expect(Token::CloseParen)?;
                expr
            }

            Some((tk, span)) => {
                return Err(self.err_unexpected_token("expression", tk, span));
            }

            None => return Err(self.err_unexpected_eof("expression")),
        };
        Ok(expr)
    }

    fn parse_call(&mut self, name: ast::Ident, depth: usize) -> Result<ast::Expr> {
        let mut args = Vec::new();
        let end = loop {
            if let Some((Token::CloseParen, span)) = self.peek()? {
                self.next()?;
                break span;
            }
            args.push(self.parse_expr(0, depth + 1)?);
            match self.next()? {
                Some((Token::Comma, _)) => continue,
                Some((Token::CloseParen, span)) => break span,
                Some((tk, span)) => {
                    return Err(self.err_unexpected_token("comma or close parenthesis", tk, span))
                }
                None => return Err(self.err_unexpected_eof("close parenthesis")),
            }
        };
        let span = name.span.combine(end);
        Ok(ast::Expr::Call(ast::Call { name, args, span }))
    }

    fn parse_number(&self, span: Span) -> Result<Value> {
        let raw = self.source()[span].replace('_', "");
        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
        raw.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| self.err(format!("invalid number `{}`", &self.source()[span])))
    }

    fn parse_string(&self, span: Span) -> String {
        let raw = &self.source()[span];
        let inner = &raw[1..raw.len() - 1];
        if !inner.contains('\\') {
            return inner.to_owned();
        }
        let mut string = String::with_capacity(inner.len());
        let mut iter = inner.chars();
        while let Some(c) = iter.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            match iter.next() {
                Some('n') => string.push('\n'),
                Some('r') => string.push('\r'),
                Some('t') => string.push('\t'),
                Some('0') => string.push('\0'),
                Some(c) => string.push(c),
                None => string.push('\\'),
            }
        }
        string
    }

    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            Some((tk, span)) => Err(self.err_unexpected_token(exp.human(), tk, span)),
            None => Err(self.err_unexpected_eof(exp.human())),
        }
    }

    fn is_next(&mut self, token: Token) -> Result<bool> {
        Ok(matches!(self.peek()?, Some((tk, _)) if tk == token))
    }

    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        if let o @ None = &mut self.peeked {
            *o = Some(self.tokens.next()?);
        }
        Ok(self.peeked.flatten())
    }

    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(next) => Ok(next),
            None => self.tokens.next(),
        }
    }

    fn source(&self) -> &'source str {
        self.tokens.source
    }

    fn err(&self, reason: impl Into<String>) -> Error {
        Error::expression(self.source(), reason)
    }

    fn err_depth(&self) -> Error {
        self.err("expression is nested too deeply")
    }

    fn err_unexpected_eof(&self, exp: &str) -> Error {
        self.err(format!("expected {exp}, found end of expression"))
    }

    fn err_unexpected_token(&self, exp: &str, got: Token, span: Span) -> Error {
        let got = got.human();
        self.err(format!(
            "expected {exp}, found {got} at offset {}",
            span.m
        ))
    }
}

fn binary_op(tk: Token) -> Option<ast::BinaryOp> {
    let op = match tk {
        Token::OrOr => ast::BinaryOp::Or,
        Token::AndAnd => ast::BinaryOp::And,
        Token::EqEq => ast::BinaryOp::Eq,
        Token::NotEq => ast::BinaryOp::Ne,
        Token::Lt => ast::BinaryOp::Lt,
        Token::Le => ast::BinaryOp::Le,
        Token::Gt => ast::BinaryOp::Gt,
        Token::Ge => ast::BinaryOp::Ge,
        Token::Plus => ast::BinaryOp::Add,
        Token::Minus => ast::BinaryOp::Sub,
        Token::Star => ast::BinaryOp::Mul,
        Token::Slash => ast::BinaryOp::Div,
        Token::Percent => ast::BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}

/// Converts a bracketed index into the most specific access.
fn to_access(index: ast::Expr) -> ast::Access {
    match index {
        ast::Expr::Literal(ast::Literal {
            value: Value::Integer(i),
            ..
        }) if i >= 0 => match usize::try_from(i) {
            Ok(i) => ast::Access::Index(i),
            Err(_) => ast::Access::Dynamic(Box::new(ast::Expr::Literal(ast::Literal {
                value: Value::Integer(i),
                span: Span::default(),
            }))),
        },
        ast::Expr::Literal(ast::Literal {
            value: Value::String(name),
            span,
        }) => ast::Access::Key(ast::Ident { name, span }),
        index => ast::Access::Dynamic(Box::new(index)),
    }
}
