//! AST representing an expression, e.g. the `test` attribute of an `<if>`.

use crate::types::span::Span;
use crate::Value;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Var(Var),
    Member(Member),
    Call(Call),
    Unary(Unary),
    Binary(Binary),
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: Value,
    pub span: Span,
}

/// A variable path like `user.roles[0]`, resolved through the scope.
#[derive(Debug, Clone)]
pub struct Var {
    pub name: Ident,
    pub path: Vec<Access>,
    pub span: Span,
}

/// Member access on an arbitrary expression, e.g. `(a || b).length`.
#[derive(Debug, Clone)]
pub struct Member {
    pub receiver: Box<Expr>,
    pub access: Access,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Access {
    /// `.name`
    Key(Ident),
    /// `.0` or `[0]`
    Index(usize),
    /// `[expr]`
    Dynamic(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(lit) => lit.span,
            Self::Var(var) => var.span,
            Self::Member(member) => member.span,
            Self::Call(call) => call.span,
            Self::Unary(unary) => unary.span,
            Self::Binary(binary) => binary.span,
        }
    }
}

impl BinaryOp {
    /// Returns the binding power of the operator, higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div | Self::Rem => 6,
        }
    }

    pub const fn human(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}
