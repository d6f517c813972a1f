//! The expression half of the AST. Every expression is a small tagged
//! union (`ExprKind`) wrapped in `Expr`, which additionally carries an
//! `id` stamped by the parser at construction time. That id is the key
//! the resolver uses to record lexical-scope distances (see
//! `resolver.rs`) and the interpreter uses to look them back up — AST
//! identity, not textual value, since two uses of the same name at
//! different sites must resolve independently.

use crate::literal::Literal;
use crate::token::Token;

pub type ExprId = u32;

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    Logical(LogicalData),
    Unary(UnaryData),
    Binary(BinaryData),
    Grouping(GroupingData),
    Variable(VariableData),
    Assign(AssignData),
    Call(CallData),
    Get(GetData),
    Set(SetData),
    This(ThisData),
    Super(SuperData),
}

#[derive(Debug, Clone)]
pub struct LogicalData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct UnaryData {
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryData {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct GroupingData {
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct VariableData {
    pub name: Token,
}

#[derive(Debug, Clone)]
pub struct AssignData {
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallData {
    pub callee: Box<Expr>,
    pub paren: Token,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct GetData {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone)]
pub struct SetData {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct ThisData {
    pub keyword: Token,
}

#[derive(Debug, Clone)]
pub struct SuperData {
    pub keyword: Token,
    pub method: Token,
}
