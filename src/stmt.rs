//! The statement half of the AST. Unlike expressions, statements never
//! need a resolution-map identity (only variable *uses*, which are always
//! expressions, get resolved), so `Stmt` carries no id.

use std::rc::Rc;

use crate::expr::Expr;
use crate::token::Token;

#[derive(Debug)]
pub enum Stmt {
    Expression(ExpressionData),
    Print(PrintData),
    Var(VarData),
    Block(BlockData),
    If(IfData),
    While(WhileData),
    Function(Rc<FunctionData>),
    Return(ReturnData),
    Class(ClassData),
    Break(BreakData),
}

#[derive(Debug)]
pub struct ExpressionData {
    pub expr: Expr,
}

#[derive(Debug)]
pub struct PrintData {
    pub expr: Expr,
}

#[derive(Debug)]
pub struct VarData {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug)]
pub struct BlockData {
    pub statements: Vec<Stmt>,
}

#[derive(Debug)]
pub struct IfData {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug)]
pub struct WhileData {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

/// Shared by top-level `fun` declarations and class methods; wrapped in
/// `Rc` so building a runtime `Function` from it (see `function.rs`)
/// never deep-clones the body.
#[derive(Debug)]
pub struct FunctionData {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub struct ReturnData {
    pub keyword: Token,
    pub value: Option<Expr>,
}

#[derive(Debug)]
pub struct ClassData {
    pub name: Token,
    pub superclass: Option<Expr>,
    pub methods: Vec<Rc<FunctionData>>,
}

#[derive(Debug)]
pub struct BreakData {
    pub keyword: Token,
}
