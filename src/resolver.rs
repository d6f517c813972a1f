use std::collections::HashMap;
use std::mem;

use crate::error::{Error, ResolveError};
use crate::expr::{Expr, ExprId, ExprKind};
use crate::interpreter::Interpreter;
use crate::stmt::{FunctionData, Stmt};
use crate::token::Token;

enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

enum ClassType {
    None,
    Class,
    Subclass,
}

/// A static pass between parsing and evaluation. It walks the same tree
/// the interpreter will later walk, but only to assign a scope distance
/// to every variable reference (stored in the interpreter's resolution
/// map, keyed by `ExprId`) and to catch the errors that depend on static
/// structure rather than a value at runtime: `this`/`super`/`break`
/// outside where they're allowed, self-inheriting classes, returning a
/// value from `init`.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    current_class: ClassType,
    loop_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(data) => self.resolve_expr(&data.expr),
            Stmt::Print(data) => self.resolve_expr(&data.expr),
            Stmt::Var(data) => {
                self.declare(&data.name);
                if let Some(initializer) = &data.initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&data.name);
            }
            Stmt::Block(data) => {
                self.begin_scope();
                self.resolve(&data.statements);
                self.end_scope();
            }
            Stmt::If(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(data) => {
                self.resolve_expr(&data.condition);
                self.loop_depth += 1;
                self.resolve_stmt(&data.body);
                self.loop_depth -= 1;
            }
            Stmt::Function(declaration) => {
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }
            Stmt::Return(data) => {
                if let FunctionType::None = self.current_function {
                    ResolveError {
                        token: data.keyword.clone(),
                        message: "Cannot return from top-level code".to_string(),
                    }.throw();
                }

                if let Some(value) = &data.value {
                    if let FunctionType::Initializer = self.current_function {
                        ResolveError {
                            token: data.keyword.clone(),
                            message: "Cannot return a value from an initializer".to_string(),
                        }.throw();
                    } else {
                        self.resolve_expr(value);
                    }
                }
            }
            Stmt::Break(data) => {
                if self.loop_depth == 0 {
                    ResolveError {
                        token: data.keyword.clone(),
                        message: "Cannot break outside of a loop".to_string(),
                    }.throw();
                }
            }
            Stmt::Class(data) => {
                let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

                self.declare(&data.name);
                self.define(&data.name);

                if let Some(superclass) = &data.superclass {
                    if let ExprKind::Variable(variable) = &superclass.kind {
                        if variable.name.lexeme == data.name.lexeme {
                            ResolveError {
                                token: variable.name.clone(),
                                message: "A class cannot inherit from itself".to_string(),
                            }.throw();
                        }
                    }

                    self.current_class = ClassType::Subclass;
                    self.resolve_expr(superclass);

                    self.begin_scope();
                    self.scopes.last_mut().expect("stack to be not empty").insert("super".to_string(), true);
                }

                self.begin_scope();
                self.scopes.last_mut().expect("stack to be not empty").insert("this".to_string(), true);

                for method in &data.methods {
                    let kind = if method.name.lexeme == "init" {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Method
                    };
                    self.resolve_function(method, kind);
                }

                self.end_scope();

                if data.superclass.is_some() {
                    self.end_scope();
                }

                self.current_class = enclosing_class;
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(_) => {}
            ExprKind::Variable(data) => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&data.name.lexeme) == Some(&false) {
                        ResolveError {
                            token: data.name.clone(),
                            message: "Cannot read local variable in its own initializer".to_string(),
                        }.throw();
                    }
                }

                self.resolve_local(expr.id, &data.name);
            }
            ExprKind::Assign(data) => {
                self.resolve_expr(&data.value);
                self.resolve_local(expr.id, &data.name);
            }
            ExprKind::Logical(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            ExprKind::Unary(data) => {
                self.resolve_expr(&data.right);
            }
            ExprKind::Binary(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            ExprKind::Grouping(data) => {
                self.resolve_expr(&data.expr);
            }
            ExprKind::Call(data) => {
                self.resolve_expr(&data.callee);
                for argument in &data.arguments {
                    self.resolve_expr(argument);
                }
            }
            ExprKind::Get(data) => {
                self.resolve_expr(&data.object);
            }
            ExprKind::Set(data) => {
                self.resolve_expr(&data.value);
                self.resolve_expr(&data.object);
            }
            ExprKind::This(data) => {
                if let ClassType::None = self.current_class {
                    ResolveError {
                        token: data.keyword.clone(),
                        message: "Cannot use 'this' outside of a class".to_string(),
                    }.throw();
                    return;
                }

                self.resolve_local(expr.id, &data.keyword);
            }
            ExprKind::Super(data) => {
                match self.current_class {
                    ClassType::Subclass => (),
                    ClassType::None => {
                        ResolveError {
                            token: data.keyword.clone(),
                            message: "Cannot use 'super' outside of a class".to_string(),
                        }.throw();
                        return;
                    }
                    ClassType::Class => {
                        ResolveError {
                            token: data.keyword.clone(),
                            message: "Cannot use 'super' in a class with no superclass".to_string(),
                        }.throw();
                        return;
                    }
                }

                self.resolve_local(expr.id, &data.keyword);
            }
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionData, kind: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, kind);
        let enclosing_loop_depth = mem::replace(&mut self.loop_depth, 0);

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&declaration.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loop_depth;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        let scope = self.scopes.last_mut().expect("stack to be not empty");
        if scope.contains_key(&name.lexeme) {
            ResolveError {
                token: name.clone(),
                message: format!("A variable is already defined with name '{}' in this scope", name.lexeme),
            }.throw();
        }
        scope.insert(name.lexeme.to_owned(), false);
    }

    fn define(&mut self, name: &Token) {
        if self.scopes.is_empty() {
            return;
        }

        self.scopes.last_mut().expect("stack to be not empty").insert(name.lexeme.to_owned(), true);
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (i, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(id, i);
                return;
            }
        }
    }
}
