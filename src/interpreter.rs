use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::{Expr, ExprId, ExprKind};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::Stmt;
use crate::token::{Token, Type};

/// How a statement (or a whole block of them) finished. `Normal` means
/// execution fell off the end; `Break`/`Return` are non-local exits that
/// unwind through enclosing blocks, `if`s and loops without going
/// through the error channel — a `break` or `return` is not a failure,
/// so it is never a `RuntimeError`.
#[derive(Debug)]
pub enum ControlFlow {
    Normal,
    Break,
    Return(Object),
}

/// Walks the AST and evaluates it directly, keeping one environment
/// chain alive at a time (`environment`) plus a fixed table of global
/// natives (`globals`). `locals` is the resolver's output: for every
/// expression id that refers to a local variable, how many environment
/// links up the chain it lives.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    output: Rc<RefCell<dyn Write>>,
}

impl Interpreter {
    pub fn new(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Records that the expression with this id resolved to a variable
    /// `depth` environment links up from wherever it is evaluated.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(_) => continue,
                Err(error) => {
                    use crate::error::Error;
                    error.throw();
                    return;
                }
            }
        }
    }

    /// Runs `statements` in `environment`, always restoring the
    /// interpreter's previous environment before returning — including
    /// when a statement errors or unwinds via `break`/`return` — since
    /// `self.environment` must never stay pointed at a scope whose
    /// block has already exited.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<ControlFlow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(ControlFlow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(ControlFlow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::Expression(data) => {
                self.evaluate(&data.expr)?;
                Ok(ControlFlow::Normal)
            }
            Stmt::Print(data) => {
                let value = self.evaluate(&data.expr)?;
                let _ = writeln!(self.output.borrow_mut(), "{value}");
                Ok(ControlFlow::Normal)
            }
            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::from(Literal::Nil),
                };
                self.environment.borrow_mut().define(&data.name.lexeme, value);
                Ok(ControlFlow::Normal)
            }
            Stmt::Block(data) => {
                let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                self.execute_block(&data.statements, environment)
            }
            Stmt::If(data) => {
                if Self::is_truthy(&self.evaluate(&data.condition)?) {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }
            Stmt::While(data) => {
                while Self::is_truthy(&self.evaluate(&data.condition)?) {
                    match self.execute(&data.body)? {
                        ControlFlow::Normal => continue,
                        ControlFlow::Break => break,
                        flow @ ControlFlow::Return(_) => return Ok(flow),
                    }
                }
                Ok(ControlFlow::Normal)
            }
            Stmt::Function(declaration) => {
                let function = Function::new(Rc::clone(declaration), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(&declaration.name.lexeme, Object::from(function));
                Ok(ControlFlow::Normal)
            }
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::from(Literal::Nil),
                };
                Ok(ControlFlow::Return(value))
            }
            Stmt::Break(_) => Ok(ControlFlow::Break),
            Stmt::Class(data) => self.execute_class(data),
        }
    }

    fn execute_class(&mut self, data: &crate::stmt::ClassData) -> Result<ControlFlow, RuntimeError> {
        let superclass = match &data.superclass {
            Some(expr) => match self.evaluate(expr)? {
                Object::Class(class) => Some(class),
                _ => {
                    let token = match &expr.kind {
                        ExprKind::Variable(variable) => variable.name.clone(),
                        _ => data.name.clone(),
                    };
                    return Err(RuntimeError { token, message: "Superclass must be a class".to_string() });
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        let method_environment = match &superclass {
            Some(superclass) => {
                let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
                environment.borrow_mut().define("super", Object::from(Rc::clone(superclass)));
                environment
            }
            None => Rc::clone(&self.environment),
        };

        let methods = data.methods.iter().map(|method| {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(Rc::clone(method), Rc::clone(&method_environment), is_initializer);
            (method.name.lexeme.clone(), function)
        }).collect();

        let class = crate::class::Class::new(data.name.lexeme.clone(), superclass, methods);
        self.environment.borrow_mut().assign(&data.name, Object::from(Rc::new(RefCell::new(class))))?;

        Ok(ControlFlow::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(Object::from(literal.clone())),
            ExprKind::Grouping(data) => self.evaluate(&data.expr),
            ExprKind::Unary(data) => {
                let right = self.evaluate(&data.right)?;
                match data.operator.r#type {
                    Type::Minus => (-right).ok_or_else(|| RuntimeError {
                        token: data.operator.clone(),
                        message: "Operand must be a number".to_string(),
                    }),
                    Type::Bang => Ok(Object::from(!Self::is_truthy(&right))),
                    _ => unreachable!("scanner/parser only produce ! and - as unary operators"),
                }
            }
            ExprKind::Binary(data) => self.evaluate_binary(data),
            ExprKind::Logical(data) => {
                let left = self.evaluate(&data.left)?;
                match data.operator.r#type {
                    Type::Or if Self::is_truthy(&left) => Ok(left),
                    Type::And if !Self::is_truthy(&left) => Ok(left),
                    Type::Or | Type::And => self.evaluate(&data.right),
                    _ => unreachable!("scanner/parser only produce and/or as logical operators"),
                }
            }
            ExprKind::Variable(data) => self.lookup_variable(&data.name, expr.id),
            ExprKind::Assign(data) => {
                let value = self.evaluate(&data.value)?;
                match self.locals.get(&expr.id) {
                    Some(&distance) => self.environment.borrow_mut().assign_at(distance, &data.name, value.clone()),
                    None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
                }
                Ok(value)
            }
            ExprKind::Call(data) => self.evaluate_call(data),
            ExprKind::Get(data) => {
                let object = self.evaluate(&data.object)?;
                match &object {
                    Object::Instance(instance) => instance.borrow().get(&data.name, &object),
                    _ => Err(RuntimeError { token: data.name.clone(), message: "Only instances have properties".to_string() }),
                }
            }
            ExprKind::Set(data) => {
                let object = self.evaluate(&data.object)?;
                match object {
                    Object::Instance(instance) => {
                        let value = self.evaluate(&data.value)?;
                        instance.borrow_mut().set(&data.name, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError { token: data.name.clone(), message: "Only instances have fields".to_string() }),
                }
            }
            ExprKind::This(data) => self.lookup_variable(&data.keyword, expr.id),
            ExprKind::Super(data) => self.evaluate_super(expr.id, data),
        }
    }

    fn evaluate_binary(&mut self, data: &crate::expr::BinaryData) -> Result<Object, RuntimeError> {
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let operator = &data.operator;

        match operator.r#type {
            Type::Plus => (left + right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be two numbers or two strings".to_string(),
            }),
            Type::Minus => (left - right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            }),
            Type::Star => (left * right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            }),
            Type::Slash => (left / right).ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            }),
            Type::Greater => Self::compare(left, right, operator, |o| o == Ordering::Greater),
            Type::GreaterEqual => Self::compare(left, right, operator, |o| o != Ordering::Less),
            Type::Less => Self::compare(left, right, operator, |o| o == Ordering::Less),
            Type::LessEqual => Self::compare(left, right, operator, |o| o != Ordering::Greater),
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!("scanner/parser only produce these operators in a binary expression"),
        }
    }

    fn compare(left: Object, right: Object, operator: &Token, wanted: impl Fn(Ordering) -> bool) -> Result<Object, RuntimeError> {
        left.partial_cmp(&right)
            .map(|ordering| Object::from(wanted(ordering)))
            .ok_or_else(|| RuntimeError {
                token: operator.clone(),
                message: "Operands must be numbers".to_string(),
            })
    }

    fn evaluate_call(&mut self, data: &crate::expr::CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => return Err(RuntimeError { token: data.paren.clone(), message: "Can only call functions and classes".to_string() }),
        };

        if arguments.len() != arity {
            return Err(RuntimeError {
                token: data.paren.clone(),
                message: format!("Expected {arity} arguments but got {}", arguments.len()),
            });
        }

        match callee {
            Object::Function(function) => function.call(self, arguments),
            Object::NativeFunction(function) => function.call(self, arguments),
            Object::Class(class) => {
                let result = class.borrow().call(self, arguments);
                result
            }
            _ => unreachable!("already checked above"),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, data: &crate::expr::SuperData) -> Result<Object, RuntimeError> {
        let distance = *self.locals.get(&id).expect("resolver always binds 'super'");

        let superclass = match self.environment.borrow().get_at(distance, &Token::from("super"))? {
            Object::Class(class) => class,
            _ => unreachable!("'super' always resolves to a class"),
        };

        // The resolver opens the "this" scope one level closer than "super",
        // so it always sits at `distance - 1` from wherever `super` is used.
        let object = self.environment.borrow().get_at(distance - 1, &Token::from("this"))?;

        let method = superclass.borrow().get_method(&data.method.lexeme).ok_or_else(|| RuntimeError {
            token: data.method.clone(),
            message: format!("Undefined property '{}'", data.method.lexeme),
        })?;

        Ok(Object::from(method.bind(object)))
    }

    fn lookup_variable(&self, name: &Token, id: ExprId) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn is_truthy(value: &Object) -> bool {
        match value {
            Object::Literal(literal) => literal.as_bool(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    fn run(source: &str) -> String {
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut interpreter = Interpreter::new(Rc::clone(&output) as Rc<RefCell<dyn Write>>);

        let tokens = Scanner::new(source).scan_tokens();
        let statements = Parser::new(tokens).parse();
        Resolver::new(&mut interpreter).resolve(&statements);
        interpreter.interpret(&statements);

        let bytes = output.borrow();
        String::from_utf8(bytes.clone()).unwrap()
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(run("print 2 + 3 * 4;"), "14\n");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(run(r#"print "foo" + "bar";"#), "foobar\n");
    }

    #[test]
    fn whole_number_stringifies_without_decimal() {
        assert_eq!(run("print 6 / 2;"), "3\n");
    }

    #[test]
    fn block_scoping_shadows_outer() {
        assert_eq!(run("var a = 1; { var a = 2; print a; } print a;"), "2\n1\n");
    }

    #[test]
    fn closures_capture_by_reference() {
        let source = r#"
            fun counter() {
                var i = 0;
                fun increment() {
                    i = i + 1;
                    print i;
                }
                return increment;
            }
            var c = counter();
            c();
            c();
        "#;
        assert_eq!(run(source), "1\n2\n");
    }

    #[test]
    fn while_break_stops_the_loop() {
        let source = r#"
            var i = 0;
            while (true) {
                if (i >= 3) break;
                print i;
                i = i + 1;
            }
        "#;
        assert_eq!(run(source), "0\n1\n2\n");
    }

    #[test]
    fn classes_and_inheritance() {
        let source = r#"
            class Animal {
                init(name) {
                    this.name = name;
                }
                speak() {
                    print this.name + " makes a sound";
                }
            }
            class Dog < Animal {
                speak() {
                    super.speak();
                    print this.name + " barks";
                }
            }
            var d = Dog("Rex");
            d.speak();
        "#;
        assert_eq!(run(source), "Rex makes a sound\nRex barks\n");
    }

    #[test]
    fn comparing_different_types_is_not_equal() {
        assert_eq!(run(r#"print 1 == "1";"#), "false\n");
    }

    #[test]
    fn dividing_mismatched_types_is_a_runtime_error() {
        assert_eq!(run(r#"print "a" - 1;"#), "");
    }
}
