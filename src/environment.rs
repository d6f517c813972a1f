use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// A single lexical scope: a name-to-value map plus a link to the scope
/// it is nested in. Environments are shared (`Rc<RefCell<_>>`) because a
/// closure and the block it was declared in both need to keep the same
/// scope alive — the environment graph is a DAG, not a tree, and ordinary
/// reference counting reclaims it (see `interpreter.rs` module docs).
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    pub variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    /// Walks `distance` enclosing links up from `self` and returns that
    /// ancestor. `distance` comes from the resolver, so it is always
    /// within bounds for a successfully resolved program.
    fn ancestor(&self, distance: usize) -> Rc<RefCell<Environment>> {
        let mut environment = self.enclosing.clone()
            .unwrap_or_else(|| panic!("enclosing environment to exist at depth 1"));

        for i in 1..distance {
            let parent = environment.borrow().enclosing.clone()
                .unwrap_or_else(|| panic!("enclosing environment to exist at depth {}", i + 1));
            environment = parent;
        }

        environment
    }

    /// Assigns to the nearest enclosing scope that already defines
    /// `name`. Returns as soon as the innermost matching scope is found;
    /// only errors if no scope in the chain (up to and including
    /// `globals`) defines the name.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Object) {
        if distance > 0 {
            self.ancestor(distance).borrow_mut().variables.insert(name.lexeme.clone(), value);
        } else {
            self.variables.insert(name.lexeme.clone(), value);
        }
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(variable) = self.variables.get(&name.lexeme) {
            return Ok(variable.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }

    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        let scope = if distance > 0 {
            self.ancestor(distance)
        } else {
            return self.variables.get(&name.lexeme).cloned().ok_or_else(|| RuntimeError {
                token: name.clone(),
                message: format!("Undefined variable '{}'", name.lexeme),
            });
        };

        scope.borrow().variables.get(&name.lexeme).cloned().ok_or_else(|| RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'", name.lexeme),
        })
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::{Location, Type};

    fn name(lexeme: &str) -> Token {
        Token::new(Type::Identifier, lexeme.to_string(), None, Location::new(0, 0))
    }

    #[test]
    fn get_reads_from_enclosing_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(1.0));

        let inner = Environment::new(Some(Rc::clone(&globals)));
        assert_eq!(inner.get(&name("a")).unwrap(), Object::from(1.0));
    }

    #[test]
    fn assign_updates_innermost_matching_scope_only() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(1.0));

        let mut inner = Environment::new(Some(Rc::clone(&globals)));
        inner.define("a", Object::from(2.0));
        inner.assign(&name("a"), Object::from(3.0)).unwrap();

        assert_eq!(inner.get(&name("a")).unwrap(), Object::from(3.0));
        assert_eq!(globals.borrow().get(&name("a")).unwrap(), Object::from(1.0));
    }

    #[test]
    fn assign_falls_through_to_enclosing_scope() {
        let globals = Rc::new(RefCell::new(Environment::default()));
        globals.borrow_mut().define("a", Object::from(1.0));

        let mut inner = Environment::new(Some(Rc::clone(&globals)));
        inner.assign(&name("a"), Object::from(9.0)).unwrap();

        assert_eq!(globals.borrow().get(&name("a")).unwrap(), Object::from(9.0));
    }

    #[test]
    fn assign_to_undefined_variable_errors() {
        let mut env = Environment::default();
        assert!(env.assign(&name("ghost"), Object::from(1.0)).is_err());
    }
}
