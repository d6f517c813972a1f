use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error as ThisError;

use crate::token::{Token, Type, Location};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Checks if a static (scan/parse/resolve) or runtime error occurred.
pub fn did_error() -> bool {
    HAD_ERROR.load(Ordering::SeqCst) || HAD_RUNTIME_ERROR.load(Ordering::SeqCst)
}

/// Checks if an error occurred during interpretation specifically.
pub fn did_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::SeqCst)
}

/// Clears both error flags. Used between REPL lines so one bad line
/// doesn't poison the rest of the session.
pub fn reset_error() {
    HAD_ERROR.store(false, Ordering::SeqCst);
    HAD_RUNTIME_ERROR.store(false, Ordering::SeqCst);
}

/// Every reportable error type implements this: print the diagnostic and
/// latch the appropriate had-error flag so the driver can pick an exit code.
pub trait Error: std::error::Error {
    fn throw(&self);
}

/// A lexical error: unterminated string/number, unexpected character.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Error for ScanError {
    fn throw(&self) {
        eprintln!("[line {location}] Error: {message}", location = self.location, message = self.message);
        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// A syntax error raised while building the AST.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Error for ParseError {
    fn throw(&self) {
        if self.token.r#type == Type::EOF {
            eprintln!(
                "[line {location}] Error at end: {message}",
                location = self.token.location,
                message = self.message
            );
        } else {
            eprintln!(
                "[line {location}] Error at '{lexeme}': {message}",
                location = self.token.location,
                lexeme = self.token.lexeme,
                message = self.message
            );
        }

        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// A static scoping error caught by the resolver (shadowing, bad `this`/
/// `super`, returning a value from an initializer, self-inheriting class).
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Error for ResolveError {
    fn throw(&self) {
        eprintln!(
            "[line {location}] Error at '{lexeme}': {message}",
            location = self.token.location,
            lexeme = self.token.lexeme,
            message = self.message
        );

        HAD_ERROR.store(true, Ordering::SeqCst);
    }
}

/// A dynamic-typing or semantic error raised while executing the AST.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Error for RuntimeError {
    fn throw(&self) {
        eprintln!(
            "[line {location}] Error at '{lexeme}': {message}",
            location = self.token.location,
            lexeme = self.token.lexeme,
            message = self.message
        );

        HAD_RUNTIME_ERROR.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_reset_independently_of_each_other() {
        reset_error();
        assert!(!did_error());
        HAD_ERROR.store(true, Ordering::SeqCst);
        assert!(did_error());
        assert!(!did_runtime_error());
        reset_error();
        assert!(!did_error());
    }
}
