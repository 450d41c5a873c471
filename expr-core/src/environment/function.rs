use std::rc::Rc;

use crate::parser::prelude::Expression;

/// Native implementation of a builtin. Arity is checked before the call.
pub type BuiltinFn = fn(&[f64]) -> f64;

#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    pub params: Vec<String>,
    pub body: Vec<Expression>,
}

impl UserFunction {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Anything a call can resolve to.
#[derive(Debug, Clone)]
pub enum Function {
    Builtin(BuiltinFn),
    User(Rc<UserFunction>),
}

/// Builtins by name and arity. All of them take and return numbers.
pub fn builtin(name: &str, arity: usize) -> Option<BuiltinFn> {
    Some(match (name, arity) {
        ("addTwo", 1) => add_two,
        ("addTwo", 2) => add,
        ("abs", 1) => abs,
        ("sqrt", 1) => sqrt,
        ("min", 2) => min,
        ("max", 2) => max,
        _ => return None
    })
}

fn add_two(args: &[f64]) -> f64 {
    args[0] + 2.0
}

fn add(args: &[f64]) -> f64 {
    args[0] + args[1]
}

fn abs(args: &[f64]) -> f64 {
    args[0].abs()
}

fn sqrt(args: &[f64]) -> f64 {
    args[0].sqrt()
}

fn min(args: &[f64]) -> f64 {
    args[0].min(args[1])
}

fn max(args: &[f64]) -> f64 {
    args[0].max(args[1])
}
