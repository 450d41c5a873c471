use std::collections::HashMap;
use std::rc::Rc;

use super::function::{builtin, Function, UserFunction};
use super::value::Value;

pub type Scope = HashMap<String, Value>;

/// Variable scopes plus the function table.
///
/// The scope stack always holds the global scope at the bottom. Lookups
/// walk from the innermost scope outwards; assignment only ever writes the
/// innermost one.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<Scope>,
    functions: HashMap<String, HashMap<usize, Rc<UserFunction>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
            functions: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    pub fn set(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            let _ = scope.insert(name, value);
        }
    }

    pub fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pops the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Number of scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Registers a user function and returns the definition it replaced.
    pub fn define(&mut self, name: String, function: UserFunction) -> Option<Rc<UserFunction>> {
        self.functions
            .entry(name)
            .or_default()
            .insert(function.arity(), Rc::new(function))
    }

    /// User definitions take precedence over builtins of the same arity.
    pub fn function(&self, name: &str, arity: usize) -> Option<Function> {
        let user = self.functions
            .get(name)
            .and_then(|by_arity| by_arity.get(&arity));

        match user {
            Some(function) => Some(Function::User(function.clone())),
            None => builtin(name, arity).map(Function::Builtin),
        }
    }
}
