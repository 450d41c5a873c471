#[cfg(test)]
mod tests;

pub mod error;
pub mod operator;

pub mod prelude {
    pub use super::{
        error::*,
        operator::*,
        Evaluator,
        Limits,
        DEFAULT_MAX_CALL_DEPTH,
    };
}

use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

use tracing::{debug, debug_span};

use crate::{
    environment::prelude::{builtin, Environment, Function, Scope, UserFunction, Value, ValueType, FALSE, TRUE},
    lexer::prelude::{Token, TokenKind},
    parser::prelude::{Expression, DEFAULT_MAX_NESTING_DEPTH},
    utils::prelude::{ensure_sufficient_stack, Warning, WarningEmitter},
};
use self::error::{EvalError, EvalResult};
use self::operator::{binary_action, unary_action, BinaryAction, UnaryAction};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Nested user function calls allowed before a call fails.
    pub max_call_depth: usize,
    /// Nesting allowed within one statement before it fails to parse.
    pub max_nesting_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Tree-walking evaluator. Variables and functions persist across
/// statements for as long as the evaluator lives.
#[derive(Debug, Default)]
pub struct Evaluator {
    env: Environment,
    limits: Limits,
    warnings: WarningEmitter,
    interrupt: Option<Arc<AtomicBool>>,
    call_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_warnings(mut self, warnings: WarningEmitter) -> Self {
        self.warnings = warnings;
        self
    }

    /// Flag polled on every loop iteration and function call. Setting it
    /// aborts the running statement once; the flag is cleared on the way.
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn evaluate(&mut self, expression: &Expression) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression(expression))
    }

    fn eval_expression(&mut self, expression: &Expression) -> EvalResult<Value> {
        match expression {
            Expression::Leaf(token) => self.eval_leaf(token),
            Expression::Unary { operator, operand } => self.eval_unary(operator, operand),
            Expression::Binary { operator, left, right } => self.eval_binary(operator, left, right),
            Expression::Block { keyword, condition, body } => match keyword.text.as_str() {
                "if" => self.eval_if(keyword, condition, body),
                "while" => self.eval_while(keyword, condition, body),
                _ => Err(EvalError::UnknownOperator {
                    operator: keyword.text.clone(),
                    span: keyword.span,
                }),
            },
            Expression::FuncDef { name, params, body } => Ok(self.define(name, params, body)),
            Expression::FuncCall { name, arguments } => self.call(name, arguments),
            Expression::Invalid(error) => Err(EvalError::Invalid(error.clone())),
        }
    }

    fn eval_leaf(&mut self, token: &Token) -> EvalResult<Value> {
        match token.kind {
            TokenKind::Number => token.text
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| EvalError::MalformedNumber {
                    text: token.text.clone(),
                    span: token.span,
                }),
            TokenKind::Identifier => self.env
                .get(&token.text)
                .copied()
                .ok_or_else(|| EvalError::UndefinedVariable {
                    name: token.text.clone(),
                    span: token.span,
                }),
            TokenKind::Keyword if token.text == "true" => Ok(TRUE),
            TokenKind::Keyword if token.text == "false" => Ok(FALSE),
            _ => Err(EvalError::InvalidLeaf {
                text: token.text.clone(),
                span: token.span,
            }),
        }
    }

    fn eval_unary(&mut self, operator: &Token, operand: &Expression) -> EvalResult<Value> {
        let Some(action) = unary_action(&operator.text) else {
            return Err(EvalError::UnknownOperator {
                operator: operator.text.clone(),
                span: operator.span,
            });
        };

        match (action, self.evaluate(operand)?) {
            (UnaryAction::Negate, Value::Double(value)) => Ok(Value::Double(-value)),
            (UnaryAction::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
            (UnaryAction::Negate, value) => Err(mismatch(operator, ValueType::Double, value, operand)),
            (UnaryAction::Not, value) => Err(mismatch(operator, ValueType::Bool, value, operand)),
        }
    }

    fn eval_binary(&mut self, operator: &Token, left: &Expression, right: &Expression) -> EvalResult<Value> {
        let Some(action) = binary_action(&operator.text) else {
            return Err(EvalError::UnknownOperator {
                operator: operator.text.clone(),
                span: operator.span,
            });
        };

        match action {
            BinaryAction::Assign => {
                let Some(name) = left.as_identifier() else {
                    return Err(EvalError::NotAnLValue { span: left.span() });
                };

                let value = self.evaluate(right)?;
                self.env.set(name.text.clone(), value);

                Ok(value)
            },
            BinaryAction::Logic { decided_by } => {
                let left = self.expect_bool(operator, left)?;

                if left == decided_by {
                    return Ok(Value::Bool(left));
                }

                Ok(Value::Bool(self.expect_bool(operator, right)?))
            },
            BinaryAction::Arithmetic(apply) => {
                let left = self.expect_double(operator, left)?;
                let right = self.expect_double(operator, right)?;

                Ok(Value::Double(apply(left, right)))
            },
            BinaryAction::Comparison(apply) => {
                let left = self.expect_double(operator, left)?;
                let right = self.expect_double(operator, right)?;

                Ok(Value::Bool(apply(left, right)))
            },
            BinaryAction::Equality { negate } => {
                let left_value = self.evaluate(left)?;
                let right_value = self.evaluate(right)?;

                if left_value._type() != right_value._type() {
                    return Err(mismatch(operator, left_value._type(), right_value, right));
                }

                Ok(Value::Bool((left_value == right_value) != negate))
            },
        }
    }

    fn expect_double(&mut self, operator: &Token, expression: &Expression) -> EvalResult<f64> {
        let value = self.evaluate(expression)?;

        value.as_double()
            .ok_or_else(|| mismatch(operator, ValueType::Double, value, expression))
    }

    fn expect_bool(&mut self, operator: &Token, expression: &Expression) -> EvalResult<bool> {
        let value = self.evaluate(expression)?;

        value.as_bool()
            .ok_or_else(|| mismatch(operator, ValueType::Bool, value, expression))
    }

    fn condition(&mut self, keyword: &Token, condition: &Expression) -> EvalResult<bool> {
        match self.evaluate(condition)? {
            Value::Bool(test) => Ok(test),
            value => Err(EvalError::NonBooleanCondition {
                keyword: keyword.text.clone(),
                found: value._type(),
                span: condition.span(),
            }),
        }
    }

    /// Value of the last statement, `None` for an empty body.
    fn eval_body(&mut self, body: &[Expression]) -> EvalResult<Option<Value>> {
        let mut last = None;

        for statement in body {
            last = Some(self.evaluate(statement)?);
        }

        Ok(last)
    }

    fn eval_if(&mut self, keyword: &Token, condition: &Expression, body: &[Expression]) -> EvalResult<Value> {
        if !self.condition(keyword, condition)? {
            return Ok(FALSE);
        }

        Ok(self.eval_body(body)?.unwrap_or(TRUE))
    }

    fn eval_while(&mut self, keyword: &Token, condition: &Expression, body: &[Expression]) -> EvalResult<Value> {
        let mut last = None;

        loop {
            self.check_interrupt()?;

            if !self.condition(keyword, condition)? {
                return Ok(last.unwrap_or(FALSE));
            }

            if let Some(value) = self.eval_body(body)? {
                last = Some(value);
            }
        }
    }

    fn define(&mut self, name: &Token, params: &[Token], body: &[Expression]) -> Value {
        let function = UserFunction {
            params: params.iter().map(|param| param.text.clone()).collect(),
            body: body.to_vec(),
        };

        let arity = function.arity();
        let shadows_builtin = builtin(&name.text, arity).is_some();

        debug!(name = %name.text, arity, "defining function");

        if self.env.define(name.text.clone(), function).is_some() {
            self.warnings.emit(Warning::FunctionRedefined {
                name: name.text.clone(),
                arity,
                location: name.span,
            });
        } else if shadows_builtin {
            self.warnings.emit(Warning::BuiltinShadowed {
                name: name.text.clone(),
                arity,
                location: name.span,
            });
        }

        TRUE
    }

    fn call(&mut self, name: &Token, arguments: &[Expression]) -> EvalResult<Value> {
        let Some(function) = self.env.function(&name.text, arguments.len()) else {
            return Err(EvalError::UndefinedFunction {
                name: name.text.clone(),
                arity: arguments.len(),
                span: name.span,
            });
        };

        let values = arguments.iter()
            .map(|argument| self.evaluate(argument))
            .collect::<EvalResult<Vec<Value>>>()?;

        match function {
            Function::Builtin(apply) => {
                let numbers = values.iter()
                    .zip(arguments)
                    .map(|(value, argument)| value.as_double()
                        .ok_or_else(|| mismatch(name, ValueType::Double, *value, argument)))
                    .collect::<EvalResult<Vec<f64>>>()?;

                Ok(Value::Double(apply(&numbers)))
            },
            Function::User(function) => self.call_user(name, &function, values),
        }
    }

    fn call_user(&mut self, name: &Token, function: &UserFunction, values: Vec<Value>) -> EvalResult<Value> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(EvalError::CallDepthExceeded {
                limit: self.limits.max_call_depth,
                span: name.span,
            });
        }

        self.check_interrupt()?;

        let span = debug_span!("call", name = %name.text, depth = self.call_depth);
        let _entered = span.enter();

        let scope: Scope = function.params.iter().cloned().zip(values).collect();

        self.env.push_scope(scope);
        self.call_depth += 1;

        // The scope is popped whether or not the body succeeded.
        let result = self.eval_body(&function.body);

        self.call_depth -= 1;
        let _ = self.env.pop_scope();

        debug!(ok = result.is_ok(), "returned");

        Ok(result?.unwrap_or(TRUE))
    }

    fn check_interrupt(&self) -> EvalResult<()> {
        match &self.interrupt {
            Some(flag) if flag.swap(false, Ordering::SeqCst) => Err(EvalError::Interrupted),
            _ => Ok(()),
        }
    }
}

fn mismatch(operator: &Token, expected: ValueType, found: Value, operand: &Expression) -> EvalError {
    EvalError::TypeMismatch {
        operator: operator.text.clone(),
        expected,
        found: found._type(),
        span: operand.span(),
    }
}
