use std::{rc::Rc, sync::{atomic::{AtomicBool, Ordering}, Arc}};

use pretty_assertions::assert_eq;

use crate::{
    environment::prelude::{Value, ValueType, FALSE, TRUE},
    lexer::prelude::{Token, TokenKind},
    parser::prelude::{parse_program, Expression},
    utils::prelude::{SrcSpan, VectorWarningEmitterIO, Warning, WarningEmitter},
};

use super::prelude::{EvalError, EvalResult, Evaluator, Limits};

fn run_with(evaluator: &mut Evaluator, input: &str) -> Vec<EvalResult<Value>> {
    parse_program(input)
        .iter()
        .map(|statement| evaluator.evaluate(statement))
        .collect()
}

fn run(input: &str) -> Vec<EvalResult<Value>> {
    run_with(&mut Evaluator::new(), input)
}

fn last(input: &str) -> EvalResult<Value> {
    match run(input).pop() {
        Some(result) => result,
        None => panic!("no statements in {input:?}"),
    }
}

#[test]
fn test_numbers() {
    assert_eq!(last("3.25"), Ok(Value::Double(3.25)));
    assert_eq!(last("7."), Ok(Value::Double(7.0)));
    assert_eq!(last("1000000"), Ok(Value::Double(1_000_000.0)));
}

#[test]
fn test_assignment() {
    assert_eq!(run("a = 5\na\n"), vec![Ok(Value::Double(5.0)), Ok(Value::Double(5.0))]);
    assert_eq!(last("a = b = 2\na + b"), Ok(Value::Double(4.0)));
}

#[test]
fn test_precedence_and_grouping() {
    assert_eq!(last("2 + 3 * 4"), Ok(Value::Double(14.0)));
    assert_eq!(last("(2 + 3) * 4"), Ok(Value::Double(20.0)));
    assert_eq!(last("10 - 4 - 3"), Ok(Value::Double(3.0)));
    assert_eq!(last("-2 * 3"), Ok(Value::Double(-6.0)));
    assert_eq!(last("1 + 1 == 2 && 3 > 2"), Ok(TRUE));
}

#[test]
fn test_short_circuit() {
    assert_eq!(last("false && (1 / 0)"), Ok(FALSE));
    assert_eq!(last("false && undefined"), Ok(FALSE));
    assert_eq!(last("true || undefined"), Ok(TRUE));
    assert!(matches!(
        last("true && undefined"),
        Err(EvalError::UndefinedVariable { name, .. }) if name == "undefined"
    ));
}

#[test]
fn test_equality() {
    assert_eq!(last("true == true"), Ok(TRUE));
    assert_eq!(last("1 != 2"), Ok(TRUE));
    assert_eq!(last("2 == 2.0"), Ok(TRUE));
    assert!(matches!(
        last("1 == true"),
        Err(EvalError::TypeMismatch { expected: ValueType::Double, found: ValueType::Bool, .. })
    ));
}

#[test]
fn test_type_errors() {
    assert!(matches!(
        last("1 + true"),
        Err(EvalError::TypeMismatch { operator, expected: ValueType::Double, found: ValueType::Bool, .. }) if operator == "+"
    ));
    assert!(matches!(
        last("!1"),
        Err(EvalError::TypeMismatch { expected: ValueType::Bool, found: ValueType::Double, .. })
    ));
    assert!(matches!(
        last("1 && true"),
        Err(EvalError::TypeMismatch { expected: ValueType::Bool, .. })
    ));
    assert!(matches!(
        last("abs(true)"),
        Err(EvalError::TypeMismatch { operator, .. }) if operator == "abs"
    ));
    assert!(matches!(
        last("if 1 2 end"),
        Err(EvalError::NonBooleanCondition { keyword, found: ValueType::Double, .. }) if keyword == "if"
    ));
}

#[test]
fn test_if() {
    assert_eq!(run("if false\n x = 1\nend\nx\n")[0], Ok(FALSE));
    assert!(matches!(
        run("if false\n x = 1\nend\nx\n")[1],
        Err(EvalError::UndefinedVariable { .. })
    ));
    assert_eq!(last("if 1 < 2\n 1\n 2\nend"), Ok(Value::Double(2.0)));
}

#[test]
fn test_while() {
    assert_eq!(last("i = 0\nwhile i < 5\n i = i + 1\nend"), Ok(Value::Double(5.0)));
    assert_eq!(last("while false 1 end"), Ok(FALSE));

    let mut evaluator = Evaluator::new();
    let _ = run_with(&mut evaluator, "i = 0\nwhile i < 3 i = i + 1 end\n");

    assert_eq!(evaluator.environment().get("i"), Some(&Value::Double(3.0)));
}

#[test]
fn test_functions() {
    assert_eq!(
        run("def addOne(x) x + 1 end\naddOne(4)\n"),
        vec![Ok(TRUE), Ok(Value::Double(5.0))]
    );
    assert_eq!(last("def add(a, b)\n a + b\nend\nadd(2, 3)"), Ok(Value::Double(5.0)));
    assert!(matches!(
        last("nope(1)"),
        Err(EvalError::UndefinedFunction { name, arity: 1, .. }) if name == "nope"
    ));
    assert!(matches!(
        last("def f(x) x end\nf(1, 2)"),
        Err(EvalError::UndefinedFunction { arity: 2, .. })
    ));
}

#[test]
fn test_user_definition_preferred_over_builtin() {
    assert_eq!(
        run("addTwo(1)\ndef addTwo(x) x * 10 end\naddTwo(1)\naddTwo(1, 1)\n"),
        vec![Ok(Value::Double(3.0)), Ok(TRUE), Ok(Value::Double(10.0)), Ok(Value::Double(2.0))]
    );
}

#[test]
fn test_recursion() {
    let input = r#"
        def fact(n)
            r = 1
            if n > 1
                r = n * fact(n - 1)
            end
            r
        end
        fact(5)
    "#;

    assert_eq!(last(input), Ok(Value::Double(120.0)));
}

#[test]
fn test_call_depth_limit() {
    let mut evaluator = Evaluator::new().with_limits(Limits { max_call_depth: 8, ..Limits::default() });

    let results = run_with(&mut evaluator, "def down(n) down(n) end\ndown(1)\n");

    assert!(matches!(results[1], Err(EvalError::CallDepthExceeded { limit: 8, .. })));
    assert_eq!(evaluator.environment().depth(), 1);
}

#[test]
fn test_deep_recursion_within_limit() {
    let mut evaluator = Evaluator::new().with_limits(Limits { max_call_depth: 20_000, ..Limits::default() });

    let input = r#"
        def sum(n)
            s = 0
            if n > 0
                s = n + sum(n - 1)
            end
            s
        end
        sum(10000)
    "#;

    let results = run_with(&mut evaluator, input);

    assert_eq!(results[1], Ok(Value::Double(50_005_000.0)));
    assert_eq!(evaluator.environment().depth(), 1);
}

#[test]
fn test_assignment_in_function_stays_local() {
    assert_eq!(
        run("x = 1\ndef setX(v) x = v end\nsetX(5)\nx\n"),
        vec![Ok(Value::Double(1.0)), Ok(TRUE), Ok(Value::Double(5.0)), Ok(Value::Double(1.0))]
    );
}

#[test]
fn test_function_reads_outer_scope() {
    assert_eq!(last("y = 10\ndef readY(z) y + z end\nreadY(1)"), Ok(Value::Double(11.0)));
}

#[test]
fn test_parameters_do_not_leak() {
    let results = run("def f(p) p end\nf(3)\np\n");

    assert_eq!(results[1], Ok(Value::Double(3.0)));
    assert!(matches!(results[2], Err(EvalError::UndefinedVariable { .. })));
}

#[test]
fn test_scope_popped_after_failed_call() {
    let mut evaluator = Evaluator::new();

    let results = run_with(&mut evaluator, "def bad(x) x + true end\nbad(1)\n");

    assert!(results[1].is_err());
    assert_eq!(evaluator.environment().depth(), 1);
}

#[test]
fn test_arguments_evaluated_in_caller_scope() {
    assert_eq!(
        last("x = 2\ndef twice(x) x * 2 end\ntwice(x + 1)"),
        Ok(Value::Double(6.0))
    );
}

#[test]
fn test_interrupt() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut evaluator = Evaluator::new().with_interrupt(flag.clone());

    let results = run_with(&mut evaluator, "while true 1 end\n2\n");

    assert_eq!(results, vec![Err(EvalError::Interrupted), Ok(Value::Double(2.0))]);
    assert!(!flag.load(Ordering::SeqCst));
}

#[test]
fn test_warnings() {
    let warnings = VectorWarningEmitterIO::new();
    let emitter = WarningEmitter::new(Rc::new(warnings.clone()));

    let mut evaluator = Evaluator::new().with_warnings(emitter.clone());

    let _ = run_with(&mut evaluator, "def f(x) x end\ndef f(x) x + 1 end\ndef abs(x) x end\ndef g(x) x end\n");

    let names: Vec<(String, bool)> = warnings.take()
        .into_iter()
        .map(|warning| match warning {
            Warning::FunctionRedefined { name, .. } => (name, true),
            Warning::BuiltinShadowed { name, .. } => (name, false),
        })
        .collect();

    assert_eq!(names, vec![("f".to_string(), true), ("abs".to_string(), false)]);
    assert_eq!(emitter.count(), 2);
}

#[test]
fn test_invalid_statement_surfaces_error() {
    let results = run("1 +\n2\n");

    assert!(matches!(&results[0], Err(EvalError::Invalid(error)) if !error.to_string().is_empty()));
    assert_eq!(results[1], Ok(Value::Double(2.0)));
}

#[test]
fn test_exit_is_not_a_value() {
    assert!(matches!(last("exit"), Err(EvalError::InvalidLeaf { text, .. }) if text == "exit"));
}

#[test]
fn test_fatal_errors() {
    let span = SrcSpan::default();
    let mut evaluator = Evaluator::new();

    let malformed = Expression::Leaf(Token::new(TokenKind::Number, "1.2.3", span));
    let error = evaluator.evaluate(&malformed).unwrap_err();

    assert!(matches!(error, EvalError::MalformedNumber { .. }));
    assert!(error.is_fatal());

    let unknown = Expression::Binary {
        operator: Token::new(TokenKind::Operator, "--", span),
        left: Box::new(Expression::Leaf(Token::new(TokenKind::Number, "1", span))),
        right: Box::new(Expression::Leaf(Token::new(TokenKind::Number, "2", span))),
    };
    let error = evaluator.evaluate(&unknown).unwrap_err();

    assert!(matches!(error, EvalError::UnknownOperator { .. }));
    assert!(error.is_fatal());

    assert!(!EvalError::Interrupted.is_fatal());
}

#[test]
fn test_assignment_to_non_identifier() {
    let span = SrcSpan::default();
    let mut evaluator = Evaluator::new();

    let assign = Expression::Binary {
        operator: Token::new(TokenKind::Operator, "=", span),
        left: Box::new(Expression::Leaf(Token::new(TokenKind::Number, "1", span))),
        right: Box::new(Expression::Leaf(Token::new(TokenKind::Number, "2", span))),
    };

    assert!(matches!(evaluator.evaluate(&assign), Err(EvalError::NotAnLValue { .. })));
    assert!(matches!(last("1 = 2"), Err(EvalError::Invalid(_))));
}
