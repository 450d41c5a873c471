use std::{cell::Cell, rc::Rc};

use pretty_assertions::assert_eq;

use crate::{
    lexer::prelude::{Lexer, Token},
    parser::prelude::{parse_program, statements, Expression, ParseErrorType, ParseResult, Parser, Statements, DEFAULT_MAX_NESTING_DEPTH},
};

fn dump(input: &str) -> Vec<String> {
    parse_program(input)
        .iter()
        .map(|statement| statement.to_string())
        .collect()
}

fn first_error(input: &str) -> ParseErrorType {
    match parse_program(input).into_iter().next() {
        Some(Expression::Invalid(error)) => error.error,
        other => panic!("expected an invalid statement for {input:?}, got {other:?}"),
    }
}

#[test]
fn test_precedence() {
    assert_eq!(
        dump("2 + 3 * 4\n(2 + 3) * 4\n1 - 2 - 3\na || b && c == d < e\n"),
        vec![
            "(+ 2 (* 3 4))",
            "(* (+ 2 3) 4)",
            "(- (- 1 2) 3)",
            "(|| a (&& b (== c (< d e))))",
        ]
    );
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(dump("a = b = 3 + 1\n"), vec!["(= a (= b (+ 3 1)))"]);
}

#[test]
fn test_prefix() {
    assert_eq!(
        dump("-f(2) * 3\n!a && b\n- -x\n"),
        vec![
            "(* (- (call f 2)) 3)",
            "(&& (! a) b)",
            "(- (- x))",
        ]
    );
}

#[test]
fn test_blocks() {
    let input = r#"
        if x < 3
            y = 1
        end
        while i < 3 i = i + 1 end
        def addOne(x) x + 1 end
        def add(a, b)
            a + b
        end
        add(1, 2 * 3)
    "#;

    assert_eq!(
        dump(input),
        vec![
            "(if (< x 3) ((= y 1)))",
            "(while (< i 3) ((= i (+ i 1))))",
            "(def addOne (x) ((+ x 1)))",
            "(def add (a b) ((+ a b)))",
            "(call add 1 (* 2 3))",
        ]
    );
}

#[test]
fn test_nested_blocks() {
    let input = "while i < 3\nif i == 1\nx = i\nend\ni = i + 1\nend\n";

    assert_eq!(
        dump(input),
        vec!["(while (< i 3) ((if (== i 1) ((= x i))) (= i (+ i 1))))"]
    );
}

#[test]
fn test_last_statement_without_newline() {
    assert_eq!(dump("\n\n1 + 2"), vec!["(+ 1 2)"]);
}

#[test]
fn test_exit() {
    let parsed = parse_program("exit\nexit + 1\n");

    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].is_exit());
    assert!(!parsed[1].is_exit());
}

#[test]
fn test_errors() {
    let cases = vec![
        ("1 = 2\n", ParseErrorType::NotAnLValue),
        ("3(1)\n", ParseErrorType::CallTargetNotIdentifier),
        ("f()\n", ParseErrorType::ArgumentCount { count: 0 }),
        ("f(1, 2, 3)\n", ParseErrorType::ArgumentCount { count: 3 }),
        ("f(1 2)\n", ParseErrorType::ExpectedSeparator { found: "the number `2`".into() }),
        ("(1 + 2\n", ParseErrorType::ExpectedClosingParen { found: "end of line".into() }),
        ("a--b\n", ParseErrorType::UnknownInfixOperator { operator: "--".into() }),
        ("#\n", ParseErrorType::UnexpectedCharacter { ch: "#".into() }),
        ("1 + 2 #\n", ParseErrorType::UnexpectedCharacter { ch: "#".into() }),
        (")\n", ParseErrorType::UnknownPrefixOperator { found: "`)`".into() }),
        ("1 2\n", ParseErrorType::ExpectedNewline { found: "the number `2`".into() }),
        ("1 +", ParseErrorType::UnexpectedEof),
        ("1 +\n", ParseErrorType::UnknownPrefixOperator { found: "end of line".into() }),
        ("1 + end\n", ParseErrorType::UnknownPrefixOperator { found: "the keyword `end`".into() }),
        ("if x\n1\n", ParseErrorType::ExpectedEnd { keyword: "if".into() }),
        ("def f(x) end\n", ParseErrorType::EmptyFunctionBody { name: "f".into() }),
        ("def f(1) 1 end\n", ParseErrorType::ParameterNotIdentifier { found: "`1`".into() }),
        ("def (x) 1 end\n", ParseErrorType::ExpectedFunctionName { found: "`(`".into() }),
        ("def f x 1 end\n", ParseErrorType::ExpectedParameterList { found: "the identifier `x`".into() }),
    ];

    for (input, expected) in cases {
        assert_eq!(first_error(input), expected, "input: {input:?}");
    }
}

#[test]
fn test_error_position() {
    match parse_program("\n\n  1 +\n").first() {
        Some(Expression::Invalid(error)) => {
            assert_eq!((error.span.line, error.span.column), (3, 6));
            assert_eq!(error.to_string(), "unknown prefix operator: end of line at line 3, column 6");
        },
        other => panic!("expected an invalid statement, got {other:?}"),
    }
}

#[test]
fn test_recovery_isolates_line() {
    let parsed = dump("1 + \n2 * 3\n");

    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].starts_with("(invalid "));
    assert_eq!(parsed[1], "(* 2 3)");
}

#[test]
fn test_recovery_inside_block() {
    let parsed = parse_program("while x\n 1 +\n 2\nend\n3\n");

    assert_eq!(parsed.len(), 2);
    assert!(matches!(
        &parsed[0],
        Expression::Invalid(error) if error.error == ParseErrorType::UnknownPrefixOperator { found: "end of line".into() }
    ));
    assert_eq!(parsed[1].to_string(), "3");

    let parsed = dump("if x 1 + end\n2\n");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1], "2");
}

#[test]
fn test_recovery_after_block_header() {
    let parsed = dump("if 1 +\n 2\nend\n3\n");

    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].starts_with("(invalid "));
    assert_eq!(parsed[1], "3");
}

#[test]
fn test_nesting_too_deep() {
    let input = "- ".repeat(10_000) + "1\n2 + 3\n";
    let parsed = parse_program(&input);

    assert_eq!(parsed.len(), 2);
    assert!(matches!(
        &parsed[0],
        Expression::Invalid(error) if error.error == ParseErrorType::NestingTooDeep { limit: DEFAULT_MAX_NESTING_DEPTH }
    ));
    assert_eq!(parsed[1].to_string(), "(+ 2 3)");
}

#[test]
fn test_nesting_limit_counts_groups_and_blocks() {
    let parse = |input: &str| {
        let parser = Parser::new(Lexer::new(input.chars())).with_max_depth(3);
        Statements::new(parser).map(|statement| statement.to_string()).collect::<Vec<String>>()
    };

    assert_eq!(parse("((1))
"), vec!["1"]);
    assert!(parse("(((1)))
")[0].starts_with("(invalid expression nested deeper than 3 levels"));
    assert_eq!(parse("if a
if b
1
end
end
"), vec!["(if a ((if b (1))))"]);
    assert!(parse("if a
if b
if c 1 end
end
end
")[0].starts_with("(invalid "));

    // The counter unwinds after a failure.
    assert_eq!(parse("((((1))))
((1))
")[1], "1");
}

fn parse_power<T: Iterator<Item = Token>>(parser: &mut Parser<T>, operator: Token, left: Expression) -> ParseResult<Expression> {
    let right = parser.parse_expression(60)?;

    Ok(Expression::Binary { operator, left: Box::new(left), right: Box::new(right) })
}

#[test]
fn test_register_infix() {
    let mut parser = Parser::new(Lexer::new("2 ** 3\n".chars()));
    parser.register_infix("**", parse_power);

    let parsed: Vec<String> = Statements::new(parser)
        .map(|statement| statement.to_string())
        .collect();

    assert_eq!(parsed, vec!["(** 2 3)"]);
}

#[test]
fn test_statements_pull_lazily() {
    let pulled = Rc::new(Cell::new(0));

    let counter = pulled.clone();
    let input = "1\n2\n".chars().inspect(move |_| counter.set(counter.get() + 1));

    let mut stream = statements(input);

    assert_eq!(stream.next().map(|statement| statement.to_string()), Some("1".to_string()));
    assert_eq!(pulled.get(), 2);

    assert_eq!(stream.next().map(|statement| statement.to_string()), Some("2".to_string()));
    assert_eq!(stream.next(), None);
}
