use std::collections::HashMap;

use tracing::debug;

use crate::{lexer::prelude::{Token, TokenKind}, utils::prelude::SrcSpan};
use super::ast::Expression;
use super::error::{parse_error, ParseError, ParseErrorType, ParseResult};

/// Right binding power of the prefix operators `-` and `!`.
pub const PREFIX_BINDING_POWER: i32 = 65;

/// Expressions nested deeper than this fail to parse.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Rule for a token with nothing to its left (nud).
pub type PrefixHandler<T> = fn(&mut Parser<T>, Token) -> ParseResult<Expression>;

/// Rule for a token that extends an already parsed expression (led).
pub type InfixHandler<T> = fn(&mut Parser<T>, Token, Expression) -> ParseResult<Expression>;

/// Pratt parser over a token stream.
///
/// Prefix and infix rules are looked up by token text, so the operator set
/// can be extended with [`Parser::register_prefix`] and
/// [`Parser::register_infix`]. Tokens are pulled one at a time; nothing
/// past the newline that ends a statement is requested before the next
/// statement is asked for.
pub struct Parser<T: Iterator<Item = Token>> {
    tokens: T,
    front: Option<Option<Token>>,
    last_span: SrcSpan,
    depth: usize,
    max_depth: usize,

    prefix: HashMap<&'static str, PrefixHandler<T>>,
    infix: HashMap<&'static str, InfixHandler<T>>,
}

impl<T: Iterator<Item = Token>> Parser<T> {
    pub fn new(tokens: T) -> Self {
        let mut parser = Self {
            tokens,
            front: None,
            last_span: SrcSpan::default(),
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,

            prefix: HashMap::new(),
            infix: HashMap::new(),
        };

        for keyword in ["true", "false", "exit"] {
            parser.register_prefix(keyword, parse_atom);
        }
        parser.register_prefix("-", parse_prefix_operator);
        parser.register_prefix("!", parse_prefix_operator);
        parser.register_prefix("(", parse_group);
        parser.register_prefix("if", parse_block);
        parser.register_prefix("while", parse_block);
        parser.register_prefix("def", parse_func_def);

        for operator in ["||", "&&", "==", "!=", "<", ">", "+", "-", "*", "/"] {
            parser.register_infix(operator, parse_binary);
        }
        parser.register_infix("=", parse_assignment);
        parser.register_infix("(", parse_call);

        parser
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn register_prefix(&mut self, text: &'static str, handler: PrefixHandler<T>) {
        let _ = self.prefix.insert(text, handler);
    }

    pub fn register_infix(&mut self, text: &'static str, handler: InfixHandler<T>) {
        let _ = self.infix.insert(text, handler);
    }

    /// Looks at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Token> {
        if self.front.is_none() {
            self.front = Some(self.tokens.next());
        }

        self.front.as_ref().and_then(|token| token.as_ref())
    }

    pub fn advance(&mut self) -> Option<Token> {
        let token = match self.front.take() {
            Some(token) => token,
            None => self.tokens.next(),
        };

        if let Some(token) = &token {
            self.last_span = token.span;
        }

        token
    }

    /// Consumes the next token when `accept` holds for it.
    pub fn advance_if(&mut self, accept: impl FnOnce(&Token) -> bool) -> Option<Token> {
        if self.peek().is_some_and(accept) {
            self.advance()
        } else {
            None
        }
    }

    fn eof_span(&self) -> SrcSpan {
        SrcSpan::point(self.last_span.end, self.last_span.line, self.last_span.column)
    }

    /// Error about the next token, which is left in place.
    fn unexpected(&mut self, make: impl FnOnce(String) -> ParseErrorType) -> ParseError {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Invalid => ParseError::new(
                ParseErrorType::UnexpectedCharacter { ch: token.text.clone() },
                token.span
            ),
            Some(token) => ParseError::new(make(token.describe()), token.span),
            None => ParseError::new(ParseErrorType::UnexpectedEof, self.eof_span()),
        }
    }

    pub fn skip_delimiters(&mut self) {
        while self.advance_if(Token::is_delimiter).is_some() {}
    }

    /// Every nested operand, group, condition and body statement goes
    /// through here, so the depth counter bounds the whole tree.
    pub fn parse_expression(&mut self, rbp: i32) -> ParseResult<Expression> {
        if self.depth >= self.max_depth {
            let span = match self.peek() {
                Some(token) => token.span,
                None => self.eof_span(),
            };

            return parse_error(ParseErrorType::NestingTooDeep { limit: self.max_depth }, span);
        }

        self.depth += 1;
        let expression = self.parse_nested(rbp);
        self.depth -= 1;

        expression
    }

    fn parse_nested(&mut self, rbp: i32) -> ParseResult<Expression> {
        // A newline or `end` here would be lost to recovery if consumed.
        match self.peek() {
            Some(token) if !token.ends_statement() => {},
            _ => return Err(self.unexpected(|found| ParseErrorType::UnknownPrefixOperator { found })),
        }

        let Some(token) = self.advance() else {
            return parse_error(ParseErrorType::UnexpectedEof, self.eof_span());
        };

        let mut left = self.nud(token)?;

        while self.peek().is_some_and(|token| token.lbp > rbp) {
            let Some(operator) = self.advance() else { break };

            left = self.led(operator, left)?;
        }

        Ok(left)
    }

    fn nud(&mut self, token: Token) -> ParseResult<Expression> {
        match token.kind {
            TokenKind::Identifier | TokenKind::Number => Ok(Expression::Leaf(token)),
            TokenKind::Invalid => parse_error(
                ParseErrorType::UnexpectedCharacter { ch: token.text },
                token.span
            ),
            TokenKind::Operator | TokenKind::Keyword | TokenKind::Delimiter => {
                match self.prefix.get(token.text.as_str()).copied() {
                    Some(handler) => handler(self, token),
                    None => parse_error(
                        ParseErrorType::UnknownPrefixOperator { found: token.describe() },
                        token.span
                    ),
                }
            },
        }
    }

    fn led(&mut self, operator: Token, left: Expression) -> ParseResult<Expression> {
        match self.infix.get(operator.text.as_str()).copied() {
            Some(handler) => handler(self, operator, left),
            None => parse_error(
                ParseErrorType::UnknownInfixOperator { operator: operator.text },
                operator.span
            ),
        }
    }

    /// Next statement, or `None` once the input is exhausted.
    ///
    /// A statement that fails to parse comes back as
    /// [`Expression::Invalid`] after the rest of its line is discarded.
    pub fn parse_statement(&mut self) -> Option<Expression> {
        self.skip_delimiters();
        let _ = self.peek()?;

        Some(match self.parse_terminated(false) {
            Ok(expression) => expression,
            Err(error) => {
                self.recover(false);
                Expression::Invalid(error)
            }
        })
    }

    fn parse_terminated(&mut self, in_block: bool) -> ParseResult<Expression> {
        let expression = self.parse_expression(0)?;
        self.expect_terminator(in_block)?;

        Ok(expression)
    }

    /// A statement ends at a newline or at the end of input. Inside a block
    /// the closing `end` also ends it and is left for the block.
    fn expect_terminator(&mut self, in_block: bool) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) if token.is_delimiter() => {
                let _ = self.advance();
                Ok(())
            },
            Some(token) if in_block && token.is_keyword("end") => Ok(()),
            Some(_) => Err(self.unexpected(|found| ParseErrorType::ExpectedNewline { found })),
        }
    }

    /// Drops tokens through the next newline. With `stop_at_end` a block's
    /// closing `end` is left in place.
    pub fn recover(&mut self, stop_at_end: bool) {
        let mut dropped = 0usize;

        while let Some(token) = self.peek() {
            if stop_at_end && token.is_keyword("end") {
                break;
            }

            let is_delimiter = token.is_delimiter();
            let _ = self.advance();
            dropped += 1;

            if is_delimiter {
                break;
            }
        }

        debug!(dropped, line = self.last_span.line, "recovered from parse error");
    }

    /// Statements up to and including the `end` that closes `keyword`.
    ///
    /// Every statement is consumed even when one fails; the first failure
    /// is returned once `end` has been reached.
    fn parse_body(&mut self, keyword: &Token) -> ParseResult<Vec<Expression>> {
        let mut body = vec![];
        let mut failure = None;

        loop {
            self.skip_delimiters();

            match self.peek() {
                None => return parse_error(
                    ParseErrorType::ExpectedEnd { keyword: keyword.text.clone() },
                    keyword.span
                ),
                Some(token) if token.is_keyword("end") => {
                    let _ = self.advance();
                    break;
                },
                Some(_) => {},
            }

            match self.parse_terminated(true) {
                Ok(statement) => body.push(statement),
                Err(error) => {
                    self.recover(true);
                    let _ = failure.get_or_insert(error);
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(body),
        }
    }

    /// One or two comma separated expressions closed by `)`. The opening
    /// parenthesis has already been consumed.
    fn parse_list(&mut self, open: &Token) -> ParseResult<Vec<Expression>> {
        if let Some(close) = self.advance_if(|token| token.is_operator(")")) {
            return parse_error(ParseErrorType::ArgumentCount { count: 0 }, open.span.to(close.span));
        }

        let mut items = vec![];

        loop {
            items.push(self.parse_expression(0)?);

            match self.advance_if(|token| token.is_operator(",") || token.is_operator(")")) {
                Some(separator) if separator.is_operator(")") => break,
                Some(_) => continue,
                None => return Err(self.unexpected(|found| ParseErrorType::ExpectedSeparator { found })),
            }
        }

        if items.len() > 2 {
            return parse_error(ParseErrorType::ArgumentCount { count: items.len() }, open.span.to(self.last_span));
        }

        Ok(items)
    }
}

fn parse_atom<T: Iterator<Item = Token>>(_parser: &mut Parser<T>, token: Token) -> ParseResult<Expression> {
    Ok(Expression::Leaf(token))
}

fn parse_prefix_operator<T: Iterator<Item = Token>>(parser: &mut Parser<T>, operator: Token) -> ParseResult<Expression> {
    let operand = parser.parse_expression(PREFIX_BINDING_POWER)?;

    Ok(Expression::Unary { operator, operand: Box::new(operand) })
}

fn parse_group<T: Iterator<Item = Token>>(parser: &mut Parser<T>, _open: Token) -> ParseResult<Expression> {
    let inner = parser.parse_expression(0)?;

    match parser.advance_if(|token| token.is_operator(")")) {
        Some(_) => Ok(inner),
        None => Err(parser.unexpected(|found| ParseErrorType::ExpectedClosingParen { found })),
    }
}

fn parse_block<T: Iterator<Item = Token>>(parser: &mut Parser<T>, keyword: Token) -> ParseResult<Expression> {
    let condition = parser.parse_expression(0);

    if condition.is_err() {
        parser.recover(true);
    }

    let body = parser.parse_body(&keyword);

    let condition = condition?;
    let body = body?;

    Ok(Expression::Block { keyword, condition: Box::new(condition), body })
}

fn parse_func_def<T: Iterator<Item = Token>>(parser: &mut Parser<T>, keyword: Token) -> ParseResult<Expression> {
    let header = parse_def_header(parser);

    if header.is_err() {
        parser.recover(true);
    }

    let body = parser.parse_body(&keyword);

    let (name, params) = header?;
    let body = body?;

    if body.is_empty() {
        return parse_error(ParseErrorType::EmptyFunctionBody { name: name.text }, name.span);
    }

    Ok(Expression::FuncDef { name, params, body })
}

fn parse_def_header<T: Iterator<Item = Token>>(parser: &mut Parser<T>) -> ParseResult<(Token, Vec<Token>)> {
    let Some(name) = parser.advance_if(|token| token.kind == TokenKind::Identifier) else {
        return Err(parser.unexpected(|found| ParseErrorType::ExpectedFunctionName { found }));
    };

    let Some(open) = parser.advance_if(|token| token.is_operator("(")) else {
        return Err(parser.unexpected(|found| ParseErrorType::ExpectedParameterList { found }));
    };

    let params = parser.parse_list(&open)?
        .into_iter()
        .map(|param| match param {
            Expression::Leaf(token) if token.kind == TokenKind::Identifier => Ok(token),
            other => parse_error(
                ParseErrorType::ParameterNotIdentifier { found: format!("`{other}`") },
                other.span()
            ),
        })
        .collect::<ParseResult<Vec<Token>>>()?;

    Ok((name, params))
}

/// Left associative: the right operand binds at the operator's own power.
fn parse_binary<T: Iterator<Item = Token>>(parser: &mut Parser<T>, operator: Token, left: Expression) -> ParseResult<Expression> {
    let right = parser.parse_expression(operator.lbp)?;

    Ok(Expression::Binary { operator, left: Box::new(left), right: Box::new(right) })
}

/// Right associative, and only a plain variable may stand on the left.
fn parse_assignment<T: Iterator<Item = Token>>(parser: &mut Parser<T>, operator: Token, left: Expression) -> ParseResult<Expression> {
    if left.as_identifier().is_none() {
        return parse_error(ParseErrorType::NotAnLValue, left.span());
    }

    let right = parser.parse_expression(operator.lbp - 1)?;

    Ok(Expression::Binary { operator, left: Box::new(left), right: Box::new(right) })
}

fn parse_call<T: Iterator<Item = Token>>(parser: &mut Parser<T>, open: Token, left: Expression) -> ParseResult<Expression> {
    let name = match left {
        Expression::Leaf(token) if token.kind == TokenKind::Identifier => token,
        other => return parse_error(ParseErrorType::CallTargetNotIdentifier, other.span()),
    };

    let arguments = parser.parse_list(&open)?;

    Ok(Expression::FuncCall { name, arguments })
}
