/// What a prefix operator does to its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryAction {
    Negate,
    Not,
}

pub fn unary_action(operator: &str) -> Option<UnaryAction> {
    Some(match operator {
        "-" => UnaryAction::Negate,
        "!" => UnaryAction::Not,
        _ => return None
    })
}

#[derive(Debug, Clone, Copy)]
pub enum BinaryAction {
    /// Two numbers in, a number out.
    Arithmetic(fn(f64, f64) -> f64),
    /// Two numbers in, a boolean out.
    Comparison(fn(f64, f64) -> bool),
    /// Operands of the same variant compared by value.
    Equality { negate: bool },
    /// The right operand is skipped when the left one equals `decided_by`.
    Logic { decided_by: bool },
    Assign,
}

pub fn binary_action(operator: &str) -> Option<BinaryAction> {
    Some(match operator {
        "+" => BinaryAction::Arithmetic(|left, right| left + right),
        "-" => BinaryAction::Arithmetic(|left, right| left - right),
        "*" => BinaryAction::Arithmetic(|left, right| left * right),
        "/" => BinaryAction::Arithmetic(|left, right| left / right),
        "<" => BinaryAction::Comparison(|left, right| left < right),
        ">" => BinaryAction::Comparison(|left, right| left > right),
        "==" => BinaryAction::Equality { negate: false },
        "!=" => BinaryAction::Equality { negate: true },
        "&&" => BinaryAction::Logic { decided_by: false },
        "||" => BinaryAction::Logic { decided_by: true },
        "=" => BinaryAction::Assign,
        _ => return None
    })
}
