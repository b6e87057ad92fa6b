//! Single-pass infix evaluator over `+ - * / %`, decimal numbers and unary minus.
//!
//! The scan keeps an operand stack and an operator stack (shunting-yard without
//! an output queue): operators are applied as soon as a lower-or-equal precedence
//! operator arrives, and whatever is left is unwound at the end of the input.

use thiserror::Error;
use tracing::{debug, trace};

use crate::format::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Operator {
    /// Recognizes both the ASCII operators and the keypad glyphs `×` and `÷`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' | '×' => Some(Operator::Mul),
            '/' | '÷' => Some(Operator::Div),
            '%' => Some(Operator::Rem),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Rem => '%',
        }
    }

    /// Character shown on the keypad and in the expression display.
    pub fn glyph(self) -> char {
        match self {
            Operator::Mul => '×',
            Operator::Div => '÷',
            other => other.symbol(),
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 1,
            Operator::Mul | Operator::Div | Operator::Rem => 2,
        }
    }

    /// IEEE-754 arithmetic. Division by zero is not special-cased and `%` keeps
    /// the sign of the dividend.
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => lhs / rhs,
            Operator::Rem => lhs % rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("malformed number '{0}'")]
    MalformedNumber(String),
    #[error("missing operand for '{0}'")]
    MissingOperand(char),
    #[error("operand without an operator")]
    DanglingOperand,
}

/// The only failure of [`evaluate`]. `position` counts characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression at position {position}: {reason}")]
pub struct InvalidExpression {
    pub position: usize,
    pub reason: Reason,
}

impl InvalidExpression {
    fn new(position: usize, reason: Reason) -> Self {
        InvalidExpression { position, reason }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub operation: String,
    pub result: f64,
}

pub struct EvaluationTrace {
    pub steps: Vec<Step>,
    pub detailed_mode: bool,
}

impl EvaluationTrace {
    pub fn new(detailed_mode: bool) -> Self {
        EvaluationTrace {
            steps: Vec::new(),
            detailed_mode,
        }
    }

    /// `describe` only runs in detailed mode.
    pub fn add_step(&mut self, describe: impl FnOnce() -> String, result: f64) {
        if self.detailed_mode {
            self.steps.push(Step { operation: describe(), result });
        }
    }
}

pub fn evaluate(expression: &str) -> Result<f64, InvalidExpression> {
    evaluate_traced(expression, &mut EvaluationTrace::new(false))
}

/// Same as [`evaluate`], recording every applied operation into `trace`.
pub fn evaluate_traced(
    expression: &str,
    trace: &mut EvaluationTrace,
) -> Result<f64, InvalidExpression> {
    let result = scan(expression, trace);
    match &result {
        Ok(value) => debug!(expression, value, "evaluated expression"),
        Err(err) => debug!(expression, error = %err, "rejected expression"),
    }
    result
}

fn scan(expression: &str, trace: &mut EvaluationTrace) -> Result<f64, InvalidExpression> {
    let chars: Vec<char> = expression.chars().collect();
    let mut operands: Vec<f64> = Vec::new();
    let mut operators: Vec<Operator> = Vec::new();
    let mut can_unary = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => {
                i += 1;
            }
            _ if c.is_ascii_digit() || c == '.' || (c == '-' && can_unary) => {
                let start = i;
                let mut num_str = String::new();
                if c == '-' {
                    num_str.push(c);
                    i += 1;
                }
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    num_str.push(chars[i]);
                    i += 1;
                }
                operands.push(parse_number(num_str, start)?);
                can_unary = false;
            }
            _ => {
                let op = Operator::from_char(c)
                    .ok_or_else(|| InvalidExpression::new(i, Reason::UnexpectedChar(c)))?;
                while let Some(&top) = operators.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    operators.pop();
                    apply_top(top, &mut operands, i, trace)?;
                }
                operators.push(op);
                can_unary = true;
                i += 1;
            }
        }
    }

    while let Some(op) = operators.pop() {
        apply_top(op, &mut operands, chars.len(), trace)?;
    }

    match operands.as_slice() {
        [] => Ok(0.0),
        [value] => Ok(*value),
        _ => Err(InvalidExpression::new(chars.len(), Reason::DanglingOperand)),
    }
}

fn parse_number(num_str: String, position: usize) -> Result<f64, InvalidExpression> {
    if num_str.matches('.').count() > 1 {
        return Err(InvalidExpression::new(position, Reason::MalformedNumber(num_str)));
    }
    num_str
        .parse::<f64>()
        .map_err(|_| InvalidExpression::new(position, Reason::MalformedNumber(num_str)))
}

fn apply_top(
    op: Operator,
    operands: &mut Vec<f64>,
    position: usize,
    trace: &mut EvaluationTrace,
) -> Result<(), InvalidExpression> {
    let (Some(rhs), Some(lhs)) = (operands.pop(), operands.pop()) else {
        return Err(InvalidExpression::new(position, Reason::MissingOperand(op.symbol())));
    };
    let result = op.apply(lhs, rhs);
    trace!(lhs, rhs, op = %op.symbol(), result, "applied operator");
    trace.add_step(
        || format!("{} {} {}", format_number(lhs), op.glyph(), format_number(rhs)),
        result,
    );
    operands.push(result);
    Ok(())
}
