//! Keypad calculator core: an infix evaluator, a result formatter and the
//! keypad state machine that ties them together.
//!
//! ```
//! use padcalc::{evaluate, format_number};
//!
//! assert_eq!(format_number(evaluate("2+3×4").unwrap()), "14");
//! assert_eq!(format_number(evaluate("1/3").unwrap()), "0.3333333333");
//! ```

pub mod calc_engine;
pub mod format;
pub mod keypad;

pub use calc_engine::{
    evaluate, evaluate_traced, EvaluationTrace, InvalidExpression, Operator, Reason, Step,
};
pub use format::{format_expression, format_number};
pub use keypad::{reduce, Display, Key, KeypadState, KEYPAD_ROWS};
