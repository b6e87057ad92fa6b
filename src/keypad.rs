//! Keypad state machine.
//!
//! The front-ends never edit the expression directly: every button press goes
//! through [`reduce`], which returns the next [`KeypadState`].

use unicode_segmentation::UnicodeSegmentation;

use crate::calc_engine::{evaluate, InvalidExpression, Operator};
use crate::format::format_number;

/// Button labels, row by row. The `0` on the last row spans two columns.
pub const KEYPAD_ROWS: [&[&str]; 5] = [
    &["C", "⌫", "%", "÷"],
    &["7", "8", "9", "×"],
    &["4", "5", "6", "-"],
    &["1", "2", "3", "+"],
    &["0", ".", "="],
];

/// Text shown in place of a result when the expression cannot be evaluated.
pub const ERROR_TEXT: &str = "Error";

/// Characters that replace each other instead of stacking up at the end of
/// the expression.
const REPLACEABLE: [char; 6] = ['+', '-', '×', '÷', '%', '.'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Op(Operator),
    Clear,
    Backspace,
    Equals,
}

impl Key {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "C" => Some(Key::Clear),
            "⌫" => Some(Key::Backspace),
            "=" => Some(Key::Equals),
            _ => {
                let mut chars = label.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::from_char(c).filter(|key| !matches!(key, Key::Clear))
            }
        }
    }

    /// Keyboard mapping used by the terminal front-ends.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
            '.' => Some(Key::Point),
            '=' | '\n' | '\r' => Some(Key::Equals),
            'c' | 'C' => Some(Key::Clear),
            'x' | 'X' => Some(Key::Op(Operator::Mul)),
            '\u{8}' | '\u{7f}' => Some(Key::Backspace),
            _ => Operator::from_char(c).map(Key::Op),
        }
    }

    pub fn label(self) -> String {
        match self {
            Key::Clear => "C".to_string(),
            Key::Backspace => "⌫".to_string(),
            Key::Equals => "=".to_string(),
            other => other.glyph().map(String::from).unwrap_or_default(),
        }
    }

    /// Character appended to the expression, for keys that append one.
    pub fn glyph(self) -> Option<char> {
        match self {
            Key::Digit(d) => char::from_digit(u32::from(d), 10),
            Key::Point => Some('.'),
            Key::Op(op) => Some(op.glyph()),
            Key::Clear | Key::Backspace | Key::Equals => None,
        }
    }

    pub fn is_operator(self) -> bool {
        matches!(self, Key::Op(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Value(String),
    Error,
}

impl Display {
    pub fn text(&self) -> &str {
        match self {
            Display::Value(s) => s,
            Display::Error => ERROR_TEXT,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Display::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadState {
    pub expression: String,
    pub display: Display,
}

impl Default for KeypadState {
    fn default() -> Self {
        KeypadState {
            expression: String::new(),
            display: Display::Value("0".to_string()),
        }
    }
}

impl KeypadState {
    pub fn expression_or_zero(&self) -> &str {
        if self.expression.is_empty() {
            "0"
        } else {
            &self.expression
        }
    }

    /// Result display for a finished evaluation of the current expression.
    pub fn with_result(self, result: Result<f64, InvalidExpression>) -> Self {
        let display = match result {
            Ok(value) => Display::Value(format_number(value)),
            Err(_) => Display::Error,
        };
        KeypadState { display, ..self }
    }
}

pub fn reduce(state: KeypadState, key: Key) -> KeypadState {
    match key {
        Key::Clear => KeypadState::default(),
        Key::Backspace => {
            let mut expression = state.expression;
            if let Some((idx, _)) = expression.grapheme_indices(true).next_back() {
                expression.truncate(idx);
            }
            KeypadState { expression, ..state }
        }
        Key::Equals => {
            let result = evaluate(&state.expression);
            state.with_result(result)
        }
        _ => {
            let Some(glyph) = key.glyph() else {
                return state;
            };
            let mut expression = state.expression;
            let replaces_last = expression
                .chars()
                .next_back()
                .is_some_and(|last| REPLACEABLE.contains(&last) && REPLACEABLE.contains(&glyph));
            if replaces_last {
                expression.pop();
            }
            expression.push(glyph);
            KeypadState { expression, ..state }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(labels: &[&str]) -> KeypadState {
        labels.iter().fold(KeypadState::default(), |state, label| {
            reduce(state, Key::from_label(label).unwrap())
        })
    }

    #[test]
    fn starts_at_zero() {
        let state = KeypadState::default();
        assert_eq!(state.expression_or_zero(), "0");
        assert_eq!(state.display.text(), "0");
    }

    #[test]
    fn every_keypad_label_maps_to_a_key() {
        for row in KEYPAD_ROWS {
            for label in row {
                let key = Key::from_label(label).unwrap();
                assert_eq!(key.label(), *label);
            }
        }
    }

    #[test]
    fn unknown_labels() {
        assert_eq!(Key::from_label("12"), None);
        assert_eq!(Key::from_label(""), None);
        assert_eq!(Key::from_label("c"), None);
        assert_eq!(Key::from_label("?"), None);
    }

    #[test]
    fn keyboard_characters() {
        assert_eq!(Key::from_char('*'), Some(Key::Op(Operator::Mul)));
        assert_eq!(Key::from_char('x'), Some(Key::Op(Operator::Mul)));
        assert_eq!(Key::from_char('/'), Some(Key::Op(Operator::Div)));
        assert_eq!(Key::from_char('\n'), Some(Key::Equals));
        assert_eq!(Key::from_char('c'), Some(Key::Clear));
        assert_eq!(Key::from_char('7'), Some(Key::Digit(7)));
        assert_eq!(Key::from_char('q'), None);
    }

    #[test]
    fn keyboard_operators_show_keypad_glyphs() {
        let state = "6*7/2"
            .chars()
            .filter_map(Key::from_char)
            .fold(KeypadState::default(), reduce);
        assert_eq!(state.expression, "6×7÷2");
    }

    #[test]
    fn equals_formats_result() {
        let state = press_all(&["1", "2", "+", "3", "×", "4", "="]);
        assert_eq!(state.expression, "12+3×4");
        assert_eq!(state.display, Display::Value("24".to_string()));
    }

    #[test]
    fn equals_on_empty_expression_shows_zero() {
        let state = press_all(&["="]);
        assert_eq!(state.display.text(), "0");
    }

    #[test]
    fn consecutive_operators_replace_each_other() {
        let state = press_all(&["5", "+", "×"]);
        assert_eq!(state.expression, "5×");
        let state = press_all(&["5", ".", "-"]);
        assert_eq!(state.expression, "5-");
        let state = press_all(&["5", "÷", "."]);
        assert_eq!(state.expression, "5.");
    }

    #[test]
    fn minus_after_operator_replaces_it() {
        let state = "5*-2="
            .chars()
            .filter_map(Key::from_char)
            .fold(KeypadState::default(), reduce);
        assert_eq!(state.expression, "5-2");
        assert_eq!(state.display.text(), "3");
        let state = press_all(&["-", "5", "+", "3", "="]);
        assert_eq!(state.display.text(), "-2");
    }

    #[test]
    fn trailing_operator_is_an_error() {
        let state = press_all(&["5", "+", "="]);
        assert!(state.display.is_error());
        assert_eq!(state.display.text(), ERROR_TEXT);
        assert_eq!(state.expression, "5+");
    }

    #[test]
    fn division_by_zero_shows_infinity() {
        let state = press_all(&["1", "÷", "0", "="]);
        assert_eq!(state.display.text(), "Infinity");
    }

    #[test]
    fn backspace_removes_one_character() {
        let state = press_all(&["1", "2", "×", "⌫"]);
        assert_eq!(state.expression, "12");
        let state = press_all(&["⌫"]);
        assert_eq!(state.expression, "");
    }

    #[test]
    fn backspace_keeps_display() {
        let state = press_all(&["9", "=", "⌫"]);
        assert_eq!(state.expression, "");
        assert_eq!(state.display.text(), "9");
    }

    #[test]
    fn clear_resets_everything() {
        let state = press_all(&["1", "÷", "=", "C"]);
        assert_eq!(state, KeypadState::default());
    }

    #[test]
    fn typing_continues_after_equals() {
        let state = press_all(&["2", "+", "2", "=", "×", "3", "="]);
        assert_eq!(state.expression, "2+2×3");
        assert_eq!(state.display.text(), "8");
    }
}
