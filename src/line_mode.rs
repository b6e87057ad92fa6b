use anyhow::Result;
use padcalc::{reduce, Display, Key as PadKey, KeypadState};
use std::io::{stdin, stdout, Write};
use termion::{
    clear::CurrentLine as ClearLine,
    cursor::{DetectCursorPos, Goto},
    event::Key,
    input::TermRead,
    raw::IntoRawMode,
};

/// Keypad on a single terminal line. Every finished calculation stays on
/// screen and a fresh line starts below it.
pub fn run_line() -> Result<()> {
    println!("padcalc line keypad");
    println!("Keys: 0-9 . + - * / %, Enter or = to calculate, Backspace, Esc or c to clear");
    println!("Press q to quit\n");

    let mut stdout = stdout().into_raw_mode()?;
    let mut state = KeypadState::default();
    let (_, mut row) = stdout.cursor_pos()?;
    redraw(&mut stdout, row, &state)?;

    for key in stdin().keys() {
        let pad_key = match key? {
            Key::Char('q') | Key::Ctrl('c') | Key::Ctrl('d') => break,
            Key::Char('\n') => Some(PadKey::Equals),
            Key::Backspace => Some(PadKey::Backspace),
            Key::Esc | Key::Delete => Some(PadKey::Clear),
            Key::Char(c) => PadKey::from_char(c),
            _ => None,
        };
        let Some(pad_key) = pad_key else {
            continue;
        };

        state = reduce(state, pad_key);
        if let (PadKey::Equals, Display::Error) = (pad_key, &state.display) {
            tracing::warn!(expression = %state.expression, "evaluation failed");
        }
        // The next key press draws the continuing state on the fresh line.
        if draw_after(&mut stdout, row, &state, pad_key)? {
            row = stdout.cursor_pos()?.1;
        }
    }

    write!(stdout, "\r\n")?;
    stdout.flush()?;
    Ok(())
}

/// Redraws the current line and, after `=`, moves below it.
/// Returns true when a new line was started.
fn draw_after(out: &mut impl Write, row: u16, state: &KeypadState, pad_key: PadKey) -> Result<bool> {
    redraw(out, row, state)?;
    if pad_key != PadKey::Equals {
        return Ok(false);
    }
    write!(out, "\r\n")?;
    out.flush()?;
    Ok(true)
}

fn redraw(out: &mut impl Write, row: u16, state: &KeypadState) -> Result<()> {
    write!(out, "{}{}{}", Goto(1, row), ClearLine, display_line(state))?;
    out.flush()?;
    Ok(())
}

fn display_line(state: &KeypadState) -> String {
    format!("Expression: {}  = {}", state.expression_or_zero(), state.display.text())
}
