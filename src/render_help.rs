use crate::tui_mode::app::App;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn heading(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
    ))
}

fn help_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled("padcalc - Keypad Calculator", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        heading("Operations:"),
        Line::from("  + : Addition        (e.g., 5 + 3 = 8)"),
        Line::from("  - : Subtraction     (e.g., 10 - 4 = 6)"),
        Line::from("  × : Multiplication  (e.g., 6 × 7 = 42)   keys: * or x"),
        Line::from("  ÷ : Division        (e.g., 15 ÷ 3 = 5)   key: /"),
        Line::from("  % : Remainder       (e.g., 10 % 3 = 1)"),
        Line::from("  × and ÷ bind tighter than + and -; equal operators apply left to right."),
        Line::from("  A minus at the start negates the first number: -5 + 3 = -2"),
        Line::from("  Two operators in a row replace each other: 5 × - 2 becomes 5 - 2."),
        Line::from("  For a minus after an operator use: padcalc --eval '5*-2'"),
        Line::from("  Division by zero gives Infinity or NaN."),
        Line::from(""),
        heading("Keys:"),
        Line::from("  0-9 .          : Digits and decimal point"),
        Line::from("  Enter or =     : Calculate"),
        Line::from("  Backspace      : Delete last character"),
        Line::from("  Esc, Delete, c : Clear expression and result"),
        Line::from("  d              : Toggle step-by-step details in history"),
        Line::from("  Ctrl+L         : Clear history"),
        Line::from("  q or Ctrl+C    : Quit"),
        Line::from(""),
        heading("Navigation:"),
        Line::from("  ↑ ↓          : Recall previous calculations"),
        Line::from("  PgUp/PgDn    : Page through history"),
        Line::from("  Mouse click  : Press a keypad button"),
        Line::from("  Mouse wheel  : Scroll through history"),
        Line::from("  Esc or F1    : Close this help"),
    ]
}

pub fn render_help(frame: &mut Frame, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" padcalc Help ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(help_lines())
        .block(block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll as u16, 0));

    frame.render_widget(Clear, frame.size());
    frame.render_widget(paragraph, frame.size());
}

#[cfg(test)]
mod tests {
    use super::*;
    use padcalc::{format_number, reduce, Key, KeypadState};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn replacement_example_matches_keypad() {
        let text: Vec<String> = help_lines().iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.contains("5 × - 2 becomes 5 - 2")));
        assert!(!text.iter().any(|l| l.contains("5 × -2 = -10")));

        let state = ["5", "×", "-", "2", "="]
            .iter()
            .filter_map(|label| Key::from_label(label))
            .fold(KeypadState::default(), reduce);
        assert_eq!(state.expression, "5-2");
        assert_eq!(state.display.text(), format_number(3.0));
    }
}
