use padcalc::{Key, Operator};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Greedy word wrap by display width; words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if word_width > width {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            let mut chunk = String::new();
            let mut chunk_width = 0;
            for c in word.chars() {
                let char_width = c.width().unwrap_or(1);
                if chunk_width + char_width > width {
                    lines.push(std::mem::take(&mut chunk));
                    chunk_width = 0;
                }
                chunk.push(c);
                chunk_width += char_width;
            }
            current_line = chunk;
            current_width = chunk_width;
            continue;
        }

        if current_width + word_width + 1 > width && !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }

        if !current_line.is_empty() {
            current_line.push(' ');
            current_width += 1;
        }

        current_line.push_str(word);
        current_width += word_width;
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Pads `text` on the left so it ends at the right edge of `width` columns.
pub fn align_right(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat(width - text_width), text)
}

pub fn highlight_expression(expr: &str, base_style: Style) -> Vec<Span<'static>> {
    let operator_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let number_style = Style::default()
        .fg(Color::LightGreen);

    let mut spans = Vec::new();
    let mut number = String::new();

    for c in expr.chars() {
        let is_operator = Operator::from_char(c).is_some();
        let starts_negative = c == '-' && number.is_empty() && spans_end_with_operator(&spans);
        if c.is_ascii_digit() || c == '.' || starts_negative {
            number.push(c);
            continue;
        }

        if !number.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut number), number_style));
        }

        if is_operator {
            spans.push(Span::styled(c.to_string(), operator_style));
        } else if c == ' ' {
            spans.push(Span::raw(" "));
        } else {
            spans.push(Span::styled(c.to_string(), base_style));
        }
    }

    if !number.is_empty() {
        spans.push(Span::styled(number, number_style));
    }

    spans
}

/// True at the start of an expression and right after an operator, ignoring spaces.
fn spans_end_with_operator(spans: &[Span]) -> bool {
    spans
        .iter()
        .rev()
        .find(|span| !span.content.trim().is_empty())
        .map_or(true, |span| {
            span.content.chars().count() == 1
                && span.content.chars().all(|c| Operator::from_char(c).is_some())
        })
}

pub fn key_style(key: Key, pressed: bool) -> Style {
    let style = match key {
        Key::Equals => Style::default().fg(Color::Black).bg(Color::Cyan),
        Key::Clear | Key::Backspace => Style::default().fg(Color::White).bg(Color::Blue),
        k if k.is_operator() => Style::default().fg(Color::White).bg(Color::Blue),
        _ => Style::default().fg(Color::White).bg(Color::DarkGray),
    };
    if pressed {
        style.add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap_text("12 + 34 × 56", 7), vec!["12 + 34", "× 56"]);
        assert_eq!(wrap_text("", 10), Vec::<String>::new());
        assert_eq!(wrap_text("anything", 0), vec![String::new()]);
    }

    #[test]
    fn splits_long_words() {
        assert_eq!(wrap_text("1234567 + 1", 3), vec!["123", "456", "7 +", "1"]);
    }

    #[test]
    fn right_alignment_uses_display_width() {
        assert_eq!(align_right("3×4", 5), "  3×4");
        assert_eq!(align_right("12345", 3), "12345");
    }

    #[test]
    fn highlight_groups_numbers() {
        let spans = highlight_expression("12 + -3.5", Style::default());
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, ["12", " ", "+", " ", "-3.5"]);
    }

    #[test]
    fn highlight_binary_minus() {
        let spans = highlight_expression("5-2", Style::default());
        let parts: Vec<&str> = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, ["5", "-", "2"]);
    }

    #[test]
    fn pressed_keys_are_reversed() {
        assert!(key_style(Key::Digit(1), true).add_modifier.contains(Modifier::REVERSED));
        assert!(!key_style(Key::Digit(1), false).add_modifier.contains(Modifier::REVERSED));
    }
}
