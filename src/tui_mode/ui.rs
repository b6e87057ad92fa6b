use super::app::App;
use super::helpers::{align_right, highlight_expression, key_style, wrap_text};
use crate::render_help::render_help;
use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use padcalc::{format_expression, format_number, Key, KEYPAD_ROWS};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::time::Duration;

const MIN_TERMINAL_WIDTH: u16 = 50;
const MIN_TERMINAL_HEIGHT: u16 = 22;
const KEYPAD_WIDTH: u16 = 28;

pub fn run_ui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| {
            if app.show_help {
                render_help(f, app);
            } else {
                ui(f, app);
            }
        })?;

        if app.should_quit {
            break;
        }

        if crossterm::event::poll(Duration::from_millis(50))? {
            match crossterm::event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    handle_key_event(app, code, modifiers);
                }
                Event::Mouse(event) => {
                    handle_mouse_event(app, event);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.show_help {
        match code {
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown => app.help_scroll = app.help_scroll.saturating_add(10),
            KeyCode::PageUp => app.help_scroll = app.help_scroll.saturating_sub(10),
            KeyCode::Esc | KeyCode::F(1) => {
                app.show_help = false;
                app.help_scroll = 0;
            }
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        KeyCode::Char('l') if modifiers.contains(KeyModifiers::CONTROL) => app.clear_history(),
        KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => {}
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_details(),
        KeyCode::Char(c) => {
            if let Some(key) = Key::from_char(c) {
                app.press(key);
            }
        }
        KeyCode::Enter => app.press(Key::Equals),
        KeyCode::Backspace => app.press(Key::Backspace),
        KeyCode::Esc | KeyCode::Delete => app.press(Key::Clear),
        KeyCode::Up => app.navigate_history(-1),
        KeyCode::Down => app.navigate_history(1),
        KeyCode::PageUp => app.scroll_history(-1),
        KeyCode::PageDown => app.scroll_history(1),
        KeyCode::F(1) => {
            app.show_help = true;
            app.help_scroll = 0;
        }
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, event: MouseEvent) {
    if app.show_help {
        match event.kind {
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            _ => {}
        }
        return;
    }

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(key) = app.key_at(event.column, event.row) {
                app.press(key);
            }
        }
        MouseEventKind::ScrollDown => {
            app.history_scroll = app.history_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => {
            app.history_scroll = app.history_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let terminal_size = frame.size();

    app.terminal_too_small = terminal_size.width < MIN_TERMINAL_WIDTH ||
                             terminal_size.height < MIN_TERMINAL_HEIGHT;

    if app.terminal_too_small {
        app.key_areas.clear();
        render_resize_message(frame, terminal_size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(4),
            Constraint::Min(15),
            Constraint::Length(1),
        ])
        .split(terminal_size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Length(KEYPAD_WIDTH),
            Constraint::Min(20),
        ])
        .split(layout[1]);

    render_display(frame, app, layout[0]);
    render_keypad(frame, app, body[0]);
    render_history(frame, app, body[1]);
    render_status(frame, app, layout[2]);
    app.list_height = body[1].height as usize;
}

fn render_resize_message(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small! Min size: {}x{}. Current: {}x{}",
        MIN_TERMINAL_WIDTH,
        MIN_TERMINAL_HEIGHT,
        area.width,
        area.height
    );

    let text = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please resize your terminal window",
            Style::default().fg(Color::Yellow)
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Resize Required ")
        .title_alignment(Alignment::Center);

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Expression on the first line, result on the second, both right-aligned.
fn render_display(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(if app.detailed_mode { " Display (details) " } else { " Display " })
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let width = inner_area.width as usize;
    let expression = app.keypad.expression_or_zero();
    // Keep the tail of long expressions visible, like a calculator display.
    let visible: String = {
        let chars: Vec<char> = expression.chars().collect();
        chars[chars.len().saturating_sub(width)..].iter().collect()
    };

    let result_style = if app.keypad.display.is_error() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let text = vec![
        Line::from(Span::styled(
            align_right(&visible, width),
            Style::default().fg(Color::LightBlue),
        )),
        Line::from(Span::styled(
            align_right(app.keypad.display.text(), width),
            result_style,
        )),
    ];

    frame.render_widget(Paragraph::new(text), inner_area);
}

fn render_keypad(frame: &mut Frame, app: &mut App, area: Rect) {
    app.key_areas.clear();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, KEYPAD_ROWS.len() as u32); KEYPAD_ROWS.len()])
        .split(area);

    for (row_area, labels) in rows.iter().zip(KEYPAD_ROWS.iter()) {
        // A short row stretches its first button over the missing columns.
        let span_first = 4 - labels.len() as u32 + 1;
        let constraints: Vec<Constraint> = labels
            .iter()
            .enumerate()
            .map(|(i, _)| Constraint::Ratio(if i == 0 { span_first } else { 1 }, 4))
            .collect();
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(*row_area);

        for (cell, label) in cells.iter().zip(labels.iter()) {
            let Some(key) = Key::from_label(label) else {
                continue;
            };
            let style = key_style(key, app.last_pressed == Some(key));
            let button = Paragraph::new(*label)
                .style(style)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Black)),
                );
            frame.render_widget(button, *cell);
            app.key_areas.push((*cell, key));
        }
    }
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" History ")
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.history.is_empty() {
        let empty_msg = Paragraph::new("No calculations yet. Press = to see results here.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty_msg, inner_area);
        return;
    }

    let mut items = Vec::new();
    app.item_start_indices.clear();

    let wrap_width = inner_area.width.saturating_sub(4) as usize;

    for (i, entry) in app.history.iter().enumerate() {
        app.item_start_indices.push(items.len());

        let is_selected = i == app.cursor_history;
        let base_style = Style::default()
            .fg(if is_selected { Color::Yellow } else { Color::Cyan });

        let expression = format_expression(&entry.expression);
        let expression_lines = wrap_text(&expression, wrap_width);

        for (line_idx, line) in expression_lines.into_iter().enumerate() {
            let mut spans = vec![];

            if line_idx == 0 {
                spans.push(Span::styled("> ", Style::default().fg(Color::Green)));
            } else {
                spans.push(Span::styled("  ", Style::default()));
            }

            spans.extend(highlight_expression(&line, base_style));
            items.push(ListItem::new(Line::from(spans)));
        }

        let result_span = match &entry.result {
            Ok(val) => Span::styled(
                format_number(*val),
                Style::default().fg(Color::LightMagenta).add_modifier(Modifier::BOLD),
            ),
            Err(e) => Span::styled(
                format!("Error: {}", e.reason),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled("  = ", Style::default().fg(Color::Gray)),
            result_span,
        ])));

        if entry.detailed_mode {
            for (j, step) in entry.detailed_steps.iter().enumerate() {
                let step_text = format!("Step {}: {} = {}", j + 1, step.operation, format_number(step.result));
                for (step_idx, line) in wrap_text(&step_text, wrap_width).into_iter().enumerate() {
                    let prefix = if step_idx == 0 { "    - " } else { "      " };
                    items.push(ListItem::new(Line::from(Span::styled(
                        format!("{}{}", prefix, line),
                        Style::default().fg(Color::DarkGray),
                    ))));
                }
            }

            if let Err(e) = &entry.result {
                items.push(ListItem::new(Line::from(Span::styled(
                    format!("    - at position {}", e.position),
                    Style::default().fg(Color::Red),
                ))));
            }

            items.push(ListItem::new(Line::from(Span::styled(
                format!("    - Time: {:.6} ms", entry.duration.as_secs_f64() * 1000.0),
                Style::default().fg(Color::Magenta),
            ))));
        }

        if i < app.history.len() - 1 {
            let separator = Span::styled(
                "-".repeat(inner_area.width as usize),
                Style::default().fg(Color::DarkGray)
            );
            items.push(ListItem::new(Line::from(separator)));
        }
    }

    if app.scroll_to_bottom {
        app.history_scroll = items.len().saturating_sub(inner_area.height as usize);
        app.scroll_to_bottom = false;
    }

    let selected_index = app.item_start_indices.get(app.cursor_history).copied();

    let list = List::new(items)
        .block(Block::default())
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default()
        .with_selected(selected_index)
        .with_offset(app.history_scroll);

    frame.render_stateful_widget(list, inner_area, &mut state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let details = if app.detailed_mode { "Details off" } else { "Details on" };
    let keys = [
        ("Enter", "Calculate"),
        ("Esc", "Clear"),
        ("Up/Down", "History"),
        ("d", details),
        ("F1", "Help"),
        ("q", "Quit"),
    ];

    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, desc)| {
            vec![
                Span::styled(
                    *key,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {} ", desc),
                    Style::default().fg(Color::DarkGray),
                ),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(app: &mut App, code: KeyCode) {
        handle_key_event(app, code, KeyModifiers::NONE);
    }

    #[test]
    fn typed_keys_reach_the_keypad() {
        let mut app = App::new();
        for c in "8x4".chars() {
            key(&mut app, KeyCode::Char(c));
        }
        key(&mut app, KeyCode::Enter);
        assert_eq!(app.keypad.expression, "8×4");
        assert_eq!(app.keypad.display.text(), "32");
    }

    #[test]
    fn escape_clears_and_q_quits() {
        let mut app = App::new();
        key(&mut app, KeyCode::Char('5'));
        key(&mut app, KeyCode::Esc);
        assert_eq!(app.keypad.expression, "");
        key(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn help_swallows_keypad_keys() {
        let mut app = App::new();
        key(&mut app, KeyCode::F(1));
        assert!(app.show_help);
        key(&mut app, KeyCode::Char('7'));
        key(&mut app, KeyCode::Down);
        assert_eq!(app.keypad.expression, "");
        assert_eq!(app.help_scroll, 1);
        key(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn d_toggles_details() {
        let mut app = App::new();
        key(&mut app, KeyCode::Char('d'));
        assert!(app.detailed_mode);
    }

    #[test]
    fn control_chords_do_not_reach_the_keypad() {
        let mut app = App::new();
        key(&mut app, KeyCode::Char('5'));
        handle_key_event(&mut app, KeyCode::Char('x'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(app.keypad.expression, "5");
        assert!(!app.detailed_mode);
        assert!(!app.should_quit);
        handle_key_event(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn left_click_presses_button() {
        let mut app = App::new();
        app.key_areas = vec![(Rect::new(0, 0, 6, 3), Key::Digit(9))];
        handle_mouse_event(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 2,
                row: 1,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert_eq!(app.keypad.expression, "9");
    }
}
