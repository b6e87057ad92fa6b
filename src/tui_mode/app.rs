use padcalc::{evaluate_traced, reduce, EvaluationTrace, InvalidExpression, Key, KeypadState, Step};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

pub struct HistoryEntry {
    pub expression: String,
    pub result: Result<f64, InvalidExpression>,
    pub detailed_steps: Vec<Step>,
    pub detailed_mode: bool,
    pub duration: Duration,
}

pub struct App {
    pub keypad: KeypadState,
    pub history: Vec<HistoryEntry>,
    pub cursor_history: usize,
    pub should_quit: bool,
    pub show_help: bool,
    pub help_scroll: usize,
    pub detailed_mode: bool,
    pub list_height: usize,
    pub item_start_indices: Vec<usize>,
    pub history_scroll: usize,
    pub scroll_to_bottom: bool,
    pub terminal_too_small: bool,
    /// Screen area of every keypad button from the last frame, for mouse clicks.
    pub key_areas: Vec<(Rect, Key)>,
    pub last_pressed: Option<Key>,
}

impl App {
    pub fn new() -> Self {
        App {
            keypad: KeypadState::default(),
            history: Vec::new(),
            cursor_history: 0,
            should_quit: false,
            show_help: false,
            help_scroll: 0,
            detailed_mode: false,
            list_height: 5,
            item_start_indices: Vec::new(),
            history_scroll: 0,
            scroll_to_bottom: false,
            terminal_too_small: false,
            key_areas: Vec::new(),
            last_pressed: None,
        }
    }

    pub fn press(&mut self, key: Key) {
        if key == Key::Equals {
            self.submit();
        } else {
            let state = std::mem::take(&mut self.keypad);
            self.keypad = reduce(state, key);
        }
        self.last_pressed = Some(key);
    }

    /// `=`: evaluates the expression with a trace and records it in the history.
    pub fn submit(&mut self) {
        let expression = self.keypad.expression.clone();

        let start_time = Instant::now();
        let mut trace = EvaluationTrace::new(self.detailed_mode);
        let result = evaluate_traced(&expression, &mut trace);
        let duration = start_time.elapsed();

        if let Err(e) = &result {
            tracing::warn!(expression = %expression, error = %e, "evaluation failed");
        }

        let state = std::mem::take(&mut self.keypad);
        self.keypad = state.with_result(result.clone());

        if expression.trim().is_empty() {
            return;
        }

        self.history.push(HistoryEntry {
            expression,
            result,
            detailed_steps: trace.steps,
            detailed_mode: self.detailed_mode,
            duration,
        });

        self.cursor_history = self.history.len().saturating_sub(1);
        self.scroll_to_bottom = true;
    }

    pub fn toggle_details(&mut self) {
        self.detailed_mode = !self.detailed_mode;
    }

    pub fn navigate_history(&mut self, direction: i32) {
        if direction < 0 && self.cursor_history > 0 {
            self.cursor_history -= 1;
        } else if direction > 0 && self.cursor_history < self.history.len().saturating_sub(1) {
            self.cursor_history += 1;
        }
        self.recall_selected();
    }

    pub fn scroll_history(&mut self, direction: i32) {
        let step = self.list_height.saturating_sub(1);
        if direction < 0 {
            self.cursor_history = self.cursor_history.saturating_sub(step);
        } else {
            self.cursor_history = self.cursor_history.saturating_add(step)
                .min(self.history.len().saturating_sub(1));
        }
        self.recall_selected();
    }

    /// Puts the selected history entry back on the keypad.
    fn recall_selected(&mut self) {
        if let Some(entry) = self.history.get(self.cursor_history) {
            self.keypad = KeypadState {
                expression: entry.expression.clone(),
                ..KeypadState::default()
            }
            .with_result(entry.result.clone());
        }
        self.scroll_to_bottom = false;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.cursor_history = 0;
        self.history_scroll = 0;
        self.item_start_indices.clear();
    }

    pub fn key_at(&self, column: u16, row: u16) -> Option<Key> {
        self.key_areas
            .iter()
            .find(|(area, _)| {
                column >= area.x
                    && column < area.x + area.width
                    && row >= area.y
                    && row < area.y + area.height
            })
            .map(|(_, key)| *key)
    }
}
