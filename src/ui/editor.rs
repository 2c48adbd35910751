use crate::ui::input_metrics::clamp_to_char_boundary_left;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Debug, PartialEq, Eq)]
struct EditorSnapshot {
    buffer: String,
    cursor: usize,
}

/// Single input line with submit history and undo/redo.
#[derive(Default, Debug)]
pub struct InputEditor {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    history_stash: Option<EditorSnapshot>,
    undo_stack: Vec<EditorSnapshot>,
    redo_stack: Vec<EditorSnapshot>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    None,
    Submit(String),
    Interrupt,
    Quit,
}

impl InputEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn prev_char_boundary(&self, idx: usize) -> usize {
        let idx = clamp_to_char_boundary_left(&self.buffer, idx);
        self.buffer[..idx]
            .char_indices()
            .next_back()
            .map_or(0, |(start, _)| start)
    }

    fn next_char_boundary(&self, idx: usize) -> usize {
        let idx = clamp_to_char_boundary_left(&self.buffer, idx);
        match self.buffer[idx..].chars().next() {
            Some(ch) => idx + ch.len_utf8(),
            None => self.buffer.len(),
        }
    }

    fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
        }
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
    }

    fn restore(&mut self, snap: EditorSnapshot) {
        self.buffer = snap.buffer;
        self.cursor = clamp_to_char_boundary_left(&self.buffer, snap.cursor);
    }

    fn leave_history(&mut self) {
        self.history_index = None;
        self.history_stash = None;
    }

    pub fn insert_str(&mut self, value: &str) {
        self.leave_history();
        let cursor = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        self.push_undo();
        self.buffer.insert_str(cursor, value);
        self.cursor = cursor + value.len();
    }

    pub fn backspace(&mut self) {
        let end = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        if end == 0 {
            return;
        }
        self.leave_history();
        let start = self.prev_char_boundary(end);
        self.push_undo();
        self.buffer.replace_range(start..end, "");
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        let start = clamp_to_char_boundary_left(&self.buffer, self.cursor);
        if start >= self.buffer.len() {
            return;
        }
        self.leave_history();
        let end = self.next_char_boundary(start);
        self.push_undo();
        self.buffer.replace_range(start..end, "");
        self.cursor = start;
    }

    pub fn clear(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        self.leave_history();
        self.push_undo();
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the trimmed buffer for sending. Whitespace-only input stays put.
    pub fn submit(&mut self) -> Option<String> {
        let value = self.buffer.trim().to_string();
        if value.is_empty() {
            return None;
        }
        if self.history.last() != Some(&value) {
            self.history.push(value.clone());
        }
        self.leave_history();
        self.push_undo();
        self.buffer.clear();
        self.cursor = 0;
        Some(value)
    }

    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if self.history_index.is_none() {
            self.history_stash = Some(self.snapshot());
        }
        let next = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_index = Some(next);
        self.buffer = self.history[next].clone();
        self.cursor = self.buffer.len();
    }

    pub fn history_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        if idx + 1 >= self.history.len() {
            self.history_index = None;
            match self.history_stash.take() {
                Some(stash) => self.restore(stash),
                None => {
                    self.buffer.clear();
                    self.cursor = 0;
                }
            }
        } else {
            self.history_index = Some(idx + 1);
            self.buffer = self.history[idx + 1].clone();
            self.cursor = self.buffer.len();
        }
    }

    pub fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(previous);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(next);
        }
    }

    pub fn apply_key(&mut self, key: KeyEvent) -> InputAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('d') if ctrl => {
                if self.buffer.is_empty() {
                    return InputAction::Quit;
                }
                self.delete();
            }
            KeyCode::Char('c') if ctrl => return InputAction::Interrupt,
            KeyCode::Char('j') if ctrl => self.insert_str("\n"),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('z') if ctrl => self.undo(),
            KeyCode::Char('y') if ctrl => self.redo(),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.buffer.len(),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_str("\n")
            }
            KeyCode::Enter => {
                if let Some(value) = self.submit() {
                    return InputAction::Submit(value);
                }
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.prev_char_boundary(self.cursor),
            KeyCode::Right => self.cursor = self.next_char_boundary(self.cursor),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buffer.len(),
            KeyCode::Up => self.history_up(),
            KeyCode::Down => self.history_down(),
            KeyCode::Char(ch) => {
                let mut encoded = [0u8; 4];
                self.insert_str(ch.encode_utf8(&mut encoded));
            }
            _ => {}
        }
        InputAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut InputEditor, text: &str) {
        for ch in text.chars() {
            editor.apply_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_enter_submits_trimmed_text() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "  Vad är delegering? ");
        assert_eq!(
            editor.apply_key(key(KeyCode::Enter)),
            InputAction::Submit("Vad är delegering?".to_string())
        );
        assert!(editor.is_empty());
    }

    #[test]
    fn test_whitespace_only_is_not_submitted() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "   ");
        assert_eq!(editor.apply_key(key(KeyCode::Enter)), InputAction::None);
        assert_eq!(editor.buffer(), "   ");
    }

    #[test]
    fn test_backspace_handles_multibyte() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "så");
        editor.apply_key(key(KeyCode::Backspace));
        assert_eq!(editor.buffer(), "s");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn test_history_recalls_previous_submission_and_restores_draft() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "Berätta mer");
        editor.apply_key(key(KeyCode::Enter));
        type_text(&mut editor, "utkast");

        editor.apply_key(key(KeyCode::Up));
        assert_eq!(editor.buffer(), "Berätta mer");
        editor.apply_key(key(KeyCode::Down));
        assert_eq!(editor.buffer(), "utkast");
    }

    #[test]
    fn test_undo_and_redo() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "ja");
        editor.apply_key(ctrl('z'));
        assert_eq!(editor.buffer(), "j");
        editor.apply_key(ctrl('y'));
        assert_eq!(editor.buffer(), "ja");
    }

    #[test]
    fn test_ctrl_d_quits_only_when_empty() {
        let mut editor = InputEditor::new();
        type_text(&mut editor, "x");
        editor.apply_key(key(KeyCode::Home));
        assert_eq!(editor.apply_key(ctrl('d')), InputAction::None);
        assert!(editor.is_empty());
        assert_eq!(editor.apply_key(ctrl('d')), InputAction::Quit);
        assert_eq!(editor.apply_key(ctrl('c')), InputAction::Interrupt);
    }
}
