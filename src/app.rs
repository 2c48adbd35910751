use crate::api::{ApiClient, ChatError};
use crate::config::{Config, SessionConfig};
use crate::interactive::{WidgetAction, WidgetState};
use crate::reveal::RevealTick;
use crate::runtime::{spawn_chat_worker, UiUpdate};
use crate::session::{ChatSession, SubmitRejected, WidgetVisibility};
use crate::state::MessageId;
use crate::terminal::TerminalType;
use crate::types::ChatRequest;
use crate::ui::editor::{InputAction, InputEditor};
use crate::ui::layout::split_chat_layout;
use crate::ui::render::{
    history_lines, input_visual_rows, render_header, render_input, render_messages,
    render_quick_responses, render_status_line, status_text, MessageView,
};
use anyhow::{bail, Result};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use std::collections::HashMap;
use std::io::{self, IsTerminal};
use std::time::Duration;
use tokio::sync::mpsc;

const TUI_TICK_INTERVAL: Duration = Duration::from_millis(120);
const MAX_INPUT_ROWS: usize = 6;
const MOUSE_SCROLL_STEP: usize = 3;

/// Fixed quick responses, bound to F1..F4.
pub const QUICK_RESPONSES: [&str; 4] = [
    "Jag förstår inte",
    "Kan du ge ett exempel?",
    "Berätta mer",
    "Fortsätt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Widget,
}

struct HistoryState {
    scroll_offset: usize,
    auto_follow: bool,
    line_count: usize,
    area: Rect,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            auto_follow: true,
            line_count: 0,
            area: Rect::default(),
        }
    }
}

impl HistoryState {
    fn viewport_rows(&self) -> usize {
        self.area.height as usize
    }

    fn max_scroll_offset(&self) -> usize {
        self.line_count.saturating_sub(self.viewport_rows())
    }

    fn update_viewport(&mut self, line_count: usize, area: Rect) {
        self.line_count = line_count;
        self.area = area;
        if self.auto_follow {
            self.scroll_offset = self.max_scroll_offset();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        }
    }

    fn page_step(&self) -> usize {
        self.viewport_rows().saturating_sub(1).max(1)
    }

    fn scroll_up(&mut self, step: usize) {
        if self.max_scroll_offset() == 0 {
            return;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(step.max(1));
        self.auto_follow = false;
    }

    fn scroll_down(&mut self, step: usize) {
        let max = self.max_scroll_offset();
        self.scroll_offset = self.scroll_offset.saturating_add(step.max(1)).min(max);
        self.auto_follow = self.scroll_offset >= max;
    }

    fn follow(&mut self) {
        self.auto_follow = true;
        self.scroll_offset = self.max_scroll_offset();
    }

    fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x.saturating_add(self.area.width)
            && row >= self.area.y
            && row < self.area.y.saturating_add(self.area.height)
    }
}

/// Terminal chat view. Owns the session and routes keys, replies and reveal
/// ticks into it; all requests go through the background chat worker.
pub struct App {
    session: ChatSession,
    request_tx: mpsc::UnboundedSender<ChatRequest>,
    update_rx: mpsc::UnboundedReceiver<UiUpdate>,
    reveal_rx: mpsc::UnboundedReceiver<RevealTick>,
    editor: InputEditor,
    widgets: HashMap<MessageId, WidgetState>,
    focus: Focus,
    history: HistoryState,
    should_quit: bool,
    terminal: Option<TerminalType>,
}

impl App {
    pub fn new(config: &Config, session_config: SessionConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;
        let mut app = Self::with_client(client, session_config);
        if io::stdin().is_terminal() && io::stdout().is_terminal() {
            app.terminal = Some(crate::terminal::setup()?);
        }
        Ok(app)
    }

    /// Build the view around an existing client without touching the terminal.
    pub fn with_client(client: ApiClient, session_config: SessionConfig) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (reveal_tx, reveal_rx) = mpsc::unbounded_channel();
        let request_tx = spawn_chat_worker(client, update_tx);

        Self {
            session: ChatSession::new(session_config, reveal_tx),
            request_tx,
            update_rx,
            reveal_rx,
            editor: InputEditor::new(),
            widgets: HashMap::new(),
            focus: Focus::Input,
            history: HistoryState::default(),
            should_quit: false,
            terminal: None,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.terminal.is_none() {
            bail!("delegering needs an interactive terminal");
        }

        self.begin_conversation();
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TUI_TICK_INTERVAL);
        while !self.should_quit {
            self.draw()?;

            tokio::select! {
                _ = tick.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
                update = self.update_rx.recv() => {
                    self.handle_update(update);
                }
                Some(reveal) = self.reveal_rx.recv() => {
                    self.handle_reveal_tick(reveal);
                }
                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(err)) => return Err(err.into()),
                    None => self.should_quit = true,
                },
            }
        }

        Ok(())
    }

    /// Send the opening "start" request.
    pub fn begin_conversation(&mut self) {
        match self.session.begin() {
            Ok(request) => self.dispatch(request),
            Err(rejected) => tracing::debug!(%rejected, "conversation not started"),
        }
    }

    fn draw(&mut self) -> Result<()> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };
        let drawn = self.draw_to(&mut terminal);
        self.terminal = Some(terminal);
        drawn
    }

    /// Draw one frame onto any ratatui backend.
    pub fn draw_to<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        terminal.draw(|frame| self.render(frame))?;
        Ok(())
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let input_width = area.width.saturating_sub(4).max(1) as usize;
        let input_rows = input_visual_rows(self.editor.buffer(), input_width).min(MAX_INPUT_ROWS);
        let panes = split_chat_layout(area, input_rows as u16);
        let focused_widget = self.focused_widget();
        let accepts_input = self.session.accepts_input();

        let views: Vec<MessageView<'_>> = self
            .session
            .messages()
            .iter()
            .map(|message| MessageView {
                message,
                revealing: self.session.visible_segments(message.id),
                visibility: self.session.widget_visibility(message.id),
                widget: self.widgets.get(&message.id),
                focused: focused_widget == Some(message.id),
            })
            .collect();
        let lines = history_lines(&views, panes.history.width as usize);
        self.history.update_viewport(lines.len(), panes.history);

        render_header(frame, panes.header, &self.session.config().user_name);
        render_messages(frame, panes.history, lines, self.history.scroll_offset);
        render_status_line(
            frame,
            panes.status,
            &status_text(
                !accepts_input,
                self.session.is_revealing(),
                focused_widget.is_some(),
            ),
            !accepts_input,
        );
        render_quick_responses(frame, panes.quick_responses, &QUICK_RESPONSES, accepts_input);
        render_input(
            frame,
            panes.input,
            self.editor.buffer(),
            self.editor.cursor(),
            accepts_input,
            self.focus == Focus::Input,
        );
    }

    pub fn handle_update(&mut self, update: Option<UiUpdate>) {
        match update {
            Some(UiUpdate::Reply(outcome)) => {
                self.session.receive_reply(outcome);
                self.sync_widgets();
            }
            None => {
                tracing::warn!("chat worker stopped");
                self.should_quit = true;
            }
        }
    }

    pub fn handle_reveal_tick(&mut self, tick: RevealTick) {
        self.session.on_reveal_tick(tick);
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.handle_key(key)
            }
            Event::Paste(text) => {
                if self.focus == Focus::Input && self.session.accepts_input() && !text.is_empty() {
                    self.editor.insert_str(&text);
                }
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                if self.session.skip_reveal().is_none() {
                    self.focus = Focus::Input;
                }
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(self.history.page_step());
                return;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(self.history.page_step());
                return;
            }
            KeyCode::F(number @ 1..=4) => {
                self.send_quick_response(usize::from(number - 1));
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Widget => self.handle_widget_key(key),
            Focus::Input => self.handle_input_key(key),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left)
                if self.history.contains(mouse.column, mouse.row) =>
            {
                self.session.skip_reveal();
            }
            MouseEventKind::ScrollUp => self.history.scroll_up(MOUSE_SCROLL_STEP),
            MouseEventKind::ScrollDown => self.history.scroll_down(MOUSE_SCROLL_STEP),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        if !self.session.accepts_input() {
            let quit = key.code == KeyCode::Char('d')
                && key.modifiers.contains(KeyModifiers::CONTROL)
                && self.editor.is_empty();
            if quit {
                self.should_quit = true;
            }
            return;
        }

        match self.editor.apply_key(key) {
            InputAction::None => {}
            InputAction::Submit(text) => {
                let submitted = self.session.submit(&text);
                self.finish_submit(submitted);
            }
            InputAction::Interrupt | InputAction::Quit => self.should_quit = true,
        }
    }

    fn handle_widget_key(&mut self, key: KeyEvent) {
        let Some(id) = self.focused_widget() else {
            self.focus = Focus::Input;
            return;
        };
        let Some(element) = self
            .session
            .store()
            .get(id)
            .and_then(|message| message.interactive.element())
        else {
            return;
        };
        let Some(state) = self.widgets.get_mut(&id) else {
            return;
        };
        let Some(action) = widget_action_for(key, state) else {
            return;
        };

        if let Some(answer) = state.apply(element, action) {
            let submitted = self.session.answer_interactive(id, &answer);
            self.finish_submit(submitted);
        }
    }

    fn send_quick_response(&mut self, index: usize) {
        let Some(phrase) = QUICK_RESPONSES.get(index) else {
            return;
        };
        if !self.session.accepts_input() {
            return;
        }
        let submitted = self.session.submit(phrase);
        self.finish_submit(submitted);
    }

    fn finish_submit(&mut self, submitted: Result<ChatRequest, SubmitRejected>) {
        match submitted {
            Ok(request) => self.dispatch(request),
            Err(rejected) => tracing::debug!(%rejected, "submission rejected"),
        }
    }

    fn dispatch(&mut self, request: ChatRequest) {
        self.focus = Focus::Input;
        self.history.follow();
        if self.request_tx.send(request).is_err() {
            self.session.receive_reply(Err(ChatError::Transport {
                url: "worker".to_string(),
                detail: "chat worker stopped".to_string(),
            }));
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Widget => Focus::Input,
            Focus::Input if self.focused_widget_candidate().is_some() => Focus::Widget,
            Focus::Input => Focus::Input,
        };
    }

    /// The active message's widget, if it can take keyboard focus now.
    fn focused_widget_candidate(&self) -> Option<MessageId> {
        let id = self.session.active_id()?;
        let answerable = self
            .session
            .store()
            .get(id)
            .and_then(|message| message.interactive.element())
            .is_some_and(|element| element.is_answerable());
        let interactive = self.session.widget_visibility(id) == WidgetVisibility::Interactive;
        (answerable && interactive && self.widgets.contains_key(&id)).then_some(id)
    }

    fn focused_widget(&self) -> Option<MessageId> {
        if self.focus == Focus::Widget {
            self.focused_widget_candidate()
        } else {
            None
        }
    }

    fn sync_widgets(&mut self) {
        let Some(id) = self.session.active_id() else {
            return;
        };
        if self.widgets.contains_key(&id) {
            return;
        }
        let element = self
            .session
            .store()
            .get(id)
            .and_then(|message| message.interactive.element())
            .filter(|element| element.is_answerable());
        if let Some(element) = element {
            self.widgets.insert(id, WidgetState::for_element(element));
        }
    }
}

/// Map a key to a widget action; the same key can mean different things for
/// button rows and lists.
fn widget_action_for(key: KeyEvent, state: &WidgetState) -> Option<WidgetAction> {
    let reorder = key
        .modifiers
        .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
    match state {
        WidgetState::Display => None,
        WidgetState::Buttons(_) => match key.code {
            KeyCode::Up | KeyCode::Left => Some(WidgetAction::Prev),
            KeyCode::Down | KeyCode::Right => Some(WidgetAction::Next),
            KeyCode::Enter | KeyCode::Char(' ') => Some(WidgetAction::Submit),
            _ => None,
        },
        WidgetState::Ordering(_) => match key.code {
            KeyCode::Up if reorder => Some(WidgetAction::MoveUp),
            KeyCode::Down if reorder => Some(WidgetAction::MoveDown),
            KeyCode::Up => Some(WidgetAction::Prev),
            KeyCode::Down => Some(WidgetAction::Next),
            KeyCode::Enter => Some(WidgetAction::Submit),
            _ => None,
        },
        WidgetState::Matching(_) => match key.code {
            KeyCode::Up => Some(WidgetAction::Prev),
            KeyCode::Down => Some(WidgetAction::Next),
            KeyCode::Char(' ') | KeyCode::Right => Some(WidgetAction::Toggle),
            KeyCode::Left => Some(WidgetAction::Back),
            KeyCode::Enter => Some(WidgetAction::Submit),
            _ => None,
        },
        WidgetState::Choice(_) => match key.code {
            KeyCode::Up => Some(WidgetAction::Prev),
            KeyCode::Down => Some(WidgetAction::Next),
            KeyCode::Char(' ') => Some(WidgetAction::Toggle),
            KeyCode::Enter => Some(WidgetAction::Submit),
            _ => None,
        },
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if self.terminal.take().is_some() {
            let _ = crate::terminal::restore();
        }
    }
}
