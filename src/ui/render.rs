use crate::interactive::WidgetState;
use crate::session::WidgetVisibility;
use crate::state::{Message, Sender};
use crate::ui::input_metrics::{
    char_display_width, cursor_row_col, truncate_to_display_width, wrap_input_lines, wrap_text,
};
use crate::ui::widgets::element_lines;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const COURSE_TITLE: &str = "Delegeringsutbildning";
pub const THINKING_TEXT: &str = "Handledaren skriver...";
const USER_LABEL: &str = "Du";
const ASSISTANT_LABEL: &str = "Handledare";
const TYPING_CURSOR: &str = "▌";
const BODY_INDENT: &str = "  ";

/// Everything needed to draw one message, borrowed from the session.
pub struct MessageView<'a> {
    pub message: &'a Message,
    /// Segments shown so far while the message is being revealed.
    pub revealing: Option<&'a [String]>,
    pub visibility: WidgetVisibility,
    pub widget: Option<&'a WidgetState>,
    pub focused: bool,
}

pub fn input_visual_rows(input: &str, width: usize) -> usize {
    wrap_input_lines(input, width).len().max(1)
}

pub fn render_header(frame: &mut Frame<'_>, area: Rect, user_name: &str) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let line = Line::from(vec![
        Span::styled(
            COURSE_TITLE,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" · ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("Välkommen {user_name}!")),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Pre-wrapped history lines for `width` columns.
pub fn history_lines(views: &[MessageView<'_>], width: usize) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(BODY_INDENT.len()).max(1);
    let mut lines = Vec::new();

    for view in views {
        let (label, label_style) = match view.message.sender {
            Sender::User => (
                USER_LABEL,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Sender::Assistant => (
                ASSISTANT_LABEL,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        lines.push(Line::styled(label, label_style));

        let body = match view.revealing {
            Some(segments) => segments.join("\n\n"),
            None => view.message.text_content.clone(),
        };
        let mut body_lines: Vec<Line<'static>> = if body.trim().is_empty() {
            Vec::new()
        } else {
            wrap_text(&body, body_width)
                .into_iter()
                .map(|line| Line::from(format!("{BODY_INDENT}{line}")))
                .collect()
        };
        if view.revealing.is_some() {
            match body_lines.last_mut() {
                Some(last) => last.spans.push(Span::styled(
                    TYPING_CURSOR,
                    Style::default().fg(Color::Green),
                )),
                None => body_lines.push(Line::styled(
                    format!("{BODY_INDENT}{TYPING_CURSOR}"),
                    Style::default().fg(Color::Green),
                )),
            }
        }
        lines.extend(body_lines);

        let shows_widget = view.message.is_assistant()
            && !view.message.interactive.is_none()
            && view.visibility != WidgetVisibility::Hidden;
        if shows_widget {
            lines.push(Line::default());
            lines.extend(indent(element_lines(
                &view.message.interactive,
                view.widget,
                view.visibility,
                view.focused,
                body_width,
            )));
        }
        lines.push(Line::default());
    }
    lines
}

fn indent(lines: Vec<Line<'static>>) -> impl Iterator<Item = Line<'static>> {
    lines.into_iter().map(|mut line| {
        line.spans.insert(0, Span::raw(BODY_INDENT));
        line
    })
}

pub fn render_messages(frame: &mut Frame<'_>, area: Rect, lines: Vec<Line<'static>>, scroll: usize) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(Color::White))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, status: &str, busy: bool) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let style = if busy {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = truncate_line(status, area.width as usize);
    frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Quick-response chips, labelled with their function keys.
pub fn render_quick_responses(frame: &mut Frame<'_>, area: Rect, phrases: &[&str], enabled: bool) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let chip_style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = Vec::with_capacity(phrases.len() * 3);
    for (index, phrase) in phrases.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("F{}", index + 1),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(format!(" {phrase} "), chip_style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input: &str,
    cursor_byte: usize,
    enabled: bool,
    focused: bool,
) {
    if area.height <= 2 || area.width <= 4 {
        return;
    }
    let (title, border_style) = if enabled {
        (" Skicka ", Style::default().fg(Color::Cyan))
    } else {
        (" Väntar... ", Style::default().fg(Color::DarkGray))
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input_width = inner.width.saturating_sub(2).max(1) as usize;
    let lines = wrap_input_lines(input, input_width);
    let (cursor_row, cursor_col) = cursor_row_col(input, cursor_byte, input_width);
    let visible_rows = inner.height as usize;
    let window_start = cursor_row.saturating_add(1).saturating_sub(visible_rows);

    let mut rendered = Vec::with_capacity(visible_rows);
    for offset in 0..visible_rows {
        let row_index = window_start + offset;
        let prefix = if row_index == 0 { "> " } else { "  " };
        let line = lines.get(row_index).cloned().unwrap_or_default();
        rendered.push(Line::from(format!("{prefix}{line}")));
    }

    let text_style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };
    frame.render_widget(Paragraph::new(rendered).style(text_style), inner);

    if enabled && focused {
        let cursor_y = inner
            .y
            .saturating_add(cursor_row.saturating_sub(window_start) as u16);
        let cursor_x = inner
            .x
            .saturating_add(2 + cursor_col as u16)
            .min(inner.x.saturating_add(inner.width.saturating_sub(1)));
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Status text for the current state of the conversation.
pub fn status_text(waiting: bool, revealing: bool, widget_focused: bool) -> String {
    if waiting {
        THINKING_TEXT.to_string()
    } else if widget_focused {
        "↑/↓ flytta · Mellanslag välj · Enter svara · Tab tillbaka till textfältet".to_string()
    } else if revealing {
        "Esc visa allt · PgUp/PgDn bläddra · Ctrl+C avsluta".to_string()
    } else {
        "Enter skicka · Tab svarsalternativ · PgUp/PgDn bläddra · Ctrl+C avsluta".to_string()
    }
}

fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::new();
    let mut used = 0usize;
    let mut truncated = false;

    for ch in input.chars() {
        let ch_width = char_display_width(ch);
        if used + ch_width > width {
            truncated = true;
            break;
        }
        out.push(ch);
        used += ch_width;
    }

    if truncated && width >= 4 {
        out = truncate_to_display_width(&out, width - 3);
        out.push_str("...");
    }
    out
}
