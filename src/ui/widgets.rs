//! Line rendering for interactive elements inside the message history.

use crate::interactive::{
    is_affirmative, Feedback, FeedbackKind, InteractiveElement, Interpretation, Matching,
    MultipleChoice, Ordering, Roleplay, Scenario, Suggestions, WidgetState,
};
use crate::session::WidgetVisibility;
use crate::ui::input_metrics::wrap_text;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

const POINTER: &str = "▸ ";
const NO_POINTER: &str = "  ";
const UNASSIGNED: &str = "___";

/// Shared styling decisions for one element.
struct Look {
    enabled: bool,
    focused: bool,
    cursor: Option<usize>,
    width: usize,
}

impl Look {
    fn text(&self) -> Style {
        if self.enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn accent(&self, color: Color) -> Style {
        if self.enabled {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        }
    }

    fn is_cursor(&self, index: usize) -> bool {
        self.enabled && self.focused && self.cursor == Some(index)
    }

    fn pointer(&self, index: usize) -> &'static str {
        if self.is_cursor(index) {
            POINTER
        } else {
            NO_POINTER
        }
    }

    fn row_style(&self, index: usize) -> Style {
        if self.is_cursor(index) {
            self.text().add_modifier(Modifier::REVERSED)
        } else {
            self.text()
        }
    }

    fn paragraph(&self, text: &str, style: Style) -> Vec<Line<'static>> {
        wrap_text(text, self.width)
            .into_iter()
            .map(|line| Line::styled(line, style))
            .collect()
    }

    fn hint(&self, text: &str) -> Option<Line<'static>> {
        (self.enabled && self.focused).then(|| {
            Line::styled(
                text.to_string(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        })
    }
}

/// Lines for a message's interactive element. Anything short of
/// [`WidgetVisibility::Interactive`] renders greyed and without a cursor.
pub fn element_lines(
    interactive: &Interpretation,
    state: Option<&WidgetState>,
    visibility: WidgetVisibility,
    focused: bool,
    width: usize,
) -> Vec<Line<'static>> {
    let element = match interactive {
        Interpretation::None => return Vec::new(),
        Interpretation::Invalid { kind, .. } => {
            return vec![Line::styled(
                kind.load_error(),
                Style::default().fg(Color::Red),
            )]
        }
        Interpretation::Element(element) => element,
    };

    let look = Look {
        enabled: visibility == WidgetVisibility::Interactive,
        focused,
        cursor: state.and_then(WidgetState::cursor),
        width: width.max(1),
    };
    match element {
        InteractiveElement::Scenario(scenario) => scenario_lines(scenario, &look),
        InteractiveElement::MultipleChoice(question) => choice_lines(question, state, &look),
        InteractiveElement::Matching(question) => matching_lines(question, state, &look),
        InteractiveElement::Ordering(question) => ordering_lines(question, state, &look),
        InteractiveElement::Roleplay(roleplay) => roleplay_lines(roleplay, &look),
        InteractiveElement::Feedback(feedback) => feedback_lines(feedback, &look),
        InteractiveElement::Suggestions(suggestions) => suggestion_lines(suggestions, &look),
    }
}

fn scenario_lines(scenario: &Scenario, look: &Look) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        scenario.display_title().to_string(),
        look.accent(Color::Yellow),
    )];
    lines.extend(look.paragraph(&scenario.description, look.text()));
    lines.push(Line::default());
    for (index, option) in scenario.options.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::raw(look.pointer(index)),
            Span::styled(format!("[ {} ]", option.label), look.row_style(index)),
        ]));
    }
    lines.extend(look.hint("↑/↓ välj · Enter svara"));
    lines
}

fn choice_lines(
    question: &MultipleChoice,
    state: Option<&WidgetState>,
    look: &Look,
) -> Vec<Line<'static>> {
    let mut lines = look.paragraph(&question.text, look.accent(Color::White));
    for (index, option) in question.options.iter().enumerate() {
        let selected = matches!(state, Some(WidgetState::Choice(choice)) if choice.is_selected(index));
        let marker = match (question.multi_select, selected) {
            (true, true) => "[x]",
            (true, false) => "[ ]",
            (false, true) => "(•)",
            (false, false) => "( )",
        };
        lines.push(Line::from(vec![
            Span::raw(look.pointer(index)),
            Span::styled(format!("{marker} {}", option.text), look.row_style(index)),
        ]));
    }
    lines.extend(look.hint("↑/↓ flytta · Mellanslag välj · Enter svara"));
    lines
}

fn matching_lines(
    question: &Matching,
    state: Option<&WidgetState>,
    look: &Look,
) -> Vec<Line<'static>> {
    let mut lines = look.paragraph(&question.text, look.accent(Color::White));
    for (index, item) in question.items.iter().enumerate() {
        let assigned = match state {
            Some(WidgetState::Matching(matching)) => matching
                .assignment(index)
                .and_then(|match_index| question.matches.get(match_index))
                .map(|choice| choice.text.as_str()),
            _ => None,
        };
        lines.push(Line::from(vec![
            Span::raw(look.pointer(index)),
            Span::styled(
                format!("{} → {}", item.text, assigned.unwrap_or(UNASSIGNED)),
                look.row_style(index),
            ),
        ]));
    }
    let options: Vec<&str> = question.matches.iter().map(|m| m.text.as_str()).collect();
    lines.push(Line::styled(
        format!("Alternativ: {}", options.join(", ")),
        Style::default().fg(Color::DarkGray),
    ));
    lines.extend(look.hint("↑/↓ flytta · Mellanslag nästa · ← föregående · Enter svara"));
    lines
}

fn ordering_lines(
    question: &Ordering,
    state: Option<&WidgetState>,
    look: &Look,
) -> Vec<Line<'static>> {
    let mut lines = look.paragraph(&question.text, look.accent(Color::White));
    let order: Vec<usize> = match state {
        Some(WidgetState::Ordering(ordering)) => ordering.order().to_vec(),
        _ => (0..question.items.len()).collect(),
    };
    for (position, item_index) in order.into_iter().enumerate() {
        let Some(item) = question.items.get(item_index) else {
            continue;
        };
        lines.push(Line::from(vec![
            Span::raw(look.pointer(position)),
            Span::styled(
                format!("{}. {}", position + 1, item.text),
                look.row_style(position),
            ),
        ]));
    }
    lines.extend(look.hint("↑/↓ flytta markör · Shift+↑/↓ flytta steg · Enter svara"));
    lines
}

fn roleplay_lines(roleplay: &Roleplay, look: &Look) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        roleplay.title.clone(),
        look.accent(Color::Magenta),
    )];
    lines.extend(look.paragraph(
        &roleplay.scenario,
        look.text().add_modifier(Modifier::ITALIC),
    ));
    lines.push(Line::default());
    for line in &roleplay.dialogue {
        let role_style = if line.is_learner() {
            look.accent(Color::Cyan)
        } else {
            look.accent(Color::Green)
        };
        lines.push(Line::styled(format!("{}:", line.role), role_style));
        lines.extend(
            wrap_text(&line.message, look.width.saturating_sub(2).max(1))
                .into_iter()
                .map(|text| Line::styled(format!("  {text}"), look.text())),
        );
    }
    if !roleplay.learning_points.is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled("Viktiga lärdomar:", look.accent(Color::Yellow)));
        for point in &roleplay.learning_points {
            lines.push(Line::styled(format!("• {point}"), look.text()));
        }
    }
    lines
}

fn feedback_color(kind: FeedbackKind) -> Color {
    match kind {
        FeedbackKind::Knowledge => Color::Blue,
        FeedbackKind::Procedure => Color::Green,
        FeedbackKind::Priority => Color::Yellow,
        FeedbackKind::Safety => Color::Red,
    }
}

fn feedback_lines(feedback: &Feedback, look: &Look) -> Vec<Line<'static>> {
    let mut lines = vec![Line::styled(
        feedback.kind.heading(),
        look.accent(feedback_color(feedback.kind)),
    )];
    if let Some(answer) = feedback.user_answer.as_deref() {
        lines.push(Line::styled(
            format!("Ditt svar: {answer}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.extend(look.paragraph(&feedback.message, look.text()));
    for point in &feedback.points {
        lines.push(Line::styled(format!("• {point}"), look.text()));
    }
    if let Some(action) = feedback.correct_action.as_deref() {
        lines.push(Line::default());
        lines.extend(look.paragraph(
            &format!("Rekommendation: {action}"),
            look.accent(feedback_color(feedback.kind)),
        ));
    }
    lines
}

fn suggestion_lines(suggestions: &Suggestions, look: &Look) -> Vec<Line<'static>> {
    let mut lines = match suggestions.text.as_deref() {
        Some(text) if !text.trim().is_empty() => look.paragraph(text, look.accent(Color::White)),
        _ => Vec::new(),
    };
    let labels = suggestions
        .options
        .iter()
        .map(|option| option.answer_text().unwrap_or_default().to_string());

    if suggestions.binary {
        let mut spans = Vec::new();
        for (index, (option, label)) in suggestions.options.iter().zip(labels).enumerate() {
            if index > 0 {
                spans.push(Span::raw("  "));
            }
            let mut style = if is_affirmative(option) {
                look.accent(Color::Green)
            } else {
                look.text()
            };
            if look.is_cursor(index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("[ {label} ]"), style));
        }
        lines.push(Line::from(spans));
    } else {
        for (index, label) in labels.enumerate() {
            lines.push(Line::from(vec![
                Span::raw(look.pointer(index)),
                Span::styled(format!("[ {label} ]"), look.row_style(index)),
            ]));
        }
    }
    lines.extend(look.hint("←/→ eller ↑/↓ välj · Enter svara"));
    lines
}
