//! Keyboard-driven selection state for each answerable element.
//!
//! A widget never submits on its own; [`WidgetState::apply`] returns the
//! answer text on [`WidgetAction::Submit`] and the caller decides whether the
//! message may still be answered.

use super::element::InteractiveElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    /// Move the cursor up.
    Prev,
    /// Move the cursor down.
    Next,
    /// Select/deselect, or cycle a matching assignment forward.
    Toggle,
    /// Cycle a matching assignment backward.
    Back,
    /// Move the item under the cursor up (ordering only).
    MoveUp,
    /// Move the item under the cursor down (ordering only).
    MoveDown,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetState {
    Choice(ChoiceState),
    Matching(MatchingState),
    Ordering(OrderingState),
    Buttons(ButtonState),
    Display,
}

impl WidgetState {
    pub fn for_element(element: &InteractiveElement) -> Self {
        match element {
            InteractiveElement::MultipleChoice(question) => {
                WidgetState::Choice(ChoiceState::new(question.options.len()))
            }
            InteractiveElement::Matching(question) => {
                WidgetState::Matching(MatchingState::new(question.items.len()))
            }
            InteractiveElement::Ordering(question) => {
                WidgetState::Ordering(OrderingState::new(question.items.len()))
            }
            InteractiveElement::Scenario(scenario) => {
                WidgetState::Buttons(ButtonState::new(scenario.options.len()))
            }
            InteractiveElement::Suggestions(suggestions) => {
                WidgetState::Buttons(ButtonState::new(suggestions.options.len()))
            }
            InteractiveElement::Roleplay(_) | InteractiveElement::Feedback(_) => {
                WidgetState::Display
            }
        }
    }

    /// Apply a key action; returns the answer text when a submit succeeds.
    pub fn apply(&mut self, element: &InteractiveElement, action: WidgetAction) -> Option<String> {
        match (self, element) {
            (WidgetState::Choice(state), InteractiveElement::MultipleChoice(question)) => {
                match action {
                    WidgetAction::Prev => state.cursor = state.cursor.saturating_sub(1),
                    WidgetAction::Next => state.cursor = next_index(state.cursor, state.selected.len()),
                    WidgetAction::Toggle => state.toggle(question.multi_select),
                    WidgetAction::Submit => {
                        return state.answer(question.options.iter().map(|o| o.text.as_str()))
                    }
                    WidgetAction::Back | WidgetAction::MoveUp | WidgetAction::MoveDown => {}
                }
                None
            }
            (WidgetState::Matching(state), InteractiveElement::Matching(question)) => {
                let match_count = question.matches.len();
                match action {
                    WidgetAction::Prev => state.cursor = state.cursor.saturating_sub(1),
                    WidgetAction::Next => {
                        state.cursor = next_index(state.cursor, state.assignments.len())
                    }
                    WidgetAction::Toggle => state.cycle(match_count, true),
                    WidgetAction::Back => state.cycle(match_count, false),
                    WidgetAction::Submit => {
                        let items: Vec<&str> =
                            question.items.iter().map(|i| i.text.as_str()).collect();
                        let matches: Vec<&str> =
                            question.matches.iter().map(|m| m.text.as_str()).collect();
                        return state.answer(&items, &matches);
                    }
                    WidgetAction::MoveUp | WidgetAction::MoveDown => {}
                }
                None
            }
            (WidgetState::Ordering(state), InteractiveElement::Ordering(question)) => {
                match action {
                    WidgetAction::Prev => state.cursor = state.cursor.saturating_sub(1),
                    WidgetAction::Next => state.cursor = next_index(state.cursor, state.order.len()),
                    WidgetAction::MoveUp => state.move_up(),
                    WidgetAction::MoveDown => state.move_down(),
                    WidgetAction::Submit => {
                        let items: Vec<&str> =
                            question.items.iter().map(|i| i.text.as_str()).collect();
                        return Some(state.answer(&items));
                    }
                    WidgetAction::Toggle | WidgetAction::Back => {}
                }
                None
            }
            (WidgetState::Buttons(state), InteractiveElement::Scenario(scenario)) => state.apply(
                action,
                scenario.options.iter().map(|option| option.label.as_str()),
            ),
            (WidgetState::Buttons(state), InteractiveElement::Suggestions(suggestions)) => state
                .apply(
                    action,
                    suggestions
                        .options
                        .iter()
                        .map(|option| option.answer_text().unwrap_or_default()),
                ),
            _ => None,
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        match self {
            WidgetState::Choice(state) => Some(state.cursor),
            WidgetState::Matching(state) => Some(state.cursor),
            WidgetState::Ordering(state) => Some(state.cursor),
            WidgetState::Buttons(state) => Some(state.cursor),
            WidgetState::Display => None,
        }
    }
}

fn next_index(cursor: usize, len: usize) -> usize {
    if cursor + 1 < len {
        cursor + 1
    } else {
        cursor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceState {
    cursor: usize,
    selected: Vec<bool>,
}

impl ChoiceState {
    pub fn new(len: usize) -> Self {
        Self {
            cursor: 0,
            selected: vec![false; len],
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    fn toggle(&mut self, multi_select: bool) {
        let Some(current) = self.selected.get(self.cursor).copied() else {
            return;
        };
        if !multi_select {
            self.selected.iter_mut().for_each(|flag| *flag = false);
        }
        self.selected[self.cursor] = !current;
    }

    /// Selected option texts in option order, joined by ", ".
    fn answer<'a>(&self, texts: impl Iterator<Item = &'a str>) -> Option<String> {
        let chosen: Vec<&str> = texts
            .zip(&self.selected)
            .filter_map(|(text, selected)| selected.then_some(text))
            .collect();
        if chosen.is_empty() {
            return None;
        }
        Some(chosen.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingState {
    cursor: usize,
    assignments: Vec<Option<usize>>,
}

impl MatchingState {
    pub fn new(items: usize) -> Self {
        Self {
            cursor: 0,
            assignments: vec![None; items],
        }
    }

    pub fn assignment(&self, item: usize) -> Option<usize> {
        self.assignments.get(item).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.assignments.iter().all(Option::is_some)
    }

    /// Step the current item's match through the ones no other item uses,
    /// passing through "unassigned" at the ends.
    fn cycle(&mut self, match_count: usize, forward: bool) {
        let Some(current) = self.assignments.get(self.cursor).copied() else {
            return;
        };
        let taken: Vec<usize> = self
            .assignments
            .iter()
            .enumerate()
            .filter(|(item, _)| *item != self.cursor)
            .filter_map(|(_, assigned)| *assigned)
            .collect();
        let mut free: Vec<Option<usize>> = vec![None];
        free.extend((0..match_count).filter(|m| !taken.contains(m)).map(Some));

        let position = free.iter().position(|slot| *slot == current).unwrap_or(0);
        let next = if forward {
            (position + 1) % free.len()
        } else {
            (position + free.len() - 1) % free.len()
        };
        self.assignments[self.cursor] = free[next];
    }

    /// "item → match" pairs joined by " | "; every item must be assigned.
    fn answer(&self, items: &[&str], matches: &[&str]) -> Option<String> {
        let pairs = self
            .assignments
            .iter()
            .enumerate()
            .map(|(item, assigned)| {
                let matched = matches.get((*assigned)?)?;
                Some(format!("{} → {}", items.get(item)?, matched))
            })
            .collect::<Option<Vec<String>>>()?;
        Some(pairs.join(" | "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingState {
    cursor: usize,
    order: Vec<usize>,
}

impl OrderingState {
    pub fn new(items: usize) -> Self {
        Self {
            cursor: 0,
            order: (0..items).collect(),
        }
    }

    /// Item indices in their current display order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn move_up(&mut self) {
        if self.cursor > 0 && self.cursor < self.order.len() {
            self.order.swap(self.cursor, self.cursor - 1);
            self.cursor -= 1;
        }
    }

    fn move_down(&mut self) {
        if self.cursor + 1 < self.order.len() {
            self.order.swap(self.cursor, self.cursor + 1);
            self.cursor += 1;
        }
    }

    fn answer(&self, items: &[&str]) -> String {
        self.order
            .iter()
            .filter_map(|index| items.get(*index).copied())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    cursor: usize,
    len: usize,
}

impl ButtonState {
    pub fn new(len: usize) -> Self {
        Self { cursor: 0, len }
    }

    fn apply<'a>(
        &mut self,
        action: WidgetAction,
        mut labels: impl Iterator<Item = &'a str>,
    ) -> Option<String> {
        match action {
            WidgetAction::Prev => self.cursor = self.cursor.saturating_sub(1),
            WidgetAction::Next => self.cursor = next_index(self.cursor, self.len),
            WidgetAction::Submit | WidgetAction::Toggle => {
                return labels
                    .nth(self.cursor)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string);
            }
            WidgetAction::Back | WidgetAction::MoveUp | WidgetAction::MoveDown => {}
        }
        None
    }
}
