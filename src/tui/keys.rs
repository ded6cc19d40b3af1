//! Key bindings for review and explore.
use crate::review::{ExploreAction, ReviewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Input<A> {
    Quit,
    Act(A),
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

pub(super) fn review_input(key: KeyEvent) -> Option<Input<ReviewAction>> {
    if is_quit(&key) {
        return Some(Input::Quit);
    }
    let action = match key.code {
        KeyCode::Down | KeyCode::Char('j') => ReviewAction::Next,
        KeyCode::Up | KeyCode::Char('k') => ReviewAction::Prev,
        KeyCode::Char('a') => ReviewAction::Approve,
        KeyCode::Char('s') => ReviewAction::Skip,
        KeyCode::Char('e') => ReviewAction::Edit,
        _ => return None,
    };
    Some(Input::Act(action))
}

pub(super) fn explore_input(key: KeyEvent) -> Option<Input<ExploreAction>> {
    if is_quit(&key) {
        return Some(Input::Quit);
    }
    let action = match key.code {
        KeyCode::Down | KeyCode::Char('j') => ExploreAction::Next,
        KeyCode::Up | KeyCode::Char('k') => ExploreAction::Prev,
        KeyCode::Char('s') | KeyCode::Enter => ExploreAction::Stage,
        _ => return None,
    };
    Some(Input::Act(action))
}
