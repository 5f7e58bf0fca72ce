use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{App, ConfirmChoice, Mode};
use crate::tui::constants::STATUS_DELETE_CANCELLED;

/// Whether a key was consumed by the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Handled,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseAction {
    DrillIn,
    Back,
    ToggleDone,
    Create,
    Edit,
    Delete,
    Refresh,
    ToggleCompleted,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
}

impl BrowseAction {
    fn from_event(key: &KeyEvent, mode: Mode) -> Option<Self> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Self::SelectNext,
            KeyCode::Char('k') | KeyCode::Up => Self::SelectPrev,
            KeyCode::Home => Self::SelectFirst,
            KeyCode::End => Self::SelectLast,
            KeyCode::Char('r') => Self::Refresh,
            _ => return Self::for_mode(key, mode),
        };
        Some(action)
    }

    fn for_mode(key: &KeyEvent, mode: Mode) -> Option<Self> {
        match (mode, key.code) {
            (Mode::ListSelection, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right) => {
                Some(Self::DrillIn)
            }
            (Mode::ListSelection, _) => None,
            (Mode::TaskBrowsing, KeyCode::Enter | KeyCode::Right | KeyCode::Char('s')) => {
                Some(Self::DrillIn)
            }
            (_, KeyCode::Backspace | KeyCode::Left) => Some(Self::Back),
            (_, KeyCode::Char(' ')) => Some(Self::ToggleDone),
            (_, KeyCode::Char('n')) => Some(Self::Create),
            (_, KeyCode::Char('e')) => Some(Self::Edit),
            (_, KeyCode::Char('d') | KeyCode::Delete) => Some(Self::Delete),
            (_, KeyCode::Char('c')) => Some(Self::ToggleCompleted),
            _ => None,
        }
    }
}

impl App {
    /// Dispatch a key from the terminal; an unhandled `q` or Ctrl+C quits.
    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        let outcome = self.keypress(key, Instant::now());
        if outcome == KeyOutcome::PassThrough && key.code == KeyCode::Char('q') {
            self.should_quit = true;
        }
    }

    /// Apply `key` to the current mode. Failures land on the status line.
    pub(crate) fn keypress(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        let result = match self.mode {
            Mode::ListSelection | Mode::TaskBrowsing | Mode::SubtaskBrowsing => {
                self.handle_browse(key, now)
            }
            Mode::CreateDialog | Mode::EditDialog => self.handle_editor(key),
            Mode::ConfirmDelete => self.handle_confirm_delete(key),
        };
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(err);
                KeyOutcome::Handled
            }
        }
    }

    fn handle_browse(&mut self, key: KeyEvent, now: Instant) -> Result<KeyOutcome> {
        let Some(action) = BrowseAction::from_event(&key, self.mode) else {
            return Ok(KeyOutcome::PassThrough);
        };
        let listing_lists = self.mode == Mode::ListSelection;

        match action {
            BrowseAction::DrillIn => self.drill_in()?,
            BrowseAction::Back => self.go_back()?,
            BrowseAction::ToggleDone => self.toggle_completion(now),
            BrowseAction::Create => self.begin_create(),
            BrowseAction::Edit => self.begin_edit(),
            BrowseAction::Delete => self.prompt_delete(),
            BrowseAction::Refresh => self.refresh()?,
            BrowseAction::ToggleCompleted => self.toggle_show_completed()?,
            BrowseAction::SelectNext if listing_lists => self.lists.focus_next(),
            BrowseAction::SelectNext => self.items.focus_next(),
            BrowseAction::SelectPrev if listing_lists => self.lists.focus_prev(),
            BrowseAction::SelectPrev => self.items.focus_prev(),
            BrowseAction::SelectFirst if listing_lists => self.lists.focus_first(),
            BrowseAction::SelectFirst => self.items.focus_first(),
            BrowseAction::SelectLast if listing_lists => self.lists.focus_last(),
            BrowseAction::SelectLast => self.items.focus_last(),
        }
        Ok(KeyOutcome::Handled)
    }

    fn handle_editor(&mut self, key: KeyEvent) -> Result<KeyOutcome> {
        match key.code {
            KeyCode::Enter => self.submit_editor()?,
            KeyCode::Esc => self.close_dialog(),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete_char(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            KeyCode::Char(c) => {
                if let Err(err) = self.editor.insert_char(c) {
                    self.set_status_error(err.to_string());
                }
            }
            _ => {}
        }
        Ok(KeyOutcome::Handled)
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent) -> Result<KeyOutcome> {
        match key.code {
            KeyCode::Esc => {
                self.close_dialog();
                self.set_status_info(STATUS_DELETE_CANCELLED);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char(' ') => {
                self.confirm_choice = self.confirm_choice.toggle();
            }
            KeyCode::Char('y') => {
                self.confirm_choice = ConfirmChoice::Yes;
                self.confirm_delete()?;
            }
            KeyCode::Char('n') => {
                self.confirm_choice = ConfirmChoice::No;
                self.confirm_delete()?;
            }
            KeyCode::Enter => self.confirm_delete()?,
            _ => return Ok(KeyOutcome::PassThrough),
        }
        Ok(KeyOutcome::Handled)
    }
}
