//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{can_add_name_char, AddPlayerFocus, App, AppState, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            Ok(false)
        }
        AppState::ConfirmingQuit => Ok(handle_quit_confirmation(app, key)),
        AppState::ConfirmingDelete => {
            if confirm(app, key) {
                app.delete_selected_player().await;
            }
            Ok(false)
        }
        AppState::ConfirmingRemoveTable => {
            if confirm(app, key) {
                app.remove_active_table().await;
            }
            Ok(false)
        }
        AppState::Searching => {
            handle_search_input(app, key);
            Ok(false)
        }
        AppState::AddingPlayer => {
            handle_add_player_input(app, key).await;
            Ok(false)
        }
        AppState::AddingTable => {
            handle_add_table_input(app, key).await;
            Ok(false)
        }
        AppState::Quitting => Ok(true),
        AppState::Normal => handle_normal_input(app, key).await,
    }
}

async fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('/') => {
            app.start_search();
        }
        KeyCode::Esc => {
            if app.grabbed.is_some() {
                app.release_grab();
            } else {
                app.clear_search();
                app.status_message = None;
            }
        }

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.selection = 0,
        KeyCode::End => app.select_last(),
        KeyCode::Left | KeyCode::Char('[') => app.prev_table(),
        KeyCode::Right | KeyCode::Char(']') => app.next_table(),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                app.select_table(digit as usize - 1);
            }
        }

        // Roster actions
        KeyCode::Char('s') | KeyCode::Enter => app.toggle_selected_status().await,
        KeyCode::Char('r') => app.suicide_king_selected().await,
        KeyCode::Char(' ') => app.grab_or_swap().await,
        KeyCode::Char('a') => app.start_add_player(),
        KeyCode::Char('t') => app.start_add_table(),
        KeyCode::Char('d') => {
            if app.selected_member().is_some() {
                app.state = AppState::ConfirmingDelete;
            }
        }
        KeyCode::Char('X') => {
            app.state = AppState::ConfirmingRemoveTable;
        }
        _ => {}
    }
    Ok(false)
}

/// Returns true if the user confirmed. Either way a decisive key closes the dialog.
fn confirm(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.state = AppState::Normal;
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
            false
        }
        _ => false,
    }
}

fn handle_quit_confirmation(app: &mut App, key: KeyEvent) -> bool {
    if confirm(app, key) {
        app.state = AppState::Quitting;
        return true;
    }
    false
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.clear_search();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.selection = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.selection = 0;
        }
        _ => {}
    }
}

async fn handle_add_player_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.status_message = None;
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.add_player_focus = app.add_player_focus.toggle();
        }
        KeyCode::Enter => app.submit_new_player().await,
        KeyCode::Left if app.add_player_focus == AddPlayerFocus::Class => {
            app.new_player_class = app.new_player_class.prev();
        }
        KeyCode::Right if app.add_player_focus == AddPlayerFocus::Class => {
            app.new_player_class = app.new_player_class.next();
        }
        KeyCode::Backspace if app.add_player_focus == AddPlayerFocus::Name => {
            app.new_player_name.pop();
        }
        KeyCode::Char(c) if app.add_player_focus == AddPlayerFocus::Name => {
            if can_add_name_char(app.new_player_name.chars().count(), c) {
                app.new_player_name.push(c);
            }
        }
        _ => {}
    }
}

async fn handle_add_table_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.status_message = None;
        }
        KeyCode::Enter => app.submit_new_table().await,
        KeyCode::Backspace => {
            app.new_table_name.pop();
        }
        KeyCode::Char(c) => {
            if can_add_name_char(app.new_table_name.chars().count(), c) {
                app.new_table_name.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidking_core::{AttendanceStatus, Change, Config, Guild, RosterSink, WowClass};

    struct NullSink;

    impl RosterSink for NullSink {
        fn apply(&mut self, _changes: &[Change]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn app_with(names: &[&str]) -> App {
        let mut guild = Guild::new();
        for name in names {
            guild.add_player(name, WowClass::Rogue).unwrap();
        }
        App::with_sink(Config::default(), guild, NullSink)
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::from(code)).await.unwrap()
    }

    async fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let mut app = app_with(&[]);
        assert!(!press(&mut app, KeyCode::Char('q')).await);
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')).await);
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q')).await;
        assert!(press(&mut app, KeyCode::Char('y')).await);
        assert_eq!(app.state, AppState::Quitting);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_add_player_form_keys() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a')).await;
        type_str(&mut app, "Uther").await;
        press(&mut app, KeyCode::Tab).await;
        // Warrior wraps to Death Knight
        press(&mut app, KeyCode::Right).await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.state, AppState::Normal);
        let member = app.selected_member().unwrap();
        assert_eq!(member.name, "Uther");
        assert_eq!(member.class, WowClass::DeathKnight);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_name_input_is_capped() {
        let mut app = app_with(&[]);
        press(&mut app, KeyCode::Char('a')).await;
        type_str(&mut app, &"x".repeat(40)).await;
        assert_eq!(app.new_player_name.chars().count(), crate::app::MAX_NAME_LENGTH);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_status_key_cycles_attendance() {
        let mut app = app_with(&["A"]);
        press(&mut app, KeyCode::Char('s')).await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.selected_member().unwrap().status, AttendanceStatus::Missing);
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_delete_cancelled_keeps_player() {
        let mut app = app_with(&["A"]);
        press(&mut app, KeyCode::Char('d')).await;
        assert_eq!(app.state, AppState::ConfirmingDelete);
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.visible_members().len(), 1);

        press(&mut app, KeyCode::Char('d')).await;
        press(&mut app, KeyCode::Char('y')).await;
        assert!(app.visible_members().is_empty());
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_add_table_and_switch_with_number_keys() {
        let mut app = app_with(&["A"]);
        press(&mut app, KeyCode::Char('t')).await;
        type_str(&mut app, "Alt Raid").await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.active_table_name(), "Alt Raid");
        // New table includes the existing player
        assert_eq!(app.visible_members().len(), 1);

        press(&mut app, KeyCode::Char('1')).await;
        assert_eq!(app.active_table, 0);
        press(&mut app, KeyCode::Char('9')).await;
        assert_eq!(app.active_table, 0);
        app.shutdown().await;
    }
}
