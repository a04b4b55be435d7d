//! Tests for TUI input handling (dispatch layer).
//!
//! Tests the key-to-message mapping for the board and help modes, and the
//! gg chord machinery.

mod test_utils;
use test_utils::FakeRepository;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use std::sync::Arc;
use taigazer::tui::input::{dispatch, InputState};
use taigazer::tui::{App, Message};

fn key_event(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

fn key_event_ctrl(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

fn make_app() -> App {
    App::new(Arc::new(FakeRepository::new()), None)
}

mod input_state {
    use super::*;

    #[test]
    fn test_new_state_has_no_pending() {
        let input = InputState::new();
        assert!(input.pending.is_none());
        assert!(input.pending_since.is_none());
    }

    #[test]
    fn test_set_and_clear_pending() {
        let mut input = InputState::new();
        input.set_pending(KeyCode::Char('g'));
        assert!(input.pending.is_some());
        assert!(input.pending_since.is_some());

        input.clear();
        assert!(input.pending.is_none());
        assert!(input.pending_since.is_none());
    }

    #[test]
    fn test_timeout_not_immediate() {
        let mut input = InputState::new();
        input.set_pending(KeyCode::Char('g'));
        assert!(!input.has_timed_out());
    }
}

mod normal_mode {
    use super::*;

    #[test]
    fn test_basic_keys() {
        let app = make_app();
        let mut input = InputState::new();

        let cases = [
            (KeyCode::Char('q'), Message::Quit),
            (KeyCode::Char('j'), Message::MoveDown),
            (KeyCode::Down, Message::MoveDown),
            (KeyCode::Char('k'), Message::MoveUp),
            (KeyCode::Up, Message::MoveUp),
            (KeyCode::Char('G'), Message::GotoBottom),
            (KeyCode::Enter, Message::ToggleSection),
            (KeyCode::Char(' '), Message::ToggleSection),
            (KeyCode::Char('m'), Message::LoadMore),
            (KeyCode::Char('r'), Message::Reload),
            (KeyCode::Char('b'), Message::ToggleScope),
            (KeyCode::Char('?'), Message::ToggleHelp),
            (KeyCode::Char('x'), Message::None),
        ];

        for (code, expected) in cases {
            assert_eq!(dispatch(&app, &mut input, key_event(code)), expected);
        }
    }

    #[test]
    fn test_ctrl_paging() {
        let app = make_app();
        let mut input = InputState::new();

        assert_eq!(
            dispatch(&app, &mut input, key_event_ctrl(KeyCode::Char('d'))),
            Message::PageDown
        );
        assert_eq!(
            dispatch(&app, &mut input, key_event_ctrl(KeyCode::Char('u'))),
            Message::PageUp
        );
    }

    #[test]
    fn test_gg_chord_goes_to_top() {
        let app = make_app();
        let mut input = InputState::new();

        // First g only arms the chord
        assert_eq!(
            dispatch(&app, &mut input, key_event(KeyCode::Char('g'))),
            Message::None
        );
        assert!(input.pending.is_some());

        // Second g completes it
        assert_eq!(
            dispatch(&app, &mut input, key_event(KeyCode::Char('g'))),
            Message::GotoTop
        );
        assert!(input.pending.is_none());
    }

    #[test]
    fn test_broken_chord_is_noop() {
        let app = make_app();
        let mut input = InputState::new();

        dispatch(&app, &mut input, key_event(KeyCode::Char('g')));
        assert_eq!(
            dispatch(&app, &mut input, key_event(KeyCode::Char('j'))),
            Message::None
        );
        assert!(input.pending.is_none());
    }
}

mod help_mode {
    use super::*;

    fn help_app() -> App {
        let mut app = make_app();
        app.show_help = true;
        app
    }

    #[test]
    fn test_close_keys() {
        let mut input = InputState::new();
        for code in [KeyCode::Esc, KeyCode::Char('?'), KeyCode::Char('q')] {
            let app = help_app();
            assert_eq!(dispatch(&app, &mut input, key_event(code)), Message::CloseModal);
        }
    }

    #[test]
    fn test_board_keys_inert_in_help() {
        let app = help_app();
        let mut input = InputState::new();
        assert_eq!(
            dispatch(&app, &mut input, key_event(KeyCode::Char('m'))),
            Message::None
        );
        assert_eq!(
            dispatch(&app, &mut input, key_event(KeyCode::Char('r'))),
            Message::None
        );
    }
}

mod update {
    use super::*;

    #[test]
    fn test_quit_message_quits() {
        let mut app = make_app();
        assert!(app.update(Message::Quit));
        assert!(!app.update(Message::None));
    }

    #[test]
    fn test_help_toggle_round_trip() {
        let mut app = make_app();
        assert!(!app.show_help);
        app.update(Message::ToggleHelp);
        assert!(app.show_help);
        app.update(Message::CloseModal);
        assert!(!app.show_help);
    }

    #[test]
    fn test_navigation_on_empty_board_is_safe() {
        let mut app = make_app();
        app.update(Message::MoveDown);
        app.update(Message::GotoBottom);
        app.update(Message::ToggleSection);
        assert_eq!(app.visual_selected, 0);
    }
}
