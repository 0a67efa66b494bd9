use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Instance tabs
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_instance();
            } else {
                app.next_instance();
            }
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.prev_instance(),
        KeyCode::Right | KeyCode::Char('l') => app.next_instance(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if index < app.instances.len() {
                app.selected_instance = index;
                app.select_first();
            }
        }

        // Metric selection
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('r') => app.refresh_selected(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app_with(&[Some("{}")]).await;
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_help_swallows_next_key() {
        let mut app = app_with(&[Some("{}")]).await;
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);

        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[tokio::test]
    async fn test_tab_and_digits_switch_instance() {
        let mut app = app_with(&[Some("{}"), Some("{}"), Some("{}")]).await;

        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.selected_instance, 1);
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.selected_instance, 0);
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.selected_instance, 2);
        handle_key_event(&mut app, key(KeyCode::Char('9')));
        assert_eq!(app.selected_instance, 2);
    }

    #[tokio::test]
    async fn test_space_toggles_selected_metric() {
        let mut app = app_with(&[Some("{}")]).await;
        handle_key_event(&mut app, key(KeyCode::Down));
        handle_key_event(&mut app, key(KeyCode::Char(' ')));

        let entity = app.selected_entity().unwrap();
        assert_eq!(entity.key(), "hashrate1m");
        assert!(!entity.is_enabled());
    }

    #[tokio::test]
    async fn test_scroll_moves_selection() {
        let mut app = app_with(&[Some("{}")]).await;
        let scroll = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };

        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollDown));
        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollDown));
        handle_mouse_event(&mut app, scroll(MouseEventKind::ScrollUp));
        assert_eq!(app.selected_metric, 1);
    }
}
