use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::theme::save_theme;
use crate::tui_app::{App, InputMode, View};

pub fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            // Ctrl+C always quits
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                app.should_quit = true;
                return Ok(());
            }

            match app.input_mode {
                InputMode::Search => handle_search_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code),
            }
        }
    }
    Ok(())
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_query.clear();
            app.apply_filter();
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.apply_filter();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.apply_filter();
        }
        _ => {}
    }
}

fn handle_normal_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('u') => app.page_up(),
        KeyCode::Char('d') => app.page_down(),
        KeyCode::Char('g') => app.go_home(),
        KeyCode::Char('G') => app.go_end(),
        KeyCode::Tab | KeyCode::Char('p') => app.next_source(),
        KeyCode::Char('/') => {
            if app.view == View::Projects {
                app.input_mode = InputMode::Search;
                app.search_query.clear();
            }
        }
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('t') => {
            app.theme = app.theme.next();
            save_theme(app.theme);
        }
        KeyCode::Char('1') => app.view = View::Dashboard,
        KeyCode::Char('2') => app.view = View::Projects,
        KeyCode::Char('3') => app.view = View::Models,
        KeyCode::Right | KeyCode::Char('l') => {
            app.view = match app.view {
                View::Dashboard => View::Projects,
                View::Projects => View::Models,
                View::Models => View::Dashboard,
            };
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.view = match app.view {
                View::Dashboard => View::Models,
                View::Projects => View::Dashboard,
                View::Models => View::Projects,
            };
        }
        _ => {}
    }
}
