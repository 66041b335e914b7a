use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

/// Logical actions. The game states consume these, never raw key events;
/// one key press may carry more than one meaning (Up is thrust in-game and
/// cursor movement in menus) and each state picks out what it understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    EngineOn,
    EngineOff,
    TurnLeft,
    TurnRight,
    Fire,
    Hyperspace,
    Confirm,
    Cancel,
    NavUp,
    NavDown,
    Quit,
}

fn decode(key: &KeyEvent, actions: &mut Vec<Action>) {
    if key.kind == KeyEventKind::Release {
        // Release events only arrive on terminals that report them; the
        // engine also cuts out on its own when no press repeats come in.
        if key.code == KeyCode::Up {
            actions.push(Action::EngineOff);
        }
        return;
    }
    match key.code {
        KeyCode::Up => {
            actions.push(Action::EngineOn);
            actions.push(Action::NavUp);
        }
        KeyCode::Down => actions.push(Action::NavDown),
        KeyCode::Left => actions.push(Action::TurnLeft),
        KeyCode::Right => actions.push(Action::TurnRight),
        KeyCode::Char(' ') => actions.push(Action::Fire),
        KeyCode::Char('h') => actions.push(Action::Hyperspace),
        KeyCode::Enter => actions.push(Action::Confirm),
        KeyCode::Esc => actions.push(Action::Cancel),
        KeyCode::Char('q') => actions.push(Action::Quit),
        _ => {}
    }
}

/// Drains every pending terminal event into logical actions, blocking at
/// most `timeout` for the first one.
pub fn poll_actions(timeout: Duration) -> io::Result<Vec<Action>> {
    let mut actions = Vec::new();
    if !event::poll(timeout)? {
        return Ok(actions);
    }
    loop {
        match event::read()? {
            Event::Key(key) => decode(&key, &mut actions),
            _ => {}
        }
        if !event::poll(Duration::from_millis(0))? {
            break;
        }
    }
    Ok(actions)
}
