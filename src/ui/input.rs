/// Keyboard sampling: terminal key events -> sim input frames.
///
/// Terminals report presses (and auto-repeats) but usually no releases,
/// so "held" is approximated: a key counts as held until HOLD_TIMEOUT
/// passes without another press/repeat event. Terminals that do report
/// releases simply clear the key early.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::domain::entity::InputFrame;

/// After this long without a press/repeat, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct Keyboard {
    /// Timestamp of the last press/repeat event per key.
    held: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last poll.
    pressed: Vec<KeyCode>,
    quit: bool,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard {
            held: HashMap::with_capacity(16),
            pressed: Vec::with_capacity(8),
            quit: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn poll_events(&mut self) {
        self.pressed.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Release {
                    let _ = self.held.remove(&key.code);
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
                {
                    self.quit = true;
                }
                if !self.is_held(key.code) {
                    self.pressed.push(key.code);
                }
                let _ = self.held.insert(key.code, Instant::now());
            }
        }

        // Expire keys on terminals that never report releases.
        let now = Instant::now();
        self.held.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held? Used for continuous actions.
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.get(&code).map_or(false, |t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed since the last poll? Used for one-shot
    /// meta actions (menu confirm, retry).
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Snapshot the held state of every sim action for this tick. The sim
    /// derives its own edges by comparing consecutive frames.
    pub fn frame(&self) -> InputFrame {
        InputFrame {
            left: self.is_held(KeyCode::Left),
            right: self.is_held(KeyCode::Right),
            up: self.is_held(KeyCode::Up),
            down: self.is_held(KeyCode::Down),
            jump: self.is_held(KeyCode::Char(' ')),
            dig_left: self.any_held(&[KeyCode::Char('z'), KeyCode::Char('Z')]),
            dig_right: self.any_held(&[KeyCode::Char('x'), KeyCode::Char('X')]),
            dig_up: self.any_held(&[KeyCode::Char('s'), KeyCode::Char('S')]),
            puddle: self.any_held(&[KeyCode::Char('p'), KeyCode::Char('P')]),
        }
    }
}
