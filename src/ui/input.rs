/// Keyboard input: raw terminal key events → discrete intents.
///
/// Every intent is edge-triggered. A held key fires once, then not again
/// until it has been released. Release comes from crossterm's keyboard
/// enhancement when the terminal supports it; otherwise a key counts as
/// released once no Press/Repeat has arrived for `HOLD_TIMEOUT`.
///
/// Key map:
///   Arrows / WASD   →  Move
///   R               →  Restart
///   N               →  Next level (after a win)
///   Enter / Space   →  Confirm (title menu; next level after a win)
///   Esc / P         →  Toggle pause
///   M               →  Toggle mute
///   Q / Ctrl+C      →  Quit

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::MoveDir;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// What the player asked for, decoded from keys or gamepad buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Move(MoveDir),
    Restart,
    NextLevel,
    Confirm,
    TogglePause,
    ToggleMute,
    Quit,
}

/// Fixed keyboard binding.
pub fn intent_for(code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Intent::Quit),
            _ => None,
        };
    }
    match code {
        KeyCode::Up    | KeyCode::Char('w') | KeyCode::Char('W') => Some(Intent::Move(MoveDir::Up)),
        KeyCode::Down  | KeyCode::Char('s') | KeyCode::Char('S') => Some(Intent::Move(MoveDir::Down)),
        KeyCode::Left  | KeyCode::Char('a') | KeyCode::Char('A') => Some(Intent::Move(MoveDir::Left)),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Intent::Move(MoveDir::Right)),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Intent::Restart),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Intent::NextLevel),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Intent::Confirm),
        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Some(Intent::TogglePause),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Intent::ToggleMute),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Intent::Quit),
        _ => None,
    }
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Intents from keys that went "not held" → "held" during the most
    /// recent drain_events() call, in arrival order.
    fresh: Vec<Intent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.feed(key, Instant::now());
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Intents that fired this frame.
    pub fn intents(&self) -> &[Intent] {
        &self.fresh
    }

    fn feed(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Not trusted without enhancement; rely on timeout-based expiry
            }
            _ => {
                let was_held = self.last_active
                    .get(&key.code)
                    .is_some_and(|t| now.duration_since(*t) < HOLD_TIMEOUT);
                self.last_active.insert(key.code, now);
                if was_held { return; }
                if let Some(intent) = intent_for(key.code, key.modifiers) {
                    self.fresh.push(intent);
                }
            }
        }
    }
}
