/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Move (edge-triggered, one step per press)
///   Start                 →  Restart
///   A                     →  Next level (confirm on the title screen)
///   Select                →  Pause
///   Y                     →  Mute
///
/// Without the `gamepad` feature this compiles to an always-disconnected
/// pad that never yields intents.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::MoveDir;
use super::input::Intent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-input state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    /// Update from a digital level, flagging the rising edge.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set_level(&mut self, held: bool) {
        if held && !self.held { self.just_pressed = true; }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    restart: Vec<Btn>,
    next_level: Vec<Btn>,
    pause: Vec<Btn>,
    mute: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            restart:    vec![Btn::Start],
            next_level: vec![Btn::A],
            pause:      vec![Btn::Select],
            mute:       vec![Btn::Y],
        }
    }
}

/// Direction order shared by the D-pad and stick arrays.
const DIRS: [MoveDir; 4] = [MoveDir::Up, MoveDir::Down, MoveDir::Left, MoveDir::Right];

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad and stick, indexed like DIRS
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    // Action mapping
    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut pad = Self::offline();
        #[cfg(feature = "gamepad")]
        if let Ok(g) = Gilrs::new() {
            pad.connected = g.gamepads().next().is_some();
            pad.gilrs = Some(g);
        }
        pad
    }

    /// A pad with no backend attached.
    fn offline() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Lists with no recognizable button
    /// name keep their default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let rs = parse_list(&cfg.restart);
        if !rs.is_empty() { map.restart = rs; }
        let nl = parse_list(&cfg.next_level);
        if !nl.is_empty() { map.next_level = nl; }
        let pa = parse_list(&cfg.pause);
        if !pa.is_empty() { map.pause = pa; }
        let mu = parse_list(&cfg.mute);
        if !mu.is_empty() { map.mute = mu; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states (gilrs Y axis points up)
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[0].set_level(y > STICK_DEADZONE);
        self.stick[1].set_level(y < -STICK_DEADZONE);
        self.stick[2].set_level(x < -STICK_DEADZONE);
        self.stick[3].set_level(x > STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(0),
            Button::DPadDown  => Some(1),
            Button::DPadLeft  => Some(2),
            Button::DPadRight => Some(3),
            _ => None,
        };
        if let Some(i) = dir {
            self.dpad[i].set_level(held);
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set_level(held);
        }
    }

    // ── Intents (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    /// Intents that fired this frame. At most one move per frame.
    pub fn intents(&self) -> Vec<Intent> {
        let mut out = Vec::new();
        let moved = DIRS.iter().enumerate()
            .find(|(i, _)| self.dpad[*i].just_pressed || self.stick[*i].just_pressed)
            .map(|(_, d)| *d);
        if let Some(d) = moved {
            out.push(Intent::Move(d));
        }
        let map = &self.action_map;
        if self.any_just_pressed(&map.restart) { out.push(Intent::Restart); }
        if self.any_just_pressed(&map.next_level) { out.push(Intent::NextLevel); }
        if self.any_just_pressed(&map.pause) { out.push(Intent::TogglePause); }
        if self.any_just_pressed(&map.mute) { out.push(Intent::ToggleMute); }
        out
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn button_names_parse_case_insensitively() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("lb"), Some(Btn::L1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_only_recognized_lists() {
        let mut pad = GamepadState::offline();
        pad.load_button_config(&GamepadConfig {
            restart: names(&["X"]),
            next_level: names(&["nonsense"]),
            pause: names(&["Start", "Select"]),
            mute: vec![],
        });
        assert_eq!(pad.action_map.restart, vec![Btn::X]);
        assert_eq!(pad.action_map.next_level, vec![Btn::A]);
        assert_eq!(pad.action_map.pause, vec![Btn::Start, Btn::Select]);
        assert_eq!(pad.action_map.mute, vec![Btn::Y]);
    }

    #[test]
    fn rising_edges_become_intents() {
        let mut pad = GamepadState::offline();
        pad.dpad[2].set_level(true);
        pad.buttons[btn_index(Btn::Y)].set_level(true);
        assert_eq!(pad.intents(), vec![Intent::Move(MoveDir::Left), Intent::ToggleMute]);

        // Still held next frame: nothing new.
        pad.clear_just_pressed();
        pad.dpad[2].set_level(true);
        assert!(pad.intents().is_empty());
    }
}
