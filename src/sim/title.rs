/// Start screen: a two-entry menu shown before the first level.
///
/// Up/Down move the selection (wrapping), confirm activates it. "Start"
/// loads level 1 and enters play; "Controls" toggles the key reference
/// panel, which back (Esc) also closes.

use tracing::info;

use crate::sim::level::{load_level, LevelDescriptor, LevelError};
use crate::sim::world::{Phase, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    Start,
    Controls,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Start, MenuItem::Controls];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Start => "Start",
            MenuItem::Controls => "Controls",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TitleMenu {
    pub selected: usize,
    pub showing_controls: bool,
}

impl TitleMenu {
    pub fn selected_item(&self) -> MenuItem {
        MenuItem::ALL[self.selected % MenuItem::ALL.len()]
    }

    pub fn move_selection(&mut self, delta: i32) {
        let n = MenuItem::ALL.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(n) as usize;
    }

    /// Close the controls panel if open.
    pub fn back(&mut self) {
        self.showing_controls = false;
    }
}

/// Enter the start screen with the selection on "Start".
pub fn show_title(world: &mut WorldState) {
    world.phase = Phase::Title;
    world.title = TitleMenu::default();
    world.paused = false;
}

/// Activate the selected entry. Returns true when play begins.
pub fn confirm_title(world: &mut WorldState, levels: &[LevelDescriptor]) -> Result<bool, LevelError> {
    if world.phase != Phase::Title { return Ok(false); }
    match world.title.selected_item() {
        MenuItem::Start => {
            load_level(world, levels, 0)?;
            info!("game started from title");
            Ok(true)
        }
        MenuItem::Controls => {
            world.title.showing_controls = !world.title.showing_controls;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedConfig;
    use crate::domain::entity::MoveDir;
    use crate::sim::level::builtin_levels;
    use crate::sim::movement::try_move_player;
    use crate::sim::step::{step, toggle_pause};

    fn title_world() -> (WorldState, Vec<LevelDescriptor>) {
        let levels = builtin_levels();
        let mut w = WorldState::new(SpeedConfig::default());
        load_level(&mut w, &levels, 0).unwrap();
        show_title(&mut w);
        (w, levels)
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut m = TitleMenu::default();
        assert_eq!(m.selected_item(), MenuItem::Start);
        m.move_selection(-1);
        assert_eq!(m.selected_item(), MenuItem::Controls);
        m.move_selection(1);
        assert_eq!(m.selected_item(), MenuItem::Start);
        m.move_selection(3);
        assert_eq!(m.selected_item(), MenuItem::Controls);
    }

    #[test]
    fn controls_entry_toggles_panel_and_back_closes_it() {
        let (mut w, levels) = title_world();
        w.title.move_selection(1);
        assert!(!confirm_title(&mut w, &levels).unwrap());
        assert!(w.title.showing_controls);
        assert!(!confirm_title(&mut w, &levels).unwrap());
        assert!(!w.title.showing_controls);

        confirm_title(&mut w, &levels).unwrap();
        w.title.back();
        assert!(!w.title.showing_controls);
        assert_eq!(w.phase, Phase::Title);
    }

    #[test]
    fn start_enters_play_on_level_one() {
        let (mut w, levels) = title_world();
        assert!(confirm_title(&mut w, &levels).unwrap());
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.current_level, 0);
        assert!(w.player.is_some());
        // Only acts from the title screen
        assert!(!confirm_title(&mut w, &levels).unwrap());
    }

    #[test]
    fn title_blocks_moves_pause_and_ticks() {
        let (mut w, _) = title_world();
        let before = w.player_pos();
        assert!(try_move_player(&mut w, MoveDir::Right).is_empty());
        assert!(!toggle_pause(&mut w));
        assert!(step(&mut w, 500.0).is_empty());
        assert_eq!(w.player_pos(), before);
        assert_eq!(w.phase, Phase::Title);
    }
}
