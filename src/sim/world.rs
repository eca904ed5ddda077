/// WorldState: the complete snapshot of a running level.
///
/// ## Entity storage
///
/// Every entity lives in `registry`. The player's id is cached in
/// `player` so the hot path never searches for it. The registry is
/// cleared and rebuilt wholesale on every load / restart; nothing
/// carries over between levels except session flags (`muted`).
///
/// ## Deferred transitions
///
/// Nothing is scheduled outside the tick. Delays are countdown fields
/// decremented by `step()`:
///   - `Container::fall_in`: push onto a hole → container fall start
///   - `game_over_in`: player fall start → Lost

use crate::config::SpeedConfig;
use crate::domain::entity::{Entity, EntityId, Player, Position};
use crate::domain::registry::Registry;
use crate::sim::title::TitleMenu;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Start screen; the loaded level sits untouched behind it.
    Title,
    Playing,
    Won,
    Lost,
}

pub struct WorldState {
    // ── Level ──
    pub registry: Registry,
    pub player: Option<EntityId>,
    pub width: usize,
    pub height: usize,

    // ── Speed config ──
    pub speed: SpeedConfig,

    // ── Meta ──
    pub phase: Phase,
    pub current_level: usize,
    pub total_levels: usize,
    pub level_id: u32,
    pub level_name: String,
    pub level_text: String,
    pub tick: u64,

    // ── Deferred ──
    /// Milliseconds until the game is lost; set when the player starts falling.
    pub game_over_in: Option<f32>,

    // ── UI ──
    pub message: String,
    pub message_timer: f32,
    pub title: TitleMenu,

    // ── Session flags ──
    pub paused: bool,
    pub muted: bool,
}

// ── Construction ──

impl WorldState {
    pub fn new(speed: SpeedConfig) -> Self {
        WorldState {
            registry: Registry::new(),
            player: None,
            width: 0,
            height: 0,
            speed,
            phase: Phase::Playing,
            current_level: 0,
            total_levels: 0,
            level_id: 0,
            level_name: String::new(),
            level_text: String::new(),
            tick: 0,
            game_over_in: None,
            message: String::new(),
            message_timer: 0.0,
            title: TitleMenu::default(),
            paused: false,
            muted: false,
        }
    }

    pub fn set_message(&mut self, msg: &str, duration_ms: f32) {
        self.message = msg.to_string();
        self.message_timer = duration_ms;
    }
}

// ── Queries ──

impl WorldState {
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.registry.get(id))
    }

    pub fn player_state(&self) -> Option<&Player> {
        self.player_entity().and_then(|e| e.as_player())
    }

    pub fn player_pos(&self) -> Option<Position> {
        self.player_entity().map(|e| e.pos)
    }

    pub fn inventory(&self) -> u32 {
        self.player_state().map_or(0, |p| p.inventory)
    }

    /// Not in play (title, won or lost): no moves, no evaluation.
    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }
}

// ── Test fixtures ──

#[cfg(test)]
impl WorldState {
    /// Build a world from a string diagram.
    /// Legend:  'P'=Player  '#'=Wall  'C'=Container(cap 0)  '1'..'9'=Container(cap n)
    ///         'O'=Hole (with dormant stone)  'T'=Trigger  '$'=Collectible
    ///         'G'=Container goal  'B'=Container(cap 0) on a container goal
    ///         'A'=Actor goal  ' '=Empty
    pub fn from_diagram(rows: &[&str]) -> Self {
        use crate::domain::entity::{Body, GoalKind};
        use crate::domain::growth::Growth;

        let mut w = WorldState::new(SpeedConfig::default());
        w.height = rows.len();
        w.width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x, y);
                let reg = &mut w.registry;
                match ch {
                    'P' => w.player = Some(reg.spawn(Entity::player(pos))),
                    '#' => { reg.spawn(Entity::new(pos, Body::Wall)); }
                    'C' => { reg.spawn(Entity::container(pos, 0)); }
                    '1'..='9' => {
                        let cap = ch.to_digit(10).unwrap_or(0);
                        reg.spawn(Entity::container(pos, cap));
                    }
                    'O' => {
                        reg.spawn(Entity::new(pos, Body::Hole));
                        reg.spawn(Entity::new(pos, Body::SteppingStone(Growth::default())));
                    }
                    'T' => { reg.spawn(Entity::new(pos, Body::Trigger(Default::default()))); }
                    '$' => { reg.spawn(Entity::new(pos, Body::Collectible(Default::default()))); }
                    'G' => { reg.spawn(Entity::goal(pos, GoalKind::Container)); }
                    'B' => {
                        reg.spawn(Entity::goal(pos, GoalKind::Container));
                        reg.spawn(Entity::container(pos, 0));
                    }
                    'A' => { reg.spawn(Entity::goal(pos, GoalKind::Actor)); }
                    _ => {}
                }
            }
        }
        w
    }
}
