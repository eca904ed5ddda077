/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels_dir/*.json` (sorted by file name)
///   2. Built-in levels compiled into the binary (`assets/levels.json`)
///
/// ## Descriptor format (JSON, camelCase, the level editor's export):
///   ```json
///   { "id": 1, "name": "First Steps", "gridWidth": 12, "gridHeight": 10,
///     "playerStart": {"x": 1, "y": 1},
///     "containers": [{"x": 3, "y": 2, "capacity": 1}],
///     "holes": [], "walls": [], "collectibles": [], "triggers": [],
///     "goals": [{"x": 9, "y": 3}, {"x": 1, "y": 8, "type": "player"}],
///     "levelText": "..." }
///   ```
///   Editor aliases: `s3Buckets` = containers, `files` = collectibles,
///   `stepFunctions` = triggers. Goal type `s3bucket` (default) or `player`.
///   A file holds one descriptor or an array of them.
///
/// Every hole gets a dormant stepping stone on the same cell.
///
/// Loading validates first and only then replaces the world, so a bad
/// descriptor never leaves a half-built level behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{Body, Entity, EntityId, GoalKind, Position};
use crate::domain::growth::Growth;
use crate::domain::kind::EntityKind;
use crate::domain::registry::Registry;
use crate::sim::world::{Phase, WorldState};

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

// ══════════════════════════════════════════════════════════════
// Descriptor
// ══════════════════════════════════════════════════════════════

/// Grid cell as written in the file. Signed so that negative coordinates
/// surface as an out-of-bounds error instead of a parse error.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerSpec {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub capacity: u32,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GoalType {
    #[default]
    #[serde(rename = "s3bucket", alias = "container")]
    Container,
    #[serde(rename = "player", alias = "actor")]
    Actor,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoalSpec {
    pub x: i64,
    pub y: i64,
    #[serde(default, rename = "type")]
    pub kind: GoalType,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LevelDescriptor {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub grid_width: usize,
    pub grid_height: usize,
    #[serde(default)]
    pub player_start: Option<Cell>,
    #[serde(default, alias = "s3Buckets", alias = "blocks")]
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub holes: Vec<Cell>,
    #[serde(default)]
    pub walls: Vec<Cell>,
    #[serde(default, alias = "files")]
    pub collectibles: Vec<Cell>,
    #[serde(default, alias = "stepFunctions")]
    pub triggers: Vec<Cell>,
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
    #[serde(default)]
    pub level_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LevelFile {
    Many(Vec<LevelDescriptor>),
    One(Box<LevelDescriptor>),
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level descriptor is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("level has a zero-sized grid ({width}x{height})")]
    ZeroSize { width: usize, height: usize },
    #[error("level has no player start")]
    MissingPlayerStart,
    #[error("{what} at ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds { what: &'static str, x: i64, y: i64, width: usize, height: usize },
    #[error("two blocking entities share cell ({x}, {y})")]
    Overlap { x: usize, y: usize },
    #[error("level has no goals")]
    NoGoals,
    #[error("no level with index {0}")]
    UnknownLevel(usize),
}

// ══════════════════════════════════════════════════════════════
// Validation and registry construction
// ══════════════════════════════════════════════════════════════

impl LevelDescriptor {
    fn cell(&self, what: &'static str, x: i64, y: i64) -> Result<Position, LevelError> {
        let (w, h) = (self.grid_width, self.grid_height);
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            return Err(LevelError::OutOfBounds { what, x, y, width: w, height: h });
        }
        Ok(Position::new(x as usize, y as usize))
    }

    /// Check the descriptor and resolve every entry to a grid cell.
    pub fn layout(&self) -> Result<Layout, LevelError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(LevelError::ZeroSize { width: self.grid_width, height: self.grid_height });
        }
        let start = self.player_start.ok_or(LevelError::MissingPlayerStart)?;
        let player = self.cell(EntityKind::Player.name(), start.x, start.y)?;
        if self.goals.is_empty() {
            return Err(LevelError::NoGoals);
        }

        let mut blocked: HashSet<Position> = HashSet::new();
        let mut claim = |pos: Position| -> Result<Position, LevelError> {
            if !blocked.insert(pos) {
                return Err(LevelError::Overlap { x: pos.x, y: pos.y });
            }
            Ok(pos)
        };
        claim(player)?;

        let cells = |what: EntityKind, list: &[Cell]| -> Result<Vec<Position>, LevelError> {
            list.iter().map(|c| self.cell(what.name(), c.x, c.y)).collect()
        };

        let mut walls = Vec::with_capacity(self.walls.len());
        for pos in cells(EntityKind::Wall, &self.walls)? {
            walls.push(claim(pos)?);
        }
        let mut containers = Vec::with_capacity(self.containers.len());
        for c in &self.containers {
            let pos = self.cell(EntityKind::Container.name(), c.x, c.y)?;
            containers.push((claim(pos)?, c.capacity));
        }
        let goals = self.goals.iter()
            .map(|g| {
                let kind = match g.kind {
                    GoalType::Container => GoalKind::Container,
                    GoalType::Actor => GoalKind::Actor,
                };
                Ok((self.cell(EntityKind::Goal.name(), g.x, g.y)?, kind))
            })
            .collect::<Result<Vec<_>, LevelError>>()?;

        Ok(Layout {
            player,
            walls,
            containers,
            holes: cells(EntityKind::Hole, &self.holes)?,
            triggers: cells(EntityKind::Trigger, &self.triggers)?,
            collectibles: cells(EntityKind::Collectible, &self.collectibles)?,
            goals,
        })
    }
}

/// A validated descriptor: every position is inside the grid and no two
/// blockers share a cell.
#[derive(Debug)]
pub struct Layout {
    player: Position,
    walls: Vec<Position>,
    containers: Vec<(Position, u32)>,
    holes: Vec<Position>,
    triggers: Vec<Position>,
    collectibles: Vec<Position>,
    goals: Vec<(Position, GoalKind)>,
}

impl Layout {
    /// Empty `reg` and fill it with this level. Returns the player's id.
    pub fn spawn_into(&self, reg: &mut Registry) -> EntityId {
        reg.clear();
        let player = reg.spawn(Entity::player(self.player));
        for &pos in &self.walls {
            reg.spawn(Entity::new(pos, Body::Wall));
        }
        for &(pos, capacity) in &self.containers {
            reg.spawn(Entity::container(pos, capacity));
        }
        for &pos in &self.holes {
            reg.spawn(Entity::new(pos, Body::Hole));
            reg.spawn(Entity::new(pos, Body::SteppingStone(Growth::default())));
        }
        for &pos in &self.triggers {
            reg.spawn(Entity::new(pos, Body::Trigger(Default::default())));
        }
        for &pos in &self.collectibles {
            reg.spawn(Entity::new(pos, Body::Collectible(Default::default())));
        }
        for &(pos, kind) in &self.goals {
            reg.spawn(Entity::goal(pos, kind));
        }
        player
    }
}

// ══════════════════════════════════════════════════════════════
// Public API: loading into the world
// ══════════════════════════════════════════════════════════════

/// Load level `idx` into the world. On error the world is left untouched.
/// Session flags (`muted`) survive; everything level-scoped is reset.
pub fn load_level(world: &mut WorldState, levels: &[LevelDescriptor], idx: usize) -> Result<(), LevelError> {
    let def = levels.get(idx).ok_or(LevelError::UnknownLevel(idx))?;
    let layout = def.layout()?;

    world.player = Some(layout.spawn_into(&mut world.registry));
    world.width = def.grid_width;
    world.height = def.grid_height;
    world.phase = Phase::Playing;
    world.paused = false;
    world.game_over_in = None;
    world.current_level = idx;
    world.total_levels = levels.len();
    world.level_id = def.id;
    world.level_name = def.name.clone();
    world.level_text = def.level_text.clone();
    world.tick = 0;
    world.set_message(&format!("Level {}: {}", def.id, def.name), 2000.0);

    info!(
        idx, id = def.id, name = %def.name,
        width = def.grid_width, height = def.grid_height,
        containers = def.containers.len(), holes = def.holes.len(),
        goals = def.goals.len(), stones = world.registry.count(EntityKind::SteppingStone),
        "level loaded"
    );
    Ok(())
}

/// Reload the current level. After winning the final level, start over
/// from the first one.
pub fn restart_level(world: &mut WorldState, levels: &[LevelDescriptor]) -> Result<(), LevelError> {
    let last = world.current_level + 1 >= levels.len();
    let idx = if world.phase == Phase::Won && last { 0 } else { world.current_level };
    load_level(world, levels, idx)
}

/// Advance to the next level. Only while won; returns Ok(false) when
/// there is nothing to advance to.
pub fn next_level(world: &mut WorldState, levels: &[LevelDescriptor]) -> Result<bool, LevelError> {
    if world.phase != Phase::Won { return Ok(false); }
    let idx = world.current_level + 1;
    if idx >= levels.len() {
        world.set_message("All levels complete! Press R to play again", 5000.0);
        return Ok(false);
    }
    load_level(world, levels, idx)?;
    Ok(true)
}

// ══════════════════════════════════════════════════════════════
// Level sources
// ══════════════════════════════════════════════════════════════

/// Parse one file: a single descriptor or an array of them.
pub fn parse_levels(text: &str) -> Result<Vec<LevelDescriptor>, LevelError> {
    Ok(match serde_json::from_str::<LevelFile>(text)? {
        LevelFile::Many(v) => v,
        LevelFile::One(d) => vec![*d],
    })
}

pub fn builtin_levels() -> Vec<LevelDescriptor> {
    match parse_levels(BUILTIN_LEVELS) {
        Ok(levels) => levels,
        Err(e) => {
            warn!(error = %e, "built-in levels unreadable");
            vec![]
        }
    }
}

/// Levels from `levels_dir` if it holds any readable ones, else the built-ins.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDescriptor> {
    let from_dir = load_from_directory(&config.levels_dir);
    if !from_dir.is_empty() {
        info!(dir = %config.levels_dir.display(), count = from_dir.len(), "levels from directory");
        return from_dir;
    }
    let levels = builtin_levels();
    info!(count = levels.len(), "built-in levels");
    levels
}

fn load_from_directory(dir: &Path) -> Vec<LevelDescriptor> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        match read_level_file(&path) {
            Ok(mut v) => levels.append(&mut v),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping level file"),
        }
    }
    levels
}

fn read_level_file(path: &Path) -> Result<Vec<LevelDescriptor>, LevelError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LevelError::Io { path: path.to_path_buf(), source })?;
    parse_levels(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeedConfig;

    fn one(json: &str) -> LevelDescriptor {
        let mut v = parse_levels(json).unwrap();
        assert_eq!(v.len(), 1);
        v.remove(0)
    }

    const SMALL: &str = r#"{
        "id": 7, "name": "Tiny", "gridWidth": 4, "gridHeight": 3,
        "playerStart": {"x": 0, "y": 0},
        "containers": [{"x": 1, "y": 1, "capacity": 2}],
        "holes": [{"x": 2, "y": 2}],
        "goals": [{"x": 3, "y": 1}]
    }"#;

    // ── Parsing ──

    #[test]
    fn builtin_levels_all_build() {
        let levels = builtin_levels();
        assert!(levels.len() >= 6);
        for (i, l) in levels.iter().enumerate() {
            assert!(l.layout().is_ok(), "built-in level {i} ({}) invalid", l.name);
        }
    }

    #[test]
    fn editor_aliases_are_accepted() {
        let d = one(r#"{
            "gridWidth": 5, "gridHeight": 5, "playerStart": {"x": 0, "y": 0},
            "s3Buckets": [{"x": 1, "y": 1}],
            "files": [{"x": 2, "y": 2}],
            "stepFunctions": [{"x": 3, "y": 3}],
            "goals": [{"x": 4, "y": 4, "type": "s3bucket"}, {"x": 4, "y": 0, "type": "player"}]
        }"#);
        assert_eq!(d.containers.len(), 1);
        assert_eq!(d.containers[0].capacity, 0);
        assert_eq!(d.collectibles, vec![Cell { x: 2, y: 2 }]);
        assert_eq!(d.triggers, vec![Cell { x: 3, y: 3 }]);
        assert_eq!(d.goals[0].kind, GoalType::Container);
        assert_eq!(d.goals[1].kind, GoalType::Actor);
    }

    #[test]
    fn goal_type_defaults_to_container() {
        assert_eq!(one(SMALL).goals[0].kind, GoalType::Container);
    }

    #[test]
    fn array_files_hold_several_levels() {
        let text = format!("[{SMALL}, {SMALL}]");
        assert_eq!(parse_levels(&text).unwrap().len(), 2);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_levels("{ not json"), Err(LevelError::Parse(_))));
    }

    // ── Building ──

    #[test]
    fn layout_populates_registry() {
        let mut reg = Registry::new();
        let player = one(SMALL).layout().unwrap().spawn_into(&mut reg);
        assert_eq!(reg.get(player).map(|e| e.pos), Some(Position::new(0, 0)));
        assert_eq!(reg.count(EntityKind::Container), 1);
        assert_eq!(reg.count(EntityKind::Hole), 1);
        // Every hole comes with a dormant stone.
        let stone = reg.entity_of_type_at(Position::new(2, 2), EntityKind::SteppingStone).unwrap();
        assert!(matches!(reg.get(stone).unwrap().body, Body::SteppingStone(g) if !g.visible));
        let c = reg.entity_of_type_at(Position::new(1, 1), EntityKind::Container).unwrap();
        assert_eq!(reg.get(c).unwrap().as_container().unwrap().capacity, 2);
    }

    #[test]
    fn invalid_descriptors_are_rejected() {
        let mut d = one(SMALL);
        d.player_start = None;
        assert!(matches!(d.layout(), Err(LevelError::MissingPlayerStart)));

        let mut d = one(SMALL);
        d.grid_width = 0;
        assert!(matches!(d.layout(), Err(LevelError::ZeroSize { .. })));

        let mut d = one(SMALL);
        d.goals[0].x = 4;
        assert!(matches!(d.layout(), Err(LevelError::OutOfBounds { what: "goal", .. })));

        let mut d = one(SMALL);
        d.holes[0].y = -1;
        assert!(matches!(d.layout(), Err(LevelError::OutOfBounds { what: "hole", .. })));

        let mut d = one(SMALL);
        d.goals.clear();
        assert!(matches!(d.layout(), Err(LevelError::NoGoals)));

        let mut d = one(SMALL);
        d.walls.push(Cell { x: 0, y: 0 });
        assert!(matches!(d.layout(), Err(LevelError::Overlap { x: 0, y: 0 })));

        let mut d = one(SMALL);
        d.walls.push(Cell { x: 1, y: 1 });
        assert!(matches!(d.layout(), Err(LevelError::Overlap { x: 1, y: 1 })));
    }

    // ── Session operations ──

    fn two_levels() -> Vec<LevelDescriptor> {
        let mut a = one(SMALL);
        a.id = 1;
        let mut b = one(SMALL);
        b.id = 2;
        vec![a, b]
    }

    #[test]
    fn failed_load_leaves_world_untouched() {
        let mut levels = two_levels();
        let mut w = WorldState::new(SpeedConfig::default());
        load_level(&mut w, &levels, 0).unwrap();
        levels[1].player_start = None;
        assert!(load_level(&mut w, &levels, 1).is_err());
        assert!(matches!(load_level(&mut w, &levels, 9), Err(LevelError::UnknownLevel(9))));
        assert_eq!(w.level_id, 1);
        assert_eq!(w.current_level, 0);
        assert!(w.player.is_some());
    }

    #[test]
    fn reload_starts_from_an_empty_registry() {
        let levels = two_levels();
        let mut w = WorldState::new(SpeedConfig::default());
        load_level(&mut w, &levels, 0).unwrap();
        w.registry.spawn(Entity::new(Position::new(3, 0), Body::Wall));
        assert_eq!(w.registry.count(EntityKind::Wall), 1);

        restart_level(&mut w, &levels).unwrap();
        assert_eq!(w.registry.count(EntityKind::Wall), 0);
        assert_eq!(w.registry.count(EntityKind::Player), 1);
        assert_eq!(w.registry.count(EntityKind::Container), 1);
        assert_eq!(w.player_pos(), Some(Position::new(0, 0)));
    }

    #[test]
    fn next_level_only_when_won() {
        let levels = two_levels();
        let mut w = WorldState::new(SpeedConfig::default());
        load_level(&mut w, &levels, 0).unwrap();
        assert!(!next_level(&mut w, &levels).unwrap());
        assert_eq!(w.current_level, 0);

        w.phase = Phase::Won;
        assert!(next_level(&mut w, &levels).unwrap());
        assert_eq!(w.current_level, 1);
        assert_eq!(w.phase, Phase::Playing);

        w.phase = Phase::Won;
        assert!(!next_level(&mut w, &levels).unwrap());
        assert_eq!(w.current_level, 1);
        assert!(w.message.starts_with("All levels complete"));
    }

    #[test]
    fn restart_reloads_or_wraps_after_final_win() {
        let levels = two_levels();
        let mut w = WorldState::new(SpeedConfig::default());
        load_level(&mut w, &levels, 1).unwrap();
        w.muted = true;
        w.phase = Phase::Lost;
        w.game_over_in = Some(300.0);
        restart_level(&mut w, &levels).unwrap();
        assert_eq!(w.current_level, 1);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.game_over_in, None);
        assert!(w.muted);

        w.phase = Phase::Won;
        restart_level(&mut w, &levels).unwrap();
        assert_eq!(w.current_level, 0);
    }
}
