/// Entities: Player, Container, and the static / consumable cells around them.
/// Every entity is a committed grid position plus a tagged `Body` carrying
/// the per-kind state. Kind capabilities live in `kind.rs`.

use super::growth::Growth;
use super::kind::EntityKind;
use super::motion::Actor;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// One step in `dir`, or None if it leaves a `width` × `height` grid.
    pub fn step(self, dir: MoveDir, width: usize, height: usize) -> Option<Position> {
        let (dx, dy) = dir.delta();
        let x = self.x as i64 + dx as i64;
        let y = self.y as i64 + dy as i64;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return None;
        }
        Some(Position::new(x as usize, y as usize))
    }
}

/// Cardinal step requested by input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left  => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up    => (0, -1),
            MoveDir::Down  => (0, 1),
        }
    }
}

/// Stable index into the registry arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EntityId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GoalKind {
    /// Satisfied by any container resting on it.
    Container,
    /// Satisfied by the player standing on it.
    Actor,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub actor: Actor,
    /// Collected items not yet deposited. Never negative.
    pub inventory: u32,
}

impl Player {
    /// Take one item for a deposit. Returns false if empty-handed.
    pub fn take_item(&mut self) -> bool {
        if self.inventory == 0 { return false; }
        self.inventory -= 1;
        true
    }
}

#[derive(Clone, Debug)]
pub struct Container {
    pub actor: Actor,
    /// 0 = no fill requirement.
    pub capacity: u32,
    pub filled: u32,
    /// Milliseconds until a scheduled fall starts; set when pushed onto a hole.
    pub fall_in: Option<f32>,
}

impl Container {
    pub fn new(actor: Actor, capacity: u32) -> Self {
        Container { actor, capacity, filled: 0, fall_in: None }
    }

    pub fn is_full(&self) -> bool {
        self.filled >= self.capacity
    }

    /// Full (or free of any requirement) and not on its way down a hole.
    pub fn can_be_pushed(&self) -> bool {
        self.is_full() && !self.actor.fall.falling && !self.actor.fall.is_complete()
    }

    /// Still accepts deposits.
    pub fn needs_filling(&self) -> bool {
        !self.is_full() && !self.actor.fall.falling && !self.actor.fall.is_complete()
    }

    /// Neither falling, fallen, nor scheduled to fall.
    pub fn is_grounded(&self) -> bool {
        self.fall_in.is_none() && !self.actor.fall.falling && !self.actor.fall.is_complete()
    }

    /// Add one item, capped at capacity. Returns false if already full.
    pub fn add_item(&mut self) -> bool {
        if self.is_full() { return false; }
        self.filled += 1;
        true
    }

    /// Render hook: 1.0 when full or capacity-free.
    pub fn fill_ratio(&self) -> f32 {
        if self.capacity == 0 { return 1.0; }
        self.filled as f32 / self.capacity as f32
    }
}

/// One-shot cell interaction (trigger, collectible).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Consumable {
    pub consumed: bool,
}

impl Consumable {
    /// Returns true only the first time.
    pub fn consume(&mut self) -> bool {
        if self.consumed { return false; }
        self.consumed = true;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Goal {
    pub kind: GoalKind,
    /// Recomputed on every win evaluation, for the renderer.
    pub satisfied: bool,
}

#[derive(Clone, Debug)]
pub enum Body {
    Player(Player),
    Container(Container),
    Wall,
    Hole,
    SteppingStone(Growth),
    Trigger(Consumable),
    Collectible(Consumable),
    Goal(Goal),
}

#[derive(Clone, Debug)]
pub struct Entity {
    /// Committed grid cell. Never an interpolated position.
    pub pos: Position,
    pub body: Body,
}

impl Entity {
    pub fn new(pos: Position, body: Body) -> Self {
        Entity { pos, body }
    }

    pub fn player(pos: Position) -> Self {
        Entity::new(pos, Body::Player(Player { actor: Actor::at(pos), inventory: 0 }))
    }

    pub fn container(pos: Position, capacity: u32) -> Self {
        Entity::new(pos, Body::Container(Container::new(Actor::at(pos), capacity)))
    }

    pub fn goal(pos: Position, kind: GoalKind) -> Self {
        Entity::new(pos, Body::Goal(Goal { kind, satisfied: false }))
    }

    pub fn kind(&self) -> EntityKind {
        match self.body {
            Body::Player(_) => EntityKind::Player,
            Body::Container(_) => EntityKind::Container,
            Body::Wall => EntityKind::Wall,
            Body::Hole => EntityKind::Hole,
            Body::SteppingStone(_) => EntityKind::SteppingStone,
            Body::Trigger(_) => EntityKind::Trigger,
            Body::Collectible(_) => EntityKind::Collectible,
            Body::Goal(_) => EntityKind::Goal,
        }
    }

    pub fn blocks_movement(&self) -> bool {
        self.kind().blocks_movement()
    }

    pub fn actor(&self) -> Option<&Actor> {
        match &self.body {
            Body::Player(p) => Some(&p.actor),
            Body::Container(c) => Some(&c.actor),
            _ => None,
        }
    }

    pub fn actor_mut(&mut self) -> Option<&mut Actor> {
        match &mut self.body {
            Body::Player(p) => Some(&mut p.actor),
            Body::Container(c) => Some(&mut c.actor),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.body {
            Body::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.body {
            Body::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.body {
            Body::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match &mut self.body {
            Body::Player(p) => Some(p),
            _ => None,
        }
    }

    /// Stepping stone that has finished growing.
    pub fn is_solid_stone(&self) -> bool {
        matches!(&self.body, Body::SteppingStone(g) if g.is_solid())
    }

    /// Fractional position for drawing: interpolated for moving actors.
    pub fn render_pos(&self) -> (f32, f32) {
        match self.actor() {
            Some(a) => a.motion.render_pos(self.pos),
            None => (self.pos.x as f32, self.pos.y as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_in_bounds() {
        let p = Position::new(0, 0);
        assert_eq!(p.step(MoveDir::Left, 3, 3), None);
        assert_eq!(p.step(MoveDir::Up, 3, 3), None);
        assert_eq!(p.step(MoveDir::Right, 3, 3), Some(Position::new(1, 0)));
        assert_eq!(Position::new(2, 2).step(MoveDir::Down, 3, 3), None);
    }

    #[test]
    fn zero_capacity_container_is_always_full() {
        let mut c = Container::new(Actor::at(Position::new(0, 0)), 0);
        assert!(c.is_full());
        assert!(c.can_be_pushed());
        assert!(!c.add_item());
        assert_eq!(c.fill_ratio(), 1.0);
    }

    #[test]
    fn capacity_gates_push() {
        let mut c = Container::new(Actor::at(Position::new(0, 0)), 2);
        assert!(!c.can_be_pushed());
        assert!(c.add_item());
        assert!(!c.can_be_pushed());
        assert!(c.add_item());
        assert!(c.can_be_pushed());
        assert!(!c.add_item());
        assert_eq!(c.filled, 2);
    }

    #[test]
    fn falling_container_is_neither_pushable_nor_fillable() {
        let mut c = Container::new(Actor::at(Position::new(0, 0)), 1);
        c.actor.start_fall();
        assert!(!c.needs_filling());
        c.filled = 1;
        assert!(!c.can_be_pushed());
    }

    #[test]
    fn consumable_is_one_shot() {
        let mut c = Consumable::default();
        assert!(c.consume());
        assert!(!c.consume());
        assert!(c.consumed);
    }

    #[test]
    fn player_inventory_never_negative() {
        let mut p = Player { actor: Actor::at(Position::new(0, 0)), inventory: 1 };
        assert!(p.take_item());
        assert!(!p.take_item());
        assert_eq!(p.inventory, 0);
    }
}
