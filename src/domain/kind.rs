/// Entity kinds and their capabilities.
/// Capabilities are queried via methods, not probed at runtime,
/// so the semantics of every kind are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EntityKind {
    Player,
    Container,     // Pushable, capacity-gated
    Wall,          // Static blocker
    Hole,          // Hazard unless a grown stepping stone covers it
    SteppingStone, // Dormant until a trigger fires, solid once grown
    Trigger,       // One-shot: grows every stepping stone
    Collectible,   // One-shot: +1 inventory
    Goal,          // Completion target
}

/// What happens when the player walks onto a cell holding this kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EnterEffect {
    ActivateStones,
    Collect,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Player,
        EntityKind::Container,
        EntityKind::Wall,
        EntityKind::Hole,
        EntityKind::SteppingStone,
        EntityKind::Trigger,
        EntityKind::Collectible,
        EntityKind::Goal,
    ];

    /// Does this kind keep other entities out of its cell?
    pub fn blocks_movement(self) -> bool {
        matches!(self, EntityKind::Player | EntityKind::Container | EntityKind::Wall)
    }

    /// Interaction applied by the movement orchestrator after a move is allowed.
    pub fn on_enter(self) -> Option<EnterEffect> {
        match self {
            EntityKind::Trigger => Some(EnterEffect::ActivateStones),
            EntityKind::Collectible => Some(EnterEffect::Collect),
            _ => None,
        }
    }

    /// Actors own a grid motion and a fall sub-state.
    pub fn is_actor(self) -> bool {
        matches!(self, EntityKind::Player | EntityKind::Container)
    }

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Container => "container",
            EntityKind::Wall => "wall",
            EntityKind::Hole => "hole",
            EntityKind::SteppingStone => "stepping stone",
            EntityKind::Trigger => "trigger",
            EntityKind::Collectible => "collectible",
            EntityKind::Goal => "goal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_player_container_wall_block() {
        let blockers: Vec<_> = EntityKind::ALL.iter().filter(|k| k.blocks_movement()).collect();
        assert_eq!(blockers, vec![&EntityKind::Player, &EntityKind::Container, &EntityKind::Wall]);
    }

    #[test]
    fn consumables_have_enter_effects() {
        assert_eq!(EntityKind::Trigger.on_enter(), Some(EnterEffect::ActivateStones));
        assert_eq!(EntityKind::Collectible.on_enter(), Some(EnterEffect::Collect));
        assert_eq!(EntityKind::Hole.on_enter(), None);
        assert_eq!(EntityKind::Goal.on_enter(), None);
    }
}
