/// Events emitted by moves and ticks.
/// The presentation layer consumes these for sound and status messages;
/// the core emits them unconditionally and never waits on a handler.

use crate::domain::entity::Position;
use crate::domain::rules::BlockReason;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Move rejected: blocked, failed push, or deposit with empty hands.
    InvalidMove { reason: Option<BlockReason> },
    Moved { to: Position },
    ItemCollected { x: usize, y: usize },
    ItemDeposited { x: usize, y: usize, filled: u32, capacity: u32 },
    ContainerPushed { from: Position, to: Position },
    TriggerActivated { stones: usize },
    ContainerFallStart { x: usize, y: usize },
    PlayerFallStart,
    LevelComplete,
    GameOver,
}
