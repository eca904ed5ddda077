/// Animated grid actor: a discrete committed cell plus a continuous
/// interpolation toward the next one.
///
/// ## Movement state machine
///
///   Idle ──begin(from, to)──▶ Moving ──progress ≥ 1──▶ Idle (commit target)
///
/// The committed cell itself lives on the entity (and in the registry's
/// position index), so lookups never see an interpolated position.
/// `GridMotion` only owns what is needed to get there and to draw it.
///
/// ## Fall sub-state
///
///   Standing ──start()──▶ Falling ──progress ≥ 1──▶ Fallen (terminal)
///
/// Entering a fall cancels any in-flight move by snapping onto its target.

use super::entity::Position;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMotion {
    /// Cell the current move started from (interpolation origin).
    pub origin: Position,
    /// Cell the current move ends on. Equal to the committed cell when idle.
    pub target: Position,
    /// 0.0 → 1.0 while moving, reset to 0.0 on commit.
    pub progress: f32,
    pub moving: bool,
}

impl GridMotion {
    pub fn at(pos: Position) -> Self {
        GridMotion { origin: pos, target: pos, progress: 0.0, moving: false }
    }

    /// Start a move. Returns false (and changes nothing) if one is in flight.
    pub fn begin(&mut self, from: Position, to: Position) -> bool {
        if self.moving { return false; }
        self.origin = from;
        self.target = to;
        self.progress = 0.0;
        self.moving = from != to;
        self.moving
    }

    /// Advance by `dt_ms` at `tiles_per_sec`.
    /// Returns the cell to commit when the move completes this tick.
    pub fn advance(&mut self, dt_ms: f32, tiles_per_sec: f32) -> Option<Position> {
        if !self.moving { return None; }
        self.progress += tiles_per_sec * dt_ms / 1000.0;
        if self.progress >= 1.0 {
            self.moving = false;
            self.progress = 0.0;
            self.origin = self.target;
            return Some(self.target);
        }
        None
    }

    /// Abort the in-flight move, landing on its target immediately.
    pub fn snap(&mut self) -> Option<Position> {
        if !self.moving { return None; }
        self.moving = false;
        self.progress = 0.0;
        self.origin = self.target;
        Some(self.target)
    }

    /// Fractional grid position for drawing.
    pub fn render_pos(&self, current: Position) -> (f32, f32) {
        if !self.moving {
            return (current.x as f32, current.y as f32);
        }
        let lerp = |a: usize, b: usize| a as f32 + (b as f32 - a as f32) * self.progress;
        (lerp(self.origin.x, self.target.x), lerp(self.origin.y, self.target.y))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FallState {
    pub falling: bool,
    /// 0.0 → 1.0 over the fall duration; stays at 1.0 once fallen.
    pub progress: f32,
}

impl FallState {
    /// Returns false if a fall already started (falls never restart).
    pub fn start(&mut self) -> bool {
        if self.falling || self.is_complete() { return false; }
        self.falling = true;
        self.progress = 0.0;
        true
    }

    /// Returns true exactly once: on the tick the fall completes.
    pub fn advance(&mut self, dt_ms: f32, duration_ms: f32) -> bool {
        if !self.falling { return false; }
        self.progress = if duration_ms <= 0.0 { 1.0 } else { self.progress + dt_ms / duration_ms };
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.falling = false;
            return true;
        }
        false
    }

    pub fn is_complete(&self) -> bool {
        !self.falling && self.progress >= 1.0
    }
}

/// Shared state of everything that walks or slides across the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Actor {
    pub motion: GridMotion,
    pub fall: FallState,
}

impl Actor {
    pub fn at(pos: Position) -> Self {
        Actor { motion: GridMotion::at(pos), fall: FallState::default() }
    }

    /// Moving, falling, or already fallen: no new move may start.
    pub fn is_busy(&self) -> bool {
        self.motion.moving || self.fall.falling || self.fall.is_complete()
    }

    pub fn begin_move(&mut self, from: Position, to: Position) -> bool {
        if self.is_busy() { return false; }
        self.motion.begin(from, to)
    }

    /// Enter the fall sub-state. Returns `(started, snapped_to)`:
    /// `snapped_to` is the target of a move the fall cut short, which the
    /// caller must commit.
    pub fn start_fall(&mut self) -> (bool, Option<Position>) {
        if !self.fall.start() { return (false, None); }
        (true, self.motion.snap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Position { Position::new(x, y) }

    #[test]
    fn move_commits_after_one_tile_of_time() {
        let mut m = GridMotion::at(p(0, 0));
        assert!(m.begin(p(0, 0), p(1, 0)));
        // 4 tiles/s → 250ms per tile
        assert_eq!(m.advance(100.0, 4.0), None);
        assert!(m.moving);
        assert!((m.progress - 0.4).abs() < 1e-4);
        assert_eq!(m.advance(150.0, 4.0), Some(p(1, 0)));
        assert!(!m.moving);
        assert_eq!(m.progress, 0.0);
    }

    #[test]
    fn begin_rejected_while_moving() {
        let mut m = GridMotion::at(p(0, 0));
        assert!(m.begin(p(0, 0), p(1, 0)));
        assert!(!m.begin(p(0, 0), p(0, 1)));
        assert_eq!(m.target, p(1, 0));
    }

    #[test]
    fn render_interpolates_origin_to_target() {
        let mut m = GridMotion::at(p(2, 2));
        m.begin(p(2, 2), p(2, 1));
        m.advance(125.0, 4.0); // halfway
        let (x, y) = m.render_pos(p(2, 2));
        assert!((x - 2.0).abs() < 1e-4);
        assert!((y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn render_idle_uses_committed_cell() {
        let m = GridMotion::at(p(3, 4));
        assert_eq!(m.render_pos(p(3, 4)), (3.0, 4.0));
    }

    #[test]
    fn fall_completes_once() {
        let mut f = FallState::default();
        assert!(f.start());
        assert!(!f.start());
        assert!(!f.advance(1000.0, 1500.0));
        assert!(f.advance(600.0, 1500.0));
        assert!(f.is_complete());
        assert!(!f.advance(600.0, 1500.0));
        assert!(!f.start());
    }

    #[test]
    fn fall_cancels_in_flight_move() {
        let mut a = Actor::at(p(0, 0));
        assert!(a.begin_move(p(0, 0), p(1, 0)));
        a.motion.advance(50.0, 4.0);
        let (started, snapped) = a.start_fall();
        assert!(started);
        assert_eq!(snapped, Some(p(1, 0)));
        assert!(!a.motion.moving);
        assert!(a.is_busy());
    }

    #[test]
    fn fallen_actor_cannot_move() {
        let mut a = Actor::at(p(0, 0));
        a.start_fall();
        a.fall.advance(2000.0, 1500.0);
        assert!(a.fall.is_complete());
        assert!(!a.begin_move(p(0, 0), p(1, 0)));
    }
}
