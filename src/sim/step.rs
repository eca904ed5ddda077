/// The step function: advances the world by one frame of elapsed time.
///
/// Processing order:
///   1. Actors (player, containers): move commit, scheduled fall start,
///      fall progress; a container whose fall completes leaves the registry
///   2. Growth tiles (stepping stones)
///   3. Win check
///   4. Loss check (player on an uncovered hole, then the loss countdown)
///
/// While paused nothing advances. Once won or lost, animations still run
/// (the fall shrinks to nothing) but win/loss are not evaluated again.

use tracing::info;

use crate::domain::entity::{Body, EntityId, GoalKind, Position};
use crate::domain::kind::EntityKind;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, dt_ms: f32) -> Vec<GameEvent> {
    if world.paused { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0.0 {
        world.message_timer -= dt_ms;
        if world.message_timer <= 0.0 {
            world.message_timer = 0.0;
            world.message.clear();
        }
    }

    resolve_actors(world, dt_ms, &mut events);
    resolve_growth(world, dt_ms);
    if world.phase == Phase::Playing {
        resolve_win(world, &mut events);
    }
    if world.phase == Phase::Playing {
        resolve_loss(world, dt_ms, &mut events);
    }

    events
}

/// Returns the new paused flag. Ignored outside play (title, won, lost).
pub fn toggle_pause(world: &mut WorldState) -> bool {
    if world.is_over() { return world.paused; }
    world.paused = !world.paused;
    world.paused
}

/// Always available, paused or not. Returns the new muted flag.
pub fn toggle_mute(world: &mut WorldState) -> bool {
    world.muted = !world.muted;
    world.muted
}

// ══════════════════════════════════════════════════════════════
// Actors
// ══════════════════════════════════════════════════════════════

fn resolve_actors(world: &mut WorldState, dt_ms: f32, events: &mut Vec<GameEvent>) {
    let speed = world.speed.move_speed;
    let fall_ms = world.speed.fall_duration_ms;

    let mut actors: Vec<EntityId> = world.registry.entities_of_type(EntityKind::Player).to_vec();
    actors.extend_from_slice(world.registry.entities_of_type(EntityKind::Container));

    for id in actors {
        let Some(e) = world.registry.get_mut(id) else { continue };
        let mut commit: Option<Position> = None;
        let mut fall_started = false;
        let mut fall_done = false;

        match &mut e.body {
            Body::Player(p) => {
                commit = p.actor.motion.advance(dt_ms, speed);
                p.actor.fall.advance(dt_ms, fall_ms);
            }
            Body::Container(c) => {
                commit = c.actor.motion.advance(dt_ms, speed);
                if let Some(left) = c.fall_in {
                    let left = left - dt_ms;
                    if left <= 0.0 {
                        c.fall_in = None;
                        let (started, snapped) = c.actor.start_fall();
                        fall_started = started;
                        commit = commit.or(snapped);
                    } else {
                        c.fall_in = Some(left);
                    }
                }
                fall_done = c.actor.fall.advance(dt_ms, fall_ms);
            }
            _ => {}
        }

        if let Some(to) = commit {
            world.registry.commit_move(id, to);
        }
        let Some(pos) = world.registry.get(id).map(|e| e.pos) else { continue };
        if fall_started {
            info!(x = pos.x, y = pos.y, "container falling");
            events.push(GameEvent::ContainerFallStart { x: pos.x, y: pos.y });
        }
        if fall_done {
            world.registry.unregister(id);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Growth tiles
// ══════════════════════════════════════════════════════════════

fn resolve_growth(world: &mut WorldState, dt_ms: f32) {
    let rate = world.speed.growth_rate;
    let stones: Vec<EntityId> = world.registry.entities_of_type(EntityKind::SteppingStone).to_vec();
    for id in stones {
        if let Some(Body::SteppingStone(g)) = world.registry.get_mut(id).map(|e| &mut e.body) {
            g.advance(dt_ms, rate);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Win / lose
// ══════════════════════════════════════════════════════════════

fn resolve_win(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let goals: Vec<EntityId> = world.registry.entities_of_type(EntityKind::Goal).to_vec();
    if goals.is_empty() { return; }

    let mut all = true;
    for id in goals {
        let Some(goal) = world.registry.get(id) else { continue };
        let Body::Goal(g) = goal.body else { continue };
        let satisfied = goal_satisfied(world, g.kind, goal.pos);
        if let Some(Body::Goal(g)) = world.registry.get_mut(id).map(|e| &mut e.body) {
            g.satisfied = satisfied;
        }
        all &= satisfied;
    }

    if all {
        world.phase = Phase::Won;
        info!(level = world.level_id, "level complete");
        events.push(GameEvent::LevelComplete);
    }
}

/// Container-goal: a grounded container rests on it.
/// Actor-goal: the player stands on it, not falling and not over a hole.
fn goal_satisfied(world: &WorldState, kind: GoalKind, pos: Position) -> bool {
    let reg = &world.registry;
    match kind {
        GoalKind::Container => reg.entities_at(pos).iter().any(|&id| {
            reg.get(id).and_then(|e| e.as_container()).is_some_and(|c| c.is_grounded())
        }),
        GoalKind::Actor => world.player_entity().is_some_and(|e| {
            e.pos == pos
                && e.actor().is_some_and(|a| !a.fall.falling && !a.fall.is_complete())
                && !rules::would_fall_through(reg, pos)
        }),
    }
}

fn resolve_loss(world: &mut WorldState, dt_ms: f32, events: &mut Vec<GameEvent>) {
    if let Some(left) = world.game_over_in {
        let left = left - dt_ms;
        if left <= 0.0 {
            world.game_over_in = None;
            world.phase = Phase::Lost;
            info!(level = world.level_id, "game over");
            events.push(GameEvent::GameOver);
        } else {
            world.game_over_in = Some(left);
        }
        return;
    }

    let Some(pid) = world.player else { return };
    let Some(pos) = world.player_pos() else { return };
    if !rules::would_fall_through(&world.registry, pos) { return; }

    let Some(actor) = world.registry.get_mut(pid).and_then(|e| e.actor_mut()) else { return };
    let (started, snapped) = actor.start_fall();
    if !started { return; }
    if let Some(to) = snapped {
        world.registry.commit_move(pid, to);
    }
    world.game_over_in = Some(world.speed.fall_duration_ms);
    info!(x = pos.x, y = pos.y, "player falling");
    events.push(GameEvent::PlayerFallStart);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::MoveDir;
    use crate::sim::movement::try_move_player;

    const FRAME: f32 = 16.0;

    fn p(x: usize, y: usize) -> Position { Position::new(x, y) }

    /// Step in 16ms frames for at least `ms`, collecting events.
    fn run(w: &mut WorldState, ms: f32) -> Vec<GameEvent> {
        let mut events = vec![];
        let mut t = 0.0;
        while t < ms {
            events.extend(step(w, FRAME));
            t += FRAME;
        }
        events
    }

    fn count(events: &[GameEvent], ev: &GameEvent) -> usize {
        events.iter().filter(|e| *e == ev).count()
    }

    // ── Movement commit ──

    #[test]
    fn move_commits_after_move_duration() {
        let mut w = WorldState::from_diagram(&["P  "]);
        try_move_player(&mut w, MoveDir::Right);
        run(&mut w, 240.0);
        assert_eq!(w.player_pos(), Some(p(0, 0)));
        run(&mut w, FRAME);
        assert_eq!(w.player_pos(), Some(p(1, 0)));
        assert_eq!(w.registry.entity_of_type_at(p(1, 0), EntityKind::Player), w.player);
        assert!(w.registry.entities_at(p(0, 0)).is_empty());
    }

    #[test]
    fn pushed_container_commits_with_player() {
        let mut w = WorldState::from_diagram(&["PC  "]);
        try_move_player(&mut w, MoveDir::Right);
        run(&mut w, 256.0);
        assert_eq!(w.player_pos(), Some(p(1, 0)));
        assert!(w.registry.entity_of_type_at(p(2, 0), EntityKind::Container).is_some());
        // Can push again straight away.
        let ev = try_move_player(&mut w, MoveDir::Right);
        assert_eq!(ev, vec![GameEvent::ContainerPushed { from: p(2, 0), to: p(3, 0) }]);
    }

    // ── Deferred container fall ──

    #[test]
    fn container_pushed_onto_hole_falls_then_leaves() {
        let mut w = WorldState::from_diagram(&["PCO "]);
        let c = w.registry.entity_of_type_at(p(1, 0), EntityKind::Container).unwrap();
        try_move_player(&mut w, MoveDir::Right);

        let ev = run(&mut w, 240.0);
        assert_eq!(count(&ev, &GameEvent::ContainerFallStart { x: 2, y: 0 }), 0);

        let ev = run(&mut w, 32.0);
        assert_eq!(count(&ev, &GameEvent::ContainerFallStart { x: 2, y: 0 }), 1);
        let actor = *w.registry.get(c).unwrap().actor().unwrap();
        assert!(actor.fall.falling);
        assert!(!actor.motion.moving);
        // Falling container blocks but cannot be pushed.
        assert!(w.registry.is_registered(c));

        let ev = run(&mut w, 1600.0);
        assert!(ev.iter().all(|e| !matches!(e, GameEvent::ContainerFallStart { .. })));
        assert!(!w.registry.is_registered(c));
        assert!(w.registry.entity_of_type_at(p(2, 0), EntityKind::Container).is_none());
        assert_eq!(w.phase, Phase::Playing);
    }

    // ── Player fall / loss ──

    #[test]
    fn stepping_onto_hole_loses_exactly_once() {
        let mut w = WorldState::from_diagram(&["PO "]);
        try_move_player(&mut w, MoveDir::Right);

        let ev = run(&mut w, 256.0);
        assert_eq!(count(&ev, &GameEvent::PlayerFallStart), 1);
        assert!(w.player_entity().unwrap().actor().unwrap().fall.falling);
        assert_eq!(w.phase, Phase::Playing);
        assert!(try_move_player(&mut w, MoveDir::Right).is_empty());

        let ev = run(&mut w, 1400.0);
        assert_eq!(count(&ev, &GameEvent::GameOver), 0);
        let ev = run(&mut w, 200.0);
        assert_eq!(count(&ev, &GameEvent::GameOver), 1);
        assert_eq!(w.phase, Phase::Lost);

        let ev = run(&mut w, 3000.0);
        assert!(ev.is_empty());
        assert_eq!(w.phase, Phase::Lost);
        assert!(w.player_entity().unwrap().actor().unwrap().fall.is_complete());
    }

    #[test]
    fn grown_stone_covers_hole() {
        let mut w = WorldState::from_diagram(&["PTO "]);
        try_move_player(&mut w, MoveDir::Right);
        run(&mut w, 256.0);
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 512.0);
        assert_eq!(w.player_pos(), Some(p(2, 0)));
        assert_eq!(count(&ev, &GameEvent::PlayerFallStart), 0);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn second_trigger_keeps_grown_stone_solid() {
        let mut w = WorldState::from_diagram(&["PTTO "]);
        w.speed.growth_rate = 0.001;
        try_move_player(&mut w, MoveDir::Right);
        run(&mut w, 1280.0);
        assert!(!rules::would_fall_through(&w.registry, p(3, 0)));

        let ev = try_move_player(&mut w, MoveDir::Right);
        assert!(ev.contains(&GameEvent::TriggerActivated { stones: 1 }));
        assert!(!rules::would_fall_through(&w.registry, p(3, 0)));

        run(&mut w, 256.0);
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 512.0);
        assert_eq!(w.player_pos(), Some(p(3, 0)));
        assert_eq!(count(&ev, &GameEvent::PlayerFallStart), 0);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn growing_stone_does_not_cover_hole() {
        let mut w = WorldState::from_diagram(&["PTO "]);
        w.speed.growth_rate = 0.0001;
        try_move_player(&mut w, MoveDir::Right);
        run(&mut w, 256.0);
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 256.0);
        assert_eq!(count(&ev, &GameEvent::PlayerFallStart), 1);
        let ev = run(&mut w, 1600.0);
        assert_eq!(count(&ev, &GameEvent::GameOver), 1);
    }

    // ── Win ──

    #[test]
    fn container_on_goal_wins_once() {
        let mut w = WorldState::from_diagram(&["PCG"]);
        let ev = run(&mut w, FRAME);
        assert!(ev.is_empty());
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 300.0);
        assert_eq!(count(&ev, &GameEvent::LevelComplete), 1);
        assert_eq!(w.phase, Phase::Won);
        let g = w.registry.entity_of_type_at(p(2, 0), EntityKind::Goal).unwrap();
        assert!(matches!(w.registry.get(g).unwrap().body, Body::Goal(ref goal) if goal.satisfied));

        let ev = run(&mut w, 1000.0);
        assert!(ev.is_empty());
        assert_eq!(w.phase, Phase::Won);
    }

    #[test]
    fn every_goal_must_hold_at_once() {
        // Container already home; the player still has to reach the actor goal.
        let mut w = WorldState::from_diagram(&["BPA"]);
        run(&mut w, FRAME);
        assert_eq!(w.phase, Phase::Playing);
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 300.0);
        assert_eq!(count(&ev, &GameEvent::LevelComplete), 1);
        assert_eq!(w.phase, Phase::Won);
    }

    #[test]
    fn falling_container_does_not_satisfy_goal() {
        let mut w = WorldState::from_diagram(&["PC "]);
        let goal_pos = p(2, 0);
        w.registry.spawn(crate::domain::entity::Entity::goal(goal_pos, GoalKind::Container));
        w.registry.spawn(crate::domain::entity::Entity::new(goal_pos, Body::Hole));
        try_move_player(&mut w, MoveDir::Right);
        let ev = run(&mut w, 2000.0);
        assert_eq!(count(&ev, &GameEvent::LevelComplete), 0);
        assert_eq!(w.phase, Phase::Playing);
    }

    // ── Pause ──

    #[test]
    fn paused_world_does_not_advance() {
        let mut w = WorldState::from_diagram(&["P  "]);
        try_move_player(&mut w, MoveDir::Right);
        assert!(toggle_pause(&mut w));
        run(&mut w, 1000.0);
        assert_eq!(w.player_pos(), Some(p(0, 0)));
        assert_eq!(w.tick, 0);
        assert!(!toggle_pause(&mut w));
        run(&mut w, 256.0);
        assert_eq!(w.player_pos(), Some(p(1, 0)));
    }

    #[test]
    fn pause_ignored_once_over_but_mute_is_not() {
        let mut w = WorldState::from_diagram(&["P  "]);
        w.phase = Phase::Won;
        assert!(!toggle_pause(&mut w));
        assert!(!w.paused);
        assert!(toggle_mute(&mut w));
        assert!(!toggle_mute(&mut w));
    }

    #[test]
    fn message_expires() {
        let mut w = WorldState::from_diagram(&["P"]);
        w.set_message("hello", 100.0);
        run(&mut w, 96.0);
        assert_eq!(w.message, "hello");
        run(&mut w, FRAME);
        assert!(w.message.is_empty());
    }
}
