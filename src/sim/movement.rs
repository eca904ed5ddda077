/// Movement orchestrator: one player move attempt, start to finish.
///
/// Processing order:
///   1. Gate: paused, won/lost, player busy (moving / falling / fallen)
///   2. Bounds: off-grid destinations are dropped silently
///   3. Collision decision (rules::can_actor_enter)
///   4. Apply the decision:
///        Blocked  → InvalidMove
///        Deposit  → inventory -1, container +1, player stays put
///        Push     → container slides one cell, player follows;
///                   a hole under the container schedules its fall
///        Allowed  → Moved, then trigger / collectible, then the step
///
/// Moves are never queued: a rejected attempt leaves no trace.

use tracing::{debug, info};

use crate::domain::entity::{Body, EntityId, MoveDir, Position};
use crate::domain::kind::{EnterEffect, EntityKind};
use crate::domain::rules::{self, Decision, RedirectKind};
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn try_move_player(world: &mut WorldState, dir: MoveDir) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if world.paused || world.is_over() { return events; }

    let Some(pid) = world.player else { return events };
    let Some(player) = world.registry.get(pid) else { return events };
    if player.actor().map_or(true, |a| a.is_busy()) { return events; }

    let from = player.pos;
    let Some(dest) = from.step(dir, world.width, world.height) else { return events };

    match rules::can_actor_enter(&world.registry, pid, dest) {
        Decision::Blocked(reason) => {
            debug!(?reason, x = dest.x, y = dest.y, "move blocked");
            events.push(GameEvent::InvalidMove { reason: Some(reason) });
        }
        Decision::Redirect(RedirectKind::Deposit, cid) => {
            resolve_deposit(world, pid, cid, &mut events);
        }
        Decision::Redirect(RedirectKind::Push, cid) => {
            if resolve_push(world, cid, dir, &mut events) {
                begin_player_move(world, pid, from, dest);
            }
        }
        Decision::Allowed => {
            events.push(GameEvent::Moved { to: dest });
            resolve_enter_effects(world, pid, dest, &mut events);
            begin_player_move(world, pid, from, dest);
        }
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Deposit
// ══════════════════════════════════════════════════════════════

fn resolve_deposit(world: &mut WorldState, pid: EntityId, cid: EntityId, events: &mut Vec<GameEvent>) {
    let took = world.registry.get_mut(pid)
        .and_then(|e| e.as_player_mut())
        .is_some_and(|p| p.take_item());
    if !took {
        events.push(GameEvent::InvalidMove { reason: None });
        return;
    }

    let Some(c) = world.registry.get_mut(cid) else { return };
    let pos = c.pos;
    let Some(container) = c.as_container_mut() else { return };
    container.add_item();
    info!(x = pos.x, y = pos.y, filled = container.filled, capacity = container.capacity, "deposit");
    events.push(GameEvent::ItemDeposited {
        x: pos.x,
        y: pos.y,
        filled: container.filled,
        capacity: container.capacity,
    });
}

// ══════════════════════════════════════════════════════════════
// Push
// ══════════════════════════════════════════════════════════════

/// Slide the container one cell along `dir`. Returns false (with invalid
/// feedback) if it cannot go.
fn resolve_push(world: &mut WorldState, cid: EntityId, dir: MoveDir, events: &mut Vec<GameEvent>) -> bool {
    let Some(c) = world.registry.get(cid) else { return false };
    let from = c.pos;
    let busy = c.actor().map_or(true, |a| a.is_busy());

    let target = match from.step(dir, world.width, world.height) {
        Some(t) if !busy && rules::can_push_to(&world.registry, t) => t,
        _ => {
            debug!(x = from.x, y = from.y, "push refused");
            events.push(GameEvent::InvalidMove { reason: None });
            return false;
        }
    };

    let falls = rules::would_fall_through(&world.registry, target);
    let delay = world.speed.move_duration_ms();
    let Some(container) = world.registry.get_mut(cid).and_then(|e| e.as_container_mut()) else {
        return false;
    };
    container.actor.begin_move(from, target);
    if falls && container.fall_in.is_none() {
        container.fall_in = Some(delay);
    }

    info!(from_x = from.x, from_y = from.y, to_x = target.x, to_y = target.y, falls, "push");
    events.push(GameEvent::ContainerPushed { from, to: target });
    true
}

// ══════════════════════════════════════════════════════════════
// Enter effects (trigger, collectible)
// ══════════════════════════════════════════════════════════════

fn resolve_enter_effects(world: &mut WorldState, pid: EntityId, dest: Position, events: &mut Vec<GameEvent>) {
    let here: Vec<EntityId> = world.registry.entities_at(dest).to_vec();
    for id in here {
        let Some(e) = world.registry.get_mut(id) else { continue };
        let effect = e.kind().on_enter();
        let fired = match (&mut e.body, effect) {
            (Body::Trigger(t), Some(EnterEffect::ActivateStones)) => t.consume(),
            (Body::Collectible(c), Some(EnterEffect::Collect)) => c.consume(),
            _ => false,
        };
        if !fired { continue; }

        match effect {
            Some(EnterEffect::ActivateStones) => {
                let stones = activate_stones(world);
                info!(stones, "trigger activated");
                events.push(GameEvent::TriggerActivated { stones });
            }
            Some(EnterEffect::Collect) => {
                if let Some(p) = world.registry.get_mut(pid).and_then(|e| e.as_player_mut()) {
                    p.inventory += 1;
                    debug!(inventory = p.inventory, "collected");
                }
                events.push(GameEvent::ItemCollected { x: dest.x, y: dest.y });
            }
            None => {}
        }
    }
}

/// Start every registered stepping stone growing. Returns how many.
fn activate_stones(world: &mut WorldState) -> usize {
    let stones: Vec<EntityId> = world.registry.entities_of_type(EntityKind::SteppingStone).to_vec();
    for &id in &stones {
        if let Some(Body::SteppingStone(g)) = world.registry.get_mut(id).map(|e| &mut e.body) {
            g.activate();
        }
    }
    stones.len()
}

fn begin_player_move(world: &mut WorldState, pid: EntityId, from: Position, dest: Position) {
    if let Some(a) = world.registry.get_mut(pid).and_then(|e| e.actor_mut()) {
        a.begin_move(from, dest);
    }
}
