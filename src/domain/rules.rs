/// Collision rules: truth-table driven.
///
/// Pure functions over the registry. No side effects.
/// These decide "what would happen" without performing the action;
/// the movement orchestrator applies the outcome.
///
/// ## Entering a cell (`can_actor_enter`)
///
/// Evaluated against every registered entity at the destination.
/// First matching row wins.
/// ┌──────────────────────────────────────────┬──────────────────────────┐
/// │ Condition                                 │ Decision                 │
/// ├──────────────────────────────────────────┼──────────────────────────┤
/// │ Wall present                              │ Blocked(Wall)            │
/// │ Container, actor has items, not full      │ Redirect(Deposit, c)     │
/// │ Container, full or capacity 0             │ Redirect(Push, c)        │
/// │ Container, otherwise (or falling)         │ Blocked(Unpushable)      │
/// │ Other blocker without an enter effect     │ Blocked(OtherBlocker)    │
/// │ Otherwise                                 │ Allowed                  │
/// └──────────────────────────────────────────┴──────────────────────────┘
///
/// ## Pushing into a cell (`can_push_to`)
/// ┌──────────────────────────────┬─────────┐
/// │ Condition                     │ Allow?  │
/// ├──────────────────────────────┼─────────┤
/// │ Wall present                  │ DENY    │
/// │ Container present             │ DENY    │
/// │ Any other blocker present     │ DENY    │
/// │ Otherwise                     │ ALLOW   │
/// └──────────────────────────────┴─────────┘
///
/// ## Hazard (`would_fall_through`)
/// ┌──────────────────────────────┬─────────┐
/// │ Hole │ Solid stone at cell    │ Falls?  │
/// ├──────┼───────────────────────┼─────────┤
/// │ no   │ any                    │ NO      │
/// │ yes  │ yes (fully grown)      │ NO      │
/// │ yes  │ no / still growing     │ YES     │
/// └──────┴───────────────────────┴─────────┘
///
/// Bounds are not checked here: callers reject out-of-grid cells first.

use super::entity::{EntityId, Position};
use super::kind::EntityKind;
use super::registry::Registry;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockReason {
    Wall,
    UnpushableContainer,
    OtherBlocker,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RedirectKind {
    Deposit,
    Push,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Decision {
    Allowed,
    Blocked(BlockReason),
    Redirect(RedirectKind, EntityId),
}

/// What happens if `actor` tries to step onto `dest`. See table above.
/// `actor` is only consulted for its inventory (containers carry none).
pub fn can_actor_enter(reg: &Registry, actor: EntityId, dest: Position) -> Decision {
    let here = reg.entities_at(dest);

    if here.iter().any(|&id| is(reg, id, EntityKind::Wall)) {
        return Decision::Blocked(BlockReason::Wall);
    }

    if let Some(cid) = reg.entity_of_type_at(dest, EntityKind::Container) {
        let inventory = reg.get(actor).and_then(|e| e.as_player()).map_or(0, |p| p.inventory);
        let Some(c) = reg.get(cid).and_then(|e| e.as_container()) else {
            return Decision::Blocked(BlockReason::UnpushableContainer);
        };
        if inventory > 0 && c.needs_filling() {
            return Decision::Redirect(RedirectKind::Deposit, cid);
        }
        if c.can_be_pushed() {
            return Decision::Redirect(RedirectKind::Push, cid);
        }
        return Decision::Blocked(BlockReason::UnpushableContainer);
    }

    let other_blocker = here.iter().any(|&id| {
        id != actor
            && reg.get(id).is_some_and(|e| e.blocks_movement() && e.kind().on_enter().is_none())
    });
    if other_blocker {
        return Decision::Blocked(BlockReason::OtherBlocker);
    }

    Decision::Allowed
}

/// Can a pushed container land on `dest`? See table above.
pub fn can_push_to(reg: &Registry, dest: Position) -> bool {
    !reg.entities_at(dest)
        .iter()
        .any(|&id| reg.get(id).is_some_and(|e| e.blocks_movement()))
}

/// Hole without a fully grown stepping stone.
pub fn would_fall_through(reg: &Registry, pos: Position) -> bool {
    let here = reg.entities_at(pos);
    let hole = here.iter().any(|&id| is(reg, id, EntityKind::Hole));
    if !hole { return false; }
    !here.iter().any(|&id| reg.get(id).is_some_and(|e| e.is_solid_stone()))
}

#[inline]
fn is(reg: &Registry, id: EntityId, kind: EntityKind) -> bool {
    reg.get(id).is_some_and(|e| e.kind() == kind)
}
