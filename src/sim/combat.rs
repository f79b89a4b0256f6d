//! Ramming: mobile bodies against hazards and against each other
//!
//! Mobile bodies are the avatar, bots and drones, visited in [`Slot`] order.
//! Against hazards every overlap is a fixed-step shove plus ram damage that
//! goes on the hazard's ledger. Between mobiles, friendly pairs never trade
//! damage, and a friendly tank/drone pair also skips separation so drones
//! can screen for their owner.

use super::collision::circle_collision;
use super::ledger::{award, distribute_reward};
use super::state::{EntityId, GameEvent, GameState, Slot};
use crate::consts::{HAZARD_PUSH_STEP, RAM_KILL_BONUS, RAM_RECOIL};

/// Ram damage dealt by the body in `slot`: a drone's fixed damage, or the
/// tank's body-damage stat
fn ram_damage(state: &GameState, slot: Slot) -> f32 {
    match slot {
        Slot::Avatar => state.avatar.as_ref().map_or(0.0, |a| a.stats.ram_damage()),
        Slot::Bot(i) => state.bots.get(i).map_or(0.0, |b| b.stats.ram_damage()),
        Slot::Minion(i) => state.minions.get(i).map_or(0.0, |m| m.damage),
    }
}

/// Id that gets credit for damage done by `slot` (a drone's owner)
fn credited_attacker(state: &GameState, slot: Slot) -> Option<EntityId> {
    state.slot_body(slot).map(|b| state.resolve_attacker(b.id))
}

fn is_friendly(state: &GameState, a: Slot, b: Slot) -> bool {
    let (Some(body_a), Some(body_b)) = (state.slot_body(a), state.slot_body(b)) else {
        return false;
    };
    if body_a.team.is_allied_with(body_b.team) {
        return true;
    }
    matches!(
        (state.slot_owner(a), state.slot_owner(b)),
        (Some(owner_a), Some(owner_b)) if owner_a == owner_b
    )
}

/// Resolve every mobile-vs-hazard and mobile-vs-mobile overlap for this tick
pub fn resolve_collisions(state: &mut GameState) {
    let slots = state.ram_slots();
    for (i, &a) in slots.iter().enumerate() {
        if !state.slot_body(a).is_some_and(|b| b.is_alive()) {
            continue;
        }
        ram_hazards(state, a);

        for &b in &slots[i + 1..] {
            if !state.slot_body(a).is_some_and(|b| b.is_alive()) {
                break;
            }
            ram_pair(state, a, b);
        }
    }

    // shoves may push bodies past the walls
    let world_size = state.config.world_size;
    for slot in slots {
        if let Some(body) = state.slot_body_mut(slot) {
            body.clamp_to(world_size);
        }
    }
    for hazard in &mut state.hazards {
        hazard.body.clamp_to(world_size);
    }
}

fn ram_hazards(state: &mut GameState, slot: Slot) {
    let damage = ram_damage(state, slot);
    let Some(attacker) = credited_attacker(state, slot) else {
        return;
    };

    for h in 0..state.hazards.len() {
        let Some(mobile) = state.slot_body(slot) else {
            return;
        };
        if !mobile.is_alive() {
            return;
        }
        let (mobile_pos, mobile_radius) = (mobile.pos, mobile.radius);

        let hazard = &mut state.hazards[h];
        if !hazard.body.is_alive() {
            continue;
        }
        let contact = circle_collision(mobile_pos, mobile_radius, hazard.body.pos, hazard.body.radius);
        if !contact.hit {
            continue;
        }

        let push = contact.normal * HAZARD_PUSH_STEP;
        hazard.body.pos -= push;
        hazard.body.hp -= damage;
        hazard.ledger.record(attacker, damage);
        let destroyed = !hazard.body.is_alive();

        if let Some(mobile) = state.slot_body_mut(slot) {
            mobile.pos += push;
            mobile.hp -= RAM_RECOIL;
        }
        if destroyed {
            distribute_reward(state, h);
        }
    }
}

fn ram_pair(state: &mut GameState, a: Slot, b: Slot) {
    let (Some(body_a), Some(body_b)) = (state.slot_body(a), state.slot_body(b)) else {
        return;
    };
    if !body_b.is_alive() {
        return;
    }
    let contact = circle_collision(body_a.pos, body_a.radius, body_b.pos, body_b.radius);
    if !contact.hit {
        return;
    }
    let (id_a, id_b) = (body_a.id, body_b.id);

    let friendly = is_friendly(state, a, b);
    let a_is_drone = matches!(a, Slot::Minion(_));
    let b_is_drone = matches!(b, Slot::Minion(_));
    let pass_through = friendly && a_is_drone != b_is_drone;

    if !pass_through {
        let shove = contact.normal * (contact.penetration / 2.0);
        if let Some(body) = state.slot_body_mut(a) {
            body.pos += shove;
        }
        if let Some(body) = state.slot_body_mut(b) {
            body.pos -= shove;
        }
    }
    if friendly {
        return;
    }

    let damage_a = ram_damage(state, a);
    let damage_b = ram_damage(state, b);
    let credit_a = credited_attacker(state, a);
    let credit_b = credited_attacker(state, b);

    let a_killed = hurt(state, a, damage_b);
    let b_killed = hurt(state, b, damage_a);
    if a_killed {
        on_ram_kill(state, a, id_a, credit_b);
    }
    if b_killed {
        on_ram_kill(state, b, id_b, credit_a);
    }
}

/// Apply damage; true on the alive-to-dead transition
fn hurt(state: &mut GameState, slot: Slot, damage: f32) -> bool {
    match state.slot_body_mut(slot) {
        Some(body) if body.is_alive() => {
            body.hp -= damage;
            !body.is_alive()
        }
        _ => false,
    }
}

fn on_ram_kill(state: &mut GameState, victim_slot: Slot, victim: EntityId, killer: Option<EntityId>) {
    if let Some(avatar) = state.avatar_id().filter(|&id| killer == Some(id)) {
        award(state, avatar, RAM_KILL_BONUS);
    }
    if !matches!(victim_slot, Slot::Minion(_)) {
        log::debug!("{:?} rammed to death by {:?}", victim, killer);
        state.events.push(GameEvent::CombatantKilled { victim, killer });
    }
}
