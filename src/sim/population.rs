//! Keeps the arena stocked with hazards and bots

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::ledger::DamageLedger;
use super::state::{Body, Bot, BotIntent, GameState, Hazard, HazardKind, ReloadTimer, Team};
use super::weapon::WeaponClass;
use crate::consts::{TANK_BASE_HP, TANK_RADIUS};

/// Share of hazards rolled inside the center zone
const CENTER_SPAWN_CHANCE: f32 = 0.15;

impl HazardKind {
    /// Probability ladder. The center zone only ever rolls the top rungs.
    pub fn roll(roll: f32, in_center: bool) -> Self {
        if in_center || roll > 0.85 {
            if roll > 0.98 {
                HazardKind::AlphaPentagon
            } else {
                HazardKind::Pentagon
            }
        } else if roll > 0.7 {
            HazardKind::Hexagon
        } else if roll > 0.45 {
            HazardKind::Triangle
        } else {
            HazardKind::Square
        }
    }
}

/// Drop dead hazards and bots, then spawn replacements up to the targets
pub fn top_up(state: &mut GameState) {
    state.hazards.retain(|h| h.body.is_alive());
    state.bots.retain(|b| b.body.is_alive());

    while state.hazards.len() < state.config.hazard_count {
        spawn_hazard(state);
    }
    while state.bots.len() < state.config.bot_count {
        spawn_bot(state);
    }
}

fn spawn_hazard(state: &mut GameState) {
    let rng = &mut state.rng;
    let config = &state.config;

    let in_center = rng.random::<f32>() < CENTER_SPAWN_CHANCE;
    let kind = HazardKind::roll(rng.random(), in_center);

    let pos = if in_center {
        let min = config.center_zone_min();
        Vec2::new(
            min + rng.random::<f32>() * config.center_zone_size,
            min + rng.random::<f32>() * config.center_zone_size,
        )
    } else {
        Vec2::new(
            config.base_size + rng.random::<f32>() * config.playable_width(),
            rng.random::<f32>() * config.world_size,
        )
    };
    let rotation = rng.random::<f32>() * TAU;
    let rotation_speed = (rng.random::<f32>() - 0.5) * 0.02;

    let id = state.next_entity_id();
    state.hazards.push(Hazard {
        body: Body::new(id, pos, kind.radius(), kind.max_hp(), kind.color(), Team::Neutral),
        kind,
        rotation,
        rotation_speed,
        experience: kind.experience(),
        ledger: DamageLedger::new(),
    });
}

fn spawn_bot(state: &mut GameState) {
    let team = if state.rng.random_bool(0.5) {
        Team::Blue
    } else {
        Team::Red
    };
    let world_size = state.config.world_size;
    let depth = state.rng.random::<f32>() * state.config.base_size;
    let x = match team {
        Team::Red => world_size - depth,
        _ => depth,
    };
    let y = state.rng.random::<f32>() * world_size;
    let name = state.random_bot_name().to_string();
    let wander_angle = state.rng.random::<f32>() * TAU;

    let id = state.next_entity_id();
    log::debug!("Spawning bot {:?} '{}' for {:?}", id, name, team);
    state.bots.push(Bot {
        body: Body::new(id, Vec2::new(x, y), TANK_RADIUS, TANK_BASE_HP, team.color(), team),
        name,
        aim_angle: 0.0,
        reload: ReloadTimer::default(),
        score: 0,
        level: 1,
        class: WeaponClass::Basic,
        target: None,
        stats: Bot::STATS,
        wander_angle,
        intent: BotIntent::default(),
    });
}
