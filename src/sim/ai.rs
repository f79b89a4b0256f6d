//! Bot controller: target acquisition, pursuit with kiting, and wandering
//!
//! Each pass only writes the bot's facing, target and [`BotIntent`]; the
//! tick pipeline applies the intent on the next movement phase.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use rand::Rng;

use super::state::{EntityId, GameState};
use crate::consts::BOT_REGEN;
use crate::{angle_between, normalize_angle, polar_to_cartesian};

/// Hostile tanks further than this are ignored
pub const COMBATANT_SCAN_RANGE: f32 = 1200.0;
/// Hazards further than this are ignored
pub const HAZARD_SCAN_RANGE: f32 = 800.0;
/// Bots back away from tanks closer than this
pub const KITE_DISTANCE: f32 = 300.0;

pub const PURSUIT_ACCEL: f32 = 0.15;
pub const WANDER_ACCEL: f32 = 0.1;
const WANDER_TURN_CHANCE: f64 = 0.02;
const WANDER_TURN_MAX: f32 = 1.0;
/// Bots turn back inward this close to an edge
const EDGE_MARGIN: f32 = 100.0;

/// What a bot locked onto this pass
#[derive(Debug, Clone, Copy, PartialEq)]
struct Lock {
    id: EntityId,
    pos: Vec2,
    combatant: bool,
}

/// Nearest hostile tank in range, else the nearest hazard in range
fn acquire(state: &GameState, bot: usize) -> Option<Lock> {
    let me = &state.bots[bot].body;

    let avatar = state.avatar.iter().map(|a| &a.body);
    let tanks = state.bots.iter().map(|b| &b.body).chain(avatar);
    let nearest_tank = tanks
        .filter(|t| t.id != me.id && t.is_alive() && t.team != me.team)
        .map(|t| (t, t.pos.distance(me.pos)))
        .filter(|&(_, d)| d < COMBATANT_SCAN_RANGE)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((t, _)) = nearest_tank {
        return Some(Lock {
            id: t.id,
            pos: t.pos,
            combatant: true,
        });
    }

    state
        .hazards
        .iter()
        .map(|h| &h.body)
        .filter(|h| h.is_alive())
        .map(|h| (h, h.pos.distance(me.pos)))
        .filter(|&(_, d)| d < HAZARD_SCAN_RANGE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(h, _)| Lock {
            id: h.id,
            pos: h.pos,
            combatant: false,
        })
}

/// Run one AI pass for every bot
pub fn update_bots(state: &mut GameState) {
    let world_size = state.config.world_size;
    for i in 0..state.bots.len() {
        if !state.bots[i].body.is_alive() {
            continue;
        }
        let lock = acquire(state, i);

        match lock {
            Some(lock) => {
                let bot = &mut state.bots[i];
                bot.target = Some(lock.id);
                bot.aim_angle = angle_between(bot.body.pos, lock.pos);
                let mut heading = bot.aim_angle;
                if lock.combatant && bot.body.pos.distance(lock.pos) < KITE_DISTANCE {
                    heading += PI;
                }
                bot.intent.accel = polar_to_cartesian(PURSUIT_ACCEL, heading);
                bot.intent.fire = true;
            }
            None => {
                let turn = state.rng.random_bool(WANDER_TURN_CHANCE);
                let delta = state.rng.random_range(-WANDER_TURN_MAX..=WANDER_TURN_MAX);
                let bot = &mut state.bots[i];
                bot.target = None;
                if turn {
                    bot.wander_angle = normalize_angle(bot.wander_angle + delta);
                }
                bot.wander_angle = steer_off_edges(bot.body.pos, bot.wander_angle, world_size);
                bot.intent.accel = polar_to_cartesian(WANDER_ACCEL, bot.wander_angle);
                bot.intent.fire = false;
            }
        }

        state.bots[i].body.regen(BOT_REGEN);
    }
}

/// Force a cardinal heading back into the field near any edge
fn steer_off_edges(pos: Vec2, heading: f32, world_size: f32) -> f32 {
    let mut heading = heading;
    if pos.x < EDGE_MARGIN {
        heading = 0.0;
    }
    if pos.x > world_size - EDGE_MARGIN {
        heading = PI;
    }
    if pos.y < EDGE_MARGIN {
        heading = FRAC_PI_2;
    }
    if pos.y > world_size - EDGE_MARGIN {
        heading = -FRAC_PI_2;
    }
    heading
}
