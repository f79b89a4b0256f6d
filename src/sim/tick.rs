//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Phases run in
//! a fixed order and each one sees what the previous ones already mutated:
//! population, movement, ramming, weapons, drones, bot AI, progression.

use glam::Vec2;

use super::progression::StatKind;
use super::state::{GameEvent, GamePhase, GameState, Slot, Team};
use super::weapon::{self, WeaponClass};
use super::{ai, combat, minion, population};
use crate::angle_between;
use crate::consts::*;

/// Request to (re)start a match
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub team: Team,
    pub name: String,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement direction (any length; zero means no thrust)
    pub move_dir: Vec2,
    /// Facing angle in radians
    pub aim_angle: Option<f32>,
    /// World-space aim point. Also sets the facing when `aim_angle` is None.
    pub aim_point: Option<Vec2>,
    /// Fire held down
    pub fire: bool,
    /// Spend a stat point
    pub allocate: Option<StatKind>,
    /// Evolve into this class
    pub select_class: Option<WeaponClass>,
    /// Start or respawn
    pub spawn: Option<SpawnRequest>,
    /// Any user activity this frame (resets the idle timer)
    pub activity: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if let Some(spawn) = &input.spawn {
        if state.phase != GamePhase::Playing {
            state.spawn_avatar(spawn.team, &spawn.name);
        }
    }

    if state.phase != GamePhase::Playing {
        idle(state, input.activity || input.spawn.is_some(), dt);
        return;
    }

    state.time_ticks += 1;
    state.clock_ms += f64::from(dt) * 1000.0;

    apply_upgrades(state, input);
    population::top_up(state);
    move_bodies(state, input);
    combat::resolve_collisions(state);
    fire_weapons(state, input);
    weapon::update_projectiles(state);
    minion::update_minions(state);
    ai::update_bots(state);
    state.advance_bots();
    check_avatar(state);
}

/// Outside a match: count idle time and clear the world once it runs out
fn idle(state: &mut GameState, active: bool, dt: f32) {
    if active {
        state.idle_ms = 0.0;
        return;
    }
    state.idle_ms += f64::from(dt) * 1000.0;
    if state.idle_ms > state.config.idle_reset_ms {
        state.reset_world();
    }
}

fn apply_upgrades(state: &mut GameState, input: &TickInput) {
    if let Some(kind) = input.allocate {
        if let Err(err) = state.allocate_stat(kind) {
            log::debug!("Stat allocation rejected: {}", err);
        }
    }
    if let Some(class) = input.select_class {
        if let Err(err) = state.select_class(class) {
            log::debug!("Class selection rejected: {}", err);
        }
    }
}

fn move_bodies(state: &mut GameState, input: &TickInput) {
    let world_size = state.config.world_size;

    if let Some(avatar) = state.avatar.as_mut().filter(|a| a.body.is_alive()) {
        let accel = AVATAR_ACCEL * (1.0 + avatar.stats.move_speed as f32 * MOVE_SPEED_PER_POINT);
        avatar.body.vel += input.move_dir.normalize_or_zero() * accel;
        avatar.body.integrate(TANK_DRAG);
        avatar.body.clamp_to(world_size);

        if input.aim_point.is_some() {
            avatar.aim_point = input.aim_point;
        }
        match (input.aim_angle, input.aim_point) {
            (Some(angle), _) => avatar.aim_angle = angle,
            (None, Some(point)) if point != avatar.body.pos => {
                avatar.aim_angle = angle_between(avatar.body.pos, point);
            }
            _ => {}
        }

        let regen = AVATAR_REGEN_BASE + avatar.stats.regen as f32 * AVATAR_REGEN_PER_POINT;
        avatar.body.regen(regen);
    }

    for bot in &mut state.bots {
        bot.body.vel += bot.intent.accel;
        bot.body.integrate(TANK_DRAG);
        bot.body.clamp_to(world_size);
    }

    // hazards only move when rammed
    for hazard in &mut state.hazards {
        hazard.rotation += hazard.rotation_speed;
    }
}

fn fire_weapons(state: &mut GameState, input: &TickInput) {
    let avatar_fires = state
        .avatar
        .as_ref()
        .is_some_and(|a| a.body.is_alive() && (input.fire || a.class.summons_drones()));
    if avatar_fires {
        weapon::discharge(state, Slot::Avatar);
    }

    for i in 0..state.bots.len() {
        if state.bots[i].intent.fire {
            weapon::discharge(state, Slot::Bot(i));
        }
    }
}

fn check_avatar(state: &mut GameState) {
    let Some(avatar) = state.avatar.as_ref() else {
        return;
    };
    if avatar.body.is_alive() {
        return;
    }
    let score = avatar.score;
    state.last_experience = avatar.progression.experience;
    state.phase = GamePhase::GameOver;
    state.idle_ms = 0.0;
    state.events.push(GameEvent::AvatarDied { score });
    log::info!("Avatar destroyed with {} score at tick {}", score, state.time_ticks);
}
