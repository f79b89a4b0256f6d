//! Tank Arena - authoritative simulation core for a team arena shooter
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (physics, combat, weapons, drones, bots, progression)
//! - `leaderboard`: Top-10 standings and team totals derived from the world
//! - `config`: Data-driven world tuning

pub mod config;
pub mod leaderboard;
pub mod sim;

pub use config::{ConfigError, WorldConfig};
pub use leaderboard::Leaderboard;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (display rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Highest reachable level
    pub const MAX_LEVEL: u32 = 60;
    /// Per-attribute stat cap
    pub const MAX_STAT: u8 = 8;

    /// Tank defaults (avatar and bots)
    pub const TANK_RADIUS: f32 = 20.0;
    pub const TANK_BASE_HP: f32 = 100.0;
    /// Extra max hp per point in the max-health stat
    pub const HP_PER_MAX_HP_POINT: f32 = 20.0;

    /// Avatar movement (per tick)
    pub const AVATAR_ACCEL: f32 = 0.35;
    pub const MOVE_SPEED_PER_POINT: f32 = 0.12;
    pub const TANK_DRAG: f32 = 0.88;
    /// Avatar spawn distance from its side wall
    pub const AVATAR_SPAWN_INSET: f32 = 300.0;

    /// Avatar regen: base + per point, per tick
    pub const AVATAR_REGEN_BASE: f32 = 0.02;
    pub const AVATAR_REGEN_PER_POINT: f32 = 0.04;
    /// Bots regen at a fixed rate regardless of stats
    pub const BOT_REGEN: f32 = 0.03;

    /// Ramming
    pub const HAZARD_PUSH_STEP: f32 = 0.5;
    pub const RAM_RECOIL: f32 = 0.5;
    /// Flat bonus for a ram kill credited to the avatar
    pub const RAM_KILL_BONUS: u64 = 100;
    /// Projectile kill reward = target radius * this
    pub const KILL_REWARD_PER_RADIUS: f32 = 20.0;

    /// Weapon reload: interval_ms = RELOAD_BASE_MS / (1 + reload * RELOAD_PER_POINT)
    pub const RELOAD_BASE_MS: f64 = 850.0;
    pub const RELOAD_PER_POINT: f64 = 0.7;

    /// Experience share of the top ledger contributor (60%)
    pub const TOP_SHARE_NUM: u64 = 3;
    pub const TOP_SHARE_DEN: u64 = 5;

    /// Respawn keeps this fraction of prior experience
    pub const RESPAWN_KEEP: f64 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading (radians) pointing from `from` toward `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
