//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (collections are append-only `Vec`s)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod ledger;
pub mod minion;
pub mod population;
pub mod progression;
pub mod state;
pub mod tick;
pub mod view;
pub mod weapon;

pub use collision::{CollisionResult, circle_collision, circles_overlap};
pub use ledger::DamageLedger;
pub use progression::{StatKind, Stats, UpgradeError, threshold};
pub use state::{
    Avatar, Body, Bot, EntityId, EntityRef, GameEvent, GamePhase, GameState, Hazard, HazardKind,
    Minion, MinionKind, Projectile, Team,
};
pub use tick::{SpawnRequest, TickInput, tick};
pub use view::WorldView;
pub use weapon::WeaponClass;
