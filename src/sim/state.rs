//! Game state and core simulation types
//!
//! Every simulated body shares a [`Body`]; the five entity kinds wrap it with
//! their own payload. Cross-entity references (owners, attackers, targets)
//! are plain [`EntityId`]s resolved through [`GameState::find`], so a lookup
//! may legitimately come back empty once the referent has died.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ledger::DamageLedger;
use super::progression::{Progression, Stats};
use super::weapon::WeaponClass;
use crate::WorldConfig;
use crate::consts::*;

/// Unique identifier for a simulated body, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Team affiliation. `Neutral` (team 0) is hostile to everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Neutral,
    Blue,
    Red,
}

impl Team {
    pub const COLOR_BLUE: u32 = 0x00b2e1;
    pub const COLOR_RED: u32 = 0xf14e54;
    pub const COLOR_NEUTRAL: u32 = 0x999999;

    /// Same non-neutral team
    pub fn is_allied_with(self, other: Team) -> bool {
        self != Team::Neutral && self == other
    }

    /// Whether a projectile fired by `self` may hit a body on `target`
    pub fn can_hit(self, target: Team) -> bool {
        target == Team::Neutral || target != self
    }

    pub fn color(self) -> u32 {
        match self {
            Team::Neutral => Self::COLOR_NEUTRAL,
            Team::Blue => Self::COLOR_BLUE,
            Team::Red => Self::COLOR_RED,
        }
    }
}

/// Capabilities every simulated body has
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub color: u32,
    pub team: Team,
}

impl Body {
    pub fn new(id: EntityId, pos: Vec2, radius: f32, hp: f32, color: u32, team: Team) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            hp,
            max_hp: hp,
            color,
            team,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Integrate velocity then apply per-tick drag
    pub fn integrate(&mut self, drag: f32) {
        self.pos += self.vel;
        self.vel *= drag;
    }

    /// Keep the body inside the square world
    pub fn clamp_to(&mut self, world_size: f32) {
        self.pos = self.pos.clamp(Vec2::ZERO, Vec2::splat(world_size));
    }

    /// Regenerate toward max hp
    pub fn regen(&mut self, amount: f32) {
        if self.hp < self.max_hp {
            self.hp += amount;
        }
    }
}

/// Per-entity fire/summon cooldown measured on the simulation clock
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReloadTimer {
    /// Clock time of the last discharge (None = never fired)
    pub last_fire_ms: Option<f64>,
}

impl ReloadTimer {
    /// Cooldown between discharges for a given reload stat
    pub fn interval_ms(reload_stat: u8) -> f64 {
        RELOAD_BASE_MS / (1.0 + reload_stat as f64 * RELOAD_PER_POINT)
    }

    pub fn is_ready(&self, now_ms: f64, reload_stat: u8) -> bool {
        match self.last_fire_ms {
            None => true,
            Some(last) => now_ms - last > Self::interval_ms(reload_stat),
        }
    }

    pub fn reset(&mut self, now_ms: f64) {
        self.last_fire_ms = Some(now_ms);
    }
}

/// The player's tank (one per session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub body: Body,
    pub name: String,
    pub aim_angle: f32,
    /// World-space aim point (drones steer toward it)
    pub aim_point: Option<Vec2>,
    pub reload: ReloadTimer,
    pub score: u64,
    pub class: WeaponClass,
    pub stats: Stats,
    pub progression: Progression,
}

impl Avatar {
    /// Apply the max-health stat to the body
    pub fn refresh_max_hp(&mut self) {
        let max_hp = TANK_BASE_HP + self.stats.max_hp as f32 * HP_PER_MAX_HP_POINT;
        let gained = max_hp - self.body.max_hp;
        self.body.max_hp = max_hp;
        if gained > 0.0 {
            self.body.hp += gained;
        }
    }
}

/// What a bot decided to do on its last AI pass
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BotIntent {
    /// Acceleration to apply next tick
    pub accel: Vec2,
    /// Discharge the weapon next tick
    pub fire: bool,
}

/// An AI-controlled tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub body: Body,
    pub name: String,
    pub aim_angle: f32,
    pub reload: ReloadTimer,
    pub score: u64,
    pub level: u32,
    pub class: WeaponClass,
    /// Weak reference to the current target
    pub target: Option<EntityId>,
    /// Fixed at creation; only parameterizes weapon math
    pub stats: Stats,
    pub wander_angle: f32,
    pub intent: BotIntent,
}

impl Bot {
    /// Stat spread every bot is created with
    pub const STATS: Stats = Stats {
        regen: 1,
        max_hp: 1,
        body_damage: 1,
        bullet_speed: 2,
        bullet_pen: 2,
        bullet_damage: 2,
        reload: 2,
        move_speed: 1,
    };
}

/// Hazard shapes, ordered by rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Square,
    Triangle,
    Hexagon,
    Pentagon,
    AlphaPentagon,
}

/// Per-kind balance row: radius, max hp, experience, color, polygon sides
struct HazardTraits(f32, f32, u64, u32, u32);

impl HazardKind {
    fn traits(self) -> HazardTraits {
        match self {
            HazardKind::Square => HazardTraits(15.0, 15.0, 25, 0xffe869, 4),
            HazardKind::Triangle => HazardTraits(18.0, 40.0, 45, 0xfc7677, 3),
            HazardKind::Hexagon => HazardTraits(22.0, 70.0, 100, 0x76fc9b, 6),
            HazardKind::Pentagon => HazardTraits(25.0, 120.0, 150, 0x768dfc, 5),
            HazardKind::AlphaPentagon => HazardTraits(60.0, 1000.0, 3000, 0x9b76fc, 5),
        }
    }

    pub fn radius(self) -> f32 {
        self.traits().0
    }

    pub fn max_hp(self) -> f32 {
        self.traits().1
    }

    pub fn experience(self) -> u64 {
        self.traits().2
    }

    pub fn color(self) -> u32 {
        self.traits().3
    }

    pub fn sides(self) -> u32 {
        self.traits().4
    }
}

/// Passive destructible shape that yields experience
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub body: Body,
    pub kind: HazardKind,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub experience: u64,
    pub ledger: DamageLedger,
}

/// A bullet. `body.hp` is remaining penetration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub body: Body,
    /// Weak reference to whatever fired it
    pub owner: EntityId,
    /// Who gets credit for its damage (a drone's owner for drone shots)
    pub attacker: EntityId,
    pub damage: f32,
    /// Ticks left before expiry
    pub lifetime: u32,
}

/// Drone variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinionKind {
    /// Rams only
    SquareDrone,
    /// Rams and fires its own bullets
    TankDrone,
}

/// An owned drone that paths on its own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minion {
    pub body: Body,
    /// Weak reference to the summoning tank
    pub owner: EntityId,
    pub kind: MinionKind,
    pub target_pos: Vec2,
    /// Ram damage
    pub damage: f32,
    pub max_speed: f32,
    pub aim_angle: f32,
    pub reload: ReloadTimer,
    /// Owner stats at the moment of summoning
    pub stats: Stats,
}

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No avatar yet; waiting for a spawn command
    Start,
    /// Active gameplay
    Playing,
    /// Avatar destroyed; waiting for a respawn command
    GameOver,
}

/// Notable things that happened during the last tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HazardDestroyed { hazard: EntityId, kind: HazardKind },
    CombatantKilled { victim: EntityId, killer: Option<EntityId> },
    LevelUp { entity: EntityId, level: u32 },
    Evolved { entity: EntityId, class: WeaponClass },
    AvatarDied { score: u64 },
}

/// Borrowed view of an entity that attacker and owner ids can name
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Avatar(&'a Avatar),
    Bot(&'a Bot),
    Minion(&'a Minion),
}

impl<'a> EntityRef<'a> {
    /// Tanks (avatar or bot)
    pub fn is_combatant(&self) -> bool {
        matches!(self, EntityRef::Avatar(_) | EntityRef::Bot(_))
    }
}

/// Mobile bodies that take part in ramming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Avatar,
    Bot(usize),
    Minion(usize),
}

/// Bot name roster
pub const BOT_NAMES: [&str; 15] = [
    "Crasher", "Fighter", "Guardian", "Stalker", "Nemesis", "Hunter", "Gladiator", "Titan",
    "Phantom", "Slayer", "Raptor", "Viper", "Goliath", "Specter", "Warlord",
];

fn default_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// The whole world, mutated in place by one tick at a time
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: WorldConfig,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation clock (ms)
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Time without input activity while not playing (ms)
    pub idle_ms: f64,
    pub avatar: Option<Avatar>,
    pub bots: Vec<Bot>,
    pub hazards: Vec<Hazard>,
    pub projectiles: Vec<Projectile>,
    pub minions: Vec<Minion>,
    /// Events raised during the last tick
    pub events: Vec<GameEvent>,
    /// Experience of the last avatar, carried into the next spawn
    pub last_experience: u64,
    next_id: u32,
}

impl GameState {
    /// Create a new world with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, WorldConfig::default())
    }

    pub fn with_config(seed: u64, config: WorldConfig) -> Self {
        Self {
            config,
            rng: default_rng(seed),
            phase: GamePhase::Start,
            clock_ms: 0.0,
            time_ticks: 0,
            idle_ms: 0.0,
            avatar: None,
            bots: Vec::new(),
            hazards: Vec::new(),
            projectiles: Vec::new(),
            minions: Vec::new(),
            events: Vec::new(),
            last_experience: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    /// Clear the world back to the start screen
    pub fn reset_world(&mut self) {
        log::info!("Resetting world after {} ticks", self.time_ticks);
        self.avatar = None;
        self.bots.clear();
        self.hazards.clear();
        self.projectiles.clear();
        self.minions.clear();
        self.events.clear();
        self.phase = GamePhase::Start;
        self.idle_ms = 0.0;
    }

    /// (Re)create the avatar. Projectiles and drones are cleared; half of the
    /// previous avatar's experience is carried over as starting score.
    pub fn spawn_avatar(&mut self, team: Team, name: &str) -> EntityId {
        let team = if team == Team::Neutral { Team::Blue } else { team };
        let kept = (self.last_experience as f64 * RESPAWN_KEEP).floor() as u64;

        let x = match team {
            Team::Red => self.config.world_size - AVATAR_SPAWN_INSET,
            _ => AVATAR_SPAWN_INSET,
        };
        let y = self.rng.random::<f32>() * self.config.world_size;

        let id = self.next_entity_id();
        let mut progression = Progression::default();
        progression.add_experience(kept);

        self.projectiles.clear();
        self.minions.clear();
        self.avatar = Some(Avatar {
            body: Body::new(id, Vec2::new(x, y), TANK_RADIUS, TANK_BASE_HP, team.color(), team),
            name: name.to_string(),
            aim_angle: 0.0,
            aim_point: None,
            reload: ReloadTimer::default(),
            score: kept,
            class: WeaponClass::Basic,
            stats: Stats::default(),
            progression,
        });
        self.last_experience = 0;
        self.phase = GamePhase::Playing;
        self.idle_ms = 0.0;

        log::info!(
            "Spawned avatar {:?} '{}' on {:?} with {} carried score",
            id,
            name,
            team,
            kept
        );
        id
    }

    /// Id of the live avatar, if any
    pub fn avatar_id(&self) -> Option<EntityId> {
        self.avatar.as_ref().map(|a| a.body.id)
    }

    /// Resolve an attacker or owner id
    pub fn find(&self, id: EntityId) -> Option<EntityRef<'_>> {
        if let Some(avatar) = self.avatar.as_ref().filter(|a| a.body.id == id) {
            return Some(EntityRef::Avatar(avatar));
        }
        if let Some(bot) = self.bots.iter().find(|b| b.body.id == id) {
            return Some(EntityRef::Bot(bot));
        }
        self.minions
            .iter()
            .find(|m| m.body.id == id)
            .map(EntityRef::Minion)
    }

    /// Map a drone to its owner; anything else is its own attacker
    pub fn resolve_attacker(&self, id: EntityId) -> EntityId {
        self.minions
            .iter()
            .find(|m| m.body.id == id)
            .map(|m| m.owner)
            .unwrap_or(id)
    }

    /// All ramming participants in stable order
    pub fn ram_slots(&self) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(1 + self.bots.len() + self.minions.len());
        if self.avatar.is_some() {
            slots.push(Slot::Avatar);
        }
        slots.extend((0..self.bots.len()).map(Slot::Bot));
        slots.extend((0..self.minions.len()).map(Slot::Minion));
        slots
    }

    /// Body behind a slot. Slots are built from the current collections, so
    /// an out-of-range slot is a caller bug.
    pub fn slot_body(&self, slot: Slot) -> Option<&Body> {
        match slot {
            Slot::Avatar => self.avatar.as_ref().map(|a| &a.body),
            Slot::Bot(i) => self.bots.get(i).map(|b| &b.body),
            Slot::Minion(i) => self.minions.get(i).map(|m| &m.body),
        }
    }

    pub fn slot_body_mut(&mut self, slot: Slot) -> Option<&mut Body> {
        match slot {
            Slot::Avatar => self.avatar.as_mut().map(|a| &mut a.body),
            Slot::Bot(i) => self.bots.get_mut(i).map(|b| &mut b.body),
            Slot::Minion(i) => self.minions.get_mut(i).map(|m| &mut m.body),
        }
    }

    /// Owner of a drone slot
    pub fn slot_owner(&self, slot: Slot) -> Option<EntityId> {
        match slot {
            Slot::Minion(i) => self.minions.get(i).map(|m| m.owner),
            _ => None,
        }
    }

    /// Live drones belonging to `owner`
    pub fn minion_count(&self, owner: EntityId) -> usize {
        self.minions
            .iter()
            .filter(|m| m.owner == owner && m.body.is_alive())
            .count()
    }

    /// Pick a random bot name
    pub fn random_bot_name(&mut self) -> &'static str {
        BOT_NAMES[self.rng.random_range(0..BOT_NAMES.len())]
    }
}
