//! Experience curve, levelling, stat points and the evolution gate

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{GameEvent, GameState};
use super::weapon::WeaponClass;
use crate::consts::{MAX_LEVEL, MAX_STAT};

/// Why an upgrade request was turned down. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeError {
    #[error("no stat points available")]
    NoPointsAvailable,
    #[error("{0:?} is already at the cap")]
    StatCapped(StatKind),
    #[error("{to:?} does not evolve from {from:?}")]
    NotAnEvolution { from: WeaponClass, to: WeaponClass },
    #[error("evolving needs level {required}, currently {level}")]
    LevelGateNotMet { required: u32, level: u32 },
    #[error("no avatar in play")]
    NoAvatar,
}

/// The eight upgradable attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Regen,
    MaxHp,
    BodyDamage,
    BulletSpeed,
    BulletPen,
    BulletDamage,
    Reload,
    MoveSpeed,
}

impl StatKind {
    pub const ALL: [StatKind; 8] = [
        StatKind::Regen,
        StatKind::MaxHp,
        StatKind::BodyDamage,
        StatKind::BulletSpeed,
        StatKind::BulletPen,
        StatKind::BulletDamage,
        StatKind::Reload,
        StatKind::MoveSpeed,
    ];

    /// Number-row hotkey mapping (1-8)
    pub fn from_hotkey(key: u8) -> Option<Self> {
        Self::ALL.get(usize::from(key).checked_sub(1)?).copied()
    }
}

/// Allocated stat points, each in `0..=MAX_STAT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub regen: u8,
    pub max_hp: u8,
    pub body_damage: u8,
    pub bullet_speed: u8,
    pub bullet_pen: u8,
    pub bullet_damage: u8,
    pub reload: u8,
    pub move_speed: u8,
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> u8 {
        match kind {
            StatKind::Regen => self.regen,
            StatKind::MaxHp => self.max_hp,
            StatKind::BodyDamage => self.body_damage,
            StatKind::BulletSpeed => self.bullet_speed,
            StatKind::BulletPen => self.bullet_pen,
            StatKind::BulletDamage => self.bullet_damage,
            StatKind::Reload => self.reload,
            StatKind::MoveSpeed => self.move_speed,
        }
    }

    fn slot_mut(&mut self, kind: StatKind) -> &mut u8 {
        match kind {
            StatKind::Regen => &mut self.regen,
            StatKind::MaxHp => &mut self.max_hp,
            StatKind::BodyDamage => &mut self.body_damage,
            StatKind::BulletSpeed => &mut self.bullet_speed,
            StatKind::BulletPen => &mut self.bullet_pen,
            StatKind::BulletDamage => &mut self.bullet_damage,
            StatKind::Reload => &mut self.reload,
            StatKind::MoveSpeed => &mut self.move_speed,
        }
    }

    pub fn total(&self) -> u32 {
        StatKind::ALL.iter().map(|&k| u32::from(self.get(k))).sum()
    }

    /// Ram damage dealt by a tank with these stats
    pub fn ram_damage(&self) -> f32 {
        1.0 + self.body_damage as f32 * 2.0
    }
}

/// Experience needed to reach level `n + 1` (n in 0..MAX_LEVEL)
pub fn threshold(n: u32) -> u64 {
    ((n as f64 + 1.0).powf(2.6) * 12.0).floor() as u64
}

/// Whether reaching `level` grants a stat point
pub fn grants_point(level: u32) -> bool {
    level < 10 || level % 2 == 0
}

/// Total points earned on the way from level 1 to `level`
pub fn points_through(level: u32) -> u32 {
    (2..=level.min(MAX_LEVEL)).filter(|&l| grants_point(l)).count() as u32
}

/// Level needed before `class` may evolve
pub fn evolution_gate(class: WeaponClass) -> u32 {
    if class == WeaponClass::Basic { 15 } else { 30 }
}

/// Bots auto-evolve on every multiple of this level
pub const BOT_EVOLVE_EVERY: u32 = 15;

/// Player-side progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    /// Never decreases
    pub experience: u64,
    /// 1..=MAX_LEVEL, never decreases
    pub level: u32,
    /// Unspent stat points
    pub points: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            experience: 0,
            level: 1,
            points: 0,
        }
    }
}

impl Progression {
    /// Add experience and walk the curve. Returns the levels gained.
    pub fn add_experience(&mut self, amount: u64) -> u32 {
        self.experience += amount;
        let start = self.level;
        while self.level < MAX_LEVEL && self.experience >= threshold(self.level) {
            self.level += 1;
            if grants_point(self.level) {
                self.points += 1;
            }
        }
        self.level - start
    }

    /// Spend one point on `kind`
    pub fn allocate(&mut self, stats: &mut Stats, kind: StatKind) -> Result<(), UpgradeError> {
        if self.points == 0 {
            return Err(UpgradeError::NoPointsAvailable);
        }
        let slot = stats.slot_mut(kind);
        if *slot >= MAX_STAT {
            return Err(UpgradeError::StatCapped(kind));
        }
        *slot += 1;
        self.points -= 1;
        Ok(())
    }

    /// Evolutions currently on offer (empty until the gate is met)
    pub fn available_evolutions(&self, class: WeaponClass) -> &'static [WeaponClass] {
        if self.level >= evolution_gate(class) {
            class.children()
        } else {
            &[]
        }
    }

    /// Validate an explicit class change
    pub fn check_evolution(&self, from: WeaponClass, to: WeaponClass) -> Result<(), UpgradeError> {
        if !from.children().contains(&to) {
            return Err(UpgradeError::NotAnEvolution { from, to });
        }
        let required = evolution_gate(from);
        if self.level < required {
            return Err(UpgradeError::LevelGateNotMet {
                required,
                level: self.level,
            });
        }
        Ok(())
    }
}

impl GameState {
    /// Spend one of the avatar's points on `kind`
    pub fn allocate_stat(&mut self, kind: StatKind) -> Result<(), UpgradeError> {
        let avatar = self.avatar.as_mut().ok_or(UpgradeError::NoAvatar)?;
        avatar.progression.allocate(&mut avatar.stats, kind)?;
        if kind == StatKind::MaxHp {
            avatar.refresh_max_hp();
        }
        log::debug!("Allocated {:?} (now {})", kind, avatar.stats.get(kind));
        Ok(())
    }

    /// Evolve the avatar into `class`
    pub fn select_class(&mut self, class: WeaponClass) -> Result<(), UpgradeError> {
        let avatar = self.avatar.as_mut().ok_or(UpgradeError::NoAvatar)?;
        avatar.progression.check_evolution(avatar.class, class)?;
        log::info!("Avatar evolved {:?} -> {:?}", avatar.class, class);
        avatar.class = class;
        let entity = avatar.body.id;
        self.events.push(GameEvent::Evolved { entity, class });
        Ok(())
    }

    /// Bots level from score, at most one level per call, and auto-evolve
    /// into the first listed child every 15 levels
    pub fn advance_bots(&mut self) {
        for bot in &mut self.bots {
            if bot.level >= MAX_LEVEL || bot.score < threshold(bot.level) {
                continue;
            }
            bot.level += 1;
            self.events.push(GameEvent::LevelUp {
                entity: bot.body.id,
                level: bot.level,
            });
            if bot.level % BOT_EVOLVE_EVERY != 0 {
                continue;
            }
            if let Some(&next) = bot.class.children().first() {
                log::debug!("Bot '{}' evolved {:?} -> {:?}", bot.name, bot.class, next);
                bot.class = next;
                self.events.push(GameEvent::Evolved {
                    entity: bot.body.id,
                    class: next,
                });
            }
        }
    }
}
