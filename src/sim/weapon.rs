//! Weapon classes, the evolution forest, and projectiles
//!
//! A discharge is gated by the shooter's reload timer; once ready, every
//! barrel of the class fires on the same tick. Summoner classes never fire
//! bullets and hand off to the drone subsystem instead.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use super::ledger::{award, distribute_reward};
use super::minion;
use super::progression::Stats;
use super::state::{
    Body, EntityId, GameEvent, GameState, Projectile, ReloadTimer, Slot, Team,
};
use crate::consts::KILL_REWARD_PER_RADIUS;
use crate::polar_to_cartesian;

/// Lifetime in ticks of a tank-fired bullet
pub const BULLET_LIFETIME: u32 = 120;
/// Lifetime in ticks of a drone-fired bullet
pub const DRONE_BULLET_LIFETIME: u32 = 80;

pub const BULLET_RADIUS: f32 = 8.0;
pub const DESTROYER_BULLET_RADIUS: f32 = 15.0;
pub const DRONE_BULLET_RADIUS: f32 = 6.0;

/// Tank configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    Basic,
    Twin,
    Sniper,
    MachineGun,
    FlankGuard,
    Triplet,
    PentaShot,
    Assassin,
    Overseer,
    Destroyer,
    Hybrid,
    Stalker,
    Necromancer,
    ChiefNecromancer,
}

/// Evolution forest: class -> classes it may evolve into.
/// Classes not listed are leaves.
const EVOLUTION_TREE: &[(WeaponClass, &[WeaponClass])] = &[
    (
        WeaponClass::Basic,
        &[
            WeaponClass::Twin,
            WeaponClass::Sniper,
            WeaponClass::MachineGun,
            WeaponClass::FlankGuard,
        ],
    ),
    (WeaponClass::Twin, &[WeaponClass::Triplet, WeaponClass::PentaShot]),
    (WeaponClass::Sniper, &[WeaponClass::Assassin, WeaponClass::Overseer]),
    (WeaponClass::MachineGun, &[WeaponClass::Destroyer, WeaponClass::Hybrid]),
    (WeaponClass::FlankGuard, &[WeaponClass::Stalker]),
    (WeaponClass::Overseer, &[WeaponClass::Necromancer]),
    (WeaponClass::Necromancer, &[WeaponClass::ChiefNecromancer]),
];

/// One barrel of a discharge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrel {
    /// Offset from the facing angle (radians)
    pub angle_offset: f32,
    /// Multiplier on the base bullet speed
    pub speed_mult: f32,
}

impl Barrel {
    const fn at(angle_offset: f32) -> Self {
        Self {
            angle_offset,
            speed_mult: 1.0,
        }
    }
}

impl WeaponClass {
    pub const ALL: [WeaponClass; 14] = [
        WeaponClass::Basic,
        WeaponClass::Twin,
        WeaponClass::Sniper,
        WeaponClass::MachineGun,
        WeaponClass::FlankGuard,
        WeaponClass::Triplet,
        WeaponClass::PentaShot,
        WeaponClass::Assassin,
        WeaponClass::Overseer,
        WeaponClass::Destroyer,
        WeaponClass::Hybrid,
        WeaponClass::Stalker,
        WeaponClass::Necromancer,
        WeaponClass::ChiefNecromancer,
    ];

    /// Classes reachable in one evolution step
    pub fn children(self) -> &'static [WeaponClass] {
        EVOLUTION_TREE
            .iter()
            .find(|(class, _)| *class == self)
            .map(|(_, children)| *children)
            .unwrap_or(&[])
    }

    pub fn parent(self) -> Option<WeaponClass> {
        EVOLUTION_TREE
            .iter()
            .find(|(_, children)| children.contains(&self))
            .map(|(class, _)| *class)
    }

    /// Summoners spawn drones instead of firing
    pub fn summons_drones(self) -> bool {
        matches!(self, WeaponClass::Necromancer | WeaponClass::ChiefNecromancer)
    }

    pub fn bullet_radius(self) -> f32 {
        if self == WeaponClass::Destroyer {
            DESTROYER_BULLET_RADIUS
        } else {
            BULLET_RADIUS
        }
    }

    /// Barrels fired in one discharge
    pub fn barrels(self, rng: &mut impl Rng) -> Vec<Barrel> {
        match self {
            WeaponClass::Twin => vec![Barrel::at(-0.2), Barrel::at(0.2)],
            WeaponClass::Triplet => vec![Barrel::at(-0.3), Barrel::at(0.0), Barrel::at(0.3)],
            WeaponClass::FlankGuard => vec![Barrel::at(0.0), Barrel::at(PI)],
            WeaponClass::Sniper => vec![Barrel {
                angle_offset: 0.0,
                speed_mult: 1.4,
            }],
            WeaponClass::MachineGun => vec![Barrel::at(rng.random_range(-0.4..=0.4))],
            WeaponClass::PentaShot => (-2..=2).map(|i| Barrel::at(i as f32 * 0.4)).collect(),
            WeaponClass::Destroyer => vec![Barrel {
                angle_offset: 0.0,
                speed_mult: 0.5,
            }],
            WeaponClass::Necromancer | WeaponClass::ChiefNecromancer => Vec::new(),
            _ => vec![Barrel::at(0.0)],
        }
    }
}

/// Bullet parameters derived from shooter stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletSpec {
    pub speed: f32,
    pub damage: f32,
    pub penetration: f32,
}

impl BulletSpec {
    pub fn from_stats(stats: &Stats) -> Self {
        Self {
            speed: 5.0 + stats.bullet_speed as f32 * 0.7,
            damage: 8.0 + stats.bullet_damage as f32 * 3.5,
            penetration: 1.0 + stats.bullet_pen as f32 * 1.5,
        }
    }
}

/// Snapshot of whoever is pulling the trigger
struct Shooter {
    id: EntityId,
    attacker: EntityId,
    pos: Vec2,
    aim: f32,
    team: Team,
    color: u32,
    stats: Stats,
    /// None for drones (single forward barrel)
    class: Option<WeaponClass>,
}

impl Shooter {
    fn new(body: &Body, attacker: EntityId, aim: f32, stats: Stats, class: Option<WeaponClass>) -> Self {
        Self {
            id: body.id,
            attacker,
            pos: body.pos,
            aim,
            team: body.team,
            color: body.color,
            stats,
            class,
        }
    }
}

fn shooter(state: &GameState, slot: Slot) -> Option<Shooter> {
    match slot {
        Slot::Avatar => state
            .avatar
            .as_ref()
            .map(|a| Shooter::new(&a.body, a.body.id, a.aim_angle, a.stats, Some(a.class))),
        Slot::Bot(i) => state
            .bots
            .get(i)
            .map(|b| Shooter::new(&b.body, b.body.id, b.aim_angle, b.stats, Some(b.class))),
        Slot::Minion(i) => state
            .minions
            .get(i)
            .map(|m| Shooter::new(&m.body, m.owner, m.aim_angle, m.stats, None)),
    }
}

pub(crate) fn reload_timer(state: &mut GameState, slot: Slot) -> Option<&mut ReloadTimer> {
    match slot {
        Slot::Avatar => state.avatar.as_mut().map(|a| &mut a.reload),
        Slot::Bot(i) => state.bots.get_mut(i).map(|b| &mut b.reload),
        Slot::Minion(i) => state.minions.get_mut(i).map(|m| &mut m.reload),
    }
}

/// Attempt a discharge for the shooter in `slot`. Dead shooters and
/// shooters still reloading do nothing.
pub fn discharge(state: &mut GameState, slot: Slot) {
    let Some(shooter) = shooter(state, slot) else {
        return;
    };
    if state.slot_body(slot).is_none_or(|b| !b.is_alive()) {
        return;
    }

    if shooter.class.is_some_and(WeaponClass::summons_drones) {
        minion::spawn_minion(state, slot);
        return;
    }

    let now = state.clock_ms;
    let ready = reload_timer(state, slot).is_some_and(|r| r.is_ready(now, shooter.stats.reload));
    if !ready {
        return;
    }

    let (barrels, radius, lifetime) = match shooter.class {
        Some(class) => (class.barrels(&mut state.rng), class.bullet_radius(), BULLET_LIFETIME),
        None => (vec![Barrel::at(0.0)], DRONE_BULLET_RADIUS, DRONE_BULLET_LIFETIME),
    };
    let spec = BulletSpec::from_stats(&shooter.stats);

    for barrel in barrels {
        let id = state.next_entity_id();
        let mut body = Body::new(id, shooter.pos, radius, spec.penetration, shooter.color, shooter.team);
        body.vel = polar_to_cartesian(spec.speed * barrel.speed_mult, shooter.aim + barrel.angle_offset);
        state.projectiles.push(Projectile {
            body,
            owner: shooter.id,
            attacker: shooter.attacker,
            damage: spec.damage,
            lifetime,
        });
    }

    if let Some(timer) = reload_timer(state, slot) {
        timer.reset(now);
    }
}

/// Advance every projectile one tick and resolve its hits. Expired or
/// spent projectiles are removed.
pub fn update_projectiles(state: &mut GameState) {
    for i in 0..state.projectiles.len() {
        let mut shot = state.projectiles[i].clone();
        shot.body.pos += shot.body.vel;
        shot.lifetime = shot.lifetime.saturating_sub(1);

        hit_hazards(state, &mut shot);
        hit_combatants(state, &mut shot);

        state.projectiles[i] = shot;
    }
    state
        .projectiles
        .retain(|p| p.lifetime > 0 && p.body.is_alive());
}

fn hit_hazards(state: &mut GameState, shot: &mut Projectile) {
    for h in 0..state.hazards.len() {
        if !shot.body.is_alive() {
            return;
        }
        let hazard = &mut state.hazards[h];
        if !hazard.body.is_alive()
            || !circles_overlap(hazard.body.pos, hazard.body.radius, shot.body.pos, shot.body.radius)
        {
            continue;
        }

        hazard.body.hp -= shot.damage;
        hazard.ledger.record(shot.attacker, shot.damage);
        shot.body.hp -= 1.0;

        if !hazard.body.is_alive() {
            distribute_reward(state, h);
        }
    }
}

fn hit_combatants(state: &mut GameState, shot: &mut Projectile) {
    for slot in state.ram_slots() {
        if !shot.body.is_alive() {
            return;
        }
        let Some(target) = state.slot_body(slot) else {
            continue;
        };
        let own_drone = state
            .slot_owner(slot)
            .is_some_and(|owner| owner == shot.owner || owner == shot.attacker);
        if !target.is_alive()
            || target.id == shot.owner
            || target.id == shot.attacker
            || own_drone
            || !shot.body.team.can_hit(target.team)
            || !circles_overlap(target.pos, target.radius, shot.body.pos, shot.body.radius)
        {
            continue;
        }

        let victim = target.id;
        let reward = (target.radius * KILL_REWARD_PER_RADIUS) as u64;
        let killed = match state.slot_body_mut(slot) {
            Some(body) => {
                body.hp -= shot.damage;
                !body.is_alive()
            }
            None => false,
        };
        shot.body.hp -= 1.0;

        if killed {
            let credited = award(state, shot.attacker, reward);
            log::debug!(
                "{:?} shot down by {:?} ({} reward{})",
                victim,
                shot.attacker,
                reward,
                if credited { "" } else { " dropped" }
            );
            state.events.push(GameEvent::CombatantKilled {
                victim,
                killer: Some(shot.attacker),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bot, BotIntent, Hazard, HazardKind, Minion, MinionKind};
    use crate::sim::ledger::DamageLedger;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        let mut state = GameState::new(42);
        state.spawn_avatar(Team::Blue, "Gunner");
        state
    }

    fn place_hazard(state: &mut GameState, pos: Vec2, kind: HazardKind) -> EntityId {
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            body: Body::new(id, pos, kind.radius(), kind.max_hp(), kind.color(), Team::Neutral),
            kind,
            rotation: 0.0,
            rotation_speed: 0.0,
            experience: kind.experience(),
            ledger: DamageLedger::new(),
        });
        id
    }

    fn place_bot(state: &mut GameState, pos: Vec2, team: Team, hp: f32) -> EntityId {
        let id = state.next_entity_id();
        state.bots.push(Bot {
            body: Body::new(id, pos, 20.0, hp, team.color(), team),
            name: "Target".to_string(),
            aim_angle: 0.0,
            reload: ReloadTimer::default(),
            score: 0,
            level: 1,
            class: WeaponClass::Basic,
            target: None,
            stats: Bot::STATS,
            wander_angle: 0.0,
            intent: BotIntent::default(),
        });
        id
    }

    /// Stationary avatar bullet parked at `pos`
    fn place_shot(state: &mut GameState, pos: Vec2, penetration: f32) {
        let avatar = state.avatar_id().unwrap();
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            body: Body::new(id, pos, 8.0, penetration, Team::Blue.color(), Team::Blue),
            owner: avatar,
            attacker: avatar,
            damage: 8.0,
            lifetime: BULLET_LIFETIME,
        });
    }

    fn away_from_avatar(state: &GameState) -> Vec2 {
        state.avatar.as_ref().unwrap().body.pos + Vec2::new(400.0, 0.0)
    }

    #[test]
    fn test_forest_shape() {
        assert_eq!(WeaponClass::Basic.children().len(), 4);
        assert!(WeaponClass::Triplet.children().is_empty());
        assert_eq!(WeaponClass::ChiefNecromancer.parent(), Some(WeaponClass::Necromancer));
        assert_eq!(WeaponClass::Basic.parent(), None);
        // every class except the root has exactly one parent
        for class in WeaponClass::ALL {
            let parents = WeaponClass::ALL
                .iter()
                .filter(|c| c.children().contains(&class))
                .count();
            assert_eq!(parents, usize::from(class != WeaponClass::Basic), "{class:?}");
        }
    }

    #[test]
    fn test_patterns() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(WeaponClass::Basic.barrels(&mut rng), vec![Barrel::at(0.0)]);
        assert_eq!(WeaponClass::PentaShot.barrels(&mut rng).len(), 5);
        assert_eq!(WeaponClass::FlankGuard.barrels(&mut rng)[1].angle_offset, PI);
        assert_eq!(WeaponClass::Sniper.barrels(&mut rng)[0].speed_mult, 1.4);
        assert!(WeaponClass::Necromancer.barrels(&mut rng).is_empty());
        for _ in 0..50 {
            let offset = WeaponClass::MachineGun.barrels(&mut rng)[0].angle_offset;
            assert!((-0.4..=0.4).contains(&offset));
        }
    }

    #[test]
    fn test_bullet_spec_from_stats() {
        let stats = Stats {
            bullet_speed: 2,
            bullet_damage: 2,
            bullet_pen: 2,
            ..Default::default()
        };
        let spec = BulletSpec::from_stats(&stats);
        assert!((spec.speed - 6.4).abs() < 1e-5);
        assert!((spec.damage - 15.0).abs() < 1e-5);
        assert!((spec.penetration - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_discharge_respects_reload() {
        let mut state = playing_state();
        state.avatar.as_mut().unwrap().class = WeaponClass::Triplet;

        discharge(&mut state, Slot::Avatar);
        assert_eq!(state.projectiles.len(), 3);

        state.clock_ms += 400.0;
        discharge(&mut state, Slot::Avatar);
        assert_eq!(state.projectiles.len(), 3);

        state.clock_ms += 451.0;
        discharge(&mut state, Slot::Avatar);
        assert_eq!(state.projectiles.len(), 6);
    }

    #[test]
    fn test_necromancer_never_fires_bullets() {
        let mut state = playing_state();
        state.avatar.as_mut().unwrap().class = WeaponClass::Necromancer;
        for _ in 0..40 {
            state.clock_ms += 1000.0;
            discharge(&mut state, Slot::Avatar);
        }
        assert!(state.projectiles.is_empty());
        assert_eq!(state.minions.len(), 8);
    }

    #[test]
    fn test_projectile_damages_hazard_and_credits_ledger() {
        let mut state = playing_state();
        let avatar = state.avatar_id().unwrap();
        let pos = state.avatar.as_ref().unwrap().body.pos;
        let hazard = place_hazard(&mut state, pos + Vec2::new(30.0, 0.0), HazardKind::Pentagon);

        discharge(&mut state, Slot::Avatar);
        for _ in 0..5 {
            update_projectiles(&mut state);
        }
        let h = state.hazards.iter().find(|h| h.body.id == hazard).unwrap();
        assert!((h.body.hp - 112.0).abs() < 1e-4);
        assert!((h.ledger.damage_by(avatar) - 8.0).abs() < 1e-4);
        // penetration 1 is spent on the single hit
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_killing_shot_pays_ledger_once() {
        let mut state = playing_state();
        let pos = state.avatar.as_ref().unwrap().body.pos;
        place_hazard(&mut state, pos + Vec2::new(20.0, 0.0), HazardKind::Square);
        state.avatar.as_mut().unwrap().stats.bullet_damage = 2; // 15 damage kills a square

        discharge(&mut state, Slot::Avatar);
        update_projectiles(&mut state);

        let avatar = state.avatar.as_ref().unwrap();
        assert_eq!(avatar.score, 25);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::HazardDestroyed { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_projectile_expires() {
        let mut state = playing_state();
        discharge(&mut state, Slot::Avatar);
        for _ in 0..BULLET_LIFETIME - 1 {
            update_projectiles(&mut state);
        }
        assert_eq!(state.projectiles.len(), 1);
        update_projectiles(&mut state);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_shot_passes_through_firer_drones_and_allies() {
        let mut state = playing_state();
        let avatar = state.avatar_id().unwrap();
        let spot = away_from_avatar(&state);
        let ally = place_bot(&mut state, spot, Team::Blue, 100.0);
        let drone = state.next_entity_id();
        state.minions.push(Minion {
            body: Body::new(drone, spot, 12.0, 10.0, Team::Blue.color(), Team::Blue),
            owner: avatar,
            kind: MinionKind::SquareDrone,
            target_pos: spot,
            damage: 2.0,
            max_speed: 3.0,
            aim_angle: 0.0,
            reload: ReloadTimer::default(),
            stats: Stats::default(),
        });
        // the firer itself sits under its own bullet too
        let under_avatar = state.avatar.as_ref().unwrap().body.pos;
        place_shot(&mut state, spot, 2.0);
        place_shot(&mut state, under_avatar, 2.0);

        update_projectiles(&mut state);

        assert_eq!(state.bots[0].body.id, ally);
        assert_eq!(state.bots[0].body.hp, 100.0);
        assert_eq!(state.minions[0].body.hp, 10.0);
        assert_eq!(state.avatar.as_ref().unwrap().body.hp, 100.0);
        assert_eq!(state.projectiles.len(), 2);
        assert!(state.projectiles.iter().all(|p| p.body.hp == 2.0));
    }

    #[test]
    fn test_shot_kills_enemy_for_flat_reward() {
        let mut state = playing_state();
        let avatar = state.avatar_id().unwrap();
        let spot = away_from_avatar(&state);
        let enemy = place_bot(&mut state, spot, Team::Red, 5.0);
        place_shot(&mut state, spot, 2.0);

        update_projectiles(&mut state);

        assert!(!state.bots[0].body.is_alive());
        // radius 20 pays 20 per unit, no ledger split
        assert_eq!(state.avatar.as_ref().unwrap().score, 400);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].body.hp, 1.0);
        assert!(state.events.contains(&GameEvent::CombatantKilled {
            victim: enemy,
            killer: Some(avatar),
        }));
    }

    #[test]
    fn test_spent_shot_stops_at_first_combatant() {
        let mut state = playing_state();
        let spot = away_from_avatar(&state);
        place_bot(&mut state, spot, Team::Red, 100.0);
        place_bot(&mut state, spot, Team::Red, 100.0);
        place_shot(&mut state, spot, 1.0);

        update_projectiles(&mut state);

        assert!((state.bots[0].body.hp - 92.0).abs() < 1e-4);
        assert_eq!(state.bots[1].body.hp, 100.0);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.avatar.as_ref().unwrap().score, 0);
    }
}
