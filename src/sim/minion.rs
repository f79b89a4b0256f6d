//! Drones summoned by the necromancer line

use glam::Vec2;
use rand::Rng;

use super::collision::limit_speed;
use super::state::{Body, GameState, Minion, MinionKind, ReloadTimer, Slot};
use super::weapon::{self, WeaponClass, reload_timer};
use crate::angle_between;

/// Live drones a single owner may keep
pub const MAX_MINIONS_PER_OWNER: usize = 8;

const DRONE_ACCEL: f32 = 0.5;
const DRONE_DRAG: f32 = 0.9;
const DRONE_BRAKE: f32 = 0.9;
/// Drones stop pushing once this close to their target
const ARRIVE_DISTANCE: f32 = 70.0;
const SPAWN_JITTER: f32 = 5.0;

impl MinionKind {
    pub fn radius(self) -> f32 {
        match self {
            MinionKind::SquareDrone => 12.0,
            MinionKind::TankDrone => 15.0,
        }
    }

    fn for_class(class: WeaponClass) -> Self {
        if class == WeaponClass::ChiefNecromancer {
            MinionKind::TankDrone
        } else {
            MinionKind::SquareDrone
        }
    }
}

/// Summon one drone for the tank in `slot` if it is under the cap and its
/// reload has elapsed.
pub fn spawn_minion(state: &mut GameState, slot: Slot) {
    let (owner, pos, team, color, class, stats) = match slot {
        Slot::Avatar => match state.avatar.as_ref() {
            Some(a) => (a.body.id, a.body.pos, a.body.team, a.body.color, a.class, a.stats),
            None => return,
        },
        Slot::Bot(i) => match state.bots.get(i) {
            Some(b) => (b.body.id, b.body.pos, b.body.team, b.body.color, b.class, b.stats),
            None => return,
        },
        Slot::Minion(_) => return,
    };

    if state.minion_count(owner) >= MAX_MINIONS_PER_OWNER {
        return;
    }
    let now = state.clock_ms;
    if !reload_timer(state, slot).is_some_and(|r| r.is_ready(now, stats.reload)) {
        return;
    }

    let kind = MinionKind::for_class(class);
    let jitter = Vec2::new(
        state.rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
        state.rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER),
    );
    let id = state.next_entity_id();
    let hp = 10.0 + stats.bullet_pen as f32 * 4.0;
    let spawn_pos = (pos + jitter).clamp(Vec2::ZERO, Vec2::splat(state.config.world_size));

    state.minions.push(Minion {
        body: Body::new(id, spawn_pos, kind.radius(), hp, color, team),
        owner,
        kind,
        target_pos: spawn_pos,
        damage: 2.0 + stats.bullet_damage as f32 * 2.0,
        max_speed: 3.0 + stats.bullet_speed as f32 * 0.5,
        aim_angle: 0.0,
        reload: ReloadTimer::default(),
        stats,
    });
    if let Some(timer) = reload_timer(state, slot) {
        timer.reset(now);
    }
    log::trace!("{:?} summoned {:?} {:?}", owner, kind, id);
}

/// Where a drone is heading this tick
fn steer_target(state: &GameState, minion: &Minion) -> Vec2 {
    if let Some(avatar) = state.avatar.as_ref().filter(|a| a.body.id == minion.owner) {
        return avatar.aim_point.unwrap_or(minion.body.pos);
    }
    state
        .bots
        .iter()
        .find(|b| b.body.id == minion.owner)
        .map(|b| b.body.pos)
        .unwrap_or(minion.body.pos)
}

/// Steer, move and fire every drone, then drop the dead ones
pub fn update_minions(state: &mut GameState) {
    let world_size = state.config.world_size;
    for i in 0..state.minions.len() {
        let target = steer_target(state, &state.minions[i]);
        let minion = &mut state.minions[i];
        minion.target_pos = target;

        let to_target = target - minion.body.pos;
        if to_target.length_squared() > 0.0 {
            minion.aim_angle = angle_between(minion.body.pos, target);
        }
        if to_target.length() > ARRIVE_DISTANCE {
            minion.body.vel += to_target.normalize_or_zero() * DRONE_ACCEL;
        } else {
            minion.body.vel *= DRONE_BRAKE;
        }
        minion.body.vel = limit_speed(minion.body.vel, minion.max_speed);
        minion.body.integrate(DRONE_DRAG);
        minion.body.clamp_to(world_size);

        if minion.kind == MinionKind::TankDrone {
            weapon::discharge(state, Slot::Minion(i));
        }
    }
    state.minions.retain(|m| m.body.is_alive());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Team;

    fn necromancer(class: WeaponClass) -> GameState {
        let mut state = GameState::new(11);
        state.spawn_avatar(Team::Blue, "Summoner");
        state.avatar.as_mut().unwrap().class = class;
        state
    }

    #[test]
    fn test_spawn_respects_reload_and_cap() {
        let mut state = necromancer(WeaponClass::Necromancer);
        spawn_minion(&mut state, Slot::Avatar);
        spawn_minion(&mut state, Slot::Avatar);
        assert_eq!(state.minions.len(), 1);

        for _ in 0..20 {
            state.clock_ms += 900.0;
            spawn_minion(&mut state, Slot::Avatar);
        }
        assert_eq!(state.minions.len(), MAX_MINIONS_PER_OWNER);
        let m = &state.minions[0];
        assert_eq!(m.kind, MinionKind::SquareDrone);
        assert_eq!(m.body.team, Team::Blue);
        assert_eq!(m.body.hp, 10.0);
        assert_eq!(m.damage, 2.0);
    }

    #[test]
    fn test_chief_summons_tank_drones() {
        let mut state = necromancer(WeaponClass::ChiefNecromancer);
        spawn_minion(&mut state, Slot::Avatar);
        assert_eq!(state.minions[0].kind, MinionKind::TankDrone);
        assert_eq!(state.minions[0].body.radius, 15.0);
    }

    #[test]
    fn test_drone_steers_to_aim_point() {
        let mut state = necromancer(WeaponClass::Necromancer);
        spawn_minion(&mut state, Slot::Avatar);
        let start = state.minions[0].body.pos;
        let goal = start + Vec2::new(500.0, 0.0);
        state.avatar.as_mut().unwrap().aim_point = Some(goal);

        for _ in 0..30 {
            update_minions(&mut state);
        }
        let m = &state.minions[0];
        assert!(m.body.pos.x > start.x + 30.0);
        assert!(m.body.vel.length() <= m.max_speed + 1e-4);
        assert_eq!(m.target_pos, goal);
    }

    #[test]
    fn test_drone_without_aim_point_holds_position() {
        let mut state = necromancer(WeaponClass::Necromancer);
        spawn_minion(&mut state, Slot::Avatar);
        let start = state.minions[0].body.pos;
        for _ in 0..10 {
            update_minions(&mut state);
        }
        assert_eq!(state.minions[0].body.pos, start);
    }

    #[test]
    fn test_tank_drone_fires_with_owner_credit() {
        let mut state = necromancer(WeaponClass::ChiefNecromancer);
        let owner = state.avatar_id().unwrap();
        spawn_minion(&mut state, Slot::Avatar);
        update_minions(&mut state);
        assert_eq!(state.projectiles.len(), 1);
        let shot = &state.projectiles[0];
        assert_eq!(shot.attacker, owner);
        assert_eq!(shot.owner, state.minions[0].body.id);
        assert_eq!(shot.lifetime, weapon::DRONE_BULLET_LIFETIME);
    }

    #[test]
    fn test_dead_drones_are_removed() {
        let mut state = necromancer(WeaponClass::Necromancer);
        spawn_minion(&mut state, Slot::Avatar);
        state.minions[0].body.hp = 0.0;
        update_minions(&mut state);
        assert!(state.minions.is_empty());
    }
}
