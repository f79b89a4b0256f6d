//! Full-match scenarios driven through the public API

use glam::Vec2;
use proptest::prelude::*;

use tank_arena::consts::SIM_DT;
use tank_arena::sim::progression::points_through;
use tank_arena::sim::state::ReloadTimer;
use tank_arena::sim::{
    GameEvent, GamePhase, GameState, SpawnRequest, Team, TickInput, WeaponClass, WorldView, tick,
};
use tank_arena::WorldConfig;

fn start(state: &mut GameState, team: Team) {
    let input = TickInput {
        spawn: Some(SpawnRequest {
            team,
            name: "Tester".to_string(),
        }),
        ..Default::default()
    };
    tick(state, &input, SIM_DT);
}

#[test]
fn busy_world_keeps_invariants() {
    let mut state = GameState::new(2024);
    start(&mut state, Team::Blue);

    let fire = TickInput {
        fire: true,
        aim_angle: Some(0.0),
        move_dir: Vec2::X,
        ..Default::default()
    };
    let mut hazards_destroyed = 0;
    for _ in 0..1800 {
        if state.phase != GamePhase::Playing {
            start(&mut state, Team::Blue);
        }
        tick(&mut state, &fire, SIM_DT);
        hazards_destroyed += state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::HazardDestroyed { .. }))
            .count();

        assert!(state.projectiles.iter().all(|p| p.lifetime > 0 && p.body.hp > 0.0));
        for bot in &state.bots {
            let p = bot.body.pos;
            assert!(p.x >= 0.0 && p.y >= 0.0);
            assert!(p.x <= state.config.world_size && p.y <= state.config.world_size);
            assert_ne!(bot.body.team, Team::Neutral);
        }
        if let Some(avatar) = &state.avatar {
            let earned = points_through(avatar.progression.level);
            assert_eq!(avatar.stats.total() + avatar.progression.points, earned);
            assert!((1..=60).contains(&avatar.progression.level));
        }
    }
    // bots farm hazards on their own over half a minute
    assert!(hazards_destroyed > 0);
    assert_eq!(state.bots.len(), state.config.bot_count);
}

#[test]
fn hazards_stay_out_of_bases_over_long_match() {
    let mut state = GameState::with_config(
        11,
        WorldConfig {
            bot_count: 0,
            ..Default::default()
        },
    );
    start(&mut state, Team::Blue);
    let (base, world) = (state.config.base_size, state.config.world_size);

    // ten simulated minutes with an idle avatar parked in its base
    for _ in 0..36_000 {
        tick(&mut state, &TickInput::default(), SIM_DT);
    }
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.hazards.len(), 400);
    for hazard in &state.hazards {
        let x = hazard.body.pos.x;
        assert!(x >= base && x <= world - base, "hazard drifted to x={x}");
    }
}

#[test]
fn same_seed_same_match() {
    let config = WorldConfig {
        hazard_count: 120,
        bot_count: 8,
        ..Default::default()
    };
    let run = || {
        let mut state = GameState::with_config(7, config.clone());
        start(&mut state, Team::Red);
        for i in 0..600 {
            let input = TickInput {
                move_dir: Vec2::new((i as f32 * 0.03).sin(), 1.0),
                aim_angle: Some(i as f32 * 0.01),
                fire: true,
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);
        }
        WorldView::capture(&state).to_json().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn necromancer_fills_drone_cap_in_live_match() {
    let mut state = GameState::with_config(
        3,
        WorldConfig {
            hazard_count: 0,
            bot_count: 0,
            ..Default::default()
        },
    );
    start(&mut state, Team::Blue);
    state.avatar.as_mut().unwrap().class = WeaponClass::ChiefNecromancer;

    for _ in 0..900 {
        tick(&mut state, &TickInput::default(), SIM_DT);
    }
    let owner = state.avatar_id().unwrap();
    assert_eq!(state.minion_count(owner), 8);
    // tank drones shoot on their own; the avatar itself never does
    assert!(!state.projectiles.is_empty());
    assert!(state.projectiles.iter().all(|p| p.owner != owner && p.attacker == owner));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reload_gate_spacing(reload in 0u8..=8, start_ms in 0.0f64..10_000.0, steps in 1usize..200) {
        let interval = ReloadTimer::interval_ms(reload);
        let mut timer = ReloadTimer::default();
        let mut last_fire: Option<f64> = None;
        for i in 0..steps {
            let now = start_ms + i as f64 * 16.0;
            if timer.is_ready(now, reload) {
                if let Some(last) = last_fire {
                    prop_assert!(now - last > interval);
                }
                timer.reset(now);
                last_fire = Some(now);
            }
        }
    }
}
