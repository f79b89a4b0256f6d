//! Tank Arena headless driver
//!
//! Runs a match with a scripted avatar and prints the final world as JSON.
//!
//! Usage: `tank-arena [seed] [ticks] [config.json]`

use glam::Vec2;

use tank_arena::consts::SIM_DT;
use tank_arena::sim::{
    GamePhase, GameState, SpawnRequest, StatKind, Team, TickInput, WorldView, tick,
};
use tank_arena::{Leaderboard, WorldConfig};

const DEFAULT_SEED: u64 = 42;
const DEFAULT_TICKS: u64 = 3600;
/// Log standings every 10 simulated seconds
const REPORT_EVERY: u64 = 600;

/// Scripted stand-in for a human player
struct Pilot {
    next_hotkey: u8,
    deaths: u32,
}

impl Pilot {
    fn new() -> Self {
        Self {
            next_hotkey: 1,
            deaths: 0,
        }
    }

    /// Chase the nearest hazard, keep firing, spend points round-robin and
    /// take the first evolution on offer
    fn input(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput {
            activity: true,
            ..Default::default()
        };

        let Some(avatar) = state.avatar.as_ref().filter(|_| state.phase == GamePhase::Playing) else {
            if state.phase == GamePhase::GameOver {
                self.deaths += 1;
            }
            input.spawn = Some(SpawnRequest {
                team: if self.deaths % 2 == 0 { Team::Blue } else { Team::Red },
                name: "Pilot".to_string(),
            });
            return input;
        };

        let pos = avatar.body.pos;
        let nearest = state
            .hazards
            .iter()
            .filter(|h| h.body.is_alive())
            .min_by(|a, b| {
                a.body
                    .pos
                    .distance_squared(pos)
                    .total_cmp(&b.body.pos.distance_squared(pos))
            });
        if let Some(hazard) = nearest {
            let to_target = hazard.body.pos - pos;
            // hold a little distance so bullets land before the ram does
            input.move_dir = if to_target.length() > 150.0 {
                to_target
            } else {
                Vec2::ZERO
            };
            input.aim_point = Some(hazard.body.pos);
        }
        input.fire = true;

        if avatar.progression.points > 0 {
            // cycle the number-row hotkeys 1-8
            input.allocate = StatKind::from_hotkey(self.next_hotkey);
            self.next_hotkey = self.next_hotkey % 8 + 1;
        }
        input.select_class = avatar
            .progression
            .available_evolutions(avatar.class)
            .first()
            .copied();
        input
    }
}

fn load_config(path: Option<&String>) -> WorldConfig {
    let Some(path) = path else {
        return WorldConfig::default();
    };
    match WorldConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{}; using default config", err);
            WorldConfig::default()
        }
    }
}

fn parse_arg<T: std::str::FromStr>(arg: Option<&String>, default: T, what: &str) -> T {
    match arg.map(|s| s.parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => {
            log::warn!("Ignoring invalid {} argument", what);
            default
        }
        None => default,
    }
}

fn report(state: &GameState) {
    let board = Leaderboard::from_state(state);
    log::info!("Tick {} standings:", state.time_ticks);
    for (rank, entry) in board.entries.iter().enumerate() {
        log::info!(
            "  {:>2}. {:<20} {:>8} {:?}{}",
            rank + 1,
            entry.name,
            entry.score,
            entry.team,
            if entry.is_player { " *" } else { "" }
        );
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let seed = parse_arg(args.first(), DEFAULT_SEED, "seed");
    let ticks = parse_arg(args.get(1), DEFAULT_TICKS, "ticks");
    let config = load_config(args.get(2));

    log::info!("Tank Arena starting with seed {} for {} ticks", seed, ticks);
    let mut state = GameState::with_config(seed, config);
    let mut pilot = Pilot::new();

    for frame in 1..=ticks {
        let input = pilot.input(&state);
        tick(&mut state, &input, SIM_DT);
        if frame % REPORT_EVERY == 0 {
            report(&state);
        }
    }

    log::info!("Finished after {} ticks, {} deaths", state.time_ticks, pilot.deaths);
    match WorldView::capture(&state).to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize world: {}", err),
    }
}
