//! Read-only projections handed to presentation layers each tick

use glam::Vec2;
use serde::Serialize;

use super::progression::Stats;
use super::state::{EntityId, GamePhase, GameState, HazardKind, MinionKind, Team};
use super::weapon::WeaponClass;
use crate::leaderboard::{Leaderboard, TeamScores};

#[derive(Debug, Clone, Serialize)]
pub struct AvatarView {
    pub id: EntityId,
    pub name: String,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub score: u64,
    pub team: Team,
    pub aim_angle: f32,
    pub class: WeaponClass,
    pub level: u32,
    pub experience: u64,
    pub points: u32,
    pub stats: Stats,
    /// Evolutions the avatar may pick right now
    pub evolutions: Vec<WeaponClass>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotView {
    pub id: EntityId,
    pub name: String,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub team: Team,
    pub color: u32,
    pub aim_angle: f32,
    pub class: WeaponClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct HazardView {
    pub id: EntityId,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub kind: HazardKind,
    /// Polygon side count for drawing
    pub sides: u32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub color: u32,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinionView {
    pub id: EntityId,
    pub pos: Vec2,
    pub kind: MinionKind,
    pub hp: f32,
    pub owner: EntityId,
}

/// Snapshot of everything a renderer or HUD needs
#[derive(Debug, Clone, Serialize)]
pub struct WorldView {
    pub tick: u64,
    pub phase: GamePhase,
    pub avatar: Option<AvatarView>,
    pub bots: Vec<BotView>,
    pub hazards: Vec<HazardView>,
    pub projectiles: Vec<ProjectileView>,
    pub minions: Vec<MinionView>,
    pub leaderboard: Leaderboard,
    pub team_scores: TeamScores,
}

impl WorldView {
    pub fn capture(state: &GameState) -> Self {
        let avatar = state.avatar.as_ref().map(|a| AvatarView {
            id: a.body.id,
            name: a.name.clone(),
            pos: a.body.pos,
            hp: a.body.hp,
            max_hp: a.body.max_hp,
            score: a.score,
            team: a.body.team,
            aim_angle: a.aim_angle,
            class: a.class,
            level: a.progression.level,
            experience: a.progression.experience,
            points: a.progression.points,
            stats: a.stats,
            evolutions: a.progression.available_evolutions(a.class).to_vec(),
        });

        Self {
            tick: state.time_ticks,
            phase: state.phase,
            avatar,
            bots: state
                .bots
                .iter()
                .map(|b| BotView {
                    id: b.body.id,
                    name: b.name.clone(),
                    pos: b.body.pos,
                    hp: b.body.hp,
                    max_hp: b.body.max_hp,
                    team: b.body.team,
                    color: b.body.color,
                    aim_angle: b.aim_angle,
                    class: b.class,
                })
                .collect(),
            hazards: state
                .hazards
                .iter()
                .map(|h| HazardView {
                    id: h.body.id,
                    pos: h.body.pos,
                    hp: h.body.hp,
                    max_hp: h.body.max_hp,
                    kind: h.kind,
                    sides: h.kind.sides(),
                    rotation: h.rotation,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    pos: p.body.pos,
                    color: p.body.color,
                    radius: p.body.radius,
                })
                .collect(),
            minions: state
                .minions
                .iter()
                .map(|m| MinionView {
                    id: m.body.id,
                    pos: m.body.pos,
                    kind: m.kind,
                    hp: m.body.hp,
                    owner: m.owner,
                })
                .collect(),
            leaderboard: Leaderboard::from_state(state),
            team_scores: TeamScores::from_state(state),
        }
    }

    /// Serialize for external consumers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_mirrors_state() {
        let mut state = GameState::new(31);
        crate::sim::population::top_up(&mut state);
        state.spawn_avatar(Team::Blue, "Viewer");
        let avatar = state.avatar.as_mut().unwrap();
        avatar.progression.level = 15;
        avatar.score = 1;

        let view = WorldView::capture(&state);
        assert_eq!(view.hazards.len(), state.hazards.len());
        assert_eq!(view.bots.len(), state.bots.len());
        assert_eq!(view.phase, GamePhase::Playing);
        let avatar = view.avatar.as_ref().unwrap();
        assert_eq!(avatar.evolutions.len(), 4);
        assert_eq!(avatar.pos, state.avatar.as_ref().unwrap().body.pos);
        assert!(view.leaderboard.player_rank().is_some());
    }

    #[test]
    fn test_view_serializes() {
        let state = GameState::new(1);
        let json = WorldView::capture(&state).to_json().unwrap();
        assert!(json.contains("\"phase\":\"Start\""));
        assert!(json.contains("\"avatar\":null"));
    }
}
