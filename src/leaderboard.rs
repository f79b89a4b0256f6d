//! Live leaderboard and team totals
//!
//! Rebuilt from the world every tick: top 10 combatants by score plus the
//! summed score of each team.

use serde::{Deserialize, Serialize};

use crate::sim::state::{GameState, Team};

/// Maximum number of entries shown
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Display name (`[Bot] <name>` for bots)
    pub name: String,
    pub score: u64,
    pub team: Team,
    pub team_color: u32,
    pub is_player: bool,
}

/// Top combatants, sorted by descending score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Rank every bot, then the avatar
    pub fn from_state(state: &GameState) -> Self {
        let mut board = Self::new();
        for bot in &state.bots {
            board.add_entry(LeaderboardEntry {
                name: format!("[Bot] {}", bot.name),
                score: bot.score,
                team: bot.body.team,
                team_color: bot.body.team.color(),
                is_player: false,
            });
        }
        if let Some(avatar) = &state.avatar {
            board.add_entry(LeaderboardEntry {
                name: avatar.name.clone(),
                score: avatar.score,
                team: avatar.body.team,
                team_color: avatar.body.team.color(),
                is_player: true,
            });
        }
        board
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Insert in score order. Equal scores keep arrival order.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_entry(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    /// Rank of the avatar (1-indexed), if it made the board
    pub fn player_rank(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.is_player).map(|i| i + 1)
    }
}

/// Summed scores per team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScores {
    pub blue: u64,
    pub red: u64,
}

impl TeamScores {
    pub fn from_state(state: &GameState) -> Self {
        let mut scores = Self::default();
        let bots = state.bots.iter().map(|b| (b.body.team, b.score));
        let avatar = state.avatar.iter().map(|a| (a.body.team, a.score));
        for (team, score) in bots.chain(avatar) {
            match team {
                Team::Blue => scores.blue += score,
                Team::Red => scores.red += score,
                Team::Neutral => {}
            }
        }
        scores
    }
}
