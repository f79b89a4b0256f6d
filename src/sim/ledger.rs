//! Damage attribution and reward payout
//!
//! Each hazard keeps a ledger of who hurt it and by how much. When it dies
//! the top contributor takes 60% of its experience and the remaining 40% is
//! split over every contributor in proportion to damage dealt. Per-attacker
//! truncation remainders are dropped, never redistributed.

use serde::{Deserialize, Serialize};

use super::state::{EntityId, GameEvent, GameState};
use crate::consts::{TOP_SHARE_DEN, TOP_SHARE_NUM};

/// Cumulative damage per attacker, in first-hit order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageLedger {
    entries: Vec<(EntityId, f32)>,
}

impl DamageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `amount` against `attacker`
    pub fn record(&mut self, attacker: EntityId, amount: f32) {
        match self.entries.iter_mut().find(|(id, _)| *id == attacker) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((attacker, amount)),
        }
    }

    pub fn damage_by(&self, attacker: EntityId) -> f32 {
        self.entries
            .iter()
            .find(|(id, _)| *id == attacker)
            .map(|(_, d)| *d)
            .unwrap_or(0.0)
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, d)| d).sum()
    }

    pub fn entries(&self) -> &[(EntityId, f32)] {
        &self.entries
    }

    /// Largest contributor; exact ties go to the lowest id
    pub fn top_attacker(&self) -> Option<EntityId> {
        self.entries
            .iter()
            .max_by(|(a_id, a), (b_id, b)| a.total_cmp(b).then_with(|| b_id.cmp(a_id)))
            .map(|(id, _)| *id)
    }

    /// Experience owed to each contributor, in ledger order
    pub fn split(&self, experience: u64) -> Vec<(EntityId, u64)> {
        let Some(top) = self.top_attacker() else {
            return Vec::new();
        };
        let main_share = experience * TOP_SHARE_NUM / TOP_SHARE_DEN;
        let remaining = experience - main_share;
        let total = self.total() as f64;

        let mut paid = 0u64;
        self.entries
            .iter()
            .map(|&(id, damage)| {
                let mut share = 0;
                if total > 0.0 {
                    share = ((remaining as f64) * (damage as f64) / total).floor() as u64;
                    share = share.min(remaining - paid);
                    paid += share;
                }
                if id == top {
                    share += main_share;
                }
                (id, share)
            })
            .collect()
    }
}

/// Credit score (and experience, for the avatar) to a live combatant.
/// Returns false when `id` no longer refers to one.
pub fn award(state: &mut GameState, id: EntityId, amount: u64) -> bool {
    if amount == 0 {
        return state.find(id).is_some_and(|e| e.is_combatant());
    }
    if let Some(avatar) = state.avatar.as_mut().filter(|a| a.body.id == id) {
        avatar.score += amount;
        let gained = avatar.progression.add_experience(amount);
        if gained > 0 {
            let level = avatar.progression.level;
            log::info!("Avatar reached level {}", level);
            state.events.push(GameEvent::LevelUp { entity: id, level });
        }
        return true;
    }
    if let Some(bot) = state.bots.iter_mut().find(|b| b.body.id == id) {
        bot.score += amount;
        return true;
    }
    false
}

/// Pay out a hazard that just died. Must be called once per hazard, at the
/// moment its hp first drops to zero.
pub fn distribute_reward(state: &mut GameState, hazard_index: usize) {
    let Some(hazard) = state.hazards.get(hazard_index) else {
        return;
    };
    let id = hazard.body.id;
    let kind = hazard.kind;
    let awards = hazard.ledger.split(hazard.experience);

    for (attacker, amount) in awards {
        if amount > 0 && !award(state, attacker, amount) {
            log::debug!("Hazard {:?}: contributor {:?} is gone, {} xp dropped", id, attacker, amount);
        }
    }
    state.events.push(GameEvent::HazardDestroyed { hazard: id, kind });
}
