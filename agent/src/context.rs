//! Everything a strategy can read while deciding

use zoroark_battle::dex::Dex;
use zoroark_battle::{ActiveState, TrackedBattle};
use zoroark_protocol::{BattleRequest, Player};

use crate::config::AgentConfig;
use crate::eval::DamageOracle;
use crate::log::DecisionLog;
use crate::viability::ViabilityRegistry;

/// Read-only view handed to strategies for one decision
pub struct DecisionContext<'a> {
    pub battle: &'a TrackedBattle,
    pub registry: &'a ViabilityRegistry,
    pub oracle: &'a dyn DamageOracle,
    pub config: &'a AgentConfig,
    pub log: &'a dyn DecisionLog,
}

impl<'a> DecisionContext<'a> {
    pub fn new(
        battle: &'a TrackedBattle,
        registry: &'a ViabilityRegistry,
        oracle: &'a dyn DamageOracle,
        config: &'a AgentConfig,
        log: &'a dyn DecisionLog,
    ) -> Self {
        Self {
            battle,
            registry,
            oracle,
            config,
            log,
        }
    }

    /// The player we decide for
    pub fn me(&self) -> Option<Player> {
        self.battle
            .perspective()
            .or_else(|| self.request().and_then(BattleRequest::player))
    }

    pub fn request(&self) -> Option<&'a BattleRequest> {
        self.battle.request.as_ref()
    }

    pub fn dex(&self) -> &'a dyn Dex {
        self.battle.dex()
    }

    pub fn generation(&self) -> u8 {
        self.battle.generation
    }

    pub fn active(&self, player: Player, slot: usize) -> Option<&'a ActiveState> {
        self.battle.get_side(player)?.active(slot)
    }

    /// Our combatant in a slot
    pub fn my_active(&self, slot: usize) -> Option<&'a ActiveState> {
        self.active(self.me()?, slot)
    }

    /// Occupied foe slots
    pub fn foes(&self) -> Vec<(Player, usize)> {
        let Some(me) = self.me() else {
            return Vec::new();
        };
        self.battle
            .all_active()
            .filter(|(player, _, active)| {
                self.battle.is_foe(me, *player) && !active.pokemon.fainted
            })
            .map(|(player, slot, _)| (player, slot))
            .collect()
    }
}
