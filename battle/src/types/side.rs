//! Side (player) state

use std::collections::{HashMap, HashSet};

use zoroark_protocol::{Gimmick, Player};

use super::active::ActiveState;
use super::conditions::{SideCondition, SideConditionState};
use super::pokemon::{PokemonIdentity, PokemonState};

/// One player's side of the battle
#[derive(Debug, Clone)]
pub struct SideState {
    /// Player identifier (P1, P2, etc.)
    pub player: Player,

    /// Player's username
    pub username: String,

    /// Declared roster size (0 until announced)
    pub team_size: usize,

    /// Candidates shown at team preview
    pub preview: Vec<PokemonIdentity>,

    /// Roster in order of first sighting; entries are never removed
    pub pokemon: Vec<PokemonState>,

    /// Combatant per active slot
    pub active: Vec<Option<ActiveState>>,

    pub fainted_count: usize,
    pub last_faint_turn: Option<u32>,

    /// Side conditions (hazards, screens, etc.)
    pub conditions: HashMap<SideCondition, SideConditionState>,

    /// Once-per-battle power-ups already spent
    pub gimmicks_used: HashSet<Gimmick>,
}

impl SideState {
    pub fn new(player: Player, username: impl Into<String>) -> Self {
        Self {
            player,
            username: username.into(),
            team_size: 0,
            preview: Vec::new(),
            pokemon: Vec::new(),
            active: vec![None],
            fainted_count: 0,
            last_faint_turn: None,
            conditions: HashMap::new(),
            gimmicks_used: HashSet::new(),
        }
    }

    /// Set the number of active slots (1 for singles, 2 for doubles, etc.)
    pub fn set_active_slots(&mut self, count: usize) {
        self.active.resize_with(count, || None);
    }

    pub fn active(&self, slot: usize) -> Option<&ActiveState> {
        self.active.get(slot)?.as_ref()
    }

    pub fn active_mut(&mut self, slot: usize) -> Option<&mut ActiveState> {
        self.active.get_mut(slot)?.as_mut()
    }

    /// Occupied slots with their combatants
    pub fn actives(&self) -> impl Iterator<Item = (usize, &ActiveState)> {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(slot, active)| active.as_ref().map(|a| (slot, a)))
    }

    /// Slot whose combatant is displayed under `name`
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.actives()
            .find(|(_, active)| active.displayed_name == name)
            .map(|(slot, _)| slot)
    }

    /// Slot holding a roster entry
    pub fn slot_of_index(&self, roster_index: usize) -> Option<usize> {
        self.actives()
            .find(|(_, active)| active.roster_index == roster_index)
            .map(|(slot, _)| slot)
    }

    /// Roster entry by revealed name
    pub fn find_pokemon(&self, name: &str) -> Option<usize> {
        self.pokemon.iter().position(|p| p.name() == name)
    }

    /// The freshest view of a roster entry: the active copy while it is out
    pub fn live(&self, index: usize) -> Option<&PokemonState> {
        match self.slot_of_index(index).and_then(|slot| self.active(slot)) {
            Some(active) if !active.is_disguised() => Some(&active.pokemon),
            _ => self.pokemon.get(index),
        }
    }

    /// Bench members: not active, not fainted
    pub fn bench(&self) -> impl Iterator<Item = (usize, &PokemonState)> {
        self.pokemon
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.active && !p.fainted)
    }

    pub fn alive_count(&self) -> usize {
        self.pokemon.iter().filter(|p| p.is_alive()).count()
    }

    /// Every declared member has been seen
    pub fn is_full(&self) -> bool {
        self.team_size > 0 && self.pokemon.len() >= self.team_size
    }

    /// Whether an unseen or benched disguise-capable member could be on the field
    pub fn may_hide_disguise(&self) -> bool {
        !self.is_full()
            || self
                .pokemon
                .iter()
                .any(|p| p.can_disguise && !p.fainted && !p.active)
    }

    pub fn all_fainted(&self) -> bool {
        !self.pokemon.is_empty() && self.pokemon.iter().all(|p| p.fainted)
    }

    /// Vacate a slot, writing the combatant's state back to its roster entry
    pub fn take_active(&mut self, slot: usize) -> Option<ActiveState> {
        let active = self.active.get_mut(slot)?.take()?;
        self.write_back(&active);
        Some(active)
    }

    /// Copy a combatant's terminal state to the roster.
    ///
    /// A disguised combatant never overwrites the entry it impersonates; its
    /// state goes to the guessed true entry when one is known.
    pub fn write_back(&mut self, active: &ActiveState) {
        let target = match active.disguise() {
            Some(guess) => guess.roster_index,
            None => active.roster_entry(),
        };

        if let Some(guess) = active.disguise() {
            for index in [active.roster_entry(), guess.impersonating]
                .into_iter()
                .flatten()
            {
                if let Some(entry) = self.pokemon.get_mut(index) {
                    entry.active = false;
                    entry.active_slot = None;
                }
            }
        }

        let Some(entry) = target.and_then(|index| self.pokemon.get_mut(index)) else {
            return;
        };

        let mut state = active.pokemon.clone();
        state.index = entry.index;
        state.active = false;
        state.active_slot = None;
        if let Some(base) = state.ability.base.clone() {
            state.ability.current = Some(base);
        }
        state.ability.disabled = false;
        // Forme changes last for one stint; permanent ones were applied to the entry
        state.identity = entry.identity.clone();
        state.base_types = entry.base_types.clone();
        state.can_disguise = entry.can_disguise;
        if active.is_disguised() {
            state.revealed = entry.revealed;
        }
        *entry = state;
    }

    // === Side conditions ===

    pub fn has_condition(&self, cond: SideCondition) -> bool {
        self.conditions.contains_key(&cond)
    }

    /// Layers for a condition (0 if not present)
    pub fn condition_layers(&self, cond: SideCondition) -> u8 {
        self.conditions.get(&cond).map_or(0, |s| s.layers)
    }

    /// Add a side condition.
    /// Returns true if the condition was added (false if already at max layers)
    pub fn add_condition(&mut self, cond: SideCondition, turn: u32) -> bool {
        match self.conditions.get_mut(&cond) {
            Some(state) => {
                state.turn = turn;
                state.add_layer(cond)
            }
            None => {
                self.conditions
                    .insert(cond, SideConditionState::new(cond, turn));
                true
            }
        }
    }

    pub fn remove_condition(&mut self, cond: SideCondition) -> bool {
        self.conditions.remove(&cond).is_some()
    }

    /// Count every duration estimate down by one turn.
    ///
    /// Delayed conditions are never announced as ended and drop off at zero.
    pub fn decrement_conditions(&mut self) {
        for state in self.conditions.values_mut() {
            if let Some(duration) = state.duration.as_mut() {
                *duration = duration.saturating_sub(1);
            }
        }
        self.conditions
            .retain(|cond, state| !(cond.is_delayed() && state.duration == Some(0)));
    }

    pub fn has_hazards(&self) -> bool {
        self.conditions.keys().any(|c| c.is_hazard())
    }

    pub fn has_screens(&self) -> bool {
        self.conditions.keys().any(|c| c.is_screen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DisguiseGuess, EntryOrigin, Volatile, VolatileData};

    fn create_test_side() -> SideState {
        let mut side = SideState::new(Player::P1, "TestUser");
        side.team_size = 3;

        let poke1 = PokemonState::new("Pikachu", "Pikachu", 50);
        let poke2 = PokemonState::new("Charizard", "Charizard", 50);
        let mut poke3 = PokemonState::new("Blastoise", "Blastoise", 50);
        poke3.hp_current = 0;
        poke3.fainted = true;

        for (index, mut poke) in [poke1, poke2, poke3].into_iter().enumerate() {
            poke.index = index;
            side.pokemon.push(poke);
        }
        side
    }

    fn send_out(side: &mut SideState, slot: usize, index: usize) {
        side.pokemon[index].active = true;
        side.pokemon[index].active_slot = Some(slot);
        let copy = side.pokemon[index].clone();
        side.active[slot] = Some(ActiveState::new(index, copy, 1, EntryOrigin::Existing));
    }

    #[test]
    fn test_new_side() {
        let side = SideState::new(Player::P1, "Alice");
        assert_eq!(side.player, Player::P1);
        assert_eq!(side.username, "Alice");
        assert!(side.pokemon.is_empty());
        assert_eq!(side.active.len(), 1);
        assert!(!side.is_full());
    }

    #[test]
    fn test_set_active_slots() {
        let mut side = SideState::new(Player::P1, "Test");
        side.set_active_slots(3);
        assert_eq!(side.active.len(), 3);
        side.set_active_slots(2);
        assert_eq!(side.active.len(), 2);
    }

    #[test]
    fn test_bench_excludes_active_and_fainted() {
        let mut side = create_test_side();
        send_out(&mut side, 0, 0);

        let bench: Vec<_> = side.bench().map(|(i, _)| i).collect();
        assert_eq!(bench, vec![1]);
        assert_eq!(side.slot_of("Pikachu"), Some(0));
        assert_eq!(side.slot_of_index(0), Some(0));
    }

    #[test]
    fn test_take_active_writes_back_base_ability() {
        let mut side = create_test_side();
        side.pokemon[0].ability.reveal("Static");
        send_out(&mut side, 0, 0);

        let active = side.active_mut(0).unwrap();
        active.pokemon.hp_current = 40;
        active.pokemon.ability.reveal("Trace");
        assert_eq!(side.live(0).unwrap().hp_current, 40);

        let old = side.take_active(0).unwrap();
        assert_eq!(old.roster_index, 0);
        assert!(side.active(0).is_none());

        let entry = &side.pokemon[0];
        assert_eq!(entry.hp_current, 40);
        assert!(!entry.active);
        assert!(entry.ability.is("static"));
    }

    #[test]
    fn test_disguised_write_back_spares_impersonated_entry() {
        let mut side = create_test_side();
        side.pokemon.push(PokemonState::new("Zoroark", "Zoroark", 50));
        side.pokemon[3].index = 3;
        send_out(&mut side, 0, 1);

        let active = side.active_mut(0).unwrap();
        active.set_disguise(DisguiseGuess {
            species: "Zoroark".to_string(),
            roster_index: Some(3),
            impersonating: Some(1),
        });
        active.pokemon.hp_current = 30;

        side.take_active(0);
        assert_eq!(side.pokemon[1].hp_current, 100);
        assert!(!side.pokemon[1].active);
        assert_eq!(side.pokemon[3].hp_current, 30);
        assert_eq!(side.pokemon[3].name(), "Zoroark");
    }

    #[test]
    fn test_may_hide_disguise() {
        let mut side = create_test_side();
        assert!(side.is_full());
        assert!(!side.may_hide_disguise());

        side.team_size = 4;
        assert!(side.may_hide_disguise());

        side.team_size = 3;
        side.pokemon[1].can_disguise = true;
        assert!(side.may_hide_disguise());
    }

    #[test]
    fn test_side_conditions() {
        let mut side = SideState::new(Player::P1, "Test");

        assert!(side.add_condition(SideCondition::StealthRock, 1));
        assert!(!side.add_condition(SideCondition::StealthRock, 2));
        assert_eq!(side.condition_layers(SideCondition::StealthRock), 1);

        assert!(side.add_condition(SideCondition::Spikes, 1));
        assert!(side.add_condition(SideCondition::Spikes, 1));
        assert!(side.add_condition(SideCondition::Spikes, 1));
        assert!(!side.add_condition(SideCondition::Spikes, 1));
        assert_eq!(side.condition_layers(SideCondition::Spikes), 3);

        assert!(side.remove_condition(SideCondition::Spikes));
        assert!(!side.has_condition(SideCondition::Spikes));
        assert!(side.has_hazards());
        assert!(!side.has_screens());
    }

    #[test]
    fn test_delayed_conditions_expire() {
        let mut side = SideState::new(Player::P2, "Test");
        side.add_condition(SideCondition::Wish, 4);
        side.add_condition(SideCondition::Reflect, 4);

        side.decrement_conditions();
        assert!(side.has_condition(SideCondition::Wish));
        side.decrement_conditions();
        assert!(!side.has_condition(SideCondition::Wish));
        assert_eq!(
            side.conditions[&SideCondition::Reflect].duration,
            Some(3)
        );
    }

    #[test]
    fn test_live_skips_disguised_copy() {
        let mut side = create_test_side();
        send_out(&mut side, 0, 1);
        let active = side.active_mut(0).unwrap();
        active.pokemon.hp_current = 10;
        active.add_volatile(
            Volatile::Illusion,
            VolatileData::Disguise(DisguiseGuess {
                species: "Zoroark".to_string(),
                roster_index: None,
                impersonating: Some(1),
            }),
        );
        assert_eq!(side.live(1).unwrap().hp_current, 100);
    }
}
