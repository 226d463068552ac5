//! The working copy of a pokemon while it is on the field

use std::collections::{HashMap, HashSet};

use super::pokemon::{MoveKnowledge, PokemonIdentity, PokemonState};
use super::pokemon_type::Type;
use super::stats::StatStages;
use super::status::{DisguiseGuess, Status, TransformSnapshot, Volatile, VolatileData};

/// What a switching move hands to the replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Boosts and passable volatiles
    BatonPass,
    /// Only the substitute
    ShedTail,
}

/// Result of one move hitting one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// HP percentage lost
    pub damage: u32,
    pub crit: bool,
    pub miss: bool,
    pub immune: bool,
}

/// How the roster entry behind a switch-in was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOrigin {
    /// Matched an entry already on the roster
    Existing,
    /// Appended to the roster by this switch
    Created,
    /// Took over an unrevealed preview entry; holds its previous identity
    Claimed(PokemonIdentity),
}

/// An active combatant
#[derive(Debug, Clone)]
pub struct ActiveState {
    /// Roster entry this combatant is bound to, [`ActiveState::UNBOUND`]
    /// when it matches no entry of a full roster
    pub roster_index: usize,

    /// Name shown in the battle log for this slot
    pub displayed_name: String,

    pub origin: EntryOrigin,

    /// Working copy of the roster entry
    pub pokemon: PokemonState,

    pub boosts: StatStages,

    /// Volatiles with their data; the data lives exactly as long as the volatile
    pub volatiles: HashMap<Volatile, VolatileData>,

    /// Cleared at the start of every turn (Protect, Roost, Helping Hand...)
    pub turn_status: HashSet<Volatile>,

    /// Cleared whenever this combatant declares a move
    pub move_status: HashSet<Volatile>,

    pub last_move: Option<String>,
    /// Times `last_move` was used in a row
    pub repeat_count: u32,

    pub switched_in_turn: u32,

    /// Set by Baton Pass / Shed Tail until the replacement arrives
    pub pass: Option<PassKind>,

    /// Switched in while the side may still hide a disguise
    pub maybe_disguised: bool,

    /// Move ids revealed during this stint
    pub stint_moves: Vec<String>,

    /// Outcomes of the last declared move keyed by target identifier
    pub hits: HashMap<String, HitOutcome>,

    /// Consecutive turns asleep in this stint
    pub sleep_turns: u8,
    pub toxic_turns: u8,
}

impl ActiveState {
    /// Roster index of a combatant with no roster entry
    pub const UNBOUND: usize = usize::MAX;

    pub fn new(roster_index: usize, pokemon: PokemonState, turn: u32, origin: EntryOrigin) -> Self {
        let mut pokemon = pokemon;
        pokemon.active = true;
        Self {
            roster_index,
            displayed_name: pokemon.name().to_string(),
            origin,
            pokemon,
            boosts: StatStages::default(),
            volatiles: HashMap::new(),
            turn_status: HashSet::new(),
            move_status: HashSet::new(),
            last_move: None,
            repeat_count: 0,
            switched_in_turn: turn,
            pass: None,
            maybe_disguised: false,
            stint_moves: Vec::new(),
            hits: HashMap::new(),
            sleep_turns: 0,
            toxic_turns: 0,
        }
    }

    /// The bound roster entry, if any
    pub fn roster_entry(&self) -> Option<usize> {
        Some(self.roster_index).filter(|&index| index != Self::UNBOUND)
    }

    // === Volatiles ===

    pub fn has_volatile(&self, volatile: &Volatile) -> bool {
        self.volatiles.contains_key(volatile)
    }

    pub fn add_volatile(&mut self, volatile: Volatile, data: VolatileData) {
        self.volatiles.insert(volatile, data);
    }

    pub fn remove_volatile(&mut self, volatile: &Volatile) -> Option<VolatileData> {
        self.volatiles.remove(volatile)
    }

    /// Any volatile, turn status or move status
    pub fn has_status(&self, volatile: &Volatile) -> bool {
        self.has_volatile(volatile)
            || self.turn_status.contains(volatile)
            || self.move_status.contains(volatile)
    }

    pub fn counter(&self, volatile: &Volatile) -> Option<u8> {
        match self.volatiles.get(volatile)? {
            VolatileData::Counter(n) => Some(*n),
            _ => None,
        }
    }

    pub fn perish_counter(&self) -> Option<u8> {
        self.counter(&Volatile::PerishSong)
    }

    pub fn stockpile_layers(&self) -> u8 {
        self.counter(&Volatile::Stockpile).unwrap_or(0)
    }

    // === Disguise ===

    pub fn is_disguised(&self) -> bool {
        self.has_volatile(&Volatile::Illusion)
    }

    pub fn disguise(&self) -> Option<&DisguiseGuess> {
        match self.volatiles.get(&Volatile::Illusion)? {
            VolatileData::Disguise(guess) => Some(guess),
            _ => None,
        }
    }

    pub fn set_disguise(&mut self, guess: DisguiseGuess) {
        self.maybe_disguised = false;
        self.add_volatile(Volatile::Illusion, VolatileData::Disguise(guess));
    }

    // === Transform ===

    pub fn is_transformed(&self) -> bool {
        self.has_volatile(&Volatile::Transformed)
    }

    pub fn transform(&self) -> Option<&TransformSnapshot> {
        match self.volatiles.get(&Volatile::Transformed)? {
            VolatileData::Transform(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Move set in use: the copied one while transformed
    pub fn effective_moves(&self) -> &[MoveKnowledge] {
        match self.transform() {
            Some(snapshot) => &snapshot.moves,
            None => &self.pokemon.moves,
        }
    }

    pub fn effective_moves_mut(&mut self) -> &mut Vec<MoveKnowledge> {
        if let Some(VolatileData::Transform(snapshot)) =
            self.volatiles.get_mut(&Volatile::Transformed)
        {
            return &mut snapshot.moves;
        }
        &mut self.pokemon.moves
    }

    /// Species currently shown on the field
    pub fn effective_species(&self) -> &str {
        match self.transform() {
            Some(snapshot) => &snapshot.species,
            None => self.pokemon.species(),
        }
    }

    /// Current types after Terastallization, type changes, Transform and Roost
    pub fn types(&self) -> Vec<Type> {
        if self.pokemon.terastallized
            && let Some(tera) = self.pokemon.tera_type
        {
            return vec![tera];
        }

        let mut types = match self.volatiles.get(&Volatile::TypeChange) {
            Some(VolatileData::Types(types)) => types.clone(),
            _ => match self.transform() {
                Some(snapshot) => snapshot.types.clone(),
                None => self.pokemon.base_types.clone(),
            },
        };

        if let Some(VolatileData::Types(added)) = self.volatiles.get(&Volatile::TypeAdd) {
            for t in added {
                if !types.contains(t) {
                    types.push(*t);
                }
            }
        }

        if self.turn_status.contains(&Volatile::Roost) {
            types.retain(|t| *t != Type::Flying);
            if types.is_empty() {
                types.push(Type::Normal);
            }
        }

        types
    }

    /// Ability is switched off for this combatant (Gastro Acid)
    pub fn ability_suppressed(&self) -> bool {
        self.has_volatile(&Volatile::GastroAcid) || self.pokemon.ability.disabled
    }

    // === Bookkeeping ===

    /// Track consecutive uses of the same move
    pub fn record_repeat(&mut self, move_id: &str) {
        if self.last_move.as_deref() == Some(move_id) {
            self.repeat_count += 1;
        } else {
            self.repeat_count = 1;
            self.last_move = Some(move_id.to_string());
        }
    }

    pub fn record_stint_move(&mut self, move_id: &str) {
        if !self.stint_moves.iter().any(|m| m == move_id) {
            self.stint_moves.push(move_id.to_string());
        }
    }

    /// Per-turn reset
    pub fn end_turn(&mut self) {
        self.turn_status.clear();
        if self.pokemon.status == Some(Status::BadPoison) {
            self.toxic_turns = self.toxic_turns.saturating_add(1);
        }
    }

    /// Boosts and volatiles handed to the replacement by a passing move
    pub fn passed_state(&self, kind: PassKind) -> (StatStages, HashMap<Volatile, VolatileData>) {
        match kind {
            PassKind::BatonPass => {
                let volatiles = self
                    .volatiles
                    .iter()
                    .filter(|(v, _)| v.is_passable())
                    .map(|(v, d)| (v.clone(), d.clone()))
                    .collect();
                (self.boosts, volatiles)
            }
            PassKind::ShedTail => {
                let volatiles = self
                    .volatiles
                    .get_key_value(&Volatile::Substitute)
                    .map(|(v, d)| (v.clone(), d.clone()))
                    .into_iter()
                    .collect();
                (StatStages::default(), volatiles)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoroark_protocol::Stat;

    fn create_active() -> ActiveState {
        let mut pokemon = PokemonState::new("Skarmory", "Skarmory", 100);
        pokemon.base_types = vec![Type::Steel, Type::Flying];
        ActiveState::new(0, pokemon, 1, EntryOrigin::Existing)
    }

    #[test]
    fn test_new_active_marks_pokemon() {
        let active = create_active();
        assert!(active.pokemon.active);
        assert_eq!(active.displayed_name, "Skarmory");
        assert!(!active.is_disguised());
    }

    #[test]
    fn test_types_with_roost_and_tera() {
        let mut active = create_active();
        assert_eq!(active.types(), vec![Type::Steel, Type::Flying]);

        active.turn_status.insert(Volatile::Roost);
        assert_eq!(active.types(), vec![Type::Steel]);

        active.add_volatile(Volatile::TypeAdd, VolatileData::Types(vec![Type::Grass]));
        assert_eq!(active.types(), vec![Type::Steel, Type::Grass]);

        active.pokemon.tera_type = Some(Type::Fairy);
        active.pokemon.terastallized = true;
        assert_eq!(active.types(), vec![Type::Fairy]);
    }

    #[test]
    fn test_type_change_replaces_types() {
        let mut active = create_active();
        active.add_volatile(Volatile::TypeChange, VolatileData::Types(vec![Type::Water]));
        assert_eq!(active.types(), vec![Type::Water]);
    }

    #[test]
    fn test_transformed_move_set() {
        let mut active = create_active();
        active.pokemon.moves.push(MoveKnowledge::new("Spikes", 32));
        active.add_volatile(
            Volatile::Transformed,
            VolatileData::Transform(Box::new(TransformSnapshot {
                species: "Garchomp".to_string(),
                types: vec![Type::Dragon, Type::Ground],
                ..Default::default()
            })),
        );

        assert!(active.effective_moves().is_empty());
        active
            .effective_moves_mut()
            .push(MoveKnowledge::new("Earthquake", 5));
        assert_eq!(active.effective_moves()[0].id, "earthquake");
        assert_eq!(active.pokemon.moves.len(), 1);
        assert_eq!(active.effective_species(), "Garchomp");
        assert_eq!(active.types(), vec![Type::Dragon, Type::Ground]);
    }

    #[test]
    fn test_repeat_counter() {
        let mut active = create_active();
        active.record_repeat("protect");
        assert_eq!(active.repeat_count, 1);
        active.record_repeat("protect");
        assert_eq!(active.repeat_count, 2);
        active.record_repeat("spikes");
        assert_eq!(active.repeat_count, 1);
        assert_eq!(active.last_move.as_deref(), Some("spikes"));
    }

    #[test]
    fn test_baton_pass_state() {
        let mut active = create_active();
        active.boosts.boost(Stat::Atk, 2);
        active.add_volatile(Volatile::PerishSong, VolatileData::Counter(2));
        active.add_volatile(Volatile::Substitute, VolatileData::None);
        active.add_volatile(Volatile::Taunt, VolatileData::None);

        let (boosts, volatiles) = active.passed_state(PassKind::BatonPass);
        assert_eq!(boosts.atk, 2);
        assert_eq!(
            volatiles.get(&Volatile::PerishSong),
            Some(&VolatileData::Counter(2))
        );
        assert!(volatiles.contains_key(&Volatile::Substitute));
        assert!(!volatiles.contains_key(&Volatile::Taunt));

        let (boosts, volatiles) = active.passed_state(PassKind::ShedTail);
        assert!(boosts.is_clear());
        assert_eq!(volatiles.len(), 1);
        assert!(volatiles.contains_key(&Volatile::Substitute));
    }

    #[test]
    fn test_toxic_counter_advances() {
        let mut active = create_active();
        active.pokemon.status = Some(Status::BadPoison);
        active.turn_status.insert(Volatile::Protect);
        active.end_turn();
        active.end_turn();
        assert_eq!(active.toxic_turns, 2);
        assert!(active.turn_status.is_empty());
    }
}
