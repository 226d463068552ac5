//! Roster entries and the knowledge we hold about them

use zoroark_protocol::{HpStatus, PokemonDetails};

use super::pokemon_type::Type;
use super::stats::StatKnowledge;
use super::status::Status;
use crate::dex::to_id;

/// Core Pokemon identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonIdentity {
    /// Name as revealed in identifiers (nickname or species)
    pub name: String,

    /// Species name (including forme, e.g., "Pikachu-Alola")
    pub species: String,

    /// Level (1-100)
    pub level: u8,

    /// Gender ('M', 'F', or None for genderless)
    pub gender: Option<char>,

    pub shiny: bool,
}

impl PokemonIdentity {
    pub fn new(name: impl Into<String>, species: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            level,
            gender: None,
            shiny: false,
        }
    }

    /// Take species, level, gender and shininess from a details string
    pub fn apply_details(&mut self, details: &PokemonDetails) {
        self.species = details.species.clone();
        self.level = details.level.unwrap_or(100);
        self.gender = details.gender;
        self.shiny = details.shiny;
    }

    pub fn species_id(&self) -> String {
        to_id(&self.species)
    }

    /// Whether a details species fits this entry; "Urshifu-*" style
    /// preview species match any forme
    pub fn species_matches(&self, species: &str) -> bool {
        match self.species.strip_suffix("-*") {
            Some(base) => species == base || species.starts_with(&format!("{}-", base)),
            None => self.species == species,
        }
    }
}

impl Default for PokemonIdentity {
    fn default() -> Self {
        Self::new("", "", 100)
    }
}

/// Knowledge about an item or ability slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Knowledge {
    /// We know `current` for certain (including "nothing")
    pub known: bool,
    /// The value was shown in the battle log
    pub revealed: bool,
    /// Current value; `None` with `known` means there is none
    pub current: Option<String>,
    /// Value the pokemon started with
    pub base: Option<String>,
    /// Cannot change (e.g. a choice lock or a permanent ability)
    pub locked: bool,
    /// Suppressed (Gastro Acid, Embargo)
    pub disabled: bool,
    /// Exchanged with another pokemon
    pub swapped: bool,
}

impl Knowledge {
    /// Record a value shown in the battle log
    pub fn reveal(&mut self, value: &str) {
        let id = to_id(value);
        if self.base.is_none() && !self.swapped {
            self.base = Some(id.clone());
        }
        self.current = Some(id);
        self.known = true;
        self.revealed = true;
    }

    /// Reveal through an effect attribution; a value already lost stays lost
    pub fn reveal_from_effect(&mut self, value: &str) {
        if self.is_none() && self.base.as_deref() == Some(to_id(value).as_str()) {
            return;
        }
        self.reveal(value);
    }

    /// Record an authoritative value (empty means none)
    pub fn set_known(&mut self, value: &str) {
        let id = to_id(value);
        self.current = (!id.is_empty()).then_some(id);
        self.known = true;
    }

    /// The value was lost (consumed, knocked off, stolen)
    pub fn remove(&mut self, value: &str) {
        if self.base.is_none() && !self.swapped {
            self.base = Some(to_id(value));
        }
        self.current = None;
        self.known = true;
        self.revealed = true;
    }

    /// Current value when it is known to exist
    pub fn value(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is(&self, id: &str) -> bool {
        self.current.as_deref() == Some(id)
    }

    /// Known to be empty
    pub fn is_none(&self) -> bool {
        self.known && self.current.is_none()
    }
}

/// Knowledge about one move
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveKnowledge {
    pub id: String,
    pub name: String,
    /// Seen in the battle log (not just listed in a request)
    pub revealed: bool,
    pub pp: u32,
    /// Zero when the move has no PP budget
    pub max_pp: u32,
    pub disabled: bool,
}

impl MoveKnowledge {
    pub fn new(name: &str, max_pp: u32) -> Self {
        Self {
            id: to_id(name),
            name: name.to_string(),
            revealed: false,
            pp: max_pp,
            max_pp,
            disabled: false,
        }
    }

    /// Spend PP, never below zero
    pub fn deduct(&mut self, amount: u32) {
        if self.max_pp > 0 {
            self.pp = self.pp.saturating_sub(amount);
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.disabled && (self.max_pp == 0 || self.pp > 0)
    }
}

/// Find a move record by id, creating it with `max_pp` when missing
pub fn move_entry<'a>(
    moves: &'a mut Vec<MoveKnowledge>,
    name: &str,
    max_pp: u32,
) -> &'a mut MoveKnowledge {
    let id = to_id(name);
    let index = match moves.iter().position(|m| m.id == id) {
        Some(index) => index,
        None => {
            moves.push(MoveKnowledge::new(name, max_pp));
            moves.len() - 1
        }
    };
    &mut moves[index]
}

/// One roster entry
#[derive(Debug, Clone, Default)]
pub struct PokemonState {
    pub identity: PokemonIdentity,

    /// Position in the side's roster
    pub index: usize,

    /// Shown in the battle (as opposed to only listed at team preview)
    pub revealed: bool,

    pub active: bool,
    pub active_slot: Option<usize>,

    // === HP and status ===
    /// Current HP (exact for our side, out of 100 for others)
    pub hp_current: u32,
    pub hp_max: Option<u32>,
    pub status: Option<Status>,
    pub fainted: bool,

    // === Knowledge ===
    pub stats: StatKnowledge,
    pub moves: Vec<MoveKnowledge>,
    pub item: Knowledge,
    pub ability: Knowledge,

    // === Types ===
    pub base_types: Vec<Type>,
    pub tera_type: Option<Type>,
    pub terastallized: bool,

    // === Bookkeeping ===
    /// Species can take on another's appearance (Illusion)
    pub can_disguise: bool,
    pub times_hit: u32,
    pub sleep_turns_total: u8,
    pub mega_evolved: bool,
}

impl PokemonState {
    pub fn new(name: impl Into<String>, species: impl Into<String>, level: u8) -> Self {
        Self {
            identity: PokemonIdentity::new(name, species, level),
            hp_current: 100,
            ..Default::default()
        }
    }

    pub fn from_details(name: &str, details: &PokemonDetails) -> Self {
        let mut state = Self::new(name, "", 100);
        state.identity.apply_details(details);
        state.tera_type = details.tera_type.as_deref().and_then(Type::from_protocol);
        state
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn species(&self) -> &str {
        &self.identity.species
    }

    /// HP as a percentage (0-100)
    pub fn hp_percent(&self) -> u32 {
        match self.hp_max {
            Some(0) => 0,
            Some(max) => self.hp_current * 100 / max,
            None => self.hp_current,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.fainted
    }

    pub fn apply_hp_status(&mut self, hp_status: &HpStatus) {
        self.hp_current = hp_status.current;
        if let Some(max) = hp_status.max {
            self.hp_max = Some(max);
        }

        match hp_status.status.as_deref() {
            Some("fnt") => {
                self.fainted = true;
                self.hp_current = 0;
                self.status = None;
            }
            Some(code) => self.status = Status::from_protocol(code),
            None => {
                if hp_status.current > 0 {
                    self.fainted = false;
                }
                self.status = None;
            }
        }
    }

    pub fn find_move(&self, id: &str) -> Option<&MoveKnowledge> {
        self.moves.iter().find(|m| m.id == id)
    }

    pub fn has_move(&self, id: &str) -> bool {
        self.find_move(id).is_some()
    }

    pub fn revealed_moves(&self) -> impl Iterator<Item = &MoveKnowledge> {
        self.moves.iter().filter(|m| m.revealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_pokemon() -> PokemonState {
        PokemonState::new("Sparky", "Pikachu", 50)
    }

    #[test]
    fn test_from_details() {
        let details = PokemonDetails::parse("Ogerpon-Wellspring, L88, F, tera:Water");
        let state = PokemonState::from_details("Ogerpon", &details);
        assert_eq!(state.name(), "Ogerpon");
        assert_eq!(state.species(), "Ogerpon-Wellspring");
        assert_eq!(state.identity.level, 88);
        assert_eq!(state.tera_type, Some(Type::Water));
        assert_eq!(state.hp_current, 100);
    }

    #[test]
    fn test_species_wildcard() {
        let preview = PokemonIdentity::new("Urshifu-*", "Urshifu-*", 100);
        assert!(preview.species_matches("Urshifu"));
        assert!(preview.species_matches("Urshifu-Rapid-Strike"));
        assert!(!preview.species_matches("Urshifuu"));

        let plain = PokemonIdentity::new("Zoroark", "Zoroark", 100);
        assert!(!plain.species_matches("Zoroark-Hisui"));
    }

    #[test]
    fn test_hp_percent() {
        let mut state = create_test_pokemon();
        state.hp_current = 75;
        assert_eq!(state.hp_percent(), 75);

        state.hp_current = 150;
        state.hp_max = Some(200);
        assert_eq!(state.hp_percent(), 75);
    }

    #[test]
    fn test_apply_hp_status() {
        let mut state = create_test_pokemon();
        state.apply_hp_status(&HpStatus::parse("40/100 par").unwrap());
        assert_eq!(state.hp_current, 40);
        assert_eq!(state.status, Some(Status::Paralysis));

        state.apply_hp_status(&HpStatus::parse("40/100").unwrap());
        assert!(state.status.is_none());

        state.apply_hp_status(&HpStatus::parse("0 fnt").unwrap());
        assert!(state.fainted);
        assert_eq!(state.hp_current, 0);
    }

    #[test]
    fn test_knowledge_reveal_and_remove() {
        let mut item = Knowledge::default();
        assert!(!item.known);

        item.reveal("Sitrus Berry");
        assert!(item.is("sitrusberry"));
        assert_eq!(item.base.as_deref(), Some("sitrusberry"));

        item.remove("Sitrus Berry");
        assert!(item.is_none());
        assert_eq!(item.base.as_deref(), Some("sitrusberry"));

        // The heal that follows eating the berry names it again
        item.reveal_from_effect("Sitrus Berry");
        assert!(item.is_none());

        let mut from_request = Knowledge::default();
        from_request.set_known("");
        assert!(from_request.is_none());
        assert!(!from_request.revealed);
    }

    #[test]
    fn test_move_pp_never_negative() {
        let mut moves = Vec::new();
        let record = move_entry(&mut moves, "Thunderbolt", 24);
        record.deduct(2);
        assert_eq!(record.pp, 22);
        record.deduct(100);
        assert_eq!(record.pp, 0);
        assert!(!record.is_usable());

        let struggle = move_entry(&mut moves, "Struggle", 0);
        struggle.deduct(1);
        assert_eq!(struggle.pp, 0);
        assert!(struggle.is_usable());

        // Existing records are reused
        move_entry(&mut moves, "thunderbolt", 24);
        assert_eq!(moves.len(), 2);
    }
}
