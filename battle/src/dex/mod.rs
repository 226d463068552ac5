//! Generation-indexed reference data.
//!
//! The tracker and the agent only ever ask a [`Dex`] for what they need;
//! where the data comes from is up to the implementation. [`MemoryDex`]
//! keeps everything in hash maps and can be filled by hand or, with the
//! `serde` feature, from JSON.
//!
//! Lookups are fallible. [`DexExt`] turns a miss into a documented default
//! entry so callers never have to special-case unknown ids.

mod formula;
mod memory;

use std::sync::LazyLock;

use zoroark_protocol::MoveTarget;

use crate::types::{Status, Type};

pub use formula::{calc_hp, calc_stat, estimate_stats};
pub use memory::{DexTable, MemoryDex};

/// Normalize a display name to an id ("King's Shield" -> "kingsshield")
pub fn to_id(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Normalize an effect name, dropping the "move: " / "ability: " / "item: " tag
pub fn effect_id(s: &str) -> String {
    let name = s
        .strip_prefix("move: ")
        .or_else(|| s.strip_prefix("ability: "))
        .or_else(|| s.strip_prefix("item: "))
        .unwrap_or(s);
    to_id(name)
}

/// Base stats of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

impl BaseStats {
    pub const fn uniform(value: u32) -> Self {
        Self {
            hp: value,
            atk: value,
            def: value,
            spa: value,
            spd: value,
            spe: value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<Type>,
    #[cfg_attr(feature = "serde", serde(rename = "baseStats"))]
    pub base_stats: BaseStats,
    /// Ability ids this species can have
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<String>,
}

impl SpeciesData {
    /// Entry used for species we have no data for
    pub fn unknown() -> Self {
        Self {
            name: String::new(),
            types: vec![Type::Normal],
            base_stats: BaseStats::uniform(80),
            abilities: Vec::new(),
        }
    }

    pub fn id(&self) -> String {
        to_id(&self.name)
    }

    pub fn has_ability(&self, id: &str) -> bool {
        self.abilities.iter().any(|a| to_id(a) == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveCategory {
    Physical,
    Special,
    #[default]
    Status,
}

/// Move properties that change how a move is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoveFlags {
    pub contact: bool,
    /// Spends a turn charging before it hits
    pub charge: bool,
    /// User must recharge afterwards
    pub recharge: bool,
    pub powder: bool,
    pub sound: bool,
    /// One-hit KO move
    pub ohko: bool,
    /// Always makes the target flinch (Fake Out)
    pub flinch: bool,
    /// Ignores evasion boosts
    pub ignore_evasion: bool,
    /// Blocked by Protect
    pub protection: bool,
    /// Heals the user
    pub heal: bool,
    /// Bounced back by Magic Bounce / Magic Coat
    pub reflectable: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveData {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub move_type: Type,
    pub category: MoveCategory,
    #[cfg_attr(feature = "serde", serde(rename = "basePower", default))]
    pub base_power: u32,
    /// `None` for moves that never miss
    pub accuracy: Option<u32>,
    pub pp: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: MoveTarget,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: MoveFlags,
    /// Fraction of damage dealt restored to the user
    #[cfg_attr(feature = "serde", serde(default))]
    pub drain: f64,
    /// Fraction of max HP restored to the user
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: f64,
    /// Status inflicted on the target
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: Option<Status>,
    /// Side condition id installed by the move
    #[cfg_attr(feature = "serde", serde(rename = "sideCondition", default))]
    pub side_condition: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weather: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub terrain: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "pseudoWeather", default))]
    pub pseudo_weather: Option<String>,
}

impl MoveData {
    /// Entry used for moves we have no data for
    pub fn unknown() -> Self {
        Self {
            name: String::new(),
            move_type: Type::Normal,
            category: MoveCategory::Status,
            base_power: 0,
            accuracy: Some(100),
            pp: 8,
            priority: 0,
            target: MoveTarget::Normal,
            flags: MoveFlags::default(),
            drain: 0.0,
            heal: 0.0,
            status: None,
            side_condition: None,
            weather: None,
            terrain: None,
            pseudo_weather: None,
        }
    }

    pub fn id(&self) -> String {
        to_id(&self.name)
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status
    }

    /// PP after the maximum number of PP Ups
    pub fn max_pp(&self) -> u32 {
        if self.pp <= 1 {
            self.pp
        } else {
            self.pp * 8 / 5
        }
    }
}

/// Likely build of a species, used to fill in what hasn't been revealed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommonSet {
    #[cfg_attr(feature = "serde", serde(default))]
    pub moves: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub item: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ability: Option<String>,
}

/// Source of reference data. Ids are already normalized with [`to_id`].
pub trait Dex: Send + Sync {
    fn species(&self, generation: u8, id: &str) -> Option<&SpeciesData>;
    fn move_data(&self, generation: u8, id: &str) -> Option<&MoveData>;
    fn common_set(&self, generation: u8, species_id: &str) -> Option<&CommonSet>;
}

static UNKNOWN_SPECIES: LazyLock<SpeciesData> = LazyLock::new(SpeciesData::unknown);
static UNKNOWN_MOVE: LazyLock<MoveData> = LazyLock::new(MoveData::unknown);
static EMPTY_SET: LazyLock<CommonSet> = LazyLock::new(CommonSet::default);

/// Name-based lookups with default entries for misses
pub trait DexExt: Dex {
    fn species_or_default(&self, generation: u8, name: &str) -> &SpeciesData {
        self.species(generation, &to_id(name))
            .unwrap_or(&*UNKNOWN_SPECIES)
    }

    fn move_or_default(&self, generation: u8, name: &str) -> &MoveData {
        self.move_data(generation, &to_id(name))
            .unwrap_or(&*UNKNOWN_MOVE)
    }

    fn common_set_or_default(&self, generation: u8, species: &str) -> &CommonSet {
        self.common_set(generation, &to_id(species))
            .unwrap_or(&*EMPTY_SET)
    }

    /// Whether the species can take on another's appearance
    fn can_disguise(&self, generation: u8, species: &str) -> bool {
        let id = to_id(species);
        match self.species(generation, &id) {
            Some(data) if !data.abilities.is_empty() => data.has_ability("illusion"),
            _ => id.starts_with("zoroark") || id.starts_with("zorua"),
        }
    }
}

impl<D: Dex + ?Sized> DexExt for D {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_id() {
        assert_eq!(to_id("King's Shield"), "kingsshield");
        assert_eq!(to_id("Urshifu-Rapid-Strike"), "urshifurapidstrike");
        assert_eq!(to_id("U-turn"), "uturn");
    }

    #[test]
    fn test_effect_id_strips_tag() {
        assert_eq!(effect_id("move: Stealth Rock"), "stealthrock");
        assert_eq!(effect_id("ability: Flash Fire"), "flashfire");
        assert_eq!(effect_id("item: Choice Scarf"), "choicescarf");
        assert_eq!(effect_id("confusion"), "confusion");
    }

    #[test]
    fn test_defaults_for_unknown_ids() {
        let dex = MemoryDex::new();
        let species = dex.species_or_default(9, "Missingno");
        assert_eq!(species.types, vec![Type::Normal]);
        assert_eq!(species.base_stats, BaseStats::uniform(80));

        let data = dex.move_or_default(9, "Mystery Move");
        assert_eq!(data.category, MoveCategory::Status);
        assert_eq!(data.base_power, 0);
        assert_eq!(data.accuracy, Some(100));
        assert_eq!(data.pp, 8);
        assert_eq!(data.priority, 0);
        assert_eq!(data.target, MoveTarget::Normal);

        assert!(dex.common_set_or_default(9, "Missingno").moves.is_empty());
    }

    #[test]
    fn test_can_disguise() {
        let mut dex = MemoryDex::new();
        dex.insert_species(
            None,
            SpeciesData {
                name: "Zoroark-Hisui".to_string(),
                types: vec![Type::Normal, Type::Ghost],
                base_stats: BaseStats::uniform(90),
                abilities: vec!["Illusion".to_string()],
            },
        );
        assert!(dex.can_disguise(9, "Zoroark-Hisui"));
        assert!(dex.can_disguise(9, "Zorua"));
        assert!(!dex.can_disguise(9, "Garchomp"));
    }

    #[test]
    fn test_max_pp() {
        let mut data = MoveData::unknown();
        data.pp = 5;
        assert_eq!(data.max_pp(), 8);
        data.pp = 1;
        assert_eq!(data.max_pp(), 1);
    }
}
