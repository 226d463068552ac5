//! In-memory reference data

use std::collections::HashMap;

use super::{CommonSet, Dex, MoveData, SpeciesData, to_id};

/// One set of reference tables, keyed by id
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DexTable {
    pub species: HashMap<String, SpeciesData>,
    pub moves: HashMap<String, MoveData>,
    pub sets: HashMap<String, CommonSet>,
}

impl DexTable {
    /// Re-key every entry by its normalized id
    fn normalize(self) -> Self {
        Self {
            species: rekey(self.species),
            moves: rekey(self.moves),
            sets: rekey(self.sets),
        }
    }
}

fn rekey<V>(map: HashMap<String, V>) -> HashMap<String, V> {
    map.into_iter().map(|(k, v)| (to_id(&k), v)).collect()
}

/// Reference data held in hash maps.
///
/// Per-generation tables override the default table entry by entry.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoryDex {
    pub default: DexTable,
    pub generations: HashMap<u8, DexTable>,
}

impl MemoryDex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON shaped like `{"default": {...}, "generations": {"4": {...}}}`.
    ///
    /// Anything but a top-level object is rejected.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom("reference data must be a JSON object"));
        }
        let dex: MemoryDex = serde_json::from_value(value)?;
        Ok(Self {
            default: dex.default.normalize(),
            generations: dex
                .generations
                .into_iter()
                .map(|(generation, table)| (generation, table.normalize()))
                .collect(),
        })
    }

    fn table_mut(&mut self, generation: Option<u8>) -> &mut DexTable {
        match generation {
            Some(generation) => self.generations.entry(generation).or_default(),
            None => &mut self.default,
        }
    }

    /// Add a species to a generation's table, or to the default table with `None`
    pub fn insert_species(&mut self, generation: Option<u8>, data: SpeciesData) {
        let id = data.id();
        self.table_mut(generation).species.insert(id, data);
    }

    pub fn insert_move(&mut self, generation: Option<u8>, data: MoveData) {
        let id = data.id();
        self.table_mut(generation).moves.insert(id, data);
    }

    pub fn insert_set(&mut self, generation: Option<u8>, species: &str, set: CommonSet) {
        self.table_mut(generation).sets.insert(to_id(species), set);
    }

    pub fn with_species(mut self, data: SpeciesData) -> Self {
        self.insert_species(None, data);
        self
    }

    pub fn with_move(mut self, data: MoveData) -> Self {
        self.insert_move(None, data);
        self
    }

    pub fn with_set(mut self, species: &str, set: CommonSet) -> Self {
        self.insert_set(None, species, set);
        self
    }

    fn lookup<'a, V>(
        &'a self,
        generation: u8,
        pick: impl Fn(&'a DexTable) -> &'a HashMap<String, V>,
        id: &str,
    ) -> Option<&'a V> {
        self.generations
            .get(&generation)
            .and_then(|table| pick(table).get(id))
            .or_else(|| pick(&self.default).get(id))
    }
}

impl Dex for MemoryDex {
    fn species(&self, generation: u8, id: &str) -> Option<&SpeciesData> {
        self.lookup(generation, |t| &t.species, id)
    }

    fn move_data(&self, generation: u8, id: &str) -> Option<&MoveData> {
        self.lookup(generation, |t| &t.moves, id)
    }

    fn common_set(&self, generation: u8, species_id: &str) -> Option<&CommonSet> {
        self.lookup(generation, |t| &t.sets, species_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::{BaseStats, DexExt, MoveCategory};
    use crate::types::Type;

    fn thunderbolt(base_power: u32) -> MoveData {
        MoveData {
            name: "Thunderbolt".to_string(),
            move_type: Type::Electric,
            category: MoveCategory::Special,
            base_power,
            accuracy: Some(100),
            pp: 15,
            ..MoveData::unknown()
        }
    }

    #[test]
    fn test_generation_overrides_default() {
        let mut dex = MemoryDex::new().with_move(thunderbolt(90));
        dex.insert_move(Some(4), thunderbolt(95));

        assert_eq!(dex.move_or_default(4, "Thunderbolt").base_power, 95);
        assert_eq!(dex.move_or_default(9, "Thunderbolt").base_power, 90);
        assert!(dex.move_data(9, "thunderbolt").is_some());
    }

    #[test]
    fn test_species_and_sets() {
        let dex = MemoryDex::new()
            .with_species(SpeciesData {
                name: "Mr. Mime".to_string(),
                types: vec![Type::Psychic, Type::Fairy],
                base_stats: BaseStats::uniform(80),
                abilities: vec!["Filter".to_string()],
            })
            .with_set(
                "Mr. Mime",
                CommonSet {
                    moves: vec!["nastyplot".to_string()],
                    item: Some("lifeorb".to_string()),
                    ability: Some("filter".to_string()),
                },
            );

        assert_eq!(
            dex.species_or_default(9, "Mr. Mime").types,
            vec![Type::Psychic, Type::Fairy]
        );
        assert_eq!(
            dex.common_set_or_default(9, "mrmime").item.as_deref(),
            Some("lifeorb")
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let json = r#"{
            "default": {
                "moves": {
                    "Earthquake": {"name": "Earthquake", "type": "Ground", "category": "Physical",
                                   "basePower": 100, "accuracy": 100, "pp": 10, "target": "allAdjacent"}
                }
            },
            "generations": {
                "1": {"moves": {"earthquake": {"name": "Earthquake", "type": "Ground",
                                               "category": "Physical", "basePower": 100,
                                               "accuracy": 100, "pp": 10, "priority": 0}}}
            }
        }"#;

        let dex = MemoryDex::from_json(json).unwrap();
        let data = dex.move_or_default(9, "Earthquake");
        assert_eq!(data.target, zoroark_protocol::MoveTarget::AllAdjacent);
        assert_eq!(dex.move_or_default(1, "Earthquake").target, Default::default());
        assert!(MemoryDex::from_json("[]").is_err());
        assert!(MemoryDex::from_json("42").is_err());
        assert!(MemoryDex::from_json("{}").is_ok_and(|dex| dex.generations.is_empty()));
    }
}
