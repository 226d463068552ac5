//! Type matchup helpers for decision making

use crate::types::{Status, Type};

/// Check if defender is immune (0x effectiveness) to a type
pub fn is_immune_to(defender_types: &[Type], attacking_type: Type) -> bool {
    attacking_type.effectiveness_multi(defender_types) == 0.0
}

/// Highest multiplier any of the attacking types reaches
pub fn best_effectiveness(attacking_types: &[Type], defender_types: &[Type]) -> f32 {
    attacking_types
        .iter()
        .map(|t| t.effectiveness_multi(defender_types))
        .fold(0.0, f32::max)
}

/// Get all types that are super effective against the defender
pub fn weaknesses(defender_types: &[Type]) -> Vec<Type> {
    Type::ALL
        .iter()
        .copied()
        .filter(|t| t.effectiveness_multi(defender_types) > 1.0)
        .collect()
}

/// Whether a status cannot land on a pokemon of these types
pub fn blocks_status(status: Status, defender_types: &[Type]) -> bool {
    let has = |t: Type| defender_types.contains(&t);
    match status {
        Status::Burn => has(Type::Fire),
        Status::Paralysis => has(Type::Electric),
        Status::Freeze => has(Type::Ice),
        Status::Poison | Status::BadPoison => has(Type::Poison) || has(Type::Steel),
        Status::Sleep => false,
    }
}

/// Powder and spore moves do nothing to Grass types (generation 6 onwards)
pub fn blocks_powder(defender_types: &[Type], generation: u8) -> bool {
    generation >= 6 && defender_types.contains(&Type::Grass)
}

/// How well `ours` fares against `theirs` on types alone.
///
/// Positive when our best attacking type hits harder than theirs does.
pub fn matchup_score(ours: &[Type], theirs: &[Type]) -> f32 {
    best_effectiveness(ours, theirs) - best_effectiveness(theirs, ours)
}
