//! Domain types for battle state tracking

mod active;
mod conditions;
mod field;
mod pokemon;
mod pokemon_type;
mod side;
mod stats;
mod status;

pub use active::{ActiveState, EntryOrigin, HitOutcome, PassKind};
pub use conditions::{FieldEffect, SideCondition, SideConditionState, Terrain, Weather};
pub use field::FieldState;
pub use pokemon::{Knowledge, MoveKnowledge, PokemonIdentity, PokemonState, move_entry};
pub use pokemon_type::{TYPE_CHART, Type};
pub use side::SideState;
pub use stats::{ACCURACY_STAGE_TABLE, StatKnowledge, StatRange, StatStages};
pub use status::{DisguiseGuess, Status, TransformSnapshot, Volatile, VolatileData};
