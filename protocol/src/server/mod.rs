//! Messages originating from the battle host.

mod battle;
mod event;
mod request;


pub use battle::{GameType, HpStatus, MoveTarget, Player, Pokemon, PokemonDetails, Side, Stat};
pub use event::{Attribution, BattleEvent, MajorEvent, MinorEvent};
pub use request::{
    ActivePokemon, BattleRequest, MaxMoveSlot, MaxMoves, MoveSlot, PokemonStats, SideInfo,
    SidePokemon, ZMoveInfo,
};
