//! Typed vocabulary shared by the zoroark crates.
//!
//! - [`server`]: what the battle host tells us (identifiers, battle events,
//!   decision requests)
//! - [`client`]: what we answer with ([`Decision`])
//!
//! Turning raw protocol lines into [`BattleEvent`]s is left to the caller;
//! everything here is already structured.

use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{ActiveChoice, Decision, Gimmick, SwitchChoice};
pub use server::{
    ActivePokemon, Attribution, BattleEvent, BattleRequest, GameType, HpStatus, MajorEvent,
    MaxMoveSlot, MaxMoves, MinorEvent, MoveSlot, MoveTarget, Player, Pokemon, PokemonDetails,
    PokemonStats, Side, SideInfo, SidePokemon, Stat, ZMoveInfo,
};

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid request JSON: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
