//! Partial-information battle state for zoroark.
//!
//! This crate turns the structured event stream of one match into a
//! knowledge model of every side: what each roster member is, what has been
//! revealed about it, and what can only be estimated. The decision engine in
//! `zoroark-agent` reads this model; nothing here ever picks an action.
//!
//! # Overview
//!
//! ```text
//! zoroark-protocol (events, requests, decisions)
//!        │
//!        ▼
//! zoroark-battle (knowledge model + tracking) ← THIS CRATE
//!        │
//!        ▼
//! zoroark-agent (action generation, evaluation, strategies)
//! ```
//!
//! # Main Types
//!
//! ## Domain Types
//! - [`Type`] - Elemental types with the effectiveness chart
//! - [`Status`] - Non-volatile status conditions
//! - [`Volatile`], [`VolatileData`] - Combatant-bound conditions and their payloads
//! - [`StatStages`] - Stat stage modifiers (-6 to +6)
//! - [`Weather`], [`Terrain`], [`SideCondition`] - Field conditions
//! - [`PokemonState`] - One roster entry and what we know about it
//! - [`ActiveState`] - A roster entry while it is on the field
//! - [`SideState`] - One player's side of the battle
//! - [`FieldState`] - Global field conditions
//!
//! ## Reference Data
//! - [`dex::Dex`] - Generation-indexed species, move and common-set lookups
//! - [`dex::MemoryDex`] - In-memory implementation
//!
//! ## State Tracking
//! - [`TrackedBattle`] - Apply events with [`TrackedBattle::apply`] and merge
//!   the latest request with [`TrackedBattle::reconcile`]
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use zoroark_battle::{TrackedBattle, Weather, dex::MemoryDex};
//!
//! let mut battle = TrackedBattle::with_dex(Arc::new(MemoryDex::new()));
//!
//! for event in events {
//!     battle.apply(&event);
//! }
//! battle.reconcile();
//!
//! if let Some(foe) = battle.opponent() {
//!     for (slot, active) in foe.actives() {
//!         println!("{}: {} ({}%)", slot, active.effective_species(), active.pokemon.hp_percent());
//!     }
//! }
//!
//! if battle.field.weather == Some(Weather::Sun) {
//!     println!("Sun is active!");
//! }
//! ```

pub mod dex;
pub mod query;
pub mod tracking;
pub mod types;

// Re-export main types at crate root for convenience
pub use tracking::{CurrentAction, DEFAULT_DISGUISE, TrackedBattle, find_entry, request_position};
pub use types::{
    ActiveState, DisguiseGuess, EntryOrigin, FieldEffect, FieldState, HitOutcome, Knowledge,
    MoveKnowledge, PassKind, PokemonIdentity, PokemonState, SideCondition, SideConditionState,
    SideState, StatKnowledge, StatRange, StatStages, Status, TYPE_CHART, Terrain,
    TransformSnapshot, Type, Volatile, VolatileData, Weather,
};

// Re-export commonly used protocol types
pub use zoroark_protocol::{GameType, Player, Stat};
