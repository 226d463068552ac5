//! Heuristic decision engine for zoroark.
//!
//! Reads the knowledge model kept by `zoroark-battle` and answers the
//! pending request: a team order, replacements for fainted combatants, or
//! one action per active slot. Moves are scored by estimated damage and hit
//! chance, sorted into tiers, and picked by a [`Strategy`].
//!
//! # Overview
//!
//! ```text
//! zoroark-protocol (events, requests, decisions)
//!        │
//!        ▼
//! zoroark-battle (knowledge model + tracking)
//!        │
//!        ▼
//! zoroark-agent (action generation, evaluation, strategies) ← THIS CRATE
//! ```
//!
//! # Main Types
//!
//! - [`Agent`] - Routes a request to the strategy and enforces per-turn limits
//! - [`Strategy`] - Chooses among legal options; see [`GenericStrategy`] and
//!   [`RandomStrategy`]
//! - [`Action`] - One legal option for an active slot, from [`legal_actions`]
//! - [`DamageOracle`] - Pluggable damage calculator, [`FormulaOracle`] by default
//! - [`ViabilityRegistry`] - When a status move is worth using
//! - [`DecisionLog`] - Where decision diagnostics go
//! - [`AgentConfig`] - Stat assumptions, seed and strategy knobs
//!
//! # Example Usage
//!
//! ```ignore
//! use zoroark_agent::{Agent, AgentConfig, GenericStrategy};
//!
//! let config = AgentConfig::from_json(r#"{"seed": 42, "stat_mode": "max"}"#)?;
//! let mut agent = Agent::new(GenericStrategy, config);
//!
//! for event in events {
//!     battle.apply(&event);
//! }
//! battle.request = Some(request);
//!
//! match agent.decide(&mut battle).await {
//!     Decision::Wait => {}
//!     decision => println!("{:?}", decision.to_protocol_string()),
//! }
//! ```

pub mod actions;
mod agent;
pub mod config;
pub mod context;
mod error;
pub mod eval;
pub mod log;
pub mod strategy;
pub mod viability;

pub use actions::{Action, MoveAction, legal_actions};
pub use agent::Agent;
pub use config::{AgentConfig, StatMode};
pub use context::DecisionContext;
pub use error::AgentError;
pub use eval::{
    DamageEstimate, DamageOracle, FormulaOracle, MoveEvaluation, Tier, estimate_accuracy,
    estimate_damage, evaluate_move,
};
pub use log::{DecisionLog, DecisionRecord, MemoryLog, Reason, TracingLog};
pub use strategy::{GenericStrategy, Pick, RandomStrategy, Strategy};
pub use viability::{Rule, ViabilityRegistry};
