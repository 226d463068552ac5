//! Decision strategies

mod generic;
mod random;
pub mod switching;

pub use generic::GenericStrategy;
pub use random::RandomStrategy;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::actions::Action;
use crate::context::DecisionContext;
use crate::eval::Tier;
use crate::log::Reason;

/// What a strategy chose for one slot, and why
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub action: Action,
    pub reason: Reason,
    pub tier: Option<Tier>,
}

impl Pick {
    pub fn new(action: Action, reason: Reason) -> Self {
        Self {
            action,
            reason,
            tier: None,
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Any of `options`, uniformly
    pub fn random(options: &[Action], rng: &mut StdRng) -> Self {
        let action = options.choose(rng).cloned().unwrap_or(Action::Pass);
        Self::new(action, Reason::Random)
    }
}

/// Trait for choosing actions on behalf of one player.
///
/// The [`Agent`](crate::Agent) calls one method per pending sub-decision and
/// only ever offers legal options, already filtered for switch targets and
/// power-ups claimed by other slots this turn. Every method must return one
/// of the options it was given.
///
/// # Example
///
/// ```ignore
/// struct AlwaysFirst;
///
/// #[async_trait]
/// impl Strategy for AlwaysFirst {
///     async fn choose_active(
///         &mut self,
///         _ctx: &DecisionContext<'_>,
///         _slot: usize,
///         options: &[Action],
///         _rng: &mut StdRng,
///     ) -> Pick {
///         Pick::new(options[0].clone(), Reason::Forced)
///     }
/// }
/// ```
#[async_trait]
pub trait Strategy: Send {
    /// Team order at team preview, as request roster positions with the lead first.
    ///
    /// The default keeps the roster order.
    async fn choose_team(&mut self, ctx: &DecisionContext<'_>, rng: &mut StdRng) -> Vec<usize> {
        let _ = rng;
        let size = ctx
            .request()
            .and_then(|r| r.side.as_ref())
            .map_or(0, |side| side.pokemon.len());
        (0..size).collect()
    }

    /// Replacement for a fainted combatant; `options` are never empty
    async fn choose_force_switch(
        &mut self,
        ctx: &DecisionContext<'_>,
        slot: usize,
        options: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        let _ = (ctx, slot);
        options.choose(rng).copied().unwrap_or_default()
    }

    /// Fainted member to bring back; `options` are never empty
    async fn choose_revival(
        &mut self,
        ctx: &DecisionContext<'_>,
        slot: usize,
        options: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        let _ = (ctx, slot);
        options.choose(rng).copied().unwrap_or_default()
    }

    /// Action for an active slot; `options` are never empty
    async fn choose_active(
        &mut self,
        ctx: &DecisionContext<'_>,
        slot: usize,
        options: &[Action],
        rng: &mut StdRng,
    ) -> Pick;
}
