use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{Pick, Strategy};
use crate::actions::Action;
use crate::context::DecisionContext;

/// Picks uniformly among the legal options in every phase
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomStrategy;

#[async_trait]
impl Strategy for RandomStrategy {
    async fn choose_team(&mut self, ctx: &DecisionContext<'_>, rng: &mut StdRng) -> Vec<usize> {
        let size = ctx
            .request()
            .and_then(|r| r.side.as_ref())
            .map_or(0, |side| side.pokemon.len());
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(rng);
        order
    }

    async fn choose_active(
        &mut self,
        _ctx: &DecisionContext<'_>,
        _slot: usize,
        options: &[Action],
        rng: &mut StdRng,
    ) -> Pick {
        Pick::random(options, rng)
    }
}
