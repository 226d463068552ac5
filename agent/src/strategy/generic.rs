//! The default heuristic strategy

use async_trait::async_trait;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;
use zoroark_battle::dex::{DexExt, MoveCategory};
use zoroark_protocol::Player;

use super::switching::{self, Profile};
use super::{Pick, Strategy};
use crate::actions::{Action, MoveAction, affected};
use crate::context::DecisionContext;
use crate::eval::{MoveEvaluation, Tier, evaluate_move};
use crate::log::Reason;
use crate::viability::Rule;

/// Tiers tried after the switch check, best first
const FALLBACK_TIERS: [Tier; 5] = [Tier::C, Tier::D, Tier::E, Tier::Z, Tier::N];

/// Priority ladder over evaluated moves.
///
/// 1. A guaranteed knockout, draining or healing ones first
/// 2. A strong move (tier S or A), sometimes a viable status move instead
/// 3. A switch when the best switch-in beats staying in
/// 4. Tier B, then a viable status move, then tiers C down to N
/// 5. Any legal action
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericStrategy;

/// An attacking option with its evaluation
struct Scored<'o> {
    action: &'o Action,
    evaluation: MoveEvaluation,
    /// Drains or heals the user
    recovers: bool,
}

impl Scored<'_> {
    fn beats(&self, other: &Self) -> bool {
        let (a, b) = (&self.evaluation, &other.evaluation);
        a.tier > b.tier || (a.tier == b.tier && a.expected() > b.expected())
    }

    fn pick(&self, reason: Reason) -> Pick {
        Pick::new(self.action.clone(), reason).with_tier(self.evaluation.tier)
    }
}

/// Best of a pool, the earliest option winning ties
fn best_of<'s, 'o>(pool: impl IntoIterator<Item = &'s Scored<'o>>) -> Option<&'s Scored<'o>>
where
    'o: 's,
{
    pool.into_iter()
        .reduce(|best, next| if next.beats(best) { next } else { best })
}

/// Probability check that treats out-of-range values as never
fn chance(rng: &mut StdRng, probability: f64) -> bool {
    rng.r#gen::<f64>() < probability
}

/// The combatant a move would mainly affect: a foe if it hits one
fn primary_target(
    ctx: &DecisionContext<'_>,
    (player, slot): (Player, usize),
    chosen: &MoveAction,
) -> Option<(Player, usize)> {
    let hit = affected(ctx.battle, player, slot, chosen.target_type, chosen.target);
    hit.iter()
        .copied()
        .find(|(target, _)| ctx.battle.is_foe(player, *target))
        .or_else(|| hit.first().copied())
}

impl GenericStrategy {
    fn should_switch(
        ctx: &DecisionContext<'_>,
        me: Player,
        slot: usize,
        switch_score: f32,
        rng: &mut StdRng,
    ) -> bool {
        if switching::forced_to_stay(ctx, me, slot) {
            return false;
        }
        let stay = switching::stay_score(ctx, me, slot);
        if switch_score <= stay + ctx.config.switch_margin {
            return false;
        }
        if switching::recently_switched(ctx) && chance(rng, ctx.config.stay_after_switch_chance) {
            debug!(slot, switch_score, stay, "staying after a recent switch");
            return false;
        }
        true
    }

    /// Highest type matchup among `options` against the foes on the field
    fn best_matchup(ctx: &DecisionContext<'_>, me: Player, options: &[usize]) -> Option<usize> {
        options
            .iter()
            .filter_map(|&position| {
                let candidate = switching::candidate(ctx, me, position)?;
                Some((position, switching::matchup(ctx, &candidate.profile)))
            })
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .map(|(position, _)| position)
    }
}

#[async_trait]
impl Strategy for GenericStrategy {
    /// Lead with the member that fares best against the opponent's preview
    async fn choose_team(&mut self, ctx: &DecisionContext<'_>, _rng: &mut StdRng) -> Vec<usize> {
        let size = ctx
            .request()
            .and_then(|r| r.side.as_ref())
            .map_or(0, |side| side.pokemon.len());
        let mut order: Vec<usize> = (0..size).collect();
        let Some(me) = ctx.me() else {
            return order;
        };

        let dex = ctx.dex();
        let foes: Vec<Profile> = ctx
            .battle
            .foes_of(me)
            .flat_map(|side| side.preview.iter())
            .map(|identity| {
                let species = dex.species_or_default(ctx.generation(), &identity.species);
                Profile::new(species.types.clone(), Vec::new())
            })
            .collect();
        if foes.is_empty() {
            return order;
        }

        let lead = order
            .iter()
            .filter_map(|&position| {
                let candidate = switching::candidate(ctx, me, position)?;
                Some((position, switching::matchup_against(&candidate.profile, &foes)))
            })
            .reduce(|best, next| if next.1 > best.1 { next } else { best })
            .map(|(position, _)| position);
        if let Some(lead) = lead {
            order.retain(|&position| position != lead);
            order.insert(0, lead);
        }
        order
    }

    async fn choose_force_switch(
        &mut self,
        ctx: &DecisionContext<'_>,
        _slot: usize,
        options: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        let Some(me) = ctx.me() else {
            return options.choose(rng).copied().unwrap_or_default();
        };
        switching::best_switch(ctx, me, options)
            .map(|(position, _)| position)
            .or_else(|| Self::best_matchup(ctx, me, options))
            .or_else(|| options.first().copied())
            .unwrap_or_default()
    }

    async fn choose_revival(
        &mut self,
        ctx: &DecisionContext<'_>,
        _slot: usize,
        options: &[usize],
        rng: &mut StdRng,
    ) -> usize {
        let Some(me) = ctx.me() else {
            return options.choose(rng).copied().unwrap_or_default();
        };
        Self::best_matchup(ctx, me, options)
            .or_else(|| options.first().copied())
            .unwrap_or_default()
    }

    async fn choose_active(
        &mut self,
        ctx: &DecisionContext<'_>,
        slot: usize,
        options: &[Action],
        rng: &mut StdRng,
    ) -> Pick {
        if let [only] = options {
            return Pick::new(only.clone(), Reason::NoChoice);
        }
        let Some(me) = ctx.me() else {
            return Pick::random(options, rng);
        };
        let user = (me, slot);
        let dex = ctx.dex();

        let switches: Vec<usize> = options.iter().filter_map(Action::switch_position).collect();
        let best_switch = switching::best_switch(ctx, me, &switches);

        let mut attacks = Vec::new();
        let mut status_moves = Vec::new();
        for action in options {
            let Some(chosen) = action.as_move() else {
                continue;
            };
            let data = dex.move_or_default(ctx.generation(), &chosen.id);
            // Counter-style moves deal no damage of their own
            let gated = data.category == MoveCategory::Status
                || matches!(ctx.registry.rule(&chosen.id), Some(Rule::Counter(_)));
            if gated {
                let target = primary_target(ctx, user, chosen);
                if ctx
                    .registry
                    .is_viable(ctx, user, target, &chosen.id, best_switch.is_some())
                {
                    status_moves.push(action);
                }
                continue;
            }
            let evaluation = evaluate_move(ctx, user, chosen).await;
            attacks.push(Scored {
                action,
                evaluation,
                recovers: data.drain > 0.0 || data.heal > 0.0,
            });
        }

        let in_tiers = |tiers: &[Tier]| {
            attacks
                .iter()
                .filter(|s| tiers.contains(&s.evaluation.tier))
                .collect::<Vec<_>>()
        };

        let knockouts = in_tiers(&[Tier::SPP, Tier::SP]);
        let recovering = knockouts.iter().copied().filter(|s| s.recovers);
        if let Some(best) = best_of(recovering).or_else(|| best_of(knockouts.iter().copied())) {
            return best.pick(Reason::GuaranteedKo);
        }

        if let Some(best) = best_of(in_tiers(&[Tier::S, Tier::A])) {
            if chance(rng, ctx.config.status_move_chance)
                && let Some(action) = status_moves.choose(rng)
            {
                return Pick::new((*action).clone(), Reason::StatusMove);
            }
            return best.pick(Reason::StrongMove);
        }

        if let Some((position, score)) = best_switch
            && Self::should_switch(ctx, me, slot, score, rng)
        {
            return Pick::new(Action::Switch(position), Reason::Switch);
        }

        if let Some(best) = best_of(in_tiers(&[Tier::B])) {
            return best.pick(Reason::Tier);
        }
        if let Some(action) = status_moves.choose(rng) {
            return Pick::new((*action).clone(), Reason::StatusMove);
        }
        for tier in FALLBACK_TIERS {
            if let Some(best) = best_of(in_tiers(&[tier])) {
                return best.pick(Reason::Tier);
            }
        }

        Pick::random(options, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn scored(action: &Action, tier: Tier, min: u32, max: u32) -> Scored<'_> {
        Scored {
            action,
            evaluation: MoveEvaluation {
                tier,
                min,
                max,
                accuracy: 1.0,
                priority: 0,
            },
            recovers: false,
        }
    }

    #[test]
    fn test_best_of_prefers_tier_then_damage() {
        let (a, b, c) = (Action::Switch(1), Action::Switch(2), Action::Switch(3));
        let pool = [
            scored(&a, Tier::B, 30, 40),
            scored(&b, Tier::A, 45, 50),
            scored(&c, Tier::A, 50, 60),
        ];
        let best = best_of(&pool).map(|s| s.action.clone());
        assert_eq!(best, Some(Action::Switch(3)));
    }

    #[test]
    fn test_best_of_keeps_first_on_ties() {
        let (a, b) = (Action::Switch(1), Action::Switch(2));
        let pool = [scored(&a, Tier::C, 20, 25), scored(&b, Tier::C, 20, 25)];
        let best = best_of(&pool).map(|s| s.action.clone());
        assert_eq!(best, Some(Action::Switch(1)));
        assert!(best_of(&[]).is_none());
    }

    #[test]
    fn test_chance_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..100).all(|_| !chance(&mut rng, 0.0)));
        assert!((0..100).all(|_| chance(&mut rng, 1.0)));
        assert!(!chance(&mut rng, f64::NAN));
    }
}
