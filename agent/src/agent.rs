//! Turns the pending request into a [`Decision`]

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::task;
use tracing::{debug, warn};
use zoroark_battle::TrackedBattle;
use zoroark_protocol::{ActiveChoice, BattleRequest, Decision, Gimmick, SwitchChoice};

use crate::actions::{Action, legal_actions};
use crate::config::AgentConfig;
use crate::context::DecisionContext;
use crate::eval::{DamageOracle, FormulaOracle};
use crate::log::{DecisionLog, DecisionRecord, Reason, TracingLog};
use crate::strategy::{Pick, Strategy};
use crate::viability::ViabilityRegistry;

/// Decides for one player of one match.
///
/// Owns the strategy, the evaluation tables and the random source. Feed
/// events into the [`TrackedBattle`] as they arrive and call
/// [`Agent::decide`] whenever a request is pending.
///
/// # Example
///
/// ```ignore
/// let mut agent = Agent::new(GenericStrategy, AgentConfig::default().with_seed(7));
///
/// battle.request = Some(BattleRequest::from_json(json)?);
/// if let Some(choice) = agent.decide(&mut battle).await.to_protocol_string() {
///     send(&format!("/choose {choice}")).await;
/// }
/// ```
pub struct Agent<S: Strategy> {
    strategy: S,
    config: AgentConfig,
    registry: ViabilityRegistry,
    oracle: Arc<dyn DamageOracle>,
    log: Arc<dyn DecisionLog>,
    rng: StdRng,
}

impl<S: Strategy> Agent<S> {
    pub fn new(strategy: S, config: AgentConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            strategy,
            config,
            registry: ViabilityRegistry::standard(),
            oracle: Arc::new(FormulaOracle),
            log: Arc::new(TracingLog),
            rng,
        }
    }

    /// Replace the damage calculator
    pub fn with_oracle(mut self, oracle: Arc<dyn DamageOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Send decision diagnostics somewhere other than `tracing`
    pub fn with_log(mut self, log: Arc<dyn DecisionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_registry(mut self, registry: ViabilityRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Answer the battle's pending request.
    ///
    /// Merges the request into the battle first. Returns
    /// [`Decision::Wait`] only when no request needs an answer.
    pub async fn decide(&mut self, battle: &mut TrackedBattle) -> Decision {
        battle.reconcile();
        let battle: &TrackedBattle = battle;

        let Some(request) = battle.request.as_ref() else {
            return Decision::Wait;
        };
        if !request.needs_decision() {
            return Decision::Wait;
        }

        let ctx = DecisionContext::new(
            battle,
            &self.registry,
            self.oracle.as_ref(),
            &self.config,
            self.log.as_ref(),
        );
        let turn = Turn {
            strategy: &mut self.strategy,
            rng: &mut self.rng,
            ctx: &ctx,
        };

        if request.team_preview {
            turn.team_preview(request).await
        } else if request.is_force_switch() {
            turn.force_switch(request).await
        } else {
            turn.active(request).await
        }
    }
}

/// Borrows for one call to [`Agent::decide`]
struct Turn<'t, 'a, S> {
    strategy: &'t mut S,
    rng: &'t mut StdRng,
    ctx: &'t DecisionContext<'a>,
}

impl<S: Strategy> Turn<'_, '_, S> {
    fn record(&self, slot: usize, choice: String, reason: Reason, pick: Option<&Pick>) {
        self.ctx.log.record(&DecisionRecord {
            turn: self.ctx.battle.turn,
            slot,
            choice,
            reason,
            tier: pick.and_then(|p| p.tier),
        });
    }

    async fn team_preview(self, request: &BattleRequest) -> Decision {
        let size = request.side.as_ref().map_or(0, |side| side.pokemon.len());
        let order = self.strategy.choose_team(self.ctx, self.rng).await;

        let mut seen = HashSet::new();
        let valid = order.len() == size && order.iter().all(|&i| i < size && seen.insert(i));
        let order = if valid {
            order
        } else {
            warn!(?order, size, "strategy returned an invalid team order");
            (0..size).collect()
        };

        let decision = Decision::Team(order);
        let choice = decision.to_protocol_string().unwrap_or_default();
        self.record(0, choice, Reason::Forced, None);
        decision
    }

    async fn force_switch(self, request: &BattleRequest) -> Decision {
        let flags = request.force_switch.clone().unwrap_or_default();
        let roster = request
            .side
            .as_ref()
            .map(|side| side.pokemon.as_slice())
            .unwrap_or_default();

        let mut order: Vec<usize> = (0..flags.len()).collect();
        order.shuffle(self.rng);

        let mut choices = vec![SwitchChoice::Pass; flags.len()];
        let mut taken: Vec<usize> = Vec::new();
        for slot in order {
            if !flags[slot] {
                continue;
            }

            // Request actives lead the roster, in slot order
            let reviving = roster.get(slot).is_some_and(|member| member.reviving);
            let options: Vec<usize> = if reviving {
                roster
                    .iter()
                    .enumerate()
                    .filter(|(i, member)| member.is_fainted() && !taken.contains(i))
                    .map(|(i, _)| i)
                    .collect()
            } else {
                request
                    .available_switches()
                    .into_iter()
                    .map(|(i, _)| i)
                    .filter(|i| !taken.contains(i))
                    .collect()
            };

            if options.is_empty() {
                self.record(slot, "pass".to_string(), Reason::NoChoice, None);
                continue;
            }

            let chosen = if reviving {
                self.strategy
                    .choose_revival(self.ctx, slot, &options, self.rng)
                    .await
            } else {
                self.strategy
                    .choose_force_switch(self.ctx, slot, &options, self.rng)
                    .await
            };
            let position = if options.contains(&chosen) {
                chosen
            } else {
                warn!(slot, chosen, ?options, "strategy picked an unavailable position");
                options[0]
            };

            taken.push(position);
            let choice = if reviving {
                SwitchChoice::Revive(position)
            } else {
                SwitchChoice::Switch(position)
            };
            self.record(slot, choice.to_protocol_string(), Reason::Switch, None);
            choices[slot] = choice;
            task::yield_now().await;
        }

        Decision::ForceSwitch(choices)
    }

    async fn active(self, request: &BattleRequest) -> Decision {
        let ctx = self.ctx;
        let slots = request.active.as_ref().map_or(0, Vec::len);

        let mut order: Vec<usize> = (0..slots).collect();
        order.shuffle(self.rng);

        let mut gimmicks: HashSet<Gimmick> = ctx
            .me()
            .and_then(|me| ctx.battle.get_side(me))
            .map(|side| side.gimmicks_used.clone())
            .unwrap_or_default();
        let mut taken: Vec<usize> = Vec::new();
        let mut choices = vec![ActiveChoice::Pass; slots];

        for slot in order {
            let options: Vec<Action> = legal_actions(ctx.battle, slot)
                .into_iter()
                .filter(|action| action.switch_position().is_none_or(|p| !taken.contains(&p)))
                .filter(|action| action.gimmick().is_none_or(|g| !gimmicks.contains(&g)))
                .collect();

            let pick = match options.as_slice() {
                [] => Pick::new(Action::Pass, Reason::NoChoice),
                [only] => Pick::new(only.clone(), Reason::NoChoice),
                _ => {
                    let pick = self
                        .strategy
                        .choose_active(ctx, slot, &options, self.rng)
                        .await;
                    if options.contains(&pick.action) {
                        pick
                    } else {
                        warn!(slot, action = ?pick.action, "strategy picked an illegal action");
                        Pick::random(&options, self.rng)
                    }
                }
            };

            if let Some(position) = pick.action.switch_position() {
                taken.push(position);
            }
            if let Some(gimmick) = pick.action.gimmick() {
                gimmicks.insert(gimmick);
            }

            let choice = pick.action.to_choice();
            debug!(slot, choice = %choice.to_protocol_string(), "slot decided");
            self.record(slot, choice.to_protocol_string(), pick.reason, Some(&pick));
            choices[slot] = choice;
            task::yield_now().await;
        }

        Decision::Active(choices)
    }
}
