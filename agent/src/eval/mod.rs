//! Move evaluation: damage, accuracy and tier classification

mod accuracy;
mod damage;
mod models;
mod oracle;

pub use accuracy::{estimate_accuracy, weather_guarantees_hit};
pub use damage::{DamageEstimate, DamageOptions, PROTECT_MOVES, estimate_damage};
pub use models::{
    CombatantModel, FieldModel, ModelStats, MoveModel, SideModel, is_breakable, model_of,
};
pub use oracle::{DamageOracle, FormulaOracle, OracleDamage};

use zoroark_battle::dex::DexExt;
use zoroark_battle::{Terrain, Type, Volatile};
use zoroark_protocol::Player;

use crate::actions::{MoveAction, affected};
use crate::context::DecisionContext;

/// How good a move looks against a target, worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Only hits our own side
    N,
    /// Does no damage
    Z,
    /// The target heals more than it loses
    E,
    D,
    C,
    B,
    A,
    /// Might knock out, or flinches first with priority
    S,
    /// Knocks out for sure
    SP,
    /// Knocks out for sure and moves first
    SPP,
}

/// Inputs to [`classify`], all in percent of the target's max HP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitSummary {
    pub min: u32,
    pub max: u32,
    pub target_hp: u32,
    /// HP the target regains each turn
    pub recovery: u32,
    pub priority: i8,
    /// A priority move that is certain to make the target flinch
    pub guaranteed_flinch: bool,
    pub own_side: bool,
}

pub fn classify(hit: &HitSummary) -> Tier {
    if hit.own_side {
        return Tier::N;
    }
    if hit.max == 0 {
        return Tier::Z;
    }
    if hit.min >= hit.target_hp {
        return if hit.priority > 0 { Tier::SPP } else { Tier::SP };
    }
    if hit.max >= hit.target_hp || (hit.guaranteed_flinch && hit.priority > 0) {
        return Tier::S;
    }

    let guaranteed = hit.min as i64 - hit.recovery as i64;
    let possible = hit.max as i64 - hit.recovery as i64;
    if possible <= 0 {
        Tier::E
    } else if guaranteed >= 45 || possible >= 80 {
        Tier::A
    } else if guaranteed >= 30 || possible >= 60 {
        Tier::B
    } else if guaranteed >= 15 || possible >= 40 {
        Tier::C
    } else {
        Tier::D
    }
}

/// Best outcome of a move over the foes it hits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvaluation {
    pub tier: Tier,
    /// Damage range against the best target, percent of its max HP
    pub min: u32,
    pub max: u32,
    pub accuracy: f64,
    pub priority: i8,
}

impl MoveEvaluation {
    fn empty(tier: Tier) -> Self {
        Self {
            tier,
            min: 0,
            max: 0,
            accuracy: 1.0,
            priority: 0,
        }
    }

    /// Expected damage, used to break ties within a tier
    pub fn expected(&self) -> f64 {
        (self.min + self.max) as f64 / 2.0 * self.accuracy
    }
}

/// Evaluate a move choice of the combatant in `user`
pub async fn evaluate_move(
    ctx: &DecisionContext<'_>,
    user: (Player, usize),
    action: &MoveAction,
) -> MoveEvaluation {
    let battle = ctx.battle;
    let data = ctx.dex().move_or_default(battle.generation, &action.id);
    let targets = affected(battle, user.0, user.1, action.target_type, action.target);
    let foes: Vec<(Player, usize)> = targets
        .iter()
        .copied()
        .filter(|(player, _)| battle.is_foe(user.0, *player))
        .collect();

    if foes.is_empty() {
        let tier = if data.is_damaging() && !targets.is_empty() {
            Tier::N
        } else {
            Tier::Z
        };
        return MoveEvaluation::empty(tier);
    }

    let first_turn = ctx
        .active(user.0, user.1)
        .is_some_and(|a| a.switched_in_turn + 1 >= battle.turn);

    let mut best: Option<MoveEvaluation> = None;
    for target in foes {
        let damage =
            estimate_damage(ctx, user, target, &action.id, DamageOptions::default()).await;
        let accuracy = estimate_accuracy(ctx, user, target, &action.id).await;
        let model = model_of(battle, ctx.me(), target.0, target.1, ctx.config.stat_mode);
        let target_hp = model.as_ref().map_or(100, |m| m.hp_percent);
        let unflinching = model.as_ref().is_none_or(flinch_immune)
            || ctx
                .active(target.0, target.1)
                .is_some_and(|a| a.has_volatile(&Volatile::Dynamaxed));

        let hit = HitSummary {
            min: damage.min,
            max: damage.max,
            target_hp,
            recovery: model.as_ref().map_or(0, |m| recovery_per_turn(ctx, m, target)),
            priority: damage.priority,
            guaranteed_flinch: data.flags.flinch && first_turn && !unflinching,
            own_side: false,
        };
        let evaluation = MoveEvaluation {
            tier: classify(&hit),
            min: damage.min,
            max: damage.max,
            accuracy,
            priority: damage.priority,
        };

        let better = best.is_none_or(|b| {
            (evaluation.tier, evaluation.expected()) > (b.tier, b.expected())
        });
        if better {
            best = Some(evaluation);
        }
    }

    best.unwrap_or_else(|| MoveEvaluation::empty(Tier::Z))
}

fn flinch_immune(model: &CombatantModel) -> bool {
    matches!(model.ability.as_deref(), Some("innerfocus" | "shielddust"))
        || model.has_item("covertcloak")
}

/// Percent of max HP a combatant regains at the end of each turn
pub fn recovery_per_turn(
    ctx: &DecisionContext<'_>,
    model: &CombatantModel,
    (player, slot): (Player, usize),
) -> u32 {
    let mut recovery = 0;
    match model.item.as_deref() {
        Some("leftovers") => recovery += 6,
        Some("blacksludge") if model.types.contains(&Type::Poison) => recovery += 6,
        _ => {}
    }
    if ctx.battle.field.terrain == Some(Terrain::Grassy) && model.grounded {
        recovery += 6;
    }
    if model.has_ability("poisonheal") && model.status.is_some_and(|s| s.is_poison()) {
        recovery += 12;
    }
    if let Some(active) = ctx.active(player, slot) {
        for volatile in [Volatile::Ingrain, Volatile::AquaRing] {
            if active.has_volatile(&volatile) {
                recovery += 6;
            }
        }
    }
    recovery
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(min: u32, max: u32) -> HitSummary {
        HitSummary {
            min,
            max,
            target_hp: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_order() {
        assert!(Tier::N < Tier::Z && Tier::Z < Tier::E && Tier::E < Tier::D);
        assert!(Tier::A < Tier::S && Tier::S < Tier::SP && Tier::SP < Tier::SPP);
    }

    #[test]
    fn test_guaranteed_45_is_a() {
        assert_eq!(classify(&hit(45, 53)), Tier::A);
        assert_eq!(classify(&hit(10, 80)), Tier::A);
        assert_eq!(classify(&hit(30, 35)), Tier::B);
        assert_eq!(classify(&hit(15, 20)), Tier::C);
        assert_eq!(classify(&hit(5, 39)), Tier::D);
    }

    #[test]
    fn test_knockouts() {
        let mut summary = hit(100, 118);
        assert_eq!(classify(&summary), Tier::SP);
        summary.priority = 1;
        assert_eq!(classify(&summary), Tier::SPP);

        let mut weakened = hit(40, 47);
        weakened.target_hp = 45;
        assert_eq!(classify(&weakened), Tier::S);
    }

    #[test]
    fn test_recovery_and_special_labels() {
        let mut healed = hit(4, 6);
        healed.recovery = 6;
        assert_eq!(classify(&healed), Tier::E);

        // Recovery shifts both bounds
        let mut chipped = hit(50, 60);
        chipped.recovery = 6;
        assert_eq!(classify(&chipped), Tier::B);

        assert_eq!(classify(&hit(0, 0)), Tier::Z);
        assert_eq!(
            classify(&HitSummary {
                own_side: true,
                ..hit(50, 60)
            }),
            Tier::N
        );

        let mut fake_out = hit(8, 10);
        fake_out.priority = 3;
        fake_out.guaranteed_flinch = true;
        assert_eq!(classify(&fake_out), Tier::S);
    }
}
