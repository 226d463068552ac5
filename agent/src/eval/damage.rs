//! Damage estimates for one move against one combatant

use tracing::trace;
use zoroark_battle::TrackedBattle;
use zoroark_battle::dex::{DexExt, MoveData};
use zoroark_protocol::Player;

use super::models::{CombatantModel, FieldModel, MoveModel, is_breakable, model_of};
use super::oracle::OracleDamage;
use crate::config::StatMode;
use crate::context::DecisionContext;

/// Moves that shield the user from attacks for a turn
pub const PROTECT_MOVES: [&str; 8] = [
    "protect",
    "detect",
    "kingsshield",
    "spikyshield",
    "banefulbunker",
    "obstruct",
    "silktrap",
    "burningbulwark",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageEstimate {
    pub min: u32,
    pub max: u32,
    pub priority: i8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOptions {
    /// Report HP points instead of a percentage of the defender's max HP
    pub raw: bool,
    /// Overrides the configured stat mode
    pub stat_mode: Option<StatMode>,
}

/// Estimate how much `move_id` used from `attacker` takes off `defender`.
///
/// The result is a percentage of the defender's maximum HP unless
/// [`DamageOptions::raw`] is set. Missing combatants yield zero damage.
pub async fn estimate_damage(
    ctx: &DecisionContext<'_>,
    attacker: (Player, usize),
    defender: (Player, usize),
    move_id: &str,
    options: DamageOptions,
) -> DamageEstimate {
    let battle = ctx.battle;
    let mode = options.stat_mode.unwrap_or(ctx.config.stat_mode);
    let me = ctx.me();

    let (Some(a), Some(mut d)) = (
        model_of(battle, me, attacker.0, attacker.1, mode),
        model_of(battle, me, defender.0, defender.1, mode),
    ) else {
        trace!(move_id, "damage estimate without both combatants");
        return DamageEstimate::default();
    };

    if a.breaks_abilities() && d.ability.as_deref().is_some_and(is_breakable) {
        d.ability = None;
    }

    let data = ctx.dex().move_or_default(battle.generation, move_id);
    let mut used = MoveModel::from_data(move_id, data);
    used.base_power = variable_power(battle, attacker, &used.id, used.base_power);
    if used.id == "terablast"
        && a.terastallized
        && let Some(&tera) = a.types.first()
    {
        used.move_type = tera;
    }

    let field = FieldModel::of(battle, attacker, defender);
    let result = ctx.oracle.calculate(&a, &d, &used, &field);
    let (min, max) = apply_exceptions(battle, defender, data, &used, &a, &d, result);

    let (min, max) = if options.raw {
        (min, max)
    } else {
        let hp = d.stats.hp.max(1);
        (min * 100 / hp, max * 100 / hp)
    };

    DamageEstimate {
        min,
        max,
        priority: result.priority,
    }
}

/// Base power of moves whose power depends on the battle so far
fn variable_power(battle: &TrackedBattle, attacker: (Player, usize), id: &str, base: u32) -> u32 {
    let Some(side) = battle.get_side(attacker.0) else {
        return base;
    };
    match id {
        "lastrespects" => 50 + 50 * side.fainted_count as u32,
        "ragefist" => {
            let hits = side
                .active(attacker.1)
                .map_or(0, |a| a.pokemon.times_hit.min(6));
            50 + 50 * hits
        }
        "retaliate" => {
            let fainted_last_turn =
                battle.turn > 0 && side.last_faint_turn == Some(battle.turn - 1);
            if fainted_last_turn { base * 2 } else { base }
        }
        _ => base,
    }
}

/// Two-turn and recharge moves are worth less than their raw damage
fn apply_exceptions(
    battle: &TrackedBattle,
    defender: (Player, usize),
    data: &MoveData,
    used: &MoveModel,
    attacker: &CombatantModel,
    target: &CombatantModel,
    damage: OracleDamage,
) -> (u32, u32) {
    let OracleDamage { min, max, .. } = damage;
    if data.flags.charge && !skips_charge(battle, used, attacker) {
        if defender_can_protect(battle, defender) {
            return (0, 0);
        }
        return (min / 2, max / 2);
    }

    if data.flags.recharge && min < target.current_hp() {
        return (min / 2, max / 2);
    }

    (min, max)
}

fn skips_charge(battle: &TrackedBattle, used: &MoveModel, attacker: &CombatantModel) -> bool {
    if attacker.has_item("powerherb") {
        return true;
    }
    let weather = battle.field.weather;
    match used.id.as_str() {
        "solarbeam" | "solarblade" => weather.is_some_and(|w| w.is_sun()),
        "electroshot" => weather.is_some_and(|w| w.is_rain()),
        _ => false,
    }
}

/// The defender has shown a protecting move
fn defender_can_protect(battle: &TrackedBattle, (player, slot): (Player, usize)) -> bool {
    battle
        .get_side(player)
        .and_then(|side| side.active(slot))
        .is_some_and(|active| {
            active
                .effective_moves()
                .iter()
                .any(|m| m.revealed && PROTECT_MOVES.contains(&m.id.as_str()))
        })
}
