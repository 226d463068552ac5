//! Hit chance estimates

use zoroark_battle::dex::{DexExt, MoveCategory, to_id};
use zoroark_battle::{StatStages, Type, Volatile, Weather};
use zoroark_protocol::Player;

use super::models::model_of;
use crate::context::DecisionContext;

/// Abilities that let the user ignore the target's evasion
const IGNORE_EVASION: [&str; 3] = ["keeneye", "mindseye", "unaware"];

/// Whether the weather makes this move always hit
pub fn weather_guarantees_hit(weather: Option<Weather>, move_id: &str) -> bool {
    let Some(weather) = weather else {
        return false;
    };
    match move_id {
        "thunder" | "hurricane" | "bleakwindstorm" | "wildboltstorm" | "sandsearstorm" => {
            weather.is_rain()
        }
        "blizzard" => matches!(weather, Weather::Hail | Weather::Snow),
        _ => false,
    }
}

/// Chance in `[0, 1]` that `move_id` hits.
///
/// Base accuracy, scaled by item and ability bonuses, the attacker's
/// accuracy stage and the inverse of the defender's evasion stage.
pub async fn estimate_accuracy(
    ctx: &DecisionContext<'_>,
    attacker: (Player, usize),
    defender: (Player, usize),
    move_id: &str,
) -> f64 {
    let battle = ctx.battle;
    let id = to_id(move_id);
    let data = ctx.dex().move_or_default(battle.generation, &id);

    let Some(base) = data.accuracy else {
        return 1.0;
    };

    let mode = ctx.config.stat_mode;
    let me = ctx.me();
    let (Some(a), Some(d)) = (
        model_of(battle, me, attacker.0, attacker.1, mode),
        model_of(battle, me, defender.0, defender.1, mode),
    ) else {
        return base as f64 / 100.0;
    };

    if a.has_ability("noguard") || d.has_ability("noguard") {
        return 1.0;
    }
    if weather_guarantees_hit(battle.field.weather, &id) {
        return 1.0;
    }
    if id == "toxic" && a.types.contains(&Type::Poison) {
        return 1.0;
    }

    if data.flags.ohko {
        if a.level < d.level {
            return 0.0;
        }
        let chance = base as f64 + (a.level - d.level) as f64;
        return (chance / 100.0).clamp(0.0, 1.0);
    }

    let accuracy_stage = if d.has_ability("unaware") {
        0
    } else {
        a.boosts.accuracy
    };
    let ignores_evasion = data.flags.ignore_evasion
        || a.ability.as_deref().is_some_and(|x| IGNORE_EVASION.contains(&x));
    let evasion_stage = if ignores_evasion { 0 } else { d.boosts.evasion };

    let mut chance = base as f64 / 100.0;
    chance *= StatStages::accuracy_multiplier(accuracy_stage);
    chance *= StatStages::accuracy_multiplier(evasion_stage.saturating_neg());

    match a.ability.as_deref() {
        Some("compoundeyes") => chance *= 1.3,
        Some("victorystar") => chance *= 1.1,
        Some("hustle") if data.category == MoveCategory::Physical => chance *= 0.8,
        _ => {}
    }
    match a.item.as_deref() {
        Some("widelens") => chance *= 1.1,
        Some("zoomlens") => chance *= 1.2,
        _ => {}
    }
    if matches!(d.item.as_deref(), Some("brightpowder" | "laxincense")) {
        chance *= 0.9;
    }
    match (d.ability.as_deref(), battle.field.weather) {
        (Some("sandveil"), Some(Weather::Sand)) => chance *= 0.8,
        (Some("snowcloak"), Some(Weather::Hail | Weather::Snow)) => chance *= 0.8,
        (Some("tangledfeet"), _) => {
            let confused = ctx
                .active(defender.0, defender.1)
                .is_some_and(|active| active.has_volatile(&Volatile::Confusion));
            if confused {
                chance *= 0.5;
            }
        }
        _ => {}
    }

    chance.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_guarantees_hit() {
        assert!(weather_guarantees_hit(Some(Weather::Rain), "thunder"));
        assert!(weather_guarantees_hit(Some(Weather::HeavyRain), "hurricane"));
        assert!(weather_guarantees_hit(Some(Weather::Snow), "blizzard"));
        assert!(!weather_guarantees_hit(Some(Weather::Sun), "thunder"));
        assert!(!weather_guarantees_hit(None, "blizzard"));
    }
}
