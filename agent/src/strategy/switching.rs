//! Switch-in scoring against the foes on the field

use zoroark_battle::dex::{DexExt, to_id};
use zoroark_battle::query::best_effectiveness;
use zoroark_battle::{SideCondition, SideState, Type, find_entry};
use zoroark_protocol::Player;

use crate::context::DecisionContext;
use crate::eval::model_of;

/// Types a combatant is and hits with
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub types: Vec<Type>,
    /// Types of its damaging moves; its own types when none are known
    pub attack_types: Vec<Type>,
}

impl Profile {
    pub fn new(types: Vec<Type>, attack_types: Vec<Type>) -> Self {
        let attack_types = if attack_types.is_empty() {
            types.clone()
        } else {
            attack_types
        };
        Self {
            types,
            attack_types,
        }
    }
}

/// Percent of max HP lost to our side's hazards on the way in
pub fn hazard_damage(
    side: &SideState,
    types: &[Type],
    ability: Option<&str>,
    item: Option<&str>,
) -> u32 {
    if item == Some("heavydutyboots") || ability == Some("magicguard") {
        return 0;
    }

    let mut damage = 0.0f32;
    if side.has_condition(SideCondition::StealthRock) {
        damage += 12.5 * Type::Rock.effectiveness_multi(types);
    }
    let grounded = !types.contains(&Type::Flying)
        && ability != Some("levitate")
        && item != Some("airballoon");
    if grounded {
        damage += match side.condition_layers(SideCondition::Spikes) {
            0 => 0.0,
            1 => 12.5,
            2 => 100.0 / 6.0,
            _ => 25.0,
        };
    }
    damage as u32
}

/// How `ours` fares against every foe on the field, averaged.
///
/// Positive when our attacks hit harder than theirs do.
pub fn matchup(ctx: &DecisionContext<'_>, ours: &Profile) -> f32 {
    matchup_against(ours, &foe_profiles(ctx))
}

/// [`matchup`] against an explicit list of foes
pub fn matchup_against(ours: &Profile, foes: &[Profile]) -> f32 {
    if foes.is_empty() {
        return 0.0;
    }
    let total: f32 = foes
        .iter()
        .map(|foe| {
            best_effectiveness(&ours.attack_types, &foe.types)
                - best_effectiveness(&foe.attack_types, &ours.types)
        })
        .sum();
    total / foes.len() as f32
}

fn foe_profiles(ctx: &DecisionContext<'_>) -> Vec<Profile> {
    let dex = ctx.dex();
    ctx.foes()
        .into_iter()
        .filter_map(|(player, slot)| ctx.active(player, slot))
        .map(|active| {
            let attacks = active
                .effective_moves()
                .iter()
                .filter(|m| m.revealed)
                .map(|m| dex.move_or_default(ctx.generation(), &m.id))
                .filter(|data| data.is_damaging())
                .map(|data| data.move_type)
                .collect();
            Profile::new(active.types(), attacks)
        })
        .collect()
}

/// A member of our request roster, with HP and what it holds
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub position: usize,
    pub profile: Profile,
    pub hp_percent: u32,
    pub ability: Option<String>,
    pub item: Option<String>,
}

/// Look up a request roster position
pub fn candidate(ctx: &DecisionContext<'_>, me: Player, position: usize) -> Option<Candidate> {
    let request = ctx.request()?;
    let member = request.side.as_ref()?.pokemon.get(position)?;
    let dex = ctx.dex();
    let generation = ctx.generation();

    let tracked = ctx
        .battle
        .get_side(me)
        .and_then(|side| side.pokemon.get(find_entry(side, member, &[])?));
    let types = match tracked {
        Some(entry) if entry.terastallized && entry.tera_type.is_some() => {
            entry.tera_type.into_iter().collect()
        }
        Some(entry) if !entry.base_types.is_empty() => entry.base_types.clone(),
        _ => dex.species_or_default(generation, member.species()).types.clone(),
    };
    let attacks = member
        .moves
        .iter()
        .map(|id| dex.move_or_default(generation, id))
        .filter(|data| data.is_damaging())
        .map(|data| data.move_type)
        .collect();

    let known = |value: &str| Some(to_id(value)).filter(|id| !id.is_empty());
    Some(Candidate {
        position,
        profile: Profile::new(types, attacks),
        hp_percent: member.hp_percent(),
        ability: known(member.ability.as_str()).or_else(|| known(member.base_ability.as_str())),
        item: known(member.item.as_str()),
    })
}

/// Score of a bench member coming in now: matchup plus the HP it keeps
/// after hazards. `None` when the hazards would knock it out.
pub fn switch_score(ctx: &DecisionContext<'_>, me: Player, position: usize) -> Option<f32> {
    let candidate = candidate(ctx, me, position)?;
    let side = ctx.battle.get_side(me)?;
    let lost = hazard_damage(
        side,
        &candidate.profile.types,
        candidate.ability.as_deref(),
        candidate.item.as_deref(),
    );
    if lost >= candidate.hp_percent {
        return None;
    }
    let remaining = (candidate.hp_percent - lost) as f32 / 100.0;
    Some(matchup(ctx, &candidate.profile) + remaining)
}

/// Score of the combatant in `slot` staying in, on the same scale as
/// [`switch_score`]
pub fn stay_score(ctx: &DecisionContext<'_>, me: Player, slot: usize) -> f32 {
    let Some(model) = model_of(ctx.battle, Some(me), me, slot, ctx.config.stat_mode) else {
        return f32::MIN;
    };
    let dex = ctx.dex();
    let attacks = model
        .moves
        .iter()
        .map(|id| dex.move_or_default(ctx.generation(), id))
        .filter(|data| data.is_damaging())
        .map(|data| data.move_type)
        .collect();
    let profile = Profile::new(model.types.clone(), attacks);
    matchup(ctx, &profile) + model.hp_percent as f32 / 100.0
}

/// Highest scoring switch among `options`, skipping members hazards would
/// knock out
pub fn best_switch(
    ctx: &DecisionContext<'_>,
    me: Player,
    options: &[usize],
) -> Option<(usize, f32)> {
    options
        .iter()
        .filter_map(|&position| Some((position, switch_score(ctx, me, position)?)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// The active holds a one-hit shield it would give up by leaving
pub fn forced_to_stay(ctx: &DecisionContext<'_>, me: Player, slot: usize) -> bool {
    model_of(ctx.battle, Some(me), me, slot, ctx.config.stat_mode).is_some_and(|model| {
        model.hp_percent == 100 && (model.has_item("focussash") || model.has_ability("sturdy"))
    })
}

/// Somebody other than the leads came in last turn or this turn
pub fn recently_switched(ctx: &DecisionContext<'_>) -> bool {
    let turn = ctx.battle.turn;
    ctx.battle
        .all_active()
        .any(|(_, _, active)| active.switched_in_turn > 0 && active.switched_in_turn + 1 >= turn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_with(conditions: &[(SideCondition, u8)]) -> SideState {
        let mut side = SideState::new(Player::P1, "me");
        for &(condition, layers) in conditions {
            for _ in 0..layers {
                side.add_condition(condition, 1);
            }
        }
        side
    }

    #[test]
    fn test_stealth_rock_scales_with_weakness() {
        let side = side_with(&[(SideCondition::StealthRock, 1)]);
        assert_eq!(hazard_damage(&side, &[Type::Normal], None, None), 12);
        assert_eq!(hazard_damage(&side, &[Type::Fire, Type::Flying], None, None), 50);
        assert_eq!(hazard_damage(&side, &[Type::Steel], None, None), 6);
        let boots = hazard_damage(&side, &[Type::Fire, Type::Flying], None, Some("heavydutyboots"));
        assert_eq!(boots, 0);
    }

    #[test]
    fn test_spikes_only_hit_grounded() {
        let side = side_with(&[(SideCondition::Spikes, 3)]);
        assert_eq!(hazard_damage(&side, &[Type::Water], None, None), 25);
        assert_eq!(hazard_damage(&side, &[Type::Flying], None, None), 0);
        assert_eq!(hazard_damage(&side, &[Type::Ghost], Some("levitate"), None), 0);

        let two = side_with(&[(SideCondition::Spikes, 2)]);
        assert_eq!(hazard_damage(&two, &[Type::Water], None, None), 16);
    }

    #[test]
    fn test_profile_falls_back_to_own_types() {
        let profile = Profile::new(vec![Type::Fire], Vec::new());
        assert_eq!(profile.attack_types, vec![Type::Fire]);
    }

    #[test]
    fn test_matchup_against() {
        let water = Profile::new(vec![Type::Water], Vec::new());
        let fire = Profile::new(vec![Type::Fire], Vec::new());
        assert_eq!(matchup_against(&water, &[fire.clone()]), 1.5);
        assert_eq!(matchup_against(&fire, &[water]), -1.5);
        assert_eq!(matchup_against(&fire, &[]), 0.0);
    }
}
