//! Whether a non-damaging move is worth using right now.
//!
//! [`ViabilityRegistry`] maps move ids to a [`Rule`]. The table is built
//! once and injected into the decision context; strategies only ask it
//! about status moves, damage is scored by the evaluator instead.

mod rules;

pub use rules::Rule;

use std::collections::HashMap;

use tracing::trace;
use zoroark_battle::dex::{DexExt, MoveData, to_id};
use zoroark_battle::query::{blocks_powder, blocks_status};
use zoroark_battle::{
    ActiveState, FieldEffect, SideCondition, SideState, Status, Terrain, Type, Volatile, Weather,
};
use zoroark_protocol::{Player, Stat};

use crate::context::DecisionContext;
use crate::eval::{CombatantModel, PROTECT_MOVES, model_of};

/// Abilities that cannot be replaced or suppressed by another move
const PERMANENT_ABILITIES: [&str; 19] = [
    "asoneglastrier",
    "asonespectrier",
    "battlebond",
    "comatose",
    "commander",
    "disguise",
    "gulpmissile",
    "iceface",
    "multitype",
    "poisonpuppeteer",
    "powerconstruct",
    "rkssystem",
    "schooling",
    "shieldsdown",
    "stancechange",
    "terashift",
    "teraformzero",
    "zenmode",
    "zerotohero",
];

const ITEMS_BOUND_TO_SPECIES: [&str; 12] = [
    "adamantcrystal",
    "blueorb",
    "boosterenergy",
    "cornerstonemask",
    "griseouscore",
    "griseousorb",
    "hearthflamemask",
    "lustrousglobe",
    "redorb",
    "rustedshield",
    "rustedsword",
    "wellspringmask",
];

pub struct ViabilityRegistry {
    rules: HashMap<&'static str, Rule>,
}

impl Default for ViabilityRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ViabilityRegistry {
    /// Registry with the built-in rules
    pub fn standard() -> Self {
        Self {
            rules: rules::standard_rules(),
        }
    }

    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace the rule for a move id
    pub fn insert(&mut self, move_id: &'static str, rule: Rule) -> Option<Rule> {
        self.rules.insert(move_id, rule)
    }

    pub fn rule(&self, move_id: &str) -> Option<&Rule> {
        self.rules.get(to_id(move_id).as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `move_id` used by `user` on `target` would do something useful.
    ///
    /// `can_pivot` says whether a switch target worth passing to exists.
    /// Moves without a rule are only viable when they target nothing and
    /// would change the field.
    pub fn is_viable(
        &self,
        ctx: &DecisionContext<'_>,
        user: (Player, usize),
        target: Option<(Player, usize)>,
        move_id: &str,
        can_pivot: bool,
    ) -> bool {
        let battle = ctx.battle;
        let id = to_id(move_id);
        let data = ctx.dex().move_or_default(battle.generation, &id);

        let Some(rule) = self.rules.get(id.as_str()) else {
            return data.target.targets_nothing() && changes_field(ctx, user.0, data);
        };

        let Some(source) = Subject::of(ctx, user) else {
            return false;
        };
        let viable = match rule {
            Rule::Boost(stats) => can_boost(&source, stats),
            Rule::Heal => source.model.hp_percent < ctx.config.heal_threshold,
            Rule::Rest => {
                let model = &source.model;
                model.status != Some(Status::Sleep)
                    && (model.hp_percent < ctx.config.heal_threshold || model.status.is_some())
                    && !sleep_prevented(ctx, &source)
            }
            Rule::Cleanse { team: false } => source.model.status.is_some(),
            Rule::Cleanse { team: true } => source
                .side
                .pokemon
                .iter()
                .any(|p| !p.fainted && p.status.is_some()),
            Rule::SideCondition(condition) => {
                !source.side.has_condition(*condition)
                    && (*condition != SideCondition::AuroraVeil
                        || matches!(battle.field.weather, Some(Weather::Hail | Weather::Snow)))
            }
            Rule::Substitute => {
                !source.has_volatile(Volatile::Substitute) && source.model.hp_percent > 25
            }
            Rule::Hazard(hazard) => lays_hazard(ctx, user.0, *hazard),
            Rule::ClearHazards => source.side.has_hazards(),
            Rule::Protect => !protected_last_turn(source.active),
            Rule::Counter(category) => ctx.foes().into_iter().any(|(player, slot)| {
                ctx.active(player, slot).is_some_and(|foe| {
                    foe.effective_moves().iter().any(|m| {
                        let known = ctx.dex().move_or_default(battle.generation, &m.id);
                        m.revealed
                            && m.is_usable()
                            && known.is_damaging()
                            && category.is_none_or(|c| known.category == c)
                    })
                })
            }),
            Rule::Pivot => can_pivot,
            Rule::Never => false,
            targeted => match target.and_then(|t| Subject::of(ctx, t)) {
                Some(foe) => {
                    !bounced(data, &foe) && on_target(ctx, &source, &foe, &id, data, targeted)
                }
                None => false,
            },
        };

        trace!(move_id = %id, ?rule, viable, "viability");
        viable
    }
}

/// A combatant as seen by a rule
struct Subject<'a> {
    model: CombatantModel,
    active: &'a ActiveState,
    side: &'a SideState,
}

impl<'a> Subject<'a> {
    fn of(ctx: &DecisionContext<'a>, (player, slot): (Player, usize)) -> Option<Self> {
        let side = ctx.battle.get_side(player)?;
        let active = side.active(slot)?;
        if active.pokemon.fainted {
            return None;
        }
        let model = model_of(ctx.battle, ctx.me(), player, slot, ctx.config.stat_mode)?;
        Some(Self {
            model,
            active,
            side,
        })
    }

    fn has_volatile(&self, volatile: Volatile) -> bool {
        self.active.has_volatile(&volatile)
    }

    fn has_any_ability(&self, abilities: &[&str]) -> bool {
        self.model
            .ability
            .as_deref()
            .is_some_and(|a| abilities.contains(&a))
    }
}

fn can_boost(user: &Subject<'_>, stats: &[(Stat, i8)]) -> bool {
    let contrary = user.model.has_ability("contrary");
    stats.iter().any(|&(stat, amount)| {
        let amount = if contrary { -amount } else { amount };
        amount > 0 && user.active.boosts.get(stat) < 6
    })
}

fn protected_last_turn(active: &ActiveState) -> bool {
    active.repeat_count > 0
        && active
            .last_move
            .as_deref()
            .is_some_and(|m| m == "endure" || PROTECT_MOVES.contains(&m))
}

/// Magic Bounce and Good as Gold turn status moves away
fn bounced(data: &MoveData, target: &Subject<'_>) -> bool {
    (data.flags.reflectable && target.model.has_ability("magicbounce"))
        || target.model.has_ability("goodasgold")
}

fn on_target(
    ctx: &DecisionContext<'_>,
    user: &Subject<'_>,
    target: &Subject<'_>,
    id: &str,
    data: &MoveData,
    rule: &Rule,
) -> bool {
    let substitute = target.has_volatile(Volatile::Substitute) && !data.flags.sound;
    match rule {
        Rule::InflictStatus(status) => {
            !substitute && can_inflict(ctx, user, target, *status, id, data)
        }
        Rule::Debuff(stats) => !substitute && can_debuff(target, stats),
        Rule::Volatile(volatile) => {
            let blocked_by_substitute = substitute
                && !matches!(volatile, Volatile::Taunt | Volatile::Encore | Volatile::Disable);
            !blocked_by_substitute
                && !target.has_volatile(volatile.clone())
                && volatile_applies(ctx, target, volatile)
        }
        Rule::ChangeAbility => {
            !substitute
                && !target.has_any_ability(&PERMANENT_ABILITIES)
                && !target.model.has_item("abilityshield")
                && !(id == "gastroacid" && target.has_volatile(Volatile::GastroAcid))
        }
        Rule::ChangeItem => {
            let theirs = target.model.item.as_deref();
            let ours = user.model.item.as_deref();
            match id {
                "embargo" | "corrosivegas" => theirs.is_some_and(|item| !is_protected_item(item)),
                "bestow" => ours.is_some_and(|item| !is_protected_item(item)) && theirs.is_none(),
                _ => {
                    (ours.is_some() || theirs.is_some())
                        && !ours.is_some_and(is_protected_item)
                        && !theirs.is_some_and(is_protected_item)
                        && !target.model.has_ability("stickyhold")
                        && !substitute
                }
            }
        }
        _ => false,
    }
}

fn can_inflict(
    ctx: &DecisionContext<'_>,
    user: &Subject<'_>,
    target: &Subject<'_>,
    status: Status,
    id: &str,
    data: &MoveData,
) -> bool {
    let battle = ctx.battle;
    let model = &target.model;
    if model.status.is_some() {
        return false;
    }

    let corrosion = user.model.has_ability("corrosion") && status.is_poison();
    if blocks_status(status, &model.types) && !corrosion {
        return false;
    }
    if id == "thunderwave" && model.types.contains(&Type::Ground) {
        return false;
    }
    if data.flags.powder
        && (blocks_powder(&model.types, battle.generation)
            || model.has_ability("overcoat")
            || model.has_item("safetygoggles"))
    {
        return false;
    }
    if battle.generation >= 7
        && user.model.has_ability("prankster")
        && model.types.contains(&Type::Dark)
    {
        return false;
    }

    let immune_abilities: &[&str] = match status {
        Status::Sleep => &["insomnia", "vitalspirit", "sweetveil"],
        Status::Paralysis => &["limber"],
        Status::Burn => &["waterveil", "waterbubble", "thermalexchange"],
        Status::Poison | Status::BadPoison => &["immunity", "pastelveil"],
        Status::Freeze => &["magmaarmor"],
    };
    if target.has_any_ability(immune_abilities)
        || target.has_any_ability(&["comatose", "purifyingsalt"])
        || (model.has_ability("leafguard") && battle.field.weather.is_some_and(|w| w.is_sun()))
    {
        return false;
    }

    if target.side.has_condition(SideCondition::Safeguard)
        && !user.model.has_ability("infiltrator")
    {
        return false;
    }
    if model.grounded {
        match battle.field.terrain {
            Some(Terrain::Misty) => return false,
            Some(Terrain::Electric) if status == Status::Sleep => return false,
            _ => {}
        }
    }

    // One sleeper per side
    if status == Status::Sleep
        && target
            .side
            .pokemon
            .iter()
            .any(|p| !p.fainted && p.status == Some(Status::Sleep))
    {
        return false;
    }

    true
}

fn can_debuff(target: &Subject<'_>, stats: &[(Stat, i8)]) -> bool {
    if target.side.has_condition(SideCondition::Mist)
        || target.has_any_ability(&[
            "clearbody",
            "whitesmoke",
            "fullmetalbody",
            "contrary",
            "defiant",
            "competitive",
            "mirrorarmor",
        ])
        || target.model.has_item("clearamulet")
    {
        return false;
    }
    let keen_eye = target.has_any_ability(&["keeneye", "mindseye", "illuminate"]);
    let hyper_cutter = target.model.has_ability("hypercutter");
    let big_pecks = target.model.has_ability("bigpecks");
    stats.iter().any(|&(stat, amount)| {
        let ignored = match stat {
            Stat::Accuracy => keen_eye,
            Stat::Atk => hyper_cutter,
            Stat::Def => big_pecks,
            _ => false,
        };
        amount < 0 && !ignored && target.active.boosts.get(stat) > -6
    })
}

fn volatile_applies(ctx: &DecisionContext<'_>, target: &Subject<'_>, volatile: &Volatile) -> bool {
    let model = &target.model;
    match volatile {
        Volatile::Taunt => !target.has_any_ability(&["oblivious", "aromaveil"]),
        Volatile::Encore | Volatile::Disable => {
            !target.model.has_ability("aromaveil") && target.active.last_move.is_some()
        }
        Volatile::LeechSeed => !model.types.contains(&Type::Grass),
        Volatile::Confusion => {
            !model.has_ability("owntempo")
                && !(model.grounded && ctx.battle.field.terrain == Some(Terrain::Misty))
        }
        Volatile::Infatuation => !target.has_any_ability(&["oblivious", "aromaveil"]),
        Volatile::Yawn => {
            model.status.is_none()
                && !target.has_any_ability(&["insomnia", "vitalspirit", "comatose", "sweetveil"])
                && !target.side.has_condition(SideCondition::Safeguard)
        }
        Volatile::Trapped => !model.types.contains(&Type::Ghost),
        _ => true,
    }
}

fn sleep_prevented(ctx: &DecisionContext<'_>, user: &Subject<'_>) -> bool {
    user.has_any_ability(&["insomnia", "vitalspirit", "comatose", "purifyingsalt"])
        || (user.model.grounded
            && matches!(
                ctx.battle.field.terrain,
                Some(Terrain::Electric | Terrain::Misty)
            ))
}

/// Whether a hazard can still be stacked on some foe side that has
/// switch-ins left to punish
fn lays_hazard(ctx: &DecisionContext<'_>, me: Player, hazard: SideCondition) -> bool {
    let battle = ctx.battle;
    let bouncer = ctx.foes().into_iter().any(|(player, slot)| {
        model_of(battle, ctx.me(), player, slot, ctx.config.stat_mode)
            .is_some_and(|m| m.has_ability("magicbounce"))
    });
    if bouncer {
        return false;
    }

    battle.foes_of(me).any(|side| {
        let team_size = if side.team_size == 0 { 6 } else { side.team_size };
        let on_field = side.actives().filter(|(_, a)| !a.pokemon.fainted).count();
        let remaining = team_size.saturating_sub(side.fainted_count + on_field);
        remaining > 0 && side.condition_layers(hazard) < hazard.max_layers()
    })
}

/// Side-effect path for moves without a rule that target nothing
fn changes_field(ctx: &DecisionContext<'_>, me: Player, data: &MoveData) -> bool {
    let field = &ctx.battle.field;
    if let Some(weather) = data.weather.as_deref().and_then(Weather::from_protocol) {
        return field.weather != Some(weather) && !field.weather.is_some_and(|w| w.is_primal());
    }
    if let Some(terrain) = data.terrain.as_deref().and_then(Terrain::from_protocol) {
        return field.terrain != Some(terrain);
    }
    if let Some(effect) = data.pseudo_weather.as_deref().and_then(FieldEffect::from_protocol) {
        return !field.has_effect(effect);
    }
    if let Some(condition) = data
        .side_condition
        .as_deref()
        .and_then(SideCondition::from_protocol)
    {
        if condition.is_hazard() {
            return lays_hazard(ctx, me, condition);
        }
        return ctx
            .battle
            .get_side(me)
            .is_some_and(|side| !side.has_condition(condition));
    }
    false
}

fn is_protected_item(item: &str) -> bool {
    ITEMS_BOUND_TO_SPECIES.contains(&item)
        || item.ends_with("iumz")
        || item.ends_with("memory")
        || item.ends_with("drive")
        || (item.ends_with("plate") && item != "protectivepads")
        || (item.ends_with("ite") && item != "eviolite")
        || item.ends_with("itex")
        || item.ends_with("itey")
}
