//! Synthetic combatant and field models built from partial knowledge

use zoroark_battle::dex::{DexExt, MoveCategory, MoveData, MoveFlags, estimate_stats, to_id};
use zoroark_battle::{
    ActiveState, FieldEffect, SideCondition, SideState, StatKnowledge, StatRange, StatStages,
    Status, Terrain, TrackedBattle, Type, Volatile, Weather,
};
use zoroark_protocol::{GameType, MoveTarget, Player};

use crate::config::StatMode;

/// Abilities that ignore the target's breakable abilities
const MOLD_BREAKERS: [&str; 3] = ["moldbreaker", "teravolt", "turboblaze"];

/// Abilities that stay in effect through Mold Breaker
const UNBREAKABLE: [&str; 8] = [
    "shadowshield",
    "prismarmor",
    "fullmetalbody",
    "comatose",
    "multitype",
    "rkssystem",
    "asoneglastrier",
    "asonespectrier",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelStats {
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spa: u32,
    pub spd: u32,
    pub spe: u32,
}

impl ModelStats {
    fn pick(knowledge: &StatKnowledge, mode: StatMode) -> Self {
        let choose = |range: StatRange| match (range.known, mode) {
            (true, _) | (false, StatMode::Mid) => range.mid(),
            (false, StatMode::Min) => range.min,
            (false, StatMode::Max) => range.max,
        };
        Self {
            hp: choose(knowledge.hp),
            atk: choose(knowledge.atk),
            def: choose(knowledge.def),
            spa: choose(knowledge.spa),
            spd: choose(knowledge.spd),
            spe: choose(knowledge.spe),
        }
    }
}

/// A combatant as the damage oracle sees it
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantModel {
    pub species: String,
    pub level: u8,
    /// Current types
    pub types: Vec<Type>,
    /// Types that grant STAB
    pub stab_types: Vec<Type>,
    /// Types before Terastallization
    pub base_types: Vec<Type>,
    pub terastallized: bool,
    pub stats: ModelStats,
    pub boosts: StatStages,
    /// Ability in effect, if any
    pub ability: Option<String>,
    /// Held item in effect, if any
    pub item: Option<String>,
    pub status: Option<Status>,
    pub hp_percent: u32,
    pub grounded: bool,
    /// Known and likely move ids
    pub moves: Vec<String>,
}

impl CombatantModel {
    pub fn has_ability(&self, id: &str) -> bool {
        self.ability.as_deref() == Some(id)
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.item.as_deref() == Some(id)
    }

    pub fn breaks_abilities(&self) -> bool {
        self.ability
            .as_deref()
            .is_some_and(|a| MOLD_BREAKERS.contains(&a))
    }

    /// Current HP in raw points
    pub fn current_hp(&self) -> u32 {
        self.stats.hp * self.hp_percent / 100
    }
}

/// Whether an ability is switched off by Mold Breaker
pub fn is_breakable(ability: &str) -> bool {
    !UNBREAKABLE.contains(&ability)
}

/// Build the model of the combatant in a slot
pub fn model_of(
    battle: &TrackedBattle,
    me: Option<Player>,
    player: Player,
    slot: usize,
    mode: StatMode,
) -> Option<CombatantModel> {
    let side = battle.get_side(player)?;
    let active = side.active(slot)?;
    let ours = me == Some(player);
    let dex = battle.dex();
    let generation = battle.generation;

    // Who we believe is really there, and where their knowledge lives
    let disguise = active.disguise().filter(|_| !ours);
    let source = disguise
        .and_then(|guess| guess.roster_index)
        .and_then(|index| side.pokemon.get(index))
        .unwrap_or(&active.pokemon);

    let (species, types, knowledge) = match (active.transform(), disguise) {
        (Some(snapshot), _) => {
            let mut knowledge = snapshot.stats.clone();
            knowledge.hp = source.stats.hp;
            (snapshot.species.clone(), active.types(), knowledge)
        }
        (None, Some(guess)) => {
            let data = dex.species_or_default(generation, &guess.species);
            (guess.species.clone(), data.types.clone(), source.stats.clone())
        }
        (None, None) => (
            active.pokemon.species().to_string(),
            active.types(),
            active.pokemon.stats.clone(),
        ),
    };

    let level = source.identity.level;
    let knowledge = if knowledge.atk.is_empty() || knowledge.hp.is_empty() {
        let base = dex.species_or_default(generation, &species).base_stats;
        let estimate = estimate_stats(&base, level);
        StatKnowledge {
            hp: if knowledge.hp.is_empty() { estimate.hp } else { knowledge.hp },
            ..if knowledge.atk.is_empty() { estimate } else { knowledge }
        }
    } else {
        knowledge
    };

    let common = dex.common_set_or_default(generation, &species);

    let item = match (source.item.value(), source.item.known) {
        (Some(item), _) => Some(item.to_string()),
        (None, true) => None,
        (None, false) if !ours => common.item.as_deref().map(to_id),
        (None, false) => None,
    };
    let item = item.filter(|_| !battle.field.has_effect(FieldEffect::MagicRoom));

    let ability = active
        .transform()
        .and_then(|snapshot| snapshot.ability.clone())
        .or_else(|| source.ability.value().map(str::to_string))
        .or_else(|| {
            if ours || source.ability.known {
                return None;
            }
            common.ability.as_deref().map(to_id).or_else(|| {
                let data = dex.species_or_default(generation, &species);
                match data.abilities.as_slice() {
                    [only] => Some(to_id(only)),
                    _ => None,
                }
            })
        });
    let ability = ability.filter(|_| ability_in_effect(battle, active, item.as_deref()));

    let mut moves: Vec<String> = active.effective_moves().iter().map(|m| m.id.clone()).collect();
    if !ours {
        for id in common.moves.iter().map(|m| to_id(m)) {
            if moves.len() >= 4 {
                break;
            }
            if !moves.contains(&id) {
                moves.push(id);
            }
        }
    }

    let base_types = if source.base_types.is_empty() {
        dex.species_or_default(generation, &species).types.clone()
    } else {
        source.base_types.clone()
    };
    let mut stab_types = types.clone();
    if active.pokemon.terastallized {
        for t in &base_types {
            if !stab_types.contains(t) {
                stab_types.push(*t);
            }
        }
    }

    let grounded = battle.field.has_effect(FieldEffect::Gravity)
        || active.has_volatile(&Volatile::SmackDown)
        || active.has_volatile(&Volatile::Ingrain)
        || !(types.contains(&Type::Flying)
            || ability.as_deref() == Some("levitate")
            || item.as_deref() == Some("airballoon")
            || active.has_volatile(&Volatile::MagnetRise)
            || active.has_volatile(&Volatile::Telekinesis));

    Some(CombatantModel {
        species,
        level,
        types,
        stab_types,
        base_types,
        terastallized: active.pokemon.terastallized,
        stats: ModelStats::pick(&knowledge, mode),
        boosts: active.boosts,
        ability,
        item,
        status: active.pokemon.status,
        hp_percent: active.pokemon.hp_percent(),
        grounded,
        moves,
    })
}

/// Abilities work from generation 3 on, unless suppressed by Gastro Acid or
/// a field-wide Neutralizing Gas the holder is not shielded from
fn ability_in_effect(battle: &TrackedBattle, active: &ActiveState, item: Option<&str>) -> bool {
    battle.generation >= 3
        && !active.ability_suppressed()
        && (!battle.field.neutralizing_gas || item == Some("abilityshield"))
}

/// A move as the damage oracle sees it
#[derive(Debug, Clone, PartialEq)]
pub struct MoveModel {
    pub id: String,
    pub move_type: Type,
    pub category: MoveCategory,
    pub base_power: u32,
    pub priority: i8,
    pub target: MoveTarget,
    pub flags: MoveFlags,
}

impl MoveModel {
    pub fn from_data(id: &str, data: &MoveData) -> Self {
        Self {
            id: to_id(id),
            move_type: data.move_type,
            category: data.category,
            base_power: data.base_power,
            priority: data.priority,
            target: data.target,
            flags: data.flags,
        }
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.base_power > 0
    }
}

/// Per-side parts of the field description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideModel {
    pub reflect: bool,
    pub light_screen: bool,
    pub aurora_veil: bool,
    pub tailwind: bool,
    pub helping_hand: bool,
}

impl SideModel {
    fn of(side: Option<&SideState>, active: Option<&ActiveState>) -> Self {
        let has = |cond| side.is_some_and(|s| s.has_condition(cond));
        Self {
            reflect: has(SideCondition::Reflect),
            light_screen: has(SideCondition::LightScreen),
            aurora_veil: has(SideCondition::AuroraVeil),
            tailwind: has(SideCondition::Tailwind),
            helping_hand: active.is_some_and(|a| a.turn_status.contains(&Volatile::HelpingHand)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldModel {
    pub generation: u8,
    pub game_type: GameType,
    pub weather: Option<Weather>,
    pub terrain: Option<Terrain>,
    pub trick_room: bool,
    pub magic_room: bool,
    pub wonder_room: bool,
    pub gravity: bool,
    pub attacker_side: SideModel,
    pub defender_side: SideModel,
}

impl FieldModel {
    pub fn of(
        battle: &TrackedBattle,
        attacker: (Player, usize),
        defender: (Player, usize),
    ) -> Self {
        let field = &battle.field;
        let side_of = |(player, slot): (Player, usize)| {
            let side = battle.get_side(player);
            SideModel::of(side, side.and_then(|s| s.active(slot)))
        };
        Self {
            generation: battle.generation,
            game_type: battle.game_type.unwrap_or(GameType::Singles),
            weather: field.weather,
            terrain: field.terrain,
            trick_room: field.has_effect(FieldEffect::TrickRoom),
            magic_room: field.has_effect(FieldEffect::MagicRoom),
            wonder_room: field.has_effect(FieldEffect::WonderRoom),
            gravity: field.has_effect(FieldEffect::Gravity),
            attacker_side: side_of(attacker),
            defender_side: side_of(defender),
        }
    }
}
