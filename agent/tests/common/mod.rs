#![allow(dead_code)]

use std::sync::Arc;

use zoroark_agent::{AgentConfig, DecisionContext, FormulaOracle, MemoryLog, ViabilityRegistry};
use zoroark_battle::dex::{BaseStats, MemoryDex, MoveCategory, MoveData, SpeciesData};
use zoroark_battle::{TrackedBattle, Type};
use zoroark_protocol::{
    Attribution, BattleEvent, BattleRequest, GameType, HpStatus, MajorEvent, MinorEvent,
    MoveTarget, Player, Pokemon, PokemonDetails, Stat,
};

fn species(name: &str, types: &[Type], base: [u32; 6]) -> SpeciesData {
    let [hp, atk, def, spa, spd, spe] = base;
    SpeciesData {
        name: name.to_string(),
        types: types.to_vec(),
        base_stats: BaseStats {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        },
        abilities: Vec::new(),
    }
}

fn attack(
    name: &str,
    move_type: Type,
    category: MoveCategory,
    base_power: u32,
    target: MoveTarget,
) -> MoveData {
    MoveData {
        name: name.to_string(),
        move_type,
        category,
        base_power,
        accuracy: Some(100),
        pp: 16,
        target,
        ..MoveData::unknown()
    }
}

fn status_move(name: &str, move_type: Type, target: MoveTarget, accuracy: Option<u32>) -> MoveData {
    MoveData {
        name: name.to_string(),
        move_type,
        category: MoveCategory::Status,
        accuracy,
        pp: 20,
        target,
        ..MoveData::unknown()
    }
}

pub fn test_dex() -> MemoryDex {
    let mut thunder_wave =
        status_move("Thunder Wave", Type::Electric, MoveTarget::Normal, Some(90));
    thunder_wave.flags.reflectable = true;

    MemoryDex::new()
        .with_species(species("Pikachu", &[Type::Electric], [35, 55, 40, 50, 50, 90]))
        .with_species(species(
            "Garchomp",
            &[Type::Dragon, Type::Ground],
            [108, 130, 95, 80, 85, 102],
        ))
        .with_species(species("Snorlax", &[Type::Normal], [160, 110, 65, 65, 110, 30]))
        .with_species(species("Eevee", &[Type::Normal], [55, 55, 50, 45, 65, 55]))
        .with_species(species(
            "Gengar",
            &[Type::Ghost, Type::Poison],
            [60, 65, 60, 130, 75, 110],
        ))
        .with_move(attack(
            "Tackle",
            Type::Normal,
            MoveCategory::Physical,
            40,
            MoveTarget::Normal,
        ))
        .with_move(attack(
            "Thunderbolt",
            Type::Electric,
            MoveCategory::Special,
            90,
            MoveTarget::Normal,
        ))
        .with_move(attack(
            "Earthquake",
            Type::Ground,
            MoveCategory::Physical,
            100,
            MoveTarget::AllAdjacent,
        ))
        .with_move(MoveData {
            priority: -5,
            ..attack(
                "Counter",
                Type::Fighting,
                MoveCategory::Physical,
                0,
                MoveTarget::Scripted,
            )
        })
        .with_move(status_move("Swords Dance", Type::Normal, MoveTarget::User, None))
        .with_move(thunder_wave)
}

pub fn poke(ident: &str) -> Pokemon {
    Pokemon::parse(ident).unwrap()
}

/// A started generation 9 battle seen from p1
pub fn battle(game_type: GameType) -> TrackedBattle {
    let mut battle = TrackedBattle::with_dex(Arc::new(test_dex()));
    battle.set_perspective(Player::P1);
    for event in [
        MajorEvent::Player {
            player: Player::P1,
            username: "me".to_string(),
        },
        MajorEvent::Player {
            player: Player::P2,
            username: "them".to_string(),
        },
        MajorEvent::GameType(game_type),
        MajorEvent::Gen(9),
        MajorEvent::TeamSize {
            player: Player::P1,
            size: 6,
        },
        MajorEvent::TeamSize {
            player: Player::P2,
            size: 6,
        },
        MajorEvent::Start,
    ] {
        battle.apply(&event.into());
    }
    battle
}

pub fn apply(battle: &mut TrackedBattle, event: impl Into<BattleEvent>) {
    battle.apply(&event.into());
}

pub fn switch_in(battle: &mut TrackedBattle, ident: &str, details: &str, hp: &str) {
    apply(
        battle,
        MajorEvent::Switch {
            pokemon: poke(ident),
            details: PokemonDetails::parse(details),
            hp_status: HpStatus::parse(hp),
        },
    );
}

pub fn boost(battle: &mut TrackedBattle, ident: &str, stat: Stat, amount: i8) {
    let pokemon = poke(ident);
    let event = if amount >= 0 {
        MinorEvent::Boost {
            pokemon,
            stat,
            amount,
            attribution: Attribution::none(),
        }
    } else {
        MinorEvent::Unboost {
            pokemon,
            stat,
            amount: -amount,
            attribution: Attribution::none(),
        }
    };
    apply(battle, event);
}

pub fn use_move(battle: &mut TrackedBattle, ident: &str, name: &str) {
    apply(
        battle,
        MajorEvent::Move {
            pokemon: poke(ident),
            move_name: name.to_string(),
            target: None,
            miss: false,
            still: false,
            attribution: Attribution::none(),
        },
    );
}

pub fn faint(battle: &mut TrackedBattle, ident: &str) {
    apply(battle, MajorEvent::Faint(poke(ident)));
}

pub fn preview(battle: &mut TrackedBattle, player: Player, details: &str) {
    apply(
        battle,
        MajorEvent::Poke {
            player,
            details: PokemonDetails::parse(details),
            has_item: true,
        },
    );
}

pub fn set_request(battle: &mut TrackedBattle, json: &str) {
    battle.request = Some(BattleRequest::from_json(json).unwrap());
}

/// Everything a [`DecisionContext`] borrows besides the battle
pub struct Harness {
    pub registry: ViabilityRegistry,
    pub oracle: FormulaOracle,
    pub config: AgentConfig,
    pub log: MemoryLog,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            registry: ViabilityRegistry::standard(),
            oracle: FormulaOracle,
            config: AgentConfig::default(),
            log: MemoryLog::new(),
        }
    }

    pub fn ctx<'a>(&'a self, battle: &'a TrackedBattle) -> DecisionContext<'a> {
        DecisionContext::new(battle, &self.registry, &self.oracle, &self.config, &self.log)
    }
}
