//! Structured battle events.
//!
//! Events are split the same way the battle log is: [`MajorEvent`]s change the
//! composition of the field, the pending request or match metadata, while
//! [`MinorEvent`]s describe everything that happens in between.

use serde::{Deserialize, Serialize};

use super::battle::{GameType, HpStatus, Player, Pokemon, PokemonDetails, Side, Stat};
use super::request::BattleRequest;

/// Effect attribution carried by `[from]` and `[of]` tags
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribution {
    /// Effect that caused the event (e.g. "item: Leftovers", "ability: Pressure")
    pub from: Option<String>,
    /// Pokemon the effect belongs to, when it isn't the subject
    pub of: Option<Pokemon>,
}

impl Attribution {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn effect(effect: impl Into<String>) -> Self {
        Self {
            from: Some(effect.into()),
            of: None,
        }
    }

    pub fn with_of(mut self, of: Pokemon) -> Self {
        self.of = Some(of);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.of.is_none()
    }

    /// Item name when the effect is an item
    pub fn item(&self) -> Option<&str> {
        self.from.as_deref()?.strip_prefix("item: ")
    }

    /// Ability name when the effect is an ability
    pub fn ability(&self) -> Option<&str> {
        self.from.as_deref()?.strip_prefix("ability: ")
    }

    /// Move name when the effect is a move
    pub fn move_name(&self) -> Option<&str> {
        let from = self.from.as_deref()?;
        from.strip_prefix("move: ").or(Some(from))
    }
}

/// A single entry of the battle event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    Major(MajorEvent),
    Minor(MinorEvent),
}

impl From<MajorEvent> for BattleEvent {
    fn from(event: MajorEvent) -> Self {
        BattleEvent::Major(event)
    }
}

impl From<MinorEvent> for BattleEvent {
    fn from(event: MinorEvent) -> Self {
        BattleEvent::Minor(event)
    }
}

/// Events that change active composition, request state or match metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MajorEvent {
    // === Initialization ===
    Player {
        player: Player,
        username: String,
    },
    TeamSize {
        player: Player,
        size: usize,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    TeamPreview(Option<usize>),
    Start,

    // === Requests ===
    Request(Box<BattleRequest>),

    // === Actions ===
    Switch {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Drag {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Replace {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    DetailsChange {
        pokemon: Pokemon,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    FormeChange {
        pokemon: Pokemon,
        species: String,
        hp_status: Option<HpStatus>,
        attribution: Attribution,
    },
    Faint(Pokemon),
    Swap {
        pokemon: Pokemon,
        position: usize,
    },
    Move {
        pokemon: Pokemon,
        move_name: String,
        target: Option<Pokemon>,
        miss: bool,
        still: bool,
        attribution: Attribution,
    },
    Cant {
        pokemon: Pokemon,
        reason: String,
        move_name: Option<String>,
    },

    // === Progress ===
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,
}

/// Everything else that can happen during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MinorEvent {
    // === HP ===
    Damage {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
        attribution: Attribution,
    },
    Heal {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
        attribution: Attribution,
    },
    SetHp {
        pokemon: Pokemon,
        hp_status: Option<HpStatus>,
    },

    // === Status ===
    Status {
        pokemon: Pokemon,
        status: String,
        attribution: Attribution,
    },
    CureStatus {
        pokemon: Pokemon,
        status: String,
        attribution: Attribution,
    },
    CureTeam(Pokemon),

    // === Boosts ===
    Boost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
        attribution: Attribution,
    },
    Unboost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
        attribution: Attribution,
    },
    SetBoost {
        pokemon: Pokemon,
        stat: Stat,
        amount: i8,
    },
    ClearBoost(Pokemon),
    ClearAllBoost,
    ClearPositiveBoost {
        target: Pokemon,
        source: Option<Pokemon>,
        effect: Option<String>,
    },
    ClearNegativeBoost(Pokemon),
    InvertBoost(Pokemon),
    CopyBoost {
        source: Pokemon,
        target: Pokemon,
    },
    SwapBoost {
        source: Pokemon,
        target: Pokemon,
        stats: Vec<Stat>,
    },

    // === Items and abilities ===
    Item {
        pokemon: Pokemon,
        item: String,
        attribution: Attribution,
    },
    EndItem {
        pokemon: Pokemon,
        item: String,
        eat: bool,
        attribution: Attribution,
    },
    Ability {
        pokemon: Pokemon,
        ability: String,
        attribution: Attribution,
    },
    EndAbility {
        pokemon: Pokemon,
        attribution: Attribution,
    },

    // === Transformations and power-ups ===
    Transform {
        pokemon: Pokemon,
        target: Pokemon,
        attribution: Attribution,
    },
    Mega {
        pokemon: Pokemon,
        megastone: Option<String>,
    },
    Primal(Pokemon),
    Burst {
        pokemon: Pokemon,
        species: String,
    },
    ZPower(Pokemon),
    Terastallize {
        pokemon: Pokemon,
        tera_type: String,
    },

    // === Volatiles ===
    Start {
        pokemon: Pokemon,
        effect: String,
        detail: Option<String>,
        attribution: Attribution,
    },
    End {
        pokemon: Pokemon,
        effect: String,
        attribution: Attribution,
    },
    SingleTurn {
        pokemon: Pokemon,
        effect: String,
    },
    SingleMove {
        pokemon: Pokemon,
        effect: String,
    },
    Activate {
        pokemon: Option<Pokemon>,
        effect: String,
        details: Vec<String>,
        attribution: Attribution,
    },

    // === Side and field ===
    SideStart {
        side: Side,
        condition: String,
        attribution: Attribution,
    },
    SideEnd {
        side: Side,
        condition: String,
        attribution: Attribution,
    },
    SwapSideConditions,
    FieldStart {
        condition: String,
        attribution: Attribution,
    },
    FieldEnd {
        condition: String,
    },
    Weather {
        weather: String,
        upkeep: bool,
        attribution: Attribution,
    },

    // === Move outcomes ===
    Crit(Pokemon),
    SuperEffective(Pokemon),
    Resisted(Pokemon),
    Immune {
        pokemon: Pokemon,
        attribution: Attribution,
    },
    Miss {
        source: Pokemon,
        target: Option<Pokemon>,
    },
    Fail {
        pokemon: Pokemon,
        action: Option<String>,
    },
    Block {
        pokemon: Pokemon,
        effect: String,
        attacker: Option<Pokemon>,
    },
    NoTarget(Option<Pokemon>),
    Prepare {
        pokemon: Pokemon,
        move_name: String,
        target: Option<Pokemon>,
    },
    MustRecharge(Pokemon),
    HitCount {
        pokemon: Pokemon,
        count: u8,
    },
}
