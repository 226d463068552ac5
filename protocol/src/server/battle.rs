//! Shared types for battle protocol messages

use serde::{Deserialize, Serialize};

/// Player in a battle (p1, p2, p3, p4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    P1,
    P2,
    P3,
    P4,
}

impl Player {
    pub const ALL: [Player; 4] = [Player::P1, Player::P2, Player::P3, Player::P4];

    pub fn parse(s: &str) -> Option<Self> {
        match s.get(..2)? {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            "p3" => Some(Player::P3),
            "p4" => Some(Player::P4),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
            Player::P3 => "p3",
            Player::P4 => "p4",
        }
    }

    /// Zero-based index (p1 = 0)
    pub fn index(&self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
            Player::P3 => 2,
            Player::P4 => 3,
        }
    }

    /// Which half of the field this player stands on.
    ///
    /// p1 and p3 share a half, as do p2 and p4.
    pub fn half(&self) -> usize {
        self.index() % 2
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pokemon identifier in the form "POSITION: NAME" (e.g., "p1a: Pikachu")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pokemon {
    /// Player who owns this pokemon
    pub player: Player,
    /// Position letter (a, b, c for active slots, or None if inactive)
    pub position: Option<char>,
    /// Pokemon's name/nickname
    pub name: String,
}

impl Pokemon {
    pub fn new(player: Player, position: Option<char>, name: impl Into<String>) -> Self {
        Self {
            player,
            position,
            name: name.into(),
        }
    }

    /// Parse a pokemon ID string like "p1a: Pikachu" or "p1: Pikachu"
    pub fn parse(s: &str) -> Option<Self> {
        let (pos_part, name) = s.split_once(": ")?;
        let player = Player::parse(pos_part)?;
        let position = pos_part.chars().nth(2).filter(|c| c.is_ascii_lowercase());

        Some(Pokemon {
            player,
            position,
            name: name.to_string(),
        })
    }

    /// Active slot index for the position letter ('a' = 0)
    pub fn slot(&self) -> Option<usize> {
        self.position.map(|c| (c as u8).saturating_sub(b'a') as usize)
    }
}

impl std::fmt::Display for Pokemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}{}: {}", self.player, pos, self.name),
            None => write!(f, "{}: {}", self.player, self.name),
        }
    }
}

/// Pokemon details string (species, level, gender, shiny, tera)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PokemonDetails {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
    pub tera_type: Option<String>,
}

impl PokemonDetails {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..Default::default()
        }
    }

    /// Parse a details string like "Pikachu, L50, M, shiny" or "Arceus-*"
    pub fn parse(s: &str) -> Self {
        let mut details = PokemonDetails::default();
        let parts: Vec<&str> = s.split(", ").collect();

        if let Some(species) = parts.first() {
            details.species = species.to_string();
        }

        for part in parts.iter().skip(1) {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().ok();
            } else if *part == "M" {
                details.gender = Some('M');
            } else if *part == "F" {
                details.gender = Some('F');
            } else if *part == "shiny" {
                details.shiny = true;
            } else if let Some(tera) = part.strip_prefix("tera:") {
                details.tera_type = Some(tera.to_string());
            }
        }

        details
    }

    /// Species with a trailing wildcard forme ("Urshifu-*") removed
    pub fn base_species(&self) -> &str {
        self.species.strip_suffix("-*").unwrap_or(&self.species)
    }
}

/// HP and status condition (e.g., "100/100", "50/100 slp", "0 fnt")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpStatus {
    /// Current HP (as raw value or percentage depending on context)
    pub current: u32,
    /// Max HP (if known)
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    /// Parse an HP status string like "100/100", "50/100 slp", or "0 fnt"
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let hp_part = parts.first()?;
        let status = parts.get(1).map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: Some(max_str.parse().ok()?),
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            })
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt")
    }
}

/// Game type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Singles,
    Doubles,
    Triples,
    Multi,
    FreeForAll,
}

impl GameType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "singles" => Some(GameType::Singles),
            "doubles" => Some(GameType::Doubles),
            "triples" => Some(GameType::Triples),
            "multi" => Some(GameType::Multi),
            "freeforall" => Some(GameType::FreeForAll),
            _ => None,
        }
    }

    /// Active slots controlled by each player
    pub fn slots_per_player(&self) -> usize {
        match self {
            GameType::Singles | GameType::Multi | GameType::FreeForAll => 1,
            GameType::Doubles => 2,
            GameType::Triples => 3,
        }
    }

    /// Active positions on each half of the field
    pub fn positions_per_half(&self) -> usize {
        match self {
            GameType::Singles => 1,
            GameType::Doubles | GameType::Multi | GameType::FreeForAll => 2,
            GameType::Triples => 3,
        }
    }

    /// Whether two players share each half of the field
    pub fn is_shared_half(&self) -> bool {
        matches!(self, GameType::Multi | GameType::FreeForAll)
    }
}

/// Stat abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    /// The five stats that have a base value
    pub const BATTLE: [Stat; 5] = [Stat::Atk, Stat::Def, Stat::Spa, Stat::Spd, Stat::Spe];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spa" => Some(Stat::Spa),
            "spd" => Some(Stat::Spd),
            "spe" => Some(Stat::Spe),
            "accuracy" => Some(Stat::Accuracy),
            "evasion" => Some(Stat::Evasion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::Spa => "spa",
            Stat::Spd => "spd",
            Stat::Spe => "spe",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasion",
        }
    }
}

/// Side of the field (for side conditions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        Some(Side {
            player: Player::parse(s)?,
            raw: s.to_string(),
        })
    }
}

/// Target class of a move, as used in decision requests and move data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveTarget {
    #[default]
    Normal,
    #[serde(rename = "self")]
    User,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    AdjacentFoe,
    AllAdjacent,
    AllAdjacentFoes,
    Allies,
    AllySide,
    AllyTeam,
    Any,
    FoeSide,
    All,
    RandomNormal,
    Scripted,
}

impl MoveTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(MoveTarget::Normal),
            "self" => Some(MoveTarget::User),
            "adjacentAlly" => Some(MoveTarget::AdjacentAlly),
            "adjacentAllyOrSelf" => Some(MoveTarget::AdjacentAllyOrSelf),
            "adjacentFoe" => Some(MoveTarget::AdjacentFoe),
            "allAdjacent" => Some(MoveTarget::AllAdjacent),
            "allAdjacentFoes" => Some(MoveTarget::AllAdjacentFoes),
            "allies" => Some(MoveTarget::Allies),
            "allySide" => Some(MoveTarget::AllySide),
            "allyTeam" => Some(MoveTarget::AllyTeam),
            "any" => Some(MoveTarget::Any),
            "foeSide" => Some(MoveTarget::FoeSide),
            "all" => Some(MoveTarget::All),
            "randomNormal" => Some(MoveTarget::RandomNormal),
            "scripted" => Some(MoveTarget::Scripted),
            _ => None,
        }
    }

    /// Whether the player has to pick a target location for this move
    pub fn requires_choice(&self) -> bool {
        matches!(
            self,
            MoveTarget::Normal
                | MoveTarget::AdjacentAlly
                | MoveTarget::AdjacentAllyOrSelf
                | MoveTarget::AdjacentFoe
                | MoveTarget::Any
        )
    }

    /// Whether the move hits more than one combatant at once
    pub fn is_spread(&self) -> bool {
        matches!(
            self,
            MoveTarget::AllAdjacent | MoveTarget::AllAdjacentFoes | MoveTarget::Allies
        )
    }

    /// Moves that affect the field or a side rather than a combatant
    pub fn targets_nothing(&self) -> bool {
        matches!(
            self,
            MoveTarget::All | MoveTarget::AllySide | MoveTarget::FoeSide | MoveTarget::AllyTeam
        )
    }
}
