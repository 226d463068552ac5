//! Status conditions (volatile and non-volatile)

use zoroark_protocol::Stat;

use super::pokemon::MoveKnowledge;
use super::pokemon_type::Type;
use super::stats::StatKnowledge;
use crate::dex::effect_id;

/// Non-volatile status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    #[cfg_attr(feature = "serde", serde(rename = "brn"))]
    Burn,
    #[cfg_attr(feature = "serde", serde(rename = "frz"))]
    Freeze,
    #[cfg_attr(feature = "serde", serde(rename = "par"))]
    Paralysis,
    #[cfg_attr(feature = "serde", serde(rename = "psn"))]
    Poison,
    #[cfg_attr(feature = "serde", serde(rename = "tox"))]
    BadPoison,
    #[cfg_attr(feature = "serde", serde(rename = "slp"))]
    Sleep,
}

impl Status {
    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadPoison),
            "slp" => Some(Status::Sleep),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadPoison => "tox",
            Status::Sleep => "slp",
        }
    }

    pub fn is_poison(&self) -> bool {
        matches!(self, Status::Poison | Status::BadPoison)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_protocol())
    }
}

/// Volatile conditions (cleared on switching unless passed)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Volatile {
    // Movement restriction
    Trapped,
    PartialTrap,
    Octolock,

    // Move restriction
    Confusion,
    Taunt,
    Encore,
    Disable,
    Torment,
    Infatuation,
    Imprison,
    GastroAcid,

    // Damage over time / healing
    LeechSeed,
    Curse,
    PerishSong,
    Nightmare,
    SaltCure,
    Ingrain,
    AquaRing,

    // Protection
    Protect,
    Endure,
    Substitute,

    // Turn states
    Flinch,
    Yawn,
    Recharging,
    Charging,
    LockedMove,
    Roost,
    HelpingHand,
    MagicCoat,
    DestinyBond,
    CenterOfAttention,

    // Stat related
    FocusEnergy,
    LaserFocus,
    Stockpile,
    PowerTrick,
    Minimize,
    TarShot,
    NoRetreat,
    Syrupy,
    MagnetRise,
    Telekinesis,
    SmackDown,

    // Ability driven
    FlashFire,
    SlowStart,
    Protosynthesis,
    QuarkDrive,
    Illusion,

    // Type and identity overrides
    TypeChange,
    TypeAdd,
    Transformed,
    Mimic,
    Dynamaxed,

    /// Anything else the host reports
    Other(String),
}

impl Volatile {
    /// Parse from a protocol effect name ("move: Taunt", "confusion", "Substitute")
    pub fn from_protocol(s: &str) -> Self {
        match effect_id(s).as_str() {
            "trapped" | "meanlook" | "spiderweb" | "block" | "jawlock" => Volatile::Trapped,
            "partiallytrapped" | "bind" | "wrap" | "firespin" | "clamp" | "whirlpool"
            | "sandtomb" | "magmastorm" | "infestation" | "snaptrap" | "thundercage" => {
                Volatile::PartialTrap
            }
            "octolock" => Volatile::Octolock,

            "confusion" => Volatile::Confusion,
            "taunt" => Volatile::Taunt,
            "encore" => Volatile::Encore,
            "disable" => Volatile::Disable,
            "torment" => Volatile::Torment,
            "attract" => Volatile::Infatuation,
            "imprison" => Volatile::Imprison,
            "gastroacid" => Volatile::GastroAcid,

            "leechseed" => Volatile::LeechSeed,
            "curse" => Volatile::Curse,
            "perishsong" | "perish0" | "perish1" | "perish2" | "perish3" => Volatile::PerishSong,
            "nightmare" => Volatile::Nightmare,
            "saltcure" => Volatile::SaltCure,
            "ingrain" => Volatile::Ingrain,
            "aquaring" => Volatile::AquaRing,

            "protect" | "detect" | "kingsshield" | "spikyshield" | "banefulbunker"
            | "obstruct" | "silktrap" | "burningbulwark" | "maxguard" => Volatile::Protect,
            "endure" => Volatile::Endure,
            "substitute" => Volatile::Substitute,

            "flinch" => Volatile::Flinch,
            "yawn" => Volatile::Yawn,
            "mustrecharge" => Volatile::Recharging,
            "twoturnmove" => Volatile::Charging,
            "lockedmove" => Volatile::LockedMove,
            "roost" => Volatile::Roost,
            "helpinghand" => Volatile::HelpingHand,
            "magiccoat" => Volatile::MagicCoat,
            "destinybond" => Volatile::DestinyBond,
            "followme" | "ragepowder" | "spotlight" => Volatile::CenterOfAttention,

            "focusenergy" | "dragoncheer" => Volatile::FocusEnergy,
            "laserfocus" => Volatile::LaserFocus,
            "stockpile" | "stockpile1" | "stockpile2" | "stockpile3" => Volatile::Stockpile,
            "powertrick" => Volatile::PowerTrick,
            "minimize" => Volatile::Minimize,
            "tarshot" => Volatile::TarShot,
            "noretreat" => Volatile::NoRetreat,
            "syrupbomb" => Volatile::Syrupy,
            "magnetrise" => Volatile::MagnetRise,
            "telekinesis" => Volatile::Telekinesis,
            "smackdown" => Volatile::SmackDown,

            "flashfire" => Volatile::FlashFire,
            "slowstart" => Volatile::SlowStart,
            "illusion" => Volatile::Illusion,

            "typechange" => Volatile::TypeChange,
            "typeadd" => Volatile::TypeAdd,
            "transform" => Volatile::Transformed,
            "mimic" => Volatile::Mimic,
            "dynamax" => Volatile::Dynamaxed,

            id if id.starts_with("protosynthesis") => Volatile::Protosynthesis,
            id if id.starts_with("quarkdrive") => Volatile::QuarkDrive,

            _ => Volatile::Other(effect_id(s)),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Volatile::Other(_))
    }

    /// Whether Baton Pass hands this volatile to the replacement
    pub fn is_passable(&self) -> bool {
        !matches!(
            self,
            Volatile::Taunt
                | Volatile::Encore
                | Volatile::Disable
                | Volatile::Torment
                | Volatile::Infatuation
                | Volatile::Imprison
                | Volatile::Trapped
                | Volatile::PartialTrap
                | Volatile::Octolock
                | Volatile::Nightmare
                | Volatile::SaltCure
                | Volatile::Protect
                | Volatile::Endure
                | Volatile::Flinch
                | Volatile::Yawn
                | Volatile::Recharging
                | Volatile::Charging
                | Volatile::LockedMove
                | Volatile::Roost
                | Volatile::HelpingHand
                | Volatile::MagicCoat
                | Volatile::DestinyBond
                | Volatile::CenterOfAttention
                | Volatile::Stockpile
                | Volatile::Minimize
                | Volatile::TarShot
                | Volatile::NoRetreat
                | Volatile::Syrupy
                | Volatile::SmackDown
                | Volatile::FlashFire
                | Volatile::SlowStart
                | Volatile::Protosynthesis
                | Volatile::QuarkDrive
                | Volatile::Illusion
                | Volatile::TypeChange
                | Volatile::TypeAdd
                | Volatile::Transformed
                | Volatile::Mimic
                | Volatile::Dynamaxed
        )
    }
}

impl std::fmt::Display for Volatile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Volatile::Other(id) => write!(f, "{}", id),
            known => write!(f, "{:?}", known),
        }
    }
}

/// Data carried by a volatile while it is active
#[derive(Debug, Clone, Default, PartialEq)]
pub enum VolatileData {
    #[default]
    None,
    /// Stockpile layers, perish count
    Counter(u8),
    /// Stat raised by Protosynthesis / Quark Drive
    BoostedStat(Stat),
    /// Disabled move, mimicked move, charging move
    Move(String),
    /// Replacement or added types
    Types(Vec<Type>),
    Transform(Box<TransformSnapshot>),
    Disguise(DisguiseGuess),
}

/// What a transformed pokemon copied from its target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSnapshot {
    pub species: String,
    pub types: Vec<Type>,
    pub stats: StatKnowledge,
    pub ability: Option<String>,
    /// Copied moves, each with 5 PP
    pub moves: Vec<MoveKnowledge>,
}

/// Best guess about who is really behind a disguise
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisguiseGuess {
    /// Probable true species
    pub species: String,
    /// Roster entry believed to be the disguised pokemon
    pub roster_index: Option<usize>,
    /// Roster entry whose appearance is being borrowed
    pub impersonating: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_codes() {
        for code in ["brn", "frz", "par", "psn", "tox", "slp"] {
            assert_eq!(Status::from_protocol(code).unwrap().to_protocol(), code);
        }
        assert_eq!(Status::from_protocol("fnt"), None);
        assert!(Status::BadPoison.is_poison());
    }

    #[test]
    fn test_volatile_from_protocol() {
        assert_eq!(Volatile::from_protocol("move: Taunt"), Volatile::Taunt);
        assert_eq!(Volatile::from_protocol("King's Shield"), Volatile::Protect);
        assert_eq!(Volatile::from_protocol("perish2"), Volatile::PerishSong);
        assert_eq!(
            Volatile::from_protocol("protosynthesisatk"),
            Volatile::Protosynthesis
        );
        assert_eq!(
            Volatile::from_protocol("ability: Quark Drive"),
            Volatile::QuarkDrive
        );
        assert_eq!(Volatile::from_protocol("Dynamax"), Volatile::Dynamaxed);
    }

    #[test]
    fn test_unknown_volatile_is_normalized() {
        let volatile = Volatile::from_protocol("move: Glaive Rush");
        assert_eq!(volatile, Volatile::Other("glaiverush".to_string()));
        assert!(!volatile.is_known());
        assert!(volatile.is_passable());
    }

    #[test]
    fn test_passable_volatiles() {
        assert!(Volatile::Substitute.is_passable());
        assert!(Volatile::PerishSong.is_passable());
        assert!(Volatile::Confusion.is_passable());
        assert!(!Volatile::Taunt.is_passable());
        assert!(!Volatile::Illusion.is_passable());
        assert!(!Volatile::Transformed.is_passable());
    }
}
