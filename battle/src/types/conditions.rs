//! Weather, terrain, field effects and side conditions

use crate::dex::effect_id;

/// Weather conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Sun,
    Rain,
    Sand,
    Hail,
    Snow,
    HarshSun,
    HeavyRain,
    StrongWinds,
}

impl Weather {
    /// Parse from a protocol weather name; "none" clears
    pub fn from_protocol(s: &str) -> Option<Self> {
        match effect_id(s).as_str() {
            "sunnyday" | "sun" => Some(Weather::Sun),
            "raindance" | "rain" => Some(Weather::Rain),
            "sandstorm" | "sand" => Some(Weather::Sand),
            "hail" => Some(Weather::Hail),
            "snow" | "snowscape" => Some(Weather::Snow),
            "desolateland" | "harshsun" => Some(Weather::HarshSun),
            "primordialsea" | "heavyrain" => Some(Weather::HeavyRain),
            "deltastream" | "strongwinds" => Some(Weather::StrongWinds),
            _ => None,
        }
    }

    /// Primal weathers cannot be replaced by ordinary weather
    pub fn is_primal(&self) -> bool {
        matches!(
            self,
            Weather::HarshSun | Weather::HeavyRain | Weather::StrongWinds
        )
    }

    pub fn is_sun(&self) -> bool {
        matches!(self, Weather::Sun | Weather::HarshSun)
    }

    pub fn is_rain(&self) -> bool {
        matches!(self, Weather::Rain | Weather::HeavyRain)
    }

    /// Turns an ordinary weather lasts without an extending item; primal weather is unbounded
    pub fn default_duration(&self) -> Option<u8> {
        (!self.is_primal()).then_some(5)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sun => "Sun",
            Weather::Rain => "Rain",
            Weather::Sand => "Sandstorm",
            Weather::Hail => "Hail",
            Weather::Snow => "Snow",
            Weather::HarshSun => "Harsh Sun",
            Weather::HeavyRain => "Heavy Rain",
            Weather::StrongWinds => "Strong Winds",
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terrain conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Electric,
    Grassy,
    Misty,
    Psychic,
}

impl Terrain {
    pub fn from_protocol(s: &str) -> Option<Self> {
        match effect_id(s).as_str() {
            "electricterrain" => Some(Terrain::Electric),
            "grassyterrain" => Some(Terrain::Grassy),
            "mistyterrain" => Some(Terrain::Misty),
            "psychicterrain" => Some(Terrain::Psychic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Terrain::Electric => "Electric Terrain",
            Terrain::Grassy => "Grassy Terrain",
            Terrain::Misty => "Misty Terrain",
            Terrain::Psychic => "Psychic Terrain",
        }
    }
}

impl std::fmt::Display for Terrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole-field effects other than weather and terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEffect {
    TrickRoom,
    MagicRoom,
    WonderRoom,
    Gravity,
    MudSport,
    WaterSport,
    IonDeluge,
    FairyLock,
}

impl FieldEffect {
    pub fn from_protocol(s: &str) -> Option<Self> {
        match effect_id(s).as_str() {
            "trickroom" => Some(FieldEffect::TrickRoom),
            "magicroom" => Some(FieldEffect::MagicRoom),
            "wonderroom" => Some(FieldEffect::WonderRoom),
            "gravity" => Some(FieldEffect::Gravity),
            "mudsport" => Some(FieldEffect::MudSport),
            "watersport" => Some(FieldEffect::WaterSport),
            "iondeluge" => Some(FieldEffect::IonDeluge),
            "fairylock" => Some(FieldEffect::FairyLock),
            _ => None,
        }
    }

    pub fn default_duration(&self) -> u8 {
        match self {
            FieldEffect::IonDeluge => 1,
            FieldEffect::FairyLock => 2,
            _ => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldEffect::TrickRoom => "Trick Room",
            FieldEffect::MagicRoom => "Magic Room",
            FieldEffect::WonderRoom => "Wonder Room",
            FieldEffect::Gravity => "Gravity",
            FieldEffect::MudSport => "Mud Sport",
            FieldEffect::WaterSport => "Water Sport",
            FieldEffect::IonDeluge => "Ion Deluge",
            FieldEffect::FairyLock => "Fairy Lock",
        }
    }
}

/// Side conditions (hazards, screens, delayed healing, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideCondition {
    // Screens
    Reflect,
    LightScreen,
    AuroraVeil,

    // Entry hazards
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,

    // Other
    Tailwind,
    Safeguard,
    Mist,
    LuckyChant,
    WideGuard,
    QuickGuard,
    MatBlock,

    // Delayed effects that land on a later turn
    Wish,
    HealingWish,
    LunarDance,
}

impl SideCondition {
    pub fn from_protocol(s: &str) -> Option<Self> {
        match effect_id(s).as_str() {
            "reflect" => Some(SideCondition::Reflect),
            "lightscreen" => Some(SideCondition::LightScreen),
            "auroraveil" => Some(SideCondition::AuroraVeil),
            "spikes" => Some(SideCondition::Spikes),
            "toxicspikes" => Some(SideCondition::ToxicSpikes),
            "stealthrock" => Some(SideCondition::StealthRock),
            "stickyweb" => Some(SideCondition::StickyWeb),
            "tailwind" => Some(SideCondition::Tailwind),
            "safeguard" => Some(SideCondition::Safeguard),
            "mist" => Some(SideCondition::Mist),
            "luckychant" => Some(SideCondition::LuckyChant),
            "wideguard" => Some(SideCondition::WideGuard),
            "quickguard" => Some(SideCondition::QuickGuard),
            "matblock" => Some(SideCondition::MatBlock),
            "wish" => Some(SideCondition::Wish),
            "healingwish" => Some(SideCondition::HealingWish),
            "lunardance" => Some(SideCondition::LunarDance),
            _ => None,
        }
    }

    pub fn max_layers(&self) -> u8 {
        match self {
            SideCondition::Spikes => 3,
            SideCondition::ToxicSpikes => 2,
            _ => 1,
        }
    }

    pub fn is_screen(&self) -> bool {
        matches!(
            self,
            SideCondition::Reflect | SideCondition::LightScreen | SideCondition::AuroraVeil
        )
    }

    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            SideCondition::Spikes
                | SideCondition::ToxicSpikes
                | SideCondition::StealthRock
                | SideCondition::StickyWeb
        )
    }

    /// Conditions installed by a move that take effect on a later turn.
    ///
    /// The host never announces their end, so they expire when the
    /// estimated duration runs out.
    pub fn is_delayed(&self) -> bool {
        matches!(
            self,
            SideCondition::Wish | SideCondition::HealingWish | SideCondition::LunarDance
        )
    }

    /// Estimated turns the condition stays up; `None` until removed
    pub fn default_duration(&self) -> Option<u8> {
        match self {
            SideCondition::Reflect
            | SideCondition::LightScreen
            | SideCondition::AuroraVeil
            | SideCondition::Safeguard
            | SideCondition::Mist
            | SideCondition::LuckyChant => Some(5),
            SideCondition::Tailwind => Some(4),
            SideCondition::Wish => Some(2),
            SideCondition::HealingWish
            | SideCondition::LunarDance
            | SideCondition::WideGuard
            | SideCondition::QuickGuard
            | SideCondition::MatBlock => Some(1),
            SideCondition::Spikes
            | SideCondition::ToxicSpikes
            | SideCondition::StealthRock
            | SideCondition::StickyWeb => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SideCondition::Reflect => "Reflect",
            SideCondition::LightScreen => "Light Screen",
            SideCondition::AuroraVeil => "Aurora Veil",
            SideCondition::Spikes => "Spikes",
            SideCondition::ToxicSpikes => "Toxic Spikes",
            SideCondition::StealthRock => "Stealth Rock",
            SideCondition::StickyWeb => "Sticky Web",
            SideCondition::Tailwind => "Tailwind",
            SideCondition::Safeguard => "Safeguard",
            SideCondition::Mist => "Mist",
            SideCondition::LuckyChant => "Lucky Chant",
            SideCondition::WideGuard => "Wide Guard",
            SideCondition::QuickGuard => "Quick Guard",
            SideCondition::MatBlock => "Mat Block",
            SideCondition::Wish => "Wish",
            SideCondition::HealingWish => "Healing Wish",
            SideCondition::LunarDance => "Lunar Dance",
        }
    }
}

impl std::fmt::Display for SideCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bookkeeping for one side condition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideConditionState {
    /// Stack count for hazards
    pub layers: u8,
    /// Turn the condition was (last) set
    pub turn: u32,
    /// Estimated turns remaining
    pub duration: Option<u8>,
}

impl SideConditionState {
    pub fn new(condition: SideCondition, turn: u32) -> Self {
        Self {
            layers: 1,
            turn,
            duration: condition.default_duration(),
        }
    }

    /// Add a layer, returns false when already at the cap
    pub fn add_layer(&mut self, condition: SideCondition) -> bool {
        if self.layers < condition.max_layers() {
            self.layers += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_from_protocol() {
        assert_eq!(Weather::from_protocol("SunnyDay"), Some(Weather::Sun));
        assert_eq!(Weather::from_protocol("RainDance"), Some(Weather::Rain));
        assert_eq!(Weather::from_protocol("Snow"), Some(Weather::Snow));
        assert_eq!(
            Weather::from_protocol("PrimordialSea"),
            Some(Weather::HeavyRain)
        );
        assert_eq!(Weather::from_protocol("none"), None);
        assert_eq!(Weather::Sun.default_duration(), Some(5));
        assert_eq!(Weather::StrongWinds.default_duration(), None);
    }

    #[test]
    fn test_terrain_and_field_effects() {
        assert_eq!(
            Terrain::from_protocol("move: Grassy Terrain"),
            Some(Terrain::Grassy)
        );
        assert_eq!(Terrain::from_protocol("Gravity"), None);
        assert_eq!(
            FieldEffect::from_protocol("move: Trick Room"),
            Some(FieldEffect::TrickRoom)
        );
        assert_eq!(FieldEffect::FairyLock.default_duration(), 2);
    }

    #[test]
    fn test_side_condition_from_protocol() {
        assert_eq!(
            SideCondition::from_protocol("move: Stealth Rock"),
            Some(SideCondition::StealthRock)
        );
        assert_eq!(
            SideCondition::from_protocol("Healing Wish"),
            Some(SideCondition::HealingWish)
        );
        assert_eq!(SideCondition::from_protocol("Trick Room"), None);
    }

    #[test]
    fn test_delayed_conditions() {
        assert!(SideCondition::Wish.is_delayed());
        assert_eq!(SideCondition::Wish.default_duration(), Some(2));
        assert_eq!(SideCondition::LunarDance.default_duration(), Some(1));
        assert!(!SideCondition::Reflect.is_delayed());
        assert_eq!(SideCondition::Spikes.default_duration(), None);
    }

    #[test]
    fn test_side_condition_layers() {
        let mut state = SideConditionState::new(SideCondition::Spikes, 3);
        assert_eq!(state.turn, 3);
        assert!(state.add_layer(SideCondition::Spikes));
        assert!(state.add_layer(SideCondition::Spikes));
        assert!(!state.add_layer(SideCondition::Spikes));
        assert_eq!(state.layers, 3);

        let mut rocks = SideConditionState::new(SideCondition::StealthRock, 1);
        assert!(!rocks.add_layer(SideCondition::StealthRock));
    }
}
