//! Stat stages and what we know about raw stats

use zoroark_protocol::{PokemonStats, Stat};

const STAGED: [Stat; 7] = [
    Stat::Atk,
    Stat::Def,
    Stat::Spa,
    Stat::Spd,
    Stat::Spe,
    Stat::Accuracy,
    Stat::Evasion,
];

/// Accuracy/evasion multipliers for stages -6..=+6
pub const ACCURACY_STAGE_TABLE: [f64; 13] = [
    1.0 / 3.0,
    0.36,
    0.40,
    0.45,
    0.50,
    0.66,
    1.0,
    1.33,
    1.66,
    2.0,
    2.33,
    2.66,
    3.0,
];

/// Stat stages (-6 to +6)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: Stat, value: i8) {
        let slot = match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spa => &mut self.spa,
            Stat::Spd => &mut self.spd,
            Stat::Spe => &mut self.spe,
            Stat::Accuracy => &mut self.accuracy,
            Stat::Evasion => &mut self.evasion,
        };
        *slot = value.clamp(-6, 6);
    }

    /// Apply a boost, returning the change actually applied
    pub fn boost(&mut self, stat: Stat, amount: i8) -> i8 {
        let current = self.get(stat);
        self.set(stat, current.saturating_add(amount));
        self.get(stat) - current
    }

    pub fn unboost(&mut self, stat: Stat, amount: i8) -> i8 {
        self.boost(stat, amount.saturating_neg())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn map(&mut self, f: impl Fn(i8) -> i8) {
        for stat in STAGED {
            let value = f(self.get(stat));
            self.set(stat, value);
        }
    }

    pub fn clear_positive(&mut self) {
        self.map(|stage| stage.min(0));
    }

    pub fn clear_negative(&mut self) {
        self.map(|stage| stage.max(0));
    }

    /// Topsy-Turvy
    pub fn invert(&mut self) {
        self.map(|stage| -stage);
    }

    pub fn is_clear(&self) -> bool {
        STAGED.iter().all(|&stat| self.get(stat) == 0)
    }

    /// Non-zero stages
    pub fn iter(&self) -> impl Iterator<Item = (Stat, i8)> + '_ {
        STAGED
            .iter()
            .map(|&stat| (stat, self.get(stat)))
            .filter(|(_, stage)| *stage != 0)
    }

    /// Sum of positive stages
    pub fn positive_total(&self) -> i32 {
        self.iter().map(|(_, stage)| stage.max(0) as i32).sum()
    }

    /// Multiplier for atk/def/spa/spd/spe stages: +1 = 1.5x, -1 = 0.67x
    pub fn multiplier(stage: i8) -> f64 {
        let stage = stage.clamp(-6, 6) as f64;
        if stage >= 0.0 {
            (2.0 + stage) / 2.0
        } else {
            2.0 / (2.0 - stage)
        }
    }

    /// Multiplier for an accuracy or evasion stage
    pub fn accuracy_multiplier(stage: i8) -> f64 {
        ACCURACY_STAGE_TABLE[(stage.clamp(-6, 6) + 6) as usize]
    }
}

/// What we know about one raw stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatRange {
    pub known: bool,
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    pub fn exact(value: u32) -> Self {
        Self {
            known: true,
            min: value,
            max: value,
        }
    }

    pub fn estimated(min: u32, max: u32) -> Self {
        Self {
            known: false,
            min,
            max,
        }
    }

    pub fn mid(&self) -> u32 {
        (self.min + self.max) / 2
    }

    /// Nothing recorded yet
    pub fn is_empty(&self) -> bool {
        !self.known && self.max == 0
    }
}

/// Raw stat knowledge for one pokemon
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatKnowledge {
    pub hp: StatRange,
    pub atk: StatRange,
    pub def: StatRange,
    pub spa: StatRange,
    pub spd: StatRange,
    pub spe: StatRange,
}

impl StatKnowledge {
    /// Range for a battle stat; accuracy and evasion have no raw value
    pub fn get(&self, stat: Stat) -> StatRange {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy | Stat::Evasion => StatRange::default(),
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> Option<&mut StatRange> {
        match stat {
            Stat::Atk => Some(&mut self.atk),
            Stat::Def => Some(&mut self.def),
            Stat::Spa => Some(&mut self.spa),
            Stat::Spd => Some(&mut self.spd),
            Stat::Spe => Some(&mut self.spe),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }

    /// Overwrite the five battle stats with the exact values from a request
    pub fn set_exact(&mut self, stats: &PokemonStats) {
        self.atk = StatRange::exact(stats.atk);
        self.def = StatRange::exact(stats.def);
        self.spa = StatRange::exact(stats.spa);
        self.spd = StatRange::exact(stats.spd);
        self.spe = StatRange::exact(stats.spe);
    }

    pub fn is_known(&self) -> bool {
        self.hp.known && Stat::BATTLE.iter().all(|&stat| self.get(stat).known)
    }

    pub fn is_empty(&self) -> bool {
        self.hp.is_empty() && Stat::BATTLE.iter().all(|&stat| self.get(stat).is_empty())
    }
}
