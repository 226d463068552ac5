//! Stat formulas (generation 3 onwards)

use super::BaseStats;
use crate::types::{StatKnowledge, StatRange};

/// HP stat. A base of 1 (Shedinja) always yields 1.
pub fn calc_hp(base: u32, level: u32, iv: u32, ev: u32) -> u32 {
    if base == 1 {
        return 1;
    }
    ((2 * base + iv + ev / 4) * level / 100) + level + 10
}

/// Non-HP stat; `nature` is in tenths (9 hindering, 10 neutral, 11 boosting)
pub fn calc_stat(base: u32, level: u32, iv: u32, ev: u32, nature: u32) -> u32 {
    let raw = ((2 * base + iv + ev / 4) * level / 100) + 5;
    raw * nature / 10
}

/// Bounds for every stat of an unseen set: 0 IV / 0 EV / hindering nature up
/// to 31 IV / 252 EV / boosting nature
pub fn estimate_stats(base: &BaseStats, level: u8) -> StatKnowledge {
    let level = level as u32;
    let range = |b: u32| {
        StatRange::estimated(calc_stat(b, level, 0, 0, 9), calc_stat(b, level, 31, 252, 11))
    };

    StatKnowledge {
        hp: StatRange::estimated(
            calc_hp(base.hp, level, 0, 0),
            calc_hp(base.hp, level, 31, 252),
        ),
        atk: range(base.atk),
        def: range(base.def),
        spa: range(base.spa),
        spd: range(base.spd),
        spe: range(base.spe),
    }
}
