//! The built-in move table behind [`super::ViabilityRegistry::standard`].

use std::collections::HashMap;

use zoroark_battle::dex::MoveCategory;
use zoroark_battle::{SideCondition, Status, Volatile};
use zoroark_protocol::Stat;

/// When a non-damaging move is worth using
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Raises the user's stats
    Boost(&'static [(Stat, i8)]),
    /// Restores the user's HP
    Heal,
    /// Heals fully and puts the user to sleep
    Rest,
    /// Cures the user's status, or the whole team's
    Cleanse { team: bool },
    /// Sets up a condition on the user's side
    SideCondition(SideCondition),
    Substitute,
    InflictStatus(Status),
    /// Lowers the target's stats
    Debuff(&'static [(Stat, i8)]),
    /// Puts a volatile condition on the target
    Volatile(Volatile),
    /// Entry hazard on the foe's side
    Hazard(SideCondition),
    /// Clears hazards from the user's side
    ClearHazards,
    Protect,
    ChangeAbility,
    ChangeItem,
    /// Returns damage taken from a move of the given category (any when `None`)
    Counter(Option<MoveCategory>),
    /// Switches out, handing over to the bench
    Pivot,
    Never,
}

const BOOSTS: &[(&str, &[(Stat, i8)])] = &[
    ("swordsdance", &[(Stat::Atk, 2)]),
    ("nastyplot", &[(Stat::Spa, 2)]),
    ("tailglow", &[(Stat::Spa, 3)]),
    ("dragondance", &[(Stat::Atk, 1), (Stat::Spe, 1)]),
    ("calmmind", &[(Stat::Spa, 1), (Stat::Spd, 1)]),
    ("bulkup", &[(Stat::Atk, 1), (Stat::Def, 1)]),
    ("quiverdance", &[(Stat::Spa, 1), (Stat::Spd, 1), (Stat::Spe, 1)]),
    ("victorydance", &[(Stat::Atk, 1), (Stat::Def, 1), (Stat::Spe, 1)]),
    (
        "shellsmash",
        &[
            (Stat::Atk, 2),
            (Stat::Spa, 2),
            (Stat::Spe, 2),
            (Stat::Def, -1),
            (Stat::Spd, -1),
        ],
    ),
    ("geomancy", &[(Stat::Spa, 2), (Stat::Spd, 2), (Stat::Spe, 2)]),
    ("filletaway", &[(Stat::Atk, 2), (Stat::Spa, 2), (Stat::Spe, 2)]),
    ("shiftgear", &[(Stat::Atk, 1), (Stat::Spe, 2)]),
    ("coil", &[(Stat::Atk, 1), (Stat::Def, 1), (Stat::Accuracy, 1)]),
    ("curse", &[(Stat::Atk, 1), (Stat::Def, 1), (Stat::Spe, -1)]),
    ("growth", &[(Stat::Atk, 1), (Stat::Spa, 1)]),
    ("workup", &[(Stat::Atk, 1), (Stat::Spa, 1)]),
    ("honeclaws", &[(Stat::Atk, 1), (Stat::Accuracy, 1)]),
    ("cosmicpower", &[(Stat::Def, 1), (Stat::Spd, 1)]),
    ("defendorder", &[(Stat::Def, 1), (Stat::Spd, 1)]),
    ("stockpile", &[(Stat::Def, 1), (Stat::Spd, 1)]),
    (
        "noretreat",
        &[
            (Stat::Atk, 1),
            (Stat::Def, 1),
            (Stat::Spa, 1),
            (Stat::Spd, 1),
            (Stat::Spe, 1),
        ],
    ),
    (
        "clangoroussoul",
        &[
            (Stat::Atk, 1),
            (Stat::Def, 1),
            (Stat::Spa, 1),
            (Stat::Spd, 1),
            (Stat::Spe, 1),
        ],
    ),
    ("bellydrum", &[(Stat::Atk, 6)]),
    ("irondefense", &[(Stat::Def, 2)]),
    ("acidarmor", &[(Stat::Def, 2)]),
    ("barrier", &[(Stat::Def, 2)]),
    ("cottonguard", &[(Stat::Def, 3)]),
    ("amnesia", &[(Stat::Spd, 2)]),
    ("agility", &[(Stat::Spe, 2)]),
    ("rockpolish", &[(Stat::Spe, 2)]),
    ("autotomize", &[(Stat::Spe, 2)]),
    ("howl", &[(Stat::Atk, 1)]),
    ("meditate", &[(Stat::Atk, 1)]),
    ("sharpen", &[(Stat::Atk, 1)]),
    ("harden", &[(Stat::Def, 1)]),
    ("withdraw", &[(Stat::Def, 1)]),
    ("defensecurl", &[(Stat::Def, 1)]),
    ("charge", &[(Stat::Spd, 1)]),
    ("doubleteam", &[(Stat::Evasion, 1)]),
    ("minimize", &[(Stat::Evasion, 2)]),
];

const DEBUFFS: &[(&str, &[(Stat, i8)])] = &[
    ("growl", &[(Stat::Atk, -1)]),
    ("charm", &[(Stat::Atk, -2)]),
    ("featherdance", &[(Stat::Atk, -2)]),
    ("tailwhip", &[(Stat::Def, -1)]),
    ("leer", &[(Stat::Def, -1)]),
    ("screech", &[(Stat::Def, -2)]),
    ("faketears", &[(Stat::Spd, -2)]),
    ("metalsound", &[(Stat::Spd, -2)]),
    ("eerieimpulse", &[(Stat::Spa, -2)]),
    ("confide", &[(Stat::Spa, -1)]),
    ("nobleroar", &[(Stat::Atk, -1), (Stat::Spa, -1)]),
    ("tickle", &[(Stat::Atk, -1), (Stat::Def, -1)]),
    ("scaryface", &[(Stat::Spe, -2)]),
    ("cottonspore", &[(Stat::Spe, -2)]),
    ("stringshot", &[(Stat::Spe, -2)]),
    ("sandattack", &[(Stat::Accuracy, -1)]),
    ("smokescreen", &[(Stat::Accuracy, -1)]),
    ("flash", &[(Stat::Accuracy, -1)]),
    ("kinesis", &[(Stat::Accuracy, -1)]),
];

/// The built-in rule table
pub(super) fn standard_rules() -> HashMap<&'static str, Rule> {
    let mut rules = HashMap::new();

    for (id, stats) in BOOSTS {
        rules.insert(*id, Rule::Boost(stats));
    }
    for (id, stats) in DEBUFFS {
        rules.insert(*id, Rule::Debuff(stats));
    }

    for id in [
        "recover",
        "softboiled",
        "roost",
        "slackoff",
        "milkdrink",
        "moonlight",
        "morningsun",
        "synthesis",
        "shoreup",
        "healorder",
        "lifedew",
        "junglehealing",
        "strengthsap",
        "wish",
    ] {
        rules.insert(id, Rule::Heal);
    }
    rules.insert("rest", Rule::Rest);
    rules.insert("refresh", Rule::Cleanse { team: false });
    rules.insert("healbell", Rule::Cleanse { team: true });
    rules.insert("aromatherapy", Rule::Cleanse { team: true });

    for (id, condition) in [
        ("reflect", SideCondition::Reflect),
        ("lightscreen", SideCondition::LightScreen),
        ("auroraveil", SideCondition::AuroraVeil),
        ("tailwind", SideCondition::Tailwind),
        ("safeguard", SideCondition::Safeguard),
        ("mist", SideCondition::Mist),
        ("luckychant", SideCondition::LuckyChant),
    ] {
        rules.insert(id, Rule::SideCondition(condition));
    }
    rules.insert("substitute", Rule::Substitute);

    for (id, status) in [
        ("thunderwave", Status::Paralysis),
        ("stunspore", Status::Paralysis),
        ("glare", Status::Paralysis),
        ("willowisp", Status::Burn),
        ("toxic", Status::BadPoison),
        ("poisonpowder", Status::Poison),
        ("poisongas", Status::Poison),
        ("spore", Status::Sleep),
        ("sleeppowder", Status::Sleep),
        ("hypnosis", Status::Sleep),
        ("sing", Status::Sleep),
        ("lovelykiss", Status::Sleep),
        ("grasswhistle", Status::Sleep),
    ] {
        rules.insert(id, Rule::InflictStatus(status));
    }

    for (id, volatile) in [
        ("taunt", Volatile::Taunt),
        ("encore", Volatile::Encore),
        ("disable", Volatile::Disable),
        ("torment", Volatile::Torment),
        ("leechseed", Volatile::LeechSeed),
        ("confuseray", Volatile::Confusion),
        ("supersonic", Volatile::Confusion),
        ("sweetkiss", Volatile::Confusion),
        ("teeterdance", Volatile::Confusion),
        ("swagger", Volatile::Confusion),
        ("flatter", Volatile::Confusion),
        ("attract", Volatile::Infatuation),
        ("yawn", Volatile::Yawn),
        ("meanlook", Volatile::Trapped),
        ("block", Volatile::Trapped),
        ("spiderweb", Volatile::Trapped),
    ] {
        rules.insert(id, Rule::Volatile(volatile));
    }

    for (id, hazard) in [
        ("spikes", SideCondition::Spikes),
        ("toxicspikes", SideCondition::ToxicSpikes),
        ("stealthrock", SideCondition::StealthRock),
        ("stickyweb", SideCondition::StickyWeb),
    ] {
        rules.insert(id, Rule::Hazard(hazard));
    }
    for id in ["defog", "tidyup", "courtchange"] {
        rules.insert(id, Rule::ClearHazards);
    }

    for id in [
        "protect",
        "detect",
        "kingsshield",
        "spikyshield",
        "banefulbunker",
        "obstruct",
        "silktrap",
        "burningbulwark",
        "endure",
    ] {
        rules.insert(id, Rule::Protect);
    }

    for id in [
        "worryseed",
        "simplebeam",
        "entrainment",
        "gastroacid",
        "skillswap",
        "roleplay",
        "doodle",
    ] {
        rules.insert(id, Rule::ChangeAbility);
    }
    for id in ["trick", "switcheroo", "bestow", "embargo", "corrosivegas"] {
        rules.insert(id, Rule::ChangeItem);
    }

    rules.insert("counter", Rule::Counter(Some(MoveCategory::Physical)));
    rules.insert("mirrorcoat", Rule::Counter(Some(MoveCategory::Special)));
    rules.insert("metalburst", Rule::Counter(None));
    rules.insert("comeuppance", Rule::Counter(None));

    for id in [
        "batonpass",
        "partingshot",
        "teleport",
        "shedtail",
        "chillyreception",
    ] {
        rules.insert(id, Rule::Pivot);
    }

    // Dark Void only works for one species
    for id in ["darkvoid", "splash", "celebrate", "holdhands"] {
        rules.insert(id, Rule::Never);
    }

    rules
}
