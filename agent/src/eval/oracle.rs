//! Damage oracle: raw damage for synthetic models

use zoroark_battle::dex::MoveCategory;
use zoroark_battle::{StatStages, Status, Terrain, Type, Weather};
use zoroark_protocol::GameType;

use super::models::{CombatantModel, FieldModel, MoveModel};

/// Raw damage bounds in HP points and the move's effective priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OracleDamage {
    pub min: u32,
    pub max: u32,
    pub priority: i8,
}

/// Computes damage for one move against one target.
///
/// Implementations must be pure: the same models always give the same
/// answer. Plug in a full calculator here; [`FormulaOracle`] is the built-in
/// fallback.
pub trait DamageOracle: Send + Sync {
    fn calculate(
        &self,
        attacker: &CombatantModel,
        defender: &CombatantModel,
        used: &MoveModel,
        field: &FieldModel,
    ) -> OracleDamage;
}

const ONE: u32 = 4096;

/// Divide with the cartridge rounding: exactly one half rounds down
fn pokeround(value: u64, divisor: u64) -> u32 {
    let quotient = value / divisor;
    if value % divisor > divisor / 2 {
        (quotient + 1) as u32
    } else {
        quotient as u32
    }
}

fn apply(value: u32, modifier: u32) -> u32 {
    if modifier == ONE {
        return value;
    }
    pokeround(value as u64 * modifier as u64, ONE as u64)
}

/// Chain 4096-scale modifiers, rounding after each step
fn chain(modifiers: &[u32]) -> u32 {
    modifiers
        .iter()
        .fold(ONE, |acc, &m| ((acc as u64 * m as u64 + 2048) >> 12) as u32)
}

/// Simplified generation 5+ damage formula.
///
/// Covers the type chart, STAB, weather, terrain, burn, screens, stat stages,
/// a handful of damage-relevant abilities and items, and the 85-100% roll.
/// Critical hits are never assumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaOracle;

impl FormulaOracle {
    fn priority(attacker: &CombatantModel, used: &MoveModel, field: &FieldModel) -> i8 {
        let mut priority = used.priority;
        match attacker.ability.as_deref() {
            Some("prankster") if used.category == MoveCategory::Status => priority += 1,
            Some("galewings") if used.move_type == Type::Flying && attacker.hp_percent == 100 => {
                priority += 1
            }
            Some("triage") if used.flags.heal => priority += 3,
            _ => {}
        }
        if used.id == "grassyglide" && field.terrain == Some(Terrain::Grassy) && attacker.grounded
        {
            priority += 1;
        }
        priority
    }

    fn ability_immune(defender: &CombatantModel, used: &MoveModel, effectiveness: f32) -> bool {
        match defender.ability.as_deref() {
            Some("flashfire" | "wellbakedbody") => used.move_type == Type::Fire,
            Some("waterabsorb" | "stormdrain" | "dryskin") => used.move_type == Type::Water,
            Some("voltabsorb" | "lightningrod" | "motordrive") => used.move_type == Type::Electric,
            Some("sapsipper") => used.move_type == Type::Grass,
            Some("eartheater") => used.move_type == Type::Ground,
            Some("soundproof") => used.flags.sound,
            Some("wonderguard") => effectiveness <= 1.0,
            _ => false,
        }
    }
}

impl DamageOracle for FormulaOracle {
    fn calculate(
        &self,
        attacker: &CombatantModel,
        defender: &CombatantModel,
        used: &MoveModel,
        field: &FieldModel,
    ) -> OracleDamage {
        let priority = Self::priority(attacker, used, field);
        let none = OracleDamage {
            min: 0,
            max: 0,
            priority,
        };
        if !used.is_damaging() {
            return none;
        }

        let effectiveness = if used.move_type == Type::Ground && !defender.grounded {
            0.0
        } else {
            used.move_type.effectiveness_multi(&defender.types)
        };
        if effectiveness == 0.0 || Self::ability_immune(defender, used, effectiveness) {
            return none;
        }
        if priority > 0 && field.terrain == Some(Terrain::Psychic) && defender.grounded {
            return none;
        }

        let physical = used.category == MoveCategory::Physical;

        // Attack side
        let (attack_source, attack_stage) = match used.id.as_str() {
            "foulplay" => (defender.stats.atk, defender.boosts.atk),
            "bodypress" => (attacker.stats.def, attacker.boosts.def),
            _ if physical => (attacker.stats.atk, attacker.boosts.atk),
            _ => (attacker.stats.spa, attacker.boosts.spa),
        };
        let attack_stage = if defender.has_ability("unaware") {
            0
        } else {
            attack_stage
        };
        let mut attack = (attack_source as f64 * StatStages::multiplier(attack_stage)) as u32;
        match attacker.ability.as_deref() {
            Some("hugepower" | "purepower") if physical => attack *= 2,
            Some("hustle") if physical => attack = apply(attack, 6144),
            Some("guts") if physical && attacker.status.is_some() => attack = apply(attack, 6144),
            _ => {}
        }
        match attacker.item.as_deref() {
            Some("choiceband") if physical => attack = apply(attack, 6144),
            Some("choicespecs") if !physical => attack = apply(attack, 6144),
            _ => {}
        }

        // Defense side
        let hits_defense =
            physical || matches!(used.id.as_str(), "psyshock" | "psystrike" | "secretsword");
        let hits_defense = hits_defense != field.wonder_room;
        let (defense_source, defense_stage) = if hits_defense {
            (defender.stats.def, defender.boosts.def)
        } else {
            (defender.stats.spd, defender.boosts.spd)
        };
        let defense_stage = if attacker.has_ability("unaware") {
            0
        } else {
            defense_stage
        };
        let mut defense =
            ((defense_source as f64 * StatStages::multiplier(defense_stage)) as u32).max(1);
        if defender.has_item("eviolite") || (!hits_defense && defender.has_item("assaultvest")) {
            defense = apply(defense, 6144);
        }
        let weather_guard = match field.weather {
            Some(Weather::Sand) => !hits_defense && defender.types.contains(&Type::Rock),
            Some(Weather::Snow) => hits_defense && defender.types.contains(&Type::Ice),
            _ => false,
        };
        if weather_guard {
            defense = apply(defense, 6144);
        }

        let mut power = used.base_power;
        if attacker.has_ability("technician") && power <= 60 {
            power = apply(power, 6144);
        }
        if field.attacker_side.helping_hand {
            power = apply(power, 6144);
        }
        if attacker.grounded {
            let boosted = match field.terrain {
                Some(Terrain::Electric) => used.move_type == Type::Electric,
                Some(Terrain::Grassy) => used.move_type == Type::Grass,
                Some(Terrain::Psychic) => used.move_type == Type::Psychic,
                _ => false,
            };
            if boosted {
                power = apply(power, if field.generation >= 8 { 5325 } else { 6144 });
            }
        }
        if field.terrain == Some(Terrain::Misty)
            && defender.grounded
            && used.move_type == Type::Dragon
        {
            power = apply(power, 2048);
        }

        let level_factor = 2 * attacker.level as u64 / 5 + 2;
        let mut base =
            (level_factor * power as u64 * attack as u64 / defense as u64 / 50) as u32 + 2;

        if used.target.is_spread() && field.game_type != GameType::Singles {
            base = apply(base, 3072);
        }
        match field.weather {
            Some(w) if w.is_sun() && used.move_type == Type::Fire => base = apply(base, 6144),
            Some(w) if w.is_sun() && used.move_type == Type::Water => base = apply(base, 2048),
            Some(w) if w.is_rain() && used.move_type == Type::Water => base = apply(base, 6144),
            Some(w) if w.is_rain() && used.move_type == Type::Fire => base = apply(base, 2048),
            _ => {}
        }

        let stab = if attacker.stab_types.contains(&used.move_type) {
            let doubled = attacker.has_ability("adaptability")
                || (attacker.terastallized
                    && attacker.types.contains(&used.move_type)
                    && attacker.base_types.contains(&used.move_type));
            if doubled { 8192 } else { 6144 }
        } else {
            ONE
        };

        let mut finals = Vec::new();
        let screened = if physical {
            field.defender_side.reflect || field.defender_side.aurora_veil
        } else {
            field.defender_side.light_screen || field.defender_side.aurora_veil
        };
        if screened && !attacker.has_ability("infiltrator") {
            finals.push(if field.game_type == GameType::Singles { 2048 } else { 2732 });
        }
        let defender_ability = defender.ability.as_deref();
        if defender.hp_percent == 100
            && matches!(defender_ability, Some("multiscale" | "shadowshield"))
        {
            finals.push(2048);
        }
        if effectiveness > 1.0
            && matches!(defender_ability, Some("filter" | "solidrock" | "prismarmor"))
        {
            finals.push(3072);
        }
        if matches!(used.move_type, Type::Fire | Type::Ice) && defender.has_ability("thickfat") {
            finals.push(2048);
        }
        if used.flags.contact && defender.has_ability("fluffy") {
            finals.push(2048);
        }
        if effectiveness < 1.0 && attacker.has_ability("tintedlens") {
            finals.push(8192);
        }
        if effectiveness > 1.0 && attacker.has_item("expertbelt") {
            finals.push(4915);
        }
        if attacker.has_item("lifeorb") {
            finals.push(5324);
        }
        let final_modifier = chain(&finals);

        let roll = |percent: u32| {
            let mut damage = base * percent / 100;
            damage = apply(damage, stab);
            damage = (damage as f32 * effectiveness) as u32;
            if physical && attacker.status == Some(Status::Burn) && !attacker.has_ability("guts") {
                damage /= 2;
            }
            apply(damage, final_modifier).max(1)
        };

        OracleDamage {
            min: roll(85),
            max: roll(100),
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::models::{ModelStats, SideModel};
    use zoroark_battle::dex::MoveFlags;
    use zoroark_protocol::MoveTarget;

    fn model(types: Vec<Type>) -> CombatantModel {
        CombatantModel {
            species: String::new(),
            level: 100,
            stab_types: types.clone(),
            base_types: types.clone(),
            types,
            terastallized: false,
            stats: ModelStats {
                hp: 300,
                atk: 250,
                def: 200,
                spa: 250,
                spd: 200,
                spe: 200,
            },
            boosts: StatStages::default(),
            ability: None,
            item: None,
            status: None,
            hp_percent: 100,
            grounded: true,
            moves: Vec::new(),
        }
    }

    fn tackle(move_type: Type, base_power: u32) -> MoveModel {
        MoveModel {
            id: "testmove".to_string(),
            move_type,
            category: MoveCategory::Physical,
            base_power,
            priority: 0,
            target: MoveTarget::Normal,
            flags: MoveFlags::default(),
        }
    }

    fn field() -> FieldModel {
        FieldModel {
            generation: 9,
            game_type: GameType::Singles,
            weather: None,
            terrain: None,
            trick_room: false,
            magic_room: false,
            wonder_room: false,
            gravity: false,
            attacker_side: SideModel::default(),
            defender_side: SideModel::default(),
        }
    }

    #[test]
    fn test_pokeround_half_rounds_down() {
        assert_eq!(pokeround(6, 4), 1);
        assert_eq!(pokeround(7, 4), 2);
    }

    #[test]
    fn test_roll_bounds() {
        let damage = FormulaOracle.calculate(
            &model(vec![Type::Normal]),
            &model(vec![Type::Water]),
            &tackle(Type::Fighting, 80),
            &field(),
        );
        // floor(42 * 80 * 250 / 200 / 50) + 2 = 86
        assert_eq!(damage.max, 86);
        assert_eq!(damage.min, 86 * 85 / 100);
    }

    #[test]
    fn test_stab_and_effectiveness() {
        let attacker = model(vec![Type::Fighting]);
        let punch = tackle(Type::Fighting, 80);
        let neutral =
            FormulaOracle.calculate(&attacker, &model(vec![Type::Water]), &punch, &field());
        let weak = FormulaOracle.calculate(&attacker, &model(vec![Type::Normal]), &punch, &field());
        assert_eq!(neutral.max, 129);
        assert_eq!(weak.max, 258);
    }

    #[test]
    fn test_immunities() {
        let attacker = model(vec![Type::Normal]);
        let hit = |defender: &CombatantModel, move_type| {
            FormulaOracle
                .calculate(&attacker, defender, &tackle(move_type, 100), &field())
                .max
        };

        let mut flyer = model(vec![Type::Normal]);
        flyer.grounded = false;
        assert_eq!(hit(&flyer, Type::Ground), 0);
        assert_eq!(hit(&model(vec![Type::Ghost]), Type::Normal), 0);

        let mut absorber = model(vec![Type::Normal]);
        absorber.ability = Some("waterabsorb".to_string());
        assert_eq!(hit(&absorber, Type::Water), 0);
        assert!(hit(&absorber, Type::Fire) > 0);
    }

    #[test]
    fn test_burn_halves_physical() {
        let mut burned = model(vec![Type::Normal]);
        burned.status = Some(Status::Burn);
        let target = model(vec![Type::Water]);
        let punch = tackle(Type::Fighting, 80);
        let healthy =
            FormulaOracle.calculate(&model(vec![Type::Normal]), &target, &punch, &field());
        let weak = FormulaOracle.calculate(&burned, &target, &punch, &field());
        assert_eq!(weak.max, healthy.max / 2);
    }

    #[test]
    fn test_prankster_priority() {
        let mut attacker = model(vec![Type::Dark]);
        attacker.ability = Some("prankster".to_string());
        let mut status = tackle(Type::Dark, 0);
        status.category = MoveCategory::Status;
        let result =
            FormulaOracle.calculate(&attacker, &model(vec![Type::Normal]), &status, &field());
        assert_eq!(
            result,
            OracleDamage {
                min: 0,
                max: 0,
                priority: 1
            }
        );
    }
}
