//! Applying battle events to the tracked state

use tracing::{debug, trace};
use zoroark_protocol::{
    Attribution, BattleEvent, BattleRequest, Gimmick, HpStatus, MajorEvent, MinorEvent,
    MoveTarget, Player, Pokemon, PokemonDetails, Stat,
};

use super::battle::{CurrentAction, TrackedBattle};
use super::matching::{self, DEFAULT_DISGUISE, Resolution};
use crate::dex::{DexExt, effect_id, to_id};
use crate::query::{blocks_powder, blocks_status};
use crate::types::{
    ActiveState, EntryOrigin, HitOutcome, MoveKnowledge, PassKind, PokemonIdentity,
    PokemonState, SideCondition, Status, TransformSnapshot, Type, Volatile, VolatileData, Weather,
    move_entry,
};

const STAGED_STATS: [Stat; 7] = [
    Stat::Atk,
    Stat::Def,
    Stat::Spa,
    Stat::Spd,
    Stat::Spe,
    Stat::Accuracy,
    Stat::Evasion,
];

/// Effects that move an item from one pokemon to another
const ITEM_TRANSFERS: [&str; 7] = [
    "trick",
    "switcheroo",
    "thief",
    "covet",
    "bestow",
    "magician",
    "pickpocket",
];

/// Roster-level view of an identifier, for roster-wide effects
fn same_pokemon(a: &Pokemon, b: &Pokemon) -> bool {
    a.player == b.player && a.name == b.name
}

/// Trailing counter of effects such as "stockpile2" or "perish3"
fn trailing_digit(effect: &str) -> Option<u8> {
    effect
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}

fn weather_rock(weather: Weather) -> &'static str {
    match weather {
        Weather::Sun | Weather::HarshSun => "heatrock",
        Weather::Rain | Weather::HeavyRain => "damprock",
        Weather::Sand => "smoothrock",
        Weather::Hail | Weather::Snow => "icyrock",
        Weather::StrongWinds => "",
    }
}

impl TrackedBattle {
    /// Apply one event to the tracked state.
    ///
    /// Events naming unknown players, slots or roster entries leave the
    /// state untouched, so partial or reordered streams are tolerated.
    pub fn apply(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::Major(event) => self.apply_major(event),
            BattleEvent::Minor(event) => self.apply_minor(event),
        }
    }

    fn apply_major(&mut self, event: &MajorEvent) {
        match event {
            // === Battle initialization ===
            MajorEvent::Player { player, username } => {
                let side = self.get_or_create_side(*player, username);
                if !username.is_empty() {
                    side.username = username.clone();
                }
            }

            MajorEvent::TeamSize { player, size } => {
                self.get_or_create_side(*player, "").team_size = *size;
            }

            MajorEvent::GameType(game_type) => self.set_game_type(*game_type),

            MajorEvent::Gen(generation) => self.generation = *generation,

            MajorEvent::Tier(tier) => self.tier = tier.clone(),

            MajorEvent::Rule(rule) => {
                let name = rule.split(':').next().unwrap_or(rule);
                let id = to_id(name);
                if !id.is_empty() && !self.has_rule(&id) {
                    self.rules.push(id);
                }
            }

            MajorEvent::ClearPoke => self.clear_preview(),

            MajorEvent::Poke {
                player,
                details,
                has_item,
            } => self.handle_poke(*player, details, *has_item),

            MajorEvent::Start => self.started = true,

            MajorEvent::Request(request) => self.handle_request(request),

            // === Field composition ===
            MajorEvent::Switch {
                pokemon,
                details,
                hp_status,
            } => self.handle_switch(pokemon, details, hp_status.as_ref(), false),

            MajorEvent::Drag {
                pokemon,
                details,
                hp_status,
            } => self.handle_switch(pokemon, details, hp_status.as_ref(), true),

            MajorEvent::Replace {
                pokemon,
                details,
                hp_status,
            } => self.handle_replace(pokemon, details, hp_status.as_ref()),

            MajorEvent::DetailsChange {
                pokemon,
                details,
                hp_status,
            } => self.handle_details_change(pokemon, details, hp_status.as_ref()),

            MajorEvent::FormeChange {
                pokemon,
                species,
                hp_status,
                attribution,
            } => {
                let dex = self.dex_handle();
                let generation = self.generation;
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.pokemon.identity.species = species.clone();
                    matching::fill_from_dex(dex.as_ref(), generation, &mut active.pokemon);
                    if let Some(hp) = hp_status {
                        active.pokemon.apply_hp_status(hp);
                    }
                }
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MajorEvent::Faint(pokemon) => self.handle_faint(pokemon),

            MajorEvent::Swap { pokemon, position } => self.handle_swap(pokemon, *position),

            // === Actions ===
            MajorEvent::Move {
                pokemon,
                move_name,
                target,
                attribution,
                ..
            } => self.handle_move(pokemon, move_name, target.as_ref(), attribution),

            MajorEvent::Cant {
                pokemon,
                reason,
                move_name,
            } => self.handle_cant(pokemon, reason, move_name.as_deref()),

            // === Progress ===
            MajorEvent::Turn(turn) => self.handle_turn(*turn),

            MajorEvent::Win(winner) => {
                debug!(winner = %winner, turn = self.turn, "battle won");
                self.ended = true;
                self.winner = Some(winner.clone());
                self.current_action = None;
            }

            MajorEvent::Tie => {
                debug!(turn = self.turn, "battle tied");
                self.ended = true;
                self.tie = true;
                self.current_action = None;
            }

            MajorEvent::TeamPreview(_) | MajorEvent::Upkeep => {
                trace!(?event, "nothing to track");
            }
        }
    }

    fn apply_minor(&mut self, event: &MinorEvent) {
        match event {
            // === HP ===
            MinorEvent::Damage {
                pokemon,
                hp_status,
                attribution,
            } => self.handle_damage(pokemon, hp_status.as_ref(), attribution),

            MinorEvent::Heal {
                pokemon,
                hp_status,
                attribution,
            } => {
                self.apply_hp(pokemon, hp_status.as_ref());
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::SetHp { pokemon, hp_status } => self.apply_hp(pokemon, hp_status.as_ref()),

            // === Status ===
            MinorEvent::Status {
                pokemon,
                status,
                attribution,
            } => {
                let parsed = Status::from_protocol(status);
                if let Some(active) = self.active_of_mut(pokemon) {
                    match parsed {
                        Some(Status::Sleep) => active.sleep_turns = 0,
                        Some(Status::BadPoison) => active.toxic_turns = 0,
                        _ => {}
                    }
                }
                if let Some(state) = self.pokemon_of_mut(pokemon) {
                    state.status = parsed;
                }
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::CureStatus {
                pokemon,
                status,
                attribution,
            } => {
                if status == "slp"
                    && let Some(active) = self.active_of_mut(pokemon)
                {
                    active.sleep_turns = 0;
                }
                if let Some(state) = self.pokemon_of_mut(pokemon) {
                    state.status = None;
                }
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::CureTeam(pokemon) => {
                if let Some(side) = self.get_side_mut(pokemon.player) {
                    for entry in &mut side.pokemon {
                        entry.status = None;
                    }
                    for active in side.active.iter_mut().flatten() {
                        active.pokemon.status = None;
                    }
                }
            }

            // === Boosts ===
            MinorEvent::Boost {
                pokemon,
                stat,
                amount,
                attribution,
            } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.boost(*stat, *amount);
                }
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::Unboost {
                pokemon,
                stat,
                amount,
                attribution,
            } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.unboost(*stat, *amount);
                }
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::SetBoost {
                pokemon,
                stat,
                amount,
            } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.set(*stat, *amount);
                }
            }

            MinorEvent::ClearBoost(pokemon) => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.clear();
                }
            }

            MinorEvent::ClearAllBoost => {
                for side in self.sides_mut() {
                    for active in side.active.iter_mut().flatten() {
                        active.boosts.clear();
                    }
                }
            }

            MinorEvent::ClearPositiveBoost { target, .. } => {
                if let Some(active) = self.active_of_mut(target) {
                    active.boosts.clear_positive();
                }
            }

            MinorEvent::ClearNegativeBoost(pokemon) => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.clear_negative();
                }
            }

            MinorEvent::InvertBoost(pokemon) => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.boosts.invert();
                }
            }

            MinorEvent::CopyBoost { source, target } => {
                // The source takes on the target's stages (Psych Up)
                if let Some(boosts) = self.active_of(target).map(|a| a.boosts)
                    && let Some(active) = self.active_of_mut(source)
                {
                    active.boosts = boosts;
                }
            }

            MinorEvent::SwapBoost {
                source,
                target,
                stats,
            } => self.swap_boosts(source, target, stats),

            // === Items and abilities ===
            MinorEvent::Item {
                pokemon,
                item,
                attribution,
            } => self.handle_item(pokemon, item, attribution),

            MinorEvent::EndItem { pokemon, item, .. } => {
                if let Some(state) = self.pokemon_of_mut(pokemon) {
                    state.item.remove(item);
                }
            }

            MinorEvent::Ability {
                pokemon,
                ability,
                attribution,
            } => self.handle_ability(pokemon, ability, attribution),

            MinorEvent::EndAbility {
                pokemon,
                attribution,
            } => {
                let suppressed = attribution
                    .from
                    .as_deref()
                    .is_none_or(|from| effect_id(from) == "gastroacid");
                if suppressed && let Some(active) = self.active_of_mut(pokemon) {
                    active.add_volatile(Volatile::GastroAcid, VolatileData::None);
                }
                self.refresh_neutralizing_gas();
            }

            // === Transformations and power-ups ===
            MinorEvent::Transform {
                pokemon,
                target,
                attribution,
            } => {
                self.handle_transform(pokemon, target);
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::Mega { pokemon, megastone } => {
                if let Some(state) = self.pokemon_of_mut(pokemon) {
                    state.mega_evolved = true;
                    if let Some(stone) = megastone {
                        state.item.reveal(stone);
                    }
                }
                self.mark_gimmick(pokemon.player, Gimmick::Mega);
            }

            MinorEvent::Burst { pokemon, species } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.pokemon.identity.species = species.clone();
                }
                self.mark_gimmick(pokemon.player, Gimmick::UltraBurst);
            }

            MinorEvent::ZPower(pokemon) => self.mark_gimmick(pokemon.player, Gimmick::ZMove),

            MinorEvent::Terastallize { pokemon, tera_type } => {
                if let Some(state) = self.pokemon_of_mut(pokemon) {
                    state.terastallized = true;
                    state.tera_type = Type::from_protocol(tera_type).or(state.tera_type);
                }
                self.mark_gimmick(pokemon.player, Gimmick::Terastallize);
            }

            // === Volatiles ===
            MinorEvent::Start {
                pokemon,
                effect,
                detail,
                attribution,
            } => {
                self.handle_start(pokemon, effect, detail.as_deref());
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::End {
                pokemon,
                effect,
                attribution,
            } => {
                self.handle_end(pokemon, effect);
                self.reveal_attribution(Some(pokemon), attribution);
            }

            MinorEvent::SingleTurn { pokemon, effect } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.turn_status.insert(Volatile::from_protocol(effect));
                }
            }

            MinorEvent::SingleMove { pokemon, effect } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.move_status.insert(Volatile::from_protocol(effect));
                }
            }

            MinorEvent::Activate {
                pokemon,
                effect,
                details,
                attribution,
            } => self.handle_activate(pokemon.as_ref(), effect, details, attribution),

            // === Side and field ===
            MinorEvent::SideStart {
                side, condition, ..
            } => {
                let Some(condition) = SideCondition::from_protocol(condition) else {
                    trace!(condition = %condition, "untracked side condition");
                    return;
                };
                let turn = self.turn;
                let extended = condition.is_screen() && self.action_user_holds("lightclay");
                if let Some(side) = self.get_side_mut(side.player) {
                    side.add_condition(condition, turn);
                    if extended && let Some(state) = side.conditions.get_mut(&condition) {
                        state.duration = Some(8);
                    }
                }
            }

            MinorEvent::SideEnd {
                side, condition, ..
            } => {
                if let Some(condition) = SideCondition::from_protocol(condition)
                    && let Some(side) = self.get_side_mut(side.player)
                {
                    side.remove_condition(condition);
                }
            }

            MinorEvent::SwapSideConditions => self.swap_side_conditions(),

            MinorEvent::FieldStart {
                condition,
                attribution,
            } => {
                let had_terrain = self.field.terrain;
                self.field.apply_field_start(condition);
                if self.field.terrain.is_some()
                    && self.field.terrain != had_terrain
                    && self.setter_holds(attribution, "terrainextender")
                {
                    self.field.terrain_turns = Some(8);
                }
                self.reveal_attribution(None, attribution);
            }

            MinorEvent::FieldEnd { condition } => self.field.apply_field_end(condition),

            MinorEvent::Weather {
                weather,
                upkeep,
                attribution,
            } => {
                self.field.set_weather(weather, *upkeep);
                if !upkeep
                    && let Some(current) = self.field.weather
                    && self.setter_holds(attribution, weather_rock(current))
                {
                    self.field.weather_turns = Some(8);
                }
                self.reveal_attribution(None, attribution);
            }

            // === Move outcomes ===
            MinorEvent::Crit(pokemon) => self.record_hit(pokemon, |hit| hit.crit = true),

            MinorEvent::Miss { target, .. } => {
                if let Some(target) = target {
                    self.record_hit(target, |hit| hit.miss = true);
                }
            }

            MinorEvent::Immune {
                pokemon,
                attribution,
            } => {
                self.record_hit(pokemon, |hit| hit.immune = true);
                if attribution.is_empty() {
                    self.infer_disguise_from_immunity(pokemon);
                } else {
                    self.reveal_attribution(Some(pokemon), attribution);
                }
            }

            MinorEvent::Prepare {
                pokemon, move_name, ..
            } => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.add_volatile(Volatile::Charging, VolatileData::Move(to_id(move_name)));
                }
            }

            MinorEvent::MustRecharge(pokemon) => {
                if let Some(active) = self.active_of_mut(pokemon) {
                    active.add_volatile(Volatile::Recharging, VolatileData::None);
                }
            }

            MinorEvent::Primal(_)
            | MinorEvent::SuperEffective(_)
            | MinorEvent::Resisted(_)
            | MinorEvent::Fail { .. }
            | MinorEvent::Block { .. }
            | MinorEvent::NoTarget(_)
            | MinorEvent::HitCount { .. } => {
                trace!(?event, "nothing to track");
            }
        }
    }

    // === Team preview and requests ===

    fn clear_preview(&mut self) {
        for side in self.sides_mut() {
            side.preview.clear();
            // Placeholders from an earlier preview go; sighted entries stay
            side.pokemon.retain(|p| p.revealed);
            for (index, entry) in side.pokemon.iter_mut().enumerate() {
                entry.index = index;
            }
        }
    }

    fn handle_poke(&mut self, player: Player, details: &PokemonDetails, has_item: bool) {
        let dex = self.dex_handle();
        let generation = self.generation;
        let side = self.get_or_create_side(player, "");

        let mut identity = PokemonIdentity::new(&details.species, &details.species, 100);
        identity.apply_details(details);
        side.preview.push(identity);

        if side
            .pokemon
            .iter()
            .any(|p| p.identity.species_matches(&details.species) || p.species() == details.species)
        {
            return;
        }

        let index = matching::push_entry(side, &details.species, details);
        let entry = &mut side.pokemon[index];
        if !has_item {
            entry.item.set_known("");
        }
        matching::fill_from_dex(dex.as_ref(), generation, entry);
    }

    fn handle_request(&mut self, request: &BattleRequest) {
        if let Some(info) = &request.side
            && let Some(player) = info.player()
        {
            self.set_perspective(player);
            self.get_or_create_side(player, &info.name);
        }
        // Merged into the roster by `reconcile` once a decision is due
        self.request = Some(request.clone());
    }

    // === Field composition ===

    fn handle_switch(
        &mut self,
        pokemon: &Pokemon,
        details: &PokemonDetails,
        hp_status: Option<&HpStatus>,
        forced: bool,
    ) {
        let Some(slot) = pokemon.slot() else {
            trace!(%pokemon, "switch without a position");
            return;
        };
        let dex = self.dex_handle();
        let generation = self.generation;
        let turn = self.turn;
        let opposing = self.perspective() != Some(pokemon.player);

        let side = self.get_or_create_side(pokemon.player, "");
        if slot >= side.active.len() {
            trace!(%pokemon, slot, "switch into a slot the game type does not have");
            return;
        }

        let outgoing = side.take_active(slot);
        let (boosts, volatiles) = match outgoing.as_ref() {
            Some(active) if !forced => active
                .pass
                .map(|kind| active.passed_state(kind))
                .unwrap_or_default(),
            _ => Default::default(),
        };

        let (index, origin, copy, guess) =
            match matching::resolve_entry(side, &pokemon.name, details, slot) {
                Resolution::Entry(index, origin) => {
                    let entry = &mut side.pokemon[index];
                    let species_changed = entry.identity.species != details.species;
                    entry.identity.name = pokemon.name.clone();
                    entry.identity.apply_details(details);
                    if let Some(hp) = hp_status {
                        entry.apply_hp_status(hp);
                    }
                    entry.revealed = true;
                    entry.active = true;
                    entry.active_slot = Some(slot);
                    if species_changed || entry.base_types.is_empty() {
                        matching::fill_from_dex(dex.as_ref(), generation, entry);
                    }
                    (index, origin, entry.clone(), None)
                }
                Resolution::Disguised { impersonating } => {
                    let guess = matching::disguise_guess(side, impersonating, DEFAULT_DISGUISE);
                    debug!(
                        %pokemon,
                        species = %guess.species,
                        "switch-in cannot be who it claims to be"
                    );
                    // A full roster gains no entries
                    let index = guess
                        .roster_index
                        .or(impersonating)
                        .unwrap_or(ActiveState::UNBOUND);
                    if let Some(true_index) = guess.roster_index {
                        let entry = &mut side.pokemon[true_index];
                        entry.active = true;
                        entry.active_slot = Some(slot);
                    }

                    let mut copy = PokemonState::from_details(&pokemon.name, details);
                    copy.index = index;
                    if let Some(hp) = hp_status {
                        copy.apply_hp_status(hp);
                    }
                    matching::fill_from_dex(dex.as_ref(), generation, &mut copy);
                    (index, EntryOrigin::Existing, copy, Some(guess))
                }
            };

        let can_disguise = copy.can_disguise;
        let mut active = ActiveState::new(index, copy, turn, origin);
        active.displayed_name = pokemon.name.clone();
        active.boosts = boosts;
        active.volatiles.extend(volatiles);
        match guess {
            Some(guess) => active.set_disguise(guess),
            None => {
                active.maybe_disguised = opposing && !can_disguise && side.may_hide_disguise();
            }
        }
        side.active[slot] = Some(active);

        self.refresh_neutralizing_gas();
    }

    fn handle_replace(
        &mut self,
        pokemon: &Pokemon,
        details: &PokemonDetails,
        hp_status: Option<&HpStatus>,
    ) {
        let Some(slot) = pokemon.slot() else {
            return;
        };
        let dex = self.dex_handle();
        let generation = self.generation;
        let Some(side) = self.get_side_mut(pokemon.player) else {
            trace!(%pokemon, "replace on an unknown side");
            return;
        };
        let Some(mut active) = side.active.get_mut(slot).and_then(Option::take) else {
            trace!(%pokemon, "replace on an empty slot");
            return;
        };

        // Undo what the switch-in did to the entry it appeared to be
        match active.disguise() {
            Some(guess) => {
                if let Some(entry) = guess.roster_index.and_then(|i| side.pokemon.get_mut(i)) {
                    entry.active = false;
                    entry.active_slot = None;
                }
            }
            None => {
                if let Some(entry) = side.pokemon.get_mut(active.roster_index) {
                    entry.active = false;
                    entry.active_slot = None;
                    match &active.origin {
                        EntryOrigin::Existing => {}
                        EntryOrigin::Created => entry.revealed = false,
                        EntryOrigin::Claimed(previous) => {
                            entry.identity = previous.clone();
                            entry.revealed = false;
                        }
                    }
                }
            }
        }

        let index = match matching::resolve_entry(side, &pokemon.name, details, slot) {
            Resolution::Entry(index, _) => index,
            Resolution::Disguised { .. } => matching::push_entry(side, &pokemon.name, details),
        };

        let entry = &mut side.pokemon[index];
        let species_changed = entry.identity.species != details.species;
        entry.identity.name = pokemon.name.clone();
        entry.identity.apply_details(details);
        if let Some(hp) = hp_status {
            entry.apply_hp_status(hp);
        }
        entry.revealed = true;
        entry.active = true;
        entry.active_slot = Some(slot);
        if species_changed || entry.base_types.is_empty() {
            matching::fill_from_dex(dex.as_ref(), generation, entry);
        }
        if entry.can_disguise {
            entry.ability.reveal("Illusion");
        }

        // Moves shown while disguised belong to the true pokemon
        for id in &active.stint_moves {
            if let Some(shown) = active.pokemon.find_move(id) {
                let record = move_entry(&mut entry.moves, &shown.name, shown.max_pp);
                record.revealed = true;
                record.pp = shown.pp.min(record.max_pp);
            }
        }
        if active.pokemon.item.revealed {
            entry.item = active.pokemon.item.clone();
        }

        debug!(%pokemon, species = %details.species, "disguise dropped");
        active.pokemon = entry.clone();
        active.roster_index = index;
        active.displayed_name = pokemon.name.clone();
        active.origin = EntryOrigin::Existing;
        active.maybe_disguised = false;
        active.remove_volatile(&Volatile::Illusion);
        side.active[slot] = Some(active);
    }

    fn handle_details_change(
        &mut self,
        pokemon: &Pokemon,
        details: &PokemonDetails,
        hp_status: Option<&HpStatus>,
    ) {
        let dex = self.dex_handle();
        let generation = self.generation;
        let Some(slot) = self.slot_of(pokemon) else {
            trace!(%pokemon, "details change for a pokemon not on the field");
            return;
        };
        let Some(side) = self.get_side_mut(pokemon.player) else {
            return;
        };
        let Some(active) = side.active.get_mut(slot).and_then(Option::as_mut) else {
            return;
        };

        active.pokemon.identity.apply_details(details);
        matching::fill_from_dex(dex.as_ref(), generation, &mut active.pokemon);
        if let Some(hp) = hp_status {
            active.pokemon.apply_hp_status(hp);
        }
        if active.is_disguised() {
            return;
        }

        // Permanent: the roster entry changes too
        if let Some(entry) = side.pokemon.get_mut(active.roster_index) {
            entry.identity.apply_details(details);
            matching::fill_from_dex(dex.as_ref(), generation, entry);
        }
    }

    fn handle_faint(&mut self, pokemon: &Pokemon) {
        let slot = self.slot_of(pokemon);
        let turn = self.turn;
        let Some(side) = self.get_side_mut(pokemon.player) else {
            return;
        };

        match slot {
            Some(slot) => {
                if let Some(active) = side.active_mut(slot) {
                    active.pokemon.fainted = true;
                    active.pokemon.hp_current = 0;
                    active.pokemon.status = None;
                }
                side.take_active(slot);
            }
            None => {
                let Some(entry) = side
                    .find_pokemon(&pokemon.name)
                    .and_then(|index| side.pokemon.get_mut(index))
                else {
                    trace!(%pokemon, "faint of an unknown pokemon");
                    return;
                };
                entry.fainted = true;
                entry.hp_current = 0;
                entry.status = None;
            }
        }

        side.fainted_count += 1;
        side.last_faint_turn = Some(turn);
        self.refresh_neutralizing_gas();
    }

    fn handle_swap(&mut self, pokemon: &Pokemon, position: usize) {
        let Some(from) = self.slot_of(pokemon) else {
            trace!(%pokemon, "swap for a pokemon not on the field");
            return;
        };
        let Some(side) = self.get_side_mut(pokemon.player) else {
            return;
        };
        if position >= side.active.len() || position == from {
            return;
        }

        side.active.swap(from, position);
        for slot in [from, position] {
            let Some(active) = side.active[slot].as_mut() else {
                continue;
            };
            active.pokemon.active_slot = Some(slot);
            if !active.is_disguised()
                && let Some(entry) = side.pokemon.get_mut(active.roster_index)
            {
                entry.active_slot = Some(slot);
            }
        }
    }

    // === Actions ===

    fn handle_move(
        &mut self,
        pokemon: &Pokemon,
        move_name: &str,
        target: Option<&Pokemon>,
        attribution: &Attribution,
    ) {
        let move_id = to_id(move_name);
        let called_by = attribution.from.as_deref().map(effect_id);
        let pressure = match called_by {
            Some(_) => 0,
            None => self.pressure_count(pokemon, target, move_name),
        };
        let dex = self.dex_handle();
        let generation = self.generation;
        let turn = self.turn;

        let Some(active) = self.active_of_mut(pokemon) else {
            trace!(%pokemon, move_name, "move from a pokemon not on the field");
            return;
        };

        active.move_status.clear();
        active.hits.clear();
        let charged = matches!(
            active.remove_volatile(&Volatile::Charging),
            Some(VolatileData::Move(ref id)) if *id == move_id
        );

        let max_pp = if active.is_transformed() {
            5
        } else {
            dex.move_or_default(generation, move_name).max_pp()
        };

        match called_by.as_deref() {
            None if move_id == "struggle" => active.record_repeat(&move_id),
            None => {
                let record = move_entry(active.effective_moves_mut(), move_name, max_pp);
                record.revealed = true;
                if !charged {
                    record.deduct(1 + pressure);
                }
                active.record_stint_move(&move_id);
                active.record_repeat(&move_id);
            }
            // Called from the user's own move set without spending PP
            Some("sleeptalk") | Some("lockedmove") => {
                move_entry(active.effective_moves_mut(), move_name, max_pp).revealed = true;
                active.record_stint_move(&move_id);
                if called_by.as_deref() == Some("lockedmove") {
                    active.record_repeat(&move_id);
                }
            }
            Some(other) => trace!(move_name, called_by = other, "called move"),
        }

        match move_id.as_str() {
            "batonpass" => active.pass = Some(PassKind::BatonPass),
            "shedtail" => active.pass = Some(PassKind::ShedTail),
            _ => {}
        }

        self.current_action = Some(CurrentAction {
            user: pokemon.clone(),
            move_id: move_id.clone(),
        });

        if called_by.is_none()
            && let Some(condition) = SideCondition::from_protocol(&move_id)
            && condition.is_delayed()
            && let Some(side) = self.get_side_mut(pokemon.player)
        {
            side.add_condition(condition, turn);
        }
    }

    /// Extra PP a move costs because of opposing Pressure users
    fn pressure_count(&self, user: &Pokemon, target: Option<&Pokemon>, move_name: &str) -> u32 {
        if self.field.neutralizing_gas {
            return 0;
        }
        let has_pressure =
            |a: &ActiveState| a.pokemon.ability.is("pressure") && !a.ability_suppressed();

        match self.dex().move_or_default(self.generation, move_name).target {
            MoveTarget::User
            | MoveTarget::AdjacentAlly
            | MoveTarget::AdjacentAllyOrSelf
            | MoveTarget::Allies
            | MoveTarget::AllySide
            | MoveTarget::AllyTeam => 0,
            MoveTarget::AllAdjacent
            | MoveTarget::AllAdjacentFoes
            | MoveTarget::FoeSide
            | MoveTarget::All => self
                .all_active()
                .filter(|(player, _, a)| self.is_foe(user.player, *player) && has_pressure(a))
                .count() as u32,
            _ => target
                .filter(|t| self.is_foe(user.player, t.player))
                .and_then(|t| self.active_of(t))
                .map_or(0, |a| has_pressure(a) as u32),
        }
    }

    fn handle_cant(&mut self, pokemon: &Pokemon, reason: &str, move_name: Option<&str>) {
        let dex = self.dex_handle();
        let generation = self.generation;
        self.current_action = None;

        if let Some(ability) = reason.strip_prefix("ability: ")
            && let Some(state) = self.pokemon_of_mut(pokemon)
        {
            state.ability.reveal(ability);
        }

        let Some(active) = self.active_of_mut(pokemon) else {
            return;
        };
        match effect_id(reason).as_str() {
            "slp" => {
                active.sleep_turns = active.sleep_turns.saturating_add(1);
                active.pokemon.sleep_turns_total =
                    active.pokemon.sleep_turns_total.saturating_add(1);
            }
            "recharge" => {
                active.remove_volatile(&Volatile::Recharging);
            }
            _ => {}
        }

        if let Some(name) = move_name {
            let max_pp = dex.move_or_default(generation, name).max_pp();
            move_entry(active.effective_moves_mut(), name, max_pp).revealed = true;
        }
    }

    fn handle_turn(&mut self, turn: u32) {
        self.current_action = None;
        if turn <= self.turn {
            trace!(turn, current = self.turn, "stale turn marker");
            return;
        }

        self.turn = turn;
        for side in self.sides_mut() {
            for active in side.active.iter_mut().flatten() {
                active.end_turn();
                active.pass = None;
            }
            side.decrement_conditions();
        }
        self.field.decrement();
    }

    // === HP and hits ===

    fn apply_hp(&mut self, pokemon: &Pokemon, hp_status: Option<&HpStatus>) {
        if let Some(hp) = hp_status
            && let Some(state) = self.pokemon_of_mut(pokemon)
        {
            state.apply_hp_status(hp);
        }
    }

    fn handle_damage(
        &mut self,
        pokemon: &Pokemon,
        hp_status: Option<&HpStatus>,
        attribution: &Attribution,
    ) {
        let before = self.pokemon_of(pokemon).map(PokemonState::hp_percent);
        self.apply_hp(pokemon, hp_status);

        if !attribution.is_empty() {
            self.reveal_attribution(Some(pokemon), attribution);
            return;
        }

        if let Some(active) = self.active_of_mut(pokemon) {
            active.maybe_disguised = false;
        }

        let from_declared_move = self
            .current_action
            .as_ref()
            .is_some_and(|action| !same_pokemon(&action.user, pokemon));
        if !from_declared_move {
            return;
        }

        let after = self.pokemon_of(pokemon).map(PokemonState::hp_percent);
        let lost = before.unwrap_or(0).saturating_sub(after.unwrap_or(0));
        self.record_hit(pokemon, |hit| hit.damage += lost);
        if let Some(state) = self.pokemon_of_mut(pokemon) {
            state.times_hit += 1;
        }
    }

    /// Update the outcome of the declared move against `target`
    fn record_hit(&mut self, target: &Pokemon, update: impl FnOnce(&mut HitOutcome)) {
        let Some(action) = self.current_action.clone() else {
            return;
        };
        let key = format!("{}: {}", target.player, target.name);
        if let Some(user) = self.active_of_mut(&action.user) {
            update(user.hits.entry(key).or_default());
        }
    }

    // === Items and abilities ===

    /// Reveal an item or ability named by a `[from]` tag on its owner:
    /// `[of]` when present, else the subject
    fn reveal_attribution(&mut self, subject: Option<&Pokemon>, attribution: &Attribution) {
        let Some(owner) = attribution.of.as_ref().or(subject) else {
            return;
        };
        if let Some(item) = attribution.item() {
            if let Some(state) = self.pokemon_of_mut(owner) {
                state.item.reveal_from_effect(item);
            }
        } else if let Some(ability) = attribution.ability()
            && let Some(state) = self.pokemon_of_mut(owner)
        {
            state.ability.reveal_from_effect(ability);
        }
    }

    fn handle_item(&mut self, pokemon: &Pokemon, item: &str, attribution: &Attribution) {
        let transferred = attribution
            .from
            .as_deref()
            .map(effect_id)
            .is_some_and(|id| ITEM_TRANSFERS.contains(&id.as_str()));

        if let Some(state) = self.pokemon_of_mut(pokemon) {
            if transferred {
                state.item.swapped = true;
                state.item.set_known(item);
                state.item.revealed = true;
            } else {
                state.item.reveal(item);
            }
        }

        if let Some(ability) = attribution.ability() {
            // Frisk names the item of the subject; the ability is the frisker's
            let owner = match &attribution.of {
                Some(of) if effect_id(ability) == "frisk" => of,
                _ => pokemon,
            };
            if let Some(state) = self.pokemon_of_mut(owner) {
                state.ability.reveal(ability);
            }
        }
    }

    fn handle_ability(&mut self, pokemon: &Pokemon, ability: &str, attribution: &Attribution) {
        if let Some(source) = attribution.ability() {
            // Copied (Trace): the subject's own ability is the source
            if let Some(state) = self.pokemon_of_mut(pokemon) {
                state.ability.reveal_from_effect(source);
                state.ability.current = Some(to_id(ability));
            }
            if let Some(of) = &attribution.of
                && let Some(state) = self.pokemon_of_mut(of)
            {
                state.ability.reveal(ability);
            }
        } else if attribution.from.is_some() {
            // Given by a move (Worry Seed, Entrainment, Role Play)
            if let Some(state) = self.pokemon_of_mut(pokemon) {
                state.ability.current = Some(to_id(ability));
                state.ability.known = true;
                state.ability.revealed = true;
            }
        } else if let Some(state) = self.pokemon_of_mut(pokemon) {
            state.ability.reveal(ability);
        }
        self.refresh_neutralizing_gas();
    }

    fn swap_abilities(&mut self, user: &Pokemon, target: &Pokemon, details: &[String]) {
        if let [target_ability, user_ability, ..] = details
            && !target_ability.is_empty()
            && !user_ability.is_empty()
        {
            if let Some(state) = self.pokemon_of_mut(user) {
                state.ability.reveal_from_effect(user_ability);
            }
            if let Some(state) = self.pokemon_of_mut(target) {
                state.ability.reveal_from_effect(target_ability);
            }
        }

        let user_current = self.pokemon_of(user).map(|p| p.ability.current.clone());
        let target_current = self.pokemon_of(target).map(|p| p.ability.current.clone());
        if let (Some(user_current), Some(target_current)) = (user_current, target_current) {
            if let Some(state) = self.pokemon_of_mut(user) {
                state.ability.current = target_current;
            }
            if let Some(state) = self.pokemon_of_mut(target) {
                state.ability.current = user_current;
            }
        }
    }

    fn handle_activate(
        &mut self,
        pokemon: Option<&Pokemon>,
        effect: &str,
        details: &[String],
        attribution: &Attribution,
    ) {
        let id = effect_id(effect);
        match (id.as_str(), pokemon, attribution.of.as_ref()) {
            ("skillswap", Some(user), Some(target)) => {
                self.swap_abilities(user, target, details);
                return;
            }
            ("trick" | "switcheroo", Some(user), Some(target)) => {
                for side in [user, target] {
                    if let Some(state) = self.pokemon_of_mut(side) {
                        state.item.swapped = true;
                    }
                }
                return;
            }
            ("poltergeist", Some(target), _) => {
                if let Some(item) = details.first()
                    && let Some(state) = self.pokemon_of_mut(target)
                {
                    state.item.reveal(item);
                }
            }
            ("mummy" | "lingeringaroma", Some(holder), Some(victim)) => {
                if let Some(state) = self.pokemon_of_mut(holder) {
                    state.ability.reveal(effect.trim_start_matches("ability: "));
                }
                if let Some(state) = self.pokemon_of_mut(victim) {
                    if let Some(lost) = details.first().filter(|d| !d.is_empty()) {
                        state.ability.reveal_from_effect(lost);
                    }
                    state.ability.current = Some(id.clone());
                }
                return;
            }
            _ => {}
        }

        if let Some(subject) = pokemon {
            if let Some(ability) = effect.strip_prefix("ability: ") {
                if let Some(state) = self.pokemon_of_mut(subject) {
                    state.ability.reveal_from_effect(ability);
                }
            } else if let Some(item) = effect.strip_prefix("item: ")
                && let Some(state) = self.pokemon_of_mut(subject)
            {
                state.item.reveal_from_effect(item);
            }
        }
        self.reveal_attribution(pokemon, attribution);
    }

    fn refresh_neutralizing_gas(&mut self) {
        let gas = self.all_active().any(|(_, _, active)| {
            active.pokemon.ability.is("neutralizinggas") && !active.ability_suppressed()
        });
        self.field.neutralizing_gas = gas;
    }

    // === Volatiles ===

    fn handle_start(&mut self, pokemon: &Pokemon, effect: &str, detail: Option<&str>) {
        if let Some(ability) = effect.strip_prefix("ability: ")
            && let Some(state) = self.pokemon_of_mut(pokemon)
        {
            state.ability.reveal_from_effect(ability);
        }

        let volatile = Volatile::from_protocol(effect);
        if volatile == Volatile::Dynamaxed {
            self.mark_gimmick(pokemon.player, Gimmick::Dynamax);
        }

        let Some(active) = self.active_of_mut(pokemon) else {
            trace!(%pokemon, effect, "volatile on a pokemon not on the field");
            return;
        };

        let data = match &volatile {
            Volatile::TypeChange | Volatile::TypeAdd => {
                VolatileData::Types(Type::parse_list(detail.unwrap_or_default()))
            }
            Volatile::Mimic => match detail {
                Some(name) => {
                    move_entry(active.effective_moves_mut(), name, 5).revealed = true;
                    VolatileData::Move(to_id(name))
                }
                None => VolatileData::None,
            },
            Volatile::Disable => match detail {
                Some(name) => {
                    let id = to_id(name);
                    for record in active.effective_moves_mut().iter_mut() {
                        if record.id == id {
                            record.disabled = true;
                        }
                    }
                    VolatileData::Move(id)
                }
                None => VolatileData::None,
            },
            Volatile::Stockpile | Volatile::PerishSong => {
                let fallback = if volatile == Volatile::PerishSong { 3 } else { 1 };
                VolatileData::Counter(trailing_digit(effect).unwrap_or(fallback))
            }
            Volatile::Protosynthesis | Volatile::QuarkDrive => {
                let id = effect_id(effect);
                let suffix = id
                    .strip_prefix("protosynthesis")
                    .or_else(|| id.strip_prefix("quarkdrive"))
                    .unwrap_or_default();
                Stat::parse(suffix).map_or(VolatileData::None, VolatileData::BoostedStat)
            }
            _ => VolatileData::None,
        };
        active.add_volatile(volatile, data);
    }

    fn handle_end(&mut self, pokemon: &Pokemon, effect: &str) {
        if effect_id(effect) == "neutralizinggas" {
            self.field.neutralizing_gas = false;
            return;
        }

        let volatile = Volatile::from_protocol(effect);
        let Some(active) = self.active_of_mut(pokemon) else {
            return;
        };
        if volatile == Volatile::Disable {
            for record in active.effective_moves_mut().iter_mut() {
                record.disabled = false;
            }
        }
        active.remove_volatile(&volatile);
        active.turn_status.remove(&volatile);
        active.move_status.remove(&volatile);
    }

    fn handle_transform(&mut self, pokemon: &Pokemon, target: &Pokemon) {
        let Some(source) = self.active_of(target) else {
            trace!(%target, "transform into a pokemon not on the field");
            return;
        };
        let boosts = source.boosts;
        let mut snapshot = TransformSnapshot {
            species: source.effective_species().to_string(),
            types: source.types(),
            stats: source.pokemon.stats.clone(),
            ability: source.pokemon.ability.current.clone(),
            moves: source
                .effective_moves()
                .iter()
                .map(|m| MoveKnowledge {
                    pp: 5,
                    max_pp: 5,
                    disabled: false,
                    ..m.clone()
                })
                .collect(),
        };

        let Some(user) = self.active_of_mut(pokemon) else {
            return;
        };
        snapshot.stats.hp = user.pokemon.stats.hp;
        user.boosts = boosts;
        user.add_volatile(Volatile::Transformed, VolatileData::Transform(Box::new(snapshot)));
    }

    fn swap_boosts(&mut self, source: &Pokemon, target: &Pokemon, stats: &[Stat]) {
        let (Some(a), Some(b)) = (
            self.active_of(source).map(|a| a.boosts),
            self.active_of(target).map(|a| a.boosts),
        ) else {
            return;
        };
        let stats = if stats.is_empty() { &STAGED_STATS[..] } else { stats };

        let (mut new_a, mut new_b) = (a, b);
        for &stat in stats {
            new_a.set(stat, b.get(stat));
            new_b.set(stat, a.get(stat));
        }
        if let Some(active) = self.active_of_mut(source) {
            active.boosts = new_a;
        }
        if let Some(active) = self.active_of_mut(target) {
            active.boosts = new_b;
        }
    }

    fn mark_gimmick(&mut self, player: Player, gimmick: Gimmick) {
        if let Some(side) = self.get_side_mut(player) {
            side.gimmicks_used.insert(gimmick);
        }
    }

    // === Side and field ===

    fn swap_side_conditions(&mut self) {
        for (left, right) in [(0, 1), (2, 3)] {
            let (head, tail) = self.sides.split_at_mut(right);
            if let (Some(a), Some(b)) = (head[left].as_mut(), tail[0].as_mut()) {
                std::mem::swap(&mut a.conditions, &mut b.conditions);
            }
        }
    }

    fn action_user_holds(&self, item: &str) -> bool {
        self.current_action
            .as_ref()
            .and_then(|action| self.pokemon_of(&action.user))
            .is_some_and(|p| p.item.is(item))
    }

    /// Whether whoever set a field effect holds `item`: the `[of]` pokemon,
    /// else the user of the declared move
    fn setter_holds(&self, attribution: &Attribution, item: &str) -> bool {
        if item.is_empty() {
            return false;
        }
        match &attribution.of {
            Some(of) => self.pokemon_of(of).is_some_and(|p| p.item.is(item)),
            None => self.action_user_holds(item),
        }
    }

    // === Disguise inference ===

    /// A move the target's shown types cannot be immune to was reported as
    /// having no effect: the target is someone else in disguise.
    fn infer_disguise_from_immunity(&mut self, target: &Pokemon) {
        let Some(action) = self.current_action.clone() else {
            return;
        };
        if same_pokemon(&action.user, target) || !self.is_foe(action.user.player, target.player) {
            return;
        }

        let dex = self.dex_handle();
        let data = dex.move_or_default(self.generation, &action.move_id);
        let Some(user) = self.active_of(&action.user) else {
            return;
        };
        let user_ability = user.pokemon.ability.value().unwrap_or_default().to_string();
        let Some(defender) = self.active_of(target) else {
            return;
        };
        if defender.is_disguised() {
            return;
        }
        let types = defender.types();
        if types.is_empty() {
            return;
        }

        let effectiveness = data.move_type.effectiveness_multi(&types);
        let species = if !data.is_damaging() {
            let explained = effectiveness == 0.0
                || (data.flags.powder && blocks_powder(&types, self.generation))
                || data.status.is_some_and(|s| blocks_status(s, &types));
            // Prankster-boosted status moves fail against Dark types
            (user_ability == "prankster"
                && self.generation >= 7
                && !types.contains(&Type::Dark)
                && !explained)
                .then_some("Zoroark")
        } else if matches!(data.move_type, Type::Normal | Type::Fighting) {
            let hits_ghosts = matches!(user_ability.as_str(), "scrappy" | "mindseye");
            (!types.contains(&Type::Ghost) && !hits_ghosts).then_some("Zoroark-Hisui")
        } else if data.move_type == Type::Psychic {
            (!types.contains(&Type::Dark)).then_some("Zoroark")
        } else {
            None
        };
        let Some(species) = species else {
            return;
        };

        let Some(slot) = self.slot_of(target) else {
            return;
        };
        let Some(side) = self.get_side_mut(target.player) else {
            return;
        };
        let Some(active) = side.active(slot) else {
            return;
        };
        let guess = matching::disguise_guess(side, active.roster_entry(), species);
        debug!(
            %target,
            move_id = %action.move_id,
            species = %guess.species,
            "immunity reveals a disguise"
        );
        if let Some(active) = side.active_mut(slot) {
            active.set_disguise(guess);
        }
    }
}
