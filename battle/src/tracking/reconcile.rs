//! Merging the latest decision request into our own side

use tracing::{debug, trace};
use zoroark_protocol::{ActivePokemon, SidePokemon};

use super::battle::TrackedBattle;
use super::matching::{self, find_entry};
use crate::dex::{Dex, DexExt, to_id};
use crate::types::{
    ActiveState, DisguiseGuess, EntryOrigin, MoveKnowledge, PokemonState, StatRange, Type,
    move_entry,
};

/// Overwrite an entry with everything a request says about it
fn refresh_entry(entry: &mut PokemonState, member: &SidePokemon, dex: &dyn Dex, generation: u8) {
    let details = member.parsed_details();
    let species_changed = entry.identity.species != details.species;
    entry.identity.name = member.name().to_string();
    entry.identity.apply_details(&details);

    if let Some(hp) = member.hp_status() {
        entry.apply_hp_status(&hp);
    }
    entry.stats.set_exact(&member.stats);
    if let Some((_, max)) = member.hp() {
        entry.stats.hp = StatRange::exact(max);
    }

    entry.item.set_known(&member.item);
    if entry.item.base.is_none() && !entry.item.swapped {
        entry.item.base = entry.item.current.clone();
    }
    let ability = if member.ability.is_empty() {
        &member.base_ability
    } else {
        &member.ability
    };
    entry.ability.set_known(ability);
    entry.ability.base = Some(to_id(&member.base_ability));

    if let Some(tera) = member.teratype.as_deref().and_then(Type::from_protocol) {
        entry.tera_type = Some(tera);
    }
    entry.terastallized = member.terastallized.as_deref().is_some_and(|t| !t.is_empty());

    if species_changed || entry.base_types.is_empty() {
        matching::fill_from_dex(dex, generation, entry);
    }
}

/// Replace an entry's move list with the request's, keeping reveal flags
fn merge_roster_moves(entry: &mut PokemonState, member: &SidePokemon, dex: &dyn Dex, generation: u8) {
    let mut moves: Vec<MoveKnowledge> = Vec::with_capacity(member.moves.len());
    for id in &member.moves {
        let data = dex.move_or_default(generation, id);
        let name = if data.name.is_empty() { id.as_str() } else { data.name.as_str() };
        let record = match entry.moves.iter().find(|m| m.id == to_id(id)) {
            Some(known) => known.clone(),
            None => MoveKnowledge::new(name, data.max_pp()),
        };
        moves.push(record);
    }
    entry.moves = moves;
}

/// Exact PP and disabled state from the active part of a request
fn merge_active_moves(active: &mut ActiveState, slot: &ActivePokemon) {
    let moves = active.effective_moves_mut();
    for request_move in &slot.moves {
        let record = move_entry(moves, &request_move.name, request_move.max_pp);
        record.pp = request_move.pp;
        record.max_pp = request_move.max_pp;
        record.disabled = request_move.disabled;
    }
}

impl TrackedBattle {
    /// Merge the stored request into our side.
    ///
    /// Request roster members are matched to tracked entries with
    /// [`find_entry`]; matched entries take the request's exact values.
    /// Active combatants are then checked against the request's active
    /// members, rebinding a slot whose true occupant differs from the one
    /// the battle log showed.
    pub fn reconcile(&mut self) {
        let Some(request) = self.request.clone() else {
            return;
        };
        let Some(info) = request.side.as_ref() else {
            return;
        };
        let Some(player) = info.player() else {
            return;
        };
        let dex = self.dex_handle();
        let generation = self.generation;
        let turn = self.turn;

        let side = self.get_or_create_side(player, &info.name);
        if side.team_size == 0 {
            side.team_size = info.pokemon.len();
        }

        // === Roster ===
        let mut bindings: Vec<(usize, usize)> = Vec::with_capacity(info.pokemon.len());
        let mut taken: Vec<usize> = Vec::with_capacity(info.pokemon.len());
        for (position, member) in info.pokemon.iter().enumerate() {
            let index = match find_entry(side, member, &taken) {
                Some(index) => index,
                None if !side.is_full() => {
                    matching::push_entry(side, member.name(), &member.parsed_details())
                }
                None => {
                    trace!(member = member.name(), "no roster room for request member");
                    continue;
                }
            };
            taken.push(index);

            let transformed = side
                .slot_of_index(index)
                .and_then(|slot| side.active(slot))
                .is_some_and(ActiveState::is_transformed);
            let entry = &mut side.pokemon[index];
            refresh_entry(entry, member, dex.as_ref(), generation);
            if !transformed {
                merge_roster_moves(entry, member, dex.as_ref(), generation);
            }
            bindings.push((position, index));
        }

        // === Active slots ===
        // Active members lead the request roster in slot order
        for &(position, index) in &bindings {
            if !info.pokemon[position].active || position >= side.active.len() {
                continue;
            }
            let slot = position;

            let previous = side.active(slot).map(|a| a.roster_index);
            match previous {
                None => {
                    let entry = &mut side.pokemon[index];
                    entry.active = true;
                    entry.active_slot = Some(slot);
                    let active = ActiveState::new(index, entry.clone(), turn, EntryOrigin::Existing);
                    side.active[slot] = Some(active);
                }
                Some(shown) if shown == index => {
                    let entry = side.pokemon[index].clone();
                    if let Some(active) = side.active_mut(slot) {
                        refresh_active(active, &entry);
                    }
                }
                Some(shown) => {
                    debug!(
                        slot,
                        shown = ?side.pokemon.get(shown).map(PokemonState::name),
                        actual = side.pokemon[index].name(),
                        "request shows a different occupant"
                    );
                    if let Some(old) = side.pokemon.get_mut(shown) {
                        old.active = false;
                        old.active_slot = None;
                    }
                    let entry = &mut side.pokemon[index];
                    entry.active = true;
                    entry.active_slot = Some(slot);
                    let entry = entry.clone();

                    if let Some(active) = side.active_mut(slot) {
                        active.roster_index = index;
                        active.pokemon.identity = entry.identity.clone();
                        active.pokemon.index = index;
                        active.pokemon.base_types = entry.base_types.clone();
                        active.pokemon.can_disguise = entry.can_disguise;
                        active.pokemon.moves = entry.moves.clone();
                        refresh_active(active, &entry);
                        active.set_disguise(DisguiseGuess {
                            species: entry.species().to_string(),
                            roster_index: Some(index),
                            impersonating: Some(shown),
                        });
                    }
                }
            }

            if let Some(request_slot) = request.active_at(slot)
                && let Some(active) = side.active_mut(slot)
            {
                merge_active_moves(active, request_slot);
            }
        }
    }
}

/// Copy the exact values of a reconciled entry onto its combatant
fn refresh_active(active: &mut ActiveState, entry: &PokemonState) {
    let state = &mut active.pokemon;
    state.hp_current = entry.hp_current;
    state.hp_max = entry.hp_max;
    state.status = entry.status;
    state.fainted = entry.fainted;
    state.stats = entry.stats.clone();
    state.item = entry.item.clone();
    state.ability.known = true;
    state.ability.current = entry.ability.current.clone();
    state.ability.base = entry.ability.base.clone();
    state.tera_type = entry.tera_type;
    state.terastallized = entry.terastallized;
    if !active.is_transformed() {
        for known in &entry.moves {
            let record = move_entry(&mut active.pokemon.moves, &known.name, known.max_pp);
            record.pp = known.pp.min(record.max_pp);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use zoroark_protocol::{
        BattleEvent, BattleRequest, HpStatus, MajorEvent, MoveSlot, Player, Pokemon,
        PokemonDetails, PokemonStats, SideInfo,
    };

    use super::*;
    use crate::dex::{MemoryDex, MoveCategory, MoveData};

    fn member(ident: &str, details: &str, condition: &str, active: bool) -> SidePokemon {
        SidePokemon {
            ident: ident.to_string(),
            details: details.to_string(),
            condition: condition.to_string(),
            active,
            stats: PokemonStats {
                atk: 100,
                def: 110,
                spa: 120,
                spd: 130,
                spe: 140,
            },
            moves: vec!["thunderbolt".to_string(), "voltswitch".to_string()],
            base_ability: "static".to_string(),
            ability: "static".to_string(),
            item: "lightball".to_string(),
            teratype: Some("Electric".to_string()),
            ..Default::default()
        }
    }

    fn request(pokemon: Vec<SidePokemon>) -> BattleRequest {
        BattleRequest {
            rqid: Some(3),
            active: Some(vec![ActivePokemon {
                moves: vec![MoveSlot {
                    name: "Thunderbolt".to_string(),
                    id: "thunderbolt".to_string(),
                    pp: 10,
                    max_pp: 24,
                    target: "normal".to_string(),
                    disabled: false,
                }],
                ..Default::default()
            }]),
            side: Some(SideInfo {
                name: "Alice".to_string(),
                id: "p1".to_string(),
                pokemon,
            }),
            ..Default::default()
        }
    }

    fn dex() -> Arc<MemoryDex> {
        Arc::new(
            MemoryDex::new().with_move(MoveData {
                name: "Thunderbolt".to_string(),
                move_type: Type::Electric,
                category: MoveCategory::Special,
                base_power: 90,
                pp: 15,
                ..MoveData::unknown()
            }),
        )
    }

    fn switch(ident: &str, details: &str) -> BattleEvent {
        MajorEvent::Switch {
            pokemon: Pokemon::parse(ident).unwrap(),
            details: PokemonDetails::parse(details),
            hp_status: HpStatus::parse("100/100"),
        }
        .into()
    }

    #[test]
    fn test_reconcile_fills_roster() {
        let mut battle = TrackedBattle::with_dex(dex());
        battle.apply(&MajorEvent::Request(Box::new(request(vec![
            member("p1: Sparky", "Pikachu, L50", "95/110", true),
            member("p1: Chompy", "Garchomp, L50", "0 fnt", false),
        ])))
        .into());
        battle.reconcile();

        assert_eq!(battle.perspective(), Some(Player::P1));
        let side = battle.me().unwrap();
        assert_eq!(side.team_size, 2);
        assert_eq!(side.pokemon.len(), 2);

        let sparky = &side.pokemon[0];
        assert_eq!(sparky.hp_current, 95);
        assert_eq!(sparky.stats.hp, StatRange::exact(110));
        assert_eq!(sparky.stats.spe, StatRange::exact(140));
        assert!(sparky.item.is("lightball"));
        assert_eq!(sparky.ability.base.as_deref(), Some("static"));
        assert_eq!(sparky.tera_type, Some(Type::Electric));
        assert_eq!(sparky.moves.len(), 2);
        assert!(!sparky.moves[0].revealed);
        assert!(side.pokemon[1].fainted);

        let active = side.active(0).unwrap();
        assert_eq!(active.roster_index, 0);
        let thunderbolt = active.pokemon.find_move("thunderbolt").unwrap();
        assert_eq!((thunderbolt.pp, thunderbolt.max_pp), (10, 24));
    }

    #[test]
    fn test_reconcile_keeps_reveal_flags() {
        let mut battle = TrackedBattle::with_dex(dex());
        battle.apply(&MajorEvent::TeamSize { player: Player::P1, size: 2 }.into());
        battle.apply(&switch("p1a: Sparky", "Pikachu, L50"));
        battle.apply(
            &MajorEvent::Move {
                pokemon: Pokemon::parse("p1a: Sparky").unwrap(),
                move_name: "Thunderbolt".to_string(),
                target: None,
                miss: false,
                still: false,
                attribution: Default::default(),
            }
            .into(),
        );
        battle.apply(&MajorEvent::Request(Box::new(request(vec![
            member("p1: Sparky", "Pikachu, L50", "110/110", true),
            member("p1: Chompy", "Garchomp, L50", "100/100", false),
        ])))
        .into());
        battle.reconcile();

        let side = battle.me().unwrap();
        assert_eq!(side.pokemon.len(), 2);
        let active = side.active(0).unwrap();
        let thunderbolt = active.pokemon.find_move("thunderbolt").unwrap();
        assert!(thunderbolt.revealed);
        assert_eq!(thunderbolt.pp, 10);
        assert!(!active.is_disguised());
    }

    #[test]
    fn test_reconcile_rebinds_disguised_slot() {
        let mut battle = TrackedBattle::with_dex(dex());
        battle.apply(&MajorEvent::TeamSize { player: Player::P1, size: 2 }.into());
        battle.apply(&switch("p1a: Chompy", "Garchomp, L50"));

        let mut zoroark = member("p1: Zoroark", "Zoroark, L50", "100/100", true);
        zoroark.base_ability = "illusion".to_string();
        zoroark.ability = "illusion".to_string();
        battle.apply(&MajorEvent::Request(Box::new(request(vec![
            zoroark,
            member("p1: Chompy", "Garchomp, L50", "100/100", false),
        ])))
        .into());
        battle.reconcile();

        let side = battle.me().unwrap();
        let active = side.active(0).unwrap();
        assert_eq!(active.displayed_name, "Chompy");
        assert!(active.is_disguised());
        let guess = active.disguise().unwrap();
        assert_eq!(guess.species, "Zoroark");
        assert_eq!(side.pokemon[guess.roster_index.unwrap()].name(), "Zoroark");
        assert!(side.pokemon[guess.roster_index.unwrap()].can_disguise);

        let chompy = &side.pokemon[side.find_pokemon("Chompy").unwrap()];
        assert!(!chompy.active);
    }

    #[test]
    fn test_reconcile_without_request_is_noop() {
        let mut battle = TrackedBattle::with_dex(Arc::new(MemoryDex::new()));
        battle.reconcile();
        assert!(battle.me().is_none());
    }
}
