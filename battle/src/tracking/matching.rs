//! Binding identifiers and request entries to roster entries

use zoroark_protocol::{BattleRequest, PokemonDetails, SidePokemon};

use crate::dex::{Dex, DexExt, estimate_stats, to_id};
use crate::types::{DisguiseGuess, EntryOrigin, PokemonState, SideState};

/// Species assumed behind a disguise when no better candidate is known
pub const DEFAULT_DISGUISE: &str = "Zoroark";

/// Where a switch-in belongs on the roster
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Entry(usize, EntryOrigin),
    /// The shown identity cannot be on the field; holds the entry it copies
    Disguised { impersonating: Option<usize> },
}

/// Resolve a switch-in by name, then by an unrevealed preview species,
/// then by creating an entry while the roster has room.
pub(crate) fn resolve_entry(
    side: &mut SideState,
    name: &str,
    details: &PokemonDetails,
    slot: usize,
) -> Resolution {
    if let Some(index) = side.find_pokemon(name) {
        let entry = &side.pokemon[index];
        let elsewhere = entry.active && entry.active_slot.is_some_and(|s| s != slot);
        if entry.fainted || elsewhere {
            return Resolution::Disguised {
                impersonating: Some(index),
            };
        }
        return Resolution::Entry(index, EntryOrigin::Existing);
    }

    if let Some(index) = side
        .pokemon
        .iter()
        .position(|p| !p.revealed && p.identity.species_matches(&details.species))
    {
        let entry = &mut side.pokemon[index];
        let previous = entry.identity.clone();
        entry.identity.name = name.to_string();
        return Resolution::Entry(index, EntryOrigin::Claimed(previous));
    }

    if !side.is_full() {
        return Resolution::Entry(push_entry(side, name, details), EntryOrigin::Created);
    }

    Resolution::Disguised {
        impersonating: None,
    }
}

/// Append a fresh entry, returning its index
pub(crate) fn push_entry(side: &mut SideState, name: &str, details: &PokemonDetails) -> usize {
    let mut entry = PokemonState::from_details(name, details);
    entry.index = side.pokemon.len();
    side.pokemon.push(entry);
    side.pokemon.len() - 1
}

/// Best guess for who hides behind a disguise: a known disguise-capable
/// member, else `default_species`
pub(crate) fn disguise_guess(
    side: &SideState,
    impersonating: Option<usize>,
    default_species: &str,
) -> DisguiseGuess {
    let candidate = side.pokemon.iter().enumerate().find(|(index, p)| {
        p.can_disguise && !p.fainted && !p.active && Some(*index) != impersonating
    });

    match candidate {
        Some((index, p)) => DisguiseGuess {
            species: p.species().to_string(),
            roster_index: Some(index),
            impersonating,
        },
        None => DisguiseGuess {
            species: default_species.to_string(),
            roster_index: None,
            impersonating,
        },
    }
}

/// Fill types, estimated stats and disguise capability from reference data
pub(crate) fn fill_from_dex(dex: &dyn Dex, generation: u8, state: &mut PokemonState) {
    let species = state
        .identity
        .species
        .strip_suffix("-*")
        .unwrap_or(&state.identity.species)
        .to_string();

    if let Some(data) = dex.species(generation, &to_id(&species)) {
        state.base_types = data.types.clone();
        let estimate = estimate_stats(&data.base_stats, state.identity.level);
        let stats = &mut state.stats;
        for (range, estimated) in [
            (&mut stats.hp, estimate.hp),
            (&mut stats.atk, estimate.atk),
            (&mut stats.def, estimate.def),
            (&mut stats.spa, estimate.spa),
            (&mut stats.spd, estimate.spd),
            (&mut stats.spe, estimate.spe),
        ] {
            if !range.known {
                *range = estimated;
            }
        }
    }
    state.can_disguise = dex.can_disguise(generation, &species);
}

/// Keep the candidates satisfying `pred`, unless none do
fn narrow(candidates: Vec<usize>, pred: impl Fn(usize) -> bool) -> Vec<usize> {
    if candidates.len() <= 1 {
        return candidates;
    }
    let kept: Vec<usize> = candidates.iter().copied().filter(|&i| pred(i)).collect();
    if kept.is_empty() { candidates } else { kept }
}

/// Held item and base ability agree with what we know of the entry
fn same_build(entry: &PokemonState, candidate: &SidePokemon) -> bool {
    let item = to_id(&candidate.item);
    let item_matches = entry.item.known
        && match entry.item.value() {
            Some(current) => current == item,
            None => item.is_empty(),
        };
    let ability_matches = entry
        .ability
        .base
        .as_deref()
        .is_some_and(|base| base == to_id(&candidate.base_ability));
    item_matches && ability_matches
}

/// Tracked roster entry for a request roster member.
///
/// Matches by name first, then by species and level, then by held item
/// and base ability, else takes the first remaining candidate. Entries in
/// `taken` are skipped.
pub fn find_entry(side: &SideState, candidate: &SidePokemon, taken: &[usize]) -> Option<usize> {
    let details = candidate.parsed_details();
    let level = details.level.unwrap_or(100);
    let free = |i: &usize| !taken.contains(i);

    let mut candidates: Vec<usize> = (0..side.pokemon.len())
        .filter(free)
        .filter(|&i| side.pokemon[i].name() == candidate.name())
        .collect();

    if candidates.is_empty() {
        candidates = (0..side.pokemon.len())
            .filter(free)
            .filter(|&i| {
                let p = &side.pokemon[i];
                !p.revealed && p.identity.species_matches(&details.species)
            })
            .collect();
    }

    let candidates = narrow(candidates, |i| {
        let p = &side.pokemon[i];
        p.species() == details.species && p.identity.level == level
    });
    let candidates = narrow(candidates, |i| same_build(&side.pokemon[i], candidate));
    candidates.first().copied()
}

/// Position in the request roster of a tracked entry, the inverse of [`find_entry`]
pub fn request_position(request: &BattleRequest, entry: &PokemonState) -> Option<usize> {
    let roster = &request.side.as_ref()?.pokemon;

    let by_name: Vec<usize> = (0..roster.len())
        .filter(|&i| roster[i].name() == entry.name())
        .collect();
    let candidates = if by_name.is_empty() {
        (0..roster.len())
            .filter(|&i| entry.identity.species_matches(roster[i].species()))
            .collect()
    } else {
        by_name
    };

    let candidates = narrow(candidates, |i| {
        let details = roster[i].parsed_details();
        details.species == entry.identity.species
            && details.level.unwrap_or(100) == entry.identity.level
    });
    let candidates = narrow(candidates, |i| same_build(entry, &roster[i]));
    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoroark_protocol::Player;

    fn side_with(names: &[(&str, &str)]) -> SideState {
        let mut side = SideState::new(Player::P2, "Bob");
        for (name, species) in names {
            push_entry(&mut side, name, &PokemonDetails::parse(species));
            let last = side.pokemon.len() - 1;
            side.pokemon[last].revealed = true;
        }
        side
    }

    fn request_pokemon(ident: &str, details: &str, item: &str, ability: &str) -> SidePokemon {
        SidePokemon {
            ident: ident.to_string(),
            details: details.to_string(),
            condition: "100/100".to_string(),
            item: item.to_string(),
            base_ability: ability.to_string(),
            ability: ability.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_existing_and_created() {
        let mut side = side_with(&[("Chompy", "Garchomp, L50")]);
        side.team_size = 2;

        let details = PokemonDetails::parse("Garchomp, L50");
        assert_eq!(
            resolve_entry(&mut side, "Chompy", &details, 0),
            Resolution::Entry(0, EntryOrigin::Existing)
        );

        let details = PokemonDetails::parse("Rotom-Wash, L50");
        assert_eq!(
            resolve_entry(&mut side, "Rotom", &details, 0),
            Resolution::Entry(1, EntryOrigin::Created)
        );
        assert!(side.is_full());
    }

    #[test]
    fn test_resolve_claims_preview_wildcard() {
        let mut side = SideState::new(Player::P2, "Bob");
        side.team_size = 6;
        push_entry(&mut side, "Urshifu-*", &PokemonDetails::parse("Urshifu-*, L50"));

        let details = PokemonDetails::parse("Urshifu-Rapid-Strike, L50");
        let resolution = resolve_entry(&mut side, "Fishy", &details, 0);
        match resolution {
            Resolution::Entry(0, EntryOrigin::Claimed(previous)) => {
                assert_eq!(previous.species, "Urshifu-*");
            }
            other => panic!("unexpected resolution {:?}", other),
        }
        assert_eq!(side.pokemon[0].name(), "Fishy");
    }

    #[test]
    fn test_resolve_impossible_identity() {
        let mut side = side_with(&[("Chompy", "Garchomp"), ("Rotom", "Rotom-Wash")]);
        side.team_size = 2;
        side.pokemon[0].fainted = true;

        let details = PokemonDetails::parse("Garchomp");
        assert_eq!(
            resolve_entry(&mut side, "Chompy", &details, 0),
            Resolution::Disguised {
                impersonating: Some(0)
            }
        );

        let details = PokemonDetails::parse("Mew");
        assert_eq!(
            resolve_entry(&mut side, "Mew", &details, 0),
            Resolution::Disguised {
                impersonating: None
            }
        );
    }

    #[test]
    fn test_disguise_guess_prefers_known_member() {
        let mut side = side_with(&[("Chompy", "Garchomp"), ("Zoroark", "Zoroark")]);
        assert_eq!(
            disguise_guess(&side, Some(0), DEFAULT_DISGUISE).roster_index,
            None
        );

        side.pokemon[1].can_disguise = true;
        let guess = disguise_guess(&side, Some(0), DEFAULT_DISGUISE);
        assert_eq!(guess.roster_index, Some(1));
        assert_eq!(guess.species, "Zoroark");
        assert_eq!(guess.impersonating, Some(0));
    }

    #[test]
    fn test_find_entry_by_name_then_species() {
        let mut side = side_with(&[("Chompy", "Garchomp, L50")]);
        push_entry(&mut side, "Rotom-*", &PokemonDetails::parse("Rotom-*"));

        let chompy = request_pokemon("p2: Chompy", "Garchomp, L50", "", "roughskin");
        assert_eq!(find_entry(&side, &chompy, &[]), Some(0));
        assert_eq!(find_entry(&side, &chompy, &[0]), None);

        let rotom = request_pokemon("p2: Rotom", "Rotom-Wash", "leftovers", "levitate");
        assert_eq!(find_entry(&side, &rotom, &[]), Some(1));
    }

    #[test]
    fn test_find_entry_tie_break_by_build() {
        let mut side = SideState::new(Player::P1, "Alice");
        for _ in 0..2 {
            push_entry(&mut side, "Pikachu", &PokemonDetails::parse("Pikachu, L50"));
        }
        side.pokemon[1].item.set_known("lightball");
        side.pokemon[1].ability.reveal("static");

        let candidate = request_pokemon("p1: Pikachu", "Pikachu, L50", "lightball", "static");
        assert_eq!(find_entry(&side, &candidate, &[]), Some(1));
    }

    #[test]
    fn test_request_position() {
        let request = BattleRequest {
            side: Some(zoroark_protocol::SideInfo {
                name: "Alice".to_string(),
                id: "p1".to_string(),
                pokemon: vec![
                    request_pokemon("p1: Rotom", "Rotom-Wash", "leftovers", "levitate"),
                    request_pokemon("p1: Chompy", "Garchomp, L50", "", "roughskin"),
                ],
            }),
            ..Default::default()
        };

        let entry = PokemonState::new("Chompy", "Garchomp", 50);
        assert_eq!(request_position(&request, &entry), Some(1));

        let missing = PokemonState::new("Mew", "Mew", 100);
        assert_eq!(request_position(&request, &missing), None);
    }
}
