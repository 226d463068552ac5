//! TrackedBattle - the knowledge store for one match

use std::sync::Arc;

use zoroark_protocol::{BattleRequest, GameType, Player, Pokemon};

use crate::dex::{Dex, MemoryDex};
use crate::types::{ActiveState, FieldState, PokemonState, SideState};

/// The move currently resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAction {
    pub user: Pokemon,
    pub move_id: String,
}

/// A battle being tracked from structured events
///
/// This struct reconstructs battle state from the events of one match. It
/// holds the perspective of one player: that side is refreshed from decision
/// requests, every other side only from what the battle log reveals.
#[derive(Clone)]
pub struct TrackedBattle {
    // === Battle metadata ===
    /// Game type (singles, doubles, etc.)
    pub game_type: Option<GameType>,

    /// Generation (1-9)
    pub generation: u8,

    /// Format/tier name
    pub tier: String,

    /// Rule ids ("sleepclausemod", ...)
    pub rules: Vec<String>,

    /// Current turn number (0 = not started); never decreases
    pub turn: u32,

    pub started: bool,

    // === State ===
    /// Global field state (weather, terrain, etc.)
    pub field: FieldState,

    /// Player sides (indexed by Player enum)
    pub(crate) sides: [Option<SideState>; 4],

    /// Latest decision request, reconciled on demand
    pub request: Option<BattleRequest>,

    pub(crate) current_action: Option<CurrentAction>,

    // === Perspective ===
    perspective: Option<Player>,

    // === Outcome ===
    pub ended: bool,
    pub winner: Option<String>,
    pub tie: bool,

    dex: Arc<dyn Dex>,
}

impl std::fmt::Debug for TrackedBattle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedBattle")
            .field("game_type", &self.game_type)
            .field("generation", &self.generation)
            .field("turn", &self.turn)
            .field("perspective", &self.perspective)
            .field("field", &self.field)
            .field("sides", &self.sides)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl TrackedBattle {
    /// Create a tracker without reference data
    pub fn new() -> Self {
        Self::with_dex(Arc::new(MemoryDex::new()))
    }

    pub fn with_dex(dex: Arc<dyn Dex>) -> Self {
        Self {
            game_type: None,
            generation: 9,
            tier: String::new(),
            rules: Vec::new(),
            turn: 0,
            started: false,
            field: FieldState::new(),
            sides: [None, None, None, None],
            request: None,
            current_action: None,
            perspective: None,
            ended: false,
            winner: None,
            tie: false,
            dex,
        }
    }

    pub fn dex(&self) -> &dyn Dex {
        self.dex.as_ref()
    }

    /// Shared handle to the reference data
    pub fn dex_handle(&self) -> Arc<dyn Dex> {
        Arc::clone(&self.dex)
    }

    pub fn has_rule(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }

    // === Perspective ===

    pub fn set_perspective(&mut self, player: Player) {
        self.perspective = Some(player);
    }

    pub fn perspective(&self) -> Option<Player> {
        self.perspective
    }

    /// Our side
    pub fn me(&self) -> Option<&SideState> {
        self.perspective.and_then(|p| self.get_side(p))
    }

    pub fn me_mut(&mut self) -> Option<&mut SideState> {
        self.perspective.and_then(|p| self.get_side_mut(p))
    }

    /// First opposing side (the only one outside free-for-all)
    pub fn opponent(&self) -> Option<&SideState> {
        let me = self.perspective?;
        self.sides().find(|side| self.is_foe(me, side.player))
    }

    /// Whether two players fight against each other
    pub fn is_foe(&self, a: Player, b: Player) -> bool {
        match self.game_type {
            Some(GameType::FreeForAll) => a != b,
            _ => a.half() != b.half(),
        }
    }

    /// Sides opposing `player`
    pub fn foes_of(&self, player: Player) -> impl Iterator<Item = &SideState> {
        self.sides().filter(move |side| self.is_foe(player, side.player))
    }

    // === Sides ===

    pub fn get_side(&self, player: Player) -> Option<&SideState> {
        self.sides[player.index()].as_ref()
    }

    pub fn get_side_mut(&mut self, player: Player) -> Option<&mut SideState> {
        self.sides[player.index()].as_mut()
    }

    /// Get or create a side for a player
    pub fn get_or_create_side(&mut self, player: Player, username: &str) -> &mut SideState {
        let slots = self.game_type.map_or(1, |g| g.slots_per_player());
        self.sides[player.index()].get_or_insert_with(|| {
            let mut side = SideState::new(player, username);
            side.set_active_slots(slots);
            side
        })
    }

    pub fn has_side(&self, player: Player) -> bool {
        self.sides[player.index()].is_some()
    }

    /// Iterate over all initialized sides
    pub fn sides(&self) -> impl Iterator<Item = &SideState> {
        self.sides.iter().filter_map(|s| s.as_ref())
    }

    pub fn sides_mut(&mut self) -> impl Iterator<Item = &mut SideState> {
        self.sides.iter_mut().filter_map(|s| s.as_mut())
    }

    /// Set game type and update active slots accordingly
    pub fn set_game_type(&mut self, game_type: GameType) {
        self.game_type = Some(game_type);
        let slots = game_type.slots_per_player();
        for side in self.sides_mut() {
            side.set_active_slots(slots);
        }
    }

    pub fn slots_per_player(&self) -> usize {
        self.game_type.map_or(1, |g| g.slots_per_player())
    }

    pub fn is_active(&self) -> bool {
        self.turn > 0 && !self.ended
    }

    pub fn is_waiting_to_start(&self) -> bool {
        self.turn == 0 && !self.ended
    }

    // === Lookups by protocol identifier ===

    /// Active slot an identifier refers to
    pub fn slot_of(&self, pokemon: &Pokemon) -> Option<usize> {
        let side = self.get_side(pokemon.player)?;
        match pokemon.slot() {
            Some(slot) if side.active(slot).is_some_and(|a| a.displayed_name == pokemon.name) => {
                Some(slot)
            }
            _ => side.slot_of(&pokemon.name),
        }
    }

    pub fn active_of(&self, pokemon: &Pokemon) -> Option<&ActiveState> {
        let slot = self.slot_of(pokemon)?;
        self.get_side(pokemon.player)?.active(slot)
    }

    pub fn active_of_mut(&mut self, pokemon: &Pokemon) -> Option<&mut ActiveState> {
        let slot = self.slot_of(pokemon)?;
        self.get_side_mut(pokemon.player)?.active_mut(slot)
    }

    /// The freshest state for an identifier: the active copy, else the roster entry
    pub fn pokemon_of(&self, pokemon: &Pokemon) -> Option<&PokemonState> {
        if let Some(active) = self.active_of(pokemon) {
            return Some(&active.pokemon);
        }
        let side = self.get_side(pokemon.player)?;
        side.find_pokemon(&pokemon.name)
            .and_then(|index| side.pokemon.get(index))
    }

    pub fn pokemon_of_mut(&mut self, pokemon: &Pokemon) -> Option<&mut PokemonState> {
        let slot = self.slot_of(pokemon);
        let side = self.get_side_mut(pokemon.player)?;
        if let Some(slot) = slot {
            return side.active_mut(slot).map(|a| &mut a.pokemon);
        }
        let index = side.find_pokemon(&pokemon.name)?;
        side.pokemon.get_mut(index)
    }

    /// Every occupied slot on the field
    pub fn all_active(&self) -> impl Iterator<Item = (Player, usize, &ActiveState)> {
        self.sides()
            .flat_map(|side| side.actives().map(move |(slot, a)| (side.player, slot, a)))
    }
}

impl Default for TrackedBattle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryOrigin;

    #[test]
    fn test_new_battle() {
        let battle = TrackedBattle::new();
        assert_eq!(battle.turn, 0);
        assert!(!battle.ended);
        assert!(battle.perspective.is_none());
        assert!(battle.game_type.is_none());
        assert!(battle.request.is_none());
    }

    #[test]
    fn test_get_or_create_side() {
        let mut battle = TrackedBattle::new();
        assert!(!battle.has_side(Player::P1));

        let side = battle.get_or_create_side(Player::P1, "Alice");
        assert_eq!(side.username, "Alice");

        // Existing sides are returned untouched
        let side = battle.get_or_create_side(Player::P1, "");
        assert_eq!(side.username, "Alice");
        assert!(battle.has_side(Player::P1));
    }

    #[test]
    fn test_me_and_opponent() {
        let mut battle = TrackedBattle::new();
        battle.get_or_create_side(Player::P1, "Alice");
        battle.get_or_create_side(Player::P2, "Bob");

        assert!(battle.me().is_none());
        assert!(battle.opponent().is_none());

        battle.set_perspective(Player::P2);
        assert_eq!(battle.me().unwrap().username, "Bob");
        assert_eq!(battle.opponent().unwrap().username, "Alice");
    }

    #[test]
    fn test_foes_by_game_type() {
        let mut battle = TrackedBattle::new();
        battle.set_game_type(GameType::Multi);
        assert!(!battle.is_foe(Player::P1, Player::P3));
        assert!(battle.is_foe(Player::P1, Player::P4));

        battle.set_game_type(GameType::FreeForAll);
        assert!(battle.is_foe(Player::P1, Player::P3));
        assert!(!battle.is_foe(Player::P2, Player::P2));
    }

    #[test]
    fn test_set_game_type() {
        let mut battle = TrackedBattle::new();
        battle.get_or_create_side(Player::P1, "Test");

        battle.set_game_type(GameType::Triples);
        assert_eq!(battle.get_side(Player::P1).unwrap().active.len(), 3);

        // Sides created later get the right slot count too
        let side = battle.get_or_create_side(Player::P2, "Other");
        assert_eq!(side.active.len(), 3);
    }

    #[test]
    fn test_slot_of_checks_displayed_name() {
        let mut battle = TrackedBattle::new();
        battle.set_game_type(GameType::Doubles);
        let side = battle.get_or_create_side(Player::P1, "Alice");
        side.pokemon.push(PokemonState::new("Pikachu", "Pikachu", 50));
        let copy = side.pokemon[0].clone();
        side.active[1] = Some(ActiveState::new(0, copy, 1, EntryOrigin::Existing));

        let stale = Pokemon::new(Player::P1, Some('a'), "Pikachu");
        assert_eq!(battle.slot_of(&stale), Some(1));
        assert!(battle.active_of(&stale).is_some());

        let unknown = Pokemon::new(Player::P1, Some('a'), "Raichu");
        assert!(battle.slot_of(&unknown).is_none());
        assert!(battle.pokemon_of(&unknown).is_none());
    }

    #[test]
    fn test_is_active() {
        let mut battle = TrackedBattle::new();
        assert!(!battle.is_active());
        assert!(battle.is_waiting_to_start());

        battle.turn = 1;
        assert!(battle.is_active());

        battle.ended = true;
        assert!(!battle.is_active());
    }
}
