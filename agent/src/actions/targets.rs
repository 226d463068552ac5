//! Field geometry and target resolution
//!
//! Each half of the field has `positions_per_half` positions. A target
//! location is the position number counted from one, positive on the
//! opposing half and negative on our own, the way the host numbers them.

use zoroark_battle::TrackedBattle;
use zoroark_protocol::{GameType, MoveTarget, Player};

/// A position on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub half: usize,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    game_type: GameType,
}

impl FieldLayout {
    pub fn new(game_type: GameType) -> Self {
        Self { game_type }
    }

    pub fn of(battle: &TrackedBattle) -> Self {
        Self::new(battle.game_type.unwrap_or(GameType::Singles))
    }

    pub fn width(&self) -> usize {
        self.game_type.positions_per_half()
    }

    /// Where a player's slot stands; in multi and free-for-all battles the
    /// two players of a half take one position each
    pub fn position_of(&self, player: Player, slot: usize) -> Position {
        let index = if self.game_type.is_shared_half() {
            player.index() / 2
        } else {
            slot
        };
        Position {
            half: player.half(),
            index,
        }
    }

    /// The player and slot standing at a position
    pub fn occupant(&self, position: Position) -> (Player, usize) {
        if self.game_type.is_shared_half() {
            (Player::ALL[position.index * 2 + position.half], 0)
        } else {
            (Player::ALL[position.half], position.index)
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width();
        (0..2).flat_map(move |half| (0..width).map(move |index| Position { half, index }))
    }

    /// Same half: neighbours. Opposite halves: facing or diagonal
    pub fn is_adjacent(&self, a: Position, b: Position) -> bool {
        if a == b {
            return false;
        }
        let (x, y) = (a.index as i32, b.index as i32);
        if a.half == b.half {
            (x - y).abs() == 1
        } else {
            (x + y + 1 - self.width() as i32).abs() <= 1
        }
    }

    /// Target location of `target` as seen from `user`
    pub fn location(&self, user: Position, target: Position) -> i8 {
        let number = target.index as i8 + 1;
        if target.half == user.half {
            -number
        } else {
            number
        }
    }

    /// Position a target location refers to
    pub fn at_location(&self, user: Position, location: i8) -> Option<Position> {
        if location == 0 {
            return None;
        }
        let index = location.unsigned_abs() as usize - 1;
        if index >= self.width() {
            return None;
        }
        let half = if location < 0 {
            user.half
        } else {
            1 - user.half
        };
        Some(Position { half, index })
    }
}

/// Whether the position is held by a combatant that can still be hit
fn is_live(battle: &TrackedBattle, layout: &FieldLayout, position: Position) -> bool {
    let (player, slot) = layout.occupant(position);
    battle
        .get_side(player)
        .and_then(|side| side.active(slot))
        .is_some_and(|active| !active.pokemon.fainted)
}

/// Positions a move of this target class may legally aim at
fn candidates(
    battle: &TrackedBattle,
    layout: &FieldLayout,
    player: Player,
    user: Position,
    target_type: MoveTarget,
) -> Vec<Position> {
    let is_foe = |position: Position| battle.is_foe(player, layout.occupant(position).0);

    layout
        .positions()
        .filter(|&position| {
            let adjacent = layout.is_adjacent(user, position);
            match target_type {
                MoveTarget::Normal => adjacent,
                MoveTarget::AdjacentFoe => adjacent && is_foe(position),
                MoveTarget::AdjacentAlly => adjacent && !is_foe(position),
                MoveTarget::AdjacentAllyOrSelf => {
                    position == user || (adjacent && !is_foe(position))
                }
                MoveTarget::Any => position != user,
                _ => false,
            }
        })
        .collect()
}

/// Target locations to offer for a move.
///
/// `None` stands for "no location needed". When every legal target is
/// fainted or empty, the first of them is still offered so the move stays
/// selectable.
pub fn move_targets(
    battle: &TrackedBattle,
    player: Player,
    slot: usize,
    target_type: MoveTarget,
) -> Vec<Option<i8>> {
    let layout = FieldLayout::of(battle);
    if !target_type.requires_choice() || layout.width() == 1 {
        return vec![None];
    }

    let user = layout.position_of(player, slot);
    let legal = candidates(battle, &layout, player, user, target_type);
    let live: Vec<Option<i8>> = legal
        .iter()
        .filter(|&&position| is_live(battle, &layout, position))
        .map(|&position| Some(layout.location(user, position)))
        .collect();

    if !live.is_empty() {
        return live;
    }
    match legal.first() {
        Some(&position) => vec![Some(layout.location(user, position))],
        None => vec![None],
    }
}

/// Combatants a move would hit, as (player, slot) pairs
pub fn affected(
    battle: &TrackedBattle,
    player: Player,
    slot: usize,
    target_type: MoveTarget,
    target: Option<i8>,
) -> Vec<(Player, usize)> {
    let layout = FieldLayout::of(battle);
    let user = layout.position_of(player, slot);
    let is_foe = |position: Position| battle.is_foe(player, layout.occupant(position).0);
    let live_where = |keep: &dyn Fn(Position) -> bool| -> Vec<(Player, usize)> {
        layout
            .positions()
            .filter(|&position| keep(position) && is_live(battle, &layout, position))
            .map(|position| layout.occupant(position))
            .collect()
    };

    match target_type {
        MoveTarget::Normal
        | MoveTarget::AdjacentFoe
        | MoveTarget::AdjacentAlly
        | MoveTarget::AdjacentAllyOrSelf
        | MoveTarget::Any => {
            if let Some(position) = target.and_then(|loc| layout.at_location(user, loc)) {
                let (target_player, target_slot) = layout.occupant(position);
                let occupied = battle
                    .get_side(target_player)
                    .and_then(|side| side.active(target_slot))
                    .is_some();
                return if occupied {
                    vec![(target_player, target_slot)]
                } else {
                    Vec::new()
                };
            }
            match target_type {
                MoveTarget::AdjacentAllyOrSelf => vec![(player, slot)],
                MoveTarget::AdjacentAlly => {
                    let mut allies = live_where(&|p| layout.is_adjacent(user, p) && !is_foe(p));
                    allies.truncate(1);
                    allies
                }
                _ => {
                    let mut foes = live_where(&|p| layout.is_adjacent(user, p) && is_foe(p));
                    foes.truncate(1);
                    foes
                }
            }
        }
        MoveTarget::AllAdjacentFoes | MoveTarget::RandomNormal | MoveTarget::Scripted => {
            live_where(&|p| layout.is_adjacent(user, p) && is_foe(p))
        }
        MoveTarget::AllAdjacent => live_where(&|p| layout.is_adjacent(user, p)),
        MoveTarget::Allies => live_where(&|p| !is_foe(p)),
        MoveTarget::User | MoveTarget::AllyTeam => vec![(player, slot)],
        MoveTarget::AllySide | MoveTarget::FoeSide | MoveTarget::All => Vec::new(),
    }
}
