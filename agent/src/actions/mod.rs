//! Legal actions for one active slot

mod targets;

pub use targets::{FieldLayout, Position, affected, move_targets};

use tracing::trace;
use zoroark_battle::dex::to_id;
use zoroark_battle::{TrackedBattle, Volatile};
use zoroark_protocol::{ActiveChoice, ActivePokemon, GameType, Gimmick, MoveTarget, Player};

/// A move choice together with what it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAction {
    /// Position in the request's move list
    pub index: usize,
    /// Move that will be executed (the Z-move or Max move when powered up)
    pub id: String,
    /// Move in the slot
    pub base_id: String,
    pub target_type: MoveTarget,
    pub target: Option<i8>,
    pub gimmick: Option<Gimmick>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Move(MoveAction),
    /// Switch to a position of the request's roster
    Switch(usize),
    Shift,
    Pass,
}

impl Action {
    pub fn to_choice(&self) -> ActiveChoice {
        match self {
            Action::Move(action) => ActiveChoice::Move {
                index: action.index,
                target: action.target,
                gimmick: action.gimmick,
            },
            Action::Switch(position) => ActiveChoice::Switch(*position),
            Action::Shift => ActiveChoice::Shift,
            Action::Pass => ActiveChoice::Pass,
        }
    }

    pub fn as_move(&self) -> Option<&MoveAction> {
        match self {
            Action::Move(action) => Some(action),
            _ => None,
        }
    }

    pub fn switch_position(&self) -> Option<usize> {
        match self {
            Action::Switch(position) => Some(*position),
            _ => None,
        }
    }

    pub fn gimmick(&self) -> Option<Gimmick> {
        self.as_move().and_then(|action| action.gimmick)
    }
}

/// Every legal action for an active slot of the current request.
///
/// Returns a single [`Action::Pass`] when the slot has nothing to choose.
pub fn legal_actions(battle: &TrackedBattle, slot: usize) -> Vec<Action> {
    let Some(request) = battle.request.as_ref() else {
        return vec![Action::Pass];
    };
    let Some(player) = battle.perspective().or_else(|| request.player()) else {
        return vec![Action::Pass];
    };
    let Some(active) = request.active_at(slot) else {
        trace!(slot, "no request entry for slot");
        return vec![Action::Pass];
    };

    let member = request.side.as_ref().and_then(|side| side.pokemon.get(slot));
    if member.is_some_and(|m| m.commanding) {
        return vec![Action::Pass];
    }
    let fainted = member.is_some_and(|m| m.is_fainted());

    let mut actions = Vec::new();
    if !fainted {
        actions.extend(move_actions(battle, player, slot, active));
    }
    if active.can_switch() {
        actions.extend(
            request
                .available_switches()
                .into_iter()
                .map(|(position, _)| Action::Switch(position)),
        );
    }
    if !fainted && battle.game_type == Some(GameType::Triples) && (slot == 0 || slot == 2) {
        actions.push(Action::Shift);
    }

    if actions.is_empty() {
        actions.push(Action::Pass);
    }
    actions
}

fn move_actions(
    battle: &TrackedBattle,
    player: Player,
    slot: usize,
    active: &ActivePokemon,
) -> Vec<Action> {
    let tracked_dynamax = battle
        .get_side(player)
        .and_then(|side| side.active(slot))
        .is_some_and(|a| a.has_volatile(&Volatile::Dynamaxed));
    let dynamaxed = tracked_dynamax || (active.max_moves.is_some() && !active.can_dynamax);

    let mut actions = Vec::new();
    for (index, slot_move) in active.available_moves() {
        let mut offer = |id: String, target_type: MoveTarget, gimmick: Option<Gimmick>| {
            for target in move_targets(battle, player, slot, target_type) {
                actions.push(Action::Move(MoveAction {
                    index,
                    id: id.clone(),
                    base_id: slot_move.id.clone(),
                    target_type,
                    target,
                    gimmick,
                }));
            }
        };

        if dynamaxed {
            match active.max_move(index) {
                Some(max) => offer(to_id(&max.name), max.target_type(), None),
                None => offer(slot_move.id.clone(), slot_move.target_type(), None),
            }
            continue;
        }

        let target_type = slot_move.target_type();
        offer(slot_move.id.clone(), target_type, None);

        if let Some(z) = active.z_move(index) {
            offer(to_id(&z.name), z.target_type(), Some(Gimmick::ZMove));
        }
        if active.can_dynamax
            && let Some(max) = active.max_move(index)
            && !max.disabled
        {
            offer(to_id(&max.name), max.target_type(), Some(Gimmick::Dynamax));
        }
        if active.can_mega_evo {
            offer(slot_move.id.clone(), target_type, Some(Gimmick::Mega));
        }
        if active.can_ultra_burst {
            offer(slot_move.id.clone(), target_type, Some(Gimmick::UltraBurst));
        }
        if active.can_terastallize.is_some() {
            offer(slot_move.id.clone(), target_type, Some(Gimmick::Terastallize));
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use zoroark_protocol::BattleRequest;

    fn battle_with(request: &str) -> TrackedBattle {
        let mut battle = TrackedBattle::new();
        battle.set_perspective(Player::P1);
        battle.request = Some(BattleRequest::from_json(request).unwrap());
        battle
    }

    const SINGLES: &str = r#"{
        "active": [{
            "moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal"},
                {"move": "Volt Switch", "id": "voltswitch", "pp": 0, "maxpp": 32, "target": "normal"},
                {"move": "Protect", "id": "protect", "pp": 16, "maxpp": 16, "target": "self", "disabled": true}
            ],
            "canTerastallize": "Electric"
        }],
        "side": {"name": "me", "id": "p1", "pokemon": [
            {"ident": "p1: Pikachu", "details": "Pikachu, L50", "condition": "100/100", "active": true},
            {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "200/200", "active": false},
            {"ident": "p1: Eevee", "details": "Eevee", "condition": "0 fnt", "active": false}
        ]},
        "rqid": 1
    }"#;

    #[test]
    fn test_no_request_passes() {
        let battle = TrackedBattle::new();
        assert_eq!(legal_actions(&battle, 0), vec![Action::Pass]);
    }

    #[test]
    fn test_singles_moves_gimmicks_and_switches() {
        let battle = battle_with(SINGLES);
        let actions = legal_actions(&battle, 0);

        let moves: Vec<_> = actions.iter().filter_map(Action::as_move).collect();
        // Thunderbolt plain and terastallized; no PP and disabled moves dropped
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.id == "thunderbolt" && m.target.is_none()));
        assert_eq!(moves[1].gimmick, Some(Gimmick::Terastallize));

        let switches: Vec<_> = actions.iter().filter_map(Action::switch_position).collect();
        assert_eq!(switches, vec![1]);
        assert!(!actions.contains(&Action::Shift));
    }

    #[test]
    fn test_trapped_cannot_switch() {
        let trapped = SINGLES.replace(
            r#""canTerastallize""#,
            r#""trapped": true, "canTerastallize""#,
        );
        let battle = battle_with(&trapped);
        let actions = legal_actions(&battle, 0);
        assert!(actions.iter().all(|a| a.switch_position().is_none()));
    }

    #[test]
    fn test_struggle_without_pp_budget() {
        let battle = battle_with(
            r#"{"active": [{"moves": [{"move": "Struggle", "id": "struggle", "target": "randomNormal"}], "trapped": true}],
                "side": {"name": "me", "id": "p1", "pokemon": [
                    {"ident": "p1: Pikachu", "details": "Pikachu", "condition": "10/100", "active": true}
                ]}}"#,
        );
        let actions = legal_actions(&battle, 0);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].as_move().map(|m| m.id.as_str()), Some("struggle"));
    }

    #[test]
    fn test_action_to_choice() {
        let action = Action::Move(MoveAction {
            index: 0,
            id: "thunderbolt".to_string(),
            base_id: "thunderbolt".to_string(),
            target_type: MoveTarget::Normal,
            target: Some(2),
            gimmick: Some(Gimmick::Terastallize),
        });
        assert_eq!(action.to_choice().to_protocol_string(), "move 1 2 terastallize");
        assert_eq!(Action::Switch(3).to_choice().to_protocol_string(), "switch 4");
    }
}
