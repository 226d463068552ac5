mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Harness, battle, boost, faint, preview, set_request, switch_in, use_move};
use zoroark_agent::{
    Agent, AgentConfig, GenericStrategy, MemoryLog, RandomStrategy, Reason, Strategy,
    estimate_accuracy, legal_actions,
};
use zoroark_battle::TrackedBattle;
use zoroark_protocol::{ActiveChoice, Decision, GameType, Gimmick, Player, Stat, SwitchChoice};

const DOUBLES_ACTIVE: &str = r#"{
    "active": [
        {"moves": [{"move": "Tackle", "id": "tackle", "pp": 56, "maxpp": 56, "target": "normal"}],
         "canTerastallize": "Normal"},
        {"moves": [{"move": "Earthquake", "id": "earthquake", "pp": 16, "maxpp": 16, "target": "allAdjacent"}],
         "canTerastallize": "Ground"}
    ],
    "side": {"name": "me", "id": "p1", "pokemon": [
        {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "460/460", "active": true},
        {"ident": "p1: Garchomp", "details": "Garchomp", "condition": "357/357", "active": true},
        {"ident": "p1: Eevee", "details": "Eevee", "condition": "220/220", "active": false}
    ]},
    "rqid": 3
}"#;

fn doubles_field() -> TrackedBattle {
    let mut battle = battle(GameType::Doubles);
    switch_in(&mut battle, "p1a: Snorlax", "Snorlax", "460/460");
    switch_in(&mut battle, "p1b: Garchomp", "Garchomp", "357/357");
    switch_in(&mut battle, "p2a: Pikachu", "Pikachu, L50", "100/100");
    switch_in(&mut battle, "p2b: Gengar", "Gengar", "100/100");
    battle
}

fn seeded<S: Strategy>(strategy: S, seed: u64) -> Agent<S> {
    Agent::new(strategy, AgentConfig::default().with_seed(seed))
}

async fn tackle_accuracy(battle: &TrackedBattle) -> f64 {
    let harness = Harness::new();
    let ctx = harness.ctx(battle);
    estimate_accuracy(&ctx, (Player::P1, 0), (Player::P2, 0), "Tackle").await
}

#[tokio::test]
async fn test_accuracy_follows_stages() {
    let mut battle = battle(GameType::Singles);
    switch_in(&mut battle, "p1a: Snorlax", "Snorlax", "460/460");
    switch_in(&mut battle, "p2a: Eevee", "Eevee", "100/100");
    assert_eq!(tackle_accuracy(&battle).await, 1.0);

    // Capped at certain
    boost(&mut battle, "p1a: Snorlax", Stat::Accuracy, 2);
    assert_eq!(tackle_accuracy(&battle).await, 1.0);

    boost(&mut battle, "p1a: Snorlax", Stat::Accuracy, -2);
    boost(&mut battle, "p2a: Eevee", Stat::Evasion, 2);
    assert!((tackle_accuracy(&battle).await - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_no_request_waits() {
    let mut battle = battle(GameType::Singles);
    let mut agent = seeded(GenericStrategy, 1);
    assert_eq!(agent.decide(&mut battle).await, Decision::Wait);

    set_request(
        &mut battle,
        r#"{"wait": true, "side": {"name": "me", "id": "p1", "pokemon": []}}"#,
    );
    assert_eq!(agent.decide(&mut battle).await, Decision::Wait);
}

#[tokio::test]
async fn test_team_preview_leads_best_matchup() {
    let mut battle = battle(GameType::Singles);
    preview(&mut battle, Player::P2, "Pikachu, L50");
    set_request(
        &mut battle,
        r#"{"teamPreview": true, "side": {"name": "me", "id": "p1", "pokemon": [
            {"ident": "p1: Gengar", "details": "Gengar", "condition": "324/324", "active": false},
            {"ident": "p1: Garchomp", "details": "Garchomp", "condition": "357/357", "active": false},
            {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "460/460", "active": false}
        ]}, "rqid": 1}"#,
    );

    let mut agent = seeded(GenericStrategy, 5);
    assert_eq!(agent.decide(&mut battle).await, Decision::Team(vec![1, 0, 2]));

    for seed in 0..10 {
        let mut agent = seeded(RandomStrategy, seed);
        let Decision::Team(order) = agent.decide(&mut battle).await else {
            panic!("expected a team order");
        };
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }
}

#[tokio::test]
async fn test_force_switch_positions_are_distinct() {
    let mut battle = doubles_field();
    faint(&mut battle, "p1a: Snorlax");
    faint(&mut battle, "p1b: Garchomp");
    set_request(
        &mut battle,
        r#"{"forceSwitch": [true, true], "side": {"name": "me", "id": "p1", "pokemon": [
            {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "0 fnt", "active": true},
            {"ident": "p1: Garchomp", "details": "Garchomp", "condition": "0 fnt", "active": true},
            {"ident": "p1: Eevee", "details": "Eevee", "condition": "220/220", "active": false},
            {"ident": "p1: Pikachu", "details": "Pikachu", "condition": "180/180", "active": false}
        ]}, "rqid": 7}"#,
    );

    for seed in 0..10 {
        let mut agent = seeded(GenericStrategy, seed);
        let Decision::ForceSwitch(choices) = agent.decide(&mut battle).await else {
            panic!("expected a forced switch");
        };
        let positions: HashSet<usize> = choices
            .iter()
            .map(|choice| match choice {
                SwitchChoice::Switch(position) => *position,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(positions, HashSet::from([2, 3]));
    }
}

#[tokio::test]
async fn test_one_gimmick_per_turn_in_doubles() {
    let mut battle = doubles_field();
    set_request(&mut battle, DOUBLES_ACTIVE);

    let mut saw_tera = false;
    for seed in 0..40 {
        let mut agent = seeded(RandomStrategy, seed);
        let Decision::Active(choices) = agent.decide(&mut battle).await else {
            panic!("expected active choices");
        };
        assert_eq!(choices.len(), 2);
        let teras = choices
            .iter()
            .filter(|choice| choice.gimmick() == Some(Gimmick::Terastallize))
            .count();
        assert!(teras <= 1, "seed {seed} terastallized twice");
        saw_tera |= teras == 1;

        if let [ActiveChoice::Switch(a), ActiveChoice::Switch(b)] = choices.as_slice() {
            assert_ne!(a, b);
        }
    }
    assert!(saw_tera);
}

#[tokio::test]
async fn test_fainted_targets_still_offer_a_location() {
    let mut battle = doubles_field();
    faint(&mut battle, "p2a: Pikachu");
    faint(&mut battle, "p2b: Gengar");
    set_request(
        &mut battle,
        r#"{"active": [
            {"moves": [{"move": "Tackle", "id": "tackle", "pp": 56, "maxpp": 56, "target": "adjacentFoe"}]},
            {"moves": [{"move": "Tackle", "id": "tackle", "pp": 56, "maxpp": 56, "target": "adjacentFoe"}]}
        ], "side": {"name": "me", "id": "p1", "pokemon": [
            {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "460/460", "active": true},
            {"ident": "p1: Garchomp", "details": "Garchomp", "condition": "357/357", "active": true}
        ]}, "rqid": 9}"#,
    );
    battle.reconcile();

    let actions = legal_actions(&battle, 0);
    let targets: Vec<_> = actions
        .iter()
        .filter_map(|action| action.as_move())
        .map(|chosen| chosen.target)
        .collect();
    assert_eq!(targets.len(), 1);
    assert!(targets[0].is_some_and(|location| location > 0));
}

#[tokio::test]
async fn test_random_choices_are_legal() {
    let mut battle = battle(GameType::Singles);
    switch_in(&mut battle, "p1a: Pikachu", "Pikachu", "180/180");
    switch_in(&mut battle, "p2a: Snorlax", "Snorlax", "100/100");
    set_request(
        &mut battle,
        r#"{"active": [{"moves": [
                {"move": "Thunderbolt", "id": "thunderbolt", "pp": 24, "maxpp": 24, "target": "normal"},
                {"move": "Thunder Wave", "id": "thunderwave", "pp": 32, "maxpp": 32, "target": "normal"}
            ], "canTerastallize": "Electric"}],
            "side": {"name": "me", "id": "p1", "pokemon": [
                {"ident": "p1: Pikachu", "details": "Pikachu", "condition": "180/180", "active": true},
                {"ident": "p1: Eevee", "details": "Eevee", "condition": "220/220", "active": false}
            ]}, "rqid": 2}"#,
    );
    battle.reconcile();
    let legal: Vec<ActiveChoice> = legal_actions(&battle, 0)
        .iter()
        .map(|action| action.to_choice())
        .collect();

    for seed in 0..20 {
        let mut agent = seeded(RandomStrategy, seed);
        let Decision::Active(choices) = agent.decide(&mut battle).await else {
            panic!("expected active choices");
        };
        assert_eq!(choices.len(), 1);
        assert!(legal.contains(&choices[0]), "{:?} is not legal", choices[0]);
    }
}

#[tokio::test]
async fn test_generic_takes_the_knockout() {
    let mut battle = battle(GameType::Singles);
    switch_in(&mut battle, "p1a: Garchomp", "Garchomp", "357/357");
    switch_in(&mut battle, "p2a: Pikachu", "Pikachu, L50", "10/100");
    set_request(
        &mut battle,
        r#"{"active": [{"moves": [
                {"move": "Earthquake", "id": "earthquake", "pp": 16, "maxpp": 16, "target": "allAdjacent"},
                {"move": "Swords Dance", "id": "swordsdance", "pp": 32, "maxpp": 32, "target": "self"}
            ]}],
            "side": {"name": "me", "id": "p1", "pokemon": [
                {"ident": "p1: Garchomp", "details": "Garchomp", "condition": "357/357", "active": true,
                 "stats": {"atk": 359, "def": 226, "spa": 176, "spd": 206, "spe": 333},
                 "moves": ["earthquake", "swordsdance"], "baseAbility": "roughskin", "item": "lifeorb"},
                {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "460/460", "active": false}
            ]}, "rqid": 4}"#,
    );

    let log = Arc::new(MemoryLog::new());
    let mut agent = seeded(GenericStrategy, 11).with_log(log.clone());
    let decision = agent.decide(&mut battle).await;
    assert_eq!(
        decision,
        Decision::Active(vec![ActiveChoice::Move {
            index: 0,
            target: None,
            gimmick: None,
        }])
    );

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, Reason::GuaranteedKo);
    assert_eq!(records[0].choice, "move 1");
}

#[tokio::test]
async fn test_status_move_viability() {
    let mut battle = battle(GameType::Singles);
    switch_in(&mut battle, "p1a: Pikachu", "Pikachu", "180/180");
    switch_in(&mut battle, "p2a: Garchomp", "Garchomp", "100/100");

    let harness = Harness::new();
    let user = (Player::P1, 0);
    let foe = Some((Player::P2, 0));
    {
        let ctx = harness.ctx(&battle);
        assert!(!harness.registry.is_viable(&ctx, user, foe, "thunderwave", false));
        assert!(harness.registry.is_viable(&ctx, user, None, "swordsdance", false));
    }

    switch_in(&mut battle, "p2a: Snorlax", "Snorlax", "100/100");
    boost(&mut battle, "p1a: Pikachu", Stat::Atk, 6);
    let ctx = harness.ctx(&battle);
    assert!(harness.registry.is_viable(&ctx, user, foe, "thunderwave", false));
    assert!(!harness.registry.is_viable(&ctx, user, None, "swordsdance", false));
}

#[tokio::test]
async fn test_counter_waits_for_a_physical_threat() {
    let mut battle = battle(GameType::Singles);
    switch_in(&mut battle, "p1a: Snorlax", "Snorlax", "460/460");
    switch_in(&mut battle, "p2a: Garchomp", "Garchomp", "100/100");
    set_request(
        &mut battle,
        r#"{"active": [{"moves": [
                {"move": "Counter", "id": "counter", "pp": 32, "maxpp": 32, "target": "scripted"},
                {"move": "Tackle", "id": "tackle", "pp": 56, "maxpp": 56, "target": "normal"}
            ]}],
            "side": {"name": "me", "id": "p1", "pokemon": [
                {"ident": "p1: Snorlax", "details": "Snorlax", "condition": "460/460", "active": true,
                 "stats": {"atk": 256, "def": 166, "spa": 166, "spd": 256, "spe": 96},
                 "moves": ["counter", "tackle"], "baseAbility": "thickfat", "item": "leftovers"}
            ]}, "rqid": 5}"#,
    );

    let tackle = Decision::Active(vec![ActiveChoice::Move {
        index: 1,
        target: None,
        gimmick: None,
    }]);
    let counter = Decision::Active(vec![ActiveChoice::Move {
        index: 0,
        target: None,
        gimmick: None,
    }]);

    let mut agent = seeded(GenericStrategy, 3);
    assert_eq!(agent.decide(&mut battle).await, tackle);

    use_move(&mut battle, "p2a: Garchomp", "Earthquake");
    let log = Arc::new(MemoryLog::new());
    let mut agent = seeded(GenericStrategy, 3).with_log(log.clone());
    assert_eq!(agent.decide(&mut battle).await, counter);
    assert_eq!(log.records()[0].reason, Reason::StatusMove);
}
