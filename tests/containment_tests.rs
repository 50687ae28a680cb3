//! Containment integration tests.
//!
//! These tests drive the registry and containment index through the game
//! facade and check that both views of the relation always agree.

use std::sync::Arc;

use grid_engine::board::{BoardBuilder, BoardId, CellRef, Location};
use grid_engine::containment::{ContainmentIndex, Container};
use grid_engine::core::{EngineError, EntityId, GameConfig, GameObject, Player, PlayerId};
use grid_engine::game::{Game, GameBuilder};
use proptest::prelude::*;

#[derive(Debug)]
struct Token;

impl GameObject for Token {
    fn kind(&self) -> &str {
        "token"
    }
}

fn board_game() -> Game {
    GameBuilder::new(GameConfig::new("containment"))
        .with_board(BoardBuilder::new(BoardId::new(0), "grid").fill(4, 4, "floor").build())
        .build()
        .unwrap()
}

fn cell(column: i32, row: i32) -> CellRef {
    CellRef::new(BoardId::new(0), Location::new(column, row))
}

/// Every registered object is in exactly one container, and that container
/// lists it.
fn assert_invariant(game: &Game) {
    for id in game.objects().keys() {
        let container = game.container_of(*id).unwrap();
        assert!(game.contains(container, *id), "{} missing from {}", id, container);
    }
    assert!(game.containment().check_consistency());
    assert_eq!(game.containment().len(), game.object_count());
}

#[test]
fn test_new_objects_start_in_root() {
    let game = board_game();
    let a = game.add_object(Arc::new(Token)).unwrap();
    let b = game.add_object(Arc::new(Token)).unwrap();

    assert_eq!(a, EntityId(1));
    assert_eq!(b, EntityId(2));
    assert_eq!(game.contents_of(Container::Root).len(), 2);
    assert_invariant(&game);
}

#[test]
fn test_move_between_all_container_kinds() {
    let game = board_game();
    game.add_player(Player::new(PlayerId::new(1))).unwrap();
    let bag = game.add_object(Arc::new(Token)).unwrap();
    let gem = game.add_object(Arc::new(Token)).unwrap();

    let route = [
        Container::Cell(cell(0, 0)),
        Container::Player(PlayerId::new(1)),
        Container::Object(bag),
        Container::Cell(cell(3, 3)),
        Container::Root,
    ];
    let mut previous = Container::Root;
    for target in route {
        assert_eq!(game.move_object(gem, target).unwrap(), previous);
        assert_eq!(game.container_of(gem).unwrap(), target);
        assert!(!game.contains(previous, gem) || previous == target);
        assert_invariant(&game);
        previous = target;
    }
}

#[test]
fn test_contents_snapshot_is_stable() {
    let game = board_game();
    let a = game.add_object(Arc::new(Token)).unwrap();
    game.move_object(a, Container::Cell(cell(1, 2))).unwrap();

    let first = game.contents_of(Container::Cell(cell(1, 2)));
    let second = game.contents_of(Container::Cell(cell(1, 2)));
    assert_eq!(first, second);

    game.move_object(a, Container::Root).unwrap();
    assert!(first.contains(&a), "snapshot must not follow later moves");
    assert!(game.contents_of(Container::Cell(cell(1, 2))).is_empty());
}

#[test]
fn test_removed_player_returns_items_to_root() {
    let game = board_game();
    let player = PlayerId::new(5);
    game.add_player(Player::new(player)).unwrap();
    let sword = game.add_object(Arc::new(Token)).unwrap();
    game.move_object(sword, Container::Player(player)).unwrap();

    game.remove_player(player).unwrap();

    assert_eq!(game.container_of(sword).unwrap(), Container::Root);
    assert!(matches!(
        game.move_object(sword, Container::Player(player)),
        Err(EngineError::UnknownPlayer(_))
    ));
    assert_invariant(&game);
}

#[test]
fn test_location_resolves_one_hop() {
    let game = board_game();
    let cart = game.add_object(Arc::new(Token)).unwrap();
    let crate_ = game.add_object(Arc::new(Token)).unwrap();
    let apple = game.add_object(Arc::new(Token)).unwrap();

    game.move_object(cart, Container::Cell(cell(2, 2))).unwrap();
    game.move_object(crate_, Container::Object(cart)).unwrap();
    game.move_object(apple, Container::Object(crate_)).unwrap();

    assert_eq!(game.location_of(cart).unwrap(), Some(cell(2, 2)));
    assert_eq!(game.location_of(crate_).unwrap(), Some(cell(2, 2)));
    assert_eq!(game.location_of(apple).unwrap(), None);
}

#[test]
fn test_location_of_unknown_entity() {
    let game = board_game();
    assert!(matches!(
        game.location_of(EntityId(40)),
        Err(EngineError::NotRegistered(_))
    ));
}

#[derive(Clone, Debug)]
enum Op {
    Add,
    Move(usize, u8),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        (any::<usize>(), any::<u8>()).prop_map(|(i, t)| Op::Move(i, t)),
        any::<usize>().prop_map(Op::Remove),
    ]
}

fn target_for(selector: u8, live: &[EntityId]) -> Container {
    match selector % 4 {
        0 => Container::Root,
        1 => Container::Cell(cell(i32::from(selector % 4), i32::from(selector / 64))),
        2 => Container::Player(PlayerId::new(1)),
        _ if !live.is_empty() => Container::Object(live[usize::from(selector) % live.len()]),
        _ => Container::Root,
    }
}

proptest! {
    #[test]
    fn prop_invariant_holds_under_random_ops(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let game = board_game();
        game.add_player(Player::new(PlayerId::new(1))).unwrap();
        let mut live: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                Op::Add => live.push(game.add_object(Arc::new(Token)).unwrap()),
                Op::Move(i, t) if !live.is_empty() => {
                    let entity = live[i % live.len()];
                    let target = target_for(t, &live);
                    game.move_object(entity, target).unwrap();
                }
                Op::Remove(i) if !live.is_empty() => {
                    let entity = live.remove(i % live.len());
                    game.remove_object(entity).unwrap();
                    prop_assert!(game.object(entity).is_none());
                    prop_assert!(!game.containment().is_tracked(entity));
                }
                _ => {}
            }

            for id in &live {
                let container = game.container_of(*id).unwrap();
                prop_assert!(game.contains(container, *id));
                if let Container::Object(holder) = container {
                    prop_assert!(live.contains(&holder), "{} held by removed {}", id, holder);
                }
            }
            prop_assert!(game.containment().check_consistency());
            prop_assert_eq!(game.containment().len(), live.len());
        }
    }

    #[test]
    fn prop_index_place_keeps_single_parent(moves in prop::collection::vec((0u32..8, 0u8..3), 1..100)) {
        let index = ContainmentIndex::new();
        for id in 0..8 {
            index.insert(EntityId(id), Container::Root).unwrap();
        }

        for (id, slot) in moves {
            let target = match slot {
                0 => Container::Root,
                1 => Container::Player(PlayerId::new(id % 2)),
                _ => Container::Object(EntityId((id + 1) % 8)),
            };
            let before = index.container_of(EntityId(id)).unwrap();
            let previous = index.place(EntityId(id), target).unwrap();
            prop_assert_eq!(previous, before);

            let holders: usize = [Container::Root, Container::Player(PlayerId::new(0)), Container::Player(PlayerId::new(1))]
                .into_iter()
                .chain((0..8).map(|h| Container::Object(EntityId(h))))
                .filter(|c| index.contains(*c, EntityId(id)))
                .count();
            prop_assert_eq!(holders, 1);
        }
        prop_assert!(index.check_consistency());
    }
}
