//! End-to-end rule scenarios driven through the public session API.
//!
//! Run with:
//!     cargo test --test session_scenarios

use std::collections::{BTreeMap, BTreeSet};

use cathedral_engine::games::cathedral::pieces::{PieceDefinition, Rotation};
use cathedral_engine::games::cathedral::session::{GameSession, SessionConfig, SessionSnapshot};
use cathedral_engine::games::cathedral::types::*;

fn counts(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries.iter().map(|&(id, n)| (id.to_string(), n)).collect()
}

fn single(id: &str) -> PieceDefinition {
    PieceDefinition::new(id, &[(0, 0)])
}

/// 3x3 ring with a hole in the middle; the origin is the ring's lower-left cell.
fn ring() -> PieceDefinition {
    PieceDefinition::new(
        "ring",
        &[(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)],
    )
}

fn minimal_session() -> GameSession {
    GameSession::new(SessionConfig {
        board_size: BoardSize::new(10, 10),
        neutral_piece: "N".into(),
        inventories: PerSeat::new(counts(&[("A", 1)]), counts(&[("A", 1)])),
        piece_sizes: counts(&[("N", 1), ("A", 1)]),
        starting_player: Seat::First,
    })
    .unwrap()
}

fn ring_session(first: &[(&str, u32)], second: &[(&str, u32)]) -> GameSession {
    GameSession::new(SessionConfig {
        board_size: BoardSize::new(10, 10),
        neutral_piece: "N".into(),
        inventories: PerSeat::new(counts(first), counts(second)),
        piece_sizes: counts(&[("N", 1), ("dot", 1), ("ring", 8)]),
        starting_player: Seat::First,
    })
    .unwrap()
}

fn place(session: &mut GameSession, piece: &PieceDefinition, x: i32, y: i32) {
    session
        .try_place_piece(piece, Cell::new(x, y), Rotation::R0)
        .unwrap_or_else(|e| panic!("placing {} at {x},{y} failed: {e}", piece.type_id));
}

#[test]
fn test_opening_sequence() {
    let mut session = minimal_session();
    assert_eq!(session.phase(), Phase::CathedralPlacement);

    let err = session
        .try_place_piece(&single("A"), Cell::new(1, 0), Rotation::R0)
        .unwrap_err();
    assert_eq!(err, PlacementFailure::InvalidPieceForPhase);

    let neutral = session
        .try_place_piece(&single("N"), Cell::new(0, 0), Rotation::R0)
        .unwrap();
    assert!(neutral.is_neutral);
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert_eq!(session.current_player(), Seat::First);

    let outcome = session
        .try_place_piece(&single("A"), Cell::new(1, 0), Rotation::R0)
        .unwrap();
    assert_eq!(outcome.owner, Owner::Seat(Seat::First));
    assert!(!outcome.is_neutral);
    assert_eq!(outcome.cells, vec![Cell::new(1, 0)]);
    assert_eq!(session.remaining(Seat::First, "A"), 0);
    assert!(session.finished(Seat::First));
    assert_eq!(session.current_player(), Seat::Second);
}

#[test]
fn test_round_ends_when_both_finish() {
    let mut session = minimal_session();
    place(&mut session, &single("N"), 0, 0);
    place(&mut session, &single("A"), 1, 0);
    let revision = session.round_revision();

    // Only the second player is left; finishing ends the round.
    session.finish_round_for_current_player();

    assert_eq!(session.round(), 2);
    assert_eq!(session.score(Seat::First), 0);
    assert_eq!(session.score(Seat::Second), 1);
    assert_eq!(session.phase(), Phase::CathedralPlacement);
    assert_eq!(session.round_revision(), revision + 1);
    assert_eq!(session.board().occupied().count(), 0);
    assert_eq!(session.placed_pieces().count(), 0);
    assert_eq!(session.remaining(Seat::First, "A"), 1);
    assert_eq!(session.remaining(Seat::Second, "A"), 1);
    assert!(!session.finished(Seat::First));
    assert!(!session.finished(Seat::Second));

    // The second player opens round two.
    place(&mut session, &single("N"), 9, 9);
    assert_eq!(session.current_player(), Seat::Second);
}

#[test]
fn test_game_over_after_second_round() {
    let mut session = minimal_session();
    for _ in 0..2 {
        place(&mut session, &single("N"), 0, 0);
        session.finish_round_for_current_player();
        session.finish_round_for_current_player();
    }

    assert!(session.is_game_over());
    assert_eq!(session.phase(), Phase::PlayerTurn);
    assert_eq!(session.round(), 2);
    assert_eq!(session.score(Seat::First), 2);
    assert_eq!(session.score(Seat::Second), 2);

    let before = session.build_snapshot();
    assert!(session
        .try_place_piece(&single("A"), Cell::new(5, 5), Rotation::R0)
        .is_err());
    session.finish_round_for_current_player();
    assert_eq!(session.build_snapshot(), before);
}

#[test]
fn test_enclosing_one_piece_captures_it() {
    let mut session = ring_session(&[("ring", 1), ("dot", 1)], &[("dot", 2)]);
    place(&mut session, &single("N"), 9, 9);
    place(&mut session, &single("dot"), 0, 9);
    place(&mut session, &single("dot"), 5, 5);
    assert_eq!(session.remaining(Seat::Second, "dot"), 1);

    let outcome = session
        .try_place_piece(&ring(), Cell::new(4, 4), Rotation::R0)
        .unwrap();
    assert_eq!(outcome.captured.len(), 1);
    assert_eq!(outcome.captured[0].owner, Owner::Seat(Seat::Second));
    assert_eq!(outcome.captured[0].piece_type, "dot");

    assert_eq!(session.remaining(Seat::Second, "dot"), 2);
    assert!(!session.board().is_occupied(Cell::new(5, 5)));
    assert_eq!(
        session.claimed_territory(Seat::First),
        &BTreeSet::from([Cell::new(5, 5)])
    );
    assert!(session.claimed_territory(Seat::Second).is_empty());

    assert_eq!(session.current_player(), Seat::Second);
    let err = session
        .try_place_piece(&single("dot"), Cell::new(5, 5), Rotation::R0)
        .unwrap_err();
    assert_eq!(err, PlacementFailure::InOpponentTerritory);
}

#[test]
fn test_enclosed_cathedral_is_removed_then_claimed() {
    let mut session = ring_session(&[("ring", 1), ("dot", 2)], &[("dot", 3)]);
    place(&mut session, &single("N"), 5, 5);
    place(&mut session, &single("dot"), 0, 9);
    place(&mut session, &single("dot"), 9, 0);
    place(&mut session, &single("dot"), 0, 8);
    place(&mut session, &single("dot"), 9, 1);

    let outcome = session
        .try_place_piece(&ring(), Cell::new(4, 4), Rotation::R0)
        .unwrap();
    assert_eq!(outcome.removed_neutrals.len(), 1);
    assert!(outcome.captured.is_empty());
    assert!(session.placed_pieces().all(|p| !p.is_neutral()));
    assert_eq!(
        session.claimed_territory(Seat::First),
        &BTreeSet::from([Cell::new(5, 5)])
    );
    // Neutral pieces never go back to an inventory.
    assert_eq!(session.remaining(Seat::First, "N"), 0);
    assert_eq!(session.remaining(Seat::Second, "N"), 0);
}

#[test]
fn test_two_intruders_prevent_claim() {
    let big_ring = PieceDefinition::new(
        "big_ring",
        &[
            (0, 0),
            (1, 0),
            (2, 0),
            (3, 0),
            (0, 1),
            (3, 1),
            (0, 2),
            (1, 2),
            (2, 2),
            (3, 2),
        ],
    );
    let config = SessionConfig {
        board_size: BoardSize::new(10, 10),
        neutral_piece: "N".into(),
        inventories: PerSeat::new(
            counts(&[("big_ring", 1), ("dot", 1)]),
            counts(&[("dot", 3)]),
        ),
        piece_sizes: counts(&[("N", 1), ("dot", 1), ("big_ring", 10)]),
        starting_player: Seat::First,
    };
    let mut session = GameSession::new(config).unwrap();

    // Round one is skipped with penalties for everything unplaced.
    place(&mut session, &single("N"), 9, 9);
    place(&mut session, &single("dot"), 0, 9);
    place(&mut session, &single("dot"), 4, 5);
    session.finish_round_for_current_player();
    assert_eq!(session.current_player(), Seat::Second);
    session.finish_round_for_current_player();
    assert_eq!(session.round(), 2);
    assert_eq!(session.score(Seat::First), 10);
    assert_eq!(session.score(Seat::Second), 2);

    // Round two: the second player moves first.
    place(&mut session, &single("N"), 9, 9);
    assert_eq!(session.current_player(), Seat::Second);
    place(&mut session, &single("dot"), 4, 5);
    place(&mut session, &single("dot"), 0, 9);
    place(&mut session, &single("dot"), 5, 5);
    let outcome = session
        .try_place_piece(&big_ring, Cell::new(3, 4), Rotation::R0)
        .unwrap();
    assert!(outcome.captured.is_empty());
    assert!(session.claimed_territory(Seat::First).is_empty());
    assert!(session.board().is_occupied(Cell::new(4, 5)));
    assert!(session.board().is_occupied(Cell::new(5, 5)));
}

#[test]
fn test_snapshot_survives_json() {
    let mut session = ring_session(&[("ring", 1), ("dot", 1)], &[("dot", 2)]);
    place(&mut session, &single("N"), 9, 9);
    place(&mut session, &single("dot"), 0, 9);
    place(&mut session, &single("dot"), 5, 5);
    place(&mut session, &ring(), 4, 4);

    let snapshot = session.build_snapshot();
    assert_eq!(snapshot, session.build_snapshot());

    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, snapshot);

    let mut restored = ring_session(&[("ring", 1), ("dot", 1)], &[("dot", 2)]);
    restored.load_snapshot(&decoded);
    assert_eq!(restored.build_snapshot(), snapshot);
    assert_eq!(restored.board(), session.board());
    assert_eq!(
        restored.claimed_territory(Seat::First),
        session.claimed_territory(Seat::First)
    );
}

#[test]
fn test_load_snapshot_trusts_claims_verbatim() {
    let mut session = minimal_session();
    place(&mut session, &single("N"), 0, 0);
    let mut snapshot = session.build_snapshot();
    snapshot.claimed[Seat::Second] = vec![Cell::new(3, 3), Cell::new(4, 4)];
    session.load_snapshot(&snapshot);

    assert_eq!(session.claimed_territory(Seat::Second).len(), 2);
    let err = session
        .try_place_piece(&single("A"), Cell::new(3, 3), Rotation::R0)
        .unwrap_err();
    assert_eq!(err, PlacementFailure::InOpponentTerritory);
}
