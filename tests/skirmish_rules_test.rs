//! Rule scenarios played through the public game API.

use skirmish::{
    Cell, Game, MoveError, Piece, PieceKind, PieceRegistry, PieceSelector, Players, Side,
    TurnState,
};

fn cell(row: usize, col: usize) -> Cell {
    Cell::new(row, col).unwrap()
}

fn pieces_of(game: &Game, side: Side) -> usize {
    game.players().get(side).len()
}

fn assert_board_matches_registries(game: &Game) {
    let total = pieces_of(game, Side::Player1) + pieces_of(game, Side::Player2);
    assert_eq!(game.board().occupied(), total);
    for (side, registry) in game.players().iter() {
        for piece in registry.iter() {
            let occupant = game.board().get(piece.cell).unwrap();
            assert_eq!(occupant.player, side);
            assert_eq!(occupant.kind, piece.kind);
        }
    }
}

#[test]
fn test_pawn_forward_from_corner() {
    let mut game = Game::standard();
    let accepted = game
        .apply_move(Side::Player1, PieceSelector::kind(PieceKind::Pawn), "F")
        .unwrap();

    assert_eq!(accepted.record.resulting, cell(1, 0));
    assert!(game.board().get(cell(0, 0)).is_none());
    assert_eq!(game.board().get(cell(1, 0)).unwrap().kind, PieceKind::Pawn);
    assert_board_matches_registries(&game);
}

#[test]
fn test_hero2_diagonal_capture() {
    let attacker = PieceRegistry::from_pieces(
        Side::Player1,
        vec![
            Piece::new(PieceKind::Pawn, cell(0, 0)),
            Piece::new(PieceKind::Hero2, cell(0, 2)),
        ],
    )
    .unwrap();
    let defender = PieceRegistry::from_pieces(
        Side::Player2,
        vec![
            Piece::new(PieceKind::Hero1, cell(2, 4)),
            Piece::new(PieceKind::Pawn, cell(4, 0)),
        ],
    )
    .unwrap();
    let mut game = Game::from_players(Players::from_registries(attacker, defender).unwrap(), Side::Player1);

    let accepted = game
        .apply_move(Side::Player1, PieceSelector::kind(PieceKind::Hero2), "FR")
        .unwrap();

    assert_eq!(accepted.captured, Some(Piece::new(PieceKind::Hero1, cell(2, 4))));
    assert!(!accepted.is_terminal());
    assert_eq!(pieces_of(&game, Side::Player1), 2);
    assert_eq!(pieces_of(&game, Side::Player2), 1);
    let occupant = game.board().get(cell(2, 4)).unwrap();
    assert_eq!((occupant.player, occupant.kind), (Side::Player1, PieceKind::Hero2));
    assert_board_matches_registries(&game);
}

#[test]
fn test_out_of_bounds_is_rejected_without_change() {
    let mut game = Game::standard();
    let before = game.clone();

    let err = game
        .apply_move(Side::Player1, PieceSelector::kind(PieceKind::Hero1), "B")
        .unwrap_err();

    assert_eq!(err, MoveError::OutOfBounds);
    assert_eq!(err.to_string(), "out of bounds");
    assert_eq!(game, before);
}

#[test]
fn test_self_capture_is_rejected_without_change() {
    let mut game = Game::standard();
    let before = game.clone();

    let err = game
        .apply_move(Side::Player1, PieceSelector::kind(PieceKind::Hero1), "R")
        .unwrap_err();

    assert_eq!(err, MoveError::OwnPieceCapture);
    assert_eq!(game, before);
}

#[test]
fn test_capturing_last_piece_ends_the_game() {
    let hunter = PieceRegistry::from_pieces(Side::Player1, vec![Piece::new(PieceKind::Pawn, cell(1, 1))])
        .unwrap();
    let prey = PieceRegistry::from_pieces(Side::Player2, vec![Piece::new(PieceKind::Pawn, cell(2, 1))])
        .unwrap();
    let mut game = Game::from_players(Players::from_registries(hunter, prey).unwrap(), Side::Player1);

    let accepted = game
        .apply_move(Side::Player1, PieceSelector::kind(PieceKind::Pawn), "F")
        .unwrap();

    assert_eq!(accepted.winner, Some(Side::Player1));
    assert_eq!(game.turn(), TurnState::GameOver { winner: Side::Player1 });
    assert!(game.players().get(Side::Player2).is_empty());

    let frozen = game.clone();
    for side in [Side::Player1, Side::Player2] {
        let err = game
            .apply_move(side, PieceSelector::kind(PieceKind::Pawn), "B")
            .unwrap_err();
        assert_eq!(err, MoveError::GameOver);
    }
    assert_eq!(game.undo(), Err(MoveError::GameOver));
    assert_eq!(game.pass_turn(), Err(MoveError::GameOver));
    assert_eq!(game, frozen);
}

#[test]
fn test_opening_sequence_alternates_and_captures() {
    let mut game = Game::standard();
    let script = [
        (Side::Player1, PieceKind::Pawn, "F", cell(1, 0)),
        (Side::Player2, PieceKind::Pawn, "F", cell(3, 0)),
        (Side::Player1, PieceKind::Hero1, "F", cell(2, 1)),
        (Side::Player2, PieceKind::Hero1, "F", cell(2, 2)),
        (Side::Player1, PieceKind::Hero2, "FR", cell(2, 4)),
        (Side::Player2, PieceKind::Hero3, "FR", cell(2, 4)),
    ];

    for (turn, (side, kind, token, landing)) in script.into_iter().enumerate() {
        assert_eq!(game.turn().to_move(), Some(side), "move {turn}");
        let accepted = game.apply_move(side, PieceSelector::kind(kind), token).unwrap();
        assert_eq!(accepted.record.resulting, landing);
        assert_board_matches_registries(&game);
    }

    assert_eq!(pieces_of(&game, Side::Player1), 4);
    assert_eq!(pieces_of(&game, Side::Player2), 5);
    assert_eq!(game.moves().len(), 6);
    assert_eq!(game.turn(), TurnState::ToMove(Side::Player1));
    assert_eq!(game.last_move(), Some((cell(4, 3), cell(2, 4))));
}

#[test]
fn test_second_pawn_selected_by_position() {
    let mut game = Game::standard();
    game.apply_move(Side::Player1, PieceSelector::at(PieceKind::Pawn, cell(0, 4)), "F")
        .unwrap();

    assert!(game.board().get(cell(0, 0)).is_some());
    assert!(game.board().get(cell(0, 4)).is_none());
    assert!(game.board().get(cell(1, 4)).is_some());
}

#[test]
fn test_undo_walks_history_back_to_the_opening() {
    let mut game = Game::standard();
    let opening = game.clone();
    game.apply_move(Side::Player1, PieceSelector::kind(PieceKind::Hero3), "LF")
        .unwrap();
    game.apply_move(Side::Player2, PieceSelector::kind(PieceKind::Hero2), "FL")
        .unwrap_err();
    game.apply_move(Side::Player2, PieceSelector::kind(PieceKind::Hero2), "FR")
        .unwrap();

    game.undo().unwrap();
    assert_eq!(game.turn(), TurnState::ToMove(Side::Player2));
    game.undo().unwrap();
    assert_eq!(game, opening);
    assert_eq!(game.undo(), Err(MoveError::NothingToUndo));
}

#[test]
fn test_setup_lists_are_validated() {
    assert!(Game::new(&[PieceKind::Hero3], &[PieceKind::Pawn, PieceKind::Pawn]).is_ok());

    let err = Game::new(&[], &[PieceKind::Pawn]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid setup for player1: expected 1 to 5 pieces, got 0"
    );
    assert!(Game::new(&[PieceKind::Pawn], &[PieceKind::Pawn; 6]).is_err());
}
