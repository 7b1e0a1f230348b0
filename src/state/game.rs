//! Game session state.
//!
//! Wraps the board rules into immutable [`GameState`] snapshots and encodes
//! the turn-transition rules: whose turn is next, forced extra turns when
//! the opponent is stuck, and promotion to game-over.
//!
//! Every transition produces a brand-new snapshot; prior states are never
//! mutated in place. Replacing the snapshot wholesale is what keeps room
//! state consistent under the run-to-completion event discipline.

use super::board::{Board, Color, Outcome, Position};

/// The four corner cells, preferred by the hint heuristic.
const CORNERS: [Position; 4] = [
    Position { row: 0, col: 0 },
    Position { row: 0, col: 7 },
    Position { row: 7, col: 0 },
    Position { row: 7, col: 7 },
];

/// An immutable snapshot of one game.
///
/// Invariants:
/// - `black_score + white_score + board.empty_count() == 64`
/// - `valid_moves == board.valid_moves(current_turn)`, never stale
/// - `winner` is `Some` iff `game_over`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub current_turn: Color,
    pub black_score: u8,
    pub white_score: u8,
    pub game_over: bool,
    pub winner: Option<Outcome>,
    pub last_move: Option<Position>,
    pub valid_moves: Vec<Position>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}

impl GameState {
    /// The opening snapshot: Black to move with four legal replies.
    pub fn initial() -> Self {
        let board = Board::initial();
        let (black_score, white_score) = board.scores();
        let valid_moves = board.valid_moves(Color::Black);
        Self {
            board,
            current_turn: Color::Black,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves,
        }
    }

    /// Play `color` at `pos`, returning the next snapshot.
    ///
    /// After a successful move the turn passes to the opponent unless the
    /// opponent has no legal reply, in which case it stays with the mover
    /// (the opponent's pass is forced, no client action involved). When
    /// neither side can move the game is over and the winner is decided by
    /// disc count.
    pub fn apply_move(&self, pos: Position, color: Color) -> Result<GameState, GameError> {
        if color != self.current_turn {
            return Err(GameError::NotYourTurn);
        }
        if self.game_over {
            return Err(GameError::GameOver);
        }
        if !self.board.is_valid_move(pos, color) {
            return Err(GameError::InvalidMove);
        }

        let board = self.board.apply(pos, color);
        let (black_score, white_score) = board.scores();

        let opponent_moves = board.valid_moves(!color);
        let (current_turn, valid_moves) = if !opponent_moves.is_empty() {
            (!color, opponent_moves)
        } else {
            // Forced pass: the opponent is stuck, mover goes again.
            (color, board.valid_moves(color))
        };

        let game_over = board.is_game_over();
        let winner = if game_over { Some(board.winner()) } else { None };

        Ok(GameState {
            board,
            current_turn,
            black_score,
            white_score,
            game_over,
            winner,
            last_move: Some(pos),
            valid_moves,
        })
    }

    /// Explicit pass by `color`, legal only when it is their turn and they
    /// have no move. The turn transfers unconditionally to the opponent;
    /// if the opponent is also stuck the game ends by score.
    pub fn apply_pass(&self, color: Color) -> Result<GameState, GameError> {
        if color != self.current_turn {
            return Err(GameError::NotYourTurn);
        }
        if self.game_over {
            return Err(GameError::GameOver);
        }
        if !self.valid_moves.is_empty() {
            return Err(GameError::HasValidMoves);
        }

        let opponent = !color;
        let valid_moves = self.board.valid_moves(opponent);
        // The passer has no moves, so "opponent has none either" is exactly
        // the general terminal predicate.
        let game_over = valid_moves.is_empty();
        let winner = if game_over {
            Some(self.board.winner())
        } else {
            None
        };

        Ok(GameState {
            board: self.board,
            current_turn: opponent,
            black_score: self.black_score,
            white_score: self.white_score,
            game_over,
            winner,
            last_move: self.last_move,
            valid_moves,
        })
    }

    /// One-ply hint for `color`: any corner among the legal moves, else the
    /// move capturing the most discs right now. Not a search.
    pub fn hint(&self, color: Color) -> Option<Position> {
        if self.game_over || color != self.current_turn || self.valid_moves.is_empty() {
            return None;
        }

        if let Some(corner) = self.valid_moves.iter().find(|p| CORNERS.contains(p)) {
            return Some(*corner);
        }

        let mut best = self.valid_moves[0];
        let mut best_flips = self.board.flipped_pieces(best, color).len();
        for &pos in &self.valid_moves[1..] {
            let flips = self.board.flipped_pieces(pos, color).len();
            if flips > best_flips {
                best = pos;
                best_flips = flips;
            }
        }
        Some(best)
    }

    /// Score for one color.
    pub fn score_of(&self, color: Color) -> u8 {
        match color {
            Color::Black => self.black_score,
            Color::White => self.white_score,
        }
    }

    /// Convert to the client wire shape.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "board": self.board.to_json(),
            "currentTurn": self.current_turn.as_str(),
            "blackScore": self.black_score,
            "whiteScore": self.white_score,
            "gameOver": self.game_over,
            "winner": self.winner.map(|w| w.as_str()),
            "lastMove": self.last_move.map(|p| p.to_json()),
            "validMoves": self.valid_moves.iter().map(|p| p.to_json()).collect::<Vec<_>>(),
        })
    }
}

/// Session transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    NotYourTurn,
    GameOver,
    InvalidMove,
    HasValidMoves,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotYourTurn => write!(f, "Not your turn"),
            Self::GameOver => write!(f, "Game is over"),
            Self::InvalidMove => write!(f, "Invalid move"),
            Self::HasValidMoves => write!(f, "You have valid moves available"),
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::board::{Cell, BOARD_SIZE};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_initial_snapshot() {
        let state = GameState::initial();

        assert_eq!(state.current_turn, Color::Black);
        assert_eq!((state.black_score, state.white_score), (2, 2));
        assert!(!state.game_over);
        assert_eq!(state.winner, None);
        assert_eq!(state.last_move, None);
        assert_eq!(
            state.valid_moves,
            vec![
                Position::new(2, 3),
                Position::new(3, 2),
                Position::new(4, 5),
                Position::new(5, 4),
            ]
        );
    }

    #[test]
    fn test_opening_move() {
        let state = GameState::initial();
        let next = state.apply_move(Position::new(2, 3), Color::Black).unwrap();

        assert_eq!((next.black_score, next.white_score), (4, 1));
        assert_eq!(next.current_turn, Color::White);
        assert_eq!(next.last_move, Some(Position::new(2, 3)));
        assert_eq!(next.valid_moves, next.board.valid_moves(Color::White));

        // The prior snapshot is untouched.
        assert_eq!((state.black_score, state.white_score), (2, 2));
        assert_eq!(state.current_turn, Color::Black);
    }

    #[test]
    fn test_wrong_turn_rejected() {
        let state = GameState::initial();
        let result = state.apply_move(Position::new(2, 3), Color::White);
        assert_eq!(result, Err(GameError::NotYourTurn));
    }

    #[test]
    fn test_invalid_move_rejected_without_mutation() {
        let state = GameState::initial();

        // Occupied cell.
        assert_eq!(
            state.apply_move(Position::new(3, 3), Color::Black),
            Err(GameError::InvalidMove)
        );
        // Cell with zero flips.
        assert_eq!(
            state.apply_move(Position::new(0, 0), Color::Black),
            Err(GameError::InvalidMove)
        );
        // Out of bounds.
        assert_eq!(
            state.apply_move(Position::new(9, 9), Color::Black),
            Err(GameError::InvalidMove)
        );

        assert_eq!(state, GameState::initial());
    }

    #[test]
    fn test_pass_with_moves_rejected() {
        let state = GameState::initial();
        let result = state.apply_pass(Color::Black);

        assert_eq!(result, Err(GameError::HasValidMoves));
        assert_eq!(
            result.unwrap_err().to_string(),
            "You have valid moves available"
        );
    }

    #[test]
    fn test_pass_wrong_turn_rejected() {
        let state = GameState::initial();
        assert_eq!(state.apply_pass(Color::White), Err(GameError::NotYourTurn));
    }

    /// A board where White (to move) is stuck but Black is not.
    ///
    /// Black's only disc sits in the corner, so no ray can bracket it; the
    /// white run is capturable by Black at (0,3).
    fn white_stuck_state() -> GameState {
        let mut board = Board::empty();
        board.set(Position::new(0, 0), Cell::Black);
        board.set(Position::new(0, 1), Cell::White);
        board.set(Position::new(0, 2), Cell::White);
        let (black_score, white_score) = board.scores();
        let valid_moves = board.valid_moves(Color::White);
        assert!(valid_moves.is_empty());
        GameState {
            board,
            current_turn: Color::White,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves,
        }
    }

    #[test]
    fn test_explicit_pass_transfers_turn() {
        let state = white_stuck_state();
        let next = state.apply_pass(Color::White).unwrap();

        assert_eq!(next.current_turn, Color::Black);
        assert!(!next.game_over);
        assert_eq!(next.valid_moves, next.board.valid_moves(Color::Black));
        assert_eq!(next.board, state.board);
    }

    #[test]
    fn test_forced_pass_keeps_turn_with_mover() {
        // Two white discs each followed by a black run anchored at the east
        // edge. Black can capture either white disc from the west; White can
        // never bracket the edge-anchored runs, so it is permanently stuck.
        let mut board = Board::empty();
        board.set(Position::new(3, 1), Cell::White);
        board.set(Position::new(5, 1), Cell::White);
        for col in 2..BOARD_SIZE {
            board.set(Position::new(3, col), Cell::Black);
            board.set(Position::new(5, col), Cell::Black);
        }
        let (black_score, white_score) = board.scores();
        let valid_moves = board.valid_moves(Color::Black);
        assert_eq!(
            valid_moves,
            vec![Position::new(3, 0), Position::new(5, 0)]
        );
        let state = GameState {
            board,
            current_turn: Color::Black,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves,
        };

        let next = state.apply_move(Position::new(5, 0), Color::Black).unwrap();

        // White has no reply, so the turn stays with the mover.
        assert!(next.board.valid_moves(Color::White).is_empty());
        assert!(!next.game_over);
        assert_eq!(next.current_turn, Color::Black);
        assert_eq!(next.valid_moves, vec![Position::new(3, 0)]);
    }

    #[test]
    fn test_double_exhaustion_ends_game() {
        // White passes; Black has no move either, so the game ends and the
        // higher count wins.
        // Isolated corner clusters: no ray can bracket anything.
        let mut board = Board::empty();
        board.set(Position::new(0, 0), Cell::Black);
        board.set(Position::new(7, 7), Cell::White);
        board.set(Position::new(7, 6), Cell::White);
        board.set(Position::new(6, 7), Cell::White);
        let (black_score, white_score) = board.scores();
        let state = GameState {
            board,
            current_turn: Color::White,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves: board.valid_moves(Color::White),
        };
        assert!(state.valid_moves.is_empty());

        let next = state.apply_pass(Color::White).unwrap();

        assert!(next.game_over);
        assert_eq!(next.winner, Some(Outcome::White));
        assert!(next.valid_moves.is_empty());
    }

    #[test]
    fn test_move_after_game_over_rejected() {
        let mut state = white_stuck_state();
        state.game_over = true;
        state.winner = Some(Outcome::Black);

        // Turn check comes first, then the terminal check.
        assert_eq!(
            state.apply_move(Position::new(0, 2), Color::White),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn test_turn_law_over_full_game() {
        let mut state = GameState::initial();

        while !state.game_over {
            let color = state.current_turn;
            if let Some(&pos) = state.valid_moves.first() {
                state = state.apply_move(pos, color).unwrap();
            } else {
                state = state.apply_pass(color).unwrap();
            }

            // validMoves never stale, scores always conserved.
            assert_eq!(
                state.valid_moves,
                state.board.valid_moves(state.current_turn)
            );
            assert_eq!(
                state.black_score + state.white_score + state.board.empty_count(),
                64
            );
            // The side to move always has a move, unless the game is over.
            if !state.game_over {
                assert!(!state.valid_moves.is_empty());
            }
        }

        assert!(state.winner.is_some());
    }

    #[test]
    fn test_hint_prefers_corner() {
        let mut board = Board::empty();
        // Corner (0,0) captures one disc; (4,2) would capture two.
        board.set(Position::new(0, 1), Cell::White);
        board.set(Position::new(0, 2), Cell::Black);
        board.set(Position::new(4, 3), Cell::White);
        board.set(Position::new(4, 4), Cell::White);
        board.set(Position::new(4, 5), Cell::Black);
        let (black_score, white_score) = board.scores();
        let valid_moves = board.valid_moves(Color::Black);
        let state = GameState {
            board,
            current_turn: Color::Black,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves,
        };

        assert_eq!(state.hint(Color::Black), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_hint_maximizes_flips() {
        let mut board = Board::empty();
        // (1,0) captures one disc, (4,2) captures two. No corners in play.
        board.set(Position::new(1, 1), Cell::White);
        board.set(Position::new(1, 2), Cell::Black);
        board.set(Position::new(4, 3), Cell::White);
        board.set(Position::new(4, 4), Cell::White);
        board.set(Position::new(4, 5), Cell::Black);
        let (black_score, white_score) = board.scores();
        let valid_moves = board.valid_moves(Color::Black);
        let state = GameState {
            board,
            current_turn: Color::Black,
            black_score,
            white_score,
            game_over: false,
            winner: None,
            last_move: None,
            valid_moves,
        };

        assert_eq!(state.hint(Color::Black), Some(Position::new(4, 2)));
    }

    #[test]
    fn test_hint_none_cases() {
        let state = GameState::initial();
        // Not White's turn.
        assert_eq!(state.hint(Color::White), None);

        let stuck = white_stuck_state();
        // White's turn but no moves.
        assert_eq!(stuck.hint(Color::White), None);
    }

    #[test]
    fn test_state_json_shape() {
        let state = GameState::initial();
        let json = state.to_json();

        assert_eq!(json["currentTurn"], serde_json::json!("black"));
        assert_eq!(json["blackScore"], serde_json::json!(2));
        assert_eq!(json["whiteScore"], serde_json::json!(2));
        assert_eq!(json["gameOver"], serde_json::json!(false));
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["lastMove"], serde_json::Value::Null);
        assert_eq!(json["validMoves"].as_array().unwrap().len(), 4);
    }
}
