//! Pure board rules for 8x8 Reversi.
//!
//! Everything in this module is stateless: legality, flip computation,
//! scoring and terminal detection are plain functions over a `Board` value.
//! No sessions, no I/O.

/// Board dimensions.
pub const BOARD_SIZE: usize = 8;

/// The eight ray directions used for flip searches.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// One of the two disc colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    /// The opposing color.
    fn not(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    /// The occupying color, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Empty => None,
            Self::Black => Some(Color::Black),
            Self::White => Some(Color::White),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self.color() {
            Some(c) => serde_json::json!(c.as_str()),
            None => serde_json::Value::Null,
        }
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Self::Black,
            Color::White => Self::White,
        }
    }
}

/// Board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if position is within board bounds.
    pub fn is_valid(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({"row": self.row, "col": self.col})
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Black,
    White,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Draw => "draw",
        }
    }
}

impl From<Color> for Outcome {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Self::Black,
            Color::White => Self::White,
        }
    }
}

/// 8x8 cell grid.
pub type Grid = [[Cell; BOARD_SIZE]; BOARD_SIZE];

/// Board state. `Copy`, so applying a move never aliases the prior grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    /// The opening position: four center discs in the diagonal pattern.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.grid[3][3] = Cell::White;
        board.grid[3][4] = Cell::Black;
        board.grid[4][3] = Cell::Black;
        board.grid[4][4] = Cell::White;
        board
    }

    /// A board with no discs.
    pub fn empty() -> Self {
        Self {
            grid: [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Cell at a position, `None` when out of bounds.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if pos.is_valid() {
            Some(self.grid[pos.row][pos.col])
        } else {
            None
        }
    }

    /// Place a cell directly, ignoring game rules. Out-of-bounds is a no-op.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        if pos.is_valid() {
            self.grid[pos.row][pos.col] = cell;
        }
    }

    /// All opponent discs captured by playing `color` at `pos`.
    ///
    /// For each of the eight ray directions, walks over opponent discs and
    /// keeps the run only if it terminates in-bounds on a same-color disc
    /// with at least one opponent disc collected. A single move may capture
    /// in several directions at once. Returns an empty vec when the target
    /// cell is occupied or out of bounds.
    pub fn flipped_pieces(&self, pos: Position, color: Color) -> Vec<Position> {
        if self.cell(pos) != Some(Cell::Empty) {
            return Vec::new();
        }

        let mut flips = Vec::new();
        for (dr, dc) in DIRECTIONS {
            let mut run = Vec::new();
            let mut row = pos.row as i32 + dr;
            let mut col = pos.col as i32 + dc;
            loop {
                if !(0..BOARD_SIZE as i32).contains(&row)
                    || !(0..BOARD_SIZE as i32).contains(&col)
                {
                    run.clear();
                    break;
                }
                let here = Position::new(row as usize, col as usize);
                match self.grid[here.row][here.col].color() {
                    Some(c) if c == !color => run.push(here),
                    // Same-color disc terminates a valid run.
                    Some(_) => break,
                    None => {
                        run.clear();
                        break;
                    }
                }
                row += dr;
                col += dc;
            }
            flips.append(&mut run);
        }

        flips
    }

    /// Check if playing `color` at `pos` is legal.
    pub fn is_valid_move(&self, pos: Position, color: Color) -> bool {
        !self.flipped_pieces(pos, color).is_empty()
    }

    /// All legal moves for `color`, in row-major scan order.
    ///
    /// Exhaustive 64-cell scan; cheap enough to recompute on every move.
    pub fn valid_moves(&self, color: Color) -> Vec<Position> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let pos = Position::new(row, col);
                if self.is_valid_move(pos, color) {
                    moves.push(pos);
                }
            }
        }
        moves
    }

    /// Check if `color` has at least one legal move.
    pub fn has_move(&self, color: Color) -> bool {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if self.is_valid_move(Position::new(row, col), color) {
                    return true;
                }
            }
        }
        false
    }

    /// Play `color` at `pos`, returning the resulting board.
    ///
    /// The caller is expected to have checked legality; an illegal move
    /// places the disc without flipping anything.
    pub fn apply(&self, pos: Position, color: Color) -> Board {
        let mut next = *self;
        next.set(pos, Cell::from(color));
        for flip in self.flipped_pieces(pos, color) {
            next.set(flip, Cell::from(color));
        }
        next
    }

    /// Disc counts as `(black, white)`.
    pub fn scores(&self) -> (u8, u8) {
        let mut black = 0;
        let mut white = 0;
        for row in &self.grid {
            for cell in row {
                match cell {
                    Cell::Black => black += 1,
                    Cell::White => white += 1,
                    Cell::Empty => {}
                }
            }
        }
        (black, white)
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> u8 {
        let (black, white) = self.scores();
        (BOARD_SIZE * BOARD_SIZE) as u8 - black - white
    }

    /// The game ends when neither color has a legal move. The board need
    /// not be full.
    pub fn is_game_over(&self) -> bool {
        !self.has_move(Color::Black) && !self.has_move(Color::White)
    }

    /// Winner by disc count. Only meaningful once the game is over.
    pub fn winner(&self) -> Outcome {
        let (black, white) = self.scores();
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Outcome::Black,
            std::cmp::Ordering::Less => Outcome::White,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Convert to an 8x8 JSON array of `null | "black" | "white"`.
    pub fn to_json(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .grid
            .iter()
            .map(|row| {
                let cells: Vec<serde_json::Value> = row.iter().map(|c| c.to_json()).collect();
                serde_json::Value::Array(cells)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}
