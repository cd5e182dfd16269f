use crate::db::indices::BoardId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A connection point on a board, as the user addresses it.
///
/// Rows below zero are the top rail band; rows at or past the main row
/// count are the bottom rail band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub board: BoardId,
    pub row: i32,
    pub col: i32,
}

impl Address {
    pub fn new(board: BoardId, row: i32, col: i32) -> Self {
        Self { board, row, col }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[b{} r{} c{}]", self.board, self.row, self.col)
    }
}

/// Router vertex. Same position as an [`Address`], ordered column first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub col: i32,
    pub row: i32,
    pub board: BoardId,
}

impl GridPoint {
    pub fn new(col: i32, row: i32, board: BoardId) -> Self {
        Self { col, row, board }
    }

    #[inline(always)]
    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        Self {
            col: self.col + dcol,
            row: self.row + drow,
            board: self.board,
        }
    }

    /// Manhattan distance over rows and columns only.
    #[inline(always)]
    pub fn manhattan(self, other: GridPoint) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

impl From<Address> for GridPoint {
    fn from(a: Address) -> Self {
        Self::new(a.col, a.row, a.board)
    }
}

impl From<GridPoint> for Address {
    fn from(p: GridPoint) -> Self {
        Self::new(p.board, p.row, p.col)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})@{}", self.col, self.row, self.board)
    }
}
