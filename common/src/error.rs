use crate::db::indices::{BoardId, ComponentId, WireId};
use crate::geom::coord::{Address, GridPoint};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown board {0}")]
    UnknownBoard(BoardId),
    #[error("board at ({x}, {y}) overlaps board {existing}")]
    BoardOverlap { x: i32, y: i32, existing: BoardId },
    #[error("board at ({x}, {y}) does not touch any existing board")]
    BoardNotAdjacent { x: i32, y: i32 },
    #[error("component does not fit on board {board} at row {row}, col {col}")]
    ComponentOutOfRange { board: BoardId, row: i32, col: i32 },
    #[error("component overlaps component {0}")]
    ComponentOverlap(ComponentId),
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),
    #[error("wire path is empty")]
    EmptyPath,
    #[error("wire starts and ends at {0}")]
    DegenerateWire(Address),
    #[error("wire path runs {first} -> {last} but wire is {start} -> {end}")]
    EndpointMismatch {
        start: Address,
        end: Address,
        first: GridPoint,
        last: GridPoint,
    },
    #[error("unknown wire {0}")]
    UnknownWire(WireId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("point {index} {point} is off the grid")]
    InvalidCell { index: usize, point: GridPoint },
    #[error("point {index} {point} lies inside a component")]
    Blocked { index: usize, point: GridPoint },
    #[error("step {index} from {from} to {to} is neither a unit step nor a board crossing")]
    BadStep {
        index: usize,
        from: GridPoint,
        to: GridPoint,
    },
}
