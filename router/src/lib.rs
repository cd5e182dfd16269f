pub mod algo;
pub mod editor;
pub mod grid;
pub mod overlap;
pub mod session;

use algo::astar::AStar;
use breadboard_common::db::core::LayoutDB;
use breadboard_common::geom::coord::Address;
use breadboard_common::geom::path::Path;
use grid::BoardGrid;

/// Routes one wire segment across the current layout. An empty path means
/// the request cannot be routed.
pub fn route(start: Address, end: Address, db: &LayoutDB) -> Path {
    let grid = BoardGrid::new(db);
    AStar::new().find_path(&grid, start.into(), end.into())
}
