pub mod obstacle;
pub mod topology;

pub use obstacle::ObstacleMap;
pub use topology::BoardGrid;

use breadboard_common::geom::coord::GridPoint;

/// Search space seen by the router.
pub trait RoutingGrid {
    /// Whether `p` exists and is free to route through.
    fn is_open(&self, p: GridPoint) -> bool;

    /// Writes the open neighbours of `p` into `out`, replacing its contents.
    fn neighbors(&self, p: GridPoint, out: &mut Vec<GridPoint>);
}
