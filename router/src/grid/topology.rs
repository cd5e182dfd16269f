use super::RoutingGrid;
use super::obstacle::ObstacleMap;
use breadboard_common::db::core::LayoutDB;
use breadboard_common::geom::coord::GridPoint;

// up, right, down, left
const STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Multi-board routing space. Board crossings are derived from the current
/// anchors on every query.
pub struct BoardGrid<'a> {
    db: &'a LayoutDB,
    obstacles: ObstacleMap<'a>,
}

impl<'a> BoardGrid<'a> {
    pub fn new(db: &'a LayoutDB) -> Self {
        Self {
            db,
            obstacles: ObstacleMap::new(db),
        }
    }

    pub fn obstacles(&self) -> &ObstacleMap<'a> {
        &self.obstacles
    }
}

impl RoutingGrid for BoardGrid<'_> {
    #[inline]
    fn is_open(&self, p: GridPoint) -> bool {
        self.db.grid.in_range(p.row, p.col)
            && self.db.boards.iter().any(|b| b.id == p.board)
            && !self.obstacles.is_blocked(p.row, p.col, p.board)
    }

    fn neighbors(&self, p: GridPoint, out: &mut Vec<GridPoint>) {
        out.clear();
        for (dc, dr) in STEPS {
            let n = p.offset(dc, dr);
            if self.is_open(n) {
                out.push(n);
            }
        }

        let grid = &self.db.grid;
        let Some(current) = self.db.board(p.board) else {
            return;
        };
        for other in &self.db.boards {
            if other.id == current.id {
                continue;
            }
            let Some(side) = current.adjacency(other, grid) else {
                continue;
            };
            if let Some((row, col)) = side.crossing(grid, p.row, p.col) {
                let n = GridPoint::new(col, row, other.id);
                if self.is_open(n) {
                    out.push(n);
                }
            }
        }
    }
}
