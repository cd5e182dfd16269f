use breadboard_common::db::core::{Component, LayoutDB};
use breadboard_common::db::indices::BoardId;
use std::collections::HashMap;

/// Components grouped by board, borrowed from the layout for one request.
pub struct ObstacleMap<'a> {
    by_board: HashMap<BoardId, Vec<&'a Component>>,
}

impl<'a> ObstacleMap<'a> {
    pub fn new(db: &'a LayoutDB) -> Self {
        let mut by_board: HashMap<BoardId, Vec<&'a Component>> = HashMap::new();
        for c in &db.components {
            by_board.entry(c.board).or_default().push(c);
        }
        Self { by_board }
    }

    /// Whether a component body or pin band on `board` covers the cell.
    #[inline]
    pub fn is_blocked(&self, row: i32, col: i32, board: BoardId) -> bool {
        self.by_board
            .get(&board)
            .is_some_and(|parts| parts.iter().any(|c| c.blocks(row, col)))
    }

    pub fn count(&self, board: BoardId) -> usize {
        self.by_board.get(&board).map_or(0, |v| v.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadboard_common::util::config::GridSpec;

    #[test]
    fn blocks_only_own_board() {
        let mut db = LayoutDB::new(GridSpec::default());
        db.add_board(0, 0).unwrap();
        db.add_board(1300, 0).unwrap();
        db.place_component(BoardId(0), 4, 10, 2, 5, 6).unwrap();
        let map = ObstacleMap::new(&db);

        assert_eq!(map.count(BoardId(0)), 1);
        assert_eq!(map.count(BoardId(1)), 0);
        assert!(map.is_blocked(4, 10, BoardId(0)));
        assert!(map.is_blocked(3, 12, BoardId(0)));
        assert!(!map.is_blocked(4, 10, BoardId(1)));
        assert!(!map.is_blocked(3, 10, BoardId(0)));
    }
}
