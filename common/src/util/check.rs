use crate::db::core::LayoutDB;
use crate::error::PathError;
use crate::geom::coord::GridPoint;
use crate::geom::path::Path;
use rayon::prelude::*;

/// Whether `from -> to` is a legal single step: a unit move on one board or
/// an edge crossing onto an adjacent board.
pub fn is_step(db: &LayoutDB, from: GridPoint, to: GridPoint) -> bool {
    if from.board == to.board {
        return from.manhattan(to) == 1;
    }
    let (Some(a), Some(b)) = (db.board(from.board), db.board(to.board)) else {
        return false;
    };
    a.adjacency(b, &db.grid)
        .and_then(|side| side.crossing(&db.grid, from.row, from.col))
        .is_some_and(|(row, col)| row == to.row && col == to.col)
}

/// Validates one routed path against the current layout.
pub fn check_path(db: &LayoutDB, path: &Path) -> Result<(), PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    for (index, &point) in path.iter().enumerate() {
        if db.board(point.board).is_none() || !db.grid.in_range(point.row, point.col) {
            return Err(PathError::InvalidCell { index, point });
        }
        if !db.is_open(point) {
            return Err(PathError::Blocked { index, point });
        }
    }
    for (index, pair) in path.points().windows(2).enumerate() {
        if !is_step(db, pair[0], pair[1]) {
            return Err(PathError::BadStep {
                index,
                from: pair[0],
                to: pair[1],
            });
        }
    }
    Ok(())
}

/// Verifies every stored wire. Wires can go stale when boards move or
/// components are placed after routing.
pub fn run(db: &LayoutDB) -> Result<(), String> {
    log::info!("Verifying {} wires...", db.num_wires());

    let failures: Vec<String> = db
        .wires
        .par_iter()
        .filter_map(|wire| {
            check_path(db, &wire.path)
                .err()
                .map(|e| format!("wire {}: {}", wire.id, e))
        })
        .collect();

    if failures.is_empty() {
        log::info!("\x1b[32mPASS\x1b[0m: All wire paths are valid.");
        Ok(())
    } else {
        for msg in &failures {
            log::error!("\x1b[31mFAIL\x1b[0m: {}", msg);
        }
        Err(failures.join("; "))
    }
}
