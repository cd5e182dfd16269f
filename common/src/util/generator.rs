use crate::db::core::{LayoutDB, WireColor};
use crate::db::indices::BoardId;
use crate::db::request::{LayoutFile, WireRequest};
use crate::geom::coord::{Address, GridPoint};
use crate::util::config::GridSpec;
use rand::Rng;
use rand::seq::SliceRandom;

const DIP_PIN_COUNTS: [u32; 7] = [8, 14, 16, 20, 24, 28, 40];

/// Builds a random layout: a row of touching boards, dual-inline parts
/// scattered across them, and wire requests between open holes.
pub fn generate_layout<R: Rng>(
    rng: &mut R,
    grid: GridSpec,
    num_boards: usize,
    num_components: usize,
    num_requests: usize,
) -> LayoutFile {
    let mut db = LayoutDB::new(grid);
    let num_boards = num_boards.max(1);

    for i in 0..num_boards {
        let x = i as i32 * grid.board_width();
        if let Err(e) = db.add_board(x, 0) {
            log::warn!("Skipping board {}: {}", i, e);
        }
    }

    let mut placed = 0;
    let mut attempts = 0;
    while placed < num_components && attempts < num_components * 20 {
        attempts += 1;
        let board = BoardId::new(rng.gen_range(0..num_boards));
        let pins = *DIP_PIN_COUNTS.choose(rng).unwrap_or(&8);
        let col = rng.gen_range(0..grid.cols);
        if db.place_dip(board, col, pins).is_ok() {
            placed += 1;
        }
    }
    if placed < num_components {
        log::warn!(
            "Placed only {} of {} components after {} attempts",
            placed,
            num_components,
            attempts
        );
    }

    let mut requests = Vec::with_capacity(num_requests);
    while requests.len() < num_requests {
        let Some(start) = random_open_hole(rng, &db, num_boards) else {
            break;
        };
        let Some(end) = random_open_hole(rng, &db, num_boards) else {
            break;
        };
        if start == end {
            continue;
        }
        requests.push(WireRequest {
            start,
            end,
            via: Vec::new(),
            color: Some(WireColor::from_index(rng.gen_range(0..WireColor::PALETTE.len()))),
            shifted: rng.gen_bool(0.5),
        });
    }

    log::info!(
        "Generated layout: {} boards, {} components, {} requests",
        db.num_boards(),
        db.components.len(),
        requests.len()
    );

    LayoutFile {
        layout: db,
        requests,
    }
}

fn random_open_hole<R: Rng>(rng: &mut R, db: &LayoutDB, num_boards: usize) -> Option<Address> {
    for _ in 0..1000 {
        let board = BoardId::new(rng.gen_range(0..num_boards));
        let row = rng.gen_range(db.grid.first_row()..=db.grid.last_row());
        let col = rng.gen_range(0..db.grid.cols);
        let p = GridPoint::new(col, row, board);
        if db.is_open(p) {
            return Some(p.into());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_requests_start_and_end_on_open_holes() {
        let mut rng = StdRng::seed_from_u64(42);
        let file = generate_layout(&mut rng, GridSpec::default(), 3, 6, 10);
        let db = &file.layout;
        assert_eq!(db.num_boards(), 3);
        assert_eq!(file.requests.len(), 10);
        for req in &file.requests {
            assert!(db.is_open(req.start.into()));
            assert!(db.is_open(req.end.into()));
            assert_ne!(req.start, req.end);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = generate_layout(&mut StdRng::seed_from_u64(5), GridSpec::default(), 2, 4, 4);
        let b = generate_layout(&mut StdRng::seed_from_u64(5), GridSpec::default(), 2, 4, 4);
        assert_eq!(a.layout.components, b.layout.components);
        assert_eq!(a.requests, b.requests);
    }
}
