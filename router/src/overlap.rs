//! Fan-out offsets for wires that share grid cells.
//!
//! Every point of a wire path is classified by its local shape. Endpoints and
//! corners count toward both the horizontal and the vertical tally of their
//! cell; straight points count toward the tally of their run. A wire's offset
//! magnitude at a point is the number of *other* wires tallied there.

use breadboard_common::db::core::Wire;
use breadboard_common::db::indices::WireId;
use breadboard_common::geom::coord::GridPoint;
use breadboard_common::geom::path::Path;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Axis of a single step. Board crossings keep the row of a horizontal
    /// crossing, so they classify the same way as on-board steps.
    pub fn of_step(from: GridPoint, to: GridPoint) -> Self {
        if from.row == to.row {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    Endpoint,
    Corner,
    Run(Axis),
}

/// Shape of the path at `idx`.
pub fn classify(points: &[GridPoint], idx: usize) -> PointKind {
    if idx == 0 || idx + 1 >= points.len() {
        return PointKind::Endpoint;
    }
    let incoming = Axis::of_step(points[idx - 1], points[idx]);
    let outgoing = Axis::of_step(points[idx], points[idx + 1]);
    if incoming == outgoing {
        PointKind::Run(incoming)
    } else {
        PointKind::Corner
    }
}

/// Per-cell counts of horizontal and vertical passes.
#[derive(Debug, Clone, Default)]
pub struct OverlapTally {
    horizontal: HashMap<GridPoint, u32>,
    vertical: HashMap<GridPoint, u32>,
}

impl OverlapTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_path(&mut self, path: &Path) {
        let points = path.points();
        for (idx, &p) in points.iter().enumerate() {
            match classify(points, idx) {
                PointKind::Endpoint | PointKind::Corner => {
                    *self.horizontal.entry(p).or_insert(0) += 1;
                    *self.vertical.entry(p).or_insert(0) += 1;
                }
                PointKind::Run(Axis::Horizontal) => {
                    *self.horizontal.entry(p).or_insert(0) += 1;
                }
                PointKind::Run(Axis::Vertical) => {
                    *self.vertical.entry(p).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn horizontal(&self, p: GridPoint) -> u32 {
        self.horizontal.get(&p).copied().unwrap_or(0)
    }

    pub fn vertical(&self, p: GridPoint) -> u32 {
        self.vertical.get(&p).copied().unwrap_or(0)
    }

    /// Tally relevant to a point of the given shape.
    pub fn magnitude(&self, p: GridPoint, kind: PointKind) -> u32 {
        match kind {
            PointKind::Endpoint | PointKind::Corner => self.horizontal(p).max(self.vertical(p)),
            PointKind::Run(Axis::Horizontal) => self.horizontal(p),
            PointKind::Run(Axis::Vertical) => self.vertical(p),
        }
    }
}

/// Nonzero offset magnitudes of one wire, keyed by path index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireOffsets {
    magnitudes: BTreeMap<usize, u32>,
}

impl WireOffsets {
    pub fn get(&self, idx: usize) -> u32 {
        self.magnitudes.get(&idx).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.magnitudes.iter().map(|(&i, &m)| (i, m))
    }

    fn from_path<F: Fn(GridPoint, PointKind) -> u32>(path: &Path, lookup: F) -> Self {
        let points = path.points();
        let magnitudes = points
            .iter()
            .enumerate()
            .filter_map(|(idx, &p)| {
                let m = lookup(p, classify(points, idx));
                (m > 0).then_some((idx, m))
            })
            .collect();
        Self { magnitudes }
    }
}

/// Offsets for `target` against every other wire in `wires`. Unknown ids get
/// an empty result.
pub fn disambiguate(target: WireId, wires: &[Wire]) -> WireOffsets {
    let Some(wire) = wires.iter().find(|w| w.id == target) else {
        log::warn!("Overlap requested for unknown wire {}", target);
        return WireOffsets::default();
    };
    let mut others = OverlapTally::new();
    for w in wires.iter().filter(|w| w.id != target) {
        others.add_path(&w.path);
    }
    WireOffsets::from_path(&wire.path, |p, kind| others.magnitude(p, kind))
}

/// Offsets for every wire. Builds one shared tally and removes each wire's
/// own contribution, which matches [`disambiguate`] per wire.
pub fn disambiguate_all(wires: &[Wire]) -> HashMap<WireId, WireOffsets> {
    let mut total = OverlapTally::new();
    for w in wires {
        total.add_path(&w.path);
    }

    wires
        .par_iter()
        .map(|wire| {
            let mut own = OverlapTally::new();
            own.add_path(&wire.path);
            let offsets = WireOffsets::from_path(&wire.path, |p, kind| match kind {
                PointKind::Endpoint | PointKind::Corner => {
                    let h = total.horizontal(p) - own.horizontal(p);
                    let v = total.vertical(p) - own.vertical(p);
                    h.max(v)
                }
                PointKind::Run(Axis::Horizontal) => total.horizontal(p) - own.horizontal(p),
                PointKind::Run(Axis::Vertical) => total.vertical(p) - own.vertical(p),
            });
            (wire.id, offsets)
        })
        .collect()
}

/// Perpendicular displacement of one path point, in offset units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneShift {
    pub dx: i32,
    pub dy: i32,
}

impl LaneShift {
    /// Displacement in rendering units.
    pub fn scaled(self, unit: f64) -> (f64, f64) {
        (self.dx as f64 * unit, self.dy as f64 * unit)
    }
}

/// Turns offset magnitudes into per-point shifts. `shifted` picks the side of
/// the centreline. A straight point moves across its run; a corner moves both
/// edges meeting there, so the bend stays square.
pub fn lane_shifts(path: &Path, offsets: &WireOffsets, shifted: bool) -> Vec<LaneShift> {
    let points = path.points();
    let sign = if shifted { 1 } else { -1 };
    let mut shifts = vec![LaneShift::default(); points.len()];
    if points.len() < 2 {
        return shifts;
    }

    for (idx, magnitude) in offsets.iter() {
        let Some(shift) = shifts.get_mut(idx) else {
            continue;
        };
        let m = sign * magnitude as i32;
        match classify(points, idx) {
            PointKind::Run(Axis::Horizontal) => shift.dy = m,
            PointKind::Run(Axis::Vertical) => shift.dx = m,
            PointKind::Corner => {
                shift.dx = m;
                shift.dy = m;
            }
            PointKind::Endpoint => {
                let edge = if idx == 0 {
                    Axis::of_step(points[0], points[1])
                } else {
                    Axis::of_step(points[idx - 1], points[idx])
                };
                match edge {
                    Axis::Horizontal => shift.dy = m,
                    Axis::Vertical => shift.dx = m,
                }
            }
        }
    }
    shifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadboard_common::db::core::WireColor;
    use breadboard_common::db::indices::BoardId;
    use breadboard_common::geom::coord::Address;

    fn pt(col: i32, row: i32) -> GridPoint {
        GridPoint::new(col, row, BoardId(0))
    }

    fn wire(id: u32, points: Vec<GridPoint>) -> Wire {
        let start = Address::from(points[0]);
        let end = Address::from(points[points.len() - 1]);
        Wire {
            id: WireId(id),
            start,
            end,
            color: WireColor::Red,
            path: Path::from_points(points),
            shifted: false,
        }
    }

    fn row_run(row: i32, cols: std::ops::RangeInclusive<i32>) -> Vec<GridPoint> {
        cols.map(|c| pt(c, row)).collect()
    }

    #[test]
    fn classify_shapes() {
        let l = vec![pt(0, 0), pt(1, 0), pt(2, 0), pt(2, 1), pt(2, 2)];
        assert_eq!(classify(&l, 0), PointKind::Endpoint);
        assert_eq!(classify(&l, 1), PointKind::Run(Axis::Horizontal));
        assert_eq!(classify(&l, 2), PointKind::Corner);
        assert_eq!(classify(&l, 3), PointKind::Run(Axis::Vertical));
        assert_eq!(classify(&l, 4), PointKind::Endpoint);
        assert_eq!(classify(&[pt(3, 3)], 0), PointKind::Endpoint);
    }

    #[test]
    fn board_crossing_counts_as_horizontal() {
        let a = GridPoint::new(62, 2, BoardId(0));
        let b = GridPoint::new(0, 2, BoardId(1));
        assert_eq!(Axis::of_step(a, b), Axis::Horizontal);
    }

    #[test]
    fn parallel_runs_overlap_symmetrically() {
        let wires = vec![wire(0, row_run(2, 0..=6)), wire(1, row_run(2, 3..=9))];
        let a = disambiguate(WireId(0), &wires);
        let b = disambiguate(WireId(1), &wires);

        // wire 0 shares cols 3..=6, wire 1 shares the same cells
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);
        for col in 3..=6 {
            assert!(a.get(col as usize) >= 1);
            assert!(b.get((col - 3) as usize) >= 1);
        }
        assert_eq!(a.get(0), 0);
    }

    #[test]
    fn crossing_runs_do_not_offset_each_other() {
        let vertical: Vec<_> = (0..=4).map(|r| pt(3, r)).collect();
        let wires = vec![wire(0, row_run(2, 0..=6)), wire(1, vertical)];
        assert!(disambiguate(WireId(0), &wires).is_empty());
        assert!(disambiguate(WireId(1), &wires).is_empty());
    }

    #[test]
    fn endpoint_on_a_run_counts_both_ways() {
        // wire 1 ends in the middle of wire 0's horizontal run
        let vertical: Vec<_> = (0..=2).map(|r| pt(3, r)).collect();
        let wires = vec![wire(0, row_run(2, 0..=6)), wire(1, vertical)];
        let a = disambiguate(WireId(0), &wires);
        let b = disambiguate(WireId(1), &wires);
        assert_eq!(a.get(3), 1);
        assert_eq!(a.len(), 1);
        assert_eq!(b.get(2), 1);
    }

    #[test]
    fn magnitude_counts_every_other_wire() {
        let wires = vec![
            wire(0, row_run(1, 0..=4)),
            wire(1, row_run(1, 0..=4)),
            wire(2, row_run(1, 2..=4)),
        ];
        let a = disambiguate(WireId(0), &wires);
        assert_eq!(a.get(1), 1);
        assert_eq!(a.get(3), 2);
    }

    #[test]
    fn unknown_target_is_empty() {
        let wires = vec![wire(0, row_run(1, 0..=4))];
        assert!(disambiguate(WireId(9), &wires).is_empty());
    }

    #[test]
    fn recomputation_is_idempotent() {
        let wires = vec![
            wire(0, row_run(1, 0..=4)),
            wire(1, vec![pt(2, 0), pt(2, 1), pt(3, 1), pt(4, 1), pt(4, 2)]),
        ];
        assert_eq!(disambiguate(WireId(1), &wires), disambiguate(WireId(1), &wires));
        assert_eq!(disambiguate_all(&wires), disambiguate_all(&wires));
    }

    #[test]
    fn bulk_matches_single() {
        let wires = vec![
            wire(0, row_run(1, 0..=4)),
            wire(1, vec![pt(2, 0), pt(2, 1), pt(3, 1), pt(4, 1), pt(4, 2)]),
            wire(2, vec![pt(0, 1), pt(1, 1), pt(2, 1), pt(1, 1), pt(0, 1)]),
            wire(3, (0..=3).map(|r| pt(4, r)).collect()),
        ];
        let all = disambiguate_all(&wires);
        for w in &wires {
            assert_eq!(all[&w.id], disambiguate(w.id, &wires), "wire {}", w.id);
        }
    }

    #[test]
    fn own_revisits_are_not_counted() {
        let wires = vec![wire(0, vec![pt(0, 0), pt(1, 0), pt(2, 0), pt(1, 0), pt(0, 0)])];
        assert!(disambiguate(WireId(0), &wires).is_empty());
        assert!(disambiguate_all(&wires)[&WireId(0)].is_empty());
    }

    #[test]
    fn shifts_follow_local_direction() {
        // right along row 0, corner at (2,0), down to (2,2)
        let path = Path::from_points(vec![pt(0, 0), pt(1, 0), pt(2, 0), pt(2, 1), pt(2, 2)]);
        let offsets = WireOffsets {
            magnitudes: [(0, 1), (1, 1), (2, 2), (3, 1), (4, 1)].into_iter().collect(),
        };

        let down = lane_shifts(&path, &offsets, false);
        assert_eq!(down[0], LaneShift { dx: 0, dy: -1 });
        assert_eq!(down[1], LaneShift { dx: 0, dy: -1 });
        assert_eq!(down[2], LaneShift { dx: -2, dy: -2 });
        assert_eq!(down[3], LaneShift { dx: -1, dy: 0 });
        assert_eq!(down[4], LaneShift { dx: -1, dy: 0 });

        let up = lane_shifts(&path, &offsets, true);
        assert_eq!(up[2], LaneShift { dx: 2, dy: 2 });
        assert_eq!(up[2].scaled(3.0), (6.0, 6.0));
    }

    #[test]
    fn unshared_points_do_not_move() {
        let path = Path::from_points(row_run(0, 0..=3));
        let shifts = lane_shifts(&path, &WireOffsets::default(), true);
        assert!(shifts.iter().all(|s| *s == LaneShift::default()));
        assert_eq!(lane_shifts(&Path::from_points(vec![pt(0, 0)]), &WireOffsets::default(), true).len(), 1);
    }
}
