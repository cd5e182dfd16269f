use super::coord::GridPoint;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered run of grid points. An empty path means "no route".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    points: Vec<GridPoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of steps, not points.
    pub fn edge_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn first(&self) -> Option<GridPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridPoint> {
        self.points.iter()
    }

    /// Appends a routed segment, dropping its first point when it repeats
    /// this path's last point.
    pub fn append_segment(&mut self, segment: &Path) {
        let skip = match (self.last(), segment.first()) {
            (Some(a), Some(b)) if a == b => 1,
            _ => 0,
        };
        self.points.extend_from_slice(&segment.points[skip..]);
    }

    pub fn into_points(self) -> Vec<GridPoint> {
        self.points
    }
}

impl Index<usize> for Path {
    type Output = GridPoint;

    fn index(&self, idx: usize) -> &GridPoint {
        &self.points[idx]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a GridPoint;
    type IntoIter = std::slice::Iter<'a, GridPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<GridPoint> for Path {
    fn from_iter<T: IntoIterator<Item = GridPoint>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
