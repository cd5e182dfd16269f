use crate::grid::RoutingGrid;
use breadboard_common::geom::coord::GridPoint;
use breadboard_common::geom::path::Path;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

const NO_PARENT: u32 = u32::MAX;

#[derive(Clone, Copy)]
struct SearchNode {
    point: GridPoint,
    g_score: u32,
    parent: u32,
    closed: bool,
}

/// A* over a [`RoutingGrid`] with unit step costs.
///
/// Search nodes live in an arena; a node's arena index is also the order it
/// was first discovered, which breaks ties between equal `f` scores.
pub struct AStar {
    nodes: Vec<SearchNode>,
    index: HashMap<GridPoint, u32>,
    open: PriorityQueue<u32, Reverse<(u32, u32)>>,
    neighbors: Vec<GridPoint>,
    expansions: usize,
}

impl Default for AStar {
    fn default() -> Self {
        Self::new()
    }
}

impl AStar {
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
            index: HashMap::with_capacity(1024),
            open: PriorityQueue::new(),
            neighbors: Vec::with_capacity(8),
            expansions: 0,
        }
    }

    /// Nodes expanded by the last search.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.open.clear();
        self.expansions = 0;
    }

    fn discover(&mut self, point: GridPoint, g_score: u32, parent: u32) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(SearchNode {
            point,
            g_score,
            parent,
            closed: false,
        });
        self.index.insert(point, id);
        id
    }

    #[inline(always)]
    fn heuristic(a: GridPoint, end: GridPoint) -> u32 {
        a.manhattan(end)
    }

    /// Shortest path from `start` to `end`, both inclusive. Returns an empty
    /// path when either end is closed or the frontier runs dry.
    pub fn find_path<G: RoutingGrid + ?Sized>(
        &mut self,
        grid: &G,
        start: GridPoint,
        end: GridPoint,
    ) -> Path {
        self.reset();

        if !grid.is_open(start) || !grid.is_open(end) {
            log::debug!("Unroutable request {} -> {}: endpoint closed", start, end);
            return Path::new();
        }

        let start_id = self.discover(start, 0, NO_PARENT);
        self.open
            .push(start_id, Reverse((Self::heuristic(start, end), start_id)));

        let mut neighbors = std::mem::take(&mut self.neighbors);

        while let Some((current, _)) = self.open.pop() {
            let node = self.nodes[current as usize];
            if node.point == end {
                self.neighbors = neighbors;
                log::trace!(
                    "Routed {} -> {} in {} expansions",
                    start,
                    end,
                    self.expansions
                );
                return self.reconstruct_path(current);
            }

            self.nodes[current as usize].closed = true;
            self.expansions += 1;

            grid.neighbors(node.point, &mut neighbors);
            let tentative_g = node.g_score + 1;

            for &n in &neighbors {
                match self.index.get(&n).copied() {
                    Some(id) => {
                        let existing = &mut self.nodes[id as usize];
                        if existing.closed || tentative_g >= existing.g_score {
                            continue;
                        }
                        existing.g_score = tentative_g;
                        existing.parent = current;
                        let f = tentative_g + Self::heuristic(n, end);
                        self.open.change_priority(&id, Reverse((f, id)));
                    }
                    None => {
                        let id = self.discover(n, tentative_g, current);
                        let f = tentative_g + Self::heuristic(n, end);
                        self.open.push(id, Reverse((f, id)));
                    }
                }
            }
        }

        self.neighbors = neighbors;
        log::debug!(
            "Unroutable request {} -> {}: frontier exhausted after {} expansions",
            start,
            end,
            self.expansions
        );
        Path::new()
    }

    fn reconstruct_path(&self, end_id: u32) -> Path {
        let mut points = Vec::new();
        let mut curr = end_id;
        loop {
            let node = &self.nodes[curr as usize];
            points.push(node.point);
            if node.parent == NO_PARENT {
                break;
            }
            curr = node.parent;
        }
        points.reverse();
        Path::from_points(points)
    }
}
