use crate::db::indices::*;
use crate::error::LayoutError;
use crate::geom::coord::{Address, GridPoint};
use crate::geom::path::Path;
use crate::geom::rect::Rect;
use crate::util::config::GridSpec;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where a neighbouring board sits relative to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Above,
    Below,
}

impl Side {
    /// Cell reached on the neighbour when leaving `(row, col)` toward this
    /// side. `None` unless `(row, col)` sits on the matching edge.
    #[inline]
    pub fn crossing(self, grid: &GridSpec, row: i32, col: i32) -> Option<(i32, i32)> {
        match self {
            Side::Right => (col == grid.last_col()).then_some((row, 0)),
            Side::Left => (col == 0).then_some((row, grid.last_col())),
            Side::Below => (row == grid.last_row()).then_some((grid.first_row(), col)),
            Side::Above => (row == grid.first_row()).then_some((grid.last_row(), col)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub x: i32,
    pub y: i32,
}

impl Board {
    pub fn footprint(&self, grid: &GridSpec) -> Rect {
        Rect::from_origin(self.x, self.y, grid.board_width(), grid.board_height())
    }

    /// Side on which `other` touches this board, within one pitch.
    pub fn adjacency(&self, other: &Board, grid: &GridSpec) -> Option<Side> {
        let w = grid.board_width();
        let h = grid.board_height();
        let tol = grid.pitch;

        if (self.y - other.y).abs() < h {
            if (self.x + w - other.x).abs() < tol {
                return Some(Side::Right);
            }
            if (other.x + w - self.x).abs() < tol {
                return Some(Side::Left);
            }
        }
        if (self.x - other.x).abs() < w {
            if (self.y + h - other.y).abs() < tol {
                return Some(Side::Below);
            }
            if (other.y + h - self.y).abs() < tol {
                return Some(Side::Above);
            }
        }
        None
    }
}

/// A placed part. Its body and the pin rows above and below it block routing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub board: BoardId,
    pub start_row: i32,
    pub start_col: i32,
    pub body_rows: i32,
    pub body_cols: i32,
    pub pins: u32,
}

impl Component {
    /// Dual-inline package straddling the centre divide.
    pub fn dip(id: ComponentId, board: BoardId, start_col: i32, pins: u32, grid: &GridSpec) -> Self {
        Self {
            id,
            board,
            start_row: grid.dip_row(),
            start_col,
            body_rows: 2,
            body_cols: (pins as i32 / 2).max(1),
            pins,
        }
    }

    /// Body cells, `x` is the column and `y` the row.
    pub fn body(&self) -> Rect {
        Rect::from_origin(self.start_col, self.start_row, self.body_cols, self.body_rows)
    }

    pub fn pins_per_side(&self) -> i32 {
        (self.pins as i32 / 2).min(self.body_cols)
    }

    /// Column range `[start, end)` covered by each pin row, centred on the body.
    pub fn pin_band(&self) -> (i32, i32) {
        let per_side = self.pins_per_side();
        let start = self.start_col + (self.body_cols - per_side) / 2;
        (start, start + per_side)
    }

    /// Rows of the top and bottom pin bands.
    pub fn pin_rows(&self) -> (i32, i32) {
        (self.start_row - 1, self.start_row + self.body_rows)
    }

    /// Body plus both pin rows, used for placement clearance.
    pub fn footprint(&self) -> Rect {
        Rect::from_origin(
            self.start_col,
            self.start_row - 1,
            self.body_cols,
            self.body_rows + 2,
        )
    }

    #[inline]
    pub fn blocks(&self, row: i32, col: i32) -> bool {
        if self.body().contains(col, row) {
            return true;
        }
        let (top, bottom) = self.pin_rows();
        if row != top && row != bottom {
            return false;
        }
        let (start, end) = self.pin_band();
        col >= start && col < end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireColor {
    Red,
    Black,
    Yellow,
    Green,
    Blue,
    Brown,
    Orange,
    Purple,
}

impl WireColor {
    pub const PALETTE: [WireColor; 8] = [
        WireColor::Red,
        WireColor::Black,
        WireColor::Yellow,
        WireColor::Green,
        WireColor::Blue,
        WireColor::Brown,
        WireColor::Orange,
        WireColor::Purple,
    ];

    pub fn from_index(idx: usize) -> Self {
        Self::PALETTE[idx % Self::PALETTE.len()]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn hex(self) -> &'static str {
        match self {
            WireColor::Red => "#ff0000",
            WireColor::Black => "#000000",
            WireColor::Yellow => "#ffd700",
            WireColor::Green => "#008000",
            WireColor::Blue => "#0000ff",
            WireColor::Brown => "#8b4513",
            WireColor::Orange => "#ffa500",
            WireColor::Purple => "#800080",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub id: WireId,
    pub start: Address,
    pub end: Address,
    pub color: WireColor,
    pub path: Path,
    /// Offset side chosen when the wire was drawn.
    #[serde(default)]
    pub shifted: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutDB {
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl LayoutDB {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            grid,
            boards: Vec::new(),
            components: Vec::with_capacity(32),
            wires: Vec::with_capacity(64),
        }
    }

    pub fn num_boards(&self) -> usize {
        self.boards.len()
    }
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    pub fn board(&self, id: BoardId) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    pub fn components_on(&self, board: BoardId) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(move |c| c.board == board)
    }

    /// Whether a point exists on the layout and no component covers it.
    pub fn is_open(&self, p: GridPoint) -> bool {
        self.board(p.board).is_some()
            && self.grid.in_range(p.row, p.col)
            && !self.components_on(p.board).any(|c| c.blocks(p.row, p.col))
    }

    /// Places a board. Every board after the first must touch an existing one.
    pub fn add_board(&mut self, x: i32, y: i32) -> Result<BoardId, LayoutError> {
        let id = self
            .boards
            .iter()
            .map(|b| b.id.next())
            .max()
            .unwrap_or(BoardId(0));
        let candidate = Board { id, x, y };
        let footprint = candidate.footprint(&self.grid);

        if let Some(existing) = self
            .boards
            .iter()
            .find(|b| b.footprint(&self.grid).overlaps(&footprint))
        {
            return Err(LayoutError::BoardOverlap {
                x,
                y,
                existing: existing.id,
            });
        }
        if !self.boards.is_empty()
            && !self
                .boards
                .iter()
                .any(|b| b.adjacency(&candidate, &self.grid).is_some())
        {
            return Err(LayoutError::BoardNotAdjacent { x, y });
        }

        log::debug!("Added board {} at ({}, {})", id, x, y);
        self.boards.push(candidate);
        Ok(id)
    }

    /// Moves a board. Stored wire paths are left as they are.
    pub fn move_board(&mut self, id: BoardId, x: i32, y: i32) -> Result<(), LayoutError> {
        let board = self
            .boards
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(LayoutError::UnknownBoard(id))?;
        board.x = x;
        board.y = y;
        Ok(())
    }

    pub fn place_component(
        &mut self,
        board: BoardId,
        start_row: i32,
        start_col: i32,
        body_rows: i32,
        body_cols: i32,
        pins: u32,
    ) -> Result<ComponentId, LayoutError> {
        let component = Component {
            id: self.next_component_id(),
            board,
            start_row,
            start_col,
            body_rows,
            body_cols,
            pins,
        };
        self.insert_component(component)
    }

    /// Places a dual-inline part across the centre divide.
    pub fn place_dip(
        &mut self,
        board: BoardId,
        start_col: i32,
        pins: u32,
    ) -> Result<ComponentId, LayoutError> {
        let component = Component::dip(self.next_component_id(), board, start_col, pins, &self.grid);
        self.insert_component(component)
    }

    fn next_component_id(&self) -> ComponentId {
        self.components
            .iter()
            .map(|c| c.id.next())
            .max()
            .unwrap_or(ComponentId(0))
    }

    fn insert_component(&mut self, component: Component) -> Result<ComponentId, LayoutError> {
        if self.board(component.board).is_none() {
            return Err(LayoutError::UnknownBoard(component.board));
        }
        let body = component.body();
        let grid = &self.grid;
        if body.width() <= 0
            || body.height() <= 0
            || !grid.in_range(body.min_y, body.min_x)
            || !grid.in_range(body.max_y - 1, body.max_x - 1)
        {
            return Err(LayoutError::ComponentOutOfRange {
                board: component.board,
                row: component.start_row,
                col: component.start_col,
            });
        }
        let footprint = component.footprint();
        if let Some(other) = self
            .components_on(component.board)
            .find(|c| c.footprint().overlaps(&footprint))
        {
            return Err(LayoutError::ComponentOverlap(other.id));
        }
        let id = component.id;
        log::debug!(
            "Placed component {} on board {} at row {}, col {}",
            id,
            component.board,
            component.start_row,
            component.start_col
        );
        self.components.push(component);
        Ok(id)
    }

    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component, LayoutError> {
        let idx = self
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or(LayoutError::UnknownComponent(id))?;
        Ok(self.components.remove(idx))
    }

    /// Stores a finished wire. The path must be non-empty and run from
    /// `start` to `end`.
    pub fn add_wire(
        &mut self,
        start: Address,
        end: Address,
        color: WireColor,
        path: Path,
        shifted: bool,
    ) -> Result<WireId, LayoutError> {
        if start == end {
            return Err(LayoutError::DegenerateWire(start));
        }
        let (Some(first), Some(last)) = (path.first(), path.last()) else {
            return Err(LayoutError::EmptyPath);
        };
        if first != GridPoint::from(start) || last != GridPoint::from(end) {
            return Err(LayoutError::EndpointMismatch {
                start,
                end,
                first,
                last,
            });
        }
        let id = self
            .wires
            .iter()
            .map(|w| w.id.next())
            .max()
            .unwrap_or(WireId(0));
        log::debug!(
            "Added wire {} {} -> {} ({} points)",
            id,
            start,
            end,
            path.len()
        );
        self.wires.push(Wire {
            id,
            start,
            end,
            color,
            path,
            shifted,
        });
        Ok(id)
    }

    pub fn remove_wire(&mut self, id: WireId) -> Result<Wire, LayoutError> {
        let idx = self
            .wires
            .iter()
            .position(|w| w.id == id)
            .ok_or(LayoutError::UnknownWire(id))?;
        Ok(self.wires.remove(idx))
    }

    /// Recolours the given wires. When they already share a colour the next
    /// palette entry is used, otherwise a random one. Returns the colour applied.
    pub fn recolor_wires<R: Rng>(&mut self, ids: &[WireId], rng: &mut R) -> Option<WireColor> {
        let mut selected = self.wires.iter().filter(|w| ids.contains(&w.id));
        let first = selected.next()?.color;
        let color = if selected.all(|w| w.color == first) {
            first.next()
        } else {
            WireColor::from_index(rng.gen_range(0..WireColor::PALETTE.len()))
        };
        for wire in self.wires.iter_mut().filter(|w| ids.contains(&w.id)) {
            wire.color = color;
        }
        Some(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn two_boards() -> LayoutDB {
        let mut db = LayoutDB::new(GridSpec::default());
        db.add_board(0, 0).unwrap();
        db.add_board(1300, 0).unwrap();
        db
    }

    #[test]
    fn adjacency_is_mutual() {
        let db = two_boards();
        let (a, b) = (&db.boards[0], &db.boards[1]);
        assert_eq!(a.adjacency(b, &db.grid), Some(Side::Right));
        assert_eq!(b.adjacency(a, &db.grid), Some(Side::Left));
    }

    #[test]
    fn stacked_boards_touch_vertically() {
        let grid = GridSpec::default();
        let top = Board { id: BoardId(0), x: 0, y: 0 };
        let bottom = Board { id: BoardId(1), x: 10, y: 365 };
        assert_eq!(top.adjacency(&bottom, &grid), Some(Side::Below));
        assert_eq!(bottom.adjacency(&top, &grid), Some(Side::Above));
        let far = Board { id: BoardId(2), x: 0, y: 400 };
        assert_eq!(top.adjacency(&far, &grid), None);
    }

    #[test]
    fn board_placement_rules() {
        let mut db = two_boards();
        assert!(matches!(
            db.add_board(100, 10),
            Err(LayoutError::BoardOverlap { .. })
        ));
        assert_eq!(
            db.add_board(5000, 5000),
            Err(LayoutError::BoardNotAdjacent { x: 5000, y: 5000 })
        );
        assert_eq!(db.add_board(0, 360), Ok(BoardId(2)));
    }

    #[test]
    fn crossing_requires_edge() {
        let grid = GridSpec::default();
        assert_eq!(Side::Right.crossing(&grid, 2, 62), Some((2, 0)));
        assert_eq!(Side::Right.crossing(&grid, 2, 61), None);
        assert_eq!(Side::Left.crossing(&grid, 7, 0), Some((7, 62)));
        assert_eq!(Side::Below.crossing(&grid, 12, 5), Some((-3, 5)));
        assert_eq!(Side::Above.crossing(&grid, -3, 5), Some((12, 5)));
    }

    #[test]
    fn pin_band_is_centred() {
        let c = Component {
            id: ComponentId(0),
            board: BoardId(0),
            start_row: 4,
            start_col: 10,
            body_rows: 2,
            body_cols: 5,
            pins: 6,
        };
        assert_eq!(c.pin_band(), (11, 14));
        assert_eq!(c.pin_rows(), (3, 6));
        assert!(c.blocks(4, 10));
        assert!(c.blocks(5, 14));
        assert!(c.blocks(3, 12));
        assert!(!c.blocks(3, 10));
        assert!(!c.blocks(6, 14));
        assert!(!c.blocks(7, 12));
    }

    #[test]
    fn dip_body_spans_half_the_pins() {
        let grid = GridSpec::default();
        let c = Component::dip(ComponentId(3), BoardId(0), 20, 8, &grid);
        assert_eq!(c.body(), Rect::from_origin(20, 4, 4, 2));
        assert_eq!(c.pin_band(), (20, 24));
    }

    #[test]
    fn component_placement_rules() {
        let mut db = two_boards();
        let first = db.place_dip(BoardId(0), 10, 8).unwrap();
        assert_eq!(
            db.place_dip(BoardId(0), 12, 8),
            Err(LayoutError::ComponentOverlap(first))
        );
        assert!(db.place_dip(BoardId(1), 12, 8).is_ok());
        assert!(matches!(
            db.place_dip(BoardId(0), 61, 8),
            Err(LayoutError::ComponentOutOfRange { .. })
        ));
        assert_eq!(
            db.place_dip(BoardId(9), 0, 8),
            Err(LayoutError::UnknownBoard(BoardId(9)))
        );
        db.remove_component(first).unwrap();
        assert!(db.place_dip(BoardId(0), 12, 8).is_ok());
    }

    #[test]
    fn wire_validation() {
        let mut db = two_boards();
        let a = Address::new(BoardId(0), 0, 0);
        let b = Address::new(BoardId(0), 0, 1);
        let path = Path::from_points(vec![a.into(), b.into()]);

        assert_eq!(
            db.add_wire(a, a, WireColor::Red, path.clone(), false),
            Err(LayoutError::DegenerateWire(a))
        );
        assert_eq!(
            db.add_wire(a, b, WireColor::Red, Path::new(), false),
            Err(LayoutError::EmptyPath)
        );
        assert!(matches!(
            db.add_wire(b, a, WireColor::Red, path.clone(), false),
            Err(LayoutError::EndpointMismatch { .. })
        ));
        let id = db.add_wire(a, b, WireColor::Red, path, false).unwrap();
        assert_eq!(db.num_wires(), 1);
        db.remove_wire(id).unwrap();
        assert_eq!(db.remove_wire(id), Err(LayoutError::UnknownWire(id)));
    }

    #[test]
    fn recolor_cycles_shared_color() {
        let mut db = two_boards();
        let a = Address::new(BoardId(0), 0, 0);
        let b = Address::new(BoardId(0), 0, 1);
        let path = Path::from_points(vec![a.into(), b.into()]);
        let w0 = db.add_wire(a, b, WireColor::Red, path.clone(), false).unwrap();
        let w1 = db.add_wire(a, b, WireColor::Red, path, false).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(db.recolor_wires(&[w0, w1], &mut rng), Some(WireColor::Black));
        assert!(db.wires.iter().all(|w| w.color == WireColor::Black));
        assert_eq!(db.recolor_wires(&[], &mut rng), None);
    }

    #[test]
    fn recolor_mixed_colors_unifies() {
        let mut db = two_boards();
        let a = Address::new(BoardId(0), 0, 0);
        let b = Address::new(BoardId(0), 0, 1);
        let path = Path::from_points(vec![a.into(), b.into()]);
        let w0 = db.add_wire(a, b, WireColor::Red, path.clone(), false).unwrap();
        let w1 = db.add_wire(a, b, WireColor::Blue, path, false).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let color = db.recolor_wires(&[w0, w1], &mut rng).unwrap();
        assert!(db.wires.iter().all(|w| w.color == color));
    }
}
