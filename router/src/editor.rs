use crate::overlap::{self, WireOffsets};
use crate::session::RoutingSession;
use breadboard_common::db::core::{LayoutDB, WireColor};
use breadboard_common::db::indices::{ComponentId, WireId};
use breadboard_common::geom::coord::Address;
use breadboard_common::geom::path::Path;
use breadboard_common::util::config::WiringConfig;
use rand::Rng;
use std::collections::HashMap;

/// Owns the layout and the single in-progress routing session.
pub struct Editor {
    db: LayoutDB,
    session: Option<RoutingSession>,
    color: WireColor,
}

impl Editor {
    pub fn new(db: LayoutDB, config: &WiringConfig) -> Self {
        Self {
            db,
            session: None,
            color: WireColor::from_index(config.initial_color),
        }
    }

    pub fn db(&self) -> &LayoutDB {
        &self.db
    }

    /// Structural edits go through here. Any live session is dropped since its
    /// pinned segments may no longer be valid.
    pub fn db_mut(&mut self) -> &mut LayoutDB {
        if self.session.take().is_some() {
            log::debug!("Layout edited, routing session discarded");
        }
        &mut self.db
    }

    pub fn into_db(self) -> LayoutDB {
        self.db
    }

    pub fn session(&self) -> Option<&RoutingSession> {
        self.session.as_ref()
    }

    pub fn is_routing(&self) -> bool {
        self.session.is_some()
    }

    pub fn color(&self) -> WireColor {
        self.color
    }

    /// Starts drawing a wire at `start`, discarding any session in progress.
    pub fn begin_wire(&mut self, start: Address) {
        if let Some(old) = self.session.take() {
            log::debug!("Discarding routing session from {}", old.start());
        }
        self.session = Some(RoutingSession::new(start, self.color));
    }

    /// Path to draw while the cursor hovers `hover`. Empty when not routing.
    pub fn preview(&self, hover: Address) -> Path {
        self.session
            .as_ref()
            .map(|s| s.preview(hover, &self.db))
            .unwrap_or_default()
    }

    pub fn pin(&mut self, hover: Address) -> bool {
        match self.session.as_mut() {
            Some(session) => session.pin(hover, &self.db),
            None => false,
        }
    }

    /// Ends the session, storing the wire if it can be routed to `end`.
    pub fn commit(&mut self, end: Address, shifted: bool) -> Option<WireId> {
        let session = self.session.take()?;
        let path = session.finish(end, &self.db)?;
        match self
            .db
            .add_wire(session.start(), end, session.color(), path, shifted)
        {
            Ok(id) => {
                log::info!("Wire {} placed {} -> {}", id, session.start(), end);
                Some(id)
            }
            Err(e) => {
                log::warn!("Wire {} -> {} rejected: {}", session.start(), end, e);
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.session = None;
    }

    pub fn set_color(&mut self, color: WireColor) {
        self.color = color;
        if let Some(session) = self.session.as_mut() {
            session.set_color(color);
        }
    }

    /// Advances the drawing colour.
    pub fn cycle_color(&mut self) -> WireColor {
        self.set_color(self.color.next());
        self.color
    }

    /// Recolours wires and makes the applied colour the drawing colour.
    pub fn recolor<R: Rng>(&mut self, ids: &[WireId], rng: &mut R) -> Option<WireColor> {
        let color = self.db.recolor_wires(ids, rng)?;
        self.color = color;
        Some(color)
    }

    /// Deletes wires and components together. Returns how many were removed.
    pub fn delete(&mut self, wires: &[WireId], components: &[ComponentId]) -> usize {
        let before = self.db.wires.len() + self.db.components.len();
        self.db.wires.retain(|w| !wires.contains(&w.id));
        self.db.components.retain(|c| !components.contains(&c.id));
        let removed = before - self.db.wires.len() - self.db.components.len();
        if removed > 0 {
            self.session = None;
        }
        removed
    }

    /// Fresh overlap offsets for every stored wire.
    pub fn offsets(&self) -> HashMap<WireId, WireOffsets> {
        overlap::disambiguate_all(&self.db.wires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breadboard_common::db::indices::BoardId;
    use breadboard_common::util::config::GridSpec;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn addr(row: i32, col: i32) -> Address {
        Address::new(BoardId(0), row, col)
    }

    fn editor() -> Editor {
        let mut db = LayoutDB::new(GridSpec::default());
        db.add_board(0, 0).unwrap();
        Editor::new(db, &WiringConfig::default())
    }

    #[test]
    fn commit_stores_wire_and_ends_session() {
        let mut ed = editor();
        ed.begin_wire(addr(0, 0));
        assert!(ed.pin(addr(0, 4)));
        let id = ed.commit(addr(2, 4), true).unwrap();
        assert!(!ed.is_routing());

        let wire = ed.db().wire(id).unwrap();
        assert_eq!(wire.start, addr(0, 0));
        assert_eq!(wire.end, addr(2, 4));
        assert_eq!(wire.path.edge_count(), 6);
        assert!(wire.shifted);
        assert_eq!(wire.color, WireColor::Red);
    }

    #[test]
    fn degenerate_or_unroutable_commit_creates_nothing() {
        let mut ed = editor();
        ed.begin_wire(addr(1, 1));
        assert_eq!(ed.commit(addr(1, 1), false), None);
        assert!(!ed.is_routing());

        ed.db_mut().place_component(BoardId(0), 4, 10, 2, 5, 0).unwrap();
        ed.begin_wire(addr(1, 1));
        assert_eq!(ed.commit(addr(4, 12), false), None);
        assert_eq!(ed.db().num_wires(), 0);
        assert_eq!(ed.commit(addr(2, 2), false), None);
    }

    #[test]
    fn new_session_replaces_old() {
        let mut ed = editor();
        ed.begin_wire(addr(0, 0));
        assert!(ed.pin(addr(0, 3)));
        ed.begin_wire(addr(5, 5));
        let session = ed.session().unwrap();
        assert_eq!(session.start(), addr(5, 5));
        assert!(session.pinned().is_empty());
    }

    #[test]
    fn preview_without_session_is_empty() {
        let mut ed = editor();
        assert!(ed.preview(addr(3, 3)).is_empty());
        assert!(!ed.pin(addr(3, 3)));
        ed.begin_wire(addr(0, 0));
        assert_eq!(ed.preview(addr(3, 3)).edge_count(), 6);
        ed.cancel();
        assert!(ed.preview(addr(3, 3)).is_empty());
    }

    #[test]
    fn color_cycles_and_follows_recolor() {
        let mut ed = editor();
        ed.begin_wire(addr(0, 0));
        assert_eq!(ed.cycle_color(), WireColor::Black);
        let id = ed.commit(addr(0, 2), false).unwrap();
        assert_eq!(ed.db().wire(id).unwrap().color, WireColor::Black);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(ed.recolor(&[id], &mut rng), Some(WireColor::Yellow));
        assert_eq!(ed.color(), WireColor::Yellow);
    }

    #[test]
    fn delete_drops_overlap_contribution() {
        let mut ed = editor();
        ed.begin_wire(addr(0, 0));
        let a = ed.commit(addr(0, 6), false).unwrap();
        ed.begin_wire(addr(0, 2));
        let b = ed.commit(addr(0, 8), true).unwrap();
        assert!(!ed.offsets()[&a].is_empty());

        let comp = ed.db_mut().place_dip(BoardId(0), 30, 8).unwrap();
        assert_eq!(ed.delete(&[b], &[comp]), 2);
        let offsets = ed.offsets();
        assert_eq!(offsets.len(), 1);
        assert!(offsets[&a].is_empty());
    }
}
