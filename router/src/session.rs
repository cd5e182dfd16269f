use crate::route;
use breadboard_common::db::core::{LayoutDB, WireColor};
use breadboard_common::geom::coord::Address;
use breadboard_common::geom::path::Path;

/// An interactive wire being drawn. Segments committed with [`pin`] are
/// kept; the live segment to the cursor is recomputed on every preview.
///
/// [`pin`]: RoutingSession::pin
#[derive(Clone, Debug)]
pub struct RoutingSession {
    start: Address,
    pinned: Path,
    pinned_end: Address,
    color: WireColor,
}

impl RoutingSession {
    pub fn new(start: Address, color: WireColor) -> Self {
        Self {
            start,
            pinned: Path::new(),
            pinned_end: start,
            color,
        }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn pinned(&self) -> &Path {
        &self.pinned
    }

    /// Where the next segment starts: the last pin, or the start.
    pub fn pinned_end(&self) -> Address {
        self.pinned_end
    }

    pub fn color(&self) -> WireColor {
        self.color
    }

    pub fn set_color(&mut self, color: WireColor) {
        self.color = color;
    }

    /// Pinned segments followed by a fresh route to `hover`. Falls back to the
    /// pinned part alone when `hover` cannot be reached.
    pub fn preview(&self, hover: Address, db: &LayoutDB) -> Path {
        let live = route(self.pinned_end, hover, db);
        let mut path = self.pinned.clone();
        path.append_segment(&live);
        path
    }

    /// Commits the segment up to `hover`. Returns false, leaving the session
    /// unchanged, when that segment cannot be routed.
    pub fn pin(&mut self, hover: Address, db: &LayoutDB) -> bool {
        let segment = route(self.pinned_end, hover, db);
        if segment.is_empty() {
            log::debug!("Pin at {} rejected: unroutable", hover);
            return false;
        }
        self.pinned.append_segment(&segment);
        self.pinned_end = hover;
        true
    }

    /// Final path ending at `end`, or `None` when the wire would be
    /// zero-length or the last segment cannot be routed.
    pub fn finish(&self, end: Address, db: &LayoutDB) -> Option<Path> {
        if end == self.start {
            log::debug!("Wire from {} to itself dropped", end);
            return None;
        }
        let segment = route(self.pinned_end, end, db);
        if segment.is_empty() {
            log::debug!("Wire {} -> {} dropped: unroutable", self.start, end);
            return None;
        }
        let mut path = self.pinned.clone();
        path.append_segment(&segment);
        Some(path)
    }
}
