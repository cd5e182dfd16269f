use crate::db::core::{LayoutDB, WireColor};
use crate::geom::coord::Address;
use serde::{Deserialize, Serialize};

/// A wire the user wants drawn: start, optional pinned waypoints, end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRequest {
    pub start: Address,
    pub end: Address,
    #[serde(default)]
    pub via: Vec<Address>,
    #[serde(default)]
    pub color: Option<WireColor>,
    #[serde(default)]
    pub shifted: bool,
}

/// On-disk layout: the placed design plus wires still to be routed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayoutFile {
    #[serde(flatten)]
    pub layout: LayoutDB,
    #[serde(default)]
    pub requests: Vec<WireRequest>,
}
