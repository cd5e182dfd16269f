pub mod coord;
pub mod path;
pub mod rect;
