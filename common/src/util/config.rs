use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub wiring: WiringConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Shape of every board in a layout. All boards share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_rail_rows")]
    pub rail_rows: i32,
    /// Anchor units per grid step.
    #[serde(default = "default_pitch")]
    pub pitch: i32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            rail_rows: default_rail_rows(),
            pitch: default_pitch(),
        }
    }
}

impl GridSpec {
    #[inline(always)]
    pub fn first_row(&self) -> i32 {
        -self.rail_rows
    }

    #[inline(always)]
    pub fn last_row(&self) -> i32 {
        self.rows + self.rail_rows - 1
    }

    #[inline(always)]
    pub fn last_col(&self) -> i32 {
        self.cols - 1
    }

    #[inline(always)]
    pub fn in_range(&self, row: i32, col: i32) -> bool {
        col >= 0 && col < self.cols && row >= self.first_row() && row <= self.last_row()
    }

    /// Board footprint width in anchor units.
    pub fn board_width(&self) -> i32 {
        (self.cols + 2) * self.pitch
    }

    /// Board footprint height in anchor units, rails and centre divide included.
    pub fn board_height(&self) -> i32 {
        (self.rows + 6) * self.pitch + 2 * self.pitch
    }

    /// Row where a dual-inline body starts so that it straddles the divide.
    pub fn dip_row(&self) -> i32 {
        self.rows / 2 - 1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WiringConfig {
    /// Rendering distance of one overlap step.
    #[serde(default = "default_offset_unit")]
    pub offset_unit: f64,
    /// Palette entry a fresh editor draws with.
    #[serde(default)]
    pub initial_color: usize,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            offset_unit: default_offset_unit(),
            initial_color: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_layout_file")]
    pub layout_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            layout_file: default_layout_file(),
            output_file: default_output_file(),
        }
    }
}

fn default_rows() -> i32 {
    10
}

fn default_cols() -> i32 {
    63
}

fn default_rail_rows() -> i32 {
    3
}

fn default_pitch() -> i32 {
    20
}

fn default_offset_unit() -> f64 {
    3.0
}

fn default_layout_file() -> String {
    "inputs/layout.toml".to_string()
}

fn default_output_file() -> String {
    "output/routed.toml".to_string()
}
