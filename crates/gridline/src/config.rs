//! Table configuration.
//!
//! [`TableConfig`] holds the metrics and input timings of a table and can be
//! loaded from TOML. Every field has a default, so a configuration file only
//! needs to name what it changes:
//!
//! ```
//! use gridline::TableConfig;
//!
//! let config = TableConfig::from_toml_str(r#"
//! row_height = 22
//!
//! [palette]
//! grid = { r = 0.5, g = 0.5, b = 0.5, a = 1.0 }
//! "#).unwrap();
//! assert_eq!(config.row_height, 22);
//! assert_eq!(config.header_height, 20);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::render::Color;

/// Colors used to paint a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePalette {
    /// Cell area background.
    pub background: Color,
    /// Header strip background.
    pub header: Color,
    /// Column and row separators.
    pub grid: Color,
    /// Cell and header text.
    pub text: Color,
    /// Tint blended over selected cells and columns.
    pub selection: Color,
}

impl Default for TablePalette {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            header: Color::LIGHT_GRAY,
            grid: Color::GRAY,
            text: Color::BLACK,
            selection: Color::from_rgba8(0, 120, 215, 64),
        }
    }
}

/// Metrics and input timings of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Height of one row in pixels.
    pub row_height: i32,
    /// Height of the column header strip in pixels.
    pub header_height: i32,
    /// Thickness of the scrollbars in pixels.
    pub scrollbar_width: i32,
    /// Width of the pointer band around a column edge that starts a resize.
    pub resize_band: i32,
    /// Columns cannot be dragged narrower than this.
    pub min_column_width: i32,
    /// Width a fill column contributes to the preferred size.
    pub fill_min_width: i32,
    /// Preferred height when no row count hint was given.
    pub preferred_height: i32,
    /// Two clicks on the same row or column within this window form a double-click.
    pub double_click_ms: u64,
    /// Delay before a held navigation key starts repeating.
    pub key_delay_ms: u64,
    /// Interval between repeats of a held navigation key.
    pub key_repeat_ms: u64,
    /// Wheel ticks closer together than this accelerate scrolling.
    pub wheel_accel_window_ms: u64,
    /// Colors.
    pub palette: TablePalette,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height: 18,
            header_height: 20,
            scrollbar_width: 16,
            resize_band: 10,
            min_column_width: 20,
            fill_min_width: 20,
            preferred_height: 64,
            double_click_ms: 250,
            key_delay_ms: 250,
            key_repeat_ms: 35,
            wheel_accel_window_ms: 250,
            palette: TablePalette::default(),
        }
    }
}

impl TableConfig {
    /// Parse a configuration from TOML text. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TableConfig = toml::from_str(text)?;
        Ok(config.sanitized())
    }

    /// Read a configuration file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Clamp metrics that must be positive.
    pub(crate) fn sanitized(mut self) -> Self {
        self.row_height = self.row_height.max(1);
        self.header_height = self.header_height.max(0);
        self.scrollbar_width = self.scrollbar_width.max(0);
        self.resize_band = self.resize_band.max(0);
        self.min_column_width = self.min_column_width.max(1);
        self.fill_min_width = self.fill_min_width.max(0);
        self
    }
}
