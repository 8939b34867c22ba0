use crate::utils::error::{GalleryError, Result};
use crate::utils::validation::{validate_positive_number, Validate};

/// Grid position of one tile in the pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub row: u32,
    pub col: u32,
}

/// Geometry of a composite built from a `factor x factor` tile grid,
/// optionally repeated `repeat` times along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub dim: u32,
    pub factor: u32,
    pub repeat: u32,
}

impl TileLayout {
    pub fn new(dim: u32, factor: u32, repeat: u32) -> Result<Self> {
        let layout = Self {
            dim,
            factor,
            repeat,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Edge length of one resized tile. One pixel wider than the exact
    /// division so the grid always covers the canvas; the overshoot is clipped.
    pub fn tile_dim(&self) -> u32 {
        let cells = self.factor as u64 * self.repeat as u64;
        (self.dim as u64 / cells + 1) as u32
    }

    /// Top-left canvas pixel of a tile (column is x, row is y).
    pub fn tile_origin(&self, coord: TileCoord) -> (i64, i64) {
        let d = self.tile_dim() as i64;
        (coord.col as i64 * d, coord.row as i64 * d)
    }

    pub fn single_dim(&self) -> u32 {
        self.factor * self.tile_dim()
    }

    /// `single_dim` with every intermediate product checked against `u32`.
    fn checked_single_dim(&self) -> Option<u32> {
        let cells = self.factor.checked_mul(self.repeat)?;
        let tile_dim = (self.dim / cells).checked_add(1)?;
        self.factor.checked_mul(tile_dim)
    }

    /// Origins for the copies of the first grid, excluding the grid itself.
    pub fn repeat_origins(&self) -> Vec<(i64, i64)> {
        let single = self.single_dim() as i64;
        let mut origins = Vec::new();
        for i in 0..self.repeat as i64 {
            for j in 0..self.repeat as i64 {
                if i == 0 && j == 0 {
                    continue;
                }
                origins.push((single * i, single * j));
            }
        }
        origins
    }

    /// Row-major iteration over every tile in the level.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.factor).flat_map(move |row| (0..self.factor).map(move |col| TileCoord { row, col }))
    }

    pub fn tile_count(&self) -> usize {
        (self.factor as usize) * (self.factor as usize)
    }

    /// Path of a tile relative to the pyramid root: `<factor>/<row>/<col>.jpg`.
    pub fn tile_path(&self, coord: TileCoord) -> String {
        format!("{}/{}/{}.jpg", self.factor, coord.row, coord.col)
    }

    /// Fractional cell size used by the gallery viewer.
    pub fn cell_dim(&self) -> f64 {
        self.dim as f64 / self.factor as f64
    }

    /// Grid cell under a canvas pixel, or `None` outside the canvas.
    pub fn pixel_to_tile(&self, x: f64, y: f64) -> Option<TileCoord> {
        if x < 0.0 || y < 0.0 || x >= self.dim as f64 || y >= self.dim as f64 {
            return None;
        }
        let cell = self.cell_dim();
        let col = ((x / cell).floor() as u32).min(self.factor - 1);
        let row = ((y / cell).floor() as u32).min(self.factor - 1);
        Some(TileCoord { row, col })
    }

    /// `(x_min, x_max, y_min, y_max)` of a cell in viewer coordinates.
    pub fn tile_bounds(&self, coord: TileCoord) -> (f64, f64, f64, f64) {
        let cell = self.cell_dim();
        (
            coord.col as f64 * cell,
            (coord.col + 1) as f64 * cell,
            coord.row as f64 * cell,
            (coord.row + 1) as f64 * cell,
        )
    }
}

impl Validate for TileLayout {
    fn validate(&self) -> Result<()> {
        validate_positive_number("dim", self.dim as usize, 1)?;
        validate_positive_number("factor", self.factor as usize, 1)?;
        validate_positive_number("repeat", self.repeat as usize, 1)?;

        if self.checked_single_dim().is_none() {
            return Err(GalleryError::InvalidConfigValueError {
                field: "repeat".to_string(),
                value: self.repeat.to_string(),
                reason: format!(
                    "grid of {} tiles repeated {} times does not fit in u32 pixels",
                    self.factor, self.repeat
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_geometry() {
        let layout = TileLayout::new(500, 32, 1).unwrap();
        // 500 / 32 = 15, 再加 1
        assert_eq!(layout.tile_dim(), 16);
        assert_eq!(layout.single_dim(), 512);
        assert_eq!(layout.tile_count(), 1024);
        assert!(layout.repeat_origins().is_empty());
    }

    #[test]
    fn test_tile_origin_uses_col_as_x() {
        let layout = TileLayout::new(100, 4, 1).unwrap();
        assert_eq!(layout.tile_dim(), 26);
        assert_eq!(layout.tile_origin(TileCoord { row: 1, col: 3 }), (78, 26));
    }

    #[test]
    fn test_repeat_origins() {
        let layout = TileLayout::new(100, 2, 2).unwrap();
        assert_eq!(layout.tile_dim(), 26);
        assert_eq!(layout.single_dim(), 52);
        assert_eq!(layout.repeat_origins(), vec![(0, 52), (52, 0), (52, 52)]);
    }

    #[test]
    fn test_coords_row_major() {
        let layout = TileLayout::new(10, 2, 1).unwrap();
        let coords: Vec<_> = layout.coords().collect();
        assert_eq!(
            coords,
            vec![
                TileCoord { row: 0, col: 0 },
                TileCoord { row: 0, col: 1 },
                TileCoord { row: 1, col: 0 },
                TileCoord { row: 1, col: 1 },
            ]
        );
        assert_eq!(layout.tile_path(coords[2]), "2/1/0.jpg");
    }

    #[test]
    fn test_pixel_to_tile() {
        let layout = TileLayout::new(800, 10, 1).unwrap();
        assert_eq!(
            layout.pixel_to_tile(85.0, 159.9),
            Some(TileCoord { row: 1, col: 1 })
        );
        assert_eq!(
            layout.pixel_to_tile(799.9, 0.0),
            Some(TileCoord { row: 0, col: 9 })
        );
        assert_eq!(layout.pixel_to_tile(800.0, 10.0), None);
        assert_eq!(layout.pixel_to_tile(-1.0, 10.0), None);
    }

    #[test]
    fn test_tile_bounds() {
        let layout = TileLayout::new(800, 10, 1).unwrap();
        assert_eq!(
            layout.tile_bounds(TileCoord { row: 2, col: 1 }),
            (80.0, 160.0, 160.0, 240.0)
        );
    }

    #[test]
    fn test_rejects_zero_values() {
        assert!(TileLayout::new(0, 32, 1).is_err());
        assert!(TileLayout::new(500, 0, 1).is_err());
        assert!(TileLayout::new(500, 32, 0).is_err());
    }

    #[test]
    fn test_rejects_overflowing_grid() {
        match TileLayout::new(500, 65536, 65536) {
            Err(GalleryError::InvalidConfigValueError { field, .. }) => assert_eq!(field, "repeat"),
            other => panic!("expected InvalidConfigValueError, got {:?}", other),
        }
        assert!(TileLayout::new(u32::MAX, 1, 1).is_err());
        // 大 factor 但乘積仍在範圍內
        let layout = TileLayout::new(500, 65536, 1).unwrap();
        assert_eq!(layout.tile_dim(), 1);
    }
}
