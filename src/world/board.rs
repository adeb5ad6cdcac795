use serde::{Deserialize, Serialize};

use crate::world::side::Side;
use crate::world::tile::{SideId, Tile, TileLabel};
use crate::world::topology::{grid_coord, grid_index, Coord};

/// Rice level every cell starts with.
pub const INITIAL_RICE_LEVEL: f64 = 1.0;
/// Growth cap for a watered tile.
pub const WATERED_RICE_CAP: f64 = 3.0;
/// Growth cap for an unwatered tile.
pub const DRY_RICE_CAP: f64 = 2.0;

/// Square grid of tiles with a parallel grid of rice levels, both row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    size: u32,
    tiles: Vec<Tile>,
    rice_levels: Vec<f64>,
}

impl Board {
    /// Build a `size × size` board, asking `required_units` for each cell's capture cost.
    pub fn with_required_units(size: u32, mut required_units: impl FnMut(Coord) -> u32) -> Self {
        let total = (size * size) as usize;
        let tiles = (0..total)
            .map(|i| Tile::new(required_units(grid_coord(i, size))))
            .collect();
        Self {
            size,
            tiles,
            rice_levels: vec![INITIAL_RICE_LEVEL; total],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total_tiles(&self) -> u32 {
        self.size * self.size
    }

    /// True when both grids hold exactly `size²` cells.
    pub fn is_consistent(&self) -> bool {
        let total = self.total_tiles() as usize;
        self.tiles.len() == total && self.rice_levels.len() == total
    }

    pub fn within_bounds(&self, coord: Coord) -> bool {
        grid_index(coord, self.size).is_some()
    }

    pub fn tile_at(&self, coord: Coord) -> Option<&Tile> {
        grid_index(coord, self.size).map(|i| &self.tiles[i])
    }

    pub fn tile_at_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        grid_index(coord, self.size).map(|i| &mut self.tiles[i])
    }

    pub fn rice_at(&self, coord: Coord) -> Option<f64> {
        grid_index(coord, self.size).map(|i| self.rice_levels[i])
    }

    pub fn set_rice_at(&mut self, coord: Coord, level: f64) {
        if let Some(i) = grid_index(coord, self.size) {
            self.rice_levels[i] = level;
        }
    }

    pub fn is_controlled_by(&self, coord: Coord, side: SideId) -> bool {
        self.tile_at(coord).is_some_and(|t| t.owner() == Some(side))
    }

    /// Hand a side its home tile without charging units.
    ///
    /// Returns false, changing nothing, if the tile is off the board or already taken.
    pub fn set_start_tile(&mut self, coord: Coord, side: SideId) -> bool {
        match self.tile_at_mut(coord) {
            Some(tile) if !tile.is_occupied() => {
                tile.occupy(side);
                true
            }
            _ => false,
        }
    }

    /// Capture `coord` for `side`, paying the tile's required units.
    ///
    /// Returns false and leaves everything untouched if the tile is outside the
    /// board, already occupied, or costs more units than the side has.
    pub fn claim(&mut self, coord: Coord, side: &mut Side) -> bool {
        let Some(i) = grid_index(coord, self.size) else {
            return false;
        };
        let tile = &mut self.tiles[i];
        if tile.is_occupied() || side.units() < tile.required_units() {
            return false;
        }
        tile.occupy(side.id());
        side.spend_units(tile.required_units());
        true
    }

    /// Set the watered flag. Callers check ownership and resources.
    pub fn water(&mut self, coord: Coord) {
        if let Some(tile) = self.tile_at_mut(coord) {
            tile.set_watered();
        }
    }

    /// Set the housed flag. Callers check ownership and resources.
    pub fn build_house(&mut self, coord: Coord) {
        if let Some(tile) = self.tile_at_mut(coord) {
            tile.set_housed();
        }
    }

    /// Grow rice on every tile owned by `side`: +2 up to 3 when watered, else +1 up to 2.
    pub fn grow_rice(&mut self, side: SideId) {
        for (tile, level) in self.tiles.iter().zip(self.rice_levels.iter_mut()) {
            if tile.owner() != Some(side) {
                continue;
            }
            *level = if tile.is_watered() {
                (*level + 2.0).min(WATERED_RICE_CAP)
            } else {
                (*level + 1.0).min(DRY_RICE_CAP)
            };
        }
    }

    /// Render-only view of a cell; `None` outside the board.
    pub fn state_label(&self, coord: Coord, perspective: SideId) -> Option<TileLabel> {
        self.tile_at(coord).map(|t| t.label(perspective))
    }

    /// Coordinates owned by `side`, in ascending `(x, y)` order.
    pub fn controlled_coords(&self, side: SideId) -> Vec<Coord> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.owner() == Some(side))
            .map(|(i, _)| grid_coord(i, self.size))
            .collect()
    }

    pub fn count_controlled(&self, side: SideId) -> u32 {
        self.tiles
            .iter()
            .filter(|t| t.owner() == Some(side))
            .count() as u32
    }

    /// Iterate every cell with its coordinate, tile and rice level.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Tile, f64)> + '_ {
        self.tiles
            .iter()
            .zip(self.rice_levels.iter())
            .enumerate()
            .map(|(i, (tile, &level))| (grid_coord(i, self.size), tile, level))
    }
}
