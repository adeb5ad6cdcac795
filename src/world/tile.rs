use serde::{Deserialize, Serialize};

// === Enums ===

/// Handle into the game's two-slot side registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SideId {
    /// Side A, driven by the player.
    Human,
    /// Side B, driven by the scripted opponent.
    Opponent,
}

impl SideId {
    pub fn index(self) -> usize {
        match self {
            SideId::Human => 0,
            SideId::Opponent => 1,
        }
    }

    pub fn all() -> [SideId; 2] {
        [SideId::Human, SideId::Opponent]
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideId::Human => write!(f, "Player"),
            SideId::Opponent => write!(f, "Opponent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ownership {
    Own,
    Other,
}

/// Read-only projection of a tile for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileLabel {
    Empty,
    Rice(Ownership),
    RiceWatered(Ownership),
    House(Ownership),
    HouseWatered(Ownership),
}

impl TileLabel {
    /// Two-character map glyph: lowercase for the viewer's tiles, uppercase for the other side.
    pub fn glyph(self) -> &'static str {
        match self {
            TileLabel::Empty => "..",
            TileLabel::Rice(Ownership::Own) => "r ",
            TileLabel::Rice(Ownership::Other) => "R ",
            TileLabel::RiceWatered(Ownership::Own) => "r~",
            TileLabel::RiceWatered(Ownership::Other) => "R~",
            TileLabel::House(Ownership::Own) => "h ",
            TileLabel::House(Ownership::Other) => "H ",
            TileLabel::HouseWatered(Ownership::Own) => "h~",
            TileLabel::HouseWatered(Ownership::Other) => "H~",
        }
    }
}

// === Tile ===

/// A grid cell. Once occupied it stays with its owner for the rest of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    required_units: u32,
    owner: Option<SideId>,
    watered: bool,
    housed: bool,
}

impl Tile {
    pub fn new(required_units: u32) -> Self {
        Self {
            required_units,
            owner: None,
            watered: false,
            housed: false,
        }
    }

    pub fn required_units(&self) -> u32 {
        self.required_units
    }

    pub fn set_required_units(&mut self, required_units: u32) {
        self.required_units = required_units;
    }

    pub fn owner(&self) -> Option<SideId> {
        self.owner
    }

    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_watered(&self) -> bool {
        self.watered
    }

    pub fn is_housed(&self) -> bool {
        self.housed
    }

    pub(crate) fn occupy(&mut self, side: SideId) {
        self.owner = Some(side);
    }

    pub(crate) fn set_watered(&mut self) {
        self.watered = true;
    }

    pub(crate) fn set_housed(&mut self) {
        self.housed = true;
    }

    /// Label of this tile as seen by `perspective`.
    pub fn label(&self, perspective: SideId) -> TileLabel {
        let Some(owner) = self.owner else {
            return TileLabel::Empty;
        };
        let ownership = if owner == perspective {
            Ownership::Own
        } else {
            Ownership::Other
        };
        match (self.housed, self.watered) {
            (true, true) => TileLabel::HouseWatered(ownership),
            (true, false) => TileLabel::House(ownership),
            (false, true) => TileLabel::RiceWatered(ownership),
            (false, false) => TileLabel::Rice(ownership),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_unoccupied() {
        let tile = Tile::new(4);
        assert_eq!(tile.required_units(), 4);
        assert!(!tile.is_occupied());
        assert_eq!(tile.owner(), None);
        assert!(!tile.is_watered());
        assert!(!tile.is_housed());
        assert_eq!(tile.label(SideId::Human), TileLabel::Empty);
    }

    #[test]
    fn occupied_iff_owner_present() {
        let mut tile = Tile::new(1);
        tile.occupy(SideId::Opponent);
        assert!(tile.is_occupied());
        assert_eq!(tile.owner(), Some(SideId::Opponent));
    }

    #[test]
    fn label_depends_on_perspective() {
        let mut tile = Tile::new(0);
        tile.occupy(SideId::Human);
        assert_eq!(tile.label(SideId::Human), TileLabel::Rice(Ownership::Own));
        assert_eq!(
            tile.label(SideId::Opponent),
            TileLabel::Rice(Ownership::Other)
        );

        tile.set_watered();
        assert_eq!(
            tile.label(SideId::Human),
            TileLabel::RiceWatered(Ownership::Own)
        );

        tile.set_housed();
        assert_eq!(
            tile.label(SideId::Opponent),
            TileLabel::HouseWatered(Ownership::Other)
        );
    }

    #[test]
    fn side_ids_index_registry() {
        assert_eq!(SideId::Human.index(), 0);
        assert_eq!(SideId::Opponent.index(), 1);
        assert_eq!(SideId::all(), [SideId::Human, SideId::Opponent]);
    }

    #[test]
    fn tile_serde_round_trip() {
        let mut tile = Tile::new(7);
        tile.occupy(SideId::Human);
        tile.set_housed();
        let encoded = bincode::serialize(&tile).expect("serialize");
        let decoded: Tile = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(tile, decoded);
    }
}
