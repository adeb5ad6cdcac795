use serde::{Deserialize, Serialize};

use crate::world::tile::SideId;
use crate::world::topology::Coord;
use crate::world::Board;

/// Water spent per watering.
pub const WATERING_COST: f64 = 5.0;
/// Rice spent per house.
pub const HOUSE_RICE_COST: f64 = 25.0;
/// Water spent per house.
pub const HOUSE_WATER_COST: f64 = 10.0;
/// Units spent per house.
pub const HOUSE_UNIT_COST: u32 = 1;
/// Rice each unit eats per day.
///
/// The in-game rules text says 2; day resolution has always charged 3.
pub const RICE_EATEN_PER_UNIT: f64 = 3.0;
/// Rice per unit according to the rules text, kept for reference.
pub const RULES_TEXT_RICE_PER_UNIT: f64 = 2.0;

// === Outcomes ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimOutcome {
    Claimed,
    OutOfBounds,
    AlreadyOccupiedOrInsufficientUnits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterOutcome {
    Watered,
    InsufficientWater,
    NotControlledOrOutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutcome {
    Built,
    InsufficientResources,
    NotEligibleTile,
}

impl std::fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimOutcome::Claimed => write!(f, "Territory claimed"),
            ClaimOutcome::OutOfBounds => write!(f, "That tile is off the board"),
            ClaimOutcome::AlreadyOccupiedOrInsufficientUnits => {
                write!(f, "Could not claim the territory")
            }
        }
    }
}

impl std::fmt::Display for WaterOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaterOutcome::Watered => write!(f, "Rice watered, it now grows faster"),
            WaterOutcome::InsufficientWater => write!(f, "Not enough water"),
            WaterOutcome::NotControlledOrOutOfBounds => {
                write!(f, "Rice cannot be watered on this tile")
            }
        }
    }
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildOutcome::Built => write!(f, "House built, more workers will come"),
            BuildOutcome::InsufficientResources => {
                write!(f, "Not enough resources to build a house")
            }
            BuildOutcome::NotEligibleTile => write!(f, "A house cannot be built on this tile"),
        }
    }
}

// === Resource history ===

/// End-of-day resource levels for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub water: f64,
    pub rice: f64,
    pub units: u32,
    pub houses: u32,
}

/// The four charted resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Water,
    Rice,
    Units,
    Houses,
}

impl ResourceKind {
    pub fn all() -> [ResourceKind; 4] {
        [
            ResourceKind::Water,
            ResourceKind::Rice,
            ResourceKind::Units,
            ResourceKind::Houses,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Water => "water",
            ResourceKind::Rice => "rice",
            ResourceKind::Units => "units",
            ResourceKind::Houses => "houses",
        }
    }

    pub fn value(self, snapshot: &ResourceSnapshot) -> f64 {
        match self {
            ResourceKind::Water => snapshot.water,
            ResourceKind::Rice => snapshot.rice,
            ResourceKind::Units => snapshot.units as f64,
            ResourceKind::Houses => snapshot.houses as f64,
        }
    }
}

// === Side ===

/// One competing party: its stockpiles, workforce and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Side {
    id: SideId,
    home: Coord,
    rice: f64,
    water: f64,
    units: u32,
    houses: u32,
    controlled_tiles: u32,
    history: Vec<ResourceSnapshot>,
}

impl Side {
    /// Create a side and give it `home` on the board for free.
    ///
    /// If `home` cannot be taken the side starts with no tiles.
    pub fn new(
        id: SideId,
        home: Coord,
        rice: f64,
        water: f64,
        units: u32,
        board: &mut Board,
    ) -> Self {
        let placed = board.set_start_tile(home, id);
        Self {
            controlled_tiles: u32::from(placed),
            ..Self::detached(id, home, rice, water, units)
        }
    }

    /// A side that owns nothing yet.
    pub(crate) fn detached(id: SideId, home: Coord, rice: f64, water: f64, units: u32) -> Self {
        Self {
            id,
            home,
            rice,
            water,
            units,
            houses: 0,
            controlled_tiles: 0,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> SideId {
        self.id
    }

    pub fn home(&self) -> Coord {
        self.home
    }

    pub fn rice(&self) -> f64 {
        self.rice
    }

    pub fn water(&self) -> f64 {
        self.water
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn houses(&self) -> u32 {
        self.houses
    }

    pub fn controlled_tiles(&self) -> u32 {
        self.controlled_tiles
    }

    pub fn history(&self) -> &[ResourceSnapshot] {
        &self.history
    }

    pub fn set_rice(&mut self, rice: f64) {
        self.rice = rice.max(0.0);
    }

    pub fn set_water(&mut self, water: f64) {
        self.water = water.max(0.0);
    }

    pub fn set_units(&mut self, units: u32) {
        self.units = units;
    }

    #[cfg(test)]
    pub(crate) fn set_houses(&mut self, houses: u32) {
        self.houses = houses;
    }

    pub(crate) fn spend_units(&mut self, amount: u32) {
        self.units -= amount;
    }

    /// One resource over every completed day.
    pub fn series(&self, kind: ResourceKind) -> Vec<f64> {
        self.history.iter().map(|s| kind.value(s)).collect()
    }

    pub fn collect_water(&mut self, amount: f64) {
        self.water += amount;
    }

    pub fn claim_territory(&mut self, coord: Coord, board: &mut Board) -> ClaimOutcome {
        if !board.within_bounds(coord) {
            return ClaimOutcome::OutOfBounds;
        }
        if !board.claim(coord, self) {
            return ClaimOutcome::AlreadyOccupiedOrInsufficientUnits;
        }
        self.controlled_tiles += 1;
        ClaimOutcome::Claimed
    }

    pub fn water_tile(&mut self, coord: Coord, board: &mut Board) -> WaterOutcome {
        if !board.is_controlled_by(coord, self.id) {
            return WaterOutcome::NotControlledOrOutOfBounds;
        }
        if self.water < WATERING_COST {
            return WaterOutcome::InsufficientWater;
        }
        self.water -= WATERING_COST;
        board.water(coord);
        WaterOutcome::Watered
    }

    pub fn build_house(&mut self, coord: Coord, board: &mut Board) -> BuildOutcome {
        let eligible = board.is_controlled_by(coord, self.id)
            && board.tile_at(coord).is_some_and(|t| !t.is_housed());
        if !eligible {
            return BuildOutcome::NotEligibleTile;
        }
        if !self.can_afford_house() {
            return BuildOutcome::InsufficientResources;
        }
        self.rice -= HOUSE_RICE_COST;
        self.water -= HOUSE_WATER_COST;
        self.units -= HOUSE_UNIT_COST;
        self.houses += 1;
        board.build_house(coord);
        BuildOutcome::Built
    }

    pub fn can_afford_house(&self) -> bool {
        self.rice >= HOUSE_RICE_COST
            && self.water >= HOUSE_WATER_COST
            && self.units >= HOUSE_UNIT_COST
    }

    /// Harvest every owned tile, leaving each one level lower. Levels are not floored.
    ///
    /// Returns the amount harvested.
    pub fn collect_rice(&mut self, board: &mut Board) -> f64 {
        let mut harvested = 0.0;
        for coord in board.controlled_coords(self.id) {
            let level = board.rice_at(coord).unwrap_or_default();
            harvested += level;
            board.set_rice_at(coord, level - 1.0);
        }
        self.rice += harvested;
        harvested
    }

    /// Feed `population` units; rice never drops below zero.
    ///
    /// Returns the amount actually eaten.
    pub fn eat_rice(&mut self, population: u32) -> f64 {
        let before = self.rice;
        self.rice = (self.rice - population as f64 * RICE_EATEN_PER_UNIT).max(0.0);
        before - self.rice
    }

    /// Each house adds one unit, provided any rice is left.
    ///
    /// Returns the number of new units.
    pub fn reproduce(&mut self) -> u32 {
        if self.rice == 0.0 {
            return 0;
        }
        self.units += self.houses;
        self.houses
    }

    pub fn save_resource_snapshot(&mut self) {
        self.history.push(ResourceSnapshot {
            water: self.water,
            rice: self.rice,
            units: self.units,
            houses: self.houses,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: u32, cost: u32) -> Board {
        Board::with_required_units(size, |_| cost)
    }

    fn human_at_corner(board: &mut Board) -> Side {
        let last = board.size() as i32 - 1;
        Side::new(SideId::Human, Coord::new(last, last), 20.0, 10.0, 15, board)
    }

    #[test]
    fn new_side_owns_home_for_free() {
        let mut b = board(10, 9);
        let side = human_at_corner(&mut b);
        assert_eq!(side.units(), 15);
        assert_eq!(side.controlled_tiles(), 1);
        assert!(b.is_controlled_by(Coord::new(9, 9), SideId::Human));
        assert!(side.history().is_empty());
    }

    #[test]
    fn claim_adjacent_tile_on_fresh_board() {
        let mut b = board(10, 9);
        b.tile_at_mut(Coord::new(8, 9)).unwrap().set_required_units(5);
        let mut side = human_at_corner(&mut b);

        let outcome = side.claim_territory(Coord::new(8, 9), &mut b);
        assert_eq!(outcome, ClaimOutcome::Claimed);
        assert_eq!(side.units(), 10);
        assert_eq!(side.controlled_tiles(), 2);
        assert_eq!(b.count_controlled(SideId::Human), 2);
    }

    #[test]
    fn failed_claims_leave_counters_alone() {
        let mut b = board(4, 20);
        let mut side = human_at_corner(&mut b);

        assert_eq!(
            side.claim_territory(Coord::new(2, 3), &mut b),
            ClaimOutcome::AlreadyOccupiedOrInsufficientUnits
        );
        assert_eq!(
            side.claim_territory(Coord::new(3, 3), &mut b),
            ClaimOutcome::AlreadyOccupiedOrInsufficientUnits
        );
        assert_eq!(
            side.claim_territory(Coord::new(4, 3), &mut b),
            ClaimOutcome::OutOfBounds
        );
        assert_eq!(side.units(), 15);
        assert_eq!(side.controlled_tiles(), 1);
    }

    #[test]
    fn water_tile_with_too_little_water() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_water(3.0);

        assert_eq!(
            side.water_tile(Coord::new(9, 9), &mut b),
            WaterOutcome::InsufficientWater
        );
        assert_eq!(side.water(), 3.0);
        assert!(!b.tile_at(Coord::new(9, 9)).unwrap().is_watered());
    }

    #[test]
    fn water_tile_requires_control() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        assert_eq!(
            side.water_tile(Coord::new(0, 0), &mut b),
            WaterOutcome::NotControlledOrOutOfBounds
        );
        assert_eq!(
            side.water_tile(Coord::new(-1, 9), &mut b),
            WaterOutcome::NotControlledOrOutOfBounds
        );
        assert_eq!(side.water(), 10.0);
    }

    #[test]
    fn water_tile_success() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        assert_eq!(
            side.water_tile(Coord::new(9, 9), &mut b),
            WaterOutcome::Watered
        );
        assert_eq!(side.water(), 5.0);
        assert!(b.tile_at(Coord::new(9, 9)).unwrap().is_watered());
    }

    #[test]
    fn build_house_success_and_rehousing_rejected() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_rice(30.0);
        side.set_water(25.0);

        assert_eq!(side.build_house(Coord::new(9, 9), &mut b), BuildOutcome::Built);
        assert_eq!(side.rice(), 5.0);
        assert_eq!(side.water(), 15.0);
        assert_eq!(side.units(), 14);
        assert_eq!(side.houses(), 1);
        assert!(b.tile_at(Coord::new(9, 9)).unwrap().is_housed());

        side.set_rice(30.0);
        assert_eq!(
            side.build_house(Coord::new(9, 9), &mut b),
            BuildOutcome::NotEligibleTile
        );
        assert_eq!(side.houses(), 1);
    }

    #[test]
    fn build_house_needs_every_resource() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_rice(24.0);
        side.set_water(50.0);
        assert_eq!(
            side.build_house(Coord::new(9, 9), &mut b),
            BuildOutcome::InsufficientResources
        );

        side.set_rice(25.0);
        side.set_units(0);
        assert_eq!(
            side.build_house(Coord::new(9, 9), &mut b),
            BuildOutcome::InsufficientResources
        );
        assert_eq!(side.rice(), 25.0);
        assert_eq!(side.water(), 50.0);
        assert_eq!(side.houses(), 0);
    }

    #[test]
    fn build_house_on_foreign_tile_rejected() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_rice(100.0);
        side.set_water(100.0);
        assert_eq!(
            side.build_house(Coord::new(5, 5), &mut b),
            BuildOutcome::NotEligibleTile
        );
    }

    #[test]
    fn collect_rice_harvests_and_depletes() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        b.set_rice_at(Coord::new(9, 9), 3.0);

        let harvested = side.collect_rice(&mut b);
        assert_eq!(harvested, 3.0);
        assert_eq!(side.rice(), 23.0);
        assert_eq!(b.rice_at(Coord::new(9, 9)), Some(2.0));
    }

    #[test]
    fn harvest_can_leave_negative_rice_level() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        b.set_rice_at(Coord::new(9, 9), 0.0);

        side.collect_rice(&mut b);
        assert_eq!(b.rice_at(Coord::new(9, 9)), Some(-1.0));

        // A negative level is harvested as-is, reducing the stockpile.
        side.collect_rice(&mut b);
        assert_eq!(side.rice(), 19.0);
        assert_eq!(b.rice_at(Coord::new(9, 9)), Some(-2.0));
    }

    #[test]
    fn eating_uses_three_rice_per_unit() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_rice(100.0);
        let eaten = side.eat_rice(10);
        assert_eq!(eaten, 10.0 * RICE_EATEN_PER_UNIT);
        assert_eq!(side.rice(), 70.0);
        // The rules text would have charged 20.
        assert_ne!(eaten, 10.0 * RULES_TEXT_RICE_PER_UNIT);
    }

    #[test]
    fn eating_never_goes_below_zero() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_rice(5.0);
        assert_eq!(side.eat_rice(15), 5.0);
        assert_eq!(side.rice(), 0.0);
    }

    #[test]
    fn reproduction_gated_on_rice() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.set_houses(2);

        side.set_rice(0.0);
        assert_eq!(side.reproduce(), 0);
        assert_eq!(side.units(), 15);

        side.set_rice(0.5);
        assert_eq!(side.reproduce(), 2);
        assert_eq!(side.units(), 17);
        // Reproduction itself costs no rice.
        assert_eq!(side.rice(), 0.5);
    }

    #[test]
    fn history_records_each_snapshot_in_order() {
        let mut b = board(10, 0);
        let mut side = human_at_corner(&mut b);
        side.save_resource_snapshot();
        side.collect_water(15.0);
        side.save_resource_snapshot();

        assert_eq!(side.history().len(), 2);
        assert_eq!(side.series(ResourceKind::Water), vec![10.0, 25.0]);
        assert_eq!(side.series(ResourceKind::Units), vec![15.0, 15.0]);
        assert_eq!(side.series(ResourceKind::Houses), vec![0.0, 0.0]);
    }

    #[test]
    fn resource_names_are_stable() {
        let names: Vec<_> = ResourceKind::all().iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["water", "rice", "units", "houses"]);
    }
}
