use mimic_pipeline::Direction;

use crate::{MapParseError, TILE_SIZE, TileMap};

/// Distance the ship moves per key press, in pixels.
pub const STEP_PX: i64 = 5;

/// Edge length of the (square) ship, in pixels.
pub const SHIP_SIZE: u32 = 12;

/// Default viewport size, in pixels.
pub const VIEWPORT: (u32, u32) = (320, 240);

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("ship blocked moving {direction}")]
pub struct ShipBlockedError {
    pub direction: Direction,
}

/// The player-controlled ship, positioned by its top-left corner in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ship {
    pub x: i64,
    pub y: i64,
    pub heading: Direction,
}

impl Ship {
    #[must_use]
    pub fn center(&self) -> (i64, i64) {
        let half = i64::from(SHIP_SIZE / 2);
        (self.x + half, self.y + half)
    }

    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let size = i64::from(SHIP_SIZE);
        (self.x..self.x + size).contains(&x) && (self.y..self.y + size).contains(&y)
    }

    /// Tiles overlapped by the ship when placed at `(x, y)`.
    fn covered_tiles(x: i64, y: i64) -> impl Iterator<Item = (i64, i64)> {
        let tile = i64::from(TILE_SIZE);
        let last = i64::from(SHIP_SIZE) - 1;
        let columns = x.div_euclid(tile)..=(x + last).div_euclid(tile);
        let rows = y.div_euclid(tile)..=(y + last).div_euclid(tile);
        rows.flat_map(move |row| columns.clone().map(move |column| (column, row)))
    }
}

/// A top-down world with a ship, solid ground and collectable coins.
#[derive(Debug, Clone)]
pub struct Arena {
    map: TileMap,
    ship: Ship,
    coins_collected: usize,
    viewport: (u32, u32),
}

impl Arena {
    /// Creates an arena on `map` with the ship centered on the spawn tile.
    #[must_use]
    pub fn new(map: TileMap, viewport: (u32, u32)) -> Self {
        let (column, row) = map.spawn();
        let margin = i64::from((TILE_SIZE - SHIP_SIZE) / 2);
        let tile = i64::from(TILE_SIZE);
        let to_px = |tiles: usize| i64::try_from(tiles).unwrap_or(i64::MAX / tile) * tile;
        let ship = Ship {
            x: to_px(column) + margin,
            y: to_px(row) + margin,
            heading: Direction::Right,
        };
        Self {
            map,
            ship,
            coins_collected: 0,
            viewport,
        }
    }

    /// Arena on the built-in map with the default viewport.
    pub fn builtin() -> Result<Self, MapParseError> {
        Ok(Self::new(TileMap::builtin()?, VIEWPORT))
    }

    #[must_use]
    pub fn map(&self) -> &TileMap {
        &self.map
    }

    #[must_use]
    pub fn ship(&self) -> Ship {
        self.ship
    }

    #[must_use]
    pub fn coins_collected(&self) -> usize {
        self.coins_collected
    }

    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Moves the ship [`STEP_PX`] pixels and collects any coins it now
    /// overlaps, returning how many.
    ///
    /// The ship turns to face `direction` even when the move is blocked.
    pub fn try_move(&mut self, direction: Direction) -> Result<usize, ShipBlockedError> {
        self.ship.heading = direction;
        let (dx, dy) = match direction {
            Direction::Up => (0, -STEP_PX),
            Direction::Right => (STEP_PX, 0),
            Direction::Down => (0, STEP_PX),
            Direction::Left => (-STEP_PX, 0),
        };
        let (x, y) = (self.ship.x + dx, self.ship.y + dy);
        if Ship::covered_tiles(x, y).any(|(column, row)| self.map.get(column, row).is_solid()) {
            return Err(ShipBlockedError { direction });
        }
        self.ship.x = x;
        self.ship.y = y;

        let collected = Ship::covered_tiles(x, y)
            .filter(|&(column, row)| self.map.take_coin(column, row))
            .count();
        self.coins_collected += collected;
        Ok(collected)
    }

    /// Top-left corner of the viewport in world pixels.
    ///
    /// The camera follows the ship and stops at the map edges.
    #[must_use]
    pub fn camera(&self) -> (i64, i64) {
        let (center_x, center_y) = self.ship.center();
        let follow = |center: i64, view: u32, world: u32| {
            let max = (i64::from(world) - i64::from(view)).max(0);
            (center - i64::from(view / 2)).clamp(0, max)
        };
        (
            follow(center_x, self.viewport.0, self.map.width_px()),
            follow(center_y, self.viewport.1, self.map.height_px()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(map: &str) -> Arena {
        Arena::new(map.parse().unwrap(), (32, 32))
    }

    #[test]
    fn test_spawn_centers_ship_in_tile() {
        let arena = arena("###\n#S#\n###\n");
        assert_eq!(arena.ship().x, 18);
        assert_eq!(arena.ship().y, 18);
    }

    #[test]
    fn test_moves_five_pixels() {
        let mut arena = arena("#####\n#S..#\n#...#\n#####\n");
        arena.try_move(Direction::Right).unwrap();
        assert_eq!((arena.ship().x, arena.ship().y), (23, 18));
        arena.try_move(Direction::Down).unwrap();
        assert_eq!((arena.ship().x, arena.ship().y), (23, 23));
        assert_eq!(arena.ship().heading, Direction::Down);
    }

    #[test]
    fn test_ground_blocks_movement() {
        let mut arena = arena("###\n#S#\n###\n");
        // 2px margin to the wall, a 5px step would overlap it
        let err = arena.try_move(Direction::Left).unwrap_err();
        assert_eq!(err, ShipBlockedError { direction: Direction::Left });
        assert_eq!((arena.ship().x, arena.ship().y), (18, 18));
        assert_eq!(arena.ship().heading, Direction::Left);
    }

    #[test]
    fn test_collects_coins_on_overlap() {
        let mut arena = arena("#####\n#So.#\n#####\n");
        let total: usize = (0..4)
            .map(|_| arena.try_move(Direction::Right).unwrap())
            .sum();
        assert_eq!(total, 1);
        assert_eq!(arena.coins_collected(), 1);
        assert_eq!(arena.map().coin_count(), 0);
    }

    #[test]
    fn test_camera_follows_and_clamps() {
        let map = "##########\n#S.......#\n#........#\n##########\n";
        let mut arena = arena(map);
        // the ship center is 24px from the corner, less than the map allows
        assert_eq!(arena.camera(), (8, 8));
        let _ = arena.try_move(Direction::Up);
        assert_eq!(arena.camera(), (8, 8));

        for _ in 0..20 {
            let _ = arena.try_move(Direction::Right);
        }
        let (x, y) = arena.camera();
        let (center_x, _) = arena.ship().center();
        assert_eq!(x, (center_x - 16).min(160 - 32));
        assert_eq!(y, 8);
    }
}
