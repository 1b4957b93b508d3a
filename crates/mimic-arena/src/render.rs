use image::{Rgb, RgbImage};
use mimic_pipeline::Direction;

use crate::{Arena, SHIP_SIZE, TILE_SIZE, Tile};

pub mod palette {
    use image::Rgb;

    pub const SKY: Rgb<u8> = Rgb([24, 32, 64]);
    pub const GROUND: Rgb<u8> = Rgb([120, 84, 48]);
    pub const GROUND_EDGE: Rgb<u8> = Rgb([84, 56, 32]);
    pub const COIN: Rgb<u8> = Rgb([250, 204, 40]);
    pub const SHIP: Rgb<u8> = Rgb([220, 220, 230]);
    pub const SHIP_NOSE: Rgb<u8> = Rgb([230, 60, 60]);
}

/// Width of the colored nose strip on the side the ship is heading.
const NOSE_PX: i64 = 3;

/// Squared radius of a coin, relative to the tile center.
const COIN_RADIUS_SQ: i64 = 25;

impl Arena {
    /// Renders the viewport at the current camera position.
    #[must_use]
    pub fn render(&self) -> RgbImage {
        let (width, height) = self.viewport();
        let (camera_x, camera_y) = self.camera();
        RgbImage::from_fn(width, height, |px, py| {
            self.world_pixel(camera_x + i64::from(px), camera_y + i64::from(py))
        })
    }

    fn world_pixel(&self, x: i64, y: i64) -> Rgb<u8> {
        let ship = self.ship();
        if ship.contains(x, y) {
            let (dx, dy) = (x - ship.x, y - ship.y);
            let far = i64::from(SHIP_SIZE) - NOSE_PX;
            let nose = match ship.heading {
                Direction::Up => dy < NOSE_PX,
                Direction::Right => dx >= far,
                Direction::Down => dy >= far,
                Direction::Left => dx < NOSE_PX,
            };
            return if nose { palette::SHIP_NOSE } else { palette::SHIP };
        }

        let tile = i64::from(TILE_SIZE);
        let (dx, dy) = (x.rem_euclid(tile), y.rem_euclid(tile));
        match self.map().get(x.div_euclid(tile), y.div_euclid(tile)) {
            Tile::Empty => palette::SKY,
            Tile::Ground if dx == 0 || dy == 0 => palette::GROUND_EDGE,
            Tile::Ground => palette::GROUND,
            Tile::Coin => {
                // centered on the pixel boundary in the middle of the tile
                let (cx, cy) = (2 * dx + 1 - tile, 2 * dy + 1 - tile);
                if cx * cx + cy * cy <= 4 * COIN_RADIUS_SQ {
                    palette::COIN
                } else {
                    palette::SKY
                }
            }
        }
    }
}
