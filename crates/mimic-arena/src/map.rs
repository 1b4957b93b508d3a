use std::str::FromStr;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 16;

/// Built-in level: a walled cave with ledges and scattered coins.
pub const DEFAULT_MAP: &str = "\
########################################
#......................................#
#..o....o.....####.........o...........#
#.............#..#..................o..#
#....######...#..#.....o.......######..#
#.............#..#.....................#
#..S.......o.....#........####.........#
#.....o..........#..o.....#............#
#........####....######...#....o.......#
#...........#.............#............#
#.....o.....#......o......#######......#
#...........#..........................#
#...######..#...o.............o...o....#
#...........#.........#####............#
#..o.....o.......o........#.......###..#
#.........................#............#
#######....#########......#....o.......#
#..........................o...........#
#....o.........o........o........o.....#
########################################
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum Tile {
    #[default]
    Empty,
    Ground,
    Coin,
}

impl Tile {
    #[must_use]
    pub fn is_solid(self) -> bool {
        self.is_ground()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MapParseError {
    #[display("map is empty")]
    Empty,
    #[display("row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("unknown tile {symbol:?} at row {row}, column {column}")]
    UnknownTile {
        symbol: char,
        row: usize,
        column: usize,
    },
    #[display("map has no spawn point")]
    MissingSpawn,
    #[display("map has more than one spawn point")]
    DuplicateSpawn,
}

/// Grid of tiles parsed from ASCII art.
///
/// | symbol | tile |
/// |---|---|
/// | `#` | ground |
/// | `o` | coin |
/// | `.` | empty |
/// | `S` | empty, ship spawn |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    spawn: (usize, usize),
}

impl FromStr for TileMap {
    type Err = MapParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(MapParseError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut spawn = None;
        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(MapParseError::RaggedRow {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (column, symbol) in line.chars().enumerate() {
                let tile = match symbol {
                    '#' => Tile::Ground,
                    'o' => Tile::Coin,
                    '.' => Tile::Empty,
                    'S' => {
                        if spawn.replace((column, row)).is_some() {
                            return Err(MapParseError::DuplicateSpawn);
                        }
                        Tile::Empty
                    }
                    _ => {
                        return Err(MapParseError::UnknownTile {
                            symbol,
                            row,
                            column,
                        });
                    }
                };
                tiles.push(tile);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
            spawn: spawn.ok_or(MapParseError::MissingSpawn)?,
        })
    }
}

impl TileMap {
    /// Parses [`DEFAULT_MAP`].
    pub fn builtin() -> Result<Self, MapParseError> {
        DEFAULT_MAP.parse()
    }

    /// Width in tiles.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width_px(&self) -> u32 {
        tiles_to_px(self.width)
    }

    #[must_use]
    pub fn height_px(&self) -> u32 {
        tiles_to_px(self.height)
    }

    /// Spawn tile as `(column, row)`.
    #[must_use]
    pub fn spawn(&self) -> (usize, usize) {
        self.spawn
    }

    /// Tile at `(column, row)`; everything outside the map is ground.
    #[must_use]
    pub fn get(&self, column: i64, row: i64) -> Tile {
        self.index(column, row)
            .map_or(Tile::Ground, |index| self.tiles[index])
    }

    /// Replaces a coin with an empty tile; returns whether there was one.
    pub fn take_coin(&mut self, column: i64, row: i64) -> bool {
        match self.index(column, row) {
            Some(index) if self.tiles[index].is_coin() => {
                self.tiles[index] = Tile::Empty;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn coin_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_coin()).count()
    }

    fn index(&self, column: i64, row: i64) -> Option<usize> {
        let column = usize::try_from(column).ok()?;
        let row = usize::try_from(row).ok()?;
        (column < self.width && row < self.height).then(|| row * self.width + column)
    }
}

fn tiles_to_px(tiles: usize) -> u32 {
    u32::try_from(tiles)
        .unwrap_or(u32::MAX)
        .saturating_mul(TILE_SIZE)
}
