use log::info;
use serde::{Deserialize, Serialize};

use crate::{Cell, WorldPos};

/// The classic 28x31 arcade maze. Tunnel on row 14, spawn at (14, 23).
pub const CLASSIC_MAZE: &str = include_str!("../maps/classic.txt");

/// Represents errors raised while building a [`Maze`] from static map data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("Map data is empty")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Unknown map glyph '{glyph}' at ({col}, {row})")]
    UnknownGlyph { glyph: char, col: usize, row: usize },
    #[error("No spawn cell ('P') found in map")]
    MissingSpawn,
    #[error("Multiple spawn cells found: {first:?} and {second:?}")]
    MultipleSpawns { first: Cell, second: Cell },
    #[error("Tunnel mouths ('=') found on rows {first} and {second}; only one is allowed")]
    MultipleTunnelRows { first: usize, second: usize },
    #[error("Tunnel row {row} must be open at both edges")]
    TunnelClosed { row: usize },
    #[error("Spawn cell {cell:?} is not an open cell")]
    SpawnBlocked { cell: Cell },
}

/// Static type of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Open,
    Wall,
}

impl Tile {
    #[inline]
    pub fn is_open(self) -> bool {
        self == Tile::Open
    }
}

/// Immutable occupancy grid.
///
/// Tiles are stored row-major. One optional row is the tunnel row: on it,
/// positions left of column 0 or right of the last column are permitted so the
/// agent can leave the screen and wrap around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    cell_size: f64,
    tunnel_row: Option<usize>,
    spawn: Cell,
}

impl Maze {
    /// Builds a maze from a row-major tile list.
    ///
    /// Fails if `rows` is empty or ragged, if the spawn is not an open cell, or
    /// if the tunnel row is closed at either edge.
    pub fn from_rows(
        rows: Vec<Vec<Tile>>,
        spawn: Cell,
        tunnel_row: Option<usize>,
        cell_size: f64,
    ) -> Result<Self, MazeError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(MazeError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            tiles.extend(row);
        }

        let maze = Maze {
            width,
            height,
            tiles,
            cell_size,
            tunnel_row,
            spawn,
        };

        if !maze.is_open_cell(spawn.col, spawn.row) {
            return Err(MazeError::SpawnBlocked { cell: spawn });
        }
        if let Some(row) = tunnel_row {
            let row_i = row as i64;
            let last = width as i64 - 1;
            if row >= height || !maze.is_open_cell(0, row_i) || !maze.is_open_cell(last, row_i) {
                return Err(MazeError::TunnelClosed { row });
            }
        }

        Ok(maze)
    }

    /// Parses a text map.
    ///
    /// `#` is a wall; `.` and space are open; `P` marks the open spawn cell;
    /// `=` marks an open tunnel mouth and designates its row as the tunnel row.
    /// Blank lines before and after the map are ignored.
    pub fn parse(map: &str, cell_size: f64) -> Result<Self, MazeError> {
        let lines: Vec<&str> = map
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let start = lines.iter().position(|l| !l.trim().is_empty());
        let end = lines.iter().rposition(|l| !l.trim().is_empty());
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(MazeError::Empty),
        };

        let mut rows = Vec::with_capacity(end - start + 1);
        let mut spawn: Option<Cell> = None;
        let mut tunnel_row: Option<usize> = None;

        for (y, line) in lines[start..=end].iter().enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (x, glyph) in line.chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::Wall,
                    '.' | ' ' => Tile::Open,
                    'P' => {
                        let here = Cell::new(x as i64, y as i64);
                        if let Some(first) = spawn {
                            return Err(MazeError::MultipleSpawns {
                                first,
                                second: here,
                            });
                        }
                        spawn = Some(here);
                        Tile::Open
                    }
                    '=' => {
                        match tunnel_row {
                            Some(first) if first != y => {
                                return Err(MazeError::MultipleTunnelRows { first, second: y });
                            }
                            _ => tunnel_row = Some(y),
                        }
                        Tile::Open
                    }
                    unknown => {
                        return Err(MazeError::UnknownGlyph {
                            glyph: unknown,
                            col: x,
                            row: y,
                        });
                    }
                };
                row.push(tile);
            }
            rows.push(row);
        }

        let spawn = spawn.ok_or(MazeError::MissingSpawn)?;
        let maze = Self::from_rows(rows, spawn, tunnel_row, cell_size)?;
        info!(
            "Loaded {}x{} maze (spawn {:?}, tunnel row {:?})",
            maze.width, maze.height, maze.spawn, maze.tunnel_row
        );
        Ok(maze)
    }

    /// The built-in classic layout.
    pub fn classic(cell_size: f64) -> Result<Self, MazeError> {
        Self::parse(CLASSIC_MAZE, cell_size)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn tunnel_row(&self) -> Option<usize> {
        self.tunnel_row
    }

    pub fn spawn(&self) -> Cell {
        self.spawn
    }

    /// Width of the playfield in world units; the wraparound bound.
    pub fn screen_width(&self) -> f64 {
        self.width as f64 * self.cell_size
    }

    pub fn screen_height(&self) -> f64 {
        self.height as f64 * self.cell_size
    }

    /// Returns the tile at the given cell, or `None` outside the grid.
    pub fn tile(&self, col: i64, row: i64) -> Option<Tile> {
        let x = usize::try_from(col).ok()?;
        let y = usize::try_from(row).ok()?;
        if x < self.width && y < self.height {
            self.tiles.get(y * self.width + x).copied()
        } else {
            None
        }
    }

    /// True iff the cell lies inside the grid and is not a wall.
    #[inline]
    pub fn is_open_cell(&self, col: i64, row: i64) -> bool {
        self.tile(col, row).is_some_and(Tile::is_open)
    }

    /// Whether a single world-space point may be occupied.
    pub fn can_occupy(&self, x: f64, y: f64) -> bool {
        let col = (x / self.cell_size).floor() as i64;

        if let Some(row) = self.tunnel_row {
            let tunnel_center = row as f64 * self.cell_size + self.cell_size / 2.0;
            let off_grid = col < 0 || col >= self.width as i64;
            if off_grid && (y - tunnel_center).abs() <= self.cell_size / 2.0 {
                return true;
            }
        }

        let row = (y / self.cell_size).floor() as i64;
        self.is_open_cell(col, row)
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        Cell {
            col: (pos.x / self.cell_size).floor() as i64,
            row: (pos.y / self.cell_size).floor() as i64,
        }
    }

    pub fn cell_center(&self, cell: Cell) -> WorldPos {
        let half = self.cell_size / 2.0;
        WorldPos {
            x: cell.col as f64 * self.cell_size + half,
            y: cell.row as f64 * self.cell_size + half,
        }
    }

    /// Iterates over every open cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_open())
            .map(move |(index, _)| {
                Cell::new((index % self.width) as i64, (index / self.width) as i64)
            })
    }
}
