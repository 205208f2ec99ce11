use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    Cell, WorldPos,
    collision::within_radius,
    map::{Maze, MazeError},
};

/// A collectible point item fixed at the center of an open cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    cell: Cell,
    position: WorldPos,
    points: u32,
    collected: bool,
}

impl Pickup {
    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn position(&self) -> WorldPos {
        self.position
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Marks the pickup collected. Returns the points earned, zero if it was
    /// already collected.
    fn collect(&mut self) -> u32 {
        if self.collected {
            return 0;
        }
        self.collected = true;
        self.points
    }
}

/// All pickups of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSet {
    pickups: Vec<Pickup>,
    remaining: usize,
}

impl PickupSet {
    /// Places one pickup worth `points` on every open cell except `excluded`.
    ///
    /// `excluded` is the agent's spawn and must itself be an open cell.
    pub fn new(maze: &Maze, excluded: Cell, points: u32) -> Result<Self, MazeError> {
        if !maze.is_open_cell(excluded.col, excluded.row) {
            return Err(MazeError::SpawnBlocked { cell: excluded });
        }
        let pickups: Vec<Pickup> = maze
            .open_cells()
            .filter(|cell| *cell != excluded)
            .map(|cell| Pickup {
                cell,
                position: maze.cell_center(cell),
                points,
                collected: false,
            })
            .collect();
        let remaining = pickups.len();
        Ok(PickupSet { pickups, remaining })
    }

    /// Collects every uncollected pickup whose center lies strictly within
    /// `radius` of `pos`. Returns the points earned this call.
    pub fn collect_near(&mut self, pos: WorldPos, radius: f64) -> u32 {
        let mut earned: u32 = 0;
        for pickup in self.pickups.iter_mut().filter(|p| !p.collected) {
            if within_radius(pos, pickup.position, radius) {
                earned = earned.saturating_add(pickup.collect());
                self.remaining -= 1;
                trace!("Collected pickup at {:?}", pickup.cell);
            }
        }
        earned
    }

    /// Pickups not collected yet, for rendering.
    pub fn uncollected(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter().filter(|p| !p.collected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pickup> {
        self.pickups.iter()
    }

    pub fn get(&self, cell: Cell) -> Option<&Pickup> {
        self.pickups.iter().find(|p| p.cell == cell)
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn all_collected(&self) -> bool {
        self.remaining == 0
    }
}
