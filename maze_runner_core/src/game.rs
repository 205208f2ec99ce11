use log::{info, warn};

use crate::{
    agent::Agent,
    config::{ConfigError, GameConfig},
    input::{InputListener, Key},
    map::{Maze, MazeError},
    pickup::PickupSet,
};

/// Errors raised while setting up a [`Game`].
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid maze: {0}")]
    Maze(#[from] MazeError),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("Maze cell size {maze} does not match configured cell size {config}")]
    CellSizeMismatch { maze: f64, config: f64 },
}

/// Represents the outcome of one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// Every pickup has been collected.
    Cleared,
}

/// Drives the simulation: owns the maze, the agent and the pickups, and
/// gates key input behind the controls switch.
#[derive(Debug, Clone)]
pub struct Game {
    maze: Maze,
    agent: Agent,
    pickups: PickupSet,
    config: GameConfig,
    controls_enabled: bool,
    ticks: u64,
    cleared_reported: bool,
}

impl Game {
    /// Places the agent on the maze spawn and a pickup on every other open cell.
    pub fn new(maze: Maze, config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        if maze.cell_size() != config.cell_size {
            return Err(GameError::CellSizeMismatch {
                maze: maze.cell_size(),
                config: config.cell_size,
            });
        }

        let spawn = maze.spawn();
        let agent = Agent::new(&maze, spawn, &config)?;
        let pickups = PickupSet::new(&maze, spawn, config.dot_points)?;
        if pickups.is_empty() {
            warn!("Maze has no open cell besides the spawn; nothing to collect");
        }
        info!(
            "New game on {}x{} maze with {} pickups",
            maze.width(),
            maze.height(),
            pickups.len()
        );

        Ok(Game {
            maze,
            agent,
            pickups,
            config,
            controls_enabled: true,
            ticks: 0,
            cleared_reported: false,
        })
    }

    /// Builds a game on the built-in classic maze.
    pub fn classic(config: GameConfig) -> Result<Self, GameError> {
        let maze = Maze::classic(config.cell_size)?;
        Self::new(maze, config)
    }

    /// Rebuilds agent and pickups from the spawn, keeping the maze and config.
    pub fn restart(&mut self) -> Result<(), GameError> {
        let enabled = self.controls_enabled;
        *self = Self::new(self.maze.clone(), self.config.clone())?;
        self.controls_enabled = enabled;
        Ok(())
    }

    /// Runs one tick.
    pub fn tick(&mut self) -> TickOutcome {
        let screen_width = self.maze.screen_width();
        self.agent.update(&self.maze, &mut self.pickups, screen_width);
        self.ticks += 1;

        if self.pickups.all_collected() {
            if !self.cleared_reported {
                info!(
                    "All pickups cleared after {} ticks, score {}",
                    self.ticks,
                    self.agent.score()
                );
                self.cleared_reported = true;
            }
            TickOutcome::Cleared
        } else {
            TickOutcome::Running
        }
    }

    pub fn enable_controls(&mut self) {
        self.controls_enabled = true;
    }

    pub fn disable_controls(&mut self) {
        self.controls_enabled = false;
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn pickups(&self) -> &PickupSet {
        &self.pickups
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl InputListener for Game {
    fn on_key_down(&mut self, key: Key) {
        if self.controls_enabled {
            self.agent.on_key_down(key);
        }
    }

    fn on_key_up(&mut self, key: Key) {
        if self.controls_enabled {
            self.agent.on_key_up(key);
        }
    }
}
