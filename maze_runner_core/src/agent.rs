use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Cell, Direction, WorldPos,
    collision::{can_move_in_direction, default_radius},
    config::GameConfig,
    input::{InputListener, Key, KeyState},
    map::{Maze, MazeError},
    pickup::PickupSet,
};

/// A buffered turn may commit while the agent is closer than
/// `speed * TURN_THRESHOLD_FACTOR` to the cell center on the perpendicular axis.
pub const TURN_THRESHOLD_FACTOR: f64 = 4.0;

/// How far ahead, in cells, the wall search looks when resolving a blocked move.
pub const WALL_SCAN_CELLS: f64 = 2.0;

/// The player-controlled agent and its per-tick motion state machine.
///
/// `desired_direction` is the latest requested turn. It stays buffered until a
/// new request replaces it, and is retried every tick. `current_direction` is
/// the direction actually executed and only ever changes through a successful
/// turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    position: WorldPos,
    desired_direction: Direction,
    current_direction: Direction,
    score: u32,
    speed: f64,
    radius: f64,
    keys: KeyState,
}

impl Agent {
    /// Creates an agent resting at the center of `spawn`.
    pub fn new(maze: &Maze, spawn: Cell, config: &GameConfig) -> Result<Self, MazeError> {
        if !maze.is_open_cell(spawn.col, spawn.row) {
            return Err(MazeError::SpawnBlocked { cell: spawn });
        }
        Ok(Agent {
            position: maze.cell_center(spawn),
            desired_direction: Direction::None,
            current_direction: Direction::None,
            score: 0,
            speed: config.player_speed,
            radius: default_radius(maze.cell_size()),
            keys: KeyState::default(),
        })
    }

    pub fn position(&self) -> WorldPos {
        self.position
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn desired_direction(&self) -> Direction {
        self.desired_direction
    }

    pub fn current_direction(&self) -> Direction {
        self.current_direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.is_pressed(key)
    }

    pub fn set_desired_direction(&mut self, direction: Direction) {
        self.desired_direction = direction;
    }

    /// Advances the agent by one tick: turn attempt, forward motion,
    /// wraparound, then pickup collection.
    pub fn update(&mut self, maze: &Maze, pickups: &mut PickupSet, screen_width: f64) {
        self.try_turn(maze);
        self.advance(maze);
        self.wrap(screen_width);
        let earned = pickups.collect_near(self.position, maze.cell_size() / 2.0);
        self.score = self.score.saturating_add(earned);
    }

    /// Commits the buffered turn if the agent is close enough to its cell
    /// center and the corridor in the desired direction is open.
    fn try_turn(&mut self, maze: &Maze) {
        let desired = self.desired_direction;
        if desired.is_none() {
            return;
        }

        let center = maze.cell_center(maze.world_to_cell(self.position));
        let threshold = self.speed * TURN_THRESHOLD_FACTOR;

        let aligned = if desired.is_horizontal() {
            if (self.position.y - center.y).abs() >= threshold {
                return;
            }
            WorldPos::new(self.position.x, center.y)
        } else {
            if (self.position.x - center.x).abs() >= threshold {
                return;
            }
            WorldPos::new(center.x, self.position.y)
        };

        let candidate = aligned.step(desired, self.speed);
        if can_move_in_direction(maze, candidate, desired, self.radius) {
            if self.current_direction != desired {
                debug!(
                    "Turn {:?} -> {:?} at {:?}",
                    self.current_direction, desired, aligned
                );
            }
            self.position = aligned;
            self.current_direction = desired;
        }
    }

    /// Moves one step along the current direction, stopping flush against the
    /// nearest wall ahead.
    fn advance(&mut self, maze: &Maze) {
        let direction = self.current_direction;
        if direction.is_none() {
            return;
        }

        let candidate = self.position.step(direction, self.speed);
        let contact = self.wall_contact(maze, direction);

        if can_move_in_direction(maze, candidate, direction, self.radius) {
            self.position = match contact {
                Some(limit) => clamp_along(candidate, direction, limit),
                None => candidate,
            };
        } else if let Some(limit) = contact {
            let pressed = set_along(self.position, direction, limit);
            if pressed != self.position {
                debug!("Blocked moving {:?}, pressed against wall at {:?}", direction, pressed);
            }
            self.position = pressed;
        }
    }

    /// Scans cell boundaries ahead along `direction` for the first wall within
    /// the look-ahead window. Returns the along-axis coordinate at which the
    /// hitbox rests against that wall, or `None` when no wall is in range.
    fn wall_contact(&self, maze: &Maze, direction: Direction) -> Option<f64> {
        let cell_size = maze.cell_size();
        let WorldPos { x, y } = self.position;
        let horizontal = direction.is_horizontal();
        let along = if horizontal { x } else { y };
        let open_at = |boundary: f64| {
            if horizontal {
                maze.can_occupy(boundary, y)
            } else {
                maze.can_occupy(x, boundary)
            }
        };

        let cell_index = (along / cell_size).floor();
        let reach = WALL_SCAN_CELLS * cell_size;
        let gap = self.radius + 1.0;

        if direction.dx() + direction.dy() > 0.0 {
            let mut boundary = (cell_index + 1.0) * cell_size;
            loop {
                if !open_at(boundary) {
                    return Some(boundary - gap);
                }
                if boundary >= along + reach {
                    return None;
                }
                boundary += cell_size;
            }
        } else {
            let mut boundary = cell_index * cell_size;
            loop {
                if !open_at(boundary) {
                    return Some(boundary + cell_size + gap);
                }
                if boundary <= along - reach {
                    return None;
                }
                boundary -= cell_size;
            }
        }
    }

    fn wrap(&mut self, screen_width: f64) {
        if self.position.x < 0.0 {
            self.position.x = screen_width;
        } else if self.position.x > screen_width {
            self.position.x = 0.0;
        }
    }
}

impl InputListener for Agent {
    fn on_key_down(&mut self, key: Key) {
        self.keys.press(key);
        self.set_desired_direction(key.direction());
    }

    fn on_key_up(&mut self, key: Key) {
        self.keys.release(key);
    }
}

/// Replaces the coordinate on `direction`'s axis.
fn set_along(pos: WorldPos, direction: Direction, value: f64) -> WorldPos {
    if direction.is_horizontal() {
        WorldPos::new(value, pos.y)
    } else {
        WorldPos::new(pos.x, value)
    }
}

/// Keeps `pos` from passing `limit` in the direction of travel.
fn clamp_along(pos: WorldPos, direction: Direction, limit: f64) -> WorldPos {
    let along = if direction.is_horizontal() { pos.x } else { pos.y };
    let clamped = if direction.dx() + direction.dy() > 0.0 {
        along.min(limit)
    } else {
        along.max(limit)
    };
    set_along(pos, direction, clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    // Four-way junction at (3, 3) in a plus-shaped corridor.
    const JUNCTION: &str = "
#######
###.###
###.###
#..P..#
###.###
###.###
#######
";

    fn setup(map: &str) -> (Maze, Agent, PickupSet) {
        setup_with(map, &GameConfig::default())
    }

    fn setup_with(map: &str, config: &GameConfig) -> (Maze, Agent, PickupSet) {
        let maze = Maze::parse(map, config.cell_size).unwrap();
        let agent = Agent::new(&maze, maze.spawn(), config).unwrap();
        let pickups = PickupSet::new(&maze, maze.spawn(), config.dot_points).unwrap();
        (maze, agent, pickups)
    }

    fn run(agent: &mut Agent, maze: &Maze, pickups: &mut PickupSet, ticks: usize) {
        for _ in 0..ticks {
            agent.update(maze, pickups, maze.screen_width());
        }
    }

    #[test]
    fn spawns_at_cell_center_at_rest() {
        let (maze, agent, _) = setup(JUNCTION);
        assert_eq!(agent.position(), maze.cell_center(Cell::new(3, 3)));
        assert_eq!(agent.current_direction(), Direction::None);
        assert_eq!(agent.radius(), 7.0);
    }

    #[test]
    fn rejects_spawn_on_wall() {
        let config = GameConfig::default();
        let maze = Maze::parse(JUNCTION, config.cell_size).unwrap();
        let err = Agent::new(&maze, Cell::new(0, 0), &config).unwrap_err();
        assert_eq!(err, MazeError::SpawnBlocked { cell: Cell::new(0, 0) });
    }

    #[test]
    fn idle_agent_stays_put() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        let start = agent.position();
        run(&mut agent, &maze, &mut pickups, 10);
        assert_eq!(agent.position(), start);
    }

    #[test]
    fn turn_commits_and_desire_stays_buffered() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Up);
        run(&mut agent, &maze, &mut pickups, 1);
        assert_eq!(agent.current_direction(), Direction::Up);
        assert_eq!(agent.desired_direction(), Direction::Up);
        assert!((agent.position().y - (56.0 - 0.7)).abs() < EPSILON);
    }

    #[test]
    fn blocked_turn_keeps_current_direction() {
        // At this speed one step from a center reaches into the next cell.
        let config = GameConfig {
            player_speed: 1.5,
            ..GameConfig::default()
        };
        let (maze, mut agent, mut pickups) = setup_with(JUNCTION, &config);
        agent.set_desired_direction(Direction::Left);
        run(&mut agent, &maze, &mut pickups, 8);
        // In the horizontal arm, where up is a wall.
        agent.set_desired_direction(Direction::Up);
        run(&mut agent, &maze, &mut pickups, 20);
        assert_eq!(agent.current_direction(), Direction::Left);
        assert_eq!(agent.desired_direction(), Direction::Up);
        assert!((agent.position().x - 24.0).abs() < EPSILON);
        assert!((agent.position().y - 56.0).abs() < EPSILON);
    }

    #[test]
    fn pressing_into_a_side_wall_parks_at_the_cell_center() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Left);
        run(&mut agent, &maze, &mut pickups, 10);
        agent.set_desired_direction(Direction::Up);
        run(&mut agent, &maze, &mut pickups, 30);
        assert_eq!(agent.current_direction(), Direction::Up);
        assert!((agent.position().x - 40.0).abs() < EPSILON);
        assert!((agent.position().y - 56.0).abs() < EPSILON);
    }

    #[test]
    fn turn_snaps_perpendicular_axis_to_center() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Right);
        run(&mut agent, &maze, &mut pickups, 2);
        // 1.4 past center, inside the 2.8 threshold.
        agent.set_desired_direction(Direction::Down);
        run(&mut agent, &maze, &mut pickups, 1);
        assert_eq!(agent.current_direction(), Direction::Down);
        assert!((agent.position().x - 56.0).abs() < EPSILON);
        assert!((agent.position().y - 56.7).abs() < EPSILON);
    }

    #[test]
    fn turn_outside_threshold_is_deferred() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Right);
        run(&mut agent, &maze, &mut pickups, 5);
        // 3.5 past center; the buffered turn never fires in the right arm.
        agent.set_desired_direction(Direction::Down);
        run(&mut agent, &maze, &mut pickups, 1);
        assert_eq!(agent.current_direction(), Direction::Right);
    }

    #[test]
    fn reversal_is_immediate() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Right);
        run(&mut agent, &maze, &mut pickups, 6);
        let x = agent.position().x;
        agent.set_desired_direction(Direction::Left);
        run(&mut agent, &maze, &mut pickups, 1);
        assert_eq!(agent.current_direction(), Direction::Left);
        assert!((agent.position().x - (x - 0.7)).abs() < EPSILON);
    }

    #[test]
    fn stops_flush_with_dead_end() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Right);
        run(&mut agent, &maze, &mut pickups, 100);
        // Wall column 6 starts at x = 96.
        assert!((agent.position().x - (96.0 - 7.0 - 1.0)).abs() < EPSILON);
        let resting = agent.position();
        run(&mut agent, &maze, &mut pickups, 5);
        assert_eq!(agent.position(), resting);
        assert_eq!(agent.current_direction(), Direction::Right);
    }

    #[test]
    fn stops_flush_in_every_direction() {
        for (direction, expected) in [
            (Direction::Left, WorldPos::new(16.0 + 8.0, 56.0)),
            (Direction::Up, WorldPos::new(56.0, 16.0 + 8.0)),
            (Direction::Down, WorldPos::new(56.0, 96.0 - 8.0)),
        ] {
            let (maze, mut agent, mut pickups) = setup(JUNCTION);
            agent.set_desired_direction(direction);
            run(&mut agent, &maze, &mut pickups, 100);
            let pos = agent.position();
            assert!(
                (pos.x - expected.x).abs() < EPSILON && (pos.y - expected.y).abs() < EPSILON,
                "{direction:?}: expected {expected:?}, got {pos:?}"
            );
        }
    }

    #[test]
    fn key_events_drive_desire() {
        let (_, mut agent, _) = setup(JUNCTION);
        agent.on_key_down(Key::ArrowDown);
        assert_eq!(agent.desired_direction(), Direction::Down);
        assert!(agent.is_pressed(Key::ArrowDown));
        agent.on_key_up(Key::ArrowDown);
        assert!(!agent.is_pressed(Key::ArrowDown));
        assert_eq!(agent.desired_direction(), Direction::Down);
    }

    #[test]
    fn collects_pickups_along_the_way() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.set_desired_direction(Direction::Left);
        run(&mut agent, &maze, &mut pickups, 100);
        assert_eq!(agent.score(), 20);
        assert_eq!(pickups.remaining(), 6);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let (maze, mut agent, mut pickups) = setup(JUNCTION);
        agent.score = u32::MAX - 5;
        agent.set_desired_direction(Direction::Left);
        run(&mut agent, &maze, &mut pickups, 30);
        assert_eq!(agent.score(), u32::MAX);
        assert_eq!(pickups.remaining(), 7);
    }

    #[test]
    fn clamping_never_passes_the_limit() {
        let pos = WorldPos::new(73.0, 10.0);
        assert_eq!(clamp_along(pos, Direction::Right, 72.0), WorldPos::new(72.0, 10.0));
        assert_eq!(clamp_along(pos, Direction::Left, 72.0), pos);
        assert_eq!(clamp_along(pos, Direction::Up, 12.0), WorldPos::new(73.0, 12.0));
    }
}
