//! Circular-hitbox collision probing against the occupancy grid.
//!
//! The hitbox is approximated by its center plus three probe points: the
//! leading edge in the direction of travel and two flank points pulled in to
//! `FLANK_FACTOR * radius`, which lets an agent hugging a wall slide past a
//! corner instead of catching on it.

use crate::{Direction, WorldPos, map::Maze};

/// Scale of the flank probes relative to the radius.
pub const FLANK_FACTOR: f64 = 0.7;

/// Hitbox radius for a given cell size: one unit under half a cell, so an agent
/// centered in a corridor never touches the corridor's own cell boundaries.
#[inline]
pub fn default_radius(cell_size: f64) -> f64 {
    cell_size / 2.0 - 1.0
}

/// Decides whether an agent of `radius` centered at `pos` and travelling in
/// `direction` may occupy that position.
pub fn can_move_in_direction(
    maze: &Maze,
    pos: WorldPos,
    direction: Direction,
    radius: f64,
) -> bool {
    probe_points(pos, direction, radius)
        .iter()
        .all(|p| maze.can_occupy(p.x, p.y))
}

/// The points tested for a probe, center first.
pub fn probe_points(pos: WorldPos, direction: Direction, radius: f64) -> Vec<WorldPos> {
    let WorldPos { x, y } = pos;
    let flank = radius * FLANK_FACTOR;
    let mut points = vec![pos];

    match direction {
        Direction::Left | Direction::Right => points.extend([
            WorldPos::new(x + direction.dx() * radius, y),
            WorldPos::new(x, y - flank),
            WorldPos::new(x, y + flank),
        ]),
        Direction::Up | Direction::Down => points.extend([
            WorldPos::new(x, y + direction.dy() * radius),
            WorldPos::new(x - flank, y),
            WorldPos::new(x + flank, y),
        ]),
        Direction::None => points.extend([
            WorldPos::new(x, y - radius),
            WorldPos::new(x, y + radius),
            WorldPos::new(x - radius, y),
            WorldPos::new(x + radius, y),
        ]),
    }

    points
}

/// Strict circle-point contact test on squared distances.
#[inline]
pub fn within_radius(a: WorldPos, b: WorldPos, radius: f64) -> bool {
    a.distance_sq(b) < radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    // Column 3 of row 1 is a wall; everything else in row 1 is open.
    fn corridor() -> Maze {
        Maze::parse("#######\n#.P#..#\n#######", 16.0).unwrap()
    }

    #[test]
    fn radius_is_one_under_half_a_cell() {
        assert_eq!(default_radius(16.0), 7.0);
    }

    #[test]
    fn leading_edge_blocks_before_center_does() {
        let maze = corridor();
        let radius = default_radius(16.0);
        // Wall starts at x = 48. Leading edge at 40.5 + 7 = 47.5 is still open.
        assert!(can_move_in_direction(&maze, WorldPos::new(40.5, 24.0), Direction::Right, radius));
        assert!(!can_move_in_direction(&maze, WorldPos::new(41.0, 24.0), Direction::Right, radius));
        // Moving away from the wall only the trailing side matters.
        assert!(can_move_in_direction(&maze, WorldPos::new(41.0, 24.0), Direction::Left, radius));
    }

    #[test]
    fn flank_probes_are_pulled_in() {
        let maze = corridor();
        let radius = default_radius(16.0);
        // Off-center by 2: flank reaches 24 + 2 + 4.9 = 30.9 < 32, still in row 1.
        assert!(can_move_in_direction(&maze, WorldPos::new(24.0, 26.0), Direction::Left, radius));
        // A full-radius probe from the same spot would reach row 2.
        assert!(!can_move_in_direction(&maze, WorldPos::new(24.0, 26.0), Direction::None, radius));
    }

    #[test]
    fn vertical_motion_into_wall_is_blocked() {
        let maze = corridor();
        let radius = default_radius(16.0);
        // Row 1 spans y in [16, 32); the leading edge sits `radius` ahead.
        assert!(can_move_in_direction(&maze, WorldPos::new(24.0, 23.5), Direction::Up, radius));
        assert!(!can_move_in_direction(&maze, WorldPos::new(24.0, 22.5), Direction::Up, radius));
        assert!(!can_move_in_direction(&maze, WorldPos::new(24.0, 25.5), Direction::Down, radius));
    }

    #[test]
    fn center_must_be_open() {
        let maze = corridor();
        assert!(!can_move_in_direction(&maze, WorldPos::new(56.0, 24.0), Direction::Right, 0.0));
    }

    #[test]
    fn probe_shape_depends_on_direction() {
        let pos = WorldPos::new(10.0, 10.0);
        assert_eq!(probe_points(pos, Direction::Up, 5.0).len(), 4);
        assert_eq!(probe_points(pos, Direction::None, 5.0).len(), 5);
        let up = probe_points(pos, Direction::Up, 5.0);
        assert_eq!(up[1], WorldPos::new(10.0, 5.0));
        assert!((up[2].x - 6.5).abs() < 1e-9);
    }

    #[test]
    fn contact_is_strict() {
        let a = WorldPos::new(0.0, 0.0);
        assert!(within_radius(a, WorldPos::new(7.9, 0.0), 8.0));
        assert!(!within_radius(a, WorldPos::new(8.0, 0.0), 8.0));
    }
}
