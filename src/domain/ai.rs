/// Hound pursuit: greedy, local, reactive.
///
/// A hound eases toward its own movement target and only decides at
/// lattice alignment. Decision priority:
///   1. Airborne (no support, no ladder) → one row straight down. Hounds
///      do not share the player's gravity integrator; their fall is a
///      forced step per alignment.
///   2. On a ladder with the player on another row → one row toward the
///      player, if that cell is ladder or occupiable.
///   3. Player on another column → one column toward the player, if
///      occupiable.
///   4. Otherwise hold the cell. No wandering, so a cornered hound stays
///      put instead of oscillating.

use super::entity::{Actor, Facing};
use super::grid::Grid;

/// Hounds get faster every ten levels.
pub fn scaled_speed(base: f32, growth: f32, level: u32) -> f32 {
    base * growth.powi((level.saturating_sub(1) / 10) as i32)
}

/// Pick the next movement target for an aligned hound. `(px, py)` is the
/// player's rounded cell.
pub fn next_target(grid: &Grid, hound: &mut Actor, px: i32, py: i32) -> (i32, i32) {
    let hx = hound.col();
    let hy = hound.row();

    let standing = grid.standing_support(hound.x, hound.y);
    let on_ladder = grid.ladder_at(hound.x, hound.y);
    if !standing && !on_ladder {
        return (hx, hy + 1);
    }

    if on_ladder && py != hy {
        let dy = if py < hy { -1 } else { 1 };
        let ny = hy + dy;
        if grid.ladder_at(hx as f32, ny as f32) || grid.can_occupy(hx as f32, ny as f32) {
            return (hx, ny);
        }
    }

    if px != hx {
        let dx = if px < hx { -1 } else { 1 };
        if grid.can_occupy((hx + dx) as f32, hy as f32) {
            hound.facing = if dx < 0 { Facing::Left } else { Facing::Right };
            return (hx + dx, hy);
        }
    }

    (hx, hy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

    fn grid_from(rows: &[&str]) -> Grid {
        let cells = rows.iter()
            .map(|row| row.chars().map(|ch| match ch {
                '#' => Tile::Brick,
                '=' => Tile::Solid,
                'H' => Tile::Ladder,
                _ => Tile::Empty,
            }).collect())
            .collect();
        Grid::new(cells)
    }

    #[test]
    fn speed_scales_every_ten_levels() {
        let base = 0.05;
        assert_eq!(scaled_speed(base, 1.1, 1), base);
        assert_eq!(scaled_speed(base, 1.1, 10), base);
        assert!((scaled_speed(base, 1.1, 11) - base * 1.1).abs() < 1e-6);
        assert!((scaled_speed(base, 1.1, 21) - base * 1.21).abs() < 1e-5);
    }

    #[test]
    fn airborne_hound_steps_one_row_down() {
        let g = grid_from(&[
            "   ",
            "   ",
            "###",
        ]);
        let mut h = Actor::hound(0, 1, 0);
        assert_eq!(next_target(&g, &mut h, 0, 0), (1, 1));
    }

    #[test]
    fn ladder_pursuit_outranks_column_pursuit() {
        let g = grid_from(&[
            " H ",
            " H ",
            "###",
        ]);
        let mut h = Actor::hound(0, 1, 1);
        // Player above and to the left: vertical move wins.
        assert_eq!(next_target(&g, &mut h, 0, 0), (1, 0));
        // Player below.
        let mut h = Actor::hound(0, 1, 0);
        assert_eq!(next_target(&g, &mut h, 0, 1), (1, 1));
    }

    #[test]
    fn grounded_hound_closes_the_column_gap() {
        let g = grid_from(&[
            "    ",
            "####",
        ]);
        let mut h = Actor::hound(0, 2, 0);
        assert_eq!(next_target(&g, &mut h, 0, 0), (1, 0));
        assert_eq!(h.facing, Facing::Left);
        assert_eq!(next_target(&g, &mut h, 3, 0), (3, 0));
        assert_eq!(h.facing, Facing::Right);
    }

    #[test]
    fn blocked_hound_holds_its_cell() {
        let g = grid_from(&[
            "=  =",
            "====",
        ]);
        let mut h = Actor::hound(0, 1, 0);
        // Player beyond the wall on the left.
        assert_eq!(next_target(&g, &mut h, 0, 0), (1, 0));
        // h now eased to column 1... player still left, wall at column 0.
        let mut h = Actor::hound(0, 1, 0);
        h.x = 1.0;
        assert_eq!(next_target(&g, &mut h, -1, 0), (1, 0));
    }

    #[test]
    fn ladder_dead_end_falls_back_to_column_chase() {
        let g = grid_from(&[
            "=== ",
            "=H  ",
            "====",
        ]);
        // Hound on a ladder under a ceiling, player up-right: the vertical
        // move is blocked, so it chases the column instead.
        let mut h = Actor::hound(0, 1, 1);
        assert_eq!(next_target(&g, &mut h, 2, 0), (2, 1));
        assert_eq!(h.facing, Facing::Right);
    }
}
