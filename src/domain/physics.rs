/// Motion solver shared by the player controller and the hound updates.
///
/// Two regimes, applied per axis:
///   - Target easing: step toward the movement target by a fixed per-tick
///     speed, clamping at the target so motion never overshoots.
///   - Free fall (player only): vertical velocity integrates gravity up to
///     a terminal ceiling. Descent that reaches support lands on the
///     floor-aligned row; ascent into a blocked cell bumps against the
///     ceil-aligned row. Both snap the movement target so easing does not
///     fight the integrator afterwards.

use super::entity::Actor;
use super::grid::Grid;
use crate::config::Tuning;

/// An axis counts as aligned with its target inside this tolerance.
pub const ALIGN_EPS: f32 = 0.05;

/// Hound-vs-player contact range, looser than lattice alignment.
pub const CATCH_RANGE: f32 = 0.6;

#[inline]
pub fn aligned(pos: f32, target: f32) -> bool {
    (pos - target).abs() < ALIGN_EPS
}

/// Move `pos` toward `target` by at most `speed`.
#[inline]
pub fn step_toward(pos: f32, target: f32, speed: f32) -> f32 {
    if pos < target {
        (pos + speed).min(target)
    } else if pos > target {
        (pos - speed).max(target)
    } else {
        pos
    }
}

/// Integrate one tick of player gravity.
///
/// `standing` / `on_ladder` are the support checks at the start of the
/// tick; an actor at rest with either keeps its jumps armed and skips the
/// integrator entirely.
pub fn integrate_gravity(
    actor: &mut Actor,
    grid: &Grid,
    t: &Tuning,
    standing: bool,
    on_ladder: bool,
) {
    if actor.vy == 0.0 && (standing || on_ladder) {
        actor.jump_count = 0;
        return;
    }

    actor.vy = (actor.vy + t.gravity).min(t.terminal_velocity);
    let mut candidate = actor.y + actor.vy;

    if actor.vy > 0.0 && grid.standing_support(actor.x, candidate) {
        // Landing: snap to the floor row and clear double-jump.
        candidate = candidate.floor();
        actor.vy = 0.0;
        actor.target_y = candidate;
        actor.jump_count = 0;
    } else if actor.vy < 0.0
        && !grid.can_occupy(actor.x, candidate)
        && !grid.ladder_at(actor.x, candidate)
    {
        // Head bump: snap to the ceiling row.
        candidate = candidate.ceil();
        actor.vy = 0.0;
        actor.target_y = candidate;
    }
    actor.y = candidate;
}

/// Jump edge-trigger. The first jump needs ground or ladder contact, the
/// second fires mid-air; landing re-arms both. Returns whether an impulse
/// was granted.
pub fn try_jump(actor: &mut Actor, t: &Tuning, standing: bool, on_ladder: bool) -> bool {
    if actor.jump_count == 0 && (standing || on_ladder) {
        actor.vy = t.jump_force;
        actor.jump_count = 1;
        true
    } else if actor.jump_count == 1 {
        actor.vy = t.jump_force;
        actor.jump_count = 2;
        true
    } else {
        false
    }
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

    // ── easing ──

    #[test]
    fn step_toward_never_overshoots() {
        assert_eq!(step_toward(0.0, 1.0, 0.3), 0.3);
        assert_eq!(step_toward(0.9, 1.0, 0.3), 1.0);
        assert_eq!(step_toward(1.0, 0.0, 0.3), 0.7);
        assert_eq!(step_toward(0.1, 0.0, 0.3), 0.0);
        assert_eq!(step_toward(5.0, 5.0, 0.3), 5.0);
    }

    #[test]
    fn convergence_is_monotonic() {
        let mut pos = 0.0f32;
        let target = 3.0f32;
        let mut dist = (pos - target).abs();
        for _ in 0..100 {
            pos = step_toward(pos, target, 0.12);
            let next = (pos - target).abs();
            assert!(next <= dist);
            dist = next;
        }
        assert_eq!(pos, target);
    }

    #[test]
    fn alignment_tolerance() {
        assert!(aligned(1.0, 1.04));
        assert!(aligned(1.0, 0.96));
        assert!(!aligned(1.0, 1.06));
    }

    // ── gravity ──

    #[test]
    fn at_rest_skips_integrator_and_rearms_jumps() {
        let g = grid_from(&[
            " ",
            "#",
        ]);
        let mut a = Actor::player(0, 0);
        a.jump_count = 2;
        integrate_gravity(&mut a, &g, &Tuning::default(), true, false);
        assert_eq!(a.y, 0.0);
        assert_eq!(a.vy, 0.0);
        assert_eq!(a.jump_count, 0);
    }

    #[test]
    fn fall_accelerates_to_terminal() {
        let g = grid_from(&[
            "   ",
            "   ",
            "   ",
        ]);
        let t = Tuning { terminal_velocity: 0.02, ..Tuning::default() };
        let mut a = Actor::player(1, 0);
        integrate_gravity(&mut a, &g, &t, false, false);
        assert_eq!(a.vy, t.gravity);
        integrate_gravity(&mut a, &g, &t, false, false);
        integrate_gravity(&mut a, &g, &t, false, false);
        assert_eq!(a.vy, t.terminal_velocity);
    }

    #[test]
    fn descent_lands_snapped_to_floor_row() {
        let g = grid_from(&[
            " ",
            " ",
            "#",
        ]);
        let mut a = Actor::player(0, 0);
        for _ in 0..400 {
            let standing = g.standing_support(a.x, a.y);
            let on_ladder = g.ladder_at(a.x, a.y);
            integrate_gravity(&mut a, &g, &Tuning::default(), standing, on_ladder);
        }
        assert_eq!(a.y, 1.0);
        assert_eq!(a.target_y, 1.0);
        assert_eq!(a.vy, 0.0);
        assert_eq!(a.jump_count, 0);
    }

    #[test]
    fn ascent_bumps_head_on_brick() {
        let g = grid_from(&[
            "#",
            " ",
            "#",
        ]);
        let mut a = Actor::player(0, 1);
        a.vy = Tuning::default().jump_force;
        for _ in 0..400 {
            let standing = g.standing_support(a.x, a.y);
            let on_ladder = g.ladder_at(a.x, a.y);
            integrate_gravity(&mut a, &g, &Tuning::default(), standing, on_ladder);
        }
        // Bumped, fell back, and settled on the floor below.
        assert_eq!(a.y, 1.0);
        assert_eq!(a.vy, 0.0);
        assert!(a.y > 0.5);
    }

    // ── jumps ──

    #[test]
    fn two_jumps_then_dry() {
        let t = Tuning::default();
        let mut a = Actor::player(0, 0);
        assert!(try_jump(&mut a, &t, true, false));
        assert_eq!(a.vy, t.jump_force);
        assert_eq!(a.jump_count, 1);
        assert!(try_jump(&mut a, &t, false, false));
        assert_eq!(a.jump_count, 2);
        assert!(!try_jump(&mut a, &t, false, false));
        assert_eq!(a.jump_count, 2);
    }

    #[test]
    fn grounded_jump_needs_support_or_ladder() {
        let t = Tuning::default();
        let mut a = Actor::player(0, 0);
        assert!(!try_jump(&mut a, &t, false, false));
        assert!(try_jump(&mut a, &t, false, true));
    }
}
