/// The step function: advances the world by one tick.
///
/// Fixed order per tick:
///   1. Overlay timers (digs, puddles) decrement and prune
///   2. Player controller: gravity, lateral steering, jump, puddle,
///      climb + dig triggers, target easing, pickup/exit contact
///   3. Hound updates, each reading the player position already advanced
///      in this same tick
///
/// Terminal transitions (Victory, Defeat) are raised inside 2 and 3; once
/// one fires, the rest of the tick is skipped and further calls are no-ops
/// until the flow layer restarts the phase.

use crate::domain::ai;
use crate::domain::entity::{Facing, InputFrame};
use crate::domain::physics;
use crate::domain::tile::Tile;
use super::event::GameEvent;
use super::world::{Phase, WorldState};

pub fn step(world: &mut WorldState, input: InputFrame) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return vec![];
    }

    let mut events = Vec::new();
    world.tick += 1;

    world.grid.tick_overlays();
    update_player(world, input, &mut events);
    if world.phase == Phase::Playing {
        update_hounds(world, &mut events);
    }

    world.prev_input = input;
    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn update_player(w: &mut WorldState, input: InputFrame, events: &mut Vec<GameEvent>) {
    let t = w.tuning;
    let standing = w.grid.standing_support(w.player.x, w.player.y);
    let on_ladder = w.grid.ladder_at(w.player.x, w.player.y);

    physics::integrate_gravity(&mut w.player, &w.grid, &t, standing, on_ladder);

    let x_aligned = physics::aligned(w.player.x, w.player.target_x);
    let y_aligned = physics::aligned(w.player.y, w.player.target_y);

    // Lateral steering happens only at column alignment.
    if x_aligned {
        w.player.x = w.player.target_x;
        let cur_x = w.player.target_x;
        let check_y = w.player.y.round();
        if input.left && w.grid.can_occupy(cur_x - 1.0, check_y) {
            w.player.target_x = cur_x - 1.0;
            w.player.facing = Facing::Left;
        } else if input.right && w.grid.can_occupy(cur_x + 1.0, check_y) {
            w.player.target_x = cur_x + 1.0;
            w.player.facing = Facing::Right;
        }
    }

    // Jump: edge-triggered, two per airtime.
    if input.jump && !w.prev_input.jump {
        if physics::try_jump(&mut w.player, &t, standing, on_ladder) {
            events.push(GameEvent::Jumped { airborne: w.player.jump_count == 2 });
        }
    }

    // Puddle: edge-triggered, replaces any puddle already on the cell.
    if input.puddle && !w.prev_input.puddle {
        let (col, row) = (w.player.col(), w.player.row());
        w.grid.place_puddle(col, row, t.puddle_ticks);
        events.push(GameEvent::PuddlePlaced { x: col, y: row });
    }

    // At rest on a lattice point: climbing intent and the dig triggers.
    if x_aligned && y_aligned && w.player.vy == 0.0 {
        w.player.y = w.player.target_y;
        let cur_x = w.player.target_x;
        let cur_y = w.player.target_y;

        if input.up
            && (w.grid.ladder_at(cur_x, cur_y) || w.grid.ladder_at(cur_x, cur_y - 1.0))
            && w.grid.can_occupy(cur_x, cur_y - 1.0)
        {
            w.player.target_y = cur_y - 1.0;
            w.player.climbing = true;
        } else if input.down
            && (w.grid.ladder_at(cur_x, cur_y + 1.0) || w.grid.can_occupy(cur_x, cur_y + 1.0))
        {
            w.player.target_y = cur_y + 1.0;
            w.player.climbing = true;
        }

        let col = cur_x.round() as i32;
        let row = cur_y.round() as i32;
        let dig_targets = [
            (input.dig_left, col - 1, row + 1),
            (input.dig_right, col + 1, row + 1),
            (input.dig_up, col, row - 1),
        ];
        for (held, dx, dy) in dig_targets {
            if held && w.grid.dig_at(dx, dy, t.dig_ticks) {
                events.push(GameEvent::HoleDug { x: dx, y: dy });
            }
        }
    }

    // Ease toward the target; vertical easing never runs against gravity.
    w.player.x = physics::step_toward(w.player.x, w.player.target_x, t.player_speed);
    if w.player.vy == 0.0 && (standing || on_ladder) {
        w.player.y = physics::step_toward(w.player.y, w.player.target_y, t.player_speed);
    }

    // Contact effects at the rounded final cell.
    let (col, row) = (w.player.col(), w.player.row());
    if let Some(remaining) = w.grid.collect(col, row) {
        w.score += 100;
        events.push(GameEvent::FishCollected { x: col, y: row });
        if remaining == 0 {
            events.push(GameEvent::AllFishCollected);
            if let Some((ex, ey)) = w.grid.reveal_exit() {
                events.push(GameEvent::ExitRevealed { x: ex, y: ey });
            }
        }
    }
    if w.grid.cell(col, row) == Tile::Exit {
        w.phase = Phase::Victory;
        events.push(GameEvent::LevelCleared);
    }
}

// ══════════════════════════════════════════════════════════════
// Hounds
// ══════════════════════════════════════════════════════════════

fn update_hounds(w: &mut WorldState, events: &mut Vec<GameEvent>) {
    let t = w.tuning;
    let base = ai::scaled_speed(t.hound_speed, t.hound_growth, w.level_number);
    let (px, py) = (w.player.x, w.player.y);
    let (pcol, prow) = (w.player.col(), w.player.row());

    for i in 0..w.hounds.len() {
        let in_puddle = w.grid.puddle_active(w.hounds[i].col(), w.hounds[i].row());
        let speed = if in_puddle { base * t.puddle_slow } else { base };

        let aligned = physics::aligned(w.hounds[i].x, w.hounds[i].target_x)
            && physics::aligned(w.hounds[i].y, w.hounds[i].target_y);
        if aligned {
            w.hounds[i].x = w.hounds[i].target_x;
            w.hounds[i].y = w.hounds[i].target_y;
            let (nx, ny) = ai::next_target(&w.grid, &mut w.hounds[i], pcol, prow);
            w.hounds[i].target_x = nx as f32;
            w.hounds[i].target_y = ny as f32;
        }

        w.hounds[i].x = physics::step_toward(w.hounds[i].x, w.hounds[i].target_x, speed);
        w.hounds[i].y = physics::step_toward(w.hounds[i].y, w.hounds[i].target_y, speed);

        let caught = (w.hounds[i].x - px).abs() < physics::CATCH_RANGE
            && (w.hounds[i].y - py).abs() < physics::CATCH_RANGE;
        if caught && w.phase == Phase::Playing {
            w.phase = Phase::Defeat;
            events.push(GameEvent::PlayerCaught { hound: w.hounds[i].id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::domain::entity::Actor;
    use crate::domain::grid::Grid;

    /// Build a Playing world from a string diagram.
    /// Legend: '#'=Brick  '='=Solid  'H'=Ladder  '$'=Fish  'X'=Exit
    ///         'P'=player spawn  'E'=hound spawn  ' '=Empty
    fn world_from(rows: &[&str], tuning: Tuning) -> WorldState {
        let mut cells = vec![];
        let mut player = (0, 0);
        let mut hounds = vec![];
        for (y, row) in rows.iter().enumerate() {
            let mut line = vec![];
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '#' => Tile::Brick,
                    '=' => Tile::Solid,
                    'H' => Tile::Ladder,
                    '$' => Tile::Fish,
                    'X' => Tile::Exit,
                    'P' => {
                        player = (x as i32, y as i32);
                        Tile::Empty
                    }
                    'E' => {
                        hounds.push((x as i32, y as i32));
                        Tile::Empty
                    }
                    _ => Tile::Empty,
                };
                line.push(tile);
            }
            cells.push(line);
        }
        let mut w = WorldState::new(tuning);
        w.grid = Grid::new(cells);
        w.player = Actor::player(player.0, player.1);
        w.hounds = hounds.into_iter().enumerate()
            .map(|(i, (x, y))| Actor::hound(i, x, y))
            .collect();
        w.phase = Phase::Playing;
        w
    }

    fn idle() -> InputFrame {
        InputFrame::default()
    }

    // ── Digging ──

    #[test]
    fn dig_left_opens_timed_hole() {
        let t = Tuning::default();
        let mut w = world_from(&[
            "    ",
            "P   ",
            "####",
        ], t);
        let events = step(&mut w, InputFrame { dig_left: true, ..idle() });
        assert!(events.contains(&GameEvent::HoleDug { x: 0, y: 2 }));
        // Storage keeps the Brick; traversal sees a hole at full duration.
        assert_eq!(w.grid.cell(0, 2), Tile::Brick);
        assert!(w.grid.can_occupy(0.0, 2.0));
        assert_eq!(w.grid.dig_remaining(0, 2), Some(t.dig_ticks));
    }

    #[test]
    fn dig_up_respects_the_same_legality_rule() {
        let mut w = world_from(&[
            "    ",
            " #  ",
            " P  ",
            "####",
        ], Tuning::default());
        let events = step(&mut w, InputFrame { dig_up: true, ..idle() });
        assert!(events.contains(&GameEvent::HoleDug { x: 1, y: 1 }));

        // A brick on the top row has no Empty cell above it.
        let mut w = world_from(&[
            "#   ",
            "P   ",
            "####",
        ], Tuning::default());
        let events = step(&mut w, InputFrame { dig_up: true, ..idle() });
        assert!(events.is_empty());
    }

    #[test]
    fn airborne_player_cannot_dig() {
        let mut w = world_from(&[
            "P   ",
            "    ",
            "####",
        ], Tuning::default());
        let events = step(&mut w, InputFrame { dig_right: true, ..idle() });
        assert!(!events.iter().any(|e| matches!(e, GameEvent::HoleDug { .. })));
    }

    #[test]
    fn hole_expires_and_reverts() {
        let t = Tuning { dig_ticks: 2, ..Tuning::default() };
        let mut w = world_from(&[
            "    ",
            "P   ",
            "####",
        ], t);
        step(&mut w, InputFrame { dig_left: true, ..idle() });
        assert!(w.grid.dig_active(0, 2));
        step(&mut w, idle());
        step(&mut w, idle());
        assert!(!w.grid.dig_active(0, 2));
        assert!(!w.grid.can_occupy(0.0, 2.0));
    }

    // ── Collect and exit ──

    #[test]
    fn last_fish_reveals_exactly_one_exit() {
        let mut w = world_from(&[
            "====",
            "=  =",
            "=P$=",
            "====",
        ], Tuning::default());
        let mut revealed = 0;
        let mut collected = false;
        for _ in 0..40 {
            let events = step(&mut w, InputFrame { right: true, ..idle() });
            for e in &events {
                match e {
                    GameEvent::ExitRevealed { x, y } => {
                        revealed += 1;
                        assert_eq!((*x, *y), (1, 1));
                    }
                    GameEvent::FishCollected { .. } => collected = true,
                    _ => {}
                }
            }
        }
        assert!(collected);
        assert_eq!(revealed, 1);
        assert_eq!(w.grid.fish_remaining(), 0);
        assert_eq!(w.grid.cell(1, 1), Tile::Exit);
        assert_eq!(w.score, 100);
    }

    #[test]
    fn exit_contact_wins_the_level() {
        let mut w = world_from(&[
            "====",
            "=PX=",
            "====",
        ], Tuning::default());
        for _ in 0..20 {
            step(&mut w, InputFrame { right: true, ..idle() });
        }
        assert_eq!(w.phase, Phase::Victory);
    }

    // ── Jumps ──

    #[test]
    fn double_jump_protocol() {
        let t = Tuning::default();
        let mut w = world_from(&[
            "      ",
            "      ",
            "P     ",
            "######",
        ], t);
        let jump = InputFrame { jump: true, ..idle() };

        let events = step(&mut w, jump);
        assert_eq!(w.player.vy, t.jump_force);
        assert_eq!(w.player.jump_count, 1);
        assert!(events.contains(&GameEvent::Jumped { airborne: false }));

        step(&mut w, idle());
        let events = step(&mut w, jump);
        assert_eq!(w.player.jump_count, 2);
        assert_eq!(w.player.vy, t.jump_force);
        assert!(events.contains(&GameEvent::Jumped { airborne: true }));

        step(&mut w, idle());
        let events = step(&mut w, jump);
        assert_eq!(w.player.jump_count, 2);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Jumped { .. })));
    }

    #[test]
    fn holding_jump_is_not_a_second_press() {
        let t = Tuning::default();
        let mut w = world_from(&[
            "      ",
            "      ",
            "P     ",
            "######",
        ], t);
        let jump = InputFrame { jump: true, ..idle() };
        step(&mut w, jump);
        step(&mut w, jump);
        step(&mut w, jump);
        assert_eq!(w.player.jump_count, 1);
    }

    // ── Puddles ──

    #[test]
    fn puddle_slows_hound_until_expiry() {
        let t = Tuning::default();
        let mut w = world_from(&[
            "=====",
            "=P E=",
            "=====",
        ], t);
        w.grid.place_puddle(3, 1, 2);

        step(&mut w, idle());
        let slow = t.hound_speed * t.puddle_slow;
        assert!((3.0 - w.hounds[0].x - slow).abs() < 1e-6);

        step(&mut w, idle());
        assert!(!w.grid.puddle_active(3, 1));
        assert!((3.0 - slow - t.hound_speed - w.hounds[0].x).abs() < 1e-6);
    }

    #[test]
    fn puddle_drop_is_edge_triggered() {
        let mut w = world_from(&[
            "=====",
            "=P  =",
            "=====",
        ], Tuning::default());
        let press = InputFrame { puddle: true, ..idle() };
        let events = step(&mut w, press);
        assert!(events.contains(&GameEvent::PuddlePlaced { x: 1, y: 1 }));
        let events = step(&mut w, press);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PuddlePlaced { .. })));
    }

    // ── Hounds ──

    #[test]
    fn hound_speed_scales_with_level() {
        let t = Tuning::default();
        let mut w = world_from(&[
            "=====",
            "=P E=",
            "=====",
        ], t);
        w.level_number = 11;
        step(&mut w, idle());
        let expected = t.hound_speed * t.hound_growth;
        assert!((3.0 - w.hounds[0].x - expected).abs() < 1e-6);
    }

    #[test]
    fn airborne_hound_targets_one_row_down() {
        let mut w = world_from(&[
            "=====",
            "=PE =",
            "=   =",
            "=====",
        ], Tuning::default());
        step(&mut w, idle());
        assert_eq!(w.hounds[0].target_y, 2.0);
        assert_eq!(w.hounds[0].target_x, 2.0);
    }

    #[test]
    fn contact_defeats_exactly_once() {
        let mut w = world_from(&[
            "=======",
            "=E P E=",
            "=======",
        ], Tuning::default());
        let mut caught = 0;
        for _ in 0..300 {
            let events = step(&mut w, idle());
            caught += events.iter()
                .filter(|e| matches!(e, GameEvent::PlayerCaught { .. }))
                .count();
        }
        assert_eq!(w.phase, Phase::Defeat);
        assert_eq!(caught, 1);
    }

    // ── Climbing ──

    #[test]
    fn ladder_climb_moves_one_row_at_rest() {
        let mut w = world_from(&[
            "=====",
            "=   =",
            "= H =",
            "=PH =",
            "=====",
        ], Tuning::default());
        // Step onto the ladder column, releasing before alignment so the
        // walk stops there instead of chaining into the next column.
        for _ in 0..8 {
            step(&mut w, InputFrame { right: true, ..idle() });
        }
        for _ in 0..2 {
            step(&mut w, idle());
        }
        assert_eq!((w.player.col(), w.player.row()), (2, 3));
        for _ in 0..25 {
            step(&mut w, InputFrame { up: true, ..idle() });
        }
        assert_eq!(w.player.row(), 1);
        assert!(w.player.climbing);
    }

    // ── Bounded world ──

    #[test]
    fn player_never_leaves_the_lattice() {
        let mut w = world_from(&[
            "======",
            "=    =",
            "=P   =",
            "======",
        ], Tuning::default());
        let frame = InputFrame { left: true, jump: true, ..idle() };
        for i in 0..500 {
            // Alternate press/release so the jump edge keeps firing.
            let f = if i % 2 == 0 { frame } else { InputFrame { left: true, ..idle() } };
            step(&mut w, f);
            let (c, r) = (w.player.col(), w.player.row());
            assert!(c >= 0 && c < w.grid.width() as i32, "col {c} out of bounds");
            assert!(r >= 0 && r < w.grid.height() as i32, "row {r} out of bounds");
        }
    }

    #[test]
    fn falling_through_a_dug_hole() {
        let mut w = world_from(&[
            "     ",
            " P   ",
            "#####",
        ], Tuning::default());
        step(&mut w, InputFrame { dig_left: true, ..idle() });
        assert!(w.grid.dig_active(0, 2));
        for _ in 0..20 {
            step(&mut w, InputFrame { left: true, ..idle() });
        }
        // Walked over the hole and dropped in.
        for _ in 0..60 {
            step(&mut w, idle());
        }
        assert_eq!((w.player.col(), w.player.row()), (0, 2));
        assert_eq!(w.player.vy, 0.0);
    }

    // ── Tick gating ──

    #[test]
    fn only_playing_ticks() {
        let mut w = world_from(&[
            "===",
            "=P=",
            "===",
        ], Tuning::default());
        w.phase = Phase::Menu;
        assert!(step(&mut w, idle()).is_empty());
        assert_eq!(w.tick, 0);
        w.phase = Phase::Victory;
        assert!(step(&mut w, idle()).is_empty());
        assert_eq!(w.tick, 0);
    }
}
