/// Terrain lattice plus transient overlays, queried by continuous
/// coordinates.
///
/// Actors live on continuous (x, y); every terrain query rounds to the
/// nearest lattice point. Out-of-bounds reads behave as Solid, so the
/// world is implicitly walled on all sides.
///
/// The grid owns both overlay collections. An active dig makes its Brick
/// passable without changing the stored tile; a puddle only affects hound
/// speed. At most one of each kind per lattice point; placing again
/// replaces the timer.

use super::entity::{Dig, Puddle};
use super::tile::Tile;

/// Probe offset added before flooring the below-row check, so an actor
/// resting exactly on an integral row still counts as grounded.
const SUPPORT_EPS: f32 = 0.01;

/// Exit reveal scans this many rows from the top (exclusive of the border).
const EXIT_BAND: usize = 4;

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<Tile>>,
    digs: Vec<Dig>,
    puddles: Vec<Puddle>,
    fish_remaining: usize,
    exit_revealed: bool,
}

impl Grid {
    pub fn new(cells: Vec<Vec<Tile>>) -> Self {
        let height = cells.len();
        let width = cells.first().map_or(0, |row| row.len());
        let fish_remaining = cells.iter()
            .flat_map(|row| row.iter())
            .filter(|&&t| t == Tile::Fish)
            .count();
        Grid {
            width,
            height,
            cells,
            digs: vec![],
            puddles: vec![],
            fish_remaining,
            exit_revealed: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn fish_remaining(&self) -> usize {
        self.fish_remaining
    }

    pub fn exit_revealed(&self) -> bool {
        self.exit_revealed
    }

    // ── Queries ──

    /// Bounds-checked lattice read; outside the world everything is Solid.
    #[inline]
    pub fn cell(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            Tile::Solid
        } else {
            self.cells[row as usize][col as usize]
        }
    }

    /// Lattice read at the rounded continuous coordinate.
    #[inline]
    pub fn cell_at(&self, x: f32, y: f32) -> Tile {
        self.cell(x.round() as i32, y.round() as i32)
    }

    /// Is there an active dig at this lattice point?
    #[inline]
    pub fn dig_active(&self, col: i32, row: i32) -> bool {
        self.digs.iter().any(|d| d.x == col && d.y == row)
    }

    /// Remaining lifetime fraction of the dig at this point, if any.
    pub fn dig_fraction(&self, col: i32, row: i32) -> Option<f32> {
        self.digs.iter()
            .find(|d| d.x == col && d.y == row)
            .map(|d| d.fraction())
    }

    /// Remaining ticks of the dig at this point, if any.
    pub fn dig_remaining(&self, col: i32, row: i32) -> Option<u32> {
        self.digs.iter()
            .find(|d| d.x == col && d.y == row)
            .map(|d| d.remaining)
    }

    /// Is there an active puddle at this lattice point?
    #[inline]
    pub fn puddle_active(&self, col: i32, row: i32) -> bool {
        self.puddles.iter().any(|p| p.x == col && p.y == row)
    }

    /// Is there something to stand on one row below (x, y)?
    ///
    /// True past the bottom edge and outside the side walls, so nothing
    /// ever falls out of the world. A dug-out Brick does not support.
    pub fn standing_support(&self, x: f32, y: f32) -> bool {
        let col = x.round() as i32;
        let below = (y + 1.0 + SUPPORT_EPS).floor() as i32;
        if below >= self.height as i32 {
            return true;
        }
        if col < 0 || col >= self.width as i32 {
            return true;
        }
        self.cell(col, below).is_support() && !self.dig_active(col, below)
    }

    /// Is the rounded coordinate inside a ladder cell?
    #[inline]
    pub fn ladder_at(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y).is_climbable()
    }

    /// Can an actor occupy the cell at the rounded coordinate?
    /// An open dig is always passable, whatever the stored tile says.
    pub fn can_occupy(&self, x: f32, y: f32) -> bool {
        let col = x.round() as i32;
        let row = y.round() as i32;
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return false;
        }
        if self.dig_active(col, row) {
            return true;
        }
        self.cell(col, row).is_open()
    }

    // ── Mutations ──

    /// Excavate (col, row). Legal only against a Brick with an Empty cell
    /// directly above it; digging an already-open hole refreshes its timer.
    pub fn dig_at(&mut self, col: i32, row: i32, ticks: u32) -> bool {
        if !self.cell(col, row).is_diggable() {
            return false;
        }
        if self.cell(col, row - 1) != Tile::Empty {
            return false;
        }
        self.digs.retain(|d| !(d.x == col && d.y == row));
        self.digs.push(Dig::new(col, row, ticks));
        true
    }

    /// Drop a puddle at (col, row), replacing any already there.
    pub fn place_puddle(&mut self, col: i32, row: i32, ticks: u32) {
        self.puddles.retain(|p| !(p.x == col && p.y == row));
        self.puddles.push(Puddle::new(col, row, ticks));
    }

    /// Pick up a fish. Returns the count remaining after the pickup, or
    /// None if the cell held no fish.
    pub fn collect(&mut self, col: i32, row: i32) -> Option<usize> {
        if self.cell(col, row) != Tile::Fish {
            return None;
        }
        self.cells[row as usize][col as usize] = Tile::Empty;
        self.fish_remaining -= 1;
        Some(self.fish_remaining)
    }

    /// One-time exit placement once every fish is gone: the first Empty or
    /// Ladder cell in the top band becomes the Exit. A level with no
    /// eligible cell simply stays exitless.
    pub fn reveal_exit(&mut self) -> Option<(i32, i32)> {
        self.exit_revealed = true;
        let band = self.height.min(EXIT_BAND);
        for row in 1..band {
            for col in 1..self.width.saturating_sub(1) {
                if matches!(self.cells[row][col], Tile::Empty | Tile::Ladder) {
                    self.cells[row][col] = Tile::Exit;
                    return Some((col as i32, row as i32));
                }
            }
        }
        None
    }

    /// Advance overlay timers; expired entries vanish and traversal
    /// reverts to the stored tile.
    pub fn tick_overlays(&mut self) {
        for d in &mut self.digs {
            d.remaining -= 1;
        }
        self.digs.retain(|d| d.remaining > 0);
        for p in &mut self.puddles {
            p.remaining -= 1;
        }
        self.puddles.retain(|p| p.remaining > 0);
    }
}
