/// Actors and transient overlays.
///
/// Player and hounds share one record. Hounds keep the physics fields
/// (`vy`, `jump_count`) at their rest values; they never enter the
/// gravity integrator, their fall is a forced one-row step.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Player,
    Hound,
}

/// Input sampled for one tick: the held state of every action the sim
/// understands. Edge-triggered actions (jump, puddle) are detected by
/// comparing against the previous tick's frame, which `WorldState` carries.
#[derive(Clone, Copy, Default, Debug)]
pub struct InputFrame {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub dig_left: bool,
    pub dig_right: bool,
    pub dig_up: bool,
    pub puddle: bool,
}

/// An actor eases toward its movement target on continuous coordinates;
/// terrain queries see the rounded lattice point.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: usize,
    pub kind: ActorKind,
    pub x: f32,
    pub y: f32,
    pub target_x: f32,
    pub target_y: f32,
    #[allow(dead_code)]
    pub facing: Facing,
    pub vy: f32,
    pub jump_count: u8,
    /// Set when a ladder move is taken; presentation hint only.
    #[allow(dead_code)]
    pub climbing: bool,
}

impl Actor {
    pub fn player(x: i32, y: i32) -> Self {
        Actor {
            id: 0,
            kind: ActorKind::Player,
            x: x as f32,
            y: y as f32,
            target_x: x as f32,
            target_y: y as f32,
            facing: Facing::Right,
            vy: 0.0,
            jump_count: 0,
            climbing: false,
        }
    }

    pub fn hound(id: usize, x: i32, y: i32) -> Self {
        Actor {
            id,
            kind: ActorKind::Hound,
            x: x as f32,
            y: y as f32,
            target_x: x as f32,
            target_y: y as f32,
            facing: Facing::Left,
            vy: 0.0,
            jump_count: 0,
            climbing: false,
        }
    }

    /// Rounded lattice column.
    #[inline]
    pub fn col(&self) -> i32 {
        self.x.round() as i32
    }

    /// Rounded lattice row.
    #[inline]
    pub fn row(&self) -> i32 {
        self.y.round() as i32
    }
}

/// A dug-out Brick: passable while the timer runs, impassable again the
/// moment it expires, even with an actor standing in it. The stored tile
/// is never touched; the hole is a time-bounded exception, not a mutation.
#[derive(Clone, Copy, Debug)]
pub struct Dig {
    pub x: i32,
    pub y: i32,
    pub remaining: u32,
    total: u32,
}

impl Dig {
    pub fn new(x: i32, y: i32, ticks: u32) -> Self {
        Dig { x, y, remaining: ticks, total: ticks }
    }

    /// Fraction of the hole's lifetime left, 1.0 → 0.0. For countdown display.
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.total as f32
    }
}

/// A scent puddle: hounds standing on its cell move at reduced speed
/// until the timer runs out.
#[derive(Clone, Copy, Debug)]
pub struct Puddle {
    pub x: i32,
    pub y: i32,
    pub remaining: u32,
}

impl Puddle {
    pub fn new(x: i32, y: i32, ticks: u32) -> Self {
        Puddle { x, y, remaining: ticks }
    }
}
