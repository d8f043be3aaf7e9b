/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Level data carries tiles as integer cell codes:
///   0=Empty  1=Brick  2=Solid  3=Ladder  4=Fish  5=Exit

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Brick,  // Solid + Diggable
    Solid,  // Permanent
    Ladder, // Climbable
    Fish,   // Pickup target
    Exit,   // Inert until revealed; ends the level on contact
}

impl Tile {
    /// Decode a level-data cell code. Unknown codes read as Empty.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Tile::Brick,
            2 => Tile::Solid,
            3 => Tile::Ladder,
            4 => Tile::Fish,
            5 => Tile::Exit,
            _ => Tile::Empty,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Tile::Empty => 0,
            Tile::Brick => 1,
            Tile::Solid => 2,
            Tile::Ladder => 3,
            Tile::Fish => 4,
            Tile::Exit => 5,
        }
    }

    /// Can an actor stand on top of this tile?
    pub fn is_support(self) -> bool {
        matches!(self, Tile::Brick | Tile::Solid | Tile::Ladder)
    }

    /// Can this tile be dug out?
    pub fn is_diggable(self) -> bool {
        matches!(self, Tile::Brick)
    }

    /// Can an actor climb (move up/down) on this tile?
    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Ladder)
    }

    /// Can an actor occupy this cell? (ignores overlays)
    pub fn is_open(self) -> bool {
        matches!(self, Tile::Empty | Tile::Ladder | Tile::Fish | Tile::Exit)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for code in 0..=5u8 {
            assert_eq!(Tile::from_code(code).code(), code);
        }
    }

    #[test]
    fn unknown_code_is_empty() {
        assert_eq!(Tile::from_code(9), Tile::Empty);
        assert_eq!(Tile::from_code(255), Tile::Empty);
    }

    #[test]
    fn open_and_support_split() {
        assert!(Tile::Ladder.is_open());
        assert!(Tile::Ladder.is_support());
        assert!(Tile::Brick.is_support());
        assert!(!Tile::Brick.is_open());
        assert!(Tile::Exit.is_open());
        assert!(!Tile::Exit.is_support());
    }
}
