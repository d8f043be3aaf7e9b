/// Level data: the input contract with external level sources.
///
/// A level arrives as `{ name, description, playerStart, enemies, grid }`
/// with grid rows of cell codes (0=Empty 1=Brick 2=Solid 3=Ladder 4=Fish
/// 5=Exit). Whatever the source (the built-in campaign, a JSON file on
/// disk, or an injected generator) the data passes through `sanitize`
/// before the sim sees it: the grid is clamped/padded to 20x15 with Solid
/// and the spawn cell is forced open. Past that point the sim assumes
/// well-formed input.
///
/// ## Sources (priority order):
///   1. JSON files in the levels directory (sorted by filename)
///   2. The hand-authored levels
///   3. Deterministic procedural construction
///
/// Beyond `CAMPAIGN_LEN` the flow layer consults the injected
/// `LevelSource`; a failed generation falls back to level 1.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::domain::entity::Actor;
use crate::domain::grid::Grid;
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

pub const GRID_WIDTH: usize = 20;
pub const GRID_HEIGHT: usize = 15;

/// Levels the default campaign serves before deferring to the source.
pub const CAMPAIGN_LEN: u32 = 100;

// ══════════════════════════════════════════════════════════════
// Data contract
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub player_start: SpawnPoint,
    #[serde(default)]
    pub enemies: Vec<SpawnPoint>,
    pub grid: Vec<Vec<u8>>,
}

/// Failure surfaced by a level source.
#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(String),
    Generation(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "level io error: {e}"),
            LevelError::Parse(msg) => write!(f, "level parse error: {msg}"),
            LevelError::Generation(msg) => write!(f, "level generation failed: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {}

/// A producer of level data. The default campaign needs no external
/// service; an AI-backed source would implement this same trait.
pub trait LevelSource {
    fn generate(&self, theme: &str) -> Result<LevelData, LevelError>;
}

// ══════════════════════════════════════════════════════════════
// Sanitizing
// ══════════════════════════════════════════════════════════════

/// Normalize untrusted level data into the fixed-size form the sim
/// assumes: exact 20x15 grid (Solid padding), in-bounds spawn coords,
/// and an open spawn cell.
pub fn sanitize(mut level: LevelData) -> LevelData {
    let solid = Tile::Solid.code();

    level.grid.truncate(GRID_HEIGHT);
    for row in &mut level.grid {
        row.truncate(GRID_WIDTH);
        while row.len() < GRID_WIDTH {
            row.push(solid);
        }
    }
    while level.grid.len() < GRID_HEIGHT {
        level.grid.push(vec![solid; GRID_WIDTH]);
    }

    level.player_start.x = level.player_start.x.clamp(0, GRID_WIDTH as i32 - 1);
    level.player_start.y = level.player_start.y.clamp(0, GRID_HEIGHT as i32 - 1);
    let sx = level.player_start.x as usize;
    let sy = level.player_start.y as usize;
    let spawn_cell = Tile::from_code(level.grid[sy][sx]);
    if spawn_cell == Tile::Solid || spawn_cell == Tile::Brick {
        level.grid[sy][sx] = Tile::Empty.code();
    }

    level.enemies.retain(|e| {
        e.x >= 0 && e.x < GRID_WIDTH as i32 && e.y >= 0 && e.y < GRID_HEIGHT as i32
    });

    level
}

// ══════════════════════════════════════════════════════════════
// Installing into the world
// ══════════════════════════════════════════════════════════════

/// Load sanitized level data into the world and enter Playing. Score and
/// tuning survive; everything level-local is rebuilt from scratch.
pub fn load_level(world: &mut WorldState, data: LevelData, number: u32) {
    let data = sanitize(data);

    let cells = data.grid.iter()
        .map(|row| row.iter().map(|&c| Tile::from_code(c)).collect())
        .collect();
    world.grid = Grid::new(cells);

    world.player = Actor::player(data.player_start.x, data.player_start.y);
    world.hounds = data.enemies.iter().enumerate()
        .map(|(i, e)| Actor::hound(i, e.x, e.y))
        .collect();

    world.level_number = number;
    world.level_name = data.name;
    world.level_description = data.description;
    world.tick = 0;
    world.prev_input = Default::default();
    world.phase = Phase::Playing;
}

// ══════════════════════════════════════════════════════════════
// Campaign
// ══════════════════════════════════════════════════════════════

/// The default campaign: custom JSON levels first, then the hand-authored
/// pair, then deterministic procedural construction for every later index.
pub struct Campaign {
    custom: Vec<LevelData>,
}

impl Campaign {
    pub fn new(levels_dir: &Path) -> Self {
        Campaign { custom: load_directory(levels_dir) }
    }

    #[cfg(test)]
    fn empty() -> Self {
        Campaign { custom: vec![] }
    }

    pub fn level(&self, number: u32) -> LevelData {
        let idx = number.saturating_sub(1) as usize;
        if let Some(custom) = self.custom.get(idx) {
            custom.clone()
        } else if let Some(manual) = manual_level(idx) {
            manual
        } else {
            procedural_level(idx)
        }
    }
}

/// Read every `.json` level file in the directory, sorted by filename.
/// Unreadable or malformed files are warned about and skipped.
fn load_directory(dir: &Path) -> Vec<LevelData> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    let mut paths: Vec<_> = entries.flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |x| x == "json"))
        .collect();
    paths.sort();

    let mut levels = vec![];
    for path in paths {
        match parse_level_file(&path) {
            Ok(level) => levels.push(level),
            Err(e) => eprintln!("Warning: skipping {}: {e}", path.display()),
        }
    }
    levels
}

fn parse_level_file(path: &Path) -> Result<LevelData, LevelError> {
    let text = std::fs::read_to_string(path).map_err(LevelError::Io)?;
    serde_json::from_str(&text).map_err(|e| LevelError::Parse(e.to_string()))
}

// ── Hand-authored levels ──

fn manual_level(idx: usize) -> Option<LevelData> {
    match idx {
        0 => Some(make_level(
            "Classic Start",
            "The original trial. Collect every fish to reveal the way out.",
            (1, 13),
            &[(18, 13)],
            &[
                "====================",
                "=                  =",
                "=$   H         H  $=",
                "=####H#########H###=",
                "=    H         H   =",
                "=    H         H   =",
                "=$ #####H##H##### $=",
                "=##     H  H     ##=",
                "=       H  H       =",
                "=######H####H######=",
                "=      H    H      =",
                "= $    H    H    $ =",
                "=########HH########=",
                "=        HH        =",
                "=##################=",
            ],
        )),
        1 => Some(make_level(
            "Ladders of Lore",
            "Don't get trapped in the depths. Use your claws if you must.",
            (2, 2),
            &[(17, 13), (10, 7)],
            &[
                "====================",
                "=                  =",
                "=  $ H    $   H  $ =",
                "=####H########H####=",
                "=    H        H    =",
                "= $  H  $$$   H  $ =",
                "=####H########H####=",
                "=    H   H    H    =",
                "= $      H       $ =",
                "=######H####H######=",
                "=      H    H      =",
                "=  $   H    H   $  =",
                "=########HH########=",
                "=        HH        =",
                "=##################=",
            ],
        )),
        _ => None,
    }
}

fn make_level(
    name: &str,
    description: &str,
    player_start: (i32, i32),
    enemies: &[(i32, i32)],
    rows: &[&str],
) -> LevelData {
    let grid = rows.iter()
        .map(|row| row.chars().map(code_for_char).collect())
        .collect();
    LevelData {
        name: name.to_string(),
        description: description.to_string(),
        player_start: SpawnPoint { x: player_start.0, y: player_start.1 },
        enemies: enemies.iter().map(|&(x, y)| SpawnPoint { x, y }).collect(),
        grid,
    }
}

fn code_for_char(ch: char) -> u8 {
    let tile = match ch {
        '#' => Tile::Brick,
        '=' => Tile::Solid,
        'H' => Tile::Ladder,
        '$' => Tile::Fish,
        'X' => Tile::Exit,
        _ => Tile::Empty,
    };
    tile.code()
}

// ── Procedural construction ──

/// Deterministic sin-seeded level builder: same index, same level, no RNG
/// state to carry around.
pub fn procedural_level(index: usize) -> LevelData {
    let seed = (index as f64 + 1.0) * 777.77;
    let mut grid = vec![vec![Tile::Empty.code(); GRID_WIDTH]; GRID_HEIGHT];

    let solid = Tile::Solid.code();
    for x in 0..GRID_WIDTH {
        grid[0][x] = solid;
        grid[GRID_HEIGHT - 1][x] = solid;
    }
    for row in grid.iter_mut() {
        row[0] = solid;
        row[GRID_WIDTH - 1] = solid;
    }

    // Brick floors every third row, gapped by the seed wave.
    let mut y = 3;
    while y < GRID_HEIGHT - 1 {
        for x in 1..GRID_WIDTH - 1 {
            if (seed + y as f64 * 2.1 + x as f64 * 0.9).sin().abs() > 0.35 {
                grid[y][x] = Tile::Brick.code();
            }
        }
        y += 3;
    }

    // Full-height ladders, jittered every fourth column.
    let mut x = 2;
    while x < GRID_WIDTH - 2 {
        let lx = x + ((seed * x as f64).sin().abs() * 2.0) as usize;
        if lx < GRID_WIDTH - 1 {
            for row in grid.iter_mut().take(GRID_HEIGHT - 1).skip(1) {
                row[lx] = Tile::Ladder.code();
            }
        }
        x += 4;
    }

    // Fish on empty cells, up to a bounded number of probes.
    let fish_target = 10 + index % 5;
    let mut placed = 0;
    let mut probe = 0;
    while probe < 100 && placed < fish_target {
        let k = seed * (probe as f64 + 1.0);
        let fx = 1 + (k.sin().abs() * (GRID_WIDTH - 2) as f64) as usize;
        let fy = 1 + (k.cos().abs() * (GRID_HEIGHT - 2) as f64) as usize;
        if grid[fy][fx] == Tile::Empty.code() {
            grid[fy][fx] = Tile::Fish.code();
            placed += 1;
        }
        probe += 1;
    }

    // Hounds along the bottom, spaced leftward from the right wall.
    let hound_count = 1 + index / 15;
    let mut enemies = vec![];
    for i in 0..hound_count {
        let ex = match (GRID_WIDTH - 2).checked_sub(i * 2) {
            Some(x) if x > 0 => x,
            _ => break,
        };
        let ey = GRID_HEIGHT - 2;
        grid[ey][ex] = Tile::Empty.code();
        enemies.push(SpawnPoint { x: ex as i32, y: ey as i32 });
    }

    LevelData {
        name: format!("Purr-ilous Level {}", index + 1),
        description: format!("A procedurally woven maze, iteration {}. Find every fish!", index + 1),
        player_start: SpawnPoint { x: 1, y: GRID_HEIGHT as i32 - 2 },
        enemies,
        grid,
    }
}

// ── Default injected source ──

/// Default generator behind the source seam: the theme text hashes to a
/// procedural index, so the same theme always yields the same level.
pub struct ProceduralSource;

impl LevelSource for ProceduralSource {
    fn generate(&self, theme: &str) -> Result<LevelData, LevelError> {
        if theme.trim().is_empty() {
            return Err(LevelError::Generation("empty theme".into()));
        }
        let hash = theme.bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        Ok(procedural_level(CAMPAIGN_LEN as usize + hash % 100_000))
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
