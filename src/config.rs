/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Every key falls back to its default individually, so a partial file
/// only overrides what it names.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub levels_dir: PathBuf,
}

/// Simulation tuning constants. A copy lives inside `WorldState` so the
/// sim never reads ambient configuration mid-tick.
///
/// Speeds are in cells per tick; timers are in ticks.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tick_rate_ms: u64,
    pub player_speed: f32,
    pub hound_speed: f32,
    /// Hound speed multiplier applied once per ten levels.
    pub hound_growth: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub terminal_velocity: f32,
    pub dig_ticks: u32,
    pub puddle_ticks: u32,
    /// Speed factor for a hound standing in an active puddle.
    pub puddle_slow: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            tick_rate_ms: 16,
            player_speed: 0.12,
            hound_speed: 0.05,
            hound_growth: 1.1,
            gravity: 0.008,
            jump_force: -0.15,
            terminal_velocity: 0.25,
            dig_ticks: 250,
            puddle_ticks: 400,
            puddle_slow: 0.4,
        }
    }
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: Tuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
}

fn default_levels_dir() -> String {
    "levels".into()
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { levels_dir: default_levels_dir() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            tuning: toml_cfg.tuning,
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
