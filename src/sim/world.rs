/// WorldState: the complete snapshot of a running game.
///
/// The renderer reads it directly; `sim::step` is the only writer while
/// the phase is Playing. The grid (terrain + overlays) and the actors are
/// owned here exclusively; nothing mutates them between ticks.

use crate::config::Tuning;
use crate::domain::entity::{Actor, InputFrame};
use crate::domain::grid::Grid;

/// Only `Playing` advances the simulation. `Loading` exists while level
/// data is being produced by an external source; every other state is
/// inert and driven by the flow layer in `main`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Loading,
    Playing,
    Victory,
    Defeat,
}

pub struct WorldState {
    // ── Simulation ──
    pub grid: Grid,
    pub player: Actor,
    pub hounds: Vec<Actor>,

    pub phase: Phase,
    pub score: u32,
    pub level_number: u32,
    pub tick: u64,

    /// Input as sampled last tick, for edge-trigger detection.
    pub prev_input: InputFrame,

    pub tuning: Tuning,

    // ── Meta / UI ──
    pub level_name: String,
    pub level_description: String,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl WorldState {
    pub fn new(tuning: Tuning) -> Self {
        WorldState {
            grid: Grid::new(vec![]),
            player: Actor::player(0, 0),
            hounds: vec![],
            phase: Phase::Menu,
            score: 0,
            level_number: 1,
            tick: 0,
            prev_input: InputFrame::default(),
            tuning,
            level_name: String::new(),
            level_description: String::new(),
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    pub fn fish_remaining(&self) -> usize {
        self.grid.fish_remaining()
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
