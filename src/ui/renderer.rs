/// Presentation layer: draws the world snapshot with crossterm.
///
/// One game cell is two terminal columns, so wide emoji sprites line up
/// with the grid. The frame is rebuilt and queued into a BufWriter on
/// every call; at 20x15 cells a full redraw is cheap enough that no
/// diffing layer is needed. The screen is cleared only on phase changes.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Actor, ActorKind};
use crate::domain::tile::Tile;
use crate::sim::world::{Phase, WorldState};

/// Terminal columns per game cell.
const CELL_W: usize = 2;

const HUD_ROW: u16 = 0;
const MAP_ROW: u16 = 2;

const BG: Color = Color::Rgb { r: 18, g: 18, b: 28 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BRICK_FG: Color = Color::Rgb { r: 200, g: 120, b: 50 };
const BRICK_BG: Color = Color::Rgb { r: 110, g: 60, b: 20 };
const SOLID_FG: Color = Color::Rgb { r: 120, g: 120, b: 120 };
const SOLID_BG: Color = Color::Rgb { r: 70, g: 70, b: 70 };
const LADDER_FG: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const PUDDLE_FG: Color = Color::Rgb { r: 250, g: 204, b: 21 };
const DIG_FG: Color = Color::DarkYellow;
const DIG_BG: Color = Color::Rgb { r: 35, g: 25, b: 0 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 80, b: 80 };
const DIM: Color = Color::DarkGrey;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BG),
            Clear(ClearType::All)
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        if self.last_phase != Some(world.phase) {
            queue!(self.writer, SetBackgroundColor(BG), Clear(ClearType::All))?;
            self.last_phase = Some(world.phase);
        }

        match world.phase {
            Phase::Menu => self.draw_menu(world)?,
            Phase::Loading => self.draw_loading(world)?,
            Phase::Playing | Phase::Victory | Phase::Defeat => {
                self.draw_game(world)?;
                match world.phase {
                    Phase::Victory => self.draw_victory_box(world)?,
                    Phase::Defeat => self.draw_defeat_box(world)?,
                    _ => {}
                }
            }
        }

        self.writer.flush()
    }

    fn put_line(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color) -> io::Result<()> {
        queue!(
            self.writer,
            MoveTo(x, y),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(text)
        )
    }

    // ── Game view ──

    fn draw_game(&mut self, w: &WorldState) -> io::Result<()> {
        let hud = format!(
            " Lv.{:<3} {:<22} Score:{:<7} Fish:{:<3}{}",
            w.level_number,
            w.level_name,
            w.score,
            w.fish_remaining(),
            if w.grid.exit_revealed() { "  ESCAPE!" } else { "         " },
        );
        self.put_line(0, HUD_ROW, &hud, Color::White, HUD_BG)?;

        let pcol = w.player.col();
        let prow = w.player.row();

        for row in 0..w.grid.height() as i32 {
            queue!(self.writer, MoveTo(0, MAP_ROW + row as u16))?;
            for col in 0..w.grid.width() as i32 {
                self.draw_cell(w, col, row, pcol, prow)?;
            }
        }

        let msg_row = MAP_ROW + w.grid.height() as u16 + 1;
        let msg = if w.message.is_empty() {
            format!("{:<60}", "")
        } else {
            format!(" ◈ {:<56}", w.message)
        };
        let msg_fg = if w.message.is_empty() { Color::White } else { Color::Black };
        let msg_bg = if w.message.is_empty() { BG } else { GOLD };
        self.put_line(0, msg_row, &msg, msg_fg, msg_bg)?;

        self.put_line(
            0,
            msg_row + 2,
            " ←→↑↓ Move   SPACE Jump x2   Z/X Dig   S Claw Up   P Puddle   R Retry   ESC Menu",
            DIM,
            BG,
        )
    }

    fn draw_cell(&mut self, w: &WorldState, col: i32, row: i32, pcol: i32, prow: i32) -> io::Result<()> {
        // The player vanishes under the hound on defeat.
        let show_player = w.phase != Phase::Defeat;
        if show_player && col == pcol && row == prow {
            let sprite = sprite_for(&w.player);
            return queue!(
                self.writer,
                SetForegroundColor(Color::White),
                SetBackgroundColor(BG),
                Print(sprite)
            );
        }

        for hound in &w.hounds {
            if hound.col() == col && hound.row() == row {
                let sprite = sprite_for(hound);
                return queue!(
                    self.writer,
                    SetForegroundColor(Color::White),
                    SetBackgroundColor(BG),
                    Print(sprite)
                );
            }
        }

        // Open dig: countdown in whole seconds until the brick returns,
        // flushing red as the hole is about to seal.
        if let Some(remaining) = w.grid.dig_remaining(col, row) {
            let secs = (remaining as u64 * w.tuning.tick_rate_ms).div_ceil(1000);
            let closing = w.grid.dig_fraction(col, row).unwrap_or(0.0) < 0.25;
            let fg = if closing { RED } else { DIG_FG };
            return queue!(
                self.writer,
                SetForegroundColor(fg),
                SetBackgroundColor(DIG_BG),
                Print(format!("{:>2}", secs.min(99)))
            );
        }

        let puddle = w.grid.puddle_active(col, row);
        let shimmer = (w.tick / 8) % 2 == 0;
        let (text, fg, bg) = match w.grid.cell(col, row) {
            Tile::Empty if puddle => (if shimmer { "~~" } else { "≈≈" }, PUDDLE_FG, BG),
            Tile::Empty => ("  ", Color::White, BG),
            Tile::Brick => ("░░", BRICK_FG, BRICK_BG),
            Tile::Solid => ("██", SOLID_FG, SOLID_BG),
            Tile::Ladder if puddle => ("╠╣", LADDER_FG, Color::Rgb { r: 80, g: 65, b: 0 }),
            Tile::Ladder => ("╠╣", LADDER_FG, BG),
            Tile::Fish => {
                return queue!(
                    self.writer,
                    SetForegroundColor(Color::White),
                    SetBackgroundColor(BG),
                    Print("🐟")
                );
            }
            Tile::Exit => {
                return queue!(
                    self.writer,
                    SetForegroundColor(Color::White),
                    SetBackgroundColor(BG),
                    Print("🏁")
                );
            }
        };
        queue!(
            self.writer,
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(text)
        )
    }

    // ── Overlays ──

    fn draw_victory_box(&mut self, w: &WorldState) -> io::Result<()> {
        let top = MAP_ROW + 5;
        let x = ((w.grid.width() * CELL_W).saturating_sub(34) / 2) as u16;
        let bg = Color::Rgb { r: 10, g: 50, b: 10 };
        self.put_line(x, top, "╔════════════════════════════════╗", GOLD, bg)?;
        self.put_line(x, top + 1, "║       ★ MEOW-VELOUS! ★        ║", GOLD, bg)?;
        self.put_line(x, top + 2, "║  ENTER: Next Level  ESC: Menu  ║", GREEN, bg)?;
        self.put_line(x, top + 3, "╚════════════════════════════════╝", GOLD, bg)
    }

    fn draw_defeat_box(&mut self, w: &WorldState) -> io::Result<()> {
        let top = MAP_ROW + 5;
        let x = ((w.grid.width() * CELL_W).saturating_sub(34) / 2) as u16;
        let bg = Color::Rgb { r: 60, g: 10, b: 10 };
        self.put_line(x, top, "╔════════════════════════════════╗", RED, bg)?;
        self.put_line(x, top + 1, "║          ✕ CAUGHT! ✕           ║", RED, bg)?;
        self.put_line(x, top + 2, "║  ENTER: Retry      ESC: Menu   ║", Color::White, bg)?;
        self.put_line(x, top + 3, "╚════════════════════════════════╝", RED, bg)
    }

    // ── Static screens ──

    fn draw_menu(&mut self, w: &WorldState) -> io::Result<()> {
        let title = [
            r"  _            _        ___                          ",
            r" | |   ___  __| |___   | _ \_  _ _ _ _ _ ___ _ _     ",
            r" | |__/ _ \/ _` / -_)  |  _/ || | '_| '_/ -_) '_|    ",
            r" |____\___/\__,_\___|  |_|  \_,_|_| |_| \___|_|      ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.put_line(2, 2 + i as u16, line, GOLD, BG)?;
        }

        self.put_line(6, 7, "◈◈  Snag the fish. Dodge the hounds. Leave puddles.  ◈◈", GREEN, BG)?;

        let blink = (w.anim_tick / 16) % 2 == 0;
        if blink {
            self.put_line(8, 10, "▸▸▸ ENTER: Start Hunt ◂◂◂", GREEN, BG)?;
        } else {
            self.put_line(8, 10, "                         ", GREEN, BG)?;
        }
        self.put_line(8, 12, "  Q / ESC   Quit", Color::White, BG)?;

        let help = [
            "Controls",
            "  ←→        Run            ↑↓  Climb ladders",
            "  SPACE     Jump (twice mid-air!)",
            "  Z / X     Dig left / right",
            "  S         Claw through the brick overhead",
            "  P         Puddle (slows hounds crossing it)",
        ];
        for (i, line) in help.iter().enumerate() {
            let fg = if i == 0 { GOLD } else { Color::White };
            self.put_line(8, 15 + i as u16, line, fg, BG)?;
        }

        if !w.message.is_empty() {
            let msg = format!(" ◈ {} ", w.message);
            self.put_line(2, 22, &msg, Color::Black, GOLD)?;
        }
        Ok(())
    }

    fn draw_loading(&mut self, w: &WorldState) -> io::Result<()> {
        let dots = match (w.anim_tick / 8) % 4 {
            0 => "   ",
            1 => ".  ",
            2 => ".. ",
            _ => "...",
        };
        let line = format!("  Summoning new challenges{dots}   ");
        self.put_line(6, 8, &line, GOLD, BG)
    }
}

fn sprite_for(actor: &Actor) -> &'static str {
    match actor.kind {
        ActorKind::Player => "🐈",
        ActorKind::Hound => "🐕",
    }
}
