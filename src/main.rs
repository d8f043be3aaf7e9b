/// Entry point and game loop.
///
/// The loop owns the clock: it samples input, calls the simulation step at
/// a fixed cadence while the phase is Playing, and routes meta input
/// (menu, retry, next level) between phases. The sim itself never touches
/// the terminal or the timer.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::{self, Campaign, LevelSource, ProceduralSource};
use sim::step;
use sim::world::{Phase, WorldState};
use ui::input::Keyboard;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(4);

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RETRY: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

fn main() {
    let config = GameConfig::load();
    let campaign = Campaign::new(&config.levels_dir);
    let generator = ProceduralSource;

    let mut world = WorldState::new(config.tuning);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &campaign, &generator);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Lode Purrer!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    campaign: &Campaign,
    generator: &dyn LevelSource,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = Keyboard::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(world.tuning.tick_rate_ms);

    loop {
        kb.poll_events();
        if kb.quit_requested() {
            break;
        }
        if handle_meta(world, &kb, campaign, generator) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            if world.phase == Phase::Playing {
                let events = step::step(world, kb.frame());
                apply_messages(world, &events);
            } else {
                world.anim_tick = world.anim_tick.wrapping_add(1);
            }

            if world.message_timer > 0 {
                world.message_timer -= 1;
                if world.message_timer == 0 {
                    world.message.clear();
                }
            }
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Level flow ──

/// Enter the level with the given number. Campaign levels come straight
/// from the table; past its end the injected source is asked, and on
/// failure the run falls back to the first level rather than stranding.
fn start_level(
    world: &mut WorldState,
    campaign: &Campaign,
    generator: &dyn LevelSource,
    number: u32,
) {
    world.phase = Phase::Loading;

    let (data, number) = if number <= level::CAMPAIGN_LEN {
        (campaign.level(number), number)
    } else {
        let theme = format!("Abstract Theme {number}");
        match generator.generate(&theme) {
            Ok(data) => (data, number),
            Err(_) => {
                world.set_message("The level source went quiet. Starting over!", 120);
                (campaign.level(1), 1)
            }
        }
    };

    level::load_level(world, data, number);
    let banner = if world.level_description.is_empty() {
        world.level_name.clone()
    } else {
        format!("{}: {}", world.level_name, world.level_description)
    };
    world.set_message(&banner, 100);
}

fn apply_messages(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::AllFishCollected => {
                world.set_message("All fish! Escape through the exit!", 120);
            }
            GameEvent::LevelCleared => {
                world.set_message("Level cleared!", 120);
            }
            GameEvent::PlayerCaught { .. } => {
                world.set_message("The hounds got you.", 120);
            }
            _ => {}
        }
    }
}

// ── Meta input per phase ──

fn handle_meta(
    world: &mut WorldState,
    kb: &Keyboard,
    campaign: &Campaign,
    generator: &dyn LevelSource,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.was_pressed(KeyCode::Esc);

    match world.phase {
        Phase::Menu => {
            if confirm {
                world.score = 0;
                start_level(world, campaign, generator, 1);
            } else if esc || kb.any_pressed(KEYS_QUIT) {
                return true;
            }
        }

        Phase::Playing => {
            if kb.any_pressed(KEYS_RETRY) {
                start_level(world, campaign, generator, world.level_number);
            } else if esc {
                world.phase = Phase::Menu;
            }
        }

        Phase::Victory => {
            if confirm {
                let next = world.level_number + 1;
                start_level(world, campaign, generator, next);
            } else if esc {
                world.phase = Phase::Menu;
            }
        }

        Phase::Defeat => {
            if confirm || kb.any_pressed(KEYS_RETRY) {
                start_level(world, campaign, generator, world.level_number);
            } else if esc {
                world.phase = Phase::Menu;
            }
        }

        Phase::Loading => {}
    }

    false
}
