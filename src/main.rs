/// Entry point and host loop.
///
/// The game opens on the title screen. Each frame: drain keyboard + gamepad
/// intents, apply them, advance the simulation by the measured elapsed
/// time, turn the resulting events into sound, render.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use config::GameConfig;
use domain::entity::MoveDir;
use sim::event::GameEvent;
use sim::level::{load_level, load_levels, next_level, restart_level, LevelDescriptor};
use sim::movement::try_move_player;
use sim::step::{self, toggle_mute, toggle_pause};
use sim::title::{confirm_title, show_title};
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::{Intent, InputState};
use ui::renderer::Renderer;
use ui::sound::{Sfx, SoundEngine};

/// Longest simulated slice per frame; a stalled terminal must not
/// teleport actors across the board.
const MAX_FRAME_MS: f32 = 100.0;

fn main() {
    let config = GameConfig::load();
    logging::init(&config.log);
    match &config.source {
        Some(path) => info!(path = %path.display(), "config loaded"),
        None => info!("config defaults"),
    }
    info!(speed = ?config.speed, levels_dir = %config.levels_dir.display(), "starting");

    let levels = load_levels(&config);
    if levels.is_empty() {
        eprintln!("No levels found.");
        return;
    }

    let mut world = WorldState::new(config.speed.clone());
    if let Err(e) = load_level(&mut world, &levels, 0) {
        eprintln!("Level 1 failed to load: {e}");
        return;
    }
    show_title(&mut world);

    let mut renderer = Renderer::new();
    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new();
    if sound.is_none() {
        warn!("no audio output; sound disabled");
    }

    let result = game_loop(&mut world, &levels, &mut renderer, sound.as_ref(), &config, honor_release);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    info!(level = world.current_level + 1, "quit");
    println!();
    println!("Thanks for playing Nimbo Rush!");
}

fn game_loop(
    world: &mut WorldState,
    levels: &[LevelDescriptor],
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    honor_release: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let frame = Duration::from_millis(config.speed.frame_ms);
    let mut last = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        let mut intents: Vec<Intent> = kb.intents().to_vec();
        intents.extend(gp.intents());

        let mut events = Vec::new();
        for intent in intents {
            match intent {
                Intent::Quit => return Ok(()),
                other => events.extend(handle_intent(world, levels, other)),
            }
        }

        let now = Instant::now();
        let dt_ms = (now.duration_since(last).as_secs_f32() * 1000.0).min(MAX_FRAME_MS);
        last = now;
        events.extend(step::step(world, dt_ms));

        announce(world, &events);
        process_sound_events(sound, world, &events);
        if let Some(s) = sound {
            s.set_music(music_wanted(world));
        }

        renderer.render(world, gp.connected)?;
        std::thread::sleep(frame);
    }
}

fn handle_intent(world: &mut WorldState, levels: &[LevelDescriptor], intent: Intent) -> Vec<GameEvent> {
    if world.phase == Phase::Title {
        handle_title_intent(world, levels, intent);
        return vec![];
    }
    match intent {
        Intent::Move(dir) => return try_move_player(world, dir),
        Intent::Restart => {
            if let Err(e) = restart_level(world, levels) {
                warn!(error = %e, "restart failed");
                world.set_message("Could not reload level", 3000.0);
            }
        }
        Intent::NextLevel | Intent::Confirm => {
            if let Err(e) = next_level(world, levels) {
                warn!(error = %e, "next level failed");
                world.set_message("Could not load next level", 3000.0);
            }
        }
        Intent::TogglePause => {
            toggle_pause(world);
        }
        Intent::ToggleMute => announce_mute(world),
        Intent::Quit => {}
    }
    vec![]
}

/// Up/Down pick an entry, Enter/Space (or pad A) activates it, Esc closes
/// the controls panel.
fn handle_title_intent(world: &mut WorldState, levels: &[LevelDescriptor], intent: Intent) {
    match intent {
        Intent::Move(MoveDir::Up) => world.title.move_selection(-1),
        Intent::Move(MoveDir::Down) => world.title.move_selection(1),
        Intent::Confirm | Intent::NextLevel => match confirm_title(world, levels) {
            Ok(true) => world.set_message(&format!("Level 1: {}", world.level_name), 2000.0),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "start failed");
                world.set_message("Could not load level 1", 3000.0);
            }
        },
        Intent::TogglePause => world.title.back(),
        Intent::ToggleMute => announce_mute(world),
        Intent::Move(_) | Intent::Restart | Intent::Quit => {}
    }
}

fn announce_mute(world: &mut WorldState) {
    let muted = toggle_mute(world);
    world.set_message(if muted { "Sound off" } else { "Sound on" }, 1500.0);
}

/// Background music plays during a level unless muted.
fn music_wanted(world: &WorldState) -> bool {
    !world.muted && world.phase != Phase::Title
}

/// Status-bar text for the events worth spelling out.
fn announce(world: &mut WorldState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::ItemDeposited { filled, capacity, .. } => {
                let msg = if filled >= capacity {
                    "Bucket full! It can be pushed now".to_string()
                } else {
                    format!("Bucket {filled}/{capacity}")
                };
                world.set_message(&msg, 1500.0);
            }
            GameEvent::TriggerActivated { stones } => {
                world.set_message(&format!("{stones} stepping stone(s) growing"), 2000.0);
            }
            GameEvent::LevelComplete => world.set_message("Level complete!", 3000.0),
            GameEvent::GameOver => world.set_message("Game over", 3000.0),
            _ => {}
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, world: &WorldState, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) if !world.muted => s,
        _ => return,
    };
    for event in events {
        let effect = match event {
            GameEvent::InvalidMove { .. } => Sfx::Invalid,
            GameEvent::Moved { .. } => Sfx::Move,
            GameEvent::ItemCollected { .. } => Sfx::Collect,
            GameEvent::ItemDeposited { .. } => Sfx::Deposit,
            GameEvent::ContainerPushed { .. } => Sfx::Push,
            GameEvent::TriggerActivated { .. } => Sfx::Trigger,
            GameEvent::ContainerFallStart { .. } | GameEvent::PlayerFallStart => Sfx::Fall,
            GameEvent::LevelComplete => Sfx::LevelComplete,
            GameEvent::GameOver => Sfx::GameOver,
        };
        sfx.play(effect);
    }
}
