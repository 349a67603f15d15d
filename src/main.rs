//! Bounce Sim entry point
//!
//! Headless driver: builds a world from a JSON settings file (or defaults),
//! plays a scripted session at 60 Hz and prints the final bodies as JSON.
//! A real host would feed pointer and key events into the same commands.

use std::process::ExitCode;

use bounce_sim::consts::FRAME_DT_MS;
use bounce_sim::{SimConfig, SimResult, World};
use glam::DVec2;

/// Frames per scripted phase (5 seconds each)
const PHASE_FRAMES: u32 = 300;

/// Host commands, in the order the session issues them
#[derive(Debug, Clone, Copy)]
enum Command {
    /// Let the bodies fly
    Run,
    /// Point at the arena centre
    TargetCentre,
    /// Release the target
    ClearTarget,
    /// New placement, same count
    Reset,
}

const SCRIPT: [Command; 4] = [
    Command::Run,
    Command::TargetCentre,
    Command::ClearTarget,
    Command::Reset,
];

fn run() -> SimResult<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => {
            log::info!("No settings file given, using defaults");
            SimConfig::default()
        }
    };

    let mut world = World::from_config(&config)?;
    let centre = DVec2::new(config.arena.width / 2.0, config.arena.height / 2.0);

    let mut last = None;
    for command in SCRIPT {
        match command {
            Command::Run => {}
            Command::TargetCentre => {
                world.set_target(centre);
                if let Some(body) = world.body_at(centre) {
                    log::info!("Under the pointer: {body}");
                }
            }
            Command::ClearTarget => world.clear_target(),
            Command::Reset => world.reset()?,
        }

        let mut collisions = 0;
        for _ in 0..PHASE_FRAMES {
            let result = world.tick(FRAME_DT_MS)?;
            collisions += result.collisions.len();
            last = Some(result);
        }
        log::info!(
            "{:?}: {} collisions over {} frames ({:?})",
            command,
            collisions,
            PHASE_FRAMES,
            world.motion_mode()
        );
    }

    if let Some(result) = last {
        match serde_json::to_string_pretty(&result.bodies) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode snapshot: {e}"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Bounce Sim (native) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("bounce-sim: {e}");
            ExitCode::FAILURE
        }
    }
}
