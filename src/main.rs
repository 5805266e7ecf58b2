//! rollpool - headless runner for the roll and pool games
//!
//! Loads the configuration, builds the configured game, and plays a scripted
//! sequence of inputs for a fixed number of frames, logging where things end up.

use std::error::Error;
use std::sync::Arc;

use rollpool::config::{AppConfig, GameKind};
use rollpool::systems::SimulationSystem;
use rollpool_core::{
    demo_pool_scene, demo_roll_scene, encode_controls, roll_parts, DozerControls, LevelTable, PoolLevel,
    PoolSession, RollControls, RollLevel, RollMode, SceneFile,
};

/// Held keys for each second of the scripted roll run
const ROLL_SCRIPT: [RollControls; 4] = [
    RollControls::FORWARD,
    RollControls::RIGHT,
    RollControls::BACKWARD,
    RollControls::LEFT,
];

fn build_roll_mode(config: &AppConfig) -> Result<RollMode, Box<dyn Error>> {
    let meshes = Arc::new(roll_parts()?);

    let table = match &config.roll.level_table {
        Some(path) => LevelTable::load(path)?,
        None => LevelTable::roll_parts(),
    };

    let file = match &config.roll.level_path {
        Some(path) => SceneFile::load(path).unwrap_or_else(|e| {
            log::warn!("Failed to load level '{}': {}. Using the demo level.", path, e);
            demo_roll_scene()
        }),
        None => demo_roll_scene(),
    };

    let level = RollLevel::from_scene(&file, &table, meshes)?;
    Ok(RollMode::new(level, config.to_roll_settings(), config.to_physics_config())
        .with_debug_lines(config.debug.collect_lines))
}

fn run_roll(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let mut sim = SimulationSystem::new(build_roll_mode(config)?);
    let frames_per_step = (1.0 / config.run.frame_dt).round().max(1.0) as u32;

    let mut collisions = 0u64;
    let mut capped = 0u32;
    for frame in 0..config.run.frames {
        let step = (frame / frames_per_step) as usize;
        sim.set_controls(ROLL_SCRIPT[step % ROLL_SCRIPT.len()]);
        if frame % frames_per_step == 0 {
            // swing the camera a little each second
            sim.mode_mut().orbit(0.1, 0.0);
        }

        let result = sim.update(config.run.frame_dt);
        collisions += u64::from(result.report.collisions);
        if !result.report.converged {
            capped += 1;
        }
        if (frame + 1) % frames_per_step == 0 {
            log::info!(
                "t={:.2}s player at ({:.3}, {:.3}, {:.3})",
                sim.elapsed(),
                result.player_position.x,
                result.player_position.y,
                result.player_position.z
            );
        }
    }

    log::info!(
        "Rolled {} frames: {} contacts, {} frames hit the iteration cap",
        sim.frames(),
        collisions,
        capped
    );
    Ok(())
}

fn run_pool(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let level = PoolLevel::from_scene(&demo_pool_scene(), config.pool.clone())?;
    let mut session = PoolSession::new(level)?;

    // one scripted remote driver circling, the local driver charging the rack
    session.on_open(1);
    let mut inbox = encode_controls(DozerControls::LEFT_FORWARD).to_vec();
    session.on_recv(1, &mut inbox)?;
    session.set_local_controls(DozerControls::LEFT_FORWARD | DozerControls::RIGHT_FORWARD);

    for _ in 0..config.run.frames {
        session.update(config.run.frame_dt.min(rollpool::systems::MAX_FRAME_DT));
    }

    let level = &session.level;
    let touched = level.balls.iter().filter(|b| b.last_to_touch.is_some()).count();
    log::info!("Pool run done: {} of {} balls were shoved", touched, level.balls.len());
    for dozer in level.dozers.values() {
        if let Some(p) = level.position_of(dozer.transform) {
            log::info!("Dozer '{}' ({:?}) at ({:.3}, {:.3})", dozer.name, dozer.team, p.x, p.y);
        }
    }
    Ok(())
}

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()))
        .init();
    log::info!("Starting rollpool");
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    let result = match config.run.game {
        GameKind::Roll => run_roll(&config),
        GameKind::Pool => run_pool(&config),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
