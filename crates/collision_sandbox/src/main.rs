//! Collision sandbox
//!
//! Spawns random bodies in a collision world, bounces them around for a
//! number of ticks and logs every collision that starts or ends.
//!
//! Usage: `collision_sandbox [config.toml|config.ron]`

mod config;
mod simulation;

use collision_engine::config::Config;
use collision_engine::foundation::logging;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SandboxConfig;
use crate::simulation::Simulation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(logging::LevelFilter::Info);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading sandbox configuration from {}", path);
            SandboxConfig::load_from_file(&path)?
        }
        None => SandboxConfig::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut sim = Simulation::spawn(&config, &mut rng)?;
    for tick in 0..config.ticks {
        let events = sim.step(config.time_step)?;
        for pair in &events.entered {
            let sides = sim
                .engine()
                .check_cached_collision(pair.first().as_str(), pair.second().as_str())
                .sides;
            log::info!("[tick {}] {} hit {} ({:?})", tick, pair.first(), pair.second(), sides);
        }
        for pair in &events.exited {
            log::debug!("[tick {}] {} left {}", tick, pair.first(), pair.second());
        }
    }

    let stats = sim.stats();
    log::info!(
        "Finished {} ticks: {} collisions started, {} ended, peak {} simultaneous contacts, {} nodes",
        stats.ticks,
        stats.entered,
        stats.exited,
        stats.peak_contacts,
        sim.engine().index().node_count()
    );
    Ok(())
}
