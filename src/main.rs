//! Racing Line headless demo
//!
//! Generates a track, fills the grid with AI drivers and runs the race on a
//! fixed timestep until everyone finishes or the time limit is hit.
//!
//! Usage: `racing-line [settings.json]`

use std::path::Path;

use racing_line::consts::SIM_DT;
use racing_line::race::{ClockSource, KinematicCar, ManualClock, RaceSession, grid_slot};
use racing_line::renderer::{MeshTable, VertexMeshBuilder};
use racing_line::track::generate_with_meshes;
use racing_line::RaceSettings;

/// Frame time the headless clock advances by
const FRAME_DT: f64 = 1.0 / 60.0;

fn main() {
    env_logger::init();
    log::info!("Racing Line (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => RaceSettings::load(Path::new(&path)),
        None => RaceSettings::default(),
    };
    let difficulties = match settings.difficulties() {
        Ok(d) => d,
        Err(e) => {
            log::error!("Bad driver list: {}", e);
            std::process::exit(2);
        }
    };

    let mut meshes = VertexMeshBuilder::new(MeshTable::default());
    let track = generate_with_meshes(&settings.track_params(), settings.track_seed, &mut meshes);
    let mut session = RaceSession::new(track, settings.laps, settings.race_seed);

    for (slot, difficulty) in difficulties.into_iter().enumerate() {
        let (pos, dir) = grid_slot(session.track(), slot);
        session.add_ai_driver(KinematicCar::new(pos, dir), difficulty);
    }

    let mut clock = ManualClock::default();
    let max_ticks = (settings.time_limit / SIM_DT) as u64;
    session.pump(&mut clock);
    while !session.all_finished() && session.time_ticks() < max_ticks {
        clock.advance(FRAME_DT);
        session.pump(&mut clock);
    }

    let elapsed = clock.now_secs();
    println!(
        "Track {} ({:.0}m) after {:.1}s:",
        session.track().seed,
        session.track().total_length,
        elapsed
    );
    for (place, id) in session.standings().into_iter().enumerate() {
        let entry = &session.entries()[id];
        let driver = entry
            .driver
            .as_ref()
            .map(|d| d.difficulty().as_str())
            .unwrap_or("Human");
        let status = match entry.finished_at {
            Some(tick) => format!("finished {:.2}s", tick as f32 * SIM_DT),
            None => format!(
                "lap {} ({:.0}%)",
                entry.laps_completed + 1,
                entry.progress * 100.0
            ),
        };
        println!("  {}. car {} [{}] {}", place + 1, id, driver, status);
    }

    session.finish(&mut meshes);
}
