//! Race session
//!
//! Owns the track and every entrant for the length of a race. Per-vehicle
//! progress (last checkpoint, laps) lives here so the track stays read-only.

pub mod clock;
pub mod kinematic;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use kinematic::KinematicCar;

use std::cmp::Ordering;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::ai::{AiController, AiError, Difficulty, Vehicle, VehicleSnapshot};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::renderer::TrackMeshBuilder;
use crate::right_of;
use crate::track::{Track, advance_checkpoint, is_on_surface, nearest_segment, race_progress};

/// Distance between grid rows (m)
pub const GRID_ROW_SPACING: f32 = 8.0;

/// A vehicle the session can integrate each tick
pub trait VehicleBody: Vehicle {
    /// Advance physics by `dt`; `ground` is the road height, `None` when off track
    fn step(&mut self, dt: f32, ground: Option<f32>);
}

/// One car in the race and its progress
#[derive(Debug, Clone)]
pub struct RaceEntry<V> {
    pub vehicle: V,
    /// `None` for externally driven cars
    pub driver: Option<AiController>,
    pub last_checkpoint: usize,
    pub laps_completed: u32,
    pub segment: usize,
    /// Fraction of the current lap
    pub progress: f32,
    /// Tick on which the final lap was completed
    pub finished_at: Option<u64>,
}

impl<V> RaceEntry<V> {
    /// Gates passed on the current lap
    pub fn gates_passed(&self, checkpoint_count: usize) -> usize {
        if checkpoint_count == 0 {
            0
        } else {
            (self.last_checkpoint + 1) % checkpoint_count
        }
    }
}

/// A race on one generated track
#[derive(Debug)]
pub struct RaceSession<V> {
    track: Track,
    entries: Vec<RaceEntry<V>>,
    laps: u32,
    /// Derives an independent RNG stream for each AI driver
    driver_seeds: Pcg32,
    accumulator: f32,
    time_ticks: u64,
    last_clock: Option<f64>,
}

impl<V: VehicleBody> RaceSession<V> {
    pub fn new(track: Track, laps: u32, seed: u64) -> Self {
        log::info!(
            "Race on track {}: {} segments, {:.0}m, {} laps",
            track.seed,
            track.segment_count(),
            track.total_length,
            laps
        );
        Self {
            track,
            entries: Vec::new(),
            laps,
            driver_seeds: Pcg32::seed_from_u64(seed),
            accumulator: 0.0,
            time_ticks: 0,
            last_clock: None,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn laps(&self) -> u32 {
        self.laps
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn entries(&self) -> &[RaceEntry<V>] {
        &self.entries
    }

    pub fn entry(&self, id: usize) -> Option<&RaceEntry<V>> {
        self.entries.get(id)
    }

    pub fn vehicle_mut(&mut self, id: usize) -> Option<&mut V> {
        self.entries.get_mut(id).map(|e| &mut e.vehicle)
    }

    /// Add an externally driven car; returns its id
    pub fn add_vehicle(&mut self, vehicle: V) -> usize {
        self.push_entry(vehicle, None)
    }

    /// Add a car driven by an AI of the given difficulty
    pub fn add_ai_driver(&mut self, vehicle: V, difficulty: Difficulty) -> usize {
        let id = self.entries.len();
        let seed: u32 = self.driver_seeds.random();
        log::debug!("AI {} joins ({}, seed {})", id, difficulty.as_str(), seed);
        self.push_entry(vehicle, Some(AiController::new(id, difficulty, seed)))
    }

    /// Add an AI car from a raw difficulty level
    pub fn add_ai_level(&mut self, vehicle: V, level: u8) -> Result<usize, AiError> {
        let difficulty = Difficulty::try_from(level)?;
        Ok(self.add_ai_driver(vehicle, difficulty))
    }

    fn push_entry(&mut self, vehicle: V, driver: Option<AiController>) -> usize {
        // Everyone starts having just crossed the start/finish gate
        let last_checkpoint = self.track.finish_checkpoint().unwrap_or(0);
        self.entries.push(RaceEntry {
            vehicle,
            driver,
            last_checkpoint,
            laps_completed: 0,
            segment: 0,
            progress: 0.0,
            finished_at: None,
        });
        self.entries.len() - 1
    }

    /// Advance the race by one fixed tick
    pub fn tick(&mut self, dt: f32) {
        let snapshots: Vec<VehicleSnapshot> = self
            .entries
            .iter()
            .enumerate()
            .map(|(id, e)| VehicleSnapshot::of(id, &e.vehicle))
            .collect();

        for entry in &mut self.entries {
            if let Some(driver) = entry.driver.as_mut() {
                driver.update(&self.track, &mut entry.vehicle, &snapshots, dt);
            }
        }

        self.time_ticks += 1;
        let checkpoint_count = self.track.checkpoint_count();
        let finish = self.track.finish_checkpoint();

        for (id, entry) in self.entries.iter_mut().enumerate() {
            let (on_surface, height) = is_on_surface(&self.track, entry.vehicle.position());
            entry.vehicle.step(dt, on_surface.then_some(height));

            let pos = entry.vehicle.position();
            entry.segment = nearest_segment(&self.track, pos).unwrap_or(0);
            entry.progress = race_progress(&self.track, pos, entry.segment);

            // Finished cars keep driving but their result is final
            if entry.finished_at.is_some() {
                continue;
            }

            let next = advance_checkpoint(&self.track, pos, entry.last_checkpoint);
            if next == entry.last_checkpoint || checkpoint_count == 0 {
                continue;
            }
            entry.last_checkpoint = next;
            if Some(next) == finish {
                entry.laps_completed += 1;
                log::info!("Car {} completed lap {}", id, entry.laps_completed);
                if entry.laps_completed >= self.laps {
                    entry.finished_at = Some(self.time_ticks);
                    log::info!("Car {} finished on tick {}", id, self.time_ticks);
                }
            }
        }
    }

    /// Run as many fixed ticks as `frame_dt` covers; returns the number run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = frame_dt.min(0.1);
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Advance by however much time the clock says has passed since the last call
    pub fn pump(&mut self, clock: &mut dyn ClockSource) -> u32 {
        let now = clock.now_secs();
        let elapsed = self.last_clock.map(|last| now - last).unwrap_or(0.0);
        self.last_clock = Some(now);
        self.advance(elapsed.max(0.0) as f32)
    }

    pub fn all_finished(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.finished_at.is_some())
    }

    /// Entry ids ordered from first to last place
    pub fn standings(&self) -> Vec<usize> {
        let count = self.track.checkpoint_count();
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.entries[a], &self.entries[b]);
            match (ea.finished_at, eb.finished_at) {
                (Some(ta), Some(tb)) => return ta.cmp(&tb),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => {}
            }
            eb.laps_completed
                .cmp(&ea.laps_completed)
                .then_with(|| eb.gates_passed(count).cmp(&ea.gates_passed(count)))
                .then_with(|| {
                    eb.progress
                        .partial_cmp(&ea.progress)
                        .unwrap_or(Ordering::Equal)
                })
        });
        order
    }

    /// Tear down the race, releasing the track's segment meshes
    pub fn finish(self, builder: &mut dyn TrackMeshBuilder) -> Vec<RaceEntry<V>> {
        self.track.release_meshes(builder);
        self.entries
    }
}

/// Starting pose for a grid slot: two columns, rows behind the start line
pub fn grid_slot(track: &Track, slot: usize) -> (Vec3, Vec3) {
    let dir = track.start_direction;
    let row = (slot / 2) as f32;
    let side = if slot % 2 == 0 { -1.0 } else { 1.0 };
    let lateral = track.width() / 4.0 * side;
    let pos = track.start_position - dir * (GRID_ROW_SPACING * (row + 0.5)) + right_of(dir) * lateral;
    (pos, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ControlInputs;
    use crate::renderer::{MeshTable, VertexMeshBuilder};
    use crate::track::query::tests::straight_track;
    use crate::track::{TrackParams, generate, generate_with_meshes};

    /// Car that sits wherever the test puts it
    struct Puppet {
        pos: Vec3,
    }

    impl Vehicle for Puppet {
        fn position(&self) -> Vec3 {
            self.pos
        }
        fn velocity(&self) -> Vec3 {
            Vec3::ZERO
        }
        fn set_controls(&mut self, _controls: ControlInputs) {}
    }

    impl VehicleBody for Puppet {
        fn step(&mut self, _dt: f32, _ground: Option<f32>) {}
    }

    fn visit(session: &mut RaceSession<Puppet>, id: usize, z: f32) {
        session.vehicle_mut(id).unwrap().pos = Vec3::new(0.0, 0.0, z);
        session.tick(SIM_DT);
    }

    #[test]
    fn test_lap_counting() {
        // Gates at z = 15, 25, 35, then the start line
        let mut session = RaceSession::new(straight_track(4, 10.0, 12.0), 2, 1);
        let id = session.add_vehicle(Puppet { pos: Vec3::ZERO });
        assert_eq!(session.entry(id).unwrap().last_checkpoint, 3);

        // Jumping straight to the start gate does not count
        visit(&mut session, id, 0.0);
        assert_eq!(session.entry(id).unwrap().laps_completed, 0);

        for z in [15.0, 25.0, 35.0, 0.0] {
            visit(&mut session, id, z);
        }
        let entry = session.entry(id).unwrap();
        assert_eq!(entry.laps_completed, 1);
        assert_eq!(entry.finished_at, None);

        for z in [15.0, 25.0, 35.0, 0.0] {
            visit(&mut session, id, z);
        }
        let entry = session.entry(id).unwrap();
        assert_eq!(entry.laps_completed, 2);
        assert_eq!(entry.finished_at, Some(session.time_ticks()));
        assert!(session.all_finished());
    }

    #[test]
    fn test_no_laps_counted_after_finish() {
        let mut session = RaceSession::new(straight_track(4, 10.0, 12.0), 1, 1);
        let id = session.add_vehicle(Puppet { pos: Vec3::ZERO });
        for z in [15.0, 25.0, 35.0, 0.0] {
            visit(&mut session, id, z);
        }
        let finished_at = session.entry(id).unwrap().finished_at;
        assert!(finished_at.is_some());

        // A cool-down lap changes nothing
        for z in [15.0, 25.0, 35.0, 0.0] {
            visit(&mut session, id, z);
        }
        let entry = session.entry(id).unwrap();
        assert_eq!(entry.laps_completed, 1);
        assert_eq!(entry.finished_at, finished_at);
        assert_eq!(entry.last_checkpoint, 3);
    }

    #[test]
    fn test_skipped_gate_blocks_lap() {
        // Gates at z = 30, 50, 70, then the start line
        let mut session = RaceSession::new(straight_track(4, 20.0, 12.0), 1, 1);
        let id = session.add_vehicle(Puppet { pos: Vec3::ZERO });
        for z in [30.0, 70.0, 0.0] {
            visit(&mut session, id, z);
        }
        let entry = session.entry(id).unwrap();
        assert_eq!(entry.laps_completed, 0);
        assert_eq!(entry.last_checkpoint, 0);
    }

    #[test]
    fn test_standings_order() {
        let mut session = RaceSession::new(straight_track(4, 10.0, 12.0), 3, 1);
        let slow = session.add_vehicle(Puppet { pos: Vec3::ZERO });
        let fast = session.add_vehicle(Puppet { pos: Vec3::ZERO });
        visit(&mut session, fast, 15.0);
        visit(&mut session, fast, 25.0);
        visit(&mut session, slow, 15.0);
        assert_eq!(session.standings(), vec![fast, slow]);
    }

    #[test]
    fn test_invalid_ai_level() {
        let mut session = RaceSession::new(straight_track(2, 10.0, 12.0), 1, 1);
        let result = session.add_ai_level(Puppet { pos: Vec3::ZERO }, 7);
        assert_eq!(result, Err(AiError::InvalidDifficulty(7)));
        assert!(session.entries().is_empty());
    }

    #[test]
    fn test_substep_cap() {
        let mut session: RaceSession<Puppet> =
            RaceSession::new(straight_track(2, 10.0, 12.0), 1, 1);
        // 0.1s clamp covers 12 ticks, but at most MAX_SUBSTEPS run
        assert_eq!(session.advance(1.0), MAX_SUBSTEPS);
        assert_eq!(session.time_ticks(), MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_pump_uses_clock() {
        let mut session: RaceSession<Puppet> =
            RaceSession::new(straight_track(2, 10.0, 12.0), 1, 1);
        let mut clock = ManualClock::default();
        assert_eq!(session.pump(&mut clock), 0);
        clock.advance(0.055);
        assert_eq!(session.pump(&mut clock), 6);
    }

    #[test]
    fn test_ai_field_drives_forward() {
        let mut builder = VertexMeshBuilder::new(MeshTable::default());
        let track = generate_with_meshes(&TrackParams::sprint(), 2024, &mut builder);
        let mut session = RaceSession::new(track, 1, 77);
        for (slot, difficulty) in Difficulty::ALL.iter().enumerate() {
            let (pos, dir) = grid_slot(session.track(), slot);
            session.add_ai_driver(KinematicCar::new(pos, dir), *difficulty);
        }

        for _ in 0..(120 * 4) {
            session.tick(SIM_DT);
        }

        let start = session.track().start_position;
        for entry in session.entries() {
            let pos = entry.vehicle.position();
            assert!(pos.is_finite());
            assert!(pos.distance(start) > 20.0);
            assert!(entry.progress > 0.0);
        }
        assert_eq!(session.standings().len(), 4);

        let entries = session.finish(&mut builder);
        assert_eq!(entries.len(), 4);
        assert_eq!(builder.table().live_count(), 0);
    }

    #[test]
    fn test_ai_completes_lap_on_generated_track() {
        // Default layout: the chain ends well over a kilometre from the start line
        let track = generate(&TrackParams::default(), 1);
        let mut session = RaceSession::new(track, 1, 9);
        let (pos, dir) = grid_slot(session.track(), 0);
        let id = session.add_ai_driver(KinematicCar::new(pos, dir), Difficulty::Expert);

        let max_ticks = (300.0 / SIM_DT) as u64;
        while !session.all_finished() && session.time_ticks() < max_ticks {
            session.tick(SIM_DT);
        }

        let entry = session.entry(id).unwrap();
        assert_eq!(entry.laps_completed, 1);
        assert!(entry.finished_at.is_some());
    }

    #[test]
    fn test_grid_slots_behind_start() {
        let track = straight_track(2, 10.0, 12.0);
        let (a, _) = grid_slot(&track, 0);
        let (b, _) = grid_slot(&track, 1);
        let (c, _) = grid_slot(&track, 2);
        assert!(a.z < 0.0 && b.z < 0.0);
        assert_eq!(a.z, b.z);
        assert!(a.x < 0.0 && b.x > 0.0);
        assert!(c.z < a.z);
    }
}
