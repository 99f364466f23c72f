//! Per-vehicle AI driver
//!
//! Decisions (target point, behavior state) are re-evaluated only when the
//! reaction delay has run out. Steering and pedals are recomputed every tick
//! toward the most recent decision.
//!
//! Progress only moves forward through the segment chain. The chain is open,
//! so after the middle of the last segment the driver heads straight for the
//! start/finish gate and picks up segment 0 again once it is through.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::difficulty::{AiError, BehaviorProfile, Difficulty};
use super::vehicle::{ControlInputs, Vehicle, VehicleSnapshot};
use crate::right_of;
use crate::track::{
    Track, TrackRng, TrackSegment, arc_length_at, is_on_surface, nearest_segment, position_at,
};

/// Look-ahead before speed/skill scaling (m)
pub const BASE_LOOK_AHEAD: f32 = 15.0;
/// Speed of a `speed_factor == 1.0` driver on a clear track (m/s)
pub const TOP_SPEED: f32 = 60.0;
/// Seconds between wander re-rolls
pub const WANDER_INTERVAL: f32 = 1.5;
/// Reaction delay of a flawless driver (s)
pub const BASE_REACTION_DELAY: f32 = 0.1;
/// Extra random delay per unit of error rate (s)
pub const REACTION_JITTER: f32 = 0.5;
/// Minimum distance ahead scanned for traffic (m)
pub const PATH_CHECK_DISTANCE: f32 = 20.0;
/// Seconds of closing speed added to the scan window
pub const PATH_CHECK_HORIZON: f32 = 1.5;
/// Below this speed an off-track car is considered stuck (m/s)
pub const RECOVERY_SPEED: f32 = 0.5;
/// Fraction of lane width to shift sideways when passing
pub const OVERTAKE_BIAS: f32 = 0.3;
/// Steering response to lateral error
pub const STEER_GAIN: f32 = 2.0;

/// Behavior state. Starts in `Racing`, never terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Racing,
    /// Passing a slower car on the open side
    Overtaking,
    /// Stuck behind traffic, holding the lane
    Defending,
    /// Stopped off track, heading back to the centerline
    Recovering,
}

impl AiState {
    /// Fraction of the driver's target speed used in this state
    pub fn speed_scale(&self) -> f32 {
        match self {
            AiState::Racing => 1.0,
            AiState::Overtaking => 1.1,
            AiState::Defending => 0.7,
            AiState::Recovering => 0.3,
        }
    }

    /// Throttle ceiling in this state
    pub fn max_throttle(&self) -> f32 {
        match self {
            AiState::Racing | AiState::Overtaking => 1.0,
            AiState::Defending => 0.8,
            AiState::Recovering => 0.5,
        }
    }
}

/// Result of scanning for traffic ahead
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCheck {
    Clear,
    Blocked {
        vehicle_id: usize,
        position: Vec3,
        /// Distance ahead along the travel direction
        gap: f32,
    },
}

impl PathCheck {
    pub fn is_blocked(&self) -> bool {
        matches!(self, PathCheck::Blocked { .. })
    }
}

/// Scan `traffic` for a car inside the window ahead; the first hit wins
pub fn check_path(
    self_id: usize,
    position: Vec3,
    forward: Vec3,
    speed: f32,
    lane_width: f32,
    traffic: &[VehicleSnapshot],
) -> PathCheck {
    let right = right_of(forward);
    for other in traffic.iter().filter(|v| v.id != self_id) {
        let rel = other.position - position;
        let gap = rel.dot(forward);
        let closing = (speed - other.speed()).max(0.0);
        let window = PATH_CHECK_DISTANCE + closing * PATH_CHECK_HORIZON;
        if gap > 0.0 && gap <= window && rel.dot(right).abs() < lane_width {
            return PathCheck::Blocked {
                vehicle_id: other.id,
                position: other.position,
                gap,
            };
        }
    }
    PathCheck::Clear
}

/// AI driver for one vehicle
#[derive(Debug, Clone)]
pub struct AiController {
    vehicle_id: usize,
    difficulty: Difficulty,
    profile: BehaviorProfile,
    state: AiState,
    target_distance: f32,
    target_position: Vec3,
    look_ahead_distance: f32,
    lateral_offset: f32,
    /// Track heading at the last decision, used while the car is too slow to have one
    heading: Vec3,
    state_timer: f32,
    reaction_delay: f32,
    wander: f32,
    wander_timer: f32,
    /// Segment the driver has committed to; `None` until the first decision
    segment: Option<usize>,
    /// Past the last segment's midpoint and bound for the finish gate
    closing: bool,
    rng: TrackRng,
    controls: ControlInputs,
}

impl AiController {
    pub fn new(vehicle_id: usize, difficulty: Difficulty, seed: u32) -> Self {
        let profile = difficulty.profile();
        Self {
            vehicle_id,
            difficulty,
            profile,
            state: AiState::Racing,
            target_distance: 0.0,
            target_position: Vec3::ZERO,
            look_ahead_distance: BASE_LOOK_AHEAD * profile.speed_factor * (0.5 + profile.skill),
            lateral_offset: 0.0,
            heading: Vec3::Z,
            state_timer: 0.0,
            reaction_delay: 0.0,
            wander: 0.0,
            wander_timer: 0.0,
            segment: None,
            closing: false,
            rng: TrackRng::new(seed),
            controls: ControlInputs::default(),
        }
    }

    /// Create from a raw difficulty level, rejecting anything outside `0..=3`
    pub fn from_level(vehicle_id: usize, level: u8, seed: u32) -> Result<Self, AiError> {
        Ok(Self::new(vehicle_id, Difficulty::try_from(level)?, seed))
    }

    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &BehaviorProfile {
        &self.profile
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn reaction_delay(&self) -> f32 {
        self.reaction_delay
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn look_ahead_distance(&self) -> f32 {
        self.look_ahead_distance
    }

    pub fn wander(&self) -> f32 {
        self.wander
    }

    /// Segment index the driver's progress is measured on
    pub fn segment(&self) -> Option<usize> {
        self.segment
    }

    /// Whether the driver is on the run from the last segment to the finish gate
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Last control inputs written to the vehicle
    pub fn controls(&self) -> ControlInputs {
        self.controls
    }

    /// Advance one simulation tick
    ///
    /// `traffic` may include the controlled vehicle itself; it is skipped by id.
    pub fn update(
        &mut self,
        track: &Track,
        vehicle: &mut dyn Vehicle,
        traffic: &[VehicleSnapshot],
        dt: f32,
    ) {
        self.state_timer += dt;
        self.reaction_delay -= dt;
        self.wander_timer -= dt;

        if self.reaction_delay <= 0.0 {
            self.decide(track, &*vehicle, traffic);
        }

        self.controls = self.drive(&*vehicle);
        vehicle.set_controls(self.controls);
    }

    fn decide(&mut self, track: &Track, vehicle: &dyn Vehicle, traffic: &[VehicleSnapshot]) {
        let pos = vehicle.position();
        let speed = vehicle.speed();
        let width = track.width();

        let index = self.locate(track, pos);
        let (progress, here_dir) = match index {
            Some(i) => {
                let seg = &track.segments[i];
                let last = i + 1 == track.segments.len();
                self.closing =
                    last && (self.closing || seg.longitudinal_offset(pos) >= seg.length / 2.0);
                (arc_length_at(track, pos, i), seg.direction)
            }
            None => {
                self.closing = false;
                (0.0, track.start_direction)
            }
        };
        self.heading = here_dir;

        if self.wander_timer <= 0.0 {
            let magnitude = (1.0 - self.profile.skill) * width / 4.0;
            self.wander = self.rng.next_range(-1.0, 1.0) * magnitude;
            self.wander_timer = WANDER_INTERVAL;
        }

        let path = check_path(self.vehicle_id, pos, here_dir, speed, width, traffic);
        let (on_surface, _) = is_on_surface(track, pos);

        let next = if speed < RECOVERY_SPEED && !on_surface {
            AiState::Recovering
        } else {
            match path {
                PathCheck::Blocked { .. } if self.profile.wants_to_overtake() => {
                    AiState::Overtaking
                }
                PathCheck::Blocked { .. } => AiState::Defending,
                PathCheck::Clear => AiState::Racing,
            }
        };
        self.set_state(next);

        self.lateral_offset = match (self.state, path) {
            (AiState::Overtaking, PathCheck::Blocked { position, .. }) => {
                let blocker_lateral = nearest_segment(track, position)
                    .map(|i| track.segments[i].lateral_offset(position))
                    .unwrap_or(0.0);
                // Pass on whichever side the blocker leaves open
                let side = if blocker_lateral > 0.0 { -1.0 } else { 1.0 };
                side * width * OVERTAKE_BIAS + self.wander
            }
            (AiState::Defending, _) => self.lateral_offset,
            (AiState::Recovering, _) => 0.0,
            _ => self.wander,
        }
        .clamp(-width / 2.0, width / 2.0);

        let raw_target = progress + self.look_ahead_distance;
        self.target_distance = if track.total_length > 0.0 {
            raw_target.rem_euclid(track.total_length)
        } else {
            0.0
        };
        self.target_position = match track.segments.last() {
            Some(_) if self.closing => finish_gate(track).0,
            // Hold the end of the chain until the finish run begins
            Some(last) if raw_target >= track.total_length => {
                last.end_position + right_of(last.direction) * self.lateral_offset
            }
            _ => {
                let (centre, dir) = position_at(track, self.target_distance);
                centre + right_of(dir) * self.lateral_offset
            }
        };

        // Sloppier drivers react later and less predictably
        let error = self.profile.error_rate;
        self.reaction_delay = BASE_REACTION_DELAY * (1.0 + error)
            + self.rng.next_float() * error * REACTION_JITTER;
    }

    /// Commit to the segment under the car, never stepping backwards
    fn locate(&mut self, track: &Track, pos: Vec3) -> Option<usize> {
        let last = track.segments.len().checked_sub(1)?;
        let mut index = match self.segment {
            Some(i) => i.min(last),
            None => nearest_segment(track, pos)?,
        };

        if index == last && self.closing {
            let (gate, reach) = finish_gate(track);
            if pos.distance(gate) < reach {
                log::debug!("AI {} through the finish gate", self.vehicle_id);
                index = 0;
                self.closing = false;
            }
        }

        while index < last {
            let here = &track.segments[index];
            let next = &track.segments[index + 1];
            if !past_end(here, pos) && !on_segment(next, pos) {
                break;
            }
            index += 1;
        }

        self.segment = Some(index);
        Some(index)
    }

    fn set_state(&mut self, next: AiState) {
        if next != self.state {
            log::debug!(
                "AI {} ({}): {:?} -> {:?} after {:.2}s",
                self.vehicle_id,
                self.difficulty.as_str(),
                self.state,
                next,
                self.state_timer
            );
            self.state = next;
            self.state_timer = 0.0;
        }
    }

    fn drive(&self, vehicle: &dyn Vehicle) -> ControlInputs {
        let pos = vehicle.position();
        let speed = vehicle.speed();

        let heading = if speed > RECOVERY_SPEED {
            vehicle.velocity().with_y(0.0).normalize_or_zero()
        } else {
            self.heading
        };
        let to_target = (self.target_position - pos).with_y(0.0).normalize_or_zero();
        let steering = to_target.dot(right_of(heading)) * STEER_GAIN;

        let target_speed = TOP_SPEED * self.profile.speed_factor * self.state.speed_scale();
        let band = target_speed * 0.25;
        let error = target_speed - speed;
        let mut throttle = (error / band).clamp(0.0, self.state.max_throttle());
        let brake = (-error / band).clamp(0.0, 1.0);

        // Target behind us: ease off while turning around
        if to_target.dot(heading) < 0.0 {
            throttle = throttle.min(0.3);
        }

        ControlInputs::new(steering, throttle, brake)
    }
}

/// Start/finish gate centre and the distance at which it counts as passed
fn finish_gate(track: &Track) -> (Vec3, f32) {
    match track.finish_checkpoint().map(|i| &track.checkpoints[i]) {
        Some(gate) => (gate.position, gate.width),
        None => (track.start_position, track.width()),
    }
}

fn past_end(seg: &TrackSegment, pos: Vec3) -> bool {
    seg.longitudinal_offset(pos) >= seg.length
}

fn on_segment(seg: &TrackSegment, pos: Vec3) -> bool {
    let along = seg.longitudinal_offset(pos);
    along >= 0.0 && along <= seg.length && seg.lateral_offset(pos).abs() <= seg.width / 2.0
}
