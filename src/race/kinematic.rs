//! Point-mass car used by the headless demo and tests
//!
//! Not a vehicle dynamics model: speed responds linearly to the pedals and
//! heading turns at a rate proportional to steering.

use glam::Vec3;

use crate::ai::{ControlInputs, Vehicle};
use crate::heading_to_direction;

use super::VehicleBody;

/// Forward acceleration at full throttle (m/s²)
pub const ACCELERATION: f32 = 12.0;
/// Deceleration at full brake (m/s²)
pub const BRAKING: f32 = 25.0;
/// Linear drag coefficient (1/s)
pub const DRAG: f32 = 0.12;
/// Extra drag off the road surface (1/s)
pub const GRASS_DRAG: f32 = 1.5;
/// Heading change at full lock (rad/s)
pub const TURN_RATE: f32 = 1.6;

#[derive(Debug, Clone)]
pub struct KinematicCar {
    pub position: Vec3,
    /// Radians, 0 = +Z, positive turns right
    pub heading: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub controls: ControlInputs,
}

impl KinematicCar {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            heading: direction.x.atan2(direction.z),
            speed: 0.0,
            max_speed: 70.0,
            controls: ControlInputs::default(),
        }
    }

    pub fn direction(&self) -> Vec3 {
        heading_to_direction(self.heading)
    }
}

impl Vehicle for KinematicCar {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.direction() * self.speed
    }

    fn set_controls(&mut self, controls: ControlInputs) {
        self.controls = controls;
    }
}

impl VehicleBody for KinematicCar {
    fn step(&mut self, dt: f32, ground: Option<f32>) {
        let c = self.controls;
        let drag = DRAG + if ground.is_some() { 0.0 } else { GRASS_DRAG };
        let accel = c.throttle * ACCELERATION - c.brake * BRAKING - drag * self.speed;
        self.speed = (self.speed + accel * dt).clamp(0.0, self.max_speed);

        // Steering bites harder as the car gets moving
        let grip = self.speed / (self.speed + 5.0);
        self.heading += c.steering * TURN_RATE * grip * dt;

        self.position += self.direction() * self.speed * dt;
        if let Some(height) = ground {
            self.position.y = height;
        }
    }
}
