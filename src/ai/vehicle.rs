//! The boundary between AI drivers and the vehicles they drive
//!
//! Drivers read pose and velocity and write control inputs. Mass, tires and
//! collision state are none of their business.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Driver inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInputs {
    /// -1 full left, +1 full right
    pub steering: f32,
    pub throttle: f32,
    pub brake: f32,
}

impl ControlInputs {
    /// Build inputs clamped to their valid ranges
    pub fn new(steering: f32, throttle: f32, brake: f32) -> Self {
        Self {
            steering: steering.clamp(-1.0, 1.0),
            throttle: throttle.clamp(0.0, 1.0),
            brake: brake.clamp(0.0, 1.0),
        }
    }
}

/// A vehicle an AI driver can control
pub trait Vehicle {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn speed(&self) -> f32 {
        self.velocity().length()
    }
    fn set_controls(&mut self, controls: ControlInputs);
}

/// Read-only view of a vehicle for traffic checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleSnapshot {
    pub id: usize,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl VehicleSnapshot {
    pub fn of(id: usize, vehicle: &dyn Vehicle) -> Self {
        Self {
            id,
            position: vehicle.position(),
            velocity: vehicle.velocity(),
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_are_clamped() {
        let c = ControlInputs::new(-3.0, 1.5, -0.2);
        assert_eq!(c, ControlInputs::new(-1.0, 1.0, 0.0));
    }
}
