//! AI drivers
//!
//! One controller per AI-driven vehicle. Controllers read the shared track and
//! a snapshot of traffic, and write control inputs to their own vehicle.

pub mod controller;
pub mod difficulty;
pub mod vehicle;

pub use controller::{AiController, AiState, PathCheck, check_path};
pub use difficulty::{AiError, BehaviorProfile, Difficulty};
pub use vehicle::{ControlInputs, Vehicle, VehicleSnapshot};
