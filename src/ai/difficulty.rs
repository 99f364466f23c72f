//! AI difficulty levels and the behavior they imply

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when creating an AI driver
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid AI difficulty level {0} (expected 0-3)")]
    InvalidDifficulty(u8),
    #[error("unknown AI difficulty '{0}'")]
    UnknownDifficulty(String),
}

/// AI difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }

    /// Behavior parameters, fixed for a controller's lifetime
    pub fn profile(&self) -> BehaviorProfile {
        match self {
            Difficulty::Easy => BehaviorProfile {
                aggression: 0.2,
                skill: 0.5,
                error_rate: 0.3,
                speed_factor: 0.75,
            },
            Difficulty::Medium => BehaviorProfile {
                aggression: 0.4,
                skill: 0.7,
                error_rate: 0.15,
                speed_factor: 0.85,
            },
            Difficulty::Hard => BehaviorProfile {
                aggression: 0.6,
                skill: 0.85,
                error_rate: 0.08,
                speed_factor: 0.95,
            },
            Difficulty::Expert => BehaviorProfile {
                aggression: 0.8,
                skill: 0.95,
                error_rate: 0.03,
                speed_factor: 1.0,
            },
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = AiError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(level as usize)
            .copied()
            .ok_or(AiError::InvalidDifficulty(level))
    }
}

impl FromStr for Difficulty {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(AiError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Per-driver behavior parameters, all in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    /// Willingness to pass rather than sit behind traffic
    pub aggression: f32,
    /// Line precision and look-ahead quality
    pub skill: f32,
    /// Reaction sloppiness
    pub error_rate: f32,
    /// Fraction of top speed the driver targets
    pub speed_factor: f32,
}

impl BehaviorProfile {
    /// Aggression needed to attempt a pass; better drivers commit sooner
    pub fn overtake_threshold(&self) -> f32 {
        0.5 * (1.0 - self.skill * 0.5)
    }

    pub fn wants_to_overtake(&self) -> bool {
        self.aggression > self.overtake_threshold()
    }
}
