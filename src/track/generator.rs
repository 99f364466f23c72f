//! Seeded piecewise track generation
//!
//! Heading and elevation are integrated segment by segment; nothing is
//! recomputed from scratch. Capacity limits truncate silently.

use glam::Vec3;

use super::params::TrackParams;
use super::rng::TrackRng;
use super::segment::{Checkpoint, SegmentKind, Track, TrackSegment};
use crate::consts::{MAX_CHECKPOINTS, MIN_CURVE_ANGLE, MIN_ELEVATION};
use crate::heading_to_direction;
use crate::renderer::{TrackMeshBuilder, colors};

/// Generate a track from parameters and a seed
pub fn generate(params: &TrackParams, seed: u32) -> Track {
    build(params, seed, None)
}

/// Generate a track and build one renderer mesh per segment
///
/// The returned track owns the handles; call [`Track::release_meshes`] at teardown.
pub fn generate_with_meshes(
    params: &TrackParams,
    seed: u32,
    builder: &mut dyn TrackMeshBuilder,
) -> Track {
    build(params, seed, Some(builder))
}

fn build(params: &TrackParams, seed: u32, mut builder: Option<&mut dyn TrackMeshBuilder>) -> Track {
    let mut rng = TrackRng::new(seed);

    let count = params.effective_segment_count();
    if count < params.segment_count {
        log::warn!(
            "Track {}: requested {} segments, capped at {}",
            seed,
            params.segment_count,
            count
        );
    }
    let stride = params.checkpoint_stride();

    let mut track = Track::empty(seed, Vec3::ZERO, heading_to_direction(0.0));
    track.segments.reserve_exact(count);
    track.checkpoints.reserve_exact(MAX_CHECKPOINTS);

    let base_height = track.start_position.y;
    let mut heading = 0.0f32;
    let mut cursor = track.start_position;

    for i in 0..count {
        let roll = rng.next_float();
        let kind = if i == 0 || i + 1 == count {
            SegmentKind::Straight
        } else {
            SegmentKind::from_roll(roll)
        };

        // Shared length range for every kind
        let length = rng.next_range(params.min_straight, params.max_straight);

        let mut curve_angle = 0.0;
        let mut elevation_change = 0.0;
        match kind {
            SegmentKind::CurveLeft => {
                let angle = rng.next_range(MIN_CURVE_ANGLE, params.max_curve_angle);
                heading -= angle.to_radians();
                curve_angle = -angle;
            }
            SegmentKind::CurveRight => {
                let angle = rng.next_range(MIN_CURVE_ANGLE, params.max_curve_angle);
                heading += angle.to_radians();
                curve_angle = angle;
            }
            SegmentKind::HillUp => {
                elevation_change = rng.next_range(MIN_ELEVATION, params.max_elevation);
            }
            SegmentKind::HillDown => {
                let drop = -rng.next_range(MIN_ELEVATION, params.max_elevation);
                // Never sink below the start height
                elevation_change = if cursor.y + drop < base_height {
                    base_height - cursor.y
                } else {
                    drop
                };
            }
            SegmentKind::Straight => {}
        }

        let direction = heading_to_direction(heading);
        let mut end_position = cursor + direction * length;
        end_position.y += elevation_change;

        let mesh = builder.as_deref_mut().map(|b| {
            b.build_segment_mesh(params.track_width, length, colors::for_kind(kind))
        });

        let segment = TrackSegment {
            kind,
            start_position: cursor,
            end_position,
            direction,
            length,
            width: params.track_width,
            curve_angle,
            elevation_change,
            mesh,
        };

        if i > 0 && i % stride == 0 && track.checkpoints.len() < MAX_CHECKPOINTS {
            track.checkpoints.push(Checkpoint {
                position: segment.midpoint(),
                direction: segment.direction,
                width: segment.width,
                segment_index: i,
            });
        }

        track.total_length += length;
        cursor = end_position;
        track.segments.push(segment);
    }

    // Start/finish gate
    if track.checkpoints.len() < MAX_CHECKPOINTS {
        track.checkpoints.push(Checkpoint {
            position: track.start_position,
            direction: track.start_direction,
            width: params.track_width,
            segment_index: 0,
        });
    }

    log::debug!(
        "Track {}: {} segments, {} checkpoints, length {:.1}",
        seed,
        track.segments.len(),
        track.checkpoints.len(),
        track.total_length
    );

    track
}
