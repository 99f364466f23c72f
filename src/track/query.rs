//! Arc-length and spatial queries against a built track
//!
//! All functions are pure. A track with no segments answers with its start
//! pose, `None`, `false` or `0.0` instead of dividing by zero.

use glam::Vec3;

use super::segment::Track;
use crate::consts::SURFACE_TOLERANCE;

/// Owning segment and offset within it for an arc length (wrapped onto the loop)
pub fn segment_at(track: &Track, distance: f32) -> Option<(usize, f32)> {
    if track.segments.is_empty() || track.total_length <= 0.0 {
        return None;
    }

    let mut remaining = distance.rem_euclid(track.total_length);
    for (i, seg) in track.segments.iter().enumerate() {
        if remaining < seg.length {
            return Some((i, remaining));
        }
        remaining -= seg.length;
    }

    // Float drift past the final segment
    let last = track.segments.len() - 1;
    Some((last, track.segments[last].length))
}

/// Position and heading at an arc length along the centerline
///
/// Direction is the owning segment's heading, not interpolated.
pub fn position_at(track: &Track, distance: f32) -> (Vec3, Vec3) {
    match segment_at(track, distance) {
        Some((index, offset)) => {
            let seg = &track.segments[index];
            let t = if seg.length > 0.0 {
                offset / seg.length
            } else {
                0.0
            };
            (seg.start_position.lerp(seg.end_position, t), seg.direction)
        }
        None => (track.start_position, track.start_direction),
    }
}

/// Segment whose midpoint is closest to `pos` (lowest index wins ties)
pub fn nearest_segment(track: &Track, pos: Vec3) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, seg) in track.segments.iter().enumerate() {
        let dist = seg.midpoint().distance_squared(pos);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Whether `pos` is on the road surface, and the road height under it
pub fn is_on_surface(track: &Track, pos: Vec3) -> (bool, f32) {
    let Some(index) = nearest_segment(track, pos) else {
        return (false, track.start_position.y);
    };
    let seg = &track.segments[index];

    if seg.lateral_offset(pos).abs() > seg.width / 2.0 + SURFACE_TOLERANCE {
        return (false, seg.start_position.y);
    }

    let t = if seg.length > 0.0 {
        (seg.longitudinal_offset(pos) / seg.length).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let height = seg.start_position.y + (seg.end_position.y - seg.start_position.y) * t;
    (true, height)
}

/// Take the next checkpoint if `pos` is inside it, else keep the last one
///
/// Only the immediate successor can ever be returned, so gates are passed in order.
pub fn advance_checkpoint(track: &Track, pos: Vec3, last_checkpoint: usize) -> usize {
    let count = track.checkpoints.len();
    if count == 0 {
        return last_checkpoint;
    }

    let next = (last_checkpoint + 1) % count;
    let gate = &track.checkpoints[next];
    if pos.distance(gate.position) < gate.width {
        next
    } else {
        last_checkpoint
    }
}

/// Distance travelled from the start line, given the segment `pos` is on
pub fn arc_length_at(track: &Track, pos: Vec3, segment_index: usize) -> f32 {
    if track.segments.is_empty() {
        return 0.0;
    }
    let index = segment_index.min(track.segments.len() - 1);
    let seg = &track.segments[index];

    let before: f32 = track.segments[..index].iter().map(|s| s.length).sum();
    before + seg.longitudinal_offset(pos).clamp(0.0, seg.length)
}

/// Completed fraction of a lap, in `[0, 1]`
pub fn race_progress(track: &Track, pos: Vec3, segment_index: usize) -> f32 {
    if track.total_length <= 0.0 {
        return 0.0;
    }
    (arc_length_at(track, pos, segment_index) / track.total_length).clamp(0.0, 1.0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::track::segment::{Checkpoint, SegmentKind, TrackSegment};
    use crate::track::{TrackParams, generate};

    /// A straight run along +Z made of `count` equal segments
    pub(crate) fn straight_track(count: usize, length: f32, width: f32) -> Track {
        let mut track = Track::empty(0, Vec3::ZERO, Vec3::Z);
        for i in 0..count {
            let start = Vec3::new(0.0, 0.0, i as f32 * length);
            track.segments.push(TrackSegment {
                kind: SegmentKind::Straight,
                start_position: start,
                end_position: start + Vec3::Z * length,
                direction: Vec3::Z,
                length,
                width,
                curve_angle: 0.0,
                elevation_change: 0.0,
                mesh: None,
            });
            if i > 0 {
                track.checkpoints.push(Checkpoint {
                    position: start + Vec3::Z * (length / 2.0),
                    direction: Vec3::Z,
                    width,
                    segment_index: i,
                });
            }
            track.total_length += length;
        }
        track.checkpoints.push(Checkpoint {
            position: Vec3::ZERO,
            direction: Vec3::Z,
            width,
            segment_index: 0,
        });
        track
    }

    #[test]
    fn test_position_at_interpolates() {
        let track = straight_track(4, 10.0, 12.0);
        let (pos, dir) = position_at(&track, 15.0);
        assert!((pos - Vec3::new(0.0, 0.0, 15.0)).length() < 1e-5);
        assert_eq!(dir, Vec3::Z);
    }

    #[test]
    fn test_closed_loop_wrap() {
        let track = generate(&TrackParams::default(), 2024);
        let total = track.total_length;
        for d in [0.0, 13.5, 101.0, total * 0.5, total * 0.9] {
            let (a, da) = position_at(&track, d);
            let (b, db) = position_at(&track, d + total);
            assert!((a - b).length() < 1e-2, "wrap mismatch at {}", d);
            assert!((da - db).length() < 1e-4);
        }

        let eps = 0.5;
        let (neg, neg_dir) = position_at(&track, -eps);
        let (end, end_dir) = position_at(&track, total - eps);
        assert!((neg - end).length() < 1e-2);
        assert_eq!(neg_dir, end_dir);
    }

    #[test]
    fn test_degenerate_track_answers_start_pose() {
        let track = Track::empty(9, Vec3::new(1.0, 2.0, 3.0), Vec3::X);
        assert_eq!(position_at(&track, 50.0), (Vec3::new(1.0, 2.0, 3.0), Vec3::X));
        assert_eq!(nearest_segment(&track, Vec3::ZERO), None);
        assert!(!is_on_surface(&track, Vec3::ZERO).0);
        assert_eq!(advance_checkpoint(&track, Vec3::ZERO, 0), 0);
        assert_eq!(race_progress(&track, Vec3::ZERO, 3), 0.0);
    }

    #[test]
    fn test_nearest_segment_by_midpoint() {
        let track = straight_track(4, 10.0, 12.0);
        assert_eq!(nearest_segment(&track, Vec3::new(0.0, 0.0, 24.0)), Some(2));
        // Equidistant from midpoints 5 and 15: first found wins
        assert_eq!(nearest_segment(&track, Vec3::new(3.0, 0.0, 10.0)), Some(0));
    }

    #[test]
    fn test_surface_boundary() {
        let track = straight_track(1, 20.0, 12.0);
        let edge = Vec3::new(6.0, 0.0, 10.0);
        assert!(is_on_surface(&track, edge).0);
        let inside_band = Vec3::new(-8.0, 0.0, 10.0);
        assert!(is_on_surface(&track, inside_band).0);
        let beyond = Vec3::new(6.0 + 2.01, 0.0, 10.0);
        assert!(!is_on_surface(&track, beyond).0);
    }

    #[test]
    fn test_surface_height_follows_slope() {
        let mut track = straight_track(1, 20.0, 12.0);
        track.segments[0].end_position.y = 4.0;
        track.segments[0].elevation_change = 4.0;

        let (on, h) = is_on_surface(&track, Vec3::new(0.0, 0.0, 5.0));
        assert!(on);
        assert!((h - 1.0).abs() < 1e-5);

        // Projection clamps before the start of the segment
        let (on, h) = is_on_surface(&track, Vec3::new(0.0, 0.0, -1.0));
        assert!(on);
        assert_eq!(h, 0.0);
    }

    #[test]
    fn test_checkpoints_taken_in_order() {
        let track = straight_track(4, 10.0, 12.0);
        // Gates at z = 15, 25, 35, then start line
        let finish = track.finish_checkpoint().unwrap();
        assert_eq!(advance_checkpoint(&track, Vec3::new(0.0, 0.0, 15.0), finish), 0);
        // Standing on gate 1 while last passed is finish: cannot skip ahead
        assert_eq!(
            advance_checkpoint(&track, Vec3::new(0.0, 0.0, 28.0), finish),
            finish
        );
        assert_eq!(advance_checkpoint(&track, Vec3::new(0.0, 0.0, 25.0), 0), 1);
        // Wraps to the start gate
        assert_eq!(advance_checkpoint(&track, Vec3::ZERO, 2), 3);
    }

    #[test]
    fn test_checkpoint_never_jumps() {
        let track = generate(&TrackParams::default(), 31);
        let count = track.checkpoint_count();
        let positions = [
            Vec3::ZERO,
            Vec3::splat(1_000.0),
            track.checkpoints[count / 2].position,
            track.checkpoints[count - 1].position,
        ];
        for last in 0..count {
            for &p in &positions {
                let next = advance_checkpoint(&track, p, last);
                assert!(next == last || next == (last + 1) % count);
            }
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        let track = generate(&TrackParams::default(), 555);
        let mut prev = 0.0f32;
        let steps = 400;
        for step in 0..steps {
            let d = track.total_length * step as f32 / steps as f32;
            let (index, _) = segment_at(&track, d).unwrap();
            let (pos, _) = position_at(&track, d);
            let progress = race_progress(&track, pos, index);
            assert!(progress >= prev - 1e-4, "progress fell at {}", d);
            assert!((0.0..=1.0).contains(&progress));
            prev = progress;
        }
        assert!(prev > 0.99);

        // Crossing the line starts over near zero
        let (pos, _) = position_at(&track, track.total_length + 0.5);
        assert!(race_progress(&track, pos, 0) < 0.01);
    }

    #[test]
    fn test_progress_fraction() {
        let track = straight_track(4, 10.0, 12.0);
        let p = race_progress(&track, Vec3::new(0.0, 0.0, 25.0), 2);
        assert!((p - 0.625).abs() < 1e-6);
        // Out-of-range segment index is clamped to the last segment
        let p = race_progress(&track, Vec3::new(0.0, 0.0, 40.0), 99);
        assert!((p - 1.0).abs() < 1e-6);
    }
}
