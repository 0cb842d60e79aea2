//! Frame sequence integrity tracking for world camera streams.
//!
//! Each (camera, mode) stream carries a monotonically increasing signed 64-bit
//! frame counter that wraps past `i64::MAX` back to zero. A tracker per stream
//! classifies every received frame number and accumulates the number of
//! sequence slots that never arrived.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, warn};

use super::device::{CameraId, FrameMode};
use crate::source::CameraFrame;

/// Sentinel for "no frame seen since the last reset".
const UNPRIMED: i64 = -1;

/// Classification of one observed frame number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// First frame after a reset; only primes the tracker.
    Primed,
    /// A new frame. `dropped` is the number of skipped slots before it.
    Fresh { dropped: u64 },
    /// Same frame number as the previous observation.
    Duplicate,
    /// Negative frame number; state was not touched.
    Invalid,
}

/// Dropped/duplicate frame detector for a single stream.
#[derive(Debug, Clone)]
pub struct FrameSequenceTracker {
    last_frame_number: i64,
    dropped: u64,
}

impl Default for FrameSequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSequenceTracker {
    pub fn new() -> Self {
        Self {
            last_frame_number: UNPRIMED,
            dropped: 0,
        }
    }

    /// Classify `frame_number` and update drop accounting.
    pub fn observe(&mut self, frame_number: i64) -> FrameOutcome {
        if frame_number < 0 {
            return FrameOutcome::Invalid;
        }

        let last = self.last_frame_number;
        if last == UNPRIMED {
            self.last_frame_number = frame_number;
            return FrameOutcome::Primed;
        }

        if frame_number == last {
            return FrameOutcome::Duplicate;
        }

        let gap = sequence_gap(last, frame_number);
        let dropped = gap.saturating_sub(1);
        self.dropped = self.dropped.saturating_add(dropped);
        self.last_frame_number = frame_number;
        FrameOutcome::Fresh { dropped }
    }

    /// Forget the previous frame number. The dropped count is kept.
    pub fn reset(&mut self) {
        self.last_frame_number = UNPRIMED;
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Last accepted frame number, if primed.
    pub fn last_frame_number(&self) -> Option<i64> {
        (self.last_frame_number != UNPRIMED).then_some(self.last_frame_number)
    }
}

/// Distance from `last` to `next`, both non-negative, treating `next < last`
/// as the counter having wrapped past `i64::MAX` back to zero.
fn sequence_gap(last: i64, next: i64) -> u64 {
    let (last, next) = (last as u64, next as u64);
    if next < last {
        (i64::MAX as u64 - last) + next + 1
    } else {
        next - last
    }
}

/// Key identifying one camera stream.
pub type StreamKey = (CameraId, FrameMode);

/// Trackers for every camera and tracked exposure mode of a session.
#[derive(Debug, Clone)]
pub struct FrameTrackers {
    trackers: BTreeMap<StreamKey, FrameSequenceTracker>,
    disabled_cameras: BTreeSet<CameraId>,
    disabled_modes: BTreeSet<FrameMode>,
    duplicates: u64,
    invalid: u64,
}

impl Default for FrameTrackers {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTrackers {
    pub fn new() -> Self {
        let trackers = CameraId::ALL
            .iter()
            .flat_map(|&camera| FrameMode::TRACKED.iter().map(move |&mode| (camera, mode)))
            .map(|key| (key, FrameSequenceTracker::new()))
            .collect();
        Self {
            trackers,
            disabled_cameras: BTreeSet::new(),
            disabled_modes: BTreeSet::new(),
            duplicates: 0,
            invalid: 0,
        }
    }

    /// Process one acquisition batch.
    ///
    /// Each stream is expected at most once per batch; later frames for the
    /// same stream are skipped. Returns the outcome of every tracked frame.
    pub fn observe_batch(&mut self, frames: &[CameraFrame]) -> Vec<(StreamKey, FrameOutcome)> {
        if frames.is_empty() {
            warn!("received camera data with no frames, cannot process it");
            return Vec::new();
        }

        let mut seen = BTreeSet::new();
        let mut outcomes = Vec::with_capacity(frames.len());

        for frame in frames {
            if frame.mode == FrameMode::Unknown {
                error!(camera = %frame.camera, "cannot process unknown mode, skipping frame");
                continue;
            }

            let key = (frame.camera, frame.mode);
            if !seen.insert(key) {
                warn!(
                    camera = %frame.camera,
                    mode = %frame.mode,
                    "stream had two frames in one batch, skipping the second"
                );
                continue;
            }

            if !self.is_enabled(key) {
                continue;
            }

            let Some(tracker) = self.trackers.get_mut(&key) else {
                continue;
            };

            let outcome = tracker.observe(frame.frame_number);
            match outcome {
                FrameOutcome::Invalid => {
                    self.invalid += 1;
                    error!(
                        camera = %frame.camera,
                        mode = %frame.mode,
                        frame_number = frame.frame_number,
                        "invalid frame number"
                    );
                }
                FrameOutcome::Duplicate => {
                    self.duplicates += 1;
                    error!(
                        camera = %frame.camera,
                        mode = %frame.mode,
                        frame_number = frame.frame_number,
                        "received the same frame number twice"
                    );
                }
                FrameOutcome::Fresh { dropped } if dropped > 0 => {
                    debug!(camera = %frame.camera, mode = %frame.mode, dropped, "dropped frames");
                }
                _ => {}
            }
            outcomes.push((key, outcome));
        }

        outcomes
    }

    pub fn is_enabled(&self, (camera, mode): StreamKey) -> bool {
        !self.disabled_cameras.contains(&camera) && !self.disabled_modes.contains(&mode)
    }

    pub fn camera_enabled(&self, camera: CameraId) -> bool {
        !self.disabled_cameras.contains(&camera)
    }

    pub fn mode_enabled(&self, mode: FrameMode) -> bool {
        !self.disabled_modes.contains(&mode)
    }

    /// Enable or disable a camera. Its streams restart from an unprimed state.
    pub fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) {
        if enabled {
            self.disabled_cameras.remove(&camera);
        } else {
            self.disabled_cameras.insert(camera);
        }
        for ((c, _), tracker) in self.trackers.iter_mut() {
            if *c == camera {
                tracker.reset();
            }
        }
    }

    /// Enable or disable an exposure mode on every camera.
    pub fn set_mode_enabled(&mut self, mode: FrameMode, enabled: bool) {
        if enabled {
            self.disabled_modes.remove(&mode);
        } else {
            self.disabled_modes.insert(mode);
        }
        for ((_, m), tracker) in self.trackers.iter_mut() {
            if *m == mode {
                tracker.reset();
            }
        }
    }

    /// Reset every stream, e.g. after the camera connection was paused.
    pub fn reset_all(&mut self) {
        for tracker in self.trackers.values_mut() {
            tracker.reset();
        }
    }

    pub fn tracker(&self, camera: CameraId, mode: FrameMode) -> Option<&FrameSequenceTracker> {
        self.trackers.get(&(camera, mode))
    }

    pub fn dropped(&self, camera: CameraId, mode: FrameMode) -> u64 {
        self.tracker(camera, mode).map_or(0, |t| t.dropped_count())
    }

    pub fn total_dropped(&self) -> u64 {
        self.trackers.values().map(|t| t.dropped_count()).sum()
    }

    pub fn duplicate_count(&self) -> u64 {
        self.duplicates
    }

    pub fn invalid_count(&self) -> u64 {
        self.invalid
    }

    /// Iterate streams in camera, then mode order.
    pub fn iter(&self) -> impl Iterator<Item = (&StreamKey, &FrameSequenceTracker)> {
        self.trackers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(camera: CameraId, mode: FrameMode, frame_number: i64) -> CameraFrame {
        CameraFrame {
            camera,
            mode,
            frame_number,
        }
    }

    #[test]
    fn test_first_frame_primes() {
        let mut tracker = FrameSequenceTracker::new();
        assert_eq!(tracker.last_frame_number(), None);
        assert_eq!(tracker.observe(42), FrameOutcome::Primed);
        assert_eq!(tracker.last_frame_number(), Some(42));
        assert_eq!(tracker.dropped_count(), 0);
    }

    #[test]
    fn test_consecutive_frames_drop_nothing() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(1);
        assert_eq!(tracker.observe(2), FrameOutcome::Fresh { dropped: 0 });
        assert_eq!(tracker.observe(3), FrameOutcome::Fresh { dropped: 0 });
        assert_eq!(tracker.dropped_count(), 0);
    }

    #[test]
    fn test_gap_counts_skipped_slots() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(10);
        // 11 and 12 never arrived
        assert_eq!(tracker.observe(13), FrameOutcome::Fresh { dropped: 2 });
        assert_eq!(tracker.dropped_count(), 2);
        assert_eq!(tracker.observe(20), FrameOutcome::Fresh { dropped: 6 });
        assert_eq!(tracker.dropped_count(), 8);
    }

    #[test]
    fn test_duplicate_does_not_count() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(7);
        assert_eq!(tracker.observe(7), FrameOutcome::Duplicate);
        assert_eq!(tracker.last_frame_number(), Some(7));
        assert_eq!(tracker.observe(8), FrameOutcome::Fresh { dropped: 0 });
        assert_eq!(tracker.dropped_count(), 0);
    }

    #[test]
    fn test_reset_clears_history_not_count() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(5);
        tracker.observe(9);
        assert_eq!(tracker.dropped_count(), 3);

        tracker.reset();
        assert_eq!(tracker.observe(5), FrameOutcome::Primed);
        assert_eq!(tracker.dropped_count(), 3);
    }

    #[test]
    fn test_negative_is_invalid_and_ignored() {
        let mut tracker = FrameSequenceTracker::new();
        assert_eq!(tracker.observe(-1), FrameOutcome::Invalid);
        assert_eq!(tracker.last_frame_number(), None);

        tracker.observe(100);
        assert_eq!(tracker.observe(-1), FrameOutcome::Invalid);
        assert_eq!(tracker.observe(i64::MIN), FrameOutcome::Invalid);
        assert_eq!(tracker.last_frame_number(), Some(100));
        assert_eq!(tracker.observe(101), FrameOutcome::Fresh { dropped: 0 });
    }

    #[test]
    fn test_wraparound_gap() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(i64::MAX - 1);
        // MAX and 0 were skipped: gap = (MAX - (MAX - 1)) + 1 + 1 = 3
        assert_eq!(tracker.observe(1), FrameOutcome::Fresh { dropped: 2 });
        assert_eq!(tracker.last_frame_number(), Some(1));
    }

    #[test]
    fn test_wraparound_without_loss() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(i64::MAX);
        assert_eq!(tracker.observe(0), FrameOutcome::Fresh { dropped: 0 });
    }

    #[test]
    fn test_wraparound_extremes_do_not_overflow() {
        let mut tracker = FrameSequenceTracker::new();
        tracker.observe(i64::MAX);
        assert_eq!(
            tracker.observe(i64::MAX - 1),
            FrameOutcome::Fresh {
                dropped: i64::MAX as u64 - 1
            }
        );
        tracker.observe(0);
        tracker.observe(i64::MAX);
        // (MAX - 1) + 1 + (MAX - 1) skipped slots in total
        assert_eq!(tracker.dropped_count(), u64::MAX - 2);
    }

    #[test]
    fn test_batch_skips_unknown_and_repeats() {
        let mut trackers = FrameTrackers::new();
        let outcomes = trackers.observe_batch(&[
            frame(CameraId::Left, FrameMode::Unknown, 1),
            frame(CameraId::Left, FrameMode::NormalExposure, 1),
            frame(CameraId::Left, FrameMode::NormalExposure, 5),
            frame(CameraId::Right, FrameMode::LowExposure, 3),
        ]);
        assert_eq!(
            outcomes,
            vec![
                ((CameraId::Left, FrameMode::NormalExposure), FrameOutcome::Primed),
                ((CameraId::Right, FrameMode::LowExposure), FrameOutcome::Primed),
            ]
        );
        let left = trackers.tracker(CameraId::Left, FrameMode::NormalExposure).unwrap();
        assert_eq!(left.last_frame_number(), Some(1));
    }

    #[test]
    fn test_empty_batch() {
        let mut trackers = FrameTrackers::new();
        assert!(trackers.observe_batch(&[]).is_empty());
    }

    #[test]
    fn test_disabled_camera_resets_and_ignores() {
        let mut trackers = FrameTrackers::new();
        trackers.observe_batch(&[frame(CameraId::Center, FrameMode::LowExposure, 1)]);
        trackers.observe_batch(&[frame(CameraId::Center, FrameMode::LowExposure, 4)]);
        assert_eq!(trackers.dropped(CameraId::Center, FrameMode::LowExposure), 2);

        trackers.set_camera_enabled(CameraId::Center, false);
        assert!(!trackers.camera_enabled(CameraId::Center));
        assert!(trackers
            .observe_batch(&[frame(CameraId::Center, FrameMode::LowExposure, 50)])
            .is_empty());

        trackers.set_camera_enabled(CameraId::Center, true);
        let outcomes =
            trackers.observe_batch(&[frame(CameraId::Center, FrameMode::LowExposure, 60)]);
        assert_eq!(outcomes[0].1, FrameOutcome::Primed);
        assert_eq!(trackers.total_dropped(), 2);
    }

    #[test]
    fn test_disabled_mode_applies_to_all_cameras() {
        let mut trackers = FrameTrackers::new();
        trackers.set_mode_enabled(FrameMode::LowExposure, false);
        let outcomes = trackers.observe_batch(&[
            frame(CameraId::Left, FrameMode::LowExposure, 1),
            frame(CameraId::Right, FrameMode::LowExposure, 1),
            frame(CameraId::Right, FrameMode::NormalExposure, 1),
        ]);
        assert_eq!(outcomes.len(), 1);
        assert!(trackers.is_enabled((CameraId::Left, FrameMode::NormalExposure)));
        assert!(!trackers.mode_enabled(FrameMode::LowExposure));
    }

    #[test]
    fn test_batch_counts_duplicates_and_invalid() {
        let mut trackers = FrameTrackers::new();
        trackers.observe_batch(&[frame(CameraId::Left, FrameMode::LowExposure, 9)]);
        trackers.observe_batch(&[
            frame(CameraId::Left, FrameMode::LowExposure, 9),
            frame(CameraId::Right, FrameMode::LowExposure, -3),
        ]);
        assert_eq!(trackers.duplicate_count(), 1);
        assert_eq!(trackers.invalid_count(), 1);
    }

    #[test]
    fn test_reset_all_primes_every_stream() {
        let mut trackers = FrameTrackers::new();
        trackers.observe_batch(&[frame(CameraId::Left, FrameMode::LowExposure, 9)]);
        trackers.reset_all();
        let outcomes = trackers.observe_batch(&[frame(CameraId::Left, FrameMode::LowExposure, 9)]);
        assert_eq!(outcomes[0].1, FrameOutcome::Primed);
        assert_eq!(trackers.iter().count(), 6);
    }
}
