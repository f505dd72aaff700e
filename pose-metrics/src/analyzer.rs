//! Frame sampling, landmark detection and angle aggregation.
//!
//! [`PoseAnalyzer::analyze`] walks a [`FrameSource`] sequentially, runs the
//! [`LandmarkDetector`] on every `sample_stride`-th frame, and averages the
//! knee and trunk angles over the frames where a pose was found.

use std::io;

use tracing::{debug, info, trace, warn};

use crate::config::{BodySide, PoseConfig};
use crate::errors::PoseError;
use crate::geometry::angle;
use crate::landmarks::{JointId, Landmarks, PoseFrame, SquatMetrics};

/// Ordered, finite sequence of decoded frames (e.g. a video file).
pub trait FrameSource {
    type Frame;

    /// Next frame, or `None` at end of stream. A decoding failure is reported
    /// as end of stream.
    fn next_frame(&mut self) -> Option<Self::Frame>;

    /// Releases the underlying handle. Called exactly once by the analyzer.
    fn release(&mut self) -> io::Result<()>;
}

/// Pose detection capability for a single frame.
pub trait LandmarkDetector<F> {
    /// Returns the detected landmarks, or `None` when no pose is visible.
    fn detect(&mut self, frame: &F) -> Result<Option<Landmarks>, PoseError>;
}

/// Squat analyzer over a reusable detector.
pub struct PoseAnalyzer<D> {
    detector: D,
    cfg: PoseConfig,
}

impl<D> PoseAnalyzer<D> {
    /// Creates an analyzer.
    ///
    /// # Errors
    /// Returns [`PoseError::InvalidConfig`] if `cfg` does not validate.
    pub fn new(detector: D, cfg: PoseConfig) -> Result<Self, PoseError> {
        cfg.validate()?;
        Ok(Self { detector, cfg })
    }

    pub fn config(&self) -> &PoseConfig {
        &self.cfg
    }

    /// Averages squat angles over the sampled frames of `source`.
    ///
    /// Returns `Ok(None)` if no sampled frame yielded a complete set of
    /// landmarks. The source is released on every exit path; a failed release
    /// is logged and does not change the result.
    ///
    /// # Errors
    /// Propagates [`PoseError::Detector`] from the detector unchanged.
    pub fn analyze<S>(&mut self, source: S) -> Result<Option<SquatMetrics>, PoseError>
    where
        S: FrameSource,
        D: LandmarkDetector<S::Frame>,
    {
        let mut source = ReleaseOnDrop(source);
        let stride = self.cfg.sample_stride;
        let mut acc = AngleAccumulator::default();
        let mut read = 0usize;
        let mut sampled = 0usize;

        while let Some(frame) = source.0.next_frame() {
            read += 1;
            if read % stride != 0 {
                continue;
            }
            sampled += 1;

            let detected = PoseFrame {
                frame_index: read,
                landmarks: self.detector.detect(&frame)?,
            };
            match detected.landmarks.as_ref() {
                Some(lm) => match frame_angles(lm, self.cfg.side) {
                    Some((knee, trunk)) => {
                        trace!(frame = detected.frame_index, knee, trunk, "pose angles");
                        acc.push(knee, trunk);
                    }
                    None => debug!(
                        frame = detected.frame_index,
                        "detection is missing required joints; skipped"
                    ),
                },
                None => trace!(frame = detected.frame_index, "no pose detected"),
            }
        }

        let metrics = acc.mean();
        info!(
            frames = read,
            sampled,
            detected = acc.count,
            found = metrics.is_some(),
            "pose analysis finished"
        );
        Ok(metrics)
    }
}

/// Knee and trunk angles for one detection, or `None` if a joint is missing.
pub fn frame_angles(lm: &Landmarks, side: BodySide) -> Option<(f64, f64)> {
    let (shoulder, hip, knee, ankle) = match side {
        BodySide::Left => (
            JointId::LeftShoulder,
            JointId::LeftHip,
            JointId::LeftKnee,
            JointId::LeftAnkle,
        ),
        BodySide::Right => (
            JointId::RightShoulder,
            JointId::RightHip,
            JointId::RightKnee,
            JointId::RightAnkle,
        ),
    };
    let shoulder = lm.get(shoulder)?;
    let hip = lm.get(hip)?;
    let knee = lm.get(knee)?;
    let ankle = lm.get(ankle)?;

    Some((angle(hip, knee, ankle), angle(shoulder, hip, knee)))
}

#[derive(Default)]
struct AngleAccumulator {
    knee_sum: f64,
    trunk_sum: f64,
    count: usize,
}

impl AngleAccumulator {
    fn push(&mut self, knee: f64, trunk: f64) {
        self.knee_sum += knee;
        self.trunk_sum += trunk;
        self.count += 1;
    }

    fn mean(&self) -> Option<SquatMetrics> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(SquatMetrics {
            knee_angle: self.knee_sum / n,
            trunk_angle: self.trunk_sum / n,
        })
    }
}

/// Owns the source for the duration of one analysis and releases it on drop.
struct ReleaseOnDrop<S: FrameSource>(S);

impl<S: FrameSource> Drop for ReleaseOnDrop<S> {
    fn drop(&mut self) {
        if let Err(e) = self.0.release() {
            warn!(error = %e, "failed to release frame source");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Point3D;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Frames are just their 1-based number.
    struct CountingSource {
        total: usize,
        next: usize,
        releases: Rc<Cell<usize>>,
        fail_release: bool,
    }

    impl CountingSource {
        fn new(total: usize) -> (Self, Rc<Cell<usize>>) {
            let releases = Rc::new(Cell::new(0));
            (
                Self {
                    total,
                    next: 0,
                    releases: Rc::clone(&releases),
                    fail_release: false,
                },
                releases,
            )
        }
    }

    impl FrameSource for CountingSource {
        type Frame = usize;

        fn next_frame(&mut self) -> Option<usize> {
            if self.next >= self.total {
                return None;
            }
            self.next += 1;
            Some(self.next)
        }

        fn release(&mut self) -> io::Result<()> {
            self.releases.set(self.releases.get() + 1);
            if self.fail_release {
                Err(io::Error::other("handle already closed"))
            } else {
                Ok(())
            }
        }
    }

    /// Returns a fixed pose for frames accepted by `hit`, records every call.
    struct ScriptedDetector {
        hit: fn(usize) -> bool,
        pose: Landmarks,
        seen: Vec<usize>,
    }

    impl LandmarkDetector<usize> for ScriptedDetector {
        fn detect(&mut self, frame: &usize) -> Result<Option<Landmarks>, PoseError> {
            self.seen.push(*frame);
            Ok((self.hit)(*frame).then(|| self.pose.clone()))
        }
    }

    struct FailingDetector;

    impl LandmarkDetector<usize> for FailingDetector {
        fn detect(&mut self, _frame: &usize) -> Result<Option<Landmarks>, PoseError> {
            Err(PoseError::Detector("model not loaded".into()))
        }
    }

    /// Shoulder above hip, knee bent at a right angle, shin vertical.
    fn squat_pose() -> Landmarks {
        [
            (JointId::LeftShoulder, Point3D::new(0.0, -1.0, 0.0)),
            (JointId::LeftHip, Point3D::new(0.0, 0.0, 0.0)),
            (JointId::LeftKnee, Point3D::new(1.0, 0.0, 0.0)),
            (JointId::LeftAnkle, Point3D::new(1.0, 1.0, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    fn analyzer(hit: fn(usize) -> bool, stride: usize) -> PoseAnalyzer<ScriptedDetector> {
        let detector = ScriptedDetector {
            hit,
            pose: squat_pose(),
            seen: Vec::new(),
        };
        let cfg = PoseConfig {
            sample_stride: stride,
            ..PoseConfig::default()
        };
        PoseAnalyzer::new(detector, cfg).unwrap()
    }

    #[test]
    fn samples_every_stride_th_frame() {
        let (source, releases) = CountingSource::new(95);
        let mut a = analyzer(|_| true, 30);

        let m = a.analyze(source).unwrap().unwrap();
        assert_eq!(a.detector.seen, vec![30, 60, 90]);
        assert!((m.knee_angle - 90.0).abs() < 1e-9);
        assert!((m.trunk_angle - 90.0).abs() < 1e-9);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn one_successful_frame_is_enough() {
        let (source, releases) = CountingSource::new(10);
        let mut a = analyzer(|f| f == 4, 2);

        let m = a.analyze(source).unwrap();
        assert!(m.is_some());
        assert_eq!(a.detector.seen, vec![2, 4, 6, 8, 10]);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn no_detection_is_absent_not_error() {
        let (source, releases) = CountingSource::new(120);
        let mut a = analyzer(|_| false, 30);

        assert_eq!(a.analyze(source).unwrap(), None);
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn short_video_never_reaches_a_sample() {
        let (source, releases) = CountingSource::new(29);
        let mut a = analyzer(|_| true, 30);

        assert_eq!(a.analyze(source).unwrap(), None);
        assert!(a.detector.seen.is_empty());
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn averages_over_detected_frames() {
        struct Alternating(usize);
        impl LandmarkDetector<usize> for Alternating {
            fn detect(&mut self, _frame: &usize) -> Result<Option<Landmarks>, PoseError> {
                self.0 += 1;
                let mut lm = squat_pose();
                if self.0 % 2 == 0 {
                    // straight leg: 180° at the knee
                    lm.insert(JointId::LeftAnkle, Point3D::new(2.0, 0.0, 0.0));
                }
                Ok(Some(lm))
            }
        }

        let (source, _) = CountingSource::new(4);
        let cfg = PoseConfig {
            sample_stride: 1,
            ..PoseConfig::default()
        };
        let mut a = PoseAnalyzer::new(Alternating(0), cfg).unwrap();
        let m = a.analyze(source).unwrap().unwrap();
        assert!((m.knee_angle - 135.0).abs() < 1e-9);
        assert!((m.trunk_angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn incomplete_detection_is_skipped() {
        let full = squat_pose();
        let partial: Landmarks = [JointId::LeftHip, JointId::LeftKnee]
            .into_iter()
            .filter_map(|j| full.get(j).map(|p| (j, p)))
            .collect();
        assert_eq!(frame_angles(&partial, BodySide::Left), None);
        assert_eq!(frame_angles(&squat_pose(), BodySide::Right), None);
    }

    #[test]
    fn detector_error_propagates_and_still_releases() {
        let (source, releases) = CountingSource::new(60);
        let mut a = PoseAnalyzer::new(FailingDetector, PoseConfig::default()).unwrap();

        let err = a.analyze(source).unwrap_err();
        assert!(matches!(err, PoseError::Detector(_)));
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn failed_release_does_not_mask_result() {
        let (mut source, releases) = CountingSource::new(30);
        source.fail_release = true;
        let mut a = analyzer(|_| true, 30);

        assert!(a.analyze(source).unwrap().is_some());
        assert_eq!(releases.get(), 1);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let cfg = PoseConfig {
            sample_stride: 0,
            ..PoseConfig::default()
        };
        assert!(PoseAnalyzer::new(FailingDetector, cfg).is_err());
    }
}
