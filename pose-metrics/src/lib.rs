//! Pose feature extraction for squat videos.
//!
//! - [`landmarks`]: joint ids, points and per-frame detections.
//! - [`geometry`]: the vertex angle between two rays in the image plane.
//! - [`analyzer`]: samples frames from a [`FrameSource`], asks a
//!   [`LandmarkDetector`] for landmarks and averages the joint angles.
//!
//! Frame decoding and landmark detection are external capabilities; this crate
//! only defines the seams and the math.

pub mod analyzer;
mod config;
mod errors;
pub mod geometry;
pub mod landmarks;

pub use analyzer::{FrameSource, LandmarkDetector, PoseAnalyzer};
pub use config::{BodySide, PoseConfig};
pub use errors::PoseError;
pub use landmarks::{JointId, Landmarks, Point3D, PoseFrame, SquatMetrics};
