//! Core data models: joints, points, detections and the aggregated metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Anatomical keypoints used by the squat metrics.
///
/// Numbering follows the 33-point MediaPipe pose topology so detectors that
/// return a flat array can be mapped with [`Landmarks::from_indexed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointId {
    pub const ALL: [JointId; 8] = [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
    ];

    /// Position of this joint in the 33-point pose topology.
    pub fn topology_index(self) -> usize {
        match self {
            JointId::LeftShoulder => 11,
            JointId::RightShoulder => 12,
            JointId::LeftHip => 23,
            JointId::RightHip => 24,
            JointId::LeftKnee => 25,
            JointId::RightKnee => 26,
            JointId::LeftAnkle => 27,
            JointId::RightAnkle => 28,
        }
    }
}

/// A landmark position. `x`/`y` are image-plane coordinates, `z` is depth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Named landmarks detected on one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    points: HashMap<JointId, Point3D>,
}

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: JointId, point: Point3D) {
        self.points.insert(joint, point);
    }

    pub fn get(&self, joint: JointId) -> Option<Point3D> {
        self.points.get(&joint).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Builds landmarks from a flat `[x, y, z]` array in pose-topology order.
    /// Joints beyond the end of `raw` are left out.
    pub fn from_indexed(raw: &[[f32; 3]]) -> Self {
        JointId::ALL
            .iter()
            .filter_map(|&j| {
                raw.get(j.topology_index())
                    .map(|p| (j, Point3D::new(p[0], p[1], p[2])))
            })
            .collect()
    }
}

impl FromIterator<(JointId, Point3D)> for Landmarks {
    fn from_iter<I: IntoIterator<Item = (JointId, Point3D)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Detection result for one sampled frame. `None` landmarks mean detection failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    /// 1-based position of the frame in the source.
    pub frame_index: usize,
    pub landmarks: Option<Landmarks>,
}

/// Averaged squat angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquatMetrics {
    /// Angle at the knee between hip and ankle.
    pub knee_angle: f64,
    /// Angle at the hip between shoulder and knee.
    pub trunk_angle: f64,
}
