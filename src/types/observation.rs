//! Gesture observations and raw hand samples

use serde::{Deserialize, Serialize};

use crate::types::Move;

/// Classified gesture from one capture-feed sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureObservation {
    /// Recognized move
    #[serde(rename = "move")]
    pub mv: Move,
    /// Classifier-reported strength, 0.0 - 1.0
    pub confidence: f64,
}

impl GestureObservation {
    /// Create observation, clamping confidence into [0, 1]
    pub fn new(mv: Move, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self { mv, confidence }
    }

    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// The five fingers of a hand, in landmark order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn index(self) -> usize {
        match self {
            Finger::Thumb => 0,
            Finger::Index => 1,
            Finger::Middle => 2,
            Finger::Ring => 3,
            Finger::Pinky => 4,
        }
    }
}

/// How far a finger is bent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerCurl {
    NoCurl,
    HalfCurl,
    FullCurl,
}

/// One raw hand pose from the capture feed, reduced to per-finger curls.
///
/// Landmark-to-curl estimation belongs to the hand-tracking model
/// upstream; the core only ever sees the curls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSample {
    /// Curl per finger, indexed by [`Finger::index`]
    pub curls: [FingerCurl; 5],
}

impl HandSample {
    pub fn new(curls: [FingerCurl; 5]) -> Self {
        Self { curls }
    }

    /// Curl of one finger
    pub fn curl(&self, finger: Finger) -> FingerCurl {
        self.curls[finger.index()]
    }

    /// Closed fist
    pub fn fist() -> Self {
        Self::new([
            FingerCurl::HalfCurl,
            FingerCurl::FullCurl,
            FingerCurl::FullCurl,
            FingerCurl::FullCurl,
            FingerCurl::FullCurl,
        ])
    }

    /// Flat open hand
    pub fn open_hand() -> Self {
        Self::new([FingerCurl::NoCurl; 5])
    }

    /// Index and middle extended, ring and pinky folded
    pub fn v_sign() -> Self {
        Self::new([
            FingerCurl::HalfCurl,
            FingerCurl::NoCurl,
            FingerCurl::NoCurl,
            FingerCurl::FullCurl,
            FingerCurl::FullCurl,
        ])
    }
}
