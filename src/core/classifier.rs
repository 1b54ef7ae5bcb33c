//! Gesture classifier: finger curls → move
//!
//! Each move is described by weighted curl expectations per finger. A
//! sample scores the mean matched weight over the described fingers,
//! scaled to 0-10. The best-scoring move wins if it clears the threshold.

use crate::types::{Finger, FingerCurl, GestureObservation, HandSample, Move};
use crate::{MAX_GESTURE_SCORE, MIN_GESTURE_SCORE};

/// Anything that turns a raw hand sample into at most one gesture
pub trait GestureClassifier: Send + Sync {
    fn classify(&self, sample: &HandSample) -> Option<GestureObservation>;
}

/// Weighted curl expectations for one move
#[derive(Debug, Clone)]
pub struct GestureDescription {
    pub mv: Move,
    curls: Vec<(Finger, FingerCurl, f64)>,
}

impl GestureDescription {
    pub fn new(mv: Move) -> Self {
        Self { mv, curls: Vec::new() }
    }

    /// Expect `curl` on `finger` with the given weight
    pub fn add_curl(mut self, finger: Finger, curl: FingerCurl, weight: f64) -> Self {
        self.curls.push((finger, curl, weight));
        self
    }

    /// Score a sample on the 0-10 scale
    pub fn score(&self, sample: &HandSample) -> f64 {
        let mut total = 0.0;
        let mut described = 0usize;
        for finger in Finger::ALL {
            let mut entries = self.curls.iter().filter(|(f, _, _)| *f == finger).peekable();
            if entries.peek().is_none() {
                continue;
            }
            described += 1;
            let observed = sample.curl(finger);
            total += entries
                .filter(|(_, c, _)| *c == observed)
                .map(|(_, _, w)| *w)
                .fold(0.0, f64::max);
        }
        if described == 0 {
            return 0.0;
        }
        total / described as f64 * MAX_GESTURE_SCORE
    }
}

/// Curl-based estimator with the standard rock, paper and scissors poses
#[derive(Debug, Clone)]
pub struct CurlEstimator {
    gestures: Vec<GestureDescription>,
    min_score: f64,
}

impl Default for CurlEstimator {
    fn default() -> Self {
        Self::new(MIN_GESTURE_SCORE)
    }
}

impl CurlEstimator {
    pub fn new(min_score: f64) -> Self {
        Self {
            gestures: vec![rock_gesture(), paper_gesture(), scissors_gesture()],
            min_score,
        }
    }

    /// Score for every move, in Rock, Paper, Scissors order
    pub fn scores(&self, sample: &HandSample) -> Vec<(Move, f64)> {
        self.gestures.iter().map(|g| (g.mv, g.score(sample))).collect()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }
}

impl GestureClassifier for CurlEstimator {
    fn classify(&self, sample: &HandSample) -> Option<GestureObservation> {
        let mut best: Option<(Move, f64)> = None;
        for (mv, score) in self.scores(sample) {
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((mv, score));
            }
        }
        best.filter(|(_, score)| *score >= self.min_score)
            .map(|(mv, score)| GestureObservation::new(mv, score / MAX_GESTURE_SCORE))
    }
}

const FOLDING_FINGERS: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

fn rock_gesture() -> GestureDescription {
    let mut g = GestureDescription::new(Move::Rock)
        .add_curl(Finger::Thumb, FingerCurl::HalfCurl, 1.0)
        .add_curl(Finger::Thumb, FingerCurl::NoCurl, 0.5);
    for finger in FOLDING_FINGERS {
        g = g
            .add_curl(finger, FingerCurl::FullCurl, 1.0)
            .add_curl(finger, FingerCurl::HalfCurl, 0.9);
    }
    g
}

fn paper_gesture() -> GestureDescription {
    Finger::ALL
        .into_iter()
        .fold(GestureDescription::new(Move::Paper), |g, finger| {
            g.add_curl(finger, FingerCurl::NoCurl, 1.0)
        })
}

fn scissors_gesture() -> GestureDescription {
    GestureDescription::new(Move::Scissors)
        .add_curl(Finger::Index, FingerCurl::NoCurl, 1.0)
        .add_curl(Finger::Middle, FingerCurl::NoCurl, 1.0)
        .add_curl(Finger::Ring, FingerCurl::FullCurl, 1.0)
        .add_curl(Finger::Ring, FingerCurl::HalfCurl, 0.9)
        .add_curl(Finger::Pinky, FingerCurl::FullCurl, 1.0)
        .add_curl(Finger::Pinky, FingerCurl::HalfCurl, 0.9)
}
