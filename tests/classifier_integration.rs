//! Integration tests for the gesture classifier
//!
//! Tests curl-based classification and its path into a round

use pretty_assertions::assert_eq;
use rpsense::core::{CurlEstimator, GameSession, GestureClassifier, RoundEvent, RoundStateMachine};
use rpsense::types::{FingerCurl, GameConfig, HandSample, Move, RoundOutcome, RoundPhase, StrategyMode};
use rpsense::COUNTDOWN_START_SECS;

/// Curls that match no pose well: best score 5.0
fn muddled_hand() -> HandSample {
    HandSample::new([
        FingerCurl::FullCurl,
        FingerCurl::NoCurl,
        FingerCurl::FullCurl,
        FingerCurl::NoCurl,
        FingerCurl::FullCurl,
    ])
}

#[test]
fn test_standard_poses() {
    let estimator = CurlEstimator::default();
    let cases = [
        (HandSample::fist(), Move::Rock),
        (HandSample::open_hand(), Move::Paper),
        (HandSample::v_sign(), Move::Scissors),
    ];
    for (sample, expected) in cases {
        let obs = estimator.classify(&sample).unwrap();
        assert_eq!(obs.mv, expected);
        assert_eq!(obs.confidence_percent(), 100);
    }
}

#[test]
fn test_scores_for_fist() {
    let estimator = CurlEstimator::default();
    let scores = estimator.scores(&HandSample::fist());
    assert_eq!(scores, vec![(Move::Rock, 10.0), (Move::Paper, 0.0), (Move::Scissors, 5.0)]);
}

#[test]
fn test_loose_fist_still_rock() {
    let estimator = CurlEstimator::default();
    let loose = HandSample::new([
        FingerCurl::NoCurl,
        FingerCurl::HalfCurl,
        FingerCurl::HalfCurl,
        FingerCurl::FullCurl,
        FingerCurl::FullCurl,
    ]);
    // (0.5 + 0.9 + 0.9 + 1.0 + 1.0) / 5 * 10 = 8.6
    let obs = estimator.classify(&loose).unwrap();
    assert_eq!(obs.mv, Move::Rock);
    assert_eq!(obs.confidence_percent(), 86);
}

#[test]
fn test_muddled_hand_is_rejected() {
    assert_eq!(CurlEstimator::default().classify(&muddled_hand()), None);
    // A lenient threshold accepts the best guess
    let lenient = CurlEstimator::new(5.0);
    assert_eq!(lenient.classify(&muddled_hand()).map(|o| o.mv), Some(Move::Scissors));
}

#[test]
fn test_rejected_sample_forfeits_round() {
    let config = GameConfig {
        seed: Some(1),
        ..GameConfig::default()
    };
    let mut session = GameSession::new(
        RoundStateMachine::new(config),
        Box::new(CurlEstimator::default()),
    );
    session.apply(RoundEvent::SelectStrategy(StrategyMode::Random)).unwrap();
    session.apply(RoundEvent::FeedReady).unwrap();

    let started = session.apply(RoundEvent::Sample(muddled_hand())).unwrap();
    assert_eq!(started.phase, RoundPhase::CountingDown);
    assert_eq!(started.latest, None);

    let mut last = started;
    for _ in 0..COUNTDOWN_START_SECS {
        last = session.apply(RoundEvent::Tick).unwrap();
    }
    assert_eq!(last.outcome, Some(RoundOutcome::NoGesture));
}

#[test]
fn test_sample_replaces_rejected_frame() {
    let mut session = GameSession::new(RoundStateMachine::default(), Box::new(CurlEstimator::default()));
    session.apply(RoundEvent::SelectStrategy(StrategyMode::Markov)).unwrap();
    session.apply(RoundEvent::FeedReady).unwrap();

    session.apply(RoundEvent::Sample(muddled_hand())).unwrap();
    let output = session.apply(RoundEvent::Sample(HandSample::v_sign())).unwrap();
    assert_eq!(output.latest.map(|o| o.mv), Some(Move::Scissors));

    for _ in 0..COUNTDOWN_START_SECS {
        session.apply(RoundEvent::Tick).unwrap();
    }
    assert_eq!(session.machine().round().player_move, Some(Move::Scissors));
}
