//! Session event loop
//!
//! The capture feed and the countdown timer are two producers feeding one
//! serialized queue. Each event is applied to the round machine to
//! completion before the next is taken, so the ordering of samples and
//! ticks is exactly the queue order.

use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;

use crate::core::classifier::GestureClassifier;
use crate::core::machine::RoundStateMachine;
use crate::types::{
    GameError, GestureObservation, HandSample, Result, RoundOutput, StrategyMode,
};
use crate::{EVENT_QUEUE_CAPACITY, UPDATE_CHANNEL_CAPACITY};

/// Everything the round machine reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    SelectStrategy(StrategyMode),
    FeedReady,
    FeedFailed(String),
    /// Hand frame, already classified (None = gesture unclear)
    Observation(Option<GestureObservation>),
    /// Raw hand frame, classified by the session
    Sample(HandSample),
    /// Frame without a hand
    EmptyFrame,
    Tick,
    Freeze,
    ResetRound,
    ChangeStrategy,
}

// =============================================================================
// SYNCHRONOUS SESSION
// =============================================================================

/// Round machine plus the classifier applied to raw samples
pub struct GameSession {
    machine: RoundStateMachine,
    classifier: Box<dyn GestureClassifier>,
}

impl GameSession {
    pub fn new(machine: RoundStateMachine, classifier: Box<dyn GestureClassifier>) -> Self {
        Self { machine, classifier }
    }

    /// Handle one event to completion
    pub fn apply(&mut self, event: RoundEvent) -> Result<RoundOutput> {
        match event {
            RoundEvent::SelectStrategy(mode) => Ok(self.machine.select_strategy(mode)),
            RoundEvent::FeedReady => self.machine.feed_ready(),
            RoundEvent::FeedFailed(reason) => Err(self.machine.feed_failed(reason)),
            RoundEvent::Observation(obs) => Ok(self.machine.observe(obs)),
            RoundEvent::Sample(sample) => {
                let obs = self.classifier.classify(&sample);
                Ok(self.machine.observe(obs))
            }
            RoundEvent::EmptyFrame => Ok(self.machine.observe_empty()),
            RoundEvent::Tick => Ok(self.machine.tick()),
            RoundEvent::Freeze => Ok(self.machine.freeze()),
            RoundEvent::ResetRound => self.machine.reset_round(),
            RoundEvent::ChangeStrategy => Ok(self.machine.change_strategy()),
        }
    }

    pub fn machine(&self) -> &RoundStateMachine {
        &self.machine
    }
}

// =============================================================================
// ASYNC LOOP
// =============================================================================

struct Command {
    event: RoundEvent,
    reply: Option<oneshot::Sender<Result<RoundOutput>>>,
}

/// Cloneable handle to a running session loop
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
    latest: watch::Receiver<RoundOutput>,
    updates: broadcast::Sender<RoundOutput>,
}

impl SessionHandle {
    /// Queue an event and wait for its result
    pub async fn send(&self, event: RoundEvent) -> Result<RoundOutput> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command { event, reply: Some(reply) })
            .await
            .map_err(|_| GameError::SessionClosed)?;
        rx.await.map_err(|_| GameError::SessionClosed)?
    }

    /// Queue an event without waiting for the result
    pub async fn push(&self, event: RoundEvent) -> Result<()> {
        self.tx
            .send(Command { event, reply: None })
            .await
            .map_err(|_| GameError::SessionClosed)
    }

    /// Output of the most recently applied event
    pub fn latest(&self) -> RoundOutput {
        self.latest.borrow().clone()
    }

    /// Stream of non-trivial outputs
    pub fn subscribe(&self) -> broadcast::Receiver<RoundOutput> {
        self.updates.subscribe()
    }

    /// Has the session loop stopped?
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Start the serialized event loop on the current tokio runtime
pub fn spawn_session(session: GameSession) -> SessionHandle {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let (latest_tx, latest_rx) = watch::channel(session.machine().snapshot());
    let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

    tokio::spawn(run_session(session, rx, latest_tx, updates.clone()));

    SessionHandle {
        tx,
        latest: latest_rx,
        updates,
    }
}

async fn run_session(
    mut session: GameSession,
    mut rx: mpsc::Receiver<Command>,
    latest: watch::Sender<RoundOutput>,
    updates: broadcast::Sender<RoundOutput>,
) {
    let interval = session.machine().config().tick_interval();
    let mut deadline: Option<Instant> = None;

    loop {
        // Re-check before every re-arm so no tick outlives a freeze or reset
        if session.machine().timer_armed() {
            deadline.get_or_insert_with(|| Instant::now() + interval);
        } else {
            deadline = None;
        }

        let command = tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(cmd) => cmd,
                None => break,
            },
            _ = sleep_until(deadline) => {
                deadline = None;
                Command { event: RoundEvent::Tick, reply: None }
            }
        };

        let result = session.apply(command.event);
        match &result {
            Ok(output) => {
                latest.send_replace(output.clone());
                if !output.reason.is_quiet() {
                    let _ = updates.send(output.clone());
                }
            }
            Err(GameError::FeedUnavailable(_)) => {
                // Subscribers learn about the failure without polling
                let output = session.machine().snapshot();
                latest.send_replace(output.clone());
                let _ = updates.send(output);
            }
            Err(e) => warn!("event rejected: {}", e),
        }
        if let Some(reply) = command.reply {
            let _ = reply.send(result);
        }
    }
    debug!("session loop ended");
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// =============================================================================
// CAPTURE FEED
// =============================================================================

/// One frame from the capture driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// A hand was tracked
    Hand(HandSample),
    /// Frame without a hand
    Empty,
    /// Stream stopped
    Ended,
}

/// Source of frames at roughly display cadence
pub trait CaptureFeed: Send {
    fn next_frame(&mut self) -> Frame;
}

/// Fixed list of frames, then Ended
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    frames: std::collections::VecDeque<Frame>,
}

impl ScriptedFeed {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// The same hand for `count` frames
    pub fn holding(sample: HandSample, count: usize) -> Self {
        Self::new(std::iter::repeat(Frame::Hand(sample)).take(count))
    }
}

impl CaptureFeed for ScriptedFeed {
    fn next_frame(&mut self) -> Frame {
        self.frames.pop_front().unwrap_or(Frame::Ended)
    }
}

/// Forward frames into the session until the feed ends or the session
/// closes. Frames arriving while frozen are dropped, not queued.
/// Returns the number of frames forwarded.
pub async fn run_capture_feed<F: CaptureFeed>(
    mut feed: F,
    handle: SessionHandle,
    frame_interval: Duration,
) -> usize {
    let mut ticker = tokio::time::interval(frame_interval);
    let mut forwarded = 0;
    loop {
        ticker.tick().await;
        let event = match feed.next_frame() {
            Frame::Hand(sample) => RoundEvent::Sample(sample),
            Frame::Empty => RoundEvent::EmptyFrame,
            Frame::Ended => break,
        };
        if handle.latest().frozen {
            continue;
        }
        if handle.push(event).await.is_err() {
            break;
        }
        forwarded += 1;
    }
    info!("capture feed stopped after {} frames", forwarded);
    forwarded
}

// =============================================================================
// TESTS
// =============================================================================
