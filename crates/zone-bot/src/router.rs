//! Event router.
//!
//! The single ordered event stream. Feed ticks, broker call outcomes,
//! broker callbacks and operator commands arrive on one mpsc channel;
//! heartbeats come from an interval and retry waits from a `DelayQueue`.
//! The router hands each event to the engine, then passes the resulting
//! effects on: timers go back into its own queue, everything else to the
//! dispatcher.

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::time::DelayQueue;
use tracing::{debug, info, warn};

use crate::dispatch::EffectDispatcher;
use crate::engine::Engine;
use crate::error::{AppError, AppResult};
use crate::event::{Effect, EngineEvent, OperatorCommand, TimerKind};

/// Source of "now" for the engine.
pub type TimeSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Sending side of the event stream.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl RouterHandle {
    /// Queue an event without waiting. Returns false if it was dropped.
    pub fn try_submit(&self, event: EngineEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(kind = event.kind(), "Router queue full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                debug!(kind = event.kind(), "Router stopped, event dropped");
                false
            }
        }
    }

    /// Queue an event, waiting for capacity.
    pub async fn submit(&self, event: EngineEvent) -> AppResult<()> {
        self.tx.send(event).await.map_err(|_| AppError::Shutdown)
    }

    pub async fn shutdown(&self) -> AppResult<()> {
        self.submit(EngineEvent::Command(OperatorCommand::Shutdown))
            .await
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the event channel.
#[must_use]
pub fn channel(capacity: usize) -> (RouterHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RouterHandle { tx }, rx)
}

pub struct EventRouter {
    engine: Engine,
    rx: mpsc::Receiver<EngineEvent>,
    timers: DelayQueue<TimerKind>,
    dispatcher: EffectDispatcher,
    clock_interval: Duration,
    now: TimeSource,
}

impl EventRouter {
    pub fn new(
        engine: Engine,
        rx: mpsc::Receiver<EngineEvent>,
        dispatcher: EffectDispatcher,
        clock_interval: Duration,
    ) -> Self {
        Self {
            engine,
            rx,
            timers: DelayQueue::new(),
            dispatcher,
            clock_interval,
            now: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock (replay and tests).
    #[must_use]
    pub fn with_time_source(mut self, now: TimeSource) -> Self {
        self.now = now;
        self
    }

    /// Carry out effects produced outside the loop (snapshot restore).
    pub fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { timer, after } => {
                    self.timers.insert(timer, after);
                }
                other => self.dispatcher.dispatch(other),
            }
        }
    }

    /// Process events until shutdown, then flush and return the engine.
    pub async fn run(mut self) -> Engine {
        info!(
            clock_interval_ms = self.clock_interval.as_millis() as u64,
            "Event router started"
        );
        let mut heartbeat = tokio::time::interval(self.clock_interval);
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            let event = tokio::select! {
                received = self.rx.recv() => match received {
                    Some(EngineEvent::Command(OperatorCommand::Shutdown)) => {
                        info!("Shutdown command received");
                        break;
                    }
                    Some(event) => event,
                    None => {
                        info!("Event channel closed");
                        break;
                    }
                },
                Some(expired) = self.timers.next(), if !self.timers.is_empty() => {
                    EngineEvent::Timer(expired.into_inner())
                }
                _ = heartbeat.tick() => EngineEvent::Clock,
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }
            };

            let now = (self.now)();
            let effects = self.engine.handle(event, now);
            self.apply(effects);
        }

        let now = (self.now)();
        let effects = self
            .engine
            .handle(EngineEvent::Command(OperatorCommand::Shutdown), now);
        self.apply(effects);
        self.dispatcher
            .shutdown(self.engine.risk().state(), now)
            .await;

        info!(pending_timers = self.timers.len(), "Event router stopped");
        self.engine
    }
}
