//! Main application orchestration.
//!
//! Wires the engine to its collaborators:
//! - Broker gateway and market feed (paper broker or a live client)
//! - Session snapshot restore on startup
//! - Trade and order journals
//! - Alert sinks
//! - Tick replay in paper mode

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use zone_core::Instrument;
use zone_executor::{DynBrokerGateway, DynMarketFeed};
use zone_persistence::{spawn_recorder, SnapshotStore};
use zone_telemetry::{AlertSink, LogAlertSink};

use crate::config::AppConfig;
use crate::dispatch::EffectDispatcher;
use crate::engine::Engine;
use crate::error::{AppError, AppResult};
use crate::event::{Effect, EngineEvent};
use crate::paper::PaperBroker;
use crate::replay::TickReplay;
use crate::router::{self, EventRouter, RouterHandle, TimeSource};

/// Capacity of the engine event channel.
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Main application.
pub struct Application {
    config: AppConfig,
    gateway: DynBrokerGateway,
    feed: DynMarketFeed,
    paper: Option<Arc<PaperBroker>>,
    handle: RouterHandle,
    rx: mpsc::Receiver<EngineEvent>,
    sinks: Vec<Arc<dyn AlertSink>>,
    time_source: Option<TimeSource>,
}

impl Application {
    /// Create a paper-mode application backed by the simulated broker.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        if !config.is_paper() {
            return Err(AppError::Config(
                "live mode needs a broker gateway, use Application::with_collaborators".into(),
            ));
        }
        let (handle, rx) = router::channel(EVENT_CHANNEL_CAPACITY);
        let paper = Arc::new(PaperBroker::new(handle.clone()));
        info!("Paper broker enabled");
        Ok(Self {
            config,
            gateway: paper.clone(),
            feed: paper.clone(),
            paper: Some(paper),
            handle,
            rx,
            sinks: Vec::new(),
            time_source: None,
        })
    }

    /// Create an application on an externally provided broker connection.
    ///
    /// Broker callbacks (`Filled`, `Rejected`) and feed ticks are pushed in
    /// through [`Application::handle`].
    pub fn with_collaborators(
        config: AppConfig,
        gateway: DynBrokerGateway,
        feed: DynMarketFeed,
    ) -> AppResult<Self> {
        config.validate()?;
        let (handle, rx) = router::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            gateway,
            feed,
            paper: None,
            handle,
            rx,
            sinks: Vec::new(),
            time_source: None,
        })
    }

    /// Handle for pushing ticks, broker callbacks and operator commands.
    #[must_use]
    pub fn handle(&self) -> RouterHandle {
        self.handle.clone()
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn with_time_source(mut self, now: TimeSource) -> Self {
        self.time_source = Some(now);
        self
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run until shutdown. Returns the engine in its final state.
    pub async fn run(self) -> AppResult<Engine> {
        let Self {
            config,
            gateway,
            feed,
            paper,
            handle,
            rx,
            sinks,
            time_source,
        } = self;
        let now = time_source.as_ref().map_or_else(Utc::now, |source| source());

        info!(
            mode = ?config.mode,
            underlying = %config.instrument.underlying,
            data_dir = %config.persistence.data_dir.display(),
            "Starting zone engine"
        );

        let (recorder, recorder_task) = spawn_recorder(&config.persistence);

        let mut engine = Engine::new(&config);
        let store = SnapshotStore::new(config.persistence.snapshot_path());
        let mut startup = match store.load() {
            Ok(Some(snapshot)) => {
                info!(date = %snapshot.date, saved_at = %snapshot.saved_at, "Restoring session snapshot");
                engine.restore(snapshot, now)
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, path = %store.path().display(), "Snapshot unreadable, starting fresh");
                Vec::new()
            }
        };
        startup.insert(
            0,
            Effect::Subscribe(Instrument::index(config.instrument.index_symbol.clone())),
        );

        let mut dispatcher = EffectDispatcher::new(
            gateway,
            feed,
            handle.clone(),
            config.orders.broker_call_timeout(),
        )
        .with_recorder(recorder);
        dispatcher.add_sink(Arc::new(LogAlertSink));
        for sink in sinks {
            dispatcher.add_sink(sink);
        }

        let mut router = EventRouter::new(engine, rx, dispatcher, config.session.clock_interval());
        if let Some(source) = time_source {
            router = router.with_time_source(source);
        }
        router.apply(startup);

        if let (Some(paper), Some(path)) = (paper, config.paper.replay_file.as_ref()) {
            let replay = TickReplay::from_file(
                path,
                &config.instrument.index_symbol,
                std::time::Duration::from_millis(config.paper.replay_interval_ms),
            )?;
            let replay_handle = handle.clone();
            tokio::spawn(async move {
                replay.run(replay_handle.clone(), paper).await;
                if replay_handle.shutdown().await.is_err() {
                    info!("Router already stopped at end of replay");
                }
            });
        }
        drop(handle);

        let engine = router.run().await;

        if let Err(e) = recorder_task.await {
            error!(error = %e, "Recorder task failed");
        }
        info!(
            trades = engine.risk().state().trade_count,
            realized_pnl = %engine.risk().state().realized_pnl,
            "Zone engine stopped"
        );
        Ok(engine)
    }
}
