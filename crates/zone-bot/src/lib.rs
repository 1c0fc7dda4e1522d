//! Session engine and runtime for the zone options trading bot.
//!
//! One ordered event stream drives the whole trading day: index and option
//! ticks, broker outcomes, session heartbeats, retry timers and operator
//! commands are processed one at a time by a single engine.
//!
//! # Key Components
//!
//! - [`Engine`]: synchronous session engine (zones, signals, orders,
//!   position, risk) turning events into effects
//! - [`SessionClock`]: daily zone computation and session-end triggers
//! - [`EventRouter`]: the event loop, timer queue and heartbeat
//! - [`EffectDispatcher`]: broker calls, journals, snapshots, alerts
//! - [`PaperBroker`] / [`TickReplay`]: simulated broker and tick file feed
//! - [`Application`]: startup wiring and snapshot restore

pub mod app;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod paper;
pub mod replay;
pub mod router;

pub use app::Application;
pub use clock::{ClockTrigger, SessionClock};
pub use config::{AppConfig, InstrumentConfig, Mode, PaperConfig, SessionConfig, TelemetryConfig};
pub use dispatch::EffectDispatcher;
pub use engine::{Engine, SessionContracts, SessionStatus};
pub use error::{AppError, AppResult};
pub use event::{Effect, EngineEvent, OperatorCommand, TimerKind};
pub use paper::PaperBroker;
pub use replay::{ReplayLine, TickReplay};
pub use router::{channel, EventRouter, RouterHandle, TimeSource};
