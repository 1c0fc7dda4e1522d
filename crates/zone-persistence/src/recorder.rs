//! Fire-and-forget recorder task.
//!
//! The engine never waits on disk. It hands records to a [`RecorderHandle`],
//! which `try_send`s them to a writer task; a full or closed channel drops
//! the record with a warning. Write failures in the task are logged and not
//! retried.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::PersistenceConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::records::{OrderAttemptRecord, TradeRecord};
use crate::state_store::{SessionSnapshot, SnapshotStore};
use crate::writer::JsonLinesWriter;

#[derive(Debug)]
pub enum RecorderMsg {
    Trade(TradeRecord),
    Attempt(OrderAttemptRecord),
    Snapshot(Box<SessionSnapshot>),
    /// Flush journals, then acknowledge.
    Flush(oneshot::Sender<()>),
    Shutdown,
}

impl RecorderMsg {
    fn kind(&self) -> &'static str {
        match self {
            Self::Trade(_) => "trade",
            Self::Attempt(_) => "attempt",
            Self::Snapshot(_) => "snapshot",
            Self::Flush(_) => "flush",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Writer task owning the journals and the snapshot store.
pub struct RecorderTask {
    rx: mpsc::Receiver<RecorderMsg>,
    trades: JsonLinesWriter<TradeRecord>,
    orders: JsonLinesWriter<OrderAttemptRecord>,
    snapshots: SnapshotStore,
}

impl RecorderTask {
    pub async fn run(mut self) {
        debug!("RecorderTask started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                RecorderMsg::Shutdown => {
                    debug!("RecorderTask shutting down");
                    break;
                }
                RecorderMsg::Trade(record) => {
                    if let Err(e) = self.trades.add_record(record) {
                        error!(error = %e, "Failed to record trade");
                    }
                }
                RecorderMsg::Attempt(record) => {
                    if let Err(e) = self.orders.add_record(record) {
                        error!(error = %e, "Failed to record order attempt");
                    }
                }
                RecorderMsg::Snapshot(snapshot) => {
                    if let Err(e) = self.snapshots.save(&snapshot) {
                        error!(error = %e, "Failed to save session snapshot");
                    }
                }
                RecorderMsg::Flush(ack) => {
                    self.flush_all();
                    let _ = ack.send(());
                }
            }
        }

        if let Err(e) = self.trades.close() {
            warn!(error = %e, "Failed to close trade journal");
        }
        if let Err(e) = self.orders.close() {
            warn!(error = %e, "Failed to close order journal");
        }
        debug!("RecorderTask terminated");
    }

    fn flush_all(&mut self) {
        if let Err(e) = self.trades.flush() {
            error!(error = %e, "Failed to flush trade journal");
        }
        if let Err(e) = self.orders.flush() {
            error!(error = %e, "Failed to flush order journal");
        }
    }
}

/// Non-blocking handle to the recorder task.
#[derive(Debug, Clone)]
pub struct RecorderHandle {
    tx: mpsc::Sender<RecorderMsg>,
}

impl RecorderHandle {
    fn offer(&self, msg: RecorderMsg) {
        let kind = msg.kind();
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(kind, "Recorder channel full, record dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(kind, "Recorder stopped, record dropped");
            }
        }
    }

    pub fn record_trade(&self, record: TradeRecord) {
        self.offer(RecorderMsg::Trade(record));
    }

    pub fn record_attempt(&self, record: OrderAttemptRecord) {
        self.offer(RecorderMsg::Attempt(record));
    }

    pub fn save_snapshot(&self, snapshot: SessionSnapshot) {
        self.offer(RecorderMsg::Snapshot(Box::new(snapshot)));
    }

    /// Flush both journals and wait for the task to confirm.
    pub async fn flush(&self) -> PersistenceResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(RecorderMsg::Flush(ack_tx))
            .await
            .map_err(|e| PersistenceError::ChannelClosed(e.to_string()))?;
        ack_rx
            .await
            .map_err(|e| PersistenceError::ChannelClosed(e.to_string()))
    }

    /// Ask the task to close its files and stop.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(RecorderMsg::Shutdown).await;
    }
}

/// Spawn the recorder task.
#[must_use]
pub fn spawn_recorder(config: &PersistenceConfig) -> (RecorderHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let task = RecorderTask {
        rx,
        trades: JsonLinesWriter::new(&config.data_dir, config.buffer_size),
        orders: JsonLinesWriter::new(&config.data_dir, config.buffer_size),
        snapshots: SnapshotStore::new(config.snapshot_path()),
    };
    let join_handle = tokio::spawn(task.run());
    (RecorderHandle { tx }, join_handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;
    use zone_core::{
        DailyRiskState, ExitReason, GateState, OptionContract, OptionKind, Position,
        PositionExit, PositionId, PositionStatus, Price, Strike,
    };

    fn closed_position() -> Position {
        let date = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 18, 4, 0, 0).unwrap();
        let contract = OptionContract::new("NIFTY", date, OptionKind::Ce, Strike(25000));
        Position {
            id: PositionId::new("zt_1_a"),
            side: contract.kind,
            strike: contract.strike,
            contract,
            entry_price: Price::new(dec!(51)),
            quantity: 1,
            stop_loss_price: Price::new(dec!(51)),
            peak_profit: dec!(10),
            last_price: Price::new(dec!(51)),
            opened_at: at,
            status: PositionStatus::Closed,
            exit: Some(PositionExit {
                reason: ExitReason::StopLoss,
                price: Price::new(dec!(51)),
                closed_at: at,
                realized_pnl: dec!(0),
            }),
        }
    }

    #[tokio::test]
    async fn test_recorder_writes_trades_and_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = PersistenceConfig {
            data_dir: dir.path().to_path_buf(),
            buffer_size: 10,
            channel_capacity: 16,
        };
        let (handle, join) = spawn_recorder(&config);
        let date = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();

        let record = TradeRecord::from_position(&closed_position(), date).unwrap();
        handle.record_trade(record);
        handle.save_snapshot(SessionSnapshot {
            saved_at: Utc.with_ymd_and_hms(2024, 1, 18, 4, 0, 0).unwrap(),
            date,
            zones: None,
            gate: GateState::default(),
            risk: DailyRiskState::new(Some(date)),
            position: None,
        });
        handle.flush().await.unwrap();

        let trades = std::fs::read_to_string(dir.path().join("trades_2024-01-18.jsonl")).unwrap();
        assert_eq!(trades.lines().count(), 1);
        assert!(trades.contains("\"exit_reason\":\"stop_loss\""));
        assert!(config.snapshot_path().exists());

        handle.shutdown().await;
        join.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_after_shutdown_is_dropped() {
        let dir = TempDir::new().unwrap();
        let config = PersistenceConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let (handle, join) = spawn_recorder(&config);
        handle.shutdown().await;
        join.await.unwrap();

        // Must not panic or block
        let date = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        handle.record_trade(TradeRecord::from_position(&closed_position(), date).unwrap());
        assert!(handle.flush().await.is_err());
    }

    #[test]
    fn test_open_position_has_no_trade_record() {
        let mut pos = closed_position();
        pos.exit = None;
        pos.status = PositionStatus::Open;
        let date = NaiveDate::from_ymd_opt(2024, 1, 18).unwrap();
        assert!(TradeRecord::from_position(&pos, date).is_none());
    }
}
