//! Daily JSON Lines journal.
//!
//! Each line is a complete JSON object and files are opened in append mode,
//! so an interrupted write only loses the line being written and a restart
//! continues the same day's file.

use crate::error::PersistenceResult;
use crate::records::JournalRecord;
use chrono::NaiveDate;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Open file for one session date.
struct ActiveWriter {
    writer: BufWriter<File>,
    date: NaiveDate,
    records_written: usize,
}

/// Buffered journal writer, one file per session date:
/// `<dir>/<PREFIX>_<YYYY-MM-DD>.jsonl`.
pub struct JsonLinesWriter<R: JournalRecord> {
    base_dir: PathBuf,
    buffer: Vec<R>,
    max_buffer_size: usize,
    active_writer: Option<ActiveWriter>,
    _record: PhantomData<R>,
}

impl<R: JournalRecord> JsonLinesWriter<R> {
    pub fn new(base_dir: impl AsRef<Path>, max_buffer_size: usize) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        if let Err(e) = std::fs::create_dir_all(&base_dir) {
            warn!(?e, dir = %base_dir.display(), "Failed to create journal directory");
        }

        Self {
            base_dir,
            buffer: Vec::with_capacity(max_buffer_size.max(1)),
            max_buffer_size: max_buffer_size.max(1),
            active_writer: None,
            _record: PhantomData,
        }
    }

    /// Buffer a record, flushing when the buffer is full.
    pub fn add_record(&mut self, record: R) -> PersistenceResult<()> {
        self.buffer.push(record);
        if self.buffer.len() >= self.max_buffer_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Path of the journal file for `date`.
    #[must_use]
    pub fn file_path(&self, date: NaiveDate) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}.jsonl", R::PREFIX, date.format("%Y-%m-%d")))
    }

    fn close_active_writer(&mut self) {
        if let Some(mut active) = self.active_writer.take() {
            if let Err(e) = active.writer.flush() {
                warn!(?e, prefix = R::PREFIX, "Failed to flush journal on close");
            }
            info!(
                prefix = R::PREFIX,
                date = %active.date,
                records = active.records_written,
                "Closed journal"
            );
        }
    }

    fn open_writer(&mut self, date: NaiveDate) -> PersistenceResult<()> {
        let path = self.file_path(date);
        info!(path = %path.display(), "Opening journal (append mode)");

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.active_writer = Some(ActiveWriter {
            writer: BufWriter::new(file),
            date,
            records_written: 0,
        });
        Ok(())
    }

    /// Write buffered records, rotating the file when the session date of a
    /// record differs from the open file.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let records = std::mem::take(&mut self.buffer);
        let count = records.len();
        for record in &records {
            let date = record.session_date();
            if self.active_writer.as_ref().map(|w| w.date) != Some(date) {
                self.close_active_writer();
                self.open_writer(date)?;
            }
            if let Some(active) = self.active_writer.as_mut() {
                let json = serde_json::to_string(record)?;
                writeln!(active.writer, "{json}")?;
                active.records_written += 1;
            }
        }

        if let Some(active) = self.active_writer.as_mut() {
            active.writer.flush()?;
        }
        debug!(prefix = R::PREFIX, records = count, "Flushed journal");
        Ok(())
    }

    /// Flush pending records and close the file.
    pub fn close(&mut self) -> PersistenceResult<()> {
        let result = self.flush();
        self.close_active_writer();
        result
    }
}

impl<R: JournalRecord> Drop for JsonLinesWriter<R> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(?e, prefix = R::PREFIX, "Failed to flush journal on drop");
        }
        self.close_active_writer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::OrderAttemptRecord;
    use chrono::{TimeZone, Utc};
    use std::io::{BufRead, BufReader};
    use tempfile::TempDir;
    use zone_core::{
        AttemptId, AttemptPurpose, OptionContract, OptionKind, OrderAttempt, OrderSide, Strike,
    };

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn record(id: &str, day: u32) -> OrderAttemptRecord {
        let contract = OptionContract::new("NIFTY", date(18), OptionKind::Ce, Strike(25000));
        let attempt = OrderAttempt::new(
            AttemptId::from(id),
            AttemptPurpose::Entry,
            contract,
            OrderSide::Buy,
            1,
            Utc.with_ymd_and_hms(2024, 1, day, 4, 0, 0).unwrap(),
        );
        OrderAttemptRecord::new(attempt, date(day))
    }

    fn read_lines(path: &Path) -> Vec<String> {
        let file = File::open(path).unwrap();
        BufReader::new(file).lines().map_while(Result::ok).collect()
    }

    #[test]
    fn test_write_and_read() {
        let dir = TempDir::new().unwrap();
        let mut writer = JsonLinesWriter::new(dir.path(), 100);
        for i in 0..3 {
            writer.add_record(record(&format!("zt_{i}"), 18)).unwrap();
        }
        writer.close().unwrap();

        let lines = read_lines(&dir.path().join("orders_2024-01-18.jsonl"));
        assert_eq!(lines.len(), 3);
        let back: OrderAttemptRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(back.attempt.id.as_str(), "zt_0");
    }

    #[test]
    fn test_append_across_writers() {
        let dir = TempDir::new().unwrap();
        {
            let mut writer = JsonLinesWriter::new(dir.path(), 1);
            writer.add_record(record("zt_a", 18)).unwrap();
        }
        {
            let mut writer = JsonLinesWriter::new(dir.path(), 1);
            writer.add_record(record("zt_b", 18)).unwrap();
        }
        let lines = read_lines(&dir.path().join("orders_2024-01-18.jsonl"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_rotates_by_session_date() {
        let dir = TempDir::new().unwrap();
        let mut writer = JsonLinesWriter::new(dir.path(), 10);
        writer.add_record(record("zt_a", 18)).unwrap();
        writer.add_record(record("zt_b", 19)).unwrap();
        writer.close().unwrap();

        assert_eq!(read_lines(&writer.file_path(date(18))).len(), 1);
        assert_eq!(read_lines(&writer.file_path(date(19))).len(), 1);
    }

    #[test]
    fn test_empty_flush_noop() {
        let dir = TempDir::new().unwrap();
        let mut writer: JsonLinesWriter<OrderAttemptRecord> = JsonLinesWriter::new(dir.path(), 10);
        writer.flush().unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
