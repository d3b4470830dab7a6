//! Append-only record of who changed which cell.
//!
//! Without a sink the most recent records are kept in memory. Once a sink is
//! attached, records are written to it one JSON object per line and are no
//! longer held in memory.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use voxelgate_core::{BlockValue, CellPos};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    /// How an edit came about.
    pub struct AuditFlags: u16 {
        const MANUAL_PLACE = 0b0000_0001;
        const PAINTED = 0b0000_0010;
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub who: String,
    pub cell: CellPos,
    pub flags: AuditFlags,
    pub old: BlockValue,
    pub new: BlockValue,
    pub at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        who: impl Into<String>,
        cell: CellPos,
        flags: AuditFlags,
        old: BlockValue,
        new: BlockValue,
    ) -> Self {
        Self {
            who: who.into(),
            cell,
            flags,
            old,
            new,
            at: Utc::now(),
        }
    }
}

/// Records held in memory while no sink is attached; the oldest go first.
pub const RETAINED_RECORDS: usize = 4096;

/// Durable ledger shared by every connection editing a world.
#[derive(Default)]
pub struct AuditLedger {
    records: Mutex<VecDeque<AuditRecord>>,
    sink: Mutex<Option<BufWriter<File>>>,
}

impl AuditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every future record to a JSONL file.
    ///
    /// Records held in memory are written first and then released.
    pub fn open_sink(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open audit log: {:?}", path))?;
        let mut writer = BufWriter::new(file);

        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        for record in records.iter() {
            write_line(&mut writer, record)?;
        }
        records.clear();
        *sink = Some(writer);
        Ok(())
    }

    pub fn append(&self, record: AuditRecord) {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(writer) = sink.as_mut() {
            if let Err(err) = write_line(writer, &record) {
                warn!("Failed to write audit record: {err:#}");
            }
            return;
        }

        // Lock order matches `open_sink`: sink, then records.
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        if records.len() == RETAINED_RECORDS {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Flush buffered writes to the sink.
    pub fn flush(&self) -> Result<()> {
        let mut sink = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(writer) = sink.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Records currently held in memory.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the records held in memory, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

fn write_line(writer: &mut BufWriter<File>, record: &AuditRecord) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
