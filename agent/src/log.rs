//! Decision diagnostics

use std::sync::Mutex;

use tracing::debug;

use crate::eval::Tier;

/// Why a strategy settled on an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    GuaranteedKo,
    StrongMove,
    StatusMove,
    Switch,
    Tier,
    Random,
    Forced,
    NoChoice,
}

/// One logged sub-decision
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRecord {
    pub turn: u32,
    pub slot: usize,
    /// Choice in wire syntax
    pub choice: String,
    pub reason: Reason,
    pub tier: Option<Tier>,
}

/// Sink for decision diagnostics
pub trait DecisionLog: Send + Sync {
    fn record(&self, record: &DecisionRecord);
}

/// Emits every record as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl DecisionLog for TracingLog {
    fn record(&self, record: &DecisionRecord) {
        debug!(
            turn = record.turn,
            slot = record.slot,
            choice = %record.choice,
            reason = ?record.reason,
            tier = ?record.tier,
            "decision"
        );
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<DecisionRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DecisionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl DecisionLog for MemoryLog {
    fn record(&self, record: &DecisionRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
