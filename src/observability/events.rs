//! Observable store events
//!
//! Events are explicit and typed. Each has a fixed severity so call sites
//! never pick one ad hoc.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Writer
    /// A writer lost the snapshot exchange and is replaying its mutation
    CasRetry,
    /// A writer observed cancellation between retries
    WriteCancelled,
    /// Update rejected because the caller's revision is stale
    VersionConflict,

    // Clock / encoding
    /// A counter advanced
    ClockTick,
    /// A dictionary assigned a new ID
    IdMinted,
    /// A freshly minted ID lost to a concurrent writer and was abandoned
    IdAbandoned,
    /// An ID does not fit its packed field
    EncodingOverflow,
    /// An ID counter was behind its dictionary and was moved forward
    CounterRaised,

    // Persistence
    /// Snapshot file written
    SnapshotSaved,
    /// Snapshot file loaded
    SnapshotLoaded,
    /// Snapshot file failed verification
    SnapshotCorrupted,

    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CasRetry => "CAS_RETRY",
            Event::WriteCancelled => "WRITE_CANCELLED",
            Event::VersionConflict => "VERSION_CONFLICT",
            Event::ClockTick => "CLOCK_TICK",
            Event::IdMinted => "ID_MINTED",
            Event::IdAbandoned => "ID_ABANDONED",
            Event::EncodingOverflow => "ENCODING_OVERFLOW",
            Event::CounterRaised => "COUNTER_RAISED",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotCorrupted => "SNAPSHOT_CORRUPTED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::CasRetry | Event::ClockTick | Event::VersionConflict => Severity::Trace,
            Event::IdMinted
            | Event::IdAbandoned
            | Event::SnapshotSaved
            | Event::SnapshotLoaded
            | Event::ConfigLoaded => Severity::Info,
            Event::WriteCancelled | Event::CounterRaised => Severity::Warn,
            Event::EncodingOverflow | Event::SnapshotCorrupted => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
