//! Sources for the fields a block receives at creation: id and timestamp.

use chrono::{SecondsFormat, TimeZone, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

pub trait Clock: Send + Sync {
    /// Current time as an RFC 3339 string.
    fn now(&self) -> String;
}

pub trait IdGenerator: Send + Sync {
    /// A value never handed out before.
    fn new_id(&self) -> String;
}

/// Wall clock, UTC with millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Clock that advances one second per call from a fixed origin.
/// Deterministic timestamps for tests and replays.
#[derive(Debug, Default)]
pub struct SteppingClock {
    origin: i64,
    ticks: AtomicU64,
}

impl SteppingClock {
    pub fn starting_at(unix_secs: i64) -> Self {
        SteppingClock {
            origin: unix_secs,
            ticks: AtomicU64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> String {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) as i64;
        Utc.timestamp_opt(self.origin + tick, 0)
            .single()
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// `prefix-0`, `prefix-1`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        format!("{}-{}", self.prefix, self.next.fetch_add(1, Ordering::SeqCst))
    }
}
