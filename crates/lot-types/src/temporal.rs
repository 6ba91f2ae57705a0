use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Commit timestamp attached to a ledger transaction.
///
/// Mirrors the protobuf `Timestamp` shape the ledger reports: whole seconds
/// since the UNIX epoch plus a non-negative nanosecond remainder.
///
/// Ordering: `seconds` → `nanos`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerTimestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl LedgerTimestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Timestamp for the current wall-clock time.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos() as i32,
        }
    }

    /// The UNIX epoch.
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            nanos: 0,
        }
    }

    /// Human-readable UTC rendering used in audit trails.
    ///
    /// Format: `YYYY-MM-DD HH:MM:SS[.fraction] +0000 UTC`, with trailing zeros
    /// dropped from the fraction. Timestamps chrono cannot represent fall back
    /// to `<seconds>s+<nanos>ns`.
    pub fn to_human(&self) -> String {
        let Ok(nanos) = u32::try_from(self.nanos) else {
            return self.raw();
        };
        let Some(dt) = DateTime::from_timestamp(self.seconds, nanos) else {
            return self.raw();
        };

        let mut out = dt.format("%Y-%m-%d %H:%M:%S").to_string();
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            out.push('.');
            out.push_str(fraction.trim_end_matches('0'));
        }
        out.push_str(" +0000 UTC");
        out
    }

    fn raw(&self) -> String {
        format!("{}s+{}ns", self.seconds, self.nanos)
    }
}

impl fmt::Display for LedgerTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_human())
    }
}
