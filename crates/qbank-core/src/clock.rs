//! Timestamp source shared by every crate.

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to microseconds.
///
/// The store persists timestamps at microsecond precision, so values produced
/// here survive a database roundtrip unchanged.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_sub_microsecond_part() {
        let ts = now();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000, 0);
    }
}
