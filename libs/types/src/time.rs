//! Wall-clock timestamps
//!
//! Timestamps travel through the system as nanoseconds since the Unix epoch
//! in a `u64` (`*_ns` fields). A direct `SystemTime` read is plenty here;
//! nothing in this system generates timestamps on a syscall-sensitive hot
//! path.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch.
///
/// A clock reading before the epoch yields 0 instead of panicking; 0 is
/// never a valid trade timestamp, so such a reading fails validation at the
/// point of use.
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
