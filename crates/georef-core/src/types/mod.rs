//! Canonical data types for georeferencing.

mod point;
mod reference;

pub use point::{ImagePt, RealPt};
pub use reference::{
    BulkLoadReport, PointId, ReferenceError, ReferencePoint, ReferenceSet, MIN_REFERENCE_POINTS,
};

use std::time::SystemTime;

/// Get the current Unix timestamp in seconds.
///
/// Returns `0` if the system clock reports a time before the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
