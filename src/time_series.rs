/// Minimum spacing between consecutive WPM samples.
pub const SNAPSHOT_INTERVAL_SECS: f64 = 2.0;

/// A WPM sample taken while a test runs, used for consistency scoring and the results chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmSnapshot {
    /// Whole seconds since the test started.
    pub time_secs: u64,
    pub wpm: u32,
}

impl WpmSnapshot {
    pub fn new(time_secs: u64, wpm: u32) -> Self {
        Self { time_secs, wpm }
    }
}

impl From<WpmSnapshot> for (f64, f64) {
    fn from(p: WpmSnapshot) -> Self {
        (p.time_secs as f64, p.wpm as f64)
    }
}

pub fn wpm_values(snapshots: &[WpmSnapshot]) -> Vec<f64> {
    snapshots.iter().map(|s| s.wpm as f64).collect()
}
