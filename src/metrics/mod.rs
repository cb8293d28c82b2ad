pub mod collector;
pub mod exposition;
pub mod gauges;
pub mod percentiles;

pub use collector::{RefreshReport, SnapshotStore};
pub use gauges::{LatencyGauges, MetricsError};
pub use percentiles::PercentileSet;

/// The fixed set of published latency percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percentile {
    P80,
    P90,
    P95,
    P98,
}

impl Percentile {
    pub const ALL: [Percentile; 4] = [Self::P80, Self::P90, Self::P95, Self::P98];

    pub const fn value(self) -> u32 {
        match self {
            Self::P80 => 80,
            Self::P90 => 90,
            Self::P95 => 95,
            Self::P98 => 98,
        }
    }

    /// e.g. `nginxrt_percentile_95`
    pub fn metric_name(self) -> String {
        format!("nginxrt_percentile_{}", self.value())
    }

    pub fn help(self) -> String {
        format!("{} percentile of all backend requests", self.value())
    }
}
