use serde::Serialize;

use super::Percentile;

/// The four published percentiles of one sample window.
/// Serialized straight into the `/api/snapshot` JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSet {
    pub p80: f64,
    pub p90: f64,
    pub p95: f64,
    pub p98: f64,
    pub count: usize,
}

impl PercentileSet {
    /// Sorts the window and picks every published percentile from it.
    /// An empty window yields all zeros.
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        sort_descending(&mut samples);

        Self {
            p80: percentile(Percentile::P80.value(), &samples),
            p90: percentile(Percentile::P90.value(), &samples),
            p95: percentile(Percentile::P95.value(), &samples),
            p98: percentile(Percentile::P98.value(), &samples),
            count: samples.len(),
        }
    }

    pub fn get(&self, which: Percentile) -> f64 {
        match which {
            Percentile::P80 => self.p80,
            Percentile::P90 => self.p90,
            Percentile::P95 => self.p95,
            Percentile::P98 => self.p98,
        }
    }

    /// Convenience: is this set backed by at least one observation?
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

pub fn sort_descending(samples: &mut [f64]) {
    samples.sort_unstable_by(|a, b| b.total_cmp(a));
}

/// Picks the `percentile`-th value from a window sorted in descending order.
///
/// The index is `(len / 100) * (100 - percentile)` in integer arithmetic, so
/// every window shorter than 100 samples reports its maximum. This keeps the
/// published numbers comparable with dashboards built on earlier exporter
/// versions; it is not a textbook order statistic.
pub fn percentile(percentile: u32, sorted_desc: &[f64]) -> f64 {
    let bucket = sorted_desc.len() / 100;
    let index = bucket * 100u32.saturating_sub(percentile) as usize;

    // Only percentile 0 on a multiple-of-100 window lands past the end.
    sorted_desc
        .get(index)
        .or_else(|| sorted_desc.last())
        .copied()
        .unwrap_or(0.0)
}
