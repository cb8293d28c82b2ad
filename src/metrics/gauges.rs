use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

use super::percentiles::PercentileSet;
use super::Percentile;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric registry error: {0}")]
    Registry(#[from] prometheus::Error),
    #[error("metric exposition is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// The exporter's gauges, registered in a registry owned by this value.
///
/// Each gauge is set on its own, so a scrape that races a refresh may see
/// some percentiles from the previous window and some from the new one.
pub struct LatencyGauges {
    registry: Registry,
    percentiles: [(Percentile, Gauge); 4],
    window_samples: IntGauge,
    refreshes: IntCounter,
}

impl LatencyGauges {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let percentiles = Percentile::ALL.map(|p| {
            Gauge::with_opts(Opts::new(p.metric_name(), p.help())).map(|gauge| (p, gauge))
        });
        let [p80, p90, p95, p98] = percentiles;
        let percentiles = [p80?, p90?, p95?, p98?];

        let window_samples = IntGauge::new(
            "nginxrt_window_samples",
            "Number of requests in the last sampled window",
        )?;
        let refreshes = IntCounter::new(
            "nginxrt_refreshes_total",
            "Completed percentile refreshes since start",
        )?;

        for (_, gauge) in &percentiles {
            registry.register(Box::new(gauge.clone()))?;
        }
        registry.register(Box::new(window_samples.clone()))?;
        registry.register(Box::new(refreshes.clone()))?;

        Ok(Self {
            registry,
            percentiles,
            window_samples,
            refreshes,
        })
    }

    /// Overwrites every gauge with the values of a fresh window.
    pub fn publish(&self, set: &PercentileSet) {
        for (which, gauge) in &self.percentiles {
            gauge.set(set.get(*which));
        }
        self.window_samples.set(set.count as i64);
        self.refreshes.inc();
    }

    /// Current value of one percentile gauge.
    #[cfg(test)]
    pub fn get(&self, which: Percentile) -> f64 {
        self.percentiles
            .iter()
            .find(|(p, _)| *p == which)
            .map_or(0.0, |(_, gauge)| gauge.get())
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
