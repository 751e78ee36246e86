//! Prometheus metrics of the controller

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Outcome label of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Ready,
    NotRequired,
    Pending,
    Failed,
}

impl ReconcileOutcome {
    fn as_str(self) -> &'static str {
        match self {
            ReconcileOutcome::Ready => "ready",
            ReconcileOutcome::NotRequired => "not_required",
            ReconcileOutcome::Pending => "pending",
            ReconcileOutcome::Failed => "failed",
        }
    }
}

/// Metrics registered on a private registry served at `/metrics`
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    compile_duration: HistogramVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new(
                "cloud_config_reconciliations_total",
                "Cluster reconciliations by outcome",
            ),
            &["outcome"],
        )?;
        let compile_duration = HistogramVec::new(
            HistogramOpts::new(
                "cloud_config_compile_duration_seconds",
                "Time spent compiling a cloud config",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
            &["provider"],
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(compile_duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            compile_duration,
        })
    }

    pub fn record_reconcile(&self, outcome: ReconcileOutcome) {
        self.reconciliations
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn observe_compile(&self, provider: &str, seconds: f64) {
        self.compile_duration
            .with_label_values(&[provider])
            .observe(seconds);
    }

    /// Text exposition of all metrics
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
