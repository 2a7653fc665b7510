//! Search counters and structured logging.

/// Per-engine counters for search progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    steps: u64,
    evaluations: u64,
    accepted: u64,
    improvements: u64,
}

/// Steps between two periodic progress events.
pub const REPORT_INTERVAL: u64 = 100_000;

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed step and logs a summary every [`REPORT_INTERVAL`] steps.
    pub fn record_step(&mut self, best: f64) {
        self.steps += 1;
        if self.steps.is_multiple_of(REPORT_INTERVAL) {
            tracing::info!(
                steps = self.steps,
                evaluations = self.evaluations,
                accepted = self.accepted,
                improvements = self.improvements,
                best = best,
                "Search progress"
            );
        }
    }

    pub fn record_evaluation(&mut self) {
        self.evaluations += 1;
    }

    pub fn record_accept(&mut self) {
        self.accepted += 1;
    }

    pub fn record_improvement(&mut self) {
        self.improvements += 1;
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    #[must_use]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    #[must_use]
    pub fn improvements(&self) -> u64 {
        self.improvements
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}

/// Like [`init_logging`], but honours an env-filter directive such as
/// `fission_core=debug`.
pub fn init_logging_with_filter(directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(directive)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.steps(), 0);
        assert_eq!(metrics.evaluations(), 0);
    }

    #[test]
    fn test_record_step() {
        let mut metrics = Metrics::new();
        metrics.record_evaluation();
        metrics.record_accept();
        metrics.record_step(1.0);
        assert_eq!(metrics.steps(), 1);
        assert_eq!(metrics.evaluations(), 1);
        assert_eq!(metrics.accepted(), 1);
    }
}
