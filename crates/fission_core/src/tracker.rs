//! Copy-on-improve holder for the best design under one objective.

use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BestTracker<D> {
    best: Option<Arc<D>>,
    score: f64,
}

impl<D> Default for BestTracker<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> BestTracker<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            best: None,
            score: f64::NEG_INFINITY,
        }
    }

    /// True when `score` would replace the held snapshot.
    #[must_use]
    pub fn improves(&self, score: f64) -> bool {
        score > self.score
    }

    /// Stores the snapshot built by `build` if `score` is a strict
    /// improvement. Ties and NaN never replace, and `build` only runs on
    /// replacement.
    pub fn offer(&mut self, score: f64, build: impl FnOnce() -> D) -> bool {
        if !self.improves(score) {
            return false;
        }
        self.best = Some(Arc::new(build()));
        self.score = score;
        true
    }

    #[must_use]
    pub fn best(&self) -> Option<&Arc<D>> {
        self.best.as_ref()
    }

    /// Score of the held snapshot, `None` before the first offer lands.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|_| self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_improvement_only() {
        let mut tracker = BestTracker::new();
        assert!(tracker.best().is_none());
        assert!(tracker.offer(1.0, || "a"));
        assert!(!tracker.offer(1.0, || "b"));
        assert!(!tracker.offer(0.5, || "c"));
        assert!(tracker.offer(2.0, || "d"));
        assert_eq!(**tracker.best().unwrap(), "d");
        assert_eq!(tracker.score(), Some(2.0));
    }

    #[test]
    fn test_nan_rejected_and_build_skipped() {
        let mut tracker: BestTracker<u8> = BestTracker::new();
        let mut built = false;
        assert!(!tracker.offer(f64::NAN, || {
            built = true;
            0
        }));
        assert!(!built);
        assert_eq!(tracker.score(), None);
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let mut tracker = BestTracker::new();
        tracker.offer(1.0, || vec![1]);
        let held = Arc::clone(tracker.best().unwrap());
        tracker.offer(3.0, || vec![3]);
        assert_eq!(*held, vec![1]);
        assert_eq!(**tracker.best().unwrap(), vec![3]);
    }
}
