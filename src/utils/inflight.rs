use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Keys of operations currently running. Acquiring a key that is already
/// held fails instead of waiting.
#[derive(Clone, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<String>>>,
}

/// Releases its key when dropped.
pub struct InFlightGuard {
    key: String,
    running: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, key: &str) -> Option<InFlightGuard> {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !running.insert(key.to_string()) {
            return None;
        }

        Some(InFlightGuard {
            key: key.to_string(),
            running: Arc::clone(&self.running),
        })
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.running
            .lock()
            .map(|r| r.contains(key))
            .unwrap_or(false)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        running.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_of_same_key_fails() {
        let inflight = InFlight::new();
        let _guard = inflight.try_acquire("forecasting").unwrap();

        assert!(inflight.try_acquire("forecasting").is_none());
        assert!(inflight.is_running("forecasting"));
    }

    #[test]
    fn different_keys_do_not_block_each_other() {
        let inflight = InFlight::new();
        let _a = inflight.try_acquire("fraud_detection").unwrap();
        assert!(inflight.try_acquire("decisions").is_some());
    }

    #[test]
    fn dropping_the_guard_releases_the_key() {
        let inflight = InFlight::new();
        {
            let _guard = inflight.try_acquire("decisions").unwrap();
        }
        assert!(!inflight.is_running("decisions"));
        assert!(inflight.try_acquire("decisions").is_some());
    }

    #[test]
    fn clones_share_the_same_registry() {
        let inflight = InFlight::new();
        let other = inflight.clone();
        let _guard = inflight.try_acquire("forecasting").unwrap();
        assert!(other.try_acquire("forecasting").is_none());
    }
}
