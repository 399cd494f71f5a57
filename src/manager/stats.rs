//! Operation counters kept by the manager.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters, shared with the background startup task.
#[derive(Debug, Default)]
pub struct ManagerStats {
    setups: AtomicU64,
    setup_failures: AtomicU64,
    camera_switches: AtomicU64,
    attribute_updates: AtomicU64,
    ignored_while_busy: AtomicU64,
    configuration_failures: AtomicU64,
    startup_failures: AtomicU64,
    cancels: AtomicU64,
}

/// Point-in-time copy of [`ManagerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Setup attempts.
    pub setups: u64,
    /// Setup attempts that returned an error.
    pub setup_failures: u64,
    /// Successful camera position switches.
    pub camera_switches: u64,
    /// Attribute changes confirmed by the device and stored.
    pub attribute_updates: u64,
    /// Calls dropped because an animation was in flight.
    pub ignored_while_busy: u64,
    /// Device configuration locks that could not be acquired.
    pub configuration_failures: u64,
    /// Background startup tasks that failed.
    pub startup_failures: u64,
    /// Session teardowns.
    pub cancels: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ManagerStats {
    pub(crate) fn record_setup(&self) {
        bump(&self.setups);
    }

    pub(crate) fn record_setup_failure(&self) {
        bump(&self.setup_failures);
    }

    pub(crate) fn record_camera_switch(&self) {
        bump(&self.camera_switches);
    }

    pub(crate) fn record_attribute_update(&self) {
        bump(&self.attribute_updates);
    }

    pub(crate) fn record_ignored_while_busy(&self) {
        bump(&self.ignored_while_busy);
    }

    pub(crate) fn record_configuration_failure(&self) {
        bump(&self.configuration_failures);
    }

    pub(crate) fn record_startup_failure(&self) {
        bump(&self.startup_failures);
    }

    pub(crate) fn record_cancel(&self) {
        bump(&self.cancels);
    }

    /// Reads every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            setups: load(&self.setups),
            setup_failures: load(&self.setup_failures),
            camera_switches: load(&self.camera_switches),
            attribute_updates: load(&self.attribute_updates),
            ignored_while_busy: load(&self.ignored_while_busy),
            configuration_failures: load(&self.configuration_failures),
            startup_failures: load(&self.startup_failures),
            cancels: load(&self.cancels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_records() {
        let stats = ManagerStats::default();
        stats.record_setup();
        stats.record_setup();
        stats.record_ignored_while_busy();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.setups, 2);
        assert_eq!(snapshot.ignored_while_busy, 1);
        assert_eq!(snapshot.cancels, 0);
    }
}
