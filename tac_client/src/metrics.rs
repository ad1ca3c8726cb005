//! Decode and reconciliation counters.

/// Running totals maintained by the engine, read by status panels and the
/// stale-stream watchdog (which watches `last_timestamp` for advancement).
#[derive(Debug, Clone, Default)]
pub struct ClientMetrics {
    pub ticks_applied: u64,
    pub ticks_aborted: u64,
    pub fields_applied: u64,
    pub units_created: u64,
    pub units_removed: u64,
    pub groups_created: u64,
    pub detection_recomputes: u64,
    /// Timestamp of the most recent buffer whose header decoded, aborted or
    /// not. `None` until the first update arrives.
    pub last_timestamp: Option<u64>,
}
